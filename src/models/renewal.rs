use crate::entities::PriceSource;
use crate::models::MembershipResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RenewMembershipRequest {
    #[schema(example = 1)]
    pub months: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkRenewRequest {
    pub membership_ids: Vec<String>,
    #[schema(example = 1)]
    pub months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenewedMembership {
    pub previous_membership_id: String,
    pub membership: MembershipResponse,
    pub price_source: PriceSource,
    /// Absent when the best-effort pending payment could not be written.
    pub pending_payment_id: Option<String>,
}

/// Non-failing outcome of a single renewal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenewalResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_membership_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_source: Option<PriceSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl RenewalResult {
    pub fn ok(renewed: &RenewedMembership) -> Self {
        Self {
            success: true,
            new_membership_id: Some(renewed.membership.id.clone()),
            price_source: Some(renewed.price_source),
            error: None,
            error_code: None,
        }
    }

    pub fn failed(code: &str, message: String) -> Self {
        Self {
            success: false,
            new_membership_id: None,
            price_source: None,
            error: Some(message),
            error_code: Some(code.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenewalFailure {
    pub membership_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BulkRenewalSummary {
    pub success_count: usize,
    pub error_count: usize,
    pub renewed_ids: Vec<String>,
    pub failures: Vec<RenewalFailure>,
}

/// Dashboard counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RenewalStats {
    pub active: u64,
    pub expired: u64,
    pub expiring_soon: u64,
    pub auto_renewal_enabled: u64,
    pub pending_payments: u64,
    pub pending_amount: i64,
    pub total_debt: i64,
}
