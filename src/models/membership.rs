use crate::entities::{
    MembershipStatus, PaymentStatus, PriceSource, RenewalTrigger, membership_entity as memberships,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateMembershipRequest {
    pub member_id: String,
    pub activity_id: String,
    /// Catalog plan; its cost and attendance limit win over the request values.
    pub membership_plan_id: Option<String>,
    /// Falls back to the activity's first tier when omitted.
    pub cost: Option<i64>,
    /// Defaults to today.
    #[schema(value_type = Option<String>, example = "2024-02-15")]
    pub start_date: Option<NaiveDate>,
    #[schema(example = 1)]
    pub months: u32,
    #[serde(default)]
    pub auto_renewal: bool,
    pub max_attendances: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetAutoRenewalRequest {
    pub auto_renewal: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MembershipQuery {
    pub status: Option<MembershipStatus>,
    pub member_id: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MembershipResponse {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub activity_id: String,
    pub activity_name: String,
    pub membership_plan_id: Option<String>,
    pub cost: i64,
    #[schema(value_type = String, example = "2024-02-15")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, example = "2024-03-15")]
    pub end_date: NaiveDate,
    pub status: MembershipStatus,
    pub payment_status: PaymentStatus,
    pub auto_renewal: bool,
    pub max_attendances: Option<i32>,
    pub current_attendances: i32,
    pub previous_membership_id: Option<String>,
    pub renewed_to_id: Option<String>,
    pub price_source: Option<PriceSource>,
    pub renewal_trigger: Option<RenewalTrigger>,
    pub created_at: DateTime<Utc>,
}

impl From<memberships::Model> for MembershipResponse {
    fn from(m: memberships::Model) -> Self {
        Self {
            id: m.id,
            member_id: m.member_id,
            member_name: m.member_name,
            activity_id: m.activity_id,
            activity_name: m.activity_name,
            membership_plan_id: m.membership_plan_id,
            cost: m.cost,
            start_date: m.start_date,
            end_date: m.end_date,
            status: m.status,
            payment_status: m.payment_status,
            auto_renewal: m.auto_renewal,
            max_attendances: m.max_attendances,
            current_attendances: m.current_attendances,
            previous_membership_id: m.previous_membership_id,
            renewed_to_id: m.renewed_to_id,
            price_source: m.price_source,
            renewal_trigger: m.renewal_trigger,
            created_at: m.created_at,
        }
    }
}

/// A membership past its end date, as reported by the expiration scanner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpiredMembership {
    pub membership: MembershipResponse,
    pub days_expired: i64,
    /// `cost × ceil(days_expired / 30)`
    pub total_debt: i64,
}
