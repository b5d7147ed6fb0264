use crate::entities::{PaymentType, PendingPaymentStatus, pending_payment_entity as payments};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PendingPaymentResponse {
    pub id: String,
    pub membership_id: String,
    pub member_id: String,
    pub amount: i64,
    pub status: PendingPaymentStatus,
    #[schema(value_type = String, example = "2024-02-22")]
    pub due_date: NaiveDate,
    pub payment_type: PaymentType,
    pub proof_url: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<payments::Model> for PendingPaymentResponse {
    fn from(p: payments::Model) -> Self {
        Self {
            id: p.id,
            membership_id: p.membership_id,
            member_id: p.member_id,
            amount: p.amount,
            status: p.status,
            due_date: p.due_date,
            payment_type: p.payment_type,
            proof_url: p.proof_url,
            paid_at: p.paid_at,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttachProofRequest {
    /// Data URI (`data:image/png;base64,...`) or a remote URL accepted by the image host.
    pub file: String,
}
