use crate::entities::{
    SubscriptionRequestStatus, subscription_plan_entity as plans,
    subscription_request_entity as requests,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionPlanRequest {
    #[schema(example = "Pro")]
    pub name: String,
    #[schema(example = 4900)]
    pub price: i64,
    #[schema(example = 1)]
    pub duration_months: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionPlanResponse {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub duration_months: i32,
    pub active: bool,
}

impl From<plans::Model> for SubscriptionPlanResponse {
    fn from(p: plans::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
            duration_months: p.duration_months,
            active: p.active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequestRequest {
    pub plan_id: String,
    pub proof_url: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewSubscriptionRequest {
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriptionRequestQuery {
    pub status: Option<SubscriptionRequestStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionRequestResponse {
    pub id: String,
    pub tenant_id: String,
    pub plan_id: String,
    pub status: SubscriptionRequestStatus,
    pub proof_url: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<requests::Model> for SubscriptionRequestResponse {
    fn from(r: requests::Model) -> Self {
        Self {
            id: r.id,
            tenant_id: r.tenant_id,
            plan_id: r.plan_id,
            status: r.status,
            proof_url: r.proof_url,
            note: r.note,
            created_at: r.created_at,
            reviewed_at: r.reviewed_at,
        }
    }
}
