use crate::entities::tenant_entity as tenants;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTenantRequest {
    #[schema(example = "iron-gym")]
    pub id: String,
    #[schema(example = "Iron Gym")]
    pub name: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantResponse {
    pub id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub subscription_plan_id: Option<String>,
    #[schema(value_type = Option<String>)]
    pub subscription_ends_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<tenants::Model> for TenantResponse {
    fn from(t: tenants::Model) -> Self {
        Self {
            id: t.id,
            name: t.name,
            logo_url: t.logo_url,
            subscription_plan_id: t.subscription_plan_id,
            subscription_ends_on: t.subscription_ends_on,
            created_at: t.created_at,
        }
    }
}
