use crate::entities::{MemberStatus, member_entity as members};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateMemberRequest {
    #[schema(example = "Ana")]
    pub first_name: String,
    #[schema(example = "García")]
    pub last_name: String,
    #[schema(example = "ana@example.com")]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
}

impl From<members::Model> for MemberResponse {
    fn from(m: members::Model) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            phone: m.phone,
            status: m.status,
            created_at: m.created_at,
        }
    }
}
