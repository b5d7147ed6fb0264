use crate::entities::{
    activity_entity as activities, activity_tier_entity as tiers,
    membership_plan_entity as plans,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TierInput {
    #[schema(example = "Monthly")]
    pub name: String,
    #[schema(example = 1000)]
    pub cost: i64,
    #[serde(default = "default_duration")]
    pub duration_months: i32,
}

fn default_duration() -> i32 {
    1
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateActivityRequest {
    #[schema(example = "CrossFit")]
    pub name: String,
    /// Ordered; the first tier is the activity's current price.
    #[serde(default)]
    pub tiers: Vec<TierInput>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TierResponse {
    pub id: String,
    pub position: i32,
    pub name: String,
    pub cost: i64,
    pub duration_months: i32,
}

impl From<tiers::Model> for TierResponse {
    fn from(t: tiers::Model) -> Self {
        Self {
            id: t.id,
            position: t.position,
            name: t.name,
            cost: t.cost,
            duration_months: t.duration_months,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivityResponse {
    pub id: String,
    pub name: String,
    pub tiers: Vec<TierResponse>,
}

impl ActivityResponse {
    pub fn new(activity: activities::Model, tiers: Vec<tiers::Model>) -> Self {
        Self {
            id: activity.id,
            name: activity.name,
            tiers: tiers.into_iter().map(TierResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateMembershipPlanRequest {
    pub activity_id: String,
    #[schema(example = "Quarterly")]
    pub name: String,
    #[schema(example = 2700)]
    pub cost: i64,
    #[schema(example = 3)]
    pub duration_months: i32,
    pub max_attendances: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MembershipPlanResponse {
    pub id: String,
    pub activity_id: String,
    pub name: String,
    pub cost: i64,
    pub duration_months: i32,
    pub max_attendances: Option<i32>,
}

impl From<plans::Model> for MembershipPlanResponse {
    fn from(p: plans::Model) -> Self {
        Self {
            id: p.id,
            activity_id: p.activity_id,
            name: p.name,
            cost: p.cost,
            duration_months: p.duration_months,
            max_attendances: p.max_attendances,
        }
    }
}
