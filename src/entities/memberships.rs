use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "renewed")]
    Renewed,
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MembershipStatus::Active => write!(f, "active"),
            MembershipStatus::Expired => write!(f, "expired"),
            MembershipStatus::Cancelled => write!(f, "cancelled"),
            MembershipStatus::Renewed => write!(f, "renewed"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "partial")]
    Partial,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Partial => write!(f, "partial"),
        }
    }
}

/// Where the cost of a renewed membership came from.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    #[sea_orm(string_value = "activity_tier")]
    ActivityTier,
    #[sea_orm(string_value = "membership_plan")]
    MembershipPlan,
    #[sea_orm(string_value = "previous_cost")]
    PreviousCost,
}

impl std::fmt::Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceSource::ActivityTier => write!(f, "activity_tier"),
            PriceSource::MembershipPlan => write!(f, "membership_plan"),
            PriceSource::PreviousCost => write!(f, "previous_cost"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum RenewalTrigger {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "bulk")]
    Bulk,
    #[sea_orm(string_value = "automatic")]
    Automatic,
}

impl std::fmt::Display for RenewalTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenewalTrigger::Manual => write!(f, "manual"),
            RenewalTrigger::Bulk => write!(f, "bulk"),
            RenewalTrigger::Automatic => write!(f, "automatic"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "memberships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub tenant_id: String,
    pub member_id: String,
    pub member_name: String,
    pub activity_id: String,
    pub activity_name: String,
    pub membership_plan_id: Option<String>,
    pub cost: i64,
    pub start_date: NaiveDate,
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
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
