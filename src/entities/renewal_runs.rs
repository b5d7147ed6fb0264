use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// One row per tenant per month; the unique `(tenant_id, period)` index is the
/// marker that keeps the automatic pass from running twice.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "renewal_runs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub tenant_id: String,
    pub period: String,
    pub notify_only: bool,
    pub due_count: i32,
    pub renewed_count: i32,
    pub failed_count: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
