use crate::entities::{auto_renewal_config_entity as configs, renewal_run_entity as runs};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AutoRenewalConfigResponse {
    pub enabled: bool,
    pub day_of_month: i32,
    pub notify_only: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_run_period: Option<String>,
}

impl From<configs::Model> for AutoRenewalConfigResponse {
    fn from(c: configs::Model) -> Self {
        Self {
            enabled: c.enabled,
            day_of_month: c.day_of_month,
            notify_only: c.notify_only,
            last_run_at: c.last_run_at,
            last_run_period: c.last_run_period,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateAutoRenewalConfigRequest {
    pub enabled: Option<bool>,
    #[schema(example = 1)]
    pub day_of_month: Option<i32>,
    pub notify_only: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenewalRunResponse {
    pub id: String,
    #[schema(example = "2024-02")]
    pub period: String,
    pub notify_only: bool,
    pub due_count: i32,
    pub renewed_count: i32,
    pub failed_count: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<runs::Model> for RenewalRunResponse {
    fn from(r: runs::Model) -> Self {
        Self {
            id: r.id,
            period: r.period,
            notify_only: r.notify_only,
            due_count: r.due_count,
            renewed_count: r.renewed_count,
            failed_count: r.failed_count,
            started_at: r.started_at,
            finished_at: r.finished_at,
        }
    }
}

/// Result of asking the automation to run for one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AutomationOutcome {
    NotDue,
    AlreadyRan { period: String },
    Completed { run: RenewalRunResponse },
}
