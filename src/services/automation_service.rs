use crate::config::RenewalConfig;
use crate::entities::{
    MembershipStatus, RenewalTrigger, auto_renewal_config_entity as configs,
    membership_entity as memberships, renewal_run_entity as runs, tenant_entity as tenants,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::RenewalService;
use crate::utils::dates::{day_of_month, month_key};
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

/// 今天是否允许执行月度续费：配置日起的若干天内（服务宕机时可补跑）
pub fn is_due(config: &configs::Model, today: NaiveDate, window_days: i32) -> bool {
    let day = day_of_month(today);
    config.enabled && day >= config.day_of_month && day < config.day_of_month + window_days
}

#[derive(Clone)]
pub struct AutomationService {
    pool: DatabaseConnection,
    renewal_service: RenewalService,
    config: RenewalConfig,
}

impl AutomationService {
    pub fn new(
        pool: DatabaseConnection,
        renewal_service: RenewalService,
        config: RenewalConfig,
    ) -> Self {
        Self {
            pool,
            renewal_service,
            config,
        }
    }

    fn default_config(&self, tenant_id: &str) -> configs::Model {
        configs::Model {
            tenant_id: tenant_id.to_string(),
            enabled: true,
            day_of_month: self.config.default_run_day,
            notify_only: false,
            last_run_at: None,
            last_run_period: None,
            updated_at: Utc::now(),
        }
    }

    /// 未配置的租户使用默认配置（每月 1 号自动续费）
    pub async fn get_config(&self, tenant_id: &str) -> AppResult<configs::Model> {
        let stored = configs::Entity::find_by_id(tenant_id.to_string())
            .one(&self.pool)
            .await?;
        Ok(stored.unwrap_or_else(|| self.default_config(tenant_id)))
    }

    pub async fn update_config(
        &self,
        tenant_id: &str,
        req: UpdateAutoRenewalConfigRequest,
    ) -> AppResult<configs::Model> {
        if let Some(day) = req.day_of_month
            && !(1..=28).contains(&day)
        {
            return Err(AppError::ValidationError(
                "day_of_month must be between 1 and 28".into(),
            ));
        }

        let existing = configs::Entity::find_by_id(tenant_id.to_string())
            .one(&self.pool)
            .await?;
        let now = Utc::now();

        let saved = match existing {
            Some(current) => {
                let mut am = current.into_active_model();
                if let Some(enabled) = req.enabled {
                    am.enabled = Set(enabled);
                }
                if let Some(day) = req.day_of_month {
                    am.day_of_month = Set(day);
                }
                if let Some(notify_only) = req.notify_only {
                    am.notify_only = Set(notify_only);
                }
                am.updated_at = Set(now);
                am.update(&self.pool).await?
            }
            None => {
                let base = self.default_config(tenant_id);
                configs::ActiveModel {
                    tenant_id: Set(base.tenant_id),
                    enabled: Set(req.enabled.unwrap_or(base.enabled)),
                    day_of_month: Set(req.day_of_month.unwrap_or(base.day_of_month)),
                    notify_only: Set(req.notify_only.unwrap_or(base.notify_only)),
                    last_run_at: Set(None),
                    last_run_period: Set(None),
                    updated_at: Set(now),
                }
                .insert(&self.pool)
                .await?
            }
        };

        log::info!(
            "Auto-renewal config for {tenant_id}: enabled={}, day={}, notify_only={}",
            saved.enabled,
            saved.day_of_month,
            saved.notify_only
        );
        Ok(saved)
    }

    /// 占用本月的执行标记，返回 `None` 表示本月已执行过
    async fn claim_period(
        &self,
        tenant_id: &str,
        period: &str,
        notify_only: bool,
    ) -> AppResult<Option<runs::Model>> {
        let run = runs::Model {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            period: period.to_string(),
            notify_only,
            due_count: 0,
            renewed_count: 0,
            failed_count: 0,
            started_at: Utc::now(),
            finished_at: None,
        };

        // 唯一索引 (tenant_id, period)：冲突即本月已执行
        let inserted = runs::Entity::insert(run.clone().into_active_model())
            .on_conflict(
                OnConflict::columns([runs::Column::TenantId, runs::Column::Period])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;

        Ok((inserted > 0).then_some(run))
    }

    async fn due_memberships(
        &self,
        tenant_id: &str,
        today: NaiveDate,
    ) -> AppResult<Vec<memberships::Model>> {
        let due = memberships::Entity::find()
            .filter(memberships::Column::TenantId.eq(tenant_id))
            .filter(memberships::Column::AutoRenewal.eq(true))
            .filter(
                memberships::Column::Status
                    .is_in([MembershipStatus::Active, MembershipStatus::Expired]),
            )
            .filter(memberships::Column::EndDate.lt(today))
            .order_by_asc(memberships::Column::EndDate)
            .all(&self.pool)
            .await?;
        Ok(due)
    }

    /// 为单个租户执行月度自动续费。`force` 跳过日期检查，但仍受每月一次的标记限制
    pub async fn run_for_tenant(
        &self,
        tenant_id: &str,
        today: NaiveDate,
        force: bool,
    ) -> AppResult<AutomationOutcome> {
        let config = self.get_config(tenant_id).await?;
        if !force && !is_due(&config, today, self.config.run_window_days) {
            return Ok(AutomationOutcome::NotDue);
        }

        let period = month_key(today);
        let Some(run) = self
            .claim_period(tenant_id, &period, config.notify_only)
            .await?
        else {
            log::debug!("Automatic renewal for {tenant_id} already ran in {period}");
            return Ok(AutomationOutcome::AlreadyRan { period });
        };

        let due = match self.due_memberships(tenant_id, today).await {
            Ok(due) => due,
            Err(e) => {
                // 查询失败时释放标记，允许稍后重试
                if let Err(release_err) = runs::Entity::delete_by_id(run.id.clone())
                    .exec(&self.pool)
                    .await
                {
                    log::error!("Failed to release run marker {}: {release_err:?}", run.id);
                }
                return Err(e);
            }
        };

        let mut renewed = 0i32;
        let mut failed = 0i32;
        if config.notify_only {
            for m in &due {
                log::info!(
                    "Auto-renewal due (notify only): tenant={tenant_id} membership={} member={} ended {}",
                    m.id,
                    m.member_name,
                    m.end_date
                );
            }
        } else {
            for m in &due {
                let result = self
                    .renewal_service
                    .process_renewal(
                        tenant_id,
                        &m.id,
                        self.config.automatic_months,
                        RenewalTrigger::Automatic,
                        today,
                    )
                    .await;
                if result.success {
                    renewed += 1;
                } else {
                    failed += 1;
                }
            }
        }

        let now = Utc::now();
        let mut am = run.into_active_model();
        am.due_count = Set(due.len() as i32);
        am.renewed_count = Set(renewed);
        am.failed_count = Set(failed);
        am.finished_at = Set(Some(now));
        let finished = am.update(&self.pool).await?;

        self.stamp_config(config, &period, now).await?;

        log::info!(
            "Automatic renewal for {tenant_id} ({period}): due={}, renewed={renewed}, failed={failed}",
            due.len()
        );
        Ok(AutomationOutcome::Completed {
            run: RenewalRunResponse::from(finished),
        })
    }

    async fn stamp_config(
        &self,
        config: configs::Model,
        period: &str,
        now: chrono::DateTime<Utc>,
    ) -> AppResult<()> {
        let stamp = configs::ActiveModel {
            tenant_id: Set(config.tenant_id),
            enabled: Set(config.enabled),
            day_of_month: Set(config.day_of_month),
            notify_only: Set(config.notify_only),
            last_run_at: Set(Some(now)),
            last_run_period: Set(Some(period.to_string())),
            updated_at: Set(now),
        };
        configs::Entity::insert(stamp)
            .on_conflict(
                OnConflict::column(configs::Column::TenantId)
                    .update_columns([
                        configs::Column::LastRunAt,
                        configs::Column::LastRunPeriod,
                        configs::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;
        Ok(())
    }

    /// 后台任务入口：逐个租户执行，失败的租户记录日志后跳过
    pub async fn run_due_tenants(&self, today: NaiveDate) -> AppResult<Vec<RenewalRunResponse>> {
        let tenant_ids: Vec<String> = tenants::Entity::find()
            .order_by_asc(tenants::Column::Id)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        let mut completed = Vec::new();
        for tenant_id in tenant_ids {
            match self.run_for_tenant(&tenant_id, today, false).await {
                Ok(AutomationOutcome::Completed { run }) => completed.push(run),
                Ok(_) => {}
                Err(e) => log::error!("Automatic renewal failed for tenant {tenant_id}: {e:?}"),
            }
        }
        Ok(completed)
    }

    pub async fn list_runs(&self, tenant_id: &str) -> AppResult<Vec<RenewalRunResponse>> {
        let rows = runs::Entity::find()
            .filter(runs::Column::TenantId.eq(tenant_id))
            .order_by_desc(runs::Column::Period)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(RenewalRunResponse::from).collect())
    }
}
