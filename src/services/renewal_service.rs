use crate::config::RenewalConfig;
use crate::entities::{
    MembershipStatus, PaymentStatus, PaymentType, PendingPaymentStatus, PriceSource,
    RenewalTrigger, activity_tier_entity as tiers, membership_entity as memberships,
    membership_plan_entity as plans, pending_payment_entity as payments,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::dates::add_months;
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

pub const MAX_RENEWAL_MONTHS: u32 = 24;

#[derive(Clone)]
pub struct RenewalService {
    pool: DatabaseConnection,
    config: RenewalConfig,
}

impl RenewalService {
    pub fn new(pool: DatabaseConnection, config: RenewalConfig) -> Self {
        Self { pool, config }
    }

    /// 续费价格：活动当前档位 → 会员方案 → 原价
    pub async fn resolve_price(&self, membership: &memberships::Model) -> (i64, PriceSource) {
        match self.current_tier_cost(&membership.activity_id).await {
            Ok(Some(cost)) if cost > 0 => return (cost, PriceSource::ActivityTier),
            Ok(_) => {}
            Err(e) => log::warn!(
                "Tier lookup failed for activity {}: {e:?}",
                membership.activity_id
            ),
        }

        if let Some(plan_id) = membership.membership_plan_id.as_deref() {
            match plans::Entity::find_by_id(plan_id.to_string())
                .one(&self.pool)
                .await
            {
                Ok(Some(plan)) if plan.cost > 0 => return (plan.cost, PriceSource::MembershipPlan),
                Ok(_) => {}
                Err(e) => log::warn!("Plan lookup failed for {plan_id}: {e:?}"),
            }
        }

        log::debug!(
            "Falling back to previous cost {} for membership {}",
            membership.cost,
            membership.id
        );
        (membership.cost, PriceSource::PreviousCost)
    }

    async fn current_tier_cost(&self, activity_id: &str) -> AppResult<Option<i64>> {
        let tier = tiers::Entity::find()
            .filter(tiers::Column::ActivityId.eq(activity_id))
            .order_by_asc(tiers::Column::Position)
            .one(&self.pool)
            .await?;
        Ok(tier.map(|t| t.cost))
    }

    /// 续费：从 `today` 起新建会员卡，旧记录标记为 `renewed` 并双向关联；
    /// 待付款记录尽力写入，失败不影响续费
    pub async fn renew(
        &self,
        tenant_id: &str,
        membership_id: &str,
        months: u32,
        trigger: RenewalTrigger,
        today: NaiveDate,
    ) -> AppResult<RenewedMembership> {
        if !(1..=MAX_RENEWAL_MONTHS).contains(&months) {
            return Err(AppError::ValidationError(format!(
                "months must be between 1 and {MAX_RENEWAL_MONTHS}"
            )));
        }

        let old = memberships::Entity::find_by_id(membership_id.to_string())
            .filter(memberships::Column::TenantId.eq(tenant_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership not found".into()))?;

        match old.status {
            MembershipStatus::Cancelled => {
                return Err(AppError::ValidationError(
                    "Cancelled memberships cannot be renewed".into(),
                ));
            }
            MembershipStatus::Renewed => {
                return Err(AppError::Conflict("Membership already renewed".into()));
            }
            MembershipStatus::Active | MembershipStatus::Expired => {}
        }

        let (cost, price_source) = self.resolve_price(&old).await;
        let end_date = add_months(today, months)?;
        let now = Utc::now();
        let new_id = Uuid::new_v4().to_string();

        let txn = self.pool.begin().await?;

        let created = memberships::ActiveModel {
            id: Set(new_id.clone()),
            tenant_id: Set(old.tenant_id.clone()),
            member_id: Set(old.member_id.clone()),
            member_name: Set(old.member_name.clone()),
            activity_id: Set(old.activity_id.clone()),
            activity_name: Set(old.activity_name.clone()),
            membership_plan_id: Set(old.membership_plan_id.clone()),
            cost: Set(cost),
            start_date: Set(today),
            end_date: Set(end_date),
            status: Set(MembershipStatus::Active),
            payment_status: Set(PaymentStatus::Pending),
            auto_renewal: Set(old.auto_renewal),
            max_attendances: Set(old.max_attendances),
            current_attendances: Set(0),
            previous_membership_id: Set(Some(old.id.clone())),
            renewed_to_id: Set(None),
            price_source: Set(Some(price_source)),
            renewal_trigger: Set(Some(trigger)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        // 条件更新：并发续费时只有一方能成功
        let res = memberships::Entity::update_many()
            .set(memberships::ActiveModel {
                status: Set(MembershipStatus::Renewed),
                renewed_to_id: Set(Some(new_id.clone())),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(memberships::Column::Id.eq(old.id.as_str()))
            .filter(
                memberships::Column::Status
                    .is_not_in([MembershipStatus::Renewed, MembershipStatus::Cancelled]),
            )
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AppError::Conflict("Membership already renewed".into()));
        }

        let pending_payment_id = self.record_pending_payment(&txn, &created).await;

        txn.commit().await?;

        log::info!(
            "Renewed membership {} -> {} ({trigger}, {months} months, cost {cost} from {price_source})",
            old.id,
            created.id
        );

        Ok(RenewedMembership {
            previous_membership_id: old.id,
            membership: MembershipResponse::from(created),
            price_source,
            pending_payment_id,
        })
    }

    // 待付款记录放在保存点里，失败只回滚保存点，不影响续费本身
    async fn record_pending_payment(
        &self,
        txn: &DatabaseTransaction,
        membership: &memberships::Model,
    ) -> Option<String> {
        let result: AppResult<String> = async {
            let savepoint = txn.begin().await?;
            let payment = payments::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                tenant_id: Set(membership.tenant_id.clone()),
                membership_id: Set(membership.id.clone()),
                member_id: Set(membership.member_id.clone()),
                amount: Set(membership.cost),
                status: Set(PendingPaymentStatus::Pending),
                due_date: Set(membership.start_date + Duration::days(self.config.payment_due_days)),
                payment_type: Set(PaymentType::MembershipRenewal),
                proof_url: Set(None),
                paid_at: Set(None),
                created_at: Set(Utc::now()),
            }
            .insert(&savepoint)
            .await;
            match payment {
                Ok(p) => {
                    savepoint.commit().await?;
                    Ok(p.id)
                }
                Err(e) => {
                    savepoint.rollback().await?;
                    Err(e.into())
                }
            }
        }
        .await;

        match result {
            Ok(id) => Some(id),
            Err(e) => {
                log::error!(
                    "Failed to record pending payment for membership {}: {e:?}",
                    membership.id
                );
                None
            }
        }
    }

    /// 不返回错误，失败信息放入结果中
    pub async fn process_renewal(
        &self,
        tenant_id: &str,
        membership_id: &str,
        months: u32,
        trigger: RenewalTrigger,
        today: NaiveDate,
    ) -> RenewalResult {
        match self
            .renew(tenant_id, membership_id, months, trigger, today)
            .await
        {
            Ok(renewed) => RenewalResult::ok(&renewed),
            Err(e) => {
                log::warn!("Renewal of {membership_id} failed: {e}");
                RenewalResult::failed(e.code(), e.public_message())
            }
        }
    }

    pub async fn renew_many(
        &self,
        tenant_id: &str,
        membership_ids: &[String],
        months: u32,
        today: NaiveDate,
    ) -> BulkRenewalSummary {
        let mut summary = BulkRenewalSummary::default();
        for id in membership_ids {
            let result = self
                .process_renewal(tenant_id, id, months, RenewalTrigger::Bulk, today)
                .await;
            match result.new_membership_id {
                Some(new_id) if result.success => {
                    summary.success_count += 1;
                    summary.renewed_ids.push(new_id);
                }
                _ => {
                    summary.error_count += 1;
                    summary.failures.push(RenewalFailure {
                        membership_id: id.clone(),
                        error: result.error.unwrap_or_default(),
                    });
                }
            }
        }
        log::info!(
            "Bulk renewal for tenant {tenant_id}: {} ok, {} failed",
            summary.success_count,
            summary.error_count
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::*;

    async fn reload(db: &DatabaseConnection, id: &str) -> memberships::Model {
        memberships::Entity::find_by_id(id.to_string())
            .one(db)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_renew_links_records_and_uses_tier_price() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let crossfit = seed_activity(&db, "iron-gym", "CrossFit").await;
        seed_tier(&db, &crossfit.id, 2, 1500).await;
        seed_tier(&db, &crossfit.id, 1, 1200).await;
        let old = seed_membership(
            &db,
            MembershipSeed {
                auto_renewal: true,
                ..membership_seed("iron-gym", &ana, &crossfit, "2024-01-01", MembershipStatus::Expired)
            },
        )
        .await;

        let svc = RenewalService::new(db.clone(), RenewalConfig::default());
        let renewed = svc
            .renew("iron-gym", &old.id, 1, RenewalTrigger::Manual, date("2024-02-15"))
            .await
            .unwrap();

        assert_eq!(renewed.price_source, PriceSource::ActivityTier);
        assert_eq!(renewed.previous_membership_id, old.id);

        let new = reload(&db, &renewed.membership.id).await;
        assert_eq!(new.start_date, date("2024-02-15"));
        assert_eq!(new.end_date, date("2024-03-15"));
        assert_eq!(new.cost, 1200);
        assert_eq!(new.status, MembershipStatus::Active);
        assert_eq!(new.payment_status, PaymentStatus::Pending);
        assert_eq!(new.current_attendances, 0);
        assert_eq!(new.max_attendances, Some(12));
        assert!(new.auto_renewal);
        assert_eq!(new.previous_membership_id.as_deref(), Some(old.id.as_str()));
        assert_eq!(new.price_source, Some(PriceSource::ActivityTier));
        assert_eq!(new.renewal_trigger, Some(RenewalTrigger::Manual));

        let old = reload(&db, &old.id).await;
        assert_eq!(old.status, MembershipStatus::Renewed);
        assert_eq!(old.renewed_to_id.as_deref(), Some(new.id.as_str()));

        let payment_id = renewed.pending_payment_id.unwrap();
        let payment = payments::Entity::find_by_id(payment_id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payment.amount, 1200);
        assert_eq!(payment.membership_id, new.id);
        assert_eq!(payment.status, PendingPaymentStatus::Pending);
        assert_eq!(payment.due_date, date("2024-02-22"));
    }

    #[tokio::test]
    async fn test_price_falls_back_to_plan_then_previous_cost() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let yoga = seed_activity(&db, "iron-gym", "Yoga").await;
        let swim = seed_activity(&db, "iron-gym", "Swim").await;
        let plan = seed_plan(&db, "iron-gym", &yoga.id, 900).await;
        // 档位价格为 0 时不采用
        seed_tier(&db, &swim.id, 1, 0).await;

        let with_plan = seed_membership(
            &db,
            MembershipSeed {
                plan_id: Some(plan.id.clone()),
                ..membership_seed("iron-gym", &ana, &yoga, "2024-01-01", MembershipStatus::Expired)
            },
        )
        .await;
        let bare = seed_membership(
            &db,
            MembershipSeed {
                cost: 700,
                ..membership_seed("iron-gym", &ana, &swim, "2024-01-01", MembershipStatus::Expired)
            },
        )
        .await;

        let svc = RenewalService::new(db.clone(), RenewalConfig::default());
        assert_eq!(
            svc.resolve_price(&with_plan).await,
            (900, PriceSource::MembershipPlan)
        );
        assert_eq!(svc.resolve_price(&bare).await, (700, PriceSource::PreviousCost));

        let renewed = svc
            .renew("iron-gym", &bare.id, 3, RenewalTrigger::Manual, date("2024-01-31"))
            .await
            .unwrap();
        assert_eq!(renewed.membership.cost, 700);
        assert_eq!(renewed.membership.end_date, date("2024-04-30"));
    }

    #[tokio::test]
    async fn test_second_renewal_conflicts() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let crossfit = seed_activity(&db, "iron-gym", "CrossFit").await;
        let old = seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &crossfit, "2024-01-01", MembershipStatus::Active),
        )
        .await;

        let svc = RenewalService::new(db.clone(), RenewalConfig::default());
        let today = date("2024-02-15");
        svc.renew("iron-gym", &old.id, 1, RenewalTrigger::Manual, today)
            .await
            .unwrap();

        let err = svc
            .renew("iron-gym", &old.id, 1, RenewalTrigger::Manual, today)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let chain = memberships::Entity::find()
            .filter(memberships::Column::MemberId.eq(ana.id.as_str()))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(chain.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_renewals_only_one_wins() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let crossfit = seed_activity(&db, "iron-gym", "CrossFit").await;
        let old = seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &crossfit, "2024-01-01", MembershipStatus::Active),
        )
        .await;

        let svc = RenewalService::new(db.clone(), RenewalConfig::default());
        let today = date("2024-02-15");
        // 两次读取都看到 active，由条件更新决定谁成功
        let (a, b) = tokio::join!(
            svc.renew("iron-gym", &old.id, 1, RenewalTrigger::Manual, today),
            svc.renew("iron-gym", &old.id, 1, RenewalTrigger::Bulk, today),
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(AppError::Conflict(_))))
                .count(),
            1
        );

        let rows = memberships::Entity::find()
            .filter(memberships::Column::MemberId.eq(ana.id.as_str()))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows.iter()
                .filter(|m| m.status == MembershipStatus::Active)
                .count(),
            1
        );

        let pending = payments::Entity::find().all(&db).await.unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn test_renewal_commits_when_pending_payment_fails() {
        use sea_orm::ConnectionTrait;

        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let crossfit = seed_activity(&db, "iron-gym", "CrossFit").await;
        let old = seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &crossfit, "2024-01-01", MembershipStatus::Expired),
        )
        .await;

        db.execute_unprepared("DROP TABLE pending_payments")
            .await
            .unwrap();

        let svc = RenewalService::new(db.clone(), RenewalConfig::default());
        let renewed = svc
            .renew("iron-gym", &old.id, 1, RenewalTrigger::Manual, date("2024-02-15"))
            .await
            .unwrap();
        assert!(renewed.pending_payment_id.is_none());

        let new = reload(&db, &renewed.membership.id).await;
        assert_eq!(new.status, MembershipStatus::Active);
        assert_eq!(new.payment_status, PaymentStatus::Pending);

        let old = reload(&db, &old.id).await;
        assert_eq!(old.status, MembershipStatus::Renewed);
        assert_eq!(old.renewed_to_id.as_deref(), Some(new.id.as_str()));
    }

    #[tokio::test]
    async fn test_renew_rejects_invalid_input() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        seed_tenant(&db, "other-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let crossfit = seed_activity(&db, "iron-gym", "CrossFit").await;
        let cancelled = seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &crossfit, "2024-01-01", MembershipStatus::Cancelled),
        )
        .await;

        let svc = RenewalService::new(db.clone(), RenewalConfig::default());
        let today = date("2024-02-15");

        let err = svc
            .renew("iron-gym", &cancelled.id, 0, RenewalTrigger::Manual, today)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = svc
            .renew("iron-gym", &cancelled.id, 1, RenewalTrigger::Manual, today)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        // 跨租户视为不存在
        let err = svc
            .renew("other-gym", &cancelled.id, 1, RenewalTrigger::Manual, today)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let result = svc
            .process_renewal("iron-gym", "missing", 1, RenewalTrigger::Manual, today)
            .await;
        assert!(!result.success);
        assert_eq!(result.error_code.as_deref(), Some("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_renew_many_continues_past_failures() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let crossfit = seed_activity(&db, "iron-gym", "CrossFit").await;
        let yoga = seed_activity(&db, "iron-gym", "Yoga").await;
        let a = seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &crossfit, "2024-01-01", MembershipStatus::Expired),
        )
        .await;
        let b = seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &yoga, "2024-02-01", MembershipStatus::Active),
        )
        .await;

        let svc = RenewalService::new(db.clone(), RenewalConfig::default());
        let ids = vec![a.id.clone(), "missing".to_string(), b.id.clone()];
        let summary = svc.renew_many("iron-gym", &ids, 1, date("2024-02-15")).await;

        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.renewed_ids.len(), 2);
        assert_eq!(summary.failures[0].membership_id, "missing");

        let renewed = reload(&db, &summary.renewed_ids[0]).await;
        assert_eq!(renewed.renewal_trigger, Some(RenewalTrigger::Bulk));
    }
}
