use crate::config::RenewalConfig;
use crate::entities::{
    MembershipStatus, PendingPaymentStatus, membership_entity as memberships,
    pending_payment_entity as payments,
};
use crate::error::AppResult;
use crate::models::*;
use crate::utils::dates::{approximate_debt, days_expired};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

/// 计算过期信息：`end_date` 早于 `today` 且未取消才算过期
pub fn assess_expiration(m: memberships::Model, today: NaiveDate) -> Option<ExpiredMembership> {
    if m.end_date >= today || m.status == MembershipStatus::Cancelled {
        return None;
    }
    let days = days_expired(m.end_date, today);
    let total_debt = approximate_debt(m.cost, days);
    Some(ExpiredMembership {
        membership: MembershipResponse::from(m),
        days_expired: days,
        total_debt,
    })
}

#[derive(Clone)]
pub struct ExpirationService {
    pool: DatabaseConnection,
    config: RenewalConfig,
}

impl ExpirationService {
    pub fn new(pool: DatabaseConnection, config: RenewalConfig) -> Self {
        Self { pool, config }
    }

    /// 扫描租户下所有已过期（且未取消）的会员卡，按到期日升序
    pub async fn scan_expired(
        &self,
        tenant_id: &str,
        today: NaiveDate,
    ) -> AppResult<Vec<ExpiredMembership>> {
        let rows = memberships::Entity::find()
            .filter(memberships::Column::TenantId.eq(tenant_id))
            .filter(memberships::Column::EndDate.lt(today))
            .filter(memberships::Column::Status.ne(MembershipStatus::Cancelled))
            .order_by_asc(memberships::Column::EndDate)
            .all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|m| assess_expiration(m, today))
            .collect())
    }

    /// 将所有租户中已过期的 active 会员卡改为 `expired`，返回更新行数
    pub async fn expire_overdue(&self, today: NaiveDate) -> AppResult<u64> {
        let res = memberships::Entity::update_many()
            .set(memberships::ActiveModel {
                status: Set(MembershipStatus::Expired),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(memberships::Column::Status.eq(MembershipStatus::Active))
            .filter(memberships::Column::EndDate.lt(today))
            .exec(&self.pool)
            .await?;
        Ok(res.rows_affected)
    }

    /// 看板统计。已续费（`renewed`）的记录不计入过期数量和欠款总额
    pub async fn renewal_stats(&self, tenant_id: &str, today: NaiveDate) -> AppResult<RenewalStats> {
        let active = memberships::Entity::find()
            .filter(memberships::Column::TenantId.eq(tenant_id))
            .filter(memberships::Column::Status.eq(MembershipStatus::Active))
            .filter(memberships::Column::EndDate.gte(today))
            .count(&self.pool)
            .await?;

        let soon = today + Duration::days(self.config.expiring_soon_days);
        let expiring_soon = memberships::Entity::find()
            .filter(memberships::Column::TenantId.eq(tenant_id))
            .filter(memberships::Column::Status.eq(MembershipStatus::Active))
            .filter(memberships::Column::EndDate.between(today, soon))
            .count(&self.pool)
            .await?;

        let auto_renewal_enabled = memberships::Entity::find()
            .filter(memberships::Column::TenantId.eq(tenant_id))
            .filter(memberships::Column::AutoRenewal.eq(true))
            .filter(
                memberships::Column::Status
                    .is_in([MembershipStatus::Active, MembershipStatus::Expired]),
            )
            .count(&self.pool)
            .await?;

        let outstanding: Vec<ExpiredMembership> = self
            .scan_expired(tenant_id, today)
            .await?
            .into_iter()
            .filter(|e| e.membership.status != MembershipStatus::Renewed)
            .collect();
        let total_debt = outstanding
            .iter()
            .fold(0i64, |acc, e| acc.saturating_add(e.total_debt));

        let pending = payments::Entity::find()
            .filter(payments::Column::TenantId.eq(tenant_id))
            .filter(payments::Column::Status.eq(PendingPaymentStatus::Pending))
            .all(&self.pool)
            .await?;

        Ok(RenewalStats {
            active,
            expired: outstanding.len() as u64,
            expiring_soon,
            auto_renewal_enabled,
            pending_payments: pending.len() as u64,
            pending_amount: pending
                .iter()
                .fold(0i64, |acc, p| acc.saturating_add(p.amount)),
            total_debt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::*;
    use crate::entities::PaymentStatus;

    #[test]
    fn test_assess_expiration_example() {
        let now = Utc::now();
        let m = memberships::Model {
            id: "m-1".into(),
            tenant_id: "iron-gym".into(),
            member_id: "u-1".into(),
            member_name: "Ana García".into(),
            activity_id: "a-1".into(),
            activity_name: "CrossFit".into(),
            membership_plan_id: None,
            cost: 1000,
            start_date: date("2023-12-01"),
            end_date: date("2024-01-01"),
            status: MembershipStatus::Active,
            payment_status: PaymentStatus::Paid,
            auto_renewal: false,
            max_attendances: None,
            current_attendances: 0,
            previous_membership_id: None,
            renewed_to_id: None,
            price_source: None,
            renewal_trigger: None,
            created_at: now,
            updated_at: now,
        };

        let expired = assess_expiration(m.clone(), date("2024-02-15")).unwrap();
        assert_eq!(expired.days_expired, 45);
        assert_eq!(expired.total_debt, 2000);

        // 到期当天不算过期
        assert!(assess_expiration(m.clone(), date("2024-01-01")).is_none());

        let cancelled = memberships::Model {
            status: MembershipStatus::Cancelled,
            ..m
        };
        assert!(assess_expiration(cancelled, date("2024-02-15")).is_none());
    }

    #[tokio::test]
    async fn test_scan_expired_filters_and_orders() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        seed_tenant(&db, "other-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let crossfit = seed_activity(&db, "iron-gym", "CrossFit").await;
        let yoga = seed_activity(&db, "iron-gym", "Yoga").await;
        let swim = seed_activity(&db, "iron-gym", "Swim").await;
        let boxing = seed_activity(&db, "iron-gym", "Boxing").await;

        let late = seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &crossfit, "2024-01-01", MembershipStatus::Active),
        )
        .await;
        let later = seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &yoga, "2024-02-10", MembershipStatus::Expired),
        )
        .await;
        seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &swim, "2024-01-05", MembershipStatus::Cancelled),
        )
        .await;
        seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &boxing, "2024-03-01", MembershipStatus::Active),
        )
        .await;
        // 已续费的旧记录仍出现在扫描结果中
        let superseded = seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &crossfit, "2024-01-20", MembershipStatus::Renewed),
        )
        .await;

        // 其他租户的数据不应出现
        let bob = seed_member(&db, "other-gym", "Bob", "Stone").await;
        let other = seed_activity(&db, "other-gym", "Pilates").await;
        seed_membership(
            &db,
            membership_seed("other-gym", &bob, &other, "2024-01-01", MembershipStatus::Active),
        )
        .await;

        let svc = ExpirationService::new(db.clone(), RenewalConfig::default());
        let expired = svc.scan_expired("iron-gym", date("2024-02-15")).await.unwrap();

        let ids: Vec<&str> = expired.iter().map(|e| e.membership.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![late.id.as_str(), superseded.id.as_str(), later.id.as_str()]
        );
        assert_eq!(expired[0].days_expired, 45);
        assert_eq!(expired[0].total_debt, 2000);
        assert_eq!(expired[1].membership.status, MembershipStatus::Renewed);
        assert_eq!(expired[1].days_expired, 26);
        assert_eq!(expired[2].days_expired, 5);
        assert_eq!(expired[2].total_debt, 1000);
    }

    #[tokio::test]
    async fn test_expire_overdue_and_stats() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let crossfit = seed_activity(&db, "iron-gym", "CrossFit").await;
        let yoga = seed_activity(&db, "iron-gym", "Yoga").await;

        let overdue = seed_membership(
            &db,
            MembershipSeed {
                auto_renewal: true,
                ..membership_seed("iron-gym", &ana, &crossfit, "2024-01-01", MembershipStatus::Active)
            },
        )
        .await;
        seed_membership(
            &db,
            MembershipSeed {
                cost: 800,
                start: "2024-02-01",
                ..membership_seed("iron-gym", &ana, &yoga, "2024-02-20", MembershipStatus::Active)
            },
        )
        .await;

        // 已续费的记录不计入过期数量与欠款
        seed_membership(
            &db,
            MembershipSeed {
                cost: 5000,
                ..membership_seed("iron-gym", &ana, &crossfit, "2023-12-01", MembershipStatus::Renewed)
            },
        )
        .await;

        let svc = ExpirationService::new(db.clone(), RenewalConfig::default());
        let changed = svc.expire_overdue(date("2024-02-15")).await.unwrap();
        assert_eq!(changed, 1);

        let reloaded = memberships::Entity::find_by_id(overdue.id.clone())
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.status, MembershipStatus::Expired);

        let stats = svc.renewal_stats("iron-gym", date("2024-02-15")).await.unwrap();
        assert_eq!(stats.active, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.expiring_soon, 1);
        assert_eq!(stats.auto_renewal_enabled, 1);
        assert_eq!(stats.total_debt, 2000);
        assert_eq!(stats.pending_payments, 0);

        let scanned = svc.scan_expired("iron-gym", date("2024-02-15")).await.unwrap();
        assert_eq!(scanned.len(), 2);
    }

    #[tokio::test]
    async fn test_stats_debt_saturates_for_huge_costs() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let crossfit = seed_activity(&db, "iron-gym", "CrossFit").await;
        let yoga = seed_activity(&db, "iron-gym", "Yoga").await;
        for activity in [&crossfit, &yoga] {
            seed_membership(
                &db,
                MembershipSeed {
                    cost: i64::MAX / 2,
                    ..membership_seed("iron-gym", &ana, activity, "2024-01-01", MembershipStatus::Expired)
                },
            )
            .await;
        }

        let svc = ExpirationService::new(db.clone(), RenewalConfig::default());
        let stats = svc.renewal_stats("iron-gym", date("2024-02-15")).await.unwrap();
        assert_eq!(stats.expired, 2);
        assert_eq!(stats.total_debt, i64::MAX);
    }
}
