//! Fixtures for store-backed tests: an in-memory SQLite database migrated with
//! the production migrations, plus helpers to seed tenants and catalog rows.

use crate::config::DatabaseConfig;
use crate::database::{DbPool, create_pool, run_migrations};
use crate::entities::{
    MemberStatus, MembershipStatus, PaymentStatus, activity_entity as activities,
    activity_tier_entity as tiers, member_entity as members, membership_entity as memberships,
    membership_plan_entity as plans, tenant_entity as tenants,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

pub async fn setup_db() -> DbPool {
    // 内存库：单连接，否则每个连接各自一份数据库
    let pool = create_pool(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    })
    .await
    .expect("connect sqlite");
    run_migrations(&pool).await.expect("migrate sqlite");
    pool
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

pub async fn seed_tenant(db: &DbPool, id: &str) -> tenants::Model {
    tenants::ActiveModel {
        id: Set(id.to_string()),
        name: Set(format!("{id} gym")),
        logo_url: Set(None),
        subscription_plan_id: Set(None),
        subscription_ends_on: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("insert tenant")
}

pub async fn seed_member(db: &DbPool, tenant_id: &str, first: &str, last: &str) -> members::Model {
    members::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        tenant_id: Set(tenant_id.to_string()),
        first_name: Set(first.to_string()),
        last_name: Set(last.to_string()),
        email: Set(None),
        phone: Set(None),
        status: Set(MemberStatus::Active),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("insert member")
}

pub async fn seed_activity(db: &DbPool, tenant_id: &str, name: &str) -> activities::Model {
    activities::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        tenant_id: Set(tenant_id.to_string()),
        name: Set(name.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("insert activity")
}

pub async fn seed_tier(db: &DbPool, activity_id: &str, position: i32, cost: i64) -> tiers::Model {
    tiers::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        activity_id: Set(activity_id.to_string()),
        position: Set(position),
        name: Set(format!("tier {position}")),
        cost: Set(cost),
        duration_months: Set(1),
    }
    .insert(db)
    .await
    .expect("insert tier")
}

pub async fn seed_plan(
    db: &DbPool,
    tenant_id: &str,
    activity_id: &str,
    cost: i64,
) -> plans::Model {
    plans::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        tenant_id: Set(tenant_id.to_string()),
        activity_id: Set(activity_id.to_string()),
        name: Set("Monthly".to_string()),
        cost: Set(cost),
        duration_months: Set(1),
        max_attendances: Set(Some(12)),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("insert plan")
}

pub struct MembershipSeed<'a> {
    pub tenant_id: &'a str,
    pub member: &'a members::Model,
    pub activity: &'a activities::Model,
    pub plan_id: Option<String>,
    pub cost: i64,
    pub start: &'a str,
    pub end: &'a str,
    pub status: MembershipStatus,
    pub payment_status: PaymentStatus,
    pub auto_renewal: bool,
}

pub async fn seed_membership(db: &DbPool, seed: MembershipSeed<'_>) -> memberships::Model {
    let now = Utc::now();
    memberships::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        tenant_id: Set(seed.tenant_id.to_string()),
        member_id: Set(seed.member.id.clone()),
        member_name: Set(seed.member.full_name()),
        activity_id: Set(seed.activity.id.clone()),
        activity_name: Set(seed.activity.name.clone()),
        membership_plan_id: Set(seed.plan_id),
        cost: Set(seed.cost),
        start_date: Set(date(seed.start)),
        end_date: Set(date(seed.end)),
        status: Set(seed.status),
        payment_status: Set(seed.payment_status),
        auto_renewal: Set(seed.auto_renewal),
        max_attendances: Set(Some(12)),
        current_attendances: Set(5),
        previous_membership_id: Set(None),
        renewed_to_id: Set(None),
        price_source: Set(None),
        renewal_trigger: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert membership")
}

/// Paid, manually renewed, 1000 per month, started 2023-12-01.
pub fn membership_seed<'a>(
    tenant_id: &'a str,
    member: &'a members::Model,
    activity: &'a activities::Model,
    end: &'a str,
    status: MembershipStatus,
) -> MembershipSeed<'a> {
    MembershipSeed {
        tenant_id,
        member,
        activity,
        plan_id: None,
        cost: 1000,
        start: "2023-12-01",
        end,
        status,
        payment_status: PaymentStatus::Paid,
        auto_renewal: false,
    }
}
