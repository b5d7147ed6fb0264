use crate::entities::{
    activity_entity as activities, activity_tier_entity as tiers,
    membership_plan_entity as plans,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::validation::require_non_empty;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct CatalogService {
    pool: DatabaseConnection,
}

impl CatalogService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 创建活动及其有序价格档位
    pub async fn create_activity(
        &self,
        tenant_id: &str,
        req: CreateActivityRequest,
    ) -> AppResult<ActivityResponse> {
        require_non_empty("name", &req.name)?;
        if req.tiers.iter().any(|t| t.cost < 0 || t.duration_months < 1) {
            return Err(AppError::ValidationError(
                "Tier cost must be >= 0 and duration at least one month".into(),
            ));
        }

        let txn = self.pool.begin().await?;
        let activity = activities::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            tenant_id: Set(tenant_id.to_string()),
            name: Set(req.name.trim().to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let mut created = Vec::with_capacity(req.tiers.len());
        for (idx, tier) in req.tiers.into_iter().enumerate() {
            let row = tiers::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                activity_id: Set(activity.id.clone()),
                position: Set(idx as i32 + 1),
                name: Set(tier.name),
                cost: Set(tier.cost),
                duration_months: Set(tier.duration_months),
            }
            .insert(&txn)
            .await?;
            created.push(row);
        }
        txn.commit().await?;

        Ok(ActivityResponse::new(activity, created))
    }

    pub async fn list_activities(&self, tenant_id: &str) -> AppResult<Vec<ActivityResponse>> {
        let rows = activities::Entity::find()
            .filter(activities::Column::TenantId.eq(tenant_id))
            .order_by_asc(activities::Column::Name)
            .all(&self.pool)
            .await?;
        let ids: Vec<String> = rows.iter().map(|a| a.id.clone()).collect();
        let all_tiers = tiers::Entity::find()
            .filter(tiers::Column::ActivityId.is_in(ids))
            .order_by_asc(tiers::Column::Position)
            .all(&self.pool)
            .await?;

        let mut by_activity: HashMap<String, Vec<tiers::Model>> = HashMap::new();
        for t in all_tiers {
            by_activity.entry(t.activity_id.clone()).or_default().push(t);
        }

        Ok(rows
            .into_iter()
            .map(|a| {
                let tiers = by_activity.remove(&a.id).unwrap_or_default();
                ActivityResponse::new(a, tiers)
            })
            .collect())
    }

    pub async fn create_plan(
        &self,
        tenant_id: &str,
        req: CreateMembershipPlanRequest,
    ) -> AppResult<MembershipPlanResponse> {
        require_non_empty("name", &req.name)?;
        if req.cost < 0 || req.duration_months < 1 {
            return Err(AppError::ValidationError(
                "Plan cost must be >= 0 and duration at least one month".into(),
            ));
        }
        let activity_exists = activities::Entity::find_by_id(req.activity_id.clone())
            .filter(activities::Column::TenantId.eq(tenant_id))
            .one(&self.pool)
            .await?
            .is_some();
        if !activity_exists {
            return Err(AppError::NotFound("Activity not found".into()));
        }

        let plan = plans::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            tenant_id: Set(tenant_id.to_string()),
            activity_id: Set(req.activity_id),
            name: Set(req.name.trim().to_string()),
            cost: Set(req.cost),
            duration_months: Set(req.duration_months),
            max_attendances: Set(req.max_attendances),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;
        Ok(plan.into())
    }

    pub async fn list_plans(&self, tenant_id: &str) -> AppResult<Vec<MembershipPlanResponse>> {
        let rows = plans::Entity::find()
            .filter(plans::Column::TenantId.eq(tenant_id))
            .order_by_asc(plans::Column::Name)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(MembershipPlanResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::*;

    #[tokio::test]
    async fn test_activity_tiers_keep_order() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let svc = CatalogService::new(db.clone());

        let created = svc
            .create_activity(
                "iron-gym",
                CreateActivityRequest {
                    name: "CrossFit".into(),
                    tiers: vec![
                        TierInput {
                            name: "Monthly".into(),
                            cost: 1000,
                            duration_months: 1,
                        },
                        TierInput {
                            name: "Quarterly".into(),
                            cost: 2700,
                            duration_months: 3,
                        },
                    ],
                },
            )
            .await
            .unwrap();
        assert_eq!(created.tiers[0].position, 1);
        assert_eq!(created.tiers[1].position, 2);

        let listed = svc.list_activities("iron-gym").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].tiers[0].cost, 1000);

        let plan = svc
            .create_plan(
                "iron-gym",
                CreateMembershipPlanRequest {
                    activity_id: created.id.clone(),
                    name: "Quarterly".into(),
                    cost: 2700,
                    duration_months: 3,
                    max_attendances: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(svc.list_plans("iron-gym").await.unwrap()[0].id, plan.id);

        let err = svc
            .create_plan(
                "other-gym",
                CreateMembershipPlanRequest {
                    activity_id: created.id,
                    name: "Stolen".into(),
                    cost: 1,
                    duration_months: 1,
                    max_attendances: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
