use crate::entities::{
    MembershipStatus, PaymentStatus, activity_entity as activities,
    activity_tier_entity as tiers, member_entity as members, membership_entity as memberships,
    membership_plan_entity as plans,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::MAX_RENEWAL_MONTHS;
use crate::utils::dates::add_months;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Clone)]
pub struct MembershipService {
    pool: DatabaseConnection,
}

impl MembershipService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 为会员开卡。同一会员在同一活动下最多一张 active 会员卡
    pub async fn create_membership(
        &self,
        tenant_id: &str,
        req: CreateMembershipRequest,
        today: NaiveDate,
    ) -> AppResult<MembershipResponse> {
        if !(1..=MAX_RENEWAL_MONTHS).contains(&req.months) {
            return Err(AppError::ValidationError(format!(
                "months must be between 1 and {MAX_RENEWAL_MONTHS}"
            )));
        }
        if matches!(req.cost, Some(c) if c < 0) {
            return Err(AppError::ValidationError("cost must not be negative".into()));
        }

        let member = members::Entity::find_by_id(req.member_id.clone())
            .filter(members::Column::TenantId.eq(tenant_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".into()))?;
        let activity = activities::Entity::find_by_id(req.activity_id.clone())
            .filter(activities::Column::TenantId.eq(tenant_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Activity not found".into()))?;

        let open = memberships::Entity::find()
            .filter(memberships::Column::TenantId.eq(tenant_id))
            .filter(memberships::Column::MemberId.eq(member.id.as_str()))
            .filter(memberships::Column::ActivityId.eq(activity.id.as_str()))
            .filter(memberships::Column::Status.eq(MembershipStatus::Active))
            .count(&self.pool)
            .await?;
        if open > 0 {
            return Err(AppError::Conflict(format!(
                "{} already has an active {} membership",
                member.full_name(),
                activity.name
            )));
        }

        let plan = match req.membership_plan_id.as_deref() {
            Some(plan_id) => Some(
                plans::Entity::find_by_id(plan_id.to_string())
                    .filter(plans::Column::TenantId.eq(tenant_id))
                    .filter(plans::Column::ActivityId.eq(activity.id.as_str()))
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Membership plan not found".into()))?,
            ),
            None => None,
        };

        // 价格优先级：方案 → 请求 → 活动首档
        let cost = match (&plan, req.cost) {
            (Some(p), _) => p.cost,
            (None, Some(c)) => c,
            (None, None) => tiers::Entity::find()
                .filter(tiers::Column::ActivityId.eq(activity.id.as_str()))
                .order_by_asc(tiers::Column::Position)
                .one(&self.pool)
                .await?
                .map(|t| t.cost)
                .ok_or_else(|| {
                    AppError::ValidationError("No cost given and activity has no price tiers".into())
                })?,
        };
        let max_attendances = plan
            .as_ref()
            .and_then(|p| p.max_attendances)
            .or(req.max_attendances);

        let start_date = req.start_date.unwrap_or(today);
        let end_date = add_months(start_date, req.months)?;
        let now = Utc::now();

        let created = memberships::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            tenant_id: Set(tenant_id.to_string()),
            member_id: Set(member.id.clone()),
            member_name: Set(member.full_name()),
            activity_id: Set(activity.id.clone()),
            activity_name: Set(activity.name.clone()),
            membership_plan_id: Set(plan.map(|p| p.id)),
            cost: Set(cost),
            start_date: Set(start_date),
            end_date: Set(end_date),
            status: Set(MembershipStatus::Active),
            payment_status: Set(PaymentStatus::Pending),
            auto_renewal: Set(req.auto_renewal),
            max_attendances: Set(max_attendances),
            current_attendances: Set(0),
            previous_membership_id: Set(None),
            renewed_to_id: Set(None),
            price_source: Set(None),
            renewal_trigger: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Created membership {} for member {} in {}",
            created.id,
            created.member_id,
            created.activity_name
        );
        Ok(MembershipResponse::from(created))
    }

    pub async fn list_memberships(
        &self,
        tenant_id: &str,
        query: MembershipQuery,
    ) -> AppResult<PaginatedResponse<MembershipResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let page = params.get_page();
        let page_size = params.get_page_size();

        let mut select = memberships::Entity::find()
            .filter(memberships::Column::TenantId.eq(tenant_id));
        if let Some(status) = query.status {
            select = select.filter(memberships::Column::Status.eq(status));
        }
        if let Some(member_id) = query.member_id.as_deref() {
            select = select.filter(memberships::Column::MemberId.eq(member_id));
        }

        let paginator = select
            .order_by_desc(memberships::Column::CreatedAt)
            .order_by_asc(memberships::Column::Id)
            .paginate(&self.pool, page_size);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(MembershipResponse::from).collect(),
            page,
            page_size,
            total,
        ))
    }

    async fn find_in_tenant(
        &self,
        tenant_id: &str,
        membership_id: &str,
    ) -> AppResult<memberships::Model> {
        memberships::Entity::find_by_id(membership_id.to_string())
            .filter(memberships::Column::TenantId.eq(tenant_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership not found".into()))
    }

    pub async fn get_membership(
        &self,
        tenant_id: &str,
        membership_id: &str,
    ) -> AppResult<MembershipResponse> {
        Ok(self.find_in_tenant(tenant_id, membership_id).await?.into())
    }

    pub async fn cancel_membership(
        &self,
        tenant_id: &str,
        membership_id: &str,
    ) -> AppResult<MembershipResponse> {
        let current = self.find_in_tenant(tenant_id, membership_id).await?;
        match current.status {
            MembershipStatus::Cancelled => {
                return Err(AppError::Conflict("Membership already cancelled".into()));
            }
            MembershipStatus::Renewed => {
                return Err(AppError::ValidationError(
                    "A renewed membership cannot be cancelled; cancel its successor".into(),
                ));
            }
            MembershipStatus::Active | MembershipStatus::Expired => {}
        }

        let mut am = current.into_active_model();
        am.status = Set(MembershipStatus::Cancelled);
        am.auto_renewal = Set(false);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&self.pool).await?;
        log::info!("Cancelled membership {}", updated.id);
        Ok(updated.into())
    }

    pub async fn set_auto_renewal(
        &self,
        tenant_id: &str,
        membership_id: &str,
        enabled: bool,
    ) -> AppResult<MembershipResponse> {
        let current = self.find_in_tenant(tenant_id, membership_id).await?;
        if enabled && current.status == MembershipStatus::Cancelled {
            return Err(AppError::ValidationError(
                "Cannot enable auto-renewal on a cancelled membership".into(),
            ));
        }
        let mut am = current.into_active_model();
        am.auto_renewal = Set(enabled);
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?.into())
    }

    /// 会员卡所在的完整续费链，按时间从旧到新
    pub async fn renewal_chain(
        &self,
        tenant_id: &str,
        membership_id: &str,
    ) -> AppResult<Vec<MembershipResponse>> {
        let start = self.find_in_tenant(tenant_id, membership_id).await?;
        let mut seen = HashSet::from([start.id.clone()]);

        let mut earlier = Vec::new();
        let mut cursor = start.previous_membership_id.clone();
        while let Some(id) = cursor {
            if !seen.insert(id.clone()) {
                break;
            }
            let Some(prev) = memberships::Entity::find_by_id(id)
                .filter(memberships::Column::TenantId.eq(tenant_id))
                .one(&self.pool)
                .await?
            else {
                break;
            };
            cursor = prev.previous_membership_id.clone();
            earlier.push(prev);
        }
        earlier.reverse();

        let mut later = Vec::new();
        let mut cursor = start.renewed_to_id.clone();
        while let Some(id) = cursor {
            if !seen.insert(id.clone()) {
                break;
            }
            let Some(next) = memberships::Entity::find_by_id(id)
                .filter(memberships::Column::TenantId.eq(tenant_id))
                .one(&self.pool)
                .await?
            else {
                break;
            };
            cursor = next.renewed_to_id.clone();
            later.push(next);
        }

        Ok(earlier
            .into_iter()
            .chain(std::iter::once(start))
            .chain(later)
            .map(MembershipResponse::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenewalConfig;
    use crate::database::test_support::*;
    use crate::entities::RenewalTrigger;
    use crate::services::RenewalService;

    fn request(member: &str, activity: &str) -> CreateMembershipRequest {
        CreateMembershipRequest {
            member_id: member.to_string(),
            activity_id: activity.to_string(),
            membership_plan_id: None,
            cost: None,
            start_date: None,
            months: 1,
            auto_renewal: false,
            max_attendances: None,
        }
    }

    #[tokio::test]
    async fn test_create_prices_and_single_active() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let crossfit = seed_activity(&db, "iron-gym", "CrossFit").await;
        let yoga = seed_activity(&db, "iron-gym", "Yoga").await;
        seed_tier(&db, &crossfit.id, 1, 1100).await;
        let plan = seed_plan(&db, "iron-gym", &yoga.id, 900).await;

        let svc = MembershipService::new(db.clone());
        let today = date("2024-01-31");

        let m = svc
            .create_membership("iron-gym", request(&ana.id, &crossfit.id), today)
            .await
            .unwrap();
        assert_eq!(m.cost, 1100);
        assert_eq!(m.member_name, "Ana García");
        assert_eq!(m.end_date, date("2024-02-29"));

        let err = svc
            .create_membership("iron-gym", request(&ana.id, &crossfit.id), today)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let with_plan = svc
            .create_membership(
                "iron-gym",
                CreateMembershipRequest {
                    membership_plan_id: Some(plan.id.clone()),
                    cost: Some(5),
                    ..request(&ana.id, &yoga.id)
                },
                today,
            )
            .await
            .unwrap();
        assert_eq!(with_plan.cost, 900);
        assert_eq!(with_plan.max_attendances, Some(12));
    }

    #[tokio::test]
    async fn test_create_requires_price_and_known_member() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let swim = seed_activity(&db, "iron-gym", "Swim").await;
        let svc = MembershipService::new(db.clone());
        let today = date("2024-01-10");

        let err = svc
            .create_membership("iron-gym", request(&ana.id, &swim.id), today)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = svc
            .create_membership("iron-gym", request("ghost", &swim.id), today)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cancel_list_and_chain() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let crossfit = seed_activity(&db, "iron-gym", "CrossFit").await;
        let first = seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &crossfit, "2024-01-01", MembershipStatus::Expired),
        )
        .await;

        let renewals = RenewalService::new(db.clone(), RenewalConfig::default());
        let second = renewals
            .renew("iron-gym", &first.id, 1, RenewalTrigger::Manual, date("2024-01-05"))
            .await
            .unwrap();
        let third = renewals
            .renew(
                "iron-gym",
                &second.membership.id,
                1,
                RenewalTrigger::Manual,
                date("2024-02-05"),
            )
            .await
            .unwrap();

        let svc = MembershipService::new(db.clone());
        let chain = svc
            .renewal_chain("iron-gym", &second.membership.id)
            .await
            .unwrap();
        let ids: Vec<&str> = chain.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                first.id.as_str(),
                second.membership.id.as_str(),
                third.membership.id.as_str()
            ]
        );

        let err = svc
            .cancel_membership("iron-gym", &first.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let cancelled = svc
            .cancel_membership("iron-gym", &third.membership.id)
            .await
            .unwrap();
        assert_eq!(cancelled.status, MembershipStatus::Cancelled);
        assert!(!cancelled.auto_renewal);

        let page = svc
            .list_memberships(
                "iron-gym",
                MembershipQuery {
                    status: Some(MembershipStatus::Renewed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.data.len(), 2);

        let toggled = svc
            .set_auto_renewal("iron-gym", &second.membership.id, true)
            .await
            .unwrap();
        assert!(toggled.auto_renewal);
    }
}
