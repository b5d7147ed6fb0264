use crate::entities::{
    SubscriptionRequestStatus, subscription_plan_entity as plans,
    subscription_request_entity as requests, tenant_entity as tenants,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::dates::add_months;
use crate::utils::validation::require_non_empty;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

/// 租户订阅的新到期日：从今天和当前到期日中较晚者开始延长
pub fn extended_subscription_end(
    current: Option<NaiveDate>,
    today: NaiveDate,
    months: u32,
) -> AppResult<NaiveDate> {
    let base = current.map_or(today, |end| end.max(today));
    add_months(base, months)
}

#[derive(Clone)]
pub struct SubscriptionService {
    pool: DatabaseConnection,
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_plans(&self) -> AppResult<Vec<SubscriptionPlanResponse>> {
        let rows = plans::Entity::find()
            .filter(plans::Column::Active.eq(true))
            .order_by_asc(plans::Column::Price)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(SubscriptionPlanResponse::from).collect())
    }

    pub async fn create_plan(
        &self,
        req: CreateSubscriptionPlanRequest,
    ) -> AppResult<SubscriptionPlanResponse> {
        require_non_empty("name", &req.name)?;
        if req.price < 0 || !(1..=36).contains(&req.duration_months) {
            return Err(AppError::ValidationError(
                "Price must be >= 0 and duration between 1 and 36 months".into(),
            ));
        }
        let plan = plans::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(req.name.trim().to_string()),
            price: Set(req.price),
            duration_months: Set(req.duration_months),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;
        Ok(plan.into())
    }

    pub async fn create_request(
        &self,
        tenant_id: &str,
        req: CreateSubscriptionRequestRequest,
    ) -> AppResult<SubscriptionRequestResponse> {
        let plan = plans::Entity::find_by_id(req.plan_id.clone())
            .one(&self.pool)
            .await?
            .filter(|p| p.active)
            .ok_or_else(|| AppError::NotFound("Subscription plan not found".into()))?;

        let open = requests::Entity::find()
            .filter(requests::Column::TenantId.eq(tenant_id))
            .filter(requests::Column::Status.eq(SubscriptionRequestStatus::Pending))
            .one(&self.pool)
            .await?;
        if open.is_some() {
            return Err(AppError::Conflict(
                "A subscription request is already awaiting review".into(),
            ));
        }

        let created = requests::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            tenant_id: Set(tenant_id.to_string()),
            plan_id: Set(plan.id),
            status: Set(SubscriptionRequestStatus::Pending),
            proof_url: Set(req.proof_url),
            note: Set(req.note),
            created_at: Set(Utc::now()),
            reviewed_at: Set(None),
        }
        .insert(&self.pool)
        .await?;
        Ok(created.into())
    }

    pub async fn list_requests(
        &self,
        query: SubscriptionRequestQuery,
    ) -> AppResult<Vec<SubscriptionRequestResponse>> {
        let mut select = requests::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(requests::Column::Status.eq(status));
        }
        let rows = select
            .order_by_desc(requests::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(SubscriptionRequestResponse::from).collect())
    }

    async fn pending_request(&self, request_id: &str) -> AppResult<requests::Model> {
        let request = requests::Entity::find_by_id(request_id.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription request not found".into()))?;
        if request.status != SubscriptionRequestStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Subscription request already {:?}",
                request.status
            )));
        }
        Ok(request)
    }

    /// 审批通过：延长租户订阅并记录方案
    pub async fn approve_request(
        &self,
        request_id: &str,
        review: ReviewSubscriptionRequest,
        today: NaiveDate,
    ) -> AppResult<SubscriptionRequestResponse> {
        let request = self.pending_request(request_id).await?;
        let plan = plans::Entity::find_by_id(request.plan_id.clone())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription plan not found".into()))?;

        let txn = self.pool.begin().await?;
        let tenant = tenants::Entity::find_by_id(request.tenant_id.clone())
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Tenant not found".into()))?;
        let new_end = extended_subscription_end(
            tenant.subscription_ends_on,
            today,
            plan.duration_months.max(1) as u32,
        )?;

        let mut tenant_am = tenant.into_active_model();
        tenant_am.subscription_plan_id = Set(Some(plan.id.clone()));
        tenant_am.subscription_ends_on = Set(Some(new_end));
        tenant_am.update(&txn).await?;

        let mut am = request.into_active_model();
        am.status = Set(SubscriptionRequestStatus::Approved);
        if review.note.is_some() {
            am.note = Set(review.note);
        }
        am.reviewed_at = Set(Some(Utc::now()));
        let updated = am.update(&txn).await?;
        txn.commit().await?;

        log::info!(
            "Approved subscription request {} for tenant {}, active until {new_end}",
            updated.id,
            updated.tenant_id
        );
        Ok(updated.into())
    }

    pub async fn reject_request(
        &self,
        request_id: &str,
        review: ReviewSubscriptionRequest,
    ) -> AppResult<SubscriptionRequestResponse> {
        let request = self.pending_request(request_id).await?;
        let mut am = request.into_active_model();
        am.status = Set(SubscriptionRequestStatus::Rejected);
        if review.note.is_some() {
            am.note = Set(review.note);
        }
        am.reviewed_at = Set(Some(Utc::now()));
        Ok(am.update(&self.pool).await?.into())
    }
}
