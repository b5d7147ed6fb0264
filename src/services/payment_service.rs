use crate::entities::{
    PaymentStatus, PendingPaymentStatus, membership_entity as memberships,
    pending_payment_entity as payments,
};
use crate::error::{AppError, AppResult};
use crate::external::CloudinaryService;
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct PaymentService {
    pool: DatabaseConnection,
    cloudinary: CloudinaryService,
}

impl PaymentService {
    pub fn new(pool: DatabaseConnection, cloudinary: CloudinaryService) -> Self {
        Self { pool, cloudinary }
    }

    pub async fn list_pending(&self, tenant_id: &str) -> AppResult<Vec<PendingPaymentResponse>> {
        let rows = payments::Entity::find()
            .filter(payments::Column::TenantId.eq(tenant_id))
            .filter(payments::Column::Status.eq(PendingPaymentStatus::Pending))
            .order_by_asc(payments::Column::DueDate)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(PendingPaymentResponse::from).collect())
    }

    async fn find_in_tenant(&self, tenant_id: &str, payment_id: &str) -> AppResult<payments::Model> {
        payments::Entity::find_by_id(payment_id.to_string())
            .filter(payments::Column::TenantId.eq(tenant_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".into()))
    }

    /// 上传付款凭证并记录地址
    pub async fn attach_proof(
        &self,
        tenant_id: &str,
        payment_id: &str,
        file: &str,
    ) -> AppResult<PendingPaymentResponse> {
        let payment = self.find_in_tenant(tenant_id, payment_id).await?;
        let asset = self
            .cloudinary
            .upload_image(file, &format!("{tenant_id}/payments"))
            .await?;

        let mut am = payment.into_active_model();
        am.proof_url = Set(Some(asset.secure_url));
        Ok(am.update(&self.pool).await?.into())
    }

    /// 确认收款：待付款记录与对应会员卡同时标记为已付
    pub async fn mark_paid(
        &self,
        tenant_id: &str,
        payment_id: &str,
    ) -> AppResult<PendingPaymentResponse> {
        let payment = self.find_in_tenant(tenant_id, payment_id).await?;
        if payment.status == PendingPaymentStatus::Paid {
            return Err(AppError::Conflict("Payment already settled".into()));
        }
        let membership_id = payment.membership_id.clone();
        let now = Utc::now();

        let txn = self.pool.begin().await?;
        let mut am = payment.into_active_model();
        am.status = Set(PendingPaymentStatus::Paid);
        am.paid_at = Set(Some(now));
        let updated = am.update(&txn).await?;

        memberships::Entity::update_many()
            .set(memberships::ActiveModel {
                payment_status: Set(PaymentStatus::Paid),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(memberships::Column::Id.eq(membership_id.as_str()))
            .filter(memberships::Column::TenantId.eq(tenant_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        log::info!("Payment {} settled for membership {membership_id}", updated.id);
        Ok(updated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CloudinaryConfig, RenewalConfig};
    use crate::database::test_support::*;
    use crate::entities::{MembershipStatus, RenewalTrigger};
    use crate::services::RenewalService;

    #[tokio::test]
    async fn test_mark_paid_settles_membership() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let crossfit = seed_activity(&db, "iron-gym", "CrossFit").await;
        let old = seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &crossfit, "2024-01-01", MembershipStatus::Expired),
        )
        .await;
        let renewed = RenewalService::new(db.clone(), RenewalConfig::default())
            .renew("iron-gym", &old.id, 1, RenewalTrigger::Manual, date("2024-02-15"))
            .await
            .unwrap();

        let svc = PaymentService::new(db.clone(), CloudinaryService::new(CloudinaryConfig::default()));
        let pending = svc.list_pending("iron-gym").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].membership_id, renewed.membership.id);

        // 未配置图床时上传失败
        let err = svc
            .attach_proof("iron-gym", &pending[0].id, "data:image/png;base64,AAAA")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));

        let paid = svc.mark_paid("iron-gym", &pending[0].id).await.unwrap();
        assert_eq!(paid.status, PendingPaymentStatus::Paid);
        assert!(paid.paid_at.is_some());

        let membership = memberships::Entity::find_by_id(renewed.membership.id.clone())
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(membership.payment_status, PaymentStatus::Paid);

        assert!(svc.list_pending("iron-gym").await.unwrap().is_empty());
        let again = svc.mark_paid("iron-gym", &pending[0].id).await.unwrap_err();
        assert!(matches!(again, AppError::Conflict(_)));
    }
}
