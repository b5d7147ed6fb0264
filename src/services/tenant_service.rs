use crate::entities::tenant_entity as tenants;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::validation::{require_non_empty, validate_tenant_id};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

#[derive(Clone)]
pub struct TenantService {
    pool: DatabaseConnection,
}

impl TenantService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create_tenant(&self, req: CreateTenantRequest) -> AppResult<TenantResponse> {
        let id = req.id.trim().to_lowercase();
        validate_tenant_id(&id)?;
        require_non_empty("name", &req.name)?;

        if tenants::Entity::find_by_id(id.clone())
            .one(&self.pool)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!("Tenant {id} already exists")));
        }

        let tenant = tenants::ActiveModel {
            id: Set(id),
            name: Set(req.name.trim().to_string()),
            logo_url: Set(req.logo_url),
            subscription_plan_id: Set(None),
            subscription_ends_on: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Created tenant {}", tenant.id);
        Ok(tenant.into())
    }

    pub async fn get_tenant(&self, tenant_id: &str) -> AppResult<TenantResponse> {
        tenants::Entity::find_by_id(tenant_id.to_string())
            .one(&self.pool)
            .await?
            .map(TenantResponse::from)
            .ok_or_else(|| AppError::NotFound("Tenant not found".into()))
    }

    pub async fn list_tenants(&self) -> AppResult<Vec<TenantResponse>> {
        let rows = tenants::Entity::find()
            .order_by_asc(tenants::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(TenantResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::*;

    #[tokio::test]
    async fn test_create_tenant_validates_slug() {
        let db = setup_db().await;
        let svc = TenantService::new(db.clone());

        let created = svc
            .create_tenant(CreateTenantRequest {
                id: "Iron-Gym".into(),
                name: "Iron Gym".into(),
                logo_url: None,
            })
            .await
            .unwrap();
        assert_eq!(created.id, "iron-gym");

        let dup = svc
            .create_tenant(CreateTenantRequest {
                id: "iron-gym".into(),
                name: "Again".into(),
                logo_url: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(dup, AppError::Conflict(_)));

        let bad = svc
            .create_tenant(CreateTenantRequest {
                id: "-x".into(),
                name: "Bad".into(),
                logo_url: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(bad, AppError::ValidationError(_)));

        assert_eq!(svc.list_tenants().await.unwrap().len(), 1);
        assert_eq!(svc.get_tenant("iron-gym").await.unwrap().name, "Iron Gym");
    }
}
