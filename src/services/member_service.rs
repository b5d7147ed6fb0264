use crate::entities::{MemberStatus, member_entity as members};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::validation::{require_non_empty, validate_email};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct MemberService {
    pool: DatabaseConnection,
}

impl MemberService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create_member(
        &self,
        tenant_id: &str,
        req: CreateMemberRequest,
    ) -> AppResult<MemberResponse> {
        require_non_empty("first_name", &req.first_name)?;
        require_non_empty("last_name", &req.last_name)?;
        let email = req
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());
        if let Some(email) = email.as_deref() {
            validate_email(email)?;
            let taken = members::Entity::find()
                .filter(members::Column::TenantId.eq(tenant_id))
                .filter(members::Column::Email.eq(email))
                .count(&self.pool)
                .await?;
            if taken > 0 {
                return Err(AppError::Conflict("Email already registered".into()));
            }
        }

        let member = members::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            tenant_id: Set(tenant_id.to_string()),
            first_name: Set(req.first_name.trim().to_string()),
            last_name: Set(req.last_name.trim().to_string()),
            email: Set(email),
            phone: Set(req.phone.filter(|p| !p.trim().is_empty())),
            status: Set(MemberStatus::Active),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;

        Ok(member.into())
    }

    pub async fn list_members(
        &self,
        tenant_id: &str,
        params: PaginationParams,
    ) -> AppResult<PaginatedResponse<MemberResponse>> {
        let page = params.get_page();
        let page_size = params.get_page_size();
        let paginator = members::Entity::find()
            .filter(members::Column::TenantId.eq(tenant_id))
            .order_by_asc(members::Column::LastName)
            .order_by_asc(members::Column::FirstName)
            .paginate(&self.pool, page_size);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;
        Ok(PaginatedResponse::new(
            rows.into_iter().map(MemberResponse::from).collect(),
            page,
            page_size,
            total,
        ))
    }

    pub async fn get_member(&self, tenant_id: &str, member_id: &str) -> AppResult<MemberResponse> {
        members::Entity::find_by_id(member_id.to_string())
            .filter(members::Column::TenantId.eq(tenant_id))
            .one(&self.pool)
            .await?
            .map(MemberResponse::from)
            .ok_or_else(|| AppError::NotFound("Member not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::*;

    #[tokio::test]
    async fn test_create_and_list_members() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let svc = MemberService::new(db.clone());

        let ana = svc
            .create_member(
                "iron-gym",
                CreateMemberRequest {
                    first_name: " Ana ".into(),
                    last_name: "García".into(),
                    email: Some("Ana@Example.com".into()),
                    phone: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(ana.first_name, "Ana");
        assert_eq!(ana.email.as_deref(), Some("ana@example.com"));

        let dup = svc
            .create_member(
                "iron-gym",
                CreateMemberRequest {
                    first_name: "Other".into(),
                    last_name: "Person".into(),
                    email: Some("ana@example.com".into()),
                    phone: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(dup, AppError::Conflict(_)));

        let bad = svc
            .create_member(
                "iron-gym",
                CreateMemberRequest {
                    first_name: "".into(),
                    last_name: "Nobody".into(),
                    email: None,
                    phone: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(bad, AppError::ValidationError(_)));

        let page = svc
            .list_members("iron-gym", PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert!(svc.get_member("other-gym", &ana.id).await.is_err());
    }
}
