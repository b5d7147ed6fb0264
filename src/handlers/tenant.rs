use crate::middlewares::AuthContext;
use crate::models::*;
use crate::services::TenantService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/tenant",
    tag = "tenant",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前健身房信息", body = TenantResponse),
        (status = 404, description = "租户不存在")
    )
)]
pub async fn get_own_tenant(
    tenant_service: web::Data<TenantService>,
    ctx: AuthContext,
) -> Result<HttpResponse> {
    match tenant_service.get_tenant(&ctx.tenant_id).await {
        Ok(tenant) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": tenant
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/tenants",
    tag = "admin",
    request_body = CreateTenantRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建租户成功", body = TenantResponse),
        (status = 403, description = "需要管理员权限"),
        (status = 409, description = "租户已存在")
    )
)]
pub async fn create_tenant(
    tenant_service: web::Data<TenantService>,
    ctx: AuthContext,
    request: web::Json<CreateTenantRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = ctx.require_admin() {
        return Ok(e.error_response());
    }
    match tenant_service.create_tenant(request.into_inner()).await {
        Ok(tenant) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": tenant
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/tenants",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "全部租户", body = [TenantResponse]),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn list_tenants(
    tenant_service: web::Data<TenantService>,
    ctx: AuthContext,
) -> Result<HttpResponse> {
    if let Err(e) = ctx.require_admin() {
        return Ok(e.error_response());
    }
    match tenant_service.list_tenants().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn tenant_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/tenant", web::get().to(get_own_tenant)).service(
        web::scope("/admin/tenants")
            .route("", web::post().to(create_tenant))
            .route("", web::get().to(list_tenants)),
    );
}
