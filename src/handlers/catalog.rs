use crate::middlewares::AuthContext;
use crate::models::*;
use crate::services::CatalogService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/activities",
    tag = "catalog",
    request_body = CreateActivityRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建活动及价格档位", body = ActivityResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_activity(
    catalog_service: web::Data<CatalogService>,
    ctx: AuthContext,
    request: web::Json<CreateActivityRequest>,
) -> Result<HttpResponse> {
    match catalog_service
        .create_activity(&ctx.tenant_id, request.into_inner())
        .await
    {
        Ok(activity) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": activity
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/activities",
    tag = "catalog",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "活动列表", body = [ActivityResponse])
    )
)]
pub async fn list_activities(
    catalog_service: web::Data<CatalogService>,
    ctx: AuthContext,
) -> Result<HttpResponse> {
    match catalog_service.list_activities(&ctx.tenant_id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/membership-plans",
    tag = "catalog",
    request_body = CreateMembershipPlanRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建会员方案", body = MembershipPlanResponse),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn create_plan(
    catalog_service: web::Data<CatalogService>,
    ctx: AuthContext,
    request: web::Json<CreateMembershipPlanRequest>,
) -> Result<HttpResponse> {
    match catalog_service
        .create_plan(&ctx.tenant_id, request.into_inner())
        .await
    {
        Ok(plan) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plan
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/membership-plans",
    tag = "catalog",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "会员方案列表", body = [MembershipPlanResponse])
    )
)]
pub async fn list_plans(
    catalog_service: web::Data<CatalogService>,
    ctx: AuthContext,
) -> Result<HttpResponse> {
    match catalog_service.list_plans(&ctx.tenant_id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn catalog_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/activities")
            .route("", web::post().to(create_activity))
            .route("", web::get().to(list_activities)),
    )
    .service(
        web::scope("/membership-plans")
            .route("", web::post().to(create_plan))
            .route("", web::get().to(list_plans)),
    );
}
