use crate::middlewares::AuthContext;
use crate::models::*;
use crate::services::SubscriptionService;
use crate::utils::dates::today;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/subscription-plans",
    tag = "subscription",
    responses(
        (status = 200, description = "可选订阅方案", body = [SubscriptionPlanResponse])
    )
)]
pub async fn list_plans(
    subscription_service: web::Data<SubscriptionService>,
) -> Result<HttpResponse> {
    match subscription_service.list_plans().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscription-requests",
    tag = "subscription",
    request_body = CreateSubscriptionRequestRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已提交续订申请", body = SubscriptionRequestResponse),
        (status = 409, description = "已有待审核的申请")
    )
)]
pub async fn create_request(
    subscription_service: web::Data<SubscriptionService>,
    ctx: AuthContext,
    request: web::Json<CreateSubscriptionRequestRequest>,
) -> Result<HttpResponse> {
    match subscription_service
        .create_request(&ctx.tenant_id, request.into_inner())
        .await
    {
        Ok(created) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": created
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/subscription-plans",
    tag = "admin",
    request_body = CreateSubscriptionPlanRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建订阅方案", body = SubscriptionPlanResponse),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn create_plan(
    subscription_service: web::Data<SubscriptionService>,
    ctx: AuthContext,
    request: web::Json<CreateSubscriptionPlanRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = ctx.require_admin() {
        return Ok(e.error_response());
    }
    match subscription_service.create_plan(request.into_inner()).await {
        Ok(plan) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plan
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/subscription-requests",
    tag = "admin",
    params(SubscriptionRequestQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "续订申请列表", body = [SubscriptionRequestResponse]),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn list_requests(
    subscription_service: web::Data<SubscriptionService>,
    ctx: AuthContext,
    query: web::Query<SubscriptionRequestQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = ctx.require_admin() {
        return Ok(e.error_response());
    }
    match subscription_service.list_requests(query.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/subscription-requests/{request_id}/approve",
    tag = "admin",
    request_body = ReviewSubscriptionRequest,
    params(
        ("request_id" = String, Path, description = "申请 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已通过，租户订阅已延长", body = SubscriptionRequestResponse),
        (status = 409, description = "申请已处理")
    )
)]
pub async fn approve_request(
    subscription_service: web::Data<SubscriptionService>,
    ctx: AuthContext,
    path: web::Path<String>,
    request: web::Json<ReviewSubscriptionRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = ctx.require_admin() {
        return Ok(e.error_response());
    }
    match subscription_service
        .approve_request(&path.into_inner(), request.into_inner(), today())
        .await
    {
        Ok(reviewed) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": reviewed
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/subscription-requests/{request_id}/reject",
    tag = "admin",
    request_body = ReviewSubscriptionRequest,
    params(
        ("request_id" = String, Path, description = "申请 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已驳回", body = SubscriptionRequestResponse),
        (status = 409, description = "申请已处理")
    )
)]
pub async fn reject_request(
    subscription_service: web::Data<SubscriptionService>,
    ctx: AuthContext,
    path: web::Path<String>,
    request: web::Json<ReviewSubscriptionRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = ctx.require_admin() {
        return Ok(e.error_response());
    }
    match subscription_service
        .reject_request(&path.into_inner(), request.into_inner())
        .await
    {
        Ok(reviewed) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": reviewed
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/subscription-plans", web::get().to(list_plans))
        .route("/subscription-requests", web::post().to(create_request))
        .route("/admin/subscription-plans", web::post().to(create_plan))
        .service(
            web::scope("/admin/subscription-requests")
                .route("", web::get().to(list_requests))
                .route("/{request_id}/approve", web::post().to(approve_request))
                .route("/{request_id}/reject", web::post().to(reject_request)),
        );
}
