use crate::middlewares::AuthContext;
use crate::models::*;
use crate::services::MembershipService;
use crate::utils::dates::today;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/memberships",
    tag = "membership",
    request_body = CreateMembershipRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "开卡成功", body = MembershipResponse),
        (status = 404, description = "会员或活动不存在"),
        (status = 409, description = "该会员已有此活动的有效会员卡")
    )
)]
pub async fn create_membership(
    membership_service: web::Data<MembershipService>,
    ctx: AuthContext,
    request: web::Json<CreateMembershipRequest>,
) -> Result<HttpResponse> {
    match membership_service
        .create_membership(&ctx.tenant_id, request.into_inner(), today())
        .await
    {
        Ok(membership) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": membership
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/memberships",
    tag = "membership",
    params(MembershipQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "会员卡分页列表")
    )
)]
pub async fn list_memberships(
    membership_service: web::Data<MembershipService>,
    ctx: AuthContext,
    query: web::Query<MembershipQuery>,
) -> Result<HttpResponse> {
    match membership_service
        .list_memberships(&ctx.tenant_id, query.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/memberships/{membership_id}",
    tag = "membership",
    params(
        ("membership_id" = String, Path, description = "会员卡 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "会员卡详情", body = MembershipResponse),
        (status = 404, description = "会员卡不存在")
    )
)]
pub async fn get_membership(
    membership_service: web::Data<MembershipService>,
    ctx: AuthContext,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match membership_service
        .get_membership(&ctx.tenant_id, &path.into_inner())
        .await
    {
        Ok(membership) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": membership
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/memberships/{membership_id}/cancel",
    tag = "membership",
    params(
        ("membership_id" = String, Path, description = "会员卡 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已取消", body = MembershipResponse),
        (status = 409, description = "会员卡已取消")
    )
)]
pub async fn cancel_membership(
    membership_service: web::Data<MembershipService>,
    ctx: AuthContext,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match membership_service
        .cancel_membership(&ctx.tenant_id, &path.into_inner())
        .await
    {
        Ok(membership) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": membership
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/memberships/{membership_id}/auto-renewal",
    tag = "membership",
    request_body = SetAutoRenewalRequest,
    params(
        ("membership_id" = String, Path, description = "会员卡 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = MembershipResponse)
    )
)]
pub async fn set_auto_renewal(
    membership_service: web::Data<MembershipService>,
    ctx: AuthContext,
    path: web::Path<String>,
    request: web::Json<SetAutoRenewalRequest>,
) -> Result<HttpResponse> {
    match membership_service
        .set_auto_renewal(&ctx.tenant_id, &path.into_inner(), request.auto_renewal)
        .await
    {
        Ok(membership) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": membership
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/memberships/{membership_id}/chain",
    tag = "membership",
    params(
        ("membership_id" = String, Path, description = "会员卡 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "续费链（从最早到最新）", body = [MembershipResponse])
    )
)]
pub async fn renewal_chain(
    membership_service: web::Data<MembershipService>,
    ctx: AuthContext,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match membership_service
        .renewal_chain(&ctx.tenant_id, &path.into_inner())
        .await
    {
        Ok(chain) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": chain
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn membership_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/memberships")
            .route("", web::post().to(create_membership))
            .route("", web::get().to(list_memberships))
            .route("/{membership_id}", web::get().to(get_membership))
            .route("/{membership_id}/cancel", web::post().to(cancel_membership))
            .route("/{membership_id}/auto-renewal", web::put().to(set_auto_renewal))
            .route("/{membership_id}/chain", web::get().to(renewal_chain)),
    );
}
