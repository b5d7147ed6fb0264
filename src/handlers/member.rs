use crate::middlewares::AuthContext;
use crate::models::*;
use crate::services::MemberService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/members",
    tag = "member",
    request_body = CreateMemberRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建会员成功", body = MemberResponse),
        (status = 400, description = "请求参数错误"),
        (status = 409, description = "邮箱已被使用")
    )
)]
pub async fn create_member(
    member_service: web::Data<MemberService>,
    ctx: AuthContext,
    request: web::Json<CreateMemberRequest>,
) -> Result<HttpResponse> {
    match member_service
        .create_member(&ctx.tenant_id, request.into_inner())
        .await
    {
        Ok(member) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": member
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/members",
    tag = "member",
    params(PaginationParams),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "会员分页列表")
    )
)]
pub async fn list_members(
    member_service: web::Data<MemberService>,
    ctx: AuthContext,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match member_service
        .list_members(&ctx.tenant_id, query.into_inner())
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
    path = "/members/{member_id}",
    tag = "member",
    params(
        ("member_id" = String, Path, description = "会员 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "会员详情", body = MemberResponse),
        (status = 404, description = "会员不存在")
    )
)]
pub async fn get_member(
    member_service: web::Data<MemberService>,
    ctx: AuthContext,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match member_service
        .get_member(&ctx.tenant_id, &path.into_inner())
        .await
    {
        Ok(member) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": member
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn member_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/members")
            .route("", web::post().to(create_member))
            .route("", web::get().to(list_members))
            .route("/{member_id}", web::get().to(get_member)),
    );
}
