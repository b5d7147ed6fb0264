use crate::middlewares::AuthContext;
use crate::models::*;
use crate::services::AutomationService;
use crate::utils::dates::today;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RunQuery {
    /// Ignore the configured day; the monthly marker still applies.
    pub force: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/automation/config",
    tag = "automation",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "自动续费配置", body = AutoRenewalConfigResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_config(
    automation_service: web::Data<AutomationService>,
    ctx: AuthContext,
) -> Result<HttpResponse> {
    match automation_service.get_config(&ctx.tenant_id).await {
        Ok(config) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": AutoRenewalConfigResponse::from(config)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/automation/config",
    tag = "automation",
    request_body = UpdateAutoRenewalConfigRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = AutoRenewalConfigResponse),
        (status = 400, description = "day_of_month 超出范围")
    )
)]
pub async fn update_config(
    automation_service: web::Data<AutomationService>,
    ctx: AuthContext,
    request: web::Json<UpdateAutoRenewalConfigRequest>,
) -> Result<HttpResponse> {
    match automation_service
        .update_config(&ctx.tenant_id, request.into_inner())
        .await
    {
        Ok(config) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": AutoRenewalConfigResponse::from(config)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/automation/run",
    tag = "automation",
    params(RunQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "执行结果：not_due / already_ran / completed"),
        (status = 401, description = "未授权")
    )
)]
pub async fn run_now(
    automation_service: web::Data<AutomationService>,
    ctx: AuthContext,
    query: web::Query<RunQuery>,
) -> Result<HttpResponse> {
    let force = query.force.unwrap_or(false);
    match automation_service
        .run_for_tenant(&ctx.tenant_id, today(), force)
        .await
    {
        Ok(outcome) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": outcome
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/automation/runs",
    tag = "automation",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "历史执行记录", body = [RenewalRunResponse])
    )
)]
pub async fn list_runs(
    automation_service: web::Data<AutomationService>,
    ctx: AuthContext,
) -> Result<HttpResponse> {
    match automation_service.list_runs(&ctx.tenant_id).await {
        Ok(runs) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": runs
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn automation_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/automation")
            .route("/config", web::get().to(get_config))
            .route("/config", web::put().to(update_config))
            .route("/run", web::post().to(run_now))
            .route("/runs", web::get().to(list_runs)),
    );
}
