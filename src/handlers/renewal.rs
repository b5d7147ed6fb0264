use crate::entities::RenewalTrigger;
use crate::error::AppError;
use crate::middlewares::AuthContext;
use crate::models::*;
use crate::services::{ExpirationService, RenewalService};
use crate::utils::dates::today;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/renewals/expired",
    tag = "renewal",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已过期会员卡列表（按到期日升序）", body = [ExpiredMembership]),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_expired(
    expiration_service: web::Data<ExpirationService>,
    ctx: AuthContext,
) -> Result<HttpResponse> {
    match expiration_service.scan_expired(&ctx.tenant_id, today()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/renewals/stats",
    tag = "renewal",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "续费统计", body = RenewalStats),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_stats(
    expiration_service: web::Data<ExpirationService>,
    ctx: AuthContext,
) -> Result<HttpResponse> {
    match expiration_service.renewal_stats(&ctx.tenant_id, today()).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/renewals/{membership_id}",
    tag = "renewal",
    request_body = RenewMembershipRequest,
    params(
        ("membership_id" = String, Path, description = "要续费的会员卡 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "续费成功", body = RenewalResult),
        (status = 400, description = "参数错误或会员卡已取消"),
        (status = 404, description = "会员卡不存在"),
        (status = 409, description = "会员卡已被续费")
    )
)]
pub async fn renew_membership(
    renewal_service: web::Data<RenewalService>,
    ctx: AuthContext,
    path: web::Path<String>,
    request: web::Json<RenewMembershipRequest>,
) -> Result<HttpResponse> {
    let membership_id = path.into_inner();
    match renewal_service
        .renew(
            &ctx.tenant_id,
            &membership_id,
            request.months,
            RenewalTrigger::Manual,
            today(),
        )
        .await
    {
        Ok(renewed) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "result": RenewalResult::ok(&renewed),
                "renewal": renewed
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/renewals/bulk",
    tag = "renewal",
    request_body = BulkRenewRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "批量续费结果", body = BulkRenewalSummary),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn bulk_renew(
    renewal_service: web::Data<RenewalService>,
    ctx: AuthContext,
    request: web::Json<BulkRenewRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    if request.membership_ids.is_empty() {
        return Ok(
            AppError::ValidationError("membership_ids must not be empty".into()).error_response(),
        );
    }
    let summary = renewal_service
        .renew_many(&ctx.tenant_id, &request.membership_ids, request.months, today())
        .await;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": summary
    })))
}

pub fn renewal_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/renewals")
            .route("/expired", web::get().to(list_expired))
            .route("/stats", web::get().to(get_stats))
            // bulk 必须在 {membership_id} 之前注册
            .route("/bulk", web::post().to(bulk_renew))
            .route("/{membership_id}", web::post().to(renew_membership)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenewalConfig;
    use crate::database::test_support::*;
    use crate::entities::MembershipStatus;
    use actix_web::http::StatusCode;

    fn owner(tenant_id: &str) -> AuthContext {
        AuthContext {
            user_id: "owner-1".into(),
            tenant_id: tenant_id.into(),
            role: "owner".into(),
        }
    }

    async fn body_json(resp: HttpResponse) -> serde_json::Value {
        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_renew_membership_response_and_error_status() {
        let db = setup_db().await;
        seed_tenant(&db, "iron-gym").await;
        let ana = seed_member(&db, "iron-gym", "Ana", "García").await;
        let crossfit = seed_activity(&db, "iron-gym", "CrossFit").await;
        let old = seed_membership(
            &db,
            membership_seed("iron-gym", &ana, &crossfit, "2024-01-01", MembershipStatus::Active),
        )
        .await;
        let svc = web::Data::new(RenewalService::new(db.clone(), RenewalConfig::default()));

        let resp = renew_membership(
            svc.clone(),
            owner("iron-gym"),
            web::Path::from(old.id.clone()),
            web::Json(RenewMembershipRequest { months: 1 }),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["result"]["success"], true);
        assert_eq!(body["data"]["renewal"]["previous_membership_id"], old.id.as_str());
        assert_eq!(
            body["data"]["result"]["new_membership_id"],
            body["data"]["renewal"]["membership"]["id"]
        );

        // 重复续费 → 409，未知会员卡 → 404，非法月数 → 400
        let resp = renew_membership(
            svc.clone(),
            owner("iron-gym"),
            web::Path::from(old.id.clone()),
            web::Json(RenewMembershipRequest { months: 1 }),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["error"]["code"], "CONFLICT");

        let resp = renew_membership(
            svc.clone(),
            owner("iron-gym"),
            web::Path::from("missing".to_string()),
            web::Json(RenewMembershipRequest { months: 1 }),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = renew_membership(
            svc,
            owner("iron-gym"),
            web::Path::from(old.id.clone()),
            web::Json(RenewMembershipRequest { months: 0 }),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
