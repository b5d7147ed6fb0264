use crate::middlewares::AuthContext;
use crate::models::*;
use crate::services::PaymentService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/payments/pending",
    tag = "payment",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "待付款列表（按到期日）", body = [PendingPaymentResponse])
    )
)]
pub async fn list_pending(
    payment_service: web::Data<PaymentService>,
    ctx: AuthContext,
) -> Result<HttpResponse> {
    match payment_service.list_pending(&ctx.tenant_id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/payments/{payment_id}/proof",
    tag = "payment",
    request_body = AttachProofRequest,
    params(
        ("payment_id" = String, Path, description = "待付款 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "凭证已上传", body = PendingPaymentResponse),
        (status = 502, description = "图床上传失败")
    )
)]
pub async fn attach_proof(
    payment_service: web::Data<PaymentService>,
    ctx: AuthContext,
    path: web::Path<String>,
    request: web::Json<AttachProofRequest>,
) -> Result<HttpResponse> {
    match payment_service
        .attach_proof(&ctx.tenant_id, &path.into_inner(), &request.file)
        .await
    {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/payments/{payment_id}/paid",
    tag = "payment",
    params(
        ("payment_id" = String, Path, description = "待付款 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已确认收款", body = PendingPaymentResponse),
        (status = 409, description = "已收款")
    )
)]
pub async fn mark_paid(
    payment_service: web::Data<PaymentService>,
    ctx: AuthContext,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match payment_service
        .mark_paid(&ctx.tenant_id, &path.into_inner())
        .await
    {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("/pending", web::get().to(list_pending))
            .route("/{payment_id}/proof", web::post().to(attach_proof))
            .route("/{payment_id}/paid", web::post().to(mark_paid)),
    );
}
