use crate::middlewares::AuthContext;
use crate::models::*;
use crate::services::{CsvExport, ExportService};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, ResponseError, Result, web};

fn csv_attachment(export: CsvExport) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(export.filename)],
        })
        .body(export.content)
}

#[utoipa::path(
    get,
    path = "/reports/memberships",
    tag = "report",
    params(ReportQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当月会员卡 CSV", content_type = "text/csv"),
        (status = 400, description = "月份格式错误")
    )
)]
pub async fn membership_report(
    export_service: web::Data<ExportService>,
    ctx: AuthContext,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse> {
    match export_service
        .membership_snapshot(&ctx.tenant_id, &query.month)
        .await
    {
        Ok(export) => Ok(csv_attachment(export)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/reports/renewals",
    tag = "report",
    params(ReportQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当月续费记录 CSV", content_type = "text/csv"),
        (status = 400, description = "月份格式错误")
    )
)]
pub async fn renewal_report(
    export_service: web::Data<ExportService>,
    ctx: AuthContext,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse> {
    match export_service.renewal_log(&ctx.tenant_id, &query.month).await {
        Ok(export) => Ok(csv_attachment(export)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn report_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/memberships", web::get().to(membership_report))
            .route("/renewals", web::get().to(renewal_report)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_attachment_headers() {
        let resp = csv_attachment(CsvExport {
            filename: "renewals-2024-02.csv".into(),
            content: b"id\n".to_vec(),
        });
        let disposition = resp
            .headers()
            .get(actix_web::http::header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(disposition, "attachment; filename=\"renewals-2024-02.csv\"");
    }
}
