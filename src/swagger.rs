use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    MemberStatus, MembershipStatus, PaymentStatus, PaymentType, PendingPaymentStatus,
    PriceSource, RenewalTrigger, SubscriptionRequestStatus,
};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::renewal::list_expired,
        handlers::renewal::get_stats,
        handlers::renewal::renew_membership,
        handlers::renewal::bulk_renew,
        handlers::automation::get_config,
        handlers::automation::update_config,
        handlers::automation::run_now,
        handlers::automation::list_runs,
        handlers::membership::create_membership,
        handlers::membership::list_memberships,
        handlers::membership::get_membership,
        handlers::membership::cancel_membership,
        handlers::membership::set_auto_renewal,
        handlers::membership::renewal_chain,
        handlers::member::create_member,
        handlers::member::list_members,
        handlers::member::get_member,
        handlers::catalog::create_activity,
        handlers::catalog::list_activities,
        handlers::catalog::create_plan,
        handlers::catalog::list_plans,
        handlers::payment::list_pending,
        handlers::payment::attach_proof,
        handlers::payment::mark_paid,
        handlers::report::membership_report,
        handlers::report::renewal_report,
        handlers::tenant::get_own_tenant,
        handlers::tenant::create_tenant,
        handlers::tenant::list_tenants,
        handlers::subscription::list_plans,
        handlers::subscription::create_request,
        handlers::subscription::create_plan,
        handlers::subscription::list_requests,
        handlers::subscription::approve_request,
        handlers::subscription::reject_request,
    ),
    components(
        schemas(
            MembershipStatus,
            PaymentStatus,
            PriceSource,
            RenewalTrigger,
            PendingPaymentStatus,
            PaymentType,
            MemberStatus,
            SubscriptionRequestStatus,
            ExpiredMembership,
            RenewalStats,
            RenewMembershipRequest,
            BulkRenewRequest,
            RenewedMembership,
            RenewalResult,
            RenewalFailure,
            BulkRenewalSummary,
            AutoRenewalConfigResponse,
            UpdateAutoRenewalConfigRequest,
            RenewalRunResponse,
            CreateMembershipRequest,
            SetAutoRenewalRequest,
            MembershipResponse,
            CreateMemberRequest,
            MemberResponse,
            TierInput,
            TierResponse,
            CreateActivityRequest,
            ActivityResponse,
            CreateMembershipPlanRequest,
            MembershipPlanResponse,
            PendingPaymentResponse,
            AttachProofRequest,
            CreateTenantRequest,
            TenantResponse,
            CreateSubscriptionPlanRequest,
            SubscriptionPlanResponse,
            CreateSubscriptionRequestRequest,
            ReviewSubscriptionRequest,
            SubscriptionRequestResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "renewal", description = "Expired memberships and manual/bulk renewal"),
        (name = "automation", description = "Monthly automatic renewal"),
        (name = "membership", description = "Membership assignment"),
        (name = "member", description = "Gym members"),
        (name = "catalog", description = "Activities, price tiers and plans"),
        (name = "payment", description = "Pending renewal payments"),
        (name = "report", description = "Monthly CSV exports"),
        (name = "tenant", description = "Gym profile"),
        (name = "subscription", description = "Platform subscription"),
        (name = "admin", description = "Platform administration"),
    ),
    info(
        title = "FitDesk Backend API",
        version = "1.0.0",
        description = "Gym membership renewal and expiration tracking"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_renewal_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/renewals/expired"));
        assert!(doc.paths.paths.contains_key("/renewals/bulk"));
        assert!(doc.paths.paths.contains_key("/renewals/{membership_id}"));
    }
}
