pub mod activities;
pub mod activity_tiers;
pub mod auto_renewal_configs;
pub mod members;
pub mod membership_plans;
pub mod memberships;
pub mod pending_payments;
pub mod renewal_runs;
pub mod subscription_plans;
pub mod subscription_requests;
pub mod tenants;

pub use activities as activity_entity;
pub use activity_tiers as activity_tier_entity;
pub use auto_renewal_configs as auto_renewal_config_entity;
pub use members as member_entity;
pub use membership_plans as membership_plan_entity;
pub use memberships as membership_entity;
pub use pending_payments as pending_payment_entity;
pub use renewal_runs as renewal_run_entity;
pub use subscription_plans as subscription_plan_entity;
pub use subscription_requests as subscription_request_entity;
pub use tenants as tenant_entity;

pub use members::MemberStatus;
pub use memberships::{MembershipStatus, PaymentStatus, PriceSource, RenewalTrigger};
pub use pending_payments::{PaymentType, PendingPaymentStatus};
pub use subscription_requests::SubscriptionRequestStatus;
