pub mod automation;
pub mod catalog;
pub mod member;
pub mod membership;
pub mod payment;
pub mod renewal;
pub mod report;
pub mod subscription;
pub mod tenant;

pub use automation::automation_config;
pub use catalog::catalog_config;
pub use member::member_config;
pub use membership::membership_config;
pub use payment::payment_config;
pub use renewal::renewal_config;
pub use report::report_config;
pub use subscription::subscription_config;
pub use tenant::tenant_config;
