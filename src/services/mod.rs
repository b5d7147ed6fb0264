pub mod automation_service;
pub mod catalog_service;
pub mod expiration_service;
pub mod export_service;
pub mod member_service;
pub mod membership_service;
pub mod payment_service;
pub mod renewal_service;
pub mod subscription_service;
pub mod tenant_service;

pub use automation_service::*;
pub use catalog_service::*;
pub use expiration_service::*;
pub use export_service::*;
pub use member_service::*;
pub use membership_service::*;
pub use payment_service::*;
pub use renewal_service::*;
pub use subscription_service::*;
pub use tenant_service::*;
