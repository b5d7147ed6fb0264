pub mod automation;
pub mod catalog;
pub mod common;
pub mod member;
pub mod membership;
pub mod pagination;
pub mod payment;
pub mod renewal;
pub mod report;
pub mod subscription;
pub mod tenant;

pub use automation::*;
pub use catalog::*;
pub use common::*;
pub use member::*;
pub use membership::*;
pub use pagination::*;
pub use payment::*;
pub use renewal::*;
pub use report::*;
pub use subscription::*;
pub use tenant::*;
