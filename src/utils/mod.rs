pub mod dates;
pub mod jwt;
pub mod validation;

pub use jwt::*;
