pub mod admin_service;
pub mod case_service;
pub mod payment_service;

pub use admin_service::*;
pub use case_service::*;
pub use payment_service::*;
