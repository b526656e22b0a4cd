pub mod admin;
pub mod case;
pub mod checkout;
pub mod page;

pub use admin::admin_config;
pub use case::case_config;
pub use checkout::checkout_config;
