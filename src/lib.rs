pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod logging;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod swagger;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};
