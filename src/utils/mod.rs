pub mod card;
pub mod password;
pub mod session_token;

pub use card::*;
pub use password::secrets_match;
pub use session_token::{SESSION_COOKIE, SessionTokenService};
