pub mod case;
pub mod common;
pub mod payment;
pub mod plan;
pub mod session;

pub use case::*;
pub use common::*;
pub use payment::*;
pub use plan::*;
pub use session::*;
