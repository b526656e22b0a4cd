#[cfg(test)]
pub mod memory;
pub mod supabase;

pub use supabase::*;
