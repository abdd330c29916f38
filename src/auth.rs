//! Role-based capability checks.

pub use edubooks_auth::*;
