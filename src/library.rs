//! Circulation services.

pub use edubooks_library::*;
