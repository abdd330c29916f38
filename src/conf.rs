//! Layered settings.

pub use edubooks_conf::*;
