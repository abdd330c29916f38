//! Domain records, errors and the loan policy.

pub use edubooks_core::*;
