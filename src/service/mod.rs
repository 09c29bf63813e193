//! Business rules shared by every store implementation.

mod rules;
pub use rules::*;
