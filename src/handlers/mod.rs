//! HTTP handlers, one module per resource.

pub mod login;
pub mod registration;
pub mod users;
pub mod workshops;
