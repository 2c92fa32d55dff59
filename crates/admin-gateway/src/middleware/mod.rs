//! Request middleware.
//!
//! - `auth`: shared-secret admin gate

pub mod auth;

pub use auth::{
    constant_time_compare, resolve_secret, AdminAuthorized, AdminGate, AuthError,
    ADMIN_SECRET_HEADER,
};
