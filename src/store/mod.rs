//! Client-side state stores

pub mod auth;
pub mod business;

pub use auth::{AuthPhase, AuthState, AuthStore};
pub use business::{BusinessState, BusinessStore};
