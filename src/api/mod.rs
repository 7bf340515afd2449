//! Powerdealer API access: transport, endpoints and wire types

pub mod auth;
pub mod client;
pub mod error;
pub mod events;
pub mod token;
pub mod types;

pub use auth::AuthApi;
pub use client::{ApiClient, ApiRequest};
pub use error::{ApiError, ErrorKind};
pub use events::SessionEvent;
