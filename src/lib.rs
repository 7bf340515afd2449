//! Powerdealer client - session-aware front end for the Powerdealer API
//!
//! This crate handles:
//! - Bearer-token HTTP transport with one-shot access-token refresh
//! - Signup, login, logout and session restoration
//! - Business profile fetch/update
//! - Route guarding based on authentication state

pub mod api;
pub mod app;
pub mod config;
pub mod router;
pub mod storage;
pub mod store;

pub use app::AppContext;
pub use config::Config;
