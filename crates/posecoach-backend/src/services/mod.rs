//! Backend service handlers for frontend-driven requests.
//!
//! Each handler operates on the shared `AppContext`, drives the session
//! coordinator and reports results or notifications back to the frontend.

pub mod config_service;
pub mod route_service;
pub mod session_service;

/// Represents a type that is used in all handlers as an application context.
pub(crate) type AppContextHandle = std::sync::Arc<crate::app::AppContext>;
