//! Shared session state: auth token, transient message, reload signals.
//!
//! These are plain values handed to services explicitly through
//! [`crate::app::AppState`]; nothing here is global.

pub mod auth;
pub mod message;
pub mod reload;

pub use auth::{route_guard, AuthSession, Redirect, RouteGroup};
pub use message::{MessageCenter, MessageTicket};
pub use reload::{ReloadCoordinator, ReloadSubscription, Topic};
