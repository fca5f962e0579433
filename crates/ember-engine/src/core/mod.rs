//! Hosted-application contracts.
//!
//! Defines the interface between the loop controller and application code:
//! the lifecycle trait, the per-call context, and the service facade.

mod app;
mod ctx;
mod services;

pub use app::App;
pub use ctx::AppCtx;
pub use services::{LifecycleListener, ListenerId, Net, Preferences, Services};
