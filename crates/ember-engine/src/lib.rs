//! Ember engine crate.
//!
//! Preloads a manifest of assets, then drives a hosted application's
//! `create -> resize -> render` loop on a single-threaded, callback-driven
//! host.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`preload`] | manifest parsing, asset registry, download coordinator |
//! | [`frame`] | loop controller, deferred tasks |
//! | [`core`] | `App` trait, per-call context, service facade |
//! | [`host`] | host capability traits, `ManualHost` |
//! | [`window`] | native `winit` host |

pub mod core;
pub mod coords;
pub mod error;
pub mod frame;
pub mod host;
pub mod logging;
pub mod preload;
pub mod time;
pub mod window;

mod application;

pub use application::{Application, ApplicationBuilder};
pub use error::EngineError;
