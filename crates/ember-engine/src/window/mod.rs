//! Native desktop host.
//!
//! Owns the `winit` event loop and window and maps the engine's host traits
//! onto them: `request_redraw` for frame scheduling, worker-thread file reads
//! posted back as user events for fetching.

mod fs_fetch;
mod runtime;

pub use fs_fetch::{FetchSink, FsFetcher};
pub use runtime::{HostEvent, NativeHost, Runtime, RuntimeConfig};
