//! Host capabilities consumed by the engine.
//!
//! The engine never talks to a window system, a network stack, or a frame
//! timer directly. It goes through three narrow traits so the same core runs
//! on the native [`window`](crate::window) host, in tests on [`ManualHost`],
//! or on any other single-threaded event loop:
//! - [`Surface`]: canvas size and viewport
//! - [`FrameScheduler`]: arm exactly one future frame callback
//! - [`Fetcher`]: start a transfer whose events arrive later
//!
//! Hosts deliver callbacks one at a time. Fetch events go to
//! [`Application::on_fetch_event`](crate::Application::on_fetch_event), armed
//! frames to [`Application::on_frame`](crate::Application::on_frame).

mod manual;

pub use manual::ManualHost;

use crate::coords::Viewport;
use crate::preload::{AssetId, AssetType};

/// Canvas / back-buffer access.
pub trait Surface {
    /// Current drawable size as `(width, height)`.
    fn size(&self) -> (u32, u32);

    fn set_viewport(&mut self, viewport: Viewport);
}

/// Per-frame scheduling primitive.
///
/// A request fires once; it must be re-armed every frame.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Asynchronous transfer primitive.
///
/// `fetch` must not block and must not deliver events from inside the call.
pub trait Fetcher {
    fn fetch(&mut self, request: FetchRequest);
}

/// Everything the engine needs from a host.
pub trait Host: Surface + FrameScheduler + Fetcher {}

impl<T: Surface + FrameScheduler + Fetcher + ?Sized> Host for T {}

/// Opaque token echoed back with every [`FetchEvent`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FetchId {
    Manifest,
    Asset(AssetId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub id: FetchId,
    pub url: String,
    pub kind: AssetType,
    pub mime_type: String,
}

/// Transfer events reported by a [`Fetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// Total bytes received so far.
    Progress { loaded: u64 },
    Loaded(Vec<u8>),
    Failed(String),
}
