use crate::frame::TaskQueue;
use crate::preload::AssetStore;
use crate::time::FrameTime;

use super::services::Services;

/// Per-call context passed to every [`App`](super::App) callback.
///
/// This is the only way hosted code reaches engine services; there are no
/// process-wide singletons.
pub struct AppCtx<'a> {
    /// Deferred tasks posted here run at the start of a later frame.
    pub tasks: &'a mut TaskQueue,
    pub services: &'a mut Services,
    pub assets: &'a AssetStore,
    pub time: FrameTime,
    /// Canvas size last reported to `resize`.
    pub size: (u32, u32),
}

impl<'a> AppCtx<'a> {
    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    /// Shorthand for `self.tasks.post(task)`.
    pub fn post<F>(&mut self, task: F)
    where
        F: FnOnce(&mut TaskQueue) + 'static,
    {
        self.tasks.post(task);
    }
}
