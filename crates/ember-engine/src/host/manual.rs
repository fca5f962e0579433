use std::collections::VecDeque;

use crate::coords::Viewport;

use super::{FetchRequest, FrameScheduler, Fetcher, Surface};

/// Deterministic in-memory host.
///
/// Nothing happens on its own: fetch requests are queued for the driver to
/// answer, and an armed frame only fires when the driver takes it. Used by
/// tests and headless drivers to control event ordering and frame cadence.
#[derive(Debug, Default)]
pub struct ManualHost {
    size: (u32, u32),
    frame_armed: bool,
    frame_requests: usize,
    viewports: Vec<Viewport>,
    pending: VecDeque<FetchRequest>,
    issued: Vec<FetchRequest>,
}

impl ManualHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self { size: (width, height), ..Self::default() }
    }

    /// Simulates a canvas resize. Observed on the next frame.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    /// Consumes the armed frame, if any. Returns whether one was armed.
    pub fn take_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_armed)
    }

    pub fn frame_armed(&self) -> bool {
        self.frame_armed
    }

    /// Number of `request_frame` calls so far.
    pub fn frame_requests(&self) -> usize {
        self.frame_requests
    }

    /// Viewports applied so far, oldest first.
    pub fn viewports(&self) -> &[Viewport] {
        &self.viewports
    }

    /// Pops the oldest fetch request not yet answered.
    pub fn next_request(&mut self) -> Option<FetchRequest> {
        self.pending.pop_front()
    }

    /// Drains every outstanding fetch request.
    pub fn take_requests(&mut self) -> Vec<FetchRequest> {
        self.pending.drain(..).collect()
    }

    /// Every fetch request ever issued, in order.
    pub fn issued(&self) -> &[FetchRequest] {
        &self.issued
    }
}

impl Surface for ManualHost {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewports.push(viewport);
    }
}

impl FrameScheduler for ManualHost {
    fn request_frame(&mut self) {
        self.frame_armed = true;
        self.frame_requests += 1;
    }
}

impl Fetcher for ManualHost {
    fn fetch(&mut self, request: FetchRequest) {
        self.issued.push(request.clone());
        self.pending.push_back(request);
    }
}
