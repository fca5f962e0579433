use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Frame counter. Wraps on overflow.
    pub frame_id: u64,
}

/// Frame clock fed with host-supplied timestamps.
///
/// The clock never reads the system time itself, so a host (or a test) fully
/// controls frame cadence. Delta time is clamped so a long stall, such as a
/// hidden browser tab or a debugger pause, does not produce one huge step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    frame_id: u64,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_max_delta(Duration::from_millis(250))
    }

    pub fn with_max_delta(dt_max: Duration) -> Self {
        Self { last: None, frame_id: 0, dt_max }
    }

    /// Timing of the most recent tick, without advancing.
    pub fn current(&self) -> FrameTime {
        FrameTime { dt: 0.0, frame_id: self.frame_id }
    }

    /// Advances the counter and returns the new `FrameTime`.
    ///
    /// The first tick reports a zero delta.
    pub fn tick(&mut self, now: Instant) -> FrameTime {
        let dt = self
            .last
            .map(|last| now.saturating_duration_since(last).min(self.dt_max))
            .unwrap_or_default();

        self.last = Some(now);
        self.frame_id = self.frame_id.wrapping_add(1);

        FrameTime { dt: dt.as_secs_f32(), frame_id: self.frame_id }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
