//! Frame timing.
//!
//! One `FrameClock` per loop; call `tick()` once per frame with the timestamp
//! the host scheduled the frame at.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
