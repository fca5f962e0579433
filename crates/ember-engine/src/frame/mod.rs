//! Frame loop: lifecycle state machine, per-frame tick, deferred tasks.

mod controller;
mod tasks;

pub use controller::{LoopController, LoopState};
pub use tasks::{Task, TaskQueue};
