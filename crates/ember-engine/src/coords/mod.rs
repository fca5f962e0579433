//! Geometry shared between the loop controller and hosts.

mod viewport;

pub use viewport::Viewport;
