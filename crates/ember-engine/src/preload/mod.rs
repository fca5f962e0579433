//! Asset preloading.
//!
//! Flow: manifest document -> [`parse_manifest`] -> [`AssetRegistry`] ->
//! [`Preloader`] (fetch events) -> [`PreloaderCallback`] snapshots.
//!
//! The preloader never blocks and never holds state outside its registry:
//! every snapshot is recomputed from the assets, so completion order does
//! not matter.

mod asset;
mod callback;
mod coordinator;
mod manifest;
mod registry;
mod state;
mod store;

pub use asset::{Asset, AssetType, RESERVED_PREFIX};
pub use callback::{Fanout, OnProgress, PreloaderCallback, ProgressLog};
pub use coordinator::{PreloadConfig, Preloader};
pub use manifest::{parse_manifest, MANIFEST_FILE};
pub use registry::{AssetId, AssetRegistry};
pub use state::PreloaderState;
pub use store::AssetStore;
