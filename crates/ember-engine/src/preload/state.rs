use super::registry::AssetRegistry;

/// Immutable progress snapshot handed to [`PreloaderCallback::update`](super::PreloaderCallback::update).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PreloaderState {
    /// Loaded fraction in `[0, 1]`.
    pub progress: f32,
    /// Every tracked asset has settled.
    pub has_ended: bool,
}

impl PreloaderState {
    /// Builds a snapshot from the current registry contents.
    ///
    /// Progress is `1.0` when there is nothing to load.
    pub fn from_registry(registry: &AssetRegistry) -> Self {
        let total = registry.total_size();
        let progress = if total == 0 {
            1.0
        } else {
            (registry.bytes_loaded() as f64 / total as f64).min(1.0) as f32
        };

        Self {
            progress,
            has_ended: registry.all_settled(),
        }
    }

    pub fn has_ended(&self) -> bool {
        self.has_ended
    }
}
