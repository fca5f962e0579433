use crate::error::{AssetFetchError, EngineError};

use super::state::PreloaderState;

/// Notification sink for preload events.
///
/// Both methods are called synchronously, in-line with the asset event that
/// caused them. An `Err` from `update` aborts the current event and is handed
/// back to the host.
pub trait PreloaderCallback {
    fn error(&mut self, failure: &AssetFetchError);

    fn update(&mut self, state: &PreloaderState) -> Result<(), EngineError>;
}

impl<T: PreloaderCallback + ?Sized> PreloaderCallback for &mut T {
    fn error(&mut self, failure: &AssetFetchError) {
        (**self).error(failure);
    }

    fn update(&mut self, state: &PreloaderState) -> Result<(), EngineError> {
        (**self).update(state)
    }
}

impl<T: PreloaderCallback + ?Sized> PreloaderCallback for Box<T> {
    fn error(&mut self, failure: &AssetFetchError) {
        (**self).error(failure);
    }

    fn update(&mut self, state: &PreloaderState) -> Result<(), EngineError> {
        (**self).update(state)
    }
}

/// Forwards every call to `first`, then to `second`.
///
/// If `first.update` fails, `second` is not called for that snapshot.
pub struct Fanout<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Fanout<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: PreloaderCallback, B: PreloaderCallback> PreloaderCallback for Fanout<A, B> {
    fn error(&mut self, failure: &AssetFetchError) {
        self.first.error(failure);
        self.second.error(failure);
    }

    fn update(&mut self, state: &PreloaderState) -> Result<(), EngineError> {
        self.first.update(state)?;
        self.second.update(state)
    }
}

/// Progress listener backed by a closure. Errors are logged.
pub struct OnProgress<F>(pub F);

impl<F: FnMut(&PreloaderState)> PreloaderCallback for OnProgress<F> {
    fn error(&mut self, failure: &AssetFetchError) {
        log::warn!("preload error: {}", failure.file);
    }

    fn update(&mut self, state: &PreloaderState) -> Result<(), EngineError> {
        (self.0)(state);
        Ok(())
    }
}

/// Default progress display: reports whole-percent steps through the log.
#[derive(Debug, Default)]
pub struct ProgressLog {
    last_percent: Option<u32>,
}

impl PreloaderCallback for ProgressLog {
    fn error(&mut self, failure: &AssetFetchError) {
        log::error!("error: {}", failure.file);
    }

    fn update(&mut self, state: &PreloaderState) -> Result<(), EngineError> {
        let percent = (state.progress * 100.0).floor() as u32;
        if self.last_percent != Some(percent) {
            self.last_percent = Some(percent);
            log::info!("preloading assets: {percent}%");
        }
        Ok(())
    }
}
