use thiserror::Error;

/// A malformed manifest line.
///
/// Fatal: a corrupt manifest aborts the whole preload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("manifest parse error at line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number inside the manifest document.
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, msg: impl Into<String>) -> Self {
        Self { line, message: msg.into() }
    }
}

/// A single asset failed to transfer.
///
/// Never returned as an `Err`; it is routed through
/// [`PreloaderCallback::error`](crate::preload::PreloaderCallback::error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch '{file}': {reason}")]
pub struct AssetFetchError {
    pub file: String,
    pub reason: String,
}

/// `create()` or the initial `resize()` of the hosted application failed.
#[derive(Debug, Error)]
#[error("application startup failed: {source:#}")]
pub struct StartupError {
    #[source]
    pub source: anyhow::Error,
}

/// A capability this host intentionally does not provide.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} is not supported on this host")]
pub struct UnsupportedOperation {
    pub operation: &'static str,
}

impl UnsupportedOperation {
    /// Creates the error and logs it immediately, so the failure is visible even
    /// when the caller drops the `Err`.
    pub(crate) fn new(operation: &'static str) -> Self {
        log::error!("[{operation}]: not implemented on this host");
        Self { operation }
    }
}

/// Errors surfaced to the host by [`Application`](crate::Application).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("manifest '{url}' could not be fetched: {reason}")]
    ManifestUnavailable { url: String, reason: String },

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("frame {frame} failed: {source:#}")]
    Frame {
        frame: u64,
        #[source]
        source: anyhow::Error,
    },
}
