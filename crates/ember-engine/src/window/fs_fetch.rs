use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use winit::event_loop::EventLoopProxy;

use crate::host::{FetchEvent, FetchId, FetchRequest, Fetcher};

use super::runtime::HostEvent;

const DEFAULT_CHUNK: usize = 64 * 1024;

/// Destination for transfer events produced off the loop thread.
///
/// `deliver` returns `false` once the receiving side is gone; the transfer
/// then stops.
pub trait FetchSink: Clone + Send + 'static {
    fn deliver(&self, id: FetchId, event: FetchEvent) -> bool;
}

impl FetchSink for EventLoopProxy<HostEvent> {
    fn deliver(&self, id: FetchId, event: FetchEvent) -> bool {
        self.send_event(HostEvent::Fetch { id, event }).is_ok()
    }
}

impl FetchSink for mpsc::Sender<(FetchId, FetchEvent)> {
    fn deliver(&self, id: FetchId, event: FetchEvent) -> bool {
        self.send((id, event)).is_ok()
    }
}

/// File-system fetcher.
///
/// Each request streams one file on a worker thread and posts progress,
/// success, or failure to the sink. The engine only ever sees those events
/// on the loop thread, one at a time.
pub struct FsFetcher<S> {
    sink: S,
    chunk_size: usize,
}

impl<S: FetchSink> FsFetcher<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, chunk_size: DEFAULT_CHUNK }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl<S: FetchSink> Fetcher for FsFetcher<S> {
    fn fetch(&mut self, request: FetchRequest) {
        let sink = self.sink.clone();
        let chunk_size = self.chunk_size;
        let id = request.id;
        let path = resolve(&request.url);

        log::trace!("fetch {:?} <- {}", id, path.display());

        let spawned = thread::Builder::new()
            .name("ember-fetch".to_string())
            .spawn(move || stream_file(&sink, id, &path, chunk_size));

        if let Err(e) = spawned {
            self.sink.deliver(id, FetchEvent::Failed(format!("failed to spawn fetch worker: {e}")));
        }
    }
}

/// Maps a fetch URL onto a local path. `file://` is accepted.
fn resolve(url: &str) -> PathBuf {
    PathBuf::from(url.strip_prefix("file://").unwrap_or(url))
}

fn stream_file<S: FetchSink>(sink: &S, id: FetchId, path: &Path, chunk_size: usize) {
    let event = match read_with_progress(sink, id, path, chunk_size) {
        Ok(Some(bytes)) => FetchEvent::Loaded(bytes),
        Ok(None) => return,
        Err(e) => FetchEvent::Failed(format!("{}: {e}", path.display())),
    };
    sink.deliver(id, event);
}

/// Returns `Ok(None)` when the sink went away mid-transfer.
fn read_with_progress<S: FetchSink>(
    sink: &S,
    id: FetchId,
    path: &Path,
    chunk_size: usize,
) -> io::Result<Option<Vec<u8>>> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    let mut chunk = vec![0u8; chunk_size];

    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            return Ok(Some(bytes));
        }
        bytes.extend_from_slice(&chunk[..n]);

        let loaded = bytes.len() as u64;
        if !sink.deliver(id, FetchEvent::Progress { loaded }) {
            return Ok(None);
        }
    }
}
