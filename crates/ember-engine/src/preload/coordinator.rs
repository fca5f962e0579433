use crate::error::{AssetFetchError, EngineError, ParseError};
use crate::host::{FetchEvent, FetchId, FetchRequest, Fetcher};

use super::asset::AssetType;
use super::callback::PreloaderCallback;
use super::manifest::{parse_manifest, MANIFEST_FILE};
use super::registry::{AssetId, AssetRegistry};
use super::state::PreloaderState;
use super::store::AssetStore;

/// Where assets are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadConfig {
    /// Base URL (or directory, for file-system hosts) of the asset bundle.
    pub base_url: String,
}

impl PreloadConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    /// `<base_url>/assets.txt`
    pub fn manifest_url(&self) -> String {
        self.asset_url(MANIFEST_FILE)
    }

    pub fn asset_url(&self, file: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file)
    }
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self::new("assets")
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Phase {
    Idle,
    FetchingManifest,
    Loading,
    Ended,
    Aborted,
}

/// Download coordinator.
///
/// Tracks every preload-eligible asset of the manifest, turns transfer events
/// into asset state, and reports an aggregate [`PreloaderState`] after each
/// event. Fetch requests are buffered and handed to the host with
/// [`flush_requests`](Self::flush_requests) once the current event returns.
#[derive(Debug)]
pub struct Preloader {
    config: PreloadConfig,
    registry: AssetRegistry,
    store: AssetStore,
    phase: Phase,
    outbox: Vec<FetchRequest>,
}

impl Preloader {
    pub fn new(config: PreloadConfig, store: AssetStore) -> Self {
        Self {
            config,
            registry: AssetRegistry::default(),
            store,
            phase: Phase::Idle,
            outbox: Vec::new(),
        }
    }

    pub fn config(&self) -> &PreloadConfig {
        &self.config
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Snapshot of the current aggregate state.
    pub fn state(&self) -> PreloaderState {
        PreloaderState::from_registry(&self.registry)
    }

    /// True once the end-of-preload snapshot has been delivered.
    pub fn has_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// Queues the manifest fetch. Only the first call has an effect.
    pub fn preload(&mut self) {
        if self.phase != Phase::Idle {
            log::warn!("preload already started; ignored");
            return;
        }

        let url = self.config.manifest_url();
        log::debug!("preload: fetching manifest {url}");
        self.phase = Phase::FetchingManifest;
        self.outbox.push(FetchRequest {
            id: FetchId::Manifest,
            url,
            kind: AssetType::Text,
            mime_type: "text/plain".to_string(),
        });
    }

    /// Hands every queued request to `fetcher`, in the order queued.
    pub fn flush_requests<F: Fetcher + ?Sized>(&mut self, fetcher: &mut F) {
        for request in self.outbox.drain(..) {
            fetcher.fetch(request);
        }
    }

    /// Number of requests waiting for [`flush_requests`](Self::flush_requests).
    pub fn queued_requests(&self) -> usize {
        self.outbox.len()
    }

    /// Routes one transfer event.
    pub fn handle_event<C: PreloaderCallback + ?Sized>(
        &mut self,
        id: FetchId,
        event: FetchEvent,
        callback: &mut C,
    ) -> Result<(), EngineError> {
        match id {
            FetchId::Manifest => self.on_manifest_event(event, callback),
            FetchId::Asset(asset) => self.on_asset_event(asset, event, callback),
        }
    }

    /// Installs a manifest document and starts every asset transfer.
    ///
    /// Emits one snapshot after the requests are queued, so an empty preload
    /// set completes right away.
    pub fn load_manifest<C: PreloaderCallback + ?Sized>(
        &mut self,
        src: &str,
        callback: &mut C,
    ) -> Result<(), EngineError> {
        if !matches!(self.phase, Phase::Idle | Phase::FetchingManifest) {
            log::warn!("manifest already loaded; ignored");
            return Ok(());
        }

        let assets = match parse_manifest(src) {
            Ok(assets) => assets,
            Err(e) => {
                self.phase = Phase::Aborted;
                log::error!("preload aborted: {e}");
                return Err(e.into());
            }
        };

        self.registry = AssetRegistry::new(assets);
        self.phase = Phase::Loading;
        self.start_downloads();
        self.notify(callback)
    }

    fn start_downloads(&mut self) {
        let ids: Vec<AssetId> = self.registry.tracked().map(|(id, _)| id).collect();
        let mut issued = 0usize;

        for id in ids {
            let Some(asset) = self.registry.get_mut(id) else { continue };
            asset.mark_download_started();

            // Directories carry no bytes; nothing to transfer.
            if asset.kind() == AssetType::Directory {
                asset.mark_succeeded();
                continue;
            }

            self.outbox.push(FetchRequest {
                id: FetchId::Asset(id),
                url: self.config.asset_url(asset.file()),
                kind: asset.kind(),
                mime_type: asset.mime_type().to_string(),
            });
            issued += 1;
        }

        log::debug!(
            "preload: {issued} fetches issued, {} bytes declared",
            self.registry.total_size()
        );
    }

    fn on_manifest_event<C: PreloaderCallback + ?Sized>(
        &mut self,
        event: FetchEvent,
        callback: &mut C,
    ) -> Result<(), EngineError> {
        if self.phase != Phase::FetchingManifest {
            log::debug!("manifest event outside of manifest fetch; ignored");
            return Ok(());
        }

        match event {
            FetchEvent::Progress { .. } => Ok(()),
            FetchEvent::Loaded(bytes) => match std::str::from_utf8(&bytes) {
                Ok(src) => self.load_manifest(src, callback),
                Err(e) => {
                    let valid = &bytes[..e.valid_up_to()];
                    let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
                    let err = ParseError::new(line, format!("invalid UTF-8: {e}"));
                    self.phase = Phase::Aborted;
                    log::error!("preload aborted: {err}");
                    Err(err.into())
                }
            },
            FetchEvent::Failed(reason) => {
                let url = self.config.manifest_url();
                self.phase = Phase::Aborted;
                callback.error(&AssetFetchError { file: url.clone(), reason: reason.clone() });
                Err(EngineError::ManifestUnavailable { url, reason })
            }
        }
    }

    fn on_asset_event<C: PreloaderCallback + ?Sized>(
        &mut self,
        id: AssetId,
        event: FetchEvent,
        callback: &mut C,
    ) -> Result<(), EngineError> {
        if self.phase != Phase::Loading {
            log::debug!("event for {id:?} after preload ended; ignored");
            return Ok(());
        }

        let Some(asset) = self.registry.get_mut(id) else {
            log::warn!("event for unknown asset {id:?}; ignored");
            return Ok(());
        };

        if !asset.download_started() || asset.is_settled() {
            log::trace!("stale event for '{}'; ignored", asset.file());
            return Ok(());
        }

        match event {
            FetchEvent::Progress { loaded } => asset.set_bytes_loaded(loaded),
            FetchEvent::Loaded(bytes) => {
                self.store.insert(asset.file(), bytes);
                asset.mark_succeeded();
                log::trace!("loaded '{}'", asset.file());
            }
            FetchEvent::Failed(reason) => {
                asset.mark_failed();
                let failure = AssetFetchError { file: asset.file().to_string(), reason };
                log::warn!("{failure}");
                callback.error(&failure);
            }
        }

        self.notify(callback)
    }

    fn notify<C: PreloaderCallback + ?Sized>(&mut self, callback: &mut C) -> Result<(), EngineError> {
        let state = self.state();
        if state.has_ended {
            // Latch before calling out: the end snapshot is delivered once.
            self.phase = Phase::Ended;
            log::info!("preload finished: {} assets", self.registry.tracked().count());
        }
        callback.update(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ManualHost;

    #[derive(Default)]
    struct Recorder {
        errors: Vec<String>,
        states: Vec<PreloaderState>,
    }

    impl PreloaderCallback for Recorder {
        fn error(&mut self, failure: &AssetFetchError) {
            self.errors.push(failure.file.clone());
        }

        fn update(&mut self, state: &PreloaderState) -> Result<(), EngineError> {
            self.states.push(*state);
            Ok(())
        }
    }

    impl Recorder {
        fn ended_count(&self) -> usize {
            self.states.iter().filter(|s| s.has_ended).count()
        }
    }

    const MANIFEST: &str = "i:logo.png:100:image/png:1\n\
                            t:notes.txt:10:text/plain:0\n\
                            b:ember/core.bin:300:application/octet-stream:0\n";

    fn loaded(cb: &mut Recorder) -> (Preloader, ManualHost) {
        let mut p = Preloader::new(PreloadConfig::new("http://cdn/game/"), AssetStore::new());
        let mut host = ManualHost::default();
        p.load_manifest(MANIFEST, cb).unwrap();
        p.flush_requests(&mut host);
        (p, host)
    }

    fn asset(id: usize) -> FetchId {
        FetchId::Asset(AssetId(id))
    }

    #[test]
    fn config_urls() {
        let c = PreloadConfig::new("http://cdn/game/");
        assert_eq!(c.manifest_url(), "http://cdn/game/assets.txt");
        assert_eq!(c.asset_url("a/b.png"), "http://cdn/game/a/b.png");
    }

    #[test]
    fn preload_queues_manifest_once() {
        let mut p = Preloader::new(PreloadConfig::default(), AssetStore::new());
        p.preload();
        p.preload();
        assert_eq!(p.queued_requests(), 1);

        let mut host = ManualHost::default();
        p.flush_requests(&mut host);
        let req = host.next_request().unwrap();
        assert_eq!(req.id, FetchId::Manifest);
        assert_eq!(req.url, "assets/assets.txt");
    }

    #[test]
    fn fetches_tracked_assets_in_manifest_order() {
        let mut cb = Recorder::default();
        let (p, host) = loaded(&mut cb);

        let urls: Vec<&str> = host.issued().iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["http://cdn/game/logo.png", "http://cdn/game/ember/core.bin"]);
        assert!(p.registry().get(AssetId(0)).unwrap().download_started());
        assert!(!p.registry().get(AssetId(1)).unwrap().download_started());

        // Initial snapshot.
        assert_eq!(cb.states, vec![PreloaderState { progress: 0.0, has_ended: false }]);
    }

    #[test]
    fn progress_success_and_end() {
        let mut cb = Recorder::default();
        let (mut p, _host) = loaded(&mut cb);

        p.handle_event(asset(2), FetchEvent::Progress { loaded: 100 }, &mut cb).unwrap();
        assert_eq!(cb.states.last().unwrap().progress, 0.25);

        p.handle_event(asset(0), FetchEvent::Loaded(vec![1; 100]), &mut cb).unwrap();
        assert_eq!(cb.states.last().unwrap().progress, 0.5);
        assert!(!p.has_ended());

        p.handle_event(asset(2), FetchEvent::Loaded(vec![2; 300]), &mut cb).unwrap();
        let last = cb.states.last().unwrap();
        assert_eq!(last.progress, 1.0);
        assert!(last.has_ended);
        assert!(p.has_ended());
        assert_eq!(p.store().bytes("logo.png").unwrap().len(), 100);
    }

    #[test]
    fn failure_reports_path_and_still_ends() {
        let mut cb = Recorder::default();
        let (mut p, _host) = loaded(&mut cb);

        p.handle_event(asset(0), FetchEvent::Failed("404".into()), &mut cb).unwrap();
        assert_eq!(cb.errors, vec!["logo.png"]);
        assert_eq!(cb.ended_count(), 0);

        p.handle_event(asset(2), FetchEvent::Loaded(Vec::new()), &mut cb).unwrap();
        assert_eq!(cb.ended_count(), 1);
        assert!(!p.store().contains("logo.png"));
    }

    #[test]
    fn end_is_delivered_exactly_once() {
        let mut cb = Recorder::default();
        let (mut p, _host) = loaded(&mut cb);

        p.handle_event(asset(0), FetchEvent::Loaded(Vec::new()), &mut cb).unwrap();
        p.handle_event(asset(2), FetchEvent::Loaded(Vec::new()), &mut cb).unwrap();
        // Duplicate and late events after the end.
        p.handle_event(asset(2), FetchEvent::Loaded(Vec::new()), &mut cb).unwrap();
        p.handle_event(asset(0), FetchEvent::Failed("late".into()), &mut cb).unwrap();
        p.handle_event(asset(0), FetchEvent::Progress { loaded: 1 }, &mut cb).unwrap();

        assert_eq!(cb.ended_count(), 1);
        assert!(cb.errors.is_empty());
        assert_eq!(cb.states.len(), 3);
    }

    #[test]
    fn settled_asset_ignores_further_events() {
        let mut cb = Recorder::default();
        let (mut p, _host) = loaded(&mut cb);

        p.handle_event(asset(0), FetchEvent::Loaded(Vec::new()), &mut cb).unwrap();
        p.handle_event(asset(0), FetchEvent::Failed("late".into()), &mut cb).unwrap();

        let a = p.registry().get(AssetId(0)).unwrap();
        assert!(a.succeeded());
        assert!(!a.failed());
        assert_eq!(a.bytes_loaded(), 100);
    }

    #[test]
    fn untracked_asset_events_are_ignored() {
        let mut cb = Recorder::default();
        let (mut p, _host) = loaded(&mut cb);
        p.handle_event(asset(1), FetchEvent::Loaded(b"x".to_vec()), &mut cb).unwrap();
        assert_eq!(cb.states.len(), 1);
        assert!(!p.store().contains("notes.txt"));
    }

    #[test]
    fn nothing_to_load_ends_immediately() {
        let mut cb = Recorder::default();
        let mut p = Preloader::new(PreloadConfig::default(), AssetStore::new());
        p.load_manifest("t:optional.txt:10:text/plain:0\n", &mut cb).unwrap();
        assert_eq!(p.queued_requests(), 0);
        assert_eq!(cb.states, vec![PreloaderState { progress: 1.0, has_ended: true }]);
    }

    #[test]
    fn zero_sized_assets_report_full_progress() {
        let mut cb = Recorder::default();
        let mut p = Preloader::new(PreloadConfig::default(), AssetStore::new());
        p.load_manifest("t:empty.txt:0:text/plain:1\n", &mut cb).unwrap();
        assert_eq!(cb.states, vec![PreloaderState { progress: 1.0, has_ended: false }]);
    }

    #[test]
    fn directories_settle_without_fetch() {
        let mut cb = Recorder::default();
        let mut p = Preloader::new(PreloadConfig::default(), AssetStore::new());
        p.load_manifest("d:levels:0:application/octet-stream:1\n", &mut cb).unwrap();
        assert_eq!(p.queued_requests(), 0);
        assert_eq!(cb.ended_count(), 1);
    }

    #[test]
    fn manifest_fetch_round_trip() {
        let mut cb = Recorder::default();
        let mut p = Preloader::new(PreloadConfig::default(), AssetStore::new());
        p.preload();
        p.handle_event(FetchId::Manifest, FetchEvent::Progress { loaded: 5 }, &mut cb).unwrap();
        p.handle_event(FetchId::Manifest, FetchEvent::Loaded(MANIFEST.as_bytes().to_vec()), &mut cb).unwrap();
        assert_eq!(p.registry().len(), 3);
        assert_eq!(p.queued_requests(), 3); // manifest + two assets
    }

    #[test]
    fn manifest_failure_is_fatal() {
        let mut cb = Recorder::default();
        let mut p = Preloader::new(PreloadConfig::new("base"), AssetStore::new());
        p.preload();
        let err = p
            .handle_event(FetchId::Manifest, FetchEvent::Failed("offline".into()), &mut cb)
            .unwrap_err();
        assert!(matches!(err, EngineError::ManifestUnavailable { .. }));
        assert_eq!(cb.errors, vec!["base/assets.txt"]);
        assert!(cb.states.is_empty());
    }

    #[test]
    fn overflowing_manifest_aborts_without_panicking() {
        let mut cb = Recorder::default();
        let mut p = Preloader::new(PreloadConfig::default(), AssetStore::new());
        let err = p
            .load_manifest("b:a.bin:18446744073709551615:x/y:1\nb:b.bin:1:x/y:1\n", &mut cb)
            .unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
        assert_eq!(p.queued_requests(), 0);
        assert!(cb.states.is_empty());
    }

    #[test]
    fn non_utf8_manifest_aborts() {
        let mut cb = Recorder::default();
        let mut p = Preloader::new(PreloadConfig::default(), AssetStore::new());
        p.preload();
        let bytes = b"t:a.txt:1:text/plain:1\ni:lo\xffgo.png:1:image/png:1\n".to_vec();

        let err = p.handle_event(FetchId::Manifest, FetchEvent::Loaded(bytes), &mut cb).unwrap_err();
        match err {
            EngineError::Parse(e) => assert_eq!(e.line, 2),
            other => panic!("unexpected {other:?}"),
        }
        assert!(p.registry().is_empty());
        assert_eq!(p.queued_requests(), 1); // only the manifest request
        assert!(cb.states.is_empty());
    }

    #[test]
    fn malformed_manifest_aborts() {
        let mut cb = Recorder::default();
        let mut p = Preloader::new(PreloadConfig::default(), AssetStore::new());
        let err = p.load_manifest("i:a.png:1:image/png:1\nbroken\n", &mut cb).unwrap_err();
        match err {
            EngineError::Parse(e) => assert_eq!(e.line, 2),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(p.queued_requests(), 0);
        assert!(cb.states.is_empty());
    }
}
