//! End-to-end preload -> startup -> frame loop, driven by `ManualHost`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use ember_engine::core::{App, AppCtx};
use ember_engine::frame::LoopState;
use ember_engine::host::{FetchEvent, FetchId, ManualHost};
use ember_engine::preload::{AssetId, OnProgress, PreloaderState};
use ember_engine::{Application, EngineError};

type Log = Rc<RefCell<Vec<String>>>;

struct Game {
    log: Log,
}

impl App for Game {
    fn create(&mut self, ctx: &mut AppCtx<'_>) -> anyhow::Result<()> {
        let logo = ctx.assets.bytes("logo.png").map(|b| b.len()).unwrap_or(0);
        self.log.borrow_mut().push(format!("create logo={logo}"));
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32, _ctx: &mut AppCtx<'_>) -> anyhow::Result<()> {
        self.log.borrow_mut().push(format!("resize {width}x{height}"));
        Ok(())
    }

    fn render(&mut self, ctx: &mut AppCtx<'_>) -> anyhow::Result<()> {
        self.log.borrow_mut().push(format!("render {}", ctx.time.frame_id));
        Ok(())
    }
}

struct Harness {
    host: ManualHost,
    app: Application<Game>,
    log: Log,
    progress: Rc<RefCell<Vec<PreloaderState>>>,
    errors: Rc<RefCell<Vec<String>>>,
}

struct Listener {
    progress: Rc<RefCell<Vec<PreloaderState>>>,
    errors: Rc<RefCell<Vec<String>>>,
}

impl ember_engine::preload::PreloaderCallback for Listener {
    fn error(&mut self, failure: &ember_engine::error::AssetFetchError) {
        self.errors.borrow_mut().push(failure.file.clone());
    }

    fn update(&mut self, state: &PreloaderState) -> Result<(), EngineError> {
        self.progress.borrow_mut().push(*state);
        Ok(())
    }
}

fn harness(manifest: &str) -> Harness {
    let log = Log::default();
    let progress = Rc::new(RefCell::new(Vec::new()));
    let errors = Rc::new(RefCell::new(Vec::new()));
    let mut host = ManualHost::new(800, 600);

    let mut app = Application::builder(Game { log: log.clone() })
        .asset_base("https://cdn.test/game")
        .progress(Listener { progress: progress.clone(), errors: errors.clone() })
        .launch(&mut host)
        .unwrap();

    let manifest_req = host.next_request().unwrap();
    assert_eq!(manifest_req.id, FetchId::Manifest);
    assert_eq!(manifest_req.url, "https://cdn.test/game/assets.txt");
    app.on_fetch_event(&mut host, FetchId::Manifest, FetchEvent::Loaded(manifest.as_bytes().to_vec()))
        .unwrap();

    Harness { host, app, log, progress, errors }
}

impl Harness {
    fn send(&mut self, asset: usize, event: FetchEvent) {
        self.app
            .on_fetch_event(&mut self.host, FetchId::Asset(AssetId(asset)), event)
            .unwrap();
    }

    fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn ended(&self) -> usize {
        self.progress.borrow().iter().filter(|s| s.has_ended).count()
    }
}

#[test]
fn reserved_prefix_asset_is_preloaded_and_app_starts_once() {
    let mut h = harness("0:logo.png:1024:image/png:1\n2:ember/data.txt:100:text/plain:0\n");

    let reg = h.app.preloader().registry();
    assert_eq!(reg.len(), 2);
    assert!(reg.get(AssetId(1)).unwrap().should_preload());

    let urls: Vec<String> = h.host.take_requests().into_iter().map(|r| r.url).collect();
    assert_eq!(urls, vec!["https://cdn.test/game/logo.png", "https://cdn.test/game/ember/data.txt"]);

    h.send(0, FetchEvent::Progress { loaded: 512 });
    h.send(1, FetchEvent::Loaded(vec![b'x'; 100]));
    assert_eq!(h.app.state(), LoopState::AwaitingAssets);
    h.send(0, FetchEvent::Loaded(vec![0; 1024]));

    let state = h.app.preloader_state();
    assert_eq!(state.progress, 1.0);
    assert!(state.has_ended);
    assert_eq!(h.ended(), 1);
    assert_eq!(h.app.state(), LoopState::Running);
    assert_eq!(h.log(), vec!["create logo=1024", "resize 800x600"]);

    // Ticking begins.
    let t0 = Instant::now();
    for i in 0..3 {
        assert!(h.host.take_frame());
        h.app.on_frame(&mut h.host, t0 + Duration::from_millis(16 * i)).unwrap();
    }
    assert_eq!(h.log()[2..], ["render 1", "render 2", "render 3"]);

    // A late duplicate does not start the app again.
    h.send(0, FetchEvent::Loaded(Vec::new()));
    assert_eq!(h.log().iter().filter(|l| l.starts_with("create")).count(), 1);
}

#[test]
fn failed_asset_reports_once_and_does_not_block_completion() {
    let mut h = harness("i:ok.png:10:image/png:1\nb:broken.bin:10:application/octet-stream:1\n");
    h.host.take_requests();

    h.send(0, FetchEvent::Loaded(vec![0; 10]));
    h.send(1, FetchEvent::Failed("HTTP 404".into()));

    assert_eq!(*h.errors.borrow(), vec!["broken.bin"]);
    assert_eq!(h.ended(), 1);
    assert_eq!(h.app.state(), LoopState::Running);

    let failed = h.app.preloader().registry().by_path("broken.bin").unwrap();
    assert!(failed.failed());
    assert!(!failed.succeeded());
    // Progress never reached 1.0: the failed asset's bytes are missing.
    assert_eq!(h.app.preloader_state().progress, 0.5);
}

#[test]
fn zero_total_size_is_complete_progress_without_events() {
    let h = harness("t:empty.txt:0:text/plain:1\nt:other.txt:0:text/plain:0\n");
    let first = h.progress.borrow()[0];
    assert_eq!(first.progress, 1.0);
    assert!(!first.has_ended);
}

#[test]
fn nothing_to_preload_starts_right_after_manifest() {
    let mut h = harness("t:optional.txt:10:text/plain:0\n");
    assert_eq!(h.app.state(), LoopState::Running);
    assert!(h.host.take_requests().is_empty());
    assert_eq!(h.ended(), 1);
}

#[test]
fn progress_is_non_decreasing_across_interleaved_events() {
    let mut h = harness(
        "b:a.bin:100:application/octet-stream:1\n\
         b:b.bin:300:application/octet-stream:1\n\
         b:c.bin:600:application/octet-stream:1\n",
    );

    for (asset, event) in [
        (2, FetchEvent::Progress { loaded: 100 }),
        (0, FetchEvent::Progress { loaded: 50 }),
        (1, FetchEvent::Progress { loaded: 300 }),
        (2, FetchEvent::Progress { loaded: 400 }),
        (0, FetchEvent::Loaded(Vec::new())),
        (1, FetchEvent::Loaded(Vec::new())),
        (2, FetchEvent::Loaded(Vec::new())),
    ] {
        h.send(asset, event);
    }

    let states = h.progress.borrow();
    assert!(states.windows(2).all(|w| w[1].progress >= w[0].progress));
    assert_eq!(states.last().unwrap().progress, 1.0);
    assert_eq!(states.iter().filter(|s| s.has_ended).count(), 1);
    assert!(states.last().unwrap().has_ended);
}

#[test]
fn bad_manifest_aborts_the_preload() {
    let mut host = ManualHost::new(1, 1);
    let mut app = Application::builder(Game { log: Log::default() })
        .progress(OnProgress(|_: &PreloaderState| {}))
        .launch(&mut host)
        .unwrap();

    let err = app
        .on_fetch_event(&mut host, FetchId::Manifest, FetchEvent::Loaded(b"i:a.png:1:image/png\n".to_vec()))
        .unwrap_err();
    assert!(matches!(err, EngineError::Parse(_)));
    assert_eq!(app.state(), LoopState::AwaitingAssets);
}

#[test]
fn canvas_resize_reaches_the_app_once() {
    let mut h = harness("");
    assert_eq!(h.app.state(), LoopState::Running);

    let now = Instant::now();
    h.host.set_size(1024, 768);
    h.app.on_frame(&mut h.host, now).unwrap();
    h.app.on_frame(&mut h.host, now).unwrap();

    assert_eq!(
        h.log(),
        vec!["create logo=0", "resize 800x600", "resize 1024x768", "render 1", "render 2"]
    );
}
