use std::time::Instant;

use crate::core::{App, Services};
use crate::error::{AssetFetchError, EngineError, UnsupportedOperation};
use crate::frame::{LoopController, LoopState, TaskQueue};
use crate::host::{FetchEvent, FetchId, FrameScheduler, Host, Surface};
use crate::preload::{
    AssetStore, Fanout, PreloadConfig, Preloader, PreloaderCallback, PreloaderState, ProgressLog,
};

/// Builder for [`Application`].
///
/// ```rust,ignore
/// let app = Application::builder(MyGame::default())
///     .asset_base("https://cdn.example.com/game")
///     .progress(OnProgress(|s| bar.set(s.progress)))
///     .launch(&mut host)?;
/// ```
pub struct ApplicationBuilder<A> {
    app: A,
    config: PreloadConfig,
    progress: Box<dyn PreloaderCallback>,
    manifest: Option<String>,
    services: Services,
}

impl<A: App> ApplicationBuilder<A> {
    pub fn config(mut self, config: PreloadConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the asset base URL; the manifest is read from `<base>/assets.txt`.
    pub fn asset_base(mut self, base_url: impl Into<String>) -> Self {
        self.config = PreloadConfig::new(base_url);
        self
    }

    /// Replace the default progress display ([`ProgressLog`]).
    pub fn progress(mut self, listener: impl PreloaderCallback + 'static) -> Self {
        self.progress = Box::new(listener);
        self
    }

    /// Use an embedded manifest instead of fetching `<base>/assets.txt`.
    pub fn manifest(mut self, src: impl Into<String>) -> Self {
        self.manifest = Some(src.into());
        self
    }

    pub fn services(mut self, services: Services) -> Self {
        self.services = services;
        self
    }

    /// Construct the application and start the preload immediately.
    ///
    /// With an embedded manifest this can already fail (parse error) or even
    /// start the application (nothing to preload).
    pub fn launch<H: Host + ?Sized>(self, host: &mut H) -> Result<Application<A>, EngineError> {
        let store = AssetStore::new();
        let mut application = Application {
            preloader: Preloader::new(self.config, store.clone()),
            progress: self.progress,
            controller: LoopController::new(self.app, self.services, store),
        };

        application.controller.await_assets();
        log::debug!("preloading assets");

        match self.manifest {
            Some(src) => application.with_callback(host, |preloader, callback| {
                preloader.load_manifest(&src, callback)
            })?,
            None => {
                application.preloader.preload();
                application.preloader.flush_requests(host);
            }
        }

        Ok(application)
    }
}

/// Hosted application: preloader, progress display, and loop controller.
///
/// The host feeds it two kinds of callbacks, one at a time: fetch events and
/// armed frames.
pub struct Application<A> {
    preloader: Preloader,
    progress: Box<dyn PreloaderCallback>,
    controller: LoopController<A>,
}

impl<A: App> Application<A> {
    pub fn builder(app: A) -> ApplicationBuilder<A> {
        ApplicationBuilder {
            app,
            config: PreloadConfig::default(),
            progress: Box::new(ProgressLog::default()),
            manifest: None,
            services: Services::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.controller.state()
    }

    pub fn preloader(&self) -> &Preloader {
        &self.preloader
    }

    pub fn preloader_state(&self) -> PreloaderState {
        self.preloader.state()
    }

    pub fn assets(&self) -> &AssetStore {
        self.preloader.store()
    }

    pub fn controller(&self) -> &LoopController<A> {
        &self.controller
    }

    pub fn app(&self) -> &A {
        self.controller.app()
    }

    pub fn app_mut(&mut self) -> &mut A {
        self.controller.app_mut()
    }

    pub fn services_mut(&mut self) -> &mut Services {
        self.controller.services_mut()
    }

    /// Routes a transfer event from the host.
    ///
    /// Progress and startup run in-line; any fetches this triggers are handed
    /// to the host before returning.
    pub fn on_fetch_event<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        id: FetchId,
        event: FetchEvent,
    ) -> Result<(), EngineError> {
        self.with_callback(host, |preloader, callback| {
            preloader.handle_event(id, event, callback)
        })
    }

    /// Runs one armed frame.
    pub fn on_frame<H: Surface + FrameScheduler + ?Sized>(
        &mut self,
        host: &mut H,
        now: Instant,
    ) -> Result<(), EngineError> {
        self.controller.tick(host, now)
    }

    /// Task submission from outside the frame loop is not available; use
    /// [`AppCtx::post`](crate::core::AppCtx::post) from inside a callback.
    pub fn post_task<F>(&mut self, task: F) -> Result<(), UnsupportedOperation>
    where
        F: FnOnce(&mut TaskQueue) + 'static,
    {
        drop(task);
        Err(UnsupportedOperation::new("Application::post_task"))
    }

    fn with_callback<H, F>(&mut self, host: &mut H, f: F) -> Result<(), EngineError>
    where
        H: Host + ?Sized,
        F: FnOnce(&mut Preloader, &mut dyn PreloaderCallback) -> Result<(), EngineError>,
    {
        let Self { preloader, progress, controller } = self;
        let result = {
            let trigger = StartupTrigger { controller, host: &mut *host };
            let mut callback = Fanout::new(progress.as_mut(), trigger);
            f(preloader, &mut callback)
        };
        preloader.flush_requests(host);
        result
    }
}

/// Starts the loop controller on the end-of-preload snapshot.
struct StartupTrigger<'a, A, H: ?Sized> {
    controller: &'a mut LoopController<A>,
    host: &'a mut H,
}

impl<A: App, H: Surface + FrameScheduler + ?Sized> PreloaderCallback for StartupTrigger<'_, A, H> {
    fn error(&mut self, failure: &AssetFetchError) {
        log::debug!("file {}", failure.file);
    }

    fn update(&mut self, state: &PreloaderState) -> Result<(), EngineError> {
        if state.has_ended {
            self.controller.start(self.host)?;
        }
        Ok(())
    }
}
