use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::core::App;
use crate::error::EngineError;
use crate::host::{FetchEvent, FetchId, FetchRequest, Fetcher, FrameScheduler, Surface};
use crate::preload::PreloadConfig;
use crate::Application;

use super::fs_fetch::FsFetcher;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub preload: PreloadConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "ember".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            preload: PreloadConfig::default(),
        }
    }
}

/// Events posted to the loop from fetch workers.
#[derive(Debug)]
pub enum HostEvent {
    Fetch { id: FetchId, event: FetchEvent },
}

/// Native host: one window, file-system fetches, redraw-driven frames.
pub struct NativeHost {
    window: Window,
    fetcher: FsFetcher<EventLoopProxy<HostEvent>>,
    frame_armed: bool,
    viewport: Viewport,
}

impl NativeHost {
    fn new(window: Window, proxy: EventLoopProxy<HostEvent>) -> Self {
        Self {
            window,
            fetcher: FsFetcher::new(proxy),
            frame_armed: false,
            viewport: Viewport::default(),
        }
    }

    /// Viewport most recently applied by the engine.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn take_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_armed)
    }
}

impl Surface for NativeHost {
    fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        log::trace!("viewport {viewport:?}");
        self.viewport = viewport;
    }
}

impl FrameScheduler for NativeHost {
    fn request_frame(&mut self) {
        self.frame_armed = true;
        self.window.request_redraw();
    }
}

impl Fetcher for NativeHost {
    fn fetch(&mut self, request: FetchRequest) {
        self.fetcher.fetch(request);
    }
}

/// Entry point for the native runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, preloads, then runs `app` until the window closes.
    ///
    /// Returns an error if the event loop fails or the engine reports a fatal
    /// error (bad manifest, startup failure, failed frame).
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::<HostEvent>::with_user_event()
            .build()
            .context("failed to create winit EventLoop")?;
        let proxy = event_loop.create_proxy();
        let mut state = RuntimeState::new(config, app, proxy);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(anyhow::Error::from(err).context("ember engine stopped")),
            None => Ok(()),
        }
    }
}

struct RuntimeState<A> {
    config: RuntimeConfig,
    proxy: EventLoopProxy<HostEvent>,
    pending_app: Option<A>,
    host: Option<NativeHost>,
    application: Option<Application<A>>,
    failure: Option<EngineError>,
}

impl<A: App + 'static> RuntimeState<A> {
    fn new(config: RuntimeConfig, app: A, proxy: EventLoopProxy<HostEvent>) -> Self {
        Self {
            config,
            proxy,
            pending_app: Some(app),
            host: None,
            application: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: EngineError) {
        log::error!("fatal: {err}");
        self.failure = Some(err);
        event_loop.exit();
    }

    fn launch(&mut self, event_loop: &ActiveEventLoop) -> Result<(), EngineError> {
        let Some(app) = self.pending_app.take() else { return Ok(()) };

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = match event_loop.create_window(attrs) {
            Ok(w) => w,
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return Ok(());
            }
        };

        let host = self.host.insert(NativeHost::new(window, self.proxy.clone()));
        let application = Application::builder(app)
            .config(self.config.preload.clone())
            .launch(host)?;
        self.application = Some(application);
        Ok(())
    }
}

impl<A: App + 'static> ApplicationHandler<HostEvent> for RuntimeState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.is_some() {
            return;
        }

        if let Err(e) = self.launch(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: HostEvent) {
        let HostEvent::Fetch { id, event } = event;

        let (Some(application), Some(host)) = (self.application.as_mut(), self.host.as_mut()) else {
            return;
        };

        if let Err(e) = application.on_fetch_event(host, id, event) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::debug!("window closed");
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                let (Some(application), Some(host)) = (self.application.as_mut(), self.host.as_mut()) else {
                    return;
                };

                // Only armed frames tick; stray redraws (expose, resize) are skipped.
                if !host.take_frame() {
                    return;
                }

                if let Err(e) = application.on_frame(host, Instant::now()) {
                    self.fail(event_loop, e);
                }
            }

            _ => {}
        }
    }
}
