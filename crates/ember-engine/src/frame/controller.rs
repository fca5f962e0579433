use std::time::Instant;

use crate::coords::Viewport;
use crate::core::{App, AppCtx, Services};
use crate::error::{EngineError, StartupError};
use crate::host::{FrameScheduler, Surface};
use crate::preload::AssetStore;
use crate::time::{FrameClock, FrameTime};

use super::tasks::{Task, TaskQueue};

/// Lifecycle of a [`LoopController`]. Only ever moves forward.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Uninitialized,
    AwaitingAssets,
    Running,
}

/// Drives the hosted application's `create -> resize -> render` cycle.
///
/// Startup happens once, when the preload completes. After that every armed
/// frame runs one [`tick`](Self::tick), which re-arms the next frame.
pub struct LoopController<A> {
    app: A,
    state: LoopState,
    startup_failed: bool,
    last_size: (u32, u32),
    tasks: TaskQueue,
    working: Vec<Task>,
    clock: FrameClock,
    services: Services,
    assets: AssetStore,
}

impl<A: App> LoopController<A> {
    pub fn new(app: A, services: Services, assets: AssetStore) -> Self {
        Self {
            app,
            state: LoopState::Uninitialized,
            startup_failed: false,
            last_size: (0, 0),
            tasks: TaskQueue::new(),
            working: Vec::new(),
            clock: FrameClock::new(),
            services,
            assets,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut A {
        &mut self.app
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    pub fn frame_id(&self) -> u64 {
        self.clock.current().frame_id
    }

    /// True once `create` or the initial `resize` failed. Startup is never
    /// attempted again.
    pub fn startup_failed(&self) -> bool {
        self.startup_failed
    }

    /// Tasks waiting for the next drain.
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Canvas size last passed to `resize`.
    pub fn last_size(&self) -> (u32, u32) {
        self.last_size
    }

    pub(crate) fn await_assets(&mut self) {
        if self.state == LoopState::Uninitialized {
            self.state = LoopState::AwaitingAssets;
        }
    }

    /// Startup transition: `create`, one `resize`, then the first frame is
    /// armed.
    ///
    /// Only acts while awaiting assets; any later call is ignored. A failure
    /// leaves the controller short of `Running` for good.
    pub fn start<H>(&mut self, host: &mut H) -> Result<(), StartupError>
    where
        H: Surface + FrameScheduler + ?Sized,
    {
        if self.startup_failed {
            log::warn!("startup already failed; not retried");
            return Ok(());
        }
        if self.state != LoopState::AwaitingAssets {
            log::warn!("startup requested while {:?}; ignored", self.state);
            return Ok(());
        }

        log::debug!("setting up main loop");
        let (width, height) = host.size();
        self.last_size = (width, height);

        if let Err(source) = self.run_startup(width, height) {
            self.startup_failed = true;
            log::error!("[Application] exception: {source:#}\n{source:?}");
            return Err(StartupError { source });
        }

        host.set_viewport(Viewport::full(width, height));
        self.state = LoopState::Running;
        host.request_frame();
        Ok(())
    }

    fn run_startup(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        let time = self.clock.current();
        {
            let (app, mut ctx) = self.split(time);
            app.create(&mut ctx)?;
        }
        let (app, mut ctx) = self.split(time);
        app.resize(width, height, &mut ctx)
    }

    /// One frame: resize check, deferred tasks, render, re-arm.
    ///
    /// A failing `resize` or `render` is logged and returned; the next frame
    /// is not armed, so the loop stops there.
    pub fn tick<H>(&mut self, host: &mut H, now: Instant) -> Result<(), EngineError>
    where
        H: Surface + FrameScheduler + ?Sized,
    {
        if self.state != LoopState::Running {
            log::debug!("frame fired while {:?}; ignored", self.state);
            return Ok(());
        }

        let size = host.size();
        if size != self.last_size {
            self.last_size = size;
            let (width, height) = size;
            host.set_viewport(Viewport::full(width, height));

            let time = self.clock.current();
            let (app, mut ctx) = self.split(time);
            if let Err(e) = app.resize(width, height, &mut ctx) {
                return Err(self.frame_failed(e));
            }
        }

        self.run_deferred();

        let time = self.clock.tick(now);
        log::trace!("frame {}", time.frame_id);

        let (app, mut ctx) = self.split(time);
        if let Err(e) = app.render(&mut ctx) {
            return Err(self.frame_failed(e));
        }

        host.request_frame();
        Ok(())
    }

    fn run_deferred(&mut self) {
        self.tasks.swap_into(&mut self.working);
        for task in self.working.drain(..) {
            task(&mut self.tasks);
        }
    }

    fn split(&mut self, time: FrameTime) -> (&mut A, AppCtx<'_>) {
        let ctx = AppCtx {
            tasks: &mut self.tasks,
            services: &mut self.services,
            assets: &self.assets,
            time,
            size: self.last_size,
        };
        (&mut self.app, ctx)
    }

    fn frame_failed(&self, source: anyhow::Error) -> EngineError {
        let frame = self.clock.current().frame_id;
        log::error!("[Application] frame {frame} failed: {source:#}\n{source:?}");
        EngineError::Frame { frame, source }
    }
}
