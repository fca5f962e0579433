use anyhow::Result;
use ember_engine::core::{App, AppCtx, LifecycleListener};
use ember_engine::logging::{init_logging, LoggingConfig};
use ember_engine::preload::PreloadConfig;
use ember_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;

/// Overrides the asset directory (defaults to this crate's `assets/`).
const ASSET_BASE_VAR: &str = "EMBER_ASSET_BASE";

struct LogLifecycle;

impl LifecycleListener for LogLifecycle {
    fn dispose(&mut self) {
        log::info!("demo disposed");
    }
}

#[derive(Default)]
struct DemoApp {
    frames_since_report: u32,
    elapsed: f32,
}

impl App for DemoApp {
    fn create(&mut self, ctx: &mut AppCtx<'_>) -> Result<()> {
        let greeting = ctx.assets.text("hello.txt").unwrap_or_default();
        log::info!("create: {}", greeting.trim_end());

        // Reserved-prefix assets are preloaded even with the flag off.
        if let Some(banner) = ctx.assets.text("ember/banner.txt") {
            log::info!("banner: {}", banner.trim_end());
        }
        if !ctx.assets.contains("notes.txt") {
            log::info!("notes.txt was not preloaded");
        }

        ctx.services.add_lifecycle_listener(Box::new(LogLifecycle));
        if let Err(e) = ctx.services.preferences("demo") {
            log::warn!("{e}");
        }

        ctx.post(|tasks| {
            log::info!("first deferred task ran");
            tasks.post(|_| log::info!("task posted by a task ran a frame later"));
        });
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32, _ctx: &mut AppCtx<'_>) -> Result<()> {
        log::info!("resize: {width}x{height}");
        Ok(())
    }

    fn render(&mut self, ctx: &mut AppCtx<'_>) -> Result<()> {
        self.frames_since_report += 1;
        self.elapsed += ctx.time.dt;

        if self.elapsed >= 1.0 {
            log::info!(
                "frame {}: {:.1} fps at {}x{}",
                ctx.time.frame_id,
                self.frames_since_report as f32 / self.elapsed,
                ctx.width(),
                ctx.height()
            );
            self.frames_since_report = 0;
            self.elapsed = 0.0;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let base = std::env::var(ASSET_BASE_VAR)
        .unwrap_or_else(|_| concat!(env!("CARGO_MANIFEST_DIR"), "/assets").to_string());
    log::info!("asset base: {base}");

    let config = RuntimeConfig {
        title: "ember demo".to_string(),
        initial_size: LogicalSize::new(960.0, 540.0),
        preload: PreloadConfig::new(base),
    };

    Runtime::run(config, DemoApp::default())
}
