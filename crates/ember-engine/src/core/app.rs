use anyhow::Result;

use super::ctx::AppCtx;

/// Application contract implemented by hosted code.
///
/// Nothing is called before the preload completes. Then `create` runs once,
/// followed by one `resize` with the current canvas size, and `render` once per
/// frame from there on. `resize` runs again, before `render`, whenever the
/// canvas size changed since the previous frame.
pub trait App {
    fn create(&mut self, ctx: &mut AppCtx<'_>) -> Result<()>;

    fn resize(&mut self, _width: u32, _height: u32, _ctx: &mut AppCtx<'_>) -> Result<()> {
        Ok(())
    }

    fn render(&mut self, ctx: &mut AppCtx<'_>) -> Result<()>;
}

impl<T: App + ?Sized> App for Box<T> {
    fn create(&mut self, ctx: &mut AppCtx<'_>) -> Result<()> {
        (**self).create(ctx)
    }

    fn resize(&mut self, width: u32, height: u32, ctx: &mut AppCtx<'_>) -> Result<()> {
        (**self).resize(width, height, ctx)
    }

    fn render(&mut self, ctx: &mut AppCtx<'_>) -> Result<()> {
        (**self).render(ctx)
    }
}
