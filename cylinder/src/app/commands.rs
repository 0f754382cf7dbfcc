use super::App;
use anyhow::{Context, Result};
use cylinder_core::Rgb;
use log::info;

impl App {
    /// Scroll `text` once, then blank the panel
    pub async fn show(self, text: String, color: &str) -> Result<()> {
        let color: Rgb = color.parse()?;

        self.blocking(move |app| {
            let mut marquee = app.marquee()?;
            let stats = marquee.show(&text, color)?;
            info!("Showed {:?}: {} frames in {:?}", text, stats.frames, stats.elapsed);
            Ok(())
        })
        .await
    }

    /// Run a colour wipe over the whole strip
    pub async fn wipe(self, color: &str) -> Result<()> {
        let color: Rgb = color.parse()?;

        self.blocking(move |app| {
            let mut marquee = app.marquee()?;
            let stats = marquee.wipe(color)?;
            info!("Wiped {} lights in {:?}", stats.frames, stats.elapsed);
            Ok(())
        })
        .await
    }

    pub async fn clear(self) -> Result<()> {
        self.blocking(|app| {
            let mut marquee = app.marquee()?;
            marquee.clear()?;
            Ok(())
        })
        .await
    }

    /// Frame pacing uses blocking sleeps; keep it off the async workers
    async fn blocking<F>(self, f: F) -> Result<()>
    where
        F: FnOnce(App) -> Result<()> + Send + 'static,
    {
        tokio::task::spawn_blocking(move || f(self))
            .await
            .context("Display task panicked")?
    }
}
