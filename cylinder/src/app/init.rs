use super::App;
use anyhow::{Context, Result};
use cylinder_core::{Config, DisplayDriver, GlyphAtlas, Marquee, ScrollEngine};
use log::info;
use std::sync::Arc;

pub(super) type PanelMarquee = Marquee<Box<dyn DisplayDriver + Send>>;

impl App {
    /// Load the font assets. Any failure here is fatal.
    pub fn new(config: Config) -> Result<Self> {
        info!("Initializing application");

        let table = config.glyph_table().context("Failed to load glyph table")?;
        let atlas = GlyphAtlas::open(&config.font.sheet, &table)
            .with_context(|| format!("Failed to build glyph atlas from {}", config.font.sheet.display()))?;

        if atlas.height() != config.panel.height {
            anyhow::bail!(
                "Font is {} rows tall but the panel is configured with {} rows",
                atlas.height(),
                config.panel.height
            );
        }

        Ok(Self {
            config,
            atlas: Arc::new(atlas),
        })
    }

    /// Open the configured driver and wrap it in a ready marquee session
    pub(super) fn marquee(&self) -> Result<PanelMarquee> {
        let driver = cylinder_ws281x::driver_from_config(&self.config);
        let engine = ScrollEngine::new(self.config.geometry(), self.config.frame_delay());

        let marquee = Marquee::new(Arc::clone(&self.atlas), self.config.layout(), engine, driver)
            .context("Failed to initialize display")?
            .with_wipe_delay(self.config.wipe_delay());
        Ok(marquee)
    }
}
