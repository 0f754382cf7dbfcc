use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::color::Rgb;
use crate::driver::DisplayDriver;
use crate::error::{Error, Result};
use crate::font::GlyphAtlas;
use crate::message::DisplayRequest;
use crate::render::{compose, Layout};
use crate::scroll::{ScrollEngine, ScrollStats};

/// Outcome counts of a [`Marquee::run`] session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Requests scrolled to completion
    pub shown: usize,
    /// Requests dropped for a malformed colour
    pub dropped: usize,
    /// Requests aborted by a render failure
    pub failed: usize,
}

/// Ties the glyph atlas, the scroll engine and one display driver together
///
/// Requests are processed strictly one at a time: a scroll always runs to
/// completion before the next request is looked at.
pub struct Marquee<D: DisplayDriver> {
    atlas: Arc<GlyphAtlas>,
    layout: Layout,
    engine: ScrollEngine,
    wipe_delay: Duration,
    driver: D,
    finished: bool,
}

impl<D: DisplayDriver> Marquee<D> {
    /// Validate the panel against the font and initialize the driver
    pub fn new(atlas: Arc<GlyphAtlas>, layout: Layout, engine: ScrollEngine, mut driver: D) -> Result<Self> {
        let panel_height = engine.geometry().height;
        if atlas.height() as usize != panel_height {
            return Err(Error::Geometry(format!(
                "font is {} rows tall but the panel has {} rows",
                atlas.height(),
                panel_height
            )));
        }

        driver.init()?;
        info!(
            "Marquee ready: {}x{} panel, {:?} per frame",
            engine.geometry().width,
            panel_height,
            engine.delay()
        );

        Ok(Self {
            atlas,
            layout,
            engine,
            wipe_delay: engine.delay(),
            driver,
            finished: false,
        })
    }

    pub fn with_wipe_delay(mut self, delay: Duration) -> Self {
        self.wipe_delay = delay;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Compose `text` and scroll it across the panel once
    pub fn show(&mut self, text: &str, color: Rgb) -> Result<ScrollStats> {
        let canvas = compose(text, &self.atlas, &self.layout, self.engine.geometry().height as u32);
        self.engine.scroll(&canvas, color.packed(), &mut self.driver)
    }

    /// Handle one request from a message source
    pub fn display(&mut self, request: &DisplayRequest) -> Result<ScrollStats> {
        let color = request.rgb()?;
        info!("Displaying {:?} in {}", request.message, color);
        self.show(&request.message, color)
    }

    /// Colour wipe across the whole strip
    pub fn wipe(&mut self, color: Rgb) -> Result<ScrollStats> {
        let engine = ScrollEngine::new(*self.engine.geometry(), self.wipe_delay);
        engine.wipe(color.packed(), &mut self.driver)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.engine.clear(&mut self.driver)
    }

    /// Serve requests until `feed` is exhausted, then blank the panel and
    /// release the driver
    ///
    /// A bad request or a failed render is logged and skipped; the session
    /// keeps serving later requests.
    pub fn run<I>(&mut self, feed: I) -> RunSummary
    where
        I: IntoIterator<Item = DisplayRequest>,
    {
        let mut summary = RunSummary::default();

        for request in feed {
            match self.display(&request) {
                Ok(stats) => {
                    info!(
                        "Finished {:?}: {} frames in {:?}",
                        request.message, stats.frames, stats.elapsed
                    );
                    summary.shown += 1;
                }
                Err(Error::ColorFormat(e)) => {
                    warn!("Dropping request {:?}: {}", request.message, e);
                    summary.dropped += 1;
                }
                Err(e) => {
                    error!("Scroll of {:?} aborted: {}", request.message, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Message feed closed ({} shown, {} dropped, {} failed)",
            summary.shown, summary.dropped, summary.failed
        );
        self.finish();
        summary
    }

    /// Blank the panel and finalize the driver. Safe to call more than once.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        if let Err(e) = self.clear() {
            warn!("Failed to clear panel on shutdown: {}", e);
        }
        if let Err(e) = self.driver.wait() {
            warn!("Failed waiting for last frame: {}", e);
        }
        self.driver.finalize();
        info!("Display driver finalized");
    }
}

impl<D: DisplayDriver> Drop for Marquee<D> {
    fn drop(&mut self) {
        self.finish();
    }
}
