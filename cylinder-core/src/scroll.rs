use std::thread;
use std::time::{Duration, Instant};

use crate::color::Rgb;
use crate::driver::DisplayDriver;
use crate::error::{Error, Result};
use crate::panel::PanelGeometry;
use crate::render::CompositeCanvas;

/// Channel the panel is wired to
const CHANNEL: usize = 0;

const OFF: u32 = Rgb::BLACK.packed();

/// Summary of one completed animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollStats {
    pub frames: usize,
    pub elapsed: Duration,
}

/// Slides a panel-sized window across a composite canvas
///
/// Single-threaded and synchronous: every frame is filled, rendered and then
/// followed by a blocking sleep of `delay`, so scroll speed tracks wall-clock
/// time.
#[derive(Debug, Clone, Copy)]
pub struct ScrollEngine {
    geometry: PanelGeometry,
    delay: Duration,
}

impl ScrollEngine {
    pub fn new(geometry: PanelGeometry, delay: Duration) -> Self {
        Self { geometry, delay }
    }

    pub fn geometry(&self) -> &PanelGeometry {
        &self.geometry
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of frames `scroll` renders for `canvas`
    ///
    /// One per offset in `0..=canvas.width - panel.width`; a canvas narrower
    /// than the panel still gets one frame.
    pub fn frame_count(&self, canvas: &CompositeCanvas) -> usize {
        (canvas.width() as usize).saturating_sub(self.geometry.width) + 1
    }

    /// Animate `canvas` across the panel in `color`
    ///
    /// Returns once the last offset has been shown; it never loops. A driver
    /// failure aborts the remaining frames and leaves whatever was last pushed
    /// on the lights.
    pub fn scroll<D: DisplayDriver + ?Sized>(
        &self,
        canvas: &CompositeCanvas,
        color: u32,
        driver: &mut D,
    ) -> Result<ScrollStats> {
        let frames = self.frame_count(canvas);
        let start = Instant::now();
        log::debug!(
            "Scrolling {}px canvas over {}x{} panel: {} frames",
            canvas.width(),
            self.geometry.width,
            self.geometry.height,
            frames
        );

        for offset in 0..frames {
            self.fill_frame(canvas, offset, color, driver)?;
            driver
                .render()
                .map_err(|source| Error::Render { frame: offset, source })?;
            log::trace!("Rendered frame {}/{}", offset + 1, frames);
            thread::sleep(self.delay);
        }

        Ok(ScrollStats {
            frames,
            elapsed: start.elapsed(),
        })
    }

    /// Paint the window starting at canvas column `offset` into the frame buffer
    fn fill_frame<D: DisplayDriver + ?Sized>(
        &self,
        canvas: &CompositeCanvas,
        offset: usize,
        color: u32,
        driver: &mut D,
    ) -> Result<()> {
        let geometry = self.geometry;
        let leds = self.frame_buffer(driver)?;

        for y in 0..geometry.height {
            for x in 0..geometry.width {
                let lit = canvas.is_lit((x + offset) as u32, y as u32);
                leds[geometry.index_of(x, y)] = if lit { color } else { OFF };
            }
        }
        Ok(())
    }

    /// Light the strip one LED at a time in wiring order, rendering each step
    pub fn wipe<D: DisplayDriver + ?Sized>(&self, color: u32, driver: &mut D) -> Result<ScrollStats> {
        let start = Instant::now();
        let count = self.geometry.len();

        for i in 0..count {
            self.frame_buffer(driver)?[i] = color;
            driver
                .render()
                .map_err(|source| Error::Render { frame: i, source })?;
            thread::sleep(self.delay);
        }

        Ok(ScrollStats {
            frames: count,
            elapsed: start.elapsed(),
        })
    }

    /// Turn every light off
    pub fn clear<D: DisplayDriver + ?Sized>(&self, driver: &mut D) -> Result<()> {
        self.frame_buffer(driver)?.fill(OFF);
        driver
            .render()
            .map_err(|source| Error::Render { frame: 0, source })
    }

    fn frame_buffer<'a, D: DisplayDriver + ?Sized>(&self, driver: &'a mut D) -> Result<&'a mut [u32]> {
        let leds = driver.leds_mut(CHANNEL)?;
        if leds.len() < self.geometry.len() {
            return Err(Error::Geometry(format!(
                "frame buffer holds {} lights, panel needs {}",
                leds.len(),
                self.geometry.len()
            )));
        }
        Ok(leds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::RecordingDriver;
    use crate::render::{compose, Layout};
    use crate::testing::builtin_atlas;

    const RED: u32 = 0xff0000;

    fn engine(delay_ms: u64) -> ScrollEngine {
        ScrollEngine::new(PanelGeometry::new(20, 5, true), Duration::from_millis(delay_ms))
    }

    fn driver() -> RecordingDriver {
        let mut driver = RecordingDriver::new(100);
        driver.init().unwrap();
        driver
    }

    #[test]
    fn test_panel_sized_canvas_renders_once() {
        let engine = engine(0);
        let canvas = CompositeCanvas::new(20, 5);
        let mut driver = driver();

        let stats = engine.scroll(&canvas, RED, &mut driver).unwrap();
        assert_eq!(stats.frames, 1);
        assert_eq!(driver.frame_count(), 1);
        assert!(driver.leds().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_narrow_canvas_renders_once() {
        let engine = engine(0);
        let canvas = CompositeCanvas::new(3, 5);
        let mut driver = driver();

        assert_eq!(engine.scroll(&canvas, RED, &mut driver).unwrap().frames, 1);
    }

    #[test]
    fn test_hi_end_to_end() {
        let engine = engine(60);
        let atlas = builtin_atlas();
        let canvas = compose("HI", &atlas, &Layout::default(), 5);
        let mut driver = driver();
        let frames = driver.frames();

        let stats = engine.scroll(&canvas, RED, &mut driver).unwrap();

        let expected = canvas.width() as usize - 20 + 1;
        assert_eq!(stats.frames, expected);
        let frames = frames.lock();
        assert_eq!(frames.len(), expected);

        for (offset, frame) in frames.iter().enumerate() {
            assert!(frame.leds.iter().all(|&c| c == 0 || c == RED));
            let lit = frame.leds.iter().filter(|&&c| c == RED).count();
            assert_eq!(lit, canvas.lit_count_in(offset as u32, 20), "offset {offset}");
        }
        for pair in frames.windows(2) {
            assert!(pair[1].at.duration_since(pair[0].at) >= Duration::from_millis(60));
        }
        // Last frame shows the end of the message
        assert!(frames.last().unwrap().leds.iter().any(|&c| c == RED));
    }

    #[test]
    fn test_frame_uses_flipped_serpentine_order() {
        let engine = engine(0);
        let mut canvas = CompositeCanvas::new(20, 5);
        // Logical (1, 0): odd column, top row
        canvas
            .image_mut()
            .put_pixel(1, 0, image::Rgba([255, 255, 255, 255]));
        let mut driver = driver();

        engine.scroll(&canvas, RED, &mut driver).unwrap();

        let lit: Vec<usize> = driver
            .leds()
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == RED)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(lit, vec![crate::panel::index_of(1, 0, 5, true)]);
        assert_eq!(lit, vec![5]);
    }

    #[test]
    fn test_render_failure_aborts_scroll() {
        let engine = engine(0);
        let canvas = CompositeCanvas::new(30, 5);
        let mut driver = driver().failing_on_render(3);

        let err = engine.scroll(&canvas, RED, &mut driver).unwrap_err();
        assert!(matches!(err, Error::Render { frame: 3, .. }));
        assert_eq!(driver.frame_count(), 3);
    }

    #[test]
    fn test_short_frame_buffer_is_rejected() {
        let engine = engine(0);
        let canvas = CompositeCanvas::new(20, 5);
        let mut driver = RecordingDriver::new(50);
        driver.init().unwrap();

        assert!(matches!(
            engine.scroll(&canvas, RED, &mut driver),
            Err(Error::Geometry(_))
        ));
    }

    #[test]
    fn test_wipe_lights_in_strip_order() {
        let engine = ScrollEngine::new(PanelGeometry::new(4, 2, false), Duration::ZERO);
        let mut driver = RecordingDriver::new(8);
        driver.init().unwrap();
        let frames = driver.frames();

        let stats = engine.wipe(RED, &mut driver).unwrap();
        assert_eq!(stats.frames, 8);

        let frames = frames.lock();
        assert_eq!(frames.len(), 8);
        for (step, frame) in frames.iter().enumerate() {
            let lit = frame.leds.iter().take_while(|&&c| c == RED).count();
            assert_eq!(lit, step + 1);
        }
    }

    #[test]
    fn test_clear_blanks_panel() {
        let engine = engine(0);
        let mut driver = driver();
        driver.leds_mut(0).unwrap().fill(RED);

        engine.clear(&mut driver).unwrap();
        assert!(driver.leds().iter().all(|&c| c == 0));
        assert_eq!(driver.frame_count(), 1);
    }
}
