use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

use super::DisplayDriver;
use crate::error::DriverError;

/// Snapshot of channel 0 taken at a render call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFrame {
    pub leds: Vec<u32>,
    pub at: Instant,
}

/// Frames captured by a [`RecordingDriver`], shareable across threads
pub type FrameLog = Arc<Mutex<Vec<RecordedFrame>>>;

/// In-memory driver that records a snapshot on every render
///
/// Clone [`frames`](Self::frames) before handing the driver to a
/// [`Marquee`](crate::Marquee) to keep inspecting what it rendered.
#[derive(Debug)]
pub struct RecordingDriver {
    leds: Vec<u32>,
    frames: FrameLog,
    initialized: bool,
    fail_on_render: Option<usize>,
    renders: usize,
    pub init_calls: usize,
    pub wait_calls: usize,
    pub finalize_calls: usize,
}

impl RecordingDriver {
    pub fn new(led_count: usize) -> Self {
        Self {
            leds: vec![0; led_count],
            frames: Arc::new(Mutex::new(Vec::new())),
            initialized: false,
            fail_on_render: None,
            renders: 0,
            init_calls: 0,
            wait_calls: 0,
            finalize_calls: 0,
        }
    }

    /// Make the `n`-th render call (zero based) and every later one fail
    pub fn failing_on_render(mut self, n: usize) -> Self {
        self.fail_on_render = Some(n);
        self
    }

    pub fn frames(&self) -> FrameLog {
        Arc::clone(&self.frames)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().len()
    }

    /// Current contents of channel 0
    pub fn leds(&self) -> &[u32] {
        &self.leds
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl DisplayDriver for RecordingDriver {
    fn init(&mut self) -> Result<(), DriverError> {
        self.init_calls += 1;
        self.initialized = true;
        Ok(())
    }

    fn render(&mut self) -> Result<(), DriverError> {
        if !self.initialized {
            return Err(DriverError::NotInitialized);
        }

        let n = self.renders;
        self.renders += 1;
        if self.fail_on_render.is_some_and(|fail| n >= fail) {
            return Err(DriverError::Fault(format!("injected failure on render {n}")));
        }

        self.frames.lock().push(RecordedFrame {
            leds: self.leds.clone(),
            at: Instant::now(),
        });
        Ok(())
    }

    fn wait(&mut self) -> Result<(), DriverError> {
        self.wait_calls += 1;
        Ok(())
    }

    fn finalize(&mut self) {
        self.finalize_calls += 1;
        self.initialized = false;
    }

    fn leds_mut(&mut self, channel: usize) -> Result<&mut [u32], DriverError> {
        match channel {
            0 => Ok(&mut self.leds),
            other => Err(DriverError::NoSuchChannel(other)),
        }
    }
}
