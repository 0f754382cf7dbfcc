//! Display driver contract
//!
//! The scroll engine only ever talks to hardware through [`DisplayDriver`].
//! Production implementations live in `cylinder-ws281x`; [`RecordingDriver`]
//! keeps every rendered frame in memory for assertions.

mod recording;

pub use recording::{FrameLog, RecordedFrame, RecordingDriver};

use crate::error::DriverError;

/// Hardware-agnostic handle to an addressable light strip
///
/// Each channel owns a linear frame buffer of packed `0x00RRGGBB` colours.
/// Writers fill the buffer through [`leds_mut`](Self::leds_mut) and push it
/// with [`render`](Self::render).
pub trait DisplayDriver {
    /// Acquire the hardware. Called once before the first render.
    fn init(&mut self) -> Result<(), DriverError>;

    /// Push the current frame buffer to the lights
    fn render(&mut self) -> Result<(), DriverError>;

    /// Block until the previous render has reached the lights
    fn wait(&mut self) -> Result<(), DriverError>;

    /// Release the hardware. Called once at shutdown.
    fn finalize(&mut self);

    /// Direct write access to one channel's frame buffer
    fn leds_mut(&mut self, channel: usize) -> Result<&mut [u32], DriverError>;
}

impl<D: DisplayDriver + ?Sized> DisplayDriver for Box<D> {
    fn init(&mut self) -> Result<(), DriverError> {
        (**self).init()
    }

    fn render(&mut self) -> Result<(), DriverError> {
        (**self).render()
    }

    fn wait(&mut self) -> Result<(), DriverError> {
        (**self).wait()
    }

    fn finalize(&mut self) {
        (**self).finalize()
    }

    fn leds_mut(&mut self, channel: usize) -> Result<&mut [u32], DriverError> {
        (**self).leds_mut(channel)
    }
}
