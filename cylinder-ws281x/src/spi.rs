use cylinder_core::{DisplayDriver, DriverError, Rgb};
use log::{debug, info, warn};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::fd::AsRawFd;
use std::path::PathBuf;

/// Zero bytes appended to every frame; holds the line low long enough
/// (~350 us at 3.2 MHz) for the strip to latch
pub const RESET_TAIL_LEN: usize = 140;

/// SPI bytes per light: 3 colour bytes, 4 SPI bytes each
pub const BYTES_PER_LED: usize = 12;

/// Two WS2812 bits per SPI byte; each nibble is `1000` (0) or `1110` (1)
const PATTERNS: [u8; 4] = [0b1000_1000, 0b1000_1110, 0b1110_1000, 0b1110_1110];

// SPI_IOC_WR_MAX_SPEED_HZ from <linux/spi/spidev.h>
nix::ioctl_write_ptr!(spi_write_max_speed_hz, b'k', 4, u32);

/// Append the SPI bit stream for one colour byte
#[inline]
fn encode_byte(mut byte: u8, out: &mut Vec<u8>) {
    for _ in 0..4 {
        out.push(PATTERNS[((byte & 0b1100_0000) >> 6) as usize]);
        byte <<= 2;
    }
}

/// Encode packed `0x00RRGGBB` lights into a WS2812 SPI frame
///
/// Lights go out in GRB order, scaled by `brightness`, followed by the reset
/// tail.
pub fn encode_frame(leds: &[u32], brightness: u8, out: &mut Vec<u8>) {
    out.clear();
    out.reserve(leds.len() * BYTES_PER_LED + RESET_TAIL_LEN);

    for &packed in leds {
        let Rgb { r, g, b } = Rgb::from_packed(packed).scaled(brightness);
        for byte in [g, r, b] {
            encode_byte(byte, out);
        }
    }
    out.resize(out.len() + RESET_TAIL_LEN, 0);
}

/// WS2811/WS2812 strip driven through a Linux spidev node
///
/// The whole frame is written in a single `write`, so `render` returns once
/// the kernel has clocked it out and `wait` has nothing left to do. spidev's
/// default `bufsiz` of 4096 bytes covers strips of up to ~330 lights.
pub struct SpiStrip {
    path: PathBuf,
    speed_hz: Option<u32>,
    brightness: u8,
    leds: Vec<u32>,
    device: Option<File>,
    buf: Vec<u8>,
}

impl SpiStrip {
    pub fn new(path: impl Into<PathBuf>, led_count: usize) -> Self {
        Self {
            path: path.into(),
            speed_hz: None,
            brightness: u8::MAX,
            leds: vec![0; led_count],
            device: None,
            buf: Vec::new(),
        }
    }

    /// Program the bus clock during `init`
    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.speed_hz = Some(speed_hz);
        self
    }

    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = brightness;
        self
    }

    fn set_speed(device: &File, speed_hz: u32) -> Result<(), DriverError> {
        // SAFETY: the fd is open for the lifetime of `device` and the pointer
        // refers to a live u32 for the duration of the call.
        unsafe { spi_write_max_speed_hz(device.as_raw_fd(), &speed_hz) }
            .map_err(std::io::Error::from)?;
        Ok(())
    }
}

impl DisplayDriver for SpiStrip {
    fn init(&mut self) -> Result<(), DriverError> {
        info!("Opening SPI device {}", self.path.display());
        let device = OpenOptions::new().write(true).open(&self.path)?;

        if let Some(speed_hz) = self.speed_hz {
            Self::set_speed(&device, speed_hz)?;
            debug!("SPI clock set to {} Hz", speed_hz);
        }

        self.device = Some(device);
        Ok(())
    }

    fn render(&mut self) -> Result<(), DriverError> {
        let device = self.device.as_mut().ok_or(DriverError::NotInitialized)?;
        encode_frame(&self.leds, self.brightness, &mut self.buf);
        device.write_all(&self.buf)?;
        Ok(())
    }

    fn wait(&mut self) -> Result<(), DriverError> {
        match self.device {
            Some(_) => Ok(()),
            None => Err(DriverError::NotInitialized),
        }
    }

    fn finalize(&mut self) {
        if self.device.is_none() {
            return;
        }
        self.leds.fill(0);
        if let Err(e) = self.render() {
            warn!("Failed to blank strip on finalize: {}", e);
        }
        self.device = None;
        info!("Closed SPI device {}", self.path.display());
    }

    fn leds_mut(&mut self, channel: usize) -> Result<&mut [u32], DriverError> {
        match channel {
            0 => Ok(&mut self.leds),
            other => Err(DriverError::NoSuchChannel(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_byte_patterns() {
        let mut out = Vec::new();
        encode_byte(0b00_01_10_11, &mut out);
        assert_eq!(out, PATTERNS.to_vec());

        out.clear();
        encode_byte(0xff, &mut out);
        assert_eq!(out, vec![0b1110_1110; 4]);
    }

    #[test]
    fn test_encode_frame_layout() {
        let mut out = Vec::new();
        encode_frame(&[0xff0000, 0x000000], 255, &mut out);

        assert_eq!(out.len(), 2 * BYTES_PER_LED + RESET_TAIL_LEN);
        // GRB: green off, red full, blue off
        assert_eq!(&out[0..4], &[0b1000_1000; 4]);
        assert_eq!(&out[4..8], &[0b1110_1110; 4]);
        assert_eq!(&out[8..12], &[0b1000_1000; 4]);
        assert!(out[12..24].iter().all(|&b| b == 0b1000_1000));
        assert!(out[24..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_frame_applies_brightness() {
        let mut dim = Vec::new();
        encode_frame(&[0xffffff], 0, &mut dim);
        assert!(dim[..BYTES_PER_LED].iter().all(|&b| b == 0b1000_1000));
    }

    #[test]
    fn test_render_writes_frame_to_device() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut strip = SpiStrip::new(file.path(), 3);

        assert!(matches!(strip.render(), Err(DriverError::NotInitialized)));

        strip.init().unwrap();
        strip.leds_mut(0).unwrap()[1] = 0x00ff00;
        strip.render().unwrap();
        strip.wait().unwrap();

        let written = std::fs::read(file.path()).unwrap();
        assert_eq!(written.len(), 3 * BYTES_PER_LED + RESET_TAIL_LEN);
        assert_eq!(&written[12..16], &[0b1110_1110; 4]);
    }

    #[test]
    fn test_finalize_blanks_and_closes() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut strip = SpiStrip::new(file.path(), 2);
        strip.init().unwrap();
        strip.leds_mut(0).unwrap().fill(0xffffff);

        strip.finalize();

        let written = std::fs::read(file.path()).unwrap();
        assert!(written[..2 * BYTES_PER_LED].iter().all(|&b| b == 0b1000_1000));
        assert!(matches!(strip.wait(), Err(DriverError::NotInitialized)));
    }

    #[test]
    fn test_only_channel_zero() {
        let mut strip = SpiStrip::new("/dev/null", 4);
        assert_eq!(strip.leds_mut(0).unwrap().len(), 4);
        assert!(matches!(strip.leds_mut(1), Err(DriverError::NoSuchChannel(1))));
    }

    #[test]
    fn test_missing_device_fails_init() {
        let mut strip = SpiStrip::new("/nonexistent/spidev9.9", 4);
        assert!(matches!(strip.init(), Err(DriverError::Io(_))));
    }
}
