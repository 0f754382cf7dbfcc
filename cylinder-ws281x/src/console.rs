use cylinder_core::{DisplayDriver, DriverError, PanelGeometry, Rgb};
use std::io::{self, Stdout, Write};

/// Terminal stand-in for the light panel
///
/// Reads the frame buffer back through the serpentine mapping, so a panel
/// drawn here looks exactly like the wired hardware would.
pub struct ConsolePreview<W: Write = Stdout> {
    geometry: PanelGeometry,
    brightness: u8,
    leds: Vec<u32>,
    out: W,
    drawn: bool,
    active: bool,
}

impl ConsolePreview<Stdout> {
    pub fn stdout(geometry: PanelGeometry) -> Self {
        Self::new(geometry, io::stdout())
    }
}

impl<W: Write> ConsolePreview<W> {
    pub fn new(geometry: PanelGeometry, out: W) -> Self {
        Self {
            geometry,
            brightness: u8::MAX,
            leds: vec![0; geometry.len()],
            out,
            drawn: false,
            active: false,
        }
    }

    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self) -> io::Result<()> {
        let mut frame = String::new();
        if self.drawn {
            // Redraw in place
            frame.push_str(&format!("\x1b[{}A", self.geometry.height));
        }

        for y in 0..self.geometry.height {
            for x in 0..self.geometry.width {
                let color = Rgb::from_packed(self.leds[self.geometry.index_of(x, y)]);
                if color == Rgb::BLACK {
                    frame.push_str("\x1b[0m\u{b7}");
                } else {
                    let Rgb { r, g, b } = color.scaled(self.brightness);
                    frame.push_str(&format!("\x1b[38;2;{r};{g};{b}m\u{25cf}"));
                }
            }
            frame.push_str("\x1b[0m\n");
        }

        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        self.drawn = true;
        Ok(())
    }
}

impl<W: Write> DisplayDriver for ConsolePreview<W> {
    fn init(&mut self) -> Result<(), DriverError> {
        self.active = true;
        self.drawn = false;
        Ok(())
    }

    fn render(&mut self) -> Result<(), DriverError> {
        if !self.active {
            return Err(DriverError::NotInitialized);
        }
        self.draw()?;
        Ok(())
    }

    fn wait(&mut self) -> Result<(), DriverError> {
        self.out.flush()?;
        Ok(())
    }

    fn finalize(&mut self) {
        self.active = false;
        let _ = self.out.flush();
    }

    fn leds_mut(&mut self, channel: usize) -> Result<&mut [u32], DriverError> {
        match channel {
            0 => Ok(&mut self.leds),
            other => Err(DriverError::NoSuchChannel(other)),
        }
    }
}
