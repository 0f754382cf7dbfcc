use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Malformed colour string in an incoming request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color {input:?}: {reason}")]
pub struct ColorFormatError {
    pub input: String,
    pub reason: &'static str,
}

/// Flat 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack as `0x00RRGGBB`, the layout the LED frame buffer stores
    pub const fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub fn from_packed(packed: u32) -> Self {
        Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }

    /// Scale every channel by `brightness / 255`
    pub fn scaled(self, brightness: u8) -> Self {
        let scale = |c: u8| ((u16::from(c) * u16::from(brightness)) / 255) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_color(s)
    }
}

/// Parse `#RRGGBB` or the short `#RGB` form
///
/// In the short form every digit is replicated (`#f0a` is `#ff00aa`).
pub fn parse_hex_color(input: &str) -> Result<Rgb, ColorFormatError> {
    let fail = |reason| ColorFormatError {
        input: input.to_string(),
        reason,
    };

    let hex = input.strip_prefix('#').ok_or_else(|| fail("missing leading '#'"))?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(fail("non-hex digit"));
    }

    match hex.len() {
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            match (channel(0), channel(2), channel(4)) {
                (Ok(r), Ok(g), Ok(b)) => Ok(Rgb::new(r, g, b)),
                _ => Err(fail("non-hex digit")),
            }
        }
        3 => {
            let mut digits = hex.chars().filter_map(|c| c.to_digit(16));
            match (digits.next(), digits.next(), digits.next()) {
                (Some(r), Some(g), Some(b)) => {
                    Ok(Rgb::new((r * 17) as u8, (g * 17) as u8, (b * 17) as u8))
                }
                _ => Err(fail("non-hex digit")),
            }
        }
        _ => Err(fail("expected 3 or 6 hex digits")),
    }
}
