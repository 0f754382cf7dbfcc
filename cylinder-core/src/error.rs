//! Error types for the marquee core.

use std::path::PathBuf;
use thiserror::Error;

use crate::color::ColorFormatError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Font sheet missing or undecodable. Fatal at startup.
    #[error("failed to load font sheet {}: {source}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A glyph table entry points outside the font sheet. Fatal at startup.
    #[error(
        "glyph {ch:?} at x={offset} width={width} height={height} exceeds font sheet {sheet_width}x{sheet_height}"
    )]
    GlyphBounds {
        ch: char,
        offset: u32,
        width: u32,
        height: u32,
        sheet_width: u32,
        sheet_height: u32,
    },

    #[error("invalid glyph table {}: {reason}", path.display())]
    GlyphTable { path: PathBuf, reason: String },

    #[error(transparent)]
    ColorFormat(#[from] ColorFormatError),

    /// The driver failed mid-scroll; frames already pushed stay on the panel.
    #[error("render failed at frame {frame}: {source}")]
    Render {
        frame: usize,
        #[source]
        source: DriverError,
    },

    #[error("geometry mismatch: {0}")]
    Geometry(String),

    #[error("driver error: {0}")]
    Driver(#[from] DriverError),
}

/// Errors reported by a [`DisplayDriver`](crate::driver::DisplayDriver).
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("driver not initialized")]
    NotInitialized,

    #[error("no such channel: {0}")]
    NoSuchChannel(usize),

    #[error("{0}")]
    Fault(String),
}
