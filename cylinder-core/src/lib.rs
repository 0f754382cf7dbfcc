pub mod color;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod font;
pub mod marquee;
pub mod message;
pub mod panel;
pub mod render;
pub mod scroll;

#[cfg(test)]
mod testing;

pub use color::{parse_hex_color, ColorFormatError, Rgb};
pub use config::{Config, DriverKind};
pub use driver::{DisplayDriver, RecordingDriver};
pub use error::{DriverError, Error, Result};
pub use font::{GlyphAtlas, GlyphTable};
pub use marquee::{Marquee, RunSummary};
pub use message::DisplayRequest;
pub use panel::{index_of, PanelGeometry, Region};
pub use render::{compose, CompositeCanvas, Layout};
pub use scroll::{ScrollEngine, ScrollStats};
