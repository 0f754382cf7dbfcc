/// Layout constants shared by the compositor and the default configuration
///
/// These values define the horizontal spacing of a composed message and must
/// stay in sync with the built-in glyph table:
/// - The measuring pass (to size the composite canvas)
/// - The drawing pass (to position glyphs on the canvas)
///
/// Changing them changes both the canvas width and the number of scroll frames.

/// Blank columns before the first glyph, in pixels
pub const LEADING_MARGIN: u32 = 40;

/// Horizontal advance for the space character, in pixels
pub const SPACE_ADVANCE: u32 = 3;

/// Blank column inserted after every drawn glyph
pub const KERNING: u32 = 1;

/// Row count of the built-in font sheet
pub const GLYPH_HEIGHT: u32 = 5;

/// Reference panel: 20 columns of 5 lights
pub const PANEL_WIDTH: u32 = 20;
pub const PANEL_HEIGHT: u32 = 5;

/// Delay between scroll frames in milliseconds
pub const FRAME_DELAY_MS: u64 = 60;

/// Delay between steps of a colour wipe in milliseconds
pub const WIPE_DELAY_MS: u64 = 500;

/// Longest message text the listener queues, in characters
pub const MAX_MESSAGE_LEN: usize = 256;
