use image::imageops;

use super::canvas::CompositeCanvas;
use crate::constants::{KERNING, LEADING_MARGIN, SPACE_ADVANCE};
use crate::font::GlyphAtlas;

/// Horizontal spacing rules for composing a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Blank columns before the first glyph
    pub leading_margin: u32,
    /// Advance for `' '`
    pub space_advance: u32,
    /// Blank columns after the last glyph, so the text can leave the panel
    pub trailing_margin: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            leading_margin: LEADING_MARGIN,
            space_advance: SPACE_ADVANCE,
            trailing_margin: 0,
        }
    }
}

/// How far the cursor moves for `ch`; `None` for characters the atlas lacks
#[inline]
fn advance(ch: char, atlas: &GlyphAtlas, layout: &Layout) -> Option<u32> {
    if ch == ' ' {
        Some(layout.space_advance)
    } else {
        atlas.get(ch).map(|glyph| glyph.width() + KERNING)
    }
}

/// Width of the canvas `message` composes to
pub fn composite_width(message: &str, atlas: &GlyphAtlas, layout: &Layout) -> u32 {
    let text: u32 = message
        .chars()
        .filter_map(|ch| advance(ch, atlas, layout))
        .sum();

    layout.leading_margin + text + layout.trailing_margin
}

/// Lay out `message` left to right on a fresh canvas `panel_height` rows tall
///
/// Unknown characters are skipped without moving the cursor. An empty or
/// entirely unknown message yields a blank canvas of margin width.
pub fn compose(
    message: &str,
    atlas: &GlyphAtlas,
    layout: &Layout,
    panel_height: u32,
) -> CompositeCanvas {
    let width = composite_width(message, atlas, layout);
    let mut canvas = CompositeCanvas::new(width, panel_height);

    let mut cursor = layout.leading_margin;
    for ch in message.chars() {
        if ch == ' ' {
            cursor += layout.space_advance;
        } else if let Some(glyph) = atlas.get(ch) {
            imageops::replace(canvas.image_mut(), &glyph.image, i64::from(cursor), 0);
            cursor += glyph.width() + KERNING;
        }
    }

    debug_assert_eq!(cursor + layout.trailing_margin, width);
    log::debug!(
        "Composed {:?} into {}x{} canvas",
        message,
        canvas.width(),
        canvas.height()
    );

    canvas
}
