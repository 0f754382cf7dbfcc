//! Shared fixtures for unit tests.

use image::{Rgba, RgbaImage};

use crate::font::{GlyphAtlas, GlyphTable};

pub const LIT: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Whether the synthetic sheet lights glyph-local pixel `(x, y)`
pub fn pattern_lit(x: u32, y: u32) -> bool {
    (x + y) % 2 == 0
}

/// A font sheet where every glyph cell holds a checkerboard and gaps are empty
pub fn synthetic_sheet(table: &GlyphTable) -> RgbaImage {
    let mut sheet = RgbaImage::new(table.required_sheet_width() + 1, table.height());
    for (_, metrics) in table.iter() {
        for x in 0..metrics.width {
            for y in 0..table.height() {
                if pattern_lit(x, y) {
                    sheet.put_pixel(metrics.offset + x, y, LIT);
                }
            }
        }
    }
    sheet
}

pub fn builtin_atlas() -> GlyphAtlas {
    let table = GlyphTable::builtin();
    GlyphAtlas::build(&synthetic_sheet(&table), &table).unwrap()
}

/// Lit pixels of one glyph under the synthetic pattern
pub fn pattern_count(width: u32, height: u32) -> usize {
    (0..width)
        .flat_map(|x| (0..height).map(move |y| (x, y)))
        .filter(|&(x, y)| pattern_lit(x, y))
        .count()
}
