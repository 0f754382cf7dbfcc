use image::{imageops, RgbaImage};
use std::collections::HashMap;
use std::path::Path;

use super::table::GlyphTable;
use crate::error::{Error, Result};

/// One character cut from the font sheet
#[derive(Debug, Clone)]
pub struct Glyph {
    pub image: RgbaImage,
}

impl Glyph {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Read-only map from character to its isolated glyph bitmap
///
/// Built once at startup; shared by reference (or `Arc`) afterwards.
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    glyphs: HashMap<char, Glyph>,
    height: u32,
}

impl GlyphAtlas {
    /// Decode the font sheet image
    pub fn load_sheet(path: &Path) -> Result<RgbaImage> {
        log::info!("Loading font sheet from: {}", path.display());

        let img = image::open(path).map_err(|source| Error::Asset {
            path: path.to_path_buf(),
            source,
        })?;

        let rgba = img.to_rgba8();
        log::debug!("Font sheet is {}x{} pixels", rgba.width(), rgba.height());
        Ok(rgba)
    }

    /// Load the sheet at `path` and cut every glyph in `table` out of it
    pub fn open(path: &Path, table: &GlyphTable) -> Result<Self> {
        let sheet = Self::load_sheet(path)?;
        Self::build(&sheet, table)
    }

    /// Cut every table entry out of `sheet` into an owned bitmap
    pub fn build(sheet: &RgbaImage, table: &GlyphTable) -> Result<Self> {
        let height = table.height();
        let mut glyphs = HashMap::with_capacity(table.len());

        for (ch, metrics) in table.iter() {
            let right = metrics.offset.checked_add(metrics.width);
            if right.map_or(true, |r| r > sheet.width()) || height > sheet.height() {
                return Err(Error::GlyphBounds {
                    ch,
                    offset: metrics.offset,
                    width: metrics.width,
                    height,
                    sheet_width: sheet.width(),
                    sheet_height: sheet.height(),
                });
            }

            let image = imageops::crop_imm(sheet, metrics.offset, 0, metrics.width, height).to_image();
            glyphs.insert(ch, Glyph { image });
        }

        log::info!("Created glyph atlas with {} glyphs (height {})", glyphs.len(), height);

        Ok(Self { glyphs, height })
    }

    pub fn get(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    /// Row count of every glyph
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
