use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::constants::GLYPH_HEIGHT;
use crate::error::{Error, Result};

/// Where a glyph lives on the font sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphMetrics {
    /// Left edge on the sheet, in pixels
    pub offset: u32,
    /// Glyph width in pixels
    pub width: u32,
}

/// Built-in font sheet layout: (char, sheet offset, width).
/// Lower-case letters reuse the upper-case cells.
const BUILTIN_GLYPHS: &[(char, u32, u32)] = &[
    ('A', 0, 5),
    ('B', 6, 5),
    ('C', 12, 5),
    ('D', 18, 5),
    ('E', 24, 5),
    ('F', 30, 5),
    ('G', 36, 5),
    ('H', 42, 5),
    ('I', 48, 1),
    ('J', 50, 5),
    ('K', 56, 4),
    ('L', 61, 5),
    ('M', 67, 5),
    ('N', 73, 5),
    ('O', 79, 5),
    ('P', 85, 5),
    ('Q', 91, 5),
    ('R', 97, 5),
    ('S', 103, 5),
    ('T', 109, 5),
    ('U', 115, 5),
    ('V', 121, 5),
    ('W', 127, 5),
    ('X', 133, 5),
    ('Y', 139, 5),
    ('Z', 145, 5),
    ('1', 151, 2),
    ('2', 154, 4),
    ('3', 159, 4),
    ('4', 164, 4),
    ('5', 169, 4),
    ('6', 174, 4),
    ('7', 179, 3),
    ('8', 183, 5),
    ('9', 189, 5),
    ('0', 195, 5),
    ('!', 201, 1),
    ('#', 203, 5),
    ('$', 209, 5),
    ('%', 215, 5),
    ('^', 221, 3),
    ('&', 225, 4),
    ('*', 230, 3),
    ('(', 234, 2),
    (')', 237, 2),
    ('_', 240, 5),
    ('+', 246, 3),
    ('=', 250, 3),
    ('-', 254, 3),
    ('/', 258, 5),
    ('\\', 264, 5),
    ('~', 270, 5),
    ('<', 276, 2),
    ('>', 279, 2),
    (',', 282, 2),
    ('.', 285, 1),
];

/// Immutable character -> sheet region table
///
/// Built once at startup and handed to [`GlyphAtlas::build`](super::GlyphAtlas::build).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphTable {
    height: u32,
    glyphs: BTreeMap<char, GlyphMetrics>,
}

/// On-disk form of a glyph table
#[derive(Debug, Serialize, Deserialize)]
struct TableFile {
    height: u32,
    glyphs: BTreeMap<String, GlyphMetrics>,
}

impl GlyphTable {
    pub fn new(height: u32, glyphs: impl IntoIterator<Item = (char, GlyphMetrics)>) -> Self {
        Self {
            height,
            glyphs: glyphs.into_iter().collect(),
        }
    }

    /// The table matching the stock `charmap.png` sheet
    pub fn builtin() -> Self {
        let upper = BUILTIN_GLYPHS
            .iter()
            .map(|&(ch, offset, width)| (ch, GlyphMetrics { offset, width }));
        let lower = BUILTIN_GLYPHS
            .iter()
            .filter(|(ch, _, _)| ch.is_ascii_uppercase())
            .map(|&(ch, offset, width)| (ch.to_ascii_lowercase(), GlyphMetrics { offset, width }));

        Self::new(GLYPH_HEIGHT, upper.chain(lower))
    }

    /// Load a table from TOML:
    ///
    /// ```toml
    /// height = 5
    /// [glyphs]
    /// "A" = { offset = 0, width = 5 }
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let invalid = |reason: String| Error::GlyphTable {
            path: path.to_path_buf(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let file: TableFile = toml::from_str(&contents).map_err(|e| invalid(e.to_string()))?;

        if file.height == 0 {
            return Err(invalid("height must be positive".to_string()));
        }

        let mut glyphs = BTreeMap::new();
        for (key, metrics) in file.glyphs {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => {
                    glyphs.insert(ch, metrics);
                }
                _ => return Err(invalid(format!("key {key:?} is not a single character"))),
            }
        }

        info!("Loaded glyph table from {} ({} glyphs)", path.display(), glyphs.len());

        Ok(Self {
            height: file.height,
            glyphs,
        })
    }

    pub fn get(&self, ch: char) -> Option<&GlyphMetrics> {
        self.glyphs.get(&ch)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &GlyphMetrics)> {
        self.glyphs.iter().map(|(ch, m)| (*ch, m))
    }

    /// Row count shared by every glyph
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Smallest sheet width that contains every glyph
    pub fn required_sheet_width(&self) -> u32 {
        self.glyphs
            .values()
            .map(|m| m.offset.saturating_add(m.width))
            .max()
            .unwrap_or(0)
    }
}

impl Default for GlyphTable {
    fn default() -> Self {
        Self::builtin()
    }
}
