pub mod atlas;
pub mod table;

pub use atlas::{Glyph, GlyphAtlas};
pub use table::{GlyphMetrics, GlyphTable};
