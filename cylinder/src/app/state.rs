use cylinder_core::{Config, GlyphAtlas};
use std::sync::Arc;

/// Main application state
pub struct App {
    pub(super) config: Config,
    /// Shared read-only by every marquee session
    pub(super) atlas: Arc<GlyphAtlas>,
}
