mod canvas;
mod compose;

pub use canvas::CompositeCanvas;
pub use compose::{compose, composite_width, Layout};
