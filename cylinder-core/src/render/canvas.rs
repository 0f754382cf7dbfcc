use image::{Rgba, RgbaImage};

/// Off-screen bitmap holding one fully laid-out message
///
/// Created per message and dropped once the scroll completes.
#[derive(Debug, Clone)]
pub struct CompositeCanvas {
    image: RgbaImage,
}

impl CompositeCanvas {
    /// Blank canvas; every pixel starts as transparent black
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    /// Whether `(x, y)` is a foreground pixel
    ///
    /// The font is bilevel: a pixel is lit when its red channel is saturated
    /// and it is fully opaque. Coordinates outside the canvas are unlit.
    #[inline]
    pub fn is_lit(&self, x: u32, y: u32) -> bool {
        match self.image.get_pixel_checked(x, y) {
            Some(Rgba([r, _, _, a])) => *r == u8::MAX && *a == u8::MAX,
            None => false,
        }
    }

    /// Lit pixels inside the `width`-column window starting at column `x0`
    pub fn lit_count_in(&self, x0: u32, width: u32) -> usize {
        (x0..x0.saturating_add(width))
            .flat_map(|x| (0..self.height()).map(move |y| (x, y)))
            .filter(|&(x, y)| self.is_lit(x, y))
            .count()
    }
}
