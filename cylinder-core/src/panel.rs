/// Panel geometry and serpentine index mapping
///
/// The light strip snakes through the panel column by column: up the even
/// columns and down the odd ones (or the reverse, with `flip_y`). Physically
/// adjacent lights are therefore also adjacent in strip order, and converting
/// a logical `(x, y)` into a strip index needs a zig-zag computation rather
/// than row-major addressing.
///
/// - `index_of` maps coordinates relative to a region of explicit height
/// - `Region` carries an origin offset so cropped windows share the mapping
/// - `PanelGeometry` is the full physical grid

/// Strip index of `(x, y)` in a serpentine grid `height` rows tall
///
/// With `flip_y`, logical row 0 is wired as the bottom row. Callers guarantee
/// `y < height`; other inputs produce an unspecified index.
#[inline]
pub fn index_of(x: usize, y: usize, height: usize, flip_y: bool) -> usize {
    debug_assert!(y < height, "y={y} outside height {height}");

    let y = if flip_y { (height - 1) - y } else { y };

    if x % 2 == 0 {
        x * height + y
    } else {
        x * height + (height - 1 - y)
    }
}

/// Rectangular sub-region addressed with its own serpentine period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    /// Strip index of absolute `(x, y)` within this region
    ///
    /// The origin is subtracted first and the region's height is the period.
    #[inline]
    pub fn index_of(&self, x: usize, y: usize, flip_y: bool) -> usize {
        debug_assert!(self.contains(x, y), "({x}, {y}) outside {self:?}");
        index_of(x - self.x, y - self.y, self.height, flip_y)
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The physical light grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelGeometry {
    pub width: usize,
    pub height: usize,
    /// Row 0 of panel space is wired at the bottom
    pub flip_y: bool,
}

impl PanelGeometry {
    pub fn new(width: usize, height: usize, flip_y: bool) -> Self {
        Self {
            width,
            height,
            flip_y,
        }
    }

    /// Number of lights, which is also the frame buffer length
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn region(&self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }

    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        index_of(x, y, self.height, self.flip_y)
    }

    /// Inverse of [`index_of`](Self::index_of)
    pub fn coords_of(&self, index: usize) -> (usize, usize) {
        let x = index / self.height;
        let along = index % self.height;
        let y = if x % 2 == 0 { along } else { self.height - 1 - along };
        if self.flip_y {
            (x, self.height - 1 - y)
        } else {
            (x, y)
        }
    }
}
