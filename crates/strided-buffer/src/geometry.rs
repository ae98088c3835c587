use serde::{Deserialize, Serialize};

/// Logical size of a buffer in elements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    pub width: usize,
    pub height: usize,
}

impl Dimension {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// `true` when either side is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of elements, or `None` on overflow.
    #[inline]
    pub fn checked_area(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }
}

impl From<(usize, usize)> for Dimension {
    fn from((width, height): (usize, usize)) -> Self {
        Self::new(width, height)
    }
}

/// Signed element coordinates. Negative values are valid inputs to
/// bounds checks and are simply reported as outside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}
