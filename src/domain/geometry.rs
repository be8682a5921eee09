use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Closed integer interval `lo..=hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    lo: i32,
    hi: i32,
}

impl Span {
    /// Builds a span, rejecting `lo > hi` instead of clamping.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRange`] when the bounds are reversed.
    pub fn new(lo: i32, hi: i32) -> AppResult<Self> {
        if lo > hi {
            return Err(AppError::validation(ValidationError::InvalidRange {
                lo: i64::from(lo),
                hi: i64::from(hi),
            }));
        }
        Ok(Self { lo, hi })
    }

    #[must_use]
    pub const fn lo(&self) -> i32 {
        self.lo
    }

    #[must_use]
    pub const fn hi(&self) -> i32 {
        self.hi
    }

    #[must_use]
    pub const fn contains(&self, value: i32) -> bool {
        value >= self.lo && value <= self.hi
    }

    #[must_use]
    pub fn len(&self) -> u32 {
        self.hi.abs_diff(self.lo)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lo == self.hi
    }
}

/// Screen-space rectangle used by conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Builds a region spanning `top_left..=bottom_right`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRange`] when `bottom_right` lies above
    /// or left of `top_left`.
    pub fn from_corners(top_left: Point, bottom_right: Point) -> AppResult<Self> {
        let xs = Span::new(top_left.x, bottom_right.x)?;
        let ys = Span::new(top_left.y, bottom_right.y)?;
        Ok(Self {
            x: xs.lo(),
            y: ys.lo(),
            width: xs.len(),
            height: ys.len(),
        })
    }

    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let right = i64::from(self.x).saturating_add(i64::from(self.width));
        let bottom = i64::from(self.y).saturating_add(i64::from(self.height));
        point.x >= self.x
            && point.y >= self.y
            && i64::from(point.x) <= right
            && i64::from(point.y) <= bottom
    }
}
