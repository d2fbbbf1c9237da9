//! Screen-space geometry: display bounds and dwell regions.

use serde::{Deserialize, Serialize};

use crate::{Pt2, Real};

/// Pixel extent of the display being calibrated against.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub width: Real,
    pub height: Real,
}

impl ScreenBounds {
    pub fn new(width: Real, height: Real) -> Self {
        Self { width, height }
    }

    /// Clamp a point into `[0, width) × [0, height)`.
    ///
    /// The upper bound is the last pixel row/column (`width − 1`, `height − 1`).
    /// Non-finite coordinates collapse onto the nearest edge (`NaN` onto 0).
    pub fn clamp(&self, p: &Pt2) -> Pt2 {
        Pt2::new(clamp_axis(p.x, self.width), clamp_axis(p.y, self.height))
    }

    pub fn contains(&self, p: &Pt2) -> bool {
        (0.0..self.width).contains(&p.x) && (0.0..self.height).contains(&p.y)
    }

    pub fn center(&self) -> Pt2 {
        Pt2::new(self.width / 2.0, self.height / 2.0)
    }
}

fn clamp_axis(v: Real, extent: Real) -> Real {
    let max = (extent - 1.0).max(0.0);
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, max)
    }
}

/// A region of the screen that can be dwelt on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Region {
    /// Axis-aligned rectangle with its top-left corner at `(x, y)`.
    ///
    /// Containment is half-open: `x <= px < x + width`.
    Rect {
        x: Real,
        y: Real,
        width: Real,
        height: Real,
    },
    /// Closed disc.
    Circle { center: Pt2, radius: Real },
}

impl Region {
    pub fn rect(x: Real, y: Real, width: Real, height: Real) -> Self {
        Self::Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of side `size` centred on `center`.
    pub fn square_around(center: Pt2, size: Real) -> Self {
        Self::rect(center.x - size / 2.0, center.y - size / 2.0, size, size)
    }

    pub fn circle(center: Pt2, radius: Real) -> Self {
        Self::Circle { center, radius }
    }

    pub fn contains(&self, p: &Pt2) -> bool {
        match *self {
            Region::Rect {
                x,
                y,
                width,
                height,
            } => p.x >= x && p.x < x + width && p.y >= y && p.y < y + height,
            Region::Circle { center, radius } => (*p - center).norm_squared() <= radius * radius,
        }
    }

    pub fn center(&self) -> Pt2 {
        match *self {
            Region::Rect {
                x,
                y,
                width,
                height,
            } => Pt2::new(x + width / 2.0, y + height / 2.0),
            Region::Circle { center, .. } => center,
        }
    }
}
