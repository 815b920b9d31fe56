//! Normalized geometry shared by every planning stage
//!
//! All planning math works on points and rectangles in the unit square.
//! Every value carries the coordinate space it was expressed in, so a
//! bottom-left-origin sample from the accessibility layer can never be
//! mixed silently with top-left-origin cursor data.

use serde::{Deserialize, Serialize};

/// Below this, lengths and time deltas are treated as zero.
pub const EPSILON: f64 = 1e-9;

/// Origin convention of a normalized value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoordinateSpace {
    /// y grows downward (screen capture, cursor telemetry)
    #[default]
    TopLeft,
    /// y grows upward (AppKit / accessibility frames)
    BottomLeft,
}

/// Point in [0,1] x [0,1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub space: CoordinateSpace,
}

impl NormalizedPoint {
    /// Create a top-left-origin point
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            space: CoordinateSpace::TopLeft,
        }
    }

    pub const fn with_space(x: f64, y: f64, space: CoordinateSpace) -> Self {
        Self { x, y, space }
    }

    /// Frame center in top-left space
    pub const fn center() -> Self {
        Self::new(0.5, 0.5)
    }

    /// Convert to top-left space (no-op if already there)
    pub fn to_top_left(self) -> Self {
        match self.space {
            CoordinateSpace::TopLeft => self,
            CoordinateSpace::BottomLeft => Self::new(self.x, 1.0 - self.y),
        }
    }

    /// Euclidean distance to another point
    ///
    /// Both points are compared in top-left space.
    pub fn distance_to(&self, other: &NormalizedPoint) -> f64 {
        let a = self.to_top_left();
        let b = other.to_top_left();
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear blend toward `other`, in top-left space
    pub fn lerp(&self, other: &NormalizedPoint, t: f64) -> NormalizedPoint {
        let a = self.to_top_left();
        let b = other.to_top_left();
        NormalizedPoint::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
    }

    /// Clamp both coordinates to [0,1]
    pub fn clamped(&self) -> NormalizedPoint {
        NormalizedPoint::with_space(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0), self.space)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Perpendicular distance to the chord `start`-`end`
    ///
    /// Degenerate (zero-length) chords fall back to the distance to `start`.
    pub fn perpendicular_distance(&self, start: &NormalizedPoint, end: &NormalizedPoint) -> f64 {
        let p = self.to_top_left();
        let a = start.to_top_left();
        let b = end.to_top_left();
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let length_sq = dx * dx + dy * dy;

        if length_sq < EPSILON * EPSILON {
            return p.distance_to(&a);
        }

        ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / length_sq.sqrt()
    }
}

impl Default for NormalizedPoint {
    fn default() -> Self {
        Self::center()
    }
}

/// Axis-aligned rectangle in normalized space, origin at `(x, y)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub space: CoordinateSpace,
}

impl NormalizedRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            space: CoordinateSpace::TopLeft,
        }
    }

    pub const fn with_space(x: f64, y: f64, width: f64, height: f64, space: CoordinateSpace) -> Self {
        Self {
            x,
            y,
            width,
            height,
            space,
        }
    }

    /// Rectangle of the given size centered on `center`
    pub fn centered_at(center: NormalizedPoint, width: f64, height: f64) -> Self {
        let c = center.to_top_left();
        Self::new(c.x - width / 2.0, c.y - height / 2.0, width, height)
    }

    /// The full frame
    pub const fn unit() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Convert to top-left space (no-op if already there)
    pub fn to_top_left(self) -> Self {
        match self.space {
            CoordinateSpace::TopLeft => self,
            CoordinateSpace::BottomLeft => {
                Self::new(self.x, 1.0 - self.y - self.height, self.width, self.height)
            }
        }
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Center point, in top-left space
    pub fn center(&self) -> NormalizedPoint {
        let r = self.to_top_left();
        NormalizedPoint::new(r.x + r.width / 2.0, r.y + r.height / 2.0)
    }

    /// Grow the rectangle by `padding` on every side
    pub fn padded(&self, padding: f64) -> NormalizedRect {
        let r = self.to_top_left();
        NormalizedRect::new(
            r.x - padding,
            r.y - padding,
            r.width + 2.0 * padding,
            r.height + 2.0 * padding,
        )
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &NormalizedRect) -> NormalizedRect {
        let a = self.to_top_left();
        let b = other.to_top_left();
        let min_x = a.min_x().min(b.min_x());
        let min_y = a.min_y().min(b.min_y());
        let max_x = a.max_x().max(b.max_x());
        let max_y = a.max_y().max(b.max_y());
        NormalizedRect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Intersection with the unit square
    pub fn clamped_to_unit(&self) -> NormalizedRect {
        let r = self.to_top_left();
        let min_x = r.min_x().clamp(0.0, 1.0);
        let min_y = r.min_y().clamp(0.0, 1.0);
        let max_x = r.max_x().clamp(0.0, 1.0);
        let max_y = r.max_y().clamp(0.0, 1.0);
        NormalizedRect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn contains(&self, point: &NormalizedPoint) -> bool {
        let r = self.to_top_left();
        let p = point.to_top_left();
        p.x >= r.min_x() && p.x <= r.max_x() && p.y >= r.min_y() && p.y <= r.max_y()
    }

    /// Approximate equality, used to match element frames across samples
    pub fn approx_eq(&self, other: &NormalizedRect, tolerance: f64) -> bool {
        let a = self.to_top_left();
        let b = other.to_top_left();
        (a.x - b.x).abs() <= tolerance
            && (a.y - b.y).abs() <= tolerance
            && (a.width - b.width).abs() <= tolerance
            && (a.height - b.height).abs() <= tolerance
    }

    /// Bounding box of a set of points, `None` when empty
    pub fn bounding(points: &[NormalizedPoint]) -> Option<NormalizedRect> {
        let first = points.first()?.to_top_left();
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points.iter().skip(1).map(|p| p.to_top_left()) {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(NormalizedRect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

/// Screen size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

/// Rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    /// Normalize against the screen size, tagging the result with `space`
    ///
    /// Returns `None` for a degenerate screen size.
    pub fn normalize(&self, screen: ScreenSize, space: CoordinateSpace) -> Option<NormalizedRect> {
        if screen.width < EPSILON || screen.height < EPSILON {
            return None;
        }
        Some(NormalizedRect::with_space(
            self.x / screen.width,
            self.y / screen.height,
            self.width / screen.width,
            self.height / screen.height,
            space,
        ))
    }
}

/// Linear interpolation
#[inline]
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    (end - start).mul_add(t, start)
}

/// Arithmetic mean of the points, `None` when empty
pub fn centroid(points: &[NormalizedPoint]) -> Option<NormalizedPoint> {
    if points.is_empty() {
        return None;
    }
    let (sum_x, sum_y) = points
        .iter()
        .map(|p| p.to_top_left())
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = points.len() as f64;
    Some(NormalizedPoint::new(sum_x / n, sum_y / n))
}

/// Total polyline length
pub fn path_length(points: &[NormalizedPoint]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Clamp a camera center so the viewport `[c - 0.5/zoom, c + 0.5/zoom]` stays in the frame
pub fn clamp_center(center: NormalizedPoint, zoom: f64) -> NormalizedPoint {
    let c = center.to_top_left();
    let zoom = if zoom.is_finite() { zoom.max(1.0) } else { 1.0 };
    let half = 0.5 / zoom;
    NormalizedPoint::new(clamp_axis(c.x, half), clamp_axis(c.y, half))
}

fn clamp_axis(value: f64, half: f64) -> f64 {
    let (lo, hi) = (half, 1.0 - half);
    if lo >= hi {
        return 0.5;
    }
    if value.is_nan() {
        return 0.5;
    }
    value.clamp(lo, hi)
}

/// Viewport rectangle seen through a camera at `center` and `zoom`
pub fn viewport_rect(center: NormalizedPoint, zoom: f64) -> NormalizedRect {
    let size = 1.0 / zoom.max(1.0);
    NormalizedRect::centered_at(center, size, size)
}
