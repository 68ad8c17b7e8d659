//! Pan/zoom transform and pointer ↔ canvas conversions.
//!
//! Screen space is what the hosting view reports for pointer events. Canvas
//! space is where node positions live and is invariant to pan and zoom:
//!
//! ```text
//! canvas = (screen - pan) / scale
//! screen = canvas * scale + pan
//! ```
//!
//! Every function here is pure. Division by zero is prevented by [`Transform`]
//! clamping its scale on every write, not by the conversion functions.

use serde::{Deserialize, Serialize};

/// A 2D point, used for both screen and canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_sq(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rectangle from two arbitrary corners.
    ///
    /// Works for any drag direction: the result always has a non-negative
    /// width and height.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Allowed zoom range. Both bounds are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    pub min: f32,
    pub max: f32,
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self { min: 0.1, max: 3.0 }
    }
}

impl ScaleBounds {
    /// Clamp `scale` into range. Non-finite values fall back to 1.0 (then clamped).
    pub fn clamp(&self, scale: f32) -> f32 {
        let scale = if scale.is_finite() { scale } else { 1.0 };
        scale.clamp(self.min, self.max)
    }
}

/// Pan/zoom state of one editor instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub pan_x: f32,
    pub pan_y: f32,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        pan_x: 0.0,
        pan_y: 0.0,
        scale: 1.0,
    };

    /// Create a transform, clamping the scale and zeroing non-finite pan.
    pub fn new(pan_x: f32, pan_y: f32, scale: f32, bounds: ScaleBounds) -> Self {
        Self {
            pan_x: finite_or_zero(pan_x),
            pan_y: finite_or_zero(pan_y),
            scale: bounds.clamp(scale),
        }
    }

    pub fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    /// Set the scale directly, clamped to `bounds`.
    pub fn set_scale(&mut self, scale: f32, bounds: ScaleBounds) {
        self.scale = bounds.clamp(scale);
    }

    /// Translate the view by a screen-space delta. Non-finite deltas are ignored.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        if dx.is_finite() && dy.is_finite() {
            self.pan_x += dx;
            self.pan_y += dy;
        }
    }

    /// Multiply the scale by `factor`, keeping the canvas point under
    /// `anchor` (screen space) fixed on screen.
    pub fn zoom_at(&mut self, anchor: Point, factor: f32, bounds: ScaleBounds) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.zoom_to(anchor, self.scale * factor, bounds);
    }

    /// Set the scale to `scale` (clamped), keeping the canvas point under
    /// `anchor` fixed on screen.
    pub fn zoom_to(&mut self, anchor: Point, scale: f32, bounds: ScaleBounds) {
        if !scale.is_finite() || scale <= 0.0 || !anchor.is_finite() {
            return;
        }
        let canvas_anchor = screen_to_canvas(anchor, self);
        self.scale = bounds.clamp(scale);
        self.pan_x = anchor.x - canvas_anchor.x * self.scale;
        self.pan_y = anchor.y - canvas_anchor.y * self.scale;
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Convert a screen-space point to canvas space: `(p - pan) / scale`.
pub fn screen_to_canvas(p: Point, t: &Transform) -> Point {
    Point::new((p.x - t.pan_x) / t.scale, (p.y - t.pan_y) / t.scale)
}

/// Convert a canvas-space point to screen space: `p * scale + pan`.
pub fn canvas_to_screen(p: Point, t: &Transform) -> Point {
    Point::new(p.x * t.scale + t.pan_x, p.y * t.scale + t.pan_y)
}

/// Round `v` to the nearest multiple of `grid`.
pub fn snap_to_grid(v: f32, grid: f32) -> f32 {
    (v / grid).round() * grid
}

/// Snap both coordinates of a point to the grid.
pub fn snap_point(p: Point, grid: f32) -> Point {
    Point::new(snap_to_grid(p.x, grid), snap_to_grid(p.y, grid))
}
