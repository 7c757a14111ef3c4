use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A position in canvas space (screen pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
}

impl Pixel {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rounds half away from zero, like every other conversion to canvas space.
    pub fn round(x: f64, y: f64) -> Self {
        Self::new(x.round() as i32, y.round() as i32)
    }
}

impl Sub for Pixel {
    type Output = PixelVec;

    fn sub(self, rhs: Self) -> PixelVec {
        PixelVec::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl Add<PixelVec> for Pixel {
    type Output = Pixel;

    fn add(self, rhs: PixelVec) -> Pixel {
        Pixel::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

/// A displacement in canvas space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelVec {
    pub x: i32,
    pub y: i32,
}

impl PixelVec {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn round(x: f64, y: f64) -> Self {
        Self::new(x.round() as i32, y.round() as i32)
    }
}

/// A real-valued position: image space, or sub-pixel canvas space before rounding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }
}

impl Sub for Point2 {
    type Output = Vec2;

    fn sub(self, rhs: Self) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vec2> for Point2 {
    type Output = Point2;

    fn add(self, rhs: Vec2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// A real-valued displacement or size, in image space or sub-pixel canvas space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn to_pos2(self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Width and height in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    pub width: i32,
    pub height: i32,
}

impl Dimension {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Center as the canvas sees it: integer halves.
    pub fn center(&self) -> Pixel {
        Pixel::new(self.width / 2, self.height / 2)
    }
}

/// Axis aligned rectangle in canvas space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Dimension) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Corners in the order top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Pixel; 4] {
        let (x, y, w, h) = (self.x, self.y, self.width, self.height);
        [
            Pixel::new(x, y),
            Pixel::new(x.saturating_add(w), y),
            Pixel::new(x.saturating_add(w), y.saturating_add(h)),
            Pixel::new(x, y.saturating_add(h)),
        ]
    }

    /// Smallest rectangle containing all `points`. Sizes that don't fit in
    /// an `i32` saturate.
    pub fn bounding(points: &[Pixel; 4]) -> Self {
        fn extent(min: i32, max: i32) -> i32 {
            (max as i64 - min as i64).min(i32::MAX as i64) as i32
        }

        let min_x = points.iter().map(|p| p.x).min().unwrap_or_default();
        let max_x = points.iter().map(|p| p.x).max().unwrap_or_default();
        let min_y = points.iter().map(|p| p.y).min().unwrap_or_default();
        let max_y = points.iter().map(|p| p.y).max().unwrap_or_default();
        Self::new(min_x, min_y, extent(min_x, max_x), extent(min_y, max_y))
    }

    pub fn size(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }
}

/// Axis aligned rectangle in image space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect2 {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect2 {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Vec2) -> Self {
        Self::new(0.0, 0.0, size.x, size.y)
    }

    /// Corners in the order top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Point2; 4] {
        let (x, y, w, h) = (self.x, self.y, self.width, self.height);
        [
            Point2::new(x, y),
            Point2::new(x + w, y),
            Point2::new(x + w, y + h),
            Point2::new(x, y + h),
        ]
    }

    pub fn bounding(points: &[Point2; 4]) -> Self {
        let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn center(&self) -> Point2 {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

// Interop with egui, which works in f32 logical points.

impl From<egui::Pos2> for Pixel {
    fn from(pos: egui::Pos2) -> Self {
        Pixel::round(pos.x as f64, pos.y as f64)
    }
}

impl From<Pixel> for egui::Pos2 {
    fn from(pixel: Pixel) -> Self {
        egui::Pos2::new(pixel.x as f32, pixel.y as f32)
    }
}

impl From<egui::Vec2> for Vec2 {
    fn from(vec: egui::Vec2) -> Self {
        Vec2::new(vec.x as f64, vec.y as f64)
    }
}

impl From<egui::Vec2> for Dimension {
    fn from(size: egui::Vec2) -> Self {
        Dimension::new(size.x.round() as i32, size.y.round() as i32)
    }
}

impl From<Dimension> for egui::Vec2 {
    fn from(dim: Dimension) -> Self {
        egui::Vec2::new(dim.width as f32, dim.height as f32)
    }
}

impl From<PixelRect> for egui::Rect {
    fn from(rect: PixelRect) -> Self {
        egui::Rect::from_min_size(
            egui::Pos2::new(rect.x as f32, rect.y as f32),
            egui::Vec2::new(rect.width as f32, rect.height as f32),
        )
    }
}
