use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::geom::{Dimension, Pixel, PixelRect, PixelVec, Point2, Rect2, Vec2};

/// Zoom, pan and rotation of a canvas over an image.
///
/// Offsets are expressed in scaled units, before rotation:
/// `canvas = R(scale * image + offset - pivot) + pivot`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct View {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Radians, clockwise on screen.
    pub rotation: f64,
}

impl Default for View {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }
}

impl View {
    /// View with no offset, used to measure the image alone.
    pub fn anchored(scale: Vec2, rotation: f64) -> Self {
        Self {
            scale_x: scale.x,
            scale_y: scale.y,
            rotation,
            ..Default::default()
        }
    }

    pub fn scale(&self) -> Vec2 {
        Vec2::new(self.scale_x, self.scale_y)
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.offset_x, self.offset_y)
    }

    /// Rotation in `[0, 2π)`.
    pub fn rotation_normalized(&self) -> f64 {
        self.rotation.rem_euclid(TAU)
    }
}

/// A view resolved against a canvas: the affine part plus the rotation,
/// with `cos`/`sin` computed once and shared by every point mapped through it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mapping {
    offset_x: f64,
    offset_y: f64,
    scale_x: f64,
    scale_y: f64,
    cos: f64,
    sin: f64,
    pivot_x: f64,
    pivot_y: f64,
}

impl Mapping {
    /// Rotation by `rotation` about `pivot` (canvas space).
    pub fn new(view: &View, rotation: f64, pivot: Pixel) -> Self {
        Self {
            offset_x: view.offset_x,
            offset_y: view.offset_y,
            scale_x: view.scale_x,
            scale_y: view.scale_y,
            cos: rotation.cos(),
            sin: rotation.sin(),
            pivot_x: pivot.x as f64,
            pivot_y: pivot.y as f64,
        }
    }

    fn rotate(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.cos - y * self.sin, x * self.sin + y * self.cos)
    }

    // cos(-a) = cos(a), sin(-a) = -sin(a)
    fn unrotate(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.cos + y * self.sin, y * self.cos - x * self.sin)
    }

    /// Canvas position of an image point, before rounding to a pixel.
    pub fn pos_to_canvas_exact(&self, pos: Point2) -> Point2 {
        let dx = pos.x * self.scale_x + self.offset_x - self.pivot_x;
        let dy = pos.y * self.scale_y + self.offset_y - self.pivot_y;
        let (x, y) = self.rotate(dx, dy);
        Point2::new(x + self.pivot_x, y + self.pivot_y)
    }

    pub fn pos_to_canvas(&self, pos: Point2) -> Pixel {
        let p = self.pos_to_canvas_exact(pos);
        Pixel::round(p.x, p.y)
    }

    /// Image position under a (possibly sub-pixel) canvas position.
    pub fn pos_from_canvas_exact(&self, pos: Point2) -> Point2 {
        let (x, y) = self.unrotate(pos.x - self.pivot_x, pos.y - self.pivot_y);
        Point2::new(
            (x + self.pivot_x - self.offset_x) / self.scale_x,
            (y + self.pivot_y - self.offset_y) / self.scale_y,
        )
    }

    pub fn pos_from_canvas(&self, pos: Pixel) -> Point2 {
        self.pos_from_canvas_exact(Point2::new(pos.x as f64, pos.y as f64))
    }

    pub fn vec_to_canvas(&self, vec: Vec2) -> PixelVec {
        let (x, y) = self.rotate(vec.x * self.scale_x, vec.y * self.scale_y);
        PixelVec::round(x, y)
    }

    pub fn vec_from_canvas_exact(&self, vec: Vec2) -> Vec2 {
        let (x, y) = self.unrotate(vec.x, vec.y);
        Vec2::new(x / self.scale_x, y / self.scale_y)
    }

    pub fn vec_from_canvas(&self, vec: PixelVec) -> Vec2 {
        self.vec_from_canvas_exact(Vec2::new(vec.x as f64, vec.y as f64))
    }

    /// Bounding box of the four mapped corners; not reversible under rotation.
    pub fn rect_to_canvas(&self, rect: Rect2) -> PixelRect {
        PixelRect::bounding(&rect.corners().map(|p| self.pos_to_canvas(p)))
    }

    pub fn rect_from_canvas(&self, rect: PixelRect) -> Rect2 {
        Rect2::bounding(&rect.corners().map(|p| self.pos_from_canvas(p)))
    }
}

/// How a [`View`] maps onto a canvas of a given size.
///
/// Implementors only choose the rotation and pivot; every conversion is
/// provided on top of [`Projection::resolve`].
pub trait Projection {
    fn resolve(&self, view: &View, canvas: Dimension) -> Mapping;

    fn pos_to_canvas(&self, view: &View, canvas: Dimension, pos: Point2) -> Pixel {
        self.resolve(view, canvas).pos_to_canvas(pos)
    }

    fn pos_from_canvas(&self, view: &View, canvas: Dimension, pos: Pixel) -> Point2 {
        self.resolve(view, canvas).pos_from_canvas(pos)
    }

    fn vec_to_canvas(&self, view: &View, canvas: Dimension, vec: Vec2) -> PixelVec {
        self.resolve(view, canvas).vec_to_canvas(vec)
    }

    fn vec_from_canvas(&self, view: &View, canvas: Dimension, vec: PixelVec) -> Vec2 {
        self.resolve(view, canvas).vec_from_canvas(vec)
    }

    fn rect_to_canvas(&self, view: &View, canvas: Dimension, rect: Rect2) -> PixelRect {
        self.resolve(view, canvas).rect_to_canvas(rect)
    }

    fn rect_from_canvas(&self, view: &View, canvas: Dimension, rect: PixelRect) -> Rect2 {
        self.resolve(view, canvas).rect_from_canvas(rect)
    }

    /// Size in canvas pixels of the whole image drawn at `scale` and
    /// `rotation`, ignoring the offset.
    fn image_canvas_size(
        &self,
        image: Vec2,
        canvas: Dimension,
        scale: Vec2,
        rotation: f64,
    ) -> Dimension {
        let mapping = self.resolve(&View::anchored(scale, rotation), canvas);
        mapping.rect_to_canvas(Rect2::from_size(image)).size()
    }

    /// Per-axis scale that makes the rotated image fill the canvas.
    ///
    /// The bounding box is measured at scale 1 and then divided into the
    /// canvas size; callers usually keep the smaller of the two factors.
    fn fit_scale(&self, image: Vec2, canvas: Dimension, rotation: f64) -> Option<Vec2> {
        if !(image.x > 0.0 && image.y > 0.0) {
            return None;
        }

        let size = self.image_canvas_size(image, canvas, Vec2::new(1.0, 1.0), rotation);
        if size.is_empty() {
            return None;
        }

        Some(Vec2::new(
            canvas.width as f64 / size.width as f64,
            canvas.height as f64 / size.height as f64,
        ))
    }
}

/// Rotation about the canvas center.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CenterRotation;

impl Projection for CenterRotation {
    fn resolve(&self, view: &View, canvas: Dimension) -> Mapping {
        Mapping::new(view, view.rotation, canvas.center())
    }
}

/// Plain zoom and pan; the view's rotation is ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoRotation;

impl Projection for NoRotation {
    fn resolve(&self, view: &View, _canvas: Dimension) -> Mapping {
        Mapping::new(view, 0.0, Pixel::ZERO)
    }
}

/// Rotation about a fixed canvas position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PivotRotation {
    pub pivot: Pixel,
}

impl PivotRotation {
    pub fn new(pivot: Pixel) -> Self {
        Self { pivot }
    }
}

impl Projection for PivotRotation {
    fn resolve(&self, view: &View, _canvas: Dimension) -> Mapping {
        Mapping::new(view, view.rotation, self.pivot)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    use super::*;

    const ROTATIONS: [f64; 7] = [0.0, 0.3, FRAC_PI_4, FRAC_PI_2, 2.0, PI, -1.1];
    const SCALES: [(f64, f64); 4] = [(1.0, 1.0), (0.25, 0.25), (3.7, 3.7), (2.0, 0.5)];
    const OFFSETS: [(f64, f64); 3] = [(0.0, 0.0), (-120.0, 35.0), (17.5, -250.25)];
    const CANVAS: Dimension = Dimension::new(800, 600);

    fn views() -> Vec<View> {
        let mut views = Vec::new();
        for rotation in ROTATIONS {
            for (scale_x, scale_y) in SCALES {
                for (offset_x, offset_y) in OFFSETS {
                    views.push(View {
                        offset_x,
                        offset_y,
                        scale_x,
                        scale_y,
                        rotation,
                    });
                }
            }
        }
        views
    }

    fn points() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(12.3, -4.56),
            Point2::new(511.0, 383.5),
            Point2::new(-1000.25, 77.7),
            Point2::new(0.49, 0.51),
        ]
    }

    /// Worst per-axis error, in image units, left by rounding a canvas position.
    fn rounding_tolerance(view: &View) -> (f64, f64) {
        let spread = 0.5 * (view.rotation.cos().abs() + view.rotation.sin().abs());
        (spread / view.scale_x + 1e-9, spread / view.scale_y + 1e-9)
    }

    #[test]
    fn point_round_trip_within_rounding() {
        for view in views() {
            let (tol_x, tol_y) = rounding_tolerance(&view);
            for p in points() {
                let canvas = CenterRotation.pos_to_canvas(&view, CANVAS, p);
                let back = CenterRotation.pos_from_canvas(&view, CANVAS, canvas);
                assert!(
                    (back.x - p.x).abs() <= tol_x && (back.y - p.y).abs() <= tol_y,
                    "{p:?} -> {canvas:?} -> {back:?} with {view:?}"
                );
            }
        }
    }

    #[test]
    fn unrotated_round_trip_within_half_pixel() {
        for view in views().into_iter().filter(|v| v.rotation == 0.0) {
            for p in points() {
                let back = CenterRotation.pos_from_canvas(
                    &view,
                    CANVAS,
                    CenterRotation.pos_to_canvas(&view, CANVAS, p),
                );
                assert!((back.x - p.x).abs() <= 0.5 / view.scale_x + 1e-9);
                assert!((back.y - p.y).abs() <= 0.5 / view.scale_y + 1e-9);
            }
        }
    }

    #[test]
    fn exact_positions_invert() {
        for view in views() {
            let mapping = CenterRotation.resolve(&view, CANVAS);
            for p in points() {
                let back = mapping.pos_from_canvas_exact(mapping.pos_to_canvas_exact(p));
                assert!(back.distance(p) < 1e-9, "{p:?} -> {back:?} with {view:?}");
            }
        }
    }

    #[test]
    fn identity_view_rounds() {
        let view = View::default();
        for p in points() {
            assert_eq!(
                CenterRotation.pos_to_canvas(&view, CANVAS, p),
                Pixel::new(p.x.round() as i32, p.y.round() as i32)
            );
        }
        assert_eq!(
            CenterRotation.pos_to_canvas(&view, CANVAS, Point2::new(2.5, -2.5)),
            Pixel::new(3, -3)
        );
    }

    #[test]
    fn delta_round_trip() {
        for view in views() {
            let (tol_x, tol_y) = rounding_tolerance(&view);
            for dx in [1.0, -7.0, 42.0, 300.0] {
                let canvas = CenterRotation.vec_to_canvas(&view, CANVAS, Vec2::new(dx, 0.0));
                let back = CenterRotation.vec_from_canvas(&view, CANVAS, canvas);
                assert!((back.x - dx).abs() <= tol_x, "{dx} -> {back:?} with {view:?}");
                assert!(back.y.abs() <= tol_y, "{dx} -> {back:?} with {view:?}");
            }
        }
    }

    #[test]
    fn deltas_ignore_offset_and_pivot() {
        let view = View {
            offset_x: 1234.0,
            offset_y: -99.0,
            scale_x: 2.0,
            scale_y: 3.0,
            rotation: 0.0,
        };
        let vec = Vec2::new(10.0, -4.0);
        assert_eq!(
            CenterRotation.vec_to_canvas(&view, CANVAS, vec),
            PixelVec::new(20, -12)
        );
        assert_eq!(
            PivotRotation::new(Pixel::new(-50, 70)).vec_to_canvas(&view, CANVAS, vec),
            PixelVec::new(20, -12)
        );

        let quarter = View {
            rotation: FRAC_PI_2,
            ..view
        };
        // x goes down, y goes left
        assert_eq!(
            CenterRotation.vec_to_canvas(&quarter, CANVAS, vec),
            PixelVec::new(12, 20)
        );
    }

    #[test]
    fn rect_from_canvas_unrotated() {
        let view = View {
            offset_x: 30.0,
            offset_y: -12.0,
            scale_x: 2.0,
            scale_y: 4.0,
            rotation: 0.0,
        };
        let rect = PixelRect::new(10, 20, 300, 200);
        let image = CenterRotation.rect_from_canvas(&view, CANVAS, rect);

        let top_left = CenterRotation.pos_from_canvas(&view, CANVAS, Pixel::new(10, 20));
        let bottom_right = CenterRotation.pos_from_canvas(&view, CANVAS, Pixel::new(310, 220));
        assert!((image.x - top_left.x).abs() < 1e-9);
        assert!((image.y - top_left.y).abs() < 1e-9);
        assert!((image.x + image.width - bottom_right.x).abs() < 1e-9);
        assert!((image.y + image.height - bottom_right.y).abs() < 1e-9);
        assert!((image.width - 150.0).abs() < 1e-9);
        assert!((image.height - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rect_under_rotation_is_bounding_box() {
        let view = View {
            rotation: FRAC_PI_4,
            ..Default::default()
        };
        let square = Rect2::new(300.0, 200.0, 100.0, 100.0);
        let canvas = CenterRotation.rect_to_canvas(&view, CANVAS, square);
        // the diagonal of a 100 px square
        assert!((canvas.width - 141).abs() <= 1, "{canvas:?}");
        assert!((canvas.height - 141).abs() <= 1, "{canvas:?}");

        // going back grows the box again
        let back = CenterRotation.rect_from_canvas(&view, CANVAS, canvas);
        assert!(back.width > square.width && back.height > square.height);
    }

    #[test]
    fn fit_scale_rejects_empty_image() {
        assert_eq!(
            CenterRotation.fit_scale(Vec2::new(0.0, 100.0), CANVAS, 0.0),
            None
        );
        assert_eq!(
            CenterRotation.fit_scale(Vec2::new(100.0, -1.0), CANVAS, 0.0),
            None
        );
        assert_eq!(
            CenterRotation.fit_scale(Vec2::new(0.2, 0.2), CANVAS, 0.0),
            None
        );
    }

    #[test]
    fn fit_scale_unrotated() {
        assert_eq!(
            CenterRotation.fit_scale(Vec2::new(100.0, 100.0), CANVAS, 0.0),
            Some(Vec2::new(8.0, 6.0))
        );
    }

    #[test]
    fn fit_scale_quarter_turn_swaps_axes() {
        assert_eq!(
            CenterRotation.fit_scale(Vec2::new(200.0, 100.0), CANVAS, FRAC_PI_2),
            Some(Vec2::new(8.0, 3.0))
        );
        // rotation ignored
        assert_eq!(
            NoRotation.fit_scale(Vec2::new(200.0, 100.0), CANVAS, FRAC_PI_2),
            Some(Vec2::new(4.0, 6.0))
        );
    }

    #[test]
    fn image_canvas_size_scales_and_rotates() {
        let image = Vec2::new(100.0, 50.0);
        assert_eq!(
            CenterRotation.image_canvas_size(image, CANVAS, Vec2::new(2.0, 2.0), 0.0),
            Dimension::new(200, 100)
        );
        assert_eq!(
            CenterRotation.image_canvas_size(image, CANVAS, Vec2::new(2.0, 2.0), FRAC_PI_2),
            Dimension::new(100, 200)
        );
        assert_eq!(
            CenterRotation.image_canvas_size(image, CANVAS, Vec2::new(1.0, 3.0), PI),
            Dimension::new(100, 150)
        );
    }

    #[test]
    fn pivot_stays_fixed() {
        let pivot = Pixel::new(123, 456);
        let view = View {
            rotation: 1.234,
            ..Default::default()
        };
        // with scale 1 and no offset the pivot is its own image position
        let image = Point2::new(123.0, 456.0);
        assert_eq!(
            PivotRotation::new(pivot).pos_to_canvas(&view, CANVAS, image),
            pivot
        );
        assert_eq!(
            CenterRotation.pos_to_canvas(&view, CANVAS, Point2::new(400.0, 300.0)),
            Pixel::new(400, 300)
        );
    }

    #[test]
    fn no_rotation_is_plain_affine() {
        let view = View {
            offset_x: 10.0,
            offset_y: 20.0,
            scale_x: 2.0,
            scale_y: 0.5,
            rotation: 1.0,
        };
        assert_eq!(
            NoRotation.pos_to_canvas(&view, CANVAS, Point2::new(5.0, 8.0)),
            Pixel::new(20, 24)
        );
        assert_eq!(
            NoRotation.pos_from_canvas(&view, CANVAS, Pixel::new(20, 24)),
            Point2::new(5.0, 8.0)
        );
    }

    #[test]
    fn rotation_normalized() {
        let view = View {
            rotation: -FRAC_PI_2,
            ..Default::default()
        };
        assert!((view.rotation_normalized() - 3.0 * FRAC_PI_2).abs() < 1e-12);

        let view = View {
            rotation: 5.0 * PI,
            ..Default::default()
        };
        assert!((view.rotation_normalized() - PI).abs() < 1e-9);
    }
}
