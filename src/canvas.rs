use log::{debug, warn};

use crate::{
    geom::{Dimension, Pixel, PixelRect, PixelVec, Point2, Rect2, Vec2},
    transform::{CenterRotation, Mapping, Projection, View},
};

/// A 2D viewport over an image: the current [`View`], the sizes it is
/// resolved against and the last known mouse position.
pub struct Canvas2D {
    view: View,
    canvas_size: Dimension,
    image_size: Vec2,
    mouse_image_pos: Option<Point2>,
    projection: Box<dyn Projection>,
}

impl Default for Canvas2D {
    fn default() -> Self {
        Self::new(Dimension::default(), Vec2::ZERO)
    }
}

fn valid_scale(scale: Vec2) -> bool {
    scale.x > 0.0 && scale.y > 0.0 && scale.x.is_finite() && scale.y.is_finite()
}

fn valid_offset(offset: Vec2) -> bool {
    offset.x.is_finite() && offset.y.is_finite()
}

impl Canvas2D {
    pub fn new(canvas_size: Dimension, image_size: Vec2) -> Self {
        Self {
            view: View::default(),
            canvas_size,
            image_size,
            mouse_image_pos: None,
            projection: Box::new(CenterRotation),
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Replaces the whole view. Views with an unusable scale, offset or
    /// rotation are refused.
    pub fn set_view(&mut self, view: View) {
        if !valid_scale(view.scale()) {
            warn!("Ignoring view with invalid scale {:?}", view.scale());
            return;
        }
        if !valid_offset(view.offset()) || !view.rotation.is_finite() {
            warn!("Ignoring view with non-finite offset or rotation {:?}", view);
            return;
        }
        self.view = view;
    }

    pub fn canvas_size(&self) -> Dimension {
        self.canvas_size
    }

    pub fn set_canvas_size(&mut self, size: Dimension) {
        if size != self.canvas_size {
            debug!("Canvas resized to {}x{}", size.width, size.height);
            self.canvas_size = size;
        }
    }

    pub fn image_size(&self) -> Vec2 {
        self.image_size
    }

    pub fn set_image_size(&mut self, size: Vec2) {
        self.image_size = size;
    }

    pub fn set_projection(&mut self, projection: Box<dyn Projection>) {
        self.projection = projection;
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        if !valid_offset(offset) {
            warn!("Ignoring invalid offset {:?}", offset);
            return;
        }
        self.view.offset_x = offset.x;
        self.view.offset_y = offset.y;
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        if !valid_scale(scale) {
            warn!("Ignoring invalid scale {:?}", scale);
            return;
        }
        self.view.scale_x = scale.x;
        self.view.scale_y = scale.y;
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        if rotation.is_finite() {
            self.view.rotation = rotation;
        } else {
            warn!("Ignoring rotation {rotation}");
        }
    }

    /// The current view resolved against the current canvas size.
    pub fn mapping(&self) -> Mapping {
        self.projection.resolve(&self.view, self.canvas_size)
    }

    pub fn canvas_to_image(&self, pos: Pixel) -> Point2 {
        self.projection.pos_from_canvas(&self.view, self.canvas_size, pos)
    }

    pub fn image_to_canvas(&self, pos: Point2) -> Pixel {
        self.projection.pos_to_canvas(&self.view, self.canvas_size, pos)
    }

    pub fn canvas_to_image_delta(&self, vec: PixelVec) -> Vec2 {
        self.projection.vec_from_canvas(&self.view, self.canvas_size, vec)
    }

    pub fn image_to_canvas_delta(&self, vec: Vec2) -> PixelVec {
        self.projection.vec_to_canvas(&self.view, self.canvas_size, vec)
    }

    pub fn canvas_to_image_rect(&self, rect: PixelRect) -> Rect2 {
        self.projection.rect_from_canvas(&self.view, self.canvas_size, rect)
    }

    pub fn image_to_canvas_rect(&self, rect: Rect2) -> PixelRect {
        self.projection.rect_to_canvas(&self.view, self.canvas_size, rect)
    }

    /// Canvas delta expressed as an offset change: rotated back, not scaled.
    fn offset_delta(&self, vec: Vec2) -> Vec2 {
        let unit = View::anchored(Vec2::new(1.0, 1.0), self.view.rotation);
        self.projection
            .resolve(&unit, self.canvas_size)
            .vec_from_canvas_exact(vec)
    }

    fn add_offset(&mut self, delta: Vec2) {
        self.view.offset_x += delta.x;
        self.view.offset_y += delta.y;
    }

    /// Moves the view so that `image` lands on the sub-pixel canvas position `target`.
    fn pin(&mut self, image: Point2, target: Point2) {
        let landed = self.mapping().pos_to_canvas_exact(image);
        let delta = self.offset_delta(target - landed);
        self.add_offset(delta);
    }

    pub fn mouse_image_pos(&self) -> Option<Point2> {
        self.mouse_image_pos
    }

    pub fn set_mouse_image_pos(&mut self, pos: Point2) {
        self.mouse_image_pos = Some(pos);
    }

    /// Records the mouse position from a canvas position.
    pub fn set_mouse_canvas_pos(&mut self, pos: Pixel) {
        self.mouse_image_pos = Some(self.canvas_to_image(pos));
    }

    pub fn clear_mouse_pos(&mut self) {
        self.mouse_image_pos = None;
    }

    /// Size in canvas pixels of the whole image with the current scale and rotation.
    pub fn image_canvas_size(&self) -> Dimension {
        self.projection.image_canvas_size(
            self.image_size,
            self.canvas_size,
            self.view.scale(),
            self.view.rotation,
        )
    }

    pub fn canvas_visible_rect(&self) -> PixelRect {
        PixelRect::from_size(self.canvas_size)
    }

    /// Part of the image currently on screen, in image coordinates.
    pub fn image_visible_rect(&self) -> Rect2 {
        self.canvas_to_image_rect(self.canvas_visible_rect())
    }

    /// Pans so that the image position `pos` sits in the middle of the canvas.
    pub fn center_on_image(&mut self, pos: Point2) {
        // Rounded like a canvas pixel, but kept in f64 so far-off points
        // don't overflow.
        let current = self.mapping().pos_to_canvas_exact(pos);
        let current = Point2::new(current.x.round(), current.y.round());
        let center = self.canvas_size.center();
        let to_center = Point2::new(center.x as f64, center.y as f64) - current;
        let delta = self.offset_delta(to_center);
        self.add_offset(delta);
        debug!("Centered on image position ({:.2}, {:.2})", pos.x, pos.y);
    }

    pub fn center_image(&mut self) {
        self.center_on_image((self.image_size * 0.5).to_pos2());
    }

    /// Scale on each axis for which the image fills the canvas, if the image
    /// has an area at all.
    pub fn fit_image_to_canvas_scale(&self) -> Option<Vec2> {
        self.projection
            .fit_scale(self.image_size, self.canvas_size, self.view.rotation)
    }

    /// Uniform scale so that the whole image is visible.
    pub fn fit_image_to_canvas(&mut self) {
        if let Some(fit) = self.fit_image_to_canvas_scale() {
            let scale = fit.x.min(fit.y);
            debug!("Fitting image to canvas at scale {scale:.4}");
            self.set_scale(Vec2::new(scale, scale));
        }
    }

    /// Size the hosting window should take so the canvas shows the whole
    /// image at the current scale, bounded by the desktop.
    ///
    /// `viewer` is the current window size, which includes whatever chrome
    /// surrounds the canvas.
    pub fn fit_canvas_to_image(&self, viewer: Dimension, desktop: Dimension) -> Option<Dimension> {
        let size = self.image_canvas_size();
        if size.is_empty() {
            return None;
        }

        let wanted = self.canvas_to_viewer(size, viewer);
        let result = Dimension::new(
            wanted.width.min(desktop.width),
            wanted.height.min(desktop.height),
        );
        debug!(
            "Viewer should be resized to {}x{}",
            result.width, result.height
        );
        Some(result)
    }

    /// Window size needed for a canvas of size `dim`.
    pub fn canvas_to_viewer(&self, dim: Dimension, viewer: Dimension) -> Dimension {
        Dimension::new(
            dim.width
                .saturating_sub(self.canvas_size.width)
                .saturating_add(viewer.width),
            dim.height
                .saturating_sub(self.canvas_size.height)
                .saturating_add(viewer.height),
        )
    }

    /// Canvas size left by a window of size `dim`.
    pub fn viewer_to_canvas(&self, dim: Dimension, viewer: Dimension) -> Dimension {
        Dimension::new(
            dim.width
                .saturating_sub(viewer.width)
                .saturating_add(self.canvas_size.width),
            dim.height
                .saturating_sub(viewer.height)
                .saturating_add(self.canvas_size.height),
        )
    }

    /// Pans by a canvas delta, e.g. a mouse drag. Sub-pixel deltas are kept.
    pub fn translate(&mut self, vec: Vec2) {
        if !valid_offset(vec) {
            warn!("Ignoring invalid pan {:?}", vec);
            return;
        }
        let delta = self.offset_delta(vec);
        self.add_offset(delta);
    }

    /// Multiplies the scale by `factor`, keeping the image position under
    /// `origin` in place.
    pub fn zoom(&mut self, factor: f64, origin: Pixel) {
        let scale = self.view.scale() * factor;
        self.set_scale_at(scale, origin);
    }

    pub fn reset_zoom(&mut self, origin: Pixel) {
        self.set_scale_at(Vec2::new(1.0, 1.0), origin);
    }

    fn set_scale_at(&mut self, scale: Vec2, origin: Pixel) {
        if !valid_scale(scale) {
            warn!("Ignoring zoom to scale {:?}", scale);
            return;
        }
        let anchor = self.canvas_to_image(origin);
        self.set_scale(scale);
        self.pin(anchor, Point2::new(origin.x as f64, origin.y as f64));
    }

    /// Turns the view by `delta` radians around the canvas center.
    pub fn rotate(&mut self, delta: f64) {
        let center = self.canvas_size.center();
        let anchor = self.canvas_to_image(center);
        self.set_rotation(self.view.rotation + delta);
        self.pin(anchor, Point2::new(center.x as f64, center.y as f64));
    }
}
