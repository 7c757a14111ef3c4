use egui::{
    epaint::Vertex, Color32, ColorImage, CursorIcon, Frame, Grid, Mesh, Painter, Pos2, Rect,
    Sense, Stroke, TextEdit, TextureHandle, TextureOptions,
};
use log::{debug, warn};

use crate::{
    canvas::Canvas2D,
    export,
    geom::{Dimension, Pixel, Rect2, Vec2},
    transform::{CenterRotation, NoRotation, PivotRotation, Projection, View},
};

const IMAGE_SIZE: [usize; 2] = [512, 384];
const ZOOM_STEP: f64 = 1.25;

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct AppStore {
    view: View,
    projection: ProjectionChoice,
    pivot: (i32, i32),
}

impl Default for AppStore {
    fn default() -> Self {
        AppStore {
            view: View::default(),
            projection: ProjectionChoice::Center,
            pivot: (0, 0),
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProjectionChoice {
    Center,
    Pivot,
    Flat,
}

impl ProjectionChoice {
    fn label(&self) -> &'static str {
        match self {
            ProjectionChoice::Center => "Canvas center",
            ProjectionChoice::Pivot => "Pivot (right-click)",
            ProjectionChoice::Flat => "No rotation",
        }
    }

    fn projection(&self, pivot: (i32, i32)) -> Box<dyn Projection> {
        match self {
            ProjectionChoice::Center => Box::new(CenterRotation),
            ProjectionChoice::Pivot => Box::new(PivotRotation::new(Pixel::new(pivot.0, pivot.1))),
            ProjectionChoice::Flat => Box::new(NoRotation),
        }
    }
}

/// Checkerboard over a color gradient, so that orientation is visible.
fn test_image(size: [usize; 2]) -> ColorImage {
    let [width, height] = size;
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let r = (255 * x / width) as u8;
            let g = (255 * y / height) as u8;
            let dark = ((x / 32) + (y / 32)) % 2 == 0;
            let b = if dark { 64 } else { 192 };
            pixels.push(Color32::from_rgb(r, g, b));
        }
    }
    ColorImage { size, pixels }
}

pub struct App {
    store: AppStore,
    canvas: Canvas2D,
    texture: TextureHandle,
    import_text: String,
    err: String,
    err_open: bool,
}

impl App {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        // Load previous app state (if any).
        // Note that you must enable the `persistence` feature for this to work.
        let store: AppStore = if let Some(storage) = cc.storage {
            eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default()
        } else {
            AppStore::default()
        };

        let texture = cc.egui_ctx.load_texture(
            "test-image",
            test_image(IMAGE_SIZE),
            TextureOptions::NEAREST,
        );

        let mut canvas = Canvas2D::new(
            Dimension::default(),
            Vec2::new(IMAGE_SIZE[0] as f64, IMAGE_SIZE[1] as f64),
        );
        canvas.set_view(store.view.clone());
        canvas.set_projection(store.projection.projection(store.pivot));

        App {
            store,
            canvas,
            texture,
            import_text: String::new(),
            err: String::new(),
            err_open: false,
        }
    }

    fn set_projection(&mut self, choice: ProjectionChoice) {
        debug!("Switching projection to {:?}", choice);
        self.store.projection = choice;
        self.canvas.set_projection(choice.projection(self.store.pivot));
    }

    fn draw_image(&self, painter: &Painter, rect: Rect) {
        let mapping = self.canvas.mapping();
        let corners = Rect2::from_size(self.canvas.image_size())
            .corners()
            .map(|p| {
                let c = mapping.pos_to_canvas_exact(p);
                rect.min + egui::vec2(c.x as f32, c.y as f32)
            });
        let uvs = [
            Pos2::new(0.0, 0.0),
            Pos2::new(1.0, 0.0),
            Pos2::new(1.0, 1.0),
            Pos2::new(0.0, 1.0),
        ];

        let mut mesh = Mesh::with_texture(self.texture.id());
        for (pos, uv) in corners.into_iter().zip(uvs) {
            mesh.vertices.push(Vertex {
                pos,
                uv,
                color: Color32::WHITE,
            });
        }
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(0, 2, 3);
        painter.add(mesh);

        if self.store.projection == ProjectionChoice::Pivot {
            let (x, y) = self.store.pivot;
            painter.circle_stroke(
                rect.min + egui::vec2(x as f32, y as f32),
                5.0,
                Stroke::new(1.5, Color32::RED),
            );
        }
    }

    fn fit_window_to_image(&self, ctx: &egui::Context) {
        let (inner, monitor) = ctx.input(|i| (i.viewport().inner_rect, i.viewport().monitor_size));
        let (Some(inner), Some(monitor)) = (inner, monitor) else {
            warn!("Window or monitor size unknown, can't fit window to image");
            return;
        };

        let viewer = Dimension::from(inner.size());
        let desktop = Dimension::from(monitor);
        if let Some(size) = self.canvas.fit_canvas_to_image(viewer, desktop) {
            ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(size.into()));
        }
    }

    fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        let (mut response, painter) =
            ui.allocate_painter(ui.available_size_before_wrap(), Sense::click_and_drag());
        let rect = response.rect;
        self.canvas.set_canvas_size(rect.size().into());

        let to_canvas = |pos: Pos2| Pixel::from(pos - rect.min.to_vec2());

        if let Some(hover_pos) = response.hover_pos() {
            let origin = to_canvas(hover_pos);
            self.canvas.set_mouse_canvas_pos(origin);

            // Zoom
            let (zoom_delta, scroll) = ui.input(|i| (i.zoom_delta(), i.smooth_scroll_delta.y));
            if zoom_delta != 1.0 {
                self.canvas.zoom(zoom_delta as f64, origin);
            } else if scroll != 0.0 {
                self.canvas.zoom((scroll as f64 / 200.0).exp(), origin);
            }
        } else {
            self.canvas.clear_mouse_pos();
        }

        // Drag
        if response.dragged_by(egui::PointerButton::Primary) {
            response = response.on_hover_cursor(CursorIcon::Grabbing);
            self.canvas.translate(response.drag_delta().into());
        }

        if response.secondary_clicked() && self.store.projection == ProjectionChoice::Pivot {
            if let Some(pos) = response.interact_pointer_pos() {
                let pivot = to_canvas(pos);
                self.store.pivot = (pivot.x, pivot.y);
                self.set_projection(ProjectionChoice::Pivot);
            }
        }

        self.draw_image(&painter, rect);
    }

    fn controls_ui(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let center = self.canvas.canvas_size().center();

        ui.horizontal(|ui| {
            ui.menu_button("View", |ui| {
                if ui.button("Copy to Clipboard").clicked() {
                    match export::export(self.canvas.view()) {
                        Ok(json) => ui.output_mut(|o| o.copied_text = json),
                        Err(e) => {
                            self.err = format!("Could not export view because:\n{}", e);
                            self.err_open = true;
                        }
                    }
                    ui.close_menu();
                }
                ui.menu_button("Paste", |ui| {
                    ui.add(TextEdit::singleline(&mut self.import_text).hint_text("Paste JSON..."));
                    if ui.button("Go").clicked() {
                        match export::import(&self.import_text) {
                            Ok(view) => {
                                self.canvas.set_view(view);
                                self.import_text = String::new();
                            }
                            Err(e) => {
                                self.err = format!("Could not import view because:\n{}", e);
                                self.err_open = true;
                            }
                        }
                        ui.close_menu();
                    }
                });
            });

            ui.menu_button("Reset", |ui| {
                if ui.button("Zoom").clicked() {
                    self.canvas.reset_zoom(center);
                    ui.close_menu();
                }
                if ui.button("View").clicked() {
                    self.canvas.set_view(View::default());
                    ui.close_menu();
                }
            });
        });

        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Fit image to canvas").clicked() {
                self.canvas.fit_image_to_canvas();
                self.canvas.center_image();
            }
            if ui.button("Center image").clicked() {
                self.canvas.center_image();
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Fit window to image").clicked() {
                self.fit_window_to_image(ctx);
            }
            if ui.button("+").clicked() {
                self.canvas.zoom(ZOOM_STEP, center);
            }
            if ui.button("-").clicked() {
                self.canvas.zoom(1.0 / ZOOM_STEP, center);
            }
        });

        let mut choice = self.store.projection;
        egui::ComboBox::from_label("Rotation about")
            .selected_text(choice.label())
            .show_ui(ui, |ui| {
                for option in [
                    ProjectionChoice::Center,
                    ProjectionChoice::Pivot,
                    ProjectionChoice::Flat,
                ] {
                    ui.selectable_value(&mut choice, option, option.label());
                }
            });
        if choice != self.store.projection {
            self.set_projection(choice);
        }

        let current = self.canvas.view().rotation_normalized().to_degrees();
        let mut degrees = current;
        ui.add(egui::Slider::new(&mut degrees, 0.0..=360.0).suffix("°"));
        if degrees != current {
            self.canvas.rotate((degrees - current).to_radians());
        }

        ui.separator();

        let view = self.canvas.view();
        let visible = self.canvas.image_visible_rect();
        let drawn = self.canvas.image_canvas_size();
        Grid::new("Info").num_columns(2).show(ui, |ui| {
            ui.label("Scale:");
            ui.label(format!("{:.3} x {:.3}", view.scale_x, view.scale_y));
            ui.end_row();

            ui.label("Offset:");
            ui.label(format!("{:.1}, {:.1}", view.offset_x, view.offset_y));
            ui.end_row();

            ui.label("Mouse:");
            match self.canvas.mouse_image_pos() {
                Some(pos) => ui.label(format!("{:.1}, {:.1}", pos.x, pos.y)),
                None => ui.label("-"),
            };
            ui.end_row();

            ui.label("Visible:");
            ui.label(format!(
                "{:.0}, {:.0} ({:.0} x {:.0})",
                visible.x, visible.y, visible.width, visible.height
            ));
            ui.end_row();

            ui.label("Image on screen:");
            ui.label(format!("{} x {}", drawn.width, drawn.height));
            ui.end_row();
        });
    }
}

impl eframe::App for App {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.store.view = self.canvas.view().clone();
        eframe::set_value(storage, eframe::APP_KEY, &self.store);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        #[cfg(feature = "profiling")]
        puffin::profile_function!();

        let frame = Frame::canvas(&ctx.style()).inner_margin(0.0);
        egui::CentralPanel::default()
            .frame(frame)
            .show(ctx, |ui| self.canvas_ui(ui));

        egui::Window::new("canvas2d").show(ctx, |ui| self.controls_ui(ctx, ui));

        egui::Window::new("Error")
            .open(&mut self.err_open)
            .show(ctx, |ui| {
                ui.label(&self.err);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_has_requested_size() {
        let image = test_image([64, 32]);
        assert_eq!(image.size, [64, 32]);
        assert_eq!(image.pixels.len(), 64 * 32);
        // neighbouring tiles differ
        assert_ne!(image.pixels[0].b(), image.pixels[32].b());
    }

    #[test]
    fn store_defaults_for_missing_fields() {
        let store: AppStore = serde_json::from_str(r#"{ "pivot": [3, 4] }"#).unwrap();
        assert_eq!(store.view, View::default());
        assert_eq!(store.projection, ProjectionChoice::Center);
        assert_eq!(store.pivot, (3, 4));
    }
}
