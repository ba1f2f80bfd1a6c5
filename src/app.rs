use eframe::egui;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::controller::{MeasurementController, MeasurementState, ReferenceLength};
use crate::error::Error;
use crate::geometry::{LineSegment, Point};
use crate::image_loader::PixelGrid;
use crate::surface::{PainterSurface, Surface, Viewport};

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 50, 50);

// ── Session report ──────────────────────────────────────────────────────────

/// What the window leaves behind on stdout once it closes.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionReport {
    pub result: String,
    pub reference: (Point, Point),
    pub target: (Point, Point),
}

impl SessionReport {
    pub fn capture(controller: &MeasurementController) -> Self {
        Self {
            result: controller.result_text(),
            reference: controller.reference_line().endpoints(),
            target: controller.target_line().endpoints(),
        }
    }
}

fn write_endpoints(f: &mut fmt::Formatter<'_>, label: &str, (a, b): (Point, Point)) -> fmt::Result {
    writeln!(
        f,
        "{label}: ({:.2}, {:.2}) - ({:.2}, {:.2})",
        a.x, a.y, b.x, b.y
    )
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "target length: {}", self.result)?;
        write_endpoints(f, "reference line", self.reference)?;
        write_endpoints(f, "target line", self.target)
    }
}

// ── App ─────────────────────────────────────────────────────────────────────

pub struct MeasureApp {
    image: PixelGrid,
    texture: Option<egui::TextureHandle>,
    controller: MeasurementController,
    initial_lines: (LineSegment, LineSegment),

    // reference length text box
    reference_input: String,
    reference_input_error: Option<Error>,

    // pan & zoom
    viewport: Viewport,
    fitted: bool,
    panning: bool,

    seen_revision: u64,
    report: Rc<RefCell<SessionReport>>,
}

impl MeasureApp {
    /// `report` is refreshed whenever the controller recomputes.
    pub fn new(
        image: PixelGrid,
        controller: MeasurementController,
        initial_lines: (LineSegment, LineSegment),
        report: Rc<RefCell<SessionReport>>,
    ) -> Self {
        Self {
            viewport: Viewport::new(image.size()),
            image,
            texture: None,
            reference_input: controller.reference_length().to_string(),
            reference_input_error: None,
            seen_revision: controller.revision(),
            controller,
            initial_lines,
            fitted: false,
            panning: false,
            report,
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        let color_image =
            egui::ColorImage::from_rgba_unmultiplied(self.image.size(), self.image.rgba());
        self.texture = Some(ctx.load_texture("photo", color_image, egui::TextureOptions::LINEAR));
    }

    fn apply_reference_input(&mut self) {
        match self.reference_input.parse::<ReferenceLength>() {
            Ok(len) => {
                self.reference_input_error = None;
                if len != self.controller.reference_length() {
                    log::info!("reference length set to {len}");
                    self.controller.set_reference_length(len);
                }
            }
            Err(e) => self.reference_input_error = Some(e),
        }
    }

    fn reset_lines(&mut self) {
        let (reference, target) = self.initial_lines;
        self.controller.reset_lines(reference, target);
    }

    fn sync_report(&mut self) {
        let revision = self.controller.revision();
        if revision == self.seen_revision {
            return;
        }
        self.seen_revision = revision;
        *self.report.borrow_mut() = SessionReport::capture(&self.controller);
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let ref_color = self.controller.reference_line().style().color.to_egui();
            ui.colored_label(ref_color, "Reference length:");
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.reference_input).desired_width(80.0),
            );
            if edit.changed() {
                self.apply_reference_input();
            }
            if let Some(units) = self.controller.units() {
                ui.label(units);
            }
            if let Some(err) = &self.reference_input_error {
                ui.colored_label(ERROR_COLOR, err.to_string());
            }

            ui.separator();
            let target_color = self.controller.target_line().style().color.to_egui();
            ui.colored_label(target_color, "Target length:");
            let result_color = match self.controller.state() {
                MeasurementState::Error(_) => ERROR_COLOR,
                MeasurementState::Idle(_) => target_color,
            };
            ui.colored_label(result_color, egui::RichText::new(self.controller.result_text()).strong());

            ui.separator();
            if ui.button("Fit").clicked() {
                self.fitted = false;
            }
            if ui.button("Reset lines").clicked() {
                self.reset_lines();
            }
            ui.separator();
            ui.label(format!("Zoom: {:.0}%", self.viewport.zoom * 100.0));
        });
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for MeasureApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_texture(ctx);

        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::F)) {
            self.fitted = false;
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let canvas_rect = response.rect;

            if !self.fitted {
                self.viewport.fit(canvas_rect);
                self.fitted = true;
            }

            // Pan (middle mouse button)
            if ctx.input(|i| i.pointer.middle_down()) {
                self.viewport.pan += ctx.input(|i| i.pointer.delta());
                self.panning = true;
            } else {
                self.panning = false;
            }

            // Zoom (scroll wheel), not while a handle is held
            let scroll_delta = ctx.input(|i| i.smooth_scroll_delta.y);
            if scroll_delta != 0.0 && response.hovered() && !self.controller.is_dragging() {
                if let Some(cursor) = response.hover_pos() {
                    self.viewport.zoom_at(canvas_rect, cursor, scroll_delta);
                }
            }

            painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));

            let mut surface =
                PainterSurface::new(&painter, canvas_rect, self.viewport, self.texture.as_ref());
            surface.capture_pointer(ctx, &response, self.panning);
            self.controller.process_input(&mut surface);

            surface.draw_image(&self.image);
            self.controller.draw(&mut surface);
        });

        self.sync_report();
    }
}
