//! Drawing and pointer-input capability the line widgets are written against,
//! plus its egui implementation.
//!
//! Widgets only ever see image-space coordinates. The [`Viewport`] owns the
//! mapping between image pixels and screen pixels (pan and zoom), and the
//! [`PainterSurface`] applies it when drawing and when turning egui drag
//! responses into [`PointerEvent`]s.

use eframe::egui;

use crate::config::Color4;
use crate::geometry::Point;
use crate::image_loader::PixelGrid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// A primary-button pointer event in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub pos: Point,
}

#[cfg(test)]
impl PointerEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Down,
            pos: Point::new(x, y),
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Move,
            pos: Point::new(x, y),
        }
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Up,
            pos: Point::new(x, y),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub color: Color4,
    /// Stroke width in screen pixels.
    pub thickness: f32,
    /// Handle radius in screen pixels.
    pub marker_radius: f32,
}

pub trait Surface {
    fn draw_image(&mut self, image: &PixelGrid);
    fn draw_line(&mut self, start: Point, end: Point, style: &LineStyle);
    fn draw_marker(&mut self, at: Point, style: &LineStyle);
    fn draw_label(&mut self, at: Point, text: &str, color: Color4);
    /// Drains the pointer events gathered since the last call.
    fn pointer_events(&mut self) -> Vec<PointerEvent>;
    /// Screen pixels per image pixel.
    fn zoom(&self) -> f32;
}

// ── Viewport ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub pan: egui::Vec2,
    pub zoom: f32,
    pub image_size: egui::Vec2,
}

impl Viewport {
    pub const MIN_ZOOM: f32 = 0.05;
    pub const MAX_ZOOM: f32 = 20.0;

    pub fn new(image_size: [usize; 2]) -> Self {
        Self {
            pan: egui::Vec2::ZERO,
            zoom: 1.0,
            image_size: egui::vec2(image_size[0] as f32, image_size[1] as f32),
        }
    }

    pub fn image_to_screen(&self, canvas_rect: egui::Rect, p: Point) -> egui::Pos2 {
        canvas_rect.center() + self.pan + (egui::vec2(p.x, p.y) - self.image_size * 0.5) * self.zoom
    }

    pub fn screen_to_image(&self, canvas_rect: egui::Rect, screen_pos: egui::Pos2) -> Point {
        let rel = screen_pos - canvas_rect.center() - self.pan;
        Point::new(
            rel.x / self.zoom + self.image_size.x * 0.5,
            rel.y / self.zoom + self.image_size.y * 0.5,
        )
    }

    /// Centre the image and scale it to fit inside the canvas.
    pub fn fit(&mut self, canvas_rect: egui::Rect) {
        if self.image_size.x <= 0.0 || self.image_size.y <= 0.0 {
            return;
        }
        let sx = canvas_rect.width() / self.image_size.x;
        let sy = canvas_rect.height() / self.image_size.y;
        self.zoom = sx.min(sy).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        self.pan = egui::Vec2::ZERO;
    }

    /// Zoom by a scroll amount, keeping the image point under `cursor` fixed.
    pub fn zoom_at(&mut self, canvas_rect: egui::Rect, cursor: egui::Pos2, scroll: f32) {
        let factor = 1.0 + scroll * 0.002;
        let new_zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        let cursor_rel = cursor - canvas_rect.center() - self.pan;
        self.pan -= cursor_rel * (new_zoom / self.zoom - 1.0);
        self.zoom = new_zoom;
    }
}

// ── egui implementation ─────────────────────────────────────────────────────

pub struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    canvas_rect: egui::Rect,
    viewport: Viewport,
    texture: Option<&'a egui::TextureHandle>,
    events: Vec<PointerEvent>,
}

impl<'a> PainterSurface<'a> {
    pub fn new(
        painter: &'a egui::Painter,
        canvas_rect: egui::Rect,
        viewport: Viewport,
        texture: Option<&'a egui::TextureHandle>,
    ) -> Self {
        Self {
            painter,
            canvas_rect,
            viewport,
            texture,
            events: Vec::new(),
        }
    }

    fn to_image(&self, screen_pos: egui::Pos2) -> Point {
        self.viewport.screen_to_image(self.canvas_rect, screen_pos)
    }

    fn push(&mut self, kind: PointerKind, screen_pos: egui::Pos2) {
        let pos = self.to_image(screen_pos);
        self.events.push(PointerEvent { kind, pos });
    }

    /// Translate this frame's primary-button drag on the canvas into events.
    ///
    /// While `panning`, presses and moves are dropped but a release is still
    /// reported, so a handle grabbed before the pan is never left held.
    pub fn capture_pointer(&mut self, ctx: &egui::Context, response: &egui::Response, panning: bool) {
        let primary = egui::PointerButton::Primary;

        if !panning && response.drag_started_by(primary) {
            // egui reports the drag start after the pointer has already
            // travelled a few pixels; the press origin is where the grab was.
            if let Some(origin) = ctx
                .input(|i| i.pointer.press_origin())
                .or(response.interact_pointer_pos())
            {
                self.push(PointerKind::Down, origin);
            }
        }

        if !panning && response.dragged_by(primary) && response.drag_delta() != egui::Vec2::ZERO {
            if let Some(pos) = response.interact_pointer_pos() {
                self.push(PointerKind::Move, pos);
            }
        }

        if response.drag_stopped_by(primary) {
            let pos = response
                .interact_pointer_pos()
                .or(ctx.input(|i| i.pointer.latest_pos()))
                .unwrap_or(self.canvas_rect.center());
            self.push(PointerKind::Up, pos);
        }
    }
}

impl Surface for PainterSurface<'_> {
    fn draw_image(&mut self, image: &PixelGrid) {
        let Some(tex) = self.texture else {
            return;
        };
        let rect = egui::Rect::from_min_max(
            self.viewport.image_to_screen(self.canvas_rect, Point::new(0.0, 0.0)),
            self.viewport.image_to_screen(
                self.canvas_rect,
                Point::new(image.width() as f32, image.height() as f32),
            ),
        );
        self.painter.image(
            tex.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    fn draw_line(&mut self, start: Point, end: Point, style: &LineStyle) {
        let s = self.viewport.image_to_screen(self.canvas_rect, start);
        let e = self.viewport.image_to_screen(self.canvas_rect, end);
        self.painter
            .line_segment([s, e], egui::Stroke::new(style.thickness, style.color.to_egui()));
    }

    fn draw_marker(&mut self, at: Point, style: &LineStyle) {
        let c = self.viewport.image_to_screen(self.canvas_rect, at);
        self.painter.circle(
            c,
            style.marker_radius,
            style.color.to_egui(),
            egui::Stroke::new(1.0, egui::Color32::WHITE),
        );
    }

    fn draw_label(&mut self, at: Point, text: &str, color: Color4) {
        let anchor = self.viewport.image_to_screen(self.canvas_rect, at) + egui::vec2(10.0, -10.0);
        let c = color.to_egui();
        let galley = self
            .painter
            .layout_no_wrap(text.to_owned(), egui::FontId::proportional(16.0), c);
        let pos = anchor - egui::vec2(0.0, galley.size().y);
        let bg = egui::Rect::from_min_size(pos, galley.size()).expand(3.0);
        self.painter
            .rect_filled(bg, 3.0, egui::Color32::from_white_alpha(200));
        self.painter.galley(pos, galley, c);
    }

    fn pointer_events(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.events)
    }

    fn zoom(&self) -> f32 {
        self.viewport.zoom
    }
}
