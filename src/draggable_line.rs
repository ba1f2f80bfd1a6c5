use crate::geometry::{LineSegment, Point};
use crate::surface::{LineStyle, PointerEvent, PointerKind, Surface};

pub const DEFAULT_GRAB_RANGE: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Handle {
    Start,
    Middle,
    End,
}

type Observer = Box<dyn FnMut(Point, Point)>;

/// A line segment with three draggable handles: both endpoints and the
/// midpoint. Dragging an endpoint moves it alone; dragging the midpoint
/// translates the whole line.
pub struct DraggableLine {
    segment: LineSegment,
    style: LineStyle,
    grab_range: f32,
    active: Option<Handle>,
    observers: Vec<Observer>,
}

impl DraggableLine {
    pub fn new(start: Point, end: Point, style: LineStyle) -> Self {
        Self {
            segment: LineSegment::new(start, end),
            style,
            grab_range: DEFAULT_GRAB_RANGE,
            active: None,
            observers: Vec::new(),
        }
    }

    pub fn endpoints(&self) -> (Point, Point) {
        (self.segment.start, self.segment.end)
    }

    pub fn segment(&self) -> LineSegment {
        self.segment
    }

    pub fn pixel_length(&self) -> f64 {
        self.segment.length()
    }

    pub fn style(&self) -> &LineStyle {
        &self.style
    }

    pub fn grab_range(&self) -> f32 {
        self.grab_range
    }

    pub fn set_grab_range(&mut self, px: f32) {
        if !px.is_finite() || px <= 0.0 {
            log::warn!("ignoring grab range {px}: must be a positive number of pixels");
            return;
        }
        self.grab_range = px;
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn release(&mut self) {
        self.active = None;
    }

    /// Registers `callback` to run with the new endpoints after every change.
    pub fn set_on_change(&mut self, callback: impl FnMut(Point, Point) + 'static) {
        self.observers.push(Box::new(callback));
    }

    pub fn set_endpoints(&mut self, start: Point, end: Point) {
        self.segment = LineSegment::new(start, end);
        self.active = None;
        self.notify();
    }

    /// Feeds one pointer event to the widget. `zoom` is screen pixels per
    /// image pixel; the grab range is measured on screen. Returns true when
    /// the segment moved.
    pub fn handle_pointer(&mut self, event: &PointerEvent, zoom: f32) -> bool {
        match event.kind {
            PointerKind::Down => {
                self.active = self.closest_handle(event.pos, zoom);
                false
            }
            PointerKind::Move => {
                let Some(handle) = self.active else {
                    return false;
                };
                let before = self.segment;
                match handle {
                    Handle::Start => self.segment.start = event.pos,
                    Handle::End => self.segment.end = event.pos,
                    Handle::Middle => {
                        let mid = self.segment.midpoint();
                        self.segment.translate(event.pos.x - mid.x, event.pos.y - mid.y);
                    }
                }
                if self.segment == before {
                    return false;
                }
                self.notify();
                true
            }
            PointerKind::Up => {
                self.release();
                false
            }
        }
    }

    fn closest_handle(&self, pos: Point, zoom: f32) -> Option<Handle> {
        let candidates = [
            (Handle::Start, self.segment.start),
            (Handle::Middle, self.segment.midpoint()),
            (Handle::End, self.segment.end),
        ];
        let (handle, dist) = candidates
            .iter()
            .map(|(h, p)| (*h, p.distance(pos) * zoom as f64))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        (dist < self.grab_range as f64).then_some(handle)
    }

    fn notify(&mut self) {
        let (start, end) = (self.segment.start, self.segment.end);
        for observer in &mut self.observers {
            observer(start, end);
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        let seg = self.segment;
        surface.draw_line(seg.start, seg.end, &self.style);
        for p in [seg.start, seg.midpoint(), seg.end] {
            surface.draw_marker(p, &self.style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BLACK;
    use crate::surface::testing::{DrawCall, RecordingSurface};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn style() -> LineStyle {
        LineStyle {
            color: BLACK,
            thickness: 2.0,
            marker_radius: 5.0,
        }
    }

    fn line(x0: f32, y0: f32, x1: f32, y1: f32) -> DraggableLine {
        DraggableLine::new(Point::new(x0, y0), Point::new(x1, y1), style())
    }

    fn recorder(line: &mut DraggableLine) -> Rc<RefCell<Vec<(Point, Point)>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        line.set_on_change(move |a, b| sink.borrow_mut().push((a, b)));
        seen
    }

    #[test]
    fn dragging_an_endpoint_moves_only_that_endpoint() {
        let mut l = line(0.0, 50.0, 0.0, 250.0);
        let seen = recorder(&mut l);

        assert!(!l.handle_pointer(&PointerEvent::down(1.0, 249.0), 1.0));
        assert!(l.is_dragging());
        assert!(l.handle_pointer(&PointerEvent::moved(0.0, 300.0), 1.0));
        assert!(!l.handle_pointer(&PointerEvent::up(0.0, 300.0), 1.0));

        assert_eq!(l.endpoints(), (Point::new(0.0, 50.0), Point::new(0.0, 300.0)));
        assert_eq!(l.pixel_length(), 250.0);
        assert!(!l.is_dragging());
        assert_eq!(*seen.borrow(), vec![(Point::new(0.0, 50.0), Point::new(0.0, 300.0))]);
    }

    #[test]
    fn dragging_the_midpoint_translates_the_line() {
        let mut l = line(0.0, 0.0, 100.0, 0.0);
        l.handle_pointer(&PointerEvent::down(50.0, 2.0), 1.0);
        l.handle_pointer(&PointerEvent::moved(60.0, 20.0), 1.0);
        assert_eq!(l.endpoints(), (Point::new(10.0, 20.0), Point::new(110.0, 20.0)));
        assert_eq!(l.pixel_length(), 100.0);
    }

    #[test]
    fn press_outside_grab_range_is_ignored() {
        let mut l = line(0.0, 0.0, 100.0, 0.0);
        let seen = recorder(&mut l);

        l.handle_pointer(&PointerEvent::down(0.0, 10.0), 1.0);
        assert!(!l.is_dragging());
        assert!(!l.handle_pointer(&PointerEvent::moved(0.0, 40.0), 1.0));
        assert_eq!(l.endpoints(), (Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn grab_range_is_measured_on_screen() {
        let mut l = line(0.0, 0.0, 100.0, 0.0);
        // 6 image px at 2x zoom is 12 screen px: out of range.
        l.handle_pointer(&PointerEvent::down(0.0, 6.0), 2.0);
        assert!(!l.is_dragging());
        // Same press at half zoom is 3 screen px.
        l.handle_pointer(&PointerEvent::down(0.0, 6.0), 0.5);
        assert!(l.is_dragging());
    }

    #[test]
    fn nearest_handle_wins() {
        let mut l = line(0.0, 0.0, 10.0, 0.0);
        l.set_grab_range(20.0);
        l.handle_pointer(&PointerEvent::down(9.0, 0.0), 1.0);
        l.handle_pointer(&PointerEvent::moved(30.0, 0.0), 1.0);
        assert_eq!(l.endpoints(), (Point::new(0.0, 0.0), Point::new(30.0, 0.0)));
    }

    #[test]
    fn handles_may_leave_the_image() {
        let mut l = line(0.0, 0.0, 100.0, 0.0);
        l.handle_pointer(&PointerEvent::down(0.0, 0.0), 1.0);
        l.handle_pointer(&PointerEvent::moved(-500.0, -20.0), 1.0);
        assert_eq!(l.endpoints().0, Point::new(-500.0, -20.0));
    }

    #[test]
    fn move_without_displacement_does_not_notify() {
        let mut l = line(0.0, 0.0, 100.0, 0.0);
        let seen = recorder(&mut l);
        l.handle_pointer(&PointerEvent::down(100.0, 0.0), 1.0);
        assert!(!l.handle_pointer(&PointerEvent::moved(100.0, 0.0), 1.0));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn observers_fire_in_registration_order() {
        let mut l = line(0.0, 0.0, 100.0, 0.0);
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let order = Rc::clone(&order);
            l.set_on_change(move |_, _| order.borrow_mut().push(tag));
        }
        l.set_endpoints(Point::new(1.0, 1.0), Point::new(2.0, 2.0));
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn invalid_grab_range_is_ignored() {
        let mut l = line(0.0, 0.0, 100.0, 0.0);
        l.set_grab_range(-1.0);
        l.set_grab_range(f32::NAN);
        assert_eq!(l.grab_range(), DEFAULT_GRAB_RANGE);
        l.set_grab_range(4.0);
        assert_eq!(l.grab_range(), 4.0);
    }

    #[test]
    fn draws_line_and_three_markers() {
        let l = line(0.0, 0.0, 100.0, 0.0);
        let mut surface = RecordingSurface::new();
        l.draw(&mut surface);
        assert_eq!(
            surface.calls,
            vec![
                DrawCall::Line(Point::new(0.0, 0.0), Point::new(100.0, 0.0)),
                DrawCall::Marker(Point::new(0.0, 0.0)),
                DrawCall::Marker(Point::new(50.0, 0.0)),
                DrawCall::Marker(Point::new(100.0, 0.0)),
            ]
        );
    }
}
