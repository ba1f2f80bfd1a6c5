use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::draggable_line::DraggableLine;
use crate::error::Error;
use crate::geometry::LineSegment;
use crate::surface::{PointerEvent, PointerKind, Surface};

/// Known real-world length spanned by the reference line. Always positive
/// and finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceLength(f64);

impl ReferenceLength {
    pub fn new(value: f64) -> Result<Self, Error> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidReferenceLength(value.to_string()))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl FromStr for ReferenceLength {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(|v| Self::new(v).ok())
            .ok_or_else(|| Error::InvalidReferenceLength(trimmed.to_owned()))
    }
}

impl fmt::Display for ReferenceLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub units: Option<String>,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.units {
            Some(units) => write!(f, "{:.2} {units}", self.value),
            None => write!(f, "{:.2}", self.value),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MeasurementState {
    Idle(Measurement),
    Error(Error),
}

impl From<Result<Measurement, Error>> for MeasurementState {
    fn from(res: Result<Measurement, Error>) -> Self {
        match res {
            Ok(m) => Self::Idle(m),
            Err(e) => Self::Error(e),
        }
    }
}

/// `reference_length * target_px / ref_px`.
pub fn scale_length(
    reference_length: ReferenceLength,
    ref_px: f64,
    target_px: f64,
) -> Result<f64, Error> {
    if ref_px == 0.0 {
        return Err(Error::DegenerateReference);
    }
    Ok(reference_length.get() * (target_px / ref_px))
}

fn measure(
    reference_line: &DraggableLine,
    target_line: &DraggableLine,
    reference_length: ReferenceLength,
    units: &Option<String>,
) -> Result<Measurement, Error> {
    let value = scale_length(
        reference_length,
        reference_line.pixel_length(),
        target_line.pixel_length(),
    )?;
    Ok(Measurement {
        value,
        units: units.clone(),
    })
}

pub struct MeasurementController {
    reference_line: DraggableLine,
    target_line: DraggableLine,
    reference_length: ReferenceLength,
    units: Option<String>,
    state: MeasurementState,
    /// Set by the line observers, consumed after each dispatched event.
    changed: Rc<Cell<bool>>,
    revision: u64,
}

impl MeasurementController {
    pub fn new(
        mut reference_line: DraggableLine,
        mut target_line: DraggableLine,
        reference_length: ReferenceLength,
        units: Option<String>,
    ) -> Self {
        let changed = Rc::new(Cell::new(false));
        for line in [&mut reference_line, &mut target_line] {
            let flag = Rc::clone(&changed);
            line.set_on_change(move |_, _| flag.set(true));
        }

        let units = units.filter(|u| !u.trim().is_empty());
        // The initial evaluation is not a revision; the first change is 1.
        let state = measure(&reference_line, &target_line, reference_length, &units).into();
        Self {
            reference_line,
            target_line,
            reference_length,
            units,
            state,
            changed,
            revision: 0,
        }
    }

    pub fn reference_line(&self) -> &DraggableLine {
        &self.reference_line
    }

    pub fn target_line(&self) -> &DraggableLine {
        &self.target_line
    }

    pub fn reference_length(&self) -> ReferenceLength {
        self.reference_length
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn state(&self) -> &MeasurementState {
        &self.state
    }

    /// Number of recomputes since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dragging(&self) -> bool {
        self.reference_line.is_dragging() || self.target_line.is_dragging()
    }

    pub fn set_reference_length(&mut self, reference_length: ReferenceLength) {
        self.reference_length = reference_length;
        let _ = self.recompute();
    }

    pub fn reset_lines(&mut self, reference: LineSegment, target: LineSegment) {
        self.reference_line.set_endpoints(reference.start, reference.end);
        self.target_line.set_endpoints(target.start, target.end);
        self.changed.set(false);
        let _ = self.recompute();
    }

    /// Routes one pointer event to the lines. A press is offered to the
    /// target line first so that at most one line picks it up.
    pub fn dispatch(&mut self, event: &PointerEvent, zoom: f32) {
        match event.kind {
            PointerKind::Down => {
                self.target_line.handle_pointer(event, zoom);
                if self.target_line.is_dragging() {
                    self.reference_line.release();
                } else {
                    self.reference_line.handle_pointer(event, zoom);
                }
            }
            PointerKind::Move | PointerKind::Up => {
                self.target_line.handle_pointer(event, zoom);
                self.reference_line.handle_pointer(event, zoom);
            }
        }
        if self.changed.replace(false) {
            let _ = self.recompute();
        }
    }

    /// Drains the surface's pointer events and dispatches each of them.
    pub fn process_input(&mut self, surface: &mut dyn Surface) {
        let zoom = surface.zoom();
        for event in surface.pointer_events() {
            self.dispatch(&event, zoom);
        }
    }

    pub fn recompute(&mut self) -> Result<Measurement, Error> {
        self.revision += 1;
        let was_error = matches!(self.state, MeasurementState::Error(_));
        let res = measure(
            &self.reference_line,
            &self.target_line,
            self.reference_length,
            &self.units,
        );
        self.state = res.clone().into();
        match (&res, was_error) {
            (Err(e), false) => log::warn!("{e}; measurement suspended"),
            (Ok(m), true) => log::info!("reference restored, target = {m}"),
            (Ok(m), false) => log::debug!("revision {}: target = {m}", self.revision),
            (Err(_), true) => {}
        }
        res
    }

    pub fn result_text(&self) -> String {
        match &self.state {
            MeasurementState::Idle(m) => m.to_string(),
            MeasurementState::Error(e) => e.to_string(),
        }
    }

    pub fn reference_text(&self) -> String {
        match &self.units {
            Some(units) => format!("{} {units}", self.reference_length),
            None => self.reference_length.to_string(),
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        self.reference_line.draw(surface);
        self.target_line.draw(surface);

        let ref_style = self.reference_line.style();
        surface.draw_label(
            self.reference_line.segment().end,
            &format!("ref: {}", self.reference_text()),
            ref_style.color,
        );
        let target_style = self.target_line.style();
        surface.draw_label(
            self.target_line.segment().end,
            &self.result_text(),
            target_style.color,
        );
    }
}
