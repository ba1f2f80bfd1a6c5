/// Image-space pixel coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = other.x as f64 - self.x as f64;
        let dy = other.y as f64 - self.y as f64;
        dx.hypot(dy)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Two endpoints. Zero-length segments are allowed.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

impl LineSegment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.start.x += dx;
        self.start.y += dy;
        self.end.x += dx;
        self.end.y += dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_is_euclidean() {
        let seg = LineSegment::new(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert_eq!(seg.length(), 5.0);
    }

    #[test]
    fn zero_length_segment() {
        let p = Point::new(50.0, 50.0);
        assert_eq!(LineSegment::new(p, p).length(), 0.0);
    }

    #[test]
    fn translate_keeps_length_and_moves_midpoint() {
        let mut seg = LineSegment::new(Point::new(0.0, 50.0), Point::new(0.0, 250.0));
        seg.translate(10.0, -50.0);
        assert_eq!(seg.start, Point::new(10.0, 0.0));
        assert_eq!(seg.end, Point::new(10.0, 200.0));
        assert_eq!(seg.midpoint(), Point::new(10.0, 100.0));
        assert_eq!(seg.length(), 200.0);
    }
}
