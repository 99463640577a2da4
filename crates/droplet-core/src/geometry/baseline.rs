use super::point::{Point, Side};

/// The substrate line through the two contact points, with a unit normal
/// pointing into the drop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    pub left: Point,
    pub right: Point,
    /// Unit vector from the left contact point toward the right one.
    pub direction: Point,
    /// Unit normal on the drop side of the line.
    pub normal: Point,
}

impl Baseline {
    /// Build a baseline whose normal points toward the bulk of `profile`.
    ///
    /// Returns `None` if the contact points coincide.
    pub fn new(left: Point, right: Point, profile: &[Point]) -> Option<Self> {
        let direction = (right - left).normalized()?;
        let mut normal = direction.perp();
        let mean_height: f64 = profile.iter().map(|&p| (p - left).dot(normal)).sum();
        if mean_height < 0.0 {
            normal = -normal;
        }
        Some(Self {
            left,
            right,
            direction,
            normal,
        })
    }

    /// Distance between the two contact points.
    pub fn width(&self) -> f64 {
        self.left.distance(self.right)
    }

    /// Coordinates `(u, v)`: `u` along the baseline from the left contact,
    /// `v` height above the baseline on the drop side.
    pub fn to_frame(&self, p: Point) -> Point {
        let d = p - self.left;
        Point::new(d.dot(self.direction), d.dot(self.normal))
    }

    /// Inverse of [`Baseline::to_frame`].
    pub fn from_frame(&self, q: Point) -> Point {
        self.left + self.direction * q.x + self.normal * q.y
    }

    /// Point on the line at parameter `t` (pixels from the left contact).
    pub fn at(&self, t: f64) -> Point {
        self.left + self.direction * t
    }

    /// Contact angle (degrees) between the baseline and a curve tangent at a
    /// contact on the given side.
    ///
    /// The tangent is oriented away from the substrate; the angle is measured
    /// from the baseline direction pointing into the drop.
    pub fn contact_angle(&self, side: Side, tangent: Point) -> Option<f64> {
        let mut t = tangent.normalized()?;
        if t.dot(self.normal) < 0.0 {
            t = -t;
        }
        let inward = match side {
            Side::Left => self.direction,
            Side::Right => -self.direction,
        };
        Some(t.dot(inward).clamp(-1.0, 1.0).acos().to_degrees())
    }
}
