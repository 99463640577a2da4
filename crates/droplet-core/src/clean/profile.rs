use serde::{Deserialize, Serialize};

use crate::error::Warning;
use crate::geometry::{Baseline, Point, Side};

/// Apex-centred coordinate frame shared by both half profiles.
///
/// Local coordinates put the apex at the origin with "up" positive, and
/// mirror the left half so both halves extend toward +x. The transforms are
/// pure: image-space data is never modified in place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApexFrame {
    /// Apex position in image coordinates.
    pub apex: Point,
}

impl ApexFrame {
    pub fn new(apex: Point) -> Self {
        Self { apex }
    }

    /// Which half an image-space point belongs to.
    pub fn side_of(&self, p: Point) -> Side {
        if p.x < self.apex.x {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Image space → apex-local, y flipped, left half mirrored.
    pub fn to_local(&self, p: Point, side: Side) -> Point {
        let dx = p.x - self.apex.x;
        let x = match side {
            Side::Left => -dx,
            Side::Right => dx,
        };
        Point::new(x, self.apex.y - p.y)
    }

    /// Inverse of [`ApexFrame::to_local`].
    pub fn to_image(&self, q: Point, side: Side) -> Point {
        let dx = match side {
            Side::Left => -q.x,
            Side::Right => q.x,
        };
        Point::new(self.apex.x + dx, self.apex.y - q.y)
    }
}

/// One side of the drop in apex-local coordinates, ordered from the apex
/// down to the contact point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HalfProfile {
    pub side: Side,
    pub points: Vec<Point>,
}

impl HalfProfile {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Last point of the half, i.e. the contact point in local coordinates.
    pub fn contact(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Drop height seen by this half (apex to contact).
    pub fn height(&self) -> f64 {
        self.points
            .iter()
            .map(|p| -p.y)
            .fold(0.0_f64, f64::max)
    }

    /// Points mapped back into image space.
    pub fn image_points(&self, frame: &ApexFrame) -> Vec<Point> {
        self.points
            .iter()
            .map(|&q| frame.to_image(q, self.side))
            .collect()
    }
}

/// Where the drop boundary meets the substrate, in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactPoints {
    pub left: Point,
    pub right: Point,
}

/// Output of contour cleaning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CleanedProfile {
    /// Ordered image-space profile: left contact → apex → right contact.
    pub profile: Vec<Point>,
    pub left: HalfProfile,
    pub right: HalfProfile,
    pub contact_points: ContactPoints,
    pub frame: ApexFrame,
    pub warnings: Vec<Warning>,
}

impl CleanedProfile {
    pub fn apex(&self) -> Point {
        self.frame.apex
    }

    /// Baseline through the contact points, normal pointing into the drop.
    pub fn baseline(&self) -> Option<Baseline> {
        Baseline::new(
            self.contact_points.left,
            self.contact_points.right,
            &self.profile,
        )
    }

    /// Mean apex-to-contact height of the two halves.
    pub fn height(&self) -> f64 {
        0.5 * (self.left.height() + self.right.height())
    }
}
