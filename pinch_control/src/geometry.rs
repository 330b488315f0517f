//! Points, surfaces, and the three-landmark hand sample.
//!
//! Every geometric computation takes its coordinate space as an explicit
//! [`Surface`]; nothing here assumes the camera frame and the window share
//! a size.

use hanoi_puzzle::TOWER_COUNT;

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self { Point { x, y } }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Surface — a coordinate space of known size
// ════════════════════════════════════════════════════════════════════════════

/// Width and height of a coordinate space (camera frame or window).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    pub width:  f32,
    pub height: f32,
}

impl Surface {
    pub const fn new(width: f32, height: f32) -> Self { Surface { width, height } }

    /// Tower zone for a horizontal position: equal thirds, left to right.
    ///
    /// Comparisons are strict, so a point exactly on a boundary belongs to
    /// the zone on its right.  Positions past either edge clamp to the
    /// outer zones.
    pub fn zone(&self, x: f32) -> usize {
        if x < self.width / 3.0 {
            0
        } else if x < 2.0 * self.width / 3.0 {
            1
        } else {
            TOWER_COUNT - 1
        }
    }

    /// Horizontal centre of a zone.
    pub fn zone_center(&self, zone: usize) -> f32 {
        self.width * (2 * zone + 1) as f32 / (2 * TOWER_COUNT) as f32
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandSample
// ════════════════════════════════════════════════════════════════════════════

/// The three landmarks the controller reads from a detected hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandSample {
    pub index_tip: Point,
    pub thumb_tip: Point,
    pub wrist:     Point,
}

impl HandSample {
    pub const fn new(index_tip: Point, thumb_tip: Point, wrist: Point) -> Self {
        HandSample { index_tip, thumb_tip, wrist }
    }

    /// A hand whose index and thumb tips sit `gap` apart horizontally,
    /// centred on `at`, with the wrist below.
    pub fn pinched_at(at: Point, gap: f32) -> Self {
        let half = gap / 2.0;
        HandSample {
            index_tip: Point::new(at.x + half, at.y),
            thumb_tip: Point::new(at.x - half, at.y),
            wrist:     Point::new(at.x, at.y + 120.0),
        }
    }

    pub fn pinch_distance(&self) -> f32 {
        self.index_tip.distance(self.thumb_tip)
    }

    /// Midpoint of index fingertip and thumb tip.
    pub fn centroid(&self) -> Point {
        self.index_tip.midpoint(self.thumb_tip)
    }

    /// Rescale from `frame` coordinates into `target` coordinates.
    ///
    /// With `mirror` the x axis is flipped first, so moving the hand to the
    /// user's right moves the cursor right on a front-facing camera.
    pub fn to_surface(&self, frame: Surface, target: Surface, mirror: bool) -> HandSample {
        let sx = target.width  / frame.width.max(f32::EPSILON);
        let sy = target.height / frame.height.max(f32::EPSILON);
        let map = |p: Point| {
            let x = if mirror { frame.width - p.x } else { p.x };
            Point::new(x * sx, p.y * sy)
        };
        HandSample {
            index_tip: map(self.index_tip),
            thumb_tip: map(self.thumb_tip),
            wrist:     map(self.wrist),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_thirds_with_boundaries_going_right() {
        let s = Surface::new(1200.0, 600.0);
        assert_eq!(s.zone(0.0),    0);
        assert_eq!(s.zone(399.9),  0);
        assert_eq!(s.zone(400.0),  1);
        assert_eq!(s.zone(799.9),  1);
        assert_eq!(s.zone(800.0),  2);
        assert_eq!(s.zone(1200.0), 2);
    }

    #[test]
    fn zone_clamps_outside_surface() {
        let s = Surface::new(900.0, 600.0);
        assert_eq!(s.zone(-50.0), 0);
        assert_eq!(s.zone(5000.0), 2);
    }

    #[test]
    fn zone_centers_fall_in_their_zone() {
        let s = Surface::new(1280.0, 720.0);
        for z in 0..3 {
            assert_eq!(s.zone(s.zone_center(z)), z);
        }
    }

    #[test]
    fn pinch_distance_and_centroid() {
        let h = HandSample::new(
            Point::new(10.0, 0.0),
            Point::new(10.0, 40.0),
            Point::new(0.0, 100.0),
        );
        assert_eq!(h.pinch_distance(), 40.0);
        assert_eq!(h.centroid(), Point::new(10.0, 20.0));
    }

    #[test]
    fn rescale_to_larger_surface() {
        let frame  = Surface::new(640.0, 480.0);
        let window = Surface::new(1280.0, 720.0);
        let h = HandSample::pinched_at(Point::new(320.0, 240.0), 20.0);
        let s = h.to_surface(frame, window, false);
        assert_eq!(s.centroid(), Point::new(640.0, 360.0));
        // Distances scale with the surface, so the threshold is applied to
        // the rescaled value.
        assert_eq!(s.pinch_distance(), 40.0);
    }

    #[test]
    fn mirror_flips_x() {
        let frame = Surface::new(640.0, 480.0);
        let h = HandSample::pinched_at(Point::new(100.0, 50.0), 0.0);
        let s = h.to_surface(frame, frame, true);
        assert_eq!(s.centroid(), Point::new(540.0, 50.0));
    }
}
