//! Local right-handed frame for planar path calculations.
//!
//! A light path between two points in a spherically symmetric detector
//! stays in the plane spanned by the two points and the centre. The frame
//! has its x axis toward the start point, z normal to that plane and
//! y = z × x completing the right-handed set, so y points to the side of
//! the target.

use crate::{Point, Vector};

#[derive(Debug, Clone, Copy)]
pub struct PlaneFrame {
    pub x_axis: Vector,
    pub y_axis: Vector,
    pub z_axis: Vector,
}

impl PlaneFrame {
    /// Builds the frame for a start and target point, both relative to the centre.
    ///
    /// Returns None if the start point coincides with the centre. When start
    /// and target are collinear with the centre, an arbitrary in-plane y axis
    /// is chosen.
    pub fn new(start: Point, target: Point) -> Option<Self> {
        let x_axis = Vector::from_a_point(start).normalize()?;
        let target_v = Vector::from_a_point(target);
        let normal = x_axis.cross(target_v);
        let z_axis = if normal.length() > 1e-9 * target_v.length() {
            normal.normalize()?
        } else {
            x_axis.any_perpendicular()?
        };
        let y_axis = z_axis.cross(x_axis);
        Some(Self {
            x_axis,
            y_axis,
            z_axis,
        })
    }

    /// Unit direction at angle `theta` [rad] from the x axis, turning toward y.
    pub fn direction(&self, theta: f64) -> Vector {
        let (sin, cos) = theta.sin_cos();
        self.x_axis * cos + self.y_axis * sin
    }

    /// Signed in-plane polar angle of a point, in (-pi, pi].
    pub fn polar_angle(&self, point: Point) -> f64 {
        let v = Vector::from_a_point(point);
        v.dot(self.y_axis).atan2(v.dot(self.x_axis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_frame_axes() {
        let frame = PlaneFrame::new(Point::new(2., 0., 0.), Point::new(1., 1., 0.)).unwrap();
        assert!(frame.x_axis.is_close(&Vector::new(1., 0., 0.)));
        assert!(frame.z_axis.is_close(&Vector::new(0., 0., 1.)));
        assert!(frame.y_axis.is_close(&Vector::new(0., 1., 0.)));
    }

    #[test]
    fn test_target_on_positive_side() {
        let start = Point::new(0., 3., 1.);
        let target = Point::new(-5., 2., 7.);
        let frame = PlaneFrame::new(start, target).unwrap();
        let angle = frame.polar_angle(target);
        let expected = Vector::from_a_point(start).angle(Vector::from_a_point(target));
        assert!((angle - expected).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_points() {
        let frame = PlaneFrame::new(Point::new(1., 1., 1.), Point::new(-2., -2., -2.)).unwrap();
        assert!(frame.y_axis.dot(frame.x_axis).abs() < 1e-12);
        assert!((frame.y_axis.length() - 1.).abs() < 1e-12);
        assert!(PlaneFrame::new(Point::origin(), Point::new(1., 0., 0.)).is_none());
    }

    #[test]
    fn test_direction() {
        let frame = PlaneFrame::new(Point::new(1., 0., 0.), Point::new(0., 1., 0.)).unwrap();
        assert!(frame.direction(FRAC_PI_2).is_close(&Vector::new(0., 1., 0.)));
        assert!((frame.polar_angle(Point::new(0., 4., 0.)) - FRAC_PI_2).abs() < 1e-12);
    }
}
