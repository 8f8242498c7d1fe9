use crate::Point;
use crate::geom::EPS;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Vector {
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    pub fn from_a_point(pt: Point) -> Self {
        Self::from_points(Point::new(0., 0., 0.), pt)
    }

    pub fn from_points(beg: Point, end: Point) -> Self {
        Self {
            dx: end.x - beg.x,
            dy: end.y - beg.y,
            dz: end.z - beg.z,
        }
    }

    /// Cross product between 2 vectors.
    pub fn cross(self, other: Self) -> Self {
        Self {
            dx: self.dy * other.dz - self.dz * other.dy,
            dy: self.dz * other.dx - self.dx * other.dz,
            dz: self.dx * other.dy - self.dy * other.dx,
        }
    }

    /// Dot product between 2 vectors.
    pub fn dot(self, other: Self) -> f64 {
        self.dx * other.dx + self.dy * other.dy + self.dz * other.dz
    }

    /// Returns the length of the vector.
    pub fn length(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt()
    }

    pub fn is_close(&self, other: &Self) -> bool {
        (self.dx - other.dx).abs() < EPS
            && (self.dy - other.dy).abs() < EPS
            && (self.dz - other.dz).abs() < EPS
    }

    /// Normalizes the vector (divides by its length) and returns a copy.
    pub fn normalize(&self) -> Option<Self> {
        let len = self.length();
        if len < EPS {
            None
        } else {
            Some(Self {
                dx: self.dx / len,
                dy: self.dy / len,
                dz: self.dz / len,
            })
        }
    }

    /// Angle [rad] between two vectors, in [0, pi].
    ///
    /// Uses atan2 of the cross and dot products, which stays accurate
    /// for nearly parallel vectors. Zero-length input gives 0.
    pub fn angle(self, other: Self) -> f64 {
        self.cross(other).length().atan2(self.dot(other))
    }

    /// Rotates the vector about a unit `axis` by `angle` [rad] (Rodrigues' formula).
    pub fn rotate_about(self, axis: Self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        self * cos + axis.cross(self) * sin + axis * (axis.dot(self) * (1.0 - cos))
    }

    /// Returns a unit vector perpendicular to this one.
    ///
    /// Returns None for zero-length vectors.
    pub fn any_perpendicular(&self) -> Option<Self> {
        let helper = if self.dx.abs() <= self.dy.abs() && self.dx.abs() <= self.dz.abs() {
            Self::new(1., 0., 0.)
        } else if self.dy.abs() <= self.dz.abs() {
            Self::new(0., 1., 0.)
        } else {
            Self::new(0., 0., 1.)
        };
        self.cross(helper).normalize()
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2); // Default 2 decimals
        write!(
            f,
            "Vector({:.prec$}, {:.prec$}, {:.prec$})",
            self.dx,
            self.dy,
            self.dz,
            prec = prec
        )
    }
}

// Implement +
impl Add for Vector {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            dx: self.dx + other.dx,
            dy: self.dy + other.dy,
            dz: self.dz + other.dz,
        }
    }
}

// Implement -
impl Sub for Vector {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            dx: self.dx - other.dx,
            dy: self.dy - other.dy,
            dz: self.dz - other.dz,
        }
    }
}

// Implement unary -
impl Neg for Vector {
    type Output = Self;
    fn neg(self) -> Self {
        self * -1.
    }
}

// Implement *
impl Mul<f64> for Vector {
    type Output = Self;
    fn mul(self, other: f64) -> Self {
        Self {
            dx: self.dx * other,
            dy: self.dy * other,
            dz: self.dz * other,
        }
    }
}

// Implement /
impl Div<f64> for Vector {
    type Output = Option<Self>;
    fn div(self, other: f64) -> Option<Self> {
        if other.abs() < EPS {
            None
        } else {
            Some(Self {
                dx: self.dx / other,
                dy: self.dy / other,
                dz: self.dz / other,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_from_points() {
        let p0 = Point::new(1., 1., 1.);
        let p1 = Point::new(0., 0., 0.);
        let va = Vector::from_points(p0, p1);
        let vb = Vector::from_points(p1, p0);
        assert_eq!(va, vb * -1.);
        assert_eq!(va, -vb);
    }

    #[test]
    fn test_cross() {
        let vx = Vector::new(1., 0., 0.);
        let vy = Vector::new(0., 1., 0.);
        let v_cross = vx.cross(vy);
        assert_eq!(v_cross, Vector::new(0., 0., 1.));
        let len = v_cross.length();
        assert_eq!(len, 1.);
    }

    #[test]
    fn test_normalize() {
        // Non-zero-length vector
        let v = Vector::new(9., 0., 0.);
        let vnorm = v.normalize();
        assert!(vnorm.is_some());
        assert_eq!(vnorm.unwrap(), Vector::new(1., 0., 0.));
        // Zero-length vector
        let v = Vector::new(0., 0., 0.);
        assert!(v.normalize().is_none());
    }

    #[test]
    fn test_angle() {
        let vx = Vector::new(2., 0., 0.);
        let vy = Vector::new(0., 3., 0.);
        assert!((vx.angle(vy) - FRAC_PI_2).abs() < 1e-12);
        assert!((vx.angle(-vx) - PI).abs() < 1e-12);
        assert!(vx.angle(vx).abs() < 1e-12);
    }

    #[test]
    fn test_rotate_about() {
        let vx = Vector::new(1., 0., 0.);
        let vz = Vector::new(0., 0., 1.);
        let rotated = vx.rotate_about(vz, FRAC_PI_2);
        assert!(rotated.is_close(&Vector::new(0., 1., 0.)));
        // Rotation about the vector itself leaves it unchanged
        let same = vz.rotate_about(vz, 1.234);
        assert!(same.is_close(&vz));
    }

    #[test]
    fn test_any_perpendicular() {
        let v = Vector::new(0.3, -2.0, 5.0);
        let perp = v.any_perpendicular().unwrap();
        assert!(perp.dot(v).abs() < 1e-12);
        assert!((perp.length() - 1.).abs() < 1e-12);
        assert!(Vector::new(0., 0., 0.).any_perpendicular().is_none());
    }

    #[test]
    fn test_div_by_zero() {
        let v = Vector::new(1., 2., 3.);
        assert!((v / 0.).is_none());
        assert_eq!((v / 2.).unwrap(), Vector::new(0.5, 1., 1.5));
    }
}
