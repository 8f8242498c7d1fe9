//! Ray casting against the detector surfaces.
//!
//! This module provides a Ray struct with analytic intersection tests
//! for spheres centred on the origin and vertical cylinders, plus the
//! vector forms of refraction and specular reflection.

use crate::geom::SURFACE_EPS;
use crate::{Point, Vector};

/// Which side of a closed surface the ray starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// The ray starts outside and enters the surface.
    Entering,
    /// The ray starts inside and leaves the surface.
    Exiting,
}

/// A ray defined by an origin point and a direction vector.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray
    pub origin: Point,
    /// Unit direction vector
    pub direction: Vector,
}

impl Ray {
    /// Creates a new ray from origin point and direction vector.
    ///
    /// The direction vector is automatically normalized.
    /// Returns None for a zero-length direction.
    pub fn new(origin: Point, direction: Vector) -> Option<Self> {
        let normalized = direction.normalize()?;
        Some(Self {
            origin,
            direction: normalized,
        })
    }

    /// Creates a ray from two points (origin to target).
    pub fn from_points(origin: Point, target: Point) -> Option<Self> {
        Self::new(origin, target - origin)
    }

    /// Returns the point along the ray at parameter t.
    ///
    /// point = origin + t * direction
    pub fn point_at(&self, t: f64) -> Point {
        self.origin + self.direction * t
    }

    /// Returns both roots (t_near, t_far) of |origin + t * direction| = radius.
    ///
    /// Returns None if the line never reaches the sphere.
    pub fn sphere_roots(&self, radius: f64) -> Option<(f64, f64)> {
        let o = Vector::from_a_point(self.origin);
        let b = o.dot(self.direction);
        let c = o.dot(o) - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        Some((-b - sq, -b + sq))
    }

    /// Calculates the intersection of this ray with a sphere of `radius`
    /// centred on the origin.
    ///
    /// Returns `Some((t, point))` where `t` is the travelled distance.
    /// Entering takes the nearer root, exiting the forward (far) root.
    /// Origins lying on the surface are accepted within `SURFACE_EPS`.
    pub fn intersect_sphere(&self, radius: f64, crossing: Crossing) -> Option<(f64, Point)> {
        let (t_near, t_far) = self.sphere_roots(radius)?;
        let t = match crossing {
            Crossing::Entering => t_near,
            Crossing::Exiting => t_far,
        };
        if t < -SURFACE_EPS {
            return None;
        }
        let t = t.max(0.0);
        Some((t, self.point_at(t)))
    }

    /// Calculates where this ray leaves a vertical cylinder.
    ///
    /// The cylinder axis is parallel to z and passes through `base`;
    /// the cylinder extends upward from `base.z`. The ray origin is
    /// expected inside the cylinder. Returns None for rays parallel to
    /// the axis or when the exit point lies below the base.
    pub fn intersect_cylinder(&self, base: Point, radius: f64) -> Option<(f64, Point)> {
        let ox = self.origin.x - base.x;
        let oy = self.origin.y - base.y;
        let (dx, dy) = (self.direction.dx, self.direction.dy);
        let a = dx * dx + dy * dy;
        if a < 1e-12 {
            return None;
        }
        let b = ox * dx + oy * dy;
        let c = ox * ox + oy * oy - radius * radius;
        let disc = b * b - a * c;
        if disc < 0.0 {
            return None;
        }
        let t = (-b + disc.sqrt()) / a;
        if t < -SURFACE_EPS {
            return None;
        }
        let point = self.point_at(t.max(0.0));
        if point.z < base.z {
            return None;
        }
        Some((t.max(0.0), point))
    }

    /// Calculates where this ray crosses the horizontal plane z = `height`.
    ///
    /// Only forward crossings (t > SURFACE_EPS) are returned.
    pub fn intersect_plane_z(&self, height: f64) -> Option<(f64, Point)> {
        if self.direction.dz.abs() < 1e-12 {
            return None;
        }
        let t = (height - self.origin.z) / self.direction.dz;
        if t <= SURFACE_EPS {
            return None;
        }
        Some((t, self.point_at(t)))
    }

    /// Length of the segment [origin, origin + length * direction]
    /// lying inside the ball of `radius` centred on the origin.
    pub fn chord_within(&self, radius: f64, length: f64) -> f64 {
        match self.sphere_roots(radius) {
            Some((t_near, t_far)) => (t_far.min(length) - t_near.max(0.0)).max(0.0),
            None => 0.0,
        }
    }
}

/// Refracts a unit `incident` direction at a surface with unit `normal`.
///
/// The normal may point to either side. `n1` is the index on the incident
/// side, `n2` on the far side. Returns None on total internal reflection.
pub fn refract(incident: Vector, normal: Vector, n1: f64, n2: f64) -> Option<Vector> {
    // Orient the normal against the incident direction
    let normal = if incident.dot(normal) > 0.0 {
        -normal
    } else {
        normal
    };
    let eta = n1 / n2;
    let cos_i = -incident.dot(normal);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    (incident * eta + normal * (eta * cos_i - k.sqrt())).normalize()
}

/// Mirrors a unit direction about a surface with unit `normal`.
pub fn reflect(incident: Vector, normal: Vector) -> Vector {
    incident - normal * (2.0 * incident.dot(normal))
}
