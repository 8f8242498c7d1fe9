//! Vector tracing of light paths in vessel coordinates.
//!
//! The planar solver only yields a launch angle. Tracing follows the ray
//! from surface to surface with the vector form of Snell's law, which gives
//! the interface points, the per-region distances and the end point
//! actually reached.

use thiserror::Error;

use crate::geom::SURFACE_EPS;
use crate::geom::ray::{Crossing, Ray, reflect, refract};
use crate::sim::materials::{Region, RegionIndices};
use crate::{Point, Vector};

use super::config::DetectorGeometry;
use super::result::{CrossingKind, InterfaceCrossing, RegionDistances, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TraceError {
    #[error("total internal reflection at {0:?}")]
    TotalInternalReflection(Surface),

    #[error("path misses the sphere of radius {0}")]
    Missed(f64),

    #[error("zero length direction")]
    ZeroDirection,
}

/// One surface interaction of a traced path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Leave the sphere of `radius` from inside, refracting into `to`.
    Exit {
        radius: f64,
        surface: Surface,
        to: Region,
    },
    /// Enter the sphere of `radius` from outside, refracting into `to`.
    Enter {
        radius: f64,
        surface: Surface,
        to: Region,
    },
    /// Reflect off the outside of the sphere of `radius` made of `off`.
    Reflect {
        radius: f64,
        surface: Surface,
        off: Region,
    },
}

/// A traced path in vessel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub crossings: Vec<InterfaceCrossing>,
    pub distances: RegionDistances,
    pub end: Point,
    pub initial_direction: Vector,
    pub final_direction: Vector,
}

/// Outward unit normal of a sphere centred on the origin.
fn sphere_normal(point: Point) -> Result<Vector, TraceError> {
    Vector::from_a_point(point)
        .normalize()
        .ok_or(TraceError::ZeroDirection)
}

/// Walks a ray through the detector, collecting crossings and distances.
pub struct Tracer<'a> {
    indices: &'a RegionIndices,
    position: Point,
    direction: Vector,
    region: Region,
    initial_direction: Vector,
    crossings: Vec<InterfaceCrossing>,
    distances: RegionDistances,
}

impl<'a> Tracer<'a> {
    pub fn new(
        start: Point,
        direction: Vector,
        region: Region,
        indices: &'a RegionIndices,
    ) -> Result<Self, TraceError> {
        let direction = direction.normalize().ok_or(TraceError::ZeroDirection)?;
        Ok(Self {
            indices,
            position: start,
            direction,
            region,
            initial_direction: direction,
            crossings: Vec::new(),
            distances: RegionDistances::default(),
        })
    }

    fn ray(&self) -> Result<Ray, TraceError> {
        Ray::new(self.position, self.direction).ok_or(TraceError::ZeroDirection)
    }

    fn advance(&mut self, distance: f64, point: Point) {
        self.distances.add(self.region, distance);
        self.position = point;
    }

    /// Moves to where the ray meets the sphere of `radius`.
    pub fn move_to_sphere(&mut self, radius: f64, crossing: Crossing) -> Result<Point, TraceError> {
        let (t, point) = self
            .ray()?
            .intersect_sphere(radius, crossing)
            .ok_or(TraceError::Missed(radius))?;
        self.advance(t, point);
        Ok(point)
    }

    /// Moves to the fill level plane if the ray reaches it before `limit`.
    pub fn move_to_plane(&mut self, height: f64, limit: f64) -> Result<Option<Point>, TraceError> {
        match self.ray()?.intersect_plane_z(height) {
            Some((t, point)) if t < limit => {
                self.advance(t, point);
                Ok(Some(point))
            }
            _ => Ok(None),
        }
    }

    /// Distance along the ray to the sphere of `radius`.
    pub fn distance_to_sphere(&self, radius: f64, crossing: Crossing) -> Result<f64, TraceError> {
        self.ray()?
            .intersect_sphere(radius, crossing)
            .map(|(t, _)| t)
            .ok_or(TraceError::Missed(radius))
    }

    /// Refracts into `to` at the current position.
    pub fn refract(&mut self, normal: Vector, surface: Surface, to: Region) -> Result<(), TraceError> {
        let n1 = self.indices.get(self.region);
        let n2 = self.indices.get(to);
        let refracted = refract(self.direction, normal, n1, n2)
            .ok_or(TraceError::TotalInternalReflection(surface))?;
        self.crossings.push(InterfaceCrossing {
            point: self.position,
            incident: self.direction,
            normal,
            from: self.region,
            to,
            surface,
            kind: CrossingKind::Refraction,
        });
        self.direction = refracted;
        self.region = to;
        Ok(())
    }

    /// Mirrors the direction at the current position.
    pub fn reflect(&mut self, normal: Vector, surface: Surface, off: Region) -> Result<(), TraceError> {
        self.crossings.push(InterfaceCrossing {
            point: self.position,
            incident: self.direction,
            normal,
            from: self.region,
            to: off,
            surface,
            kind: CrossingKind::Reflection,
        });
        self.direction = reflect(self.direction, normal)
            .normalize()
            .ok_or(TraceError::ZeroDirection)?;
        Ok(())
    }

    pub fn step(&mut self, step: Step) -> Result<(), TraceError> {
        match step {
            Step::Exit {
                radius,
                surface,
                to,
            } => {
                let point = self.move_to_sphere(radius, Crossing::Exiting)?;
                self.refract(sphere_normal(point)?, surface, to)
            }
            Step::Enter {
                radius,
                surface,
                to,
            } => {
                let point = self.move_to_sphere(radius, Crossing::Entering)?;
                self.refract(sphere_normal(point)?, surface, to)
            }
            Step::Reflect {
                radius,
                surface,
                off,
            } => {
                let point = self.move_to_sphere(radius, Crossing::Entering)?;
                self.reflect(sphere_normal(point)?, surface, off)
            }
        }
    }

    /// Runs to the sphere of `target_radius` and returns the finished trace.
    pub fn finish(mut self, target_radius: f64) -> Result<Trace, TraceError> {
        let end = self.move_to_sphere(target_radius, Crossing::Exiting)?;
        Ok(Trace {
            crossings: self.crossings,
            distances: self.distances,
            end,
            initial_direction: self.initial_direction,
            final_direction: self.direction,
        })
    }
}

/// Traces a ray through `steps` and on to the target sphere.
pub fn trace_steps(
    start: Point,
    direction: Vector,
    region: Region,
    steps: &[Step],
    target_radius: f64,
    indices: &RegionIndices,
) -> Result<Trace, TraceError> {
    let mut tracer = Tracer::new(start, direction, region, indices)?;
    for &step in steps {
        tracer.step(step)?;
    }
    tracer.finish(target_radius)
}

/// Region containing `point` (vessel coordinates).
pub fn region_at(point: Point, geometry: &DetectorGeometry, partial_fill: bool) -> Region {
    let r = point.radius();
    if r < geometry.inner_radius {
        target_region(point, geometry, partial_fill)
    } else if r < geometry.outer_radius {
        Region::Vessel
    } else {
        Region::Medium
    }
}

fn target_region(point: Point, geometry: &DetectorGeometry, partial_fill: bool) -> Region {
    if !partial_fill {
        Region::InnerTarget
    } else if point.z >= geometry.fill_z {
        Region::UpperTarget
    } else {
        Region::LowerTarget
    }
}

/// Splits the straight segment from `start` to `target` by region.
///
/// Both points are in vessel coordinates. The fill level only divides the
/// inner target when `partial_fill` is set.
pub fn straight_line(
    start: Point,
    target: Point,
    geometry: &DetectorGeometry,
    partial_fill: bool,
) -> Result<Trace, TraceError> {
    let ray = Ray::from_points(start, target).ok_or(TraceError::ZeroDirection)?;
    let length = start.distance(&target);
    let d = ray.direction;

    let mut events: Vec<(f64, Surface)> = Vec::new();
    for (radius, surface) in [
        (geometry.inner_radius, Surface::InnerVessel),
        (geometry.outer_radius, Surface::OuterVessel),
    ] {
        // Tangent lines do not cross
        if let Some((t_near, t_far)) = ray.sphere_roots(radius)
            && t_far - t_near > 1e-9
        {
            for t in [t_near, t_far] {
                if t > SURFACE_EPS && t < length {
                    events.push((t, surface));
                }
            }
        }
    }
    if partial_fill
        && let Some((t, point)) = ray.intersect_plane_z(geometry.fill_z)
        && t < length
        && point.radius() < geometry.inner_radius
    {
        events.push((t, Surface::FillLevel));
    }

    // Coincident shells: leave the inner one first going out, the outer one going in
    let rank = |t: f64, surface: Surface| {
        let outward = Vector::from_a_point(ray.point_at(t)).dot(d) > 0.0;
        match (surface, outward) {
            (Surface::InnerVessel, true) | (Surface::OuterVessel, false) => 0,
            _ => 1,
        }
    };
    events.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| rank(a.0, a.1).cmp(&rank(b.0, b.1)))
    });

    let mut region = region_at(ray.point_at(SURFACE_EPS), geometry, partial_fill);
    let mut distances = RegionDistances::default();
    let mut crossings = Vec::with_capacity(events.len());
    let mut previous = 0.0;
    for (t, surface) in events {
        distances.add(region, t - previous);
        previous = t;
        let point = ray.point_at(t);
        let beyond = ray.point_at(t + SURFACE_EPS);
        let (next, normal) = match surface {
            Surface::InnerVessel => {
                let next = if region.is_target() {
                    Region::Vessel
                } else {
                    target_region(beyond, geometry, partial_fill)
                };
                (next, sphere_normal(point)?)
            }
            Surface::OuterVessel => {
                let next = if region == Region::Medium {
                    Region::Vessel
                } else {
                    Region::Medium
                };
                (next, sphere_normal(point)?)
            }
            Surface::FillLevel => {
                let next = match region {
                    Region::UpperTarget => Region::LowerTarget,
                    Region::LowerTarget => Region::UpperTarget,
                    other => other,
                };
                (next, Vector::new(0.0, 0.0, 1.0))
            }
        };
        if next == region {
            continue;
        }
        crossings.push(InterfaceCrossing {
            point,
            incident: d,
            normal,
            from: region,
            to: next,
            surface,
            kind: CrossingKind::Refraction,
        });
        region = next;
    }
    distances.add(region, length - previous);

    Ok(Trace {
        crossings,
        distances,
        end: target,
        initial_direction: d,
        final_direction: d,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn geometry() -> DetectorGeometry {
        DetectorGeometry {
            inner_radius: 6000.0,
            outer_radius: 6050.0,
            ..DetectorGeometry::default()
        }
    }

    #[test]
    fn test_radial_trace() {
        let indices = RegionIndices {
            inner_target: 1.5,
            upper_target: 1.5,
            lower_target: 1.5,
            vessel: 1.5,
            medium: 1.33,
        };
        let steps = [
            Step::Exit {
                radius: 6000.0,
                surface: Surface::InnerVessel,
                to: Region::Vessel,
            },
            Step::Exit {
                radius: 6050.0,
                surface: Surface::OuterVessel,
                to: Region::Medium,
            },
        ];
        let trace = trace_steps(
            Point::origin(),
            Vector::new(1.0, 0.0, 0.0),
            Region::InnerTarget,
            &steps,
            8400.0,
            &indices,
        )
        .unwrap();
        assert_relative_eq!(trace.distances.inner_target, 6000.0, epsilon = 1e-9);
        assert_relative_eq!(trace.distances.vessel, 50.0, epsilon = 1e-9);
        assert_relative_eq!(trace.distances.medium, 2350.0, epsilon = 1e-9);
        assert!(trace.end.is_close(&Point::new(8400.0, 0.0, 0.0)));
        assert_eq!(trace.crossings.len(), 2);
        assert_eq!(trace.crossings[1].from, Region::Vessel);
        assert_eq!(trace.crossings[1].to, Region::Medium);
    }

    #[test]
    fn test_trace_refraction_bends_toward_normal() {
        // Entering a denser sphere from outside
        let indices = RegionIndices {
            medium: 1.0,
            vessel: 1.5,
            ..RegionIndices::uniform(1.5)
        };
        let mut tracer = Tracer::new(
            Point::new(-10000.0, 3000.0, 0.0),
            Vector::new(1.0, 0.0, 0.0),
            Region::Medium,
            &indices,
        )
        .unwrap();
        tracer
            .step(Step::Enter {
                radius: 6050.0,
                surface: Surface::OuterVessel,
                to: Region::Vessel,
            })
            .unwrap();
        assert_eq!(tracer.region, Region::Vessel);
        let crossing = tracer.crossings[0];
        let sin_i = crossing.incident.cross(crossing.normal).length();
        let sin_t = tracer.direction.cross(crossing.normal).length();
        assert_relative_eq!(sin_i * 1.0, sin_t * 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_trace_total_internal_reflection() {
        let indices = RegionIndices {
            medium: 1.0,
            ..RegionIndices::uniform(1.5)
        };
        let result = trace_steps(
            Point::new(5990.0, 0.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
            Region::Vessel,
            &[Step::Exit {
                radius: 6050.0,
                surface: Surface::OuterVessel,
                to: Region::Medium,
            }],
            8400.0,
            &indices,
        );
        assert_eq!(
            result,
            Err(TraceError::TotalInternalReflection(Surface::OuterVessel))
        );
    }

    #[test]
    fn test_reflection_step() {
        let indices = RegionIndices::uniform(1.33);
        let trace = trace_steps(
            Point::new(8000.0, 0.0, 0.0),
            Vector::new(-1.0, 0.0, 0.0),
            Region::Medium,
            &[Step::Reflect {
                radius: 6050.0,
                surface: Surface::OuterVessel,
                off: Region::Vessel,
            }],
            8400.0,
            &indices,
        )
        .unwrap();
        assert_relative_eq!(trace.distances.medium, 1950.0 + 2350.0, epsilon = 1e-9);
        assert_eq!(trace.crossings[0].kind, CrossingKind::Reflection);
        assert!(trace.final_direction.is_close(&Vector::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_straight_line_through_vessel() {
        let geometry = geometry();
        let start = Point::new(-7000.0, 0.0, 0.0);
        let target = Point::new(8400.0, 0.0, 0.0);
        let trace = straight_line(start, target, &geometry, false).unwrap();
        assert_relative_eq!(trace.distances.medium, 950.0 + 2350.0, epsilon = 1e-9);
        assert_relative_eq!(trace.distances.vessel, 100.0, epsilon = 1e-9);
        assert_relative_eq!(trace.distances.inner_target, 12000.0, epsilon = 1e-9);
        assert_relative_eq!(trace.distances.total(), 15400.0, epsilon = 1e-9);
        let surfaces: Vec<Surface> = trace.crossings.iter().map(|c| c.surface).collect();
        assert_eq!(
            surfaces,
            vec![
                Surface::OuterVessel,
                Surface::InnerVessel,
                Surface::InnerVessel,
                Surface::OuterVessel
            ]
        );
    }

    #[test]
    fn test_straight_line_zero_thickness() {
        let geometry = DetectorGeometry {
            inner_radius: 6000.0,
            outer_radius: 6000.0,
            ..DetectorGeometry::default()
        };
        let trace = straight_line(
            Point::origin(),
            Point::new(0.0, 8400.0, 0.0),
            &geometry,
            false,
        )
        .unwrap();
        assert_eq!(trace.distances.vessel, 0.0);
        assert_relative_eq!(trace.distances.inner_target, 6000.0, epsilon = 1e-9);
        assert_relative_eq!(trace.distances.medium, 2400.0, epsilon = 1e-9);
        assert_eq!(trace.crossings[0].to, Region::Vessel);
        assert_eq!(trace.crossings[1].from, Region::Vessel);
        assert_eq!(trace.crossings[1].to, Region::Medium);
    }

    #[test]
    fn test_straight_line_partial_fill() {
        let geometry = DetectorGeometry {
            fill_z: 1000.0,
            ..geometry()
        };
        let trace = straight_line(
            Point::new(0.0, 0.0, 3000.0),
            Point::new(0.0, 0.0, -8400.0),
            &geometry,
            true,
        )
        .unwrap();
        assert_relative_eq!(trace.distances.upper_target, 2000.0, epsilon = 1e-9);
        assert_relative_eq!(trace.distances.lower_target, 7000.0, epsilon = 1e-9);
        assert_eq!(trace.distances.inner_target, 0.0);
        assert_eq!(trace.crossings[0].surface, Surface::FillLevel);
        assert_eq!(trace.crossings[0].from, Region::UpperTarget);
    }
}
