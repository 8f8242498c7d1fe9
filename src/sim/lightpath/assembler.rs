//! Path classification, launch angle solving and locality correction.

use std::f64::consts::PI;

use log::{debug, warn};

use crate::geom::SURFACE_EPS;
use crate::geom::frame::PlaneFrame;
use crate::geom::ray::{Crossing, Ray};
use crate::sim::materials::{Region, RegionIndices};
use crate::{Point, Vector};

use super::config::{DetectorGeometry, SolverConfig};
use super::error::PathError;
use super::result::{PathType, Surface};
use super::solver::{Leg, PlanarPath, SolverError};
use super::trace::{Step, Trace, TraceError, straight_line, trace_steps};

/// Why a candidate path type could not be solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Failure {
    TotalInternalReflection,
    Unsolved,
}

impl From<SolverError> for Failure {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::TotalInternalReflection { .. } => Failure::TotalInternalReflection,
            SolverError::NotBracketed { .. } => Failure::Unsolved,
        }
    }
}

impl From<TraceError> for Failure {
    fn from(e: TraceError) -> Self {
        match e {
            TraceError::TotalInternalReflection(_) => Failure::TotalInternalReflection,
            TraceError::Missed(_) | TraceError::ZeroDirection => Failure::Unsolved,
        }
    }
}

/// A solved path in vessel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct PathSolution {
    pub path_type: PathType,
    pub trace: Trace,
    pub final_loop: usize,
    pub tir: bool,
    pub locality_miss: bool,
    pub straight_line: bool,
}

/// Distances of a path leaving through the neck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct NeckPath {
    pub points: [Point; 2],
    pub inner: f64,
    pub vessel: f64,
    pub medium: f64,
}

/// Planar model and trace steps of one path type.
struct Candidate {
    path_type: PathType,
    planar: PlanarPath,
    region: Region,
    steps: Vec<Step>,
}

/// Solves a single request. Points are in vessel coordinates.
pub(super) struct Assembler<'a> {
    pub geometry: &'a DetectorGeometry,
    pub config: &'a SolverConfig,
    pub indices: RegionIndices,
    pub start: Point,
    pub target: Point,
    pub tolerance: f64,
    pub reflection: bool,
}

impl Assembler<'_> {
    /// Straight segment from start to target, split by region.
    pub fn straight(&self, partial_fill: bool) -> Result<Trace, PathError> {
        straight_line(self.start, self.target, self.geometry, partial_fill)
            .map_err(|e| PathError::DegenerateGeometry(e.to_string()))
    }

    /// Straight line model in place of a refracted path.
    pub fn fallback(&self, failure: Failure, partial_fill: bool) -> Result<PathSolution, PathError> {
        let tir = failure == Failure::TotalInternalReflection;
        debug!(
            "straight line fallback from {} to {} ({:?})",
            self.start, self.target, failure
        );
        Ok(PathSolution {
            path_type: PathType::StraightLine,
            trace: self.straight(partial_fill)?,
            final_loop: 0,
            tir,
            locality_miss: !tir,
            straight_line: true,
        })
    }

    /// Straight line model, requested or forced by the geometry.
    pub fn straight_solution(&self, partial_fill: bool) -> Result<PathSolution, PathError> {
        Ok(PathSolution {
            path_type: PathType::StraightLine,
            trace: self.straight(partial_fill)?,
            final_loop: 0,
            tir: false,
            locality_miss: false,
            straight_line: true,
        })
    }

    /// True when the target lies in the medium beyond the vessel.
    pub fn target_in_medium(&self) -> bool {
        self.target.radius() > self.geometry.outer_radius + SURFACE_EPS
    }

    /// Classifies the start position and solves the refracted path.
    pub fn solve(&self) -> Result<PathSolution, PathError> {
        if !self.target_in_medium() {
            debug!("target {} is not in the medium, using a straight line", self.target);
            return self.straight_solution(false);
        }
        let r0 = self.start.radius();
        let (r1, r2) = (self.geometry.inner_radius, self.geometry.outer_radius);
        let frame = match PlaneFrame::new(self.start, self.target) {
            Some(frame) if r0 > SURFACE_EPS => frame,
            _ => return self.solve_radial(),
        };

        if r0 < r1 {
            return match self.solve_candidate(&frame, PathType::InnerVesselMedium) {
                Ok(solution) => Ok(solution),
                Err(failure) => self.fallback(failure, false),
            };
        }

        let length = self.start.distance(&self.target);
        let line = Ray::from_points(self.start, self.target)
            .ok_or_else(|| PathError::DegenerateGeometry("start and target coincide".to_string()))?;
        let crosses_inner = line.chord_within(r1, length) > 0.0;

        if r0 < r2 {
            let order = if crosses_inner {
                [PathType::VesselInnerVesselMedium, PathType::VesselMedium]
            } else {
                [PathType::VesselMedium, PathType::VesselInnerVesselMedium]
            };
            return self.solve_first(&frame, &order);
        }

        let target_angle = self.target_angle();
        let r_target = self.target.radius();
        let reflection_limit = PI - (r2 / r0).asin() - (r2 / r_target).asin();
        if self.reflection
            && target_angle <= reflection_limit
            && let Ok(solution) = self.solve_candidate(&frame, PathType::MediumReflection)
        {
            return Ok(solution);
        }

        let crosses_vessel = line.chord_within(r2, length) > 0.0;
        if crosses_inner {
            self.solve_first(
                &frame,
                &[
                    PathType::MediumVesselInnerVesselMedium,
                    PathType::MediumVesselMedium,
                ],
            )
        } else if crosses_vessel {
            self.solve_first(
                &frame,
                &[
                    PathType::MediumVesselMedium,
                    PathType::MediumVesselInnerVesselMedium,
                ],
            )
        } else {
            // Nothing refracts a line that never meets the vessel
            Ok(PathSolution {
                path_type: PathType::Medium,
                trace: self.straight(false)?,
                final_loop: 0,
                tir: false,
                locality_miss: false,
                straight_line: false,
            })
        }
    }

    /// Tries the path types in order, falling back to a straight line.
    fn solve_first(&self, frame: &PlaneFrame, order: &[PathType]) -> Result<PathSolution, PathError> {
        let mut tir = false;
        for &path_type in order {
            match self.solve_candidate(frame, path_type) {
                Ok(solution) => return Ok(solution),
                Err(failure) => {
                    debug!("no {path_type} path from {}: {failure:?}", self.start);
                    tir |= failure == Failure::TotalInternalReflection;
                }
            }
        }
        let failure = if tir {
            Failure::TotalInternalReflection
        } else {
            Failure::Unsolved
        };
        self.fallback(failure, false)
    }

    /// Path from the vessel centre, which runs radially.
    fn solve_radial(&self) -> Result<PathSolution, PathError> {
        let direction = self.target - self.start;
        let steps = self.outgoing_steps();
        let trace = match trace_steps(
            self.start,
            direction,
            Region::InnerTarget,
            &steps,
            self.target.radius(),
            &self.indices,
        ) {
            Ok(trace) => trace,
            Err(e) => return self.fallback(e.into(), false),
        };
        let locality_miss = trace.end.distance(&self.target) >= self.tolerance;
        Ok(PathSolution {
            path_type: PathType::InnerVesselMedium,
            trace,
            final_loop: 0,
            tir: false,
            locality_miss,
            straight_line: false,
        })
    }

    /// Central angle between start and target [rad].
    fn target_angle(&self) -> f64 {
        Vector::from_a_point(self.start).angle(Vector::from_a_point(self.target))
    }

    /// Exits of the inner and outer vessel surfaces.
    pub fn outgoing_steps(&self) -> Vec<Step> {
        vec![
            Step::Exit {
                radius: self.geometry.inner_radius,
                surface: Surface::InnerVessel,
                to: Region::Vessel,
            },
            Step::Exit {
                radius: self.geometry.outer_radius,
                surface: Surface::OuterVessel,
                to: Region::Medium,
            },
        ]
    }

    fn candidate(&self, path_type: PathType) -> Option<Candidate> {
        let r0 = self.start.radius();
        let rt = self.target.radius();
        let (r1, r2) = (self.geometry.inner_radius, self.geometry.outer_radius);
        let n_inner = self.indices.inner_target;
        let n_vessel = self.indices.vessel;
        let n_medium = self.indices.medium;
        let gamma = self.target_angle();

        let to_target = Leg::Outward {
            from: r2,
            to: rt,
            index: n_medium,
        };
        let inner_chord = [
            Leg::Chord {
                radius: r1,
                index: n_inner,
            },
            Leg::Outward {
                from: r1,
                to: r2,
                index: n_vessel,
            },
            to_target,
        ];
        let enter = |radius: f64, surface: Surface, to: Region| Step::Enter {
            radius,
            surface,
            to,
        };
        let exit = |radius: f64, surface: Surface, to: Region| Step::Exit {
            radius,
            surface,
            to,
        };
        // Launch angles pointing past the given sphere
        let shadow = |radius: f64| PI - (radius / r0).min(1.0).asin();

        let candidate = match path_type {
            PathType::InnerVesselMedium => Candidate {
                path_type,
                planar: PlanarPath::new(
                    r0,
                    n_inner,
                    gamma,
                    vec![
                        Leg::Launch {
                            radius: r1,
                            index: n_inner,
                            crossing: Crossing::Exiting,
                        },
                        Leg::Outward {
                            from: r1,
                            to: r2,
                            index: n_vessel,
                        },
                        to_target,
                    ],
                ),
                region: Region::InnerTarget,
                steps: self.outgoing_steps(),
            },
            PathType::VesselMedium => Candidate {
                path_type,
                planar: PlanarPath::new(
                    r0,
                    n_vessel,
                    gamma,
                    vec![
                        Leg::Launch {
                            radius: r2,
                            index: n_vessel,
                            crossing: Crossing::Exiting,
                        },
                        to_target,
                    ],
                )
                .with_domain(0.0, shadow(r1)),
                region: Region::Vessel,
                steps: vec![exit(r2, Surface::OuterVessel, Region::Medium)],
            },
            PathType::VesselInnerVesselMedium => {
                let mut legs = vec![Leg::Launch {
                    radius: r1,
                    index: n_vessel,
                    crossing: Crossing::Entering,
                }];
                legs.extend(inner_chord);
                Candidate {
                    path_type,
                    planar: PlanarPath::new(r0, n_vessel, gamma, legs).with_domain(shadow(r1), PI),
                    region: Region::Vessel,
                    steps: vec![
                        enter(r1, Surface::InnerVessel, Region::InnerTarget),
                        exit(r1, Surface::InnerVessel, Region::Vessel),
                        exit(r2, Surface::OuterVessel, Region::Medium),
                    ],
                }
            }
            PathType::MediumVesselInnerVesselMedium => {
                let mut legs = vec![
                    Leg::Launch {
                        radius: r2,
                        index: n_medium,
                        crossing: Crossing::Entering,
                    },
                    Leg::Inward {
                        from: r2,
                        to: r1,
                        index: n_vessel,
                    },
                ];
                legs.extend(inner_chord);
                Candidate {
                    path_type,
                    planar: PlanarPath::new(r0, n_medium, gamma, legs).with_domain(shadow(r2), PI),
                    region: Region::Medium,
                    steps: vec![
                        enter(r2, Surface::OuterVessel, Region::Vessel),
                        enter(r1, Surface::InnerVessel, Region::InnerTarget),
                        exit(r1, Surface::InnerVessel, Region::Vessel),
                        exit(r2, Surface::OuterVessel, Region::Medium),
                    ],
                }
            }
            PathType::MediumVesselMedium => Candidate {
                path_type,
                planar: PlanarPath::new(
                    r0,
                    n_medium,
                    gamma,
                    vec![
                        Leg::Launch {
                            radius: r2,
                            index: n_medium,
                            crossing: Crossing::Entering,
                        },
                        Leg::Chord {
                            radius: r2,
                            index: n_vessel,
                        },
                        to_target,
                    ],
                )
                .with_domain(shadow(r2), PI)
                .with_min_invariant(n_vessel * r1),
                region: Region::Medium,
                steps: vec![
                    enter(r2, Surface::OuterVessel, Region::Vessel),
                    exit(r2, Surface::OuterVessel, Region::Medium),
                ],
            },
            PathType::MediumReflection => Candidate {
                path_type,
                planar: PlanarPath::new(
                    r0,
                    n_medium,
                    gamma,
                    vec![
                        Leg::Launch {
                            radius: r2,
                            index: n_medium,
                            crossing: Crossing::Entering,
                        },
                        to_target,
                    ],
                )
                .with_domain(shadow(r2), PI),
                region: Region::Medium,
                steps: vec![Step::Reflect {
                    radius: r2,
                    surface: Surface::OuterVessel,
                    off: Region::Vessel,
                }],
            },
            PathType::StraightLine | PathType::Medium | PathType::Undefined => return None,
        };
        Some(candidate)
    }

    /// Solves one path type and runs the locality correction loop.
    ///
    /// The launch angle is corrected by a Newton step on the central angle
    /// of the achieved end point. The iterates do not depend on the
    /// tolerance, so a looser tolerance never needs more iterations.
    fn solve_candidate(&self, frame: &PlaneFrame, path_type: PathType) -> Result<PathSolution, Failure> {
        let candidate = self.candidate(path_type).ok_or(Failure::Unsolved)?;
        let solution = candidate
            .planar
            .bracket_and_solve(self.config.angle_accuracy, self.config.max_root_iterations)?;
        if !solution.converged {
            debug!(
                "{path_type}: root finder stopped after {} iterations",
                solution.iterations
            );
        }

        let (lo, hi) = solution.bracket;
        let gamma = candidate.planar.target_angle;
        let r_target = self.target.radius();
        let mut theta = solution.theta;
        let mut best: Option<(f64, Trace)> = None;

        for i in 0..=self.config.loop_ceiling {
            let trace = match trace_steps(
                self.start,
                frame.direction(theta),
                candidate.region,
                &candidate.steps,
                r_target,
                &self.indices,
            ) {
                Ok(trace) => trace,
                Err(e) if best.is_none() => return Err(e.into()),
                Err(_) => break,
            };
            let miss = trace.end.distance(&self.target);
            if miss < self.tolerance {
                return Ok(self.refracted(candidate.path_type, trace, i, false));
            }

            let delta = wrap_angle(gamma - frame.polar_angle(trace.end));
            if best.as_ref().is_none_or(|(closest, _)| miss < *closest) {
                best = Some((miss, trace));
            }
            let slope = candidate
                .planar
                .sweep(theta)
                .ok()
                .map(|(_, dsweep)| dsweep)
                .filter(|d| d.is_finite() && d.abs() > 1e-9);
            let step = slope.map_or(delta, |d| delta / d);
            theta = (theta + step).clamp(lo, hi);
        }

        let (miss, trace) = best.ok_or(Failure::Unsolved)?;
        warn!(
            "{path_type} path from {} misses {} by {miss:.3} mm after {} iterations",
            self.start, self.target, self.config.loop_ceiling
        );
        Ok(self.refracted(
            candidate.path_type,
            trace,
            self.config.loop_ceiling,
            true,
        ))
    }

    fn refracted(&self, path_type: PathType, trace: Trace, final_loop: usize, locality_miss: bool) -> PathSolution {
        PathSolution {
            path_type,
            trace,
            final_loop,
            tir: false,
            locality_miss,
            straight_line: false,
        }
    }

    /// Neck distances for a path leaving the inner target under the neck.
    pub fn neck(&self, trace: &Trace) -> Option<NeckPath> {
        let exit = trace.crossings.iter().find(|c| {
            c.surface == Surface::InnerVessel
                && c.from.is_target()
                && c.point.z > 0.0
                && c.point.rho() < self.geometry.neck_inner_radius
        })?;
        let ray = Ray::new(exit.point, exit.incident)?;
        let (_, inner) = ray.intersect_cylinder(Point::origin(), self.geometry.neck_inner_radius)?;
        let (_, outer) = ray.intersect_cylinder(Point::origin(), self.geometry.neck_outer_radius)?;
        Some(NeckPath {
            points: [inner, outer],
            inner: exit.point.distance(&inner),
            vessel: inner.distance(&outer),
            medium: outer.distance(&self.target),
        })
    }
}

/// Wraps an angle into [-pi, pi).
fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assembler<'a>(
        geometry: &'a DetectorGeometry,
        config: &'a SolverConfig,
        indices: RegionIndices,
        start: Point,
        target: Point,
    ) -> Assembler<'a> {
        Assembler {
            geometry,
            config,
            indices,
            start,
            target,
            tolerance: 1e-3,
            reflection: false,
        }
    }

    fn geometry() -> DetectorGeometry {
        DetectorGeometry {
            inner_radius: 6000.0,
            outer_radius: 6050.0,
            ..DetectorGeometry::default()
        }
    }

    fn water_indices() -> RegionIndices {
        RegionIndices {
            vessel: 1.5,
            medium: 1.33,
            ..RegionIndices::uniform(1.48)
        }
    }

    #[test]
    fn test_wrap_angle() {
        assert_relative_eq!(wrap_angle(0.5), 0.5, epsilon = 1e-15);
        assert_relative_eq!(wrap_angle(2.0 * PI - 0.1), -0.1, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-2.0 * PI + 0.1), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_inner_start_reaches_target() {
        let geometry = geometry();
        let config = SolverConfig::default();
        let target = Point::new(-3000.0, 7000.0, 2000.0);
        let a = assembler(
            &geometry,
            &config,
            water_indices(),
            Point::new(2000.0, 1000.0, -500.0),
            target,
        );
        let solution = a.solve().unwrap();
        assert_eq!(solution.path_type, PathType::InnerVesselMedium);
        assert!(!solution.locality_miss);
        assert!(solution.trace.end.distance(&target) < 1e-3);
        assert_eq!(solution.trace.crossings.len(), 2);
    }

    #[test]
    fn test_shell_start_classification() {
        let geometry = geometry();
        let config = SolverConfig::default();
        // Heading away from the inner sphere
        let a = assembler(
            &geometry,
            &config,
            water_indices(),
            Point::new(6020.0, 0.0, 0.0),
            Point::new(8000.0, 1000.0, 0.0),
        );
        let solution = a.solve().unwrap();
        assert_eq!(solution.path_type, PathType::VesselMedium);
        assert!(!solution.locality_miss);

        // Straight through the inner sphere
        let a = assembler(
            &geometry,
            &config,
            water_indices(),
            Point::new(6020.0, 0.0, 0.0),
            Point::new(-8000.0, 500.0, 0.0),
        );
        let solution = a.solve().unwrap();
        assert_eq!(solution.path_type, PathType::VesselInnerVesselMedium);
        assert!(solution.trace.distances.inner_target > 11000.0);
        assert!(!solution.locality_miss);
    }

    #[test]
    fn test_outside_start_classification() {
        let geometry = geometry();
        let config = SolverConfig::default();
        let start = Point::new(8000.0, 0.0, 0.0);

        let through = assembler(
            &geometry,
            &config,
            water_indices(),
            start,
            Point::new(-8400.0, 300.0, 0.0),
        );
        let solution = through.solve().unwrap();
        assert_eq!(solution.path_type, PathType::MediumVesselInnerVesselMedium);
        assert_eq!(solution.trace.crossings.len(), 4);
        assert!(!solution.locality_miss);

        let beside = assembler(
            &geometry,
            &config,
            water_indices(),
            start,
            Point::new(8400.0, 3000.0, 0.0),
        );
        let solution = beside.solve().unwrap();
        assert_eq!(solution.path_type, PathType::Medium);
        assert!(solution.trace.crossings.is_empty());
        assert_relative_eq!(
            solution.trace.distances.medium,
            start.distance(&Point::new(8400.0, 3000.0, 0.0)),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_reflection_path() {
        let geometry = geometry();
        let config = SolverConfig::default();
        let target = Point::new(7000.0, 5000.0, 0.0);
        let mut a = assembler(
            &geometry,
            &config,
            water_indices(),
            Point::new(8000.0, -1000.0, 0.0),
            target,
        );
        a.reflection = true;
        let solution = a.solve().unwrap();
        assert_eq!(solution.path_type, PathType::MediumReflection);
        assert!(solution.trace.end.distance(&target) < 1e-3);
        assert_eq!(solution.trace.crossings.len(), 1);
        assert_relative_eq!(
            solution.trace.crossings[0].point.radius(),
            6050.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_target_inside_vessel_uses_straight_line() {
        let geometry = geometry();
        let config = SolverConfig::default();
        let a = assembler(
            &geometry,
            &config,
            water_indices(),
            Point::origin(),
            Point::new(0.0, 6020.0, 0.0),
        );
        let solution = a.solve().unwrap();
        assert_eq!(solution.path_type, PathType::StraightLine);
        assert!(solution.straight_line);
        assert!(!solution.tir);
    }

    #[test]
    fn test_neck_exit() {
        let geometry = DetectorGeometry {
            inner_radius: 6000.0,
            outer_radius: 6050.0,
            neck_inner_radius: 730.0,
            neck_outer_radius: 785.0,
            ..DetectorGeometry::default()
        };
        let config = SolverConfig::default();
        let target = Point::new(3000.0, 0.0, 7800.0);
        let a = assembler(
            &geometry,
            &config,
            RegionIndices::uniform(1.4),
            Point::new(0.0, 0.0, 5500.0),
            target,
        );
        let solution = a.solve().unwrap();
        let neck = a.neck(&solution.trace).unwrap();
        assert_relative_eq!(neck.points[0].rho(), 730.0, epsilon = 1e-6);
        assert_relative_eq!(neck.points[1].rho(), 785.0, epsilon = 1e-6);
        assert!(neck.inner > 0.0 && neck.vessel > 0.0 && neck.medium > 0.0);

        // A sideways path never reaches the neck
        let side = assembler(
            &geometry,
            &config,
            RegionIndices::uniform(1.4),
            Point::origin(),
            Point::new(8400.0, 0.0, 0.0),
        );
        let solution = side.solve().unwrap();
        assert!(side.neck(&solution.trace).is_none());
    }

    #[test]
    fn test_start_on_inner_surface() {
        let geometry = geometry();
        let config = SolverConfig::default();
        let target = Point::new(-3000.0, 7000.0, 0.0);
        let a = assembler(
            &geometry,
            &config,
            water_indices(),
            Point::new(6000.0, 0.0, 0.0),
            target,
        );
        let solution = a.solve().unwrap();
        assert_eq!(solution.path_type, PathType::VesselInnerVesselMedium);
        assert!(!solution.tir);
        assert!(!solution.locality_miss);
        assert!(solution.trace.end.distance(&target) < 1e-3);
    }

    #[test]
    fn test_start_on_outer_surface() {
        let geometry = geometry();
        let config = SolverConfig::default();
        let target = Point::new(-8000.0, 1000.0, 0.0);
        let a = assembler(
            &geometry,
            &config,
            water_indices(),
            Point::new(6050.0, 0.0, 0.0),
            target,
        );
        let solution = a.solve().unwrap();
        assert_eq!(solution.path_type, PathType::MediumVesselInnerVesselMedium);
        assert!(!solution.locality_miss);
        assert_eq!(solution.final_loop, 0);
        assert!(solution.trace.end.distance(&target) < 1e-3);
    }

    #[test]
    fn test_radial_path_to_antipode() {
        let geometry = geometry();
        let config = SolverConfig::default();
        let target = Point::new(-8400.0, 0.0, 0.0);
        let cases = [
            (2000.0, PathType::InnerVesselMedium, [8000.0, 50.0, 2350.0]),
            (6020.0, PathType::VesselInnerVesselMedium, [12000.0, 70.0, 2350.0]),
            (
                8000.0,
                PathType::MediumVesselInnerVesselMedium,
                [12000.0, 100.0, 1950.0 + 2350.0],
            ),
        ];
        for (x, path_type, [inner, vessel, medium]) in cases {
            let a = assembler(
                &geometry,
                &config,
                water_indices(),
                Point::new(x, 0.0, 0.0),
                target,
            );
            let solution = a.solve().unwrap();
            assert_eq!(solution.path_type, path_type);
            assert!(!solution.tir);
            assert!(!solution.locality_miss);
            let d = &solution.trace.distances;
            assert_relative_eq!(d.inner_target, inner, epsilon = 1e-6);
            assert_relative_eq!(d.vessel, vessel, epsilon = 1e-6);
            assert_relative_eq!(d.medium, medium, epsilon = 1e-6);
        }
    }
}
