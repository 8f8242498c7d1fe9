//! Partially filled vessel.
//!
//! The inner target is split at the fill level into an upper and a lower
//! region with different indices. The fill plane breaks the spherical
//! symmetry, so the path is found by shooting: trace from the start, then
//! turn the launch direction toward the target by the angle the end point
//! missed it by, scaled by the observed gain of the previous turn.

use log::{debug, warn};

use crate::Vector;
use crate::geom::SURFACE_EPS;
use crate::geom::ray::{Crossing, Ray};
use crate::sim::materials::Region;

use super::assembler::{Assembler, Failure, PathSolution};
use super::error::PathError;
use super::result::{PathType, Surface};
use super::trace::{Trace, TraceError, Tracer, region_at};

/// Bounds of the estimated end-point gain of a direction change.
const GAIN_LIMITS: (f64, f64) = (0.2, 5.0);

impl Assembler<'_> {
    /// Traces from the start through the fill level and out of the vessel.
    fn trace_partial(&self, direction: Vector) -> Result<Trace, TraceError> {
        // A start on the fill level belongs to the side it heads into
        let ray = Ray::new(self.start, direction).ok_or(TraceError::ZeroDirection)?;
        let region = region_at(ray.point_at(SURFACE_EPS), self.geometry, true);
        let mut tracer = Tracer::new(self.start, direction, region, &self.indices)?;
        let exit = tracer.distance_to_sphere(self.geometry.inner_radius, Crossing::Exiting)?;
        if tracer.move_to_plane(self.geometry.fill_z, exit)?.is_some() {
            let other = match region {
                Region::UpperTarget => Region::LowerTarget,
                _ => Region::UpperTarget,
            };
            tracer.refract(Vector::new(0.0, 0.0, 1.0), Surface::FillLevel, other)?;
        }
        for step in self.outgoing_steps() {
            tracer.step(step)?;
        }
        tracer.finish(self.target.radius())
    }

    /// Solves a path in the partially filled vessel.
    pub fn solve_partial(&self) -> Result<PathSolution, PathError> {
        if self.start.radius() >= self.geometry.inner_radius || !self.target_in_medium() {
            debug!(
                "partial fill path from {} to {} uses a straight line",
                self.start, self.target
            );
            return self.straight_solution(true);
        }

        let towards = |from_end: Vector| -> Option<(Vector, f64)> {
            let wanted = (self.target - self.start).normalize()?;
            let got = from_end.normalize()?;
            let axis = got.cross(wanted).normalize()?;
            Some((axis, got.angle(wanted)))
        };

        let mut direction = self.target - self.start;
        let mut previous: Option<(Vector, Vector)> = None;
        let mut best: Option<(f64, Trace)> = None;

        for i in 0..=self.config.loop_ceiling {
            let trace = match self.trace_partial(direction) {
                Ok(trace) => trace,
                Err(e) if best.is_none() => return self.fallback(Failure::from(e), true),
                Err(_) => break,
            };
            let miss = trace.end.distance(&self.target);
            if miss < self.tolerance {
                return Ok(PathSolution {
                    path_type: PathType::InnerVesselMedium,
                    trace,
                    final_loop: i,
                    tir: false,
                    locality_miss: false,
                    straight_line: false,
                });
            }

            let reached = trace.end - self.start;
            // Gain of the end direction over the launch direction
            let gain = previous
                .and_then(|(launch, end)| {
                    let turned = launch.angle(direction);
                    (turned > 1e-12).then(|| end.angle(reached) / turned)
                })
                .unwrap_or(1.0)
                .clamp(GAIN_LIMITS.0, GAIN_LIMITS.1);
            previous = Some((direction, reached));
            if best.as_ref().is_none_or(|(closest, _)| miss < *closest) {
                best = Some((miss, trace));
            }

            match towards(reached) {
                Some((axis, angle)) => direction = direction.rotate_about(axis, angle / gain),
                None => break,
            }
        }

        let Some((miss, trace)) = best else {
            return self.fallback(Failure::Unsolved, true);
        };
        warn!(
            "partial fill path from {} misses {} by {miss:.3} mm after {} iterations",
            self.start, self.target, self.config.loop_ceiling
        );
        Ok(PathSolution {
            path_type: PathType::InnerVesselMedium,
            trace,
            final_loop: self.config.loop_ceiling,
            tir: false,
            locality_miss: true,
            straight_line: false,
        })
    }
}
