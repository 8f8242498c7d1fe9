//! Refracted light paths through a layered spherical detector.
//!
//! A photon travels from a source to a sensor through up to five regions:
//! the inner target, the vessel shell and the surrounding medium, with the
//! inner target optionally split at a fill level. `LightPathCalculator`
//! finds the refracted path, the distance in each region and, on request,
//! the sensor solid angle and Fresnel coefficients.
//!
//! The calculator holds only immutable data. It can be shared by any number
//! of threads, and `calculate_many` evaluates a batch in parallel.

mod assembler;
pub mod config;
mod error;
pub mod fresnel;
mod partial;
mod request;
mod result;
pub mod sensor;
pub mod solver;
mod trace;

pub use config::{DetectorGeometry, SolverConfig};
pub use error::PathError;
pub use request::{DEFAULT_TOLERANCE, PathRequest};
pub use result::{
    CrossingKind, FresnelCoefficients, InterfaceCrossing, InterfaceFresnel, LightPathResult,
    PathType, RegionDistances, SolidAngle, Surface,
};

use rayon::prelude::*;

use crate::io::config::DetectorConfig;
use crate::sim::materials::{RefractiveIndexTable, Region};
use crate::{Point, Vector};

use assembler::{Assembler, PathSolution};

/// Light path solver for one detector configuration.
#[derive(Debug, Clone)]
pub struct LightPathCalculator {
    geometry: DetectorGeometry,
    indices: RefractiveIndexTable,
    config: SolverConfig,
}

impl LightPathCalculator {
    pub fn new(
        geometry: DetectorGeometry,
        indices: RefractiveIndexTable,
        config: SolverConfig,
    ) -> Result<Self, PathError> {
        geometry.validate()?;
        config.validate()?;
        Ok(Self {
            geometry,
            indices,
            config,
        })
    }

    /// Builds a calculator from a loaded configuration document.
    pub fn from_config(config: &DetectorConfig) -> Result<Self, PathError> {
        Self::new(
            config.geometry.clone(),
            config.index_table()?,
            config.solver.clone(),
        )
    }

    pub fn geometry(&self) -> &DetectorGeometry {
        &self.geometry
    }

    pub fn indices(&self) -> &RefractiveIndexTable {
        &self.indices
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Global to vessel coordinates.
    fn to_vessel(&self, point: Point) -> Point {
        point - Vector::new(0.0, 0.0, self.geometry.vessel_offset)
    }

    /// Vessel to global coordinates.
    fn to_global(&self, point: Point) -> Point {
        point + Vector::new(0.0, 0.0, self.geometry.vessel_offset)
    }

    fn assembler(&self, request: &PathRequest) -> Assembler<'_> {
        let energy = request.energy.unwrap_or(self.config.default_energy);
        Assembler {
            geometry: &self.geometry,
            config: &self.config,
            indices: self.indices.indices_at(energy),
            start: self.to_vessel(request.start),
            target: self.to_vessel(request.target),
            tolerance: request.tolerance,
            reflection: request.reflection,
        }
    }

    /// Calculates the light path for a request.
    ///
    /// Requests with the partial fill flag go to `calculate_partial`.
    /// A zero tolerance selects the straight line model. Total internal
    /// reflection and non-convergence are reported through flags.
    pub fn calculate(&self, request: &PathRequest) -> Result<LightPathResult, PathError> {
        request.validate()?;
        if request.partial_fill {
            return self.calculate_partial(request);
        }
        let assembler = self.assembler(request);
        let solution = if request.tolerance == 0.0 {
            assembler.straight_solution(false)?
        } else {
            assembler.solve()?
        };
        Ok(self.build_result(request, &assembler, solution, false))
    }

    /// Calculates the light path with the inner target split at the fill level.
    pub fn calculate_partial(&self, request: &PathRequest) -> Result<LightPathResult, PathError> {
        request.validate()?;
        let assembler = self.assembler(request);
        let solution = if request.tolerance == 0.0 {
            assembler.straight_solution(true)?
        } else {
            assembler.solve_partial()?
        };
        Ok(self.build_result(request, &assembler, solution, true))
    }

    /// Calculates independent requests in parallel.
    ///
    /// Results are returned in request order.
    pub fn calculate_many(&self, requests: &[PathRequest]) -> Vec<Result<LightPathResult, PathError>> {
        requests
            .par_iter()
            .map(|request| self.calculate(request))
            .collect()
    }

    fn build_result(
        &self,
        request: &PathRequest,
        assembler: &Assembler<'_>,
        solution: PathSolution,
        partial_fill: bool,
    ) -> LightPathResult {
        let neck = assembler.neck(&solution.trace);
        let trace = solution.trace;

        let crossings: Vec<InterfaceCrossing> = trace
            .crossings
            .iter()
            .map(|c| InterfaceCrossing {
                point: self.to_global(c.point),
                ..*c
            })
            .collect();
        let vessel_points: Vec<Point> = crossings
            .iter()
            .filter(|c| matches!(c.surface, Surface::InnerVessel | Surface::OuterVessel))
            .map(|c| c.point)
            .take(4)
            .collect();

        let mut distances = trace.distances;
        let mut neck_points = Vec::new();
        if let Some(neck) = &neck {
            distances.neck_inner = neck.inner;
            distances.neck_vessel = neck.vessel;
            distances.neck_medium = neck.medium;
            neck_points = neck.points.iter().map(|&p| self.to_global(p)).collect();
        }

        LightPathResult {
            path_type: solution.path_type,
            distances,
            crossings,
            vessel_points,
            neck_points,
            start: request.start,
            target: request.target,
            end: self.to_global(trace.end),
            initial_direction: trace.initial_direction,
            final_direction: trace.final_direction,
            tir: solution.tir,
            locality_miss: solution.locality_miss,
            neck: neck.is_some(),
            straight_line: solution.straight_line,
            reflection: request.reflection,
            partial_fill,
            final_loop: solution.final_loop,
            energy: request.energy.unwrap_or(self.config.default_energy),
            tolerance: request.tolerance,
            indices: assembler.indices,
            solid_angle: None,
            fresnel: None,
        }
    }

    /// Adds the solid angle of the sensor bucket to a computed result.
    ///
    /// The bucket is seen from the last surface crossing, or from the start
    /// when the path crosses none. `polygon_order` 0 selects the ellipse
    /// approximation; otherwise it must be at least 5.
    pub fn calculate_solid_angle(
        &self,
        mut result: LightPathResult,
        sensor_normal: Vector,
        polygon_order: usize,
    ) -> Result<LightPathResult, PathError> {
        if !result.is_computed() {
            return Err(PathError::PathNotComputed);
        }
        let viewpoint = result.crossings.last().map_or(result.start, |c| c.point);
        let solid_angle = sensor::bucket_solid_angle(
            viewpoint,
            result.target,
            sensor_normal,
            self.geometry.bucket_radius,
            polygon_order,
        )?;
        result.solid_angle = Some(solid_angle);
        Ok(result)
    }

    /// Adds the Fresnel coefficients of every crossing to a computed result.
    pub fn calculate_fresnel(&self, mut result: LightPathResult) -> Result<LightPathResult, PathError> {
        if !result.is_computed() {
            return Err(PathError::PathNotComputed);
        }
        result.fresnel = Some(fresnel::path_coefficients(&result.crossings, &result.indices));
        Ok(result)
    }

    /// Time of flight [ns] along a computed path for the group velocity c/n.
    pub fn travel_time(&self, result: &LightPathResult) -> Result<f64, PathError> {
        if !result.is_computed() {
            return Err(PathError::PathNotComputed);
        }
        Ok(result.optical_path_length() / SPEED_OF_LIGHT_MM_PER_NS)
    }

    /// Cosine of the angle between the path and the sensor bucket face.
    ///
    /// `sensor_normal` points from the bucket into the detector.
    pub fn cos_theta_on_sensor(
        &self,
        result: &LightPathResult,
        sensor_normal: Vector,
    ) -> Result<f64, PathError> {
        if !result.is_computed() {
            return Err(PathError::PathNotComputed);
        }
        let normal = sensor_normal.normalize().ok_or_else(|| {
            PathError::DegenerateGeometry("sensor normal has zero length".to_string())
        })?;
        Ok((-result.final_direction.dot(normal)).clamp(-1.0, 1.0))
    }

    /// Region containing a point given in global coordinates.
    pub fn region_at(&self, point: Point, partial_fill: bool) -> Region {
        trace::region_at(self.to_vessel(point), &self.geometry, partial_fill)
    }
}

/// Speed of light in vacuum [mm/ns].
pub const SPEED_OF_LIGHT_MM_PER_NS: f64 = 299.792458;
