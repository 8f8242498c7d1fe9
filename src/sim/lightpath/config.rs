use serde::{Deserialize, Serialize};

use crate::sim::materials::DEFAULT_ENERGY_MEV;

use super::error::PathError;

/// Detector geometry in millimetres.
///
/// The vessel is a spherical shell between `inner_radius` and
/// `outer_radius` with a vertical cylindrical neck on top. Its centre sits
/// `vessel_offset` above the global origin. All radii of the shell and neck
/// are taken about the vessel centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorGeometry {
    /// Inner radius of the vessel (surface of the inner target).
    pub inner_radius: f64,
    /// Outer radius of the vessel.
    pub outer_radius: f64,
    /// Inner radius of the neck.
    pub neck_inner_radius: f64,
    /// Outer radius of the neck.
    pub neck_outer_radius: f64,
    /// Radius of the sensor bucket opening.
    pub bucket_radius: f64,
    /// Vertical offset of the vessel centre from the global origin.
    pub vessel_offset: f64,
    /// Fill level height in vessel coordinates (partial fill only).
    pub fill_z: f64,
}

impl DetectorGeometry {
    pub fn new() -> Self {
        Self {
            inner_radius: 6005.0,
            outer_radius: 6060.0,
            neck_inner_radius: 730.0,
            neck_outer_radius: 785.0,
            bucket_radius: 137.0,
            vessel_offset: 0.0,
            fill_z: 0.0,
        }
    }

    /// Checks that the geometry describes a physical detector.
    pub fn validate(&self) -> Result<(), PathError> {
        let radii = [
            ("inner_radius", self.inner_radius),
            ("outer_radius", self.outer_radius),
            ("neck_inner_radius", self.neck_inner_radius),
            ("neck_outer_radius", self.neck_outer_radius),
            ("bucket_radius", self.bucket_radius),
        ];
        for (name, value) in radii {
            if !value.is_finite() || value <= 0.0 {
                return Err(PathError::InvalidGeometry(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        if !self.vessel_offset.is_finite() || !self.fill_z.is_finite() {
            return Err(PathError::InvalidGeometry(
                "vessel_offset and fill_z must be finite".to_string(),
            ));
        }
        if self.inner_radius > self.outer_radius {
            return Err(PathError::InvalidGeometry(format!(
                "inner_radius ({}) exceeds outer_radius ({})",
                self.inner_radius, self.outer_radius
            )));
        }
        if self.neck_inner_radius > self.neck_outer_radius {
            return Err(PathError::InvalidGeometry(format!(
                "neck_inner_radius ({}) exceeds neck_outer_radius ({})",
                self.neck_inner_radius, self.neck_outer_radius
            )));
        }
        Ok(())
    }

    /// Vessel thickness.
    pub fn thickness(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }

    /// Fraction of the inner vessel height filled from the bottom, in [0, 1].
    pub fn fill_fraction(&self) -> f64 {
        ((self.fill_z + self.inner_radius) / (2.0 * self.inner_radius)).clamp(0.0, 1.0)
    }

    /// Returns a copy with the fill level set from a height fraction.
    pub fn with_fill_fraction(mut self, fraction: f64) -> Self {
        let fraction = fraction.clamp(0.0, 1.0);
        self.fill_z = (2.0 * fraction - 1.0) * self.inner_radius;
        self
    }
}

impl Default for DetectorGeometry {
    fn default() -> Self {
        Self::new()
    }
}

/// Numerical settings of the path solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum number of locality correction iterations.
    pub loop_ceiling: usize,
    /// Root finder accuracy on the launch angle [rad].
    pub angle_accuracy: f64,
    /// Maximum number of root finder iterations per solve.
    pub max_root_iterations: usize,
    /// Photon energy [MeV] used when a request gives none.
    pub default_energy: f64,
}

impl SolverConfig {
    pub fn new() -> Self {
        Self {
            loop_ceiling: 20,
            angle_accuracy: 1e-10,
            max_root_iterations: 100,
            default_energy: DEFAULT_ENERGY_MEV,
        }
    }

    pub fn validate(&self) -> Result<(), PathError> {
        if !self.angle_accuracy.is_finite() || self.angle_accuracy <= 0.0 {
            return Err(PathError::InvalidParameter(format!(
                "angle_accuracy must be positive, got {}",
                self.angle_accuracy
            )));
        }
        if self.max_root_iterations == 0 {
            return Err(PathError::InvalidParameter(
                "max_root_iterations must be at least 1".to_string(),
            ));
        }
        if !self.default_energy.is_finite() || self.default_energy <= 0.0 {
            return Err(PathError::InvalidParameter(format!(
                "default_energy must be positive, got {}",
                self.default_energy
            )));
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new()
    }
}
