//! Wavelength-dependent refractive indices of the detector regions.
//!
//! Each region of the detector (inner target, the two partial-fill targets,
//! vessel and surrounding medium) carries a tabulated index curve. Curves
//! are given as (wavelength [nm], index) pairs, stored against photon
//! energy [MeV] and interpolated linearly. Energies outside the table are
//! clamped to its end values.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vecutils::{interpolate, is_strictly_ascending};

/// Planck constant times the speed of light [MeV nm].
pub const HC_MEV_NM: f64 = 1.239841984e-3;

/// Default photon energy [MeV], about 400 nm.
pub const DEFAULT_ENERGY_MEV: f64 = 3.103125e-6;

/// Converts a photon energy [MeV] to its wavelength [nm].
pub fn energy_to_wavelength(energy: f64) -> f64 {
    HC_MEV_NM / energy
}

/// Converts a wavelength [nm] to the photon energy [MeV].
pub fn wavelength_to_energy(wavelength: f64) -> f64 {
    HC_MEV_NM / wavelength
}

/// Optical regions of the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Scintillator (or whatever fills the vessel) in full-fill mode.
    InnerTarget,
    /// Part of the vessel above the fill level.
    UpperTarget,
    /// Part of the vessel below the fill level.
    LowerTarget,
    /// Vessel wall material.
    Vessel,
    /// Medium surrounding the vessel, up to the sensors.
    Medium,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::InnerTarget,
        Region::UpperTarget,
        Region::LowerTarget,
        Region::Vessel,
        Region::Medium,
    ];

    /// True for the regions inside the inner vessel surface.
    pub fn is_target(&self) -> bool {
        matches!(
            self,
            Region::InnerTarget | Region::UpperTarget | Region::LowerTarget
        )
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::InnerTarget => "inner target",
            Region::UpperTarget => "upper target",
            Region::LowerTarget => "lower target",
            Region::Vessel => "vessel",
            Region::Medium => "medium",
        };
        write!(f, "{name}")
    }
}

/// Errors raised while building index curves.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexCurveError {
    #[error("wavelength and index tables must have the same length")]
    LengthMismatch,

    #[error("index table is empty")]
    Empty,

    #[error("wavelengths must be distinct, finite and positive")]
    InvalidWavelength,

    #[error("refractive indices must be finite and at least 1.0")]
    InvalidIndex,
}

/// Refractive index as a function of photon energy.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexCurve {
    /// Photon energies [MeV], strictly ascending
    energies: Vec<f64>,
    /// Refractive index at each energy
    indices: Vec<f64>,
}

impl IndexCurve {
    /// Builds a curve from a (wavelength [nm], index) table in any wavelength order.
    pub fn from_wavelengths(wavelengths: &[f64], indices: &[f64]) -> Result<Self, IndexCurveError> {
        if wavelengths.len() != indices.len() {
            return Err(IndexCurveError::LengthMismatch);
        }
        if wavelengths.is_empty() {
            return Err(IndexCurveError::Empty);
        }
        if wavelengths.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(IndexCurveError::InvalidWavelength);
        }
        if indices.iter().any(|n| !n.is_finite() || *n < 1.0) {
            return Err(IndexCurveError::InvalidIndex);
        }

        let mut pairs: Vec<(f64, f64)> = wavelengths
            .iter()
            .zip(indices.iter())
            .map(|(&w, &n)| (wavelength_to_energy(w), n))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (energies, indices): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        if !is_strictly_ascending(&energies) {
            return Err(IndexCurveError::InvalidWavelength);
        }

        Ok(Self { energies, indices })
    }

    /// Creates a curve with the same index at every energy.
    pub fn constant(index: f64) -> Self {
        Self {
            energies: vec![DEFAULT_ENERGY_MEV],
            indices: vec![index],
        }
    }

    /// Refractive index at the photon `energy` [MeV].
    pub fn at(&self, energy: f64) -> f64 {
        // Construction guarantees a non-empty table
        interpolate(&self.energies, &self.indices, energy).unwrap_or(1.0)
    }
}

/// Index values of every region, evaluated once for a given photon energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionIndices {
    pub inner_target: f64,
    pub upper_target: f64,
    pub lower_target: f64,
    pub vessel: f64,
    pub medium: f64,
}

impl RegionIndices {
    /// All regions share the same index.
    pub fn uniform(index: f64) -> Self {
        Self {
            inner_target: index,
            upper_target: index,
            lower_target: index,
            vessel: index,
            medium: index,
        }
    }

    pub fn get(&self, region: Region) -> f64 {
        match region {
            Region::InnerTarget => self.inner_target,
            Region::UpperTarget => self.upper_target,
            Region::LowerTarget => self.lower_target,
            Region::Vessel => self.vessel,
            Region::Medium => self.medium,
        }
    }
}

/// Refractive index curves for all detector regions.
///
/// Built once at start-up and shared read-only by every calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct RefractiveIndexTable {
    inner_target: IndexCurve,
    upper_target: IndexCurve,
    lower_target: IndexCurve,
    vessel: IndexCurve,
    medium: IndexCurve,
}

impl RefractiveIndexTable {
    pub fn new(
        inner_target: IndexCurve,
        upper_target: IndexCurve,
        lower_target: IndexCurve,
        vessel: IndexCurve,
        medium: IndexCurve,
    ) -> Self {
        Self {
            inner_target,
            upper_target,
            lower_target,
            vessel,
            medium,
        }
    }

    /// Creates a table with energy-independent indices.
    ///
    /// The upper and lower targets take the inner target index.
    pub fn uniform(inner_target: f64, vessel: f64, medium: f64) -> Self {
        Self::new(
            IndexCurve::constant(inner_target),
            IndexCurve::constant(inner_target),
            IndexCurve::constant(inner_target),
            IndexCurve::constant(vessel),
            IndexCurve::constant(medium),
        )
    }

    /// Replaces the partial-fill target curves and returns the table.
    pub fn with_partial_fill(mut self, upper_target: IndexCurve, lower_target: IndexCurve) -> Self {
        self.upper_target = upper_target;
        self.lower_target = lower_target;
        self
    }

    pub fn curve(&self, region: Region) -> &IndexCurve {
        match region {
            Region::InnerTarget => &self.inner_target,
            Region::UpperTarget => &self.upper_target,
            Region::LowerTarget => &self.lower_target,
            Region::Vessel => &self.vessel,
            Region::Medium => &self.medium,
        }
    }

    /// Refractive index of `region` at the photon `energy` [MeV].
    pub fn index(&self, region: Region, energy: f64) -> f64 {
        self.curve(region).at(energy)
    }

    /// Evaluates every region at the photon `energy` [MeV].
    pub fn indices_at(&self, energy: f64) -> RegionIndices {
        RegionIndices {
            inner_target: self.inner_target.at(energy),
            upper_target: self.upper_target.at(energy),
            lower_target: self.lower_target.at(energy),
            vessel: self.vessel.at(energy),
            medium: self.medium.at(energy),
        }
    }

    /// Creates a table with approximate curves for a liquid scintillator
    /// target in an acrylic vessel submerged in water.
    ///
    /// In partial fill the scintillator floats on top of the water.
    pub fn with_presets() -> Self {
        let wavelengths = [250.0, 300.0, 350.0, 400.0, 450.0, 500.0, 600.0, 700.0];
        let scintillator = [1.548, 1.522, 1.506, 1.497, 1.492, 1.488, 1.483, 1.480];
        let acrylic = [1.556, 1.530, 1.514, 1.505, 1.499, 1.495, 1.490, 1.487];
        let water = [1.374, 1.356, 1.347, 1.342, 1.339, 1.337, 1.334, 1.331];

        // Preset tables are known to be valid
        let curve = |indices: &[f64]| {
            IndexCurve::from_wavelengths(&wavelengths, indices)
                .unwrap_or_else(|_| IndexCurve::constant(indices[0]))
        };

        Self::new(
            curve(&scintillator),
            curve(&scintillator),
            curve(&water),
            curve(&acrylic),
            curve(&water),
        )
    }
}

impl Default for RefractiveIndexTable {
    fn default() -> Self {
        Self::with_presets()
    }
}
