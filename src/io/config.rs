//! JSON configuration of the detector.
//!
//! A configuration document has three sections, all optional:
//!
//! ```json
//! {
//!   "geometry": { "inner_radius": 6005.0, "outer_radius": 6060.0 },
//!   "refractive_indices": {
//!     "vessel": { "wavelengths_nm": [300.0, 500.0], "indices": [1.53, 1.50] }
//!   },
//!   "solver": { "loop_ceiling": 20 }
//! }
//! ```
//!
//! Missing geometry and solver fields take their defaults. Regions without
//! an index curve use the preset curves.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sim::lightpath::{DetectorGeometry, PathError, SolverConfig};
use crate::sim::materials::{IndexCurve, RefractiveIndexTable, Region};

/// Refractive index table of one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveConfig {
    pub wavelengths_nm: Vec<f64>,
    pub indices: Vec<f64>,
}

impl CurveConfig {
    pub fn new(wavelengths_nm: Vec<f64>, indices: Vec<f64>) -> Self {
        Self {
            wavelengths_nm,
            indices,
        }
    }
}

/// Complete detector configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub geometry: DetectorGeometry,
    pub refractive_indices: HashMap<Region, CurveConfig>,
    pub solver: SolverConfig,
}

impl DetectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the index curve of `region` and returns the configuration.
    pub fn with_curve(mut self, region: Region, curve: CurveConfig) -> Self {
        self.refractive_indices.insert(region, curve);
        self
    }

    /// Builds the index table, falling back to presets for missing regions.
    pub fn index_table(&self) -> Result<RefractiveIndexTable, PathError> {
        let presets = RefractiveIndexTable::with_presets();
        let curve = |region: Region| -> Result<IndexCurve, PathError> {
            match self.refractive_indices.get(&region) {
                Some(c) => IndexCurve::from_wavelengths(&c.wavelengths_nm, &c.indices)
                    .map_err(|reason| PathError::InvalidIndexCurve { region, reason }),
                None => Ok(presets.curve(region).clone()),
            }
        };
        Ok(RefractiveIndexTable::new(
            curve(Region::InnerTarget)?,
            curve(Region::UpperTarget)?,
            curve(Region::LowerTarget)?,
            curve(Region::Vessel)?,
            curve(Region::Medium)?,
        ))
    }
}

/// Reads a detector configuration from a JSON file.
pub fn read_config(path: &Path) -> Result<DetectorConfig> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let config: DetectorConfig = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to deserialize configuration from: {}", path.display()))?;

    Ok(config)
}

/// Writes a detector configuration to a JSON file.
pub fn write_config(path: &Path, config: &DetectorConfig) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, config)
        .with_context(|| format!("Failed to serialize configuration to: {}", path.display()))?;

    Ok(())
}

/// Deserializes a detector configuration from a JSON string.
pub fn config_from_str(json: &str) -> Result<DetectorConfig> {
    serde_json::from_str(json).context("Failed to deserialize configuration from string")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::materials::wavelength_to_energy;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    #[test]
    fn test_empty_document_uses_defaults() -> Result<()> {
        let config = config_from_str("{}")?;
        assert_eq!(config.geometry, DetectorGeometry::default());
        assert_eq!(config.solver, SolverConfig::default());
        assert_eq!(config.index_table()?, RefractiveIndexTable::with_presets());
        Ok(())
    }

    #[test]
    fn test_partial_sections() -> Result<()> {
        let json = r#"{
            "geometry": { "inner_radius": 6000.0, "outer_radius": 6050.0 },
            "refractive_indices": {
                "medium": { "wavelengths_nm": [300.0, 500.0], "indices": [1.35, 1.33] }
            },
            "solver": { "loop_ceiling": 5 }
        }"#;
        let config = config_from_str(json)?;
        assert_eq!(config.geometry.inner_radius, 6000.0);
        assert_eq!(config.geometry.neck_inner_radius, 730.0);
        assert_eq!(config.solver.loop_ceiling, 5);
        assert_eq!(config.solver.max_root_iterations, 100);

        let table = config.index_table()?;
        assert_relative_eq!(
            table.index(Region::Medium, wavelength_to_energy(500.0)),
            1.33,
            epsilon = 1e-12
        );
        let presets = RefractiveIndexTable::with_presets();
        assert_eq!(table.curve(Region::Vessel), presets.curve(Region::Vessel));
        Ok(())
    }

    #[test]
    fn test_invalid_curve_names_region() -> Result<()> {
        let json = r#"{
            "refractive_indices": {
                "vessel": { "wavelengths_nm": [300.0, 500.0], "indices": [1.5] }
            }
        }"#;
        let config = config_from_str(json)?;
        let err = config.index_table().unwrap_err();
        assert!(matches!(
            err,
            PathError::InvalidIndexCurve {
                region: Region::Vessel,
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn test_unknown_region_is_rejected() {
        let json = r#"{ "refractive_indices": { "mantle": { "wavelengths_nm": [], "indices": [] } } }"#;
        assert!(config_from_str(json).is_err());
    }

    #[test]
    fn test_write_and_read_config() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("detector.json");

        let mut original = DetectorConfig::new().with_curve(
            Region::InnerTarget,
            CurveConfig::new(vec![350.0, 450.0], vec![1.50, 1.49]),
        );
        original.geometry.vessel_offset = 108.0;

        write_config(&path, &original)?;
        let loaded = read_config(&path)?;
        assert_eq!(loaded, original);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = read_config(Path::new("/nonexistent/detector.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open file"));
    }
}
