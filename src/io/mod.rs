//! File I/O for detector configurations.

pub mod config;

pub use config::{CurveConfig, DetectorConfig, config_from_str, read_config, write_config};
