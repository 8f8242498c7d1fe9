pub mod frame;
pub mod point;
pub mod ray;
pub mod vector;

/// Geometric precision
pub const EPS: f64 = 1e-13;

/// Distance tolerance [mm] for points lying on a surface.
pub const SURFACE_EPS: f64 = 1e-6;
