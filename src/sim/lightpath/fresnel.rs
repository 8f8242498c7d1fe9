//! Fresnel intensity coefficients for unpolarized light.
//!
//! Amplitude transmission for the two polarizations:
//!
//! ```text
//! t_s = 2 n1 cos_i / (n1 cos_i + n2 cos_t)
//! t_p = 2 n1 cos_i / (n2 cos_i + n1 cos_t)
//! ```
//!
//! The intensity transmission scales each by n2 cos_t / (n1 cos_i).

use super::result::{CrossingKind, FresnelCoefficients, InterfaceCrossing, InterfaceFresnel};
use crate::sim::materials::RegionIndices;

/// Cosine of the refraction angle, None beyond the critical angle.
fn cos_transmitted(n1: f64, n2: f64, cos_i: f64) -> Option<f64> {
    let sin_t = n1 / n2 * (1.0 - cos_i * cos_i).max(0.0).sqrt();
    if sin_t > 1.0 {
        None
    } else {
        Some((1.0 - sin_t * sin_t).sqrt())
    }
}

fn intensity(n1: f64, n2: f64, cos_i: f64, amplitude: impl Fn(f64) -> f64) -> f64 {
    // Grazing incidence transmits nothing
    if cos_i <= 1e-12 {
        return 0.0;
    }
    match cos_transmitted(n1, n2, cos_i) {
        Some(cos_t) => {
            let t = amplitude(cos_t);
            (n2 * cos_t) / (n1 * cos_i) * t * t
        }
        None => 0.0,
    }
}

/// Intensity transmission for light polarized perpendicular to the plane of incidence.
pub fn perpendicular_transmission(n1: f64, n2: f64, cos_i: f64) -> f64 {
    let cos_i = cos_i.abs().min(1.0);
    intensity(n1, n2, cos_i, |cos_t| {
        2.0 * n1 * cos_i / (n1 * cos_i + n2 * cos_t)
    })
}

/// Intensity transmission for light polarized parallel to the plane of incidence.
pub fn parallel_transmission(n1: f64, n2: f64, cos_i: f64) -> f64 {
    let cos_i = cos_i.abs().min(1.0);
    intensity(n1, n2, cos_i, |cos_t| {
        2.0 * n1 * cos_i / (n2 * cos_i + n1 * cos_t)
    })
}

/// Unpolarized intensity transmission, the mean of both polarizations.
pub fn transmission(n1: f64, n2: f64, cos_i: f64) -> f64 {
    0.5 * (parallel_transmission(n1, n2, cos_i) + perpendicular_transmission(n1, n2, cos_i))
}

/// Unpolarized intensity reflectivity.
pub fn reflectivity(n1: f64, n2: f64, cos_i: f64) -> f64 {
    1.0 - transmission(n1, n2, cos_i)
}

/// Combines the coefficients of every crossing along a path.
///
/// Light following the path is transmitted at each refraction and
/// reflected at a reflection, so the path transmission is the product of
/// those fractions.
pub fn path_coefficients(crossings: &[InterfaceCrossing], indices: &RegionIndices) -> FresnelCoefficients {
    let interfaces: Vec<InterfaceFresnel> = crossings
        .iter()
        .map(|crossing| {
            let n1 = indices.get(crossing.from);
            let n2 = indices.get(crossing.to);
            let cos_i = crossing.cos_incidence();
            let t = transmission(n1, n2, cos_i);
            InterfaceFresnel {
                surface: crossing.surface,
                kind: crossing.kind,
                cos_incidence: cos_i,
                transmission: t,
                reflectivity: 1.0 - t,
            }
        })
        .collect();

    let transmission: f64 = interfaces
        .iter()
        .map(|i| match i.kind {
            CrossingKind::Refraction => i.transmission,
            CrossingKind::Reflection => i.reflectivity,
        })
        .product();

    FresnelCoefficients {
        transmission,
        reflectivity: 1.0 - transmission,
        interfaces,
    }
}
