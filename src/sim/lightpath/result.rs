use std::fmt;

use crate::sim::materials::{Region, RegionIndices};
use crate::{Point, Vector};

/// Sequence of regions a light path traverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathType {
    /// Straight line model, either requested or as a fallback
    StraightLine,
    /// Inner target, vessel, medium
    ///
    /// Every refracted path from a source inside the inner vessel has this
    /// type, including the radial path from the centre.
    InnerVesselMedium,
    /// Vessel, medium
    VesselMedium,
    /// Vessel, inner target, vessel, medium
    VesselInnerVesselMedium,
    /// Medium, vessel, inner target, vessel, medium
    MediumVesselInnerVesselMedium,
    /// Medium, vessel, medium
    MediumVesselMedium,
    /// Medium only
    Medium,
    /// Medium, reflection off the outer vessel surface, medium
    MediumReflection,
    /// No path computed
    Undefined,
}

impl PathType {
    /// Human readable name of the path type.
    pub fn label(&self) -> &'static str {
        match self {
            PathType::StraightLine => "straight line",
            PathType::InnerVesselMedium => "inner target -> vessel -> medium",
            PathType::VesselMedium => "vessel -> medium",
            PathType::VesselInnerVesselMedium => "vessel -> inner target -> vessel -> medium",
            PathType::MediumVesselInnerVesselMedium => {
                "medium -> vessel -> inner target -> vessel -> medium"
            }
            PathType::MediumVesselMedium => "medium -> vessel -> medium",
            PathType::Medium => "medium",
            PathType::MediumReflection => "medium -> vessel reflection -> medium",
            PathType::Undefined => "undefined",
        }
    }
}

impl fmt::Display for PathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Optical surface of the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    InnerVessel,
    OuterVessel,
    FillLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingKind {
    Refraction,
    Reflection,
}

/// A point where the path meets a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterfaceCrossing {
    /// Crossing point (global coordinates)
    pub point: Point,
    /// Unit direction arriving at the surface
    pub incident: Vector,
    /// Unit surface normal (outward radial, or +z at the fill level)
    pub normal: Vector,
    /// Region the light arrives from
    pub from: Region,
    /// Region beyond the surface. For reflections this is the material
    /// the light is reflected off.
    pub to: Region,
    pub surface: Surface,
    pub kind: CrossingKind,
}

impl InterfaceCrossing {
    /// Cosine of the angle of incidence, in [0, 1].
    pub fn cos_incidence(&self) -> f64 {
        self.incident.dot(self.normal).abs().min(1.0)
    }
}

/// Distances [mm] travelled in each region.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionDistances {
    pub inner_target: f64,
    pub upper_target: f64,
    pub lower_target: f64,
    pub vessel: f64,
    pub medium: f64,
    /// Neck distances are a separate estimate for paths leaving through
    /// the neck and are not part of the main body total.
    pub neck_inner: f64,
    pub neck_vessel: f64,
    pub neck_medium: f64,
}

impl RegionDistances {
    pub fn add(&mut self, region: Region, distance: f64) {
        match region {
            Region::InnerTarget => self.inner_target += distance,
            Region::UpperTarget => self.upper_target += distance,
            Region::LowerTarget => self.lower_target += distance,
            Region::Vessel => self.vessel += distance,
            Region::Medium => self.medium += distance,
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

    /// Sum of the main body distances.
    pub fn total(&self) -> f64 {
        self.inner_target + self.upper_target + self.lower_target + self.vessel + self.medium
    }
}

/// Solid angle of the sensor bucket seen from the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidAngle {
    /// Solid angle [sr]
    pub value: f64,
    /// Average cosine of the incidence angle on the bucket face
    pub cos_theta_avg: f64,
    /// Polygon order used (0 for the ellipse approximation)
    pub polygon_order: usize,
}

/// Fresnel coefficients of a single crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterfaceFresnel {
    pub surface: Surface,
    pub kind: CrossingKind,
    pub cos_incidence: f64,
    pub transmission: f64,
    pub reflectivity: f64,
}

/// Fresnel coefficients of a whole path.
#[derive(Debug, Clone, PartialEq)]
pub struct FresnelCoefficients {
    /// Fraction of the intensity that follows the path to the sensor
    pub transmission: f64,
    /// Fraction lost at the interfaces, 1 - transmission
    pub reflectivity: f64,
    /// Per-crossing values in path order
    pub interfaces: Vec<InterfaceFresnel>,
}

/// Result of a light path calculation.
///
/// Built fresh by every calculation; post-processing returns an updated copy.
#[derive(Debug, Clone, PartialEq)]
pub struct LightPathResult {
    pub path_type: PathType,
    pub distances: RegionDistances,
    /// Surface crossings in path order
    pub crossings: Vec<InterfaceCrossing>,
    /// Up to four points where the path crosses the vessel surfaces
    pub vessel_points: Vec<Point>,
    /// Up to two points where the path crosses the neck surfaces
    pub neck_points: Vec<Point>,
    pub start: Point,
    /// Requested end point (the sensor)
    pub target: Point,
    /// End point the path actually reaches
    pub end: Point,
    /// Launch direction at the start
    pub initial_direction: Vector,
    /// Direction incident on the sensor
    pub final_direction: Vector,
    /// Total internal reflection forced the straight line fallback
    pub tir: bool,
    /// The end point misses the target by more than the tolerance
    pub locality_miss: bool,
    /// The path leaves through the neck
    pub neck: bool,
    /// Distances come from the straight line model
    pub straight_line: bool,
    pub reflection: bool,
    pub partial_fill: bool,
    /// Locality correction iteration that met the tolerance
    pub final_loop: usize,
    /// Photon energy [MeV]
    pub energy: f64,
    pub tolerance: f64,
    /// Refractive indices used for this path
    pub indices: RegionIndices,
    pub solid_angle: Option<SolidAngle>,
    pub fresnel: Option<FresnelCoefficients>,
}

impl LightPathResult {
    /// Creates a result with no computed path.
    ///
    /// Distances are zero, the end point is NaN and the path type is
    /// `Undefined`.
    pub fn undefined(start: Point, target: Point) -> Self {
        let nan = f64::NAN;
        Self {
            path_type: PathType::Undefined,
            distances: RegionDistances::default(),
            crossings: Vec::new(),
            vessel_points: Vec::new(),
            neck_points: Vec::new(),
            start,
            target,
            end: Point::new(nan, nan, nan),
            initial_direction: Vector::new(nan, nan, nan),
            final_direction: Vector::new(nan, nan, nan),
            tir: false,
            locality_miss: false,
            neck: false,
            straight_line: false,
            reflection: false,
            partial_fill: false,
            final_loop: 0,
            energy: nan,
            tolerance: nan,
            indices: RegionIndices::uniform(nan),
            solid_angle: None,
            fresnel: None,
        }
    }

    pub fn is_computed(&self) -> bool {
        self.path_type != PathType::Undefined
    }

    /// Total main body distance [mm].
    pub fn total_distance(&self) -> f64 {
        self.distances.total()
    }

    /// Distance between the achieved end point and the target [mm].
    pub fn end_miss(&self) -> f64 {
        self.end.distance(&self.target)
    }

    /// Refractive index used for `region`.
    pub fn index(&self, region: Region) -> f64 {
        self.indices.get(region)
    }

    /// Optical path length, the index weighted main body distance [mm].
    pub fn optical_path_length(&self) -> f64 {
        Region::ALL
            .iter()
            .map(|&region| self.distances.get(region) * self.indices.get(region))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(PathType::StraightLine.label(), "straight line");
        assert_eq!(PathType::VesselMedium.to_string(), "vessel -> medium");
        assert_eq!(PathType::Undefined.label(), "undefined");
    }

    #[test]
    fn test_distances() {
        let mut distances = RegionDistances::default();
        distances.add(Region::InnerTarget, 10.0);
        distances.add(Region::Vessel, 2.0);
        distances.add(Region::Medium, 3.0);
        distances.add(Region::Medium, 1.0);
        distances.neck_inner = 100.0;
        assert_eq!(distances.get(Region::Medium), 4.0);
        assert_eq!(distances.total(), 16.0);
    }

    #[test]
    fn test_undefined_result() {
        let result = LightPathResult::undefined(Point::origin(), Point::new(1.0, 0.0, 0.0));
        assert!(!result.is_computed());
        assert_eq!(result.total_distance(), 0.0);
        assert!(result.end_miss().is_nan());
        assert!(result.solid_angle.is_none());
    }

    #[test]
    fn test_cos_incidence() {
        let crossing = InterfaceCrossing {
            point: Point::new(1.0, 0.0, 0.0),
            incident: Vector::new(-1.0, 0.0, 0.0),
            normal: Vector::new(1.0, 0.0, 0.0),
            from: Region::Medium,
            to: Region::Vessel,
            surface: Surface::OuterVessel,
            kind: CrossingKind::Reflection,
        };
        assert_eq!(crossing.cos_incidence(), 1.0);
    }
}
