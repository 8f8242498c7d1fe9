use crate::Point;

use super::error::PathError;

/// Default locality tolerance [mm].
pub const DEFAULT_TOLERANCE: f64 = 1.0;

/// Input of a single light path calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathRequest {
    /// Source position (global coordinates, mm)
    pub start: Point,
    /// Sensor position (global coordinates, mm)
    pub target: Point,
    /// Photon energy [MeV]; the solver default is used when None
    pub energy: Option<f64>,
    /// Maximum accepted distance between achieved end and target [mm].
    /// Zero selects the straight line model.
    pub tolerance: f64,
    /// Allow the single reflection off the outer vessel surface
    pub reflection: bool,
    /// Split the inner target at the fill level
    pub partial_fill: bool,
}

impl PathRequest {
    pub fn new(start: Point, target: Point) -> Self {
        Self {
            start,
            target,
            energy: None,
            tolerance: DEFAULT_TOLERANCE,
            reflection: false,
            partial_fill: false,
        }
    }

    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = Some(energy);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Requests the straight line model (zero tolerance).
    pub fn straight_line(self) -> Self {
        self.with_tolerance(0.0)
    }

    pub fn with_reflection(mut self, reflection: bool) -> Self {
        self.reflection = reflection;
        self
    }

    pub fn with_partial_fill(mut self, partial_fill: bool) -> Self {
        self.partial_fill = partial_fill;
        self
    }

    /// Rejects requests that cannot describe a light path.
    pub fn validate(&self) -> Result<(), PathError> {
        if !self.start.is_finite() {
            return Err(PathError::InvalidInput(format!(
                "start position is not finite: {}",
                self.start
            )));
        }
        if !self.target.is_finite() {
            return Err(PathError::InvalidInput(format!(
                "target position is not finite: {}",
                self.target
            )));
        }
        if let Some(energy) = self.energy
            && (!energy.is_finite() || energy <= 0.0)
        {
            return Err(PathError::InvalidInput(format!(
                "photon energy must be finite and positive, got {energy}"
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(PathError::InvalidInput(format!(
                "locality tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if self.start.is_close(&self.target) {
            return Err(PathError::DegenerateGeometry(
                "start and target coincide".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = PathRequest::new(Point::origin(), Point::new(1.0, 0.0, 0.0))
            .with_energy(2e-6)
            .with_reflection(true)
            .straight_line();
        assert_eq!(request.energy, Some(2e-6));
        assert_eq!(request.tolerance, 0.0);
        assert!(request.reflection);
        assert!(!request.partial_fill);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let target = Point::new(100.0, 0.0, 0.0);
        let nan = PathRequest::new(Point::new(f64::NAN, 0.0, 0.0), target);
        assert!(matches!(nan.validate(), Err(PathError::InvalidInput(_))));

        let inf = PathRequest::new(Point::origin(), Point::new(0.0, f64::INFINITY, 0.0));
        assert!(matches!(inf.validate(), Err(PathError::InvalidInput(_))));

        let energy = PathRequest::new(Point::origin(), target).with_energy(0.0);
        assert!(matches!(energy.validate(), Err(PathError::InvalidInput(_))));

        let tolerance = PathRequest::new(Point::origin(), target).with_tolerance(-1.0);
        assert!(matches!(tolerance.validate(), Err(PathError::InvalidInput(_))));

        let same = PathRequest::new(target, target);
        assert!(matches!(
            same.validate(),
            Err(PathError::DegenerateGeometry(_))
        ));
    }
}
