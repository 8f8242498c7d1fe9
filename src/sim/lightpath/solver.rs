//! Planar model of a refracted path through concentric spheres.
//!
//! A path between two points in a spherically symmetric detector lies in
//! the plane through both points and the centre. Snell's law at concentric
//! spheres conserves L = n r sin(a), where a is the angle between the
//! direction and the radial at radius r. With the launch angle theta
//! measured from the outward radial at the start, every straight leg of the
//! path sweeps a central angle that is a closed form function of theta.
//! The launch angle is found by driving
//!
//! ```text
//! residual(theta) = target_angle - sum_k leg_theta(k, theta)
//! ```
//!
//! to zero with a safeguarded Newton-Raphson/bisection root finder.

use std::f64::consts::{FRAC_PI_2, PI};

use thiserror::Error;

use crate::geom::ray::Crossing;

/// Relative excess of an asin argument still treated as grazing.
const ASIN_TOLERANCE: f64 = 1e-9;

/// Lower bound of cos(a) in derivatives, keeps them finite at grazing.
const MIN_COS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("total internal reflection on leg {leg}")]
    TotalInternalReflection { leg: usize },

    #[error("root not bracketed in [{lo}, {hi}]")]
    NotBracketed { lo: f64, hi: f64 },
}

/// One straight leg of the planar path.
///
/// Radii in mm, `index` is the refractive index of the region the leg runs in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Leg {
    /// From the start point to the first sphere, which is exited or entered.
    Launch {
        radius: f64,
        index: f64,
        crossing: Crossing,
    },
    /// From one sphere out to a larger one.
    Outward { from: f64, to: f64, index: f64 },
    /// From one sphere in to a smaller one.
    Inward { from: f64, to: f64, index: f64 },
    /// Entering and leaving the same sphere.
    Chord { radius: f64, index: f64 },
}

impl Leg {
    /// Largest invariant for which the leg exists.
    fn max_invariant(&self) -> f64 {
        match *self {
            Leg::Launch {
                radius,
                index,
                crossing: Crossing::Entering,
            } => index * radius,
            Leg::Launch { .. } => f64::INFINITY,
            Leg::Outward { from, index, .. } => index * from,
            Leg::Inward { to, index, .. } => index * to,
            Leg::Chord { radius, index } => index * radius,
        }
    }
}

/// Result of a root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootEstimate {
    pub root: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Launch angle solution with the bracket it was found in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchSolution {
    pub theta: f64,
    pub bracket: (f64, f64),
    pub iterations: usize,
    pub converged: bool,
}

/// Planar path model for one path type.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarPath {
    /// Start radius
    pub start_radius: f64,
    /// Refractive index at the start
    pub start_index: f64,
    /// Central angle between start and target [rad]
    pub target_angle: f64,
    pub legs: Vec<Leg>,
    /// Admissible launch angles [rad]
    pub domain: (f64, f64),
    /// Smallest admissible invariant (legs that must miss a sphere)
    pub min_invariant: f64,
}

impl PlanarPath {
    pub fn new(start_radius: f64, start_index: f64, target_angle: f64, legs: Vec<Leg>) -> Self {
        Self {
            start_radius,
            start_index,
            target_angle,
            legs,
            domain: (0.0, PI),
            min_invariant: 0.0,
        }
    }

    pub fn with_domain(mut self, lo: f64, hi: f64) -> Self {
        self.domain = (lo, hi);
        self
    }

    pub fn with_min_invariant(mut self, min_invariant: f64) -> Self {
        self.min_invariant = min_invariant;
        self
    }

    /// L = n0 r0 sin(theta)
    pub fn invariant(&self, theta: f64) -> f64 {
        self.start_index * self.start_radius * theta.sin()
    }

    fn dinvariant(&self, theta: f64) -> f64 {
        self.start_index * self.start_radius * theta.cos()
    }

    /// Largest invariant admitted by every leg.
    pub fn max_invariant(&self) -> f64 {
        self.legs
            .iter()
            .map(Leg::max_invariant)
            .fold(f64::INFINITY, f64::min)
    }

    /// asin(L / (n r)) and d/dtheta of it.
    fn sine_angle(&self, leg: usize, theta: f64, index: f64, radius: f64) -> Result<(f64, f64), SolverError> {
        let u = self.invariant(theta) / (index * radius);
        if u > 1.0 + ASIN_TOLERANCE {
            return Err(SolverError::TotalInternalReflection { leg });
        }
        let u = u.clamp(-1.0, 1.0);
        let du = self.dinvariant(theta) / (index * radius);
        let cos = (1.0 - u * u).sqrt().max(MIN_COS);
        Ok((u.asin(), du / cos))
    }

    /// Central angle swept by leg `k` and its derivative.
    fn leg_angle(&self, k: usize, theta: f64) -> Result<(f64, f64), SolverError> {
        match self.legs[k] {
            Leg::Launch {
                radius,
                index,
                crossing,
            } => {
                let (a, da) = self.sine_angle(k, theta, index, radius)?;
                match crossing {
                    Crossing::Exiting => Ok((theta - a, 1.0 - da)),
                    Crossing::Entering => Ok((a - (PI - theta), da + 1.0)),
                }
            }
            Leg::Outward { from, to, index } => {
                let (a_from, da_from) = self.sine_angle(k, theta, index, from)?;
                let (a_to, da_to) = self.sine_angle(k, theta, index, to)?;
                Ok((a_from - a_to, da_from - da_to))
            }
            Leg::Inward { from, to, index } => {
                let (a_from, da_from) = self.sine_angle(k, theta, index, from)?;
                let (a_to, da_to) = self.sine_angle(k, theta, index, to)?;
                Ok((a_to - a_from, da_to - da_from))
            }
            Leg::Chord { radius, index } => {
                let (a, da) = self.sine_angle(k, theta, index, radius)?;
                Ok((PI - 2.0 * a, -2.0 * da))
            }
        }
    }

    /// Central angle swept by leg `k` at launch angle `theta`.
    pub fn leg_theta(&self, k: usize, theta: f64) -> Result<f64, SolverError> {
        Ok(self.leg_angle(k, theta)?.0)
    }

    /// Derivative of `leg_theta` with respect to the launch angle.
    pub fn leg_dtheta(&self, k: usize, theta: f64) -> Result<f64, SolverError> {
        Ok(self.leg_angle(k, theta)?.1)
    }

    /// Total central angle swept by the path and its derivative.
    pub fn sweep(&self, theta: f64) -> Result<(f64, f64), SolverError> {
        let mut angle = 0.0;
        let mut dangle = 0.0;
        for k in 0..self.legs.len() {
            let (a, da) = self.leg_angle(k, theta)?;
            angle += a;
            dangle += da;
        }
        Ok((angle, dangle))
    }

    pub fn theta_residual(&self, theta: f64) -> Result<f64, SolverError> {
        Ok(self.target_angle - self.sweep(theta)?.0)
    }

    pub fn dtheta_residual(&self, theta: f64) -> Result<f64, SolverError> {
        Ok(-self.sweep(theta)?.1)
    }

    /// Sub-intervals of the domain where every leg exists.
    ///
    /// The invariant is monotone on either side of pi/2, so each side
    /// contributes at most one interval. The flag is true when the leg
    /// limits removed part of the domain.
    pub fn feasible_intervals(&self) -> (Vec<(f64, f64)>, bool) {
        let scale = self.start_index * self.start_radius;
        let bound = |limit: f64| {
            let ratio = limit / scale;
            if scale <= 0.0 || ratio >= 1.0 {
                FRAC_PI_2
            } else {
                ratio.max(0.0).asin()
            }
        };
        let lo_angle = bound(self.min_invariant);
        let hi_angle = bound(self.max_invariant());

        let (d0, d1) = self.domain;
        let mut intervals = Vec::new();
        let mut clipped = false;

        // Rising side, theta <= pi/2
        if d0 <= FRAC_PI_2 {
            let piece = (d0, d1.min(FRAC_PI_2));
            let lo = piece.0.max(lo_angle);
            let hi = piece.1.min(hi_angle);
            if hi < piece.1 {
                clipped = true;
            }
            if lo <= hi {
                intervals.push((lo, hi));
            }
        }
        // Falling side, theta >= pi/2
        if d1 >= FRAC_PI_2 {
            let piece = (d0.max(FRAC_PI_2), d1);
            let lo = piece.0.max(PI - hi_angle);
            let hi = piece.1.min(PI - lo_angle);
            if lo > piece.0 {
                clipped = true;
            }
            if lo <= hi {
                intervals.push((lo, hi));
            }
        }
        // Both sides meet at pi/2
        if intervals.len() == 2 && intervals[0].1 >= intervals[1].0 {
            let merged = (intervals[0].0, intervals[1].1);
            intervals = vec![merged];
        }
        (intervals, clipped)
    }

    /// Finds the launch angle that reaches the target angle.
    ///
    /// Tries every feasible interval that brackets a root. When none does
    /// and the leg limits cut the domain, the target lies in the region
    /// forbidden by total internal reflection.
    pub fn bracket_and_solve(&self, x_acc: f64, max_iter: usize) -> Result<LaunchSolution, SolverError> {
        let (intervals, clipped) = self.feasible_intervals();
        let mut last_error = SolverError::NotBracketed {
            lo: self.domain.0,
            hi: self.domain.1,
        };
        for (lo, hi) in intervals {
            let funcd = |theta: f64| -> Result<(f64, f64), SolverError> {
                let (angle, dangle) = self.sweep(theta)?;
                Ok((self.target_angle - angle, -dangle))
            };
            // Radial paths through the centre have their root on an edge
            let edge = [lo, hi]
                .into_iter()
                .find(|&theta| funcd(theta).is_ok_and(|(f, _)| f.abs() <= x_acc));
            let estimate = match edge {
                Some(root) => Ok(RootEstimate {
                    root,
                    iterations: 0,
                    converged: true,
                }),
                None => rtsafe(funcd, lo, hi, x_acc, max_iter),
            };
            match estimate {
                Ok(estimate) => {
                    return Ok(LaunchSolution {
                        theta: estimate.root,
                        bracket: (lo, hi),
                        iterations: estimate.iterations,
                        converged: estimate.converged,
                    });
                }
                Err(e) => last_error = e,
            }
        }
        if clipped && matches!(last_error, SolverError::NotBracketed { .. }) {
            // Point the error at the most restrictive leg
            let max_invariant = self.max_invariant();
            let leg = self
                .legs
                .iter()
                .position(|leg| leg.max_invariant() == max_invariant)
                .unwrap_or(0);
            return Err(SolverError::TotalInternalReflection { leg });
        }
        Err(last_error)
    }
}

/// Safeguarded Newton-Raphson root finder.
///
/// `funcd` returns the function value and its derivative. The root must be
/// bracketed by `[x1, x2]`. Newton steps that leave the bracket or do not
/// shrink fast enough are replaced by bisection. Running out of iterations
/// returns the last estimate with `converged` false.
pub fn rtsafe<F>(
    mut funcd: F,
    x1: f64,
    x2: f64,
    x_acc: f64,
    max_iter: usize,
) -> Result<RootEstimate, SolverError>
where
    F: FnMut(f64) -> Result<(f64, f64), SolverError>,
{
    let (fl, _) = funcd(x1)?;
    let (fh, _) = funcd(x2)?;
    if (fl > 0.0 && fh > 0.0) || (fl < 0.0 && fh < 0.0) {
        return Err(SolverError::NotBracketed { lo: x1, hi: x2 });
    }
    let done = |root: f64, iterations: usize| RootEstimate {
        root,
        iterations,
        converged: true,
    };
    if fl == 0.0 {
        return Ok(done(x1, 0));
    }
    if fh == 0.0 {
        return Ok(done(x2, 0));
    }

    // Orient the search so that f(xl) < 0
    let (mut xl, mut xh) = if fl < 0.0 { (x1, x2) } else { (x2, x1) };
    let mut rts = 0.5 * (x1 + x2);
    let mut dxold = (x2 - x1).abs();
    let mut dx = dxold;
    let (mut f, mut df) = funcd(rts)?;

    for j in 1..=max_iter {
        let out_of_range = ((rts - xh) * df - f) * ((rts - xl) * df - f) > 0.0;
        let too_slow = (2.0 * f).abs() > (dxold * df).abs();
        if out_of_range || too_slow {
            dxold = dx;
            dx = 0.5 * (xh - xl);
            rts = xl + dx;
            if xl == rts {
                return Ok(done(rts, j));
            }
        } else {
            dxold = dx;
            dx = f / df;
            let previous = rts;
            rts -= dx;
            if previous == rts {
                return Ok(done(rts, j));
            }
        }
        if dx.abs() < x_acc {
            return Ok(done(rts, j));
        }
        (f, df) = funcd(rts)?;
        if f < 0.0 {
            xl = rts;
        } else {
            xh = rts;
        }
    }

    Ok(RootEstimate {
        root: rts,
        iterations: max_iter,
        converged: false,
    })
}
