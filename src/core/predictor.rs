//! Analytic collision prediction for point bodies.
//!
//! Two points moving at constant velocity meet when their x and y coordinates
//! coincide at the same instant. Each axis is solved on its own,
//! `t = (b - a) / (va - vb)`, and the two answers are reconciled:
//!
//! - `0 / 0`: the axis always coincides and does not constrain the answer;
//! - `n / 0` with `n != 0`: the axis never coincides, so neither do the points;
//! - two constraining axes must agree on the time.
//!
//! Every time returned here is relative to the instant at which the body
//! states are valid; the scheduler turns it into an absolute time. A contact
//! happening right now is reported as `0.0`; telling it apart from the contact
//! that was just resolved is the scheduler's job.

use crate::core::body::Body;
use crate::core::boundary::{Axis, Boundary, Wall};
use crate::error::{Error, Result};

/// Default relative tolerance for axis agreement and wall contacts at "now".
pub const DEFAULT_EPS: f64 = 1e-9;

/// Something a prediction can be asked about.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Body(&'a Body),
    Boundary(&'a Boundary),
}

/// Pluggable collision physics.
///
/// `None` means "never": the pair will not meet at any future time given the
/// current velocities.
pub trait Predictor {
    /// Time until bodies `a` and `b` coincide.
    fn bodies(&self, a: &Body, b: &Body) -> Option<f64>;

    /// Time until `body` reaches the wall of `boundary` on `axis`, and which wall.
    fn wall(&self, body: &Body, boundary: &Boundary, axis: Axis) -> Option<(f64, Wall)>;

    /// Dispatch over body/boundary subjects. `axis` only matters for body-boundary pairs.
    ///
    /// Errors: `Error::BoundaryPair` when both subjects are the boundary.
    fn predict(&self, a: Subject<'_>, b: Subject<'_>, axis: Axis) -> Result<Option<f64>> {
        match (a, b) {
            (Subject::Body(a), Subject::Body(b)) => Ok(self.bodies(a, b)),
            (Subject::Body(body), Subject::Boundary(boundary))
            | (Subject::Boundary(boundary), Subject::Body(body)) => {
                Ok(self.wall(body, boundary, axis).map(|(t, _)| t))
            }
            (Subject::Boundary(_), Subject::Boundary(_)) => Err(Error::BoundaryPair),
        }
    }
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn bodies(&self, a: &Body, b: &Body) -> Option<f64> {
        (**self).bodies(a, b)
    }

    fn wall(&self, body: &Body, boundary: &Boundary, axis: Axis) -> Option<(f64, Wall)> {
        (**self).wall(body, boundary, axis)
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn bodies(&self, a: &Body, b: &Body) -> Option<f64> {
        (**self).bodies(a, b)
    }

    fn wall(&self, body: &Body, boundary: &Boundary, axis: Axis) -> Option<(f64, Wall)> {
        (**self).wall(body, boundary, axis)
    }
}

/// Straight-line point-coincidence predictor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematic {
    eps: f64,
}

impl Default for Kinematic {
    fn default() -> Self {
        Self { eps: DEFAULT_EPS }
    }
}

/// Outcome of solving one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AxisMeet {
    DontCare,
    Never,
    At(f64),
}

impl Kinematic {
    /// Errors: `Error::InvalidParam` unless `eps` is finite and > 0.
    pub fn new(eps: f64) -> Result<Self> {
        if !eps.is_finite() || eps <= 0.0 {
            return Err(Error::InvalidParam("tolerance must be finite and > 0".into()));
        }
        Ok(Self { eps })
    }

    #[inline]
    pub fn eps(&self) -> f64 {
        self.eps
    }

    fn axis_meet(pa: f64, va: f64, pb: f64, vb: f64) -> AxisMeet {
        let num = pb - pa;
        let den = va - vb;
        if den == 0.0 {
            return if num == 0.0 {
                AxisMeet::DontCare
            } else {
                AxisMeet::Never
            };
        }
        let t = num / den;
        if t.is_finite() {
            AxisMeet::At(t)
        } else {
            AxisMeet::Never
        }
    }

    /// Contacts before "now" are not events; a contact at "now" is.
    #[inline]
    fn not_past(t: f64) -> Option<f64> {
        (t.is_finite() && t >= 0.0).then_some(t.max(0.0))
    }

    #[inline]
    fn agree(&self, tx: f64, ty: f64) -> bool {
        (tx - ty).abs() <= self.eps * tx.abs().max(ty.abs()).max(1.0)
    }
}

impl Predictor for Kinematic {
    fn bodies(&self, a: &Body, b: &Body) -> Option<f64> {
        let x = Self::axis_meet(a.position[0], a.velocity[0], b.position[0], b.velocity[0]);
        let y = Self::axis_meet(a.position[1], a.velocity[1], b.position[1], b.velocity[1]);
        match (x, y) {
            (AxisMeet::Never, _) | (_, AxisMeet::Never) => None,
            // Coincident bodies: left as "never".
            (AxisMeet::DontCare, AxisMeet::DontCare) => None,
            (AxisMeet::At(t), AxisMeet::DontCare) | (AxisMeet::DontCare, AxisMeet::At(t)) => {
                Self::not_past(t)
            }
            (AxisMeet::At(tx), AxisMeet::At(ty)) => {
                if self.agree(tx, ty) {
                    Self::not_past(tx.max(ty))
                } else {
                    None
                }
            }
        }
    }

    fn wall(&self, body: &Body, boundary: &Boundary, axis: Axis) -> Option<(f64, Wall)> {
        let k = axis.index();
        let v = body.velocity[k];
        if v == 0.0 || !v.is_finite() {
            return None;
        }
        let wall = Wall::facing(axis, v > 0.0);
        let (x, x_wall) = (body.position[k], boundary.coordinate(wall));
        let t = (x_wall - x) / v;
        // A body heading into a wall it sits on (up to rounding of the
        // coordinates) hits it now.
        let slack = self.eps * x.abs().max(x_wall.abs()).max(1.0) / v.abs();
        if !t.is_finite() || t < -slack {
            return None;
        }
        Some((t.max(0.0), wall))
    }
}
