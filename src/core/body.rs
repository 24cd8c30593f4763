use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Fixed spatial dimension (2D).
pub const DIM: usize = 2;

/// Stable handle of a body inside the scheduler's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub usize);

impl BodyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A dimensionless point body moving at piecewise-constant velocity.
///
/// Fields:
/// - `position`: [x, y]
/// - `velocity`: [vx, vy], constant until a collision is resolved
/// - `revision`: bumped once per realized collision; private so only the scheduler moves it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Position (x, y).
    pub position: [f64; DIM],
    /// Velocity (vx, vy).
    pub velocity: [f64; DIM],
    #[serde(default)]
    revision: u64,
}

impl Body {
    /// Create a body at revision 0.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if any component is NaN/inf.
    pub fn new(position: [f64; DIM], velocity: [f64; DIM]) -> Result<Self> {
        if !position.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !velocity.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            position,
            velocity,
            revision: 0,
        })
    }

    /// Collision participation counter (for event invalidation).
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub(crate) fn bump_revision(&mut self) {
        self.revision = self.revision.saturating_add(1);
    }

    /// Move along the current velocity for `dt` time units.
    #[inline]
    pub fn drift(&mut self, dt: f64) {
        for (x, v) in self.position.iter_mut().zip(self.velocity) {
            *x += v * dt;
        }
    }

    /// Position after `dt` time units, without moving.
    #[inline]
    pub fn position_at(&self, dt: f64) -> [f64; DIM] {
        let mut out = self.position;
        for (x, v) in out.iter_mut().zip(self.velocity) {
            *x += v * dt;
        }
        out
    }
}
