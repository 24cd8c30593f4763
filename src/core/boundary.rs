use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Axis of the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// One edge of the boundary rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Wall {
    /// x = min_x
    Left,
    /// x = max_x
    Right,
    /// y = min_y
    Floor,
    /// y = max_y
    Roof,
}

impl Wall {
    /// The wall a body moving along `axis` with velocity sign `positive` heads for.
    #[inline]
    pub fn facing(axis: Axis, positive: bool) -> Self {
        match (axis, positive) {
            (Axis::X, false) => Wall::Left,
            (Axis::X, true) => Wall::Right,
            (Axis::Y, false) => Wall::Floor,
            (Axis::Y, true) => Wall::Roof,
        }
    }

    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            Wall::Left | Wall::Right => Axis::X,
            Wall::Floor | Wall::Roof => Axis::Y,
        }
    }
}

/// Fixed axis-aligned rectangle bodies can hit. Immutable for the engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for Boundary {
    fn default() -> Self {
        Self {
            min_x: -256.0,
            max_x: 256.0,
            min_y: -256.0,
            max_y: 256.0,
        }
    }
}

impl Boundary {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Self> {
        let b = Self {
            min_x,
            max_x,
            min_y,
            max_y,
        };
        b.validate()?;
        Ok(b)
    }

    /// Bounds must be finite with min < max on both axes.
    pub fn validate(&self) -> Result<()> {
        let all = [self.min_x, self.max_x, self.min_y, self.max_y];
        if !all.iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidParam("boundary bounds must be finite".into()));
        }
        if self.min_x >= self.max_x || self.min_y >= self.max_y {
            return Err(Error::InvalidParam(
                "boundary min must be strictly less than max on both axes".into(),
            ));
        }
        Ok(())
    }

    /// Coordinate of `wall` along its axis.
    #[inline]
    pub fn coordinate(&self, wall: Wall) -> f64 {
        match wall {
            Wall::Left => self.min_x,
            Wall::Right => self.max_x,
            Wall::Floor => self.min_y,
            Wall::Roof => self.max_y,
        }
    }

    #[inline]
    pub fn contains(&self, p: [f64; 2]) -> bool {
        (self.min_x..=self.max_x).contains(&p[0]) && (self.min_y..=self.max_y).contains(&p[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_box_is_512_wide() {
        let b = Boundary::default();
        assert_eq!(b.coordinate(Wall::Left), -256.0);
        assert_eq!(b.coordinate(Wall::Roof), 256.0);
        assert!(b.validate().is_ok());
        assert!(b.contains([0.0, 255.0]));
        assert!(!b.contains([0.0, 257.0]));
    }

    #[test]
    fn inverted_bounds_rejected() {
        let err = Boundary::new(10.0, -10.0, 0.0, 1.0).unwrap_err();
        assert!(err.to_string().contains("strictly less"));
        assert!(Boundary::new(0.0, f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn wall_facing_follows_axis_and_sign() {
        assert_eq!(Wall::facing(Axis::X, true), Wall::Right);
        assert_eq!(Wall::facing(Axis::X, false), Wall::Left);
        assert_eq!(Wall::facing(Axis::Y, true), Wall::Roof);
        assert_eq!(Wall::facing(Axis::Y, false), Wall::Floor);
        assert_eq!(Wall::Floor.axis(), Axis::Y);
    }
}
