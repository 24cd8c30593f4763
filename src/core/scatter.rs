use crate::core::body::Body;
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Random initial conditions on an integer lattice.
///
/// Each coordinate is drawn uniformly from `position_range` and each velocity
/// component from `velocity_range`, both inclusive and rounded to whole units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scatter {
    pub count: usize,
    pub position_range: (i64, i64),
    pub velocity_range: (i64, i64),
    /// RNG seed for reproducibility; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for Scatter {
    fn default() -> Self {
        Self {
            count: 20,
            position_range: (-50, 50),
            velocity_range: (-5, 5),
            seed: None,
        }
    }
}

impl Scatter {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Generate `count` bodies at revision 0.
    ///
    /// Errors: `Error::InvalidParam` if either range is inverted.
    pub fn generate(&self) -> Result<Vec<Body>> {
        let (plo, phi) = self.position_range;
        let (vlo, vhi) = self.velocity_range;
        if plo > phi || vlo > vhi {
            return Err(Error::InvalidParam(
                "scatter ranges must satisfy lo <= hi".into(),
            ));
        }

        let mut rng: StdRng = match self.seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        let mut bodies = Vec::with_capacity(self.count);
        for _ in 0..self.count {
            let mut position = [0.0_f64; 2];
            position
                .iter_mut()
                .for_each(|x| *x = rng.random_range(plo..=phi) as f64);
            let mut velocity = [0.0_f64; 2];
            velocity
                .iter_mut()
                .for_each(|v| *v = rng.random_range(vlo..=vhi) as f64);
            bodies.push(Body::new(position, velocity)?);
        }
        Ok(bodies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_demo_setup() -> Result<()> {
        let bodies = Scatter::default().with_seed(7).generate()?;
        assert_eq!(bodies.len(), 20);
        for b in &bodies {
            assert!(b.position.iter().all(|x| (-50.0..=50.0).contains(x) && x.fract() == 0.0));
            assert!(b.velocity.iter().all(|v| (-5.0..=5.0).contains(v)));
            assert_eq!(b.revision(), 0);
        }
        Ok(())
    }

    #[test]
    fn seeded_scatter_is_reproducible() -> Result<()> {
        let s = Scatter::default().with_seed(99);
        assert_eq!(s.generate()?, s.generate()?);
        Ok(())
    }

    #[test]
    fn zero_count_is_allowed() -> Result<()> {
        assert!(Scatter::default().with_count(0).generate()?.is_empty());
        Ok(())
    }

    #[test]
    fn inverted_range_rejected() {
        let s = Scatter {
            velocity_range: (3, -3),
            ..Scatter::default()
        };
        assert!(s.generate().is_err());
    }
}
