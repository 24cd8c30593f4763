//! Engine configuration.
//!
//! Threaded into the scheduler at construction; there is no process-wide state.

use crate::core::boundary::Boundary;
use crate::core::predictor::{Kinematic, DEFAULT_EPS};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rectangle the bodies bounce inside.
    pub boundary: Boundary,
    /// Tolerance of the default predictor.
    pub tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            boundary: Boundary::default(),
            tolerance: DEFAULT_EPS,
        }
    }
}

impl EngineConfig {
    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.boundary
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::Config("tolerance must be finite and > 0".into()));
        }
        Ok(())
    }

    /// The analytic predictor configured with this tolerance.
    pub fn predictor(&self) -> Result<Kinematic> {
        Kinematic::new(self.tolerance).map_err(|e| Error::Config(e.to_string()))
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
