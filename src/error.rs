use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the collision engine.
///
/// "No collision" and stale events are not errors; they are folded into the
/// event model. Everything here is a caller contract violation or a failure of
/// the configuration layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// `advance` was asked to move the clock backwards.
    #[error("cannot advance to {target}: clock is already at {now}")]
    TimeReversal { target: f64, now: f64 },

    /// A prediction was requested between the boundary and itself.
    #[error("boundary-vs-boundary pair has no collision semantics")]
    BoundaryPair,

    /// A body handle that does not index into the arena.
    #[error("unknown body id {0}")]
    UnknownBody(usize),

    /// Rejected engine configuration.
    #[error("invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = Error::TimeReversal {
            target: 1.0,
            now: 2.5,
        };
        let msg = format!("{e}");
        assert!(msg.contains("2.5"));
        assert!(msg.contains("cannot advance"));
    }

    #[test]
    fn json_errors_convert() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn result_type_alias_compiles() -> Result<()> {
        Ok(())
    }
}
