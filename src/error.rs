//! Error types for the ring simulation.
//!
//! The failure surface is deliberately narrow: everything that can go wrong
//! is either a bad configuration detected at startup or a halo message that
//! never arrived. Local evolution is pure arithmetic over a validated buffer
//! and has no failure mode of its own.

/// A fatal error terminating the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// Invalid configuration (bad dimensions, ring size mismatched against
    /// the transport's world size). Detected at startup, never retried.
    Configuration(String),
    /// A halo message failed, timed out, or arrived malformed. Fatal for the
    /// whole run; grid state across ranks is not individually checkpointed,
    /// so there is no partial-progress recovery.
    Communication {
        rank: usize,
        step: usize,
        detail: String,
    },
}

impl RunError {
    /// Create a configuration error.
    pub fn config(detail: impl Into<String>) -> Self {
        RunError::Configuration(detail.into())
    }

    /// Create a communication error identifying the failing rank and step.
    pub fn comm(rank: usize, step: usize, detail: impl Into<String>) -> Self {
        RunError::Communication {
            rank,
            step,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Configuration(detail) => {
                write!(f, "configuration error: {}", detail)
            }
            RunError::Communication { rank, step, detail } => {
                write!(
                    f,
                    "communication error at rank {} step {}: {}",
                    rank, step, detail
                )
            }
        }
    }
}

impl std::error::Error for RunError {}

/// Result alias used throughout the simulation core.
pub type RunResult<T> = Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_identifies_rank_and_step() {
        let err = RunError::comm(3, 17, "receive timed out");
        let msg = err.to_string();
        assert!(msg.contains("rank 3"));
        assert!(msg.contains("step 17"));
        assert!(msg.contains("receive timed out"));
    }

    #[test]
    fn configuration_errors_carry_detail() {
        let err = RunError::config("grid width must be nonzero");
        assert_eq!(
            err.to_string(),
            "configuration error: grid width must be nonzero"
        );
    }
}
