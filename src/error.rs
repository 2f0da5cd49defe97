//! Error type shared by the loader, the exact solver and the exporters.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("capacity exceeded: {points} points requested, at most {limit} supported")]
    CapacityExceeded { points: usize, limit: usize },
    #[error("solve cancelled after {evaluations} state evaluations ({elapsed_secs:.3}s)")]
    Cancelled { evaluations: u64, elapsed_secs: f64 },
    #[error("serialization failed: {0}")]
    Serialization(String),
    #[error("internal solver error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

impl SolverError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<serde_json::Error> for SolverError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<csv::Error> for SolverError {
    fn from(e: csv::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_precondition() {
        let e = SolverError::invalid_input("need at least 2 points, got 1");
        assert_eq!(e.to_string(), "invalid input: need at least 2 points, got 1");

        let e = SolverError::CapacityExceeded { points: 40, limit: 20 };
        assert!(e.to_string().contains("40 points"));
        assert!(e.to_string().contains("at most 20"));

        let e = SolverError::Internal("initial state left unsolved".into());
        assert_eq!(e.to_string(), "internal solver error: initial state left unsolved");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: SolverError = io.into();
        assert!(matches!(e, SolverError::Io(_)));
    }
}
