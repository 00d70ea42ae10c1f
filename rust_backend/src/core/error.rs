//! Error types for map building and observability queries.

use crate::interpolation::InterpolationError;

/// Result type for coverage operations
pub type CoverageResult<T> = Result<T, ObservabilityError>;

/// Error type for coverage map construction and evaluation
#[derive(Debug, thiserror::Error)]
pub enum ObservabilityError {
    #[error("Data load error: {0}")]
    DataLoad(String),

    #[error("Fit error: {0}")]
    Fit(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ObservabilityError {
    /// Wrap a loader failure, keeping the whole context chain in the message.
    pub fn data_load(err: anyhow::Error) -> Self {
        ObservabilityError::DataLoad(format!("{:#}", err))
    }
}

impl From<InterpolationError> for ObservabilityError {
    fn from(err: InterpolationError) -> Self {
        ObservabilityError::Fit(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_data_load_keeps_context_chain() {
        let inner: anyhow::Result<()> = Err(anyhow::anyhow!("row 3 has 2 columns"));
        let err = ObservabilityError::data_load(inner.context("Failed to parse table").unwrap_err());

        let msg = err.to_string();
        assert!(msg.starts_with("Data load error:"));
        assert!(msg.contains("Failed to parse table"));
        assert!(msg.contains("row 3 has 2 columns"));
    }

    #[test]
    fn test_interpolation_errors_become_fit_errors() {
        let err: ObservabilityError =
            InterpolationError::Triangulation(crate::interpolation::TriangulationError::Degenerate)
                .into();
        assert!(matches!(err, ObservabilityError::Fit(_)));
        assert!(err.to_string().contains("collinear"));
    }

    #[test]
    fn test_display_variants() {
        assert_eq!(
            ObservabilityError::Fit("only 2 points".into()).to_string(),
            "Fit error: only 2 points"
        );
        assert_eq!(
            ObservabilityError::InvalidInput("NaN".into()).to_string(),
            "Invalid input: NaN"
        );
    }
}
