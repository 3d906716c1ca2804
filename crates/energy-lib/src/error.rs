//! Error types for the prediction pipeline

use thiserror::Error;

/// Errors raised while assembling features or deriving a prediction
#[derive(Debug, Error)]
pub enum EnergyError {
    /// A building attribute violates its declared constraint
    #[error("invalid input for `{field}`: {constraint}")]
    InvalidInput {
        field: &'static str,
        constraint: String,
    },

    /// The model failed or returned an unusable value
    #[error("prediction failed")]
    PredictionFailed(#[source] anyhow::Error),

    /// The model artifact could not be read, verified or parsed
    #[error("failed to load model")]
    ModelLoad(#[source] anyhow::Error),
}

impl EnergyError {
    pub fn invalid(field: &'static str, constraint: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            constraint: constraint.into(),
        }
    }

    /// Name of the offending field for `InvalidInput`
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EnergyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message_names_field() {
        let err = EnergyError::invalid("floor_count", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid input for `floor_count`: must be at least 1"
        );
        assert_eq!(err.field(), Some("floor_count"));
    }

    #[test]
    fn test_prediction_failed_keeps_cause() {
        let err = EnergyError::PredictionFailed(anyhow::anyhow!("schema mismatch"));
        assert_eq!(err.to_string(), "prediction failed");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "schema mismatch");
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_error_chain_names_cause_once() {
        let err = EnergyError::ModelLoad(anyhow::anyhow!("Checksum mismatch"));
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain, "failed to load model: Checksum mismatch");
        assert_eq!(chain.matches("Checksum mismatch").count(), 1);
    }
}
