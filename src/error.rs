use thiserror::Error;

/// Main error type for the prediction service
#[derive(Error, Debug)]
pub enum AppraiseError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Model lifecycle errors (startup-fatal)
    #[error("Model unavailable at {path}: {reason}")]
    ModelUnavailable { path: String, reason: String },

    // Per-request errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppraiseError {
    pub fn model_unavailable(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::ModelUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors caused by the caller's payload rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result type alias for AppraiseError
pub type Result<T> = std::result::Result<T, AppraiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_unavailable_names_the_artifact() {
        let err = AppraiseError::model_unavailable("models/house_model.json", "not found");
        assert_eq!(
            err.to_string(),
            "Model unavailable at models/house_model.json: not found"
        );
        assert!(!err.is_client_error());
    }

    #[test]
    fn invalid_input_is_a_client_error() {
        let err = AppraiseError::InvalidInput("expected 8 values, got 3".to_string());
        assert!(err.is_client_error());
        assert!(!AppraiseError::Inference("nan".to_string()).is_client_error());
    }
}
