use thiserror::Error;

/// Application-wide error types for clipmark.
#[derive(Error, Debug)]
pub enum AppError {
    /// A trigger pattern failed to compile as a regex.
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    /// A trigger referenced a category filter that does not exist.
    #[error("unknown category filter '@{0}'")]
    UnknownCategory(String),

    /// Two templates in the catalog share a name.
    #[error("duplicate template name '{0}'")]
    DuplicateTemplate(String),

    /// Rate-limit interval is negative or not finite.
    #[error("invalid rate-limit interval: {0} seconds")]
    InvalidInterval(f64),

    /// Other configuration problem (bad config file, bad rule table).
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed (non-2xx response or protocol error).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timed out.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// Content extraction failed after a successful fetch.
    #[error("extraction error: {0}")]
    ExtractError(String),

    /// Extraction produced no usable body content.
    #[error("no content extracted from {0}")]
    EmptyContent(String),

    /// JSON serialization/deserialization failed.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Returns true for errors that must abort before any URL is processed.
    ///
    /// Per-job extraction failures are recorded and the batch continues;
    /// configuration errors are fatal at startup.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            AppError::InvalidRegex { .. }
                | AppError::UnknownCategory(_)
                | AppError::DuplicateTemplate(_)
                | AppError::InvalidInterval(_)
                | AppError::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_fatal() {
        assert!(
            AppError::InvalidRegex {
                pattern: "[".into(),
                reason: "unclosed".into(),
            }
            .is_config()
        );
        assert!(AppError::UnknownCategory("nope".into()).is_config());
        assert!(AppError::DuplicateTemplate("github".into()).is_config());
        assert!(AppError::InvalidInterval(-1.0).is_config());
    }

    #[test]
    fn extraction_errors_are_not_fatal() {
        assert!(!AppError::HttpError("HTTP 404".into()).is_config());
        assert!(!AppError::Timeout(30).is_config());
        assert!(!AppError::EmptyContent("https://example.com".into()).is_config());
    }

    #[test]
    fn unknown_category_names_the_rule() {
        let err = AppError::UnknownCategory("scitech".into());
        assert_eq!(err.to_string(), "unknown category filter '@scitech'");
    }
}
