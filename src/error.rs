//! Error types for the postcard service.

/// Top-level error type for the submission pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Quota error: {0}")]
    Quota(#[from] QuotaError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Rendering error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Request validation errors. Always user-facing; name the offending field.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Either 'message' or 'backImage' must be provided")]
    MissingBackContent,

    #[error("Field '{field}' is not valid base64: {reason}")]
    InvalidEncoding { field: &'static str, reason: String },

    #[error("Field '{field}' decodes to {size} bytes, maximum is {max} bytes")]
    ImageTooLarge {
        field: &'static str,
        size: usize,
        max: usize,
    },

    #[error("recipientOverride must include name, street, city, postalCode and country")]
    PartialRecipient,

    #[error("Recipient override required but not provided")]
    MissingRecipient,
}

/// Quota admission errors.
#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    #[error("Send limit reached: {sent} of {max}")]
    LimitReached { sent: u32, max: u32 },

    #[error("This access code has already been used")]
    CodeAlreadyUsed,
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Print provider errors, split by fault domain so callers can tell
/// "provider unreachable" apart from "provider rejected the content".
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    #[error("Provider returned an unparseable response (status {status}): {snippet}")]
    MalformedResponse { status: u16, snippet: String },

    #[error("Provider rejected the postcard (status {status}): {detail}")]
    Rejected { status: u16, detail: String },
}

/// Back-side artifact rendering errors.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Markup rendering failed: {0}")]
    Markup(String),

    #[error("Document rendering failed: {0}")]
    Document(String),

    #[error("Raster encoding failed: {0}")]
    Raster(String),
}

impl Error {
    /// HTTP status code for the caller-facing envelope.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Quota(_) => 403,
            Error::Config(_) => 500,
            // Content-level rejection is the caller's fault; transport faults
            // and garbage bodies are the upstream's.
            Error::Provider(ProviderError::Rejected { .. }) => 400,
            Error::Provider(_) => 502,
            Error::Artifact(_) | Error::Internal(_) => 500,
        }
    }
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_per_taxonomy() {
        assert_eq!(
            Error::Validation(ValidationError::MissingField("frontImage")).status_code(),
            400
        );
        assert_eq!(
            Error::Quota(QuotaError::LimitReached { sent: 300, max: 300 }).status_code(),
            403
        );
        assert_eq!(Error::Quota(QuotaError::CodeAlreadyUsed).status_code(), 403);
        assert_eq!(
            Error::Config(ConfigError::MissingEnvVar("CARTERO_API_KEY".into())).status_code(),
            500
        );
        assert_eq!(
            Error::Provider(ProviderError::Unreachable("timed out".into())).status_code(),
            502
        );
        assert_eq!(
            Error::Provider(ProviderError::MalformedResponse {
                status: 200,
                snippet: "<html>".into()
            })
            .status_code(),
            502
        );
        assert_eq!(
            Error::Provider(ProviderError::Rejected {
                status: 400,
                detail: "bad recipient".into()
            })
            .status_code(),
            400
        );
        assert_eq!(Error::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_validation_error_names_field() {
        let err = ValidationError::MissingField("frontImage");
        assert!(err.to_string().contains("frontImage"));
    }
}
