//! Error types for the Scribe pipeline.
//!
//! Errors are organized by stage so every failure names the file or service
//! involved. Configuration and input errors are fatal for a run; vision and
//! generation errors are per-image and subject to the batch failure policy.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Scribe operations.
#[derive(Error, Debug)]
pub enum ScribeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input discovery errors
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Image analysis service errors
    #[error("Vision service error: {0}")]
    Vision(#[from] VisionServiceError),

    /// Text generation service errors
    #[error("Generation service error: {0}")]
    Generation(#[from] GenerationServiceError),

    /// Writing a processing record failed
    #[error("Failed to write output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file does not exist
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse JSON configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration values are missing or invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Refused to overwrite an existing file with the template
    #[error("Config file already exists: {0}")]
    TemplateExists(PathBuf),
}

/// Errors raised while resolving the images to process.
#[derive(Error, Debug)]
pub enum InputError {
    /// Path does not exist
    #[error("No such file or directory: {0}")]
    NotFound(PathBuf),

    /// `--image` points at something other than a regular file
    #[error("Not a file: {0}")]
    NotAFile(PathBuf),

    /// Input directory points at something other than a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// File extension is not a supported image format
    #[error("Unsupported image format for {path}: {extension}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Path cannot be stored in a UTF-8 JSON record
    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    /// Directory contains no supported images
    #[error("No supported images found in {0}")]
    NoImages(PathBuf),

    /// Directory listing failed
    #[error("Cannot read {path}: {message}")]
    Unreadable { path: PathBuf, message: String },
}

/// Failures from the image analysis service.
#[derive(Error, Debug)]
pub enum VisionServiceError {
    /// Image bytes could not be read from disk
    #[error("Failed to read image {path}: {source}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport-level failure (DNS, connect, timeout)
    #[error("Request failed for {path}: {message}")]
    Request { path: PathBuf, message: String },

    /// The service answered with a non-success HTTP status
    #[error("HTTP {status_code} for {path}: {body}")]
    Http {
        path: PathBuf,
        status_code: u16,
        body: String,
    },

    /// The response body could not be decoded
    #[error("Invalid response for {path}: {message}")]
    InvalidResponse { path: PathBuf, message: String },
}

/// Failures from the text generation service.
#[derive(Error, Debug)]
pub enum GenerationServiceError {
    /// Transport-level failure (DNS, connect, timeout)
    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with a non-success HTTP status
    #[error("HTTP {status_code}: {body}")]
    Http { status_code: u16, body: String },

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The completion carried no text
    #[error("Deployment returned no completion text")]
    EmptyCompletion,
}

/// Coarse classification of a service failure, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 401 / 403
    Auth,
    /// 429
    Quota,
    /// Connection problems, timeouts, 5xx
    Network,
    /// Anything the caller sent that the service refused (other 4xx)
    Rejected,
    /// Local problem (unreadable file, undecodable response)
    Local,
}

impl FailureKind {
    fn from_status(status_code: u16) -> Self {
        match status_code {
            401 | 403 => Self::Auth,
            429 => Self::Quota,
            500..=599 => Self::Network,
            _ => Self::Rejected,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Auth => write!(f, "authentication"),
            FailureKind::Quota => write!(f, "quota"),
            FailureKind::Network => write!(f, "network"),
            FailureKind::Rejected => write!(f, "rejected"),
            FailureKind::Local => write!(f, "local"),
        }
    }
}

impl VisionServiceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ReadImage { .. } | Self::InvalidResponse { .. } => FailureKind::Local,
            Self::Request { .. } => FailureKind::Network,
            Self::Http { status_code, .. } => FailureKind::from_status(*status_code),
        }
    }
}

impl GenerationServiceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidResponse(_) | Self::EmptyCompletion => FailureKind::Local,
            Self::Request(_) => FailureKind::Network,
            Self::Http { status_code, .. } => FailureKind::from_status(*status_code),
        }
    }
}

impl ScribeError {
    /// True for errors that stop a run regardless of the failure policy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Input(_))
    }
}

/// Convenience type alias for Scribe results.
pub type Result<T> = std::result::Result<T, ScribeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vision_http_kind() {
        let err = VisionServiceError::Http {
            path: PathBuf::from("cat.jpg"),
            status_code: 401,
            body: "Access denied".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::Auth);
        assert!(err.to_string().contains("HTTP 401"));
        assert!(err.to_string().contains("cat.jpg"));
    }

    #[test]
    fn test_generation_quota_kind() {
        let err = GenerationServiceError::Http {
            status_code: 429,
            body: "rate limit".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::Quota);
    }

    #[test]
    fn test_server_error_is_network() {
        let err = GenerationServiceError::Http {
            status_code: 503,
            body: String::new(),
        };
        assert_eq!(err.kind(), FailureKind::Network);
        assert_eq!(
            GenerationServiceError::Request("connection refused".into()).kind(),
            FailureKind::Network
        );
    }

    #[test]
    fn test_local_kinds() {
        assert_eq!(
            GenerationServiceError::EmptyCompletion.kind(),
            FailureKind::Local
        );
        let err = VisionServiceError::InvalidResponse {
            path: PathBuf::from("a.png"),
            message: "expected value".into(),
        };
        assert_eq!(err.kind(), FailureKind::Local);
    }

    #[test]
    fn test_fatal_classification() {
        let input: ScribeError = InputError::NoImages(PathBuf::from("input")).into();
        assert!(input.is_fatal());
        let config: ScribeError = ConfigError::ValidationError("x".into()).into();
        assert!(config.is_fatal());
        let generation: ScribeError = GenerationServiceError::EmptyCompletion.into();
        assert!(!generation.is_fatal());
    }
}
