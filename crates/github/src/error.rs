//! Error types for the GitHub client

use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// GitHub client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Host could not be reached
    #[error("No internet connection")]
    Offline,

    /// Request timed out
    #[error("Connection timed out")]
    Timeout,

    /// API returned an error response
    #[error("GitHub API error {status}: {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Server-provided message, or the status reason when absent
        message: String,
    },

    /// No release asset matched the filter
    #[error("No release asset matches filter '{filter}'")]
    NoMatchingAsset {
        /// The filter that failed to match
        filter: String,
    },

    /// File I/O failed while writing a download
    #[error("Download I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Fold reqwest transport failures into the connectivity taxonomy
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Offline
        } else {
            Self::Request(err)
        }
    }
}

impl From<ApiError> for apkgit_core::Error {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Offline => apkgit_core::Error::offline(),
            ApiError::Timeout => apkgit_core::Error::timeout("Connection timed out"),
            ApiError::NoMatchingAsset { filter } => {
                apkgit_core::Error::no_matching_asset(&filter)
            }
            ApiError::ApiResponse { .. } => apkgit_core::Error::api(err.to_string()),
            other => apkgit_core::Error::network(other.to_string()),
        }
    }
}
