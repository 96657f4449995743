use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SongFinderError {
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request timeout for URL: {0}")]
    RequestTimeout(String),

    #[error("HTTP error {status} for URL: {url}")]
    HttpError { status: u16, url: String },

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid header value: {0}")]
    HeaderError(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("Video unavailable: {0}")]
    VideoUnavailable(String),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("No audio-only stream available for: {0}")]
    NoStreamAvailable(String),

    #[error("Stream unavailable: {0}")]
    StreamUnavailable(String),

    #[error("Acquisition failed: {0}")]
    AcquisitionFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("{operation} `{query}` on platform `{platform}` failed: {source}")]
    Request {
        operation: &'static str,
        query: String,
        platform: String,
        #[source]
        source: Box<SongFinderError>,
    },
}

/// Coarse failure classes a caller can map to its own responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownPlatform,
    InvalidLocator,
    Upstream,
    NoStreamAvailable,
    StreamUnavailable,
    AcquisitionFailed,
    Storage,
    Configuration,
}

impl ErrorKind {
    /// Whether a fresh attempt by the caller may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, ErrorKind::Upstream | ErrorKind::StreamUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnknownPlatform => "unknown platform",
            ErrorKind::InvalidLocator => "invalid locator",
            ErrorKind::Upstream => "upstream",
            ErrorKind::NoStreamAvailable => "no stream available",
            ErrorKind::StreamUnavailable => "stream unavailable",
            ErrorKind::AcquisitionFailed => "acquisition failed",
            ErrorKind::Storage => "storage",
            ErrorKind::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

impl SongFinderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SongFinderError::NetworkError(_)
            | SongFinderError::RequestTimeout(_)
            | SongFinderError::HttpError { .. }
            | SongFinderError::JsonError(_)
            | SongFinderError::HeaderError(_)
            | SongFinderError::InvalidResponse(_)
            | SongFinderError::VideoUnavailable(_) => ErrorKind::Upstream,
            SongFinderError::UnknownPlatform(_) => ErrorKind::UnknownPlatform,
            SongFinderError::InvalidLocator(_) => ErrorKind::InvalidLocator,
            SongFinderError::NoStreamAvailable(_) => ErrorKind::NoStreamAvailable,
            SongFinderError::StreamUnavailable(_) => ErrorKind::StreamUnavailable,
            SongFinderError::AcquisitionFailed(_) => ErrorKind::AcquisitionFailed,
            SongFinderError::IoError(_) => ErrorKind::Storage,
            SongFinderError::ConfigError(_) => ErrorKind::Configuration,
            SongFinderError::Request { source, .. } => source.kind(),
        }
    }

    /// Attach the request that produced this error. The kind is preserved.
    pub fn with_request(
        self,
        operation: &'static str,
        query: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        SongFinderError::Request {
            operation,
            query: query.into(),
            platform: platform.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SongFinderError>;
