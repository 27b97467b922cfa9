use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Closed set of failure kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    FetchFailed,
    NotFound,
    MalformedFont,
    InstallFailed,
    Io,
    Config,
}

#[derive(Error, Debug, Clone)]
pub enum FontError {
    #[error("Failed to fetch font from {url}: {message}")]
    FetchFailed { url: String, message: String },

    #[error("Font file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Malformed font: {reason}")]
    MalformedFont { reason: String },

    #[error("Typeface installation failed for '{family}': {message}")]
    InstallFailed { family: String, message: String },

    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Configuration error in {field}: {message}")]
    Config { field: String, message: String },
}

impl FontError {
    pub fn fetch(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        FontError::FetchFailed {
            url: url.into(),
            message: err.to_string(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        FontError::MalformedFont {
            reason: reason.into(),
        }
    }

    pub fn install(family: impl Into<String>, err: impl std::fmt::Display) -> Self {
        FontError::InstallFailed {
            family: family.into(),
            message: err.to_string(),
        }
    }

    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        FontError::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FontError::FetchFailed { .. } => ErrorKind::FetchFailed,
            FontError::NotFound { .. } => ErrorKind::NotFound,
            FontError::MalformedFont { .. } => ErrorKind::MalformedFont,
            FontError::InstallFailed { .. } => ErrorKind::InstallFailed,
            FontError::Io(_) => ErrorKind::Io,
            FontError::Config { .. } => ErrorKind::Config,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::FetchFailed => "Check the URL and network connectivity, then try again",
            ErrorKind::NotFound => "Make sure the file exists under the storage root",
            ErrorKind::MalformedFont => "Use a valid TrueType/OpenType font with a full name entry",
            ErrorKind::InstallFailed => "The font was valid; retrying the install may succeed",
            ErrorKind::Io => "Check file permissions and available disk space",
            ErrorKind::Config => "Fix the configuration value and restart",
        }
    }
}

impl From<std::io::Error> for FontError {
    fn from(err: std::io::Error) -> Self {
        FontError::Io(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, FontError>;
