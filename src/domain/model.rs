use crate::utils::error::{FontError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempPath;

/// Where the bytes of a font come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FontSource {
    Remote { url: String },
    Local { path: String },
}

impl FontSource {
    /// `http://` and `https://` locations are remote, anything else is a
    /// path under the storage root.
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            FontSource::Remote {
                url: location.to_string(),
            }
        } else {
            FontSource::Local {
                path: location.to_string(),
            }
        }
    }
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSource::Remote { url } => write!(f, "remote:{}", url),
            FontSource::Local { path } => write!(f, "local:{}", path),
        }
    }
}

/// Name extracted from a font's own `name` table. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FontIdentity(String);

impl FontIdentity {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim_matches(|c: char| c.is_whitespace() || c == '\0');
        if trimmed.is_empty() {
            return Err(FontError::malformed("font name is empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for FontIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for FontIdentity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FontIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Font bytes materialized on storage for the duration of one acquisition.
///
/// Remote downloads own their temporary file; dropping the value deletes it.
#[derive(Debug)]
pub struct FontBytes {
    path: PathBuf,
    len: u64,
    temp: Option<TempPath>,
}

impl FontBytes {
    pub fn temporary(temp: TempPath, len: u64) -> Self {
        Self {
            path: temp.to_path_buf(),
            len,
            temp: Some(temp),
        }
    }

    pub fn local(path: PathBuf, len: u64) -> Self {
        Self {
            path,
            len,
            temp: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    pub fn open(&self) -> std::io::Result<std::fs::File> {
        std::fs::File::open(&self.path)
    }

    /// Deletes the temporary file now, reporting failures instead of
    /// ignoring them as `Drop` does.
    pub fn release(mut self) -> std::io::Result<()> {
        match self.temp.take() {
            Some(temp) => temp.close(),
            None => Ok(()),
        }
    }
}

/// An installed typeface, shared by every caller that asks for its identity.
#[derive(Debug)]
pub struct TypefaceEntry<H> {
    pub identity: FontIdentity,
    pub handle: Arc<H>,
    pub installed_at: DateTime<Utc>,
}

impl<H> Clone for TypefaceEntry<H> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            handle: Arc::clone(&self.handle),
            installed_at: self.installed_at,
        }
    }
}

impl<H> TypefaceEntry<H> {
    pub fn new(identity: FontIdentity, handle: H) -> Self {
        Self {
            identity,
            handle: Arc::new(handle),
            installed_at: Utc::now(),
        }
    }

    /// True when both entries point at the same installed handle.
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }
}

/// Whether `install_or_reuse` ran the materializer or reused an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    Reused,
}
