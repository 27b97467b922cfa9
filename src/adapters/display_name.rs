use crate::domain::ports::DisplayNameResolver;
use crate::utils::error::{FontError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;

/// Resolves display names for `file://` URIs and plain paths.
///
/// Other URI schemes need a platform content resolver and yield an empty
/// name.
#[derive(Debug, Clone, Default)]
pub struct FileDisplayNameResolver;

fn file_name(path: &Path, uri: &str) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| FontError::NotFound {
            path: PathBuf::from(uri),
        })
}

#[async_trait]
impl DisplayNameResolver for FileDisplayNameResolver {
    async fn display_name(&self, uri: &str) -> Result<String> {
        match Url::parse(uri) {
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|_| FontError::NotFound {
                    path: PathBuf::from(uri),
                })?;
                file_name(&path, uri)
            }
            // single-letter schemes are Windows drive letters
            Ok(url) if url.scheme().len() > 1 => {
                tracing::debug!("No display name resolver for scheme '{}'", url.scheme());
                Ok(String::new())
            }
            Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => file_name(Path::new(uri), uri),
            Err(_) => Err(FontError::NotFound {
                path: PathBuf::from(uri),
            }),
        }
    }
}
