use crate::domain::model::{FontBytes, FontIdentity};
use crate::domain::ports::TypefaceFactory;
use crate::utils::error::{FontError, Result};
use crate::utils::io::{copy_buffered, DEFAULT_BUFFER_SIZE};
use std::sync::Arc;

/// A typeface whose font data is owned in memory, independent of the file it
/// was read from.
#[derive(Debug, Clone)]
pub struct LoadedTypeface {
    pub family: String,
    pub data: Arc<[u8]>,
}

impl LoadedTypeface {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryTypefaceFactory {
    buffer_size: usize,
}

impl InMemoryTypefaceFactory {
    pub fn new(buffer_size: usize) -> Self {
        Self { buffer_size }
    }
}

impl Default for InMemoryTypefaceFactory {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

impl TypefaceFactory for InMemoryTypefaceFactory {
    type Handle = LoadedTypeface;

    async fn construct(&self, identity: &FontIdentity, bytes: &FontBytes) -> Result<LoadedTypeface> {
        let mut file = tokio::fs::File::open(bytes.path())
            .await
            .map_err(|e| FontError::install(identity.as_str(), e))?;

        let capacity = usize::try_from(bytes.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(capacity);
        let copied = copy_buffered(&mut file, &mut data, self.buffer_size)
            .await
            .map_err(|e| FontError::install(identity.as_str(), e))?;

        tracing::debug!("Loaded {} bytes for typeface '{}'", copied, identity);
        Ok(LoadedTypeface {
            family: identity.to_string(),
            data: data.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;

    #[tokio::test]
    async fn test_construct_copies_font_data() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, &[7u8; 9000]).unwrap();
        let bytes = FontBytes::local(file.path().to_path_buf(), 9000);
        let identity = FontIdentity::new("Acme Sans").unwrap();

        let typeface = InMemoryTypefaceFactory::default()
            .construct(&identity, &bytes)
            .await
            .unwrap();

        assert_eq!(typeface.family, "Acme Sans");
        assert_eq!(typeface.len(), 9000);
    }

    #[tokio::test]
    async fn test_missing_file_is_install_failed() {
        let dir = tempfile::TempDir::new().unwrap();
        let bytes = FontBytes::local(dir.path().join("gone.ttf"), 0);
        let identity = FontIdentity::new("Acme Sans").unwrap();

        let err = InMemoryTypefaceFactory::default()
            .construct(&identity, &bytes)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InstallFailed);
    }
}
