use crate::domain::model::{FontBytes, FontSource};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{FontError, Result};
use crate::utils::io::copy_buffered;
use crate::utils::validation::validate_url;
use reqwest::Client;
use std::path::{Component, Path, PathBuf};

const TEMP_FILE_PREFIX: &str = "fontTempFile";

/// Materializes font bytes from a remote URL or the local storage root.
#[derive(Debug, Clone)]
pub struct ByteSourceResolver {
    client: Client,
    storage_root: PathBuf,
    temp_dir: PathBuf,
    buffer_size: usize,
}

impl ByteSourceResolver {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(user_agent) = config.user_agent() {
            builder = builder.user_agent(user_agent.to_string());
        }
        let client = builder
            .build()
            .map_err(|e| FontError::config("network", e.to_string()))?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client<C: ConfigProvider>(client: Client, config: &C) -> Self {
        Self {
            client,
            storage_root: config.storage_root().to_path_buf(),
            temp_dir: config
                .temp_dir()
                .map(Path::to_path_buf)
                .unwrap_or_else(std::env::temp_dir),
            buffer_size: config.buffer_size(),
        }
    }

    pub async fn resolve(&self, source: &FontSource) -> Result<FontBytes> {
        match source {
            FontSource::Remote { url } => self.fetch_remote(url).await,
            FontSource::Local { path } => self.open_local(path).await,
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<FontBytes> {
        let parsed = validate_url("url", url).map_err(|e| FontError::fetch(url, e))?;

        // 下載失敗時 TempPath 被 drop，暫存檔隨之刪除
        let temp = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .tempfile_in(&self.temp_dir)
            .map_err(|e| FontError::fetch(url, e))?;
        let (file, temp_path) = temp.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        tracing::debug!("Fetching font from: {}", url);
        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FontError::fetch(url, e))?;
        tracing::debug!("Font response status: {}", response.status());

        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(|e| FontError::fetch(url, e))? {
            written += copy_buffered(&mut chunk.as_ref(), &mut file, self.buffer_size)
                .await
                .map_err(|e| FontError::fetch(url, e))?;
        }
        drop(file);

        tracing::debug!("Downloaded {} bytes to {}", written, temp_path.display());
        Ok(FontBytes::temporary(temp_path, written))
    }

    async fn open_local(&self, path: &str) -> Result<FontBytes> {
        let full_path = self
            .resolve_local_path(path)
            .ok_or_else(|| FontError::NotFound {
                path: PathBuf::from(path),
            })?;

        match tokio::fs::metadata(&full_path).await {
            Ok(meta) if meta.is_file() => {
                tracing::debug!("Using local font file: {}", full_path.display());
                Ok(FontBytes::local(full_path, meta.len()))
            }
            Ok(_) => Err(FontError::NotFound { path: full_path }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FontError::NotFound { path: full_path })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Joins `path` onto the storage root. Absolute paths are taken relative
    /// to the root; paths that climb out of it resolve to nothing.
    pub fn resolve_local_path(&self, path: &str) -> Option<PathBuf> {
        let mut relative = PathBuf::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
                Component::ParentDir => return None,
            }
        }

        if relative.as_os_str().is_empty() {
            return None;
        }
        Some(self.storage_root.join(relative))
    }
}
