use crate::domain::model::{FontBytes, FontIdentity};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Turns validated font bytes into a renderable typeface handle.
pub trait TypefaceFactory: Send + Sync {
    type Handle: Send + Sync + 'static;

    fn construct(
        &self,
        identity: &FontIdentity,
        bytes: &FontBytes,
    ) -> impl std::future::Future<Output = Result<Self::Handle>> + Send;
}

/// Resolves a user-picked file reference to a human-readable name.
#[async_trait]
pub trait DisplayNameResolver: Send + Sync {
    async fn display_name(&self, uri: &str) -> Result<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn storage_root(&self) -> &Path;
    fn temp_dir(&self) -> Option<&Path>;
    fn buffer_size(&self) -> usize;
    fn user_agent(&self) -> Option<&str>;
}
