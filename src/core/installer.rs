use crate::core::registry::TypefaceRegistry;
use crate::core::resolver::ByteSourceResolver;
use crate::core::validator;
use crate::domain::model::{FontBytes, FontIdentity, FontSource, InstallOutcome};
use crate::domain::ports::TypefaceFactory;
use crate::utils::error::{FontError, Result};
use std::sync::Arc;

/// Fetches, validates and registers fonts.
///
/// Every call owns the bytes it resolves; temporary downloads are deleted
/// before the call returns, whatever the outcome.
pub struct FontInstaller<F: TypefaceFactory> {
    resolver: ByteSourceResolver,
    registry: Arc<TypefaceRegistry<F::Handle>>,
    factory: F,
}

impl<F: TypefaceFactory> FontInstaller<F> {
    pub fn new(
        resolver: ByteSourceResolver,
        registry: Arc<TypefaceRegistry<F::Handle>>,
        factory: F,
    ) -> Self {
        Self {
            resolver,
            registry,
            factory,
        }
    }

    pub fn registry(&self) -> &Arc<TypefaceRegistry<F::Handle>> {
        &self.registry
    }

    pub async fn install_from_url(&self, url: &str) -> Result<FontIdentity> {
        self.install(FontSource::Remote {
            url: url.to_string(),
        })
        .await
    }

    pub async fn install_from_local_path(&self, path: &str) -> Result<FontIdentity> {
        self.install(FontSource::Local {
            path: path.to_string(),
        })
        .await
    }

    pub async fn install(&self, source: FontSource) -> Result<FontIdentity> {
        tracing::debug!("Installing font from {}", source);

        let bytes = self.resolver.resolve(&source).await.inspect_err(|e| {
            tracing::warn!("Could not resolve {}: {}", source, e);
        })?;

        let result = self.register(&bytes).await;

        if let Err(e) = bytes.release() {
            tracing::warn!("Failed to remove temporary font file: {}", e);
        }

        match &result {
            Ok(identity) => tracing::info!("Font '{}' ready ({})", identity, source),
            Err(e) => tracing::warn!("Font install from {} failed: {}", source, e),
        }
        result
    }

    async fn register(&self, bytes: &FontBytes) -> Result<FontIdentity> {
        let identity = validator::identify(bytes).await?;
        tracing::debug!(
            "Extracted font identity '{}' from {} bytes",
            identity,
            bytes.len()
        );

        let (_, outcome) = self
            .registry
            .install_or_reuse(&identity, || async {
                self.factory
                    .construct(&identity, bytes)
                    .await
                    .map_err(|e| match e {
                        FontError::InstallFailed { .. } => e,
                        other => FontError::install(identity.as_str(), other),
                    })
            })
            .await?;

        if outcome == InstallOutcome::Reused {
            tracing::debug!("Reusing installed typeface '{}'", identity);
        }
        Ok(identity)
    }
}
