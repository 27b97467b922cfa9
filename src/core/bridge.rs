use crate::core::installer::FontInstaller;
use crate::domain::ports::{DisplayNameResolver, TypefaceFactory};
use crate::utils::error::{ErrorKind, Result};
use serde::Serialize;
use std::sync::Arc;

/// Host-facing command surface. Each command resolves to a string or one
/// error kind.
pub struct FontBridge<F: TypefaceFactory> {
    installer: Arc<FontInstaller<F>>,
    names: Arc<dyn DisplayNameResolver>,
}

impl<F: TypefaceFactory> Clone for FontBridge<F> {
    fn clone(&self) -> Self {
        Self {
            installer: Arc::clone(&self.installer),
            names: Arc::clone(&self.names),
        }
    }
}

impl<F: TypefaceFactory> FontBridge<F> {
    pub fn new(installer: Arc<FontInstaller<F>>, names: Arc<dyn DisplayNameResolver>) -> Self {
        Self { installer, names }
    }

    pub fn installer(&self) -> &Arc<FontInstaller<F>> {
        &self.installer
    }

    pub async fn create_font_with_url(&self, url: &str) -> Result<String> {
        self.installer
            .install_from_url(url)
            .await
            .map(|identity| identity.into_string())
    }

    pub async fn create_font_with_local_file(&self, path: &str) -> Result<String> {
        self.installer
            .install_from_local_path(path)
            .await
            .map(|identity| identity.into_string())
    }

    pub async fn get_file_path(&self, uri: &str) -> Result<String> {
        self.names.display_name(uri).await
    }
}

/// Serializable outcome of one bridge command.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BridgeReply {
    Resolved {
        command: String,
        argument: String,
        value: String,
    },
    Rejected {
        command: String,
        argument: String,
        kind: ErrorKind,
        message: String,
    },
}

impl BridgeReply {
    pub fn from_result(command: &str, argument: &str, result: Result<String>) -> Self {
        match result {
            Ok(value) => BridgeReply::Resolved {
                command: command.to_string(),
                argument: argument.to_string(),
                value,
            },
            Err(e) => BridgeReply::Rejected {
                command: command.to_string(),
                argument: argument.to_string(),
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, BridgeReply::Resolved { .. })
    }
}
