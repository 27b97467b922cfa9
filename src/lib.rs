pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{FileDisplayNameResolver, InMemoryTypefaceFactory, LoadedTypeface};
pub use config::RegistrarConfig;
pub use crate::core::{
    bridge::{BridgeReply, FontBridge},
    installer::FontInstaller,
    registry::TypefaceRegistry,
    resolver::ByteSourceResolver,
};
pub use domain::model::{FontBytes, FontIdentity, FontSource, InstallOutcome, TypefaceEntry};
pub use utils::error::{ErrorKind, FontError, Result};
