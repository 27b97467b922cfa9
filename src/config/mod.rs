pub mod toml_config;

pub use toml_config::RegistrarConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "font-registrar")]
#[command(about = "Install fonts from URLs or local storage into a typeface registry")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override storage.root from config
    #[arg(long)]
    pub storage_root: Option<PathBuf>,

    /// Override storage.temp_dir from config
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Print one JSON reply per command")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Install fonts concurrently; http(s) URLs are downloaded, anything else
    /// is read from the storage root
    Install {
        #[arg(required = true)]
        sources: Vec<String>,
    },
    /// Resolve the display name of a file URI
    DisplayName { uri: String },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML config (or defaults) and applies command-line overrides.
    pub fn load_config(&self) -> Result<RegistrarConfig> {
        let mut config = match &self.config {
            Some(path) => RegistrarConfig::from_file(path)?,
            None => RegistrarConfig::default(),
        };

        if let Some(root) = &self.storage_root {
            config.storage.root = root.clone();
        }
        if let Some(temp_dir) = &self.temp_dir {
            config.storage.temp_dir = Some(temp_dir.clone());
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }

        Ok(config)
    }
}
