use crate::domain::ports::ConfigProvider;
use crate::utils::error::{FontError, Result};
use crate::utils::io::DEFAULT_BUFFER_SIZE;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrarConfig {
    pub storage: StorageConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Application-private directory that local font paths resolve against.
    pub root: PathBuf,
    /// Where remote downloads are staged; defaults to the OS temp directory.
    pub temp_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./fonts"),
            temp_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub user_agent: Option<String>,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl RegistrarConfig {
    pub fn with_storage_root(root: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig {
                root: root.into(),
                temp_dir: None,
            },
            ..Default::default()
        }
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.storage.temp_dir = Some(temp_dir.into());
        self
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            FontError::config(
                "config_file",
                format!("cannot read {}: {}", path.as_ref().display(), e),
            )
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content)
            .map_err(|e| FontError::config("toml_parsing", format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${FONT_ROOT})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn json_logging(&self) -> bool {
        self.logging.format == "json"
    }
}

impl ConfigProvider for RegistrarConfig {
    fn storage_root(&self) -> &Path {
        &self.storage.root
    }

    fn temp_dir(&self) -> Option<&Path> {
        self.storage.temp_dir.as_deref()
    }

    fn buffer_size(&self) -> usize {
        self.network.buffer_size
    }

    fn user_agent(&self) -> Option<&str> {
        self.network.user_agent.as_deref()
    }
}

impl Validate for RegistrarConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("storage.root", &self.storage.root.to_string_lossy())?;
        if let Some(temp_dir) = &self.storage.temp_dir {
            validation::validate_path("storage.temp_dir", &temp_dir.to_string_lossy())?;
        }
        if let Some(user_agent) = &self.network.user_agent {
            validation::validate_non_empty_string("network.user_agent", user_agent)?;
        }
        validation::validate_positive_number("network.buffer_size", self.network.buffer_size, 1)?;
        validation::validate_one_of(
            "logging.level",
            &self.logging.level,
            &["trace", "debug", "info", "warn", "error"],
        )?;
        validation::validate_one_of("logging.format", &self.logging.format, &["compact", "json"])?;
        Ok(())
    }
}
