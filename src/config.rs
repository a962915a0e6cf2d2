use crate::error::{Result, ShelfError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Port the server binds when nothing else is configured.
pub const DEFAULT_PORT: u16 = 4000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShelfConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub schema: SchemaSettings,

    #[serde(default)]
    pub data: DataSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on a buffered `POST /graphql` body.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Deadline for one pipeline run. Only resolvers that await can be cut short.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSettings {
    /// Deepest selection nesting accepted before validation rejects a query.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    16
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSettings {
    /// JSON dataset to serve instead of the built-in one.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl ShelfConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ShelfError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config: ShelfConfig = toml::from_str(&content)?;

        // Relative dataset paths are resolved against the config file's directory.
        if let Some(data_path) = config.data.path.take() {
            let resolved = match path.parent() {
                Some(dir) if data_path.is_relative() => dir.join(data_path),
                _ => data_path,
            };
            config.data.path = Some(resolved);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.max_body_bytes == 0 {
            return Err(ShelfError::Config(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.server.request_timeout_ms == 0 {
            return Err(ShelfError::Config(
                "server.request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.schema.max_depth == 0 {
            return Err(ShelfError::Config(
                "schema.max_depth must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
