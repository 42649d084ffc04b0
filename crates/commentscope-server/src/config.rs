//! Server configuration

use commentscope_classifiers::{AnalyzerConfig, ModelSpec};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::cli::{Cli, ServeArgs};

/// Server configuration
///
/// Read from YAML when the file exists, otherwise defaults, then overridden
/// by command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Allow cross-origin requests from any origin
    #[serde(default = "default_true")]
    pub cors_permissive: bool,

    /// Analysis pipeline settings
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli, serve: Option<&ServeArgs>) -> anyhow::Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        if !cli.models.is_empty() {
            config.analyzer.models = cli
                .models
                .iter()
                .map(|repo| ModelSpec::huggingface(repo.clone()))
                .collect();
        }

        if let Some(serve) = serve {
            if let Some(listen) = &serve.listen {
                config.listen = listen.clone();
            }
            if let Some(port) = serve.port {
                config.port = port;
            }
        }

        config.analyzer.validate()?;
        Ok(config)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.listen, self.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            cors_permissive: true,
            analyzer: AnalyzerConfig::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_true() -> bool {
    true
}
