#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};

#[cfg(feature = "cli")]
use crate::utils::error::Result;

/// 讀取設定檔（若有）並套用命令列覆寫
#[cfg(feature = "cli")]
pub fn load_config(cli: &CliConfig) -> Result<TomlConfig> {
    let mut config = match &cli.config {
        Some(path) => TomlConfig::from_file(path)?,
        None => TomlConfig::default(),
    };

    if let Some(db) = &cli.db {
        config.store = Some(toml_config::StoreConfig { path: db.clone() });
    }
    if let Some(server) = &cli.server {
        config.server = Some(toml_config::ServerConfig {
            base_url: server.clone(),
        });
    }
    if let Command::Ingest { sync, endpoint, .. } = &cli.command {
        if *sync || endpoint.is_some() {
            let timeout_seconds = config.sync.as_ref().and_then(|s| s.timeout_seconds);
            let file_endpoint = config.sync.as_ref().and_then(|s| s.endpoint.clone());
            config.sync = Some(toml_config::SyncConfig {
                enabled: true,
                endpoint: endpoint.clone().or(file_endpoint),
                timeout_seconds,
            });
        }
    }

    Ok(config)
}
