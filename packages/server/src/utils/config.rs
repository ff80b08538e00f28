use log::LevelFilter;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::models::config::parse_var;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub data_dir: PathBuf,
    pub log_level: LevelFilter,
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            store: StoreBackend::Memory,
            data_dir: PathBuf::from("./data"),
            log_level: LevelFilter::Debug,
            cors_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl ServerConfig {
    /// ロガー初期化前に読むので警告は出さない
    pub fn log_level_from_env() -> LevelFilter {
        env::var("MAFIA_LOG_LEVEL")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(Self::default().log_level)
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        let store = match env::var("MAFIA_STORE").as_deref() {
            Ok("file") => StoreBackend::File,
            Ok("memory") | Err(_) => StoreBackend::Memory,
            Ok(other) => {
                tracing::warn!("unknown MAFIA_STORE {:?}, using memory", other);
                StoreBackend::Memory
            }
        };

        Self {
            bind_addr: parse_var("MAFIA_BIND_ADDR").unwrap_or(defaults.bind_addr),
            store,
            data_dir: env::var("MAFIA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            log_level: parse_var("MAFIA_LOG_LEVEL").unwrap_or(defaults.log_level),
            cors_origin: env::var("MAFIA_CORS_ORIGIN").unwrap_or(defaults.cors_origin),
        }
    }
}
