//! Configuration module for the audit backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Which blob store implementation backs the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Amazon S3 in the configured region
    S3,
    /// Local directory per bucket
    Fs,
    /// Process memory; nothing survives a restart
    Memory,
}

impl StoreBackend {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "s3" => Some(StoreBackend::S3),
            "fs" | "file" | "filesystem" => Some(StoreBackend::Fs),
            "memory" | "mem" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Target storage region
    pub region: Option<String>,
    /// Blob store backend
    pub store_backend: StoreBackend,
    /// Root directory for the filesystem backend
    pub data_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let region = env::var("AUDIT_REGION")
            .or_else(|_| env::var("AWS_DEFAULT_REGION"))
            .ok()
            .filter(|r| !r.is_empty());

        let store_backend = env::var("AUDIT_STORE")
            .map(|s| {
                StoreBackend::from_str(&s).expect("Invalid AUDIT_STORE, expected s3, fs or memory")
            })
            .unwrap_or(StoreBackend::S3);

        let data_dir = env::var("AUDIT_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let bind_addr = env::var("AUDIT_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid AUDIT_BIND_ADDR format");

        let log_level = env::var("AUDIT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            region,
            store_backend,
            data_dir,
            bind_addr,
            log_level,
        }
    }
}
