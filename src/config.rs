// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Default request body limit for upload routes (50 MiB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub upload_dir: String,
    pub export_dir: String,
    pub bind_addr: String,
    pub port: u16,
    pub rust_log: String,
    /// Mount only the GET routes (mirrors the static deployment).
    pub read_only: bool,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://archive.db".to_string());

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let export_dir = env::var("EXPORT_DIR").unwrap_or_else(|_| "dist/api".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let read_only = env::var("READ_ONLY")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Self {
            database_url,
            upload_dir,
            export_dir,
            bind_addr,
            port,
            rust_log,
            read_only,
            max_upload_bytes,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
