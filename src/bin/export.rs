// src/bin/export.rs

//! Writes the read API as static JSON files for a server-less deployment.

use std::path::Path;

use exam_archive::{config::Config, db, export::export_static};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.rust_log))
        .with_target(false)
        .init();

    let pool = match db::init(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to open database {}: {:?}", config.database_url, e);
            std::process::exit(1);
        }
    };

    let out_dir = Path::new(&config.export_dir);
    tracing::info!("Exporting to {}", out_dir.display());

    if let Err(e) = export_static(&pool, out_dir).await {
        tracing::error!("Export failed: {}", e);
        std::process::exit(1);
    }
}
