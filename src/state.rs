// src/state.rs

use crate::{config::Config, utils::uploads::UploadStore};
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let uploads = UploadStore::new(&config.upload_dir);
        Self {
            pool,
            config,
            uploads,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for UploadStore {
    fn from_ref(state: &AppState) -> Self {
        state.uploads.clone()
    }
}
