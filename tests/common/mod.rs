// tests/common/mod.rs

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use exam_archive::{config::Config, db, routes, state::AppState};
use reqwest::multipart::{Form, Part};
use sqlx::SqlitePool;

/// A running server on a random port backed by a fresh SQLite file and upload directory.
pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub root: PathBuf,
    pub upload_dir: PathBuf,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    /// Files currently stored in the upload directory.
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(&self.upload_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Disk path of a `/uploads/<name>` path returned by the API.
    pub fn upload_path(&self, public_path: &str) -> PathBuf {
        self.upload_dir
            .join(public_path.trim_start_matches("/uploads/"))
    }

    pub async fn create_course(&self, code: &str, title: &str) -> i64 {
        let course: serde_json::Value = self
            .client
            .post(self.url("/courses"))
            .json(&serde_json::json!({ "code": code, "title": title }))
            .send()
            .await
            .expect("Failed to create course")
            .json()
            .await
            .expect("Failed to parse course json");

        course["id"].as_i64().expect("Course id missing")
    }

    pub async fn create_question(&self, form: Form) -> i64 {
        let response = self
            .client
            .post(self.url("/questions"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to create question");
        assert_eq!(response.status().as_u16(), 201);

        let body: serde_json::Value = response.json().await.unwrap();
        body["id"].as_i64().expect("Question id missing")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub fn test_config(root: &Path, read_only: bool) -> Config {
    Config {
        database_url: format!("sqlite://{}", root.join("archive.db").display()),
        upload_dir: root.join("uploads").display().to_string(),
        export_dir: root.join("export").display().to_string(),
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        rust_log: "error".to_string(),
        read_only,
        max_upload_bytes: 10 * 1024 * 1024,
    }
}

pub fn temp_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("exam-archive-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&root).expect("Failed to create temp dir");
    root
}

/// Helper function to spawn the app on a random port for testing.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(false).await
}

pub async fn spawn_app_with(read_only: bool) -> TestApp {
    let root = temp_root();
    let config = test_config(&root, read_only);

    let pool = db::init(&config.database_url)
        .await
        .expect("Failed to open test database");

    let state = AppState::new(pool.clone(), config.clone());
    state
        .uploads
        .ensure_dir()
        .await
        .expect("Failed to create upload dir");

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        pool,
        upload_dir: PathBuf::from(&config.upload_dir),
        root,
        client: reqwest::Client::new(),
    }
}

/// A small image part as a browser would submit it.
pub fn image_part(name: &str) -> Part {
    Part::bytes(b"\x89PNG\r\n\x1a\nfake".to_vec())
        .file_name(name.to_string())
        .mime_str("image/png")
        .unwrap()
}
