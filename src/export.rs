// src/export.rs

//! Static snapshot of the read API.
//!
//! Every GET endpoint is written as a JSON file laid out like its URL, so a static
//! host can serve the archive without the server or the database.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sqlx::SqlitePool;
use tokio::fs;

use crate::{
    error::AppError,
    services::{queries, tags},
};

/// Writes the snapshot under `out_dir` and returns the number of files written.
pub async fn export_static(pool: &SqlitePool, out_dir: &Path) -> Result<usize, AppError> {
    let mut writer = SnapshotWriter::new(out_dir);

    writer.write("stats.json", &queries::stats(pool).await?).await?;
    writer
        .write("questions/recent.json", &queries::recent_questions(pool).await?)
        .await?;
    writer
        .write("questions/unsolved.json", &queries::unsolved_questions(pool).await?)
        .await?;
    writer.write("tags.json", &tags::list_tags(pool).await?).await?;

    let courses = queries::list_courses(pool).await?;
    writer.write("courses.json", &courses).await?;

    for course in &courses {
        let questions = queries::list_course_questions_for_export(pool, course.id).await?;
        writer
            .write(&format!("courses/{}/questions.json", course.id), &questions)
            .await?;

        for item in &questions {
            let id = item.question.id;
            let Some(detail) = queries::question_detail(pool, id).await? else {
                continue;
            };
            writer.write(&format!("questions/{}.json", id), &detail).await?;
        }
    }

    tracing::info!(
        "Static export complete: {} files in {}",
        writer.written,
        out_dir.display()
    );
    Ok(writer.written)
}

struct SnapshotWriter {
    root: PathBuf,
    written: usize,
}

impl SnapshotWriter {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            written: 0,
        }
    }

    async fn write<T: Serialize>(&mut self, relative: &str, value: &T) -> Result<(), AppError> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_vec_pretty(value)?;
        fs::write(&path, body).await.map_err(|e| {
            tracing::error!("Failed to write {}: {:?}", path.display(), e);
            AppError::from(e)
        })?;

        self.written += 1;
        tracing::info!("Exported {}", relative);
        Ok(())
    }
}
