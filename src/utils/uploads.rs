// src/utils/uploads.rs

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::fs;
use uuid::Uuid;

use crate::{error::AppError, utils::form::UploadedFile};

/// URL prefix under which uploaded files are served and recorded in rows.
pub const PUBLIC_PREFIX: &str = "/uploads/";

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

/// Disk storage for uploaded images.
///
/// Files are stored flat in one directory under generated names
/// (`<unix-millis>-<random>.<ext>`); the client filename only contributes its extension.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: Arc<PathBuf>,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the upload directory if needed.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(self.root.as_path()).await
    }

    /// Writes one upload and returns its public path (`/uploads/<name>`).
    pub async fn save(&self, file: &UploadedFile) -> Result<String, AppError> {
        let name = generate_filename(file.file_name.as_deref())?;
        let full_path = self.root.join(&name);

        fs::write(&full_path, &file.data).await.map_err(|e| {
            tracing::error!("Failed to write upload {}: {:?}", full_path.display(), e);
            AppError::InternalServerError(e.to_string())
        })?;

        tracing::debug!(path = %full_path.display(), size = file.data.len(), "upload stored");
        Ok(format!("{}{}", PUBLIC_PREFIX, name))
    }

    /// Writes several uploads. On failure, files already written by this call are removed.
    pub async fn save_all(&self, files: &[&UploadedFile]) -> Result<Vec<String>, AppError> {
        let mut saved = Vec::with_capacity(files.len());
        for file in files {
            match self.save(file).await {
                Ok(path) => saved.push(path),
                Err(e) => {
                    self.remove_all(&saved).await;
                    return Err(e);
                }
            }
        }
        Ok(saved)
    }

    /// Deletes the file behind a public path. Missing files are a no-op and
    /// other failures are only logged.
    pub async fn remove(&self, public_path: &str) {
        let Some(full_path) = self.resolve(public_path) else {
            tracing::warn!("Refusing to delete file outside upload dir: {}", public_path);
            return;
        };

        match fs::remove_file(&full_path).await {
            Ok(()) => tracing::debug!(path = %full_path.display(), "upload deleted"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %full_path.display(), "upload already absent")
            }
            Err(e) => tracing::warn!("Failed to delete {}: {:?}", full_path.display(), e),
        }
    }

    pub async fn remove_all<S: AsRef<str>>(&self, public_paths: &[S]) {
        for path in public_paths {
            self.remove(path.as_ref()).await;
        }
    }

    /// Maps `/uploads/<name>` to a path inside the upload directory.
    /// Anything that is not a plain filename is rejected.
    pub fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let name = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .or_else(|| public_path.strip_prefix(&PUBLIC_PREFIX[1..]))?;

        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return None;
        }
        Some(self.root.join(name))
    }
}

/// Generates a collision-resistant stored filename, keeping only the extension
/// of the client filename.
pub fn generate_filename(original: Option<&str>) -> Result<String, AppError> {
    let extension = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let suffix = match extension {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => format!(".{}", ext),
        Some(ext) => {
            return Err(AppError::BadRequest(format!(
                "Unsupported file type: .{}",
                ext
            )));
        }
        None => String::new(),
    };

    let random = Uuid::new_v4().simple().to_string();
    Ok(format!(
        "{}-{}{}",
        chrono::Utc::now().timestamp_millis(),
        &random[..12],
        suffix
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_keep_only_the_extension() {
        let name = generate_filename(Some("My Scan (1).PNG")).unwrap();
        assert!(name.ends_with(".png"));
        assert!(!name.contains("Scan"));

        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(rest.len(), 12 + ".png".len());
    }

    #[test]
    fn generated_names_are_unique() {
        let a = generate_filename(Some("a.jpg")).unwrap();
        let b = generate_filename(Some("a.jpg")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn files_without_extension_are_accepted() {
        let name = generate_filename(Some("blob")).unwrap();
        assert!(!name.contains('.'));
        assert!(generate_filename(None).is_ok());
    }

    #[test]
    fn non_image_extensions_are_rejected() {
        assert!(matches!(
            generate_filename(Some("payload.html")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn resolve_stays_inside_the_upload_dir() {
        let store = UploadStore::new("/srv/uploads");
        assert_eq!(
            store.resolve("/uploads/123-abc.png"),
            Some(PathBuf::from("/srv/uploads/123-abc.png"))
        );
        assert_eq!(
            store.resolve("uploads/123-abc.png"),
            Some(PathBuf::from("/srv/uploads/123-abc.png"))
        );
        assert_eq!(store.resolve("/uploads/../archive.db"), None);
        assert_eq!(store.resolve("/uploads/.."), None);
        assert_eq!(store.resolve("/etc/passwd"), None);
        assert_eq!(store.resolve("/uploads/"), None);
    }

    #[tokio::test]
    async fn removing_a_missing_file_is_a_no_op() {
        let dir = std::env::temp_dir().join(format!("uploads-{}", Uuid::new_v4()));
        let store = UploadStore::new(&dir);
        store.ensure_dir().await.unwrap();

        let file = UploadedFile {
            field: "image".to_string(),
            file_name: Some("x.png".to_string()),
            data: axum::body::Bytes::from_static(b"png"),
        };
        let path = store.save(&file).await.unwrap();
        let full = store.resolve(&path).unwrap();
        assert!(full.exists());

        store.remove(&path).await;
        assert!(!full.exists());
        store.remove(&path).await;

        let _ = std::fs::remove_dir_all(&dir);
    }
}
