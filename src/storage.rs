use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::AppError;

/// Metadata about a stored upload.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Stored filename (UUID-based to avoid collisions)
    pub stored_name: String,
    /// Path the file is served from
    pub url: String,
    /// File size in bytes
    pub size: u64,
}

/// Local filesystem storage for uploaded audio files.
///
/// Files are stored in the configured upload directory with UUID-based
/// names and served from `/uploads`.
#[derive(Clone)]
pub struct LocalStorage {
    upload_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        LocalStorage {
            upload_dir: upload_dir.into(),
        }
    }

    /// Store file bytes under a fresh UUID name, keeping the original
    /// extension when it looks safe.
    pub async fn store(&self, filename: &str, data: &[u8]) -> Result<StoredFile, AppError> {
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {}", e)))?;

        let stored_name = match safe_extension(filename) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        let path = self.upload_dir.join(&stored_name);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write upload: {}", e)))?;

        Ok(StoredFile {
            url: format!("/uploads/{}", stored_name),
            stored_name,
            size: data.len() as u64,
        })
    }

    /// Delete a stored file. A file that is already gone is not an error.
    pub async fn delete(&self, stored_name: &str) -> Result<(), AppError> {
        let path = self.upload_dir.join(stored_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("Failed to delete upload: {}", e))),
        }
    }

    /// Derive the stored name back from a served URL (`/uploads/<name>`).
    pub fn stored_name_from_url(url: &str) -> Option<&str> {
        url.strip_prefix("/uploads/")
    }
}

/// Whether the uploaded file looks like audio, judged by the declared
/// content type first and the filename as a fallback.
pub fn looks_like_audio(content_type: Option<&str>, filename: &str) -> bool {
    if let Some(ct) = content_type {
        if ct.starts_with("audio/") {
            return true;
        }
    }
    mime_guess::from_path(filename)
        .first()
        .map(|m| m.type_() == mime_guess::mime::AUDIO)
        .unwrap_or(false)
}

fn safe_extension(filename: &str) -> Option<&str> {
    let ext = Path::new(filename).extension()?.to_str()?;
    if !ext.is_empty()
        && ext.len() <= 8
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        Some(ext)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_detection_prefers_content_type() {
        assert!(looks_like_audio(Some("audio/mpeg"), "whatever.bin"));
        assert!(looks_like_audio(None, "rain.mp3"));
        assert!(!looks_like_audio(Some("image/png"), "cat.png"));
        assert!(!looks_like_audio(None, "notes.txt"));
    }

    #[test]
    fn extensions_are_sanitized() {
        assert_eq!(safe_extension("rain.mp3"), Some("mp3"));
        assert_eq!(safe_extension("archive.tar.gz"), Some("gz"));
        assert_eq!(safe_extension("no-extension"), None);
        assert_eq!(safe_extension("weird.../../etc"), None);
    }

    #[tokio::test]
    async fn store_and_delete_round_trip() {
        let dir = std::env::temp_dir().join(format!("soundboard-storage-{}", Uuid::new_v4()));
        let storage = LocalStorage::new(&dir);

        let stored = storage.store("clip.mp3", b"not really audio").await.unwrap();
        assert!(stored.url.starts_with("/uploads/"));
        assert!(stored.stored_name.ends_with(".mp3"));
        assert_eq!(stored.size, 16);
        assert!(dir.join(&stored.stored_name).exists());

        storage.delete(&stored.stored_name).await.unwrap();
        assert!(!dir.join(&stored.stored_name).exists());
        // deleting again is fine
        storage.delete(&stored.stored_name).await.unwrap();
    }
}
