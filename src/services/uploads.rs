use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// URL prefix under which uploaded files are served.
pub const UPLOAD_URL_PREFIX: &str = "uploads";

/// Writes uploaded images to a local directory. Files are named after the
/// upload time in milliseconds and recorded as `uploads/<file>`.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stores `contents` and returns the relative path to persist. A file
    /// that could not be written completely is removed again.
    pub async fn save<R>(&self, original_name: &str, mut contents: R) -> std::io::Result<String>
    where
        R: AsyncRead + Unpin,
    {
        fs::create_dir_all(&self.dir).await?;

        let stem = Utc::now().timestamp_millis();
        let ext = extension_of(original_name);
        let mut attempt = 0u32;
        loop {
            let file_name = match attempt {
                0 => format!("{stem}{ext}"),
                n => format!("{stem}-{n}{ext}"),
            };
            let path = self.dir.join(&file_name);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    let written = match tokio::io::copy(&mut contents, &mut file).await {
                        Ok(n) => file.flush().await.map(|_| n),
                        Err(e) => Err(e),
                    };
                    drop(file);

                    return match written {
                        Ok(n) => {
                            tracing::debug!("Stored upload {} ({} bytes)", path.display(), n);
                            Ok(format!("{UPLOAD_URL_PREFIX}/{file_name}"))
                        }
                        Err(e) => {
                            if let Err(rm) = fs::remove_file(&path).await {
                                tracing::warn!("Failed to remove partial upload {}: {}", path.display(), rm);
                            }
                            Err(e)
                        }
                    };
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e),
            }
        }
    }

    /// Best-effort removal of a file written by [`save`](Self::save).
    pub async fn discard(&self, stored_path: &str) {
        let Some(file_name) = stored_path
            .strip_prefix(UPLOAD_URL_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
        else {
            tracing::warn!("Refusing to discard unexpected upload path {}", stored_path);
            return;
        };

        if let Err(e) = fs::remove_file(self.dir.join(file_name)).await {
            tracing::warn!("Failed to discard orphaned upload {}: {}", stored_path, e);
        }
    }
}

/// `.ext` of the client file name, lowercased; empty when missing or odd.
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}
