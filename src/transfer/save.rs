//! Save targets for downloaded payloads

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{BlobHandle, TransferError};

/// Where downloaded payloads end up
#[async_trait]
pub trait SaveTarget: Send + Sync {
    /// Persist `blob` under its original file name
    ///
    /// Returns the location actually written.
    async fn save(&self, blob: &BlobHandle) -> Result<PathBuf, TransferError>;
}

/// Reduce a service-supplied file name to a safe final path component
///
/// Directory parts, control characters and leading dots are removed; an
/// empty result becomes `download`.
///
/// # Examples
///
/// ```
/// use securedoc::transfer::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
/// assert_eq!(sanitize_file_name("C:\\docs\\report.pdf"), "report.pdf");
/// assert_eq!(sanitize_file_name(".."), "download");
/// ```
pub fn sanitize_file_name(name: &str) -> String {
    let last = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control() && *c != ':')
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').trim();
    if cleaned.is_empty() {
        "download".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `name (n).ext` for the n-th duplicate
fn numbered(name: &str, n: usize) -> String {
    let path = Path::new(name);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(ext)) => format!("{} ({}).{}", stem, n, ext),
        _ => format!("{} ({})", name, n),
    }
}

/// Saves payloads into a directory, never overwriting existing files
#[derive(Debug, Clone)]
pub struct DirectorySaveTarget {
    directory: PathBuf,
}

impl DirectorySaveTarget {
    /// Save into `directory`, created on first save if missing
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Target directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl SaveTarget for DirectorySaveTarget {
    async fn save(&self, blob: &BlobHandle) -> Result<PathBuf, TransferError> {
        let name = sanitize_file_name(blob.file_name());
        let save_error = |e: std::io::Error| TransferError::Save {
            file_name: name.clone(),
            reason: e.to_string(),
        };

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(save_error)?;

        let mut attempt = 0;
        loop {
            let candidate = if attempt == 0 {
                name.clone()
            } else {
                numbered(&name, attempt)
            };
            let path = self.directory.join(&candidate);

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(blob.bytes()).await.map_err(save_error)?;
                    file.flush().await.map_err(save_error)?;
                    tracing::info!("Saved {} ({} bytes)", path.display(), blob.len());
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    attempt += 1;
                }
                Err(e) => return Err(save_error(e)),
            }
        }
    }
}
