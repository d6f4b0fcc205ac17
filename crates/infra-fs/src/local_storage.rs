// Local filesystem FileStorage implementation
//
// Layout: <root>/<uuid>/<sanitized-name>. The reference handed back to the
// core is the absolute file path.

use async_trait::async_trait;
use jobdock_core::domain::PayloadReference;
use jobdock_core::error::{AppError, Result};
use jobdock_core::port::FileStorage;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const FALLBACK_NAME: &str = "upload";

/// Stores payloads under a root directory
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create the storage, creating `root` if needed
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| storage_error("create storage root", &root, e))?;

        let root = fs::canonicalize(&root)
            .await
            .map_err(|e| storage_error("resolve storage root", &root, e))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a reference to a path, refusing anything outside the root
    fn resolve(&self, reference: &PayloadReference) -> Result<PathBuf> {
        let path = PathBuf::from(reference.as_str());
        let inside_root = path.starts_with(&self.root)
            && path
                .components()
                .all(|c| !matches!(c, std::path::Component::ParentDir));

        if !inside_root {
            return Err(AppError::Storage(format!(
                "Reference outside storage root: {}",
                reference
            )));
        }
        Ok(path)
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, content: &[u8], suggested_name: &str) -> Result<PayloadReference> {
        let dir = self.root.join(uuid::Uuid::new_v4().to_string());
        let path = dir.join(sanitize_filename(suggested_name));
        let partial = path.with_extension("partial");

        fs::create_dir(&dir)
            .await
            .map_err(|e| storage_error("create payload directory", &dir, e))?;

        let written = async {
            fs::write(&partial, content).await?;
            fs::rename(&partial, &path).await
        }
        .await;

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_dir_all(&dir).await {
                warn!(dir = %dir.display(), error = %cleanup, "Failed to clean up partial payload");
            }
            return Err(storage_error("write payload", &path, e));
        }

        debug!(path = %path.display(), bytes = content.len(), "Payload stored");
        Ok(PayloadReference::new(path.to_string_lossy().into_owned()))
    }

    async fn remove(&self, reference: &PayloadReference) -> Result<()> {
        let path = self.resolve(reference)?;

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(storage_error("remove payload", &path, e)),
        }

        // Drop the per-payload directory once empty
        if let Some(dir) = path.parent().filter(|d| *d != self.root.as_path()) {
            if let Err(e) = fs::remove_dir(dir).await {
                debug!(dir = %dir.display(), error = %e, "Payload directory left in place");
            }
        }

        Ok(())
    }
}

/// Keep ASCII alphanumerics, '.', '-' and '_'; strip leading dots
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '_') {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

fn storage_error(action: &str, path: &Path, err: std::io::Error) -> AppError {
    AppError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}
