// File Storage Port (Interface)

use crate::domain::PayloadReference;
use crate::error::Result;
use async_trait::async_trait;

/// Persists submitted payload files.
///
/// The returned reference is opaque to the core. Implementations report
/// every failure as `AppError::Storage`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `content` and return a handle to it
    async fn save(&self, content: &[u8], suggested_name: &str) -> Result<PayloadReference>;

    /// Remove a previously stored payload (used to undo a failed submission)
    async fn remove(&self, reference: &PayloadReference) -> Result<()>;
}
