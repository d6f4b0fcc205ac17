// Queue Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};

/// Queue identifier (surrogate key assigned by the store)
pub type QueueId = i64;

/// Maximum queue name length (in characters)
pub const MAX_QUEUE_NAME_LEN: usize = 255;

/// A named submission channel.
///
/// `is_locked` is derived from the presence of a [`QueueLock`] row; it is
/// never written directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    pub queue_id: QueueId,
    pub name: String,
    pub created_on: i64,    // epoch ms
    pub last_modified: i64, // epoch ms
    pub is_locked: bool,
}

/// Lock record blocking new submissions to a queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueLock {
    pub queue_id: QueueId,
    pub created_on: i64, // epoch ms
}

/// Validated queue name.
///
/// Surrounding whitespace is trimmed. Comparison stays case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueName(String);

impl QueueName {
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.trim();

        if name.is_empty() {
            return Err(DomainError::InvalidQueueName(
                "queue name cannot be empty".to_string(),
            ));
        }

        if name.chars().count() > MAX_QUEUE_NAME_LEN {
            return Err(DomainError::InvalidQueueName(format!(
                "queue name too long (max {} characters)",
                MAX_QUEUE_NAME_LEN
            )));
        }

        if name.chars().any(char::is_control) {
            return Err(DomainError::InvalidQueueName(
                "queue name cannot contain control characters".to_string(),
            ));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
