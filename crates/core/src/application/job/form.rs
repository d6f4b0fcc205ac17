// Job submission form validation
//
// Pure: no persistence, no side effects.

use crate::domain::{JobMetadata, QueueName, ENTRY_POINT_KEY};
use crate::error::{AppError, FieldErrors, Result};
use std::collections::BTreeMap;

pub const QUEUE_FIELD: &str = "queue";
pub const ENTRY_POINT_FIELD: &str = ENTRY_POINT_KEY;
pub const WORKFLOW_FIELD: &str = "workflow";
pub const TIMEOUT_FIELD: &str = "timeout";
pub const EXPERIMENT_NAME_FIELD: &str = "experiment_name";
pub const ENTRY_POINT_KWARGS_FIELD: &str = "entry_point_kwargs";
pub const DEPENDS_ON_FIELD: &str = "depends_on";

/// Accepted archive extensions for the workflow file
pub const ALLOWED_EXTENSIONS: &[&str] = &["tar", "tgz", "bz2", "gz", "xz"];

const REQUIRED: &str = "This field is required.";

/// File attached to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Submission exactly as received by a transport: text fields plus an
/// optional file part
#[derive(Debug, Clone, Default)]
pub struct RawJobForm {
    pub fields: BTreeMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl RawJobForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn file(mut self, file: UploadedFile) -> Self {
        self.file = Some(file);
        self
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Validated submission, ready for `JobService::submit`
#[derive(Debug, Clone)]
pub struct JobSubmission {
    pub queue_name: QueueName,
    pub metadata: JobMetadata,
    pub file: UploadedFile,
}

impl JobSubmission {
    pub fn entry_point(&self) -> Option<&str> {
        self.metadata.entry_point()
    }
}

/// Validate a raw form, reporting every offending field at once
///
/// Every text field except `queue` lands in the metadata as received.
/// Blank optional fields are dropped and `timeout` is stored trimmed, the
/// same value that was validated.
pub fn extract(form: RawJobForm) -> Result<JobSubmission> {
    let mut errors = FieldErrors::default();

    let queue_name = match form.text(QUEUE_FIELD) {
        None => {
            errors.push(QUEUE_FIELD, REQUIRED);
            None
        }
        Some(raw) => match QueueName::parse(raw) {
            Ok(name) => Some(name),
            Err(e) => {
                errors.push(QUEUE_FIELD, e.to_string());
                None
            }
        },
    };

    if form.text(ENTRY_POINT_FIELD).is_none() {
        errors.push(ENTRY_POINT_FIELD, REQUIRED);
    }

    if let Some(timeout) = form.text(TIMEOUT_FIELD) {
        if !is_valid_timeout(timeout.trim()) {
            errors.push(
                TIMEOUT_FIELD,
                "Expected a whole number followed by d, h, m or s (e.g. 24h).",
            );
        }
    }

    match &form.file {
        None => errors.push(WORKFLOW_FIELD, REQUIRED),
        Some(file) if file.content.is_empty() => errors.push(WORKFLOW_FIELD, "File is empty."),
        Some(file) if !has_allowed_extension(&file.filename) => errors.push(
            WORKFLOW_FIELD,
            format!(
                "File extension not allowed (expected one of: {}).",
                ALLOWED_EXTENSIONS.join(", ")
            ),
        ),
        Some(_) => {}
    }

    let (queue_name, file) = match (queue_name, form.file) {
        (Some(queue_name), Some(file)) if errors.is_empty() => (queue_name, file),
        _ => return Err(AppError::FormValidation(errors)),
    };

    let mut metadata = JobMetadata::default();
    for (name, value) in form.fields {
        if name == QUEUE_FIELD || value.trim().is_empty() {
            continue;
        }
        let value = if name == TIMEOUT_FIELD {
            value.trim().to_string()
        } else {
            value
        };
        metadata.insert(name, value);
    }

    Ok(JobSubmission {
        queue_name,
        metadata,
        file,
    })
}

fn is_valid_timeout(s: &str) -> bool {
    match s.char_indices().last() {
        Some((idx, unit)) if matches!(unit, 'd' | 'h' | 'm' | 's') => {
            let digits = &s[..idx];
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

fn has_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
