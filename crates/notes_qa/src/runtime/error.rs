//! Structured run-level error types.
//!
//! Check findings are never errors: they are collected as [`Issue`](crate::docs::Issue) values.
//! `QaError` covers failures that stop the whole run, such as a missing content root or an
//! unreadable configuration file.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// What kind of run-level failure occurred. `exit_code` maps every category to exit status 1.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QaErrorCategory {
    /// Bad `--root`, an unreadable or malformed `notes-qa.toml`, or an unknown config key.
    Config,
    /// Every selected check ran, and at least one reported an issue.
    Validation,
    /// Writing the JSON report failed. Unreadable notes are skipped and never land here.
    Io,
}

/// Run-level error. Printed once by `exit_code` as `error: <message> [operation: ..] [target: ..]
/// [hint: ..]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QaError {
    pub category: QaErrorCategory,
    pub message: String,
    /// Step that failed, e.g. `discover markdown files` or `load config`.
    pub operation: Option<String>,
    /// Content root, config file, or report path involved.
    pub target: Option<String>,
    /// Suggested flag or fix shown to the user.
    pub hint: Option<String>,
}

pub type QaResult<T> = Result<T, QaError>;

impl QaError {
    pub fn new(category: QaErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            operation: None,
            target: None,
            hint: None,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(QaErrorCategory::Config, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(QaErrorCategory::Validation, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(QaErrorCategory::Io, message)
    }

    /// Name the step that failed.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Name the file or directory the step was working on.
    pub fn with_path(mut self, path: &Path) -> Self {
        self.target = Some(path.display().to_string());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for QaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(operation) = &self.operation {
            write!(f, " [operation: {operation}]")?;
        }
        if let Some(target) = &self.target {
            write!(f, " [target: {target}]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " [hint: {hint}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for QaError {}

impl From<std::io::Error> for QaError {
    fn from(value: std::io::Error) -> Self {
        QaError::io(value.to_string())
    }
}
