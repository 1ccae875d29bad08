//! Output helpers for human and agent modes.

use serde::Serialize;

use crate::validation::ValidationErrors;

/// Human (TTY) vs Agent (non-interactive) output selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Agent,
}

/// Structured error for a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Agent-mode error payload.
#[derive(Debug, Clone, Serialize)]
pub struct AgentError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldIssue>>,
}

/// Flatten validation errors into per-field issues, in form order.
pub fn field_issues(errors: &ValidationErrors) -> Vec<FieldIssue> {
    errors
        .iter()
        .map(|(field, error)| FieldIssue {
            field: field.as_str().to_string(),
            message: error.to_string(),
        })
        .collect()
}
