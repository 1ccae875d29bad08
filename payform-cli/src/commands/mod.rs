pub(crate) mod inspect;
pub(crate) mod pay;
pub(crate) mod status;
pub(crate) mod validate;

use std::path::Path;

use anyhow::{Context as _, Result};
use payform_core::{AgentError, CardFormInput, GatewayConfig, OutputMode};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitCode {
    Success = 0,
    ValidationFailed = 1,
    Usage = 2,
    SubmissionFailed = 3,
    PaymentFailed = 4,
    PollFailed = 5,
    Cancelled = 130,
}

impl ExitCode {
    pub(crate) const fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Settings shared by every subcommand.
pub(crate) struct Context {
    pub mode: OutputMode,
    pub config: GatewayConfig,
}

impl Context {
    /// Report a usage problem in the current mode and return its exit code.
    pub(crate) fn usage_error(&self, error: &str, message: String) -> Result<ExitCode> {
        match self.mode {
            OutputMode::Human => eprintln!("{message}"),
            OutputMode::Agent => render::emit_agent_error(AgentError {
                error: error.to_string(),
                code: ExitCode::Usage.as_i32(),
                message: Some(message),
                details: None,
            })?,
        }
        Ok(ExitCode::Usage)
    }
}

pub(crate) fn read_card_input(path: &Path) -> Result<CardFormInput> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to open input file: {}", path.display()))?;
    CardFormInput::from_json_slice(&bytes)
        .with_context(|| format!("failed to parse card form JSON: {}", path.display()))
}
