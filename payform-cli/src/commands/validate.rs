use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use payform_core::{field_issues, AgentError, OutputMode, PaymentForm};

use crate::commands::{read_card_input, Context, ExitCode};
use crate::render;

/// Run the form rules over a JSON card document. Nothing is sent.
pub(crate) fn run(ctx: &Context, input: &Path) -> Result<ExitCode> {
    let card = read_card_input(input)?;
    let mut form = PaymentForm::from_input(&card);

    match form.prepare() {
        Ok(_) => {
            match ctx.mode {
                OutputMode::Human => {
                    println!("{} {}", "✓".green(), "All fields are valid.".green());
                }
                OutputMode::Agent => render::emit_agent_result(&json!({ "valid": true }))?,
            }
            Ok(ExitCode::Success)
        }
        Err(errors) => {
            let issues = field_issues(&errors);
            match ctx.mode {
                OutputMode::Human => {
                    println!("{} {}", "✗".red(), "Validation failed.".red());
                    println!();
                    println!("{}", render::render_issues_table(&issues));
                }
                OutputMode::Agent => render::emit_agent_error(AgentError {
                    error: "validation_failed".to_string(),
                    code: ExitCode::ValidationFailed.as_i32(),
                    message: None,
                    details: Some(issues),
                })?,
            }
            Ok(ExitCode::ValidationFailed)
        }
    }
}
