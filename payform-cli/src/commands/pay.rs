use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use colored::Colorize;
use serde_json::json;

use payform_core::view::FORM_TITLE;
use payform_core::{
    field_issues, AgentError, Field, HttpGateway, OutputMode, PaymentForm, PaymentGateway, Route,
    SubmitOutcome,
};

use crate::commands::{read_card_input, status, Context, ExitCode};
use crate::render;

#[derive(Debug, Clone)]
pub(crate) struct PayArgs {
    pub input: Option<PathBuf>,
    pub force: bool,
    pub no_wait: bool,
}

/// Ask for each field in turn, echoing masks and inline errors for the
/// masked inputs. Returns `false` when stdin closes.
fn prompt_fields(form: &mut PaymentForm, fields: &[Field]) -> Result<bool> {
    for field in fields {
        let prompt = format!("{} [{}]: ", field.label(), field.placeholder());
        let Some(raw) = render::prompt_line(&prompt)? else {
            return Ok(false);
        };

        let shown = match field {
            Field::CardNumber => form.input_card_number(&raw),
            Field::Expiration => form.input_expiration(&raw),
            Field::Cvv => form.input_cvv(&raw),
            Field::FullName => form.input_full_name(&raw),
        }
        .to_string();

        if matches!(field, Field::CardNumber | Field::Expiration) {
            println!("  {}", shown.bright_black());
            if let Some(err) = form.error(*field) {
                println!("  {}", err.to_string().red());
            }
        }
    }
    Ok(true)
}

pub(crate) async fn run(ctx: &Context, args: &PayArgs) -> Result<ExitCode> {
    // Agent mode is non-interactive: card data comes from a file and the
    // payment must be confirmed up front.
    if ctx.mode == OutputMode::Agent {
        if args.input.is_none() {
            return ctx.usage_error(
                "input_required",
                "agent mode needs --input with a card form JSON document".to_string(),
            );
        }
        if !args.force {
            return ctx.usage_error(
                "confirmation_required",
                "agent mode needs --force to submit a payment".to_string(),
            );
        }
    }

    let gateway = Arc::new(HttpGateway::new(ctx.config.clone())?);
    let mut form = match &args.input {
        Some(path) => PaymentForm::from_input(&read_card_input(path)?),
        None => PaymentForm::new(),
    };
    let mut to_prompt: Vec<Field> = if args.input.is_some() {
        Vec::new()
    } else {
        Field::ALL.to_vec()
    };

    if ctx.mode == OutputMode::Human {
        render::human_header(FORM_TITLE);
    }

    let route = loop {
        if ctx.mode == OutputMode::Human {
            if !to_prompt.is_empty() && !prompt_fields(&mut form, &to_prompt)? {
                println!("{}", "Aborted. No payment was made.".yellow());
                return Ok(ExitCode::Cancelled);
            }

            println!();
            println!("{}", render::render_summary_table(&form.values()));
            if !render::confirm("Подтвердите оплату (yes/no):", args.force)? {
                println!("{}", "Aborted. No payment was made.".yellow());
                return Ok(ExitCode::Cancelled);
            }
        }

        let outcome = match form.start_submit() {
            Ok(request) => {
                let pb = render::spinner(ctx.mode, form.submit_label());
                let result = gateway.create_payment(&request).await;
                render::finish_spinner(pb);
                form.finish_submit(&request, result)
            }
            Err(outcome) => outcome,
        };

        match outcome {
            SubmitOutcome::Accepted(route) => break route,
            SubmitOutcome::Busy => bail!("a payment is already being submitted"),
            SubmitOutcome::Rejected(errors) => {
                let issues = field_issues(&errors);
                match ctx.mode {
                    OutputMode::Human => {
                        println!(
                            "{} {}",
                            "✗".red(),
                            "Validation failed. No payment was sent.".red()
                        );
                        println!("{}", render::render_issues_table(&issues));
                        if args.input.is_some() {
                            return Ok(ExitCode::ValidationFailed);
                        }
                        to_prompt = errors.iter().map(|(field, _)| field).collect();
                    }
                    OutputMode::Agent => {
                        render::emit_agent_error(AgentError {
                            error: "validation_failed".to_string(),
                            code: ExitCode::ValidationFailed.as_i32(),
                            message: None,
                            details: Some(issues),
                        })?;
                        return Ok(ExitCode::ValidationFailed);
                    }
                }
            }
            SubmitOutcome::Failed(failure) => match ctx.mode {
                OutputMode::Human => {
                    println!("{} {}", "✗".red(), failure.to_string().red().bold());
                    if let Some(cause) = std::error::Error::source(&failure) {
                        println!("{}", cause.to_string().bright_black());
                    }
                    if !render::confirm("Повторить оплату? (yes/no):", false)? {
                        return Ok(ExitCode::SubmissionFailed);
                    }
                    to_prompt.clear();
                }
                OutputMode::Agent => {
                    let cause = std::error::Error::source(&failure).map(|cause| cause.to_string());
                    render::emit_agent_error(AgentError {
                        error: "submission_failed".to_string(),
                        code: ExitCode::SubmissionFailed.as_i32(),
                        message: Some(match cause {
                            Some(cause) => format!("{failure}: {cause}"),
                            None => failure.to_string(),
                        }),
                        details: None,
                    })?;
                    return Ok(ExitCode::SubmissionFailed);
                }
            },
        }
    };

    let (pid, path) = match (&route, route.path()) {
        (Route::Status(pid), Some(path)) => (pid.clone(), path),
        _ => bail!("submission produced an unexpected route: {route:?}"),
    };

    if args.no_wait {
        match ctx.mode {
            OutputMode::Human => println!("{} {}", "Payment:".bright_white().bold(), pid),
            OutputMode::Agent => render::emit_agent_result(&json!({
                "pid": pid.as_str(),
                "path": path,
            }))?,
        }
        return Ok(ExitCode::Success);
    }

    status::track(ctx, gateway, Some(pid.as_str())).await
}
