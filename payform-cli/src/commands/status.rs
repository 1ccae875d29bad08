use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use payform_core::{
    AgentError, HttpGateway, OutputMode, PaymentStatus, PollState, StatusPage, StatusView,
};

use crate::commands::{Context, ExitCode};
use crate::render;

pub(crate) async fn run(ctx: &Context, pid: &str) -> Result<ExitCode> {
    let gateway = Arc::new(HttpGateway::new(ctx.config.clone())?);
    track(ctx, gateway, Some(pid)).await
}

/// Open the status page for `pid` and stay on it until the payment resolves,
/// polling fails or the user interrupts.
pub(crate) async fn track(
    ctx: &Context,
    gateway: Arc<HttpGateway>,
    pid: Option<&str>,
) -> Result<ExitCode> {
    let mut poller = match StatusPage::open(gateway, pid, ctx.config.poll_interval()) {
        StatusPage::Tracking(poller) => poller,
        StatusPage::InvalidParam => {
            return match ctx.mode {
                OutputMode::Human => {
                    render::print_view(StatusView::InvalidParam);
                    Ok(ExitCode::Usage)
                }
                OutputMode::Agent => {
                    render::emit_agent_error(AgentError {
                        error: "invalid_pid".to_string(),
                        code: ExitCode::Usage.as_i32(),
                        message: Some(StatusView::InvalidParam.title().to_string()),
                        details: None,
                    })?;
                    Ok(ExitCode::Usage)
                }
            };
        }
    };

    let pid = poller.pid().clone();
    if ctx.mode == OutputMode::Human {
        println!("{} {}", "Payment:".bright_white().bold(), pid);
    }

    let pb = render::spinner(ctx.mode, StatusView::InProgress.title());
    let finished = tokio::select! {
        state = poller.wait_final() => Some(state),
        _ = tokio::signal::ctrl_c() => None,
    };
    render::finish_spinner(pb);

    let Some(state) = finished else {
        poller.stop();
        if ctx.mode == OutputMode::Human {
            println!("{}", "Stopped watching the payment.".yellow());
        }
        return Ok(ExitCode::Cancelled);
    };

    let view = StatusView::for_state(&state);
    match (&state, ctx.mode) {
        (PollState::Halted(cause), OutputMode::Human) => {
            render::print_view(view);
            println!("{}", cause.bright_black());
        }
        (PollState::Halted(cause), OutputMode::Agent) => {
            render::emit_agent_error(AgentError {
                error: "poll_failed".to_string(),
                code: ExitCode::PollFailed.as_i32(),
                message: Some(format!("{}: {cause}", view.title())),
                details: None,
            })?;
        }
        (PollState::Status(_), OutputMode::Human) => render::print_view(view),
        (PollState::Status(status), OutputMode::Agent) => {
            render::emit_agent_result(&json!({
                "pid": pid.as_str(),
                "status": status.as_str(),
                "view": view,
                "message": view.title(),
            }))?;
        }
    }

    Ok(match state {
        PollState::Status(PaymentStatus::Ok) => ExitCode::Success,
        PollState::Status(_) => ExitCode::PaymentFailed,
        PollState::Halted(_) => ExitCode::PollFailed,
    })
}
