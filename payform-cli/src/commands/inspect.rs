//! Offline helpers: keystroke masks and route resolution.

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde_json::json;

use payform_core::{format_card_number, format_expiration, OutputMode, Route};

use crate::commands::{Context, ExitCode};
use crate::render;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum MaskedField {
    CardNumber,
    Expiration,
}

pub(crate) fn format(ctx: &Context, field: MaskedField, raw: &str) -> Result<ExitCode> {
    let (name, masked) = match field {
        MaskedField::CardNumber => ("cardNumber", format_card_number(raw)),
        MaskedField::Expiration => ("expiration", format_expiration(raw)),
    };

    match ctx.mode {
        OutputMode::Human => {
            println!("{} {}", "display:  ".bright_white().bold(), masked.display);
            println!("{} {}", "canonical:".bright_white().bold(), masked.canonical);
        }
        OutputMode::Agent => render::emit_agent_result(&json!({
            "field": name,
            "display": masked.display,
            "canonical": masked.canonical,
        }))?,
    }
    Ok(ExitCode::Success)
}

pub(crate) fn route(ctx: &Context, path: &str) -> Result<ExitCode> {
    let route = Route::parse(path);
    let (kind, pid) = match &route {
        Route::Form => ("form", None),
        Route::Status(pid) => ("status", Some(pid.as_str())),
        Route::NotFound => ("not_found", None),
    };

    match ctx.mode {
        OutputMode::Human => match &route {
            Route::Form => println!("{}", "payment form".bright_white()),
            Route::Status(pid) => println!("{} {}", "status page for".bright_white(), pid),
            Route::NotFound => println!("{}", "no page at this path".yellow()),
        },
        OutputMode::Agent => render::emit_agent_result(&json!({
            "route": kind,
            "pid": pid,
            "path": route.path(),
        }))?,
    }

    if route == Route::NotFound {
        Ok(ExitCode::Usage)
    } else {
        Ok(ExitCode::Success)
    }
}
