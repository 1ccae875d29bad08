//! Terminal rendering for operator (human) mode and JSON emitters for agent mode.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use payform_core::{mask_pan, AgentError, CardFormInput, FieldIssue, OutputMode, StatusView};

const SPINNER_TICKS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_TICK_MS: u64 = 80;

pub(crate) fn spinner(mode: OutputMode, message: &str) -> Option<ProgressBar> {
    if mode != OutputMode::Human {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&SPINNER_TICKS);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    Some(pb)
}

pub(crate) fn finish_spinner(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}

pub(crate) fn human_header(title: &str) {
    println!(
        "{}",
        "╔═══════════════════════════════════════════════════════════════╗".bright_white()
    );
    println!("{}", format!("║  {:<61}║", title).bright_white());
    println!(
        "{}",
        "╚═══════════════════════════════════════════════════════════════╝".bright_white()
    );
    println!();
}

pub(crate) fn render_issues_table(issues: &[FieldIssue]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Field").add_attribute(Attribute::Bold),
        Cell::new("Message").add_attribute(Attribute::Bold),
    ]);

    for issue in issues {
        table.add_row(vec![Cell::new(&issue.field), Cell::new(&issue.message)]);
    }

    table
}

/// Card summary shown before asking for confirmation. The PAN is masked and
/// the CVV is never shown.
pub(crate) fn render_summary_table(input: &CardFormInput) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Номер карты").add_attribute(Attribute::Bold),
        Cell::new("Месяц/Год").add_attribute(Attribute::Bold),
        Cell::new("Владелец карты").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new(mask_pan(&input.card_number)),
        Cell::new(&input.expiration),
        Cell::new(input.full_name.split_whitespace().collect::<Vec<_>>().join(" ")),
    ]);

    table
}

pub(crate) fn print_view(view: StatusView) {
    let title = view.title();
    match view {
        StatusView::Success => println!("{} {}", "✓".green(), title.green().bold()),
        StatusView::Failure | StatusView::PollError => {
            println!("{} {}", "✗".red(), title.red().bold())
        }
        StatusView::InvalidParam => println!("{}", title.yellow()),
        StatusView::InProgress => println!("{}", title.bright_white()),
    }
}

/// Read one line from stdin after printing `prompt`. `None` on end of input.
pub(crate) fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush().context("failed to flush stdout")?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

pub(crate) fn confirm(question: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }

    println!("{}", question.yellow());
    let answer = prompt_line("> ")?.unwrap_or_default().trim().to_lowercase();
    Ok(answer == "y" || answer == "yes" || answer == "д" || answer == "да")
}

pub(crate) fn emit_agent_error(err: AgentError) -> Result<()> {
    let json = serde_json::to_string(&err).context("failed to serialize agent error")?;
    eprintln!("{json}");
    Ok(())
}

pub(crate) fn emit_agent_result<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value).context("failed to serialize result")?;
    println!("{json}");
    Ok(())
}
