use std::io::IsTerminal as _;

use payform_core::OutputMode;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins over the verbosity flag.
pub(crate) fn init(mode: OutputMode, verbose: u8, no_color: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(mode, verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color && std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

/// Human runs show warnings. Agent runs keep stderr for the JSON error
/// document unless `-v` asks for more.
fn default_directive(mode: OutputMode, verbose: u8) -> &'static str {
    match (mode, verbose) {
        (OutputMode::Human, 0) => "warn",
        (OutputMode::Agent, 0) => "off",
        _ => "debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_runs_surface_warnings() {
        assert_eq!(default_directive(OutputMode::Human, 0), "warn");
    }

    #[test]
    fn agent_runs_are_quiet_until_verbose() {
        assert_eq!(default_directive(OutputMode::Agent, 0), "off");
        assert_eq!(default_directive(OutputMode::Agent, 1), "debug");
        assert_eq!(default_directive(OutputMode::Human, 1), "debug");
        assert_eq!(default_directive(OutputMode::Human, 3), "debug");
    }
}
