//! Command line options.

use clap::{ColorChoice, Parser, ValueHint};
use std::path::PathBuf;

/// A symbolic computation kernel.
#[derive(Debug, Parser)]
#[command(name = "finch", version, next_display_order = None)]
pub struct Opts {
    /// Source file to execute. Without a file (or `-c`), an interactive REPL
    /// starts.
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,
    /// Evaluate a single expression and exit.
    #[arg(short = 'c', long = "command", value_name = "EXPR")]
    pub command: Option<String>,
    /// REPL prompt text.
    #[arg(short, long, default_value = "finch> ")]
    pub prompt: String,
    /// Coloring.
    #[arg(long, value_enum, default_value_t)]
    pub color: ColorChoice,
}

impl Opts {
    /// The color choice translated for the diagnostics stream.
    pub fn color_choice(&self) -> anstream::ColorChoice {
        match self.color {
            ColorChoice::Auto => anstream::ColorChoice::Auto,
            ColorChoice::Always => anstream::ColorChoice::Always,
            ColorChoice::Never => anstream::ColorChoice::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Opts::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let opts = Opts::try_parse_from(["finch", "-c", "1 + 1", "--prompt", "> "]).unwrap();
        assert_eq!(opts.command.as_deref(), Some("1 + 1"));
        assert_eq!(opts.prompt, "> ");
        assert!(opts.input.is_none());

        let opts = Opts::try_parse_from(["finch", "script.fn"]).unwrap();
        assert_eq!(opts.input.as_deref(), Some(std::path::Path::new("script.fn")));
    }
}
