//! Command line interface for the finch kernel: argument parsing, the REPL,
//! and the batch executor.

use finch_expr::ErrorValue;
use finch_interface::Session;
use std::process::ExitCode;

mod exec;
mod opts;
mod repl;
pub mod utils;

pub use exec::run_file;
pub use opts::Opts;
pub use repl::run_repl;

/// Parses command line arguments.
pub fn parse_args<I, T>(itr: I) -> Result<Opts, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    use clap::Parser;
    Opts::try_parse_from(itr)
}

/// Runs the CLI: `-c` evaluates one expression, a positional file executes in
/// batch mode, and otherwise the REPL starts.
pub fn run(opts: Opts) -> ExitCode {
    utils::init_logger();
    let sess = Session::builder()
        .with_stderr_emitter_and_color(opts.color_choice())
        .build();
    sess.enter(|| {
        if let Some(src) = &opts.command {
            return run_command(&sess, src);
        }
        if let Some(path) = opts.input.clone() {
            return run_file(&sess, &path);
        }
        run_repl(&sess, &opts)
    })
}

fn run_command(sess: &Session, src: &str) -> ExitCode {
    let expr = match finch_parse::parse_expr(src) {
        Ok(expr) => expr,
        Err(err) => {
            sess.dcx.err(format!("parse error: {err}")).emit();
            return ExitCode::FAILURE;
        }
    };
    let mut ev = finch_eval::Evaluator::new(sess);
    match ev.eval(&expr) {
        Ok(value) => {
            if !value.is_null() {
                println!("{value}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Limit on printed trace frames; recursion errors would otherwise dump the
/// whole frame stack.
const MAX_TRACE_FRAMES: usize = 16;

/// Prints an error value with its stack trace, one `kind: expression` line
/// per frame.
pub(crate) fn print_error(err: &ErrorValue) {
    eprintln!("{err}");
    let kind = err.kind.name();
    if let Some(expr) = &err.expr {
        eprintln!("  {kind}: {expr}");
    }
    for frame in err.trace.iter().take(MAX_TRACE_FRAMES) {
        eprintln!("  {kind}: {}", frame.expr);
    }
    let hidden = err.trace.len().saturating_sub(MAX_TRACE_FRAMES);
    if hidden > 0 {
        eprintln!("  ... ({hidden} more frames)");
    }
}
