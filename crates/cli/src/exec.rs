//! Batch execution of source files.
//!
//! Files are UTF-8 text of the surface language. The top-level splitter is
//! line-oriented: blank lines and `#`-prefixed lines between statements are
//! skipped, and lines accumulate while the parser reports the statement as
//! incomplete — the same continuation rule the REPL uses.

use crate::print_error;
use finch_eval::Evaluator;
use finch_interface::Session;
use finch_parse::parse_expr;
use std::{path::Path, process::ExitCode};

pub fn run_file(sess: &Session, path: &Path) -> ExitCode {
    match try_run_file(sess, path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            sess.dcx.err(err).emit();
            ExitCode::FAILURE
        }
    }
}

fn try_run_file(sess: &Session, path: &Path) -> Result<(), String> {
    let src = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read `{}`: {err}", path.display()))?;
    let mut ev = Evaluator::new(sess);
    execute(&mut ev, &src).map_err(|err| format!("in `{}`: {err}", path.display()))
}

/// Splits and evaluates the source, stopping at the first error.
pub fn execute(ev: &mut Evaluator<'_>, src: &str) -> Result<(), String> {
    let mut buffer = String::new();
    for line in src.lines() {
        let trimmed = line.trim();
        if buffer.is_empty() && (trimmed.is_empty() || trimmed.starts_with('#')) {
            continue;
        }
        buffer.push_str(line);
        buffer.push('\n');
        match parse_expr(buffer.trim()) {
            Ok(expr) => {
                buffer.clear();
                if let Err(err) = ev.eval(&expr) {
                    print_error(&err);
                    return Err(err.to_string());
                }
            }
            Err(err) if err.incomplete => {}
            Err(err) => return Err(format!("parse error: {err}")),
        }
    }
    if !buffer.trim().is_empty() {
        return Err("unexpected end of file inside an unterminated statement".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn run_source(src: &str) -> Result<String, String> {
        let sess = Session::default();
        sess.enter(|| {
            let mut ev = Evaluator::new(&sess);
            execute(&mut ev, src)?;
            let x = ev
                .eval(&parse_expr("result").map_err(|e| e.to_string())?)
                .map_err(|e| e.to_string())?;
            Ok(x.to_string())
        })
    }

    #[test]
    fn executes_statements_in_order() {
        let out = run_source("# a comment\n\nx = 2\nresult = x * 21\n").unwrap();
        assert_eq!(out, "42");
    }

    #[test]
    fn continuation_lines_accumulate() {
        let out = run_source("result = Plus(\n  1,\n  2\n)\n").unwrap();
        assert_eq!(out, "3");
    }

    #[test]
    fn first_error_aborts() {
        let err = run_source("result = 1\nDivide(1, 0)\nresult = 2\n").unwrap_err();
        assert!(err.contains("DivisionByZero"), "{err}");
        // `result` was never reassigned.
        let out = run_source("result = 1\n").unwrap();
        assert_eq!(out, "1");
    }

    #[test]
    fn unterminated_statement_is_an_error() {
        let err = run_source("result = Plus(1,\n").unwrap_err();
        assert!(err.contains("unterminated"), "{err}");
    }

    #[test]
    fn run_file_outcomes() {
        let sess = Session::default();
        sess.enter(|| {
            let mut ok = tempfile::NamedTempFile::new().unwrap();
            writeln!(ok, "1 + 1").unwrap();
            assert!(try_run_file(&sess, ok.path()).is_ok());

            let mut bad = tempfile::NamedTempFile::new().unwrap();
            writeln!(bad, "Divide(1, 0)").unwrap();
            assert!(try_run_file(&sess, bad.path()).is_err());

            assert!(try_run_file(&sess, Path::new("/nonexistent/finch-script")).is_err());
        });
    }
}
