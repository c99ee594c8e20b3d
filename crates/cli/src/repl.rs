//! The interactive REPL.
//!
//! Multi-line input: while the parser reports the buffer as incomplete, a
//! continuation prompt is shown. Two consecutive blank lines, `:reset`, or
//! `:clear` abandon the buffer.

use crate::{Opts, print_error};
use finch_eval::Evaluator;
use finch_interface::Session;
use finch_parse::parse_expr;
use rustyline::{DefaultEditor, error::ReadlineError};
use std::process::ExitCode;

const CONTINUATION_PROMPT: &str = "... ";

pub fn run_repl(sess: &Session, opts: &Opts) -> ExitCode {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            sess.dcx.err(format!("cannot start line editor: {err}")).emit();
            return ExitCode::FAILURE;
        }
    };
    let mut ev = Evaluator::new(sess);
    let mut buffer = String::new();
    let mut blank_lines = 0usize;

    loop {
        let prompt = if buffer.is_empty() { opts.prompt.as_str() } else { CONTINUATION_PROMPT };
        let line = match rl.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                blank_lines = 0;
                continue;
            }
            Err(ReadlineError::Eof) => return ExitCode::SUCCESS,
            Err(err) => {
                sess.dcx.err(format!("input error: {err}")).emit();
                return ExitCode::FAILURE;
            }
        };

        let trimmed = line.trim();
        if buffer.is_empty() {
            match trimmed {
                "" => continue,
                "quit" | "exit" => return ExitCode::SUCCESS,
                "help" => {
                    print_help();
                    continue;
                }
                "clear" | ":clear" | ":reset" => {
                    blank_lines = 0;
                    continue;
                }
                _ => {}
            }
        } else {
            match trimmed {
                ":reset" | ":clear" => {
                    buffer.clear();
                    blank_lines = 0;
                    continue;
                }
                "" => {
                    blank_lines += 1;
                    if blank_lines >= 2 {
                        buffer.clear();
                        blank_lines = 0;
                    }
                    continue;
                }
                _ => blank_lines = 0,
            }
        }

        buffer.push_str(&line);
        buffer.push('\n');
        let input = buffer.trim().to_string();
        match parse_expr(&input) {
            Err(err) if err.incomplete => continue,
            Err(err) => {
                buffer.clear();
                sess.dcx.err(format!("parse error: {err}")).emit();
            }
            Ok(expr) => {
                buffer.clear();
                let _ = rl.add_history_entry(&input);
                match ev.eval(&expr) {
                    // `Null` results stay silent.
                    Ok(value) if value.is_null() => {}
                    Ok(value) => println!("{value}"),
                    Err(err) => print_error(&err),
                }
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  quit, exit       leave the REPL");
    println!("  help             show this help");
    println!("  clear, :reset    abandon the current input buffer");
    println!();
    println!("Multi-line input continues while a statement is unterminated;");
    println!("two blank lines abandon it.");
}
