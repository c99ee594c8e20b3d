//! Diagnostics context.
//!
//! Kernel errors are expression values and travel through evaluation results;
//! this module only covers the host-facing side: counted, colored
//! `error:`/`warning:`/`note:` lines on stderr, as emitted by the REPL and
//! the batch executor.

use anstream::AutoStream;
use anstyle::{AnsiColor, Style};
use std::{
    io::Write,
    sync::atomic::{AtomicUsize, Ordering},
};

pub use anstream::ColorChoice;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// A note attached to the previous diagnostic.
    Note,
    /// A warning; does not affect the error count.
    Warning,
    /// An error; counted and turned into a failing exit code.
    Error,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    fn style(self) -> Style {
        let color = match self {
            Self::Note => AnsiColor::Cyan,
            Self::Warning => AnsiColor::Yellow,
            Self::Error => AnsiColor::Red,
        };
        Style::new().fg_color(Some(color.into())).bold()
    }
}

/// The diagnostics context, owned by a [`Session`](crate::Session).
pub struct DiagCtxt {
    color: ColorChoice,
    err_count: AtomicUsize,
}

impl Default for DiagCtxt {
    fn default() -> Self {
        Self::new(ColorChoice::Auto)
    }
}

impl DiagCtxt {
    /// Creates a new diagnostics context printing to stderr.
    pub fn new(color: ColorChoice) -> Self {
        Self { color, err_count: AtomicUsize::new(0) }
    }

    /// Starts an error-level diagnostic.
    pub fn err(&self, msg: impl Into<String>) -> Diag<'_> {
        Diag { dcx: self, level: Level::Error, msg: msg.into(), notes: Vec::new() }
    }

    /// Starts a warning-level diagnostic.
    pub fn warn(&self, msg: impl Into<String>) -> Diag<'_> {
        Diag { dcx: self, level: Level::Warning, msg: msg.into(), notes: Vec::new() }
    }

    /// The number of errors emitted so far.
    pub fn err_count(&self) -> usize {
        self.err_count.load(Ordering::Relaxed)
    }

    /// Returns `true` if any error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.err_count() > 0
    }

    fn emit(&self, diag: &Diag<'_>) {
        if diag.level == Level::Error {
            self.err_count.fetch_add(1, Ordering::Relaxed);
        }
        let mut out = AutoStream::new(std::io::stderr(), self.color);
        let style = diag.level.style();
        let _ = writeln!(out, "{style}{}{style:#}: {}", diag.level.label(), diag.msg);
        let note_style = Level::Note.style();
        for note in &diag.notes {
            let _ = writeln!(out, "  {note_style}note{note_style:#}: {note}");
        }
    }
}

/// A diagnostic under construction. Does nothing unless [`emit`](Self::emit)ted.
#[must_use = "diagnostics do nothing unless emitted"]
pub struct Diag<'a> {
    dcx: &'a DiagCtxt,
    level: Level,
    msg: String,
    notes: Vec<String>,
}

impl Diag<'_> {
    /// Attaches a note to the diagnostic.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Emits the diagnostic.
    pub fn emit(self) {
        self.dcx.emit(&self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_errors() {
        let dcx = DiagCtxt::new(ColorChoice::Never);
        assert!(!dcx.has_errors());
        dcx.err("boom").emit();
        dcx.warn("eh").emit();
        dcx.err("boom again").note("twice").emit();
        assert_eq!(dcx.err_count(), 2);
    }
}
