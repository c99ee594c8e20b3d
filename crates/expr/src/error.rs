use crate::Expr;
use finch_interface::{Symbol, kw};

/// The canonical error kinds, exposed to users by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong number or shape of arguments.
    Argument,
    /// An argument failed a type check beyond its pattern.
    Type,
    DivisionByZero,
    Mathematical,
    /// Write to a protected symbol.
    Protected,
    /// Index out of range or invalid sub-expression access.
    Part,
    /// Frame cap exceeded.
    Recursion,
    /// Invalid rewrite rule registration.
    Definition,
    /// Failure to install a pattern binding.
    Binding,
    AssertionFailed,
    /// Produced by the parser; carried into the REPL but not into evaluation.
    Parse,
}

impl ErrorKind {
    /// The user-visible name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Argument => "ArgumentError",
            Self::Type => "TypeError",
            Self::DivisionByZero => "DivisionByZero",
            Self::Mathematical => "MathematicalError",
            Self::Protected => "Protected",
            Self::Part => "PartError",
            Self::Recursion => "RecursionError",
            Self::Definition => "DefinitionError",
            Self::Binding => "BindingError",
            Self::AssertionFailed => "AssertionFailed",
            Self::Parse => "ParseError",
        }
    }

    /// The pre-interned symbol naming this kind.
    pub fn to_symbol(self) -> Symbol {
        match self {
            Self::Argument => kw::ArgumentError,
            Self::Type => kw::TypeError,
            Self::DivisionByZero => kw::DivisionByZero,
            Self::Mathematical => kw::MathematicalError,
            Self::Protected => kw::Protected,
            Self::Part => kw::PartError,
            Self::Recursion => kw::RecursionError,
            Self::Definition => kw::DefinitionError,
            Self::Binding => kw::BindingError,
            Self::AssertionFailed => kw::AssertionFailed,
            Self::Parse => kw::ParseError,
        }
    }
}

/// One frame of an error's stack trace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TraceFrame {
    /// The name of the function being evaluated; `Symbol::DUMMY` for
    /// headless frames.
    pub name: Symbol,
    /// The expression under evaluation in this frame.
    pub expr: Expr,
}

/// An error value of the algebra.
///
/// Errors short-circuit evaluation; each wrapping layer may append a frame
/// but must not drop the original kind or message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErrorValue {
    pub kind: ErrorKind,
    pub message: String,
    /// The offending sub-expression, if known.
    pub expr: Option<Expr>,
    /// Innermost frame first.
    pub trace: Vec<TraceFrame>,
}

impl ErrorValue {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), expr: None, trace: Vec::new() }
    }

    /// Attaches the offending expression.
    pub fn with_expr(mut self, expr: Expr) -> Self {
        self.expr = Some(expr);
        self
    }

    /// Appends an outer stack frame.
    pub fn push_frame(&mut self, name: Symbol, expr: Expr) {
        self.trace.push(TraceFrame { name, expr });
    }
}

impl std::fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}
