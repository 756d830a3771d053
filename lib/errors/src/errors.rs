use std::{
    fmt::{self, Display, Formatter},
    ops::Deref,
};

use itertools::Itertools;

pub use cursor::Line;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Runtime,
}

/// Where on its line an error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Unspecified,
    AtEnd,
    At(String),
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Location::Unspecified => Ok(()),
            Location::AtEnd => write!(f, " at end"),
            Location::At(lexeme) => write!(f, " at '{lexeme}'"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub line: Line,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, line: Line, location: Location, message: impl ToString) -> Self {
        Self { kind, line, location, message: message.to_string() }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Runtime => write!(f, "{}\n[line {}]", self.message, self.line),
            ErrorKind::Lexical | ErrorKind::Syntax => {
                write!(f, "[line {}] Error{}: {}", self.line, self.location, self.message)
            }
        }
    }
}

/// The sink every stage reports its errors into.
///
/// Implementors decide how diagnostics are presented. The stages only ever construct the
/// message and ask `had_error` to decide whether the next stage should run at all.
pub trait ErrorReporter {
    fn report(&mut self, diagnostic: Diagnostic);

    /// Whether a lexical or syntax error was reported.
    fn had_error(&self) -> bool;

    fn had_runtime_error(&self) -> bool;

    fn error(&mut self, line: Line, message: &str) {
        self.report(Diagnostic::new(ErrorKind::Lexical, line, Location::Unspecified, message))
    }

    fn error_at(&mut self, line: Line, location: Location, message: &str) {
        self.report(Diagnostic::new(ErrorKind::Syntax, line, location, message))
    }

    fn runtime_error(&mut self, line: Line, message: &str) {
        self.report(Diagnostic::new(ErrorKind::Runtime, line, Location::Unspecified, message))
    }
}

/// Collects diagnostics in the order they were reported.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Clears both error flags along with the collected diagnostics.
    pub fn reset(&mut self) {
        self.diagnostics.clear();
        self.had_error = false;
        self.had_runtime_error = false;
    }
}

impl ErrorReporter for Reporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::debug!("Reported {:?}", diagnostic);
        match diagnostic.kind {
            ErrorKind::Runtime => self.had_runtime_error = true,
            ErrorKind::Lexical | ErrorKind::Syntax => self.had_error = true,
        }
        self.diagnostics.push(diagnostic);
    }

    fn had_error(&self) -> bool {
        self.had_error
    }

    fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }
}

impl Deref for Reporter {
    type Target = [Diagnostic];

    fn deref(&self) -> &Self::Target {
        &self.diagnostics
    }
}

impl Display for Reporter {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.diagnostics.iter().join("\n"))
    }
}
