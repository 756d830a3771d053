use ast::{AstPrinter, Expr};
use errors::ErrorReporter;

use crate::Interpreter;

/// Scans and parses `source`. Parsing is skipped if scanning reported an error.
pub fn parse_source(source: &str, reporter: &mut dyn ErrorReporter) -> Option<Expr> {
    let tokens = scanner::scan(source, reporter);
    if reporter.had_error() {
        log::debug!("Skipping parse after lexical errors");
        return None;
    }

    let expr = parser::parse(tokens, reporter)?;
    log::debug!("Parsed {}", AstPrinter.print(&expr));
    Some(expr)
}

/// Runs the whole pipeline on `source` and returns the rendered value.
///
/// Every stage is fresh for each call, the only state carried between calls is whatever
/// `reporter` accumulates.
pub fn run_source(source: &str, reporter: &mut dyn ErrorReporter) -> Option<String> {
    let expr = parse_source(source, reporter)?;
    Interpreter::new().interpret(&expr, reporter)
}
