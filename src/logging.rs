//! Pretty-printing diagnostics to the console

use colored::Colorize;

use crate::assembler::errors::{Diagnostic, DiagnosticKind};

/// Print one diagnostic to stderr, errors in red and warnings in yellow.
pub fn report(diagnostic: &Diagnostic) {
    let rendered = diagnostic.to_string();
    match diagnostic.kind {
        DiagnosticKind::Error(_) => eprintln!("{}", rendered.red()),
        DiagnosticKind::Warning(_) => eprintln!("{}", rendered.yellow()),
    }
}

/// Print a batch of diagnostics in the order they were recorded.
pub fn report_all(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        report(diagnostic);
    }
}
