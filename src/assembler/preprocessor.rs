//! The macro preprocessor: collects `mcro ... mcroend` definitions and
//! rewrites the source into the flat `.am` intermediate that both passes
//! read. Comments and blank lines never survive into the intermediate.

use std::fs;
use std::path::Path;

use crate::assembler::errors::{Diagnostic, ErrorKind};
use crate::assembler::instructions;
use crate::assembler::lexing;

/// Longest accepted source line, newline excluded.
pub const MAX_LINE_LENGTH: usize = 80;

/// Fixed capacity of the macro table.
pub const MAX_MACROS: usize = 50;

/// Most body lines a single macro may hold.
pub const MAX_MACRO_LINES: usize = 100;

/// Longest accepted macro name, same limit as labels.
pub const MAX_MACRO_NAME_LENGTH: usize = 30;

#[derive(Debug, Clone)]
pub struct Macro {
    pub name: String,
    pub body: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MacroTable {
    macros: Vec<Macro>,
}

impl MacroTable {
    pub fn new() -> MacroTable {
        MacroTable { macros: Vec::new() }
    }

    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.macros.iter().find(|mac| mac.name == name)
    }

    /// Register a new macro under `name` after validating it.
    pub fn add(&mut self, name: &str) -> Result<(), ErrorKind> {
        validate_macro_name(name)?;
        if self.get(name).is_some() {
            return Err(ErrorKind::McroDuplicate);
        }
        if self.macros.len() >= MAX_MACROS {
            return Err(ErrorKind::MemoryAllocation);
        }
        self.macros.push(Macro {
            name: name.to_string(),
            body: Vec::new(),
        });
        Ok(())
    }

    /// Append one body line to the most recently added macro.
    fn append_line(&mut self, line: &str) -> Result<(), ErrorKind> {
        let Some(current) = self.macros.last_mut() else {
            return Err(ErrorKind::McroBeforeDef);
        };
        if current.body.len() >= MAX_MACRO_LINES {
            return Err(ErrorKind::MemoryAllocation);
        }
        current.body.push(line.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

/// Macro names obey the label lexical rules, with macro-specific
/// diagnostics for each way to get them wrong.
fn validate_macro_name(name: &str) -> Result<(), ErrorKind> {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return Err(ErrorKind::McroIllegalStart),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ErrorKind::McroIllegalChar);
    }
    if lexing::is_register(name) {
        return Err(ErrorKind::McroIsRegister);
    }
    if instructions::is_reserved_word(name) || name == "mcro" || name == "mcroend" {
        return Err(ErrorKind::McroReservedName);
    }
    if name.len() > MAX_MACRO_NAME_LENGTH {
        return Err(ErrorKind::McroTooLong);
    }
    Ok(())
}

/// Everything the expansion produced: the `.am` text, the macro table
/// (the first pass needs it to reject labels that shadow macros) and the
/// diagnostics found along the way.
#[derive(Debug)]
pub struct PreprocessResult {
    pub text: String,
    pub macros: MacroTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl PreprocessResult {
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Expand a source file into its `.am` intermediate form.
///
/// The expansion is purely textual: definitions are removed, call sites
/// are replaced by the recorded body lines, comments are stripped, and
/// every other line is copied through. An invalid definition still
/// swallows its body so the passes do not chase phantom lines.
pub fn expand(source: &str) -> PreprocessResult {
    let mut macros = MacroTable::new();
    let mut diagnostics = Vec::new();
    let mut text = String::new();
    let mut in_macro = false;
    let mut collecting = false;

    for (index, raw_line) in source.lines().enumerate() {
        let line_number = index + 1;

        if raw_line.len() > MAX_LINE_LENGTH {
            diagnostics.push(Diagnostic::error(ErrorKind::LineTooLong, line_number));
            continue;
        }

        let trimmed = lexing::skip_whitespace(raw_line);
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }
        let (first_token, rest) = lexing::split_token(trimmed);

        if in_macro {
            if first_token == "mcroend" {
                if !lexing::rest_is_blank_or_comment(rest) {
                    diagnostics.push(Diagnostic::error(
                        ErrorKind::ExtraTextAfterCommand,
                        line_number,
                    ));
                }
                in_macro = false;
                continue;
            }
            if collecting {
                let body_line = lexing::strip_comment(trimmed).trim_end();
                if body_line.is_empty() {
                    continue;
                }
                if let Err(kind) = macros.append_line(body_line) {
                    diagnostics.push(Diagnostic::error(kind, line_number));
                    collecting = false;
                }
            }
            continue;
        }

        if first_token == "mcro" {
            in_macro = true;
            let after = lexing::skip_whitespace(rest);
            if after.is_empty() || after.starts_with(';') {
                diagnostics.push(Diagnostic::error(ErrorKind::McroNoName, line_number));
                collecting = false;
                continue;
            }
            let (name, after_name) = lexing::split_token(after);
            if !lexing::rest_is_blank_or_comment(after_name) {
                diagnostics.push(Diagnostic::error(
                    ErrorKind::McroUnexpectedText,
                    line_number,
                ));
            }
            match macros.add(name) {
                Ok(()) => collecting = true,
                Err(kind) => {
                    diagnostics.push(Diagnostic::error(kind, line_number));
                    collecting = false;
                }
            }
            continue;
        }

        if first_token == "mcroend" {
            diagnostics.push(Diagnostic::error(ErrorKind::McroBeforeDef, line_number));
            continue;
        }

        if let Some(mac) = macros.get(first_token) {
            if !lexing::rest_is_blank_or_comment(rest) {
                diagnostics.push(Diagnostic::error(
                    ErrorKind::MacroCallExtraText,
                    line_number,
                ));
            }
            for body_line in &mac.body {
                text.push_str(body_line);
                text.push('\n');
            }
            continue;
        }

        // A labeled call (`START: PUSH`) splices the label onto the first
        // body line so the label lands on the first expanded word.
        if first_token.ends_with(':') {
            let after_label = lexing::skip_whitespace(rest);
            let (second_token, call_rest) = lexing::split_token(after_label);
            if let Some(mac) = macros.get(second_token) {
                if !lexing::rest_is_blank_or_comment(call_rest) {
                    diagnostics.push(Diagnostic::error(
                        ErrorKind::MacroCallExtraText,
                        line_number,
                    ));
                }
                for (body_index, body_line) in mac.body.iter().enumerate() {
                    if body_index == 0 {
                        text.push_str(first_token);
                        text.push(' ');
                    }
                    text.push_str(body_line);
                    text.push('\n');
                }
                continue;
            }
        }

        let stripped = lexing::strip_comment(raw_line).trim_end();
        if stripped.trim_start().is_empty() {
            continue;
        }
        text.push_str(stripped);
        text.push('\n');
    }

    PreprocessResult {
        text,
        macros,
        diagnostics,
    }
}

/// Expand `source_path` and write the result next to it as `am_path`.
/// The `.am` is written even when the expansion reported errors, so the
/// passes can surface more diagnostics before the driver gives up.
pub fn preprocess_file(source_path: &Path, am_path: &Path) -> Result<PreprocessResult, ErrorKind> {
    let source = fs::read_to_string(source_path).map_err(|_| ErrorKind::FileRead)?;
    let result = expand(&source);
    fs::write(am_path, &result.text).map_err(|_| ErrorKind::FileWrite)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::errors::WarningKind;

    fn error_kinds(result: &PreprocessResult) -> Vec<ErrorKind> {
        result
            .diagnostics
            .iter()
            .filter_map(Diagnostic::error_kind)
            .collect()
    }

    #[test]
    fn plain_lines_copy_through_without_comments() {
        let result = expand("; header\nMAIN: mov r1, r2 ; copy\n\n stop\n");
        assert!(result.is_valid());
        assert_eq!(result.text, "MAIN: mov r1, r2\n stop\n");
    }

    #[test]
    fn labeled_call_splices_label_onto_first_body_line() {
        let source = "mcro PUSH\n mov r1, r2\nmcroend\nSTART: PUSH\n stop\n";
        let result = expand(source);
        assert!(result.is_valid());
        assert_eq!(result.text, "START: mov r1, r2\n stop\n");
    }

    #[test]
    fn call_without_label_expands_to_body() {
        let source = "mcro PUSH\nmov r1, r2\nmcroend\nPUSH\nstop\n";
        let result = expand(source);
        assert!(result.is_valid());
        assert_eq!(result.text, "mov r1, r2\nstop\n");
        assert_eq!(result.macros.len(), 1);
        assert_eq!(result.macros.get("PUSH").unwrap().body, ["mov r1, r2"]);
    }

    #[test]
    fn body_indentation_is_trimmed() {
        let source = "mcro TWICE\n    inc r1\n    inc r1\nmcroend\nTWICE\n";
        let result = expand(source);
        assert_eq!(result.text, "inc r1\ninc r1\n");
    }

    #[test]
    fn long_line_is_skipped_and_flagged() {
        let long = "a".repeat(MAX_LINE_LENGTH + 1);
        let result = expand(&format!("{long}\nstop\n"));
        assert_eq!(error_kinds(&result), [ErrorKind::LineTooLong]);
        assert_eq!(result.text, "stop\n");
    }

    #[test]
    fn exactly_80_characters_is_fine() {
        let line = format!("{}{}", "stop ;", "x".repeat(MAX_LINE_LENGTH - 6));
        assert_eq!(line.len(), MAX_LINE_LENGTH);
        let result = expand(&line);
        assert!(result.is_valid());
    }

    #[test]
    fn missing_macro_name() {
        let result = expand("mcro\nmov r1, r2\nmcroend\n");
        assert_eq!(error_kinds(&result), [ErrorKind::McroNoName]);
        // the body is still swallowed
        assert_eq!(result.text, "");
    }

    #[test]
    fn invalid_macro_names() {
        assert_eq!(
            error_kinds(&expand("mcro 1up\nmcroend\n")),
            [ErrorKind::McroIllegalStart]
        );
        assert_eq!(
            error_kinds(&expand("mcro up!\nmcroend\n")),
            [ErrorKind::McroIllegalChar]
        );
        assert_eq!(
            error_kinds(&expand("mcro r2\nmcroend\n")),
            [ErrorKind::McroIsRegister]
        );
        assert_eq!(
            error_kinds(&expand("mcro mov\nmcroend\n")),
            [ErrorKind::McroReservedName]
        );
        assert_eq!(
            error_kinds(&expand("mcro .data\nmcroend\n")),
            [ErrorKind::McroReservedName]
        );
        let long_name = "m".repeat(MAX_MACRO_NAME_LENGTH + 1);
        assert_eq!(
            error_kinds(&expand(&format!("mcro {long_name}\nmcroend\n"))),
            [ErrorKind::McroTooLong]
        );
    }

    #[test]
    fn duplicate_macro_definition() {
        let source = "mcro A\nstop\nmcroend\nmcro A\nrts\nmcroend\n";
        assert_eq!(error_kinds(&expand(source)), [ErrorKind::McroDuplicate]);
    }

    #[test]
    fn text_after_macro_name_is_flagged() {
        let result = expand("mcro PUSH extra\nmov r1, r2\nmcroend\nPUSH\n");
        assert_eq!(error_kinds(&result), [ErrorKind::McroUnexpectedText]);
        // the macro still collects, so the call expands
        assert_eq!(result.text, "mov r1, r2\n");
    }

    #[test]
    fn text_after_mcroend_is_flagged() {
        let result = expand("mcro A\nstop\nmcroend junk\nA\n");
        assert_eq!(error_kinds(&result), [ErrorKind::ExtraTextAfterCommand]);
        assert_eq!(result.text, "stop\n");
    }

    #[test]
    fn comment_after_mcroend_is_fine() {
        let result = expand("mcro A\nstop\nmcroend ; done\nA\n");
        assert!(result.is_valid());
    }

    #[test]
    fn stray_mcroend() {
        assert_eq!(error_kinds(&expand("mcroend\n")), [ErrorKind::McroBeforeDef]);
    }

    #[test]
    fn call_with_extra_text_is_flagged_but_expanded() {
        let result = expand("mcro A\nstop\nmcroend\nA trailing\n");
        assert_eq!(error_kinds(&result), [ErrorKind::MacroCallExtraText]);
        assert_eq!(result.text, "stop\n");
    }

    #[test]
    fn call_followed_by_comment_is_fine() {
        let result = expand("mcro A\nstop\nmcroend\nA ; note\n");
        assert!(result.is_valid());
        assert_eq!(result.text, "stop\n");
    }

    #[test]
    fn macro_body_line_limit() {
        let mut source = String::from("mcro BIG\n");
        for _ in 0..(MAX_MACRO_LINES + 1) {
            source.push_str("inc r1\n");
        }
        source.push_str("mcroend\n");
        assert_eq!(error_kinds(&expand(&source)), [ErrorKind::MemoryAllocation]);
    }

    #[test]
    fn unused_warning_kinds_are_not_emitted_here() {
        let result = expand("mcro A\nstop\nmcroend\nA\n");
        assert!(result
            .diagnostics
            .iter()
            .all(|d| d.warning_kind() != Some(WarningKind::RedundantEntry)));
    }
}
