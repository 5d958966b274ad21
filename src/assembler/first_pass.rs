//! First pass over the `.am` intermediate: classify every line, build the
//! symbol table, encode code words at IC and buffer data words so they
//! can follow the code.

use crate::assembler::directives;
use crate::assembler::encoder;
use crate::assembler::errors::{Diagnostic, ErrorKind, WarningKind};
use crate::assembler::instructions;
use crate::assembler::lexing;
use crate::assembler::memory::{Image, Word};
use crate::assembler::preprocessor::MacroTable;
use crate::assembler::statement::Statement;
use crate::assembler::symbols::{validate_label_name, SymbolKind, SymbolTable};

/// What a pass produced besides its side effects on the table and image.
#[derive(Debug, Default)]
pub struct PassOutcome {
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the pass had to stop early (storage exhausted).
    pub fatal: Option<ErrorKind>,
}

impl PassOutcome {
    pub fn is_valid(&self) -> bool {
        self.fatal.is_none() && !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    fn error(&mut self, kind: ErrorKind, line: usize) {
        self.diagnostics.push(Diagnostic::error(kind, line));
    }

    fn warning(&mut self, kind: WarningKind, line: usize) {
        self.diagnostics.push(Diagnostic::warning(kind, line));
    }
}

/// Run the first pass. Code words are written to `image` as they are
/// encoded; data words are buffered and appended after the scan, then
/// every data symbol is shifted by the final IC.
pub fn first_pass(
    source: &str,
    symbols: &mut SymbolTable,
    image: &mut Image,
    macros: &MacroTable,
) -> PassOutcome {
    let mut outcome = PassOutcome::default();
    let mut data_buffer: Vec<Word> = Vec::new();

    for (index, raw_line) in source.lines().enumerate() {
        let line_number = index + 1;
        if raw_line.trim().is_empty() {
            continue;
        }

        // Split off a label definition, if the line has one.
        let (label, content) = match lexing::colon_outside_string(raw_line) {
            Some(colon) => (
                Some(raw_line[..colon].trim()),
                lexing::skip_whitespace(&raw_line[colon + 1..]),
            ),
            None => (None, lexing::skip_whitespace(raw_line)),
        };

        let label = match label {
            Some(name) => match validate_label_name(name) {
                Ok(()) => {
                    if lexing::resembles_register(name) {
                        outcome.warning(WarningKind::LabelResemblesInvalidRegister, line_number);
                    }
                    Some(name)
                }
                Err(kind) => {
                    outcome.error(kind, line_number);
                    continue;
                }
            },
            None => None,
        };

        if content.is_empty() {
            if label.is_some() {
                outcome.error(ErrorKind::InvalidLabelContent, line_number);
            }
            continue;
        }

        if content.starts_with(".extern") {
            if label.is_some() {
                outcome.warning(WarningKind::LabelBeforeExtern, line_number);
            }
            match directives::parse_extern(content) {
                Ok(name) => {
                    if let Err(kind) =
                        symbols.insert(name, line_number, SymbolKind::External, 0, macros)
                    {
                        outcome.error(kind, line_number);
                    }
                }
                Err(kind) => outcome.error(kind, line_number),
            }
            continue;
        }

        if content.starts_with(".entry") {
            // handled by the second pass, once addresses are final
            if label.is_some() {
                outcome.warning(WarningKind::LabelBeforeEntry, line_number);
            }
            continue;
        }

        // Invalid content after a valid label is always the one generic
        // label-content diagnostic; validator sub-kinds apply only to
        // unlabeled lines.
        let content_error = |kind: ErrorKind| {
            if label.is_some() {
                ErrorKind::InvalidLabelContent
            } else {
                kind
            }
        };

        if directives::is_storage_directive(content) {
            match directives::parse_storage(content) {
                Ok(values) => {
                    if let Some(name) = label {
                        // relative offset for now; shifted by the final IC below
                        if let Err(kind) = symbols.insert(
                            name,
                            line_number,
                            SymbolKind::Data,
                            data_buffer.len() as u32,
                            macros,
                        ) {
                            outcome.error(kind, line_number);
                        }
                    }
                    data_buffer.extend(values.into_iter().map(Word::new));
                }
                Err(kind) => outcome.error(content_error(kind), line_number),
            }
            continue;
        }

        // Anything else must be an instruction.
        let stmt = match Statement::parse(content, line_number) {
            Ok(stmt) => stmt,
            Err(kind) => {
                outcome.error(content_error(kind), line_number);
                continue;
            }
        };
        let operands = match instructions::validate_operands(stmt.info, &stmt.operands) {
            Ok(operands) => operands,
            Err(kind) => {
                outcome.error(content_error(kind), line_number);
                continue;
            }
        };
        if let Some(name) = label {
            if let Err(kind) =
                symbols.insert(name, line_number, SymbolKind::Code, image.ic(), macros)
            {
                outcome.error(kind, line_number);
            }
        }
        for word in encoder::encode_instruction(stmt.info, &operands) {
            if let Err(kind) = image.push_code(word) {
                outcome.fatal = Some(kind);
                return outcome;
            }
        }
    }

    let final_ic = image.ic();
    if let Err(kind) = image.append_data(data_buffer) {
        outcome.fatal = Some(kind);
        return outcome;
    }
    symbols.relocate_data(final_ic);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::memory::IC_START;

    fn run(source: &str) -> (SymbolTable, Image, PassOutcome) {
        let mut symbols = SymbolTable::new();
        let mut image = Image::new();
        let macros = MacroTable::new();
        let outcome = first_pass(source, &mut symbols, &mut image, &macros);
        (symbols, image, outcome)
    }

    fn error_kinds(outcome: &PassOutcome) -> Vec<ErrorKind> {
        outcome
            .diagnostics
            .iter()
            .filter_map(|diag| diag.error_kind())
            .collect()
    }

    #[test]
    fn immediate_and_register_operands() {
        let (symbols, image, outcome) = run("MAIN: mov #3, r1\n stop\n");
        assert!(outcome.is_valid(), "{:?}", outcome.diagnostics);
        assert_eq!(image.ic(), 103);
        assert_eq!(image.dc(), 0);
        assert_eq!(symbols.lookup("MAIN").unwrap().address, IC_START);
        // word at 101 is the immediate extension for 3
        assert_eq!(image.word_at(101).unwrap().bits(), (3 << 3) | 0b100);
    }

    #[test]
    fn register_only_instruction_is_one_word() {
        let (_, image, outcome) = run("mov r1, r2\n stop\n");
        assert!(outcome.is_valid());
        assert_eq!(image.ic(), 102);
    }

    #[test]
    fn data_follows_code_and_symbols_are_relocated() {
        let (symbols, image, outcome) = run("mov r1, r2\nNUMS: .data 5, -1, 7\n stop\n");
        assert!(outcome.is_valid(), "{:?}", outcome.diagnostics);
        assert_eq!(image.ic(), 102);
        assert_eq!(image.dc(), 3);
        let nums = symbols.lookup("NUMS").unwrap();
        assert_eq!(nums.kind, SymbolKind::Data);
        assert_eq!(nums.address, 102);
        assert_eq!(image.word_at(102).unwrap().bits(), 5);
        assert_eq!(image.word_at(103).unwrap().bits(), 0xFF_FFFF);
        assert_eq!(image.word_at(104).unwrap().bits(), 7);
    }

    #[test]
    fn string_adds_terminating_nul() {
        let (symbols, image, outcome) = run("MSG: .string \"ab\"\n stop\n");
        assert!(outcome.is_valid());
        assert_eq!(image.dc(), 3);
        assert_eq!(symbols.lookup("MSG").unwrap().address, 101);
        assert_eq!(image.word_at(101).unwrap().bits(), 'a' as u32);
        assert_eq!(image.word_at(102).unwrap().bits(), 'b' as u32);
        assert_eq!(image.word_at(103).unwrap().bits(), 0);
    }

    #[test]
    fn forward_reference_leaves_tagged_word() {
        let (_, image, outcome) = run("jmp END\nEND: stop\n");
        assert!(outcome.is_valid());
        assert_eq!(image.ic(), 103);
        assert_eq!(image.word_at(101).unwrap().tag.as_deref(), Some("END"));
    }

    #[test]
    fn extern_declaration_adds_symbol_without_words() {
        let (symbols, image, outcome) = run(".extern KBD\n stop\n");
        assert!(outcome.is_valid());
        assert_eq!(image.ic(), 101);
        let kbd = symbols.lookup("KBD").unwrap();
        assert_eq!(kbd.kind, SymbolKind::External);
        assert_eq!(kbd.address, 0);
    }

    #[test]
    fn label_before_extern_is_warned_and_dropped() {
        let (symbols, _, outcome) = run("IGNORED: .extern KBD\n stop\n");
        assert!(outcome.is_valid());
        assert!(symbols.lookup("IGNORED").is_none());
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.warning_kind() == Some(WarningKind::LabelBeforeExtern)));
    }

    #[test]
    fn label_before_entry_is_warned_and_dropped() {
        let (symbols, _, outcome) = run("MAIN: stop\nIGNORED: .entry MAIN\n");
        assert!(outcome.is_valid());
        assert!(symbols.lookup("IGNORED").is_none());
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.warning_kind() == Some(WarningKind::LabelBeforeEntry)));
    }

    #[test]
    fn register_lookalike_label_warns_but_assembles() {
        let (symbols, _, outcome) = run("r9: stop\n");
        assert!(outcome.is_valid());
        assert!(symbols.lookup("r9").is_some());
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.warning_kind() == Some(WarningKind::LabelResemblesInvalidRegister)));
    }

    #[test]
    fn invalid_operand_mode_is_reported() {
        let (_, _, outcome) = run("lea r1, r2\n");
        assert_eq!(
            error_kinds(&outcome),
            [ErrorKind::InvalidDirectFirstOperand]
        );
    }

    #[test]
    fn unknown_command_is_reported() {
        let (_, _, outcome) = run("frobnicate r1\n");
        assert_eq!(error_kinds(&outcome), [ErrorKind::UnknownCommand]);
    }

    #[test]
    fn bare_label_line_is_invalid_content() {
        let (_, _, outcome) = run("LONELY:\n");
        assert_eq!(error_kinds(&outcome), [ErrorKind::InvalidLabelContent]);
    }

    #[test]
    fn labeled_invalid_content_masks_the_specific_error() {
        // any bad content after a valid label reads as label content,
        // whether it is a broken directive, an unknown mnemonic or a
        // mode mismatch
        let (_, _, outcome) = run("N: .data 1,\nX: frobnicate r1\nY: lea r1, r2\n");
        assert_eq!(
            error_kinds(&outcome),
            [
                ErrorKind::InvalidLabelContent,
                ErrorKind::InvalidLabelContent,
                ErrorKind::InvalidLabelContent,
            ]
        );
    }

    #[test]
    fn unlabeled_invalid_lines_keep_their_specific_kinds() {
        let (_, _, outcome) = run(".data 1,\nfrobnicate r1\n");
        assert_eq!(
            error_kinds(&outcome),
            [
                ErrorKind::InvalidDataTrailingComma,
                ErrorKind::UnknownCommand,
            ]
        );
    }

    #[test]
    fn duplicate_label_keeps_scanning() {
        let (_, image, outcome) = run("A: stop\nA: stop\n stop\n");
        assert_eq!(error_kinds(&outcome), [ErrorKind::LabelDuplicate]);
        // the duplicate line is still encoded so later addresses stay right
        assert_eq!(image.ic(), 103);
    }

    #[test]
    fn colon_inside_string_is_not_a_label() {
        let (symbols, image, outcome) = run("S: .string \"a:b\"\n stop\n");
        assert!(outcome.is_valid(), "{:?}", outcome.diagnostics);
        assert!(symbols.lookup("S").is_some());
        assert_eq!(image.dc(), 4);
    }

    #[test]
    fn multiple_errors_accumulate_in_line_order() {
        let (_, _, outcome) = run("bogus\n.data x\nlea r1, r2\n");
        assert_eq!(
            error_kinds(&outcome),
            [
                ErrorKind::UnknownCommand,
                ErrorKind::InvalidDataNonNumeric,
                ErrorKind::InvalidDirectFirstOperand,
            ]
        );
    }
}
