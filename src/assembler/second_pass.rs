//! Second pass: resolve every label reference, promote `.entry` targets
//! and patch the tagged extension words with final addresses and ARE
//! bits.

use crate::assembler::directives;
use crate::assembler::encoder;
use crate::assembler::errors::{Diagnostic, ErrorKind, WarningKind};
use crate::assembler::first_pass::PassOutcome;
use crate::assembler::instructions;
use crate::assembler::lexing;
use crate::assembler::memory::{Image, IC_START};
use crate::assembler::statement::Statement;
use crate::assembler::symbols::{SymbolKind, SymbolTable};

/// Run the second pass over the same `.am` text the first pass read.
pub fn second_pass(
    source: &str,
    symbols: &mut SymbolTable,
    image: &mut Image,
) -> PassOutcome {
    let mut outcome = PassOutcome::default();

    for (index, raw_line) in source.lines().enumerate() {
        let line_number = index + 1;
        if raw_line.trim().is_empty() {
            continue;
        }

        let (label, content) = match lexing::colon_outside_string(raw_line) {
            Some(colon) => (
                raw_line[..colon].trim(),
                lexing::skip_whitespace(&raw_line[colon + 1..]),
            ),
            None => ("", lexing::skip_whitespace(raw_line)),
        };

        if content.starts_with(".extern")
            || content.starts_with(".data")
            || content.starts_with(".string")
        {
            continue; // fully handled by the first pass
        }

        if content.starts_with(".entry") {
            match directives::parse_entry(content) {
                Ok(name) => match symbols.mark_entry(name) {
                    Ok(()) => {}
                    Err(ErrorKind::DuplicateEntryLabel) => {
                        outcome
                            .diagnostics
                            .push(Diagnostic::warning(WarningKind::RedundantEntry, line_number));
                    }
                    Err(kind) => outcome
                        .diagnostics
                        .push(Diagnostic::error(kind, line_number)),
                },
                Err(kind) => outcome
                    .diagnostics
                    .push(Diagnostic::error(kind, line_number)),
            }
            continue;
        }

        // Only well-formed instruction lines are walked; malformed ones
        // were already reported by the first pass.
        let Ok(stmt) = Statement::parse(content, line_number) else {
            continue;
        };
        if instructions::validate_operands(stmt.info, &stmt.operands).is_err() {
            continue;
        }
        for (operand_index, operand) in stmt.operands.iter().copied().enumerate() {
            check_operand_reference(
                operand,
                operand_index,
                &stmt,
                label,
                symbols,
                &mut outcome,
            );
        }
    }

    patch_extension_words(symbols, image);
    outcome
}

/// Direct and relative operands must name symbols that exist and fit the
/// addressing mode; everything else was settled in pass one.
fn check_operand_reference(
    operand: &str,
    operand_index: usize,
    stmt: &Statement<'_>,
    line_label: &str,
    symbols: &SymbolTable,
    outcome: &mut PassOutcome,
) {
    let line_number = stmt.line_number;
    if operand.starts_with('#') || lexing::is_register(operand) {
        return;
    }
    if let Some(target) = operand.strip_prefix('&') {
        let kind = match symbols.lookup(target) {
            None => Some(ErrorKind::UndefinedLabelRelative),
            Some(symbol) if symbol.kind == SymbolKind::External => {
                Some(ErrorKind::RelativeAddressingExternalLabel)
            }
            Some(symbol) if symbol.kind != SymbolKind::Code => {
                Some(ErrorKind::RelativeAddressingToData)
            }
            Some(_) => None,
        };
        if let Some(kind) = kind {
            outcome.diagnostics.push(Diagnostic::error_with_excerpt(
                kind,
                line_number,
                stmt.excerpt(operand_index),
            ));
        }
        return;
    }
    match symbols.lookup(operand) {
        None => {
            outcome.diagnostics.push(Diagnostic::error_with_excerpt(
                ErrorKind::UndefinedLabel,
                line_number,
                stmt.excerpt(operand_index),
            ));
        }
        Some(symbol) if symbol.name == line_label => {
            outcome.diagnostics.push(Diagnostic::error_with_excerpt(
                ErrorKind::LabelUsedInSameLine,
                line_number,
                stmt.excerpt(operand_index),
            ));
        }
        Some(_) => {}
    }
}

/// Rewrite every tagged word in the code segment with its final payload.
/// Unresolvable tags stay as placeholders; their lines were already
/// diagnosed and the file will not be emitted.
fn patch_extension_words(symbols: &SymbolTable, image: &mut Image) {
    for address in IC_START..image.ic() {
        let Some(tag) = image.word_at(address).and_then(|word| word.tag.clone()) else {
            continue;
        };
        if let Some(target) = tag.strip_prefix('&') {
            if let Some(symbol) = symbols.lookup(target) {
                // distance measured from the instruction word, one slot back
                let distance = symbol.address as i32 - (address as i32 - 1);
                if let Some(word) = image.word_at_mut(address) {
                    word.value = encoder::relative_word(distance);
                }
            }
        } else if let Some(symbol) = symbols.lookup(&tag) {
            let external = symbol.kind == SymbolKind::External;
            let payload = encoder::direct_word(symbol.address, external);
            if let Some(word) = image.word_at_mut(address) {
                word.value = payload;
            }
        }
    }
}
