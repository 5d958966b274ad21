//! One parsed instruction line: the mnemonic, its operand texts and their
//! spans. The spans feed the `<<<-- ERROR HERE` excerpts of second-pass
//! diagnostics.

use crate::assembler::errors::ErrorKind;
use crate::assembler::instructions::{self, OpcodeInfo};

/// Byte range of a token within the parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

/// An instruction line, split into mnemonic and operands.
#[derive(Debug)]
pub struct Statement<'a> {
    pub info: &'static OpcodeInfo,
    pub operands: Vec<&'a str>,
    pub operand_spans: Vec<TokenSpan>,
    pub line_number: usize,
    text: &'a str,
}

impl<'a> Statement<'a> {
    /// Parse the content of an instruction line (after any label).
    ///
    /// Enforces the comma grammar: exactly the operand count the opcode
    /// expects, a single comma between two operands, nothing after the
    /// last one.
    pub fn parse(text: &'a str, line_number: usize) -> Result<Statement<'a>, ErrorKind> {
        let mut pos = skip_ws(text, 0);
        let mnemonic_end = token_end(text, pos);
        let mnemonic = &text[pos..mnemonic_end];
        let info = instructions::lookup(mnemonic).ok_or(ErrorKind::UnknownCommand)?;
        pos = skip_ws(text, mnemonic_end);

        let mut operands = Vec::with_capacity(info.operands);
        let mut operand_spans = Vec::with_capacity(info.operands);
        let mut take_operand = |pos: usize| -> Result<usize, ErrorKind> {
            let end = token_or_comma_end(text, pos);
            if end == pos {
                return Err(ErrorKind::InvalidParamCount);
            }
            operands.push(&text[pos..end]);
            operand_spans.push(TokenSpan { start: pos, end });
            Ok(end)
        };

        match info.operands {
            0 => {
                if pos != text.len() {
                    return Err(ErrorKind::ExtraTextAfterCommand);
                }
            }
            1 => {
                if pos == text.len() {
                    return Err(ErrorKind::InvalidParamCount);
                }
                pos = skip_ws(text, take_operand(pos)?);
                if pos != text.len() {
                    return Err(ErrorKind::ExtraTextAfterCommand);
                }
            }
            _ => {
                if pos == text.len() {
                    return Err(ErrorKind::InvalidParamCount);
                }
                pos = skip_ws(text, take_operand(pos)?);
                if pos == text.len() || text.as_bytes()[pos] != b',' {
                    return Err(ErrorKind::MissingComma);
                }
                pos = skip_ws(text, pos + 1);
                if pos < text.len() && text.as_bytes()[pos] == b',' {
                    return Err(ErrorKind::ConsecutiveCommas);
                }
                if pos == text.len() {
                    return Err(ErrorKind::InvalidParamCount);
                }
                pos = skip_ws(text, take_operand(pos)?);
                if pos != text.len() {
                    return Err(ErrorKind::ExtraTextAfterCommand);
                }
            }
        }

        Ok(Statement {
            info,
            operands,
            operand_spans,
            line_number,
            text,
        })
    }

    /// The line content up to (and including) the given operand, for
    /// diagnostics that point into the source.
    pub fn excerpt(&self, operand_index: usize) -> &str {
        let end = self.operand_spans[operand_index].end;
        self.text[..end].trim_start()
    }
}

fn skip_ws(text: &str, pos: usize) -> usize {
    text.len() - text[pos..].trim_start().len()
}

fn token_end(text: &str, pos: usize) -> usize {
    text[pos..]
        .find(|c: char| c.is_whitespace())
        .map_or(text.len(), |offset| pos + offset)
}

fn token_or_comma_end(text: &str, pos: usize) -> usize {
    text[pos..]
        .find(|c: char| c.is_whitespace() || c == ',')
        .map_or(text.len(), |offset| pos + offset)
}
