//! Validators for the four directives. `.data` and `.string` produce the
//! word values to buffer; `.extern` and `.entry` produce the referenced
//! label name.

use std::sync::LazyLock;

use regex::Regex;

use crate::assembler::errors::ErrorKind;
use crate::assembler::lexing;
use crate::assembler::symbols;

/// Smallest value a 24-bit data word can hold.
pub const DATA_MIN: i64 = -(1 << 23);

/// Largest value a 24-bit data word can hold.
pub const DATA_MAX: i64 = (1 << 23) - 1;

/// A numeric token with a decimal point - rejected, but with its own
/// diagnostic so `3.14` does not read as a stray character.
static REAL_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]*\.[0-9]*$").unwrap());

/// Does this content line start a `.data`/`.string` directive?
pub fn is_storage_directive(content: &str) -> bool {
    let (first_token, _) = lexing::split_token(lexing::skip_whitespace(content));
    first_token == ".data" || first_token == ".string"
}

/// Validate a storage directive and return the data words it stores.
pub fn parse_storage(content: &str) -> Result<Vec<i32>, ErrorKind> {
    let trimmed = lexing::skip_whitespace(content);
    let (first_token, rest) = lexing::split_token(trimmed);
    match first_token {
        ".data" => parse_data(rest),
        ".string" => parse_string(rest),
        _ => Err(ErrorKind::InvalidStorageDirective),
    }
}

/// `.data <int>(, <int>)*` - at least one integer, single commas between
/// numbers, each value within the 24-bit signed range.
fn parse_data(args: &str) -> Result<Vec<i32>, ErrorKind> {
    let mut rest = lexing::skip_whitespace(args);
    if rest.is_empty() {
        return Err(ErrorKind::InvalidDataNoNumber);
    }

    let mut values = Vec::new();
    loop {
        let (token, after) = lexing::split_token_or_comma(rest);
        if token.is_empty() {
            // a comma (or other separator) where a number should be
            return Err(ErrorKind::InvalidDataNonNumeric);
        }
        if lexing::is_integer(token) {
            let value: i64 = token
                .parse()
                .map_err(|_| ErrorKind::InvalidDataTooLarge)?;
            if !(DATA_MIN..=DATA_MAX).contains(&value) {
                return Err(ErrorKind::InvalidDataTooLarge);
            }
            values.push(value as i32);
        } else if REAL_NUMBER_RE.is_match(token) {
            return Err(ErrorKind::InvalidDataRealNumber);
        } else {
            return Err(ErrorKind::InvalidDataNonNumeric);
        }

        rest = lexing::skip_whitespace(after);
        if rest.is_empty() {
            return Ok(values);
        }
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = lexing::skip_whitespace(after_comma);
            if rest.is_empty() {
                return Err(ErrorKind::InvalidDataTrailingComma);
            }
            continue;
        }
        // no comma: a number glued to the next number gets the comma
        // diagnostic, anything else is a stray character
        return Err(
            if rest.starts_with(|c: char| c.is_ascii_digit() || c == '+' || c == '-') {
                ErrorKind::InvalidDataMissingComma
            } else {
                ErrorKind::InvalidDataUnexpectedChar
            },
        );
    }
}

/// `.string "<chars>"` - one quoted run, nothing after the closing quote.
/// Produces the character codes plus a terminating zero word.
fn parse_string(args: &str) -> Result<Vec<i32>, ErrorKind> {
    let rest = lexing::skip_whitespace(args);
    if rest.is_empty() {
        return Err(ErrorKind::StringNoValue);
    }
    let Some(after_quote) = rest.strip_prefix('"') else {
        return Err(ErrorKind::InvalidStringNoQuote);
    };
    let Some(close) = after_quote.find('"') else {
        return Err(ErrorKind::InvalidStringMissingEndQuote);
    };
    let (payload, after) = after_quote.split_at(close);
    if !after[1..].trim().is_empty() {
        return Err(ErrorKind::InvalidStringExtraChars);
    }
    let mut values: Vec<i32> = payload.chars().map(|c| c as i32).collect();
    values.push(0);
    Ok(values)
}

/// Validate an `.extern` line and return the declared label.
pub fn parse_extern(content: &str) -> Result<&str, ErrorKind> {
    let trimmed = lexing::skip_whitespace(content);
    if trimmed.starts_with(".entry") {
        return Err(ErrorKind::EntryInsteadOfExtern);
    }
    let Some(after) = trimmed.strip_prefix(".extern") else {
        return Err(ErrorKind::NotExternLine);
    };
    parse_directive_label(
        after,
        ErrorKind::MaybeMeantExtern,
        ErrorKind::ExternMissingLabel,
        ErrorKind::ExternExtraText,
    )
}

/// Validate an `.entry` line and return the referenced label.
pub fn parse_entry(content: &str) -> Result<&str, ErrorKind> {
    let trimmed = lexing::skip_whitespace(content);
    let Some(after) = trimmed.strip_prefix(".entry") else {
        return Err(ErrorKind::NotEntryLine);
    };
    parse_directive_label(
        after,
        ErrorKind::MaybeMeantEntry,
        ErrorKind::EntryMissingLabel,
        ErrorKind::EntryExtraText,
    )
}

/// Shared tail of `.entry`/`.extern`: exactly one valid label, then at
/// most a comment.
fn parse_directive_label(
    after_directive: &str,
    glued_text: ErrorKind,
    missing_label: ErrorKind,
    extra_text: ErrorKind,
) -> Result<&str, ErrorKind> {
    if after_directive.is_empty() {
        return Err(missing_label);
    }
    if !after_directive.starts_with(|c: char| c.is_whitespace()) {
        return Err(glued_text);
    }
    let rest = lexing::skip_whitespace(after_directive);
    if rest.is_empty() || rest.starts_with(';') {
        return Err(missing_label);
    }
    let (name, tail) = lexing::split_token(rest);
    if !lexing::rest_is_blank_or_comment(tail) {
        return Err(extra_text);
    }
    symbols::validate_label_name(name)?;
    Ok(name)
}
