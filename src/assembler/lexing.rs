//! Lexical helpers shared by the preprocessor, the validators and both
//! passes. All of them borrow the input; nothing here allocates.

use std::sync::LazyLock;

use regex::Regex;

/// Optional sign, then at least one decimal digit.
static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());

/// `r` followed by anything numeric - used only to warn about names such
/// as `r9` that look like registers but are not.
static REGISTER_LOOKALIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^r[0-9]+$").unwrap());

/// Slice off leading whitespace.
pub fn skip_whitespace(text: &str) -> &str {
    text.trim_start()
}

/// Split the leading token (up to the next whitespace) from the rest.
/// The input is expected to start at a non-space character.
pub fn split_token(text: &str) -> (&str, &str) {
    match text.find(|c: char| c.is_whitespace()) {
        Some(end) => (&text[..end], &text[end..]),
        None => (text, ""),
    }
}

/// Like [split_token], but a comma also terminates the token (and stays in
/// the remainder). This is how operands are carved out of a command line.
pub fn split_token_or_comma(text: &str) -> (&str, &str) {
    match text.find(|c: char| c.is_whitespace() || c == ',') {
        Some(end) => (&text[..end], &text[end..]),
        None => (text, ""),
    }
}

/// Exactly two characters, `r` followed by a digit 0-7.
pub fn is_register(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some('r'), Some(digit), None) if ('0'..='7').contains(&digit)
    )
}

/// Register number of a register token, if it is one.
pub fn register_number(token: &str) -> Option<u8> {
    if is_register(token) {
        token[1..].parse().ok()
    } else {
        None
    }
}

/// Optional sign followed by decimal digits. Real numbers (a `.` inside a
/// numeric token) do not match; the data validator reports those itself.
pub fn is_integer(token: &str) -> bool {
    INTEGER_RE.is_match(token)
}

/// `r` followed by digits, but not a real register - a likely typo.
pub fn resembles_register(token: &str) -> bool {
    REGISTER_LOOKALIKE_RE.is_match(token) && !is_register(token)
}

/// Byte position of the first colon that sits outside a string literal,
/// or None. Quotes toggle an inside-string flag, so a `:` in
/// `.string "a:b"` is not a label separator.
pub fn colon_outside_string(line: &str) -> Option<usize> {
    let mut inside_string = false;
    for (pos, c) in line.char_indices() {
        match c {
            '"' => inside_string = !inside_string,
            ':' if !inside_string => return Some(pos),
            _ => {}
        }
    }
    None
}

/// Strip a trailing `;`-comment. Quotes are respected so `.string ";"`
/// keeps its payload.
pub fn strip_comment(line: &str) -> &str {
    let mut inside_string = false;
    for (pos, c) in line.char_indices() {
        match c {
            '"' => inside_string = !inside_string,
            ';' if !inside_string => return &line[..pos],
            _ => {}
        }
    }
    line
}

/// True when the remainder of a line carries nothing but whitespace or a
/// comment - the only things allowed after a complete statement.
pub fn rest_is_blank_or_comment(text: &str) -> bool {
    let rest = skip_whitespace(text);
    rest.is_empty() || rest.starts_with(';')
}
