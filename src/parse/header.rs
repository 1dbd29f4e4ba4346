use std::fmt;

use super::{parse_symbol, parse_token, skip_whitespaces, State, HT, SP};

/// One parsed header line. Slices borrow the input; the value is trimmed of
/// trailing whitespace and may be empty.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct HeaderLine<'a> {
    pub(crate) name: &'a [u8],
    pub(crate) value: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderLineError {
    /// Empty or non-token field name.
    MalformedName,
    /// Value bytes outside the ASCII range.
    MalformedValue,
    /// Missing `:` or trailing garbage.
    MalformedLine,
}

impl std::error::Error for HeaderLineError {}

impl fmt::Display for HeaderLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedName => f.write_str("malformed header name"),
            Self::MalformedValue => f.write_str("malformed header value"),
            Self::MalformedLine => f.write_str("malformed header line"),
        }
    }
}

/// Parses a single `token ":" LWS value` line (no folding).
pub(crate) fn parse_header(line: &[u8]) -> Result<HeaderLine<'_>, HeaderLineError> {
    let mut state = State::default();

    let name = parse_token(line, &mut state).ok_or(HeaderLineError::MalformedName)?;

    if !parse_symbol(b':', line, &mut state) {
        return Err(HeaderLineError::MalformedLine);
    }
    skip_whitespaces(line, &mut state);

    let value = parse_value(line, &mut state);
    if !value.is_ascii() {
        return Err(HeaderLineError::MalformedValue);
    }

    if state.index != line.len() {
        return Err(HeaderLineError::MalformedLine);
    }

    Ok(HeaderLine { name, value })
}

/// Consumes the rest of the line, dropping trailing SP/HT.
fn parse_value<'a>(line: &'a [u8], state: &mut State) -> &'a [u8] {
    let start = state.index;
    let mut last_non_empty = None;
    while state.index < line.len() {
        if line[state.index] != SP && line[state.index] != HT {
            last_non_empty = Some(state.index);
        }

        state.index += 1;
    }

    match last_non_empty {
        None => &line[start..start],
        Some(last) => &line[start..=last],
    }
}
