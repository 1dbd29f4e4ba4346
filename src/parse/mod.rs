//! Byte-level parsers for the request line, request-URI and header fields.
//!
//! All parsers work on a single line slice and thread a [`State`] cursor
//! through each other. The malformed flag is sticky: once a sub-parser saw a
//! partial match, the whole line is rejected.

pub(crate) use header::parse_header;
pub(crate) use request_line::{parse_request_line, RequestLine};
pub(crate) use uri::parse_uri;

mod header;
mod request_line;
mod uri;

const SP: u8 = b' ';
const HT: u8 = b'\t';

/// Cursor threaded through all sub-parsers of one line.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct State {
    pub(crate) index: usize,
    pub(crate) is_malformed: bool,
}

/// Case-insensitive prefix match of `literal` at `state.index`.
///
/// On success the cursor moves past the match. A partial match (some but not
/// all bytes matched) moves the cursor to the mismatch and sets the
/// malformed flag; a zero-length match leaves the state untouched.
pub(crate) fn parse_literal(literal: &[u8], line: &[u8], state: &mut State) -> bool {
    let start = state.index;
    let mut index = state.index;
    while index < line.len()
        && index - start < literal.len()
        && literal[index - start].eq_ignore_ascii_case(&line[index])
    {
        index += 1;
    }

    state.index = index;

    if index - start != literal.len() {
        if index - start != 0 {
            state.is_malformed = true;
        }

        return false;
    }

    true
}

/// Single-character convenience over [`parse_literal`].
pub(crate) fn parse_symbol(symbol: u8, line: &[u8], state: &mut State) -> bool {
    parse_literal(&[symbol], line, state)
}

/// Consumes a DIGIT run and yields it with leading zeros collapsed:
/// `"01"` and `"1"` both yield `"1"`, any all-zero run yields `"0"`.
pub(crate) fn parse_number<'a>(line: &'a [u8], state: &mut State) -> Option<&'a [u8]> {
    let start = state.index;
    let mut index = state.index;
    let mut first_non_zero = None;
    while index < line.len() && line[index].is_ascii_digit() {
        if line[index] != b'0' && first_non_zero.is_none() {
            first_non_zero = Some(index);
        }

        index += 1;
    }

    state.index = index;

    if index == start {
        return None;
    }

    match first_non_zero {
        None => Some(&line[index - 1..index]),
        Some(first) => Some(&line[first..index]),
    }
}

/// Consumes a token per RFC 2616: CHARs excluding CTLs and tspecials.
pub(crate) fn parse_token<'a>(line: &'a [u8], state: &mut State) -> Option<&'a [u8]> {
    let start = state.index;
    let mut index = state.index;
    while index < line.len() && is_token_char(line[index]) {
        index += 1;
    }

    state.index = index;

    if index == start {
        return None;
    }

    Some(&line[start..index])
}

pub(crate) fn skip_spaces(line: &[u8], state: &mut State) {
    while state.index < line.len() && line[state.index] == SP {
        state.index += 1;
    }
}

pub(crate) fn skip_whitespaces(line: &[u8], state: &mut State) {
    while state.index < line.len() && (line[state.index] == SP || line[state.index] == HT) {
        state.index += 1;
    }
}

fn is_token_char(symbol: u8) -> bool {
    symbol.is_ascii() && !is_ctl(symbol) && !is_tspecial(symbol)
}

fn is_ctl(symbol: u8) -> bool {
    symbol <= 31 || symbol == 127
}

fn is_tspecial(symbol: u8) -> bool {
    matches!(
        symbol,
        b'(' | b')'
            | b'<'
            | b'>'
            | b'@'
            | b','
            | b';'
            | b':'
            | b'\\'
            | b'"'
            | b'/'
            | b'['
            | b']'
            | b'?'
            | b'='
            | b'{'
            | b'}'
            | SP
            | HT
    )
}

fn is_sub_delim(symbol: u8) -> bool {
    matches!(
        symbol,
        b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
    )
}

fn is_unreserved(symbol: u8) -> bool {
    symbol.is_ascii_alphanumeric() || matches!(symbol, b'-' | b'.' | b'_' | b'~')
}

#[cfg(test)]
mod tests {
    use super::{parse_literal, parse_number, parse_symbol, parse_token, State};

    #[test]
    fn parse_literal_case_insensitive_test() {
        let mut state = State::default();
        assert!(parse_literal(b"HTTP/", b"http/1.1", &mut state));
        assert_eq!(state.index, 5);
        assert!(!state.is_malformed);
    }

    #[test]
    fn parse_literal_partial_match_is_malformed_test() {
        let mut state = State::default();
        assert!(!parse_literal(b"http://", b"htXp://x", &mut state));
        assert_eq!(state.index, 2);
        assert!(state.is_malformed);
    }

    #[test]
    fn parse_literal_zero_match_keeps_state_test() {
        let mut state = State::default();
        assert!(!parse_literal(b"http://", b"/index", &mut state));
        assert_eq!(state.index, 0);
        assert!(!state.is_malformed);
    }

    #[test]
    fn parse_symbol_test() {
        let mut state = State::default();
        assert!(parse_symbol(b'/', b"/a", &mut state));
        assert!(!parse_symbol(b'/', b"/a", &mut State { index: 1, is_malformed: false }));
    }

    #[test]
    fn parse_number_normalization_test() {
        for (input, expected) in [
            (&b"0"[..], &b"0"[..]),
            (b"00", b"0"),
            (b"000", b"0"),
            (b"01", b"1"),
            (b"001", b"1"),
            (b"10", b"10"),
            (b"0010", b"10"),
        ] {
            let mut state = State::default();
            let number = parse_number(input, &mut state).unwrap();
            assert_eq!(number, expected, "input: {input:?}");
            assert_eq!(state.index, input.len());
        }

        let mut state = State::default();
        assert!(parse_number(b"x1", &mut state).is_none());
        assert_eq!(state.index, 0);
    }

    #[test]
    fn parse_token_stops_at_tspecial_test() {
        let mut state = State::default();
        let token = parse_token(b"Content-Length: 5", &mut state).unwrap();
        assert_eq!(token, b"Content-Length");
        assert_eq!(state.index, 14);

        let mut state = State::default();
        assert!(parse_token(b": empty", &mut state).is_none());
    }
}
