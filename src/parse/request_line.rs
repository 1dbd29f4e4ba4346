use std::fmt;

use super::{parse_literal, parse_number, parse_symbol, parse_token, skip_spaces, State, SP};

/// Structured view of a parsed request line. Slices borrow the input.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RequestLine<'a> {
    pub(crate) method: &'a [u8],
    pub(crate) uri: &'a [u8],
    /// `None` for an HTTP/0.9 simple request (no version token).
    pub(crate) version: Option<RequestVersion<'a>>,
}

/// Version numbers with leading zeros collapsed (`01` parses as `1`).
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RequestVersion<'a> {
    pub(crate) major: &'a [u8],
    pub(crate) minor: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestLineError {
    /// Empty or non-token method.
    MalformedMethod,
    /// Request-URI not starting with `/` or `http://`.
    MalformedUri,
    /// `HTTP/` prefix missing or invalid number syntax.
    MalformedVersion,
    /// Missing separator or trailing garbage.
    MalformedLine,
}

impl std::error::Error for RequestLineError {}

impl fmt::Display for RequestLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedMethod => f.write_str("malformed method"),
            Self::MalformedUri => f.write_str("malformed request-uri"),
            Self::MalformedVersion => f.write_str("malformed version"),
            Self::MalformedLine => f.write_str("malformed request line"),
        }
    }
}

/// Parses `method 1*SP uri [ 1*SP version ] *SP` covering the whole line.
///
/// The URI is captured tolerantly here (anything up to the next SP once the
/// `/` or `http://` prefix matched); the URI parser validates the full
/// structure afterwards.
pub(crate) fn parse_request_line(line: &[u8]) -> Result<RequestLine<'_>, RequestLineError> {
    let mut state = State::default();

    let method = parse_token(line, &mut state).ok_or(RequestLineError::MalformedMethod)?;

    if !parse_symbol(SP, line, &mut state) {
        return Err(RequestLineError::MalformedLine);
    }
    skip_spaces(line, &mut state);

    let uri = parse_uri_token(line, &mut state).ok_or(RequestLineError::MalformedUri)?;

    skip_spaces(line, &mut state);
    if state.index == line.len() {
        return Ok(RequestLine {
            method,
            uri,
            version: None,
        });
    }

    let version = parse_version(line, &mut state).ok_or(RequestLineError::MalformedVersion)?;

    skip_spaces(line, &mut state);
    if state.index != line.len() {
        return Err(RequestLineError::MalformedLine);
    }

    Ok(RequestLine {
        method,
        uri,
        version: Some(version),
    })
}

fn parse_uri_token<'a>(line: &'a [u8], state: &mut State) -> Option<&'a [u8]> {
    let start = state.index;

    if !parse_symbol(b'/', line, state) && !parse_literal(b"http://", line, state) {
        return None;
    }

    while state.index < line.len() && line[state.index] != SP {
        state.index += 1;
    }

    Some(&line[start..state.index])
}

fn parse_version<'a>(line: &'a [u8], state: &mut State) -> Option<RequestVersion<'a>> {
    if !parse_literal(b"HTTP/", line, state) {
        return None;
    }

    let major = match parse_number(line, state) {
        Some(number) => number,
        None => {
            state.is_malformed = true;
            return None;
        }
    };

    if !parse_symbol(b'.', line, state) {
        state.is_malformed = true;
        return None;
    }

    let minor = match parse_number(line, state) {
        Some(number) => number,
        None => {
            state.is_malformed = true;
            return None;
        }
    };

    Some(RequestVersion { major, minor })
}
