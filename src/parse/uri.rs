use super::{is_sub_delim, is_unreserved, parse_literal, parse_number, parse_symbol, State};

/// Components of a parsed request-URI. Slices borrow the input.
///
/// `host` and `port` are only present for the `http://` form; `path` is
/// absent when an absolute URI carries no abs-path.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct UriParts<'a> {
    pub(crate) host: Option<&'a [u8]>,
    pub(crate) port: Option<&'a [u8]>,
    pub(crate) path: Option<&'a [u8]>,
    pub(crate) query: Option<&'a [u8]>,
}

/// Parses `"http://" host [":" port] [abs-path] ["?" query]` or
/// `abs-path ["?" query]`. The whole input must be consumed.
pub(crate) fn parse_uri(line: &[u8]) -> Option<UriParts<'_>> {
    let mut state = State::default();

    if let Some(parts) = parse_absolute_uri(line, &mut state) {
        return Some(parts);
    } else if state.is_malformed {
        return None;
    }

    let mut parts = UriParts::default();
    parts.path = Some(parse_absolute_path(line, &mut state)?);

    let query = parse_query(line, &mut state);
    if state.is_malformed {
        return None;
    }
    if query.is_some() {
        parts.query = query;
    }

    if state.index != line.len() {
        return None;
    }

    Some(parts)
}

fn parse_absolute_uri<'a>(line: &'a [u8], state: &mut State) -> Option<UriParts<'a>> {
    let mut parts = UriParts::default();

    if !parse_literal(b"http://", line, state) {
        return None;
    }

    let ipv4_address = parse_ipv4_address(line, state);
    if state.is_malformed {
        return None;
    }

    if ipv4_address.is_some() {
        parts.host = ipv4_address;
    } else {
        match parse_hostname(line, state) {
            Some(hostname) => parts.host = Some(hostname),
            None => {
                state.is_malformed = true;
                return None;
            }
        }
    }

    if parse_symbol(b':', line, state) {
        match parse_port(line, state) {
            Some(port) => parts.port = Some(port),
            None => {
                state.is_malformed = true;
                return None;
            }
        }
    }

    let absolute_path = parse_absolute_path(line, state);
    if state.is_malformed {
        return None;
    }
    if absolute_path.is_some() {
        parts.path = absolute_path;
    }

    let query = parse_query(line, state);
    if state.is_malformed {
        return None;
    }
    if query.is_some() {
        parts.query = query;
    }

    if state.index != line.len() {
        state.is_malformed = true;
        return None;
    }

    Some(parts)
}

/// Exactly four decimal groups, each `0`..=`255`, a leading zero only as the
/// lone digit `0`. A non-digit first byte means "not an IPv4 address" and
/// falls through to the hostname branch.
fn parse_ipv4_address<'a>(line: &'a [u8], state: &mut State) -> Option<&'a [u8]> {
    const GROUP_COUNT: usize = 4;

    if state.index >= line.len() || !line[state.index].is_ascii_digit() {
        return None;
    }

    let start = state.index;
    for group in 0..GROUP_COUNT {
        match parse_decimal(line, state) {
            Some(decimal) => {
                if decimal.len() > 3 || decimal_value(decimal) > 255 {
                    state.is_malformed = true;
                    return None;
                }
            }
            None => {
                if !parse_symbol(b'0', line, state) {
                    state.is_malformed = true;
                    return None;
                }
            }
        }

        if group + 1 != GROUP_COUNT && !parse_symbol(b'.', line, state) {
            state.is_malformed = true;
            return None;
        }
    }

    Some(&line[start..state.index])
}

/// Decimal run with no leading zero; `None` on a leading `0` so the caller
/// can accept the single-digit `0` group.
fn parse_decimal<'a>(line: &'a [u8], state: &mut State) -> Option<&'a [u8]> {
    let start = state.index;
    let mut index = state.index;
    while index < line.len()
        && line[index].is_ascii_digit()
        && (line[index] != b'0' || start != index)
    {
        index += 1;
    }

    if index == start {
        return None;
    }

    state.index = index;
    Some(&line[start..index])
}

fn parse_hostname<'a>(line: &'a [u8], state: &mut State) -> Option<&'a [u8]> {
    let start = state.index;
    if state.index >= line.len() || line[state.index].is_ascii_digit() {
        return None;
    }

    while state.index < line.len() {
        if is_unreserved(line[state.index]) || is_sub_delim(line[state.index]) {
            state.index += 1;
        } else if !parse_encoded_symbol(line, state) {
            break;
        }
    }

    if state.is_malformed || start == state.index {
        return None;
    }

    Some(&line[start..state.index])
}

fn parse_port<'a>(line: &'a [u8], state: &mut State) -> Option<&'a [u8]> {
    let port = parse_number(line, state)?;

    if port.len() > 5 || decimal_value(port) > 65535 {
        state.is_malformed = true;
        return None;
    }

    Some(port)
}

fn parse_absolute_path<'a>(line: &'a [u8], state: &mut State) -> Option<&'a [u8]> {
    let start = state.index;
    while parse_symbol(b'/', line, state) {
        if !parse_segment(line, state) && state.is_malformed {
            return None;
        }
    }

    if start == state.index {
        return None;
    }

    Some(&line[start..state.index])
}

fn parse_segment(line: &[u8], state: &mut State) -> bool {
    let start = state.index;
    while state.index < line.len() {
        let symbol = line[state.index];
        if is_unreserved(symbol) || is_sub_delim(symbol) || symbol == b':' || symbol == b'@' {
            state.index += 1;
        } else if !parse_encoded_symbol(line, state) {
            break;
        }
    }

    if state.is_malformed {
        return false;
    }

    state.index != start
}

fn parse_query<'a>(line: &'a [u8], state: &mut State) -> Option<&'a [u8]> {
    if !parse_symbol(b'?', line, state) {
        return None;
    }

    let start = state.index;
    while state.index < line.len() {
        let symbol = line[state.index];
        if is_unreserved(symbol)
            || is_sub_delim(symbol)
            || matches!(symbol, b':' | b'@' | b'/' | b'?')
        {
            state.index += 1;
        } else if !parse_encoded_symbol(line, state) {
            break;
        }
    }

    if state.is_malformed {
        return None;
    }

    Some(&line[start..state.index])
}

/// `"%" HEXDIG HEXDIG`; a `%` without two hex digits poisons the line.
fn parse_encoded_symbol(line: &[u8], state: &mut State) -> bool {
    if !parse_symbol(b'%', line, state) {
        return false;
    }

    if line.len() - state.index < 2
        || !line[state.index].is_ascii_hexdigit()
        || !line[state.index + 1].is_ascii_hexdigit()
    {
        state.is_malformed = true;
        return false;
    }

    state.index += 2;
    true
}

fn decimal_value(digits: &[u8]) -> u32 {
    let mut value = 0u32;
    for digit in digits {
        value = value * 10 + u32::from(digit - b'0');
    }
    value
}
