use std::fmt;

/// HTTP version of a request.
///
/// 0.9 is the simple-request form: a request line without a version token,
/// no headers, no status line in the response.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum HttpVersion {
    /// HTTP/0.9
    Version0_9,
    /// HTTP/1.0
    Version1_0,
    /// HTTP/1.1
    Version1_1,
}

impl HttpVersion {
    /// Version in header format (e.g. `HTTP/1.0`)
    #[must_use]
    pub const fn header(&self) -> &'static str {
        match self {
            Self::Version0_9 => "HTTP/0.9",
            Self::Version1_0 => "HTTP/1.0",
            Self::Version1_1 => "HTTP/1.1",
        }
    }

    /// Maps normalized version number tokens. Only `1.0` and `1.1` are
    /// supported here; an explicit `HTTP/0.9` token is not a valid request
    /// (0.9 is signaled by the absence of a version token).
    pub(crate) fn from_numbers(major: &[u8], minor: &[u8]) -> Option<HttpVersion> {
        if major.len() != 1 || minor.len() != 1 {
            return None;
        }

        match (major[0], minor[0]) {
            (b'1', b'0') => Some(Self::Version1_0),
            (b'1', b'1') => Some(Self::Version1_1),
            _ => None,
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let version = match self {
            Self::Version1_1 => "1.1",
            Self::Version1_0 => "1.0",
            Self::Version0_9 => "0.9",
        };
        f.write_str(version)
    }
}

#[cfg(test)]
mod tests {
    use super::HttpVersion;

    #[test]
    fn from_numbers_test() {
        let table = [
            (&b"1"[..], &b"0"[..], Some(HttpVersion::Version1_0)),
            (b"1", b"1", Some(HttpVersion::Version1_1)),
            (b"0", b"9", None),
            (b"2", b"0", None),
            (b"1", b"2", None),
            (b"10", b"1", None),
            (b"1", b"10", None),
        ];

        for (major, minor, expected) in table {
            assert_eq!(
                HttpVersion::from_numbers(major, minor),
                expected,
                "{major:?}.{minor:?}"
            );
        }
    }

    #[test]
    fn header_format_test() {
        assert_eq!(HttpVersion::Version1_0.header(), "HTTP/1.0");
        assert!(HttpVersion::Version0_9 < HttpVersion::Version1_0);
    }
}
