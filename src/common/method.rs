use std::fmt;

use ascii::AsciiString;

/// HTTP request methods
///
/// `GET`, `HEAD` and `POST` are recognized; any other request token is kept
/// as [`Method::Custom`], folded to upper case. HTTP/0.9 simple requests
/// only permit `GET`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `POST`
    Post,
    /// Any other token, upper-cased
    Custom(AsciiString),
}

impl Method {
    /// The method token as sent by the client, folded to upper case.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Custom(token) => token.as_str(),
        }
    }

    /// Maps a request-line token case-insensitively. `None` when the token
    /// is not ASCII.
    pub(crate) fn from_token(token: &[u8]) -> Option<Method> {
        if token.eq_ignore_ascii_case(b"GET") {
            Some(Method::Get)
        } else if token.eq_ignore_ascii_case(b"HEAD") {
            Some(Method::Head)
        } else if token.eq_ignore_ascii_case(b"POST") {
            Some(Method::Post)
        } else {
            AsciiString::from_ascii(token.to_ascii_uppercase())
                .ok()
                .map(Method::Custom)
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Method;

    #[test]
    fn case_insensitive_mapping_test() {
        assert_eq!(Method::from_token(b"GET").unwrap(), Method::Get);
        assert_eq!(Method::from_token(b"gEt").unwrap(), Method::Get);
        assert_eq!(Method::from_token(b"head").unwrap(), Method::Head);
        assert_eq!(Method::from_token(b"Post").unwrap(), Method::Post);
    }

    #[test]
    fn custom_token_uppercased_test() {
        let method = Method::from_token(b"pAtCh").unwrap();
        assert_eq!(method.as_str(), "PATCH");
        assert!(matches!(method, Method::Custom(_)));
    }

    #[test]
    fn method_name_test() {
        assert_eq!(Method::from_token(b"get").unwrap().as_str(), "GET");
        assert_eq!(Method::from_token(b"x-thing").unwrap().as_str(), "X-THING");
    }
}
