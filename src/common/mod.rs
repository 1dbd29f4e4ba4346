pub use headers::Headers;
pub use http_version::HttpVersion;
pub use method::Method;

mod headers;
mod http_version;
mod method;
