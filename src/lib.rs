//! # Simple usage
//!
//! ## Creating the server
//!
//! An [`HttpServer`] couples a [`RequestHandler`] with a worker pool. The
//! handler sees every parsed [`Request`] together with the [`Response`] it
//! writes into; a plain function or closure can be used through
//! [`FnRequestHandler`].
//!
//! ```no_run
//! use simple_http::{FnRequestHandler, HttpServer, Request, Response};
//!
//! # fn main() -> Result<(), simple_http::ListenError> {
//! let server = HttpServer::new(FnRequestHandler(
//!     |request: &mut Request<'_, '_>, response: &mut Response<'_, '_>| {
//!         println!("{} {}", request.method_name(), request.href());
//!         response.write(b"hello world")?;
//!         response.end()?;
//!         Ok(())
//!     },
//! ));
//!
//! let listening = server.listen(3000)?;
//! # drop(listening);
//! # Ok(())
//! # }
//! ```
//!
//! [`HttpServer::listen`] binds, spawns one acceptor thread and returns a
//! [`Listening`] guard; dropping the guard (or calling
//! [`Listening::join`]) controls the server lifetime.
//!
//! ## Handling requests
//!
//! Each connection carries exactly one request. The request line, the
//! headers and an optional `Content-Length` body are parsed before the
//! handler runs; the body is read incrementally via
//! [`Request::read_body`]. The response is started explicitly with
//! [`Response::write_head`] or implicitly as `200 OK` by the first
//! [`Response::write`], and must be finished with [`Response::end`].
//!
//! HTTP/0.9 simple requests (`GET /` without a version token) are served
//! with the raw response body, without a status line or headers.
//!
//! ## Embedding
//!
//! The pipeline is usable without the built-in server: implement
//! [`Transport`] over your byte stream and drive a [`Connection`] built
//! from a [`Reader`] and a [`Writer`] over caller-owned buffers.

pub use body::BodyReadError;
pub use common::{Headers, HttpVersion, Method};
pub use connection::{Connection, ProcessError};
pub use init::{cleanup_library, init_library, is_library_initialized, InitLibraryError};
pub use reader::{AdvanceError, ReadResult, Reader};
pub use request::Request;
pub use request_handler::{FnRequestHandler, HandlerResult, RequestHandler};
pub use response::{Response, WriteHeadError};
pub use server::{
    HttpServer, ListenError, Listening, Options, DEFAULT_ADDRESS, DEFAULT_BACKLOG, DEFAULT_PORT,
    MIN_BUFFER_LENGTH,
};
pub use transport::{ConnectionClosed, TcpTransport, Transport, TransportError};
pub use writer::Writer;

mod body;
mod common;
mod connection;
mod init;
mod log;
mod parse;
mod reader;
mod request;
mod request_handler;
mod response;
mod server;
mod transport;
mod util;
mod writer;
