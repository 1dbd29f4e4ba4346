//! [`RequestHandler`] invoked by the connection for every parsed request
use std::error::Error;

use crate::request::Request;
use crate::response::Response;

/// What a handler returns; any `Err` makes the connection emit
/// `500 Internal Server Error` when the response head has not gone out yet.
pub type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

/// A `RequestHandler` needs to implement the trait method
/// [`handle`](RequestHandler::handle)
///
/// For simple handling exists the implementation [`FnRequestHandler`].
///
/// The handler sees the fully parsed request and writes the response; it
/// must call [`Response::end`](crate::Response::end) to declare the
/// response complete, otherwise the connection treats it as faulted.
pub trait RequestHandler: Send + Sync {
    /// `handle` is called once per connection with the parsed request and
    /// the response to write into
    ///
    /// # Example
    ///
    /// ```
    /// # use simple_http::{HandlerResult, Request, RequestHandler, Response};
    /// struct NothingFoundHandler;
    /// impl RequestHandler for NothingFoundHandler {
    ///     fn handle(&self, _: &mut Request<'_, '_>, response: &mut Response<'_, '_>) -> HandlerResult {
    ///         response.write_head("404", "Not Found")?;
    ///         response.end()?;
    ///         Ok(())
    ///     }
    /// }
    /// ```
    fn handle(&self, request: &mut Request<'_, '_>, response: &mut Response<'_, '_>)
        -> HandlerResult;
}

/// `FnRequestHandler` implements [`RequestHandler`]
///
/// It can be used to make a [`RequestHandler`] out of a function or closure.
///
/// # Example
///
/// ```
/// # use simple_http::{FnRequestHandler, Request, Response};
/// let handler = FnRequestHandler(|request: &mut Request<'_, '_>, response: &mut Response<'_, '_>| {
///     let _ = request;
///     response.write(b"hello world")?;
///     response.end()?;
///     Ok(())
/// });
/// ```
#[allow(missing_debug_implementations)]
pub struct FnRequestHandler<T>(pub T)
where
    T: Fn(&mut Request<'_, '_>, &mut Response<'_, '_>) -> HandlerResult;

impl<T> RequestHandler for FnRequestHandler<T>
where
    T: Fn(&mut Request<'_, '_>, &mut Response<'_, '_>) -> HandlerResult + Send + Sync,
{
    #[inline]
    fn handle(
        &self,
        request: &mut Request<'_, '_>,
        response: &mut Response<'_, '_>,
    ) -> HandlerResult {
        (self.0)(request, response)
    }
}
