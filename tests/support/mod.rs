use std::net::TcpStream;
use std::time::Duration;

use simple_http::{
    FnRequestHandler, HttpServer, Listening, Options, Request, RequestHandler, Response,
};

/// Creates a [`TcpStream`] client for `addr`
pub(crate) fn create_client<A>(addr: A, timeout: Option<Duration>) -> TcpStream
where
    A: std::net::ToSocketAddrs,
{
    let addr = addr.to_socket_addrs().unwrap().next().unwrap();

    let stream = if let Some(timeout) = timeout {
        TcpStream::connect_timeout(&addr, timeout)
    } else {
        TcpStream::connect(addr)
    }
    .unwrap();

    stream.set_nodelay(true).unwrap();
    if timeout.is_some() {
        stream.set_read_timeout(timeout).unwrap();
        stream.set_write_timeout(timeout).unwrap();
    }

    stream
}

/// Starts a server with `handler` on an ephemeral local port.
pub(crate) fn new_server<H>(handler: H) -> Listening
where
    H: RequestHandler + 'static,
{
    new_server_with_options(Options::default(), handler)
}

/// Starts a server with `handler` and `options` on an ephemeral local port.
pub(crate) fn new_server_with_options<H>(options: Options, handler: H) -> Listening
where
    H: RequestHandler + 'static,
{
    HttpServer::with_options(options, handler)
        .listen_on("127.0.0.1", 0)
        .unwrap()
}

/// Creates a "hello world" server with a client connected to the server.
///
/// The server shuts down when the returned guard is dropped.
pub(crate) fn new_client_to_hello_world_server() -> (Listening, TcpStream) {
    let listening = new_server(FnRequestHandler(
        |_: &mut Request<'_, '_>, response: &mut Response<'_, '_>| {
            response.write(b"hello world")?;
            response.end()?;
            Ok(())
        },
    ));

    let client = create_client(listening.local_addr(), Some(Duration::from_secs(5)));
    (listening, client)
}
