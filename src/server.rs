//! [`HttpServer`]: acceptor thread, worker pool and per-connection setup.

use std::fmt;
use std::io::ErrorKind as IoErrorKind;
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::connection::Connection;
use crate::init::init_library;
use crate::log;
use crate::reader::Reader;
use crate::request_handler::RequestHandler;
use crate::transport::{TcpTransport, Transport};
use crate::util::{ConnectionGuard, WorkerPool, WorkerState};
use crate::writer::Writer;

/// Address used by [`HttpServer::listen`].
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";
/// Conventional port of the examples.
pub const DEFAULT_PORT: u16 = 3000;
/// Listen backlog used unless [`HttpServer::listen_with_backlog`] is called.
pub const DEFAULT_BACKLOG: i32 = 100;

/// Smallest accepted I/O buffer length; shorter configured lengths are
/// raised to this.
pub const MIN_BUFFER_LENGTH: usize = 1024;

/// Config parameters of an [`HttpServer`].
///
/// # Example
///
/// ```
/// let options = simple_http::Options {
///     worker_count: 2,
///     ..simple_http::Options::default()
/// };
/// # let _ = options;
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Receive and send timeout applied to every accepted connection
    /// (default 1 s). Zero inherits the OS default.
    pub timeout: Duration,

    /// Length of each worker's receive buffer (default 32 KiB, minimum
    /// [`MIN_BUFFER_LENGTH`]). Request line plus headers must fit in it.
    pub request_buffer_length: usize,

    /// Length of each worker's send buffer (default 32 KiB, minimum
    /// [`MIN_BUFFER_LENGTH`]).
    pub response_buffer_length: usize,

    /// Number of worker threads (default: host concurrency).
    pub worker_count: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(1000),
            request_buffer_length: 32 * 1024,
            response_buffer_length: 32 * 1024,
            worker_count: num_cpus::get(),
        }
    }
}

/// Error from the `listen` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenError {
    /// The address is not an IPv4 dotted-quad string.
    WrongAddress,
    /// The port is already bound.
    AddressInUse,
    /// Binding was denied.
    NoAccess,
    /// The worker pool could not be created.
    PoolCreation,
    /// Any other platform error.
    Unknown,
}

impl std::error::Error for ListenError {}

impl fmt::Display for ListenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongAddress => f.write_str("wrong listen address"),
            Self::AddressInUse => f.write_str("address in use"),
            Self::NoAccess => f.write_str("no access to bind address"),
            Self::PoolCreation => f.write_str("worker pool creation failed"),
            Self::Unknown => f.write_str("listen failed"),
        }
    }
}

impl From<std::io::Error> for ListenError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            IoErrorKind::AddrInUse => Self::AddressInUse,
            IoErrorKind::PermissionDenied => Self::NoAccess,
            IoErrorKind::AddrNotAvailable => Self::WrongAddress,
            _ => Self::Unknown,
        }
    }
}

/// An HTTP/1.x origin server: accepts connections and hands every parsed
/// request to one handler.
///
/// # Example
///
/// ```no_run
/// use simple_http::{FnRequestHandler, HttpServer, Request, Response};
///
/// # fn main() -> Result<(), simple_http::ListenError> {
/// let server = HttpServer::new(FnRequestHandler(
///     |_: &mut Request<'_, '_>, response: &mut Response<'_, '_>| {
///         response.write(b"hello world")?;
///         response.end()?;
///         Ok(())
///     },
/// ));
///
/// server.listen(3000)?.join();
/// # Ok(())
/// # }
/// ```
#[allow(missing_debug_implementations)]
pub struct HttpServer {
    options: Options,
    handler: Arc<dyn RequestHandler>,
}

impl HttpServer {
    /// Creates a server with default [`Options`].
    pub fn new<H>(handler: H) -> Self
    where
        H: RequestHandler + 'static,
    {
        Self::with_options(Options::default(), handler)
    }

    /// Creates a server with the given options. Buffer lengths below
    /// [`MIN_BUFFER_LENGTH`] and a zero worker count are raised to their
    /// minimums.
    pub fn with_options<H>(options: Options, handler: H) -> Self
    where
        H: RequestHandler + 'static,
    {
        let mut options = options;
        options.request_buffer_length = options.request_buffer_length.max(MIN_BUFFER_LENGTH);
        options.response_buffer_length = options.response_buffer_length.max(MIN_BUFFER_LENGTH);
        options.worker_count = options.worker_count.max(1);

        Self {
            options,
            handler: Arc::new(handler),
        }
    }

    /// Starts listening on `127.0.0.1:<port>` with the default backlog.
    ///
    /// # Errors
    ///
    /// - [`ListenError`] when binding or pool creation fails
    pub fn listen(&self, port: u16) -> Result<Listening, ListenError> {
        self.listen_with_backlog(DEFAULT_ADDRESS, port, DEFAULT_BACKLOG)
    }

    /// Starts listening on `<address>:<port>` with the default backlog.
    /// The address must be an IPv4 dotted-quad string.
    ///
    /// # Errors
    ///
    /// - [`ListenError`] when binding or pool creation fails
    pub fn listen_on(&self, address: &str, port: u16) -> Result<Listening, ListenError> {
        self.listen_with_backlog(address, port, DEFAULT_BACKLOG)
    }

    /// Starts listening with an explicit accept backlog.
    ///
    /// Spawns the acceptor thread and the worker pool; the returned
    /// [`Listening`] guard keeps both alive.
    ///
    /// # Errors
    ///
    /// - [`ListenError`] when binding or pool creation fails
    pub fn listen_with_backlog(
        &self,
        address: &str,
        port: u16,
        backlog: i32,
    ) -> Result<Listening, ListenError> {
        let _ = init_library();

        let listener = bind_listener(address, port, backlog)?;
        let local_addr = listener.local_addr().map_err(ListenError::from)?;

        let pool = WorkerPool::new(
            self.options.worker_count,
            self.options.request_buffer_length,
            self.options.response_buffer_length,
        )
        .ok_or(ListenError::PoolCreation)?;

        let close = Arc::new(AtomicBool::new(false));
        let num_connections = Arc::new(AtomicUsize::new(0));

        let acceptor = {
            let close = Arc::clone(&close);
            let num_connections = Arc::clone(&num_connections);
            let handler = Arc::clone(&self.handler);
            let timeout = self.options.timeout;

            thread::Builder::new()
                .name("acceptor".to_string())
                .spawn(move || {
                    accept_loop(&listener, &pool, &close, &num_connections, &handler, timeout);
                })
                .map_err(|_| ListenError::Unknown)?
        };

        log::info!("listening on {local_addr}");

        Ok(Listening {
            close,
            local_addr,
            num_connections,
            acceptor: Some(acceptor),
        })
    }
}

/// Keeps a started server alive: owns the close flag and the acceptor
/// thread, which in turn owns the listener and the worker pool.
///
/// Dropping the guard shuts the server down and joins the acceptor; tasks
/// already running complete first.
#[allow(missing_debug_implementations)]
pub struct Listening {
    close: Arc<AtomicBool>,
    local_addr: SocketAddr,
    num_connections: Arc<AtomicUsize>,
    acceptor: Option<thread::JoinHandle<()>>,
}

impl Listening {
    /// The bound address, useful with port 0.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of connections currently accepted and not yet finished.
    #[must_use]
    pub fn num_connections(&self) -> usize {
        self.num_connections.load(Ordering::Acquire)
    }

    /// Asks the acceptor to stop. Safe to call more than once.
    pub fn shutdown(&self) {
        self.close.store(true, Ordering::Release);

        // connect briefly to ourselves to unblock the accept thread
        if let Ok(stream) = TcpStream::connect(self.local_addr) {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    /// Blocks until the server shuts down.
    pub fn join(mut self) {
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
    }
}

impl Drop for Listening {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
    }
}

fn bind_listener(address: &str, port: u16, backlog: i32) -> Result<TcpListener, ListenError> {
    let address: Ipv4Addr = address.parse().map_err(|_| ListenError::WrongAddress)?;

    let socket = socket2::Socket::new(
        socket2::Domain::IPV4,
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )
    .map_err(ListenError::from)?;

    let addr = SocketAddr::from((address, port));
    socket.bind(&addr.into()).map_err(ListenError::from)?;
    socket.listen(backlog).map_err(ListenError::from)?;

    Ok(socket.into())
}

fn accept_loop(
    listener: &TcpListener,
    pool: &WorkerPool,
    close: &Arc<AtomicBool>,
    num_connections: &Arc<AtomicUsize>,
    handler: &Arc<dyn RequestHandler>,
    timeout: Duration,
) {
    log::debug!("running accept thread");

    while !close.load(Ordering::Acquire) {
        let stream = match listener.accept() {
            Ok((stream, _)) => stream,
            Err(err) if err.kind() == IoErrorKind::Interrupted => continue,
            Err(err) => {
                log::error!("error on connection accept: {err:?}");
                let _ = err;
                continue;
            }
        };

        if close.load(Ordering::Acquire) {
            break;
        }

        let (mut read_transport, mut write_transport) = match TcpTransport::pair(stream) {
            Ok(pair) => pair,
            Err(err) => {
                log::error!("splitting client stream failed: {err}");
                let _ = err;
                continue;
            }
        };

        if read_transport.set_timeout(timeout).is_err()
            || write_transport.set_timeout(timeout).is_err()
        {
            log::warn!("applying connection timeout failed");
            continue;
        }

        let guard = ConnectionGuard::new(Arc::clone(num_connections));
        log::info!("connection count [{}]", guard.value());

        let handler = Arc::clone(handler);
        pool.post(Box::new(move |state: &mut WorkerState| {
            let _guard = guard;
            handle_connection(read_transport, write_transport, handler.as_ref(), state);
        }));
    }

    log::debug!("terminating accept thread");
}

fn handle_connection(
    read_transport: TcpTransport,
    write_transport: TcpTransport,
    handler: &dyn RequestHandler,
    state: &mut WorkerState,
) {
    let input = Reader::new(Box::new(read_transport), &mut state.request_buffer);
    let output = Writer::new(Box::new(write_transport), &mut state.response_buffer);

    let mut connection = Connection::new(input, output);
    if let Err(err) = connection.process_request(handler) {
        log::debug!("request failed: {err}");
        let _ = err;
    }
}
