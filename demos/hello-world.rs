#![allow(missing_docs, unused_crate_dependencies)]

use simple_http::{FnRequestHandler, HttpServer, Request, Response};

fn main() {
    let server = HttpServer::new(FnRequestHandler(
        |request: &mut Request<'_, '_>, response: &mut Response<'_, '_>| {
            println!("{} {}", request.method_name(), request.href());
            response.write(b"hello world")?;
            response.end()?;
            Ok(())
        },
    ));

    let listening = server.listen(simple_http::DEFAULT_PORT).unwrap();
    println!("Now listening on http://localhost:{}/", listening.local_addr().port());

    listening.join();
}
