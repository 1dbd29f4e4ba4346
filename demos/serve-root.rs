#![allow(missing_docs, unused_crate_dependencies)]

use std::fs;
use std::path::{Component, Path};
use std::time::SystemTime;

use simple_http::{FnRequestHandler, HttpServer, Method, Request, Response};

fn get_content_type(path: &Path) -> &'static str {
    let extension = match path.extension() {
        None => return "text/plain; charset=utf8",
        Some(extension) => extension.to_str().unwrap_or(""),
    };

    match extension {
        "gif" => "image/gif",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "pdf" => "application/pdf",
        "htm" | "html" => "text/html; charset=utf8",
        "css" => "text/css",
        "js" => "application/javascript",
        _ => "text/plain; charset=utf8",
    }
}

/// Rejects anything that could escape the served directory.
fn is_path_safe(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

fn handle(request: &mut Request<'_, '_>, response: &mut Response<'_, '_>) -> simple_http::HandlerResult {
    println!("{} {}", request.method_name(), request.href());

    if *request.method() != Method::Get {
        response.write_head("405", "Method Not Allowed")?;
        response.end()?;
        return Ok(());
    }

    let relative = request.path().trim_start_matches('/').to_string();
    let path = if relative.is_empty() {
        Path::new("index.html")
    } else {
        Path::new(relative.as_str())
    };

    if !is_path_safe(path) {
        response.write_head("403", "Forbidden")?;
        response.end()?;
        return Ok(());
    }

    match fs::read(path) {
        Ok(content) => {
            response
                .headers_mut()
                .add("Content-Type", get_content_type(path));
            response
                .headers_mut()
                .add("Content-Length", content.len().to_string());
            response
                .headers_mut()
                .add("Date", httpdate::fmt_http_date(SystemTime::now()));
            response.write_head("200", "OK")?;
            response.write(&content)?;
        }
        Err(err) => {
            eprintln!("{err:#?}");
            response.write_head("404", "Not Found")?;
            response.write(b"Not Found")?;
        }
    }

    response.end()?;
    Ok(())
}

fn main() {
    let server = HttpServer::new(FnRequestHandler(handle));

    let listening = server.listen_on("0.0.0.0", 8000).unwrap();
    println!("Now listening on port {}", listening.local_addr().port());

    listening.join();
}
