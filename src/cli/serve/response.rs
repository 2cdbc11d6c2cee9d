//! HTTP response handlers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::config::Config;
use crate::reload::inject_reload_script;
use crate::utils::mime;
use crate::utils::mime::types::{HTML, PLAIN};

/// Respond with a file from the output root, injecting the reload script
/// into HTML bodies.
pub fn respond_file(request: Request, path: &Path, ws_port: u16) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = maybe_inject(body, content_type, ws_port);
    send_body(request, 200, content_type, body)
}

/// Respond with the project's `404.html` when present, plain text otherwise.
pub fn respond_not_found(request: Request, config: &Config, ws_port: u16) -> Result<()> {
    let custom = config.output_dir().join("404.html");
    let has_custom = custom.is_file();

    if is_head_request(&request) {
        let content_type = if has_custom { HTML } else { PLAIN };
        return send_head(request, 404, content_type);
    }

    if has_custom
        && let Ok(body) = fs::read(&custom)
    {
        let body = maybe_inject(body, HTML, ws_port);
        return send_body(request, 404, HTML, body);
    }

    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 while the process is shutting down.
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

fn maybe_inject(body: Vec<u8>, content_type: &str, ws_port: u16) -> Vec<u8> {
    if content_type.starts_with("text/html") {
        inject_reload_script(&body, ws_port)
    } else {
        body
    }
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response =
        Response::empty(StatusCode(status)).with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
