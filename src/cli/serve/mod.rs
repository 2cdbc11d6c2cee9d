//! Development HTTP server for watch mode.
//!
//! Serves the output directory only; requests never trigger builds. The
//! watch loop keeps the output fresh and the reload endpoint tells the
//! browser when to refetch.

mod path;
mod response;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tiny_http::{Request, Server};

use crate::config::Config;
use crate::{core, log};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the given interface and port, walking upward on conflict.
pub fn bind_with_retry(interface: std::net::IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < MAX_PORT_RETRIES => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to bind after {} attempts (ports {}-{}): {}",
                    MAX_PORT_RETRIES,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

/// Blocking request loop. Returns when the server is unblocked by the
/// shutdown handler.
pub fn run_request_loop(server: &Server, config: Arc<Config>, ws_port: u16) {
    // Small pool so one slow response never stalls the others.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        let config = Arc::clone(&config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config, ws_port) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

fn handle_request(request: Request, config: &Config, ws_port: u16) -> Result<()> {
    if core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    if let Some(path) = path::resolve_path(request.url(), &config.output_dir()) {
        return response::respond_file(request, &path, ws_port);
    }

    response::respond_not_found(request, config, ws_port)
}
