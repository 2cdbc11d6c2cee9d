//! The `watch` command: initial build, dev server, reload endpoint, and
//! the rebuild loop.

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use anyhow::Result;

use super::serve;
use crate::config::Config;
use crate::core;
use crate::dispatch::Dispatcher;
use crate::log;
use crate::reload::{ReloadChannel, start_reload_server};
use crate::watch::WatchLoop;

/// The reload WebSocket binds next to the HTTP port.
const WS_PORT_OFFSET: u16 = 1;

/// Run the watch session until Ctrl+C.
///
/// The HTTP request loop gets its own thread; the watch loop owns this
/// one. An initial build failure is reported but does not end the
/// session, the first successful rebuild recovers it.
pub fn run_watch(
    config: Arc<Config>,
    dispatcher: Dispatcher,
    config_path: &Path,
    interface: Option<IpAddr>,
    port: Option<u16>,
) -> Result<()> {
    let interface = interface.unwrap_or(config.serve.interface);
    let port = port.unwrap_or(config.serve.port);

    match dispatcher.run_full() {
        Ok(report) => report.log_summary(),
        Err(e) => log!("error"; "initial build failed: {e}"),
    }

    let reload = ReloadChannel::new();
    let ws_port = start_reload_server(
        interface,
        port.saturating_add(WS_PORT_OFFSET),
        reload.clone(),
    )?;

    let (server, addr) = serve::bind_with_retry(interface, port)?;
    let server = Arc::new(server);
    core::register_server(Arc::clone(&server));
    log!("serve"; "http://{addr}");

    let serve_config = Arc::clone(&config);
    let http = thread::spawn(move || serve::run_request_loop(&server, serve_config, ws_port));

    let watcher = WatchLoop::new(dispatcher, reload, config_path);
    watcher.run()?;

    // Loop exited on shutdown; unblock the request loop and wait for it.
    core::request_shutdown();
    let _ = http.join();
    Ok(())
}
