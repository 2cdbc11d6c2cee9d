//! WebSocket endpoint that pushes reload signals to connected browsers.

use std::net::{IpAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tungstenite::protocol::Message;

use super::ReloadChannel;
use crate::{debug, log};

/// Maximum port retry attempts when the preferred port is taken.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind the reload endpoint and spawn its acceptor thread.
///
/// Returns the actual bound port, which may differ from `base_port` when
/// another process holds it.
pub fn start_reload_server(
    interface: IpAddr,
    base_port: u16,
    channel: ReloadChannel,
) -> Result<u16> {
    let (listener, port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    debug!("reload"; "ws://{interface}:{port}");

    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let signals = channel.subscribe();
                    thread::spawn(move || serve_client(stream, signals));
                }
                Err(e) => {
                    log!("reload"; "accept error: {e}");
                    thread::sleep(Duration::from_millis(100));
                }
            }
        }
    });

    Ok(port)
}

/// Forward reload signals to one browser tab until either side goes away.
fn serve_client(stream: TcpStream, signals: Receiver<()>) {
    let peer = stream.peer_addr().ok();

    let mut ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        Err(e) => {
            debug!("reload"; "handshake failed: {e}");
            return;
        }
    };

    if let Some(addr) = peer {
        debug!("reload"; "client connected: {addr}");
    }

    while signals.recv().is_ok() {
        if ws.send(Message::Text("reload".into())).is_err() {
            break;
        }
    }

    let _ = ws.close(None);
    if let Some(addr) = peer {
        debug!("reload"; "client disconnected: {addr}");
    }
}

/// Try binding to a port, walking upward on conflict.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind reload endpoint after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_bind_port_walks_past_taken_port() {
        let localhost = IpAddr::from([127, 0, 0, 1]);
        let (_held, taken) = try_bind_port(localhost, 0, 1).unwrap();

        let (_listener, port) = try_bind_port(localhost, taken, MAX_PORT_RETRIES).unwrap();
        assert_ne!(port, 0);
    }
}
