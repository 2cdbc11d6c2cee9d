//! Live-reload signaling.
//!
//! [`ReloadChannel`] is the in-process side: the watch loop calls
//! [`ReloadChannel::signal`] after a successful rebuild, and every
//! subscriber gets woken. Delivery is fan-out with no replay: a signal
//! sent while nobody listens is dropped, and a late subscriber sees
//! nothing until the next one. Each subscriber slot holds at most one
//! pending signal, so bursts coalesce.
//!
//! The transport side lives in [`server`]: a plain TCP + tungstenite
//! WebSocket endpoint, one forwarding thread per browser tab.

mod script;
mod server;

pub use script::inject_reload_script;
pub use server::start_reload_server;

use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use parking_lot::Mutex;

use crate::debug;

/// Broadcast channel for "site rebuilt" notifications.
#[derive(Clone, Default)]
pub struct ReloadChannel {
    subscribers: Arc<Mutex<Vec<Sender<()>>>>,
}

impl ReloadChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and return its receiving end.
    pub fn subscribe(&self) -> Receiver<()> {
        let (tx, rx) = channel::bounded(1);
        self.subscribers.lock().push(tx);
        rx
    }

    /// Wake every live subscriber; dead ones are pruned here.
    pub fn signal(&self) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| match tx.try_send(()) {
            Ok(()) => true,
            // A pending signal is already queued; one reload covers both.
            Err(TrySendError::Full(())) => true,
            Err(TrySendError::Disconnected(())) => false,
        });
        debug!("reload"; "signaled {} clients", subscribers.len());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_wakes_all_subscribers() {
        let channel = ReloadChannel::new();
        let a = channel.subscribe();
        let b = channel.subscribe();

        channel.signal();

        assert!(a.try_recv().is_ok());
        assert!(b.try_recv().is_ok());
    }

    #[test]
    fn test_no_replay_for_late_subscriber() {
        let channel = ReloadChannel::new();
        channel.signal();

        let late = channel.subscribe();
        assert!(late.try_recv().is_err());

        channel.signal();
        assert!(late.try_recv().is_ok());
    }

    #[test]
    fn test_burst_coalesces_to_one_pending_signal() {
        let channel = ReloadChannel::new();
        let rx = channel.subscribe();

        channel.signal();
        channel.signal();
        channel.signal();

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscriber_pruned_on_signal() {
        let channel = ReloadChannel::new();
        let rx = channel.subscribe();
        let kept = channel.subscribe();
        assert_eq!(channel.subscriber_count(), 2);

        drop(rx);
        channel.signal();

        assert_eq!(channel.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }
}
