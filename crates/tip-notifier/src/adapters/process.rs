use crate::ports::outbound::ProcessControl;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::error;

/// Shutdown signal shared by the notification loop and its host.
///
/// A fatal request records the user-facing message and flips the watch
/// channel every subscriber selects on.
pub struct ShutdownController {
    signal: watch::Sender<bool>,
    fatal_messages: Mutex<Vec<String>>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            signal,
            fatal_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.signal.subscribe()
    }

    /// Orderly shutdown (Ctrl+C, RPC stop).
    pub fn request_shutdown(&self) {
        self.signal.send_replace(true);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        *self.signal.borrow()
    }

    pub fn fatal_messages(&self) -> Vec<String> {
        self.fatal_messages.lock().clone()
    }

    pub fn fatal_count(&self) -> usize {
        self.fatal_messages.lock().len()
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessControl for ShutdownController {
    fn request_fatal_shutdown(&self, user_message: &str) {
        error!("[tip-notifier] Fatal shutdown requested: {}", user_message);
        self.fatal_messages.lock().push(user_message.to_string());
        self.request_shutdown();
    }
}
