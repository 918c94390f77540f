//! Fatal shutdown path for the runtime.

use crate::warnings::NodeWarnings;
use std::sync::Arc;
use tip_notifier::{ProcessControl, ShutdownController};

/// Records the fatal message as the misc warning, then signals shutdown.
pub struct RuntimeProcessControl {
    warnings: Arc<NodeWarnings>,
    shutdown: Arc<ShutdownController>,
}

impl RuntimeProcessControl {
    pub fn new(warnings: Arc<NodeWarnings>, shutdown: Arc<ShutdownController>) -> Self {
        Self { warnings, shutdown }
    }
}

impl ProcessControl for RuntimeProcessControl {
    fn request_fatal_shutdown(&self, user_message: &str) {
        self.warnings.set_misc_warning(user_message);
        self.shutdown.request_fatal_shutdown(user_message);
    }
}
