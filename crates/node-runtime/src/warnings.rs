//! # Node Warnings
//!
//! Operator-facing warning state, owned by the runtime container and shared
//! by `Arc`. The fatal-shutdown path writes the misc warning here so the
//! status bar shows why the node is stopping.

use parking_lot::Mutex;

/// Where a warning string is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningTarget {
    StatusBar,
    Rpc,
}

pub const PRE_RELEASE_WARNING: &str = "This is a pre-release test build - use at your own risk - do not use for mining or merchant applications";
pub const TEST_SAFE_MODE_WARNING: &str = "testsafemode enabled";
pub const LARGE_WORK_FORK_WARNING: &str = "Warning: The network does not appear to fully agree! Some miners appear to be experiencing issues.";
pub const LARGE_WORK_INVALID_CHAIN_WARNING: &str = "Warning: We do not appear to fully agree with our peers! You may need to upgrade, or other nodes may need to upgrade.";

#[derive(Debug, Default)]
struct WarningState {
    misc: String,
    large_work_fork_found: bool,
    large_work_invalid_chain_found: bool,
}

/// Warning flags and the misc warning message.
#[derive(Debug)]
pub struct NodeWarnings {
    pre_release: bool,
    test_safe_mode: bool,
    state: Mutex<WarningState>,
}

impl NodeWarnings {
    pub fn new(pre_release: bool, test_safe_mode: bool) -> Self {
        Self {
            pre_release,
            test_safe_mode,
            state: Mutex::new(WarningState::default()),
        }
    }

    /// Misc warnings like out of disk space, clock skew, or a fatal error.
    pub fn set_misc_warning(&self, warning: impl Into<String>) {
        self.state.lock().misc = warning.into();
    }

    pub fn set_large_work_fork_found(&self, found: bool) {
        self.state.lock().large_work_fork_found = found;
    }

    pub fn large_work_fork_found(&self) -> bool {
        self.state.lock().large_work_fork_found
    }

    pub fn set_large_work_invalid_chain_found(&self, found: bool) {
        self.state.lock().large_work_invalid_chain_found = found;
    }

    /// Highest-priority warning for `target`; empty when there is none.
    ///
    /// Later checks override earlier ones: pre-release notice, test safe
    /// mode, misc warning (status bar only), large-work fork, invalid chain.
    pub fn get_warnings(&self, target: WarningTarget) -> String {
        let state = self.state.lock();
        let mut status_bar = String::new();
        let mut rpc = String::new();

        if self.pre_release {
            status_bar = PRE_RELEASE_WARNING.to_string();
        }

        if self.test_safe_mode {
            status_bar = TEST_SAFE_MODE_WARNING.to_string();
            rpc = TEST_SAFE_MODE_WARNING.to_string();
        }

        if !state.misc.is_empty() {
            status_bar = state.misc.clone();
        }

        if state.large_work_fork_found {
            status_bar = LARGE_WORK_FORK_WARNING.to_string();
            rpc = LARGE_WORK_FORK_WARNING.to_string();
        } else if state.large_work_invalid_chain_found {
            status_bar = LARGE_WORK_INVALID_CHAIN_WARNING.to_string();
            rpc = LARGE_WORK_INVALID_CHAIN_WARNING.to_string();
        }

        match target {
            WarningTarget::StatusBar => status_bar,
            WarningTarget::Rpc => rpc,
        }
    }
}
