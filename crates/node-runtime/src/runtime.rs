//! # Node Runtime
//!
//! Starts the container's long-running tasks and stops them in order.
//!
//! ## Startup Sequence
//!
//! 1. Install genesis (chain state + block store)
//! 2. Spawn the notification loop
//! 3. Signal ready
//!
//! ## Shutdown Sequence
//!
//! 1. Signal shutdown (no-op if a fatal error already did)
//! 2. Wait for the notification loop to finish its tick
//! 3. Unregister all listeners

use crate::container::{NodeConfig, NodeContainer};
use crate::warnings::WarningTarget;
use anyhow::{Context, Result};
use std::sync::Arc;
use tip_notifier::{NotifierHandle, NotifierResult, TipNotifierApi};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub struct NodeRuntime {
    container: Arc<NodeContainer>,
    notifier: Option<JoinHandle<NotifierResult<()>>>,
    status: Option<NotifierHandle>,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Self {
        info!("[node] Creating node runtime");
        Self {
            container: Arc::new(NodeContainer::new(config)),
            notifier: None,
            status: None,
        }
    }

    /// Install genesis and start the notification loop.
    pub async fn start(&mut self) -> Result<()> {
        self.container
            .config
            .validate()
            .context("invalid notifier configuration")?;

        self.container
            .install_genesis()
            .context("failed to install genesis block")?;

        let notification_loop = self.container.notification_loop();
        self.status = Some(notification_loop.handle());
        let shutdown_rx = self.container.shutdown.subscribe();
        let shutdown = Arc::clone(&self.container.shutdown);
        self.notifier = Some(tokio::spawn(async move {
            let result = notification_loop.run(shutdown_rx).await;
            // A block-level listener failure stops the node as well.
            if result.is_err() {
                shutdown.request_shutdown();
            }
            result
        }));

        info!("[node] Notification loop started");
        Ok(())
    }

    /// Resolves once shutdown has been requested, by the operator or by a
    /// fatal error inside the node.
    pub async fn stopped(&self) {
        let mut rx = self.container.shutdown.subscribe();
        // A closed channel also means nothing is left to wait for.
        let _ = rx.wait_for(|stop| *stop).await;
    }

    /// Stop every task and release listeners.
    ///
    /// Returns an error if the notification loop terminated abnormally.
    pub async fn shutdown(mut self) -> Result<()> {
        info!("[node] Initiating graceful shutdown...");
        self.container.shutdown.request_shutdown();

        let outcome = match self.notifier.take() {
            Some(task) => task.await.context("notification loop panicked")?,
            None => Ok(()),
        };

        self.container.teardown();

        let status_bar = self.container.warnings.get_warnings(WarningTarget::StatusBar);
        if !status_bar.is_empty() {
            warn!("[node] {}", status_bar);
        }
        if let Some(status) = &self.status {
            info!(
                "[node] Notifier stopped after {} ticks at {:?}",
                status.ticks_completed(),
                status.last_notified().map(|t| t.height)
            );
        }

        match outcome {
            Ok(()) => {
                info!("[node] Shutdown complete");
                Ok(())
            }
            Err(e) => {
                error!("[node] Notification loop failed: {}", e);
                Err(e).context("notification loop terminated")
            }
        }
    }

    pub fn container(&self) -> Arc<NodeContainer> {
        Arc::clone(&self.container)
    }

    pub fn notifier_status(&self) -> Option<NotifierHandle> {
        self.status.clone()
    }
}
