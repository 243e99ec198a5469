//! PeriodicSweeper - Background timer that runs the cadence sweep.
//!
//! The first tick fires immediately, so starting the sweeper doubles as the
//! foreground sweep. Failed sweeps are logged and retried on the next tick.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 300s | Time between sweeps |
//!
//! ## Graceful Shutdown
//!
//! The loop exits when the shutdown channel flips to `true` or its sender
//! is dropped. A sweep in progress runs to completion first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::application::{SweepCyclesCommand, SweepCyclesHandler, SweepReport};
use crate::domain::foundation::{CommandMetadata, DomainError};

/// Configuration for the PeriodicSweeper service.
#[derive(Debug, Clone)]
pub struct PeriodicSweepConfig {
    /// How often to sweep.
    pub interval: Duration,
}

impl Default for PeriodicSweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
        }
    }
}

impl PeriodicSweepConfig {
    /// Create config with a custom interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Runs `SweepCyclesHandler` on a fixed timer.
pub struct PeriodicSweeper {
    handler: Arc<SweepCyclesHandler>,
    config: PeriodicSweepConfig,
}

impl PeriodicSweeper {
    pub fn new(handler: Arc<SweepCyclesHandler>, config: PeriodicSweepConfig) -> Self {
        Self { handler, config }
    }

    /// Sweep until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = self.config.interval.as_secs(), "Periodic sweep started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Periodic sweep stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(err) = self.sweep_once("timer").await {
                        error!(error = %err, "Periodic sweep failed");
                    }
                }
            }
        }
    }

    /// Runs a single sweep tagged with `trigger`.
    pub async fn sweep_once(&self, trigger: &str) -> Result<SweepReport, DomainError> {
        let report = self
            .handler
            .handle(SweepCyclesCommand, CommandMetadata::new(trigger))
            .await?;
        debug!(
            trigger,
            advanced = report.advanced.len(),
            failed = report.failures.len(),
            "Sweep finished"
        );
        Ok(report)
    }
}
