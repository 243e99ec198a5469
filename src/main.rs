//! xp-cadence - Runs the cadence sweep for the local XP store.
//!
//! Startup sweeps every expired window once, then keeps sweeping on the
//! configured interval until Ctrl-C.
//!
//! Environment variables (all optional):
//!   XP_CADENCE__CADENCE__UTC_OFFSET - Fixed offset for window boundaries (default: local zone)
//!   XP_CADENCE__CLOCK__FIXED_NOW - RFC 3339 instant to pin the clock to
//!   XP_CADENCE__SCHEDULER__ENABLED - Keep sweeping after startup (default: true)
//!   XP_CADENCE__SCHEDULER__SWEEP_INTERVAL_SECS - Seconds between sweeps (default: 300)
//!   XP_CADENCE__LOGGING__FILTER - Log filter, overridden by RUST_LOG (default: xp_cadence=info)
//!   XP_CADENCE__LOGGING__JSON - Emit JSON log lines (default: false)

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xp_cadence::adapters::{
    FixedClock, InMemoryCadenceStore, InMemoryEventBus, PeriodicSweepConfig, PeriodicSweeper,
    RandomObjectiveGenerator, SystemClock,
};
use xp_cadence::application::CadenceAppState;
use xp_cadence::config::{AppConfig, ConfigError, LoggingConfig};
use xp_cadence::ports::Clock;

#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let calendar = match config.cadence.calendar() {
        Ok(calendar) => calendar,
        Err(e) => {
            error!(error = %e, "Invalid calendar zone");
            std::process::exit(1);
        }
    };
    let clock: Arc<dyn Clock> = match config.clock.fixed_instant() {
        Ok(Some(now)) => {
            info!(now = %now.as_datetime(), "Clock pinned");
            Arc::new(FixedClock::new(now))
        }
        Ok(None) => Arc::new(SystemClock),
        Err(e) => {
            error!(error = %e, "Invalid clock override");
            std::process::exit(1);
        }
    };

    let state = CadenceAppState::with_store(
        Arc::new(InMemoryCadenceStore::new()),
        Arc::new(RandomObjectiveGenerator::new()),
        calendar,
        clock,
        Arc::new(InMemoryEventBus::new()),
    );
    let sweeper = PeriodicSweeper::new(
        Arc::new(state.sweep_cycles_handler()),
        PeriodicSweepConfig::default().with_interval(config.scheduler.sweep_interval()),
    );

    if !config.scheduler.enabled {
        match sweeper.sweep_once("foreground").await {
            Ok(report) => info!(
                advanced = report.advanced.len(),
                failed = report.failures.len(),
                "Foreground sweep finished"
            ),
            Err(e) => {
                error!(error = %e, "Foreground sweep failed");
                std::process::exit(1);
            }
        }
        return;
    }

    // The first tick of the periodic loop is the foreground sweep.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep_handle = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Received shutdown signal");

    let _ = shutdown_tx.send(true);
    if let Err(e) = sweep_handle.await {
        error!(error = %e, "Sweep task error");
    }
    info!("Shut down");
}

fn load_config() -> Result<AppConfig, ConfigError> {
    let config = AppConfig::load()?;
    config.validate()?;
    Ok(config)
}

fn init_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = logging.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    Ok(())
}
