//! ==============================================================================
//! main.rs - serial monitor entry point
//! ==============================================================================
//!
//! responsibilities:
//!     - load configuration and start logging
//!     - open the sensor's serial port (absence is tolerated)
//!     - serve the dashboard in the background
//!     - run the polling loop that ticks the monitor once per interval
//!
//! architecture:
//!
//!     ┌──────────────────────────────────────────────────────────┐
//!     │  ┌──────────────┐                    ┌────────────────┐   │
//!     │  │ poll loop    │  publish figure    │ web server     │   │
//!     │  │ (1s cycle)   │ ─────────────────> │ (port 8051)    │   │
//!     │  │ owns Monitor │ <───────────────── │ stop / confirm │   │
//!     │  └──────────────┘  termination state └────────────────┘   │
//!     │          Arc<RwLock<DashboardState>> between the two       │
//!     └──────────────────────────────────────────────────────────┘
//!
//! ==============================================================================

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::{prelude::*, reload, EnvFilter, Registry};

use serial_monitor::config::MonitorConfig;
use serial_monitor::serial::{self, LineSource};
use serial_monitor::server::{self, AppState, DashboardState};
use serial_monitor::Monitor;

#[tokio::main]
async fn main() -> Result<()> {
    let log_filter = init_logging();
    let config = MonitorConfig::load_or_default();
    // RUST_LOG wins over the configured level
    if std::env::var_os("RUST_LOG").is_none() {
        if let Err(e) = log_filter.reload(EnvFilter::new(&config.logging.level)) {
            warn!("could not apply log level {:?}: {e}", config.logging.level);
        }
    }
    config.print_summary();

    serial::log_available_ports();
    let source = serial::open_port(&config.serial).map(|s| Box::new(s) as Box<dyn LineSource>);

    let mut monitor = Monitor::from_config(&config, source);
    let state = Arc::new(RwLock::new(DashboardState::default()));

    let app = AppState::new(state.clone(), config.polling.interval_ms);
    let bind = config.server.bind.clone();
    tokio::spawn(async move {
        if let Err(e) = server::run_server(&bind, app).await {
            error!("web server error: {e:#}");
        }
    });

    let mut ticker = tokio::time::interval(config.polling.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("polling every {}ms", config.polling.interval_ms);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("interrupted, shutting down");
                break;
            }
        }

        let terminated = state.read().await.termination.is_terminated();
        let figure = monitor.tick(terminated);
        state.write().await.publish(figure, &monitor);
    }

    monitor.release_source();
    Ok(())
}

fn init_logging() -> reload::Handle<EnvFilter, Registry> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, handle) = reload::Layer::new(filter);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
    handle
}
