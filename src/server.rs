//! ==============================================================================
//! server.rs - dashboard web server
//! ==============================================================================
//!
//! purpose:
//!     serves the single dashboard page and the json endpoints it polls.
//!     the polling task publishes a fresh figure every tick; handlers only
//!     read it, and drive the stop confirmation state machine.
//!
//! routes:
//!     GET  /                  dashboard html
//!     GET  /api               status (termination, stats, latest sample)
//!     GET  /api/figure        latest plotly figure
//!     POST /api/stop          open the confirmation prompt
//!     POST /api/stop/confirm  terminate collection
//!     POST /api/stop/cancel   close the prompt
//!
//! ==============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::buffer::SeriesBuffer;
use crate::chart::{self, Figure};
use crate::domain::{epoch_seconds, MonitorStats, Sample};
use crate::monitor::Monitor;
use crate::termination::TerminationState;

const PAGE: &str = include_str!("dashboard.html");

// ==============================================================================
// shared state
// ==============================================================================
// written by the polling task once per tick, read by every request.
// the stop endpoints are the only writers of `termination`.

#[derive(Clone, Debug)]
pub struct DashboardState {
    pub termination: TerminationState,
    pub figure: Figure,
    pub stats: MonitorStats,
    pub latest: Option<Sample>,
    pub buffer_len: usize,
    /// unix seconds of the last publish, 0 before the first tick
    pub last_update: f64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            termination: TerminationState::default(),
            figure: chart::live_figure(&SeriesBuffer::default()),
            stats: MonitorStats::default(),
            latest: None,
            buffer_len: 0,
            last_update: 0.0,
        }
    }
}

impl DashboardState {
    /// copy the result of a tick into the shared view
    pub fn publish(&mut self, figure: Figure, monitor: &Monitor) {
        self.figure = figure;
        self.stats = monitor.stats();
        self.latest = monitor.buffer().latest().copied();
        self.buffer_len = monitor.buffer().len();
        self.last_update = epoch_seconds();
    }
}

pub type SharedState = Arc<RwLock<DashboardState>>;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: SharedState,
    pub refresh_ms: u64,
}

impl AppState {
    pub fn new(dashboard: SharedState, refresh_ms: u64) -> Self {
        Self { dashboard, refresh_ms }
    }
}

// ==============================================================================
// responses
// ==============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TerminationView {
    pub state: TerminationState,
    pub terminated: bool,
    pub dialog_displayed: bool,
}

impl From<TerminationState> for TerminationView {
    fn from(state: TerminationState) -> Self {
        Self {
            state,
            terminated: state.is_terminated(),
            dialog_displayed: state.dialog_displayed(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct StatusView {
    pub termination: TerminationView,
    pub stats: MonitorStats,
    pub latest: Option<Sample>,
    pub buffer_len: usize,
    pub last_update: f64,
}

// ==============================================================================
// web server
// ==============================================================================

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/api", get(api_handler))
        .route("/api/figure", get(figure_handler))
        .route("/api/stop", post(stop_handler))
        .route("/api/stop/confirm", post(confirm_handler))
        .route("/api/stop/cancel", post(cancel_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(bind: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind dashboard on {bind}"))?;
    info!("dashboard live at http://{bind}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn dashboard_handler(State(app): State<AppState>) -> Html<String> {
    Html(PAGE.replace("__REFRESH_MS__", &app.refresh_ms.to_string()))
}

pub async fn figure_handler(State(app): State<AppState>) -> Json<Figure> {
    Json(app.dashboard.read().await.figure.clone())
}

pub async fn api_handler(State(app): State<AppState>) -> Json<StatusView> {
    let state = app.dashboard.read().await;
    Json(StatusView {
        termination: state.termination.into(),
        stats: state.stats,
        latest: state.latest,
        buffer_len: state.buffer_len,
        last_update: state.last_update,
    })
}

pub async fn stop_handler(State(app): State<AppState>) -> Json<TerminationView> {
    let state = app.dashboard.write().await.termination.request_stop();
    Json(state.into())
}

pub async fn confirm_handler(State(app): State<AppState>) -> Json<TerminationView> {
    let state = app.dashboard.write().await.termination.confirm();
    if state.is_terminated() {
        info!("termination confirmed from dashboard");
    }
    Json(state.into())
}

pub async fn cancel_handler(State(app): State<AppState>) -> Json<TerminationView> {
    let state = app.dashboard.write().await.termination.cancel();
    Json(state.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_log::CsvLog;
    use crate::serial::{LineSource, ScriptedSource};

    fn app() -> AppState {
        AppState::new(Arc::new(RwLock::new(DashboardState::default())), 1000)
    }

    #[tokio::test]
    async fn page_carries_refresh_period_and_controls() {
        let Html(page) = dashboard_handler(State(app())).await;
        assert!(page.contains("const REFRESH_MS = 1000;"));
        assert!(page.contains("Are you sure you want to terminate the program?"));
        assert!(page.contains("stop-button"));
    }

    #[tokio::test]
    async fn initial_figure_is_empty_live_graph() {
        let Json(figure) = figure_handler(State(app())).await;
        assert_eq!(figure.title(), chart::LIVE_TITLE);
        assert!(figure.data[0].x.is_empty());
    }

    #[tokio::test]
    async fn stop_confirm_flow() {
        let app = app();

        let Json(view) = confirm_handler(State(app.clone())).await;
        assert_eq!(view.state, TerminationState::Idle);

        let Json(view) = stop_handler(State(app.clone())).await;
        assert!(view.dialog_displayed);

        let Json(view) = cancel_handler(State(app.clone())).await;
        assert_eq!(view.state, TerminationState::Idle);

        stop_handler(State(app.clone())).await;
        let Json(view) = confirm_handler(State(app.clone())).await;
        assert!(view.terminated);
        assert!(!view.dialog_displayed);

        let Json(view) = cancel_handler(State(app.clone())).await;
        assert!(view.terminated);
    }

    #[tokio::test]
    async fn publish_feeds_status_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let source: Box<dyn LineSource> = Box::new(ScriptedSource::new(["7,3.25"]));
        let mut monitor = Monitor::new(
            Some(source),
            SeriesBuffer::default(),
            CsvLog::new(dir.path().join("out.csv")),
        );
        let app = app();

        let figure = monitor.tick(false);
        app.dashboard.write().await.publish(figure, &monitor);

        let Json(status) = api_handler(State(app.clone())).await;
        assert_eq!(status.buffer_len, 1);
        assert_eq!(status.latest.map(|s| s.value), Some(3.25));
        assert_eq!(status.stats.accepted, 1);
        assert!(status.last_update > 0.0);

        let Json(figure) = figure_handler(State(app)).await;
        assert_eq!(figure.data[0].y, vec![3.25]);
    }
}
