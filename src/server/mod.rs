// SPDX-License-Identifier: GPL-3.0-only

//! Live delivery layer
//!
//! | Route | Handler |
//! |---|---|
//! | `/` | [`video::index`] |
//! | `/video_feed` | [`video::video_feed`] |
//! | `/ws/` | [`channels::command_channel`] |
//! | `/ws/rating` | [`channels::push_channel`] |
//!
//! All handlers share one [`AppState`]. The frame pipeline runs beside the
//! server on its own thread and is stopped once the server has shut down.

pub mod channels;
pub mod messages;
pub mod video;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::pipeline::{FrameEncoder, FramePipeline};
use crate::posture::PostureEngine;
use crate::state::MonitorState;
use axum::Router;
use axum::routing::get;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

/// Timing knobs of the network handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSettings {
    pub stream_interval: Duration,
    pub push_interval: Duration,
    pub rating_cooldown: Duration,
}

impl From<&Config> for ServerSettings {
    fn from(config: &Config) -> Self {
        Self {
            stream_interval: config.stream_interval(),
            push_interval: config.push_interval(),
            rating_cooldown: config.rating_cooldown(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Handler state
#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<MonitorState>,
    pub settings: ServerSettings,
    pub encoder: FrameEncoder,
    /// Flips to `true` once shutdown starts; endless streams poll it
    shutdown: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(monitor: Arc<MonitorState>, settings: ServerSettings, encoder: FrameEncoder) -> Self {
        let (_, shutdown) = watch::channel(false);
        Self {
            monitor,
            settings,
            encoder,
            shutdown,
        }
    }

    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(video::index))
        .route("/video_feed", get(video::video_feed))
        .route("/ws/", get(channels::command_channel))
        .route("/ws/rating", get(channels::push_channel))
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve_on<F>(listener: TcpListener, state: AppState, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}

/// Run the whole monitor: frame pipeline plus HTTP server, until Ctrl-C
pub async fn run(config: Config) -> AppResult<()> {
    config.validate()?;

    let monitor = Arc::new(MonitorState::new(PostureEngine::new(config.history_limit)));
    let state = AppState::new(
        Arc::clone(&monitor),
        ServerSettings::from(&config),
        FrameEncoder::new(config.jpeg_quality),
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    let state = state.with_shutdown(stop_rx);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind {}: {}", address, e)))?;
    info!(address = %address, "Serving posture monitor");

    let pipeline = FramePipeline::start(config, monitor);
    let result = serve_on(listener, state, async move {
        shutdown_signal().await;
        stop_tx.send_replace(true);
    })
    .await;

    // Releases the camera and the extractor
    pipeline.stop();
    info!("Shutdown complete");
    result
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
