// SPDX-License-Identifier: GPL-3.0-only

//! WebSocket channels
//!
//! - `/ws/` answers one command per message. After a `rating` reply the
//!   connection sleeps for the configured cooldown before reading again.
//! - `/ws/rating` pushes a rating snapshot on a fixed interval until the
//!   client goes away.
//!
//! The two channels classify ratings with different thresholds.

use super::AppState;
use super::messages::{Command, GraphResponse, Reply, StatusResponse};
use crate::constants::{PUSH_THRESHOLDS, QUERY_THRESHOLDS};
use crate::state::MonitorState;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Apply a command to the shared state and build its reply
pub fn handle_command(state: &MonitorState, command: Command) -> Reply {
    match command {
        Command::Calibrate => Reply::Status(StatusResponse::calibrated(state.calibrate())),
        Command::Reset => {
            state.reset_baseline();
            Reply::Status(StatusResponse::reset())
        }
        Command::Rating => Reply::Rating(state.rating_snapshot(QUERY_THRESHOLDS)),
        Command::Graph => Reply::Graph(GraphResponse {
            data: state.history(),
        }),
    }
}

pub async fn command_channel(ws: WebSocketUpgrade, State(app): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| run_command_channel(socket, app))
}

pub async fn push_channel(ws: WebSocketUpgrade, State(app): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| run_push_channel(socket, app))
}

async fn run_command_channel(mut socket: WebSocket, app: AppState) {
    info!("Command channel connected");

    while let Some(incoming) = socket.recv().await {
        let text = match incoming {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {
                warn!("Ignoring binary message on command channel");
                continue;
            }
            Ok(_) => continue,
            Err(e) => {
                debug!(error = %e, "Command channel receive failed");
                break;
            }
        };

        let command = match Command::parse(&text) {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, message = %text, "Ignoring client message");
                continue;
            }
        };

        debug!(?command, "Command received");
        let reply = handle_command(&app.monitor, command);
        if let Err(e) = send_json(&mut socket, &reply).await {
            debug!(error = %e, "Command channel send failed");
            break;
        }

        if command == Command::Rating && !app.settings.rating_cooldown.is_zero() {
            tokio::time::sleep(app.settings.rating_cooldown).await;
        }
    }

    info!("Command channel disconnected");
}

async fn run_push_channel(mut socket: WebSocket, app: AppState) {
    info!("Rating channel connected");

    let mut ticker = tokio::time::interval(app.settings.push_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if app.is_shutting_down() {
                    break;
                }
                let snapshot = app.monitor.rating_snapshot(PUSH_THRESHOLDS);
                if let Err(e) = send_json(&mut socket, &snapshot).await {
                    debug!(error = %e, "Rating channel send failed");
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                None | Some(Ok(Message::Close(_))) => break,
                Some(Err(e)) => {
                    debug!(error = %e, "Rating channel receive failed");
                    break;
                }
                // Push only; client messages are dropped
                Some(Ok(_)) => {}
            },
        }
    }

    info!("Rating channel disconnected");
}

async fn send_json<T: Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), axum::Error> {
    let text = serde_json::to_string(value).map_err(axum::Error::new)?;
    socket.send(Message::Text(text)).await
}
