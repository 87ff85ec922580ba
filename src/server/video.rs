// SPDX-License-Identifier: GPL-3.0-only

//! Landing page and the multipart JPEG stream

use super::AppState;
use crate::constants::timing::FRAME_WAIT_INTERVAL;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use rust_embed::RustEmbed;
use std::convert::Infallible;
use tracing::{debug, warn};

/// Multipart boundary of `/video_feed`
pub const BOUNDARY: &str = "frame";

/// Content type of `/video_feed`
pub const STREAM_CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

pub async fn index() -> Response {
    match Assets::get("index.html") {
        Some(page) => Html(page.data.into_owned()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Wrap one JPEG as a multipart part
pub fn multipart_part(jpeg: &[u8]) -> Vec<u8> {
    let header = format!("--{}\r\nContent-Type: image/jpeg\r\n\r\n", BOUNDARY);
    let mut part = Vec::with_capacity(header.len() + jpeg.len() + 2);
    part.extend_from_slice(header.as_bytes());
    part.extend_from_slice(jpeg);
    part.extend_from_slice(b"\r\n");
    part
}

/// Endless stream of the latest published frame
///
/// Polls independently of the pipeline, so a slow client sees skipped
/// frames and a fast one sees repeats. Nothing is sent until the first
/// frame is published. The stream ends when the server shuts down.
pub async fn video_feed(State(app): State<AppState>) -> Response {
    let stream = async_stream::stream! {
        while !app.is_shutting_down() {
            let Some(frame) = app.monitor.latest_frame() else {
                tokio::time::sleep(FRAME_WAIT_INTERVAL).await;
                continue;
            };

            match app.encoder.encode(frame).await {
                Ok(jpeg) => {
                    yield Ok::<_, Infallible>(Bytes::from(multipart_part(&jpeg)));
                }
                Err(e) => warn!(error = %e, "Dropping frame from video stream"),
            }

            tokio::time::sleep(app.settings.stream_interval).await;
        }
    };

    debug!("Video stream client connected");
    ([(header::CONTENT_TYPE, STREAM_CONTENT_TYPE)], Body::from_stream(stream)).into_response()
}
