// SPDX-License-Identifier: GPL-3.0-only

//! Bactrack - webcam posture monitor
//!
//! Watches a webcam, locates the nose and shoulders with an external pose
//! model, and turns the nose-to-shoulder distance into a posture rating
//! relative to a calibrated baseline. Results are served as a live MJPEG
//! feed and over two WebSocket channels.
//!
//! # Architecture
//!
//! - [`backends`]: frame sources (V4L2 webcam, replayed images) and the capture thread
//! - [`pose`]: landmarks, geometry and the landmark extractor contract
//! - [`posture`]: rating formula, baseline calibration and rating history
//! - [`pipeline`]: per-frame processing, overlay drawing and JPEG encoding
//! - [`state`]: state shared between the pipeline and the network handlers
//! - [`server`]: HTTP routes and WebSocket channels
//! - [`config`]: user configuration handling

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipeline;
pub mod pose;
pub mod posture;
pub mod server;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use posture::{PostureEngine, RatingSnapshot, RatingStatus};
pub use state::MonitorState;
