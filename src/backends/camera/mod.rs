// SPDX-License-Identifier: GPL-3.0-only

//! Camera capture backends
//!
//! Every backend implements [`FrameSource`], which hands out one RGB frame per
//! call. Backends are opened on the capture thread and never shared.

pub mod file_source;
pub mod format_converters;
pub mod frame_loop;
pub mod types;
pub mod v4l2;

pub use file_source::FileSource;
pub use frame_loop::{CaptureLoopController, LoopAction};
pub use types::*;
pub use v4l2::V4l2Source;

use crate::config::Config;
use tracing::info;

/// A source of camera frames
pub trait FrameSource: Send {
    /// Block until the next frame is available
    ///
    /// An error means the source is unusable; callers do not retry.
    fn read_frame(&mut self) -> BackendResult<CameraFrame>;

    /// Human readable description for logging
    fn description(&self) -> String;
}

/// Open the frame source selected by the configuration
///
/// An `image_source` takes precedence over the V4L2 device.
pub fn open_source(config: &Config) -> BackendResult<Box<dyn FrameSource>> {
    let source: Box<dyn FrameSource> = match &config.image_source {
        Some(path) => Box::new(FileSource::open(path)?),
        None => Box::new(V4l2Source::open(
            &config.camera_device,
            config.frame_width,
            config.frame_height,
        )?),
    };

    info!(source = %source.description(), "Frame source opened");
    Ok(source)
}
