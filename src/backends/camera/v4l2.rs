// SPDX-License-Identifier: GPL-3.0-only

//! Direct V4L2 webcam capture
//!
//! Opens the device with the v4l crate, negotiates MJPG (falling back to
//! YUYV) at the requested size and streams through memory-mapped buffers.

use super::format_converters::yuyv_to_rgb;
use super::types::*;
use crate::constants::timing;
use crate::errors::CameraError;
use image::{ImageFormat, RgbImage};
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::capability::Flags;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

/// Webcam frame source backed by a V4L2 capture node
pub struct V4l2Source {
    // Declared before `_device` so buffers are unmapped first
    stream: MmapStream<'static>,
    _device: Device,
    path: String,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    sequence: u64,
}

impl V4l2Source {
    /// Open `path` and start streaming at (approximately) `width` x `height`
    ///
    /// The driver may pick a different size; the negotiated one is used.
    pub fn open(path: &str, width: u32, height: u32) -> BackendResult<Self> {
        info!(device_path = %path, width, height, "Opening V4L2 device");

        let device = Device::with_path(path)
            .map_err(|e| CameraError::OpenFailed(format!("{}: {}", path, e)))?;

        let (pixel_format, format) = negotiate_format(&device, width, height)?;

        info!(
            width = format.width,
            height = format.height,
            fourcc = %pixel_format,
            "Negotiated capture format"
        );

        let stream =
            MmapStream::with_buffers(&device, Type::VideoCapture, timing::CAPTURE_BUFFER_COUNT)
                .map_err(|e| CameraError::OpenFailed(format!("buffer stream: {}", e)))?;

        Ok(Self {
            stream,
            _device: device,
            path: path.to_string(),
            width: format.width,
            height: format.height,
            pixel_format,
            sequence: 0,
        })
    }

    fn decode(&self, buf: &[u8]) -> BackendResult<RgbImage> {
        match self.pixel_format {
            PixelFormat::Mjpeg => image::load_from_memory_with_format(buf, ImageFormat::Jpeg)
                .map(|img| img.to_rgb8())
                .map_err(|e| CameraError::InvalidFormat(format!("MJPG decode: {}", e))),
            PixelFormat::Yuyv => {
                let rgb = yuyv_to_rgb(buf, self.width, self.height);
                RgbImage::from_raw(self.width, self.height, rgb).ok_or_else(|| {
                    CameraError::InvalidFormat(format!(
                        "short YUYV buffer ({} bytes for {}x{})",
                        buf.len(),
                        self.width,
                        self.height
                    ))
                })
            }
        }
    }
}

impl super::FrameSource for V4l2Source {
    fn read_frame(&mut self) -> BackendResult<CameraFrame> {
        let image = {
            let (buf, meta) = self
                .stream
                .next()
                .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

            if buf.is_empty() {
                return Err(CameraError::Disconnected);
            }

            if self.sequence % 300 == 0 {
                debug!(
                    frame = self.sequence,
                    driver_sequence = meta.sequence,
                    size = buf.len(),
                    "V4L2 frame captured"
                );
            }

            // Copy out of the mapped buffer before it is requeued
            let buf = buf.to_vec();
            self.decode(&buf)?
        };

        let frame = CameraFrame::new(image, self.sequence);
        self.sequence += 1;
        Ok(frame)
    }

    fn description(&self) -> String {
        format!(
            "{} ({}x{} {})",
            self.path, self.width, self.height, self.pixel_format
        )
    }
}

impl Drop for V4l2Source {
    fn drop(&mut self) {
        info!(device_path = %self.path, "Releasing V4L2 device");
    }
}

/// Try the preferred formats in order and return the first the driver accepts
fn negotiate_format(
    device: &Device,
    width: u32,
    height: u32,
) -> BackendResult<(PixelFormat, v4l::Format)> {
    let mut format = device
        .format()
        .map_err(|e| CameraError::OpenFailed(format!("query format: {}", e)))?;

    for candidate in PixelFormat::PREFERRED {
        let fourcc = FourCC::new(candidate.fourcc());
        format.width = width;
        format.height = height;
        format.fourcc = fourcc;

        match device.set_format(&format) {
            Ok(applied) if applied.fourcc == fourcc => return Ok((candidate, applied)),
            Ok(applied) => {
                debug!(requested = %candidate, got = ?applied.fourcc, "Format not accepted");
            }
            Err(e) => {
                warn!(format = %candidate, error = %e, "Could not set format");
            }
        }
    }

    Err(CameraError::InvalidFormat(
        "device supports neither MJPG nor YUYV".to_string(),
    ))
}

/// List V4L2 nodes that can capture video
pub fn enumerate_cameras() -> Vec<CameraDevice> {
    let mut cameras = Vec::new();

    for node in v4l::context::enum_devices() {
        let path = node.path().to_string_lossy().to_string();

        let device = match Device::with_path(&path) {
            Ok(device) => device,
            Err(e) => {
                debug!(path = %path, error = %e, "Skipping unopenable node");
                continue;
            }
        };

        let caps = match device.query_caps() {
            Ok(caps) => caps,
            Err(e) => {
                debug!(path = %path, error = %e, "Skipping node without capabilities");
                continue;
            }
        };

        // Metadata nodes share the card name but cannot capture
        if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
            continue;
        }

        cameras.push(CameraDevice {
            name: node.name().unwrap_or_else(|| caps.card.clone()),
            path,
            driver: caps.driver,
        });
    }

    cameras.sort_by(|a, b| a.path.cmp(&b.path));
    cameras
}
