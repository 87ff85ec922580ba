// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera backends

use crate::errors::CameraError;
use image::RgbImage;
use std::time::Instant;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, CameraError>;

/// A captured frame, converted to packed RGB
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub image: RgbImage,
    /// Monotonic frame counter of the source
    pub sequence: u64,
    /// When the frame was handed out by the source
    pub captured_at: Instant,
}

impl CameraFrame {
    pub fn new(image: RgbImage, sequence: u64) -> Self {
        Self {
            image,
            sequence,
            captured_at: Instant::now(),
        }
    }
}

/// Pixel formats the V4L2 backend can negotiate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Motion JPEG, each buffer is a complete JPEG image
    Mjpeg,
    /// YUV 4:2:2 packed as Y0 U Y1 V
    Yuyv,
}

impl PixelFormat {
    /// Formats in order of preference
    pub const PREFERRED: [PixelFormat; 2] = [PixelFormat::Mjpeg, PixelFormat::Yuyv];

    /// V4L2 FourCC code
    pub fn fourcc(&self) -> &'static [u8; 4] {
        match self {
            PixelFormat::Mjpeg => b"MJPG",
            PixelFormat::Yuyv => b"YUYV",
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelFormat::Mjpeg => write!(f, "MJPG"),
            PixelFormat::Yuyv => write!(f, "YUYV"),
        }
    }
}

/// A capture device found during enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Card name reported by the driver
    pub name: String,
    /// Device node, e.g. /dev/video0
    pub path: String,
    /// Kernel driver name
    pub driver: String,
}
