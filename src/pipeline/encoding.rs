// SPDX-License-Identifier: GPL-3.0-only

//! JPEG encoding of published frames for the video stream

use crate::constants::DEFAULT_JPEG_QUALITY;
use crate::errors::EncodeError;
use crate::state::AnnotatedFrame;
use image::RgbImage;
use std::sync::Arc;
use tracing::trace;

/// Encodes frames off the async executor
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    quality: u8,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl FrameEncoder {
    /// Create an encoder; quality is clamped to 1-100
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a frame as JPEG on the blocking thread pool
    pub async fn encode(&self, frame: Arc<AnnotatedFrame>) -> Result<Vec<u8>, EncodeError> {
        let quality = self.quality;

        // CPU-bound
        tokio::task::spawn_blocking(move || {
            let data = encode_jpeg(&frame.image, quality)?;
            trace!(frame = frame.sequence, size = data.len(), "Frame encoded");
            Ok(data)
        })
        .await
        .map_err(|e| EncodeError::Task(e.to_string()))?
    }
}

/// Encode an RGB image as JPEG
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);

    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| EncodeError::Jpeg(e.to_string()))?;

    Ok(buffer)
}
