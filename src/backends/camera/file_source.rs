// SPDX-License-Identifier: GPL-3.0-only

//! Still image frame source
//!
//! Replays a single image or every image in a directory as if it came from
//! a webcam, paced to a steady frame rate. Useful without camera hardware.

use super::types::*;
use crate::errors::CameraError;
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Frame interval when replaying images (~30 fps)
const REPLAY_INTERVAL: Duration = Duration::from_millis(33);

/// File extensions accepted as images
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

pub fn is_image_extension(extension: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&extension.to_lowercase().as_str())
}

/// Frame source looping over decoded still images
pub struct FileSource {
    origin: PathBuf,
    frames: Vec<RgbImage>,
    index: usize,
    sequence: u64,
    interval: Duration,
    last_frame: Option<Instant>,
}

impl FileSource {
    /// Load an image file, or all images in a directory sorted by name
    pub fn open(path: &Path) -> BackendResult<Self> {
        let paths = if path.is_dir() {
            list_images(path)?
        } else {
            vec![path.to_path_buf()]
        };

        let mut frames = Vec::with_capacity(paths.len());
        for image_path in &paths {
            match image::open(image_path) {
                Ok(img) => frames.push(img.to_rgb8()),
                Err(e) => {
                    warn!(path = %image_path.display(), error = %e, "Skipping unreadable image")
                }
            }
        }

        if frames.is_empty() {
            return Err(CameraError::OpenFailed(format!(
                "no readable images at {}",
                path.display()
            )));
        }

        info!(path = %path.display(), count = frames.len(), "Loaded image source");
        Ok(Self::from_images(path.to_path_buf(), frames))
    }

    /// Build a source from already decoded images
    pub fn from_images(origin: PathBuf, frames: Vec<RgbImage>) -> Self {
        Self {
            origin,
            frames,
            index: 0,
            sequence: 0,
            interval: REPLAY_INTERVAL,
            last_frame: None,
        }
    }

    /// Override the replay pacing
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl super::FrameSource for FileSource {
    fn read_frame(&mut self) -> BackendResult<CameraFrame> {
        if self.frames.is_empty() {
            return Err(CameraError::Disconnected);
        }

        if let Some(last) = self.last_frame {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last_frame = Some(Instant::now());

        let image = self.frames[self.index].clone();
        self.index = (self.index + 1) % self.frames.len();

        let frame = CameraFrame::new(image, self.sequence);
        self.sequence += 1;
        Ok(frame)
    }

    fn description(&self) -> String {
        format!("{} ({} images)", self.origin.display(), self.frames.len())
    }
}

fn list_images(dir: &Path) -> BackendResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| CameraError::OpenFailed(format!("{}: {}", dir.display(), e)))?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(is_image_extension)
        })
        .collect();

    paths.sort();
    debug!(dir = %dir.display(), count = paths.len(), "Found images");
    Ok(paths)
}
