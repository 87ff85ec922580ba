// SPDX-License-Identifier: GPL-3.0-only

//! Pose extraction through an external helper process
//!
//! The helper is started once and kept alive. Per frame it receives, on
//! stdin:
//!
//! ```text
//! width:  u32 big-endian
//! height: u32 big-endian
//! pixels: width * height * 3 bytes, packed RGB, row-major
//! ```
//!
//! and answers with exactly one JSON line on stdout:
//!
//! ```text
//! {"landmarks": [{"x": 0.51, "y": 0.32, "z": -0.4, "visibility": 0.99}, ...]}
//! {"landmarks": null}
//! ```

use super::{Keypoint, LandmarkExtractor, PoseLandmarks};
use crate::errors::PoseError;
use image::RgbImage;
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct ExtractorResponse {
    landmarks: Option<Vec<Keypoint>>,
}

/// Landmark extractor backed by a long-running helper process
pub struct SubprocessExtractor {
    program: String,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
    line: String,
}

impl SubprocessExtractor {
    /// Spawn the helper described by `command` (program followed by arguments)
    pub fn spawn(command: &[String]) -> Result<Self, PoseError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| PoseError::SpawnFailed("empty extractor command".to_string()))?;

        info!(program = %program, ?args, "Starting pose extractor");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| PoseError::SpawnFailed(format!("{}: {}", program, e)))?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().map(BufReader::new);

        Ok(Self {
            program: program.clone(),
            child: Some(child),
            stdin,
            stdout,
            line: String::new(),
        })
    }
}

impl LandmarkExtractor for SubprocessExtractor {
    fn extract(&mut self, frame: &RgbImage) -> Result<Option<PoseLandmarks>, PoseError> {
        let stdin = self.stdin.as_mut().ok_or(PoseError::Closed)?;
        write_frame(stdin, frame)?;

        let stdout = self.stdout.as_mut().ok_or(PoseError::Closed)?;
        self.line.clear();
        if stdout.read_line(&mut self.line)? == 0 {
            return Err(PoseError::Closed);
        }

        parse_response(&self.line)
    }

    fn close(&mut self) {
        // Closing stdin lets a well-behaved helper exit on its own
        self.stdin.take();
        self.stdout.take();

        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                debug!(error = %e, "Extractor already exited");
            }
            match child.wait() {
                Ok(status) => info!(program = %self.program, %status, "Pose extractor closed"),
                Err(e) => warn!(program = %self.program, error = %e, "Failed to reap extractor"),
            }
        }
    }
}

impl Drop for SubprocessExtractor {
    fn drop(&mut self) {
        self.close();
    }
}

/// Write one frame in the helper's framing
pub fn write_frame<W: Write>(writer: &mut W, frame: &RgbImage) -> Result<(), PoseError> {
    writer.write_all(&frame.width().to_be_bytes())?;
    writer.write_all(&frame.height().to_be_bytes())?;
    writer.write_all(frame.as_raw())?;
    writer.flush()?;
    Ok(())
}

/// Parse one response line from the helper
pub fn parse_response(line: &str) -> Result<Option<PoseLandmarks>, PoseError> {
    let response: ExtractorResponse = serde_json::from_str(line.trim())
        .map_err(|e| PoseError::Protocol(format!("{}: {:?}", e, line.trim())))?;

    match response.landmarks {
        Some(keypoints) if !keypoints.is_empty() => PoseLandmarks::new(keypoints).map(Some),
        _ => Ok(None),
    }
}
