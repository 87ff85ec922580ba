// SPDX-License-Identifier: GPL-3.0-only

//! Pose landmarks and the extractor abstraction
//!
//! The pose model itself lives outside this crate. It is reached through
//! [`LandmarkExtractor`], which turns one RGB frame into an ordered set of
//! normalized keypoints, or reports that nobody is in view.

pub mod geometry;
pub mod subprocess;

pub use subprocess::SubprocessExtractor;

use crate::constants::POSE_LANDMARK_COUNT;
use crate::errors::PoseError;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// A detected body landmark
///
/// `x` and `y` are normalized to the frame (0.0 = left/top, 1.0 = right/bottom).
/// `z` is a relative depth proxy without a fixed unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    /// Detection confidence (0-1)
    #[serde(default = "full_visibility")]
    pub visibility: f64,
}

fn full_visibility() -> f64 {
    1.0
}

impl Keypoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility: 1.0,
        }
    }

    /// Pixel position in a frame of the given size
    pub fn to_pixels(&self, width: u32, height: u32) -> (i32, i32) {
        (
            (self.x * width as f64) as i32,
            (self.y * height as f64) as i32,
        )
    }
}

/// Landmark indices of the 33-point body topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landmark {
    Nose = 0,
    LeftEye = 2,
    RightEye = 5,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
}

impl Landmark {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Ordered keypoints for one detected person
#[derive(Debug, Clone, PartialEq)]
pub struct PoseLandmarks {
    keypoints: Vec<Keypoint>,
}

impl PoseLandmarks {
    /// Wrap keypoints in model order
    ///
    /// Fails when fewer keypoints than the shoulders need are supplied.
    pub fn new(keypoints: Vec<Keypoint>) -> Result<Self, PoseError> {
        if keypoints.len() <= Landmark::RightShoulder.index() {
            return Err(PoseError::Protocol(format!(
                "expected {} landmarks, got {}",
                POSE_LANDMARK_COUNT,
                keypoints.len()
            )));
        }
        Ok(Self { keypoints })
    }

    pub fn get(&self, landmark: Landmark) -> Option<&Keypoint> {
        self.keypoints.get(landmark.index())
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keypoint> {
        self.keypoints.iter()
    }
}

/// Detects a pose in a frame
///
/// `Ok(None)` means the frame was processed and nobody was found; errors
/// mean the extractor itself is broken.
pub trait LandmarkExtractor: Send {
    fn extract(&mut self, frame: &RgbImage) -> Result<Option<PoseLandmarks>, PoseError>;

    /// Release model resources; further calls to `extract` fail
    fn close(&mut self) {}
}

/// Extractor used when no pose model is configured: never finds anyone
#[derive(Debug, Default)]
pub struct NullExtractor;

impl LandmarkExtractor for NullExtractor {
    fn extract(&mut self, _frame: &RgbImage) -> Result<Option<PoseLandmarks>, PoseError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_few_landmarks_rejected() {
        let keypoints = vec![Keypoint::default(); 5];
        assert!(PoseLandmarks::new(keypoints).is_err());
    }

    #[test]
    fn test_landmark_lookup() {
        let mut keypoints = vec![Keypoint::default(); POSE_LANDMARK_COUNT];
        keypoints[11] = Keypoint::new(0.3, 0.6, 0.0);
        let pose = PoseLandmarks::new(keypoints).unwrap();

        assert_eq!(pose.get(Landmark::LeftShoulder).unwrap().x, 0.3);
        assert_eq!(pose.len(), POSE_LANDMARK_COUNT);
    }

    #[test]
    fn test_to_pixels() {
        let kp = Keypoint::new(0.5, 0.25, 0.0);
        assert_eq!(kp.to_pixels(640, 480), (320, 120));
    }

    #[test]
    fn test_keypoint_defaults_when_deserialized() {
        let kp: Keypoint = serde_json::from_str(r#"{"x":0.1,"y":0.2}"#).unwrap();
        assert_eq!(kp.z, 0.0);
        assert_eq!(kp.visibility, 1.0);
    }
}
