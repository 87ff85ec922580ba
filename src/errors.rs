// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the posture monitor

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug)]
pub enum AppError {
    /// Camera-related errors
    Camera(CameraError),
    /// Landmark extractor errors
    Pose(PoseError),
    /// Frame encoding errors
    Encode(EncodeError),
    /// Configuration errors
    Config(String),
    /// Network / server errors
    Server(String),
    /// I/O errors
    Io(std::io::Error),
}

/// Camera-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The capture device could not be opened
    OpenFailed(String),
    /// The device delivered or accepted an unusable format
    InvalidFormat(String),
    /// Reading a frame failed
    CaptureFailed(String),
    /// Source has no more frames
    Disconnected,
}

/// Landmark extractor errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoseError {
    /// The external helper could not be started
    SpawnFailed(String),
    /// The helper answered with something that is not a landmark record
    Protocol(String),
    /// Pipe I/O with the helper failed
    Io(String),
    /// The helper is gone
    Closed,
}

/// Frame encoding errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// JPEG encoder failed
    Jpeg(String),
    /// The blocking encode task failed to complete
    Task(String),
}

/// Posture engine errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostureError {
    /// Calibration requested while no pose is visible
    NoPoseDetected,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Pose(e) => write!(f, "Pose extractor error: {}", e),
            AppError::Encode(e) => write!(f, "Encoding error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Server(msg) => write!(f, "Server error: {}", msg),
            AppError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::OpenFailed(msg) => write!(f, "Failed to open camera: {}", msg),
            CameraError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            CameraError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            CameraError::Disconnected => write!(f, "Camera disconnected"),
        }
    }
}

impl fmt::Display for PoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoseError::SpawnFailed(msg) => write!(f, "Failed to start extractor: {}", msg),
            PoseError::Protocol(msg) => write!(f, "Invalid extractor response: {}", msg),
            PoseError::Io(msg) => write!(f, "Extractor pipe error: {}", msg),
            PoseError::Closed => write!(f, "Extractor closed"),
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::Jpeg(msg) => write!(f, "JPEG encoding failed: {}", msg),
            EncodeError::Task(msg) => write!(f, "Encoding task error: {}", msg),
        }
    }
}

impl fmt::Display for PostureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostureError::NoPoseDetected => write!(f, "No pose detected"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Camera(e) => Some(e),
            AppError::Pose(e) => Some(e),
            AppError::Encode(e) => Some(e),
            AppError::Io(e) => Some(e),
            AppError::Config(_) | AppError::Server(_) => None,
        }
    }
}
impl std::error::Error for CameraError {}
impl std::error::Error for PoseError {}
impl std::error::Error for EncodeError {}
impl std::error::Error for PostureError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<PoseError> for AppError {
    fn from(err: PoseError) -> Self {
        AppError::Pose(err)
    }
}

impl From<EncodeError> for AppError {
    fn from(err: EncodeError) -> Self {
        AppError::Encode(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for PoseError {
    fn from(err: std::io::Error) -> Self {
        PoseError::Io(err.to_string())
    }
}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        CameraError::CaptureFailed(err.to_string())
    }
}
