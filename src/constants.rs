// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Scale applied to the normalized nose-to-neck distance to approximate centimeters
pub const NECK_LENGTH_SCALE_CM: f64 = 170.0;

/// Maximum number of rating samples kept in memory
pub const RATING_HISTORY_LIMIT: usize = 1000;

/// Number of landmarks reported by a full-body pose model
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Default HTTP bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Default capture device node
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";

/// Requested capture width
pub const DEFAULT_FRAME_WIDTH: u32 = 1280;

/// Requested capture height
pub const DEFAULT_FRAME_HEIGHT: u32 = 720;

/// JPEG quality used for the video stream
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Timing of the live delivery layer
pub mod timing {
    use super::Duration;

    /// Delay between two parts of the multipart video stream
    pub const STREAM_INTERVAL: Duration = Duration::from_millis(100);

    /// Poll delay while no frame has been published yet
    pub const FRAME_WAIT_INTERVAL: Duration = Duration::from_millis(10);

    /// Cadence of the rating push channel
    pub const PUSH_INTERVAL: Duration = Duration::from_secs(1);

    /// Pause after answering a `rating` command on the command channel
    pub const RATING_COOLDOWN: Duration = Duration::from_secs(30);

    /// Number of camera buffers mapped for streaming capture
    pub const CAPTURE_BUFFER_COUNT: u32 = 4;
}

/// Status thresholds for a rating
///
/// A rating at or above `good` is "good", at or above `moderate` is
/// "moderate", anything lower is "poor".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingThresholds {
    pub good: u8,
    pub moderate: u8,
}

/// Thresholds used when answering a `rating` command on `/ws/`
pub const QUERY_THRESHOLDS: RatingThresholds = RatingThresholds {
    good: 80,
    moderate: 60,
};

/// Thresholds used by the `/ws/rating` push channel
///
/// Stricter than [`QUERY_THRESHOLDS`].
pub const PUSH_THRESHOLDS: RatingThresholds = RatingThresholds {
    good: 95,
    moderate: 70,
};

/// Overlay styling
pub mod overlay {
    use image::Rgb;

    pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
    pub const GREEN: Rgb<u8> = Rgb([22, 199, 154]);
    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    pub const NOSE_RADIUS: i32 = 8;
    pub const SHOULDER_RADIUS: i32 = 10;
    pub const NECK_BASE_RADIUS: i32 = 8;
    pub const RING_WIDTH: i32 = 2;
    pub const LINE_WIDTH: i32 = 3;

    /// Horizontal offset of the measurement label from the neck line midpoint
    pub const LABEL_OFFSET_X: i32 = 15;
    pub const MARKER_LABEL_SCALE: f32 = 14.0;
    pub const MEASUREMENT_LABEL_SCALE: f32 = 22.0;

    /// Fonts probed when no font is configured
    pub const FALLBACK_FONTS: [&str; 4] = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    ];
}
