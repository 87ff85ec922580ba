// SPDX-License-Identifier: GPL-3.0-only

//! Rating formula and the snapshot sent to clients

use crate::constants::RatingThresholds;
use serde::Serialize;

/// Rating for a measurement against a baseline
///
/// 100 at the baseline, falling linearly to 0 once the absolute deviation
/// reaches half the baseline. The result is truncated toward zero.
/// `baseline` must be positive.
pub fn rating_for(current: f64, baseline: f64) -> u8 {
    let difference = (current - baseline).abs();
    let raw = (1.0 - (difference * 2.0 / baseline)) * 100.0;
    // NaN saturates to 0
    raw.clamp(0.0, 100.0) as u8
}

/// A baseline the formula can divide by
pub fn is_usable_baseline(baseline: f64) -> bool {
    baseline.is_finite() && baseline > 0.0
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Label attached to a rating snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingStatus {
    Good,
    Moderate,
    Poor,
    /// No baseline has been captured yet
    NotCalibrated,
    /// Baseline exists but nobody is in view
    NoPose,
}

impl RatingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingStatus::Good => "good",
            RatingStatus::Moderate => "moderate",
            RatingStatus::Poor => "poor",
            RatingStatus::NotCalibrated => "not_calibrated",
            RatingStatus::NoPose => "no_pose",
        }
    }
}

impl std::fmt::Display for RatingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RatingThresholds {
    /// Classify a computed rating
    pub fn classify(&self, rating: u8) -> RatingStatus {
        if rating >= self.good {
            RatingStatus::Good
        } else if rating >= self.moderate {
            RatingStatus::Moderate
        } else {
            RatingStatus::Poor
        }
    }
}

/// Rating payload shared by the command and push channels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSnapshot {
    pub rating: u8,
    pub current_length: Option<f64>,
    pub baseline_length: Option<f64>,
    /// Signed `current - baseline`, 0 when either is missing
    pub difference: f64,
    pub status: RatingStatus,
}
