// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use bactrack::constants::{
    self, NECK_LENGTH_SCALE_CM, PUSH_THRESHOLDS, QUERY_THRESHOLDS, RATING_HISTORY_LIMIT, timing,
};
use std::time::Duration;

#[test]
fn test_measurement_constants() {
    assert_eq!(NECK_LENGTH_SCALE_CM, 170.0);
    assert_eq!(RATING_HISTORY_LIMIT, 1000);
    assert_eq!(constants::POSE_LANDMARK_COUNT, 33);
}

#[test]
fn test_threshold_sets() {
    assert_eq!((QUERY_THRESHOLDS.good, QUERY_THRESHOLDS.moderate), (80, 60));
    assert_eq!((PUSH_THRESHOLDS.good, PUSH_THRESHOLDS.moderate), (95, 70));

    // Each set is ordered
    for thresholds in [QUERY_THRESHOLDS, PUSH_THRESHOLDS] {
        assert!(thresholds.good > thresholds.moderate);
        assert!(thresholds.good <= 100);
    }
}

#[test]
fn test_timing() {
    assert_eq!(timing::STREAM_INTERVAL, Duration::from_millis(100));
    assert_eq!(timing::PUSH_INTERVAL, Duration::from_secs(1));
    assert_eq!(timing::RATING_COOLDOWN, Duration::from_secs(30));
    assert!(timing::FRAME_WAIT_INTERVAL < timing::STREAM_INTERVAL);
}
