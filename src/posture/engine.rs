// SPDX-License-Identifier: GPL-3.0-only

//! Baseline calibration and rating bookkeeping

use super::history::{RatingHistory, RatingSample};
use super::rating::{RatingSnapshot, RatingStatus, is_usable_baseline, rating_for, round1};
use crate::constants::{RATING_HISTORY_LIMIT, RatingThresholds};
use crate::errors::PostureError;
use tracing::{info, trace};

/// Baseline plus the history of every rating computed against it
#[derive(Debug, Clone)]
pub struct PostureEngine {
    baseline: Option<f64>,
    history: RatingHistory,
}

impl Default for PostureEngine {
    fn default() -> Self {
        Self::new(RATING_HISTORY_LIMIT)
    }
}

impl PostureEngine {
    pub fn new(history_limit: usize) -> Self {
        Self {
            baseline: None,
            history: RatingHistory::new(history_limit),
        }
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    pub fn history(&self) -> &RatingHistory {
        &self.history
    }

    /// Rate `current` against `baseline`
    ///
    /// Returns 0 without touching the history when either input is missing.
    /// Otherwise the rating is appended to the history.
    pub fn compute_rating(&mut self, current: Option<f64>, baseline: Option<f64>) -> u8 {
        let (Some(current), Some(baseline)) = (current, baseline) else {
            return 0;
        };
        if !is_usable_baseline(baseline) {
            return 0;
        }

        let rating = rating_for(current, baseline);
        self.history.push(RatingSample::now(rating));
        trace!(saved = self.history.len(), rating, "Rating recorded");
        rating
    }

    /// Capture `current` as the new baseline
    ///
    /// Leaves the previous baseline untouched when nobody is in view.
    pub fn calibrate(&mut self, current: Option<f64>) -> Result<f64, PostureError> {
        match current {
            Some(measurement) if is_usable_baseline(measurement) => {
                self.baseline = Some(measurement);
                info!(baseline = format!("{:.1}", measurement), "Baseline calibrated");
                Ok(measurement)
            }
            _ => Err(PostureError::NoPoseDetected),
        }
    }

    /// Forget the baseline
    pub fn reset(&mut self) {
        self.baseline = None;
        info!("Baseline reset");
    }

    /// Rate the current measurement and build the client payload
    pub fn snapshot(&mut self, current: Option<f64>, thresholds: RatingThresholds) -> RatingSnapshot {
        match (current, self.baseline) {
            (Some(current), Some(baseline)) => {
                let rating = self.compute_rating(Some(current), Some(baseline));
                RatingSnapshot {
                    rating,
                    current_length: Some(round1(current)),
                    baseline_length: Some(round1(baseline)),
                    difference: round1(current - baseline),
                    status: thresholds.classify(rating),
                }
            }
            (current, baseline) => RatingSnapshot {
                rating: 0,
                current_length: current.map(round1),
                baseline_length: baseline.map(round1),
                difference: 0.0,
                status: if baseline.is_none() {
                    RatingStatus::NotCalibrated
                } else {
                    RatingStatus::NoPose
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PUSH_THRESHOLDS, QUERY_THRESHOLDS};

    #[test]
    fn test_missing_inputs_rate_zero_without_history() {
        let mut engine = PostureEngine::default();
        assert_eq!(engine.compute_rating(None, Some(100.0)), 0);
        assert_eq!(engine.compute_rating(Some(100.0), None), 0);
        assert_eq!(engine.compute_rating(None, None), 0);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_rating_appends_history() {
        let mut engine = PostureEngine::default();
        assert_eq!(engine.compute_rating(Some(100.0), Some(100.0)), 100);
        assert_eq!(engine.compute_rating(Some(150.0), Some(100.0)), 0);
        assert_eq!(engine.history().len(), 2);
        assert_eq!(engine.history().latest().unwrap().rating, 0);
    }

    #[test]
    fn test_zero_baseline_is_not_rated() {
        let mut engine = PostureEngine::default();
        assert_eq!(engine.compute_rating(Some(10.0), Some(0.0)), 0);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_calibrate_without_pose_keeps_baseline() {
        let mut engine = PostureEngine::default();
        engine.calibrate(Some(40.0)).unwrap();

        assert_eq!(engine.calibrate(None), Err(PostureError::NoPoseDetected));
        assert_eq!(engine.baseline(), Some(40.0));
    }

    #[test]
    fn test_reset_clears() {
        let mut engine = PostureEngine::default();
        engine.reset();
        assert_eq!(engine.baseline(), None);

        engine.calibrate(Some(33.3)).unwrap();
        engine.reset();
        assert_eq!(engine.baseline(), None);
    }

    #[test]
    fn test_snapshot_not_calibrated() {
        let mut engine = PostureEngine::default();
        let snapshot = engine.snapshot(Some(48.26), QUERY_THRESHOLDS);

        assert_eq!(snapshot.rating, 0);
        assert_eq!(snapshot.current_length, Some(48.3));
        assert_eq!(snapshot.baseline_length, None);
        assert_eq!(snapshot.difference, 0.0);
        assert_eq!(snapshot.status, RatingStatus::NotCalibrated);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_snapshot_no_pose() {
        let mut engine = PostureEngine::default();
        engine.calibrate(Some(50.0)).unwrap();
        let snapshot = engine.snapshot(None, PUSH_THRESHOLDS);

        assert_eq!(snapshot.status, RatingStatus::NoPose);
        assert_eq!(snapshot.baseline_length, Some(50.0));
        assert_eq!(snapshot.current_length, None);
    }

    #[test]
    fn test_snapshot_thresholds_diverge() {
        let mut engine = PostureEngine::default();
        engine.calibrate(Some(50.0)).unwrap();

        let query = engine.snapshot(Some(52.0), QUERY_THRESHOLDS);
        let push = engine.snapshot(Some(52.0), PUSH_THRESHOLDS);

        assert_eq!(query.rating, 92);
        assert_eq!(push.rating, 92);
        assert_eq!(query.difference, 2.0);
        assert_eq!(query.status, RatingStatus::Good);
        assert_eq!(push.status, RatingStatus::Moderate);
        assert_eq!(engine.history().len(), 2);
    }
}
