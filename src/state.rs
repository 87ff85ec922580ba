// SPDX-License-Identifier: GPL-3.0-only

//! State shared between the frame pipeline and the network handlers
//!
//! The pipeline thread is the only writer of the frame slot and of the
//! current measurement. Connection handlers read both and mutate the
//! posture engine (baseline and history) under its own lock, so concurrent
//! rating requests append to the history one at a time.

use crate::constants::RatingThresholds;
use crate::errors::PostureError;
use crate::posture::{PostureEngine, RatingSample, RatingSnapshot};
use image::RgbImage;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// The most recent processed frame
#[derive(Debug)]
pub struct AnnotatedFrame {
    pub image: RgbImage,
    /// Source frame counter
    pub sequence: u64,
    /// Neck length measured on this frame, if a pose was found
    pub measurement: Option<f64>,
    pub captured_at: Instant,
}

/// Explicitly owned state passed to every execution context
#[derive(Debug)]
pub struct MonitorState {
    frame: Mutex<Option<Arc<AnnotatedFrame>>>,
    current: Mutex<Option<f64>>,
    engine: Mutex<PostureEngine>,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new(PostureEngine::default())
    }
}

/// A panicking holder cannot leave these values half-written, so poison is ignored
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MonitorState {
    pub fn new(engine: PostureEngine) -> Self {
        Self {
            frame: Mutex::new(None),
            current: Mutex::new(None),
            engine: Mutex::new(engine),
        }
    }

    pub fn with_history_limit(limit: usize) -> Self {
        Self::new(PostureEngine::new(limit))
    }

    /// Replace the published frame and the current measurement
    ///
    /// Unread frames are overwritten; readers always get the newest one.
    pub fn publish(&self, frame: AnnotatedFrame) {
        let measurement = frame.measurement;
        *lock(&self.frame) = Some(Arc::new(frame));
        self.set_current_measurement(measurement);
    }

    /// Latest published frame, if any
    pub fn latest_frame(&self) -> Option<Arc<AnnotatedFrame>> {
        lock(&self.frame).clone()
    }

    pub fn current_measurement(&self) -> Option<f64> {
        *lock(&self.current)
    }

    pub fn set_current_measurement(&self, measurement: Option<f64>) {
        *lock(&self.current) = measurement;
    }

    pub fn baseline(&self) -> Option<f64> {
        lock(&self.engine).baseline()
    }

    /// Capture the current measurement as the baseline
    pub fn calibrate(&self) -> Result<f64, PostureError> {
        let current = self.current_measurement();
        lock(&self.engine).calibrate(current)
    }

    pub fn reset_baseline(&self) {
        lock(&self.engine).reset();
    }

    /// Rate the current measurement, recording it in the history
    pub fn rating_snapshot(&self, thresholds: RatingThresholds) -> RatingSnapshot {
        let current = self.current_measurement();
        lock(&self.engine).snapshot(current, thresholds)
    }

    /// Copy of the rating history, oldest first
    pub fn history(&self) -> Vec<RatingSample> {
        lock(&self.engine).history().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::QUERY_THRESHOLDS;
    use crate::posture::RatingStatus;

    fn frame(sequence: u64, measurement: Option<f64>) -> AnnotatedFrame {
        AnnotatedFrame {
            image: RgbImage::new(2, 2),
            sequence,
            measurement,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_latest_write_wins() {
        let state = MonitorState::default();
        assert!(state.latest_frame().is_none());

        state.publish(frame(1, Some(40.0)));
        state.publish(frame(2, None));

        let latest = state.latest_frame().unwrap();
        assert_eq!(latest.sequence, 2);
        assert_eq!(state.current_measurement(), None);
    }

    #[test]
    fn test_calibrate_uses_current() {
        let state = MonitorState::default();
        assert_eq!(state.calibrate(), Err(PostureError::NoPoseDetected));
        assert_eq!(state.baseline(), None);

        state.set_current_measurement(Some(51.2));
        assert_eq!(state.calibrate(), Ok(51.2));
        assert_eq!(state.baseline(), Some(51.2));
    }

    #[test]
    fn test_concurrent_ratings_respect_bound() {
        let state = Arc::new(MonitorState::with_history_limit(50));
        state.set_current_measurement(Some(50.0));
        state.calibrate().unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    for _ in 0..40 {
                        let snapshot = state.rating_snapshot(QUERY_THRESHOLDS);
                        assert_eq!(snapshot.status, RatingStatus::Good);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(state.history().len(), 50);
    }
}
