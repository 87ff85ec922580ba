// SPDX-License-Identifier: GPL-3.0-only

//! Bounded rating history

use serde::{Serialize, Serializer};
use std::collections::VecDeque;

/// One computed rating with its wall-clock time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSample {
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    pub rating: u8,
}

impl RatingSample {
    pub fn new(timestamp: f64, rating: u8) -> Self {
        Self { timestamp, rating }
    }

    /// Sample stamped with the current time
    pub fn now(rating: u8) -> Self {
        let timestamp = chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0;
        Self { timestamp, rating }
    }
}

/// Serialized as `[timestamp, rating]`
impl Serialize for RatingSample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.timestamp, self.rating).serialize(serializer)
    }
}

/// Insertion-ordered history that evicts its oldest samples past `limit`
#[derive(Debug, Clone)]
pub struct RatingHistory {
    samples: VecDeque<RatingSample>,
    limit: usize,
}

impl RatingHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(limit.min(4096)),
            limit,
        }
    }

    pub fn push(&mut self, sample: RatingSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.limit {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&RatingSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RatingSample> {
        self.samples.iter()
    }

    /// Copy of all samples, oldest first
    pub fn to_vec(&self) -> Vec<RatingSample> {
        self.samples.iter().copied().collect()
    }
}
