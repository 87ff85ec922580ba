// SPDX-License-Identifier: GPL-3.0-only

//! Posture metric engine
//!
//! Turns the live neck-length measurement and a calibrated baseline into a
//! 0-100 rating, and keeps a bounded history of every rating computed.

pub mod engine;
pub mod history;
pub mod rating;

pub use engine::PostureEngine;
pub use history::{RatingHistory, RatingSample};
pub use rating::{RatingSnapshot, RatingStatus, is_usable_baseline, rating_for, round1};
