// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for frame capture
//!
//! The frame pipeline only sees a [`camera::FrameSource`]; whether the frames
//! come from a V4L2 webcam or from still images on disk is decided here.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Frame Pipeline                 │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │                FrameSource                   │
//! │  ┌─────────────┐    ┌──────────────────┐   │
//! │  │    V4L2     │    │   Image files    │   │
//! │  └─────────────┘    └──────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```

pub mod camera;
