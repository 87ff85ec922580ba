// SPDX-License-Identifier: GPL-3.0-only

//! Frame pipeline
//!
//! A dedicated thread pulls frames from the [`FrameSource`], mirrors them,
//! runs the [`LandmarkExtractor`], measures the neck, draws the overlay and
//! publishes the result to [`MonitorState`].
//!
//! ```text
//! FrameSource ─► mirror ─► LandmarkExtractor ─► measure_neck ─► Overlay ─► MonitorState
//! ```
//!
//! Any failure to read a frame or to run the extractor ends the loop for
//! good; the server keeps running with the last published frame.

pub mod encoding;
pub mod overlay;

pub use encoding::FrameEncoder;
pub use overlay::Overlay;

use crate::backends::camera::{self, CameraFrame, CaptureLoopController, FrameSource, LoopAction};
use crate::config::Config;
use crate::constants::NECK_LENGTH_SCALE_CM;
use crate::errors::{AppError, PoseError};
use crate::pose::geometry::{distance, midpoint};
use crate::pose::{
    Keypoint, Landmark, LandmarkExtractor, NullExtractor, PoseLandmarks, SubprocessExtractor,
};
use crate::state::{AnnotatedFrame, MonitorState};
use image::imageops;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Neck geometry derived from one pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeckMeasurement {
    pub nose: Keypoint,
    pub left_shoulder: Keypoint,
    pub right_shoulder: Keypoint,
    /// Midpoint of the shoulders
    pub neck_base: Keypoint,
    /// Nose to neck base, scaled to approximate centimeters
    pub length_cm: f64,
}

/// Measure the nose to neck-base distance of a pose
pub fn measure_neck(pose: &PoseLandmarks) -> Option<NeckMeasurement> {
    let nose = *pose.get(Landmark::Nose)?;
    let left_shoulder = *pose.get(Landmark::LeftShoulder)?;
    let right_shoulder = *pose.get(Landmark::RightShoulder)?;

    let neck_base = midpoint(&left_shoulder, &right_shoulder);
    let length_cm = distance(&nose, &neck_base) * NECK_LENGTH_SCALE_CM;

    Some(NeckMeasurement {
        nose,
        left_shoulder,
        right_shoulder,
        neck_base,
        length_cm,
    })
}

/// Per-frame processing: mirror, detect, measure, annotate
pub struct FrameProcessor {
    extractor: Box<dyn LandmarkExtractor>,
    overlay: Overlay,
    mirror: bool,
}

impl FrameProcessor {
    pub fn new(extractor: Box<dyn LandmarkExtractor>, overlay: Overlay, mirror: bool) -> Self {
        Self {
            extractor,
            overlay,
            mirror,
        }
    }

    /// Process one frame
    ///
    /// Frames without a pose come back unannotated with no measurement.
    pub fn process(&mut self, frame: CameraFrame) -> Result<AnnotatedFrame, PoseError> {
        let CameraFrame {
            mut image,
            sequence,
            captured_at,
        } = frame;

        if self.mirror {
            imageops::flip_horizontal_in_place(&mut image);
        }

        let measurement = match self.extractor.extract(&image)? {
            Some(pose) => measure_neck(&pose),
            None => None,
        };

        if let Some(neck) = &measurement {
            self.overlay.draw(&mut image, neck);
        }

        Ok(AnnotatedFrame {
            image,
            sequence,
            measurement: measurement.map(|m| m.length_cm),
            captured_at,
        })
    }
}

impl Drop for FrameProcessor {
    fn drop(&mut self) {
        self.extractor.close();
    }
}

/// Everything the capture thread owns while running
pub struct PipelineParts {
    pub source: Box<dyn FrameSource>,
    pub processor: FrameProcessor,
}

impl PipelineParts {
    /// Run one iteration and publish its result
    fn step(&mut self, state: &MonitorState) -> LoopAction {
        let frame = match self.source.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Camera read failed, stopping frame pipeline");
                return LoopAction::Stop;
            }
        };

        let sequence = frame.sequence;
        let annotated = match self.processor.process(frame) {
            Ok(annotated) => annotated,
            Err(e) => {
                warn!(error = %e, "Landmark extractor failed, stopping frame pipeline");
                return LoopAction::Stop;
            }
        };

        if sequence % 300 == 0 {
            debug!(
                frame = sequence,
                measurement = ?annotated.measurement,
                latency_ms = annotated.captured_at.elapsed().as_millis() as u64,
                "Frame processed"
            );
        }

        state.publish(annotated);
        LoopAction::Continue
    }
}

/// Start the configured pose extractor, or a no-op one when none is set
pub fn open_extractor(command: &[String]) -> Result<Box<dyn LandmarkExtractor>, PoseError> {
    if command.is_empty() {
        warn!("No extractor_command configured, pose detection disabled");
        return Ok(Box::new(NullExtractor));
    }
    Ok(Box::new(SubprocessExtractor::spawn(command)?))
}

/// Handle to the running frame pipeline thread
pub struct FramePipeline {
    controller: CaptureLoopController,
}

impl FramePipeline {
    /// Open the configured camera and extractor on a new thread and start processing
    pub fn start(config: Config, state: Arc<MonitorState>) -> Self {
        Self::start_with(state, move || -> Result<PipelineParts, AppError> {
            let source = camera::open_source(&config)?;
            let extractor = open_extractor(&config.extractor_command)?;
            let overlay = Overlay::load(config.font_path.as_deref());
            Ok(PipelineParts {
                source,
                processor: FrameProcessor::new(extractor, overlay, config.mirror_preview),
            })
        })
    }

    /// Start with caller-provided parts
    ///
    /// `init` runs on the pipeline thread; if it fails the pipeline never
    /// produces a frame.
    pub fn start_with<I, E>(state: Arc<MonitorState>, init: I) -> Self
    where
        I: FnOnce() -> Result<PipelineParts, E> + Send + 'static,
        E: Display,
    {
        let controller = CaptureLoopController::start_with_init("frame-pipeline", init, move |parts| {
            parts.step(&state)
        });
        Self { controller }
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    /// Stop the loop and release the camera and extractor
    pub fn stop(mut self) {
        info!("Stopping frame pipeline");
        self.controller.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::{BackendResult, FileSource};
    use crate::errors::CameraError;
    use crate::constants::POSE_LANDMARK_COUNT;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn pose(nose: (f64, f64), left: (f64, f64), right: (f64, f64)) -> PoseLandmarks {
        let mut keypoints = vec![Keypoint::default(); POSE_LANDMARK_COUNT];
        keypoints[Landmark::Nose.index()] = Keypoint::new(nose.0, nose.1, 0.0);
        keypoints[Landmark::LeftShoulder.index()] = Keypoint::new(left.0, left.1, 0.0);
        keypoints[Landmark::RightShoulder.index()] = Keypoint::new(right.0, right.1, 0.0);
        PoseLandmarks::new(keypoints).unwrap()
    }

    struct FixedExtractor(Option<PoseLandmarks>);

    impl LandmarkExtractor for FixedExtractor {
        fn extract(&mut self, _frame: &RgbImage) -> Result<Option<PoseLandmarks>, PoseError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenExtractor;

    impl LandmarkExtractor for BrokenExtractor {
        fn extract(&mut self, _frame: &RgbImage) -> Result<Option<PoseLandmarks>, PoseError> {
            Err(PoseError::Closed)
        }
    }

    struct UnpluggedSource;

    impl FrameSource for UnpluggedSource {
        fn read_frame(&mut self) -> BackendResult<CameraFrame> {
            Err(CameraError::Disconnected)
        }

        fn description(&self) -> String {
            "unplugged".into()
        }
    }

    fn camera_frame() -> CameraFrame {
        let mut image = RgbImage::from_pixel(64, 48, Rgb([10, 10, 10]));
        image.put_pixel(0, 0, Rgb([200, 0, 0]));
        CameraFrame::new(image, 7)
    }

    #[test]
    fn test_measure_neck() {
        // Shoulders at y=0.6, nose 0.3 above their midpoint
        let neck = measure_neck(&pose((0.5, 0.3), (0.4, 0.6), (0.6, 0.6))).unwrap();
        assert_eq!(neck.neck_base.x, 0.5);
        assert!((neck.length_cm - 0.3 * 170.0).abs() < 1e-9);
    }

    #[test]
    fn test_process_without_pose_is_unannotated() {
        let mut processor =
            FrameProcessor::new(Box::new(NullExtractor), Overlay::without_labels(), false);
        let frame = camera_frame();
        let original = frame.image.clone();

        let annotated = processor.process(frame).unwrap();
        assert_eq!(annotated.measurement, None);
        assert_eq!(annotated.sequence, 7);
        assert_eq!(annotated.image, original);
    }

    #[test]
    fn test_process_mirrors() {
        let mut processor =
            FrameProcessor::new(Box::new(NullExtractor), Overlay::without_labels(), true);
        let annotated = processor.process(camera_frame()).unwrap();
        assert_eq!(annotated.image.get_pixel(63, 0), &Rgb([200, 0, 0]));
    }

    #[test]
    fn test_process_with_pose_measures_and_draws() {
        let extractor = FixedExtractor(Some(pose((0.5, 0.3), (0.4, 0.6), (0.6, 0.6))));
        let mut processor =
            FrameProcessor::new(Box::new(extractor), Overlay::without_labels(), false);
        let frame = camera_frame();
        let original = frame.image.clone();

        let annotated = processor.process(frame).unwrap();
        assert!((annotated.measurement.unwrap() - 51.0).abs() < 1e-9);
        assert_ne!(annotated.image, original);
    }

    #[test]
    fn test_pipeline_publishes_frames() {
        let state = Arc::new(MonitorState::default());
        let extractor = FixedExtractor(Some(pose((0.5, 0.3), (0.4, 0.6), (0.6, 0.6))));

        let pipeline = FramePipeline::start_with(Arc::clone(&state), move || {
            let source = FileSource::from_images(
                PathBuf::from("mem"),
                vec![RgbImage::new(32, 24)],
            )
            .with_interval(Duration::from_millis(1));
            Ok::<_, String>(PipelineParts {
                source: Box::new(source),
                processor: FrameProcessor::new(
                    Box::new(extractor),
                    Overlay::without_labels(),
                    true,
                ),
            })
        });

        let deadline = Instant::now() + Duration::from_secs(5);
        while state.latest_frame().is_none() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }

        assert!(state.latest_frame().is_some());
        assert!((state.current_measurement().unwrap() - 51.0).abs() < 1e-9);
        pipeline.stop();
    }

    #[test]
    fn test_pipeline_stops_on_extractor_failure() {
        let state = Arc::new(MonitorState::default());
        let mut pipeline = FramePipeline::start_with(Arc::clone(&state), || {
            let source = FileSource::from_images(PathBuf::from("mem"), vec![RgbImage::new(4, 4)])
                .with_interval(Duration::ZERO);
            Ok::<_, String>(PipelineParts {
                source: Box::new(source),
                processor: FrameProcessor::new(
                    Box::new(BrokenExtractor),
                    Overlay::without_labels(),
                    false,
                ),
            })
        });

        pipeline.controller.join();
        assert!(!pipeline.is_running());
        assert!(state.latest_frame().is_none());
    }

    #[test]
    fn test_pipeline_stops_on_read_failure() {
        let state = Arc::new(MonitorState::default());
        let extractor = FixedExtractor(Some(pose((0.5, 0.3), (0.4, 0.6), (0.6, 0.6))));
        let mut pipeline = FramePipeline::start_with(Arc::clone(&state), move || {
            Ok::<_, String>(PipelineParts {
                source: Box::new(UnpluggedSource),
                processor: FrameProcessor::new(
                    Box::new(extractor),
                    Overlay::without_labels(),
                    false,
                ),
            })
        });

        pipeline.controller.join();
        assert!(!pipeline.is_running());
        assert!(state.latest_frame().is_none());
        assert_eq!(state.current_measurement(), None);
    }

    #[test]
    fn test_pipeline_init_failure_produces_nothing() {
        let state = Arc::new(MonitorState::default());
        let mut pipeline = FramePipeline::start_with(Arc::clone(&state), || {
            Err::<PipelineParts, _>("camera unavailable")
        });

        pipeline.controller.join();
        assert!(state.latest_frame().is_none());
    }
}
