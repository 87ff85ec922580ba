// SPDX-License-Identifier: GPL-3.0-only

//! Posture overlay drawn onto processed frames

use super::NeckMeasurement;
use crate::constants::overlay::*;
use crate::pose::Keypoint;
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut, draw_text_mut,
};
use std::path::Path;
use tracing::{debug, warn};

/// Draws landmark markers, connecting lines and the neck length label
///
/// Without a font, markers and lines are still drawn and labels are skipped.
pub struct Overlay {
    font: Option<FontVec>,
}

impl Overlay {
    /// Load the configured font, falling back to common system fonts
    pub fn load(font_path: Option<&Path>) -> Self {
        if let Some(path) = font_path {
            match read_font(path) {
                Some(font) => return Self { font: Some(font) },
                None => warn!(path = %path.display(), "Configured overlay font unusable"),
            }
        }

        let font = FALLBACK_FONTS
            .iter()
            .map(Path::new)
            .filter(|path| path.exists())
            .find_map(read_font);

        if font.is_none() {
            warn!("No overlay font found, labels disabled");
        }
        Self { font }
    }

    pub fn without_labels() -> Self {
        Self { font: None }
    }

    pub fn has_labels(&self) -> bool {
        self.font.is_some()
    }

    pub fn draw(&self, image: &mut RgbImage, neck: &NeckMeasurement) {
        let (width, height) = image.dimensions();
        let px = |point: &Keypoint| {
            let (x, y) = point.to_pixels(width, height);
            (clamp_to_margin(x, width), clamp_to_margin(y, height))
        };

        let nose = px(&neck.nose);
        let left = px(&neck.left_shoulder);
        let right = px(&neck.right_shoulder);
        let base = px(&neck.neck_base);

        self.marker(image, nose, NOSE_RADIUS, RED, Some("Nose"));
        self.marker(image, left, SHOULDER_RADIUS, GREEN, Some("L Shoulder"));
        self.marker(image, right, SHOULDER_RADIUS, GREEN, Some("R Shoulder"));

        thick_line(image, nose, base, LINE_WIDTH, RED);
        self.marker(image, base, NECK_BASE_RADIUS, RED, None);
        thick_line(image, left, right, LINE_WIDTH, GREEN);

        let label = format!("{:.1} cm", neck.length_cm);
        let mid = ((nose.0 + base.0) / 2, (nose.1 + base.1) / 2);
        self.outlined_text(
            image,
            (mid.0 + LABEL_OFFSET_X, mid.1),
            MEASUREMENT_LABEL_SCALE,
            &label,
        );
    }

    /// Filled dot with a white ring and an optional label to its right
    fn marker(
        &self,
        image: &mut RgbImage,
        center: (i32, i32),
        radius: i32,
        color: Rgb<u8>,
        label: Option<&str>,
    ) {
        draw_filled_circle_mut(image, center, radius, color);
        for r in radius..radius + RING_WIDTH {
            draw_hollow_circle_mut(image, center, r, WHITE);
        }

        if let Some(text) = label {
            self.outlined_text(
                image,
                (center.0 + radius + 5, center.1 - radius),
                MARKER_LABEL_SCALE,
                text,
            );
        }
    }

    /// White text over a thicker black outline
    fn outlined_text(&self, image: &mut RgbImage, origin: (i32, i32), scale: f32, text: &str) {
        let Some(font) = &self.font else {
            return;
        };
        let scale = PxScale::from(scale);
        let (x, y) = origin;

        for dx in -2..=2 {
            for dy in -2..=2 {
                if dx != 0 || dy != 0 {
                    draw_text_mut(image, BLACK, x + dx, y + dy, scale, font, text);
                }
            }
        }
        draw_text_mut(image, WHITE, x, y, scale, font, text);
    }
}

/// Keep a coordinate within one frame extent of the frame on either side
fn clamp_to_margin(value: i32, extent: u32) -> i32 {
    let extent = extent.min(i32::MAX as u32 / 4) as i32;
    value.clamp(-extent, 2 * extent)
}

fn read_font(path: &Path) -> Option<FontVec> {
    let data = std::fs::read(path).ok()?;
    match FontVec::try_from_vec(data) {
        Ok(font) => {
            debug!(path = %path.display(), "Loaded overlay font");
            Some(font)
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Invalid font file");
            None
        }
    }
}

/// Line of roughly `width` pixels, drawn as parallel one-pixel segments
fn thick_line(image: &mut RgbImage, from: (i32, i32), to: (i32, i32), width: i32, color: Rgb<u8>) {
    let half = width / 2;
    let steep = (to.1 - from.1).abs() > (to.0 - from.0).abs();
    for offset in -half..=width - half - 1 {
        let (dx, dy) = if steep { (offset, 0) } else { (0, offset) };
        draw_line_segment_mut(
            image,
            ((from.0 + dx) as f32, (from.1 + dy) as f32),
            ((to.0 + dx) as f32, (to.1 + dy) as f32),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::geometry::midpoint;

    fn measurement() -> NeckMeasurement {
        let nose = Keypoint::new(0.5, 0.25, 0.0);
        let left_shoulder = Keypoint::new(0.25, 0.75, 0.0);
        let right_shoulder = Keypoint::new(0.75, 0.75, 0.0);
        NeckMeasurement {
            nose,
            left_shoulder,
            right_shoulder,
            neck_base: midpoint(&left_shoulder, &right_shoulder),
            length_cm: 85.0,
        }
    }

    #[test]
    fn test_markers_are_drawn() {
        let mut image = RgbImage::new(200, 200);
        Overlay::without_labels().draw(&mut image, &measurement());

        // Marker centers
        assert_eq!(image.get_pixel(100, 50), &RED);
        assert_eq!(image.get_pixel(50, 150), &GREEN);
        assert_eq!(image.get_pixel(150, 150), &GREEN);
        // Neck line between nose and neck base
        assert_eq!(image.get_pixel(100, 100), &RED);
        // Shoulder line
        assert_eq!(image.get_pixel(75, 150), &GREEN);
        // White ring around the nose marker
        assert_eq!(image.get_pixel(100 + NOSE_RADIUS as u32, 50), &WHITE);
    }

    #[test]
    fn test_offscreen_landmarks_do_not_panic() {
        let mut image = RgbImage::new(16, 16);
        let mut neck = measurement();
        neck.nose = Keypoint::new(-3.0, 4.0, 0.0);
        neck.neck_base = Keypoint::new(2.0, -1.0, 0.0);
        Overlay::without_labels().draw(&mut image, &neck);

        neck.nose = Keypoint::new(1e12, -1e12, 0.0);
        neck.left_shoulder = Keypoint::new(f64::INFINITY, f64::NEG_INFINITY, 0.0);
        neck.right_shoulder = Keypoint::new(f64::NAN, 5e9, 0.0);
        neck.neck_base = Keypoint::new(-1e12, 1e12, 0.0);
        Overlay::without_labels().draw(&mut image, &neck);
    }

    #[test]
    fn test_clamp_to_margin() {
        assert_eq!(clamp_to_margin(i32::MAX, 640), 1280);
        assert_eq!(clamp_to_margin(i32::MIN, 640), -640);
        assert_eq!(clamp_to_margin(320, 640), 320);
    }

    #[test]
    fn test_missing_font_disables_labels() {
        let overlay = Overlay::load(Some(Path::new("/nonexistent/font.ttf")));
        let fallback_installed = FALLBACK_FONTS
            .iter()
            .map(Path::new)
            .filter(|path| path.exists())
            .any(|path| read_font(path).is_some());
        assert_eq!(overlay.has_labels(), fallback_installed);
        assert!(!Overlay::without_labels().has_labels());
    }
}
