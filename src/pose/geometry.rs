// SPDX-License-Identifier: GPL-3.0-only

//! Landmark geometry in normalized frame coordinates

use super::Keypoint;

/// Distance between two keypoints in the image plane
///
/// Depth is ignored: only the projected 2D distance feeds the neck metric.
pub fn distance(p1: &Keypoint, p2: &Keypoint) -> f64 {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    (dx * dx + dy * dy).sqrt()
}

/// Componentwise average of two keypoints, depth included
pub fn midpoint(p1: &Keypoint, p2: &Keypoint) -> Keypoint {
    Keypoint {
        x: (p1.x + p2.x) / 2.0,
        y: (p1.y + p2.y) / 2.0,
        z: (p1.z + p2.z) / 2.0,
        visibility: p1.visibility.min(p2.visibility),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = Keypoint::new(0.42, 0.17, -0.3);
        assert_eq!(distance(&p, &p), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Keypoint::new(0.1, 0.9, 0.0);
        let b = Keypoint::new(0.7, 0.2, 0.5);
        assert_eq!(distance(&a, &b), distance(&b, &a));
    }

    #[test]
    fn test_distance_ignores_depth() {
        let a = Keypoint::new(0.0, 0.0, 0.0);
        let b = Keypoint::new(0.3, 0.4, 10.0);
        assert!((distance(&a, &b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_midpoint_components() {
        let a = Keypoint::new(0.2, 0.4, -0.2);
        let b = Keypoint::new(0.6, 0.8, 0.4);
        let m = midpoint(&a, &b);
        assert_eq!(m.x, (a.x + b.x) / 2.0);
        assert_eq!(m.y, (a.y + b.y) / 2.0);
        assert_eq!(m.z, (a.z + b.z) / 2.0);
    }
}
