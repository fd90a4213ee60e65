//! # Vision Detector Configuration
//!
//! Scoring configuration for the mineral sampling detector.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the vision detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionParams {
    /// Index of the camera to use, 0 is the back camera and 1 the front.
    pub camera_index: u8,

    /// Show the camera view with detections overlaid on the robot display.
    pub display: bool,

    /// Factor applied to each frame's resolution before processing.
    pub downscale: f64,

    /// Method used to score the area of candidate blobs.
    pub area_scoring: AreaScoring,

    /// Weight of the max-area score.
    pub max_area_weight: f64,

    /// Target area in pixels when using [`AreaScoring::PerfectArea`].
    pub perfect_area: f64,

    /// Weight of the aspect ratio score.
    pub ratio_weight: f64,

    /// Aspect ratio of a perfect candidate.
    pub perfect_ratio: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Area scoring methods supported by the detector.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum AreaScoring {
    /// Prefer the largest blob.
    MaxArea,

    /// Prefer blobs closest to [`VisionParams::perfect_area`].
    PerfectArea,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for VisionParams {
    fn default() -> Self {
        Self {
            camera_index: 1,
            display: false,
            downscale: 0.4,
            area_scoring: AreaScoring::MaxArea,
            max_area_weight: 0.001,
            perfect_area: 10000.0,
            ratio_weight: 15.0,
            perfect_ratio: 1.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialise() {
        let p: VisionParams = toml::from_str(
            r#"
            camera_index = 0
            display = true
            downscale = 0.5
            area_scoring = "PerfectArea"
            max_area_weight = 0.002
            perfect_area = 8000.0
            ratio_weight = 10.0
            perfect_ratio = 1.2
            "#,
        )
        .unwrap();

        assert_eq!(p.camera_index, 0);
        assert_eq!(p.area_scoring, AreaScoring::PerfectArea);
        assert_eq!(p.perfect_ratio, 1.2);
    }
}
