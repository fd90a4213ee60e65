//! # Simulated vision detector

use comms_if::eqpt::vision::VisionParams;
use log::info;

use crate::{
    auto::auto_mgr::Route,
    eqpt::{VisionDetector, VisionError},
};

/// Detector which reports a preset route once enabled.
#[derive(Debug, Default)]
pub struct SimVision {
    hint: Option<Route>,

    /// If false `init` fails as though the camera were missing.
    available: bool,

    initialised: bool,
    enabled: bool,
}

impl SimVision {
    pub fn new(hint: Option<Route>) -> Self {
        Self {
            hint,
            available: true,
            ..Default::default()
        }
    }

    /// A detector whose camera cannot be opened.
    pub fn unavailable() -> Self {
        Self::default()
    }
}

impl VisionDetector for SimVision {
    fn init(&mut self, params: &VisionParams) -> Result<(), VisionError> {
        if !self.available {
            return Err(VisionError::CameraUnavailable(params.camera_index));
        }

        if !(params.downscale > 0.0 && params.downscale <= 1.0) {
            return Err(VisionError::InvalidConfig(format!(
                "downscale must be in (0, 1], found {}",
                params.downscale
            )));
        }

        info!(
            "Sim vision using camera {} at downscale {}",
            params.camera_index, params.downscale
        );
        self.initialised = true;

        Ok(())
    }

    fn enable(&mut self) {
        self.enabled = self.initialised;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn route_hint(&self) -> Option<Route> {
        if self.enabled {
            self.hint
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_hint_only_when_enabled() {
        let mut vision = SimVision::new(Some(Route::Alternate));
        assert_eq!(vision.route_hint(), None);

        // Enabling before init does nothing
        vision.enable();
        assert_eq!(vision.route_hint(), None);

        vision.init(&VisionParams::default()).unwrap();
        vision.enable();
        assert_eq!(vision.route_hint(), Some(Route::Alternate));

        vision.disable();
        assert_eq!(vision.route_hint(), None);
    }

    #[test]
    fn test_init_errors() {
        let mut vision = SimVision::unavailable();
        assert!(matches!(
            vision.init(&VisionParams::default()),
            Err(VisionError::CameraUnavailable(1))
        ));

        let mut vision = SimVision::new(None);
        let params = VisionParams {
            downscale: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            vision.init(&params),
            Err(VisionError::InvalidConfig(_))
        ));
    }
}
