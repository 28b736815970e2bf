//! Camera intrinsics placeholder
//!
//! No optical calibration is performed. The stage assigns nominal VGA
//! (640x480) intrinsics with zero distortion so downstream consumers always
//! see a complete record. A checkerboard-based calibration belongs in a
//! separate vision component and would replace this stage.

use super::Calibrator;
use crate::error::Result;
use crate::record::{CalibrationRecord, CameraIntrinsics};

/// Assigns fixed nominal intrinsics; never fails
#[derive(Debug, Default, Clone, Copy)]
pub struct CameraCalibrator;

impl Calibrator for CameraCalibrator {
    fn calibrate(&mut self, record: &mut CalibrationRecord) -> Result<()> {
        log::info!("Starting Camera calibration");

        let camera = CameraIntrinsics::nominal();
        record.camera = camera;

        log::info!(
            "Camera Calibration: focal {:.1} px, principal point ({:.1}, {:.1}), k1={:.3} k2={:.3}",
            camera.focal_length,
            camera.principal_point[0],
            camera.principal_point[1],
            camera.distortion[0],
            camera.distortion[1]
        );
        log::info!("Camera calibration complete");
        Ok(())
    }
}
