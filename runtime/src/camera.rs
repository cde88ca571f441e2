//! Chase-camera framing around a tracked point.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Largest allowed camera distance.
pub const MAX_DISTANCE: f64 = 24.0;

/// Offset of the camera from the tracked point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraRig {
    #[serde(default = "default_distance")]
    pub distance: f64,

    /// Euler angles in degrees, applied Z then X then Y.
    #[serde(default)]
    pub rotation_deg: [f64; 3],
}

fn default_distance() -> f64 {
    1.0
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            distance: default_distance(),
            rotation_deg: [0.0; 3],
        }
    }
}

/// Where the camera sits and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl CameraRig {
    fn rotation(&self) -> UnitQuaternion<f64> {
        let [x, y, z] = self.rotation_deg.map(f64::to_radians);
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), y)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z)
    }

    /// Camera pose looking at `target`, or `None` when nothing is tracked.
    pub fn frame(&self, target: Option<Point3<f64>>) -> Option<CameraPose> {
        let target = target?;
        let offset = self.rotation() * (Vector3::z() * self.distance);
        let position = target + offset;

        let look = target - position;
        let orientation = if look.norm() > f64::EPSILON {
            UnitQuaternion::face_towards(&look, &Vector3::y())
        } else {
            UnitQuaternion::identity()
        };

        Some(CameraPose {
            position,
            orientation,
        })
    }
}
