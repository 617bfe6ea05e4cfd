use crate::core::geometry::orientation::BestView;
use nalgebra::{Matrix3, Point3};
use serde::{Deserialize, Serialize};

/// Camera fields a renderer reads on its next draw.
///
/// `rotation` follows the row-vector convention `view = (x - center) · rotation` and is
/// always a proper rotation. `center` and `extent` override the renderer's own framing
/// while set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub rotation: Matrix3<f64>,
    pub zoom: f64,
    pub center: Option<Point3<f64>>,
    pub extent: Option<f64>,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            rotation: Matrix3::identity(),
            zoom: 1.0,
            center: None,
            extent: None,
        }
    }
}

impl CameraState {
    /// The camera that frames `view` at the current zoom.
    pub fn looking_at(&self, view: &BestView) -> CameraState {
        CameraState {
            rotation: view.rotation,
            zoom: self.zoom,
            center: Some(view.center),
            extent: Some(view.extent),
        }
    }

    /// Jumps straight to `view` without animating.
    pub fn snap_to(&mut self, view: &BestView) {
        *self = self.looking_at(view);
    }

    pub fn clear_framing(&mut self) {
        self.center = None;
        self.extent = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_keeps_zoom_and_sets_framing() {
        let mut camera = CameraState {
            zoom: 2.5,
            ..CameraState::default()
        };
        let view = BestView {
            rotation: Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            center: Point3::new(1.0, 2.0, 3.0),
            extent: 12.0,
            angle: 0.5,
        };
        camera.snap_to(&view);
        assert_eq!(camera.rotation, view.rotation);
        assert_eq!(camera.zoom, 2.5);
        assert_eq!(camera.center, Some(view.center));
        assert_eq!(camera.extent, Some(12.0));

        camera.clear_framing();
        assert!(camera.center.is_none() && camera.extent.is_none());
    }

    #[test]
    fn serializes_rotation_and_framing() {
        let json = serde_json::to_value(CameraState::default()).unwrap();
        assert_eq!(json["zoom"], 1.0);
        assert!(json["center"].is_null());
        assert!(json.get("rotation").is_some());
    }
}
