use glam::Vec3;

use crate::controller::input::{InputState, MoveKey};
use crate::model::{relative_direction, Camera};

/// Local-space axis each movement key pushes along.
fn local_axis(key: MoveKey) -> Option<Vec3> {
    match key {
        MoveKey::Forward => Some(Vec3::Z),
        MoveKey::Back => Some(Vec3::NEG_Z),
        MoveKey::Left => Some(Vec3::NEG_X),
        MoveKey::Right => Some(Vec3::X),
        MoveKey::YawLeft | MoveKey::YawRight => None,
    }
}

/// Handles camera movement and yaw from held keys
#[derive(Debug, Clone)]
pub struct CameraController {
    /// World units per second
    pub move_speed: f32,
    /// Radians per second
    pub rotate_speed: f32,
}

impl CameraController {
    pub fn new(move_speed: f32, rotate_speed: f32) -> Self {
        Self { move_speed, rotate_speed }
    }

    /// Sum of the camera-relative axes of every held movement key, normalized.
    /// Zero when nothing (or only opposing keys) is held.
    pub fn movement_direction(&self, camera: &Camera, input: &InputState) -> Vec3 {
        let direction: Vec3 = [MoveKey::Forward, MoveKey::Left, MoveKey::Back, MoveKey::Right]
            .into_iter()
            .filter(|key| input.is_pressed(*key))
            .filter_map(local_axis)
            .map(|axis| relative_direction(axis, camera.rotation))
            .sum();

        direction.normalize_or_zero()
    }

    /// Integrate one frame. Position moves with the orientation held at the start
    /// of the frame, then yaw is applied. Returns the displacement.
    pub fn update(&self, camera: &mut Camera, input: &InputState, dt: f32) -> Vec3 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let displacement = self.movement_direction(camera, input) * self.move_speed * dt;
        camera.position += displacement;

        if input.is_pressed(MoveKey::YawLeft) {
            camera.rotation.y -= self.rotate_speed * dt;
        }
        if input.is_pressed(MoveKey::YawRight) {
            camera.rotation.y += self.rotate_speed * dt;
        }

        displacement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(800, 600)
    }

    fn held(keys: &[MoveKey]) -> InputState {
        let mut input = InputState::new();
        for key in keys {
            input.press(*key);
        }
        input
    }

    #[test]
    fn test_no_keys_no_change() {
        let controller = CameraController::new(5.0, 1.5);
        for dt in [0.0, 0.016, 0.1, 3.0] {
            let mut cam = camera();
            cam.position = Vec3::new(1.0, 2.0, 3.0);
            cam.rotation = Vec3::new(0.1, 0.2, 0.3);
            let moved = controller.update(&mut cam, &InputState::new(), dt);
            assert_eq!(moved, Vec3::ZERO);
            assert_eq!(cam.position, Vec3::new(1.0, 2.0, 3.0));
            assert_eq!(cam.rotation, Vec3::new(0.1, 0.2, 0.3));
        }
    }

    #[test]
    fn test_single_key_follows_local_axis() {
        let controller = CameraController::new(1.0, 1.0);
        let cases = [
            (MoveKey::Forward, Vec3::Z),
            (MoveKey::Back, Vec3::NEG_Z),
            (MoveKey::Left, Vec3::NEG_X),
            (MoveKey::Right, Vec3::X),
        ];
        for (key, axis) in cases {
            let direction = controller.movement_direction(&camera(), &held(&[key]));
            assert_eq!(direction, axis, "{key:?}");
        }
    }

    #[test]
    fn test_diagonal_moves_at_unit_speed() {
        let controller = CameraController::new(2.0, 1.0);
        let mut cam = camera();
        cam.rotation.y = 0.7;
        let moved = controller.update(&mut cam, &held(&[MoveKey::Forward, MoveKey::Left]), 0.5);
        assert!((moved.length() - 1.0).abs() < 1e-5, "diagonal displacement {}", moved.length());

        let mut cam = camera();
        cam.rotation.y = 0.7;
        let straight = controller.update(&mut cam, &held(&[MoveKey::Forward]), 0.5);
        assert!((straight.length() - moved.length()).abs() < 1e-5);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let controller = CameraController::new(5.0, 1.0);
        let mut cam = camera();
        let moved = controller.update(&mut cam, &held(&[MoveKey::Forward, MoveKey::Back]), 0.1);
        assert_eq!(moved, Vec3::ZERO);
        assert!(cam.position.is_finite());
    }

    #[test]
    fn test_zero_dt_zero_displacement() {
        let controller = CameraController::new(5.0, 1.0);
        let mut cam = camera();
        let moved = controller.update(&mut cam, &held(&[MoveKey::Forward, MoveKey::YawLeft]), 0.0);
        assert_eq!(moved, Vec3::ZERO);
        assert_eq!(cam.position, Vec3::ZERO);
        assert_eq!(cam.rotation.y, 0.0);
    }

    #[test]
    fn test_forward_uses_current_yaw() {
        let controller = CameraController::new(1.0, 1.0);
        let mut cam = camera();
        cam.rotation.y = std::f32::consts::FRAC_PI_2;
        let moved = controller.update(&mut cam, &held(&[MoveKey::Forward]), 1.0);
        assert!((moved - Vec3::X).length() < 1e-5, "moved {moved}");
    }

    #[test]
    fn test_yaw_keys() {
        let controller = CameraController::new(1.0, 2.0);

        let mut cam = camera();
        controller.update(&mut cam, &held(&[MoveKey::YawLeft]), 0.25);
        assert!((cam.rotation.y + 0.5).abs() < 1e-6);

        let mut cam = camera();
        controller.update(&mut cam, &held(&[MoveKey::YawRight]), 0.25);
        assert!((cam.rotation.y - 0.5).abs() < 1e-6);

        let mut cam = camera();
        cam.rotation.y = 0.3;
        controller.update(&mut cam, &held(&[MoveKey::YawLeft, MoveKey::YawRight]), 0.25);
        assert!((cam.rotation.y - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_position_uses_yaw_from_frame_start() {
        let controller = CameraController::new(1.0, 10.0);
        let mut cam = camera();
        let moved = controller.update(&mut cam, &held(&[MoveKey::Forward, MoveKey::YawRight]), 0.1);
        assert!((moved - Vec3::new(0.0, 0.0, 0.1)).length() < 1e-6);
        assert!(cam.rotation.y > 0.0);
    }

    #[test]
    fn test_negative_or_nan_dt_is_ignored() {
        let controller = CameraController::new(1.0, 1.0);
        let mut cam = camera();
        let input = held(&[MoveKey::Right, MoveKey::YawRight]);
        controller.update(&mut cam, &input, -1.0);
        controller.update(&mut cam, &input, f32::NAN);
        assert_eq!(cam.position, Vec3::ZERO);
        assert_eq!(cam.rotation, Vec3::ZERO);
    }
}
