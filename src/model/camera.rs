use glam::{EulerRot, Mat4, Quat, Vec3};

/// Rotate a local-space direction into world space.
///
/// `orientation` is (pitch, yaw, roll) in radians, stored as x/y/z. Roll is applied first,
/// then pitch, then yaw. The input is normalized first; a zero input stays zero.
pub fn relative_direction(local: Vec3, orientation: Vec3) -> Vec3 {
    orientation_quat(orientation) * local.normalize_or_zero()
}

fn orientation_quat(orientation: Vec3) -> Quat {
    Quat::from_euler(EulerRot::YXZ, orientation.y, orientation.x, orientation.z)
}

/// Free-fly camera. Local +Z is forward, +X is right, +Y is up (left-handed view).
pub struct Camera {
    pub position: Vec3,
    /// x = pitch, y = yaw, z = roll
    pub rotation: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            fov_y: 75f32.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            z_near: 0.1,
            z_far: 100.0,
        }
    }

    pub fn yaw(&self) -> f32 { self.rotation.y }

    pub fn pitch(&self) -> f32 { self.rotation.x }

    pub fn forward(&self) -> Vec3 { relative_direction(Vec3::Z, self.rotation) }

    pub fn up(&self) -> Vec3 { relative_direction(Vec3::Y, self.rotation) }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn set_look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        self.rotation.y = dir.x.atan2(dir.z);
        self.rotation.x = (-dir.y).clamp(-1.0, 1.0).asin().clamp(-1.4, 1.4);
        self.rotation.z = 0.0;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_to_lh(self.position, self.forward(), self.up())
    }

    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_lh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_identity_orientation_keeps_axes() {
        for axis in [Vec3::Z, -Vec3::Z, Vec3::X, -Vec3::X, Vec3::Y] {
            assert_eq!(relative_direction(axis, Vec3::ZERO), axis);
        }
    }

    #[test]
    fn test_direction_is_normalized_before_rotation() {
        let dir = relative_direction(Vec3::new(0.0, 0.0, 4.0), Vec3::new(0.0, 0.3, 0.0));
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert_eq!(relative_direction(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0)), Vec3::ZERO);
    }

    #[test]
    fn test_positive_yaw_turns_right() {
        let quarter = std::f32::consts::FRAC_PI_2;
        let forward = relative_direction(Vec3::Z, Vec3::new(0.0, quarter, 0.0));
        assert!(approx(forward, Vec3::X), "forward after +90° yaw was {forward}");
    }

    #[test]
    fn test_positive_pitch_looks_down() {
        let forward = relative_direction(Vec3::Z, Vec3::new(0.5, 0.0, 0.0));
        assert!(forward.y < 0.0);
    }

    #[test]
    fn test_set_look_at_round_trips_forward() {
        let mut cam = Camera::new(800, 600);
        cam.position = Vec3::new(0.0, 5.0, -15.0);
        cam.set_look_at(Vec3::ZERO);
        let expected = (Vec3::ZERO - cam.position).normalize();
        assert!(approx(cam.forward(), expected), "forward {} != {}", cam.forward(), expected);
    }

    #[test]
    fn test_view_proj_puts_target_in_front() {
        let mut cam = Camera::new(800, 600);
        cam.position = Vec3::new(0.0, 0.0, -5.0);
        cam.set_look_at(Vec3::ZERO);
        let clip = cam.view_proj() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}
