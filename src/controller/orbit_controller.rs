use glam::Vec3;

use crate::controller::input::PointerDelta;
use crate::model::Camera;

/// Polar limits keep the camera off the poles, where the look-at would flip.
const MIN_POLAR: f32 = 0.2;
const MAX_POLAR: f32 = std::f32::consts::PI - 0.2;

/// `damping` is the fraction of queued motion played out per frame at this rate.
const DAMPING_REFERENCE_FPS: f32 = 60.0;

const SETTLED_EPSILON: f32 = 1e-5;

/// Damped orbit around a fixed target. Dragging queues azimuth/polar motion and
/// the wheel queues zoom; each frame plays out a share of what is queued, so the
/// camera glides to a stop after the pointer is released.
#[derive(Debug, Clone)]
pub struct OrbitController {
    pub target: Vec3,
    /// Radians per pixel of drag
    pub rotate_speed: f32,
    /// Radius scale per wheel notch towards the target
    pub zoom_step: f32,
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    /// Natural log of the radius scale still to apply
    pending_zoom: f32,
}

impl OrbitController {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            rotate_speed: 0.01,
            zoom_step: 0.95,
            damping: 0.05,
            min_distance: 0.2,
            max_distance: 20.0,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_zoom: 0.0,
        }
    }

    /// Queue pointer input gathered since the last frame.
    pub fn push(&mut self, delta: PointerDelta) {
        // Dragging right swings the camera left around the target, as if pulling the scene
        self.pending_azimuth -= delta.dx * self.rotate_speed;
        self.pending_polar -= delta.dy * self.rotate_speed;
        // Positive wheel moves away; ln(zoom_step) is negative
        self.pending_zoom -= delta.wheel * self.zoom_step.ln();
    }

    pub fn is_settled(&self) -> bool {
        self.pending_azimuth.abs() < SETTLED_EPSILON
            && self.pending_polar.abs() < SETTLED_EPSILON
            && self.pending_zoom.abs() < SETTLED_EPSILON
    }

    /// Play out the share of queued motion due after `dt` seconds and aim the
    /// camera at the target. A settled controller or a zero step leaves the pose as is.
    pub fn update(&mut self, camera: &mut Camera, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if dt == 0.0 || self.is_settled() {
            return;
        }

        let offset = camera.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let keep = (1.0 - self.damping).powf(dt * DAMPING_REFERENCE_FPS);
        let applied = 1.0 - keep;

        let azimuth = offset.x.atan2(offset.z) + self.pending_azimuth * applied;
        let polar = ((offset.y / radius).clamp(-1.0, 1.0).acos() + self.pending_polar * applied)
            .clamp(MIN_POLAR, MAX_POLAR);
        let radius = (radius * (self.pending_zoom * applied).exp()).clamp(self.min_distance, self.max_distance);

        self.pending_azimuth *= keep;
        self.pending_polar *= keep;
        self.pending_zoom *= keep;

        camera.position = self.target
            + radius * Vec3::new(polar.sin() * azimuth.sin(), polar.cos(), polar.sin() * azimuth.cos());
        camera.set_look_at(self.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn camera_at(position: Vec3) -> Camera {
        let mut cam = Camera::new(800, 600);
        cam.position = position;
        cam.set_look_at(Vec3::ZERO);
        cam
    }

    fn drag(dx: f32, dy: f32) -> PointerDelta {
        PointerDelta { dx, dy, wheel: 0.0 }
    }

    fn settle(orbit: &mut OrbitController, cam: &mut Camera) {
        for _ in 0..2000 {
            orbit.update(cam, FRAME);
        }
        assert!(orbit.is_settled());
    }

    #[test]
    fn test_drag_orbits_at_constant_radius() {
        let mut orbit = OrbitController::new(Vec3::ZERO);
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 2.0));
        // One radian of azimuth in total
        orbit.push(drag(-100.0, 0.0));
        settle(&mut orbit, &mut cam);

        let expected = 2.0 * Vec3::new(1f32.sin(), 0.0, 1f32.cos());
        assert!((cam.position - expected).length() < 1e-3, "ended at {}", cam.position);
        let towards_target = (-cam.position).normalize();
        assert!((cam.forward() - towards_target).length() < 1e-4);
    }

    #[test]
    fn test_motion_decays_by_damping_each_frame() {
        let mut orbit = OrbitController::new(Vec3::ZERO);
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 2.0));
        orbit.push(drag(-50.0, 0.0));

        let azimuth = |cam: &Camera| cam.position.x.atan2(cam.position.z);
        let mut previous = azimuth(&cam);
        let mut steps = Vec::new();
        for _ in 0..3 {
            orbit.update(&mut cam, FRAME);
            let now = azimuth(&cam);
            steps.push(now - previous);
            previous = now;
        }
        assert!((steps[0] - 0.5 * 0.05).abs() < 1e-4, "first step {}", steps[0]);
        assert!((steps[1] / steps[0] - 0.95).abs() < 1e-3);
        assert!((steps[2] / steps[1] - 0.95).abs() < 1e-3);
    }

    #[test]
    fn test_damping_is_frame_rate_independent() {
        let start = Vec3::new(0.25, -0.25, 1.0);
        let mut fast = OrbitController::new(Vec3::ZERO);
        let mut slow = fast.clone();
        let mut fast_cam = camera_at(start);
        let mut slow_cam = camera_at(start);
        fast.push(drag(30.0, 10.0));
        slow.push(drag(30.0, 10.0));

        for _ in 0..4 {
            fast.update(&mut fast_cam, FRAME);
        }
        slow.update(&mut slow_cam, 4.0 * FRAME);
        assert!((fast_cam.position - slow_cam.position).length() < 1e-4);
    }

    #[test]
    fn test_zero_dt_leaves_pose_and_queue() {
        let mut orbit = OrbitController::new(Vec3::ZERO);
        let start = Vec3::new(0.25, -0.25, 1.0);
        let mut cam = camera_at(start);
        orbit.push(drag(10.0, 10.0));
        orbit.update(&mut cam, 0.0);
        assert_eq!(cam.position, start);
        assert!(!orbit.is_settled());
    }

    #[test]
    fn test_wheel_zooms_within_limits() {
        let mut orbit = OrbitController::new(Vec3::ZERO);
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 2.0));
        orbit.push(PointerDelta { wheel: -1.0, ..PointerDelta::default() });
        settle(&mut orbit, &mut cam);
        assert!((cam.position.length() - 2.0 * 0.95).abs() < 1e-3);

        orbit.push(PointerDelta { wheel: 500.0, ..PointerDelta::default() });
        settle(&mut orbit, &mut cam);
        assert!((cam.position.length() - orbit.max_distance).abs() < 1e-3);

        orbit.push(PointerDelta { wheel: -500.0, ..PointerDelta::default() });
        settle(&mut orbit, &mut cam);
        assert!((cam.position.length() - orbit.min_distance).abs() < 1e-3);
    }

    #[test]
    fn test_polar_angle_stays_off_the_poles() {
        let mut orbit = OrbitController::new(Vec3::ZERO);
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 2.0));
        orbit.push(drag(0.0, 10_000.0));
        settle(&mut orbit, &mut cam);
        let polar = (cam.position.y / cam.position.length()).acos();
        assert!((polar - MIN_POLAR).abs() < 1e-3, "polar {polar}");
        assert!(cam.position.is_finite());
    }
}
