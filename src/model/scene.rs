use glam::{EulerRot, Quat, Vec3};
use tracing::info;

use crate::config::{DemoConfig, DemoVariant};
use crate::model::{Body, Camera, Rgb};
use crate::utils::XorShift64;

pub const GROUND_HALF_EXTENTS: Vec3 = Vec3::new(10.0, 0.05, 10.0);
pub const BOX_HALF_EXTENTS: Vec3 = Vec3::splat(0.5);
const GROUND_COLOR: Rgb = Rgb::new(0.35, 0.55, 0.35);

/// Everything the frame loop reads and writes: camera pose, the static ground
/// slab, and the fixed set of dynamic boxes.
pub struct Scene {
    pub variant: DemoVariant,
    pub camera: Camera,
    pub ground: Body,
    pub bodies: Vec<Body>,
    /// Seconds since the scene was built
    pub elapsed: f32,
}

impl Scene {
    pub fn new(config: &DemoConfig, width: u32, height: u32) -> Self {
        let (eye, target) = config.camera_start();
        let mut camera = Camera::new(width, height);
        camera.position = eye;
        camera.set_look_at(target);

        // Top face of the ground sits at y = 0
        let ground = Body::new_static(
            Vec3::new(0.0, -GROUND_HALF_EXTENTS.y, 0.0),
            GROUND_HALF_EXTENTS,
            GROUND_COLOR,
        );

        let bodies = match config.variant {
            DemoVariant::Boxes => {
                let mut rng = XorShift64::new(config.seed);
                (0..config.body_count)
                    .map(|_| random_body(&mut rng, config.neutral_color))
                    .collect()
            }
            DemoVariant::WavePlane => Vec::new(),
        };

        info!(variant = ?config.variant, bodies = bodies.len(), seed = config.seed, "scene built");

        Self {
            variant: config.variant,
            camera,
            ground,
            bodies,
            elapsed: 0.0,
        }
    }
}

fn random_body(rng: &mut XorShift64, color: Rgb) -> Body {
    let tau = std::f32::consts::TAU;
    let position = Vec3::new(rng.range(-4.0, 4.0), rng.range(2.0, 12.0), rng.range(-4.0, 4.0));
    let rotation = Quat::from_euler(
        EulerRot::YXZ,
        rng.range(0.0, tau),
        rng.range(0.0, tau),
        rng.range(0.0, tau),
    );
    let mut body = Body::new_dynamic(position, rotation, BOX_HALF_EXTENTS, color);
    body.spin = Vec3::new(rng.range(-1.0, 1.0), rng.range(-1.0, 1.0), rng.range(-1.0, 1.0));
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Intersects;

    #[test]
    fn test_boxes_scene_is_seeded() {
        let config = DemoConfig::default();
        let a = Scene::new(&config, 800, 600);
        let b = Scene::new(&config, 800, 600);
        assert_eq!(a.bodies.len(), 10);
        for (x, y) in a.bodies.iter().zip(&b.bodies) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.rotation, y.rotation);
        }
    }

    #[test]
    fn test_bodies_start_above_ground() {
        let scene = Scene::new(&DemoConfig::default(), 800, 600);
        assert_eq!(scene.ground.world_aabb().max.y, 0.0);
        for body in &scene.bodies {
            assert!(!body.is_static);
            assert!(!body.intersects(&scene.ground), "body at {} starts inside ground", body.position);
        }
    }

    #[test]
    fn test_wave_plane_has_no_bodies() {
        let config = DemoConfig { variant: DemoVariant::WavePlane, ..DemoConfig::default() };
        let scene = Scene::new(&config, 800, 600);
        assert!(scene.bodies.is_empty());
        assert_eq!(scene.camera.position, Vec3::new(0.25, -0.25, 1.0));
    }
}
