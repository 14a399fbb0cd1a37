use glam::{Quat, Vec3};
use tracing::debug;

use crate::model::Body;

/// How far a landed body sinks into the ground, so the contact reads as an overlap
const CONTACT_SLOP: f32 = 1e-3;

/// Kinematic drop driver standing in for a rigid-body engine.
///
/// Dynamic bodies fall under gravity and tumble until their bounds reach the top of the
/// ground, then come to rest touching it. Bodies pass through each other; only the
/// highlighter cares about those overlaps.
pub struct PhysicsSystem {
    pub gravity: f32,
    pub max_fall_speed: f32,
}

impl PhysicsSystem {
    pub fn new() -> Self {
        Self {
            gravity: -9.8,
            max_fall_speed: 20.0,
        }
    }

    /// Advance every dynamic body by `dt` seconds. Returns how many landed this step.
    pub fn step(&self, bodies: &mut [Body], ground: &Body, dt: f32) -> usize {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        let floor = ground.world_aabb().max.y;
        let mut landed = 0;

        for (idx, body) in bodies.iter_mut().enumerate().filter(|(_, b)| !b.is_static && !b.resting) {
            body.velocity.y = (body.velocity.y + self.gravity * dt).max(-self.max_fall_speed);
            body.position += body.velocity * dt;

            let angle = body.spin.length() * dt;
            if angle > 0.0 {
                let spin = Quat::from_axis_angle(body.spin.normalize(), angle);
                body.rotation = (spin * body.rotation).normalize();
            }

            let bottom = body.world_aabb().min.y;
            if bottom <= floor && within_footprint(body, ground) {
                body.position.y += floor - bottom - CONTACT_SLOP;
                body.velocity = Vec3::ZERO;
                body.spin = Vec3::ZERO;
                body.resting = true;
                landed += 1;
                debug!(body = idx, position = ?body.position, "body landed");
            }
        }

        landed
    }
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn within_footprint(body: &Body, ground: &Body) -> bool {
    let a = body.world_aabb();
    let g = ground.world_aabb();
    a.max.x >= g.min.x && a.min.x <= g.max.x && a.max.z >= g.min.z && a.min.z <= g.max.z
}
