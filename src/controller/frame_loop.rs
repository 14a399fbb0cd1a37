use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::config::{DemoConfig, DemoVariant};
use crate::controller::{
    CameraController, HighlightSummary, InputState, OrbitController, PhysicsSystem, ProximityHighlighter,
};
use crate::model::Scene;

/// Longest step fed to the simulation; a stalled tab must not teleport the camera.
pub const MAX_FRAME_DT: f32 = 0.1;

/// Turn two timestamps in milliseconds into a clamped step in seconds.
pub fn frame_dt(last_ms: f64, now_ms: f64) -> f32 {
    ((now_ms - last_ms) / 1000.0).clamp(0.0, MAX_FRAME_DT as f64) as f32
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub frame: u64,
    pub dt: f32,
    /// Exponentially smoothed frames per second
    pub fps: f32,
    pub highlight: HighlightSummary,
    pub landed_total: usize,
}

impl FrameStats {
    fn record(&mut self, dt: f32) {
        self.frame += 1;
        self.dt = dt;
        if dt > 0.0 {
            let instant = 1.0 / dt;
            self.fps = if self.fps == 0.0 { instant } else { self.fps * 0.9 + instant * 0.1 };
        }
    }
}

/// Per-frame update shared by the wasm and native hosts
pub struct FrameLoopContext {
    pub scene: Rc<RefCell<Scene>>,
    pub input_state: Rc<RefCell<InputState>>,
    pub camera_controller: CameraController,
    /// Drives the camera instead of the free-fly controller in the wave scene
    pub orbit_controller: Option<OrbitController>,
    pub highlighter: ProximityHighlighter,
    pub physics_system: PhysicsSystem,
    pub stats: FrameStats,
}

impl FrameLoopContext {
    pub fn new(config: &DemoConfig, scene: Rc<RefCell<Scene>>, input_state: Rc<RefCell<InputState>>) -> Self {
        Self {
            scene,
            input_state,
            camera_controller: CameraController::new(config.move_speed, config.rotate_speed),
            orbit_controller: match config.variant {
                DemoVariant::WavePlane => Some(OrbitController::new(config.camera_start().1)),
                DemoVariant::Boxes => None,
            },
            highlighter: ProximityHighlighter::new(config.alert_color, config.neutral_color),
            physics_system: PhysicsSystem::new(),
            stats: FrameStats::default(),
        }
    }

    /// Run one frame: bodies move, then the camera, then colors are recomputed
    /// from the transforms as they stand at the end of the frame.
    pub fn update(&mut self, dt: f32) -> FrameStats {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.stats.record(dt);

        let mut scene = self.scene.borrow_mut();
        let scene = &mut *scene;
        scene.elapsed += dt;

        self.stats.landed_total += self.physics_system.step(&mut scene.bodies, &scene.ground, dt);

        // Single snapshot of the held keys for this frame; pointer motion is
        // drained every frame so it never piles up in the free-fly scene
        let mut input = self.input_state.borrow_mut();
        let pointer = input.take_pointer_delta();
        match self.orbit_controller.as_mut() {
            Some(orbit) => {
                orbit.push(pointer);
                orbit.update(&mut scene.camera, dt);
            }
            None => {
                self.camera_controller.update(&mut scene.camera, &input, dt);
            }
        }
        drop(input);

        self.stats.highlight = self.highlighter.apply(&scene.ground, &mut scene.bodies);

        trace!(
            frame = self.stats.frame,
            dt,
            on_ground = self.stats.highlight.on_reference,
            touching = self.stats.highlight.touching,
            "frame"
        );

        self.stats
    }
}
