// CONTROLLER: Input, per-frame logic, and update loop
pub mod input;
pub mod physics;
pub mod camera_controller;
pub mod orbit_controller;
pub mod highlighter;
pub mod frame_loop;

pub use input::{InputEvent, InputState, KeyBindings, MouseButton, MoveKey, PointerDelta};
pub use physics::PhysicsSystem;
pub use camera_controller::CameraController;
pub use orbit_controller::OrbitController;
pub use highlighter::{HighlightSummary, ProximityHighlighter};
pub use frame_loop::{frame_dt, FrameLoopContext, FrameStats};
