// VIEW: Rendering and graphics
pub mod render;
pub mod gpu_init;

pub use render::{FrameUniform, InstanceRaw, RenderState};
pub use gpu_init::GpuContext;
