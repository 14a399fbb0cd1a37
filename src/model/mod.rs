// MODEL: Scene state and geometry
pub mod body;
pub mod camera;
pub mod scene;

pub use body::{Aabb, Body, Intersects, Rgb, Tinted};
pub use camera::{relative_direction, Camera};
pub use scene::Scene;
