use glam::{Mat3, Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        Self { min: center - half, max: center + half }
    }

    /// Touching faces count as intersecting.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

/// Geometric overlap predicate between two bounded things.
pub trait Intersects<Rhs: ?Sized = Self> {
    fn intersects(&self, other: &Rhs) -> bool;
}

/// Anything carrying a material color the highlighter may rewrite.
pub trait Tinted {
    fn color(&self) -> Rgb;
    fn set_color(&mut self, color: Rgb);
}

/// A box-shaped rigid body. The transform belongs to whatever drives the
/// simulation; the color belongs to the highlighter.
#[derive(Debug, Clone)]
pub struct Body {
    pub position: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
    pub velocity: Vec3,
    /// Axis scaled by radians per second
    pub spin: Vec3,
    pub color: Rgb,
    pub is_static: bool,
    /// Set once a dynamic body has come to rest
    pub resting: bool,
}

impl Body {
    pub fn new_dynamic(position: Vec3, rotation: Quat, half_extents: Vec3, color: Rgb) -> Self {
        Self {
            position,
            rotation,
            half_extents,
            velocity: Vec3::ZERO,
            spin: Vec3::ZERO,
            color,
            is_static: false,
            resting: false,
        }
    }

    pub fn new_static(position: Vec3, half_extents: Vec3, color: Rgb) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            half_extents,
            velocity: Vec3::ZERO,
            spin: Vec3::ZERO,
            color,
            is_static: true,
            resting: true,
        }
    }

    /// World-space bounds of the (possibly rotated) box.
    pub fn world_aabb(&self) -> Aabb {
        let rot = Mat3::from_quat(self.rotation);
        let abs = Mat3::from_cols(rot.x_axis.abs(), rot.y_axis.abs(), rot.z_axis.abs());
        Aabb::from_center_half_extents(self.position, abs * self.half_extents)
    }

    /// Transform for a unit cube spanning [-0.5, 0.5] on each axis.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.half_extents * 2.0, self.rotation, self.position)
    }
}

impl Intersects for Body {
    fn intersects(&self, other: &Body) -> bool {
        self.world_aabb().intersects(&other.world_aabb())
    }
}

impl Tinted for Body {
    fn color(&self) -> Rgb { self.color }

    fn set_color(&mut self, color: Rgb) { self.color = color; }
}
