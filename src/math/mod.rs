//! Small linear-algebra kit: 2D/3D vectors and a 4x4 affine matrix.

pub mod mat4;
pub mod vec2;
pub mod vec3;

pub use mat4::Mat4;
pub use vec2::Vec2;
pub use vec3::Vec3;
