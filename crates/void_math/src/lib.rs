//! # void_math - Scene-Graph Math Types
//!
//! Plain-old-data vector and bounds types that scene-graph parameters are
//! made of. Layouts are `repr(C)` so values can be handed to a rendering
//! backend without conversion.

pub mod vector;
pub mod bounds;

pub use vector::*;
pub use bounds::*;

pub mod prelude {
    pub use crate::vector::{Vec2f, Vec3f, Vec4f, Vec2i, Vec3i, Vec4i};
    pub use crate::bounds::Box3f;
}
