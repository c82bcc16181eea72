pub mod frame;
pub mod tridiagonal;

pub use glam::{DVec2, DVec3, DVec4, DMat3, DMat4};
pub use frame::TnbFrame;

pub type Point3 = DVec3;
pub type Vector3 = DVec3;
