pub mod error;
pub mod tolerance;
pub mod traits;

pub use error::{PathError, Result};
pub use tolerance::ProjectionTolerance;
