//! Shared value types: release codes, handles, vectors, and colors.

pub mod color;
pub mod handle;
pub mod vector;
pub mod version;

pub use color::Color;
pub use handle::Handle;
pub use vector::{Vector2, Vector3};
pub use version::{DwgVersion, VersionFlags};
