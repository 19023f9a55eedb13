//! SOLID entity record.
//!
//! TRACE records share this schema bit for bit; only the type code
//! differs.

use crate::types::Vector3;

use super::EntityCommon;

/// A filled quadrilateral. The four corners are planar; their z values
/// carry the stored elevation.
#[derive(Debug, Clone)]
pub struct Solid {
    pub common: EntityCommon,
    pub first_corner: Vector3,
    pub second_corner: Vector3,
    pub third_corner: Vector3,
    pub fourth_corner: Vector3,
    pub thickness: f64,
    pub extrusion: Vector3,
}
