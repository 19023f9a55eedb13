//! TEXT entity record.

use crate::types::Vector3;

use super::EntityCommon;

/// A single-line text entity.
#[derive(Debug, Clone)]
pub struct Text {
    pub common: EntityCommon,
    pub value: String,
    pub insertion_point: Vector3,
    pub alignment_point: Option<Vector3>,
    pub height: f64,
    /// Rotation in radians.
    pub rotation: f64,
    pub width_factor: f64,
    /// Oblique (slant) angle in radians.
    pub oblique_angle: f64,
    pub thickness: f64,
    pub extrusion: Vector3,
    pub generation: i16,
    pub horizontal_alignment: i16,
    pub vertical_alignment: i16,
    pub style_handle: u64,
}
