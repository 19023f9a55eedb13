//! ARC entity record.

use crate::types::Vector3;

use super::EntityCommon;

/// A circular arc. Angles are in radians, measured counter-clockwise from
/// the X axis; the degrees convention belongs to presentation layers.
#[derive(Debug, Clone)]
pub struct Arc {
    pub common: EntityCommon,
    pub center: Vector3,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub thickness: f64,
    pub extrusion: Vector3,
}
