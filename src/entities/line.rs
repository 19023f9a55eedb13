//! LINE entity record.

use crate::types::Vector3;

use super::EntityCommon;

/// A straight segment between two 3D points.
#[derive(Debug, Clone)]
pub struct Line {
    pub common: EntityCommon,
    pub start: Vector3,
    pub end: Vector3,
    pub thickness: f64,
    pub extrusion: Vector3,
}
