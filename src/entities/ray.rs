//! RAY entity record.

use crate::types::Vector3;

use super::EntityCommon;

/// A half-infinite line: a base point and a unit direction.
#[derive(Debug, Clone)]
pub struct Ray {
    pub common: EntityCommon,
    pub base_point: Vector3,
    pub direction: Vector3,
}
