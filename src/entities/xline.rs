//! XLINE entity record.

use crate::types::Vector3;

use super::EntityCommon;

/// An infinite construction line: a base point and a unit direction.
#[derive(Debug, Clone)]
pub struct XLine {
    pub common: EntityCommon,
    pub base_point: Vector3,
    pub direction: Vector3,
}
