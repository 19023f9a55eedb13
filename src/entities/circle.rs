//! CIRCLE entity record.

use crate::types::Vector3;

use super::EntityCommon;

#[derive(Debug, Clone)]
pub struct Circle {
    pub common: EntityCommon,
    pub center: Vector3,
    pub radius: f64,
    pub thickness: f64,
    pub extrusion: Vector3,
}
