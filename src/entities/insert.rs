//! INSERT entity record.
//!
//! Block contents are decoded per block, never instantiated; an INSERT only
//! records the placement and the block-header handle.

use crate::types::Vector3;

use super::EntityCommon;

#[derive(Debug, Clone)]
pub struct Insert {
    pub common: EntityCommon,
    pub insertion_point: Vector3,
    pub x_scale: f64,
    pub y_scale: f64,
    pub z_scale: f64,
    /// Rotation in radians.
    pub rotation: f64,
    pub extrusion: Vector3,
    pub block_handle: u64,
    /// Block name, when the catalog resolved the block header.
    pub block_name: Option<String>,
}
