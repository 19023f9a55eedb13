//! POINT entity record.

use crate::types::Vector3;

use super::EntityCommon;

#[derive(Debug, Clone)]
pub struct Point {
    pub common: EntityCommon,
    pub location: Vector3,
    pub thickness: f64,
    pub extrusion: Vector3,
    /// Angle of the UCS X axis stored with the point, in radians.
    pub x_axis_angle: f64,
}
