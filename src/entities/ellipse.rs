//! ELLIPSE entity record.

use crate::types::Vector3;

use super::EntityCommon;

/// An ellipse or elliptical arc. Start and end values are curve
/// parameters in radians at both the decoder and presentation layers.
#[derive(Debug, Clone)]
pub struct Ellipse {
    pub common: EntityCommon,
    pub center: Vector3,
    /// Endpoint of the major axis, relative to the center.
    pub major_axis: Vector3,
    pub extrusion: Vector3,
    /// Ratio of the minor axis to the major axis.
    pub axis_ratio: f64,
    pub start_parameter: f64,
    pub end_parameter: f64,
}
