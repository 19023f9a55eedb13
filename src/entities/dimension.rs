//! DIMENSION entity record.
//!
//! All seven dimension subtypes share a common data block and differ in
//! their trailing definition points; the subtype is tagged by the record's
//! type code. Angles are in radians.

use crate::types::Vector3;

use super::EntityCommon;

/// The seven dimension subtype discriminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionSubtype {
    Ordinate,
    Linear,
    Aligned,
    Angular3Pt,
    Angular2Ln,
    Radius,
    Diameter,
}

#[derive(Debug, Clone)]
pub struct Dimension {
    pub common: EntityCommon,
    pub subtype: DimensionSubtype,
    pub extrusion: Vector3,
    /// Middle point of the dimension text (z carries the elevation).
    pub text_midpoint: Vector3,
    pub insertion_point: Vector3,
    pub flags: u8,
    /// User-supplied text override, when present.
    pub user_text: Option<String>,
    pub text_rotation: f64,
    pub horizontal_direction: f64,
    pub insert_scale: Vector3,
    pub insert_rotation: f64,
    /// Measured value (R2000+; 0 before).
    pub actual_measurement: f64,
    pub attachment: i16,
    pub line_spacing_style: i16,
    pub line_spacing_factor: f64,
    /// Primary definition point (DXF group 10).
    pub definition_point: Vector3,
    /// First extension definition point (group 13), when the subtype has one.
    pub defpoint2: Option<Vector3>,
    /// Second extension definition point (group 14), when the subtype has one.
    pub defpoint3: Option<Vector3>,
    /// Arc/vertex definition point (group 15), for angular and radial kinds.
    pub defpoint4: Option<Vector3>,
    /// Dimension-arc definition point (group 16), for two-line angular.
    pub arc_point: Option<Vector3>,
    /// Rotation of a linear dimension, in radians.
    pub rotation: Option<f64>,
    /// Extension-line rotation for linear/aligned kinds, in radians.
    pub ext_line_rotation: Option<f64>,
    pub leader_length: Option<f64>,
    /// For ordinate dimensions: measuring along X rather than Y.
    pub ordinate_type_x: Option<bool>,
    pub dimstyle_handle: u64,
    pub block_handle: u64,
}
