//! MTEXT entity record.

use crate::types::Vector3;

use super::EntityCommon;

/// A multi-line text entity. The stored value keeps its inline formatting
/// codes; interpreting them is a presentation concern.
#[derive(Debug, Clone)]
pub struct MText {
    pub common: EntityCommon,
    pub value: String,
    pub insertion_point: Vector3,
    pub extrusion: Vector3,
    /// Direction of the text's X axis.
    pub x_axis_direction: Vector3,
    pub rect_width: f64,
    /// Reference rectangle height (R2007+).
    pub rect_height: Option<f64>,
    pub text_height: f64,
    pub attachment: i16,
    pub drawing_direction: i16,
    pub extents_height: f64,
    pub extents_width: f64,
    pub line_spacing_style: i16,
    pub line_spacing_factor: f64,
    pub style_handle: u64,
}
