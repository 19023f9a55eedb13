//! LWPOLYLINE entity record.

use bitflags::bitflags;

use crate::types::{Vector2, Vector3};

use super::EntityCommon;

bitflags! {
    /// LWPOLYLINE flag word. Bit 9 (0x200) marks a closed polyline;
    /// closedness is a flag, never a duplicated vertex.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LwPolylineFlags: u16 {
        const HAS_EXTRUSION = 0x0001;
        const HAS_THICKNESS = 0x0002;
        const HAS_CONSTANT_WIDTH = 0x0004;
        const HAS_ELEVATION = 0x0008;
        const HAS_BULGES = 0x0010;
        const HAS_WIDTHS = 0x0020;
        const CLOSED = 0x0200;
        const HAS_VERTEX_IDS = 0x0400;
    }
}

/// A lightweight 2D polyline.
///
/// When `bulges` is non-empty it has one value per vertex (the tangent of
/// a quarter of the arc angle to the next vertex; zero means straight).
/// When `widths` is non-empty it has one (start, end) pair per vertex.
#[derive(Debug, Clone)]
pub struct LwPolyline {
    pub common: EntityCommon,
    pub flags: LwPolylineFlags,
    pub points: Vec<Vector2>,
    pub bulges: Vec<f64>,
    pub widths: Vec<(f64, f64)>,
    pub constant_width: Option<f64>,
    pub elevation: f64,
    pub thickness: f64,
    pub extrusion: Vector3,
}

impl LwPolyline {
    pub fn is_closed(&self) -> bool {
        self.flags.contains(LwPolylineFlags::CLOSED)
    }
}
