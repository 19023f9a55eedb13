//! Decoded entity records.
//!
//! Entity attributes are modeled as a closed tagged union over the
//! supported types, one schema per variant, with an `Unknown` fallback
//! that preserves the raw payload of types outside the decoder table.
//! Cross-references (layer, style, block) are plain handles resolved
//! through the catalog, never owned pointers.

pub mod arc;
pub mod circle;
pub mod dimension;
pub mod ellipse;
pub mod face3d;
pub mod insert;
pub mod line;
pub mod lwpolyline;
pub mod mtext;
pub mod point;
pub mod ray;
pub mod solid;
pub mod text;
pub mod xline;

pub use arc::Arc;
pub use circle::Circle;
pub use dimension::{Dimension, DimensionSubtype};
pub use ellipse::Ellipse;
pub use face3d::Face3D;
pub use insert::Insert;
pub use line::Line;
pub use lwpolyline::{LwPolyline, LwPolylineFlags};
pub use mtext::MText;
pub use point::Point;
pub use ray::Ray;
pub use solid::Solid;
pub use text::Text;
pub use xline::XLine;

use crate::error::{DwgError, Result};
use crate::types::{Color, Handle, Vector3};

/// Fields shared by every entity record, lifted from the common entity
/// data block at the head of each record.
#[derive(Debug, Clone, Default)]
pub struct EntityCommon {
    pub handle: Handle,
    pub color: Color,
    /// Handle of the owning layer; 0 when the reference failed to resolve.
    pub layer_handle: u64,
    pub linetype_handle: u64,
    pub invisible: bool,
    /// Raw line weight byte (R2000+; 0 before).
    pub line_weight: u8,
    /// Every handle read from the record's handle stream, in stream order.
    pub refs: Vec<u64>,
}

/// A record whose type has no registered decoder; the raw payload is
/// retained for round-trip fidelity.
#[derive(Debug, Clone)]
pub struct UnknownEntity {
    pub common: EntityCommon,
    pub type_name: String,
    pub data: Vec<u8>,
}

/// One decoded entity, keyed by type.
///
/// TRACE reuses the SOLID schema; the variants stay distinct so a record
/// always reports the type its header resolved to.
#[derive(Debug, Clone)]
pub enum EntityRecord {
    Line(Line),
    Arc(Arc),
    Circle(Circle),
    Point(Point),
    Ellipse(Ellipse),
    LwPolyline(LwPolyline),
    Text(Text),
    MText(MText),
    Dimension(Dimension),
    Insert(Insert),
    Ray(Ray),
    XLine(XLine),
    Solid(Solid),
    Trace(Solid),
    Face3D(Face3D),
    Unknown(UnknownEntity),
}

impl EntityRecord {
    /// The query-facing type name. All seven dimension subtypes present as
    /// `"DIMENSION"`.
    pub fn type_name(&self) -> &str {
        match self {
            EntityRecord::Line(_) => "LINE",
            EntityRecord::Arc(_) => "ARC",
            EntityRecord::Circle(_) => "CIRCLE",
            EntityRecord::Point(_) => "POINT",
            EntityRecord::Ellipse(_) => "ELLIPSE",
            EntityRecord::LwPolyline(_) => "LWPOLYLINE",
            EntityRecord::Text(_) => "TEXT",
            EntityRecord::MText(_) => "MTEXT",
            EntityRecord::Dimension(_) => "DIMENSION",
            EntityRecord::Insert(_) => "INSERT",
            EntityRecord::Ray(_) => "RAY",
            EntityRecord::XLine(_) => "XLINE",
            EntityRecord::Solid(_) => "SOLID",
            EntityRecord::Trace(_) => "TRACE",
            EntityRecord::Face3D(_) => "3DFACE",
            EntityRecord::Unknown(u) => &u.type_name,
        }
    }

    pub fn common(&self) -> &EntityCommon {
        match self {
            EntityRecord::Line(e) => &e.common,
            EntityRecord::Arc(e) => &e.common,
            EntityRecord::Circle(e) => &e.common,
            EntityRecord::Point(e) => &e.common,
            EntityRecord::Ellipse(e) => &e.common,
            EntityRecord::LwPolyline(e) => &e.common,
            EntityRecord::Text(e) => &e.common,
            EntityRecord::MText(e) => &e.common,
            EntityRecord::Dimension(e) => &e.common,
            EntityRecord::Insert(e) => &e.common,
            EntityRecord::Ray(e) => &e.common,
            EntityRecord::XLine(e) => &e.common,
            EntityRecord::Solid(e) | EntityRecord::Trace(e) => &e.common,
            EntityRecord::Face3D(e) => &e.common,
            EntityRecord::Unknown(e) => &e.common,
        }
    }

    pub fn handle(&self) -> Handle {
        self.common().handle
    }

    /// Project the record onto an ordered list of 3D points.
    ///
    /// LINE yields its endpoints; LWPOLYLINE its vertices at z = 0; POINT
    /// its location; TEXT and MTEXT their insertion point; DIMENSION its
    /// two definition points when both are present, otherwise the text
    /// midpoint; RAY and XLINE the base point offset by the unit direction
    /// (backwards too for XLINE). Everything else has no projection.
    pub fn to_points(&self) -> Result<Vec<Vector3>> {
        match self {
            EntityRecord::Line(line) => Ok(vec![line.start, line.end]),
            EntityRecord::LwPolyline(poly) => Ok(poly
                .points
                .iter()
                .map(|p| Vector3::new(p.x, p.y, 0.0))
                .collect()),
            EntityRecord::Point(point) => Ok(vec![point.location]),
            EntityRecord::Text(text) => Ok(vec![text.insertion_point]),
            EntityRecord::MText(mtext) => Ok(vec![mtext.insertion_point]),
            EntityRecord::Dimension(dim) => {
                match (dim.defpoint2, dim.defpoint3) {
                    (Some(a), Some(b)) => Ok(vec![a, b]),
                    _ => Ok(vec![dim.text_midpoint]),
                }
            }
            EntityRecord::Ray(ray) => Ok(vec![ray.base_point, ray.base_point + ray.direction]),
            EntityRecord::XLine(xline) => Ok(vec![
                xline.base_point - xline.direction,
                xline.base_point + xline.direction,
            ]),
            other => Err(DwgError::NoPointProjection(other.type_name().to_string())),
        }
    }
}

/// Normalize a query filter name: dimension subtype names collapse onto
/// `"DIMENSION"`, everything else is upper-cased verbatim.
pub fn normalize_type_name(name: &str) -> String {
    let upper = name.to_ascii_uppercase();
    match upper.as_str() {
        "DIM_LINEAR" | "DIM_ALIGNED" | "DIM_RADIUS" | "DIM_DIAMETER" | "DIM_ORDINATE"
        | "DIM_ANG3PT" | "DIM_ANG2LN" => "DIMENSION".to_string(),
        _ => upper,
    }
}
