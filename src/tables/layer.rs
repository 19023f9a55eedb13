//! LAYER table entry record.

use crate::types::{Color, Handle};

/// One decoded LAYER object. The style resolver indexes these by handle to
/// answer entity color lookups.
#[derive(Debug, Clone)]
pub struct LayerRecord {
    pub handle: Handle,
    pub name: String,
    pub color: Color,
}
