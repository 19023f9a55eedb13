//! Decoded table-entry records.
//!
//! Only the LAYER table is decoded: the style resolver needs layer colors.
//! Other table entries pass through the catalog as undecodable objects.

pub mod layer;

pub use layer::LayerRecord;
