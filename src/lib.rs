//! # dwgscan
//!
//! A read-only decoder for the proprietary binary DWG drawing format,
//! covering release codes AC1014 (R14) through AC1032 (R2018).
//!
//! The file's contents are exposed as a structured, lazily decoded
//! catalog of drawing entities keyed by handle:
//!
//! ```rust,no_run
//! use dwgscan::DwgCatalog;
//!
//! let catalog = DwgCatalog::open("drawing.dwg")?;
//! println!("version: {}", catalog.version());
//!
//! for line in catalog.lines(None) {
//!     println!("{} -> {}", line.start, line.end);
//! }
//!
//! for record in catalog.query(Some(&["ARC", "CIRCLE"]), None) {
//!     println!("{}: {:?}", record.type_name(), record.handle());
//! }
//! # Ok::<(), dwgscan::DwgError>(())
//! ```
//!
//! ## Decoding pipeline
//!
//! Opening a file runs the dependency-ordered stages once:
//!
//! 1. version probe on the 6-byte signature;
//! 2. section locator: flat table before R2004, paged (compressed,
//!    encrypted) container after;
//! 3. object map: handle to record offset;
//! 4. object header index: per-record size, type code, and CRC state;
//! 5. class table for type codes at or above 500.
//!
//! Typed decoding then happens on demand: per-object bit streams are
//! extracted, CRC-checked, and decoded by type-specific readers into the
//! closed [`entities::EntityRecord`] union. Record-local failures never
//! poison the catalog; they are reported through
//! [`DwgCatalog::notifications`].
//!
//! Angles decode as radians throughout; converting ARC angles to degrees
//! is a presentation concern. Writing DWG files is out of scope.

pub mod catalog;
pub mod classes;
pub mod entities;
pub mod error;
pub mod io;
pub mod notification;
pub mod tables;
pub mod types;

pub use catalog::{CatalogConfig, DwgCatalog, LayerColor, StyleRecord};
pub use entities::EntityRecord;
pub use error::{DwgError, Result};
pub use io::dwg::object_decoder::{ObjectHeader, RawObject};
pub use io::dwg::object_map::ObjectMapEntry;
pub use notification::{Notification, Severity};
pub use types::{Color, DwgVersion, Handle, Vector2, Vector3};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
