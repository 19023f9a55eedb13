//! The public catalog: a DWG file presented as a flat, queryable
//! collection of entities keyed by handle.
//!
//! Opening a file runs the dependency-ordered stages (version probe,
//! section locator, object map, class table, object header index) once and
//! keeps their results immutable for the catalog's lifetime. Raw records and typed
//! entities are produced on demand and cached per handle; cache
//! population is idempotent and queries observe object-map order.
//!
//! The catalog is single-threaded by design: caches use interior
//! mutability and are written at most once per key.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::classes::ClassTable;
use crate::entities::{normalize_type_name, EntityRecord};
use crate::entities::{Arc, Circle, Insert, Line, LwPolyline, Point};
use crate::error::{DwgError, Result};
use crate::io::dwg::locator::{SectionDirectory, SectionLocator};
use crate::io::dwg::object_decoder::{ObjectDecoder, ObjectHeader, RawObject};
use crate::io::dwg::object_map::{parse_object_map, ObjectMap, ObjectMapEntry};
use crate::io::dwg::object_type::ObjectClass;
use crate::io::dwg::{classes_reader, constants::section_names};
use crate::notification::Notification;
use crate::tables::LayerRecord;
use crate::types::{DwgVersion, Handle, Vector3};

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Capture record-local failures as notifications instead of failing
    /// the open. When false, the first record with a bad CRC or an
    /// unreadable preamble aborts `open`.
    pub failsafe: bool,
    /// Fail the object map on out-of-range deltas instead of skipping them.
    pub strict: bool,
    /// Cap on object map entries.
    pub max_objects: usize,
    /// Cap on a single decompressed section.
    pub max_section_bytes: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            failsafe: true,
            strict: false,
            max_objects: 10_000_000,
            max_section_bytes: 1 << 31,
        }
    }
}

/// Resolved style of one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleRecord {
    pub handle: Handle,
    pub color_index: Option<u8>,
    pub true_color: Option<u32>,
    /// 0 when the entity's layer reference did not resolve.
    pub layer_handle: u64,
}

/// Color of one LAYER object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerColor {
    pub handle: Handle,
    pub color_index: Option<u8>,
    pub true_color: Option<u32>,
}

/// A read-only DWG file catalog.
#[derive(Debug)]
pub struct DwgCatalog {
    data: Vec<u8>,
    version: DwgVersion,
    config: CatalogConfig,
    directory: SectionDirectory,
    object_map: ObjectMap,
    classes: ClassTable,
    /// Decompressed `AcDb:AcDbObjects` for R2004+; pre-R2004 records sit in
    /// the raw file at absolute offsets.
    objects_section: Option<Vec<u8>>,
    headers: Vec<ObjectHeader>,
    raw_cache: RefCell<HashMap<u64, RawObject>>,
    entity_cache: RefCell<HashMap<u64, EntityRecord>>,
    layer_index: RefCell<Option<LayerIndex>>,
    notifications: RefCell<Vec<Notification>>,
}

#[derive(Debug, Default)]
struct LayerIndex {
    layers: Vec<LayerRecord>,
    by_handle: HashMap<u64, usize>,
}

impl DwgCatalog {
    /// Open a DWG file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Open a DWG file already read into memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_config(data, CatalogConfig::default())
    }

    pub fn from_bytes_with_config(data: Vec<u8>, config: CatalogConfig) -> Result<Self> {
        let version = DwgVersion::probe(&data)?;
        let directory = SectionDirectory::parse(&data, version)?;

        let section = |name: &str| -> Result<Option<Vec<u8>>> {
            let buffer = directory.section_data(&data, name)?;
            if let Some(buffer) = &buffer {
                if buffer.len() as u64 > config.max_section_bytes {
                    return Err(DwgError::InvalidHeader(format!(
                        "section '{name}' exceeds the configured size cap"
                    )));
                }
            }
            Ok(buffer)
        };

        let handles_data = section(section_names::HANDLES)?
            .ok_or_else(|| DwgError::MissingSection(section_names::HANDLES.into()))?;
        let (object_map, mut notifications) =
            parse_object_map(&handles_data, version, config.max_objects, config.strict)?;

        let classes = match section(section_names::CLASSES)? {
            Some(bytes) if !bytes.is_empty() => {
                classes_reader::parse_classes(&bytes, version, 0)?
            }
            _ => ClassTable::new(),
        };

        let objects_section = if version >= DwgVersion::AC1018 {
            Some(
                section(section_names::ACDB_OBJECTS)?
                    .ok_or_else(|| DwgError::MissingSection(section_names::ACDB_OBJECTS.into()))?,
            )
        } else {
            None
        };

        let mut catalog = Self {
            data,
            version,
            config,
            directory,
            object_map,
            classes,
            objects_section,
            headers: Vec::new(),
            raw_cache: RefCell::new(HashMap::new()),
            entity_cache: RefCell::new(HashMap::new()),
            layer_index: RefCell::new(None),
            notifications: RefCell::new(Vec::new()),
        };
        catalog.headers = catalog.build_headers(&mut notifications)?;
        catalog.notifications.get_mut().extend(notifications);
        Ok(catalog)
    }

    fn object_region(&self) -> &[u8] {
        match &self.objects_section {
            Some(buffer) => buffer,
            None => &self.data,
        }
    }

    fn decoder(&self) -> ObjectDecoder<'_> {
        ObjectDecoder::new(self.version, self.object_region(), &self.classes)
    }

    /// Build the object header index. In failsafe mode invalid entries are
    /// retained and reported through the diagnostic channel; otherwise the
    /// first record-local failure aborts the open.
    fn build_headers(
        &self,
        notifications: &mut Vec<Notification>,
    ) -> Result<Vec<ObjectHeader>> {
        let decoder = self.decoder();
        let mut headers = Vec::with_capacity(self.object_map.len());
        for entry in self.object_map.entries() {
            match decoder.read_header(entry.handle, entry.offset) {
                Ok(header) => {
                    if !header.valid {
                        if !self.config.failsafe {
                            // Re-run the extraction to surface the exact error.
                            return match decoder.read_raw(entry.handle, entry.offset) {
                                Err(err) => Err(err),
                                Ok(_) => Err(DwgError::MalformedRecord(format!(
                                    "record for handle {:#X} failed validation",
                                    entry.handle
                                ))),
                            };
                        }
                        notifications.push(Notification::record_error(
                            entry.handle,
                            entry.offset,
                            Some(header.type_code),
                            "record failed its CRC",
                        ));
                    }
                    headers.push(header);
                }
                Err(err) => {
                    if !self.config.failsafe {
                        return Err(err);
                    }
                    notifications.push(Notification::record_error(
                        entry.handle,
                        entry.offset,
                        None,
                        format!("unreadable record preamble: {err}"),
                    ));
                    headers.push(ObjectHeader {
                        handle: entry.handle,
                        offset: entry.offset,
                        size: 0,
                        type_code: 0,
                        type_name: "UNREADABLE".into(),
                        class: ObjectClass::Object,
                        valid: false,
                    });
                }
            }
        }
        Ok(headers)
    }

    // ------------------------------------------------------------------
    // Raw query surface
    // ------------------------------------------------------------------

    pub fn version(&self) -> DwgVersion {
        self.version
    }

    /// Section locator entries: (name, offset, size, flags).
    pub fn sections(&self) -> &[SectionLocator] {
        self.directory.sections()
    }

    /// Object map entries in map order.
    pub fn object_map(&self) -> &[ObjectMapEntry] {
        self.object_map.entries()
    }

    /// The enriched object header index, in map order. Entries that failed
    /// their CRC are retained with `valid == false`.
    pub fn object_headers(&self) -> &[ObjectHeader] {
        &self.headers
    }

    /// Count of valid entity-class records.
    pub fn total_entities(&self) -> usize {
        self.headers
            .iter()
            .filter(|h| h.valid && h.class == ObjectClass::Entity)
            .count()
    }

    /// Diagnostic side channel: record-local failures and warnings.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }

    /// Extract the raw record for a handle, validating its CRC.
    pub fn read_object(&self, handle: u64) -> Result<RawObject> {
        if let Some(raw) = self.raw_cache.borrow().get(&handle) {
            return Ok(raw.clone());
        }
        let entry = self
            .object_map
            .get(handle)
            .ok_or(DwgError::UnknownHandle(handle))?;
        let raw = self.decoder().read_raw(handle, entry.offset)?;
        self.raw_cache.borrow_mut().insert(handle, raw.clone());
        Ok(raw)
    }

    /// Ordered handle-stream references of one object.
    pub fn handle_refs(&self, handle: u64) -> Result<Vec<u64>> {
        let entry = self
            .object_map
            .get(handle)
            .ok_or(DwgError::UnknownHandle(handle))?;
        self.decoder().handle_refs(handle, entry.offset)
    }

    // ------------------------------------------------------------------
    // Typed decode
    // ------------------------------------------------------------------

    /// Decode one handle into a typed entity record.
    pub fn decode(&self, handle: u64) -> Result<EntityRecord> {
        if let Some(record) = self.entity_cache.borrow().get(&handle) {
            return Ok(record.clone());
        }
        let entry = self
            .object_map
            .get(handle)
            .ok_or(DwgError::UnknownHandle(handle))?;
        let record = self.decoder().decode(handle, entry.offset)?;
        self.entity_cache
            .borrow_mut()
            .insert(handle, record.clone());
        Ok(record)
    }

    /// Like [`DwgCatalog::decode`], but an undecodable type yields
    /// [`EntityRecord::Unknown`] with the raw payload.
    pub fn decode_any(&self, handle: u64) -> Result<EntityRecord> {
        let entry = self
            .object_map
            .get(handle)
            .ok_or(DwgError::UnknownHandle(handle))?;
        self.decoder().decode_any(handle, entry.offset)
    }

    /// Project an entity record onto 3D points (see
    /// [`EntityRecord::to_points`]).
    pub fn to_points(&self, record: &EntityRecord) -> Result<Vec<Vector3>> {
        record.to_points()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Query decoded entities, optionally filtered by type names and
    /// capped at `limit` records.
    ///
    /// Iteration is in object-map order and deterministic across repeated
    /// calls. Records that fail to decode are skipped and reported through
    /// the diagnostic channel; an absent filter means "all supported
    /// types".
    pub fn query(&self, types: Option<&[&str]>, limit: Option<usize>) -> Vec<EntityRecord> {
        let filter: Option<HashSet<String>> =
            types.map(|names| names.iter().map(|n| normalize_type_name(n)).collect());
        let cap = limit.unwrap_or(usize::MAX);
        let mut records = Vec::new();

        for header in &self.headers {
            if records.len() >= cap {
                break;
            }
            if !header.valid || header.class != ObjectClass::Entity {
                continue;
            }
            if let Some(filter) = &filter {
                if !filter.contains(&normalize_type_name(&header.type_name)) {
                    continue;
                }
            }
            match self.decode(header.handle) {
                Ok(record) => records.push(record),
                Err(DwgError::UnsupportedType(_)) => continue,
                Err(err) => {
                    self.notifications.borrow_mut().push(Notification::record_error(
                        header.handle,
                        header.offset,
                        Some(header.type_code),
                        format!("decode failed: {err}"),
                    ));
                }
            }
        }
        records
    }

    /// All decoded LINE records, in map order.
    pub fn lines(&self, limit: Option<usize>) -> Vec<Line> {
        self.query(Some(&["LINE"]), limit)
            .into_iter()
            .filter_map(|r| match r {
                EntityRecord::Line(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn arcs(&self, limit: Option<usize>) -> Vec<Arc> {
        self.query(Some(&["ARC"]), limit)
            .into_iter()
            .filter_map(|r| match r {
                EntityRecord::Arc(arc) => Some(arc),
                _ => None,
            })
            .collect()
    }

    pub fn circles(&self, limit: Option<usize>) -> Vec<Circle> {
        self.query(Some(&["CIRCLE"]), limit)
            .into_iter()
            .filter_map(|r| match r {
                EntityRecord::Circle(circle) => Some(circle),
                _ => None,
            })
            .collect()
    }

    pub fn points(&self, limit: Option<usize>) -> Vec<Point> {
        self.query(Some(&["POINT"]), limit)
            .into_iter()
            .filter_map(|r| match r {
                EntityRecord::Point(point) => Some(point),
                _ => None,
            })
            .collect()
    }

    pub fn lwpolylines(&self, limit: Option<usize>) -> Vec<LwPolyline> {
        self.query(Some(&["LWPOLYLINE"]), limit)
            .into_iter()
            .filter_map(|r| match r {
                EntityRecord::LwPolyline(poly) => Some(poly),
                _ => None,
            })
            .collect()
    }

    pub fn inserts(&self, limit: Option<usize>) -> Vec<Insert> {
        self.query(Some(&["INSERT"]), limit)
            .into_iter()
            .filter_map(|r| match r {
                EntityRecord::Insert(insert) => Some(insert),
                _ => None,
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Style resolution
    // ------------------------------------------------------------------

    fn with_layer_index<T>(&self, f: impl FnOnce(&LayerIndex) -> T) -> T {
        {
            let borrowed = self.layer_index.borrow();
            if let Some(index) = borrowed.as_ref() {
                return f(index);
            }
        }

        let decoder = self.decoder();
        let mut index = LayerIndex::default();
        for header in &self.headers {
            if !header.valid || header.type_name != "LAYER" {
                continue;
            }
            match decoder.decode_layer(header.handle, header.offset) {
                Ok(Some(layer)) => {
                    index.by_handle.insert(layer.handle.value(), index.layers.len());
                    index.layers.push(layer);
                }
                Ok(None) => {}
                Err(err) => {
                    self.notifications.borrow_mut().push(Notification::record_error(
                        header.handle,
                        header.offset,
                        Some(header.type_code),
                        format!("layer decode failed: {err}"),
                    ));
                }
            }
        }

        let result = f(&index);
        *self.layer_index.borrow_mut() = Some(index);
        result
    }

    /// Resolve the style of one entity: its color (taken from the layer
    /// when the entity color is ByLayer and the layer resolves) and the
    /// owning layer handle. A missing layer yields handle 0 and the
    /// entity's own color.
    pub fn entity_style(&self, handle: u64) -> Result<StyleRecord> {
        let record = self.decode(handle)?;
        let common = record.common();

        let (layer_handle, color) = self.with_layer_index(|index| {
            match index.by_handle.get(&common.layer_handle) {
                Some(&idx) => {
                    let layer = &index.layers[idx];
                    let color = if common.color.is_by_layer() {
                        layer.color
                    } else {
                        common.color
                    };
                    (common.layer_handle, color)
                }
                None => (0, common.color),
            }
        });

        Ok(StyleRecord {
            handle: Handle::new(handle),
            color_index: color.index(),
            true_color: color.true_color(),
            layer_handle,
        })
    }

    /// Colors of every LAYER object, in map order.
    pub fn layer_colors(&self) -> Vec<LayerColor> {
        self.with_layer_index(|index| {
            index
                .layers
                .iter()
                .map(|layer| LayerColor {
                    handle: layer.handle,
                    color_index: layer.color.index(),
                    true_color: layer.color.true_color(),
                })
                .collect()
        })
    }
}
