//! Object record decoding.
//!
//! Works over one object region: the whole file for AC1014/AC1015 (the map
//! stores absolute offsets) or the decompressed `AcDb:AcDbObjects` section
//! for R2004+. Every record is framed as:
//!
//! ```text
//! MS size | [MC handle-stream bit size (R2010+)] | body ... | CRC16
//! ```
//!
//! The body starts with the object type code; entity bodies carry the
//! common entity data, the type-specific payload, and a trailing handle
//! stream whose position is given by an in-body RL (R13-R2007) or derived
//! from the MC field (R2010+). R2007+ adds a reverse-addressed string
//! stream just before the handle stream.

pub mod common;
pub mod entities;
pub mod tables;

use crate::classes::ClassTable;
use crate::entities::{EntityRecord, UnknownEntity};
use crate::error::{DwgError, Result};
use crate::tables::LayerRecord;
use crate::types::{DwgVersion, VersionFlags};

use super::bit_reader::BitReader;
use super::crc::{crc, CRC_SEED};
use super::object_type::{ObjectClass, ObjectType, CLASS_CODE_FENCE};

/// Enriched entry of the object header index.
#[derive(Debug, Clone)]
pub struct ObjectHeader {
    pub handle: u64,
    /// Byte offset of the record within the object region.
    pub offset: u64,
    /// Body size in bytes (excluding framing and CRC).
    pub size: u32,
    pub type_code: u16,
    pub type_name: String,
    pub class: ObjectClass,
    /// False when the record failed its CRC; kept for diagnostics.
    pub valid: bool,
}

/// An extracted raw object record: the body bytes minus framing and CRC.
#[derive(Debug, Clone)]
pub struct RawObject {
    pub handle: u64,
    pub offset: u64,
    pub size: u32,
    pub type_code: u16,
    pub data: Vec<u8>,
}

impl RawObject {
    /// Declared length of the body bit stream.
    pub fn bit_len(&self) -> u64 {
        self.size as u64 * 8
    }
}

/// Record framing resolved from the preamble.
#[derive(Debug, Clone, Copy)]
struct Frame {
    size: u32,
    /// Byte offset of the body within the object region.
    body_start: u64,
    /// Bit size of the trailing handle stream (R2010+ only).
    handle_stream_bits: Option<u64>,
}

/// The three sub-readers of one object record.
pub struct StreamSet<'a> {
    pub object: BitReader<'a>,
    pub text: BitReader<'a>,
    pub handles: BitReader<'a>,
    /// Absolute bit position of the body start.
    pub object_initial_pos: u64,
    /// Handle of the object being read; relative handle codes resolve
    /// against it.
    pub current_handle: u64,
    /// Whether text reads route to the dedicated string stream.
    pub has_text_stream: bool,
}

impl<'a> StreamSet<'a> {
    /// Read a handle reference from the handle stream, resolving relative
    /// codes against the current object.
    pub fn handle_ref(&mut self) -> Result<u64> {
        self.handles.handle_reference_resolved(self.current_handle)
    }

    /// Read variable text from the string stream (R2007+) or inline.
    pub fn read_text(&mut self) -> Result<String> {
        if self.has_text_stream {
            self.text.read_variable_text()
        } else {
            self.object.read_variable_text()
        }
    }
}

/// Decoder for object records within one object region.
pub struct ObjectDecoder<'a> {
    version: DwgVersion,
    flags: VersionFlags,
    data: &'a [u8],
    classes: &'a ClassTable,
}

impl<'a> ObjectDecoder<'a> {
    pub fn new(version: DwgVersion, data: &'a [u8], classes: &'a ClassTable) -> Self {
        Self {
            version,
            flags: version.flags(),
            data,
            classes,
        }
    }

    pub fn version(&self) -> DwgVersion {
        self.version
    }

    pub(crate) fn flags(&self) -> &VersionFlags {
        &self.flags
    }

    // ------------------------------------------------------------------
    // Framing
    // ------------------------------------------------------------------

    fn frame(&self, offset: u64) -> Result<Frame> {
        if offset as usize >= self.data.len() {
            return Err(DwgError::MalformedRecord(format!(
                "record offset {offset:#X} beyond object region"
            )));
        }

        let mut reader = BitReader::new(self.data, self.version);
        reader.set_position(offset);

        let size = reader.read_modular_short()?;
        if size <= 0 {
            return Err(DwgError::MalformedRecord("record size is zero".into()));
        }
        let size = size as u32;

        let handle_stream_bits = if self.flags.r2010_plus {
            Some(reader.read_modular_char()?)
        } else {
            None
        };

        let body_start = reader.position();
        let body_end = body_start
            .checked_add(size as u64)
            .filter(|&e| e as usize + 2 <= self.data.len())
            .ok_or_else(|| {
                DwgError::MalformedRecord(format!(
                    "record at {offset:#X} extends beyond object region"
                ))
            })?;

        if let Some(bits) = handle_stream_bits {
            if bits > size as u64 * 8 {
                return Err(DwgError::MalformedRecord(
                    "handle stream larger than record body".into(),
                ));
            }
        }

        // CRC16 over the framing and body, stored little-endian after the body.
        let stored = u16::from_le_bytes([
            self.data[body_end as usize],
            self.data[body_end as usize + 1],
        ]);
        let computed = crc(CRC_SEED, &self.data[offset as usize..body_end as usize]);
        if stored != computed {
            return Err(DwgError::CrcMismatch {
                offset: body_end,
                expected: stored,
                actual: computed,
            });
        }

        Ok(Frame {
            size,
            body_start,
            handle_stream_bits,
        })
    }

    fn open_streams(&self, frame: Frame) -> Result<(ObjectType, u16, StreamSet<'a>)> {
        let body_bits = frame.body_start * 8;

        let mut object = BitReader::new(self.data, self.version);
        object.set_position_in_bits(body_bits)?;
        let (object_type, raw_type) = object.read_object_type()?;

        let mut handles = BitReader::new(self.data, self.version);
        let mut text = BitReader::new(self.data, self.version);
        let mut has_text_stream = false;

        if let Some(handle_bits) = frame.handle_stream_bits {
            if handle_bits > frame.size as u64 * 8 {
                return Err(DwgError::MalformedRecord(
                    "handle stream larger than record body".into(),
                ));
            }
            let handle_offset = body_bits + frame.size as u64 * 8 - handle_bits;
            handles.set_position_in_bits(handle_offset)?;
            text.set_position_by_flag(handle_offset - 1)?;
            has_text_stream = !text.string_stream_absent();
        }

        Ok((
            object_type,
            raw_type,
            StreamSet {
                object,
                text,
                handles,
                object_initial_pos: body_bits,
                current_handle: 0,
                has_text_stream,
            },
        ))
    }

    // ------------------------------------------------------------------
    // Type resolution
    // ------------------------------------------------------------------

    /// Resolve a raw type code to (name, class). Codes below the fence are
    /// fixed by the format; the rest resolve through the class table.
    pub fn resolve_type(&self, raw_type: u16) -> (String, ObjectClass) {
        if raw_type < CLASS_CODE_FENCE {
            let object_type = ObjectType::from_raw(raw_type);
            if object_type == ObjectType::Unlisted {
                return (format!("UNKNOWN_{raw_type:#X}"), ObjectClass::Object);
            }
            return (
                object_type.type_name().to_string(),
                object_type.object_class(),
            );
        }
        match self.classes.get(raw_type) {
            Some(class) => {
                let object_class = if class.is_entity() {
                    ObjectClass::Entity
                } else {
                    ObjectClass::Object
                };
                (class.dxf_name.to_ascii_uppercase(), object_class)
            }
            None => (format!("UNKNOWN_{raw_type:#X}"), ObjectClass::Object),
        }
    }

    // ------------------------------------------------------------------
    // Public record operations
    // ------------------------------------------------------------------

    /// Read the record preamble into an object header index entry.
    ///
    /// CRC failures yield a header with `valid == false` rather than an
    /// error; unreadable preambles propagate.
    pub fn read_header(&self, handle: u64, offset: u64) -> Result<ObjectHeader> {
        let (frame, valid) = match self.frame(offset) {
            Ok(frame) => (frame, true),
            Err(DwgError::CrcMismatch { .. }) => (self.frame_unchecked(offset)?, false),
            Err(err) => return Err(err),
        };
        let (_, raw_type, _) = self.open_streams(frame)?;
        let (type_name, class) = self.resolve_type(raw_type);
        Ok(ObjectHeader {
            handle,
            offset,
            size: frame.size,
            type_code: raw_type,
            type_name,
            class,
            valid,
        })
    }

    /// Record framing without the CRC check, for diagnostic headers.
    fn frame_unchecked(&self, offset: u64) -> Result<Frame> {
        let mut reader = BitReader::new(self.data, self.version);
        reader.set_position(offset);
        let size = reader.read_modular_short()?;
        if size <= 0 {
            return Err(DwgError::MalformedRecord("record size is zero".into()));
        }
        let handle_stream_bits = if self.flags.r2010_plus {
            Some(reader.read_modular_char()?)
        } else {
            None
        };
        Ok(Frame {
            size: size as u32,
            body_start: reader.position(),
            handle_stream_bits,
        })
    }

    /// Extract the raw record for a handle, validating its CRC.
    pub fn read_raw(&self, handle: u64, offset: u64) -> Result<RawObject> {
        let frame = self.frame(offset)?;
        let (_, raw_type, _) = self.open_streams(frame)?;
        let body_start = frame.body_start as usize;
        let body_end = body_start + frame.size as usize;
        Ok(RawObject {
            handle,
            offset,
            size: frame.size,
            type_code: raw_type,
            data: self.data[body_start..body_end].to_vec(),
        })
    }

    /// Decode a record into a typed entity.
    pub fn decode(&self, handle: u64, offset: u64) -> Result<EntityRecord> {
        let frame = self.frame(offset)?;
        let (object_type, raw_type, mut streams) = self.open_streams(frame)?;

        use ObjectType::*;
        match object_type {
            Line => self.read_line(handle, &mut streams),
            Arc => self.read_arc(handle, &mut streams),
            Circle => self.read_circle(handle, &mut streams),
            Point => self.read_point(handle, &mut streams),
            Ellipse => self.read_ellipse(handle, &mut streams),
            LwPolyline => self.read_lwpolyline(handle, &mut streams),
            Text => self.read_text_entity(handle, &mut streams),
            MText => self.read_mtext(handle, &mut streams),
            Insert => self.read_insert(handle, &mut streams, false),
            Minsert => self.read_insert(handle, &mut streams, true),
            Ray => self.read_ray(handle, &mut streams),
            Xline => self.read_xline(handle, &mut streams),
            Solid => self.read_solid(handle, &mut streams, false),
            Trace => self.read_solid(handle, &mut streams, true),
            Face3D => self.read_3dface(handle, &mut streams),
            DimOrdinate | DimLinear | DimAligned | DimAng3Pt | DimAng2Ln | DimRadius
            | DimDiameter => self.read_dimension(handle, object_type, &mut streams),
            _ => {
                let (type_name, _) = self.resolve_type(raw_type);
                Err(DwgError::UnsupportedType(type_name))
            }
        }
    }

    /// Decode a record, falling back to [`EntityRecord::Unknown`] with the
    /// raw payload when the type has no registered decoder.
    pub fn decode_any(&self, handle: u64, offset: u64) -> Result<EntityRecord> {
        match self.decode(handle, offset) {
            Err(DwgError::UnsupportedType(type_name)) => {
                let raw = self.read_raw(handle, offset)?;
                let frame = self.frame(offset)?;
                let (_, raw_type, mut streams) = self.open_streams(frame)?;
                let (_, class) = self.resolve_type(raw_type);
                let common = self
                    .read_unknown_common(&mut streams, class, handle)
                    .unwrap_or_default();
                Ok(EntityRecord::Unknown(UnknownEntity {
                    common,
                    type_name,
                    data: raw.data,
                }))
            }
            other => other,
        }
    }

    /// Decode a LAYER object; `None` when the record is not a LAYER.
    pub fn decode_layer(&self, handle: u64, offset: u64) -> Result<Option<LayerRecord>> {
        let frame = self.frame(offset)?;
        let (object_type, _, mut streams) = self.open_streams(frame)?;
        if object_type != ObjectType::Layer {
            return Ok(None);
        }
        self.read_layer(handle, &mut streams).map(Some)
    }

    /// Ordered handle-stream references of a record.
    pub fn handle_refs(&self, handle: u64, offset: u64) -> Result<Vec<u64>> {
        match self.decode(handle, offset) {
            Ok(record) => Ok(record.common().refs.clone()),
            Err(DwgError::UnsupportedType(_)) => {
                let frame = self.frame(offset)?;
                let (_, raw_type, mut streams) = self.open_streams(frame)?;
                let (_, class) = self.resolve_type(raw_type);
                let common = self.read_unknown_common(&mut streams, class, handle)?;
                Ok(common.refs)
            }
            Err(err) => Err(err),
        }
    }
}
