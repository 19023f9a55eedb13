//! `AcDb:Handles` (object map) section reader.
//!
//! The object map is the root index of the file: a mapping from object
//! handle to the byte offset of its record. It is stored as a run of
//! pages, each headed by a big-endian u16 size (counting the size field
//! itself) and holding delta-encoded pairs: an unsigned modular char for
//! the handle delta and a signed modular char for the offset delta,
//! accumulating against running values that reset per page. A page of
//! size 2 terminates the map; every page ends with a big-endian CRC.

use std::collections::HashMap;

use crate::error::{DwgError, Result};
use crate::notification::Notification;
use crate::types::DwgVersion;

use super::bit_reader::BitReader;
use super::constants::limits;
use super::crc::{crc, CRC_SEED};

/// One (handle, offset) pair from the object map, in map order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMapEntry {
    pub handle: u64,
    /// Byte offset of the object's record within the object region.
    pub offset: u64,
}

/// The parsed object map: ordered entries plus a by-handle index.
#[derive(Debug, Default)]
pub struct ObjectMap {
    entries: Vec<ObjectMapEntry>,
    by_handle: HashMap<u64, usize>,
}

impl ObjectMap {
    /// Entries in map order. Iteration over the catalog follows this order.
    pub fn entries(&self) -> &[ObjectMapEntry] {
        &self.entries
    }

    pub fn get(&self, handle: u64) -> Option<ObjectMapEntry> {
        self.by_handle.get(&handle).map(|&idx| self.entries[idx])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, entry: ObjectMapEntry) -> bool {
        match self.by_handle.get(&entry.handle) {
            Some(&idx) => {
                // Last definition wins; the entry keeps its original position.
                self.entries[idx] = entry;
                true
            }
            None => {
                self.by_handle.insert(entry.handle, self.entries.len());
                self.entries.push(entry);
                false
            }
        }
    }
}

/// Parse the decompressed `AcDb:Handles` bytes.
///
/// `max_objects` bounds the total entry count against corrupt page sizes.
/// In permissive mode (`strict == false`) a pair that drives the running
/// offset negative is dropped and scanning continues; strict mode fails.
/// Duplicate handles are reported through the returned notifications.
pub fn parse_object_map(
    data: &[u8],
    version: DwgVersion,
    max_objects: usize,
    strict: bool,
) -> Result<(ObjectMap, Vec<Notification>)> {
    let mut reader = BitReader::new(data, version);
    let mut map = ObjectMap::default();
    let mut notifications = Vec::new();

    loop {
        let page_start = reader.position();
        let hi = match reader.read_byte() {
            Ok(b) => b as usize,
            // Padding after the terminator page is tolerated.
            Err(_) => break,
        };
        let lo = reader.read_byte()? as usize;
        let size = (hi << 8) | lo;

        if size == 2 {
            break;
        }
        if size < 2 {
            return Err(DwgError::MalformedRecord(format!(
                "invalid object map page size {size}"
            )));
        }

        let mut payload = size - 2;
        if payload > limits::MAX_MAP_PAGE_SIZE {
            payload = limits::MAX_MAP_PAGE_SIZE;
        }

        let mut last_handle: u64 = 0;
        let mut last_offset: i64 = 0;
        let end = reader.position() + payload as u64;

        while reader.position() < end {
            let handle_delta = reader.read_modular_char()?;
            let offset_delta = reader.read_signed_modular_char()?;

            let next_handle = last_handle.checked_add(handle_delta);
            let next_offset = last_offset.checked_add(offset_delta);
            let (handle, offset) = match (next_handle, next_offset) {
                (Some(h), Some(o)) if o >= 0 => (h, o),
                _ if strict => {
                    return Err(DwgError::MalformedRecord(
                        "object map delta drives handle or offset out of range".into(),
                    ));
                }
                // Corrupted deltas are seen in the wild; drop the pair and
                // keep scanning from the previous running values.
                _ => continue,
            };
            last_handle = handle;
            last_offset = offset;

            if handle_delta == 0 {
                // A zero delta cannot name a new object; skip the pair.
                continue;
            }

            let entry = ObjectMapEntry {
                handle: last_handle,
                offset: last_offset as u64,
            };
            if map.insert(entry) {
                notifications.push(Notification::warning(format!(
                    "duplicate handle {:#X} in object map; later offset kept",
                    last_handle
                )));
            }

            if map.len() > max_objects {
                return Err(DwgError::MalformedRecord(format!(
                    "object count exceeds limit {max_objects}"
                )));
            }
        }

        // Big-endian page CRC over the size field and payload.
        let crc_hi = reader.read_byte()? as u16;
        let crc_lo = reader.read_byte()? as u16;
        let stored = (crc_hi << 8) | crc_lo;
        let page_end = (reader.position() - 2) as usize;
        let computed = crc(CRC_SEED, &data[page_start as usize..page_end]);
        if stored != computed {
            return Err(DwgError::CrcMismatch {
                offset: page_end as u64,
                expected: stored,
                actual: computed,
            });
        }
    }

    Ok((map, notifications))
}
