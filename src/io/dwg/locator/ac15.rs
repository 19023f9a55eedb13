//! Flat section locator for AC1014/AC1015 files.
//!
//! Layout after the 6-byte version tag:
//! - 7 bytes: zeros with the maintenance version at byte 5
//! - i32: preview image address
//! - 2 undocumented bytes
//! - u16: drawing code page
//! - i32: number of locator records
//! - N x (u8 record number, i32 seeker, i32 size)
//! - u16 CRC over everything before it
//! - 16-byte end sentinel

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{DwgError, Result};

use super::super::constants::{section_names, sentinels};
use super::super::crc::{crc, CRC_SEED};
use super::SectionLocator;

#[derive(Debug, Clone)]
pub(super) struct FlatRecord {
    pub number: u8,
    pub seeker: i64,
    pub size: i64,
}

#[derive(Debug)]
pub(super) struct FlatLocator {
    records: Vec<FlatRecord>,
    pub maintenance_version: u8,
    #[allow(dead_code)]
    pub preview_address: i64,
    #[allow(dead_code)]
    pub code_page: u16,
}

impl FlatLocator {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        cursor.set_position(6);

        let mut padding = [0u8; 7];
        std::io::Read::read_exact(&mut cursor, &mut padding)?;
        let maintenance_version = padding[5];

        let preview_address = cursor.read_i32::<LittleEndian>()? as i64;
        let _undocumented = cursor.read_u16::<LittleEndian>()?;
        let code_page = cursor.read_u16::<LittleEndian>()?;

        let record_count = cursor.read_i32::<LittleEndian>()?;
        if !(0..=32).contains(&record_count) {
            return Err(DwgError::InvalidHeader(format!(
                "implausible locator record count {record_count}"
            )));
        }

        let mut records = Vec::with_capacity(record_count as usize);
        for _ in 0..record_count {
            let number = cursor.read_u8()?;
            let seeker = cursor.read_i32::<LittleEndian>()? as i64;
            let size = cursor.read_i32::<LittleEndian>()? as i64;
            records.push(FlatRecord { number, seeker, size });
        }

        let crc_position = cursor.position() as usize;
        let stored_crc = cursor.read_u16::<LittleEndian>()?;
        let computed = crc(CRC_SEED, &data[..crc_position]);
        if stored_crc != computed {
            return Err(DwgError::CrcMismatch {
                offset: crc_position as u64,
                expected: stored_crc,
                actual: computed,
            });
        }

        let mut sentinel = [0u8; 16];
        std::io::Read::read_exact(&mut cursor, &mut sentinel)?;
        if sentinel != sentinels::FILE_HEADER_END_AC15 {
            return Err(DwgError::InvalidSentinel("file header".into()));
        }

        Ok(Self {
            records,
            maintenance_version,
            preview_address,
            code_page,
        })
    }

    pub fn sections(&self) -> Vec<SectionLocator> {
        self.records
            .iter()
            .map(|record| SectionLocator {
                name: section_names::ac15_name_for_record(record.number)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("AcDb:Record{}", record.number)),
                offset: record.seeker.max(0) as u64,
                size: record.size.max(0) as u64,
                compressed: false,
                encrypted: false,
                page_id: None,
            })
            .collect()
    }

    /// Raw section bytes; flat files store sections uncompressed in place.
    pub fn section_data(&self, data: &[u8], name: &str) -> Result<Option<Vec<u8>>> {
        let record = self.records.iter().find(|record| {
            section_names::ac15_name_for_record(record.number) == Some(name)
        });
        let record = match record {
            Some(r) if r.seeker >= 0 && r.size > 0 => r,
            _ => return Ok(None),
        };

        let start = record.seeker as usize;
        let end = start
            .checked_add(record.size as usize)
            .filter(|&e| e <= data.len())
            .ok_or_else(|| {
                DwgError::InvalidHeader(format!(
                    "section '{name}' extends past end of file (seeker {:#X}, size {})",
                    record.seeker, record.size
                ))
            })?;
        Ok(Some(data[start..end].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_header(records: &[(u8, i32, i32)]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"AC1015");
        out.extend_from_slice(&[0, 0, 0, 0, 0, 6, 1]); // maintenance 6
        out.extend_from_slice(&0i32.to_le_bytes()); // preview address
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&0x1E9u16.to_le_bytes()); // code page
        out.extend_from_slice(&(records.len() as i32).to_le_bytes());
        for &(number, seeker, size) in records {
            out.push(number);
            out.extend_from_slice(&seeker.to_le_bytes());
            out.extend_from_slice(&size.to_le_bytes());
        }
        let checksum = crc(CRC_SEED, &out);
        out.extend_from_slice(&checksum.to_le_bytes());
        out.extend_from_slice(&sentinels::FILE_HEADER_END_AC15);
        out
    }

    #[test]
    fn test_parse_flat_locator() {
        let data = build_header(&[(0, 0x100, 0x20), (1, 0x120, 0x30), (2, 0x150, 0x40)]);
        let locator = FlatLocator::parse(&data).unwrap();
        assert_eq!(locator.maintenance_version, 6);
        let sections = locator.sections();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[2].name, section_names::HANDLES);
        assert_eq!(sections[2].offset, 0x150);
        assert_eq!(sections[2].size, 0x40);
    }

    #[test]
    fn test_crc_mismatch_is_fatal() {
        let mut data = build_header(&[(2, 0x100, 0x10)]);
        data[25] ^= 0x01; // flip the record number of the first record
        assert!(matches!(
            FlatLocator::parse(&data),
            Err(DwgError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_sentinel_mismatch_is_fatal() {
        let mut data = build_header(&[(2, 0x100, 0x10)]);
        let len = data.len();
        data[len - 1] ^= 0xFF;
        assert!(matches!(
            FlatLocator::parse(&data),
            Err(DwgError::InvalidSentinel(_))
        ));
    }

    #[test]
    fn test_section_extraction() {
        let mut data = build_header(&[(2, 0x40, 4)]);
        data.resize(0x40, 0);
        data.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]);
        let locator = FlatLocator::parse(&data).unwrap();
        let handles = locator
            .section_data(&data, section_names::HANDLES)
            .unwrap()
            .unwrap();
        assert_eq!(handles, vec![0xAA, 0xBB, 0xCC, 0xDD]);
        assert!(locator
            .section_data(&data, section_names::CLASSES)
            .unwrap()
            .is_none());
    }
}
