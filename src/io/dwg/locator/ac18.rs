//! Paged section container for AC1018, AC1024, AC1027 and AC1032 files.
//!
//! The file header carries an encrypted metadata block at offset 0x80.
//! Decrypting it yields the address of the *page map* (a system section
//! listing every page id with its size, addresses accumulating from 0x100)
//! and the page id of the *section map* (a system section listing named
//! sections with their page runs). Section data is then assembled page by
//! page; each data page has a 32-byte XOR-masked header and optionally
//! LZ77-compressed contents.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use indexmap::IndexMap;

use crate::error::{DwgError, Result};

use super::super::compression::lz77_ac18;
use super::super::constants::ac18;
use super::super::encryption;
use super::SectionLocator;

#[derive(Debug, Clone, Copy)]
pub(super) struct PageEntry {
    pub address: u64,
    #[allow(dead_code)]
    pub size: u64,
}

#[derive(Debug, Clone)]
pub(super) struct LocalPage {
    pub page_number: i32,
    #[allow(dead_code)]
    pub data_size: u64,
    #[allow(dead_code)]
    pub start_offset: u64,
}

#[derive(Debug, Clone)]
pub(super) struct SectionDescriptor {
    pub section_id: i32,
    pub total_size: u64,
    pub max_decompressed_size: u64,
    pub compression: u32,
    pub encrypted: u32,
    pub pages: Vec<LocalPage>,
}

#[derive(Debug)]
pub(super) struct PagedContainer {
    pages: HashMap<i32, PageEntry>,
    descriptors: IndexMap<String, SectionDescriptor>,
}

impl PagedContainer {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header_end = ac18::ENCRYPTED_HEADER_OFFSET as usize + ac18::ENCRYPTED_HEADER_SIZE;
        if data.len() < header_end {
            return Err(DwgError::InvalidHeader(
                "file too small for an R2004 header".into(),
            ));
        }

        let mut block = data
            [ac18::ENCRYPTED_HEADER_OFFSET as usize..header_end]
            .to_vec();
        encryption::crypt_header_block(&mut block);

        let mut cursor = Cursor::new(&block);
        cursor.set_position(0x50);
        let _page_map_id = cursor.read_u32::<LittleEndian>()?;
        let page_map_address = cursor.read_u64::<LittleEndian>()?;
        let section_map_id = cursor.read_u32::<LittleEndian>()?;

        let pages = Self::read_page_map(
            data,
            page_map_address
                .checked_add(ac18::PAGE_BASE_OFFSET)
                .ok_or_else(|| DwgError::InvalidHeader("page map address overflow".into()))?,
        )?;

        let section_map_page = pages.get(&(section_map_id as i32)).ok_or_else(|| {
            DwgError::InvalidHeader(format!(
                "section map page {section_map_id} absent from page map"
            ))
        })?;
        let section_map = Self::read_system_section(
            data,
            section_map_page.address,
            ac18::SECTION_MAP_SIGNATURE,
        )?;
        let descriptors = Self::parse_section_map(&section_map)?;

        Ok(Self { pages, descriptors })
    }

    /// Read a system section (page map or section map): a 20-byte plain
    /// header followed by optionally compressed payload.
    fn read_system_section(data: &[u8], address: u64, expected: u32) -> Result<Vec<u8>> {
        let start = address as usize;
        let payload_start = start
            .checked_add(0x14)
            .filter(|&e| e <= data.len())
            .ok_or_else(|| DwgError::InvalidHeader("system section header out of range".into()))?;

        let mut cursor = Cursor::new(&data[start..payload_start]);
        let signature = cursor.read_u32::<LittleEndian>()?;
        let decompressed_size = cursor.read_u32::<LittleEndian>()? as usize;
        let compressed_size = cursor.read_u32::<LittleEndian>()? as usize;
        let compression = cursor.read_u32::<LittleEndian>()?;
        let _checksum = cursor.read_u32::<LittleEndian>()?;

        if signature != expected {
            return Err(DwgError::InvalidSentinel(format!(
                "system section at {address:#X} (signature {signature:#010X})"
            )));
        }

        let payload_end = payload_start
            .checked_add(compressed_size)
            .filter(|&e| e <= data.len())
            .ok_or_else(|| DwgError::InvalidHeader("system section data out of range".into()))?;
        let payload = &data[payload_start..payload_end];

        if compression == ac18::COMPRESSED {
            lz77_ac18::decompress(payload, decompressed_size)
        } else {
            Ok(payload.to_vec())
        }
    }

    /// Page map entries are (id, size) pairs; addresses accumulate from
    /// 0x100. Negative ids mark gaps and carry four extra fields.
    fn read_page_map(data: &[u8], address: u64) -> Result<HashMap<i32, PageEntry>> {
        let payload = Self::read_system_section(data, address, ac18::PAGE_MAP_SIGNATURE)?;
        let mut cursor = Cursor::new(&payload);
        let mut pages = HashMap::new();
        let mut page_address = ac18::PAGE_BASE_OFFSET;

        while cursor.position() + 8 <= payload.len() as u64 {
            let id = cursor.read_i32::<LittleEndian>()?;
            let size = cursor.read_u32::<LittleEndian>()? as u64;
            if id > 0 {
                pages.insert(id, PageEntry { address: page_address, size });
            } else {
                // Gap entry: parent, left, right, zero.
                for _ in 0..4 {
                    let _ = cursor.read_i32::<LittleEndian>();
                }
            }
            page_address = page_address
                .checked_add(size)
                .ok_or_else(|| DwgError::InvalidHeader("page map address overflow".into()))?;
        }

        Ok(pages)
    }

    fn parse_section_map(payload: &[u8]) -> Result<IndexMap<String, SectionDescriptor>> {
        let mut cursor = Cursor::new(payload);
        let section_count = cursor.read_i32::<LittleEndian>()?;
        let _x02 = cursor.read_i32::<LittleEndian>()?;
        let _max_page = cursor.read_i32::<LittleEndian>()?;
        let _x00 = cursor.read_i32::<LittleEndian>()?;
        let _count_again = cursor.read_i32::<LittleEndian>()?;

        if !(0..=4096).contains(&section_count) {
            return Err(DwgError::InvalidHeader(format!(
                "implausible section count {section_count}"
            )));
        }

        let mut descriptors = IndexMap::new();
        for _ in 0..section_count {
            let total_size = cursor.read_u64::<LittleEndian>()?;
            let page_count = cursor.read_i32::<LittleEndian>()?;
            let max_decompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
            let _unknown = cursor.read_i32::<LittleEndian>()?;
            let compression = cursor.read_u32::<LittleEndian>()?;
            let section_id = cursor.read_i32::<LittleEndian>()?;
            let encrypted = cursor.read_u32::<LittleEndian>()?;

            let mut name_buf = [0u8; 64];
            cursor.read_exact(&mut name_buf)?;
            let name_end = name_buf.iter().position(|&b| b == 0).unwrap_or(64);
            let name = String::from_utf8_lossy(&name_buf[..name_end]).into_owned();

            if !(0..=65_536).contains(&page_count) {
                return Err(DwgError::InvalidHeader(format!(
                    "implausible page count {page_count} for section '{name}'"
                )));
            }

            let mut pages = Vec::with_capacity(page_count as usize);
            for _ in 0..page_count {
                let page_number = cursor.read_i32::<LittleEndian>()?;
                let data_size = cursor.read_u32::<LittleEndian>()? as u64;
                let start_offset = cursor.read_u64::<LittleEndian>()?;
                pages.push(LocalPage { page_number, data_size, start_offset });
            }

            if name.is_empty() {
                continue;
            }

            descriptors.insert(
                name,
                SectionDescriptor {
                    section_id,
                    total_size,
                    max_decompressed_size,
                    compression,
                    encrypted,
                    pages,
                },
            );
        }

        Ok(descriptors)
    }

    pub fn sections(&self) -> Vec<SectionLocator> {
        self.descriptors
            .iter()
            .map(|(name, desc)| {
                let first_page = desc
                    .pages
                    .first()
                    .and_then(|p| self.pages.get(&p.page_number));
                SectionLocator {
                    name: name.clone(),
                    offset: first_page.map(|p| p.address).unwrap_or(0),
                    size: desc.total_size,
                    compressed: desc.compression == ac18::COMPRESSED,
                    encrypted: desc.encrypted == 1,
                    page_id: desc.pages.first().map(|p| p.page_number),
                }
            })
            .collect()
    }

    pub fn section_data(&self, data: &[u8], name: &str) -> Result<Option<Vec<u8>>> {
        let descriptor = match self.descriptors.get(name) {
            Some(d) => d,
            None => return Ok(None),
        };

        let page_size = descriptor.max_decompressed_size as usize;
        let mut output = vec![0u8; page_size * descriptor.pages.len()];

        for (index, page) in descriptor.pages.iter().enumerate() {
            let entry = self.pages.get(&page.page_number).ok_or_else(|| {
                DwgError::InvalidHeader(format!(
                    "page {} of section '{name}' absent from page map",
                    page.page_number
                ))
            })?;

            let header_start = entry.address as usize;
            let data_start = header_start
                .checked_add(32)
                .filter(|&e| e <= data.len())
                .ok_or_else(|| {
                    DwgError::InvalidHeader("data page header out of range".into())
                })?;
            let mut header_bytes = [0u8; 32];
            header_bytes.copy_from_slice(&data[header_start..data_start]);
            let header = encryption::decrypt_page_header(&header_bytes, entry.address);

            if header.signature != ac18::DATA_SECTION_SIGNATURE {
                return Err(DwgError::InvalidSentinel(format!(
                    "data page at {:#X} (signature {:#010X})",
                    entry.address, header.signature
                )));
            }

            let data_end = data_start
                .checked_add(header.compressed_size as usize)
                .filter(|&e| e <= data.len())
                .ok_or_else(|| DwgError::InvalidHeader("data page out of range".into()))?;
            let page_data = &data[data_start..data_end];

            let expanded;
            let contents: &[u8] = if descriptor.compression == ac18::COMPRESSED {
                expanded = lz77_ac18::decompress(page_data, header.page_size as usize)?;
                &expanded
            } else {
                page_data
            };

            let slot_start = index * page_size;
            let copy_len = contents.len().min(page_size);
            output[slot_start..slot_start + copy_len].copy_from_slice(&contents[..copy_len]);
        }

        Ok(Some(output))
    }
}
