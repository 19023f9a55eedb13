//! Section container for AC1021 (R2007) files.
//!
//! R2007 keeps the paged model but wraps every structure in Reed-Solomon
//! byte interleaving and the AC21 LZ77 variant:
//!
//! - the file-header metadata is a 0x400-byte RS block at 0x80, decoded
//!   over 3 tracks of 239 bytes and then decompressed to a 0x110 block of
//!   u64 fields;
//! - the pages map and sections map are RS-interleaved, compressed
//!   streams located through those fields, with page addresses
//!   accumulating from 0x480;
//! - each data page carries a plain 32-byte header (type, decompressed
//!   size, compressed size, compression type) ahead of its RS-interleaved
//!   payload.

use std::collections::HashMap;
use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use indexmap::IndexMap;

use crate::error::{DwgError, Result};

use super::super::compression::lz77_ac21;
use super::super::constants::ac21;
use super::super::reed_solomon;
use super::SectionLocator;

/// Fields of the decompressed file-header metadata block.
#[derive(Debug, Clone, Default)]
pub(super) struct Metadata {
    pub pages_map_correction_factor: u64,
    pub pages_map_offset: u64,
    pub pages_map_size_compressed: u64,
    pub pages_map_size_uncompressed: u64,
    pub sections_map_id: u64,
    pub sections_map_size_compressed: u64,
    pub sections_map_size_uncompressed: u64,
    pub sections_map_correction_factor: u64,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct PageEntry {
    pub address: u64,
    #[allow(dead_code)]
    pub size: u64,
}

#[derive(Debug, Clone)]
pub(super) struct LocalPage {
    pub offset: u64,
    pub size: u64,
    #[allow(dead_code)]
    pub id: u64,
    pub uncompressed_size: u64,
}

#[derive(Debug, Clone)]
pub(super) struct SectionDescriptor {
    pub total_size: u64,
    pub encrypted: u64,
    pub pages: Vec<LocalPage>,
}

#[derive(Debug)]
pub(super) struct InterleavedContainer {
    #[allow(dead_code)]
    pages: HashMap<u64, PageEntry>,
    descriptors: IndexMap<String, SectionDescriptor>,
}

impl InterleavedContainer {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let metadata = Self::read_metadata(data)?;

        let pages = Self::read_pages_map(data, &metadata)?;

        let map_page = pages.get(&metadata.sections_map_id).ok_or_else(|| {
            DwgError::InvalidHeader(format!(
                "sections map page {} absent from pages map",
                metadata.sections_map_id
            ))
        })?;
        let sections_payload = Self::read_interleaved_stream(
            data,
            map_page.address,
            metadata.sections_map_size_compressed,
            metadata.sections_map_size_uncompressed,
            metadata.sections_map_correction_factor,
        )?;
        let descriptors = Self::parse_sections_map(&sections_payload)?;

        Ok(Self { pages, descriptors })
    }

    fn read_metadata(data: &[u8]) -> Result<Metadata> {
        let start = 0x80usize;
        let end = start + ac21::RS_ENCODED_HEADER_SIZE;
        if data.len() < end {
            return Err(DwgError::InvalidHeader(
                "file too small for an R2007 header".into(),
            ));
        }

        let decoded = reed_solomon::decode(
            &data[start..end],
            3 * ac21::RS_HEADER_BLOCK_SIZE,
            3,
            ac21::RS_HEADER_BLOCK_SIZE,
        );
        let block = lz77_ac21::decompress(&decoded, ac21::DECOMPRESSED_HEADER_SIZE)?;
        Self::parse_metadata_fields(&block)
    }

    /// The metadata block is a run of u64 fields; only the map locations
    /// are retained.
    pub(super) fn parse_metadata_fields(block: &[u8]) -> Result<Metadata> {
        if block.len() < 0x110 {
            return Err(DwgError::InvalidHeader(
                "R2007 metadata block truncated".into(),
            ));
        }
        let mut cursor = Cursor::new(block);
        let mut field = || -> Result<u64> { Ok(cursor.read_u64::<LittleEndian>()?) };

        let _header_size = field()?;
        let _file_size = field()?;
        let _pages_map_crc_compressed = field()?;
        let pages_map_correction_factor = field()?;
        let _pages_map_crc_seed = field()?;
        let _map2_offset = field()?;
        let _map2_id = field()?;
        let pages_map_offset = field()?;
        let _header2_offset = field()?;
        let pages_map_size_compressed = field()?;
        let pages_map_size_uncompressed = field()?;
        let _pages_amount = field()?;
        let _pages_max_id = field()?;
        let _unknown_0x20 = field()?;
        let _unknown_0x40 = field()?;
        let _pages_map_crc_uncompressed = field()?;
        let _unknown_0xf800 = field()?;
        let _unknown_4 = field()?;
        let _unknown_1 = field()?;
        let _sections_amount = field()?;
        let _sections_map_crc_uncompressed = field()?;
        let sections_map_size_compressed = field()?;
        let _sections_map2_id = field()?;
        let sections_map_id = field()?;
        let sections_map_size_uncompressed = field()?;
        let _sections_map_crc_compressed = field()?;
        let sections_map_correction_factor = field()?;

        Ok(Metadata {
            pages_map_correction_factor,
            pages_map_offset,
            pages_map_size_compressed,
            pages_map_size_uncompressed,
            sections_map_id,
            sections_map_size_compressed,
            sections_map_size_uncompressed,
            sections_map_correction_factor,
        })
    }

    /// Read an RS-interleaved, AC21-compressed stream at `address`.
    fn read_interleaved_stream(
        data: &[u8],
        address: u64,
        compressed_size: u64,
        uncompressed_size: u64,
        correction_factor: u64,
    ) -> Result<Vec<u8>> {
        let (factor, read_size) = reed_solomon::page_params(
            compressed_size,
            correction_factor,
            ac21::RS_PAGE_BLOCK_SIZE,
        );
        let start = address as usize;
        let end = start
            .checked_add(read_size)
            .filter(|&e| e <= data.len())
            .ok_or_else(|| DwgError::InvalidHeader("R2007 stream out of range".into()))?;

        let decoded = reed_solomon::decode(
            &data[start..end],
            compressed_size as usize,
            factor,
            ac21::RS_PAGE_BLOCK_SIZE,
        );

        if compressed_size == uncompressed_size {
            Ok(decoded)
        } else {
            lz77_ac21::decompress(&decoded, uncompressed_size as usize)
        }
    }

    fn read_pages_map(data: &[u8], metadata: &Metadata) -> Result<HashMap<u64, PageEntry>> {
        let address = ac21::DATA_PAGE_BASE_OFFSET
            .checked_add(metadata.pages_map_offset)
            .ok_or_else(|| DwgError::InvalidHeader("pages map offset overflow".into()))?;
        let payload = Self::read_interleaved_stream(
            data,
            address,
            metadata.pages_map_size_compressed,
            metadata.pages_map_size_uncompressed,
            metadata.pages_map_correction_factor,
        )?;

        let mut cursor = Cursor::new(&payload);
        let mut pages = HashMap::new();
        let mut page_address = ac21::DATA_PAGE_BASE_OFFSET;

        while cursor.position() + 16 <= payload.len() as u64 {
            let size = cursor.read_u64::<LittleEndian>()?;
            let id = cursor.read_u64::<LittleEndian>()?;
            if size == 0 {
                break;
            }
            pages.insert(id, PageEntry { address: page_address, size });
            page_address = page_address
                .checked_add(size)
                .ok_or_else(|| DwgError::InvalidHeader("pages map address overflow".into()))?;
        }

        Ok(pages)
    }

    /// Sections map entries are all-u64 with a UTF-16 name.
    pub(super) fn parse_sections_map(payload: &[u8]) -> Result<IndexMap<String, SectionDescriptor>> {
        let mut cursor = Cursor::new(payload);
        let mut descriptors = IndexMap::new();

        while cursor.position() + 64 <= payload.len() as u64 {
            let total_size = cursor.read_u64::<LittleEndian>()?;
            let _max_size = cursor.read_u64::<LittleEndian>()?;
            let encrypted = cursor.read_u64::<LittleEndian>()?;
            let _hash_code = cursor.read_u64::<LittleEndian>()?;
            let name_length = cursor.read_u64::<LittleEndian>()?;
            let _unknown = cursor.read_u64::<LittleEndian>()?;
            let _encoding = cursor.read_u64::<LittleEndian>()?;
            let page_count = cursor.read_u64::<LittleEndian>()?;

            if name_length > 4096 || page_count > 65_536 {
                return Err(DwgError::InvalidHeader(
                    "implausible R2007 section entry".into(),
                ));
            }

            let mut name_bytes = vec![0u8; (name_length as usize) * 2];
            std::io::Read::read_exact(&mut cursor, &mut name_bytes)?;
            let (name, _, _) = encoding_rs::UTF_16LE.decode(&name_bytes);
            let name = name.trim_end_matches('\0').to_string();

            let mut pages = Vec::with_capacity(page_count as usize);
            for _ in 0..page_count {
                let offset = cursor.read_u64::<LittleEndian>()?;
                let size = cursor.read_u64::<LittleEndian>()?;
                let id = cursor.read_u64::<LittleEndian>()?;
                let uncompressed_size = cursor.read_u64::<LittleEndian>()?;
                let _checksum = cursor.read_u64::<LittleEndian>()?;
                let _crc = cursor.read_u64::<LittleEndian>()?;
                pages.push(LocalPage { offset, size, id, uncompressed_size });
            }

            if name.is_empty() {
                continue;
            }
            descriptors.insert(name, SectionDescriptor { total_size, encrypted, pages });
        }

        Ok(descriptors)
    }

    pub fn sections(&self) -> Vec<SectionLocator> {
        self.descriptors
            .iter()
            .map(|(name, desc)| SectionLocator {
                name: name.clone(),
                offset: desc
                    .pages
                    .first()
                    .map(|p| ac21::DATA_PAGE_BASE_OFFSET + p.offset)
                    .unwrap_or(0),
                size: desc.total_size,
                compressed: desc
                    .pages
                    .iter()
                    .any(|p| p.size != p.uncompressed_size),
                encrypted: desc.encrypted == 1,
                page_id: desc.pages.first().map(|p| p.id as i32),
            })
            .collect()
    }

    pub fn section_data(&self, data: &[u8], name: &str) -> Result<Option<Vec<u8>>> {
        let descriptor = match self.descriptors.get(name) {
            Some(d) => d,
            None => return Ok(None),
        };

        let mut output = Vec::new();
        for page in &descriptor.pages {
            let address = ac21::DATA_PAGE_BASE_OFFSET
                .checked_add(page.offset)
                .ok_or_else(|| DwgError::InvalidHeader("data page offset overflow".into()))?;
            output.extend_from_slice(&Self::read_data_page(data, address)?);
        }
        Ok(Some(output))
    }

    /// Data pages carry a plain 32-byte header ahead of the RS payload.
    fn read_data_page(data: &[u8], address: u64) -> Result<Vec<u8>> {
        let start = address as usize;
        let payload_start = start
            .checked_add(32)
            .filter(|&e| e <= data.len())
            .ok_or_else(|| DwgError::InvalidHeader("R2007 page header out of range".into()))?;

        let mut cursor = Cursor::new(&data[start..payload_start]);
        let page_type = cursor.read_u64::<LittleEndian>()?;
        let decompressed_size = cursor.read_u64::<LittleEndian>()? as usize;
        let compressed_size = cursor.read_u64::<LittleEndian>()? as usize;
        let compression = cursor.read_u64::<LittleEndian>()?;

        if page_type != ac21::DATA_SECTION_SIGNATURE {
            return Err(DwgError::InvalidSentinel(format!(
                "R2007 data page at {address:#X} (type {page_type:#X})"
            )));
        }

        if compression == 2 {
            let (factor, read_size) = reed_solomon::page_params(
                compressed_size as u64,
                1,
                ac21::RS_PAGE_BLOCK_SIZE,
            );
            let end = payload_start
                .checked_add(read_size)
                .filter(|&e| e <= data.len())
                .ok_or_else(|| DwgError::InvalidHeader("R2007 page data out of range".into()))?;
            let decoded = reed_solomon::decode(
                &data[payload_start..end],
                compressed_size,
                factor,
                ac21::RS_PAGE_BLOCK_SIZE,
            );
            lz77_ac21::decompress(&decoded, decompressed_size)
        } else {
            let end = payload_start
                .checked_add(compressed_size)
                .filter(|&e| e <= data.len())
                .ok_or_else(|| DwgError::InvalidHeader("R2007 page data out of range".into()))?;
            Ok(data[payload_start..end].to_vec())
        }
    }
}
