//! Shared fixture builders for the integration tests.
//!
//! DWG files are assembled byte-for-byte with a small bit writer that is
//! the write-side inverse of the decoder's primitives. Two assemblers
//! cover the container dialects: `FlatFileBuilder` for AC1014/AC1015 and
//! `PagedFileBuilder` for the R2004+ paged container (with uncompressed
//! pages, which the format permits).

#![allow(dead_code)]

use dwgscan::io::dwg::constants::sentinels;
use dwgscan::io::dwg::crc::{crc, CRC_SEED};
use dwgscan::io::dwg::encryption;
use dwgscan::types::DwgVersion;

// ---------------------------------------------------------------------------
// Bit writer
// ---------------------------------------------------------------------------

/// MSB-first bit writer mirroring the decoder's encodings.
#[derive(Clone)]
pub struct BitWriter {
    pub version: DwgVersion,
    data: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new(version: DwgVersion) -> Self {
        Self {
            version,
            data: Vec::new(),
            bit_len: 0,
        }
    }

    pub fn len_bits(&self) -> usize {
        self.bit_len
    }

    pub fn bit(&mut self, value: u8) {
        if self.bit_len % 8 == 0 {
            self.data.push(0);
        }
        if value != 0 {
            let idx = self.bit_len / 8;
            self.data[idx] |= 1 << (7 - (self.bit_len % 8));
        }
        self.bit_len += 1;
    }

    pub fn bits(&mut self, value: u64, count: usize) {
        for shift in (0..count).rev() {
            self.bit(((value >> shift) & 1) as u8);
        }
    }

    pub fn byte(&mut self, value: u8) {
        self.bits(value as u64, 8);
    }

    pub fn bytes(&mut self, values: &[u8]) {
        for &b in values {
            self.byte(b);
        }
    }

    /// Append another writer's bits verbatim.
    pub fn extend(&mut self, other: &BitWriter) {
        for i in 0..other.bit_len {
            let byte = other.data[i / 8];
            self.bit((byte >> (7 - (i % 8))) & 1);
        }
    }

    pub fn align(&mut self) {
        while self.bit_len % 8 != 0 {
            self.bit(0);
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    // -- raw values ----------------------------------------------------

    pub fn rs_le(&mut self, value: u16) {
        self.bytes(&value.to_le_bytes());
    }

    pub fn rl(&mut self, value: u32) {
        self.bytes(&value.to_le_bytes());
    }

    pub fn rd(&mut self, value: f64) {
        self.bytes(&value.to_le_bytes());
    }

    // -- bit-coded values ----------------------------------------------

    pub fn bs(&mut self, value: u16) {
        match value {
            0 => self.bits(0b10, 2),
            256 => self.bits(0b11, 2),
            v if v <= 0xFF => {
                self.bits(0b01, 2);
                self.byte(v as u8);
            }
            v => {
                self.bits(0b00, 2);
                self.rs_le(v);
            }
        }
    }

    pub fn bl(&mut self, value: u32) {
        match value {
            0 => self.bits(0b10, 2),
            v if v <= 0xFF => {
                self.bits(0b01, 2);
                self.byte(v as u8);
            }
            v => {
                self.bits(0b00, 2);
                self.rl(v);
            }
        }
    }

    pub fn bd(&mut self, value: f64) {
        if value == 1.0 {
            self.bits(0b01, 2);
        } else if value == 0.0 {
            self.bits(0b10, 2);
        } else {
            self.bits(0b00, 2);
            self.rd(value);
        }
    }

    pub fn bd3(&mut self, x: f64, y: f64, z: f64) {
        self.bd(x);
        self.bd(y);
        self.bd(z);
    }

    /// DD: always the full-double form unless the value equals the default.
    pub fn dd(&mut self, default: f64, value: f64) {
        if value == default {
            self.bits(0b00, 2);
        } else {
            self.bits(0b11, 2);
            self.rd(value);
        }
    }

    /// BT: flag form from R2000 on.
    pub fn bt(&mut self, value: f64) {
        if self.version >= DwgVersion::AC1015 {
            if value == 0.0 {
                self.bit(1);
            } else {
                self.bit(0);
                self.bd(value);
            }
        } else {
            self.bd(value);
        }
    }

    /// BE: flag form from R2000 on.
    pub fn be(&mut self, x: f64, y: f64, z: f64) {
        if self.version >= DwgVersion::AC1015 {
            if x == 0.0 && y == 0.0 && z == 1.0 {
                self.bit(1);
            } else {
                self.bit(0);
                self.bd3(x, y, z);
            }
        } else {
            self.bd3(x, y, z);
        }
    }

    /// MS: 15-bit chunks, low chunk first.
    pub fn ms(&mut self, value: u32) {
        let low = (value & 0x7FFF) as u16;
        let high = ((value >> 15) & 0x7FFF) as u16;
        if high == 0 {
            self.rs_le(low);
        } else {
            self.rs_le(low | 0x8000);
            self.rs_le(high);
        }
    }

    /// Unsigned MC: 7-bit chunks, bit 7 continues.
    pub fn umc(&mut self, mut value: u64) {
        loop {
            let mut chunk = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                chunk |= 0x80;
            }
            self.byte(chunk);
            if value == 0 {
                return;
            }
        }
    }

    /// Signed MC: sign in bit 6 of the final chunk.
    pub fn mc(&mut self, value: i64) {
        let negative = value < 0;
        let mut remaining = value.unsigned_abs();
        loop {
            let chunk = (remaining & 0x7F) as u8;
            remaining >>= 7;
            if remaining == 0 && chunk <= 0x3F {
                self.byte(if negative { chunk | 0x40 } else { chunk });
                return;
            }
            self.byte(chunk | 0x80);
        }
    }

    /// OT: BS before R2010, 2-bit pair encoding after.
    pub fn ot(&mut self, type_code: u16) {
        if self.version >= DwgVersion::AC1024 {
            if type_code <= 0xFF {
                self.bits(0b00, 2);
                self.byte(type_code as u8);
            } else if (0x1F0..=0x2EF).contains(&type_code) {
                self.bits(0b01, 2);
                self.byte((type_code - 0x1F0) as u8);
            } else {
                self.bits(0b10, 2);
                self.rs_le(type_code);
            }
        } else {
            self.bs(type_code);
        }
    }

    /// H: 4-bit code, 4-bit byte count, big-endian payload.
    pub fn h(&mut self, code: u8, value: u64) {
        let count = if value == 0 {
            0
        } else {
            (64 - value.leading_zeros() as usize).div_ceil(8)
        };
        self.byte(((code & 0x0F) << 4) | (count as u8));
        for idx in (0..count).rev() {
            self.byte(((value >> (idx * 8)) & 0xFF) as u8);
        }
    }

    /// TV: BS length plus code-page bytes (UTF-16LE code units at R2007+).
    pub fn tv(&mut self, text: &str) {
        if self.version >= DwgVersion::AC1021 {
            let units: Vec<u16> = text.encode_utf16().collect();
            self.bs(units.len() as u16);
            for unit in units {
                self.rs_le(unit);
            }
        } else {
            self.bs(text.len() as u16);
            self.bytes(text.as_bytes());
        }
    }
}

// ---------------------------------------------------------------------------
// Object record builder
// ---------------------------------------------------------------------------

/// Common knobs for one synthetic entity record.
pub struct EntityFixture {
    pub version: DwgVersion,
    pub type_code: u16,
    pub handle: u64,
    pub layer_handle: u64,
    pub color_index: u16,
}

impl EntityFixture {
    pub fn new(version: DwgVersion, type_code: u16, handle: u64) -> Self {
        Self {
            version,
            type_code,
            handle,
            layer_handle: 0x10,
            color_index: 7,
        }
    }

    /// Assemble a complete framed record: MS size, (MC at R2010+),
    /// common entity data, payload, handle stream, CRC.
    ///
    /// `payload` writes the type-specific fields; `extra_handles` writes
    /// any post-payload handle references (text style, block, dimension
    /// style) into the handle stream.
    pub fn build(
        &self,
        payload: impl FnOnce(&mut BitWriter),
        extra_handles: impl FnOnce(&mut BitWriter),
    ) -> Vec<u8> {
        let v = self.version;
        let r13_14 = v == DwgVersion::AC1014;
        let r2004 = v >= DwgVersion::AC1018;
        let r2007 = v >= DwgVersion::AC1021;
        let r2010 = v >= DwgVersion::AC1024;
        let r2013 = v >= DwgVersion::AC1027;

        // Handle stream.
        let mut handles = BitWriter::new(v);
        if !r2004 {
            handles.h(3, 0); // xdictionary
        }
        if r13_14 {
            handles.h(5, self.layer_handle);
        }
        if v >= DwgVersion::AC1015 {
            handles.h(5, self.layer_handle);
        }
        extra_handles(&mut handles);

        if r2010 {
            // R2010+: no in-body RL; the MC field frames the handle stream.
            let mut pre = BitWriter::new(v);
            pre.ot(self.type_code);
            pre.h(0, self.handle);
            pre.bs(0); // end of extended data
            pre.bit(0); // no graphic
            pre.bits(2, 2); // entity mode: model space
            pre.bl(0); // reactors
            pre.bit(1); // xdictionary missing
            if r2013 {
                pre.bit(0); // no ds binary data
            }
            pre.bs(self.color_index); // ENC, plain index
            pre.bd(1.0); // linetype scale
            pre.bits(0, 2); // linetype: by layer
            pre.bits(0, 2); // material: by layer
            pre.byte(0); // shadow flags
            pre.bits(0, 2); // plot style: by layer
            pre.bits(0, 3); // no visual styles
            pre.bs(0); // invisibility
            pre.byte(0); // line weight
            payload(&mut pre);
            pre.bit(0); // string stream absent

            let pre_bits = pre.len_bits();
            let mut body = pre;
            body.extend(&handles);
            body.align();
            let body_bytes = body.into_bytes();
            let size = body_bytes.len() as u32;
            let handle_stream_bits = size as u64 * 8 - pre_bits as u64;

            let mut record = BitWriter::new(v);
            record.ms(size);
            record.umc(handle_stream_bits);
            record.bytes(&body_bytes);
            let mut out = record.into_bytes();
            let checksum = crc(CRC_SEED, &out);
            out.extend_from_slice(&checksum.to_le_bytes());
            return out;
        }

        // Pre-R2010: an in-body RL gives the handle stream position.
        // `pre_rl` holds everything before the RL, `post_rl` the rest.
        let mut pre_rl = BitWriter::new(v);
        pre_rl.ot(self.type_code);

        let mut post_rl = BitWriter::new(v);
        if r13_14 {
            // R14: the RL follows the handle, extended data, and graphic flag.
            pre_rl.h(0, self.handle);
            pre_rl.bs(0);
            pre_rl.bit(0);
        } else {
            post_rl.h(0, self.handle);
            post_rl.bs(0);
            post_rl.bit(0);
        }
        post_rl.bits(2, 2); // entity mode: model space
        post_rl.bl(0); // reactors
        if r2004 {
            post_rl.bit(1); // xdictionary missing
        }
        if r13_14 {
            post_rl.bit(1); // linetype is by layer
        }
        if !r2004 {
            post_rl.bit(1); // no prev/next links
        }
        post_rl.bs(self.color_index);
        post_rl.bd(1.0); // linetype scale
        if v >= DwgVersion::AC1015 {
            post_rl.bits(0, 2); // linetype: by layer
            if r2007 {
                post_rl.bits(0, 2); // material
                post_rl.byte(0); // shadow flags
            }
            post_rl.bits(0, 2); // plot style
        }
        post_rl.bs(0); // invisibility
        if v >= DwgVersion::AC1015 {
            post_rl.byte(0); // line weight
        }
        payload(&mut post_rl);

        let rl_value = pre_rl.len_bits() as u32 + 32 + post_rl.len_bits() as u32;

        let mut body = BitWriter::new(v);
        body.extend(&pre_rl);
        body.rl(rl_value);
        body.extend(&post_rl);
        body.extend(&handles);
        body.align();
        let body_bytes = body.into_bytes();
        let size = body_bytes.len() as u32;

        let mut record = BitWriter::new(v);
        record.ms(size);
        record.bytes(&body_bytes);
        let mut out = record.into_bytes();
        let checksum = crc(CRC_SEED, &out);
        out.extend_from_slice(&checksum.to_le_bytes());
        out
    }
}

/// Assemble a LAYER table record (pre-R2010 versions).
pub fn build_layer_record(
    version: DwgVersion,
    handle: u64,
    name: &str,
    color_index: u16,
) -> Vec<u8> {
    let v = version;
    assert!(v < DwgVersion::AC1024, "layer fixtures cover pre-R2010 only");
    let r13_14 = v == DwgVersion::AC1014;
    let r2004 = v >= DwgVersion::AC1018;
    let r2007 = v >= DwgVersion::AC1021;

    let mut handles = BitWriter::new(v);
    handles.h(4, 0); // owner (layer control)
    if !r2004 {
        handles.h(3, 0); // xdictionary
    }
    handles.h(4, 0); // layer control back-pointer
    handles.h(5, 0); // external reference block
    if v >= DwgVersion::AC1015 {
        handles.h(5, 0); // plot style
    }
    if r2007 {
        handles.h(5, 0); // material
    }
    handles.h(5, 0); // linetype

    let mut pre_rl = BitWriter::new(v);
    pre_rl.ot(0x33);

    let mut post_rl = BitWriter::new(v);
    if r13_14 {
        pre_rl.h(0, handle);
        pre_rl.bs(0);
    } else {
        post_rl.h(0, handle);
        post_rl.bs(0);
    }
    post_rl.bl(0); // reactors
    if r2004 {
        post_rl.bit(1); // xdictionary missing
    }
    post_rl.tv(name);
    if r2007 {
        post_rl.bs(0); // xref index word
    } else {
        post_rl.bit(0); // 64-flag
        post_rl.bs(0); // xref index
        post_rl.bit(0); // xref dependent
    }
    if r13_14 {
        post_rl.bits(0, 4); // frozen/on/frozen-in-new/locked
    } else {
        post_rl.bs(0); // values word
    }
    if r2004 {
        // CMC: BS index slot, BL packed rgb with the index flag, RC names.
        post_rl.bs(0);
        post_rl.bl(0x0100_0000 | color_index as u32);
        post_rl.byte(0);
    } else {
        post_rl.bs(color_index);
    }

    let rl_value = pre_rl.len_bits() as u32 + 32 + post_rl.len_bits() as u32;

    let mut body = BitWriter::new(v);
    body.extend(&pre_rl);
    body.rl(rl_value);
    body.extend(&post_rl);
    body.extend(&handles);
    body.align();
    let body_bytes = body.into_bytes();
    let size = body_bytes.len() as u32;

    let mut record = BitWriter::new(v);
    record.ms(size);
    record.bytes(&body_bytes);
    let mut out = record.into_bytes();
    let checksum = crc(CRC_SEED, &out);
    out.extend_from_slice(&checksum.to_le_bytes());
    out
}

// ---------------------------------------------------------------------------
// Object map section
// ---------------------------------------------------------------------------

/// Build the `AcDb:Handles` bytes for (handle, offset) pairs, handles
/// ascending.
pub fn build_object_map(entries: &[(u64, u64)]) -> Vec<u8> {
    let mut payload = BitWriter::new(DwgVersion::AC1015);
    let mut last_handle = 0u64;
    let mut last_offset = 0i64;
    for &(handle, offset) in entries {
        assert!(handle > last_handle, "map handles must be ascending");
        payload.umc(handle - last_handle);
        payload.mc(offset as i64 - last_offset);
        last_handle = handle;
        last_offset = offset as i64;
    }
    let payload = payload.into_bytes();

    let mut page = Vec::new();
    page.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    page.extend_from_slice(&payload);
    let checksum = crc(CRC_SEED, &page);
    page.extend_from_slice(&checksum.to_be_bytes());
    page.extend_from_slice(&[0x00, 0x02]);
    page
}

// ---------------------------------------------------------------------------
// AC1014/AC1015 flat file assembly
// ---------------------------------------------------------------------------

pub struct FlatFileBuilder {
    version: DwgVersion,
    objects: Vec<(u64, Vec<u8>)>,
}

impl FlatFileBuilder {
    pub fn new(version: DwgVersion) -> Self {
        assert!(version <= DwgVersion::AC1015);
        Self {
            version,
            objects: Vec::new(),
        }
    }

    pub fn add_object(&mut self, handle: u64, record: Vec<u8>) -> &mut Self {
        self.objects.push((handle, record));
        self
    }

    /// Lay out: header, object records from 0x100, handles section after.
    pub fn build(&self) -> Vec<u8> {
        const OBJECTS_START: usize = 0x100;

        let mut offsets = Vec::new();
        let mut objects_blob = Vec::new();
        for (handle, record) in &self.objects {
            offsets.push((*handle, (OBJECTS_START + objects_blob.len()) as u64));
            objects_blob.extend_from_slice(record);
        }
        let mut sorted = offsets.clone();
        sorted.sort_by_key(|&(handle, _)| handle);
        let map = build_object_map(&sorted);

        let handles_offset = OBJECTS_START + objects_blob.len();

        let mut header = Vec::new();
        header.extend_from_slice(self.version.as_str().as_bytes());
        header.extend_from_slice(&[0, 0, 0, 0, 0, 0, 1]); // maintenance 0
        header.extend_from_slice(&0i32.to_le_bytes()); // preview address
        header.extend_from_slice(&[0, 0]);
        header.extend_from_slice(&0x1E9u16.to_le_bytes()); // code page
        let records: [(u8, i32, i32); 6] = [
            (0, 0, 0),                                            // header vars
            (1, 0, 0),                                            // classes
            (2, handles_offset as i32, map.len() as i32),         // handles
            (3, 0, 0),                                            // obj free space
            (4, 0, 0),                                            // template
            (5, 0, 0),                                            // aux header
        ];
        header.extend_from_slice(&(records.len() as i32).to_le_bytes());
        for (number, seeker, size) in records {
            header.push(number);
            header.extend_from_slice(&seeker.to_le_bytes());
            header.extend_from_slice(&size.to_le_bytes());
        }
        let checksum = crc(CRC_SEED, &header);
        header.extend_from_slice(&checksum.to_le_bytes());
        header.extend_from_slice(&sentinels::FILE_HEADER_END_AC15);

        let mut file = header;
        file.resize(OBJECTS_START, 0);
        file.extend_from_slice(&objects_blob);
        file.extend_from_slice(&map);
        file
    }
}

// ---------------------------------------------------------------------------
// R2004+ paged file assembly
// ---------------------------------------------------------------------------

pub struct PagedFileBuilder {
    version: DwgVersion,
    objects: Vec<(u64, Vec<u8>)>,
}

impl PagedFileBuilder {
    pub fn new(version: DwgVersion) -> Self {
        assert!(version >= DwgVersion::AC1018 && version != DwgVersion::AC1021);
        Self {
            version,
            objects: Vec::new(),
        }
    }

    pub fn add_object(&mut self, handle: u64, record: Vec<u8>) -> &mut Self {
        self.objects.push((handle, record));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        const PAGE_BASE: u64 = 0x100;
        const PAGE_MAP_ID: u32 = 3;
        const SECTION_MAP_ID: u32 = 4;

        // Section payloads (uncompressed pages).
        let mut objects_blob = Vec::new();
        let mut entries = Vec::new();
        for (handle, record) in &self.objects {
            entries.push((*handle, objects_blob.len() as u64));
            objects_blob.extend_from_slice(record);
        }
        entries.sort_by_key(|&(handle, _)| handle);
        let handles_blob = build_object_map(&entries);

        // Page sizes: data pages are 32-byte header + payload; system
        // sections are 20-byte header + payload.
        let page1_size = 32 + handles_blob.len() as u64;
        let page2_size = 32 + objects_blob.len() as u64;
        let page_map_payload_len = 4 * 8u64;
        let page3_size = 20 + page_map_payload_len;
        let section_map_payload_len = 20 + 2 * (32 + 64 + 16) as u64;
        let page4_size = 20 + section_map_payload_len;

        let page1_addr = PAGE_BASE;
        let page2_addr = page1_addr + page1_size;
        let page3_addr = page2_addr + page2_size;
        let page4_addr = page3_addr + page3_size;

        // File header: version tag, zeros, encrypted block at 0x80.
        let mut file = Vec::new();
        file.extend_from_slice(self.version.as_str().as_bytes());
        file.resize(0x80, 0);

        let mut block = vec![0u8; 0x6C];
        block[0x50..0x54].copy_from_slice(&PAGE_MAP_ID.to_le_bytes());
        block[0x54..0x5C].copy_from_slice(&(page3_addr - PAGE_BASE).to_le_bytes());
        block[0x5C..0x60].copy_from_slice(&SECTION_MAP_ID.to_le_bytes());
        encryption::crypt_header_block(&mut block);
        file.extend_from_slice(&block);
        file.resize(PAGE_BASE as usize, 0);

        // Data pages.
        file.extend_from_slice(&data_page(1, &handles_blob, page1_addr));
        file.extend_from_slice(&data_page(2, &objects_blob, page2_addr));

        // Page map system section: (id, size) pairs in file order.
        let mut page_map = Vec::new();
        for (id, size) in [
            (1i32, page1_size as u32),
            (2, page2_size as u32),
            (PAGE_MAP_ID as i32, page3_size as u32),
            (SECTION_MAP_ID as i32, page4_size as u32),
        ] {
            page_map.extend_from_slice(&id.to_le_bytes());
            page_map.extend_from_slice(&size.to_le_bytes());
        }
        file.extend_from_slice(&system_section(0x4163_0E3B, &page_map));

        // Section map system section.
        let mut section_map = Vec::new();
        section_map.extend_from_slice(&2i32.to_le_bytes()); // section count
        section_map.extend_from_slice(&2i32.to_le_bytes());
        section_map.extend_from_slice(&0x7400i32.to_le_bytes());
        section_map.extend_from_slice(&0i32.to_le_bytes());
        section_map.extend_from_slice(&2i32.to_le_bytes());
        section_entry(&mut section_map, "AcDb:Handles", 1, 1, &handles_blob);
        section_entry(&mut section_map, "AcDb:AcDbObjects", 2, 2, &objects_blob);
        file.extend_from_slice(&system_section(0x4163_003B, &section_map));

        file
    }
}

fn data_page(section_number: u32, payload: &[u8], address: u64) -> Vec<u8> {
    let header = encryption::PageHeader {
        signature: 0x4163_043B,
        section_number,
        compressed_size: payload.len() as u32,
        page_size: payload.len() as u32,
        start_offset: 0,
        header_checksum: 0,
        data_checksum: 0,
    };
    let mut page = encryption::encrypt_page_header(&header, address).to_vec();
    page.extend_from_slice(payload);
    page
}

fn system_section(signature: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&signature.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes()); // decompressed
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes()); // compressed
    out.extend_from_slice(&1u32.to_le_bytes()); // not compressed
    out.extend_from_slice(&0u32.to_le_bytes()); // checksum
    out.extend_from_slice(payload);
    out
}

fn section_entry(out: &mut Vec<u8>, name: &str, section_id: i32, page_number: i32, payload: &[u8]) {
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes()); // total size
    out.extend_from_slice(&1i32.to_le_bytes()); // page count
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes()); // max decompressed
    out.extend_from_slice(&0i32.to_le_bytes()); // unknown
    out.extend_from_slice(&1u32.to_le_bytes()); // compression: none
    out.extend_from_slice(&section_id.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // not encrypted
    let mut name_buf = [0u8; 64];
    name_buf[..name.len()].copy_from_slice(name.as_bytes());
    out.extend_from_slice(&name_buf);
    out.extend_from_slice(&page_number.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes()); // page data size
    out.extend_from_slice(&0u64.to_le_bytes()); // start offset
}

// ---------------------------------------------------------------------------
// Payload writers for the common fixtures
// ---------------------------------------------------------------------------

/// LINE payload: version-dialect endpoint encoding plus BT/BE defaults.
pub fn line_payload(w: &mut BitWriter, start: (f64, f64, f64), end: (f64, f64, f64)) {
    if w.version == DwgVersion::AC1014 {
        w.bd3(start.0, start.1, start.2);
        w.bd3(end.0, end.1, end.2);
    } else {
        let z_is_zero = start.2 == 0.0 && end.2 == 0.0;
        w.bit(z_is_zero as u8);
        w.rd(start.0);
        w.dd(start.0, end.0);
        w.rd(start.1);
        w.dd(start.1, end.1);
        if !z_is_zero {
            w.rd(start.2);
            w.dd(start.2, end.2);
        }
    }
    w.bt(0.0);
    w.be(0.0, 0.0, 1.0);
}

pub fn arc_payload(
    w: &mut BitWriter,
    center: (f64, f64, f64),
    radius: f64,
    start_angle: f64,
    end_angle: f64,
) {
    w.bd3(center.0, center.1, center.2);
    w.bd(radius);
    w.bt(0.0);
    w.be(0.0, 0.0, 1.0);
    w.bd(start_angle);
    w.bd(end_angle);
}

pub fn circle_payload(w: &mut BitWriter, center: (f64, f64, f64), radius: f64) {
    w.bd3(center.0, center.1, center.2);
    w.bd(radius);
    w.bt(0.0);
    w.be(0.0, 0.0, 1.0);
}

pub fn point_payload(w: &mut BitWriter, location: (f64, f64, f64), thickness: f64) {
    w.bd3(location.0, location.1, location.2);
    w.bt(thickness);
    w.be(0.0, 0.0, 1.0);
    w.bd(0.0); // x-axis angle
}

/// LWPOLYLINE payload with optional closure, bulges, and widths.
pub fn lwpolyline_payload(
    w: &mut BitWriter,
    points: &[(f64, f64)],
    bulges: Option<&[f64]>,
    widths: Option<&[(f64, f64)]>,
    closed: bool,
) {
    let mut flags = 0u16;
    if closed {
        flags |= 0x200;
    }
    if bulges.is_some() {
        flags |= 0x10;
    }
    if widths.is_some() {
        flags |= 0x20;
    }
    w.bs(flags);
    w.bl(points.len() as u32);
    if let Some(bulges) = bulges {
        w.bl(bulges.len() as u32);
    }
    if let Some(widths) = widths {
        w.bl(widths.len() as u32);
    }
    for &(x, y) in points {
        w.rd(x);
        w.rd(y);
    }
    if let Some(bulges) = bulges {
        for &b in bulges {
            w.bd(b);
        }
    }
    if let Some(widths) = widths {
        for &(sw, ew) in widths {
            w.bd(sw);
            w.bd(ew);
        }
    }
}

/// TEXT payload (R2000+ data-flag form) with all optional fields elided.
pub fn text_payload(w: &mut BitWriter, insert: (f64, f64), height: f64, value: &str) {
    assert!(w.version >= DwgVersion::AC1015);
    w.byte(0xFF); // every optional field elided
    w.rd(insert.0);
    w.rd(insert.1);
    w.be(0.0, 0.0, 1.0);
    w.bt(0.0);
    w.rd(height);
    w.tv(value);
}

/// MTEXT payload (pre-R2004 form).
pub fn mtext_payload(w: &mut BitWriter, insert: (f64, f64, f64), height: f64, value: &str) {
    assert!(w.version == DwgVersion::AC1015);
    w.bd3(insert.0, insert.1, insert.2);
    w.bd3(0.0, 0.0, 1.0); // extrusion
    w.bd3(1.0, 0.0, 0.0); // x-axis direction
    w.bd(100.0); // reference rectangle width
    w.bd(height);
    w.bs(1); // attachment: top left
    w.bs(1); // drawing direction: left to right
    w.bd(0.0); // extents height
    w.bd(0.0); // extents width
    w.tv(value);
    w.bs(1); // line spacing style
    w.bd(1.0); // line spacing factor
}

/// Linear DIMENSION payload (pre-R2010 form).
pub fn dim_linear_payload(
    w: &mut BitWriter,
    text_midpoint: (f64, f64),
    insert: (f64, f64),
    defpoint2: (f64, f64, f64),
    defpoint3: (f64, f64, f64),
    defpoint: (f64, f64, f64),
) {
    assert!(w.version == DwgVersion::AC1015);
    w.be(0.0, 0.0, 1.0); // extrusion
    w.rd(text_midpoint.0);
    w.rd(text_midpoint.1);
    w.bd(0.0); // elevation
    w.byte(0); // flags
    w.tv(""); // no user text
    w.bd(0.0); // text rotation
    w.bd(0.0); // horizontal direction
    w.bd3(1.0, 1.0, 1.0); // insert scale
    w.bd(0.0); // insert rotation
    w.bs(5); // attachment
    w.bs(1); // line spacing style
    w.bd(1.0); // line spacing factor
    w.bd(0.0); // actual measurement
    w.rd(insert.0); // common insertion point (group 12)
    w.rd(insert.1);
    w.bd3(defpoint2.0, defpoint2.1, defpoint2.2);
    w.bd3(defpoint3.0, defpoint3.1, defpoint3.2);
    w.bd3(defpoint.0, defpoint.1, defpoint.2);
    w.bd(0.0); // rotation
    w.bd(0.0); // extension line rotation
}

/// INSERT payload with unit scales and no attributes.
pub fn insert_payload(w: &mut BitWriter, insert: (f64, f64, f64), rotation: f64) {
    w.bd3(insert.0, insert.1, insert.2);
    if w.version >= DwgVersion::AC1015 {
        w.bits(0b01, 2); // data flags: x scale is 1.0
        w.bits(0b00, 2); // y scale: default (x)
        w.bits(0b00, 2); // z scale: default (x)
    } else {
        w.bd(1.0);
        w.bd(1.0);
        w.bd(1.0);
    }
    w.bd(rotation);
    w.be(0.0, 0.0, 1.0);
    w.bit(0); // no attributes
}

pub fn ray_payload(w: &mut BitWriter, base: (f64, f64, f64), direction: (f64, f64, f64)) {
    w.bd3(base.0, base.1, base.2);
    w.bd3(direction.0, direction.1, direction.2);
}

/// SOLID/TRACE payload: planar corners at a shared elevation.
pub fn solid_payload(w: &mut BitWriter, corners: [(f64, f64); 4], elevation: f64) {
    w.bt(0.0);
    w.bd(elevation);
    for (x, y) in corners {
        w.rd(x);
        w.rd(y);
    }
    w.be(0.0, 0.0, 1.0);
}

/// 3DFACE payload (R2000+ form): first corner raw, the rest as defaults
/// against the previous corner.
pub fn face3d_payload(w: &mut BitWriter, corners: [(f64, f64, f64); 4], invisible_edges: u16) {
    assert!(w.version >= DwgVersion::AC1015);
    w.bit(0); // edge flags present
    let z_is_zero = corners[0].2 == 0.0;
    w.bit(z_is_zero as u8);
    w.rd(corners[0].0);
    w.rd(corners[0].1);
    if !z_is_zero {
        w.rd(corners[0].2);
    }
    for i in 1..4 {
        w.dd(corners[i - 1].0, corners[i].0);
        w.dd(corners[i - 1].1, corners[i].1);
        w.dd(corners[i - 1].2, corners[i].2);
    }
    w.bs(invisible_edges);
}

pub fn ellipse_payload(
    w: &mut BitWriter,
    center: (f64, f64, f64),
    major_axis: (f64, f64, f64),
    ratio: f64,
    start_param: f64,
    end_param: f64,
) {
    w.bd3(center.0, center.1, center.2);
    w.bd3(major_axis.0, major_axis.1, major_axis.2);
    w.bd3(0.0, 0.0, 1.0);
    w.bd(ratio);
    w.bd(start_param);
    w.bd(end_param);
}
