//! Bit-level reader for DWG object and section data.
//!
//! DWG data is bit-aligned: every value is encoded at an arbitrary bit
//! offset using one of the variable-width bit codes of the format
//! (B, BB, BS, BL, BD, DD, MC, MS, H, T, CMC, ...). The reader tracks the
//! current bit position across byte boundaries, with bit 7 of each byte
//! consumed first.
//!
//! A handful of codes change layout with the release:
//! - **BE** / **BT** gain a default-value flag bit at R2000
//! - **CMC** / entity colors gain true-color payloads at R2004
//! - **T** text switches to UTF-16LE at R2007
//! - **OT** object types switch to a 2-bit pair encoding at R2010
//!
//! Every read fails with [`DwgError::OutOfBounds`] instead of advancing
//! past the end of the region.

use encoding_rs::Encoding;

use crate::error::{DwgError, Result};
use crate::types::{Color, DwgVersion, Vector2, Vector3, VersionFlags};

use super::constants::limits;
use super::object_type::ObjectType;
use super::reference_type::ReferenceType;

/// Bit-level cursor over a borrowed byte region.
#[derive(Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    version: DwgVersion,
    flags: VersionFlags,
    /// Count of consumed bytes, including a partially consumed last byte.
    byte_pos: usize,
    /// Bits already consumed from `last_byte` (0-7).
    bit_shift: u8,
    last_byte: u8,
    /// Set when `set_position_by_flag` found no string stream.
    string_stream_absent: bool,
    encoding: &'static Encoding,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8], version: DwgVersion) -> Self {
        Self {
            data,
            version,
            flags: version.flags(),
            byte_pos: 0,
            bit_shift: 0,
            last_byte: 0,
            string_stream_absent: false,
            encoding: encoding_rs::WINDOWS_1252,
        }
    }

    pub fn version(&self) -> DwgVersion {
        self.version
    }

    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    /// Whether `set_position_by_flag` determined that no string stream exists.
    pub fn string_stream_absent(&self) -> bool {
        self.string_stream_absent
    }

    // ------------------------------------------------------------------
    // Position
    // ------------------------------------------------------------------

    /// Byte position (count of consumed bytes).
    pub fn position(&self) -> u64 {
        self.byte_pos as u64
    }

    /// Move to an absolute byte position; resets the bit shift.
    pub fn set_position(&mut self, pos: u64) {
        self.byte_pos = pos as usize;
        self.bit_shift = 0;
    }

    /// Absolute position in bits.
    pub fn position_in_bits(&self) -> u64 {
        let bits = self.byte_pos as u64 * 8;
        if self.bit_shift > 0 {
            bits + self.bit_shift as u64 - 8
        } else {
            bits
        }
    }

    /// Move to an absolute bit position.
    pub fn set_position_in_bits(&mut self, position: u64) -> Result<()> {
        self.byte_pos = (position >> 3) as usize;
        self.bit_shift = (position & 7) as u8;
        if self.bit_shift > 0 {
            self.advance_byte()?;
        }
        Ok(())
    }

    fn out_of_bounds(&self) -> DwgError {
        DwgError::OutOfBounds {
            bit: self.position_in_bits(),
        }
    }

    fn advance_byte(&mut self) -> Result<()> {
        let byte = *self.data.get(self.byte_pos).ok_or_else(|| self.out_of_bounds())?;
        self.byte_pos += 1;
        self.last_byte = byte;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Raw bit access
    // ------------------------------------------------------------------

    /// **B** — one bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bit_shift == 0 {
            self.advance_byte()?;
            self.bit_shift = 1;
            return Ok(self.last_byte & 0x80 != 0);
        }
        let value = (self.last_byte << self.bit_shift) & 0x80 != 0;
        self.bit_shift = (self.bit_shift + 1) & 7;
        Ok(value)
    }

    /// **BB** — two bits.
    pub fn read_2bits(&mut self) -> Result<u8> {
        let value;
        if self.bit_shift == 0 {
            self.advance_byte()?;
            value = self.last_byte >> 6;
            self.bit_shift = 2;
        } else if self.bit_shift == 7 {
            let high = (self.last_byte << 1) & 2;
            self.advance_byte()?;
            value = high | (self.last_byte >> 7);
            self.bit_shift = 1;
        } else {
            value = (self.last_byte >> (6 - self.bit_shift)) & 3;
            self.bit_shift = (self.bit_shift + 2) & 7;
        }
        Ok(value)
    }

    /// **3B** — three bits (R2010+ BLL length prefix).
    fn read_3bits(&mut self) -> Result<u8> {
        let mut value = 0u8;
        for _ in 0..3 {
            value = (value << 1) | u8::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// One byte, spanning the byte boundary when the cursor is shifted.
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.bit_shift == 0 {
            self.advance_byte()?;
            return Ok(self.last_byte);
        }
        let high = (self.last_byte as u16) << self.bit_shift;
        self.advance_byte()?;
        Ok((high as u8) | (self.last_byte >> (8 - self.bit_shift)))
    }

    /// **RC** — raw char.
    pub fn read_raw_char(&mut self) -> Result<u8> {
        self.read_byte()
    }

    /// `length` bytes, spanning byte boundaries as needed.
    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        if length > limits::MAX_BYTE_READ {
            return Err(DwgError::MalformedRecord(format!(
                "byte read of {length} exceeds sanity limit"
            )));
        }
        if self.bit_shift == 0 {
            let end = self
                .byte_pos
                .checked_add(length)
                .filter(|&e| e <= self.data.len())
                .ok_or_else(|| self.out_of_bounds())?;
            let out = self.data[self.byte_pos..end].to_vec();
            self.byte_pos = end;
            return Ok(out);
        }
        let mut out = Vec::with_capacity(length);
        for _ in 0..length {
            out.push(self.read_byte()?);
        }
        Ok(out)
    }

    /// Skip `length` bytes.
    pub fn advance(&mut self, length: usize) -> Result<()> {
        if self.bit_shift == 0 {
            let end = self
                .byte_pos
                .checked_add(length)
                .filter(|&e| e <= self.data.len())
                .ok_or_else(|| self.out_of_bounds())?;
            self.byte_pos = end;
            Ok(())
        } else {
            self.read_bytes(length).map(|_| ())
        }
    }

    // ------------------------------------------------------------------
    // Raw multi-byte values (little-endian)
    // ------------------------------------------------------------------

    /// **RS** — raw short.
    pub fn read_raw_short(&mut self) -> Result<i16> {
        Ok(self.read_raw_ushort()? as i16)
    }

    /// **RS** — raw unsigned short.
    pub fn read_raw_ushort(&mut self) -> Result<u16> {
        let b0 = self.read_byte()? as u16;
        let b1 = self.read_byte()? as u16;
        Ok(b0 | (b1 << 8))
    }

    /// **RL** — raw long.
    pub fn read_raw_long(&mut self) -> Result<i32> {
        Ok(self.read_raw_ulong()? as i32)
    }

    /// **RL** — raw unsigned long.
    pub fn read_raw_ulong(&mut self) -> Result<u32> {
        let b0 = self.read_byte()? as u32;
        let b1 = self.read_byte()? as u32;
        let b2 = self.read_byte()? as u32;
        let b3 = self.read_byte()? as u32;
        Ok(b0 | (b1 << 8) | (b2 << 16) | (b3 << 24))
    }

    /// **RD** — raw IEEE double.
    pub fn read_raw_double(&mut self) -> Result<f64> {
        let mut bytes = [0u8; 8];
        for slot in bytes.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(f64::from_le_bytes(bytes))
    }

    /// **2RD** — two raw doubles.
    pub fn read_2raw_double(&mut self) -> Result<Vector2> {
        Ok(Vector2::new(self.read_raw_double()?, self.read_raw_double()?))
    }

    /// **3RD** — three raw doubles.
    pub fn read_3raw_double(&mut self) -> Result<Vector3> {
        Ok(Vector3::new(
            self.read_raw_double()?,
            self.read_raw_double()?,
            self.read_raw_double()?,
        ))
    }

    // ------------------------------------------------------------------
    // Bit-coded values
    // ------------------------------------------------------------------

    /// **BS** — modular short: prefix 00 = full short, 01 = one byte,
    /// 10 = 0, 11 = 256.
    pub fn read_bit_short(&mut self) -> Result<i16> {
        match self.read_2bits()? {
            0 => self.read_raw_short(),
            1 => Ok(self.read_byte()? as i16),
            2 => Ok(0),
            3 => Ok(256),
            _ => unreachable!(),
        }
    }

    /// **BL** — modular long: prefix 00 = full long, 01 = one byte, 10 = 0.
    pub fn read_bit_long(&mut self) -> Result<i32> {
        match self.read_2bits()? {
            0 => self.read_raw_long(),
            1 => Ok(self.read_byte()? as i32),
            2 => Ok(0),
            _ => Err(DwgError::MalformedRecord(
                "reserved BL prefix 11".into(),
            )),
        }
    }

    /// **BLL** — 3-bit byte count followed by that many bytes (R2010+).
    pub fn read_bit_long_long(&mut self) -> Result<i64> {
        let size = self.read_3bits()?;
        let mut value: u64 = 0;
        for i in 0..size {
            let b = self.read_byte()? as u64;
            value |= b << (8 * i as u64);
        }
        Ok(value as i64)
    }

    /// **BD** — modular double: prefix 00 = full double, 01 = 1.0, 10 = 0.0.
    pub fn read_bit_double(&mut self) -> Result<f64> {
        match self.read_2bits()? {
            0 => self.read_raw_double(),
            1 => Ok(1.0),
            2 => Ok(0.0),
            _ => Err(DwgError::MalformedRecord(
                "reserved BD prefix 11".into(),
            )),
        }
    }

    /// **DD** — double with default: prefix 00 = default, 01 = patch low
    /// 4 bytes, 10 = patch bytes 4-5 then 0-3, 11 = full double.
    pub fn read_bit_double_with_default(&mut self, default: f64) -> Result<f64> {
        let mut arr = default.to_le_bytes();
        match self.read_2bits()? {
            0 => Ok(default),
            1 => {
                for slot in arr.iter_mut().take(4) {
                    *slot = self.read_byte()?;
                }
                Ok(f64::from_le_bytes(arr))
            }
            2 => {
                arr[4] = self.read_byte()?;
                arr[5] = self.read_byte()?;
                for slot in arr.iter_mut().take(4) {
                    *slot = self.read_byte()?;
                }
                Ok(f64::from_le_bytes(arr))
            }
            3 => self.read_raw_double(),
            _ => unreachable!(),
        }
    }

    /// **2BD** — two bit doubles.
    pub fn read_2bit_double(&mut self) -> Result<Vector2> {
        Ok(Vector2::new(self.read_bit_double()?, self.read_bit_double()?))
    }

    /// **3BD** — three bit doubles.
    pub fn read_3bit_double(&mut self) -> Result<Vector3> {
        Ok(Vector3::new(
            self.read_bit_double()?,
            self.read_bit_double()?,
            self.read_bit_double()?,
        ))
    }

    // ------------------------------------------------------------------
    // Modular (byte-oriented) values
    // ------------------------------------------------------------------

    /// **MC** — unsigned modular char: 7-bit chunks, bit 7 continues.
    pub fn read_modular_char(&mut self) -> Result<u64> {
        let mut byte = self.read_byte()?;
        let mut value = (byte & 0x7F) as u64;
        let mut shift = 0u32;
        while byte & 0x80 != 0 {
            shift += 7;
            if shift > 63 {
                return Err(DwgError::MalformedRecord("modular char overflow".into()));
            }
            byte = self.read_byte()?;
            value |= ((byte & 0x7F) as u64) << shift;
        }
        Ok(value)
    }

    /// **MC** — signed modular char: sign in bit 6 of the final chunk.
    pub fn read_signed_modular_char(&mut self) -> Result<i64> {
        let first = self.read_byte()?;
        if first & 0x80 == 0 {
            let mut value = (first & 0x3F) as i64;
            if first & 0x40 != 0 {
                value = -value;
            }
            return Ok(value);
        }

        let mut value = (first & 0x7F) as i64;
        let mut shift = 0i32;
        loop {
            shift += 7;
            if shift > 62 {
                return Err(DwgError::MalformedRecord("modular char overflow".into()));
            }
            let byte = self.read_byte()?;
            if byte & 0x80 != 0 {
                value |= ((byte & 0x7F) as i64) << shift;
            } else {
                value |= ((byte & 0x3F) as i64) << shift;
                if byte & 0x40 != 0 {
                    value = -value;
                }
                return Ok(value);
            }
        }
    }

    /// **MS** — modular short: 15-bit chunks, bit 15 continues.
    pub fn read_modular_short(&mut self) -> Result<i32> {
        let b0 = self.read_byte()?;
        let b1 = self.read_byte()?;
        let mut value = (b0 as i32) | (((b1 & 0x7F) as i32) << 8);
        let mut shift = 15i32;
        let mut more = b1 & 0x80 != 0;
        while more {
            let b0 = self.read_byte()?;
            let b1 = self.read_byte()?;
            more = b1 & 0x80 != 0;
            value |= (b0 as i32) << shift;
            value |= ((b1 & 0x7F) as i32) << (shift + 8);
            shift += 15;
            if shift > 45 {
                return Err(DwgError::MalformedRecord("modular short overflow".into()));
            }
        }
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Handle references
    // ------------------------------------------------------------------

    /// **H** — handle reference in absolute form.
    pub fn handle_reference(&mut self) -> Result<u64> {
        Ok(self.handle_reference_typed(0)?.0)
    }

    /// **H** — handle reference resolved against the host object's handle.
    pub fn handle_reference_resolved(&mut self, reference_handle: u64) -> Result<u64> {
        Ok(self.handle_reference_typed(reference_handle)?.0)
    }

    /// **H** — handle reference: 4-bit code + 4-bit byte count + big-endian
    /// payload. Codes 0x6/0x8/0xA/0xC are relative to `reference_handle`.
    pub fn handle_reference_typed(
        &mut self,
        reference_handle: u64,
    ) -> Result<(u64, ReferenceType)> {
        let form = self.read_byte()?;
        let code = form >> 4;
        let counter = (form & 0x0F) as usize;
        let reference = ReferenceType::from_code(code);

        let value = match code {
            0..=5 => self.read_handle_payload(counter)?,
            0x6 => reference_handle.wrapping_add(1),
            0x8 => reference_handle.wrapping_sub(1),
            0xA => {
                let offset = self.read_handle_payload(counter)?;
                reference_handle.wrapping_add(offset)
            }
            0xC => {
                let offset = self.read_handle_payload(counter)?;
                reference_handle.wrapping_sub(offset)
            }
            _ => {
                return Err(DwgError::MalformedRecord(format!(
                    "invalid handle reference code {code:#X}"
                )));
            }
        };

        Ok((value, reference))
    }

    fn read_handle_payload(&mut self, length: usize) -> Result<u64> {
        if length > 8 {
            return Err(DwgError::MalformedRecord(format!(
                "handle byte count {length} exceeds 8"
            )));
        }
        let mut value = 0u64;
        for _ in 0..length {
            value = (value << 8) | self.read_byte()? as u64;
        }
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// **T**/**TU** — variable text: BS length followed by code-page bytes
    /// (pre-R2007) or UTF-16LE code units (R2007+).
    pub fn read_variable_text(&mut self) -> Result<String> {
        let length = self.read_bit_short()?;
        if length <= 0 {
            return Ok(String::new());
        }
        if self.flags.r2007_plus {
            let bytes = self.read_bytes((length as usize) << 1)?;
            let (decoded, _, _) = encoding_rs::UTF_16LE.decode(&bytes);
            Ok(decoded.replace('\0', ""))
        } else {
            let bytes = self.read_bytes(length as usize)?;
            let (decoded, _, _) = self.encoding.decode(&bytes);
            Ok(decoded.replace('\0', ""))
        }
    }

    // ------------------------------------------------------------------
    // Sentinel
    // ------------------------------------------------------------------

    /// **SN** — 16-byte sentinel.
    pub fn read_sentinel(&mut self) -> Result<[u8; 16]> {
        let bytes = self.read_bytes(16)?;
        let mut sentinel = [0u8; 16];
        sentinel.copy_from_slice(&bytes);
        Ok(sentinel)
    }

    // ------------------------------------------------------------------
    // Colors
    // ------------------------------------------------------------------

    /// **CMC** — color reference as written for layers and other objects.
    pub fn read_cm_color(&mut self) -> Result<Color> {
        if self.flags.r2004_plus {
            // BS index (written 0), BL packed rgb, RC name-presence byte.
            let _index = self.read_bit_short()?;
            let rgb = self.read_bit_long()? as u32;
            let arr = rgb.to_le_bytes();
            let color = if rgb == 0xC000_0000 {
                Color::ByLayer
            } else if rgb & 0x0100_0000 != 0 {
                Color::from_index(arr[0] as i16)
            } else {
                Color::from_rgb(arr[2], arr[1], arr[0])
            };
            let name_flags = self.read_byte()?;
            if name_flags & 1 != 0 {
                let _color_name = self.read_variable_text()?;
            }
            if name_flags & 2 != 0 {
                let _book_name = self.read_variable_text()?;
            }
            Ok(color)
        } else {
            let index = self.read_bit_short()?;
            Ok(Color::from_index(index))
        }
    }

    /// **ENC** — entity color. Returns the color and whether a color-book
    /// handle follows in the handle stream.
    pub fn read_en_color(&mut self) -> Result<(Color, bool)> {
        if !self.flags.r2004_plus {
            let index = self.read_bit_short()?;
            return Ok((Color::from_index(index), false));
        }

        let word = self.read_bit_short()?;
        if word == 0 {
            return Ok((Color::ByBlock, false));
        }
        let flags = (word as u16) & 0xFF00;
        let mut has_color_handle = false;

        let color = if flags & 0x4000 != 0 {
            // AcDbColor reference; the handle stream carries the reference.
            has_color_handle = true;
            Color::ByBlock
        } else if flags & 0x8000 != 0 {
            let rgb = self.read_bit_long()? as u32;
            let arr = rgb.to_le_bytes();
            Color::from_rgb(arr[2], arr[1], arr[0])
        } else {
            Color::from_index((word & 0x0FFF) as i16)
        };

        if flags & 0x2000 != 0 {
            let _transparency = self.read_bit_long()?;
        }

        Ok((color, has_color_handle))
    }

    // ------------------------------------------------------------------
    // Object types and optimized fields
    // ------------------------------------------------------------------

    /// **OT** — object type code. Returns the resolved fixed type together
    /// with the raw code for class-table lookup.
    pub fn read_object_type(&mut self) -> Result<(ObjectType, u16)> {
        let raw = if self.flags.r2010_plus {
            match self.read_2bits()? {
                0 => self.read_byte()? as u16,
                1 => 0x1F0 + self.read_byte()? as u16,
                _ => self.read_raw_ushort()?,
            }
        } else {
            self.read_bit_short()? as u16
        };
        Ok((ObjectType::from_raw(raw), raw))
    }

    /// **BE** — extrusion: a default flag at R2000+, plain 3BD before.
    pub fn read_bit_extrusion(&mut self) -> Result<Vector3> {
        if self.flags.r2000_plus && self.read_bit()? {
            Ok(Vector3::UNIT_Z)
        } else {
            self.read_3bit_double()
        }
    }

    /// **BT** — thickness: a default flag at R2000+, plain BD before.
    pub fn read_bit_thickness(&mut self) -> Result<f64> {
        if self.flags.r2000_plus && self.read_bit()? {
            Ok(0.0)
        } else {
            self.read_bit_double()
        }
    }

    // ------------------------------------------------------------------
    // Stream framing helpers
    // ------------------------------------------------------------------

    /// Discard the bit shift and read an aligned u16 (the record CRC form).
    pub fn reset_shift(&mut self) -> Result<u16> {
        self.bit_shift = 0;
        self.advance_byte()?;
        let low = self.last_byte as u16;
        self.advance_byte()?;
        Ok(low | ((self.last_byte as u16) << 8))
    }

    /// Position this reader at the start of the R2007+ string stream whose
    /// end-of-data flag sits at bit `position`.
    ///
    /// Returns the start position of the string stream in bits. When the
    /// flag is clear there is no string stream; the reader is exhausted and
    /// [`BitReader::string_stream_absent`] is set.
    pub fn set_position_by_flag(&mut self, position: u64) -> Result<u64> {
        self.set_position_in_bits(position)?;
        let present = self.read_bit()?;
        if !present {
            self.string_stream_absent = true;
            self.set_position(self.data.len() as u64);
            return Ok(position);
        }

        // The size short sits 16 bits before the flag; a set 0x8000 bit
        // means a second short with the high 15 bits sits before that.
        let mut length = position
            .checked_sub(16)
            .ok_or_else(|| self.out_of_bounds())?;
        self.set_position_in_bits(length)?;
        let mut size = self.read_raw_ushort()? as u64;
        if size & 0x8000 != 0 {
            length = length.checked_sub(16).ok_or_else(|| self.out_of_bounds())?;
            self.set_position_in_bits(length)?;
            size &= 0x7FFF;
            let high = self.read_raw_ushort()? as u64;
            size += high << 15;
        }

        let start = length
            .checked_sub(size)
            .ok_or_else(|| self.out_of_bounds())?;
        self.set_position_in_bits(start)?;
        Ok(start)
    }
}
