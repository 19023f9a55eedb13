//! `AcDb:Classes` section reader.
//!
//! The section is bracketed by 16-byte sentinels and carries a run of class
//! records: BS class number, BS proxy flags, three TV strings (application,
//! C++ class, DXF name), B was-a-zombie, BS item class id, and five BL
//! bookkeeping fields from R2004 on.

use crate::classes::{ClassTable, DxfClass};
use crate::error::{DwgError, Result};
use crate::types::DwgVersion;

use super::bit_reader::BitReader;
use super::constants::sentinels;

/// Parse the decompressed `AcDb:Classes` section bytes.
///
/// `maintenance_version` comes from the file header; AC1024 files with a
/// maintenance version above 3 (and every AC1032 file) carry an extra RL
/// after the size field.
pub fn parse_classes(
    data: &[u8],
    version: DwgVersion,
    maintenance_version: u8,
) -> Result<ClassTable> {
    let flags = version.flags();
    let mut reader = BitReader::new(data, version);

    let sentinel = reader.read_sentinel()?;
    if sentinel != sentinels::CLASSES_START {
        return Err(DwgError::InvalidSentinel("AcDb:Classes (start)".into()));
    }

    // RL: size of the class data area in bytes.
    let size = reader.read_raw_long()? as i64;
    if (version == DwgVersion::AC1024 && maintenance_version > 3)
        || version > DwgVersion::AC1027
    {
        let _high = reader.read_raw_long()?;
    }

    let mut table = ClassTable::new();

    if flags.r2007_plus {
        // R2007+: strings live in a reverse-addressed stream at the end of
        // the class data; the RL here is the data size in bits.
        let bit_size = reader.read_raw_long()? as u64;
        let flag_pos = reader.position_in_bits() + bit_size - 1;
        let mut text_reader = reader.clone();
        let strings_start = text_reader.set_position_by_flag(flag_pos)?;

        // BL 0x00 and the string-stream flag itself.
        let _zero = reader.read_bit_long()?;
        let _flag = reader.read_bit()?;

        while reader.position_in_bits() < strings_start {
            let class = read_class(&mut reader, Some(&mut text_reader), flags.r2004_plus)?;
            table.add_or_update(class);
        }

        reader.set_position_in_bits(flag_pos + 1)?;
    } else {
        let end_section = reader.position() as i64 + size;

        if version == DwgVersion::AC1018 {
            // BS maximum class number, two zero chars, one flag bit.
            let _max_class_number = reader.read_bit_short()?;
            let _zero0 = reader.read_raw_char()?;
            let _zero1 = reader.read_raw_char()?;
            let _flag = reader.read_bit()?;
        }

        while (reader.position() as i64) < end_section {
            let class = read_class(&mut reader, None, flags.r2004_plus)?;
            table.add_or_update(class);
        }
    }

    // RS: CRC over the class data (value not re-checked here).
    let _crc = reader.reset_shift()?;

    let sentinel = reader.read_sentinel()?;
    if sentinel != sentinels::CLASSES_END {
        return Err(DwgError::InvalidSentinel("AcDb:Classes (end)".into()));
    }

    Ok(table)
}

fn read_class(
    reader: &mut BitReader<'_>,
    mut text_reader: Option<&mut BitReader<'_>>,
    r2004_plus: bool,
) -> Result<DxfClass> {
    let mut read_text = |reader: &mut BitReader<'_>| -> Result<String> {
        match text_reader.as_deref_mut() {
            Some(text) => text.read_variable_text(),
            None => reader.read_variable_text(),
        }
    };

    let mut class = DxfClass {
        class_number: reader.read_bit_short()? as u16,
        proxy_flags: reader.read_bit_short()? as u16,
        ..Default::default()
    };
    class.application_name = read_text(&mut *reader)?;
    class.cpp_class_name = read_text(&mut *reader)?;
    class.dxf_name = read_text(&mut *reader)?;
    class.was_zombie = reader.read_bit()?;
    class.item_class_id = reader.read_bit_short()?;

    if r2004_plus {
        class.instance_count = reader.read_bit_long()?;
        let _dwg_version = reader.read_bit_long()?;
        let _maintenance_version = reader.read_bit_long()?;
        let _unknown0 = reader.read_bit_long()?;
        let _unknown1 = reader.read_bit_long()?;
    }

    Ok(class)
}
