//! Constants, sentinel bytes, and magic numbers for the DWG file format.

/// Section name constants.
pub mod section_names {
    /// All entities, table entries, and objects
    pub const ACDB_OBJECTS: &str = "AcDb:AcDbObjects";
    /// System variables (header variables)
    pub const HEADER: &str = "AcDb:Header";
    /// DXF class definitions
    pub const CLASSES: &str = "AcDb:Classes";
    /// Object map (handle to file offset)
    pub const HANDLES: &str = "AcDb:Handles";
    /// Free space information
    pub const OBJ_FREE_SPACE: &str = "AcDb:ObjFreeSpace";
    /// Template metadata
    pub const TEMPLATE: &str = "AcDb:Template";
    /// Auxiliary header data
    pub const AUX_HEADER: &str = "AcDb:AuxHeader";
    /// Thumbnail preview image
    pub const PREVIEW: &str = "AcDb:Preview";
    /// Document summary information (AC18+)
    pub const SUMMARY_INFO: &str = "AcDb:SummaryInfo";

    /// Section name for an index in the AC15 flat locator table.
    pub fn ac15_name_for_record(record_number: u8) -> Option<&'static str> {
        match record_number {
            0 => Some(HEADER),
            1 => Some(CLASSES),
            2 => Some(HANDLES),
            3 => Some(OBJ_FREE_SPACE),
            4 => Some(TEMPLATE),
            5 => Some(AUX_HEADER),
            _ => None,
        }
    }
}

/// Sentinel bytes for section boundaries (16-byte markers).
pub mod sentinels {
    /// AcDb:Classes section start sentinel
    pub const CLASSES_START: [u8; 16] = [
        0x8D, 0xA1, 0xC4, 0xB8, 0xC4, 0xA9, 0xF8, 0xC5, 0xC0, 0xDC, 0xF4, 0x5F, 0xE7, 0xCF,
        0xB6, 0x8A,
    ];
    /// AcDb:Classes section end sentinel
    pub const CLASSES_END: [u8; 16] = [
        0x72, 0x5E, 0x3B, 0x47, 0x3B, 0x56, 0x07, 0x3A, 0x3F, 0x23, 0x0B, 0xA0, 0x18, 0x30,
        0x49, 0x75,
    ];
    /// File header end sentinel (AC1014/AC1015 flat locator)
    pub const FILE_HEADER_END_AC15: [u8; 16] = [
        0x95, 0xA0, 0x4E, 0x28, 0x99, 0x82, 0x1A, 0xE5, 0x5E, 0x41, 0xE0, 0x5F, 0x9D, 0x3A,
        0x4D, 0x00,
    ];
}

/// AC18 (R2004+) paged container constants.
pub mod ac18 {
    /// File offset of the encrypted header metadata block.
    pub const ENCRYPTED_HEADER_OFFSET: u64 = 0x80;
    /// Size of the encrypted header metadata block.
    pub const ENCRYPTED_HEADER_SIZE: usize = 0x6C;
    /// XOR mask base for data-page headers.
    pub const DATA_PAGE_MASK: u32 = 0x4164536B;
    /// Pages start after the 0x100-byte file header.
    pub const PAGE_BASE_OFFSET: u64 = 0x100;
    /// System section signature for the page map.
    pub const PAGE_MAP_SIGNATURE: u32 = 0x4163_0E3B;
    /// System section signature for the section map.
    pub const SECTION_MAP_SIGNATURE: u32 = 0x4163_003B;
    /// Page header signature for data section pages.
    pub const DATA_SECTION_SIGNATURE: u32 = 0x4163_043B;
    /// Compression code meaning "LZ77 compressed".
    pub const COMPRESSED: u32 = 2;
}

/// AC21 (R2007) container constants.
pub mod ac21 {
    /// Data pages start after the 0x480-byte Reed-Solomon header region.
    pub const DATA_PAGE_BASE_OFFSET: u64 = 0x480;
    /// Size of the Reed-Solomon encoded file header block at 0x80.
    pub const RS_ENCODED_HEADER_SIZE: usize = 0x400;
    /// Reed-Solomon block size used for the file header (3 tracks).
    pub const RS_HEADER_BLOCK_SIZE: usize = 239;
    /// Reed-Solomon data block size used for section pages.
    pub const RS_PAGE_BLOCK_SIZE: usize = 251;
    /// Decompressed size of the file header metadata.
    pub const DECOMPRESSED_HEADER_SIZE: usize = 0x110;
    /// Page header signature for AC21 data pages.
    pub const DATA_SECTION_SIGNATURE: u64 = 0x4163_043B;
}

/// Limits applied while walking file-supplied counts.
pub mod limits {
    /// Object-map pages are cut off at this many payload bytes.
    pub const MAX_MAP_PAGE_SIZE: usize = 2032;
    /// Reactor counts beyond this indicate a misaligned stream.
    pub const MAX_REACTORS: usize = 10_000;
    /// Vertex counts beyond this indicate a misaligned stream.
    pub const MAX_VERTICES: usize = 10_000_000;
    /// Single bulk byte reads are capped at 16 MB.
    pub const MAX_BYTE_READ: usize = 16 * 1024 * 1024;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ac15_record_names() {
        assert_eq!(
            section_names::ac15_name_for_record(2),
            Some(section_names::HANDLES)
        );
        assert_eq!(
            section_names::ac15_name_for_record(1),
            Some(section_names::CLASSES)
        );
        assert_eq!(section_names::ac15_name_for_record(9), None);
    }

    #[test]
    fn test_sentinels_are_distinct() {
        assert_ne!(sentinels::CLASSES_START, sentinels::CLASSES_END);
    }
}
