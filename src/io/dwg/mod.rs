//! DWG binary format internals.
//!
//! The modules here follow the decode pipeline: bit-level reading,
//! integrity (CRC, sentinels), the compression and interleaving codecs,
//! the version-specific section locator, the object map, the class table
//! reader, and the per-type object decoders.

pub mod bit_reader;
pub mod classes_reader;
pub mod compression;
pub mod constants;
pub mod crc;
pub mod encryption;
pub mod locator;
pub mod object_decoder;
pub mod object_map;
pub mod object_type;
pub mod reed_solomon;
pub mod reference_type;
