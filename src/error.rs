//! Error types for the dwgscan library

use std::io;
use thiserror::Error;

/// Main error type for DWG decoding operations
#[derive(Debug, Error)]
pub enum DwgError {
    /// IO error occurred during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The 6-byte version signature is not one of the supported release codes
    #[error("Unsupported DWG version: {0:?}")]
    UnsupportedVersion(String),

    /// A section required for decoding is absent from the section locator
    #[error("Missing required section: {0}")]
    MissingSection(String),

    /// CRC checksum mismatch
    #[error("CRC mismatch at offset {offset:#X}: expected {expected:#06X}, got {actual:#06X}")]
    CrcMismatch {
        offset: u64,
        expected: u16,
        actual: u16,
    },

    /// An object's bit stream does not match its declared schema
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A handle was requested that is not present in the object map
    #[error("Unknown handle: {0:#X}")]
    UnknownHandle(u64),

    /// The object's type has no registered decoder
    #[error("No decoder registered for type {0}")]
    UnsupportedType(String),

    /// `to_points` was requested for a type without a point projection
    #[error("No point projection for type {0}")]
    NoPointProjection(String),

    /// A read would advance past the declared bit length of its region
    #[error("Read past end of region at bit {bit}")]
    OutOfBounds { bit: u64 },

    /// Invalid file header
    #[error("Invalid file header: {0}")]
    InvalidHeader(String),

    /// A 16-byte sentinel or section signature did not match
    #[error("Invalid sentinel in {0}")]
    InvalidSentinel(String),

    /// Error expanding a compressed section page
    #[error("Decompression error: {0}")]
    Decompression(String),
}

/// Result type alias for dwgscan operations
pub type Result<T> = std::result::Result<T, DwgError>;
