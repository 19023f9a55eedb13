//! LZ77 decompression for the DWG paged container.
//!
//! The format uses two incompatible LZ77 variants:
//! - **AC18** for R2004, R2010, R2013 and R2018 section pages
//! - **AC21** for R2007 section pages (combined with Reed-Solomon
//!   de-interleaving)
//!
//! This crate is a reader; the matching compressors are not implemented.

pub mod lz77_ac18;
pub mod lz77_ac21;
