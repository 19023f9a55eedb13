//! File-format input plumbing.

pub mod dwg;
