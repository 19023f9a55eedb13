//! Section locator stage.
//!
//! Turns the version-specific file header into an ordered list of named
//! sections and knows how to produce the decompressed bytes of any of them.
//!
//! - AC1014/AC1015: a flat table of (record number, seeker, size) triples
//!   bracketed by a CRC and an end sentinel.
//! - AC1018/AC1024/AC1027/AC1032: a two-level paged container. An
//!   encrypted header yields a page map, the page map yields a section map,
//!   and each section's data is assembled from per-page headers with
//!   optional LZ77 compression and XOR-masked page headers.
//! - AC1021: the paged model with Reed-Solomon interleaving layered on the
//!   header, the maps, and every data page, plus the AC21 LZ77 variant.

mod ac15;
mod ac18;
mod ac21;

use crate::error::Result;
use crate::types::DwgVersion;

/// One entry of the section locator.
#[derive(Debug, Clone)]
pub struct SectionLocator {
    pub name: String,
    /// File offset of the section (first page for paged containers).
    pub offset: u64,
    /// Declared size: raw bytes for flat files, decompressed bytes for
    /// paged containers.
    pub size: u64,
    pub compressed: bool,
    pub encrypted: bool,
    /// First page id for paged containers.
    pub page_id: Option<i32>,
}

/// Parsed section directory with enough retained state to extract data.
#[derive(Debug)]
pub struct SectionDirectory {
    sections: Vec<SectionLocator>,
    container: Container,
}

#[derive(Debug)]
enum Container {
    Flat(ac15::FlatLocator),
    Paged(ac18::PagedContainer),
    Interleaved(ac21::InterleavedContainer),
}

impl SectionDirectory {
    /// Parse the section locator for the detected version.
    ///
    /// Any CRC, sentinel, or signature mismatch here is file-fatal.
    pub fn parse(data: &[u8], version: DwgVersion) -> Result<Self> {
        match version {
            DwgVersion::AC1014 | DwgVersion::AC1015 => {
                let flat = ac15::FlatLocator::parse(data)?;
                let sections = flat.sections();
                Ok(Self {
                    sections,
                    container: Container::Flat(flat),
                })
            }
            DwgVersion::AC1021 => {
                let container = ac21::InterleavedContainer::parse(data)?;
                let sections = container.sections();
                Ok(Self {
                    sections,
                    container: Container::Interleaved(container),
                })
            }
            _ => {
                let container = ac18::PagedContainer::parse(data)?;
                let sections = container.sections();
                Ok(Self {
                    sections,
                    container: Container::Paged(container),
                })
            }
        }
    }

    /// The ordered, immutable locator entries.
    pub fn sections(&self) -> &[SectionLocator] {
        &self.sections
    }

    /// Extract the decompressed bytes of a named section.
    ///
    /// Returns `None` when the section is not present in the locator.
    pub fn section_data(&self, data: &[u8], name: &str) -> Result<Option<Vec<u8>>> {
        match &self.container {
            Container::Flat(flat) => flat.section_data(data, name),
            Container::Paged(paged) => paged.section_data(data, name),
            Container::Interleaved(container) => container.section_data(data, name),
        }
    }
}
