//! DWG release codes and pre-computed version flags.
//!
//! Every structure in a DWG file is laid out according to the release code
//! in the first six bytes of the file. The decoder supports AC1014 (R14)
//! through AC1032 (R2018); anything else is rejected at open time.

use crate::error::{DwgError, Result};

/// Supported DWG release codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DwgVersion {
    /// AutoCAD R14
    AC1014,
    /// AutoCAD 2000/2000i/2002
    AC1015,
    /// AutoCAD 2004/2005/2006
    AC1018,
    /// AutoCAD 2007/2008/2009
    AC1021,
    /// AutoCAD 2010/2011/2012
    AC1024,
    /// AutoCAD 2013/2014/2015/2016/2017
    AC1027,
    /// AutoCAD 2018+
    AC1032,
}

impl DwgVersion {
    /// All supported release codes, in release order.
    pub const ALL: [DwgVersion; 7] = [
        DwgVersion::AC1014,
        DwgVersion::AC1015,
        DwgVersion::AC1018,
        DwgVersion::AC1021,
        DwgVersion::AC1024,
        DwgVersion::AC1027,
        DwgVersion::AC1032,
    ];

    /// Probe the version from the first six bytes of a file.
    ///
    /// Total over all 6-byte prefixes: exactly the seven supported codes
    /// succeed, everything else is `UnsupportedVersion`.
    pub fn probe(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 6 {
            return Err(DwgError::UnsupportedVersion(
                String::from_utf8_lossy(bytes).into_owned(),
            ));
        }
        let mut tag = [0u8; 6];
        tag.copy_from_slice(&bytes[..6]);
        match &tag {
            b"AC1014" => Ok(DwgVersion::AC1014),
            b"AC1015" => Ok(DwgVersion::AC1015),
            b"AC1018" => Ok(DwgVersion::AC1018),
            b"AC1021" => Ok(DwgVersion::AC1021),
            b"AC1024" => Ok(DwgVersion::AC1024),
            b"AC1027" => Ok(DwgVersion::AC1027),
            b"AC1032" => Ok(DwgVersion::AC1032),
            _ => Err(DwgError::UnsupportedVersion(
                String::from_utf8_lossy(&tag).into_owned(),
            )),
        }
    }

    /// The 6-character release code string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DwgVersion::AC1014 => "AC1014",
            DwgVersion::AC1015 => "AC1015",
            DwgVersion::AC1018 => "AC1018",
            DwgVersion::AC1021 => "AC1021",
            DwgVersion::AC1024 => "AC1024",
            DwgVersion::AC1027 => "AC1027",
            DwgVersion::AC1032 => "AC1032",
        }
    }

    /// Pre-computed version flags for this release.
    pub fn flags(&self) -> VersionFlags {
        VersionFlags::new(*self)
    }
}

impl std::fmt::Display for DwgVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pre-computed version-conditional flags.
///
/// The handful of layout decisions that depend on the release code are
/// checked through these booleans so version comparisons appear in exactly
/// one place.
#[derive(Debug, Clone, Copy)]
pub struct VersionFlags {
    /// R14 only (AC1014)
    pub r13_14_only: bool,
    /// R2000+ (AC1015+)
    pub r2000_plus: bool,
    /// R2004+ (AC1018+)
    pub r2004_plus: bool,
    /// R2007+ (AC1021+)
    pub r2007_plus: bool,
    /// R2010+ (AC1024+)
    pub r2010_plus: bool,
    /// R2013+ (AC1027+)
    pub r2013_plus: bool,
    /// R2018+ (AC1032)
    pub r2018_plus: bool,
}

impl VersionFlags {
    pub fn new(version: DwgVersion) -> Self {
        Self {
            r13_14_only: version == DwgVersion::AC1014,
            r2000_plus: version >= DwgVersion::AC1015,
            r2004_plus: version >= DwgVersion::AC1018,
            r2007_plus: version >= DwgVersion::AC1021,
            r2010_plus: version >= DwgVersion::AC1024,
            r2013_plus: version >= DwgVersion::AC1027,
            r2018_plus: version >= DwgVersion::AC1032,
        }
    }
}
