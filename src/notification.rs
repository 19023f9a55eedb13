//! Diagnostic side channel for record-local failures.
//!
//! File-fatal errors abort `DwgCatalog::open`; everything after that point
//! is record-local. Instead of failing the whole catalog, a skipped or
//! suspicious object is reported here with enough context to find it again
//! in the file.

use std::fmt;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational (duplicate handle in the object map, unknown class).
    Warning,
    /// A record failed to decode and was skipped.
    Error,
}

/// One entry in the diagnostic side channel.
#[derive(Debug, Clone)]
pub struct Notification {
    pub severity: Severity,
    /// Handle of the object the notification concerns, when known.
    pub handle: Option<u64>,
    /// Byte offset of the record within its object region.
    pub offset: u64,
    /// Raw type code, when the record preamble was readable.
    pub type_code: Option<u16>,
    pub message: String,
}

impl Notification {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            handle: None,
            offset: 0,
            type_code: None,
            message: message.into(),
        }
    }

    pub fn record_error(
        handle: u64,
        offset: u64,
        type_code: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            handle: Some(handle),
            offset,
            type_code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.handle {
            Some(h) => write!(
                f,
                "[{:?}] handle {:#X} at offset {:#X}: {}",
                self.severity, h, self.offset, self.message
            ),
            None => write!(f, "[{:?}] {}", self.severity, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_display() {
        let n = Notification::record_error(0x1E, 0x40, Some(0x13), "CRC mismatch");
        let text = n.to_string();
        assert!(text.contains("0x1E"));
        assert!(text.contains("CRC mismatch"));
    }

    #[test]
    fn test_warning_has_no_handle() {
        let n = Notification::warning("duplicate handle 0x20 in object map");
        assert_eq!(n.handle, None);
        assert_eq!(n.severity, Severity::Warning);
    }
}
