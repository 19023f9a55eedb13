//! Object handle type.
//!
//! A handle is a 64-bit unsigned identifier that names one object within a
//! DWG file. It is stable across sessions and is not a pointer; all
//! cross-references between objects are expressed as handles and resolved
//! through the object map.

use std::fmt;

/// A unique identifier for one object in a DWG file.
///
/// Handle 0 is reserved and never names a real object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Handle(pub u64);

impl Handle {
    /// The null handle (0).
    pub const NULL: Handle = Handle(0);

    #[inline]
    pub const fn new(value: u64) -> Self {
        Handle(value)
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Handle {
    fn from(value: u64) -> Self {
        Handle(value)
    }
}

impl From<Handle> for u64 {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_value() {
        assert_eq!(Handle::new(0x1E).value(), 0x1E);
    }

    #[test]
    fn test_null_handle() {
        assert!(Handle::NULL.is_null());
        assert!(!Handle::new(1).is_null());
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(Handle::new(0x1F).to_string(), "0x1F");
    }
}
