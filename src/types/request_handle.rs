//! Request handle type.
//!
//! RequestHandle is the integer scripts use to refer to an HTTP request.
//! Handles are issued by the registry from a monotonically increasing
//! counter and are never reused within a process lifetime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer handle identifying one request.
///
/// The wire representation is a 32-bit signed integer because that is the
/// only integer type the scripting runtime understands. Zero is reserved
/// and never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestHandle(i32);

impl RequestHandle {
    /// The reserved "no request" handle.
    pub const NONE: Self = Self(0);

    /// Wraps a raw script integer.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw script integer.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Returns true for handles the registry could have issued.
    #[must_use]
    pub const fn is_issued(self) -> bool {
        self.0 > 0
    }

    /// Returns the handle following this one, or `None` once the
    /// positive `i32` range is exhausted.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl Default for RequestHandle {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RequestHandle> for i32 {
    fn from(handle: RequestHandle) -> Self {
        handle.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_not_issued() {
        assert!(!RequestHandle::NONE.is_issued());
        assert!(!RequestHandle::from_raw(-4).is_issued());
        assert!(RequestHandle::from_raw(1).is_issued());
    }

    #[test]
    fn next_increments() {
        let next = RequestHandle::NONE.next().unwrap();
        assert_eq!(next.get(), 1);
        assert!(next < next.next().unwrap());
    }

    #[test]
    fn next_stops_at_max() {
        assert!(RequestHandle::from_raw(i32::MAX).next().is_none());
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&RequestHandle::from_raw(7)).unwrap();
        assert_eq!(json, "7");
    }
}
