//! Host object handle type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque VM handle for the game object a script is bound to.
///
/// The host's handle policy produces this from a game object reference.
/// Together with a [`ScriptName`](super::ScriptName) it identifies the
/// script instance that receives callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectHandle(u64);

impl ObjectHandle {
    /// No game object. Callbacks for requests owned by it go nowhere.
    pub const NONE: Self = Self(0);

    /// Wraps a raw VM handle.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw VM handle.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
