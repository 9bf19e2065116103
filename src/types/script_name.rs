//! Script identity type.
//!
//! ScriptName is the name of the script type that issued a call. It is the
//! identity checked when a request is destroyed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The name of a script type, as reported by the host VM for the calling
/// stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptName(String);

impl ScriptName {
    /// Creates a script name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScriptName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ScriptName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for ScriptName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
