//! Values passed to and from the scripting runtime.

use crate::types::{ObjectHandle, RequestHandle};
use std::fmt;

/// A value crossing the VM boundary, as a native-function argument, a
/// native-function return value, or a callback argument.
///
/// Mirrors the primitive types the scripting language supports. `None`
/// stands for an omitted argument or a function without a return value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    /// No value.
    None,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// 32-bit float.
    Float(f32),
    /// String value.
    String(String),
    /// Array of strings.
    StringArray(Vec<String>),
    /// A game object, already resolved to a VM handle.
    Object(ObjectHandle),
}

impl ScriptValue {
    /// Returns the script-side type name, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::String(_) => "String",
            Self::StringArray(_) => "String[]",
            Self::Object(_) => "Form",
        }
    }

    /// Returns true for [`ScriptValue::None`].
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::StringArray(items) => write!(f, "{items:?}"),
            Self::Object(handle) => write!(f, "[Form {handle}]"),
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ScriptValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for ScriptValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<RequestHandle> for ScriptValue {
    fn from(handle: RequestHandle) -> Self {
        Self::Int(handle.get())
    }
}

impl From<()> for ScriptValue {
    fn from((): ()) -> Self {
        Self::None
    }
}
