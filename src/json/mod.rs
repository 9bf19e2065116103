//! JSON accessor layer.
//!
//! Typed, path-based reads over the documents stored for JSON requests.
//! Paths are JSON pointers (`/a/0/b`, with `~0`/`~1` escapes; `""` is the
//! whole document). Every failure returns the caller's default.

mod accessor;

pub use accessor::JsonAccessor;

use serde_json::Value;

/// Conversion from a JSON value to a script-side type.
///
/// Returns `None` when the value cannot be represented as `Self`.
pub trait FromJson: Sized {
    /// Converts `value`, or returns `None`.
    fn from_json(value: &Value) -> Option<Self>;
}

impl FromJson for String {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromJson for bool {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromJson for i32 {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i32::try_from(i).ok()
                } else if let Some(f) = n.as_f64() {
                    let truncated = f.trunc();
                    let in_range = truncated >= f64::from(i32::MIN) && truncated <= f64::from(i32::MAX);
                    (truncated.is_finite() && in_range).then_some(truncated as i32)
                } else {
                    None
                }
            }
            Value::Bool(b) => Some(i32::from(*b)),
            _ => None,
        }
    }
}

impl FromJson for f32 {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(|f| f as f32),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

/// Looks up `path` in `document` and converts the value found there.
#[must_use]
pub fn lookup<T: FromJson>(document: &Value, path: &str) -> Option<T> {
    document.pointer(path).and_then(T::from_json)
}
