//! Core type definitions shared across the bridge.
//!
//! - Identity types (RequestHandle, ScriptName, ObjectHandle)
//! - Script values crossing the VM boundary (ScriptValue)

mod object_handle;
mod request_handle;
mod script_name;
mod script_value;

pub use object_handle::ObjectHandle;
pub use request_handle::RequestHandle;
pub use script_name::ScriptName;
pub use script_value::ScriptValue;
