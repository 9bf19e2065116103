//! Host engine seams.
//!
//! The bridge never talks to the game engine directly. A host adapter
//! implements these traits on top of the engine's VM and task interface:
//!
//! - [`ScriptHost`]: queues a method call on a bound script instance.
//! - [`TaskQueue`]: runs a closure on the host's single serialized thread.
//!
//! [`LocalTaskQueue`] is a ready-made queue for hosts whose frame loop can
//! drain it.

mod queue;

pub use queue::LocalTaskQueue;

use crate::types::{ObjectHandle, RequestHandle, ScriptName, ScriptValue};
use std::fmt::Debug;

/// Work posted from a background thread to the host thread.
pub type HostTask = Box<dyn FnOnce() + Send + 'static>;

/// Queue of work that the host runs on its main thread, one task at a time,
/// in posting order.
pub trait TaskQueue: Send + Sync + Debug {
    /// Posts `task` to run later on the host thread. Must not run it inline.
    fn add_task(&self, task: HostTask);
}

/// Method dispatch into the scripting VM.
pub trait ScriptHost: Send + Sync + Debug {
    /// Queues a call of `method` with `args` on the instance of `script`
    /// bound to `owner`.
    ///
    /// Called on the host thread while the request registry is locked, so
    /// implementations must queue the call rather than run script code
    /// that re-enters the bridge. Returns false if no such instance is
    /// bound, e.g. because the object unloaded; the bridge ignores that.
    fn dispatch_method(
        &self,
        owner: ObjectHandle,
        script: &ScriptName,
        method: &str,
        args: Vec<ScriptValue>,
    ) -> bool;
}

/// The events delivered to the script that issued a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Callback {
    /// `OnRequestSuccess(handle, body)`, sent for status 200.
    RequestSuccess {
        /// Request the response belongs to
        handle: RequestHandle,
        /// Raw response body
        body: String,
    },
    /// `OnRequestFail(handle, statusCode)`, sent for every other status;
    /// 0 means no response was received.
    RequestFail {
        /// Request the response belongs to
        handle: RequestHandle,
        /// HTTP status, or 0 for a transport failure
        status: i32,
    },
}

impl Callback {
    /// Script event name for successful requests.
    pub const ON_REQUEST_SUCCESS: &'static str = "OnRequestSuccess";
    /// Script event name for failed requests.
    pub const ON_REQUEST_FAIL: &'static str = "OnRequestFail";

    /// The script method this callback invokes.
    #[must_use]
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::RequestSuccess { .. } => Self::ON_REQUEST_SUCCESS,
            Self::RequestFail { .. } => Self::ON_REQUEST_FAIL,
        }
    }

    /// The handle the callback refers to.
    #[must_use]
    pub fn handle(&self) -> RequestHandle {
        match self {
            Self::RequestSuccess { handle, .. } | Self::RequestFail { handle, .. } => *handle,
        }
    }

    /// Converts into the argument list passed to the script method.
    #[must_use]
    pub fn into_args(self) -> Vec<ScriptValue> {
        match self {
            Self::RequestSuccess { handle, body } => vec![handle.into(), ScriptValue::String(body)],
            Self::RequestFail { handle, status } => vec![handle.into(), ScriptValue::Int(status)],
        }
    }

    /// Sends this callback to `script` on `owner` through `host`.
    pub fn dispatch(self, host: &dyn ScriptHost, owner: ObjectHandle, script: &ScriptName) -> bool {
        let method = self.method_name();
        host.dispatch_method(owner, script, method, self.into_args())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_args_are_handle_and_body() {
        let callback = Callback::RequestSuccess {
            handle: RequestHandle::from_raw(4),
            body: "{}".to_string(),
        };
        assert_eq!(callback.method_name(), "OnRequestSuccess");
        assert_eq!(
            callback.into_args(),
            vec![ScriptValue::Int(4), ScriptValue::String("{}".to_string())]
        );
    }

    #[test]
    fn fail_args_are_handle_and_status() {
        let callback = Callback::RequestFail {
            handle: RequestHandle::from_raw(2),
            status: 503,
        };
        assert_eq!(callback.method_name(), "OnRequestFail");
        assert_eq!(callback.handle(), RequestHandle::from_raw(2));
        assert_eq!(
            callback.into_args(),
            vec![ScriptValue::Int(2), ScriptValue::Int(503)]
        );
    }
}
