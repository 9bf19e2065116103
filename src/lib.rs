//! # script-http: asynchronous HTTP and JSON for game scripts
//!
//! A native plugin that lets scripts running inside a game engine's
//! single-threaded VM issue HTTP GET requests without blocking the game,
//! receive the result through callbacks on the calling script, and read
//! fields out of JSON responses.
//!
//! ## Architecture
//!
//! - **Registry**: request handles, their owners and parsed documents
//! - **Dispatcher**: worker pool performing the network call and posting
//!   the result back to the host thread
//! - **JSON**: typed, defaulting reads by JSON Pointer path
//! - **Lifecycle**: invalidates outstanding requests when a save loads
//! - **Bindings**: the `HTTPUtils` native functions scripts call
//! - **Host**: traits a host adapter implements over the engine
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use script_http::prelude::*;
//!
//! let plugin = Plugin::load(config::load()?, HostServices::new(vm, tasks))?;
//!
//! let ctx = CallContext::new("MyQuestScript");
//! let handle = plugin.bindings().load_json(
//!     &ctx,
//!     quest_form,
//!     "https://example.com/api/weather",
//!     None,
//!     &[],
//!     &[],
//! );
//!
//! // Later, inside OnRequestSuccess:
//! let temp = plugin.bindings().get_json_float(handle, "/current/temp", 0.0);
//! ```

pub mod bindings;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod json;
pub mod lifecycle;
pub mod logging;
pub mod plugin;
pub mod registry;
pub mod transport;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bindings::{
        BindingError, BindingErrorKind, CallContext, HttpUtils, NativeFunction, NativeRegistry,
        SCRIPT_CLASS,
    };
    pub use crate::config::{self, BridgeConfig};
    pub use crate::dispatcher::{RequestDispatcher, RequestSpec, ResponseMode, DEFAULT_TIMEOUT_MS};
    pub use crate::error::{BridgeError, BridgeErrorKind};
    pub use crate::host::{Callback, HostTask, LocalTaskQueue, ScriptHost, TaskQueue};
    pub use crate::json::{FromJson, JsonAccessor};
    pub use crate::lifecycle::{HostMessage, LifecycleListener};
    pub use crate::logging::{LogLevel, LogRotation, LoggingConfig};
    pub use crate::plugin::{HostServices, Plugin};
    pub use crate::registry::{CancellationToken, HandleRegistry, RemoveOutcome};
    pub use crate::transport::{HttpRequest, HttpResponse, HttpTransport, QueryParams, TransportError};
    pub use crate::types::{ObjectHandle, RequestHandle, ScriptName, ScriptValue};
}
