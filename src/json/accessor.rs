//! Handle-keyed reads over the registry.

use super::{lookup, FromJson};
use crate::registry::HandleRegistry;
use crate::types::RequestHandle;
use std::sync::Arc;

/// Reads parsed JSON documents out of the registry.
///
/// Reads are not authorized by script identity: any script holding a
/// handle can read its document.
#[derive(Debug, Clone)]
pub struct JsonAccessor {
    registry: Arc<HandleRegistry>,
}

impl JsonAccessor {
    /// Creates an accessor over `registry`.
    #[must_use]
    pub fn new(registry: Arc<HandleRegistry>) -> Self {
        Self { registry }
    }

    /// True iff the request exists and holds a successfully parsed document.
    #[must_use]
    pub fn validated(&self, handle: RequestHandle) -> bool {
        self.registry
            .with_request(handle, |request| request.is_json_valid())
            .unwrap_or(false)
    }

    /// Reads the value at `path` as `T`, or returns `default` if the handle
    /// is unknown, no document is stored, the path is missing or malformed,
    /// or the value does not convert.
    #[must_use]
    pub fn get<T: FromJson>(&self, handle: RequestHandle, path: &str, default: T) -> T {
        self.registry
            .with_request(handle, |request| {
                request.document().and_then(|document| lookup(document, path))
            })
            .flatten()
            .unwrap_or(default)
    }
}
