//! The per-handle request record.

use super::CancellationToken;
use crate::types::{ObjectHandle, ScriptName};
use serde_json::Value;

/// One in-flight or completed-but-unread request.
///
/// Created by [`HandleRegistry::allocate`](super::HandleRegistry::allocate)
/// and destroyed only by removal from the registry.
#[derive(Debug, Clone)]
pub struct Request {
    script: ScriptName,
    owner: ObjectHandle,
    canceled: CancellationToken,
    parsed: Option<Value>,
}

impl Request {
    pub(crate) fn new(script: ScriptName, owner: ObjectHandle) -> Self {
        Self {
            script,
            owner,
            canceled: CancellationToken::new(),
            parsed: None,
        }
    }

    /// The script type that issued the request.
    #[must_use]
    pub fn script(&self) -> &ScriptName {
        &self.script
    }

    /// The object that receives callbacks.
    #[must_use]
    pub fn owner(&self) -> ObjectHandle {
        self.owner
    }

    /// The cancellation flag shared with the background work.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.canceled
    }

    /// The parsed response document, if the request was JSON-flavored and
    /// the body parsed.
    #[must_use]
    pub fn document(&self) -> Option<&Value> {
        self.parsed.as_ref()
    }

    /// True iff a parsed JSON document is stored.
    #[must_use]
    pub fn is_json_valid(&self) -> bool {
        self.parsed.is_some()
    }

    /// Stores the outcome of parsing the response body. `None` records a
    /// failed parse and clears any earlier document.
    pub(crate) fn store_document(&mut self, document: Option<Value>) {
        self.parsed = document;
    }
}
