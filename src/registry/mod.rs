//! Handle registry.
//!
//! The registry maps request handles to [`Request`] records and is the only
//! shared mutable state in the bridge. Every operation runs under one mutex
//! and is applied completely or not at all.

mod cancel;
mod request;

pub use cancel::CancellationToken;
pub use request::Request;

use crate::types::{ObjectHandle, RequestHandle, ScriptName};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of a removal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The record existed, belonged to the caller, was canceled and removed.
    Removed,
    /// No record exists for the handle.
    NotFound,
    /// The record belongs to a different script; nothing changed.
    IdentityMismatch,
}

impl RemoveOutcome {
    /// Returns true if the record was removed.
    #[must_use]
    pub fn is_removed(self) -> bool {
        matches!(self, Self::Removed)
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    last_handle: RequestHandle,
    requests: BTreeMap<RequestHandle, Request>,
}

/// Registry of live requests, keyed by handle.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    state: Mutex<RegistryState>,
}

impl HandleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // A panic inside a host callback must not wedge every later request.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a request record under a fresh handle.
    ///
    /// Returns the handle together with the request's cancellation token so
    /// the caller never has to look the record up again. Returns `None` only
    /// when the handle space is exhausted.
    pub fn allocate(
        &self,
        script: ScriptName,
        owner: ObjectHandle,
    ) -> Option<(RequestHandle, CancellationToken)> {
        let mut state = self.lock();
        let handle = state.last_handle.next()?;
        state.last_handle = handle;

        let request = Request::new(script, owner);
        let token = request.cancellation().clone();
        state.requests.insert(handle, request);
        Some((handle, token))
    }

    /// Returns true if a record exists for `handle`.
    #[must_use]
    pub fn contains(&self, handle: RequestHandle) -> bool {
        self.lock().requests.contains_key(&handle)
    }

    /// Runs `f` on the record for `handle` while holding the registry lock.
    ///
    /// Returns `None` if the handle is unknown. `f` must not call back into
    /// the registry.
    pub fn with_request<R>(&self, handle: RequestHandle, f: impl FnOnce(&mut Request) -> R) -> Option<R> {
        let mut state = self.lock();
        state.requests.get_mut(&handle).map(f)
    }

    /// Removes the record for `handle` if `caller` created it, canceling its
    /// background work.
    pub fn remove(&self, handle: RequestHandle, caller: &ScriptName) -> RemoveOutcome {
        let mut state = self.lock();
        let issued_by_caller = match state.requests.get(&handle) {
            None => return RemoveOutcome::NotFound,
            Some(request) => request.script() == caller,
        };
        if !issued_by_caller {
            return RemoveOutcome::IdentityMismatch;
        }

        if let Some(request) = state.requests.remove(&handle) {
            request.cancellation().cancel();
        }
        RemoveOutcome::Removed
    }

    /// Cancels every record and empties the registry. Returns how many
    /// records were dropped.
    pub fn invalidate_all(&self) -> usize {
        let mut state = self.lock();
        for request in state.requests.values() {
            request.cancellation().cancel();
        }
        let count = state.requests.len();
        state.requests.clear();
        count
    }

    /// Number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().requests.len()
    }

    /// Returns true if no records are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().requests.is_empty()
    }

    /// The most recently issued handle, or [`RequestHandle::NONE`].
    #[must_use]
    pub fn last_handle(&self) -> RequestHandle {
        self.lock().last_handle
    }

    #[cfg(test)]
    pub(crate) fn with_last_handle(last: RequestHandle) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                last_handle: last,
                requests: BTreeMap::new(),
            }),
        }
    }
}
