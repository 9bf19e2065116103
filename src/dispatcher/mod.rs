//! Request dispatcher.
//!
//! Turns a script request into background work and its eventual callback:
//!
//! 1. `issue` allocates a handle and queues a job on the [`WorkerPool`].
//! 2. The worker skips canceled jobs, performs the blocking GET, checks the
//!    cancellation flag again and, for JSON requests, parses the body.
//! 3. The worker posts a delivery task to the host [`TaskQueue`].
//! 4. On the host thread the delivery re-checks the flag, looks the handle
//!    up under the registry lock, stores the parsed document and dispatches
//!    `OnRequestSuccess` or `OnRequestFail`.
//!
//! Workers never touch the registry or the script VM; only the delivery
//! step does, and only on the host thread.

mod pool;

pub use pool::{Job, WorkerPool};

use crate::host::{Callback, ScriptHost, TaskQueue};
use crate::registry::{CancellationToken, HandleRegistry, RemoveOutcome};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, QueryParams};
use crate::types::{ObjectHandle, RequestHandle, ScriptName};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default request timeout when the script does not pass one.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// How the response body is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Deliver the body as text only (`LoadURL`).
    #[default]
    Text,
    /// Also parse the body as JSON for the accessors (`LoadJSON`).
    Json,
}

/// Everything a script supplies for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    /// Target URL
    pub url: String,
    /// Timeout in milliseconds; `None` or a value of zero or less uses
    /// the dispatcher's default
    pub timeout_ms: Option<i32>,
    /// Query parameters
    pub params: QueryParams,
    /// Body interpretation
    pub mode: ResponseMode,
}

impl RequestSpec {
    /// A text request to `url` with default timeout and no parameters.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: None,
            params: QueryParams::new(),
            mode: ResponseMode::Text,
        }
    }

    /// Sets the timeout in milliseconds.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: i32) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    /// Sets the response mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ResponseMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Issues and cancels script requests.
pub struct RequestDispatcher {
    delivery: Arc<Delivery>,
    queue: Arc<dyn TaskQueue>,
    transport: Arc<dyn HttpTransport>,
    pool: WorkerPool,
    default_timeout: Duration,
}

impl fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("transport", &self.transport)
            .field("workers", &self.pool.size())
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl RequestDispatcher {
    /// Creates a dispatcher over the given registry and host services.
    #[must_use]
    pub fn new(
        registry: Arc<HandleRegistry>,
        host: Arc<dyn ScriptHost>,
        queue: Arc<dyn TaskQueue>,
        transport: Arc<dyn HttpTransport>,
        pool: WorkerPool,
        default_timeout: Duration,
    ) -> Self {
        Self {
            delivery: Arc::new(Delivery { registry, host }),
            queue,
            transport,
            pool,
            default_timeout,
        }
    }

    /// The registry requests are recorded in.
    #[must_use]
    pub fn registry(&self) -> &Arc<HandleRegistry> {
        &self.delivery.registry
    }

    /// The timeout used when a request does not specify one.
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Starts a request on behalf of `caller`, with callbacks going to
    /// `owner`. Returns the new handle immediately.
    ///
    /// Never fails from the script's point of view. If the handle space is
    /// exhausted it returns [`RequestHandle::NONE`] and nothing is sent.
    pub fn issue(&self, caller: &ScriptName, owner: ObjectHandle, spec: RequestSpec) -> RequestHandle {
        let Some((handle, token)) = self.delivery.registry.allocate(caller.clone(), owner) else {
            tracing::error!(script = %caller, "request handle space exhausted; request dropped");
            return RequestHandle::NONE;
        };

        let timeout = self.resolve_timeout(spec.timeout_ms);
        tracing::debug!(
            handle = handle.get(),
            script = %caller,
            url = %spec.url,
            params = spec.params.len(),
            timeout_ms = timeout.as_millis() as u64,
            mode = ?spec.mode,
            "issuing request"
        );

        let job = RequestJob {
            handle,
            token: token.clone(),
            request: HttpRequest {
                url: spec.url,
                params: spec.params,
                timeout,
            },
            mode: spec.mode,
            transport: Arc::clone(&self.transport),
            queue: Arc::clone(&self.queue),
            delivery: Arc::clone(&self.delivery),
        };

        if !self.pool.execute(Box::new(move || job.run())) {
            tracing::warn!(
                handle = handle.get(),
                "worker pool is shut down; request will never complete"
            );
            token.cancel();
        }

        handle
    }

    /// Cancels `handle` on behalf of `caller`.
    ///
    /// The record is removed and its background work told to discard the
    /// result only if `caller` issued the request. Unknown handles and
    /// foreign requests are left alone.
    pub fn cancel(&self, caller: &ScriptName, handle: RequestHandle) -> RemoveOutcome {
        let outcome = self.delivery.registry.remove(handle, caller);
        match outcome {
            RemoveOutcome::Removed => {
                tracing::debug!(handle = handle.get(), script = %caller, "request destroyed");
            }
            RemoveOutcome::IdentityMismatch => {
                tracing::debug!(
                    handle = handle.get(),
                    script = %caller,
                    "ignoring destroy from a script that did not issue the request"
                );
            }
            RemoveOutcome::NotFound => {
                tracing::trace!(handle = handle.get(), "destroy of unknown handle");
            }
        }
        outcome
    }

    /// Stops accepting requests without waiting for in-flight ones. Their
    /// results are discarded if their requests were canceled.
    pub fn close(&self) {
        self.pool.close();
    }

    /// Stops accepting requests and waits up to `timeout` for in-flight
    /// ones to finish. Returns true if every worker exited in time.
    ///
    /// Blocks the calling thread; hosts should prefer [`close`](Self::close).
    pub fn shutdown_timeout(&self, timeout: Duration) -> bool {
        self.pool.shutdown_timeout(timeout)
    }

    fn resolve_timeout(&self, timeout_ms: Option<i32>) -> Duration {
        match timeout_ms {
            Some(ms) => u64::try_from(ms)
                .ok()
                .filter(|&ms| ms > 0)
                .map_or(self.default_timeout, Duration::from_millis),
            None => self.default_timeout,
        }
    }
}

/// Host-thread half of a request: the registry and the VM.
#[derive(Debug)]
struct Delivery {
    registry: Arc<HandleRegistry>,
    host: Arc<dyn ScriptHost>,
}

/// A finished network call waiting to be delivered.
struct Completion {
    handle: RequestHandle,
    token: CancellationToken,
    response: HttpResponse,
    mode: ResponseMode,
    document: Option<Value>,
}

impl Delivery {
    fn deliver(&self, completion: Completion) {
        let handle = completion.handle;
        if completion.token.is_canceled() {
            tracing::debug!(handle = handle.get(), "request canceled before delivery");
            return;
        }

        let status = completion.response.status;
        let dispatched = self.registry.with_request(handle, move |request| {
            let callback = if completion.response.is_ok() {
                if completion.mode == ResponseMode::Json {
                    request.store_document(completion.document);
                }
                Callback::RequestSuccess {
                    handle,
                    body: completion.response.body,
                }
            } else {
                Callback::RequestFail {
                    handle,
                    status: i32::from(completion.response.status),
                }
            };
            callback.dispatch(self.host.as_ref(), request.owner(), request.script())
        });

        match dispatched {
            Some(true) => {
                tracing::trace!(handle = handle.get(), status, "callback dispatched");
            }
            Some(false) => {
                tracing::debug!(
                    handle = handle.get(),
                    "no script instance bound to the request owner; callback dropped"
                );
            }
            None => {
                tracing::debug!(
                    handle = handle.get(),
                    "request no longer registered; result dropped"
                );
            }
        }
    }
}

/// Worker-thread half of a request.
struct RequestJob {
    handle: RequestHandle,
    token: CancellationToken,
    request: HttpRequest,
    mode: ResponseMode,
    transport: Arc<dyn HttpTransport>,
    queue: Arc<dyn TaskQueue>,
    delivery: Arc<Delivery>,
}

impl RequestJob {
    fn run(self) {
        let handle = self.handle;
        if self.token.is_canceled() {
            tracing::debug!(handle = handle.get(), "request canceled before it was sent");
            return;
        }

        let response = match self.transport.get(&self.request) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(handle = handle.get(), error = %e, "request failed without a response");
                HttpResponse::new(0, "")
            }
        };

        if self.token.is_canceled() {
            tracing::debug!(handle = handle.get(), "request canceled in flight; result discarded");
            return;
        }

        let document = match self.mode {
            ResponseMode::Json if response.is_ok() => parse_document(handle, &response.body),
            _ => None,
        };

        tracing::debug!(handle = handle.get(), status = response.status, "request completed");

        let completion = Completion {
            handle,
            token: self.token,
            response,
            mode: self.mode,
            document,
        };
        let delivery = self.delivery;
        self.queue
            .add_task(Box::new(move || delivery.deliver(completion)));
    }
}

fn parse_document(handle: RequestHandle, body: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(document) => Some(document),
        Err(e) => {
            tracing::debug!(handle = handle.get(), error = %e, "response body is not valid JSON");
            None
        }
    }
}
