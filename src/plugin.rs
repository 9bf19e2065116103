//! Plugin entry point.
//!
//! [`Plugin`] wires the pieces together for a host adapter: logging, the
//! HTTP transport, the handle registry, the worker pool, the dispatcher,
//! the script bindings and the lifecycle listener.
//!
//! ```rust,ignore
//! let plugin = Plugin::load(config::load()?, HostServices::new(vm, tasks))?;
//! HttpUtils::register(&mut native_table);
//! // route native calls to plugin.bindings().call(...)
//! // route host messages to plugin.on_message(...)
//! ```

use crate::bindings::HttpUtils;
use crate::config::BridgeConfig;
use crate::dispatcher::{RequestDispatcher, WorkerPool};
use crate::error::BridgeError;
use crate::host::{ScriptHost, TaskQueue};
use crate::lifecycle::{HostMessage, LifecycleListener};
use crate::logging;
use crate::registry::HandleRegistry;
use crate::transport::{BlockingTransport, HttpTransport};
use std::sync::Arc;
use std::time::Duration;

/// Prefix for worker thread names.
const WORKER_NAME: &str = "script-http-worker";

/// Services the host engine provides to the plugin.
#[derive(Debug, Clone)]
pub struct HostServices {
    /// Method dispatch into the scripting VM
    pub script_host: Arc<dyn ScriptHost>,
    /// The host's main-thread task queue
    pub task_queue: Arc<dyn TaskQueue>,
}

impl HostServices {
    /// Bundles the host services.
    #[must_use]
    pub fn new(script_host: Arc<dyn ScriptHost>, task_queue: Arc<dyn TaskQueue>) -> Self {
        Self {
            script_host,
            task_queue,
        }
    }
}

/// A loaded plugin instance.
#[derive(Debug)]
pub struct Plugin {
    config: BridgeConfig,
    dispatcher: Arc<RequestDispatcher>,
    bindings: HttpUtils,
    listener: LifecycleListener,
}

impl Plugin {
    /// Loads the plugin with the reqwest transport.
    ///
    /// File logging is set up first if enabled. A logging failure is
    /// reported and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] if `config` is invalid, the HTTP client
    /// cannot be built, or the worker threads cannot be spawned.
    pub fn load(config: BridgeConfig, services: HostServices) -> Result<Self, BridgeError> {
        config.validate()?;
        init_logging(&config);
        let transport = BlockingTransport::new(&config.user_agent)?;
        Self::with_transport(config, services, Arc::new(transport))
    }

    /// Loads the plugin with a custom transport. Logging is left to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] if `config` is invalid or the worker
    /// threads cannot be spawned.
    pub fn with_transport(
        config: BridgeConfig,
        services: HostServices,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, BridgeError> {
        config.validate()?;

        let registry = Arc::new(HandleRegistry::new());
        let pool = WorkerPool::new(config.worker_threads, WORKER_NAME)?;
        let dispatcher = Arc::new(RequestDispatcher::new(
            Arc::clone(&registry),
            services.script_host,
            services.task_queue,
            transport,
            pool,
            config.default_timeout(),
        ));
        let bindings = HttpUtils::new(Arc::clone(&dispatcher));
        let listener = LifecycleListener::new(registry);

        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            workers = config.worker_threads,
            default_timeout_ms = config.default_timeout_ms,
            "script-http loaded"
        );

        Ok(Self {
            config,
            dispatcher,
            bindings,
            listener,
        })
    }

    /// The configuration the plugin was loaded with.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The script-facing native functions.
    #[must_use]
    pub fn bindings(&self) -> &HttpUtils {
        &self.bindings
    }

    /// The registry of outstanding requests.
    #[must_use]
    pub fn registry(&self) -> &Arc<HandleRegistry> {
        self.dispatcher.registry()
    }

    /// The host lifecycle listener.
    #[must_use]
    pub fn listener(&self) -> &LifecycleListener {
        &self.listener
    }

    /// Forwards a host message to the lifecycle listener.
    pub fn on_message(&self, message: HostMessage) -> usize {
        self.listener.on_message(message)
    }

    /// Cancels every outstanding request and stops accepting new ones.
    ///
    /// Never blocks: workers still inside a network call finish in the
    /// background and their results are discarded. Safe to call more than
    /// once.
    pub fn shutdown(&self) {
        let invalidated = self.registry().invalidate_all();
        self.dispatcher.close();
        tracing::info!(invalidated, "script-http shut down");
    }

    /// Like [`shutdown`](Self::shutdown), then waits up to `timeout` for the
    /// workers to exit. Returns true if they all did.
    ///
    /// Blocks the calling thread, so it is meant for process teardown
    /// rather than the host's frame loop.
    pub fn shutdown_timeout(&self, timeout: Duration) -> bool {
        self.shutdown();
        self.dispatcher.shutdown_timeout(timeout)
    }
}

impl Drop for Plugin {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn init_logging(config: &BridgeConfig) {
    match logging::init_file_logging(&config.logging) {
        Ok(true) => tracing::debug!("file logging initialized"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "file logging unavailable"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::{CallContext, NativeFunction};
    use crate::host::LocalTaskQueue;
    use crate::transport::{HttpRequest, HttpResponse, TransportError};
    use crate::types::{ObjectHandle, RequestHandle, ScriptName, ScriptValue};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::Mutex;
    use std::time::Instant;

    #[derive(Debug)]
    struct FixedTransport;

    impl HttpTransport for FixedTransport {
        fn get(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(200, r#"{"ok":true}"#))
        }
    }

    /// Blocks every request until released or the request's timeout passes.
    #[derive(Debug)]
    struct StalledTransport {
        started: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
    }

    impl HttpTransport for StalledTransport {
        fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let _ = self.started.lock().unwrap().send(());
            match self.release.lock().unwrap().recv_timeout(request.timeout) {
                Ok(()) => Ok(HttpResponse::new(200, "late")),
                Err(_) => Err(TransportError::timeout(&request.url, request.timeout)),
            }
        }
    }

    #[derive(Debug, Default)]
    struct RecordingHost {
        calls: Mutex<Vec<(String, Vec<ScriptValue>)>>,
    }

    impl ScriptHost for RecordingHost {
        fn dispatch_method(
            &self,
            _owner: ObjectHandle,
            _script: &ScriptName,
            method: &str,
            args: Vec<ScriptValue>,
        ) -> bool {
            self.calls.lock().unwrap().push((method.to_string(), args));
            true
        }
    }

    fn plugin(config: BridgeConfig) -> (Plugin, Arc<RecordingHost>, Arc<LocalTaskQueue>) {
        let host = Arc::new(RecordingHost::default());
        let queue = Arc::new(LocalTaskQueue::new());
        let services = HostServices::new(host.clone(), queue.clone());
        let plugin = Plugin::with_transport(config, services, Arc::new(FixedTransport)).unwrap();
        (plugin, host, queue)
    }

    #[test]
    fn rejects_invalid_config() {
        let services = HostServices::new(
            Arc::new(RecordingHost::default()),
            Arc::new(LocalTaskQueue::new()),
        );
        let config = BridgeConfig::new().without_logging().with_worker_threads(0);
        let error = Plugin::with_transport(config, services, Arc::new(FixedTransport)).unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn load_builds_reqwest_transport() {
        let services = HostServices::new(
            Arc::new(RecordingHost::default()),
            Arc::new(LocalTaskQueue::new()),
        );
        let config = BridgeConfig::new().without_logging().with_worker_threads(1);
        let plugin = Plugin::load(config, services).unwrap();
        assert!(plugin.registry().is_empty());
        assert_eq!(plugin.config().worker_threads, 1);
    }

    #[test]
    fn request_round_trip_through_bindings() {
        let (plugin, host, queue) = plugin(BridgeConfig::new().without_logging());
        let ctx = CallContext::new("MyQuest");

        let handle = plugin
            .bindings()
            .call(
                &ctx,
                NativeFunction::LoadJson,
                &[
                    ScriptValue::Object(ObjectHandle::from_raw(3)),
                    ScriptValue::from("http://example.com/"),
                ],
            )
            .unwrap();
        assert_eq!(handle, ScriptValue::Int(1));

        assert!(queue.run_next(Duration::from_secs(5)));
        let calls = host.calls.lock().unwrap();
        assert_eq!(calls[0].0, "OnRequestSuccess");
        assert!(plugin.bindings().validate_json(RequestHandle::from_raw(1)));
    }

    #[test]
    fn post_load_game_invalidates() {
        let (plugin, _, queue) = plugin(BridgeConfig::new().without_logging());
        let ctx = CallContext::new("MyQuest");
        plugin
            .bindings()
            .load_url(&ctx, ObjectHandle::from_raw(3), "http://example.com/", None, &[], &[]);

        assert_eq!(plugin.on_message(HostMessage::SaveGame), 0);
        assert_eq!(plugin.on_message(HostMessage::PostLoadGame), 1);
        assert!(plugin.registry().is_empty());

        // Whatever the worker posts finds nothing to deliver to.
        queue.wait_for(1, Duration::from_millis(200));
        queue.run_pending();
        assert!(plugin.registry().is_empty());
    }

    #[test]
    fn shutdown_is_idempotent() {
        let (plugin, _, _) = plugin(BridgeConfig::new().without_logging());
        plugin.shutdown();
        plugin.shutdown();

        let handle = plugin.bindings().load_url(
            &CallContext::new("MyQuest"),
            ObjectHandle::from_raw(3),
            "http://example.com/",
            None,
            &[],
            &[],
        );
        assert!(handle.is_issued());
    }

    #[test]
    fn drop_does_not_wait_for_in_flight_requests() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let transport = Arc::new(StalledTransport {
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
        });
        let host = Arc::new(RecordingHost::default());
        let queue = Arc::new(LocalTaskQueue::new());
        let plugin = Plugin::with_transport(
            BridgeConfig::new().without_logging().with_worker_threads(1),
            HostServices::new(host.clone(), queue.clone()),
            transport,
        )
        .unwrap();

        plugin.bindings().load_url(
            &CallContext::new("MyQuest"),
            ObjectHandle::from_raw(3),
            "http://example.com/",
            Some(60_000),
            &[],
            &[],
        );
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let begun = Instant::now();
        drop(plugin);
        assert!(begun.elapsed() < Duration::from_secs(1));

        // The released worker's result goes nowhere.
        release_tx.send(()).unwrap();
        queue.wait_for(1, Duration::from_millis(200));
        queue.run_pending();
        assert!(host.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn shutdown_timeout_waits_for_idle_workers() {
        let (plugin, _, _) = plugin(BridgeConfig::new().without_logging().with_worker_threads(2));
        assert!(plugin.shutdown_timeout(Duration::from_secs(5)));
        assert!(plugin.registry().is_empty());
    }
}
