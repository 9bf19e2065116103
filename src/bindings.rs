//! The `HTTPUtils` native-function surface.
//!
//! Script-visible names are fixed; scripts compiled against them must keep
//! working. Host adapters either call the typed methods on [`HttpUtils`]
//! directly or forward raw VM arguments through [`HttpUtils::call`], which
//! applies the script-side default arguments.
//!
//! | Function | Signature |
//! |---|---|
//! | `LoadURL` | `(Form, String url, Int timeout = 5000, String[] keys, String[] values) -> Int` |
//! | `LoadJSON` | same as `LoadURL` |
//! | `Destroy` | `(Int handle)` |
//! | `ValidateJSON` | `(Int handle) -> Bool` |
//! | `GetJSONString` | `(Int handle, String path, String default = "") -> String` |
//! | `GetJSONInt` | `(Int handle, String path, Int default = 0) -> Int` |
//! | `GetJSONFloat` | `(Int handle, String path, Float default = 0.0) -> Float` |
//! | `GetJSONBool` | `(Int handle, String path, Bool default = false) -> Bool` |

use crate::dispatcher::{RequestDispatcher, RequestSpec, ResponseMode};
use crate::json::JsonAccessor;
use crate::transport::QueryParams;
use crate::types::{ObjectHandle, RequestHandle, ScriptName, ScriptValue};
use std::fmt;
use std::sync::Arc;

/// Script class the native functions are registered on.
pub const SCRIPT_CLASS: &str = "HTTPUtils";

/// The native functions exposed to scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeFunction {
    /// `LoadURL`
    LoadUrl,
    /// `LoadJSON`
    LoadJson,
    /// `Destroy`
    Destroy,
    /// `ValidateJSON`
    ValidateJson,
    /// `GetJSONString`
    GetJsonString,
    /// `GetJSONInt`
    GetJsonInt,
    /// `GetJSONFloat`
    GetJsonFloat,
    /// `GetJSONBool`
    GetJsonBool,
}

impl NativeFunction {
    /// Every native function, in registration order.
    pub const ALL: [Self; 8] = [
        Self::LoadUrl,
        Self::Destroy,
        Self::LoadJson,
        Self::ValidateJson,
        Self::GetJsonString,
        Self::GetJsonFloat,
        Self::GetJsonInt,
        Self::GetJsonBool,
    ];

    /// The script-visible name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::LoadUrl => "LoadURL",
            Self::LoadJson => "LoadJSON",
            Self::Destroy => "Destroy",
            Self::ValidateJson => "ValidateJSON",
            Self::GetJsonString => "GetJSONString",
            Self::GetJsonInt => "GetJSONInt",
            Self::GetJsonFloat => "GetJSONFloat",
            Self::GetJsonBool => "GetJSONBool",
        }
    }

    /// Looks a function up by script name. Script identifiers are
    /// case-insensitive, so the match is too.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|function| function.name().eq_ignore_ascii_case(name))
    }

    /// Maximum number of arguments the function accepts.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::LoadUrl | Self::LoadJson => 5,
            Self::Destroy | Self::ValidateJson => 1,
            Self::GetJsonString | Self::GetJsonInt | Self::GetJsonFloat | Self::GetJsonBool => 3,
        }
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", SCRIPT_CLASS, self.name())
    }
}

/// Host-side table that native functions are registered into.
pub trait NativeRegistry {
    /// Registers `function` on `class`. Calls for it are expected to be
    /// routed to [`HttpUtils::call`].
    fn register_function(&mut self, class: &'static str, function: NativeFunction);
}

/// Information about the script frame making a native call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Script type owning the calling frame.
    pub caller: ScriptName,
}

impl CallContext {
    /// Creates a context for a call from `caller`.
    #[must_use]
    pub fn new(caller: impl Into<ScriptName>) -> Self {
        Self {
            caller: caller.into(),
        }
    }
}

/// Errors decoding a native call. These describe a host adapter or script
/// compilation mismatch, not a runtime request failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingError {
    /// The specific error that occurred
    pub kind: BindingErrorKind,
}

/// Specific binding error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingErrorKind {
    /// No native function has this name
    UnknownFunction {
        /// The name that was called
        name: String,
    },
    /// A required argument was not supplied
    MissingArgument {
        /// The function being called
        function: NativeFunction,
        /// Zero-based argument position
        index: usize,
    },
    /// An argument had the wrong type
    ArgumentType {
        /// The function being called
        function: NativeFunction,
        /// Zero-based argument position
        index: usize,
        /// Expected script type
        expected: &'static str,
        /// Supplied script type
        actual: &'static str,
    },
    /// More arguments than the function takes
    TooManyArguments {
        /// The function being called
        function: NativeFunction,
        /// Maximum accepted
        expected: usize,
        /// Number supplied
        actual: usize,
    },
}

impl BindingError {
    /// Creates a new BindingError with the given kind.
    #[must_use]
    pub fn new(kind: BindingErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an unknown function error.
    #[must_use]
    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::new(BindingErrorKind::UnknownFunction { name: name.into() })
    }

    /// Creates a missing argument error.
    #[must_use]
    pub fn missing_argument(function: NativeFunction, index: usize) -> Self {
        Self::new(BindingErrorKind::MissingArgument { function, index })
    }

    /// Creates an argument type error.
    #[must_use]
    pub fn argument_type(
        function: NativeFunction,
        index: usize,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::new(BindingErrorKind::ArgumentType {
            function,
            index,
            expected,
            actual,
        })
    }

    /// Creates a too-many-arguments error.
    #[must_use]
    pub fn too_many_arguments(function: NativeFunction, actual: usize) -> Self {
        Self::new(BindingErrorKind::TooManyArguments {
            function,
            expected: function.arity(),
            actual,
        })
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BindingErrorKind::UnknownFunction { name } => {
                write!(f, "'{}' is not a native function of {}", name, SCRIPT_CLASS)
            }
            BindingErrorKind::MissingArgument { function, index } => {
                write!(f, "{} is missing required argument {}", function, index)
            }
            BindingErrorKind::ArgumentType {
                function,
                index,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "{} argument {} must be {}, got {}",
                    function, index, expected, actual
                )
            }
            BindingErrorKind::TooManyArguments {
                function,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "{} takes at most {} arguments, got {}",
                    function, expected, actual
                )
            }
        }
    }
}

impl std::error::Error for BindingError {}

/// Positional argument reader for one native call.
struct Args<'a> {
    function: NativeFunction,
    values: &'a [ScriptValue],
}

impl<'a> Args<'a> {
    fn new(function: NativeFunction, values: &'a [ScriptValue]) -> Result<Self, BindingError> {
        if values.len() > function.arity() {
            return Err(BindingError::too_many_arguments(function, values.len()));
        }
        Ok(Self { function, values })
    }

    /// The argument at `index`, treating `None` as absent.
    fn get(&self, index: usize) -> Option<&'a ScriptValue> {
        self.values.get(index).filter(|value| !value.is_none())
    }

    fn mismatch(&self, index: usize, expected: &'static str) -> BindingError {
        let actual = self.values.get(index).map_or("None", ScriptValue::type_name);
        BindingError::argument_type(self.function, index, expected, actual)
    }

    /// A game object; `None` means no callback target.
    fn object(&self, index: usize) -> Result<ObjectHandle, BindingError> {
        match self.get(index) {
            None => Ok(ObjectHandle::NONE),
            Some(ScriptValue::Object(handle)) => Ok(*handle),
            Some(_) => Err(self.mismatch(index, "Form")),
        }
    }

    fn int(&self, index: usize) -> Result<i32, BindingError> {
        match self.get(index) {
            None => Err(BindingError::missing_argument(self.function, index)),
            Some(ScriptValue::Int(value)) => Ok(*value),
            Some(_) => Err(self.mismatch(index, "Int")),
        }
    }

    fn string(&self, index: usize) -> Result<&'a str, BindingError> {
        match self.get(index) {
            None => Err(BindingError::missing_argument(self.function, index)),
            Some(ScriptValue::String(value)) => Ok(value.as_str()),
            Some(_) => Err(self.mismatch(index, "String")),
        }
    }

    fn int_opt(&self, index: usize) -> Result<Option<i32>, BindingError> {
        match self.get(index) {
            None => Ok(None),
            Some(ScriptValue::Int(value)) => Ok(Some(*value)),
            Some(_) => Err(self.mismatch(index, "Int")),
        }
    }

    fn int_or(&self, index: usize, default: i32) -> Result<i32, BindingError> {
        Ok(self.int_opt(index)?.unwrap_or(default))
    }

    fn float_or(&self, index: usize, default: f32) -> Result<f32, BindingError> {
        match self.get(index) {
            None => Ok(default),
            Some(ScriptValue::Float(value)) => Ok(*value),
            // Scripts implicitly widen Int literals to Float.
            Some(ScriptValue::Int(value)) => Ok(*value as f32),
            Some(_) => Err(self.mismatch(index, "Float")),
        }
    }

    fn bool_or(&self, index: usize, default: bool) -> Result<bool, BindingError> {
        match self.get(index) {
            None => Ok(default),
            Some(ScriptValue::Bool(value)) => Ok(*value),
            Some(_) => Err(self.mismatch(index, "Bool")),
        }
    }

    fn string_or(&self, index: usize, default: &'a str) -> Result<&'a str, BindingError> {
        match self.get(index) {
            None => Ok(default),
            Some(ScriptValue::String(value)) => Ok(value.as_str()),
            Some(_) => Err(self.mismatch(index, "String")),
        }
    }

    fn strings_or_empty(&self, index: usize) -> Result<&'a [String], BindingError> {
        match self.get(index) {
            None => Ok(&[]),
            Some(ScriptValue::StringArray(values)) => Ok(values.as_slice()),
            Some(_) => Err(self.mismatch(index, "String[]")),
        }
    }
}

/// Script-facing entry points.
#[derive(Debug, Clone)]
pub struct HttpUtils {
    dispatcher: Arc<RequestDispatcher>,
    json: JsonAccessor,
}

impl HttpUtils {
    /// Creates the bindings over `dispatcher` and its registry.
    #[must_use]
    pub fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        let json = JsonAccessor::new(Arc::clone(dispatcher.registry()));
        Self { dispatcher, json }
    }

    /// Registers every native function with `registry`.
    pub fn register(registry: &mut dyn NativeRegistry) {
        for function in NativeFunction::ALL {
            registry.register_function(SCRIPT_CLASS, function);
        }
        tracing::debug!(
            class = SCRIPT_CLASS,
            functions = NativeFunction::ALL.len(),
            "native functions registered"
        );
    }

    fn load(&self, ctx: &CallContext, form: ObjectHandle, spec: RequestSpec) -> RequestHandle {
        self.dispatcher.issue(&ctx.caller, form, spec)
    }

    /// `LoadURL`: starts a text request.
    pub fn load_url(
        &self,
        ctx: &CallContext,
        form: ObjectHandle,
        url: &str,
        timeout_ms: Option<i32>,
        keys: &[String],
        values: &[String],
    ) -> RequestHandle {
        self.load(
            ctx,
            form,
            request_spec(url, timeout_ms, keys, values, ResponseMode::Text),
        )
    }

    /// `LoadJSON`: starts a request whose body is parsed for the accessors.
    pub fn load_json(
        &self,
        ctx: &CallContext,
        form: ObjectHandle,
        url: &str,
        timeout_ms: Option<i32>,
        keys: &[String],
        values: &[String],
    ) -> RequestHandle {
        self.load(
            ctx,
            form,
            request_spec(url, timeout_ms, keys, values, ResponseMode::Json),
        )
    }

    /// `Destroy`: cancels and forgets a request issued by the calling script.
    pub fn destroy(&self, ctx: &CallContext, handle: RequestHandle) {
        self.dispatcher.cancel(&ctx.caller, handle);
    }

    /// `ValidateJSON`
    #[must_use]
    pub fn validate_json(&self, handle: RequestHandle) -> bool {
        self.json.validated(handle)
    }

    /// `GetJSONString`
    #[must_use]
    pub fn get_json_string(&self, handle: RequestHandle, path: &str, default: &str) -> String {
        self.json.get(handle, path, default.to_string())
    }

    /// `GetJSONInt`
    #[must_use]
    pub fn get_json_int(&self, handle: RequestHandle, path: &str, default: i32) -> i32 {
        self.json.get(handle, path, default)
    }

    /// `GetJSONFloat`
    #[must_use]
    pub fn get_json_float(&self, handle: RequestHandle, path: &str, default: f32) -> f32 {
        self.json.get(handle, path, default)
    }

    /// `GetJSONBool`
    #[must_use]
    pub fn get_json_bool(&self, handle: RequestHandle, path: &str, default: bool) -> bool {
        self.json.get(handle, path, default)
    }

    /// Calls a native function by its script name.
    ///
    /// # Errors
    ///
    /// Returns `BindingErrorKind::UnknownFunction` for names outside the
    /// table, otherwise as [`HttpUtils::call`].
    pub fn call_by_name(
        &self,
        ctx: &CallContext,
        name: &str,
        args: &[ScriptValue],
    ) -> Result<ScriptValue, BindingError> {
        let function =
            NativeFunction::from_name(name).ok_or_else(|| BindingError::unknown_function(name))?;
        self.call(ctx, function, args)
    }

    /// Decodes `args` and calls `function`.
    ///
    /// Trailing arguments may be omitted or passed as `None` to use their
    /// script-side defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`BindingError`] if a required argument is missing, an
    /// argument has the wrong type, or too many arguments are passed. No
    /// request state changes in that case.
    pub fn call(
        &self,
        ctx: &CallContext,
        function: NativeFunction,
        args: &[ScriptValue],
    ) -> Result<ScriptValue, BindingError> {
        let args = Args::new(function, args)?;
        let value = match function {
            NativeFunction::LoadUrl | NativeFunction::LoadJson => {
                let form = args.object(0)?;
                let url = args.string(1)?;
                let timeout_ms = args.int_opt(2)?;
                let keys = args.strings_or_empty(3)?;
                let values = args.strings_or_empty(4)?;
                let handle = if function == NativeFunction::LoadJson {
                    self.load_json(ctx, form, url, timeout_ms, keys, values)
                } else {
                    self.load_url(ctx, form, url, timeout_ms, keys, values)
                };
                handle.into()
            }
            NativeFunction::Destroy => {
                self.destroy(ctx, RequestHandle::from_raw(args.int(0)?));
                ScriptValue::None
            }
            NativeFunction::ValidateJson => {
                self.validate_json(RequestHandle::from_raw(args.int(0)?)).into()
            }
            NativeFunction::GetJsonString => {
                let handle = RequestHandle::from_raw(args.int(0)?);
                let path = args.string(1)?;
                let default = args.string_or(2, "")?;
                self.get_json_string(handle, path, default).into()
            }
            NativeFunction::GetJsonInt => {
                let handle = RequestHandle::from_raw(args.int(0)?);
                let path = args.string(1)?;
                let default = args.int_or(2, 0)?;
                self.get_json_int(handle, path, default).into()
            }
            NativeFunction::GetJsonFloat => {
                let handle = RequestHandle::from_raw(args.int(0)?);
                let path = args.string(1)?;
                let default = args.float_or(2, 0.0)?;
                self.get_json_float(handle, path, default).into()
            }
            NativeFunction::GetJsonBool => {
                let handle = RequestHandle::from_raw(args.int(0)?);
                let path = args.string(1)?;
                let default = args.bool_or(2, false)?;
                self.get_json_bool(handle, path, default).into()
            }
        };
        Ok(value)
    }
}

fn request_spec(
    url: &str,
    timeout_ms: Option<i32>,
    keys: &[String],
    values: &[String],
    mode: ResponseMode,
) -> RequestSpec {
    let mut spec = RequestSpec::new(url)
        .with_params(QueryParams::from_parallel(keys, values))
        .with_mode(mode);
    spec.timeout_ms = timeout_ms;
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::WorkerPool;
    use crate::host::{LocalTaskQueue, ScriptHost};
    use crate::registry::HandleRegistry;
    use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct EchoTransport {
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl HttpTransport for EchoTransport {
        fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(HttpResponse::new(200, "{}"))
        }
    }

    #[derive(Debug)]
    struct SilentHost;

    impl ScriptHost for SilentHost {
        fn dispatch_method(
            &self,
            _owner: ObjectHandle,
            _script: &ScriptName,
            _method: &str,
            _args: Vec<ScriptValue>,
        ) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct TableRegistry(Vec<(&'static str, NativeFunction)>);

    impl NativeRegistry for TableRegistry {
        fn register_function(&mut self, class: &'static str, function: NativeFunction) {
            self.0.push((class, function));
        }
    }

    fn utils() -> (HttpUtils, Arc<EchoTransport>, Arc<LocalTaskQueue>) {
        let transport = Arc::new(EchoTransport::default());
        let queue = Arc::new(LocalTaskQueue::new());
        let dispatcher = RequestDispatcher::new(
            Arc::new(HandleRegistry::new()),
            Arc::new(SilentHost),
            queue.clone(),
            transport.clone(),
            WorkerPool::new(1, "bindings-test").unwrap(),
            Duration::from_millis(5000),
        );
        (HttpUtils::new(Arc::new(dispatcher)), transport, queue)
    }

    fn ctx() -> CallContext {
        CallContext::new("MyQuest")
    }

    fn registry_of(utils: &HttpUtils) -> &Arc<HandleRegistry> {
        utils.dispatcher.registry()
    }

    #[test]
    fn names_are_contractual() {
        let names: Vec<_> = NativeFunction::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec![
                "LoadURL",
                "Destroy",
                "LoadJSON",
                "ValidateJSON",
                "GetJSONString",
                "GetJSONFloat",
                "GetJSONInt",
                "GetJSONBool"
            ]
        );
    }

    #[test]
    fn from_name_ignores_case() {
        assert_eq!(NativeFunction::from_name("loadjson"), Some(NativeFunction::LoadJson));
        assert_eq!(NativeFunction::from_name("GETJSONINT"), Some(NativeFunction::GetJsonInt));
        assert_eq!(NativeFunction::from_name("Fetch"), None);
    }

    #[test]
    fn register_adds_all_functions_to_class() {
        let mut table = TableRegistry::default();
        HttpUtils::register(&mut table);
        assert_eq!(table.0.len(), 8);
        assert!(table.0.iter().all(|(class, _)| *class == "HTTPUtils"));
    }

    #[test]
    fn load_url_defaults_optional_arguments() {
        let (utils, transport, queue) = utils();
        let result = utils
            .call(
                &ctx(),
                NativeFunction::LoadUrl,
                &[
                    ScriptValue::Object(ObjectHandle::from_raw(7)),
                    ScriptValue::from("http://example.com/"),
                ],
            )
            .unwrap();
        assert_eq!(result, ScriptValue::Int(1));

        assert!(queue.wait_for(1, Duration::from_secs(5)));
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].timeout, Duration::from_millis(5000));
        assert!(seen[0].params.is_empty());
    }

    #[test]
    fn load_json_passes_timeout_and_params() {
        let (utils, transport, queue) = utils();
        utils
            .call(
                &ctx(),
                NativeFunction::LoadJson,
                &[
                    ScriptValue::Object(ObjectHandle::from_raw(7)),
                    ScriptValue::from("http://example.com/"),
                    ScriptValue::Int(900),
                    ScriptValue::StringArray(vec!["q".into()]),
                    ScriptValue::StringArray(vec!["nords".into()]),
                ],
            )
            .unwrap();

        assert!(queue.wait_for(1, Duration::from_secs(5)));
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].timeout, Duration::from_millis(900));
        assert_eq!(seen[0].params, QueryParams::new().with("q", "nords"));
    }

    #[test]
    fn none_form_is_accepted() {
        let (utils, _, _) = utils();
        let result = utils
            .call(
                &ctx(),
                NativeFunction::LoadUrl,
                &[ScriptValue::None, ScriptValue::from("http://example.com/")],
            )
            .unwrap();
        assert_eq!(result, ScriptValue::Int(1));
    }

    #[test]
    fn missing_url_is_an_error() {
        let (utils, _, _) = utils();
        let error = utils
            .call(&ctx(), NativeFunction::LoadUrl, &[ScriptValue::None])
            .unwrap_err();
        assert_eq!(
            error.kind,
            BindingErrorKind::MissingArgument {
                function: NativeFunction::LoadUrl,
                index: 1
            }
        );
        assert!(registry_of(&utils).is_empty());
    }

    #[test]
    fn wrong_argument_type_is_an_error() {
        let (utils, _, _) = utils();
        let error = utils
            .call(&ctx(), NativeFunction::ValidateJson, &[ScriptValue::from("1")])
            .unwrap_err();
        let message = error.to_string();
        assert!(message.contains("HTTPUtils.ValidateJSON"));
        assert!(message.contains("must be Int, got String"));
    }

    #[test]
    fn too_many_arguments_is_an_error() {
        let (utils, _, _) = utils();
        let error = utils
            .call(
                &ctx(),
                NativeFunction::Destroy,
                &[ScriptValue::Int(1), ScriptValue::Int(2)],
            )
            .unwrap_err();
        assert!(matches!(
            error.kind,
            BindingErrorKind::TooManyArguments {
                expected: 1,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let (utils, _, _) = utils();
        let error = utils.call_by_name(&ctx(), "PostJSON", &[]).unwrap_err();
        assert!(error.to_string().contains("PostJSON"));
    }

    #[test]
    fn getters_use_script_defaults() {
        let (utils, _, _) = utils();
        let unknown = [ScriptValue::Int(99), ScriptValue::from("/x")];

        assert_eq!(
            utils.call(&ctx(), NativeFunction::GetJsonString, &unknown).unwrap(),
            ScriptValue::from("")
        );
        assert_eq!(
            utils.call(&ctx(), NativeFunction::GetJsonInt, &unknown).unwrap(),
            ScriptValue::Int(0)
        );
        assert_eq!(
            utils.call(&ctx(), NativeFunction::GetJsonFloat, &unknown).unwrap(),
            ScriptValue::Float(0.0)
        );
        assert_eq!(
            utils.call(&ctx(), NativeFunction::GetJsonBool, &unknown).unwrap(),
            ScriptValue::Bool(false)
        );
        assert_eq!(
            utils.call(&ctx(), NativeFunction::ValidateJson, &unknown[..1]).unwrap(),
            ScriptValue::Bool(false)
        );
    }

    #[test]
    fn getters_return_caller_defaults_for_unknown_handles() {
        let (utils, _, _) = utils();
        let handle = RequestHandle::from_raw(12);
        assert_eq!(utils.get_json_string(handle, "/x", "fallback"), "fallback");
        assert_eq!(utils.get_json_int(handle, "/x", -5), -5);
        assert_eq!(utils.get_json_float(handle, "/x", 2.5), 2.5);
        assert!(utils.get_json_bool(handle, "/x", true));
    }

    #[test]
    fn float_default_accepts_int() {
        let (utils, _, _) = utils();
        let result = utils
            .call(
                &ctx(),
                NativeFunction::GetJsonFloat,
                &[ScriptValue::Int(1), ScriptValue::from("/x"), ScriptValue::Int(3)],
            )
            .unwrap();
        assert_eq!(result, ScriptValue::Float(3.0));
    }

    #[test]
    fn getters_read_stored_documents() {
        let (utils, _, _) = utils();
        let registry = registry_of(&utils);
        let (handle, _) = registry
            .allocate("MyQuest".into(), ObjectHandle::from_raw(1))
            .unwrap();
        registry.with_request(handle, |request| {
            request.store_document(Some(json!({"hold": {"name": "Eastmarch", "jarl": true}})));
        });

        let name = utils
            .call(
                &ctx(),
                NativeFunction::GetJsonString,
                &[ScriptValue::from(handle), ScriptValue::from("/hold/name"), ScriptValue::from("?")],
            )
            .unwrap();
        assert_eq!(name, ScriptValue::from("Eastmarch"));
        assert!(utils.get_json_bool(handle, "/hold/jarl", false));
        assert!(utils.validate_json(handle));
    }

    #[test]
    fn destroy_respects_caller_identity() {
        let (utils, _, _) = utils();
        let registry = registry_of(&utils);
        let (handle, token) = registry
            .allocate("MyQuest".into(), ObjectHandle::from_raw(1))
            .unwrap();

        utils
            .call(&CallContext::new("OtherQuest"), NativeFunction::Destroy, &[ScriptValue::from(handle)])
            .unwrap();
        assert!(registry.contains(handle));
        assert!(!token.is_canceled());

        utils
            .call(&ctx(), NativeFunction::Destroy, &[ScriptValue::from(handle)])
            .unwrap();
        assert!(!registry.contains(handle));
        assert!(token.is_canceled());
    }
}
