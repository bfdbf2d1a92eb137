use crate::error::{CapabilityError, CapabilityErrorExt};
use crate::protocol::{ApiManifest, CapabilityRequest, CapabilityResponse};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub type CapabilityFut = Pin<Box<dyn Future<Output = Result<Value, CapabilityError>> + Send>>;

/// A bound host operation: `payload -> result | error`.
pub type Operation = Arc<dyn Fn(Value) -> CapabilityFut + Send + Sync>;

/// A group of capabilities exposed under one versioned name.
pub trait ExposableApi: Send + Sync + 'static {
    const NAME: &'static str;
    const VERSION: u32;

    /// Declares the API methods.
    fn expose(self: Arc<Self>, api: &mut ApiExposer);
}

/// Collects the methods of an [`ExposableApi`] before they are bound.
pub struct ApiExposer {
    api: &'static str,
    methods: Vec<(String, Operation)>,
}

impl fmt::Debug for ApiExposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiExposer")
            .field("api", &self.api)
            .field("methods", &self.methods.iter().map(|(name, _)| name).collect::<Vec<_>>())
            .finish()
    }
}

impl ApiExposer {
    /// Exposes a raw JSON operation.
    pub fn raw<F, Fut>(&mut self, method: &str, op: F) -> &mut Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, CapabilityError>> + Send + 'static,
    {
        self.methods.push((format!("{}.{method}", self.api), operation(op)));
        self
    }

    /// Exposes an operation with typed parameters and result.
    ///
    /// `null` parameters decode like an empty object.
    pub fn method<P, R, F, Fut>(&mut self, method: &str, handler: F) -> &mut Self
    where
        P: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, CapabilityError>> + Send + 'static,
    {
        let op: Operation = Arc::new(move |params: Value| -> CapabilityFut {
            let call = decode::<P>(params).map(&handler);
            Box::pin(async move {
                let result = call?.await?;
                serde_json::to_value(&result).context("Encoding result")
            })
        });
        self.methods.push((format!("{}.{method}", self.api), op));
        self
    }
}

fn decode<P: DeserializeOwned>(params: Value) -> Result<P, CapabilityError> {
    let params = if params.is_null() { Value::Object(serde_json::Map::new()) } else { params };
    serde_json::from_value(params)
        .map_err(|err| CapabilityError::InvalidParams { message: err.to_string().into(), context: None })
}

fn operation<F, Fut>(op: F) -> Operation
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, CapabilityError>> + Send + 'static,
{
    Arc::new(move |params| -> CapabilityFut { Box::pin(op(params)) })
}

struct Binding {
    version: Option<u32>,
    op: Operation,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding").field("version", &self.version).finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    bindings: FxHashMap<String, Binding>,
    manifests: Vec<ApiManifest>,
}

/// Name-unique registry of host capabilities.
///
/// Cloning is cheap; clones share bindings.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl CapabilityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to an operation.
    ///
    /// # Errors
    /// Returns [`CapabilityError::DuplicateCapability`] if `name` is already bound.
    pub fn register<F, Fut>(&self, name: impl Into<String>, op: F) -> Result<(), CapabilityError>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, CapabilityError>> + Send + 'static,
    {
        let name = name.into();
        let mut inner = self.inner.write();
        if inner.bindings.contains_key(&name) {
            return Err(duplicate(name));
        }
        debug!(capability = %name, "Capability registered");
        inner.bindings.insert(name, Binding { version: None, op: operation(op) });
        Ok(())
    }

    /// Binds every method of `api`; nothing is bound if any name is taken.
    ///
    /// # Errors
    /// Returns [`CapabilityError::DuplicateCapability`] if the API or one of its methods is
    /// already registered.
    pub fn register_api<A: ExposableApi>(&self, api: Arc<A>) -> Result<ApiManifest, CapabilityError> {
        let mut exposer = ApiExposer { api: A::NAME, methods: Vec::new() };
        api.expose(&mut exposer);

        let mut inner = self.inner.write();
        if inner.manifests.iter().any(|m| m.name == A::NAME) {
            return Err(duplicate(A::NAME));
        }
        for (index, (name, _)) in exposer.methods.iter().enumerate() {
            let repeated = exposer.methods[..index].iter().any(|(other, _)| other == name);
            if repeated || inner.bindings.contains_key(name) {
                return Err(duplicate(name.clone()));
            }
        }

        let manifest = ApiManifest {
            name: A::NAME.to_owned(),
            version: A::VERSION,
            methods: exposer.methods.iter().map(|(name, _)| name.clone()).collect(),
        };
        for (name, op) in exposer.methods {
            inner.bindings.insert(name, Binding { version: Some(A::VERSION), op });
        }
        inner.manifests.push(manifest.clone());

        debug!(api = A::NAME, version = A::VERSION, methods = manifest.methods.len(), "API exposed");
        Ok(manifest)
    }

    /// Runs the operation bound to `name`.
    ///
    /// # Errors
    /// Returns [`CapabilityError::UnknownCapability`] for unbound names,
    /// [`CapabilityError::InvalidParams`] for params the operation cannot decode and
    /// [`CapabilityError::Execution`] for any other failure raised by the operation.
    pub async fn invoke(&self, name: &str, payload: Value) -> Result<Value, CapabilityError> {
        let op = self.resolve(name, None)?;
        op(payload).await.map_err(|err| execution(name, err))
    }

    /// Serves one sandbox request, converting every outcome into a response.
    ///
    /// The operation runs on its own task so a panic surfaces as an execution failure.
    pub async fn dispatch(&self, request: CapabilityRequest) -> CapabilityResponse {
        let CapabilityRequest { id, method, params, api_version } = request;
        trace!(id, method = %method, "Dispatching capability");

        let result = match self.resolve(&method, api_version) {
            Ok(op) => match tokio::spawn(op(params)).await {
                Ok(result) => result.map_err(|err| execution(&method, err)),
                Err(join) => {
                    let message = if join.is_panic() { "operation panicked" } else { "operation cancelled" };
                    Err(CapabilityError::Execution {
                        message: message.into(),
                        context: Some(method.clone().into()),
                    })
                },
            },
            Err(err) => Err(err),
        };

        match result {
            Ok(value) => CapabilityResponse::ok(id, value),
            Err(err) => {
                match &err {
                    CapabilityError::Execution { .. } => {
                        warn!(id, method = %method, error = %err, "Capability failed");
                    },
                    _ => debug!(id, method = %method, kind = err.kind(), "Capability rejected"),
                }
                CapabilityResponse::error(id, &err)
            },
        }
    }

    /// Exposed APIs in registration order.
    #[must_use]
    pub fn manifests(&self) -> Vec<ApiManifest> {
        self.inner.read().manifests.clone()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().bindings.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().bindings.len()
    }

    fn resolve(&self, name: &str, version: Option<u32>) -> Result<Operation, CapabilityError> {
        let inner = self.inner.read();
        let binding = inner.bindings.get(name).ok_or_else(|| CapabilityError::UnknownCapability {
            message: name.to_owned().into(),
            context: None,
        })?;

        match (binding.version, version) {
            (Some(exposed), Some(requested)) if exposed != requested => {
                Err(CapabilityError::UnsupportedVersion {
                    message: format!("{name} is exposed at version {exposed}, not {requested}")
                        .into(),
                    context: None,
                })
            },
            _ => Ok(Arc::clone(&binding.op)),
        }
    }
}

fn duplicate(name: impl Into<std::borrow::Cow<'static, str>>) -> CapabilityError {
    CapabilityError::DuplicateCapability { message: name.into(), context: None }
}

/// Caller mistakes keep their kind; anything else is an execution failure.
fn execution(name: &str, err: CapabilityError) -> CapabilityError {
    match err {
        CapabilityError::Execution { .. } | CapabilityError::InvalidParams { .. } => err,
        other => CapabilityError::Execution {
            message: other.to_string().into(),
            context: Some(name.to_owned().into()),
        },
    }
}
