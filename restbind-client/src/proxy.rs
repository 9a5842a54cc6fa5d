//! Proxy creation and the process-wide contract registry.
//!
//! A proxy binds one synthesized [`ContractShape`] to one client
//! configuration. Shapes are synthesized at most once per contract
//! identity for the lifetime of the process and shared by every proxy
//! created for that contract; failed synthesis is not cached, so a
//! corrected dynamic contract can be registered again under a new name.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use restbind_core::{ContractDescriptor, ContractId, MethodDescriptor, resolver::ContractShape};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::context::ArgValue;
use crate::error::ApiError;
use crate::handle::CallHandle;
use crate::interceptor::Interceptor;

/// A typed contract: a Rust type that describes its remote interface.
///
/// The type itself is never instantiated; it exists to give the
/// contract a stable identity in the registry and a place to hang the
/// description.
pub trait ApiContract: 'static {
    /// The contract's declarative description.
    fn describe() -> ContractDescriptor;
}

fn registry() -> &'static DashMap<ContractId, Arc<ContractShape>> {
    static REGISTRY: OnceLock<DashMap<ContractId, Arc<ContractShape>>> = OnceLock::new();
    REGISTRY.get_or_init(DashMap::new)
}

fn shape_for(
    id: ContractId,
    descriptor: &ContractDescriptor,
) -> Result<Arc<ContractShape>, ApiError> {
    match registry().entry(id) {
        Entry::Occupied(entry) => {
            debug!(contract = descriptor.name(), "reusing registered contract shape");
            Ok(entry.get().clone())
        }
        Entry::Vacant(entry) => {
            debug!(contract = descriptor.name(), "synthesizing contract shape");
            let shape = Arc::new(ContractShape::synthesize(descriptor)?);
            entry.insert(shape.clone());
            Ok(shape)
        }
    }
}

/// Create a proxy for a typed contract.
///
/// The first creation per contract type synthesizes and registers its
/// shape; later creations, with any configuration, reuse it.
pub fn create_proxy<C: ApiContract>(config: Arc<ClientConfig>) -> Result<ApiProxy, ApiError> {
    let descriptor = C::describe();
    let id = ContractId::of::<C>(descriptor.name());
    let shape = shape_for(id, &descriptor)?;
    Ok(ApiProxy::new(shape, config))
}

/// Create a proxy from a runtime-built description, keyed by contract
/// name alone.
///
/// Because the registry key is just the name, a second description
/// registered under an already-used name reuses the cached shape and
/// its method set; the new description is ignored. Distinct dynamic
/// contracts must use distinct names.
pub fn create_proxy_dynamic(
    descriptor: &ContractDescriptor,
    config: Arc<ClientConfig>,
) -> Result<ApiProxy, ApiError> {
    let shape = shape_for(ContractId::named(descriptor.name()), descriptor)?;
    Ok(ApiProxy::new(shape, config))
}

/// Create a proxy from a runtime-built description and a pre-built
/// [`Interceptor`].
///
/// The lowest-level entry point: callers that assemble their own
/// interceptor (custom pipelines, test doubles) bind it to a contract
/// here. The shape registry behaves exactly as for the other variants.
pub fn create_proxy_with_interceptor(
    descriptor: &ContractDescriptor,
    interceptor: Interceptor,
) -> Result<ApiProxy, ApiError> {
    let shape = shape_for(ContractId::named(descriptor.name()), descriptor)?;
    Ok(ApiProxy { shape, interceptor })
}

/// The callable stand-in for a remote interface.
///
/// Dispatch is by method name; arguments are positional and must match
/// the method's declared parameters. Cloning shares the underlying
/// shape and configuration.
#[derive(Clone)]
pub struct ApiProxy {
    shape: Arc<ContractShape>,
    interceptor: Interceptor,
}

impl ApiProxy {
    fn new(shape: Arc<ContractShape>, config: Arc<ClientConfig>) -> Self {
        Self {
            shape,
            interceptor: Interceptor::new(config),
        }
    }

    pub fn contract_name(&self) -> &str {
        self.shape.name()
    }

    /// The shared contract shape backing this proxy.
    pub fn shape(&self) -> &Arc<ContractShape> {
        &self.shape
    }

    pub fn config(&self) -> &Arc<ClientConfig> {
        self.interceptor.config()
    }

    /// Resolve a method's descriptor without calling it.
    pub fn method(&self, name: &str) -> Result<Arc<MethodDescriptor>, ApiError> {
        Ok(self.shape.method(name)?)
    }

    /// Invoke a method and return the decoded response value.
    pub async fn invoke(&self, method: &str, args: Vec<ArgValue>) -> Result<Value, ApiError> {
        let descriptor = self.shape.method(method)?;
        self.interceptor.intercept(descriptor, args).await
    }

    /// Invoke a method and deserialize the response into `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        args: Vec<ArgValue>,
    ) -> Result<T, ApiError> {
        let value = self.invoke(method, args).await?;
        decode_value(value)
    }

    /// Invoke a method whose response body is irrelevant.
    pub async fn call_unit(&self, method: &str, args: Vec<ArgValue>) -> Result<(), ApiError> {
        self.invoke(method, args).await.map(|_| ())
    }

    /// Start a call and return immediately with a handle to its
    /// result. Contract errors still surface here, before dispatch;
    /// transport and decode failures surface when the handle is
    /// awaited.
    pub fn call_deferred<T: DeserializeOwned + Send + 'static>(
        &self,
        method: &str,
        args: Vec<ArgValue>,
    ) -> Result<CallHandle<T>, ApiError> {
        let descriptor = self.shape.method(method)?;
        let interceptor = self.interceptor.clone();
        let handle = tokio::spawn(async move {
            let value = interceptor.intercept(descriptor, args).await?;
            decode_value(value)
        });
        Ok(CallHandle::new(handle))
    }
}

impl std::fmt::Debug for ApiProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiProxy")
            .field("contract", &self.shape.name())
            .finish_non_exhaustive()
    }
}

fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Decode(format!("response does not match expected shape: {e}")))
}
