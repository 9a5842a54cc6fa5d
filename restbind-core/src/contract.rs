//! Declarative contract and method descriptions.
//!
//! This is the caller-facing metadata layer: a [`ContractDescriptor`]
//! lists the methods of a remote API, each written as a [`MethodSpec`]
//! builder literal. Specs are cheap, order-preserving records; all
//! validation is deferred to the resolver so that contract mistakes
//! surface as [`crate::ContractError`] exactly once.

use std::any::TypeId;

use http::Method;

use crate::binding::BindingKind;
use crate::descriptor::ReturnShape;

/// Stable identity of a contract, used as the proxy-registry key.
///
/// Typed contracts carry their `TypeId` so that two Rust types with the
/// same declared name still get distinct cache entries; dynamic
/// contracts are identified by name alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractId {
    name: String,
    type_id: Option<TypeId>,
}

impl ContractId {
    /// Identity for a typed contract.
    pub fn of<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: Some(TypeId::of::<T>()),
        }
    }

    /// Identity for a dynamically described contract.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Declarative description of one interface method.
///
/// # Example
///
/// ```
/// use restbind_core::MethodSpec;
///
/// let spec = MethodSpec::new("get")
///     .get("/accounts/{id}")
///     .path_param("id");
/// ```
#[derive(Debug, Clone)]
pub struct MethodSpec {
    name: String,
    verb: Option<Method>,
    route: String,
    params: Vec<(String, BindingKind)>,
    headers: Vec<(String, String)>,
    return_shape: ReturnShape,
}

impl MethodSpec {
    /// Start describing a method. The verb defaults to GET, the route
    /// to `/`, and the return shape to [`ReturnShape::Value`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            verb: None,
            route: "/".to_string(),
            params: Vec::new(),
            headers: Vec::new(),
            return_shape: ReturnShape::Value,
        }
    }

    /// Set the HTTP verb explicitly.
    pub fn verb(mut self, verb: Method) -> Self {
        self.verb = Some(verb);
        self
    }

    /// Set the route template.
    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    /// Shorthand for `.verb(Method::GET).route(route)`.
    pub fn get(self, route: impl Into<String>) -> Self {
        self.verb(Method::GET).route(route)
    }

    /// Shorthand for `.verb(Method::POST).route(route)`.
    pub fn post(self, route: impl Into<String>) -> Self {
        self.verb(Method::POST).route(route)
    }

    /// Shorthand for `.verb(Method::PUT).route(route)`.
    pub fn put(self, route: impl Into<String>) -> Self {
        self.verb(Method::PUT).route(route)
    }

    /// Shorthand for `.verb(Method::DELETE).route(route)`.
    pub fn delete(self, route: impl Into<String>) -> Self {
        self.verb(Method::DELETE).route(route)
    }

    /// Declare the next positional parameter as a path placeholder.
    pub fn path_param(mut self, name: impl Into<String>) -> Self {
        self.params.push((name.into(), BindingKind::Path));
        self
    }

    /// Declare the next positional parameter as a query pair.
    pub fn query_param(mut self, name: impl Into<String>) -> Self {
        self.params.push((name.into(), BindingKind::Query));
        self
    }

    /// Declare the next positional parameter as a request header.
    pub fn header_param(mut self, name: impl Into<String>) -> Self {
        self.params.push((name.into(), BindingKind::Header));
        self
    }

    /// Declare the next positional parameter as the request body.
    pub fn body_param(mut self, name: impl Into<String>) -> Self {
        self.params.push((name.into(), BindingKind::Body));
        self
    }

    /// Declare the next positional parameter as this call's
    /// cancellation token.
    pub fn cancellation_param(mut self, name: impl Into<String>) -> Self {
        self.params.push((name.into(), BindingKind::Cancellation));
        self
    }

    /// Add a static header sent on every call of this method.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The call completes with `()`; the response body is discarded.
    pub fn returns_unit(mut self) -> Self {
        self.return_shape = ReturnShape::Unit;
        self
    }

    /// The call completes with the deserialized response value.
    pub fn returns_value(mut self) -> Self {
        self.return_shape = ReturnShape::Value;
        self
    }

    /// The call returns a deferred handle immediately.
    pub fn returns_deferred(mut self) -> Self {
        self.return_shape = ReturnShape::Deferred;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn declared_verb(&self) -> Option<&Method> {
        self.verb.as_ref()
    }

    pub(crate) fn declared_route(&self) -> &str {
        &self.route
    }

    pub(crate) fn declared_params(&self) -> &[(String, BindingKind)] {
        &self.params
    }

    pub(crate) fn declared_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub(crate) fn declared_return_shape(&self) -> ReturnShape {
        self.return_shape
    }
}

/// Declarative description of a whole contract: a name plus its ordered
/// method specs. Built once per interface, immutable afterwards.
#[derive(Debug, Clone)]
pub struct ContractDescriptor {
    name: String,
    methods: Vec<MethodSpec>,
}

impl ContractDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Append a method description.
    pub fn method(mut self, spec: MethodSpec) -> Self {
        self.methods.push(spec);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[MethodSpec] {
        &self.methods
    }
}
