//! Resolved, immutable method metadata.

use http::Method;

use crate::binding::BindingKind;
use crate::route::RouteTemplate;

/// The declared shape of a method's return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnShape {
    /// The response is discarded; errors still surface.
    Unit,
    /// The call completes with the deserialized response value.
    #[default]
    Value,
    /// The call returns a handle immediately; the value (or error)
    /// arrives when the caller awaits the handle.
    Deferred,
}

/// One parameter of a resolved method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    position: usize,
    name: String,
    kind: BindingKind,
}

impl ParameterDescriptor {
    pub(crate) fn new(position: usize, name: impl Into<String>, kind: BindingKind) -> Self {
        Self {
            position,
            name: name.into(),
            kind,
        }
    }

    /// Zero-based position in the method's argument list.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The binding name: placeholder, query key, or header name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> BindingKind {
        self.kind
    }
}

/// A fully resolved interface method.
///
/// Produced by [`crate::resolver::resolve`] from a [`crate::MethodSpec`]
/// on first use and cached for the process lifetime; every field is
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    name: String,
    verb: Method,
    route: RouteTemplate,
    params: Vec<ParameterDescriptor>,
    headers: Vec<(String, String)>,
    return_shape: ReturnShape,
}

impl MethodDescriptor {
    pub(crate) fn new(
        name: String,
        verb: Method,
        route: RouteTemplate,
        params: Vec<ParameterDescriptor>,
        headers: Vec<(String, String)>,
        return_shape: ReturnShape,
    ) -> Self {
        Self {
            name,
            verb,
            route,
            params,
            headers,
            return_shape,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn verb(&self) -> &Method {
        &self.verb
    }

    pub fn route(&self) -> &RouteTemplate {
        &self.route
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[ParameterDescriptor] {
        &self.params
    }

    /// Static method-level headers, applied before parameter bindings.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn return_shape(&self) -> ReturnShape {
        self.return_shape
    }

    /// Number of arguments a call to this method must supply.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}
