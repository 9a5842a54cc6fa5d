//! Metadata resolution: [`MethodSpec`] → [`MethodDescriptor`].
//!
//! Resolution is a pure function of the declared metadata, which makes
//! caching always valid: a [`ContractShape`] resolves each method at
//! most once (first call wins, the result is published through a
//! `OnceLock`) and hands out the same `Arc<MethodDescriptor>` for every
//! subsequent lookup.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use http::Method;

use crate::binding::BindingKind;
use crate::contract::{ContractDescriptor, MethodSpec};
use crate::descriptor::{MethodDescriptor, ParameterDescriptor};
use crate::error::ContractError;
use crate::route::RouteTemplate;

/// Resolve one method spec into its immutable descriptor.
///
/// Pure and idempotent. Defaults the verb to GET when none was
/// declared. Fails with [`ContractError`] when:
///
/// - the route template is malformed,
/// - a route placeholder has no path-bound parameter,
/// - a path-bound parameter names a placeholder missing from the route,
/// - two parameters of the same kind share a name,
/// - more than one body or cancellation parameter is declared.
pub fn resolve(spec: &MethodSpec) -> Result<MethodDescriptor, ContractError> {
    let method = spec.name().to_string();

    let route =
        RouteTemplate::parse(spec.declared_route()).map_err(|e| ContractError::MalformedRoute {
            method: method.clone(),
            route: spec.declared_route().to_string(),
            reason: e.to_string(),
        })?;

    let mut params = Vec::with_capacity(spec.declared_params().len());
    let mut seen: HashSet<(BindingKind, &str)> = HashSet::new();
    let mut bodies = 0usize;
    let mut cancellations = 0usize;

    for (position, (name, kind)) in spec.declared_params().iter().enumerate() {
        if !seen.insert((*kind, name.as_str())) {
            return Err(ContractError::DuplicateBinding {
                method,
                kind: kind.to_string(),
                name: name.clone(),
            });
        }
        match kind {
            BindingKind::Path => {
                if !route.has_placeholder(name) {
                    return Err(ContractError::MissingPlaceholder {
                        method,
                        parameter: name.clone(),
                        route: spec.declared_route().to_string(),
                    });
                }
            }
            BindingKind::Body => bodies += 1,
            BindingKind::Cancellation => cancellations += 1,
            BindingKind::Query | BindingKind::Header => {}
        }
        params.push(ParameterDescriptor::new(position, name.clone(), *kind));
    }

    if bodies > 1 {
        return Err(ContractError::MultipleBodies { method });
    }
    if cancellations > 1 {
        return Err(ContractError::MultipleCancellations { method });
    }

    for placeholder in route.placeholders() {
        let bound = params
            .iter()
            .any(|p| p.kind() == BindingKind::Path && p.name() == placeholder);
        if !bound {
            return Err(ContractError::UnboundPlaceholder {
                method,
                placeholder: placeholder.to_string(),
            });
        }
    }

    let verb = spec.declared_verb().cloned().unwrap_or(Method::GET);

    Ok(MethodDescriptor::new(
        method,
        verb,
        route,
        params,
        spec.declared_headers().to_vec(),
        spec.declared_return_shape(),
    ))
}

struct MethodSlot {
    spec: MethodSpec,
    resolved: OnceLock<Result<Arc<MethodDescriptor>, ContractError>>,
}

/// The synthesized, cacheable shape of one contract.
///
/// Synthesis validates the contract-level rules (name present, at least
/// one method, no duplicate method names) eagerly; per-method
/// resolution stays lazy and happens on the first lookup of each
/// method. Shapes are shared behind `Arc` by every proxy created for
/// the same contract.
pub struct ContractShape {
    name: String,
    slots: Vec<MethodSlot>,
    index: HashMap<String, usize>,
}

impl ContractShape {
    /// Validate the contract description and build its shape.
    pub fn synthesize(descriptor: &ContractDescriptor) -> Result<Self, ContractError> {
        if descriptor.name().is_empty() {
            return Err(ContractError::UnnamedContract);
        }
        if descriptor.methods().is_empty() {
            return Err(ContractError::EmptyContract(descriptor.name().to_string()));
        }

        let mut slots = Vec::with_capacity(descriptor.methods().len());
        let mut index = HashMap::with_capacity(descriptor.methods().len());
        for spec in descriptor.methods() {
            if index
                .insert(spec.name().to_string(), slots.len())
                .is_some()
            {
                return Err(ContractError::DuplicateMethod {
                    contract: descriptor.name().to_string(),
                    method: spec.name().to_string(),
                });
            }
            slots.push(MethodSlot {
                spec: spec.clone(),
                resolved: OnceLock::new(),
            });
        }

        Ok(Self {
            name: descriptor.name().to_string(),
            slots,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared method names, in declaration order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.spec.name())
    }

    /// Look up a method, resolving it on first use.
    ///
    /// Concurrent first lookups may race; the `OnceLock` guarantees a
    /// single published result and losers observe the winner's value.
    pub fn method(&self, name: &str) -> Result<Arc<MethodDescriptor>, ContractError> {
        let slot_index = *self
            .index
            .get(name)
            .ok_or_else(|| ContractError::UnknownMethod {
                contract: self.name.clone(),
                method: name.to_string(),
            })?;
        let slot = &self.slots[slot_index];
        slot.resolved
            .get_or_init(|| resolve(&slot.spec).map(Arc::new))
            .clone()
    }
}

impl std::fmt::Debug for ContractShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractShape")
            .field("name", &self.name)
            .field("methods", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ReturnShape;

    fn accounts() -> ContractDescriptor {
        ContractDescriptor::new("tests.Accounts")
            .method(MethodSpec::new("get").get("/accounts/{id}").path_param("id"))
            .method(
                MethodSpec::new("create")
                    .post("/accounts")
                    .body_param("account"),
            )
    }

    #[test]
    fn resolves_verb_route_and_params() {
        let spec = MethodSpec::new("get")
            .get("/accounts/{id}")
            .path_param("id")
            .query_param("expand");
        let descriptor = resolve(&spec).unwrap();
        assert_eq!(descriptor.name(), "get");
        assert_eq!(descriptor.verb(), &Method::GET);
        assert_eq!(descriptor.arity(), 2);
        assert_eq!(descriptor.params()[0].kind(), BindingKind::Path);
        assert_eq!(descriptor.params()[1].name(), "expand");
        assert_eq!(descriptor.return_shape(), ReturnShape::Value);
    }

    #[test]
    fn verb_defaults_to_get() {
        let spec = MethodSpec::new("ping").route("/ping");
        assert_eq!(resolve(&spec).unwrap().verb(), &Method::GET);
    }

    #[test]
    fn unbound_placeholder_is_a_contract_error() {
        let spec = MethodSpec::new("get").get("/accounts/{id}");
        assert!(matches!(
            resolve(&spec),
            Err(ContractError::UnboundPlaceholder { placeholder, .. }) if placeholder == "id"
        ));
    }

    #[test]
    fn path_param_without_placeholder_is_a_contract_error() {
        let spec = MethodSpec::new("get").get("/accounts").path_param("id");
        assert!(matches!(
            resolve(&spec),
            Err(ContractError::MissingPlaceholder { parameter, .. }) if parameter == "id"
        ));
    }

    #[test]
    fn multiple_bodies_rejected() {
        let spec = MethodSpec::new("create")
            .post("/accounts")
            .body_param("a")
            .body_param("b");
        assert!(matches!(
            resolve(&spec),
            Err(ContractError::MultipleBodies { .. })
        ));
    }

    #[test]
    fn duplicate_binding_rejected() {
        let spec = MethodSpec::new("list")
            .get("/accounts")
            .query_param("page")
            .query_param("page");
        assert!(matches!(
            resolve(&spec),
            Err(ContractError::DuplicateBinding { .. })
        ));
    }

    #[test]
    fn malformed_route_rejected() {
        let spec = MethodSpec::new("get").get("/accounts/{id");
        assert!(matches!(
            resolve(&spec),
            Err(ContractError::MalformedRoute { .. })
        ));
    }

    #[test]
    fn shape_rejects_duplicate_methods() {
        let descriptor = ContractDescriptor::new("tests.Dup")
            .method(MethodSpec::new("get").get("/a"))
            .method(MethodSpec::new("get").get("/b"));
        assert!(matches!(
            ContractShape::synthesize(&descriptor),
            Err(ContractError::DuplicateMethod { .. })
        ));
    }

    #[test]
    fn shape_rejects_empty_contract() {
        let descriptor = ContractDescriptor::new("tests.Empty");
        assert!(matches!(
            ContractShape::synthesize(&descriptor),
            Err(ContractError::EmptyContract(_))
        ));
    }

    #[test]
    fn shape_rejects_unnamed_contract() {
        let descriptor = ContractDescriptor::new("").method(MethodSpec::new("get").get("/a"));
        assert!(matches!(
            ContractShape::synthesize(&descriptor),
            Err(ContractError::UnnamedContract)
        ));
    }

    #[test]
    fn method_resolution_is_cached() {
        let shape = ContractShape::synthesize(&accounts()).unwrap();
        let first = shape.method("get").unwrap();
        let second = shape.method("get").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn failed_resolution_is_sticky() {
        let descriptor = ContractDescriptor::new("tests.Broken")
            .method(MethodSpec::new("get").get("/accounts/{id}"));
        let shape = ContractShape::synthesize(&descriptor).unwrap();
        assert!(shape.method("get").is_err());
        assert!(shape.method("get").is_err());
    }

    #[test]
    fn unknown_method_rejected() {
        let shape = ContractShape::synthesize(&accounts()).unwrap();
        assert!(matches!(
            shape.method("missing"),
            Err(ContractError::UnknownMethod { .. })
        ));
    }
}
