//! Contract metadata model for restbind.
//!
//! This crate holds the declarative description of a remote HTTP API:
//! which methods a contract exposes, how each parameter binds to the
//! request (path segment, query pair, header, body, cancellation), the
//! HTTP verb and route template, and the declared return shape.
//!
//! The model has two layers:
//!
//! - [`ContractDescriptor`] / [`MethodSpec`]: what the caller writes.
//!   A builder-style literal per method, the Rust replacement for the
//!   attribute metadata an annotation-based host would use.
//! - [`MethodDescriptor`] / [`ParameterDescriptor`]: the resolved,
//!   validated, immutable form produced by [`resolver::resolve`].
//!   Resolution happens at most once per method and is cached in the
//!   owning [`ContractShape`].
//!
//! Nothing in this crate performs I/O; the execution engine lives in
//! `restbind-client`.

mod binding;
mod contract;
mod descriptor;
mod error;
pub mod resolver;
mod route;

pub use binding::BindingKind;
pub use contract::{ContractDescriptor, ContractId, MethodSpec};
pub use descriptor::{MethodDescriptor, ParameterDescriptor, ReturnShape};
pub use error::ContractError;
pub use resolver::ContractShape;
pub use route::RouteTemplate;
