//! Contract-level error type.

/// A declared contract, method, or parameter shape is unusable.
///
/// Contract errors are fatal and detected as early as possible: either
/// when a proxy is created for the contract or at the first resolution
/// of the offending method. They are never retried and, once produced,
/// a method's resolution result does not change for the process
/// lifetime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// The contract was declared without a name.
    #[error("contract has no name")]
    UnnamedContract,

    /// The contract declares no methods at all.
    #[error("contract `{0}` declares no methods")]
    EmptyContract(String),

    /// Two methods share the same name.
    #[error("contract `{contract}` declares method `{method}` more than once")]
    DuplicateMethod { contract: String, method: String },

    /// The route template could not be parsed.
    #[error("method `{method}`: malformed route `{route}`: {reason}")]
    MalformedRoute {
        method: String,
        route: String,
        reason: String,
    },

    /// A `{placeholder}` in the route has no parameter bound to it.
    #[error("method `{method}`: route placeholder `{{{placeholder}}}` has no bound parameter")]
    UnboundPlaceholder { method: String, placeholder: String },

    /// A path-bound parameter names a placeholder the route does not contain.
    #[error(
        "method `{method}`: parameter `{parameter}` is bound to a placeholder \
         that does not exist in `{route}`"
    )]
    MissingPlaceholder {
        method: String,
        parameter: String,
        route: String,
    },

    /// Two parameters of the same binding kind share a name.
    #[error("method `{method}`: duplicate {kind} binding for `{name}`")]
    DuplicateBinding {
        method: String,
        kind: String,
        name: String,
    },

    /// More than one parameter is bound to the request body.
    #[error("method `{method}`: more than one parameter bound to the request body")]
    MultipleBodies { method: String },

    /// More than one cancellation parameter was declared.
    #[error("method `{method}`: more than one cancellation parameter")]
    MultipleCancellations { method: String },

    /// The invoked method is not declared by the contract.
    #[error("contract `{contract}` does not declare method `{method}`")]
    UnknownMethod { contract: String, method: String },

    /// The call supplied the wrong number of arguments.
    #[error("method `{method}`: expected {expected} argument(s), got {actual}")]
    ArityMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },
}
