//! Parameter binding kinds.

/// How a method parameter is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Substituted into a `{name}` placeholder of the route template.
    Path,
    /// Appended to the query string as `name=value`.
    Query,
    /// Sent as a request header named after the parameter.
    Header,
    /// Serialized by the configured codec into the request body.
    Body,
    /// A cancellation token for this call; never serialized.
    Cancellation,
}

impl BindingKind {
    /// Whether the bound argument appears in the request itself.
    pub fn is_wire(self) -> bool {
        !matches!(self, BindingKind::Cancellation)
    }
}

impl std::fmt::Display for BindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BindingKind::Path => "path",
            BindingKind::Query => "query",
            BindingKind::Header => "header",
            BindingKind::Body => "body",
            BindingKind::Cancellation => "cancellation",
        };
        f.write_str(s)
    }
}
