//! Runtime HTTP client engine for declaratively described APIs.
//!
//! Contracts are declared with [`restbind_core`]'s metadata builders,
//! turned into callable proxies here, and executed over a pluggable
//! transport with an ordered filter pipeline around every exchange.
//!
//! ```no_run
//! use restbind_client::{ApiContract, ClientConfig, create_proxy};
//! use restbind_core::{ContractDescriptor, MethodSpec};
//! use std::sync::Arc;
//!
//! struct Accounts;
//!
//! impl ApiContract for Accounts {
//!     fn describe() -> ContractDescriptor {
//!         ContractDescriptor::new("example.Accounts")
//!             .method(MethodSpec::new("get").get("/accounts/{id}").path_param("id"))
//!     }
//! }
//!
//! # async fn run() -> Result<(), restbind_client::ApiError> {
//! let config = Arc::new(ClientConfig::builder("http://localhost:3000").build()?);
//! let accounts = create_proxy::<Accounts>(config)?;
//! let account: serde_json::Value = accounts.call("get", vec!["7".into()]).await?;
//! # Ok(())
//! # }
//! ```

mod codec;
mod config;
mod context;
mod error;
mod handle;
mod interceptor;
mod pipeline;
mod proxy;
mod response;
mod transport;

pub use codec::{Codec, JsonCodec};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use context::{ActionContext, ArgValue, RequestPlan};
pub use error::ApiError;
pub use handle::CallHandle;
pub use interceptor::Interceptor;
pub use pipeline::{Filter, FilterChain, HeaderFilter, TraceFilter};
pub use proxy::{
    ApiContract, ApiProxy, create_proxy, create_proxy_dynamic, create_proxy_with_interceptor,
};
pub use response::ExchangeResponse;
pub use transport::{HyperTransport, HyperTransportBuilder, Transport};
