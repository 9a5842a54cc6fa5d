//! End-to-end proxy behavior against a mock transport.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::future::BoxFuture;
use http::StatusCode;
use restbind_client::{
    ApiContract, ApiError, ClientConfig, Filter, Transport, create_proxy, create_proxy_dynamic,
};
use restbind_core::{ContractDescriptor, ContractError, MethodSpec};
use serde::Deserialize;

/// Records every request it receives and answers from a canned script.
struct ScriptedTransport {
    responses: Mutex<Vec<Result<(StatusCode, &'static str), ApiError>>>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<(StatusCode, &'static str), ApiError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn always_ok(body: &'static str) -> Arc<Self> {
        Self::new(vec![Ok((StatusCode::OK, body))])
    }

    fn requests(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> BoxFuture<'_, Result<http::Response<Bytes>, ApiError>> {
        Box::pin(async move {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{} {}", request.method(), request.uri()));
            let mut responses = self.responses.lock().unwrap();
            let scripted = if responses.len() > 1 {
                responses.remove(0)
            } else {
                responses[0].clone()
            };
            let (status, body) = scripted?;
            Ok(http::Response::builder()
                .status(status)
                .body(Bytes::from_static(body.as_bytes()))
                .unwrap())
        })
    }
}

fn config_with(transport: Arc<ScriptedTransport>) -> Arc<ClientConfig> {
    Arc::new(
        ClientConfig::builder("http://api.test")
            .transport_arc(transport)
            .build()
            .unwrap(),
    )
}

#[derive(Debug, Deserialize, PartialEq)]
struct Account {
    id: String,
    name: String,
}

struct Accounts;

impl ApiContract for Accounts {
    fn describe() -> ContractDescriptor {
        ContractDescriptor::new("e2e.Accounts")
            .method(MethodSpec::new("get").get("/accounts/{id}").path_param("id"))
            .method(
                MethodSpec::new("create")
                    .post("/accounts")
                    .body_param("account"),
            )
            .method(MethodSpec::new("delete").delete("/accounts/{id}").path_param("id").returns_unit())
    }
}

#[tokio::test]
async fn typed_call_builds_the_request_and_decodes_the_response() {
    let transport = ScriptedTransport::always_ok(r#"{"id":"7","name":"Ada"}"#);
    let proxy = create_proxy::<Accounts>(config_with(transport.clone())).unwrap();

    let account: Account = proxy.call("get", vec!["7".into()]).await.unwrap();

    assert_eq!(
        account,
        Account {
            id: "7".into(),
            name: "Ada".into()
        }
    );
    assert_eq!(transport.requests(), vec!["GET http://api.test/accounts/7"]);
}

#[tokio::test]
async fn body_bound_argument_is_posted_as_json() {
    let transport = ScriptedTransport::always_ok(r#"{"id":"8","name":"Grace"}"#);
    let proxy = create_proxy::<Accounts>(config_with(transport.clone())).unwrap();

    let created: Account = proxy
        .call(
            "create",
            vec![restbind_client::ArgValue::Json(
                serde_json::json!({"name": "Grace"}),
            )],
        )
        .await
        .unwrap();

    assert_eq!(created.name, "Grace");
    assert_eq!(transport.requests(), vec!["POST http://api.test/accounts"]);
}

#[tokio::test]
async fn unit_shaped_call_discards_the_body_without_decoding() {
    // A plain-text success body must not trip the codec on a method
    // whose result is discarded.
    let transport = ScriptedTransport::always_ok("deleted");
    let proxy = create_proxy::<Accounts>(config_with(transport)).unwrap();
    proxy.call_unit("delete", vec!["7".into()]).await.unwrap();
}

#[tokio::test]
async fn unbound_placeholder_fails_at_first_call_not_at_creation() {
    let descriptor = ContractDescriptor::new("e2e.Broken")
        .method(MethodSpec::new("get").get("/things/{id}"));
    let transport = ScriptedTransport::always_ok("null");

    // Synthesis only checks contract-level rules, so creation succeeds.
    let proxy = create_proxy_dynamic(&descriptor, config_with(transport.clone())).unwrap();

    let err = proxy.invoke("get", vec![]).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Contract(ContractError::UnboundPlaceholder { .. })
    ));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn wrong_arity_is_rejected_before_dispatch() {
    let transport = ScriptedTransport::always_ok("null");
    let proxy = create_proxy::<Accounts>(config_with(transport.clone())).unwrap();

    let err = proxy.invoke("get", vec![]).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Contract(ContractError::ArityMismatch { .. })
    ));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn deferred_failure_surfaces_only_at_the_handle() {
    let descriptor = ContractDescriptor::new("e2e.Deferred").method(
        MethodSpec::new("fetch")
            .get("/slow")
            .returns_deferred(),
    );
    let transport =
        ScriptedTransport::new(vec![Err(ApiError::Transport("connection refused".into()))]);
    let proxy = create_proxy_dynamic(&descriptor, config_with(transport)).unwrap();

    // The handle is produced without error; the failure waits inside it.
    let handle = proxy
        .call_deferred::<serde_json::Value>("fetch", vec![])
        .unwrap();
    let err = handle.await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn error_status_carries_the_raw_body() {
    let descriptor = ContractDescriptor::new("e2e.Failing")
        .method(MethodSpec::new("get").get("/missing"));
    let transport = ScriptedTransport::new(vec![Ok((StatusCode::NOT_FOUND, "gone"))]);
    let proxy = create_proxy_dynamic(&descriptor, config_with(transport)).unwrap();

    match proxy.invoke("get", vec![]).await.unwrap_err() {
        ApiError::Response { status, body } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body.as_ref(), b"gone");
        }
        other => panic!("expected response error, got {other:?}"),
    }
}

#[tokio::test]
async fn filters_wrap_the_exchange_in_registration_order() {
    struct Tagging(&'static str, Arc<Mutex<Vec<String>>>);

    impl Filter for Tagging {
        fn before_send<'a>(
            &'a self,
            _ctx: &'a mut restbind_client::ActionContext,
        ) -> BoxFuture<'a, Result<(), ApiError>> {
            Box::pin(async move {
                self.1.lock().unwrap().push(format!("{}:before", self.0));
                Ok(())
            })
        }

        fn after_receive<'a>(
            &'a self,
            _ctx: &'a mut restbind_client::ActionContext,
        ) -> BoxFuture<'a, Result<(), ApiError>> {
            Box::pin(async move {
                self.1.lock().unwrap().push(format!("{}:after", self.0));
                Ok(())
            })
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let descriptor =
        ContractDescriptor::new("e2e.Filtered").method(MethodSpec::new("ping").get("/ping"));
    let config = Arc::new(
        ClientConfig::builder("http://api.test")
            .transport_arc(ScriptedTransport::always_ok("null"))
            .filter(Tagging("a", log.clone()))
            .filter(Tagging("b", log.clone()))
            .build()
            .unwrap(),
    );
    let proxy = create_proxy_dynamic(&descriptor, config).unwrap();

    proxy.invoke("ping", vec![]).await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["a:before", "b:before", "a:after", "b:after"]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_use_publishes_a_single_shape() {
    // Many tasks race the first registration of a fresh contract; the
    // losers must observe the winner's shape, never a second one.
    let descriptor =
        ContractDescriptor::new("e2e.Stampede").method(MethodSpec::new("ping").get("/ping"));

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let descriptor = descriptor.clone();
            tokio::spawn(async move {
                let config = config_with(ScriptedTransport::always_ok("null"));
                create_proxy_dynamic(&descriptor, config).unwrap()
            })
        })
        .collect();

    let proxies: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let first = proxies[0].shape().clone();
    for proxy in &proxies {
        assert!(Arc::ptr_eq(proxy.shape(), &first));
    }
}

#[tokio::test]
async fn proxies_with_different_configs_share_the_contract_shape() {
    let a = create_proxy::<Accounts>(config_with(ScriptedTransport::always_ok("null"))).unwrap();
    let b = create_proxy::<Accounts>(config_with(ScriptedTransport::always_ok("{}"))).unwrap();
    assert!(Arc::ptr_eq(a.shape(), b.shape()));
}
