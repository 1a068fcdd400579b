use super::*;
use crate::net::types::User;
use crate::state::session::StorageKeys;
use crate::state::storage::{KeyValueStorage, MemoryStorage};
use crate::test_support::{RecordingNavigator, memory_store, spawn_backend, test_config};
use serde_json::Value;

fn user() -> User {
    User {
        id: 7,
        email: "alice@example.com".to_owned(),
        display_name: Some("Alice".to_owned()),
        is_active: true,
        is_privileged: false,
    }
}

async fn transport() -> (Arc<SessionStore>, Arc<RecordingNavigator>, Transport) {
    let base = spawn_backend().await;
    let store = memory_store();
    let navigator = Arc::new(RecordingNavigator::default());
    let transport = Transport::new(test_config(&base), store.clone(), navigator.clone()).unwrap();
    (store, navigator, transport)
}

// =============================================================================
// request phase
// =============================================================================

#[tokio::test]
async fn anonymous_request_has_no_authorization_header() {
    let (store, _, transport) = transport().await;
    store.hydrate();
    let body: Value = transport.get("/echo-auth").await.unwrap();
    assert!(body["authorization"].is_null());
}

#[tokio::test]
async fn authenticated_request_carries_bearer_token() {
    let (store, _, transport) = transport().await;
    store.set_session(user(), "tok-1".to_owned());
    let body: Value = transport.get("/echo-auth").await.unwrap();
    assert_eq!(body["authorization"], "Bearer tok-1");
}

#[tokio::test]
async fn unhydrated_store_sends_no_token() {
    let (_, _, transport) = transport().await;
    let body: Value = transport.get("/echo-auth").await.unwrap();
    assert!(body["authorization"].is_null());
}

#[tokio::test]
async fn token_is_read_per_request() {
    let (store, _, transport) = transport().await;
    store.set_session(user(), "first".to_owned());
    let first: Value = transport.get("/echo-auth").await.unwrap();
    store.set_session(user(), "second".to_owned());
    let second: Value = transport.get("/echo-auth").await.unwrap();
    assert_eq!(first["authorization"], "Bearer first");
    assert_eq!(second["authorization"], "Bearer second");
}

#[test]
fn authorize_reports_token_used() {
    let store = memory_store();
    let navigator = Arc::new(RecordingNavigator::default());
    let transport = Transport::new(test_config("http://127.0.0.1:9"), store.clone(), navigator).unwrap();
    let (_, token) = transport.authorize(reqwest::Client::new().get("http://127.0.0.1:9/x"));
    assert!(token.is_none());

    store.set_session(user(), "tok".to_owned());
    let (_, token) = transport.authorize(reqwest::Client::new().get("http://127.0.0.1:9/x"));
    assert_eq!(token.as_deref(), Some("tok"));
}

// =============================================================================
// response phase
// =============================================================================

#[tokio::test]
async fn unauthorized_clears_session_and_redirects_to_login() {
    let (store, navigator, transport) = transport().await;
    store.set_session(user(), "tok".to_owned());

    let err = transport.get::<Value>("/unauthorized").await.unwrap_err();
    assert!(matches!(err, TransportError::Unauthorized { .. }));
    assert!(!store.is_authenticated());
    assert_eq!(navigator.paths(), vec![LOGIN_PATH.to_owned()]);
}

#[tokio::test]
async fn concurrent_unauthorized_responses_clear_once() {
    let (store, navigator, transport) = transport().await;
    store.set_session(user(), "tok".to_owned());

    let (a, b, c) = tokio::join!(
        transport.get::<Value>("/unauthorized"),
        transport.get::<Value>("/unauthorized"),
        transport.get::<Value>("/unauthorized"),
    );
    for result in [a, b, c] {
        assert!(matches!(result, Err(TransportError::Unauthorized { .. })));
    }
    assert_eq!(navigator.paths().len(), 1);
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn unauthorized_for_anonymous_request_redirects_to_login() {
    let (store, navigator, transport) = transport().await;
    store.hydrate();
    let err = transport.get::<Value>("/unauthorized").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!store.is_authenticated());
    assert_eq!(navigator.paths(), vec![LOGIN_PATH.to_owned()]);
}

#[tokio::test]
async fn anonymous_unauthorized_does_not_redirect_when_already_on_login() {
    let (store, navigator, transport) = transport().await;
    store.hydrate();
    navigator.redirect(LOGIN_PATH);

    let (a, b, c) = tokio::join!(
        transport.get::<Value>("/unauthorized"),
        transport.get::<Value>("/unauthorized"),
        transport.get::<Value>("/unauthorized"),
    );
    for result in [a, b, c] {
        assert!(matches!(result, Err(TransportError::Unauthorized { .. })));
    }
    assert_eq!(navigator.paths(), vec![LOGIN_PATH.to_owned()]);
}

#[tokio::test]
async fn unauthorized_before_hydrate_erases_persisted_session() {
    let base = spawn_backend().await;
    let storage = Arc::new(MemoryStorage::new());
    let keys = StorageKeys::default();
    storage.set(&keys.token, "stale").unwrap();
    storage.set(&keys.user, &serde_json::to_string(&user()).unwrap()).unwrap();
    let store = Arc::new(SessionStore::new(storage.clone(), keys));
    let navigator = Arc::new(RecordingNavigator::default());
    let transport = Transport::new(test_config(&base), store.clone(), navigator.clone()).unwrap();

    let err = transport.get::<Value>("/unauthorized").await.unwrap_err();
    assert!(matches!(err, TransportError::Unauthorized { .. }));
    assert!(storage.is_empty());
    assert!(store.is_hydrated());
    assert!(!store.hydrate());
    assert_eq!(navigator.paths(), vec![LOGIN_PATH.to_owned()]);
}

#[tokio::test]
async fn server_error_propagates_without_touching_session() {
    let (store, navigator, transport) = transport().await;
    store.set_session(user(), "tok".to_owned());

    let err = transport.get::<Value>("/boom").await.unwrap_err();
    match err {
        TransportError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
    assert!(store.is_authenticated());
    assert!(navigator.paths().is_empty());
}

#[tokio::test]
async fn slow_response_times_out() {
    let (_, _, transport) = transport().await;
    let err = transport.get::<Value>("/slow").await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn empty_success_body_reads_as_null() {
    let (_, _, transport) = transport().await;
    let body: Value = transport.get("/empty").await.unwrap();
    assert!(body.is_null());
}

#[tokio::test]
async fn mismatched_success_body_is_parse_error() {
    let (_, _, transport) = transport().await;
    let err = transport.get::<User>("/echo-auth").await.unwrap_err();
    assert!(matches!(err, TransportError::Parse(_)));
}

#[tokio::test]
async fn connection_refused_is_request_error() {
    let store = memory_store();
    let transport =
        Transport::new(test_config("http://127.0.0.1:9"), store, Arc::new(RecordingNavigator::default())).unwrap();
    let err = transport.get::<Value>("/anything").await.unwrap_err();
    assert!(matches!(err, TransportError::Request(_) | TransportError::Timeout(_)), "got {err:?}");
}
