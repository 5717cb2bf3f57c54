//! Login, logout and registration flows.

use axum::extract::RawQuery;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;

use matrix_http_client::{
    Capabilities, Capability, MatrixError, PasswordCredentials, SessionContext, UserId,
};

mod common;
use common::{client_for, test_executor, unused_url, Hits, MockHomeserver, Recorder};

const LOGIN_RESPONSE: &str = r#"{"access_token":"tok1","device_id":"dev1","user_id":"@a:x"}"#;

/// A home server accepting login, logout and whoami, recording bodies and queries.
fn auth_server(bodies: Recorder, queries: Recorder) -> MockHomeserver {
    let login_bodies = bodies.clone();
    let logout_queries = queries.clone();
    let whoami_queries = queries;

    MockHomeserver::start(
        Router::new()
            .route(
                "/_matrix/client/v3/login",
                post(move |body: String| {
                    let bodies = login_bodies.clone();
                    async move {
                        bodies.record(body);
                        LOGIN_RESPONSE
                    }
                }),
            )
            .route(
                "/_matrix/client/v3/logout",
                post(move |RawQuery(query): RawQuery| {
                    let queries = logout_queries.clone();
                    async move {
                        queries.record(query.unwrap_or_default());
                        "{}"
                    }
                }),
            )
            .route(
                "/_matrix/client/v3/account/whoami",
                get(move |RawQuery(query): RawQuery| {
                    let queries = whoami_queries.clone();
                    async move {
                        queries.record(query.unwrap_or_default());
                        r#"{"user_id":"@a:x"}"#
                    }
                }),
            ),
    )
}

#[test]
fn test_login_then_logout_round_trip() {
    let bodies = Recorder::default();
    let queries = Recorder::default();
    let server = auth_server(bodies.clone(), queries.clone());
    let mut client = client_for(server.url());

    client.login(&PasswordCredentials::new("a", "pw")).unwrap();
    let ctx = client.context();
    assert_eq!(ctx.access_token(), Some("tok1"));
    assert_eq!(ctx.device_id(), Some("dev1"));
    assert_eq!(ctx.user().map(UserId::as_str), Some("@a:x"));
    assert!(client.is_logged_in());

    let login: Value = serde_json::from_str(&bodies.values()[0]).unwrap();
    assert_eq!(login["type"], "m.login.password");
    assert_eq!(login["identifier"]["user"], "a");
    assert_eq!(login["password"], "pw");

    assert_eq!(client.whoami().unwrap().as_str(), "@a:x");

    client.logout().unwrap();
    let ctx = client.context();
    assert_eq!(ctx.access_token(), None);
    assert_eq!(ctx.device_id(), None);
    assert_eq!(ctx.user(), None);
    assert_eq!(ctx.homeserver_url(), Some(&server.url()));

    assert_eq!(queries.values(), vec!["access_token=tok1", "access_token=tok1"]);
}

#[test]
fn test_login_resumes_device_and_skips_display_name() {
    let bodies = Recorder::default();
    let server = auth_server(bodies.clone(), Recorder::default());
    let mut client = client_for(server.url());
    client.set_context(
        client
            .context()
            .clone()
            .with_device_id(Some("OLDDEV".into()))
            .with_initial_device_display_name(Some("Laptop".into())),
    );

    client.login(&PasswordCredentials::new("a", "pw")).unwrap();

    let login: Value = serde_json::from_str(&bodies.values()[0]).unwrap();
    assert_eq!(login["device_id"], "OLDDEV");
    assert!(login.get("initial_device_display_name").is_none());
    assert_eq!(client.context().device_id(), Some("dev1"));
}

#[test]
fn test_login_new_device_sends_display_name() {
    let bodies = Recorder::default();
    let server = auth_server(bodies.clone(), Recorder::default());
    let mut client = client_for(server.url());
    client.set_context(
        client
            .context()
            .clone()
            .with_initial_device_display_name(Some("Laptop".into())),
    );

    client.login(&PasswordCredentials::new("a", "pw")).unwrap();

    let login: Value = serde_json::from_str(&bodies.values()[0]).unwrap();
    assert!(login.get("device_id").is_none());
    assert_eq!(login["initial_device_display_name"], "Laptop");
}

#[test]
fn test_failed_login_leaves_context_untouched() {
    let server = MockHomeserver::start(Router::new().route(
        "/_matrix/client/v3/login",
        post(|| async {
            (
                StatusCode::FORBIDDEN,
                r#"{"errcode":"M_FORBIDDEN","error":"Invalid password"}"#,
            )
        }),
    ));
    let mut client = client_for(server.url());

    let err = client.login(&PasswordCredentials::new("a", "wrong")).unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.errcode(), Some("M_FORBIDDEN"));
    assert!(!client.is_logged_in());
}

#[test]
fn test_login_response_without_token_is_rejected() {
    let server = MockHomeserver::start(Router::new().route(
        "/_matrix/client/v3/login",
        post(|| async { r#"{"user_id":"@a:x"}"# }),
    ));
    let mut client = client_for(server.url());

    let err = client.login(&PasswordCredentials::new("a", "pw")).unwrap_err();
    assert!(matches!(err, MatrixError::InvalidResponse(_)));
    assert!(!client.is_logged_in());
}

#[test]
fn test_logout_clears_context_even_when_server_fails() {
    let server = MockHomeserver::start(Router::new().route(
        "/_matrix/client/v3/logout",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                r#"{"errcode":"M_UNKNOWN_TOKEN","error":"Unknown token"}"#,
            )
        }),
    ));
    let mut client = client_for(server.url());
    client.set_context(client.context().clone().authenticated(
        "stale".into(),
        Some("dev".into()),
        UserId::parse("@a:x").unwrap(),
    ));

    let err = client.logout().unwrap_err();
    assert_eq!(err.errcode(), Some("M_UNKNOWN_TOKEN"));
    assert_eq!(client.context().access_token(), None);
    assert_eq!(client.context().device_id(), None);
    assert_eq!(client.context().user(), None);
}

#[test]
fn test_logout_without_token_makes_no_request() {
    let hits = Hits::default();
    let counter = hits.clone();
    let server = MockHomeserver::start(Router::new().route(
        "/_matrix/client/v3/logout",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.hit();
                "{}"
            }
        }),
    ));
    let mut client = client_for(server.url());

    assert!(matches!(client.logout(), Err(MatrixError::InvalidState(_))));
    assert_eq!(hits.count(), 0);
}

#[test]
fn test_shared_secret_registration() {
    let bodies = Recorder::default();
    let recorded = bodies.clone();
    let server = MockHomeserver::start(Router::new().route(
        "/_matrix/client/api/v1/register",
        post(move |body: String| {
            let bodies = recorded.clone();
            async move {
                bodies.record(body);
                r#"{"access_token":"regtok","device_id":"REGDEV","user_id":"@alice:x"}"#
            }
        }),
    ));
    let mut client = client_for(server.url())
        .with_capabilities(Capabilities::standard().with(Capability::AdminRegistration));

    client
        .register_with_shared_secret("secret", &PasswordCredentials::new("alice", "hunter2"), false)
        .unwrap();

    let body: Value = serde_json::from_str(&bodies.values()[0]).unwrap();
    assert_eq!(body["user"], "alice");
    assert_eq!(body["password"], "hunter2");
    assert_eq!(body["type"], "org.matrix.login.shared_secret");
    assert_eq!(body["admin"], false);
    assert_eq!(body["mac"], "f31a3302169caa090eb9b8e381de2dc85a8f3e0b");

    assert_eq!(client.context().access_token(), Some("regtok"));
    assert_eq!(client.context().device_id(), Some("REGDEV"));
    assert_eq!(client.context().user().map(UserId::as_str), Some("@alice:x"));
}

#[test]
fn test_registration_requires_admin_capability() {
    let mut client = client_for(unused_url());
    let err = client
        .register_with_shared_secret("secret", &PasswordCredentials::new("alice", "pw"), true)
        .unwrap_err();
    assert!(matches!(err, MatrixError::InvalidState(_)));
}

#[test]
fn test_login_transport_failure() {
    let mut client = matrix_http_client::MatrixClient::new(
        SessionContext::for_homeserver(unused_url()),
        test_executor(),
    );
    let err = client.login(&PasswordCredentials::new("a", "pw")).unwrap_err();
    assert!(err.is_transport());
    assert!(!client.is_logged_in());
}
