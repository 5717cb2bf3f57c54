//! Shared utilities for integration tests.
//!
//! The mock home server runs on its own tokio runtime so the blocking client
//! under test can be driven from the plain `#[test]` thread.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use tokio::runtime::Runtime;
use url::Url;

use matrix_http_client::config::schema::HttpConfig;
use matrix_http_client::http::HttpExecutor;
use matrix_http_client::{MatrixClient, SessionContext};

/// An axum router served on an ephemeral local port.
pub struct MockHomeserver {
    addr: SocketAddr,
    _runtime: Runtime,
}

impl MockHomeserver {
    pub fn start(router: Router) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();

        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .unwrap();
        let addr = listener.local_addr().unwrap();

        runtime.spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            addr,
            _runtime: runtime,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }
}

/// An address nothing listens on: connections are refused.
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

pub fn unused_url() -> Url {
    Url::parse(&format!("http://{}", unused_addr())).unwrap()
}

pub fn test_executor() -> HttpExecutor {
    let config = HttpConfig {
        connect_timeout_secs: 2,
        request_timeout_secs: 5,
        ..HttpConfig::default()
    };
    HttpExecutor::new(&config).unwrap()
}

/// A standard client pointed at `homeserver`.
pub fn client_for(homeserver: Url) -> MatrixClient {
    MatrixClient::new(SessionContext::for_homeserver(homeserver), test_executor())
}

/// Request counter shared with handlers.
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicU32>);

impl Hits {
    pub fn hit(&self) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Captured request data shared with handlers.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub fn record(&self, value: impl Into<String>) {
        self.0.lock().unwrap().push(value.into());
    }

    pub fn values(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
