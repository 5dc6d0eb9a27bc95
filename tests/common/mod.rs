#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::http::HeaderMap;
use serde_json::Value;

use collab_admin_api::app::{self, AppState};
use collab_admin_api::auth::{extract_access_token, SessionError, SessionIdentity, SessionResolver, SuperadminGate};
use collab_admin_api::database::{ListQuery, ResourceStore, StoreError};

pub const SUPERADMIN_EMAIL: &str = "joe@upupdndn.ai";

/// Bearer tokens understood by [`StaticSessions`]
pub const ADMIN_TOKEN: &str = "admin-token";
pub const MEMBER_TOKEN: &str = "member-token";
pub const SHOUTY_ADMIN_TOKEN: &str = "shouty-admin-token";
pub const NO_EMAIL_TOKEN: &str = "no-email-token";

/// Session resolver with a fixed token table.
pub struct StaticSessions;

#[async_trait]
impl SessionResolver for StaticSessions {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<SessionIdentity>, SessionError> {
        let Some(token) = extract_access_token(headers)? else {
            return Ok(None);
        };

        let email = match token.as_str() {
            ADMIN_TOKEN => Some(SUPERADMIN_EMAIL),
            MEMBER_TOKEN => Some("member@example.com"),
            SHOUTY_ADMIN_TOKEN => Some("Joe@UpUpDnDn.AI"),
            NO_EMAIL_TOKEN => None,
            other => return Err(SessionError::InvalidToken(format!("unknown token {}", other))),
        };

        Ok(Some(SessionIdentity {
            user_id: format!("user-{}", token),
            email: email.map(str::to_string),
            role: Some("authenticated".to_string()),
        }))
    }
}

#[derive(Clone)]
pub enum StoreOutcome {
    Rows(Vec<Value>),
    Fail(Option<String>),
}

/// In-memory store that records every query it receives.
pub struct FakeStore {
    outcome: StoreOutcome,
    queries: Mutex<Vec<ListQuery>>,
}

impl FakeStore {
    pub fn rows(rows: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            outcome: StoreOutcome::Rows(rows),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            outcome: StoreOutcome::Fail(message.map(str::to_string)),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<ListQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceStore for FakeStore {
    async fn select(&self, query: &ListQuery) -> Result<Vec<Value>, StoreError> {
        self.queries.lock().unwrap().push(query.clone());
        match &self.outcome {
            StoreOutcome::Rows(rows) => Ok(rows.clone()),
            StoreOutcome::Fail(message) => Err(StoreError::Upstream { message: message.clone() }),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match &self.outcome {
            StoreOutcome::Rows(_) => Ok(()),
            StoreOutcome::Fail(message) => Err(StoreError::Upstream { message: message.clone() }),
        }
    }
}

pub fn state_with(store: Arc<FakeStore>) -> AppState {
    AppState::new(SuperadminGate::new([SUPERADMIN_EMAIL]), Arc::new(StaticSessions), store)
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

/// Serve the router on a free local port for the lifetime of the test runtime.
pub async fn spawn_server(store: Arc<FakeStore>) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    let router = app::router(state_with(store));
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer { port, base_url })
}

pub async fn get(server: &TestServer, path: &str, token: Option<&str>) -> Result<reqwest::Response> {
    let client = reqwest::Client::new();
    let mut request = client.get(format!("{}{}", server.base_url, path));
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    Ok(request.send().await?)
}
