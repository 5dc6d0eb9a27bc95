use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{JwtSessionResolver, SessionResolver, SuperadminGate};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::{self, ResourceStore};
use crate::handlers::{admin, system};

/// Shared, immutable per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub gate: SuperadminGate,
    pub sessions: Arc<dyn SessionResolver>,
    pub store: Arc<dyn ResourceStore>,
}

impl AppState {
    pub fn new(
        gate: SuperadminGate,
        sessions: Arc<dyn SessionResolver>,
        store: Arc<dyn ResourceStore>,
    ) -> Self {
        Self { gate, sessions, store }
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let gate = SuperadminGate::new(config.security.superadmin_emails.iter().cloned());
        let sessions = Arc::new(JwtSessionResolver::new(config.require_jwt_secret()?));
        let store = database::service_store(config)?;

        if gate.allowlist().is_empty() {
            tracing::warn!("Superadmin allowlist is empty; every admin request will be denied");
        }

        Ok(Self::new(gate, sessions, store))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        // Superadmin
        .merge(admin_routes())
        .with_state(state)
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/documents", get(admin::documents_list))
        .route("/api/admin/workspaces", get(admin::workspaces_list))
}

/// Router with the global middleware stack used by the server binary.
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    // Handlers log their own failures; the trace layer would log them again.
    let router = router(state).layer(TraceLayer::new_for_http().on_failure(()));

    if security.enable_cors {
        router.layer(cors_layer(security))
    } else {
        router
    }
}

pub fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([axum::http::header::AUTHORIZATION]);

    // A wildcard cannot be listed and cannot be combined with credentials.
    if security.cors_origins.iter().any(|origin| origin.trim() == "*") {
        tracing::warn!("CORS origin '*' configured; allowing any origin without credentials");
        return cors.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
