// handlers/admin/mod.rs - Superadmin-only listing endpoints
//
// Every endpoint here runs the same sequence:
//   session → superadmin gate → one read query → JSON
// and answers 401 / 403 / 200 / 500 accordingly. New admin endpoints add an
// `AdminResource` and a two-line handler; they never reimplement the checks.

use axum::{http::HeaderMap, response::Json};
use serde_json::{Map, Value};

use crate::app::AppState;
use crate::auth::{Decision, DenyReason};
use crate::database::{ListQuery, Projection};
use crate::error::ApiError;

pub mod documents; // GET /api/admin/documents
pub mod workspaces; // GET /api/admin/workspaces

pub use documents::documents_list;
pub use workspaces::workspaces_list;

/// Describes one admin listing.
#[derive(Debug, Clone, Copy)]
pub struct AdminResource {
    /// Key the rows are returned under, e.g. `{"documents": [...]}`
    pub key: &'static str,
    pub table: &'static str,
    /// `None` selects every column.
    pub columns: Option<&'static [&'static str]>,
    /// 500 body when the store gives no message of its own.
    pub fallback_error: &'static str,
    /// Subsystem tag prefixed to log lines.
    pub log_tag: &'static str,
}

impl AdminResource {
    pub fn query(&self) -> ListQuery {
        let projection = match self.columns {
            Some(columns) => Projection::columns(columns.iter().copied()),
            None => Projection::All,
        };
        ListQuery::newest_first(self.table, projection)
    }
}

pub async fn list_resource(
    state: &AppState,
    headers: &HeaderMap,
    resource: &AdminResource,
) -> Result<Json<Value>, ApiError> {
    // A malformed or expired token is treated the same as no session.
    let identity = match state.sessions.resolve(headers).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!("{} session not resolved: {}", resource.log_tag, e);
            None
        }
    };

    match state.gate.authorize(identity.as_ref()) {
        Decision::Allowed => {}
        Decision::Denied(DenyReason::Unauthenticated) => {
            return Err(ApiError::unauthenticated());
        }
        Decision::Denied(DenyReason::Forbidden) => {
            if let Some(identity) = &identity {
                tracing::warn!("{} superadmin access denied for user {}", resource.log_tag, identity.user_id);
            }
            return Err(ApiError::not_superadmin());
        }
    }

    let rows = state.store.select(&resource.query()).await.map_err(|e| {
        tracing::error!("{} Error fetching {}: {}", resource.log_tag, resource.key, e);
        ApiError::internal_server_error(
            e.upstream_message()
                .unwrap_or_else(|| resource.fallback_error.to_string()),
        )
    })?;

    tracing::debug!("{} returned {} rows", resource.log_tag, rows.len());

    let mut body = Map::new();
    body.insert(resource.key.to_string(), Value::Array(rows));
    Ok(Json(Value::Object(body)))
}
