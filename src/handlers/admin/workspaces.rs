// handlers/admin/workspaces.rs - GET /api/admin/workspaces handler

use axum::{extract::State, http::HeaderMap, response::Json};
use serde_json::Value;

use super::{list_resource, AdminResource};
use crate::app::AppState;
use crate::error::ApiError;

pub const WORKSPACES: AdminResource = AdminResource {
    key: "workspaces",
    table: "workspaces",
    columns: Some(&["id", "name", "created_at"]),
    fallback_error: "Failed to fetch workspaces",
    log_tag: "[admin/workspaces]",
};

/// Every workspace's id, name and creation time, newest first.
pub async fn workspaces_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    list_resource(&state, &headers, &WORKSPACES).await
}
