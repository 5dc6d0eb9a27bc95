// handlers/admin/documents.rs - GET /api/admin/documents handler

use axum::{extract::State, http::HeaderMap, response::Json};
use serde_json::Value;

use super::{list_resource, AdminResource};
use crate::app::AppState;
use crate::error::ApiError;

pub const DOCUMENTS: AdminResource = AdminResource {
    key: "documents",
    table: "documents",
    columns: None,
    fallback_error: "Failed to fetch documents",
    log_tag: "[admin/documents]",
};

/// Every document across all workspaces, newest first.
pub async fn documents_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    list_resource(&state, &headers, &DOCUMENTS).await
}
