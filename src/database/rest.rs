use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::store::{ListQuery, Projection, ResourceStore, StoreError};

/// Service-role client for the Supabase REST API (`/rest/v1`).
///
/// The service-role key bypasses row level security, so this client must only
/// ever be reached after the superadmin gate has allowed the request.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: Url,
    service_role_key: String,
}

/// PostgREST error body
#[derive(Debug, Deserialize)]
struct RestErrorBody {
    message: Option<String>,
}

impl RestStore {
    pub fn new(project_url: &str, service_role_key: impl Into<String>) -> Result<Self, StoreError> {
        let mut base_url = Url::parse(project_url)
            .map_err(|e| StoreError::Connection(format!("invalid SUPABASE_URL: {}", e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            service_role_key: service_role_key.into(),
        })
    }

    pub fn build_url(&self, query: &ListQuery) -> Result<Url, StoreError> {
        query.validate()?;

        let mut url = self
            .base_url
            .join(&format!("rest/v1/{}", query.table))
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let select = match &query.projection {
            Projection::All => "*".to_string(),
            Projection::Columns(columns) => columns.join(","),
        };
        let order = format!("{}.{}", query.order.column, query.order.direction.as_rest());

        url.query_pairs_mut()
            .append_pair("select", &select)
            .append_pair("order", &order);
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }
}

#[async_trait]
impl ResourceStore for RestStore {
    async fn select(&self, query: &ListQuery) -> Result<Vec<Value>, StoreError> {
        let url = self.build_url(query)?;

        let response = self
            .authorized(self.client.get(url))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<RestErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);
            return Err(StoreError::Upstream { message });
        }

        let rows: Option<Vec<Value>> = response.json().await?;
        Ok(rows.unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = self
            .base_url
            .join("rest/v1/")
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let status = self.authorized(self.client.get(url)).send().await?.status();
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::Upstream {
                message: Some("service role key rejected".to_string()),
            }),
            s => Err(StoreError::Connection(format!("REST API returned {}", s))),
        }
    }
}
