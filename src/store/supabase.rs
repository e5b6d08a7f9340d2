//! Supabase-backed store: PostgREST rows plus blob storage, authenticated
//! with the service-role key.

use async_trait::async_trait;
use uuid::Uuid;

use crate::pipeline::briefing::CommercialAsset;

use super::types::{
    DocumentPatch, DocumentRow, ProposalPatch, ProposalRow, Store,
};
use super::StoreError;

/// PostgREST media type for "exactly one row as an object".
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// HTTP client for the Supabase REST and storage APIs.
pub struct SupabaseStore {
    base_url: String,
    service_key: String,
    client: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(base_url: &str, service_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn rest_url(&self, table: &str, id: Uuid, select: Option<&str>) -> String {
        match select {
            Some(select) => format!(
                "{}/rest/v1/{table}?id=eq.{id}&select={select}",
                self.base_url
            ),
            None => format!("{}/rest/v1/{table}?id=eq.{id}", self.base_url),
        }
    }

    fn storage_url(&self, storage_path: &str) -> String {
        format!(
            "{}/storage/v1/object/documents/{}",
            self.base_url,
            storage_path.trim_start_matches('/')
        )
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn check(
        &self,
        response: Result<reqwest::Response, reqwest::Error>,
        not_found: impl FnOnce() -> String,
    ) -> Result<reqwest::Response, StoreError> {
        let response = response.map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND
            || status == reqwest::StatusCode::NOT_ACCEPTABLE
        {
            // PostgREST answers 406 when the single-object filter matches no row.
            return Err(StoreError::NotFound(not_found()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Store for SupabaseStore {
    async fn fetch_document(&self, id: Uuid) -> Result<DocumentRow, StoreError> {
        let response = self
            .authed(self.client.get(self.rest_url("documents", id, Some("*"))))
            .header("Accept", SINGLE_OBJECT)
            .send()
            .await;
        self.check(response, || format!("document {id}"))
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn update_document(&self, id: Uuid, patch: DocumentPatch) -> Result<(), StoreError> {
        let response = self
            .authed(self.client.patch(self.rest_url("documents", id, None)))
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await;
        self.check(response, || format!("document {id}")).await?;
        Ok(())
    }

    async fn fetch_proposal(&self, id: Uuid) -> Result<ProposalRow, StoreError> {
        let response = self
            .authed(self.client.get(self.rest_url(
                "proposals",
                id,
                Some("*,documents(briefing)"),
            )))
            .header("Accept", SINGLE_OBJECT)
            .send()
            .await;
        self.check(response, || format!("proposal {id}"))
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn update_proposal(&self, id: Uuid, patch: ProposalPatch) -> Result<(), StoreError> {
        let response = self
            .authed(self.client.patch(self.rest_url("proposals", id, None)))
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await;
        self.check(response, || format!("proposal {id}")).await?;
        Ok(())
    }

    async fn insert_commercial_assets(
        &self,
        assets: &[CommercialAsset],
    ) -> Result<(), StoreError> {
        if assets.is_empty() {
            return Ok(());
        }
        let url = format!("{}/rest/v1/commercial_assets", self.base_url);
        let response = self
            .authed(self.client.post(url))
            .header("Prefer", "return=minimal")
            .json(assets)
            .send()
            .await;
        self.check(response, || "commercial_assets".to_string())
            .await?;
        Ok(())
    }

    async fn download_pdf(&self, storage_path: &str) -> Result<Vec<u8>, StoreError> {
        let response = self
            .authed(self.client.get(self.storage_url(storage_path)))
            .send()
            .await;
        let bytes = self
            .check(response, || format!("object {storage_path}"))
            .await?
            .bytes()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
