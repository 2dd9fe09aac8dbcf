//! `JournalApi` over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use ledgerdesk_core::accounts::ChartOfAccount;
use ledgerdesk_core::journal::{JournalEntry, JournalEntryForm};
use ledgerdesk_shared::config::ApiConfig;
use ledgerdesk_shared::types::{JournalEntryId, PageResponse, TenantId};
use ledgerdesk_shared::{AppError, AppResult};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{EntryQuery, JournalApi};

/// Header carrying the tenant id on every request.
pub const TENANT_HEADER: &str = "X-Tenant-Id";

/// Error body returned by the backend.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct SetDraftRequest<'a> {
    reason: &'a str,
}

/// REST client for the journal backend.
#[derive(Debug, Clone)]
pub struct HttpJournalApi {
    client: reqwest::Client,
    base_url: String,
    tenant_id: TenantId,
    token: Option<String>,
}

impl HttpJournalApi {
    /// Builds a client from the `api` configuration section.
    ///
    /// # Errors
    ///
    /// `Config` if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tenant_id: TenantId::new(config.tenant_id),
            token: config.token.clone(),
        })
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .client
            .request(method, self.url(path))
            .header(TENANT_HEADER, self.tenant_id.to_string());
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send(&self, req: RequestBuilder) -> AppResult<Response> {
        let response = req.send().await.map_err(|e| {
            warn!(error = %e, "Backend request failed");
            AppError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let err = map_status(status, body.error.as_deref(), body.message.as_deref());
        debug!(%status, code = err.error_code(), "Backend rejected request");
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> AppResult<T> {
        let response = self.send(req).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("Invalid response body: {e}")))
    }
}

/// Maps a non-success backend status onto the error taxonomy.
#[must_use]
pub fn map_status(status: StatusCode, code: Option<&str>, message: Option<&str>) -> AppError {
    let message = message.map_or_else(
        || status.canonical_reason().unwrap_or("request failed").to_string(),
        str::to_string,
    );

    match status {
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => match code {
            Some(c) if c.eq_ignore_ascii_case("duplicate_reference") => AppError::Conflict(message),
            _ => AppError::StaleState(message),
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(message),
        _ => AppError::Transport(format!("{status}: {message}")),
    }
}

#[async_trait]
impl JournalApi for HttpJournalApi {
    async fn list_entries(&self, query: &EntryQuery) -> AppResult<PageResponse<JournalEntry>> {
        let req = self
            .request(Method::GET, "/journal-entries")
            .query(&query.to_pairs());
        self.send_json(req).await
    }

    async fn get_entry(&self, id: JournalEntryId) -> AppResult<JournalEntry> {
        let req = self.request(Method::GET, &format!("/journal-entries/{id}"));
        self.send_json(req).await
    }

    async fn create_entry(&self, form: &JournalEntryForm) -> AppResult<JournalEntry> {
        let req = self.request(Method::POST, "/journal-entries").json(form);
        self.send_json(req).await
    }

    async fn update_entry(
        &self,
        id: JournalEntryId,
        form: &JournalEntryForm,
    ) -> AppResult<JournalEntry> {
        let req = self
            .request(Method::PUT, &format!("/journal-entries/{id}"))
            .json(form);
        self.send_json(req).await
    }

    async fn delete_entry(&self, id: JournalEntryId) -> AppResult<()> {
        let req = self.request(Method::DELETE, &format!("/journal-entries/{id}"));
        self.send(req).await.map(|_| ())
    }

    async fn post_entry(&self, id: JournalEntryId) -> AppResult<JournalEntry> {
        let req = self.request(Method::POST, &format!("/journal-entries/{id}/post"));
        self.send_json(req).await
    }

    async fn set_draft(&self, id: JournalEntryId, reason: &str) -> AppResult<JournalEntry> {
        let req = self
            .request(Method::POST, &format!("/journal-entries/{id}/set-draft"))
            .json(&SetDraftRequest { reason });
        self.send_json(req).await
    }

    async fn list_accounts(&self) -> AppResult<Vec<ChartOfAccount>> {
        let req = self.request(Method::GET, "/chart-of-accounts");
        self.send_json(req).await
    }
}
