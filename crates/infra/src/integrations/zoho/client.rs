//! Zoho CRM REST client for lead CRUD and bulk operations.
//!
//! The methods here are pure pass-through request builders: method + path +
//! body + authorization header. Lead payloads are opaque JSON, and the CRM's
//! own error payloads are surfaced unmodified inside the returned error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leadlink_domain::{LeadLinkError, Result};
use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::{debug, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const AUTH_SCHEME: &str = "Zoho-oauthtoken";

/// Provides OAuth access tokens for CRM API calls.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Retrieve a bearer token to authorize CRM API calls.
    async fn access_token(&self) -> Result<String>;
}

/// Zoho CRM REST client.
pub struct ZohoClient {
    base_url: String,
    http_client: Client,
    access_token_provider: Arc<dyn AccessTokenProvider>,
}

impl ZohoClient {
    /// Create a new client for the given API base URL.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the CRM REST API (e.g. "https://www.zohoapis.com/crm/v2")
    /// * `access_token_provider` - Async provider that yields OAuth access
    ///   tokens
    pub fn new(
        base_url: String,
        access_token_provider: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LeadLinkError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, http_client, access_token_provider })
    }

    /// Create a new lead.
    pub async fn create_lead(&self, lead: &Value) -> Result<Value> {
        self.execute("create lead", Method::POST, "/Leads", Some(json!({ "data": [lead] })), &[])
            .await
    }

    /// Retrieve a single lead by id.
    pub async fn get_lead(&self, lead_id: &str) -> Result<Value> {
        self.execute("get lead", Method::GET, &format!("/Leads/{lead_id}"), None, &[]).await
    }

    /// Update an existing lead.
    pub async fn update_lead(&self, lead_id: &str, update: &Value) -> Result<Value> {
        self.execute(
            "update lead",
            Method::PUT,
            &format!("/Leads/{lead_id}"),
            Some(json!({ "data": [update] })),
            &[],
        )
        .await
    }

    /// Delete a lead.
    pub async fn delete_lead(&self, lead_id: &str) -> Result<Value> {
        self.execute("delete lead", Method::DELETE, &format!("/Leads/{lead_id}"), None, &[]).await
    }

    /// Create multiple leads in a single request.
    pub async fn bulk_create_leads(&self, leads: &[Value]) -> Result<Value> {
        self.execute("bulk create leads", Method::POST, "/Leads", Some(json!({ "data": leads })), &[])
            .await
    }

    /// Update multiple leads in a single request.
    pub async fn bulk_update_leads(&self, updates: &[Value]) -> Result<Value> {
        self.execute("bulk update leads", Method::PUT, "/Leads", Some(json!({ "data": updates })), &[])
            .await
    }

    /// Delete multiple leads in a single request.
    pub async fn bulk_delete_leads(&self, lead_ids: &[String]) -> Result<Value> {
        self.execute(
            "bulk delete leads",
            Method::DELETE,
            "/Leads",
            Some(json!({ "ids": lead_ids.join(",") })),
            &[],
        )
        .await
    }

    /// List leads, with optional filtering, sorting, and pagination params.
    pub async fn list_leads(&self, params: &[(String, String)]) -> Result<Value> {
        self.execute("list leads", Method::GET, "/Leads", None, params).await
    }

    async fn execute(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &[(String, String)],
    ) -> Result<Value> {
        let access_token = self.access_token_provider.access_token().await?;
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .header("Authorization", format!("{AUTH_SCHEME} {access_token}"));

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        debug!(%method, %url, operation, "sending Zoho CRM request");

        let response = request
            .send()
            .await
            .map_err(|e| LeadLinkError::Network(format!("failed to {operation}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body =
                response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, operation, "Zoho CRM request rejected");
            return Err(LeadLinkError::Network(format!(
                "failed to {operation} (HTTP {status}): {error_body}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LeadLinkError::Internal(format!("failed to parse Zoho response: {e}")))
    }
}
