//! HTTP client for the Jira Service Management REST API.
//!
//! This module provides the `DeskClient` struct for making authenticated
//! requests to the Service Desk API (`rest/servicedeskapi/*`) and to the
//! Jira platform issue API (`rest/api/3/issue/*`), which is the only way to
//! edit fields on an existing request.
//!
//! Failed requests are not retried. Non-success responses are logged with
//! their status, headers and body, and returned as `KioskError::HttpStatus`.
//!
//! # Security
//!
//! Tokens are never logged. Response bodies are sanitized before they are
//! logged or stored in an error.

use std::borrow::Cow;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::config::{AuthMode, Config};
use crate::error::KioskError;
use crate::models::{
    AddUsersRequest, CustomerRequest, IssueUpdate, PagedResponse, RequestTypeFieldsResponse,
};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Media type used for both `Accept` and `Content-Type`.
const JSON_MEDIA_TYPE: &str = "application/json";

/// Path prefix of the Service Desk API.
const SERVICEDESK_API_PATH: &str = "rest/servicedeskapi";

/// Path prefix of the Jira platform issue API, used for field updates.
const ISSUE_API_PATH: &str = "rest/api/3/issue";

/// HTTP client for the Service Desk API.
///
/// Cloning is cheap; clones share the underlying connection pool.
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let client = DeskClient::new(&config)?;
///
/// let desks = client.get_service_desks().await?;
/// ```
#[derive(Clone)]
pub struct DeskClient {
    /// The underlying HTTP client with JSON default headers.
    http: Client,

    /// Jira site URL without trailing slash.
    base_url: String,

    /// Credentials attached to every request.
    /// SECURITY: Never log the token!
    auth: AuthMode,
}

impl DeskClient {
    /// Creates a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &Config) -> Result<Self, KioskError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));

        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .default_headers(headers)
            .danger_accept_invalid_certs(!config.ssl_verify)
            .build()
            .map_err(KioskError::HttpClient)?;

        if !config.ssl_verify {
            tracing::warn!("TLS certificate verification is disabled");
        }

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth: config.auth.clone(),
        })
    }

    /// Returns the token for sanitization purposes.
    ///
    /// This should ONLY be used for sanitizing error messages, never for logging.
    pub(crate) fn secret_for_sanitization(&self) -> &str {
        self.auth.secret()
    }

    /// Builds a Service Desk API URL for an endpoint relative to `rest/servicedeskapi/`.
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}/{}", self.base_url, SERVICEDESK_API_PATH, endpoint)
    }

    /// Builds the Jira platform URL for an issue.
    fn issue_url(&self, issue_key: &str) -> String {
        format!("{}/{}/{}", self.base_url, ISSUE_API_PATH, segment(issue_key))
    }

    /// Tests connectivity to the Jira site.
    ///
    /// Lists service desks once to verify the server is reachable and the
    /// credentials are accepted.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::ConnectionTest` with details about the failure.
    pub async fn test_connection(&self) -> Result<(), KioskError> {
        tracing::debug!("Testing connection to Jira Service Management");

        match self.get_service_desks().await {
            Ok(desks) => {
                tracing::info!(service_desks = desks.len(), "Connection test successful");
                Ok(())
            }
            Err(KioskError::HttpStatus { status, .. })
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                Err(KioskError::connection_test(format!(
                    "authentication failed ({}) - verify the Jira credentials",
                    status
                )))
            }
            Err(KioskError::Timeout { duration, .. }) => Err(KioskError::connection_test(format!(
                "connection timed out after {:?} - verify JIRA_URL is correct and the server is reachable",
                duration
            ))),
            Err(e) => {
                let message = KioskError::sanitize_message(&e.to_string(), self.auth.secret());
                Err(KioskError::connection_test(message))
            }
        }
    }

    /// Sends a request and returns the body of a successful response.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `url` - Absolute URL
    /// * `query` - Query string pairs (may be empty)
    /// * `body` - Optional JSON body
    async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<String, KioskError> {
        tracing::debug!(method = %method, url = %url, "Making Service Desk API request");

        let (username, password) = self.auth.basic_credentials();
        let mut req = self
            .http
            .request(method.clone(), url)
            .basic_auth(username, Some(password));

        if !query.is_empty() {
            req = req.query(query);
        }

        if let Some(body) = body {
            tracing::debug!(body = %pretty(body), "Request body");
            req = req.json(body);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                return KioskError::timeout(
                    Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                    format!("{} {}", method, url),
                );
            }
            tracing::error!(method = %method, url = %url, error = %e, "Service Desk API request failed");
            KioskError::Http(e)
        })?;

        let status = response.status();
        tracing::debug!(status = %status, headers = ?response.headers(), "Service Desk API response");

        if !status.is_success() {
            return Err(self.handle_http_error(&method, url, response).await);
        }

        let text = response.text().await.map_err(KioskError::Http)?;
        tracing::trace!(body = %text, "Service Desk API response body");
        Ok(text)
    }

    /// Logs a non-success response and converts it to `KioskError::HttpStatus`.
    async fn handle_http_error(
        &self,
        method: &Method,
        url: &str,
        response: reqwest::Response,
    ) -> KioskError {
        let status = response.status();
        let headers = format!("{:?}", response.headers());
        let body = response.text().await.unwrap_or_default();
        let body = KioskError::sanitize_message(&body, self.auth.secret());

        if status == StatusCode::BAD_REQUEST {
            tracing::error!(
                method = %method,
                url = %url,
                headers = %headers,
                body = %body,
                "400 Bad Request from Service Desk API"
            );
            if let Ok(json) = serde_json::from_str::<Value>(&body) {
                tracing::error!(error_json = %pretty(&json), "Service Desk API error details");
            }
        } else {
            tracing::error!(
                method = %method,
                url = %url,
                status = %status,
                headers = %headers,
                body = %body,
                "Service Desk API returned an error status"
            );
        }

        KioskError::HttpStatus { status, body }
    }

    /// Makes a GET request to the Service Desk API and parses the JSON response.
    async fn get<T>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T, KioskError>
    where
        T: DeserializeOwned,
    {
        let text = self
            .send(Method::GET, &self.api_url(endpoint), query, None)
            .await?;
        serde_json::from_str(&text).map_err(KioskError::Serialization)
    }

    /// Lists all service desks visible to the caller.
    pub async fn get_service_desks(&self) -> Result<Vec<Value>, KioskError> {
        let page: PagedResponse<Value> = self.get("servicedesk", &[]).await?;
        Ok(page.into_values())
    }

    /// Lists request types of a service desk.
    pub async fn get_request_types(&self, service_desk_id: &str) -> Result<Vec<Value>, KioskError> {
        let endpoint = format!("servicedesk/{}/requesttype", segment(service_desk_id));
        let page: PagedResponse<Value> = self.get(&endpoint, &[]).await?;
        Ok(page.into_values())
    }

    /// Lists organizations associated with a service desk.
    pub async fn get_organizations(&self, service_desk_id: &str) -> Result<Vec<Value>, KioskError> {
        let endpoint = format!("servicedesk/{}/organization", segment(service_desk_id));
        let page: PagedResponse<Value> = self.get(&endpoint, &[]).await?;
        Ok(page.into_values())
    }

    /// Lists users in an organization.
    ///
    /// Returns the whole paged object, so callers see `isLastPage` and friends.
    pub async fn get_organization_users(
        &self,
        organization_id: &str,
        start: u32,
        limit: u32,
    ) -> Result<Value, KioskError> {
        let endpoint = format!("organization/{}/user", segment(organization_id));
        self.get(
            &endpoint,
            &[("start", start.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// Adds users to an organization.
    ///
    /// Jira answers `204 No Content`; in that case a synthetic acknowledgment
    /// listing the submitted usernames is returned.
    pub async fn add_users_to_organization(
        &self,
        organization_id: &str,
        usernames: &[String],
    ) -> Result<Value, KioskError> {
        tracing::info!(
            organization_id = %organization_id,
            usernames = ?usernames,
            "Adding users to organization"
        );

        let url = self.api_url(&format!("organization/{}/user", segment(organization_id)));
        let body = serde_json::to_value(AddUsersRequest { usernames })?;
        let text = self.send(Method::POST, &url, &[], Some(&body)).await?;

        if text.trim().is_empty() {
            return Ok(json!({ "status": "added", "usernames": usernames }));
        }
        serde_json::from_str(&text).map_err(KioskError::Serialization)
    }

    /// Lists the fields a request type accepts.
    pub async fn get_request_type_fields(
        &self,
        service_desk_id: &str,
        request_type_id: &str,
    ) -> Result<Vec<Value>, KioskError> {
        let endpoint = format!(
            "servicedesk/{}/requesttype/{}/field",
            segment(service_desk_id),
            segment(request_type_id)
        );
        let fields: RequestTypeFieldsResponse<Value> = self.get(&endpoint, &[]).await?;
        Ok(fields.into_fields())
    }

    /// Creates a customer request through the Service Desk API.
    ///
    /// # Returns
    ///
    /// The created request as returned by Jira (includes `issueKey`).
    pub async fn create_customer_request(
        &self,
        request: &CustomerRequest,
    ) -> Result<Value, KioskError> {
        tracing::info!(
            service_desk_id = %request.service_desk_id,
            request_type_id = %request.request_type_id,
            "Creating customer request"
        );

        let body = serde_json::to_value(request)?;
        let text = self
            .send(Method::POST, &self.api_url("request"), &[], Some(&body))
            .await?;
        serde_json::from_str(&text).map_err(KioskError::Serialization)
    }

    /// Updates fields on an existing issue through the Jira platform API.
    ///
    /// The endpoint answers `204 No Content`, so a synthetic
    /// `{"status": "updated"}` is returned on success.
    pub async fn update_issue(
        &self,
        issue_key: &str,
        fields: Map<String, Value>,
    ) -> Result<Value, KioskError> {
        tracing::debug!(issue_key = %issue_key, field_count = fields.len(), "Updating issue");

        let body = serde_json::to_value(IssueUpdate { fields })?;
        self.send(Method::PUT, &self.issue_url(issue_key), &[], Some(&body))
            .await?;

        Ok(json!({ "status": "updated" }))
    }
}

/// Percent-encodes a caller-supplied path segment.
fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Pretty-prints JSON for log output.
fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
