//! MCP server implementation for Kiosk.
//!
//! This module defines the `KioskServer` struct that implements the MCP
//! `ServerHandler` trait, exposing Service Desk operations as tools.
//!
//! Every tool returns a string: pretty-printed JSON on success, or an
//! error message (`Error: ...`, `HTTP Error {status}: ...`,
//! `Error parsing {field} JSON: ...`). Errors never cross the tool boundary.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::Config;
use crate::desk_client::DeskClient;
use crate::error::KioskError;
use crate::models::CustomerRequest;
use crate::tools::{
    parse_json_object, parse_usernames, AddUsersInput, CreateCustomerRequestInput,
    OrganizationUsersInput, RequestTypeFieldsInput, ServiceDeskInput, UpdateIssueInput,
    DEFAULT_USERS_LIMIT, DEFAULT_USERS_START,
};

/// The Kiosk MCP server.
#[derive(Clone)]
pub struct KioskServer {
    /// Client for API operations.
    client: DeskClient,
    /// Service desk used when a tool call omits one.
    default_service_desk_id: Option<String>,
    /// When true, write tools are refused.
    read_only: bool,
    /// Tool router for MCP tool dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl KioskServer {
    /// Creates a new Kiosk server instance.
    ///
    /// # Arguments
    ///
    /// * `client` - The Service Desk client for API operations
    /// * `config` - Supplies the default service desk and the read-only flag
    pub fn new(client: DeskClient, config: &Config) -> Self {
        Self {
            client,
            default_service_desk_id: config.default_service_desk_id.clone(),
            read_only: config.read_only,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Get all available Service Desks. Returns a JSON array of service desks with their IDs, project keys and names.")]
    async fn servicedesk_get_service_desks(&self) -> String {
        tracing::debug!("servicedesk_get_service_desks tool called");

        let result = self.client.get_service_desks().await;
        self.render("get service desks", result)
    }

    #[tool(description = "Get available request types for a Service Desk. service_desk_id is optional if JIRA_DEFAULT_SERVICE_DESK_ID is set.")]
    async fn servicedesk_get_request_types(
        &self,
        Parameters(input): Parameters<ServiceDeskInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(?input, "servicedesk_get_request_types tool called");

        let result = match self.resolve_service_desk(input.service_desk_id) {
            Ok(id) => self.client.get_request_types(&id).await,
            Err(e) => Err(e),
        };
        self.render("get request types", result)
    }

    #[tool(description = "Get organizations associated with a Service Desk. service_desk_id is optional if JIRA_DEFAULT_SERVICE_DESK_ID is set.")]
    async fn servicedesk_get_organizations(
        &self,
        Parameters(input): Parameters<ServiceDeskInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(?input, "servicedesk_get_organizations tool called");

        let result = match self.resolve_service_desk(input.service_desk_id) {
            Ok(id) => self.client.get_organizations(&id).await,
            Err(e) => Err(e),
        };
        self.render("get organizations", result)
    }

    #[tool(description = "Get users in a Service Desk organization. Supports pagination with start (default 0) and limit (default 50).")]
    async fn servicedesk_get_organization_users(
        &self,
        Parameters(input): Parameters<OrganizationUsersInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(?input, "servicedesk_get_organization_users tool called");

        let result = match require("organization_id", &input.organization_id) {
            Ok(()) => {
                self.client
                    .get_organization_users(
                        &input.organization_id,
                        input.start.unwrap_or(DEFAULT_USERS_START),
                        input.limit.unwrap_or(DEFAULT_USERS_LIMIT),
                    )
                    .await
            }
            Err(e) => Err(e),
        };
        self.render("get organization users", result)
    }

    #[tool(description = "Add users to a Service Desk organization. usernames is a comma-separated list of usernames or account IDs.")]
    async fn servicedesk_add_users_to_organization(
        &self,
        Parameters(input): Parameters<AddUsersInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(organization_id = %input.organization_id, "servicedesk_add_users_to_organization tool called");

        let result = self.add_users_to_organization(&input).await;
        self.render("add users to organization", result)
    }

    #[tool(description = "Get the fields of a Service Desk request type, including which are required. service_desk_id is optional if JIRA_DEFAULT_SERVICE_DESK_ID is set.")]
    async fn servicedesk_get_request_type_fields(
        &self,
        Parameters(input): Parameters<RequestTypeFieldsInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(?input, "servicedesk_get_request_type_fields tool called");

        let result = self.get_request_type_fields(input).await;
        self.render("get request type fields", result)
    }

    #[tool(description = "Create a Service Desk customer request. Requires request_type_id (see servicedesk_get_request_types), summary and description. request_field_values is an optional JSON object string of extra fields (see servicedesk_get_request_type_fields).")]
    async fn servicedesk_create_customer_request(
        &self,
        Parameters(input): Parameters<CreateCustomerRequestInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(
            request_type_id = %input.request_type_id,
            "servicedesk_create_customer_request tool called"
        );

        let result = self.create_customer_request(input).await;
        self.render("create customer request", result)
    }

    #[tool(description = "Update custom fields on an existing Service Desk issue. custom_fields is a JSON object string, e.g. '{\"customfield_10500\": [\"53\"]}'.")]
    async fn servicedesk_update_issue(
        &self,
        Parameters(input): Parameters<UpdateIssueInput>,
    ) -> String {
        let input = input.sanitize();
        tracing::debug!(issue_key = %input.issue_key, "servicedesk_update_issue tool called");

        match self.update_issue(&input).await {
            Ok(_) => format!("Issue {} updated successfully", input.issue_key),
            Err(e) => self.render_error("update issue", &e),
        }
    }
}

impl KioskServer {
    /// Falls back to the configured default service desk.
    fn resolve_service_desk(&self, service_desk_id: Option<String>) -> Result<String, KioskError> {
        service_desk_id
            .or_else(|| self.default_service_desk_id.clone())
            .ok_or(KioskError::MissingServiceDesk)
    }

    /// Refuses write operations in read-only mode.
    fn ensure_writable(&self, action: &'static str) -> Result<(), KioskError> {
        if self.read_only {
            return Err(KioskError::ReadOnly { action });
        }
        Ok(())
    }

    async fn add_users_to_organization(&self, input: &AddUsersInput) -> Result<Value, KioskError> {
        self.ensure_writable("add users to organization")?;
        require("organization_id", &input.organization_id)?;
        let usernames = parse_usernames(&input.usernames)?;

        self.client
            .add_users_to_organization(&input.organization_id, &usernames)
            .await
    }

    async fn get_request_type_fields(
        &self,
        input: RequestTypeFieldsInput,
    ) -> Result<Vec<Value>, KioskError> {
        let service_desk_id = self.resolve_service_desk(input.service_desk_id)?;
        require("request_type_id", &input.request_type_id)?;

        self.client
            .get_request_type_fields(&service_desk_id, &input.request_type_id)
            .await
    }

    async fn create_customer_request(
        &self,
        input: CreateCustomerRequestInput,
    ) -> Result<Value, KioskError> {
        self.ensure_writable("create customer request")?;
        let service_desk_id = self.resolve_service_desk(input.service_desk_id)?;
        require("request_type_id", &input.request_type_id)?;

        let extra_fields = match input.request_field_values.as_deref() {
            Some(raw) => parse_json_object("request_field_values", raw)?,
            None => Map::new(),
        };

        let request = CustomerRequest::new(
            service_desk_id,
            input.request_type_id,
            input.summary,
            input.description,
        )
        .with_field_values(extra_fields);

        self.client.create_customer_request(&request).await
    }

    async fn update_issue(&self, input: &UpdateIssueInput) -> Result<Value, KioskError> {
        self.ensure_writable("update issue")?;
        require("issue_key", &input.issue_key)?;
        let fields = parse_json_object("custom_fields", &input.custom_fields)?;

        self.client.update_issue(&input.issue_key, fields).await
    }

    /// Serializes a successful result as pretty JSON, or renders the error.
    fn render<T: Serialize>(&self, operation: &str, result: Result<T, KioskError>) -> String {
        let json = result.and_then(|value| serde_json::to_string_pretty(&value).map_err(KioskError::from));
        match json {
            Ok(json) => json,
            Err(e) => self.render_error(operation, &e),
        }
    }

    /// Logs an error and converts it to the tool response string.
    fn render_error(&self, operation: &str, error: &KioskError) -> String {
        let secret = self.client.secret_for_sanitization();
        let logged = KioskError::sanitize_message(&error.to_string(), secret);

        if error.is_input_error() {
            tracing::warn!(operation = %operation, error = %logged, "Rejected tool call");
        } else {
            tracing::error!(operation = %operation, error = %logged, "Tool call failed");
        }

        error.sanitized_tool_message(secret)
    }
}

/// Rejects a blank required field.
fn require(field: &str, value: &str) -> Result<(), KioskError> {
    if value.is_empty() {
        return Err(KioskError::validation(format!("{} is required", field)));
    }
    Ok(())
}

#[tool_handler]
impl ServerHandler for KioskServer {
    /// Returns server information for the MCP initialize handshake.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Kiosk provides access to Jira Service Management service desks. \
                 Use servicedesk_get_service_desks to find desks, \
                 servicedesk_get_request_types and servicedesk_get_request_type_fields \
                 to learn what a request needs, and servicedesk_create_customer_request \
                 to raise one. Organizations are managed with servicedesk_get_organizations, \
                 servicedesk_get_organization_users and servicedesk_add_users_to_organization. \
                 Edit fields on an existing issue with servicedesk_update_issue."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthMode;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{any, basic_auth, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USERNAME: &str = "agent@example.com";
    const TOKEN: &str = "api-token-123";

    fn test_config(base_url: &str) -> Config {
        Config::new(
            base_url,
            AuthMode::BasicToken {
                username: USERNAME.to_string(),
                token: TOKEN.to_string(),
            },
        )
        .expect("valid test config")
    }

    fn server_with(config: Config) -> KioskServer {
        let client = DeskClient::new(&config).expect("Failed to create test client");
        KioskServer::new(client, &config)
    }

    fn input<T: serde::de::DeserializeOwned>(value: Value) -> Parameters<T> {
        Parameters(serde_json::from_value(value).expect("valid tool input"))
    }

    /// Fails the test on drop if any request reaches the mock server.
    async fn expect_no_requests(mock: &MockServer) {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(mock)
            .await;
    }

    #[test]
    fn test_server_info_has_tools_capability() {
        let server = server_with(test_config("https://jira.example.com"));
        let info = server.get_info();
        assert!(info.instructions.is_some());
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_all_tools_registered() {
        let server = server_with(test_config("https://jira.example.com"));
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "servicedesk_add_users_to_organization",
                "servicedesk_create_customer_request",
                "servicedesk_get_organization_users",
                "servicedesk_get_organizations",
                "servicedesk_get_request_type_fields",
                "servicedesk_get_request_types",
                "servicedesk_get_service_desks",
                "servicedesk_update_issue",
            ]
        );
    }

    #[tokio::test]
    async fn test_get_service_desks_unwraps_values() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/servicedeskapi/servicedesk"))
            .and(basic_auth(USERNAME, TOKEN))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "size": 1,
                "start": 0,
                "limit": 50,
                "isLastPage": true,
                "values": [{"id": "1", "projectKey": "CS", "projectName": "Customer Support"}]
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()));
        let output = server.servicedesk_get_service_desks().await;

        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            parsed,
            json!([{"id": "1", "projectKey": "CS", "projectName": "Customer Support"}])
        );
        // 2-space indented
        assert!(output.starts_with("[\n  {\n    \""));
    }

    #[tokio::test]
    async fn test_request_types_without_service_desk_or_default() {
        let mock = MockServer::start().await;
        expect_no_requests(&mock).await;

        let server = server_with(test_config(&mock.uri()));
        let output = server
            .servicedesk_get_request_types(input(json!({})))
            .await;

        assert_eq!(
            output,
            "Error: No service_desk_id provided and JIRA_DEFAULT_SERVICE_DESK_ID not set"
        );
    }

    #[tokio::test]
    async fn test_service_desk_scoped_tools_all_require_an_id() {
        let mock = MockServer::start().await;
        expect_no_requests(&mock).await;
        let server = server_with(test_config(&mock.uri()));
        let expected = "Error: No service_desk_id provided and JIRA_DEFAULT_SERVICE_DESK_ID not set";

        assert_eq!(
            server
                .servicedesk_get_organizations(input(json!({"service_desk_id": "  "})))
                .await,
            expected
        );
        assert_eq!(
            server
                .servicedesk_get_request_type_fields(input(json!({"request_type_id": "144"})))
                .await,
            expected
        );
        assert_eq!(
            server
                .servicedesk_create_customer_request(input(json!({
                    "request_type_id": "144",
                    "summary": "s",
                    "description": "d"
                })))
                .await,
            expected
        );
    }

    #[tokio::test]
    async fn test_request_types_uses_default_service_desk() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/servicedeskapi/servicedesk/7/requesttype"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [{"id": "144", "name": "Access"}]
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()).with_default_service_desk_id("7"));
        let output = server
            .servicedesk_get_request_types(input(json!({})))
            .await;

        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!([{"id": "144", "name": "Access"}]));
    }

    #[tokio::test]
    async fn test_explicit_service_desk_overrides_default() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/servicedeskapi/servicedesk/3/organization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [{"id": "10", "name": "Acme"}]
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()).with_default_service_desk_id("7"));
        let output = server
            .servicedesk_get_organizations(input(json!({"service_desk_id": 3})))
            .await;

        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!([{"id": "10", "name": "Acme"}]));
    }

    #[tokio::test]
    async fn test_organization_users_default_pagination() {
        let mock = MockServer::start().await;
        let page = json!({
            "size": 1,
            "start": 0,
            "limit": 50,
            "isLastPage": true,
            "values": [{"accountId": "abc", "displayName": "Alice"}]
        });
        Mock::given(method("GET"))
            .and(path("/rest/servicedeskapi/organization/10/user"))
            .and(query_param("start", "0"))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page.clone()))
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()));
        let output = server
            .servicedesk_get_organization_users(input(json!({"organization_id": "10"})))
            .await;

        // The paged wrapper is returned whole.
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, page);
    }

    #[tokio::test]
    async fn test_organization_users_explicit_pagination() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/servicedeskapi/organization/10/user"))
            .and(query_param("start", "100"))
            .and(query_param("limit", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"values": []})))
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()));
        let output = server
            .servicedesk_get_organization_users(input(json!({
                "organization_id": 10,
                "start": 100,
                "limit": 25
            })))
            .await;

        assert!(!output.starts_with("Error"));
    }

    #[tokio::test]
    async fn test_add_users_filters_blank_entries() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/servicedeskapi/organization/10/user"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"usernames": ["a", "b"]})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()));
        let output = server
            .servicedesk_add_users_to_organization(input(json!({
                "organization_id": "10",
                "usernames": "a, ,b,"
            })))
            .await;

        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!({"status": "added", "usernames": ["a", "b"]}));
    }

    #[tokio::test]
    async fn test_add_users_rejects_empty_list() {
        let mock = MockServer::start().await;
        expect_no_requests(&mock).await;
        let server = server_with(test_config(&mock.uri()));

        for usernames in ["", " , "] {
            let output = server
                .servicedesk_add_users_to_organization(input(json!({
                    "organization_id": "10",
                    "usernames": usernames
                })))
                .await;
            assert_eq!(output, "Error: No valid usernames provided");
        }
    }

    #[tokio::test]
    async fn test_request_type_fields_unwraps_fields() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/servicedeskapi/servicedesk/5/requesttype/144/field"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "canRaiseOnBehalfOf": true,
                "canAddRequestParticipants": true,
                "requestTypeFields": [{"fieldId": "summary", "required": true}]
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()).with_default_service_desk_id("5"));
        let output = server
            .servicedesk_get_request_type_fields(input(json!({"request_type_id": 144})))
            .await;

        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!([{"fieldId": "summary", "required": true}]));
    }

    #[tokio::test]
    async fn test_create_customer_request_sends_string_ids() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/servicedeskapi/request"))
            .and(basic_auth(USERNAME, TOKEN))
            .and(body_json(json!({
                "serviceDeskId": "5",
                "requestTypeId": "144",
                "requestFieldValues": {
                    "summary": "Need VPN access",
                    "description": "Starting Monday",
                    "customfield_10010": "high"
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "issueId": "10001",
                "issueKey": "CS-42"
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()));
        let output = server
            .servicedesk_create_customer_request(input(json!({
                "service_desk_id": 5,
                "request_type_id": 144,
                "summary": "Need VPN access",
                "description": "Starting Monday",
                "request_field_values": "{\"customfield_10010\": \"high\"}"
            })))
            .await;

        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["issueKey"], "CS-42");
    }

    #[tokio::test]
    async fn test_create_customer_request_field_values_override_summary() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/servicedeskapi/request"))
            .and(body_json(json!({
                "serviceDeskId": "7",
                "requestTypeId": "144",
                "requestFieldValues": {
                    "summary": "From fields",
                    "description": "d"
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"issueKey": "CS-43"})))
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()).with_default_service_desk_id("7"));
        let output = server
            .servicedesk_create_customer_request(input(json!({
                "request_type_id": "144",
                "summary": "From argument",
                "description": "d",
                "request_field_values": "{\"summary\": \"From fields\"}"
            })))
            .await;

        assert!(output.contains("CS-43"));
    }

    #[tokio::test]
    async fn test_create_customer_request_malformed_field_values() {
        let mock = MockServer::start().await;
        expect_no_requests(&mock).await;

        let server = server_with(test_config(&mock.uri()).with_default_service_desk_id("7"));
        let output = server
            .servicedesk_create_customer_request(input(json!({
                "request_type_id": "144",
                "summary": "s",
                "description": "d",
                "request_field_values": "{broken"
            })))
            .await;

        assert!(output.starts_with("Error parsing request_field_values JSON:"));
    }

    #[tokio::test]
    async fn test_create_customer_request_400_json_body() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/servicedeskapi/request"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errorMessage": "Field summary is required"
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()).with_default_service_desk_id("7"));
        let output = server
            .servicedesk_create_customer_request(input(json!({
                "request_type_id": "144",
                "summary": "",
                "description": "d"
            })))
            .await;

        assert_eq!(
            output,
            "HTTP Error 400: {\n  \"errorMessage\": \"Field summary is required\"\n}"
        );
    }

    #[tokio::test]
    async fn test_create_customer_request_400_text_body() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/servicedeskapi/request"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request"))
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()).with_default_service_desk_id("7"));
        let output = server
            .servicedesk_create_customer_request(input(json!({
                "request_type_id": "144",
                "summary": "s",
                "description": "d"
            })))
            .await;

        assert_eq!(output, "HTTP Error 400: Bad Request");
    }

    #[tokio::test]
    async fn test_update_issue_success_message() {
        let mock = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/rest/api/3/issue/CS-12345"))
            .and(basic_auth(USERNAME, TOKEN))
            .and(body_json(json!({"fields": {"customfield_10500": ["53"]}})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()));
        let output = server
            .servicedesk_update_issue(input(json!({
                "issue_key": "CS-12345",
                "custom_fields": "{\"customfield_10500\": [\"53\"]}"
            })))
            .await;

        assert_eq!(output, "Issue CS-12345 updated successfully");
    }

    #[tokio::test]
    async fn test_update_issue_malformed_custom_fields() {
        let mock = MockServer::start().await;
        expect_no_requests(&mock).await;

        let server = server_with(test_config(&mock.uri()));
        let output = server
            .servicedesk_update_issue(input(json!({
                "issue_key": "CS-1",
                "custom_fields": "not json"
            })))
            .await;

        assert!(output.starts_with("Error parsing custom_fields JSON:"));
    }

    #[tokio::test]
    async fn test_update_issue_http_error() {
        let mock = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/rest/api/3/issue/CS-404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "errorMessages": ["Issue does not exist"]
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()));
        let output = server
            .servicedesk_update_issue(input(json!({
                "issue_key": "CS-404",
                "custom_fields": "{}"
            })))
            .await;

        assert!(output.starts_with("HTTP Error 404: "));
        assert!(output.contains("Issue does not exist"));
    }

    #[tokio::test]
    async fn test_read_only_mode_blocks_write_tools() {
        let mock = MockServer::start().await;
        expect_no_requests(&mock).await;

        let server = server_with(
            test_config(&mock.uri())
                .with_default_service_desk_id("7")
                .with_read_only(true),
        );

        assert_eq!(
            server
                .servicedesk_add_users_to_organization(input(json!({
                    "organization_id": "10",
                    "usernames": "a"
                })))
                .await,
            "Error: Cannot add users to organization in read-only mode"
        );
        assert_eq!(
            server
                .servicedesk_create_customer_request(input(json!({
                    "request_type_id": "144",
                    "summary": "s",
                    "description": "d"
                })))
                .await,
            "Error: Cannot create customer request in read-only mode"
        );
        assert_eq!(
            server
                .servicedesk_update_issue(input(json!({
                    "issue_key": "CS-1",
                    "custom_fields": "{}"
                })))
                .await,
            "Error: Cannot update issue in read-only mode"
        );
    }

    #[tokio::test]
    async fn test_blank_required_id_rejected() {
        let mock = MockServer::start().await;
        expect_no_requests(&mock).await;

        let server = server_with(test_config(&mock.uri()));
        let output = server
            .servicedesk_get_organization_users(input(json!({"organization_id": "  "})))
            .await;

        assert_eq!(output, "Error: validation error: organization_id is required");
    }

    #[tokio::test]
    async fn test_error_output_redacts_token() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/servicedeskapi/servicedesk"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(format!("bad credentials {}", TOKEN)),
            )
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()));
        let output = server.servicedesk_get_service_desks().await;

        assert_eq!(output, "HTTP Error 401: bad credentials [REDACTED]");
    }

    #[tokio::test]
    async fn test_unexpected_response_shape_is_error_string() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/servicedeskapi/servicedesk"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&mock)
            .await;

        let server = server_with(test_config(&mock.uri()));
        let output = server.servicedesk_get_service_desks().await;

        assert!(output.starts_with("Error: JSON serialization error:"));
    }
}
