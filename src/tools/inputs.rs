//! Tool input parameter structs for MCP tools.
//!
//! This module defines the input types for each MCP tool, with
//! JSON Schema derivation for MCP tool discovery.
//!
//! # Input Sanitization
//!
//! All input structs implement `sanitize()` which trims whitespace
//! from string fields. This should be called before processing input.
//!
//! # IDs
//!
//! Service desk and request type IDs are opaque strings, but callers often
//! send them as JSON numbers. Both forms are accepted and normalized to
//! their decimal string.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Deserializer};

/// Default pagination start for organization users.
pub const DEFAULT_USERS_START: u32 = 0;

/// Default page size for organization users.
pub const DEFAULT_USERS_LIMIT: u32 = 50;

/// Helper function to trim an optional string.
fn trim_option(s: &Option<String>) -> Option<String> {
    s.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// An ID sent either as a JSON string or a JSON integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
        }
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|id| id.map(String::from))
}

/// Input parameters for tools scoped to a single service desk
/// (`servicedesk_get_request_types`, `servicedesk_get_organizations`).
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ServiceDeskInput {
    /// Service Desk ID (optional if JIRA_DEFAULT_SERVICE_DESK_ID is set).
    #[serde(default, deserialize_with = "optional_id_string")]
    #[schemars(with = "Option<String>")]
    pub service_desk_id: Option<String>,
}

impl ServiceDeskInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            service_desk_id: trim_option(&self.service_desk_id),
        }
    }
}

/// Input parameters for the servicedesk_get_organization_users tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OrganizationUsersInput {
    /// Organization ID.
    #[serde(deserialize_with = "id_string")]
    #[schemars(with = "String")]
    pub organization_id: String,

    /// Starting index for pagination (default: 0).
    #[serde(default)]
    pub start: Option<u32>,

    /// Maximum number of users to return (default: 50).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl OrganizationUsersInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            organization_id: self.organization_id.trim().to_string(),
            start: self.start,
            limit: self.limit,
        }
    }
}

/// Input parameters for the servicedesk_add_users_to_organization tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddUsersInput {
    /// Organization ID.
    #[serde(deserialize_with = "id_string")]
    #[schemars(with = "String")]
    pub organization_id: String,

    /// Comma-separated list of usernames or account IDs to add.
    pub usernames: String,
}

impl AddUsersInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            organization_id: self.organization_id.trim().to_string(),
            usernames: self.usernames,
        }
    }
}

/// Input parameters for the servicedesk_get_request_type_fields tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RequestTypeFieldsInput {
    /// Request Type ID.
    #[serde(deserialize_with = "id_string")]
    #[schemars(with = "String")]
    pub request_type_id: String,

    /// Service Desk ID (optional if JIRA_DEFAULT_SERVICE_DESK_ID is set).
    #[serde(default, deserialize_with = "optional_id_string")]
    #[schemars(with = "Option<String>")]
    pub service_desk_id: Option<String>,
}

impl RequestTypeFieldsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            request_type_id: self.request_type_id.trim().to_string(),
            service_desk_id: trim_option(&self.service_desk_id),
        }
    }
}

/// Input parameters for the servicedesk_create_customer_request tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateCustomerRequestInput {
    /// Request Type ID (e.g., '144' for Access). Use servicedesk_get_request_types to find IDs.
    #[serde(deserialize_with = "id_string")]
    #[schemars(with = "String")]
    pub request_type_id: String,

    /// Request summary.
    pub summary: String,

    /// Request description.
    pub description: String,

    /// Service Desk ID (optional if JIRA_DEFAULT_SERVICE_DESK_ID is set).
    #[serde(default, deserialize_with = "optional_id_string")]
    #[schemars(with = "Option<String>")]
    pub service_desk_id: Option<String>,

    /// JSON object string of extra request field values (e.g. '{"customfield_10010": "x"}').
    #[serde(default)]
    pub request_field_values: Option<String>,
}

impl CreateCustomerRequestInput {
    /// Sanitizes input by trimming whitespace from ID fields.
    ///
    /// Summary and description are left untouched.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            request_type_id: self.request_type_id.trim().to_string(),
            summary: self.summary,
            description: self.description,
            service_desk_id: trim_option(&self.service_desk_id),
            request_field_values: trim_option(&self.request_field_values),
        }
    }
}

/// Input parameters for the servicedesk_update_issue tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateIssueInput {
    /// Issue key (e.g., 'CS-12345').
    pub issue_key: String,

    /// JSON object string of fields to update (e.g., '{"customfield_10500": ["53"]}').
    pub custom_fields: String,
}

impl UpdateIssueInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            issue_key: self.issue_key.trim().to_string(),
            custom_fields: self.custom_fields.trim().to_string(),
        }
    }
}
