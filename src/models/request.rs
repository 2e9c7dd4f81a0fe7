//! Request bodies sent to the Service Desk and Jira issue APIs.

use serde::Serialize;
use serde_json::{Map, Value};

/// Body of `POST rest/servicedeskapi/request`.
///
/// `serviceDeskId` and `requestTypeId` must be JSON strings; the API
/// rejects numbers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    /// Target service desk.
    pub service_desk_id: String,

    /// Request type to raise.
    pub request_type_id: String,

    /// Field values, always including `summary` and `description`.
    pub request_field_values: Map<String, Value>,
}

impl CustomerRequest {
    /// Creates a customer request with only summary and description set.
    pub fn new(
        service_desk_id: impl Into<String>,
        request_type_id: impl Into<String>,
        summary: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let mut request_field_values = Map::new();
        request_field_values.insert("summary".to_string(), Value::String(summary.into()));
        request_field_values.insert("description".to_string(), Value::String(description.into()));

        Self {
            service_desk_id: service_desk_id.into(),
            request_type_id: request_type_id.into(),
            request_field_values,
        }
    }

    /// Merges extra field values. Keys already present, including
    /// `summary` and `description`, are overwritten.
    pub fn with_field_values(mut self, values: Map<String, Value>) -> Self {
        self.request_field_values.extend(values);
        self
    }
}

/// Body of `POST rest/servicedeskapi/organization/{id}/user`.
#[derive(Debug, Clone, Serialize)]
pub struct AddUsersRequest<'a> {
    /// Usernames or account IDs to add.
    pub usernames: &'a [String],
}

/// Body of `PUT rest/api/3/issue/{key}`.
#[derive(Debug, Clone, Serialize)]
pub struct IssueUpdate {
    /// Field name to new value, passed through verbatim.
    pub fields: Map<String, Value>,
}
