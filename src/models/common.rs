//! Response wrappers shared across Service Desk API endpoints.
//!
//! The Service Desk API returns lists in one of two envelopes: a paged
//! wrapper with a `values` array, or the `requestTypeFields` wrapper used
//! by the request type field listing.

use serde::{Deserialize, Serialize};

/// Paged list envelope (`/servicedesk`, `/requesttype`, `/organization`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    /// Index of the first item in this page.
    #[serde(default)]
    pub start: Option<u32>,

    /// Page size requested.
    #[serde(default)]
    pub limit: Option<u32>,

    /// Number of items in this page.
    #[serde(default)]
    pub size: Option<u32>,

    /// Whether this is the final page.
    #[serde(default)]
    pub is_last_page: Option<bool>,

    /// The page items.
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
}

impl<T> PagedResponse<T> {
    /// Unwraps the page into its items.
    pub fn into_values(self) -> Vec<T> {
        self.values
    }
}

/// Envelope returned by `servicedesk/{id}/requesttype/{id}/field`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTypeFieldsResponse<T> {
    /// Fields the request type accepts.
    #[serde(default = "Vec::new")]
    pub request_type_fields: Vec<T>,

    /// Whether the caller may raise requests on behalf of customers.
    #[serde(default)]
    pub can_raise_on_behalf_of: Option<bool>,

    /// Whether the caller may add request participants.
    #[serde(default)]
    pub can_add_request_participants: Option<bool>,
}

impl<T> RequestTypeFieldsResponse<T> {
    /// Unwraps the envelope into its fields.
    pub fn into_fields(self) -> Vec<T> {
        self.request_type_fields
    }
}
