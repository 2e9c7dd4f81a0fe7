//! # Kiosk
//!
//! Kiosk is an MCP (Model Context Protocol) server for Jira Service Management.
//!
//! It exposes service desk operations as MCP tools, so AI assistants can list
//! service desks and request types, manage organizations, raise customer
//! requests, and edit issue fields.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Error types and tool response formatting
//! - [`desk_client`] - HTTP client for the Service Desk REST API
//! - [`server`] - MCP server implementation with tool routing
//! - [`models`] - Wire types for API requests and list envelopes
//! - [`tools`] - Tool input parameter structs and parsing helpers
//!
//! ## Configuration
//!
//! - `JIRA_URL`: Base URL of the Jira site
//! - `JIRA_USERNAME` + `JIRA_API_TOKEN`, or `JIRA_PERSONAL_TOKEN`
//!
//! Optional:
//! - `JIRA_DEFAULT_SERVICE_DESK_ID`: Used when a tool call omits `service_desk_id`
//! - `READ_ONLY_MODE`: Disables write tools
//! - `JIRA_SSL_VERIFY`: Set to `false` to skip TLS verification
//! - `RUST_LOG`: Log level (e.g., `kiosk=debug`)
//!
//! ## Example
//!
//! Using the [`DeskClient`](desk_client::DeskClient) directly:
//!
//! ```ignore
//! use kiosk::config::Config;
//! use kiosk::desk_client::DeskClient;
//!
//! async fn example() -> Result<(), kiosk::error::KioskError> {
//!     let config = Config::from_env()?;
//!     let client = DeskClient::new(&config)?;
//!
//!     for desk in client.get_service_desks().await? {
//!         println!("{} {}", desk["id"], desk["projectName"]);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod desk_client;
pub mod error;
pub mod models;
pub mod server;
pub mod tools;
