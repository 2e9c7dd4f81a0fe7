//! Data models for the Jira Service Management API.
//!
//! This module contains the list envelopes returned by the Service Desk
//! API and the request bodies the client sends.

mod common;
mod request;

pub use common::*;
pub use request::*;
