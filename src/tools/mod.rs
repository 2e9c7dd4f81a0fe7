//! MCP tool implementations for Kiosk.
//!
//! This module contains the input types and parsing helpers for
//! MCP tools that expose Service Desk operations.

mod inputs;
mod parse;

pub use inputs::*;
pub use parse::*;
