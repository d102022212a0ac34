//! Opsmesh Tools - Tool registry and builtin tools
//!
//! This crate provides the tools bound to specialist agents:
//! - Registry: the `Tool` trait, tool metadata, and named-subset lookup
//! - Store: collaborator traits for the external graph and vector services
//! - Builtins: graph query, vector search, incident discovery, knowledge
//!   capture, and the security approval gate

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builtins;
pub mod error;
pub mod registry;
pub mod store;

pub use error::{Error, Result};
pub use registry::{Tool, ToolDefinition, ToolRegistry, ToolResult};
pub use store::{GraphStore, VectorIndex, VectorMatch};
