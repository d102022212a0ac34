//! Opsmesh A2A - Cross-Process Peer Protocol
//!
//! JSON-RPC 2.0 client for delegating work to external agent processes:
//! - Protocol: wire envelopes, message parts, task and artifact types
//! - Client: send a message, poll the resulting task, extract the answer
//! - Discovery: one-shot agent-card snapshot of the configured peers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod discovery;
pub mod error;
pub mod protocol;

pub use client::A2aClient;
pub use discovery::{AgentDescriptor, AgentDirectory, AgentSkill};
pub use error::{Error, Result};
pub use protocol::{Artifact, Part, Task, TaskState, TaskStatus};
