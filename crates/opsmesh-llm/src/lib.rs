//! Opsmesh LLM - LLM Provider Abstraction
//!
//! This crate provides the text-generation integration for opsmesh:
//! - Message: conversation turn types shared by every pipeline
//! - Completion: request/response types, with and without tool binding
//! - Provider: the `LlmProvider` trait and the OpenAI-compatible provider

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod message;
pub mod provider;
pub mod tools;

pub use completion::{
    CompletionRequest, CompletionResponse, TokenUsage, ToolCompletionRequest,
    ToolCompletionResponse,
};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use provider::{LlmProvider, OpenAiCompatConfig, OpenAiCompatProvider};
pub use tools::{ToolCall, ToolChoice, ToolDefinition};
