//! LLM Client Layer - Anthropic API integration
//!
//! This module provides:
//! - Message and content-block types for LLM communication
//! - LlmClient trait for API abstraction, with a mock for tests
//! - AnthropicClient implementation

pub mod anthropic;
pub mod client;
pub mod types;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use client::{LlmClient, MockLlmClient};
pub use types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, Role, StopReason, ToolCall, ToolDefinition, Usage,
};
