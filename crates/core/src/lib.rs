//! # DevAgent Core
//!
//! Domain types, traits, and error definitions for the DevAgent coding agent.
//! This crate has **no I/O framework dependencies**: it defines the domain
//! model that the provider, tool, and agent crates implement against.
//!
//! ## Layout
//!
//! - [`message`]: conversation state (system / user / assistant / tool messages)
//! - [`tool`]: tool calls, tool results, and the ordered [`ToolRegistry`]
//! - [`provider`]: the [`Provider`] trait over chat-completion backends
//! - [`instructions`]: where the system instruction text comes from
//! - [`event`]: domain events published while a run progresses
//! - [`error`]: error enums per bounded context

pub mod error;
pub mod event;
pub mod instructions;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError, TriggerError};
pub use event::{DomainEvent, EventBus};
pub use instructions::{FileInstructions, InstructionSource, StaticInstructions};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{ToolCall, ToolRegistry, ToolResult, Toolset};
