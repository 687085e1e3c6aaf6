//! Model capability contract for agent workflows
//!
//! This crate defines the boundary an agent runner talks to: a [`Model`] that
//! turns a [`ModelRequest`] into a [`ModelResponse`], and a [`ModelProvider`]
//! that resolves a model name to a [`Model`]. Real inference backends and test
//! doubles are interchangeable variants behind these two traits, injected
//! explicitly through [`RunConfig`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use agents::{Agent, RunConfig, Runner};
//! use std::sync::Arc;
//!
//! async fn example(provider: Arc<dyn agents::ModelProvider>) -> Result<(), agents::RunnerError> {
//!     let agent = Agent::new("Assistant")
//!         .with_model("gpt-4")
//!         .with_instructions("You are helpful.");
//!
//!     let result = Runner::run(&agent, "Hello!", &RunConfig::new(provider)).await?;
//!     println!("{}", result.final_output);
//!     Ok(())
//! }
//! ```

pub mod models;
pub mod runner;

use std::{pin::Pin, sync::Arc};

use async_trait::async_trait;
use futures_core::Stream;

// Re-export commonly used types for convenience
pub use models::{
    BoxError, Handoff, InputItem, MessageRole, ModelError, ModelInput, ModelRequest,
    ModelResponse, ModelSettings, ModelTracing, OutputContent, OutputItem, OutputSchema,
    ResponseOutputMessage, ResponseStatus, ResponseStreamEvent, ToolDefinition, Usage,
};
pub use runner::{Agent, RunConfig, RunResult, Runner, RunnerError, DEFAULT_MODEL};

/// Type alias for streamed model output
pub type ModelStream = Pin<Box<dyn Stream<Item = Result<ResponseStreamEvent, ModelError>> + Send>>;

#[async_trait]
pub trait Model: Send + Sync {
    /// Produces a complete response for a single model turn
    ///
    /// `request` carries the conversation input together with run-scoped
    /// context (system instructions, tools, output schema, handoffs).
    async fn get_response(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;

    /// Produces a streamed response for a single model turn
    ///
    /// Implementations that cannot stream return
    /// [`ModelError::StreamingNotSupported`].
    async fn stream_response(&self, request: ModelRequest) -> Result<ModelStream, ModelError>;
}

/// Resolves model names to models
pub trait ModelProvider: Send + Sync {
    fn get_model(&self, model_name: &str) -> Arc<dyn Model>;
}
