//! Test doubles for agent workflows
//!
//! This crate provides a fake [`agents::Model`] and a [`agents::ModelProvider`]
//! that hands out such fakes by name, so agent code can be exercised
//! deterministically without an inference backend.
//!
//! # Usage
//!
//! ```rust,ignore
//! use agents::{Agent, RunConfig, Runner};
//! use agents_testkit::FakeModelProvider;
//! use std::{sync::Arc, time::Duration};
//!
//! let provider = Arc::new(FakeModelProvider::new(Duration::from_millis(100)));
//! let agent = Agent::new("Test").with_model("gpt-4").with_instructions("You are helpful.");
//!
//! let result = Runner::run(&agent, "Hello!", &RunConfig::new(provider.clone())).await?;
//! assert_eq!(result.final_output, "Fake response #1");
//! assert_eq!(provider.get_model("gpt-4").call_count(), 1);
//! ```

pub mod fixtures;
pub mod model;
pub mod provider;
pub mod response;

// Re-export commonly used types for convenience
pub use fixtures::{
    fake_model, fake_model_provider, init_test_tracing, init_test_tracing_with,
    no_delay_provider, FakeModelProviderFactory, ModelFixture, ProviderFixture,
};
pub use model::{CallRecord, FakeModel, FakeModelBuilder, DEFAULT_DELAY};
pub use provider::{FakeModelProvider, FakeModelProviderBuilder};
pub use response::{default_response_factory, ResponseFactory, SharedResponseFactory};
