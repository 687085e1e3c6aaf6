//! Fake implementation of [`agents::Model`]
//!
//! A [`FakeModel`] records every call, optionally sleeps to simulate network
//! latency, and answers with text from its response factory. Nothing leaves
//! the process.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use agents::{
    BoxError, MessageRole, Model, ModelError, ModelInput, ModelRequest, ModelResponse,
    ModelStream, OutputContent, OutputItem, OutputSchema, ResponseOutputMessage,
    ResponseStatus, ToolDefinition, Usage,
};
use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::response::{self, DefaultResponseFactory, SharedResponseFactory};

/// Simulated latency used when none is configured
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

const DEFAULT_MODEL_NAME: &str = "fake-model";

/// Snapshot of one call, captured before the response is produced
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    /// 1-based position of this call in the model's history
    pub call_index: u64,
    pub system_instructions: Option<String>,
    pub input: ModelInput,
    pub tools: Vec<ToolDefinition>,
    pub output_schema: Option<OutputSchema>,
    /// Names of the handoff targets offered to the model
    pub handoffs: Vec<String>,
    pub previous_response_id: Option<String>,
    pub conversation_id: Option<String>,
}

impl CallRecord {
    fn new(call_index: u64, request: &ModelRequest) -> Self {
        Self {
            call_index,
            system_instructions: request.system_instructions.clone(),
            input: request.input.clone(),
            tools: request.tools.clone(),
            output_schema: request.output_schema.clone(),
            handoffs: request.handoffs.iter().map(|h| h.name.clone()).collect(),
            previous_response_id: request.previous_response_id.clone(),
            conversation_id: request.conversation_id.clone(),
        }
    }
}

#[derive(Default)]
struct CallState {
    call_count: u64,
    call_history: Vec<CallRecord>,
}

/// Model double that returns generated responses without calling any backend
///
/// A non-zero delay sleeps on the tokio timer, so calls must run inside a
/// tokio runtime.
pub struct FakeModel {
    name: String,
    delay: Duration,
    response_factory: SharedResponseFactory,
    state: Mutex<CallState>,
}

impl FakeModel {
    /// Create a fake model with the default response factory
    pub fn new(delay: Duration) -> Self {
        Self::builder().delay(delay).build()
    }

    pub fn builder() -> FakeModelBuilder {
        FakeModelBuilder::default()
    }

    /// Name this model was created under; `"fake-model"` when built directly
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn call_count(&self) -> u64 {
        self.lock_state().call_count
    }

    /// Consistent copy of the call history, oldest call first
    pub fn call_history(&self) -> Vec<CallRecord> {
        self.lock_state().call_history.clone()
    }

    pub fn last_call(&self) -> Option<CallRecord> {
        self.lock_state().call_history.last().cloned()
    }

    /// Clear call count and history for clean test state
    pub fn reset(&self) {
        let mut state = self.lock_state();
        state.call_count = 0;
        state.call_history.clear();
        debug!(model = %self.name, "Reset fake model");
    }

    /// Assigns the next call index and appends the record in one critical section
    fn record_call(&self, request: &ModelRequest) -> u64 {
        let mut state = self.lock_state();
        state.call_count += 1;
        let call_index = state.call_count;
        state
            .call_history
            .push(CallRecord::new(call_index, request));
        call_index
    }

    // The critical sections only increment, push or clear, so a poisoned lock
    // still guards consistent state.
    fn lock_state(&self) -> MutexGuard<'_, CallState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn build_response(call_index: u64, text: String) -> ModelResponse {
        let id = Uuid::new_v4().simple().to_string();
        let message = ResponseOutputMessage {
            id: format!("msg-{}", &id[..8]),
            role: MessageRole::Assistant,
            status: ResponseStatus::Completed,
            content: vec![OutputContent::OutputText {
                text,
                annotations: vec![],
            }],
        };

        ModelResponse {
            output: vec![OutputItem::Message(message)],
            usage: Usage::new(1, 100, 50),
            response_id: Some(format!("fake-response-{call_index}")),
        }
    }
}

impl Default for FakeModel {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl std::fmt::Debug for FakeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeModel")
            .field("name", &self.name)
            .field("delay", &self.delay)
            .field("call_count", &self.call_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Model for FakeModel {
    async fn get_response(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let call_index = self.record_call(&request);
        debug!(model = %self.name, call_index, "Recorded fake model call");

        // No lock is held across the sleep
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let text = self
            .response_factory
            .respond(call_index, &request.input)
            .map_err(|e| {
                warn!(model = %self.name, call_index, error = %e, "Response factory failed");
                ModelError::ResponseFactory(e)
            })?;

        Ok(Self::build_response(call_index, text))
    }

    async fn stream_response(&self, _request: ModelRequest) -> Result<ModelStream, ModelError> {
        Err(ModelError::StreamingNotSupported(
            "Streaming not implemented for FakeModel, use get_response instead".to_string(),
        ))
    }
}

/// Builder for [`FakeModel`]
pub struct FakeModelBuilder {
    name: String,
    delay: Duration,
    response_factory: SharedResponseFactory,
}

impl Default for FakeModelBuilder {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL_NAME.to_string(),
            delay: DEFAULT_DELAY,
            response_factory: Arc::new(DefaultResponseFactory),
        }
    }
}

impl FakeModelBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn response_factory<F>(mut self, f: F) -> Self
    where
        F: Fn(u64, &ModelInput) -> String + Send + Sync + 'static,
    {
        self.response_factory = response::from_fn(f);
        self
    }

    pub fn try_response_factory<F, E>(mut self, f: F) -> Self
    where
        F: Fn(u64, &ModelInput) -> Result<String, E> + Send + Sync + 'static,
        E: Into<BoxError> + 'static,
    {
        self.response_factory = response::try_from_fn(f);
        self
    }

    pub fn shared_response_factory(mut self, factory: SharedResponseFactory) -> Self {
        self.response_factory = factory;
        self
    }

    pub fn build(self) -> FakeModel {
        FakeModel {
            name: self.name,
            delay: self.delay,
            response_factory: self.response_factory,
            state: Mutex::new(CallState::default()),
        }
    }
}
