use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error type used to carry errors raised by user-supplied callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    Developer,
    User,
    Assistant,
}

/// A single conversation item passed as model input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputItem {
    pub role: MessageRole,
    pub content: String,
}

impl InputItem {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Model input: either a plain prompt or a structured conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelInput {
    Text(String),
    Items(Vec<InputItem>),
}

impl ModelInput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Items(_) => None,
        }
    }
}

impl fmt::Display for ModelInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Items(items) => {
                let json = serde_json::to_string(items).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<&str> for ModelInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ModelInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<InputItem>> for ModelInput {
    fn from(items: Vec<InputItem>) -> Self {
        Self::Items(items)
    }
}

/// Sampling settings forwarded to the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// "auto", "required", "none" or a tool name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
}

/// Tool definition for available tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: Option<String>,
    pub parameters: serde_json::Value,
}

/// JSON schema the final output must conform to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub name: String,
    pub schema: serde_json::Value,
    #[serde(default)]
    pub strict: bool,
}

/// Another agent the model may hand the conversation to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handoff {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// How much of a model call the tracing layer may capture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTracing {
    #[default]
    Disabled,
    Enabled,
    EnabledWithoutData,
}

/// Everything a model receives for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub system_instructions: Option<String>,
    pub input: ModelInput,
    #[serde(default)]
    pub model_settings: ModelSettings,
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    pub output_schema: Option<OutputSchema>,
    #[serde(default)]
    pub handoffs: Vec<Handoff>,
    #[serde(default)]
    pub tracing: ModelTracing,
    pub previous_response_id: Option<String>,
    pub conversation_id: Option<String>,
    pub prompt: Option<serde_json::Value>,
}

impl ModelRequest {
    pub fn new(input: impl Into<ModelInput>) -> Self {
        Self {
            system_instructions: None,
            input: input.into(),
            model_settings: ModelSettings::default(),
            tools: Vec::new(),
            output_schema: None,
            handoffs: Vec::new(),
            tracing: ModelTracing::default(),
            previous_response_id: None,
            conversation_id: None,
            prompt: None,
        }
    }

    pub fn with_system_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.system_instructions = Some(instructions.into());
        self
    }

    pub fn with_model_settings(mut self, settings: ModelSettings) -> Self {
        self.model_settings = settings;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_output_schema(mut self, schema: OutputSchema) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn with_handoffs(mut self, handoffs: Vec<Handoff>) -> Self {
        self.handoffs = handoffs;
        self
    }

    pub fn with_tracing(mut self, tracing: ModelTracing) -> Self {
        self.tracing = tracing;
        self
    }

    pub fn with_previous_response_id(mut self, id: impl Into<String>) -> Self {
        self.previous_response_id = Some(id.into());
        self
    }

    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn with_prompt(mut self, prompt: serde_json::Value) -> Self {
        self.prompt = Some(prompt);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    InProgress,
    Completed,
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputContent {
    OutputText {
        text: String,
        #[serde(default)]
        annotations: Vec<serde_json::Value>,
    },
    Refusal {
        refusal: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseOutputMessage {
    pub id: String,
    pub role: MessageRole,
    pub status: ResponseStatus,
    pub content: Vec<OutputContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message(ResponseOutputMessage),
}

/// Token accounting for a model response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub requests: u32,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(requests: u32, input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            requests,
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub output: Vec<OutputItem>,
    pub usage: Usage,
    pub response_id: Option<String>,
}

impl ModelResponse {
    /// Concatenated text of every output text part, `None` if there is none
    pub fn output_text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .output
            .iter()
            .flat_map(|item| match item {
                OutputItem::Message(message) => message.content.iter(),
            })
            .filter_map(|content| match content {
                OutputContent::OutputText { text, .. } => Some(text.as_str()),
                OutputContent::Refusal { .. } => None,
            })
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.concat())
        }
    }
}

/// Incremental events emitted by a streamed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseStreamEvent {
    OutputTextDelta { delta: String },
    Completed { response: ModelResponse },
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Streaming not supported: {0}")]
    StreamingNotSupported(String),
    /// A user-supplied response factory failed; the original error is the source
    #[error("Response factory failed")]
    ResponseFactory(#[source] BoxError),
    #[error("Model backend error: {0}")]
    Backend(String),
}
