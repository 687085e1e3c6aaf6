//! Minimal single-agent runner
//!
//! Drives one agent through a model resolved from the injected provider. There
//! are no tools or handoffs here, so the first text response ends the run.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::{ModelError, ModelInput, ModelProvider, ModelRequest, ModelResponse};

/// Model name used when neither the run config nor the agent names one
pub const DEFAULT_MODEL: &str = "gpt-4o";

const DEFAULT_MAX_TURNS: usize = 10;

#[derive(Debug, Clone)]
pub struct Agent {
    pub name: String,
    pub model: Option<String>,
    pub instructions: Option<String>,
}

impl Agent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: None,
            instructions: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

#[derive(Clone)]
pub struct RunConfig {
    pub model_provider: Arc<dyn ModelProvider>,
    /// Overrides the agent's own model name for every run using this config
    pub model: Option<String>,
    pub max_turns: usize,
}

impl RunConfig {
    pub fn new(model_provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            model_provider,
            model: None,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    fn resolve_model_name<'a>(&'a self, agent: &'a Agent) -> &'a str {
        self.model
            .as_deref()
            .or(agent.model.as_deref())
            .unwrap_or(DEFAULT_MODEL)
    }
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub final_output: String,
    pub raw_responses: Vec<ModelResponse>,
    pub last_response_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Maximum turns exceeded: {max_turns}")]
    MaxTurnsExceeded { max_turns: usize },
    #[error("Model behavior error: {message}")]
    ModelBehavior { message: String },
}

pub struct Runner;

impl Runner {
    pub async fn run(
        agent: &Agent,
        input: impl Into<ModelInput>,
        run_config: &RunConfig,
    ) -> Result<RunResult, RunnerError> {
        let model_name = run_config.resolve_model_name(agent);
        info!(agent = %agent.name, model = %model_name, "Starting agent run");

        if run_config.max_turns == 0 {
            return Err(RunnerError::MaxTurnsExceeded {
                max_turns: run_config.max_turns,
            });
        }

        let model = run_config.model_provider.get_model(model_name);

        let mut request = ModelRequest::new(input);
        request.system_instructions = agent.instructions.clone();

        let response = model.get_response(request).await?;
        debug!(
            agent = %agent.name,
            response_id = ?response.response_id,
            "Received model response"
        );

        let final_output = response
            .output_text()
            .ok_or_else(|| RunnerError::ModelBehavior {
                message: format!("Model {model_name} produced no text output"),
            })?;
        let last_response_id = response.response_id.clone();

        info!(agent = %agent.name, "Agent run finished");

        Ok(RunResult {
            final_output,
            raw_responses: vec![response],
            last_response_id,
        })
    }
}
