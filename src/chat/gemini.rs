//! Gemini agent with the projection tool attached.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::gemini;
use rig::providers::gemini::completion::gemini_api_types::{
    AdditionalParameters, GenerationConfig,
};
use tracing::debug;

use super::tools::ProjectionTool;
use super::{prompt, ChatConfig, MAX_TOOL_ROUNDS};
use crate::services::ProjectionService;

/// A model that answers one question, running tool calls as it needs them.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String>;
}

pub struct GeminiAgent {
    api_key: Option<String>,
    model: String,
    request_timeout: Duration,
    preamble: String,
    tool: ProjectionTool,
}

impl GeminiAgent {
    pub fn new(config: &ChatConfig, projections: ProjectionService) -> Self {
        let preamble = prompt::system_instruction(projections.catalog());
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            request_timeout: config.request_timeout,
            preamble,
            tool: ProjectionTool::new(projections),
        }
    }
}

#[async_trait]
impl ModelClient for GeminiAgent {
    async fn answer(&self, question: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("GOOGLE_API_KEY is not configured"))?;
        let client = gemini::Client::new(api_key);

        // Gemini rejects requests without a generation config
        let gen_cfg = GenerationConfig::default();
        let additional_params = AdditionalParameters::default().with_config(gen_cfg);

        let agent = client
            .agent(&self.model)
            .preamble(&self.preamble)
            .tool(self.tool.clone())
            .additional_params(serde_json::to_value(additional_params)?)
            .build();

        debug!("Asking {}", self.model);
        tokio::time::timeout(self.request_timeout, async {
            agent.prompt(question).multi_turn(MAX_TOOL_ROUNDS).await
        })
        .await
        .map_err(|_| anyhow!("no answer within {:?}", self.request_timeout))?
        .context("Gemini API call failed")
    }
}
