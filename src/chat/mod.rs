//! Natural-language assistant backed by a hosted model with one query tool.

mod config;
pub mod gemini;
pub mod prompt;
pub mod tools;

use std::sync::Arc;

use tracing::{error, info};

pub use config::ChatConfig;
pub use gemini::{GeminiAgent, ModelClient};
pub use tools::ProjectionTool;

/// Tool-calling turns the agent may take before the request fails.
pub const MAX_TOOL_ROUNDS: usize = 10;

pub const EMPTY_QUESTION: &str = "Please ask a question.";
pub const NO_SUMMARY: &str = "I processed the data but couldn't generate a text summary.";
pub const GENERIC_ERROR: &str =
    "<span class='text-red-500'>Error processing request. Please try again.</span>";

#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    EmptyQuestion,
    /// Markdown answer from the model
    Answer(String),
    NoSummary,
    Failed,
}

impl ChatOutcome {
    pub fn to_html(&self) -> String {
        match self {
            ChatOutcome::EmptyQuestion => EMPTY_QUESTION.to_string(),
            ChatOutcome::Answer(markdown) => render_markdown(markdown),
            ChatOutcome::NoSummary => NO_SUMMARY.to_string(),
            ChatOutcome::Failed => GENERIC_ERROR.to_string(),
        }
    }
}

pub fn render_markdown(markdown: &str) -> String {
    use pulldown_cmark::{html, Options, Parser};
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// Answers one question per call. Nothing is remembered between calls.
pub struct ChatService {
    client: Arc<dyn ModelClient>,
}

impl ChatService {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    pub async fn ask(&self, question: &str) -> ChatOutcome {
        let question = question.trim();
        if question.is_empty() {
            return ChatOutcome::EmptyQuestion;
        }

        info!("Assistant question received ({} chars)", question.len());
        match self.client.answer(question).await {
            Ok(text) if !text.trim().is_empty() => ChatOutcome::Answer(text),
            Ok(_) => ChatOutcome::NoSummary,
            Err(err) => {
                error!("Assistant request failed: {:#}", err);
                ChatOutcome::Failed
            }
        }
    }
}
