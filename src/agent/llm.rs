//! LLM-driven reasoning backend
//!
//! The session keeps the whole conversation for the run, so later steps see
//! what happened in earlier ones. Each turn offers the `complete_test` tool;
//! any other tool the model asks for is answered with an error result.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;

use super::complete::{COMPLETE_TOOL_NAME, complete_tool_definition, parse_completion};
use super::{AgentAction, AgentSession, PlanRequest, ReasoningBackend};
use crate::config::LlmConfig;
use crate::error::Result;
use crate::id::generate_session_id;
use crate::llm::{
    AnthropicClient, AnthropicConfig, CompletionRequest, CompletionResponse, ContentBlock, LlmClient, Message, Role,
    StopReason,
};

/// Backend that reasons with an `LlmClient`
pub struct LlmBackend<L: LlmClient> {
    client: Arc<L>,
    max_tokens: u32,
}

impl<L: LlmClient> LlmBackend<L> {
    pub fn new(client: Arc<L>, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }
}

impl LlmBackend<AnthropicClient> {
    /// Anthropic-backed agent; reads the API key from the environment
    pub fn anthropic(config: &LlmConfig) -> Result<Self> {
        let client = AnthropicClient::new(AnthropicConfig::from(config))?;
        Ok(Self::new(Arc::new(client), config.max_tokens))
    }
}

#[async_trait]
impl<L: LlmClient + 'static> ReasoningBackend for LlmBackend<L> {
    async fn plan(&self, request: PlanRequest) -> Result<Box<dyn AgentSession>> {
        let session = LlmSession {
            id: generate_session_id("llm"),
            client: Arc::clone(&self.client),
            system: build_system_prompt(&request),
            max_tokens: self.max_tokens,
            history: Vec::new(),
            pending: Vec::new(),
            step_started: false,
        };
        log::info!("Opened session {} for task '{}'", session.id, request.name);
        Ok(Box::new(session))
    }

    fn name(&self) -> &str {
        self.client.model()
    }
}

fn build_system_prompt(request: &PlanRequest) -> String {
    let mut prompt = String::from(
        "You are a QA agent carrying out a task one step at a time. \
         Work only on the current step. When it is done, call the complete_test tool with \
         SUCCESS if the step held, FAILED if a check did not hold, or ERROR if it could not \
         be performed.\n\n",
    );
    let _ = writeln!(prompt, "Task: {}", request.name);
    if !request.description.is_empty() {
        let _ = writeln!(prompt, "Description: {}", request.description);
    }
    if !request.context.is_empty() {
        prompt.push_str("Context:\n");
        for (key, value) in &request.context {
            let _ = writeln!(prompt, "- {}: {}", key, value);
        }
    }
    prompt
}

/// Conversation state for one task run
pub struct LlmSession<L: LlmClient> {
    id: String,
    client: Arc<L>,
    system: String,
    max_tokens: u32,
    history: Vec<Message>,
    /// Tool results owed to the model on the next user turn
    pending: Vec<ContentBlock>,
    /// The next user turn opens a step
    step_started: bool,
}

impl<L: LlmClient> LlmSession<L> {
    fn next_user_turn(&mut self, instruction: &str) -> Message {
        let mut blocks = std::mem::take(&mut self.pending);
        if std::mem::take(&mut self.step_started) || self.history.is_empty() {
            blocks.push(ContentBlock::Text {
                text: format!("Step: {}", instruction),
            });
        } else if blocks.is_empty() {
            blocks.push(ContentBlock::Text {
                text: "Continue".to_string(),
            });
        }
        Message::with_blocks(Role::User, blocks)
    }

    fn record_assistant_turn(&mut self, response: &CompletionResponse) {
        let mut blocks = response.to_blocks();
        if blocks.is_empty() {
            blocks.push(ContentBlock::Text {
                text: "(no response)".to_string(),
            });
        }
        self.history.push(Message::with_blocks(Role::Assistant, blocks));
    }

    fn interpret(&mut self, response: CompletionResponse) -> AgentAction {
        let reasoning = (!response.content.is_empty()).then(|| response.content.clone());
        let mut verdict = None;
        let mut first_tool = None;

        for call in &response.tool_calls {
            if call.name == COMPLETE_TOOL_NAME {
                if verdict.is_none() {
                    verdict = Some(parse_completion(&call.input));
                }
                self.pending.push(ContentBlock::ToolResult {
                    tool_use_id: call.id.clone(),
                    content: "Outcome recorded".to_string(),
                    is_error: false,
                });
            } else {
                log::warn!("Session {} requested unavailable tool '{}'", self.id, call.name);
                first_tool.get_or_insert_with(|| call.name.clone());
                self.pending.push(ContentBlock::ToolResult {
                    tool_use_id: call.id.clone(),
                    content: format!("Tool '{}' is not available", call.name),
                    is_error: true,
                });
            }
        }

        let action = match (verdict, first_tool) {
            (Some(signal), _) => AgentAction::complete(signal.status, signal.message),
            (None, Some(tool)) => AgentAction::progress(tool),
            (None, None) if response.stop_reason == StopReason::MaxTokens => AgentAction::progress("max_tokens"),
            (None, None) => AgentAction::stopped("end_turn"),
        };

        match reasoning {
            Some(text) => action.with_reasoning(text),
            None => action,
        }
    }
}

#[async_trait]
impl<L: LlmClient + 'static> AgentSession for LlmSession<L> {
    fn id(&self) -> &str {
        &self.id
    }

    fn begin_step(&mut self, _instruction: &str) {
        self.step_started = true;
    }

    async fn next_action(&mut self, instruction: &str) -> Result<AgentAction> {
        let turn = self.next_user_turn(instruction);
        self.history.push(turn);

        let request = CompletionRequest::new(self.system.clone())
            .with_messages(self.history.clone())
            .with_tools(vec![complete_tool_definition()])
            .with_max_tokens(self.max_tokens);

        let response = self.client.complete(request).await?;
        log::debug!(
            "Session {} stop_reason={:?} tool_calls={} tokens={}",
            self.id,
            response.stop_reason,
            response.tool_calls.len(),
            response.usage.total()
        );

        self.record_assistant_turn(&response);
        Ok(self.interpret(response))
    }
}
