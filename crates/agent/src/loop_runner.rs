//! The conversation state machine.

use std::sync::Arc;

use datadesk_config::DEFAULT_SYSTEM_PROMPT;
use datadesk_core::message::{ContentBlock, Message, MessageContent, ToolCall, Transcript};
use datadesk_core::provider::{Provider, ProviderRequest};
use datadesk_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

use crate::budget::IterationBudget;
use crate::executor::ToolExecutor;

/// Text reported when a conversation runs out of iterations.
pub const BUDGET_EXCEEDED_MESSAGE: &str = "Conversation limit reached.";

/// Where the loop is. Logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingModel,
    ProcessingToolCalls,
    FinalAnswer,
    BudgetExceeded,
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingModel => write!(f, "awaiting_model"),
            Self::ProcessingToolCalls => write!(f, "processing_tool_calls"),
            Self::FinalAnswer => write!(f, "final_answer"),
            Self::BudgetExceeded => write!(f, "budget_exceeded"),
        }
    }
}

/// How a conversation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The model answered in plain text.
    FinalAnswer(String),
    /// The iteration budget ran out while the model still wanted tools.
    BudgetExceeded { iterations: u32 },
}

impl Outcome {
    /// The answer, or the fixed limit message.
    pub fn text(&self) -> &str {
        match self {
            Self::FinalAnswer(text) => text,
            Self::BudgetExceeded { .. } => BUDGET_EXCEEDED_MESSAGE,
        }
    }

    pub fn is_final_answer(&self) -> bool {
        matches!(self, Self::FinalAnswer(_))
    }
}

/// The agent loop that orchestrates LLM calls and tool execution.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per response
    max_tokens: Option<u32>,

    /// Fixed instruction sent with every model turn
    system_prompt: String,

    /// Runs tool calls against the registry
    executor: ToolExecutor,

    /// Model round-trips allowed per conversation
    max_iterations: u32,

    /// Run the calls of one batch concurrently
    concurrent_tools: bool,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            executor: ToolExecutor::new(tools),
            max_iterations: IterationBudget::DEFAULT_CEILING,
            concurrent_tools: false,
        }
    }

    /// Set the maximum number of model round-trips per conversation.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Execute the tool calls of one model turn concurrently.
    pub fn with_concurrent_tools(mut self, enabled: bool) -> Self {
        self.concurrent_tools = enabled;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        self.executor.registry()
    }

    /// Run one conversation in a fresh transcript.
    pub async fn ask(&self, user_text: &str) -> datadesk_core::Result<Outcome> {
        let mut transcript = Transcript::new();
        self.run_conversation(user_text, &mut transcript).await
    }

    /// Append `user_text` to `transcript` and drive the model until it
    /// answers or the budget is spent.
    ///
    /// The caller keeps the transcript, so passing the same one again
    /// continues the conversation. Only provider failures and transcript
    /// protocol violations are returned as errors; tool failures are data.
    pub async fn run_conversation(
        &self,
        user_text: &str,
        transcript: &mut Transcript,
    ) -> datadesk_core::Result<Outcome> {
        transcript.push_user_text(user_text)?;

        info!(
            conversation_id = %transcript.id(),
            messages = transcript.len(),
            budget = self.max_iterations,
            "Processing conversation"
        );

        let tool_specs = self.tools().describe_all();
        let mut budget = IterationBudget::new(self.max_iterations);
        let mut state = LoopState::AwaitingModel;

        while budget.consume() {
            let iteration = budget.used();
            debug!(
                conversation_id = %transcript.id(),
                iteration,
                state = %state,
                "Agent loop iteration"
            );

            let request = ProviderRequest {
                model: self.model.clone(),
                system: self.system_prompt.clone(),
                messages: transcript.messages().to_vec(),
                tools: tool_specs.clone(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            };

            let response = self.provider.complete(request).await?;

            if let Some(usage) = &response.usage {
                debug!(
                    iteration,
                    model = %response.model,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "Model turn"
                );
            }

            let calls: Vec<ToolCall> = response
                .message
                .tool_calls()
                .into_iter()
                .cloned()
                .collect();

            if !response.stop_reason.is_tool_use() || calls.is_empty() {
                state = transition(state, LoopState::FinalAnswer, iteration);
                let answer = response.message.text();
                transcript.push_assistant(strip_tool_calls(response.message))?;
                info!(
                    conversation_id = %transcript.id(),
                    iterations = iteration,
                    stop_reason = %response.stop_reason,
                    state = %state,
                    "Conversation finished"
                );
                return Ok(Outcome::FinalAnswer(answer));
            }

            transcript.push_assistant(response.message)?;
            state = transition(state, LoopState::ProcessingToolCalls, iteration);
            debug!(tool_count = calls.len(), "Executing tool calls");

            let results = self
                .executor
                .execute_batch(&calls, self.concurrent_tools)
                .await;
            transcript.push_tool_results(results)?;
            state = transition(state, LoopState::AwaitingModel, iteration);
        }

        state = transition(state, LoopState::BudgetExceeded, budget.used());
        warn!(
            conversation_id = %transcript.id(),
            iterations = budget.used(),
            state = %state,
            "Max iterations reached without a final answer"
        );
        Ok(Outcome::BudgetExceeded {
            iterations: budget.used(),
        })
    }
}

fn transition(from: LoopState, to: LoopState, iteration: u32) -> LoopState {
    debug!(iteration, from = %from, to = %to, "State transition");
    to
}

/// A final answer can still carry tool calls (e.g. `end_turn` with a stray
/// `tool_use` block). Nothing will answer them, so they are dropped before
/// the message is stored.
fn strip_tool_calls(message: Message) -> Message {
    match message.content {
        MessageContent::Blocks(blocks)
            if blocks.iter().any(|b| matches!(b, ContentBlock::ToolCall(_))) =>
        {
            warn!("Dropping tool calls from a final answer");
            let blocks = blocks
                .into_iter()
                .filter(|b| !matches!(b, ContentBlock::ToolCall(_)))
                .collect();
            Message {
                content: MessageContent::Blocks(blocks),
                ..message
            }
        }
        _ => message,
    }
}
