//! Message and Transcript domain types.
//!
//! A conversation is a strictly alternating exchange: the user speaks, the
//! assistant either answers or asks for tools, and every tool request is
//! acknowledged by exactly one user turn carrying the matching results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TranscriptError;

/// Unique identifier for a conversation (session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
///
/// Tool results travel in user-role messages, so there is no separate tool role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID assigned by the model; results must echo it.
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Named arguments
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

/// The outcome of one tool call, serialized for the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result answers
    pub tool_call_id: String,

    /// JSON text: the handler's value, or an `{"error": ...}` object
    pub content: String,

    /// Whether `content` is an error payload
    #[serde(default)]
    pub is_error: bool,
}

/// One typed piece of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolCall(ToolCall),
    ToolResult(ToolResult),
}

/// Message body: plain text or an ordered list of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A single transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The content
    pub content: MessageContent,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a plain-text user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
            timestamp: Utc::now(),
        }
    }

    /// Create a plain-text assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant message from content blocks (as the model returns them).
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Blocks(blocks),
            timestamp: Utc::now(),
        }
    }

    /// Create the user message that acknowledges a batch of tool calls.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Blocks(
                results.into_iter().map(ContentBlock::ToolResult).collect(),
            ),
            timestamp: Utc::now(),
        }
    }

    /// The content blocks of this message. Plain text is reported as a single text block.
    pub fn blocks(&self) -> Vec<ContentBlock> {
        match &self.content {
            MessageContent::Text(text) => vec![ContentBlock::Text { text: text.clone() }],
            MessageContent::Blocks(blocks) => blocks.clone(),
        }
    }

    /// Concatenation of every text block, in order, with no separator.
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Tool calls in the order the model emitted them.
    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        match &self.content {
            MessageContent::Text(_) => Vec::new(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolCall(call) => Some(call),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Tool results carried by this message.
    pub fn tool_results_iter(&self) -> impl Iterator<Item = &ToolResult> {
        let blocks: &[ContentBlock] = match &self.content {
            MessageContent::Text(_) => &[],
            MessageContent::Blocks(blocks) => blocks,
        };
        blocks.iter().filter_map(|b| match b {
            ContentBlock::ToolResult(result) => Some(result),
            _ => None,
        })
    }
}

/// The ordered, append-only conversation history.
///
/// There is no removal operation. Every append checks the tool-call pairing
/// rules so a transcript is always acceptable to the remote API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    id: ConversationId,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Seed a transcript with prior turns, replaying them through the append checks.
    pub fn from_messages(messages: Vec<Message>) -> Result<Self, TranscriptError> {
        let mut transcript = Self::new();
        for message in messages {
            match message.role {
                Role::Assistant => transcript.push_assistant(message)?,
                Role::User => {
                    let results: Vec<ToolResult> = message.tool_results_iter().cloned().collect();
                    if results.is_empty() {
                        transcript.push(message)?;
                    } else {
                        transcript.push_tool_results(results)?;
                    }
                }
            }
        }
        Ok(transcript)
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The current ordered history.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// IDs of the tool calls in the last message, if it is an assistant turn
    /// still waiting for its results.
    pub fn pending_tool_call_ids(&self) -> Vec<&str> {
        match self.messages.last() {
            Some(m) if m.role == Role::Assistant => {
                m.tool_calls().into_iter().map(|c| c.id.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Append a plain user turn.
    pub fn push_user_text(&mut self, text: impl Into<String>) -> Result<(), TranscriptError> {
        self.push(Message::user(text))
    }

    /// Append an assistant turn.
    pub fn push_assistant(&mut self, message: Message) -> Result<(), TranscriptError> {
        if message.role != Role::Assistant {
            return Err(TranscriptError::UnexpectedRole {
                expected: Role::Assistant.to_string(),
                got: message.role.to_string(),
            });
        }
        self.push(message)
    }

    /// Append the single user turn that answers every pending tool call, in call order.
    pub fn push_tool_results(&mut self, results: Vec<ToolResult>) -> Result<(), TranscriptError> {
        let pending: Vec<String> = self
            .pending_tool_call_ids()
            .into_iter()
            .map(String::from)
            .collect();

        if pending.is_empty() {
            return Err(TranscriptError::NoPendingToolCalls);
        }
        if pending.len() != results.len() {
            return Err(TranscriptError::ResultCountMismatch {
                expected: pending.len(),
                got: results.len(),
            });
        }
        for (position, (expected, result)) in pending.iter().zip(&results).enumerate() {
            if *expected != result.tool_call_id {
                return Err(TranscriptError::ResultIdMismatch {
                    position,
                    expected: expected.clone(),
                    got: result.tool_call_id.clone(),
                });
            }
        }

        self.append(Message::tool_results(results));
        Ok(())
    }

    fn push(&mut self, message: Message) -> Result<(), TranscriptError> {
        let pending = self.pending_tool_call_ids().len();
        if pending > 0 {
            return Err(TranscriptError::ToolResultsOutstanding { pending });
        }
        if message.tool_results_iter().next().is_some() {
            return Err(TranscriptError::NoPendingToolCalls);
        }
        self.append(message);
        Ok(())
    }

    fn append(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str, name: &str) -> ContentBlock {
        ContentBlock::ToolCall(ToolCall {
            id: id.into(),
            name: name.into(),
            arguments: serde_json::Map::new(),
        })
    }

    fn result(id: &str) -> ToolResult {
        ToolResult {
            tool_call_id: id.into(),
            content: "{}".into(),
            is_error: false,
        }
    }

    #[test]
    fn text_concatenates_blocks_in_order() {
        let msg = Message::assistant_blocks(vec![
            ContentBlock::Text { text: "Paris".into() },
            call("c1", "noop"),
            ContentBlock::Text { text: " is the capital.".into() },
        ]);
        assert_eq!(msg.text(), "Paris is the capital.");
        assert_eq!(msg.tool_calls().len(), 1);
    }

    #[test]
    fn transcript_starts_empty() {
        let t = Transcript::new();
        assert!(t.is_empty());
        assert!(t.pending_tool_call_ids().is_empty());
        assert!(t.updated_at() >= t.created_at());
    }

    #[test]
    fn pending_ids_follow_last_assistant_turn() {
        let mut t = Transcript::new();
        t.push_user_text("weather in Oslo and Rome?").unwrap();
        t.push_assistant(Message::assistant_blocks(vec![
            call("a", "get_weather"),
            call("b", "get_weather"),
        ]))
        .unwrap();
        assert_eq!(t.pending_tool_call_ids(), vec!["a", "b"]);

        t.push_tool_results(vec![result("a"), result("b")]).unwrap();
        assert!(t.pending_tool_call_ids().is_empty());
        assert_eq!(t.len(), 3);
        assert_eq!(t.last().unwrap().role, Role::User);
    }

    #[test]
    fn results_must_match_calls() {
        let mut t = Transcript::new();
        t.push_user_text("hi").unwrap();
        t.push_assistant(Message::assistant_blocks(vec![call("a", "x"), call("b", "y")]))
            .unwrap();

        assert_eq!(
            t.push_tool_results(vec![result("a")]),
            Err(TranscriptError::ResultCountMismatch { expected: 2, got: 1 })
        );
        assert!(matches!(
            t.push_tool_results(vec![result("b"), result("a")]),
            Err(TranscriptError::ResultIdMismatch { position: 0, .. })
        ));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn results_without_calls_rejected() {
        let mut t = Transcript::new();
        t.push_user_text("hi").unwrap();
        assert_eq!(
            t.push_tool_results(vec![result("a")]),
            Err(TranscriptError::NoPendingToolCalls)
        );
    }

    #[test]
    fn user_text_blocked_while_calls_outstanding() {
        let mut t = Transcript::new();
        t.push_user_text("hi").unwrap();
        t.push_assistant(Message::assistant_blocks(vec![call("a", "x")]))
            .unwrap();
        assert_eq!(
            t.push_user_text("hello?"),
            Err(TranscriptError::ToolResultsOutstanding { pending: 1 })
        );
    }

    #[test]
    fn push_assistant_rejects_user_role() {
        let mut t = Transcript::new();
        assert!(matches!(
            t.push_assistant(Message::user("nope")),
            Err(TranscriptError::UnexpectedRole { .. })
        ));
    }

    #[test]
    fn seeding_replays_checks() {
        let messages = vec![
            Message::user("list engineers"),
            Message::assistant_blocks(vec![call("t1", "get_employees")]),
            Message::tool_results(vec![result("t1")]),
            Message::assistant("There are 2 engineers."),
        ];
        let t = Transcript::from_messages(messages).unwrap();
        assert_eq!(t.len(), 4);

        let broken = vec![
            Message::user("list engineers"),
            Message::tool_results(vec![result("t1")]),
        ];
        assert!(Transcript::from_messages(broken).is_err());
    }

    #[test]
    fn content_block_wire_shape() {
        let block = call("toolu_1", "get_weather");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_call");
        assert_eq!(json["name"], "get_weather");

        let msg = Message::user("plain");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["content"], "plain");
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn transcript_serde_keeps_history() {
        let mut t = Transcript::new();
        t.push_user_text("hello").unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let back: Transcript = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), t.id());
        assert_eq!(back.messages()[0].text(), "hello");
    }
}
