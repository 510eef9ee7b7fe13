//! Agent event types
//!
//! Every frame the backend sends carries a JSON object of the form
//! `{"event": "<tag>", "data": {...}}`. [`AgentEvent`] has one variant per
//! known tag, each with its own payload type. Tags this client does not know
//! are kept as [`AgentEvent::Unknown`] so newer backends do not break older
//! clients.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FrameError;
use crate::models::{deserialize_id, ComponentType, Role};

/// Where a renderable event lands in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub conversation_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub thread_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub task_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub item_id: String,
    #[serde(default)]
    pub role: Role,
}

impl ItemRef {
    pub fn new(
        conversation_id: impl Into<String>,
        thread_id: impl Into<String>,
        task_id: impl Into<String>,
        item_id: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            thread_id: thread_id.into(),
            task_id: task_id.into(),
            item_id: item_id.into(),
            role: Role::Agent,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationStartedData {
    #[serde(deserialize_with = "deserialize_id")]
    pub conversation_id: String,
}

/// Text content. Failure events may name the field `message` or `error`;
/// when several are present, `content` wins over `message` over `error`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawContentPayload")]
pub struct ContentPayload {
    pub content: String,
}

#[derive(Deserialize)]
struct RawContentPayload {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl From<RawContentPayload> for ContentPayload {
    fn from(raw: RawContentPayload) -> Self {
        Self {
            content: raw.content.or(raw.message).or(raw.error).unwrap_or_default(),
        }
    }
}

/// Payload shared by every event that renders as markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentData {
    #[serde(flatten)]
    pub target: ItemRef,
    #[serde(default)]
    pub payload: ContentPayload,
}

impl ContentData {
    pub fn new(target: ItemRef, content: impl Into<String>) -> Self {
        Self {
            target,
            payload: ContentPayload {
                content: content.into(),
            },
        }
    }
}

/// Ids of a conversation/thread/task path, without an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathData {
    #[serde(deserialize_with = "deserialize_id")]
    pub conversation_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub thread_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl PathData {
    pub fn new(
        conversation_id: impl Into<String>,
        thread_id: impl Into<String>,
        task_id: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            thread_id: thread_id.into(),
            task_id: task_id.into(),
            item_id: None,
            role: Role::Agent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPayload {
    #[serde(deserialize_with = "deserialize_id")]
    pub tool_call_id: String,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_result: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallData {
    #[serde(flatten)]
    pub target: ItemRef,
    pub payload: ToolCallPayload,
}

/// A structured component whose type is declared by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    #[serde(flatten)]
    pub target: ItemRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<ComponentType>,
    #[serde(default)]
    pub payload: Value,
}

impl ComponentData {
    /// The declared type: `data.component_type`, else `payload.component_type`,
    /// else markdown.
    pub fn declared_type(&self) -> ComponentType {
        if let Some(component_type) = &self.component_type {
            return component_type.clone();
        }
        self.payload
            .get("component_type")
            .and_then(Value::as_str)
            .map(ComponentType::from)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoneData {
    #[serde(deserialize_with = "deserialize_id")]
    pub conversation_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub thread_id: String,
}

/// Typed events from the agent backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireEvent", into = "WireEvent")]
pub enum AgentEvent {
    ConversationStarted(ConversationStartedData),
    ThreadStarted(ContentData),
    MessageChunk(ContentData),
    Message(ContentData),
    Reasoning(ContentData),
    ReasoningStarted(PathData),
    ReasoningCompleted(PathData),
    ToolCallStarted(ToolCallData),
    ToolCallCompleted(ToolCallData),
    ComponentGenerator(ComponentData),
    PlanFailed(ContentData),
    PlanRequireUserInput(ContentData),
    TaskFailed(ContentData),
    SystemFailed(ContentData),
    Done(DoneData),
    /// A tag this client does not know. Ignored by the reducer.
    Unknown { event: String, data: Value },
}

impl AgentEvent {
    /// Build an event from its wire tag and `data` object.
    pub fn from_parts(tag: &str, data: Value) -> Result<Self, FrameError> {
        let event = match tag {
            "conversation_started" => AgentEvent::ConversationStarted(decode(tag, data)?),
            "thread_started" => AgentEvent::ThreadStarted(decode(tag, data)?),
            "message_chunk" => AgentEvent::MessageChunk(decode(tag, data)?),
            "message" => AgentEvent::Message(decode(tag, data)?),
            "reasoning" => AgentEvent::Reasoning(decode(tag, data)?),
            "reasoning_started" => AgentEvent::ReasoningStarted(decode(tag, data)?),
            "reasoning_completed" => AgentEvent::ReasoningCompleted(decode(tag, data)?),
            "tool_call_started" => AgentEvent::ToolCallStarted(decode(tag, data)?),
            "tool_call_completed" => AgentEvent::ToolCallCompleted(decode(tag, data)?),
            "component_generator" => AgentEvent::ComponentGenerator(decode(tag, data)?),
            "plan_failed" => AgentEvent::PlanFailed(decode(tag, data)?),
            "plan_require_user_input" => AgentEvent::PlanRequireUserInput(decode(tag, data)?),
            "task_failed" => AgentEvent::TaskFailed(decode(tag, data)?),
            "system_failed" => AgentEvent::SystemFailed(decode(tag, data)?),
            "done" => AgentEvent::Done(decode(tag, data)?),
            _ => AgentEvent::Unknown {
                event: tag.to_string(),
                data,
            },
        };
        Ok(event)
    }

    /// The wire tag of this event.
    pub fn tag(&self) -> &str {
        match self {
            AgentEvent::ConversationStarted(_) => "conversation_started",
            AgentEvent::ThreadStarted(_) => "thread_started",
            AgentEvent::MessageChunk(_) => "message_chunk",
            AgentEvent::Message(_) => "message",
            AgentEvent::Reasoning(_) => "reasoning",
            AgentEvent::ReasoningStarted(_) => "reasoning_started",
            AgentEvent::ReasoningCompleted(_) => "reasoning_completed",
            AgentEvent::ToolCallStarted(_) => "tool_call_started",
            AgentEvent::ToolCallCompleted(_) => "tool_call_completed",
            AgentEvent::ComponentGenerator(_) => "component_generator",
            AgentEvent::PlanFailed(_) => "plan_failed",
            AgentEvent::PlanRequireUserInput(_) => "plan_require_user_input",
            AgentEvent::TaskFailed(_) => "task_failed",
            AgentEvent::SystemFailed(_) => "system_failed",
            AgentEvent::Done(_) => "done",
            AgentEvent::Unknown { event, .. } => event,
        }
    }

    /// The conversation this event belongs to. `None` for unknown tags.
    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            AgentEvent::ConversationStarted(data) => Some(&data.conversation_id),
            AgentEvent::ReasoningStarted(data) | AgentEvent::ReasoningCompleted(data) => {
                Some(&data.conversation_id)
            }
            AgentEvent::Done(data) => Some(&data.conversation_id),
            AgentEvent::Unknown { .. } => None,
            other => other.target().map(|target| target.conversation_id.as_str()),
        }
    }

    /// The item this event renders into, for events that carry one.
    pub fn target(&self) -> Option<&ItemRef> {
        match self {
            AgentEvent::ThreadStarted(data)
            | AgentEvent::MessageChunk(data)
            | AgentEvent::Message(data)
            | AgentEvent::Reasoning(data)
            | AgentEvent::PlanFailed(data)
            | AgentEvent::PlanRequireUserInput(data)
            | AgentEvent::TaskFailed(data)
            | AgentEvent::SystemFailed(data) => Some(&data.target),
            AgentEvent::ToolCallStarted(data) | AgentEvent::ToolCallCompleted(data) => {
                Some(&data.target)
            }
            AgentEvent::ComponentGenerator(data) => Some(&data.target),
            _ => None,
        }
    }

    /// True for the event that ends a thread's stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentEvent::Done(_))
    }

    fn data_value(&self) -> Value {
        let encoded = match self {
            AgentEvent::ConversationStarted(data) => serde_json::to_value(data),
            AgentEvent::ThreadStarted(data)
            | AgentEvent::MessageChunk(data)
            | AgentEvent::Message(data)
            | AgentEvent::Reasoning(data)
            | AgentEvent::PlanFailed(data)
            | AgentEvent::PlanRequireUserInput(data)
            | AgentEvent::TaskFailed(data)
            | AgentEvent::SystemFailed(data) => serde_json::to_value(data),
            AgentEvent::ReasoningStarted(data) | AgentEvent::ReasoningCompleted(data) => {
                serde_json::to_value(data)
            }
            AgentEvent::ToolCallStarted(data) | AgentEvent::ToolCallCompleted(data) => {
                serde_json::to_value(data)
            }
            AgentEvent::ComponentGenerator(data) => serde_json::to_value(data),
            AgentEvent::Done(data) => serde_json::to_value(data),
            AgentEvent::Unknown { data, .. } => Ok(data.clone()),
        };
        // Payload structs only have string keys, so encoding cannot fail.
        encoded.unwrap_or(Value::Null)
    }
}

fn decode<T: DeserializeOwned>(tag: &str, data: Value) -> Result<T, FrameError> {
    serde_json::from_value(data).map_err(|e| FrameError::InvalidPayload {
        event: tag.to_string(),
        message: e.to_string(),
    })
}

/// `{"event": ..., "data": ...}` as it appears on the wire and in history files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireEvent {
    event: String,
    #[serde(default)]
    data: Value,
}

impl TryFrom<WireEvent> for AgentEvent {
    type Error = FrameError;

    fn try_from(wire: WireEvent) -> Result<Self, Self::Error> {
        let data = match wire.data {
            Value::Null => Value::Object(Default::default()),
            data => data,
        };
        AgentEvent::from_parts(&wire.event, data)
    }
}

impl From<AgentEvent> for WireEvent {
    fn from(event: AgentEvent) -> Self {
        WireEvent {
            event: event.tag().to_string(),
            data: event.data_value(),
        }
    }
}
