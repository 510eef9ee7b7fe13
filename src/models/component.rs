//! Item roles and component types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who produced an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[default]
    Agent,
    System,
}

/// The kind of renderable content an item carries.
///
/// The set is open: the backend may introduce component types this client
/// does not know about, which are kept verbatim in [`ComponentType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentType {
    #[default]
    Markdown,
    ToolCall,
    Report,
    SecFeed,
    FilteredLineChart,
    FilteredCardPushNotification,
    ScheduledTaskResult,
    SubagentConversation,
    Other(String),
}

impl ComponentType {
    pub fn as_str(&self) -> &str {
        match self {
            ComponentType::Markdown => "markdown",
            ComponentType::ToolCall => "tool_call",
            ComponentType::Report => "report",
            ComponentType::SecFeed => "sec_feed",
            ComponentType::FilteredLineChart => "filtered_line_chart",
            ComponentType::FilteredCardPushNotification => "filtered_card_push_notification",
            ComponentType::ScheduledTaskResult => "scheduled_task_result",
            ComponentType::SubagentConversation => "subagent_conversation",
            ComponentType::Other(name) => name,
        }
    }

    /// Section types live in `Conversation::sections`, never in the main
    /// thread/task tree.
    pub fn is_section(&self) -> bool {
        matches!(self, ComponentType::SecFeed)
    }

    /// Types whose every delivery is a complete payload, so a repeated item
    /// replaces the previous one instead of extending it.
    pub fn replaces_payload(&self) -> bool {
        matches!(
            self,
            ComponentType::ScheduledTaskResult
                | ComponentType::FilteredLineChart
                | ComponentType::FilteredCardPushNotification
                | ComponentType::SubagentConversation
        )
    }
}

impl From<&str> for ComponentType {
    fn from(name: &str) -> Self {
        match name {
            "markdown" => ComponentType::Markdown,
            "tool_call" => ComponentType::ToolCall,
            "report" => ComponentType::Report,
            "sec_feed" => ComponentType::SecFeed,
            "filtered_line_chart" => ComponentType::FilteredLineChart,
            "filtered_card_push_notification" => ComponentType::FilteredCardPushNotification,
            "scheduled_task_result" => ComponentType::ScheduledTaskResult,
            "subagent_conversation" => ComponentType::SubagentConversation,
            other => ComponentType::Other(other.to_string()),
        }
    }
}

impl From<String> for ComponentType {
    fn from(name: String) -> Self {
        ComponentType::from(name.as_str())
    }
}

impl From<ComponentType> for String {
    fn from(component_type: ComponentType) -> Self {
        match component_type {
            ComponentType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
