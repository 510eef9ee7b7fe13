use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body that starts a stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamRequest {
    /// The user's query or intent
    pub query: String,
    /// Agent that should answer
    pub agent_id: String,
    /// Existing conversation to continue - None starts a new one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Client-generated id for correlating server logs with this request
    pub session_id: String,
}

impl StreamRequest {
    /// Create a StreamRequest for a new conversation
    pub fn new(query: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            agent_id: agent_id.into(),
            conversation_id: None,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Continue an existing conversation
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_has_no_conversation() {
        let request = StreamRequest::new("price of AAPL", "research");
        assert_eq!(request.query, "price of AAPL");
        assert_eq!(request.agent_id, "research");
        assert!(request.conversation_id.is_none());
        assert!(!request.session_id.is_empty());
    }

    #[test]
    fn test_conversation_id_omitted_when_absent() {
        let request = StreamRequest::new("hi", "a1");
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("conversation_id").is_none());

        let json = serde_json::to_value(request.with_conversation("c1")).unwrap();
        assert_eq!(json["conversation_id"], "c1");
    }

    #[test]
    fn test_each_request_gets_its_own_session_id() {
        let a = StreamRequest::new("q", "a");
        let b = StreamRequest::new("q", "a");
        assert_ne!(a.session_id, b.session_id);
    }
}
