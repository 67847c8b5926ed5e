use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One prior conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Request payload for a streaming target: free-form fields plus an
/// optional conversation history sent as `messages`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Builds the JSON request body. History goes in first as `messages`;
    /// explicit fields are merged over it and win on key collision.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        if let Some(history) = &self.messages {
            body.insert(
                "messages".to_string(),
                Value::Array(
                    history
                        .iter()
                        .map(|m| serde_json::json!({ "role": m.role, "content": m.content }))
                        .collect(),
                ),
            );
        }
        for (key, value) in &self.fields {
            body.insert(key.clone(), value.clone());
        }
        Value::Object(body)
    }
}
