use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// 欄位缺失時顯示的佔位字串
pub const PLACEHOLDER: &str = "N/A";

/// 服務回傳的 JSON 物件。所有讀取方法都不會失敗，缺欄位時回傳預設值。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// `null` 視同缺欄位
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    pub fn display(&self, key: &str) -> String {
        self.get(key)
            .map(display_value)
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }

    /// 只有非空物件才算存在
    pub fn object(&self, key: &str) -> Option<Payload> {
        match self.get(key) {
            Some(Value::Object(map)) if !map.is_empty() => Some(Payload::new(map.clone())),
            _ => None,
        }
    }

    pub fn objects(&self, key: &str) -> Vec<Payload> {
        let Some(Value::Array(items)) = self.get(key) else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(Payload::new(map.clone())),
                other => {
                    tracing::debug!("Skipping non-object entry in '{}': {}", key, other);
                    None
                }
            })
            .collect()
    }
}

impl TryFrom<Value> for Payload {
    type Error = Value;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Payload::new(map)),
            other => Err(other),
        }
    }
}

/// 字串不加引號，其他型別用 JSON 表示
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => PLACEHOLDER.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub stream: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: model.into(),
            stream: false,
        }
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// 非串流回應可能出現的幾種形狀
#[derive(Debug, Clone, PartialEq)]
pub enum ChatResponse {
    Message(Payload),
    Text(String),
    Batch(Vec<ChatItem>),
    Unexpected(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatItem {
    Message(Payload),
    Other(Value),
}

impl From<Value> for ChatResponse {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => ChatResponse::Message(Payload::new(map)),
            Value::String(text) => ChatResponse::Text(text),
            Value::Array(items) => ChatResponse::Batch(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(map) => ChatItem::Message(Payload::new(map)),
                        other => ChatItem::Other(other),
                    })
                    .collect(),
            ),
            other => ChatResponse::Unexpected(other),
        }
    }
}

/// 串流回應中的單一片段
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Message(Payload),
    Text(String),
    Other(Value),
}

impl StreamChunk {
    /// 這個片段要顯示的文字；空字串或無法顯示的形狀回傳 `None`
    pub fn text(&self) -> Option<Cow<'_, str>> {
        let text = match self {
            StreamChunk::Message(payload) => match payload.get("text")? {
                Value::String(s) => Cow::Borrowed(s.as_str()),
                other => Cow::Owned(display_value(other)),
            },
            StreamChunk::Text(text) => Cow::Borrowed(text.as_str()),
            StreamChunk::Other(_) => return None,
        };
        (!text.is_empty()).then_some(text)
    }
}

impl From<Value> for StreamChunk {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => StreamChunk::Message(Payload::new(map)),
            Value::String(text) => StreamChunk::Text(text),
            other => StreamChunk::Other(other),
        }
    }
}
