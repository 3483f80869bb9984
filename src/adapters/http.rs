use crate::adapters::sse::{decode_chunk, SseEvent, SseParser};
use crate::domain::model::{ChatRequest, ChatResponse, Payload, StreamChunk};
use crate::domain::ports::{AiService, ChunkStream};
use crate::utils::error::{DemoError, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::{header, Client, RequestBuilder, Response};
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.muffinscorp.com/v1";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

/// 以 reqwest 實作的服務客戶端
pub struct MuffinsClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl MuffinsClient {
    pub fn new(api_key: impl Into<String>, options: ClientOptions) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(options.timeout)
            .user_agent(concat!("muffins-demo/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: options.timeout,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.bearer_auth(&self.api_key).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "request failed".to_string());

        Err(DemoError::ServiceError {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.endpoint(path);
        tracing::debug!("Making API request to: {}", url);
        let response = self
            .send(self.client.get(&url).timeout(self.timeout))
            .await?;
        let body = response.text().await?;
        parse_json_body(path, &body)
    }
}

#[async_trait]
impl AiService for MuffinsClient {
    async fn get_balance(&self) -> Result<Payload> {
        let value = self.get_json("credits/balance").await?;
        Payload::try_from(value).map_err(|other| DemoError::PayloadError {
            message: format!("balance response is not an object: {}", other),
        })
    }

    async fn list_models(&self) -> Result<Vec<Payload>> {
        let value = self.get_json("models").await?;
        let models = parse_model_list(value)?;
        tracing::debug!("Received {} models", models.len());
        Ok(models)
    }

    async fn chat_create(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint("chat");
        let body = request.clone().streaming(false);
        tracing::debug!("Sending chat request to {} with model {}", url, body.model);

        let response = self
            .send(self.client.post(&url).timeout(self.timeout).json(&body))
            .await?;
        let text = response.text().await?;

        Ok(match serde_json::from_str::<Value>(&text) {
            Ok(value) => ChatResponse::from(value),
            Err(_) => ChatResponse::Text(text),
        })
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream> {
        let url = self.endpoint("chat");
        let body = request.clone().streaming(true);
        tracing::debug!("Opening chat stream to {} with model {}", url, body.model);

        let response = self
            .send(
                self.client
                    .post(&url)
                    .header(header::ACCEPT, "text/event-stream")
                    .json(&body),
            )
            .await?;

        let is_event_stream = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/event-stream"));

        if is_event_stream {
            return Ok(sse_chunks(response.bytes_stream()));
        }

        // 服務沒有回 SSE 時，整包讀完再切成片段
        tracing::debug!("Stream response is not SSE, reading whole body");
        let text = response.text().await?;
        Ok(stream::iter(chunks_from_body(&text).into_iter().map(Ok)).boxed())
    }
}

/// 成功狀態但內容不是 JSON 時，屬於回應格式問題而不是連線問題
fn parse_json_body(path: &str, body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| DemoError::PayloadError {
        message: format!("'{}' returned a body that is not JSON: {}", path, e),
    })
}

fn parse_model_list(value: Value) -> Result<Vec<Payload>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("models").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(DemoError::PayloadError {
                    message: "model list response has no 'models' or 'data' array".to_string(),
                })
            }
        },
        other => {
            return Err(DemoError::PayloadError {
                message: format!("model list response is not a list: {}", other),
            })
        }
    };

    items
        .into_iter()
        .map(|item| {
            Payload::try_from(item).map_err(|other| DemoError::PayloadError {
                message: format!("model entry is not an object: {}", other),
            })
        })
        .collect()
}

/// 從錯誤回應中找出可讀的訊息
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        let from_error = match map.get("error") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Object(inner)) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        };
        if let Some(message) = from_error.or_else(|| {
            map.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        }) {
            return Some(message);
        }
    }

    Some(trimmed.to_string())
}

pub(crate) fn chunks_from_body(body: &str) -> Vec<StreamChunk> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => items.into_iter().map(StreamChunk::from).collect(),
        Ok(value) => vec![StreamChunk::from(value)],
        Err(_) => vec![StreamChunk::Text(body.to_string())],
    }
}

/// 把位元組串流經 SSE 解析後轉成片段串流
pub(crate) fn sse_chunks<S, B, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let state = SseState {
        bytes: bytes.boxed(),
        parser: SseParser::new(),
        carry: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(chunk) = state.pending.pop_front() {
                return Some((Ok(chunk), state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(bytes)) => {
                    let text = decode_utf8(&mut state.carry, bytes.as_ref());
                    let events = state.parser.feed(&text);
                    state.absorb(events);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((
                        Err(DemoError::StreamError {
                            message: e.to_string(),
                        }),
                        state,
                    ));
                }
                None => {
                    let events = state.parser.finish().into_iter().collect();
                    state.absorb(events);
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}

struct SseState<B, E> {
    bytes: BoxStream<'static, std::result::Result<B, E>>,
    parser: SseParser,
    carry: Vec<u8>,
    pending: VecDeque<StreamChunk>,
    finished: bool,
}

impl<B, E> SseState<B, E> {
    fn absorb(&mut self, events: Vec<SseEvent>) {
        for event in events {
            match decode_chunk(&event.data) {
                Some(chunk) => self.pending.push_back(chunk),
                None => {
                    tracing::debug!("Stream finished by server marker");
                    self.finished = true;
                    return;
                }
            }
        }
    }
}

/// 多位元組字元可能被切在兩個區塊之間，不完整的尾巴留到下一次
fn decode_utf8(carry: &mut Vec<u8>, bytes: &[u8]) -> String {
    carry.extend_from_slice(bytes);
    match std::str::from_utf8(carry) {
        Ok(text) => {
            let text = text.to_owned();
            carry.clear();
            text
        }
        Err(e) if e.error_len().is_none() => {
            let valid = e.valid_up_to();
            let text = String::from_utf8_lossy(&carry[..valid]).into_owned();
            carry.drain(..valid);
            text
        }
        Err(_) => {
            let text = String::from_utf8_lossy(carry).into_owned();
            carry.clear();
            text
        }
    }
}
