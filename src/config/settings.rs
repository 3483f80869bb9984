use crate::adapters::http::{ClientOptions, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECONDS};
use crate::config::toml_config::TomlConfig;
use crate::core::credentials::DEFAULT_API_KEY_ENV;
use crate::domain::model::{ChatMessage, ChatRequest};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "chat-model-small";
pub const DEFAULT_SYSTEM_PROMPT: &str = "Você é um assistente útil que responde em português.";
pub const DEFAULT_PROMPT: &str =
    "Olá! Pode me dar três ideias criativas para um projeto de ciências do ensino médio?";
pub const DEFAULT_STREAM_DELAY_MS: u64 = 10;

/// 合併預設值、設定檔與命令列之後的最終設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub api_key_env: String,
    pub model: String,
    pub system_prompt: String,
    pub prompt: String,
    pub stream_delay_ms: u64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            stream_delay_ms: DEFAULT_STREAM_DELAY_MS,
        }
    }
}

impl DemoSettings {
    /// 套用設定檔中有填的欄位
    pub fn merge_toml(mut self, file: &TomlConfig) -> Self {
        if let Some(client) = &file.client {
            if let Some(base_url) = &client.base_url {
                self.base_url = base_url.clone();
            }
            if let Some(timeout) = client.timeout_seconds {
                self.timeout_seconds = timeout;
            }
            if let Some(env) = &client.api_key_env {
                self.api_key_env = env.clone();
            }
        }

        if let Some(chat) = &file.chat {
            if let Some(model) = &chat.model {
                self.model = model.clone();
            }
            if let Some(system_prompt) = &chat.system_prompt {
                self.system_prompt = system_prompt.clone();
            }
            if let Some(prompt) = &chat.prompt {
                self.prompt = prompt.clone();
            }
            if let Some(delay) = chat.stream_delay_ms {
                self.stream_delay_ms = delay;
            }
        }

        self
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if !self.system_prompt.trim().is_empty() {
            messages.push(ChatMessage::system(self.system_prompt.clone()));
        }
        messages.push(ChatMessage::user(self.prompt.clone()));
        messages
    }

    pub fn chat_request(&self) -> ChatRequest {
        ChatRequest::new(self.model.clone(), self.messages())
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
        }
    }

    pub fn stream_delay(&self) -> Duration {
        Duration::from_millis(self.stream_delay_ms)
    }
}

impl Validate for DemoSettings {
    fn validate(&self) -> Result<()> {
        validate_url("client.base_url", &self.base_url)?;
        validate_range("client.timeout_seconds", self.timeout_seconds, 1, 600)?;
        validate_non_empty_string("client.api_key_env", &self.api_key_env)?;
        validate_non_empty_string("chat.model", &self.model)?;
        validate_non_empty_string("chat.prompt", &self.prompt)?;
        validate_range("chat.stream_delay_ms", self.stream_delay_ms, 0, 5000)?;
        Ok(())
    }
}
