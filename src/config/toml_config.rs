use crate::utils::error::{DemoError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 設定檔內容；所有欄位都可省略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub client: Option<ClientSection>,
    pub chat: Option<ChatSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSection {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatSection {
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub prompt: Option<String>,
    pub stream_delay_ms: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading config file {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| DemoError::ConfigError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DemoError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MUFFINS_BASE_URL})，未設定的保留原字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DemoError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let config = TomlConfig::from_toml_str(
            r#"
[client]
base_url = "http://localhost:9000/v1"
timeout_seconds = 5
api_key_env = "OTHER_KEY"

[chat]
model = "chat-model-large"
prompt = "Diga oi"
stream_delay_ms = 0
"#,
        )
        .unwrap();

        let client = config.client.unwrap();
        assert_eq!(client.base_url.as_deref(), Some("http://localhost:9000/v1"));
        assert_eq!(client.timeout_seconds, Some(5));
        let chat = config.chat.unwrap();
        assert_eq!(chat.model.as_deref(), Some("chat-model-large"));
        assert_eq!(chat.system_prompt, None);
        assert_eq!(chat.stream_delay_ms, Some(0));
    }

    #[test]
    fn test_empty_file_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.client.is_none());
        assert!(config.chat.is_none());
    }

    #[test]
    fn test_unset_placeholder_is_kept() {
        let config = TomlConfig::from_toml_str(
            r#"
[chat]
model = "${MUFFINS_DEMO_SURELY_UNSET_VARIABLE}"
"#,
        )
        .unwrap();
        assert_eq!(
            config.chat.unwrap().model.as_deref(),
            Some("${MUFFINS_DEMO_SURELY_UNSET_VARIABLE}")
        );
    }

    #[test]
    fn test_placeholder_uses_environment() {
        std::env::set_var("MUFFINS_DEMO_TOML_TEST_MODEL", "chat-model-env");
        let config = TomlConfig::from_toml_str(
            r#"
[chat]
model = "${MUFFINS_DEMO_TOML_TEST_MODEL}"
"#,
        )
        .unwrap();
        assert_eq!(config.chat.unwrap().model.as_deref(), Some("chat-model-env"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[chat\nmodel = 1").unwrap_err();
        assert!(matches!(err, DemoError::ConfigError { .. }));
    }
}
