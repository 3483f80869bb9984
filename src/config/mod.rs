pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::{settings::DemoSettings, toml_config::TomlConfig};
#[cfg(feature = "cli")]
use crate::utils::{error::Result, validation::Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "muffins-demo")]
#[command(about = "Demonstrates the Muffins AI service: balance, models and chat")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Service base URL")]
    pub base_url: Option<String>,

    #[arg(long, help = "Model used for both chat examples")]
    pub model: Option<String>,

    #[arg(long, help = "System message sent before the prompt")]
    pub system_prompt: Option<String>,

    #[arg(long, help = "User message sent to the model")]
    pub prompt: Option<String>,

    #[arg(long, help = "Environment variable holding the API key")]
    pub api_key_env: Option<String>,

    #[arg(long, help = "Pause after each streamed chunk, in milliseconds")]
    pub stream_delay_ms: Option<u64>,

    #[arg(long, help = "HTTP timeout in seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 預設值 < 設定檔 < 命令列參數
    pub fn resolve_settings(&self) -> Result<DemoSettings> {
        let mut settings = DemoSettings::default();

        if let Some(path) = &self.config {
            settings = settings.merge_toml(&TomlConfig::from_file(path)?);
        }

        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if let Some(system_prompt) = &self.system_prompt {
            settings.system_prompt = system_prompt.clone();
        }
        if let Some(prompt) = &self.prompt {
            settings.prompt = prompt.clone();
        }
        if let Some(env) = &self.api_key_env {
            settings.api_key_env = env.clone();
        }
        if let Some(delay) = self.stream_delay_ms {
            settings.stream_delay_ms = delay;
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = timeout;
        }

        settings.validate()?;
        Ok(settings)
    }
}
