pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::adapters::http::{ClientOptions, MuffinsClient};
pub use crate::config::settings::DemoSettings;
pub use crate::core::demo::{DemoRunner, DemoStep, RunOutcome, StepOutcome};
pub use crate::domain::ports::AiService;
pub use crate::utils::error::{DemoError, Result};
