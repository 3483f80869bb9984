use clap::Parser;
use muffins_demo::core::credentials;
use muffins_demo::utils::logger;
use muffins_demo::{CliConfig, DemoError, DemoRunner, MuffinsClient};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting muffins-demo");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let settings = match config.resolve_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.message());
            std::process::exit(2);
        }
    };

    let env_name = settings.api_key_env.clone();
    let client_options = settings.client_options();

    // 提示輸入會阻塞，放到 blocking 執行緒上才能同時等待 Ctrl-C
    let resolve_key = async move {
        tokio::task::spawn_blocking(move || credentials::resolve_from_terminal(&env_name))
            .await
            .map_err(|e| DemoError::IoError(std::io::Error::other(e)))?
    };

    let mut runner = DemoRunner::new(std::io::stdout(), settings);
    let outcome = runner
        .run(
            resolve_key,
            move |api_key| MuffinsClient::new(api_key, client_options),
            interrupted(),
        )
        .await;

    // 等待中的 stdin 讀取不會自行結束，直接離開行程
    std::process::exit(outcome.exit_code());
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
