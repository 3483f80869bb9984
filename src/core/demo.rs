use crate::config::settings::DemoSettings;
use crate::core::display;
use crate::domain::ports::AiService;
use crate::utils::error::{DemoError, Result};
use std::future::Future;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoStep {
    Balance,
    Models,
    StreamingChat,
    CompleteChat,
}

impl DemoStep {
    pub const ALL: [DemoStep; 4] = [
        DemoStep::Balance,
        DemoStep::Models,
        DemoStep::StreamingChat,
        DemoStep::CompleteChat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DemoStep::Balance => "balance",
            DemoStep::Models => "models",
            DemoStep::StreamingChat => "streaming_chat",
            DemoStep::CompleteChat => "complete_chat",
        }
    }

    /// 步驟失敗時在主控台顯示的前綴
    pub fn failure_label(self) -> &'static str {
        match self {
            DemoStep::Balance => "Erro ao obter saldo",
            DemoStep::Models => "Erro ao listar modelos",
            DemoStep::StreamingChat => "Erro durante a streaming",
            DemoStep::CompleteChat => "Erro ao gerar resposta",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub step: DemoStep,
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(Vec<StepOutcome>),
    Cancelled,
    ValidationFailed(String),
    Fatal(String),
}

impl RunOutcome {
    /// 步驟失敗不影響結束碼，只有整體流程中止才算失敗
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed(_) => 0,
            RunOutcome::ValidationFailed(_) | RunOutcome::Fatal(_) => 1,
            RunOutcome::Cancelled => 130,
        }
    }
}

/// Runs the fixed demonstration sequence and writes everything to `out`.
///
/// Each step has its own failure boundary: an error is printed as a
/// warning and the next step still runs. Only credential validation,
/// client construction and interruption end the run early, and the
/// closing banner is written in every case.
pub struct DemoRunner<W: Write> {
    out: W,
    settings: DemoSettings,
}

impl<W: Write> DemoRunner<W> {
    pub fn new(out: W, settings: DemoSettings) -> Self {
        Self { out, settings }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub async fn run<A, K, B, I>(
        &mut self,
        resolve_key: K,
        build_client: B,
        interrupt: I,
    ) -> RunOutcome
    where
        A: AiService,
        K: Future<Output = Result<String>>,
        B: FnOnce(String) -> Result<A>,
        I: Future<Output = ()>,
    {
        if let Err(e) = display::render_header(&mut self.out) {
            tracing::warn!("Failed to write header: {}", e);
        }

        let outcome = tokio::select! {
            biased;
            _ = interrupt => RunOutcome::Cancelled,
            outcome = self.session(resolve_key, build_client) => outcome,
        };

        if let Err(e) = self.report(&outcome) {
            tracing::warn!("Failed to write run summary: {}", e);
        }
        if let Err(e) = display::render_footer(&mut self.out) {
            tracing::warn!("Failed to write footer: {}", e);
        }

        outcome
    }

    async fn session<A, K, B>(&mut self, resolve_key: K, build_client: B) -> RunOutcome
    where
        A: AiService,
        K: Future<Output = Result<String>>,
        B: FnOnce(String) -> Result<A>,
    {
        let api_key = match resolve_key.await {
            Ok(key) => key,
            Err(DemoError::ValidationError { message }) => {
                tracing::error!("❌ Credential validation failed: {}", message);
                return RunOutcome::ValidationFailed(message);
            }
            Err(e) => {
                tracing::error!("❌ Credential resolution failed: {}", e);
                return RunOutcome::Fatal(e.to_string());
            }
        };

        let client = match build_client(api_key) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("❌ Client construction failed: {}", e);
                tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                return RunOutcome::Fatal(e.to_string());
            }
        };

        tracing::info!("✅ Client initialized");
        if let Err(e) = writeln!(self.out, "\n✅ Cliente MuffinsCorp inicializado com sucesso!") {
            return RunOutcome::Fatal(e.to_string());
        }

        RunOutcome::Completed(self.run_steps(&client).await)
    }

    /// 依序執行所有步驟，單一步驟失敗只記錄不中止
    pub async fn run_steps<A: AiService>(&mut self, client: &A) -> Vec<StepOutcome> {
        let mut outcomes = Vec::with_capacity(DemoStep::ALL.len());

        for step in DemoStep::ALL {
            tracing::debug!("Running step {}", step.name());
            let result = match step {
                DemoStep::Balance => self.show_balance(client).await,
                DemoStep::Models => self.list_models(client).await,
                DemoStep::StreamingChat => self.streaming_chat(client).await,
                DemoStep::CompleteChat => self.complete_chat(client).await,
            };

            let error = match result {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Step {} failed: {} (Category: {:?})",
                        step.name(),
                        e,
                        e.category()
                    );
                    tracing::debug!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                    if let Err(io_err) = writeln!(self.out, "\n⚠️ {}: {}", step.failure_label(), e)
                    {
                        tracing::warn!("Failed to write step error: {}", io_err);
                    }
                    Some(e.to_string())
                }
            };

            outcomes.push(StepOutcome { step, error });
        }

        outcomes
    }

    async fn show_balance<A: AiService>(&mut self, client: &A) -> Result<()> {
        let balance = client.get_balance().await?;
        display::render_balance(&mut self.out, &balance)?;
        Ok(())
    }

    async fn list_models<A: AiService>(&mut self, client: &A) -> Result<()> {
        let models = client.list_models().await?;
        tracing::info!("Listed {} models", models.len());
        display::render_models(&mut self.out, &models)?;
        Ok(())
    }

    async fn streaming_chat<A: AiService>(&mut self, client: &A) -> Result<()> {
        writeln!(self.out, "\n🌀 Gerando resposta (streaming)...")?;
        write!(self.out, "\n💬 Resposta: ")?;
        self.out.flush()?;

        let request = self.settings.chat_request().streaming(true);
        let chunks = client.chat_stream(&request).await?;
        let printed =
            display::render_stream(&mut self.out, chunks, self.settings.stream_delay()).await?;
        tracing::debug!("Streamed {} chunks", printed);

        writeln!(self.out, "\n")?;
        Ok(())
    }

    async fn complete_chat<A: AiService>(&mut self, client: &A) -> Result<()> {
        writeln!(self.out, "\n🔄 Gerando resposta (completa)...")?;

        let request = self.settings.chat_request();
        let response = client.chat_create(&request).await?;
        display::render_chat_response(&mut self.out, &response)?;
        Ok(())
    }

    fn report(&mut self, outcome: &RunOutcome) -> std::io::Result<()> {
        match outcome {
            RunOutcome::Completed(steps) => {
                let failed = steps.iter().filter(|s| !s.succeeded()).count();
                tracing::info!(
                    "Demo finished: {} steps, {} failed",
                    steps.len(),
                    failed
                );
                Ok(())
            }
            RunOutcome::Cancelled => {
                tracing::info!("Demo cancelled by user");
                writeln!(self.out, "\n\n⏹️ Operação cancelada pelo usuário.")
            }
            RunOutcome::ValidationFailed(message) => {
                writeln!(self.out, "\n❌ Erro de validação: {}", message)
            }
            RunOutcome::Fatal(message) => writeln!(self.out, "\n❌ Erro fatal: {}", message),
        }
    }
}
