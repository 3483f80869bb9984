use crate::utils::error::{DemoError, Result};
use std::io::{self, BufRead, Write};

pub const DEFAULT_API_KEY_ENV: &str = "MUFFINS_AI_API_KEY";

const MISSING_KEY_MESSAGE: &str = "A chave de API é obrigatória para continuar";

/// 先看環境變數，沒有再詢問使用者；最後仍為空白則視為驗證錯誤
pub fn resolve_api_key<P>(env_value: Option<String>, prompt: P) -> Result<String>
where
    P: FnOnce() -> io::Result<String>,
{
    if let Some(key) = env_value.filter(|v| !v.trim().is_empty()) {
        tracing::debug!("Using API key from environment");
        return Ok(key.trim().to_string());
    }

    let key = prompt()?.trim().to_string();
    if key.is_empty() {
        return Err(DemoError::ValidationError {
            message: MISSING_KEY_MESSAGE.to_string(),
        });
    }

    Ok(key)
}

/// 在給定的輸入輸出上提示使用者輸入金鑰
pub fn prompt_for_key<R, W>(env_name: &str, input: &mut R, out: &mut W) -> io::Result<String>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    writeln!(
        out,
        "\n🔐 AVISO: A variável de ambiente {} não está definida.",
        env_name
    )?;
    write!(out, "Por favor, insira sua chave de API: ")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line)
}

/// 從行程環境與標準輸入取得金鑰（會阻塞）
pub fn resolve_from_terminal(env_name: &str) -> Result<String> {
    let env_value = std::env::var(env_name).ok();
    resolve_api_key(env_value, || {
        prompt_for_key(env_name, &mut io::stdin().lock(), &mut io::stdout().lock())
    })
}
