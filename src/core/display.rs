//! Console rendering for every demonstration step.
//!
//! All functions write to any [`Write`] so the output can be captured in
//! tests. Missing fields never fail rendering: they show [`PLACEHOLDER`].

use crate::domain::model::{display_value, ChatItem, ChatResponse, Payload, PLACEHOLDER};
use crate::domain::ports::ChunkStream;
use crate::utils::error::Result;
use chrono::NaiveDateTime;
use futures::StreamExt;
use std::io::{self, Write};
use std::time::Duration;

const API_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const BANNER_WIDTH: usize = 50;

/// 解析失敗時原樣回傳，沒有值時回傳佔位字串
pub fn format_date(date: Option<&str>) -> String {
    let Some(date) = date else {
        return PLACEHOLDER.to_string();
    };

    match NaiveDateTime::parse_from_str(date, API_DATE_FORMAT) {
        Ok(parsed) => parsed.format(DISPLAY_DATE_FORMAT).to_string(),
        Err(_) => date.to_string(),
    }
}

fn date_field(payload: &Payload, key: &str) -> String {
    match payload.get(key) {
        Some(value) if value.is_string() => format_date(value.as_str()),
        Some(value) => display_value(value),
        None => format_date(None),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Sim"
    } else {
        "Não"
    }
}

fn banner<W: Write + ?Sized>(out: &mut W, title: &str) -> io::Result<()> {
    let rule = "=".repeat(BANNER_WIDTH);
    writeln!(out)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "{:^width$}", title, width = BANNER_WIDTH)?;
    writeln!(out, "{}", rule)
}

pub fn render_header<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    banner(out, "  DEMONSTRAÇÃO DA BIBLIOTECA MUFFINS-AI  ")
}

pub fn render_footer<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    banner(out, "  FIM DA DEMONSTRAÇÃO  ")?;
    writeln!(out)?;
    out.flush()
}

pub fn render_balance<W: Write + ?Sized>(out: &mut W, response: &Payload) -> io::Result<()> {
    if !response.flag("success") {
        writeln!(out, "\n⚠️ Não foi possível obter o saldo")?;
        return Ok(());
    }

    let balance = response.object("balance").unwrap_or_default();

    writeln!(out, "\n🔹 Saldo de Créditos:")?;
    writeln!(out, "  • Total: {}", balance.display("totalBalance"))?;
    writeln!(out, "  • Regular: {}", balance.display("regularBalance"))?;
    writeln!(out, "  • Diário: {}", balance.display("dailyBalance"))?;
    writeln!(
        out,
        "  • Tem crédito diário? {}",
        yes_no(balance.flag("hasDailyCredit"))
    )?;

    let credits = balance.objects("credits");
    if !credits.is_empty() {
        writeln!(out, "\n  💳 Créditos individuais:")?;
        for credit in &credits {
            writeln!(out, "    - ID: {}", credit.display("id"))?;
            writeln!(
                out,
                "      Valor: {} (usados: {})",
                credit.display("amount"),
                credit.display("usedAmount")
            )?;
            writeln!(out, "      Tipo: {}", credit.display("type"))?;
            writeln!(out, "      Expira em: {}", date_field(credit, "expiresAt"))?;
        }
    }

    if let Some(daily) = balance.object("dailyCredit") {
        writeln!(out, "\n  🌞 Crédito diário:")?;
        writeln!(out, "    - Concedido: {}", daily.display("grantedAmount"))?;
        writeln!(out, "    - Disponível: {}", daily.display("amount"))?;
        writeln!(out, "    - Data: {}", daily.display("grantedDate"))?;
        writeln!(out, "    - Já usado? {}", yes_no(daily.flag("used")))?;
    }

    Ok(())
}

pub fn render_models<W: Write + ?Sized>(out: &mut W, models: &[Payload]) -> io::Result<()> {
    writeln!(out, "\n📊 Modelos disponíveis:")?;

    if models.is_empty() {
        writeln!(out, "  Nenhum modelo disponível")?;
        return Ok(());
    }

    for (idx, model) in models.iter().enumerate() {
        writeln!(
            out,
            "  {}. {} (ID: {})",
            idx + 1,
            model.display("name"),
            model.display("id")
        )?;
        writeln!(out, "     Tipo: {}", model.display("type"))?;
        writeln!(
            out,
            "     Custo: {} créditos por uso",
            model.display("costInCreditPerUse")
        )?;
        writeln!(out, "     Máx tokens: {}", model.display("max_tokens"))?;
        writeln!(out, "     Ativo? {}", yes_no(model.flag("isActive")))?;
        writeln!(out, "     Criado em: {}\n", date_field(model, "createdAt"))?;
    }

    Ok(())
}

fn render_message<W: Write + ?Sized>(
    out: &mut W,
    message: &Payload,
    leading_blank: bool,
) -> io::Result<()> {
    if leading_blank {
        writeln!(out)?;
    }
    writeln!(out, "ID: {}", message.display("id"))?;
    writeln!(out, "Conteúdo: {}", message.display("content"))?;
    writeln!(out, "Modelo usado: {}", message.display("model"))?;
    writeln!(out, "Créditos usados: {}", message.display("creditsUsed"))?;
    writeln!(
        out,
        "Créditos restantes: {}",
        message.display("creditsRemaining")
    )?;
    writeln!(out, "Criado em: {}", date_field(message, "createdAt"))
}

pub fn render_chat_response<W: Write + ?Sized>(
    out: &mut W,
    response: &ChatResponse,
) -> io::Result<()> {
    writeln!(out, "\n💬 Resposta completa:")?;

    match response {
        ChatResponse::Message(message) => render_message(out, message, false),
        ChatResponse::Text(text) => writeln!(out, "Conteúdo: {}", text),
        ChatResponse::Batch(items) => {
            for item in items {
                match item {
                    ChatItem::Message(message) => render_message(out, message, true)?,
                    ChatItem::Other(value) => {
                        writeln!(out, "Item da resposta: {}", display_value(value))?
                    }
                }
            }
            Ok(())
        }
        ChatResponse::Unexpected(value) => writeln!(
            out,
            "Resposta recebida em formato não esperado: {}",
            display_value(value)
        ),
    }
}

/// 邊收邊印，每個片段後暫停 `delay`；回傳實際印出的片段數
pub async fn render_stream<W: Write + ?Sized>(
    out: &mut W,
    mut chunks: ChunkStream,
    delay: Duration,
) -> Result<usize> {
    let mut printed = 0;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        if let Some(text) = chunk.text() {
            write!(out, "{}", text)?;
            out.flush()?;
            printed += 1;
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    Ok(printed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::StreamChunk;
    use crate::utils::error::DemoError;
    use futures::stream;
    use serde_json::{json, Value};

    fn payload(value: Value) -> Payload {
        Payload::try_from(value).unwrap()
    }

    fn rendered(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_date() {
        assert_eq!(
            format_date(Some("2025-03-14T09:26:53Z")),
            "14/03/2025 09:26:53"
        );
        assert_eq!(format_date(Some("14/03/2025")), "14/03/2025");
        assert_eq!(
            format_date(Some("2025-03-14T09:26:53.123Z")),
            "2025-03-14T09:26:53.123Z"
        );
        assert_eq!(format_date(Some("N/A")), "N/A");
        assert_eq!(format_date(None), PLACEHOLDER);
    }

    #[test]
    fn test_render_balance_full() {
        let response = payload(json!({
            "success": true,
            "balance": {
                "totalBalance": 150,
                "regularBalance": 100,
                "dailyBalance": 50,
                "hasDailyCredit": true,
                "credits": [{
                    "id": "cr_1",
                    "amount": 100,
                    "usedAmount": 20,
                    "type": "purchase",
                    "expiresAt": "2025-12-31T23:59:59Z"
                }],
                "dailyCredit": {
                    "grantedAmount": 50,
                    "amount": 50,
                    "grantedDate": "2025-03-14",
                    "used": false
                }
            }
        }));

        let text = rendered(|out| render_balance(out, &response));
        assert!(text.contains("  • Total: 150"));
        assert!(text.contains("  • Tem crédito diário? Sim"));
        assert!(text.contains("    - ID: cr_1"));
        assert!(text.contains("      Valor: 100 (usados: 20)"));
        assert!(text.contains("      Expira em: 31/12/2025 23:59:59"));
        assert!(text.contains("    - Data: 2025-03-14"));
        assert!(text.contains("    - Já usado? Não"));
    }

    #[test]
    fn test_render_balance_missing_fields_use_placeholder() {
        let response = payload(json!({"success": true, "balance": {"credits": [{}]}}));

        let text = rendered(|out| render_balance(out, &response));
        assert!(text.contains("  • Total: N/A"));
        assert!(text.contains("  • Regular: N/A"));
        assert!(text.contains("  • Diário: N/A"));
        assert!(text.contains("  • Tem crédito diário? Não"));
        assert!(text.contains("    - ID: N/A"));
        assert!(text.contains("      Expira em: N/A"));
        assert!(!text.contains("Crédito diário:"));
    }

    #[test]
    fn test_render_balance_unsuccessful() {
        let text = rendered(|out| render_balance(out, &payload(json!({"success": false}))));
        assert_eq!(text, "\n⚠️ Não foi possível obter o saldo\n");

        let text = rendered(|out| render_balance(out, &Payload::default()));
        assert!(text.contains("Não foi possível obter o saldo"));
    }

    #[test]
    fn test_render_models() {
        let models = vec![
            payload(json!({
                "name": "Chat Small",
                "id": "chat-model-small",
                "type": "chat",
                "costInCreditPerUse": 1,
                "max_tokens": 4096,
                "isActive": true,
                "createdAt": "2024-01-02T03:04:05Z"
            })),
            payload(json!({"id": "bare"})),
        ];

        let text = rendered(|out| render_models(out, &models));
        assert!(text.contains("  1. Chat Small (ID: chat-model-small)"));
        assert!(text.contains("     Custo: 1 créditos por uso"));
        assert!(text.contains("     Ativo? Sim"));
        assert!(text.contains("     Criado em: 02/01/2024 03:04:05"));
        assert!(text.contains("  2. N/A (ID: bare)"));
        assert!(text.contains("     Máx tokens: N/A"));
        assert!(text.contains("     Criado em: N/A"));
    }

    #[test]
    fn test_render_models_empty() {
        let text = rendered(|out| render_models(out, &[]));
        assert!(text.contains("  Nenhum modelo disponível"));
    }

    #[test]
    fn test_render_chat_response_text() {
        let response = ChatResponse::Text("Hello".to_string());
        let text = rendered(|out| render_chat_response(out, &response));
        assert!(text.contains("Conteúdo: Hello"));
    }

    #[test]
    fn test_render_chat_response_message_missing_fields() {
        let response = ChatResponse::from(json!({"content": "Olá"}));
        let text = rendered(|out| render_chat_response(out, &response));
        assert!(text.contains("ID: N/A"));
        assert!(text.contains("Conteúdo: Olá"));
        assert!(text.contains("Créditos restantes: N/A"));
        assert!(text.contains("Criado em: N/A"));
    }

    #[test]
    fn test_render_chat_response_batch() {
        let response = ChatResponse::from(json!([
            {
                "id": "r1",
                "content": "primeira",
                "model": "chat-model-small",
                "creditsUsed": 1,
                "creditsRemaining": 99,
                "createdAt": "2025-03-14T09:26:53Z"
            },
            {
                "id": "r2",
                "content": "segunda",
                "model": "chat-model-small",
                "creditsUsed": 2,
                "creditsRemaining": 97,
                "createdAt": "not a date"
            },
            "solto"
        ]));

        let text = rendered(|out| render_chat_response(out, &response));
        assert!(text.contains("\nID: r1\nConteúdo: primeira\nModelo usado: chat-model-small"));
        assert!(text.contains("Créditos restantes: 99\nCriado em: 14/03/2025 09:26:53"));
        assert!(text.contains("\nID: r2\nConteúdo: segunda"));
        assert!(text.contains("Créditos usados: 2\nCréditos restantes: 97\nCriado em: not a date"));
        assert!(text.contains("Item da resposta: solto"));
    }

    #[test]
    fn test_render_chat_response_unexpected() {
        let response = ChatResponse::from(json!(3.5));
        let text = rendered(|out| render_chat_response(out, &response));
        assert!(text.contains("Resposta recebida em formato não esperado: 3.5"));
    }

    #[tokio::test]
    async fn test_render_stream_concatenates_pieces() {
        let chunks: ChunkStream = stream::iter(vec![
            Ok(StreamChunk::from(json!({"text": "Hi"}))),
            Ok(StreamChunk::from(json!({"text": " there"}))),
            Ok(StreamChunk::Text(String::new())),
        ])
        .boxed();

        let mut out = Vec::new();
        let printed = render_stream(&mut out, chunks, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Hi there");
        assert_eq!(printed, 2);
    }

    #[tokio::test]
    async fn test_render_stream_stops_on_error() {
        let chunks: ChunkStream = stream::iter(vec![
            Ok(StreamChunk::Text("parcial".to_string())),
            Err(DemoError::StreamError {
                message: "connection reset".to_string(),
            }),
            Ok(StreamChunk::Text("nunca".to_string())),
        ])
        .boxed();

        let mut out = Vec::new();
        let result = render_stream(&mut out, chunks, Duration::ZERO).await;
        assert!(matches!(result, Err(DemoError::StreamError { .. })));
        assert_eq!(String::from_utf8(out).unwrap(), "parcial");
    }

    #[test]
    fn test_banners() {
        let text = rendered(|out| {
            render_header(out)?;
            render_footer(out)
        });
        assert!(text.starts_with("\n=================================================="));
        assert!(text.contains("DEMONSTRAÇÃO DA BIBLIOTECA MUFFINS-AI"));
        assert!(text.contains("FIM DA DEMONSTRAÇÃO"));
        assert!(text.ends_with("==================================================\n\n"));
    }
}
