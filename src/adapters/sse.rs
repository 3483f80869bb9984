use crate::domain::model::StreamChunk;

/// 串流結束標記
pub const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    pub event_type: Option<String>,
    pub data: String,
}

/// 逐段累積位元組並切出完整事件
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
    // 區塊結尾的 \r 可能是 \r\n 的前半，等下一段再決定
    pending_cr: bool,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &str) -> Vec<SseEvent> {
        let mut text = String::with_capacity(chunk.len() + 1);
        if std::mem::take(&mut self.pending_cr) {
            text.push('\r');
        }
        text.push_str(chunk);
        if text.ends_with('\r') {
            text.pop();
            self.pending_cr = true;
        }

        // \r\n、\n、\r 都是行尾，統一成 \n 才找得到空行分隔
        self.buffer
            .push_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.find("\n\n") {
            let block: String = self.buffer.drain(..pos + 2).collect();
            if let Some(event) = Self::parse_block(&block[..pos]) {
                events.push(event);
            }
        }

        events
    }

    /// 連線結束時處理最後一段沒有空行結尾的事件
    pub fn finish(&mut self) -> Option<SseEvent> {
        self.pending_cr = false;
        let rest = std::mem::take(&mut self.buffer);
        Self::parse_block(rest.trim_end_matches('\n'))
    }

    fn parse_block(block: &str) -> Option<SseEvent> {
        let mut event_type = None;
        let mut data_lines = Vec::new();

        for line in block.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.starts_with(':') {
                continue;
            }

            if let Some((field, value)) = line.split_once(':') {
                let value = value.strip_prefix(' ').unwrap_or(value);
                match field {
                    "event" => event_type = Some(value.to_string()),
                    "data" => data_lines.push(value.to_string()),
                    _ => {}
                }
            } else if line == "data" {
                data_lines.push(String::new());
            }
        }

        if data_lines.is_empty() {
            return None;
        }

        Some(SseEvent {
            event_type,
            data: data_lines.join("\n"),
        })
    }
}

/// 將一個 `data:` 內容轉成片段；遇到結束標記回傳 `None`
pub fn decode_chunk(data: &str) -> Option<StreamChunk> {
    let trimmed = data.trim();
    if trimmed == DONE_MARKER {
        return None;
    }

    // 純文字的數字或 true/false 也要原樣顯示，只有結構化內容才當 JSON 解析
    if !trimmed.starts_with(['{', '[', '"']) {
        return Some(StreamChunk::Text(data.to_string()));
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => Some(StreamChunk::from(value)),
        Err(_) => Some(StreamChunk::Text(data.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_event() {
        let mut parser = SseParser::new();
        let events = parser.feed("event: chunk\ndata: {\"text\":\"Hi\"}\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type.as_deref(), Some("chunk"));
        assert_eq!(events[0].data, "{\"text\":\"Hi\"}");
    }

    #[test]
    fn test_partial_event() {
        let mut parser = SseParser::new();
        assert!(parser.feed("data: {\"te").is_empty());
        let events = parser.feed("xt\":\"Hi\"}\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "{\"text\":\"Hi\"}");
    }

    #[test]
    fn test_crlf_and_comments() {
        let mut parser = SseParser::new();
        let events = parser.feed(": keep-alive\r\n\r\ndata: one\r\n\r\ndata: two\r\n\r\n");
        let data: Vec<&str> = events.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(data, vec!["one", "two"]);
    }

    #[test]
    fn test_crlf_split_across_feeds() {
        let mut parser = SseParser::new();
        assert!(parser.feed("data: a\r\n\r").is_empty());
        let events = parser.feed("\ndata: b\r\n\r\n");
        let data: Vec<&str> = events.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(data, vec!["a", "b"]);

        let mut parser = SseParser::new();
        assert!(parser.feed("data: a\r").is_empty());
        let events = parser.feed("\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "a");
    }

    #[test]
    fn test_bare_cr_line_endings() {
        let mut parser = SseParser::new();
        let events = parser.feed("data: one\r\rdata: two\r\r\n");
        let data: Vec<&str> = events.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(data, vec!["one", "two"]);
    }

    #[test]
    fn test_multiline_data() {
        let mut parser = SseParser::new();
        let events = parser.feed("data: line one\ndata: line two\n\n");
        assert_eq!(events[0].data, "line one\nline two");
    }

    #[test]
    fn test_finish_flushes_trailing_event() {
        let mut parser = SseParser::new();
        assert!(parser.feed("data: tail\n").is_empty());
        assert_eq!(parser.finish().unwrap().data, "tail");
        assert!(parser.finish().is_none());
    }

    #[test]
    fn test_decode_chunk() {
        assert_eq!(
            decode_chunk("{\"text\":\"Hi\"}"),
            Some(StreamChunk::from(json!({"text": "Hi"})))
        );
        assert_eq!(
            decode_chunk("\" there\""),
            Some(StreamChunk::Text(" there".to_string()))
        );
        assert_eq!(
            decode_chunk("plain words"),
            Some(StreamChunk::Text("plain words".to_string()))
        );
        assert_eq!(
            decode_chunk("42"),
            Some(StreamChunk::Text("42".to_string()))
        );
        assert_eq!(decode_chunk("[DONE]"), None);
    }
}
