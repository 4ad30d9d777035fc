//! Minimal Server-Sent Events framing.
//!
//! Only the fields the lotlink server emits are understood: `id`, `event`
//! and `data`. Comment lines (keep-alives) are skipped.

/// One dispatched SSE message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseMessage {
    pub id: Option<String>,
    pub event: Option<String>,
    pub data: String,
}

/// Parse one SSE message block (the text between blank lines).
///
/// Returns `None` for blocks that carry no data, such as keep-alive comments.
pub fn parse_sse_message(block: &str) -> Option<SseMessage> {
    let mut message = SseMessage::default();
    let mut data_lines: Vec<&str> = Vec::new();

    for line in block.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => data_lines.push(value),
            "event" => message.event = Some(value.to_string()),
            "id" => message.id = Some(value.to_string()),
            _ => {}
        }
    }

    if data_lines.is_empty() {
        return None;
    }
    message.data = data_lines.join("\n");
    Some(message)
}

/// Accumulates raw stream bytes and yields complete messages.
///
/// Bytes are only decoded once a whole block has arrived, so a multi-byte
/// character split across network chunks stays intact.
#[derive(Debug, Default)]
pub struct SseBuffer {
    buffer: Vec<u8>,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete message it finishes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseMessage> {
        // CR never appears unescaped inside the JSON payloads, so dropping it
        // turns CRLF framing into LF even when the pair straddles two chunks.
        self.buffer.extend(chunk.iter().copied().filter(|&byte| byte != b'\r'));

        let mut messages = Vec::new();
        while let Some(pos) = self.buffer.windows(2).position(|pair| pair == b"\n\n") {
            let block: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            if let Some(message) = parse_sse_message(&String::from_utf8_lossy(&block)) {
                messages.push(message);
            }
        }
        messages
    }
}
