//! Event Stream Decoding
//!
//! Wire format: newline-delimited `data: <json>` records separated by blank
//! lines. Chunks may split a record anywhere (including inside a multi-byte
//! character), so bytes are buffered until a full line is available.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::stream::{DATA_PREFIX, DONE_SENTINEL};
use crate::types::DocError;

/// Token accounting record, sent once near stream end
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// One decoded event envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Content { content: String },
    Usage { usage: TokenUsage },
    Error { error: String },
    Done,
}

impl StreamEvent {
    /// Encode as a wire record (`data: <json>\n\n`)
    pub fn to_record(&self) -> String {
        // Serializing a plain enum of strings and integers cannot fail.
        let json = serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"));
        format!("{} {}\n\n", DATA_PREFIX, json)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::Done)
    }
}

/// Byte buffer that releases complete lines.
///
/// Decoding to text happens per line, so a multi-byte character split across
/// chunks is never mangled.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every completed line (terminator stripped)
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // The retained tail never holds a newline, so only new bytes are searched.
        let searched = self.buffer.len();
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        for (offset, byte) in self.buffer[searched..].iter().enumerate() {
            if *byte == b'\n' {
                let end = searched + offset;
                lines.push(to_line(&self.buffer[start..=end]));
                start = end + 1;
            }
        }
        self.buffer.drain(..start);
        lines
    }

    /// Remaining unterminated text, if any
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.buffer);
        Some(to_line(&raw))
    }
}

fn to_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}

/// Incremental event decoder over raw response chunks
#[derive(Debug, Default)]
pub struct StreamDecoder {
    lines: LineBuffer,
    malformed: usize,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a raw chunk, returning every event completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.lines
            .push(chunk)
            .into_iter()
            .filter_map(|line| self.decode_line(&line))
            .collect()
    }

    /// Decode whatever remains once the input is exhausted
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let line = self.lines.finish()?;
        self.decode_line(&line)
    }

    /// Number of records discarded as malformed so far
    pub fn malformed_count(&self) -> usize {
        self.malformed
    }

    fn decode_line(&mut self, line: &str) -> Option<StreamEvent> {
        match parse_line(line) {
            Ok(event) => event,
            Err(e) => {
                self.malformed += 1;
                warn!("Error parsing chunk: {}", e);
                None
            }
        }
    }
}

/// Parse one complete line.
///
/// `Ok(None)` for blank lines, non-data lines and the `[DONE]` sentinel.
pub fn parse_line(line: &str) -> Result<Option<StreamEvent>, DocError> {
    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        if !line.trim().is_empty() {
            debug!("Ignoring non-data line: {}", line);
        }
        return Ok(None);
    };

    let data = data.trim();
    if data.is_empty() || data == DONE_SENTINEL {
        return Ok(None);
    }

    serde_json::from_str(data)
        .map(Some)
        .map_err(|e| DocError::Decode {
            line: data.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_envelopes() {
        assert_eq!(
            parse_line(r#"data: {"type":"content","content":"hi"}"#).unwrap(),
            Some(StreamEvent::Content {
                content: "hi".into()
            })
        );
        assert_eq!(
            parse_line(
                r#"data: {"type":"usage","usage":{"promptTokens":3,"completionTokens":4,"totalTokens":7}}"#
            )
            .unwrap(),
            Some(StreamEvent::Usage {
                usage: TokenUsage::new(3, 4)
            })
        );
        assert_eq!(
            parse_line(r#"data: {"type":"done"}"#).unwrap(),
            Some(StreamEvent::Done)
        );
        assert_eq!(parse_line("data: [DONE]").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
        assert!(parse_line("data: {not json").is_err());
    }

    #[test]
    fn test_line_buffer_strips_terminators() {
        let mut lines = LineBuffer::new();
        assert_eq!(lines.push(b"one\r\ntw"), vec!["one".to_string()]);
        assert_eq!(lines.push(b"o\n\n"), vec!["two".to_string(), String::new()]);
        assert_eq!(lines.finish(), None);
    }

    #[test]
    fn test_line_buffer_drains_many_lines_from_one_chunk() {
        let mut lines = LineBuffer::new();
        assert!(lines.push(b"head").is_empty());

        let mut chunk = b"-0\n".to_vec();
        for i in 1..5_000 {
            chunk.extend_from_slice(format!("line-{}\n", i).as_bytes());
        }
        chunk.extend_from_slice(b"tail");

        let drained = lines.push(&chunk);
        assert_eq!(drained.len(), 5_000);
        assert_eq!(drained[0], "head-0");
        assert_eq!(drained[4_999], "line-4999");
        assert_eq!(lines.push(b"\n"), vec!["tail".to_string()]);
        assert_eq!(lines.finish(), None);
    }

    #[test]
    fn test_split_record_is_buffered() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.push(br#"data: {"type":"con"#).is_empty());
        assert!(decoder.push(br#"tent","content":"ab"}"#).is_empty());
        let events = decoder.push(b"\n\ndata: {\"type\":\"done\"}\n\n");
        assert_eq!(
            events,
            vec![
                StreamEvent::Content {
                    content: "ab".into()
                },
                StreamEvent::Done
            ]
        );
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let record = "data: {\"type\":\"content\",\"content\":\"é\"}\n".as_bytes();
        let split = record.iter().position(|b| *b == 0xc3).unwrap() + 1;
        let mut decoder = StreamDecoder::new();
        assert!(decoder.push(&record[..split]).is_empty());
        let events = decoder.push(&record[split..]);
        assert_eq!(
            events,
            vec![StreamEvent::Content {
                content: "é".into()
            }]
        );
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let mut decoder = StreamDecoder::new();
        let events = decoder.push(
            b"data: {\"type\":\"content\",\"content\":\"a\"}\n\
              data: {broken\n\
              data: {\"type\":\"content\",\"content\":\"b\"}\n",
        );
        assert_eq!(events.len(), 2);
        assert_eq!(decoder.malformed_count(), 1);
    }

    #[test]
    fn test_finish_decodes_unterminated_line() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.push(br#"data: {"type":"done"}"#).is_empty());
        assert_eq!(decoder.finish(), Some(StreamEvent::Done));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_record_encoding() {
        let record = StreamEvent::Error {
            error: "boom".into(),
        }
        .to_record();
        assert_eq!(record, "data: {\"type\":\"error\",\"error\":\"boom\"}\n\n");
    }
}
