//! OpenAI Generation Service
//!
//! Builds the mode-specific chat prompt, streams a chat completion and
//! re-encodes it into event records: one `content` record per delta, a
//! `usage` record when the API reports it, then `done`. A failure after the
//! stream has started becomes an in-band `error` record.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{ByteStream, GenerationRequest, GenerationService, ServiceConfig};
use crate::ai::prompt::PromptTemplates;
use crate::ai::stream::{LineBuffer, StreamEvent, TokenUsage};
use crate::ai::tokenizer::{self, TokenCounter};
use crate::constants::stream::{DATA_PREFIX, DONE_SENTINEL};
use crate::types::{DocError, Result};

const STREAM_ERROR_MESSAGE: &str = "Streaming error occurred";

/// OpenAI chat completions service with secure API key handling
pub struct OpenAiGenerationService {
    /// Never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    temperature: f32,
    client: reqwest::Client,
    counter: TokenCounter,
}

impl std::fmt::Debug for OpenAiGenerationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGenerationService")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAiGenerationService {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                DocError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| DocError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            client,
            counter: TokenCounter::new(),
        })
    }

    fn build_request(&self, request: &GenerationRequest) -> ChatCompletionRequest {
        let system = PromptTemplates::system(request);
        let user = PromptTemplates::user_message(request);

        let prompt_messages = [
            tokenizer::ChatMessage {
                role: "system",
                content: &system,
            },
            tokenizer::ChatMessage {
                role: "user",
                content: &user,
            },
        ];
        let remaining = self
            .counter
            .max_completion_tokens(&request.model, &prompt_messages);
        if remaining == 0 {
            warn!(
                "Prompt likely exceeds the context window of {}",
                request.model
            );
        }

        ChatCompletionRequest {
            model: request.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            temperature: self.temperature,
            stream: true,
            stream_options: StreamOptions {
                include_usage: true,
            },
        }
    }
}

#[async_trait]
impl GenerationService for OpenAiGenerationService {
    async fn generate(&self, request: &GenerationRequest) -> Result<ByteStream> {
        info!(
            "Starting request for {} (model: {})",
            request.target_file.as_deref().unwrap_or(request.mode.as_str()),
            request.model
        );

        let body = self.build_request(request);
        let url = format!("{}/chat/completions", self.api_base);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DocError::transport(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocError::request_failed(
                status.as_u16(),
                format!("OpenAI API error ({}): {}", status, body),
            ));
        }

        debug!("Receiving completion chunks");
        let upstream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(DocError::from));
        Ok(translate_completion_stream(upstream))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// =============================================================================
// Stream Translation
// =============================================================================

struct Translation {
    upstream: futures::stream::BoxStream<'static, Result<Vec<u8>>>,
    lines: LineBuffer,
    pending: VecDeque<String>,
    usage: Option<TokenUsage>,
    chunks: usize,
    content_len: usize,
    finished: bool,
}

impl Translation {
    fn handle_line(&mut self, line: &str) -> Result<()> {
        let Some(data) = line.strip_prefix(DATA_PREFIX) else {
            return Ok(());
        };
        let data = data.trim();
        if data.is_empty() || data == DONE_SENTINEL {
            return Ok(());
        }

        let chunk: ChatCompletionChunk = serde_json::from_str(data)?;
        self.chunks += 1;

        if let Some(content) = chunk
            .choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .filter(|c| !c.is_empty())
        {
            self.content_len += content.len();
            self.pending.push_back(
                StreamEvent::Content {
                    content: content.to_string(),
                }
                .to_record(),
            );
        }

        if let Some(usage) = chunk.usage {
            self.usage = Some(TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            });
        }
        Ok(())
    }

    fn fail(&mut self, error: DocError) {
        warn!("Stream error: {}", error);
        self.pending.push_back(
            StreamEvent::Error {
                error: STREAM_ERROR_MESSAGE.to_string(),
            }
            .to_record(),
        );
        self.finished = true;
    }

    fn complete(&mut self) {
        if let Some(usage) = self.usage {
            info!(
                "Generation complete: {} chunks, {} prompt + {} completion tokens, {} chars",
                self.chunks, usage.prompt_tokens, usage.completion_tokens, self.content_len
            );
            self.pending
                .push_back(StreamEvent::Usage { usage }.to_record());
        }
        self.pending.push_back(StreamEvent::Done.to_record());
        self.finished = true;
    }
}

/// Re-encode an OpenAI completion SSE body as event records
pub fn translate_completion_stream<S>(upstream: S) -> ByteStream
where
    S: Stream<Item = Result<Vec<u8>>> + Send + 'static,
{
    let state = Translation {
        upstream: upstream.boxed(),
        lines: LineBuffer::new(),
        pending: VecDeque::new(),
        usage: None,
        chunks: 0,
        content_len: 0,
        finished: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(record) = state.pending.pop_front() {
                return Some((Ok(record.into_bytes()), state));
            }
            if state.finished {
                return None;
            }

            match state.upstream.next().await {
                Some(Ok(bytes)) => {
                    for line in state.lines.push(&bytes) {
                        if let Err(e) = state.handle_line(&line) {
                            state.fail(e);
                            break;
                        }
                    }
                }
                Some(Err(e)) => state.fail(e),
                None => match state.lines.finish().map(|line| state.handle_line(&line)) {
                    Some(Err(e)) => state.fail(e),
                    _ => state.complete(),
                },
            }
        }
    })
    .boxed()
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
    stream_options: StreamOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::GenerationMode;
    use crate::ai::stream::StreamDecoder;
    use futures::stream;

    fn delta(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    async fn decode(output: ByteStream) -> Vec<StreamEvent> {
        let chunks: Vec<Result<Vec<u8>>> = output.collect().await;
        let mut decoder = StreamDecoder::new();
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.push(&chunk.unwrap()));
        }
        events
    }

    #[tokio::test]
    async fn test_translates_deltas_usage_and_done() {
        let mut wire = delta("Hel");
        wire.push_str(&delta("lo"));
        wire.push_str(
            "data: {\"choices\":[],\"usage\":{\"prompt_tokens\":12,\"completion_tokens\":2,\"total_tokens\":14}}\n\n",
        );
        wire.push_str("data: [DONE]\n\n");

        // split mid-record
        let bytes = wire.into_bytes();
        let (a, b) = bytes.split_at(17);
        let upstream = stream::iter(vec![Ok(a.to_vec()), Ok(b.to_vec())]);

        let events = decode(translate_completion_stream(upstream)).await;
        assert_eq!(
            events,
            vec![
                StreamEvent::Content {
                    content: "Hel".into()
                },
                StreamEvent::Content {
                    content: "lo".into()
                },
                StreamEvent::Usage {
                    usage: TokenUsage::new(12, 2)
                },
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_becomes_error_record() {
        let upstream = stream::iter(vec![
            Ok(delta("partial").into_bytes()),
            Err(DocError::transport("connection reset")),
        ]);

        let events = decode(translate_completion_stream(upstream)).await;
        assert_eq!(
            events.last(),
            Some(&StreamEvent::Error {
                error: STREAM_ERROR_MESSAGE.into()
            })
        );
        assert!(!events.contains(&StreamEvent::Done));
    }

    #[tokio::test]
    async fn test_unparsable_chunk_becomes_error_record() {
        let upstream = stream::iter(vec![Ok(b"data: {oops\n\n".to_vec())]);
        let events = decode(translate_completion_stream(upstream)).await;
        assert_eq!(events.len(), 1);
        assert!(events[0].is_terminal());
    }

    #[test]
    fn test_build_request_streams_with_usage() {
        let service = OpenAiGenerationService::new(ServiceConfig {
            api_key: Some("sk-test".into()),
            ..Default::default()
        })
        .unwrap();

        let request = service.build_request(&GenerationRequest {
            files: "fn main() {}".into(),
            target_file: None,
            mode: GenerationMode::Single,
            model: "gpt-4o-mini".into(),
            file_structure: None,
        });
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], true);
        assert_eq!(json["stream_options"]["include_usage"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert!(
            json["messages"][1]["content"]
                .as_str()
                .unwrap()
                .ends_with("fn main() {}")
        );
        assert!(!format!("{:?}", service).contains("sk-test"));
    }
}
