//! Stream Consumption
//!
//! Drives a [`StreamDecoder`] over a byte stream and applies the delivery
//! policy: content deltas are accumulated and coalesced behind a
//! [`Debouncer`], a `usage` envelope flushes immediately, and every terminal
//! path (done, error, end of input) flushes a pending update first.

use futures::{Stream, StreamExt};
use std::time::Duration;
use tracing::{debug, warn};

use super::debounce::Debouncer;
use super::decoder::{StreamDecoder, StreamEvent, TokenUsage};
use crate::types::{DocError, Result};

/// Externally observable update for the unit being generated
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    /// Full accumulated content so far
    Content(String),
    /// Accumulated content together with the usage record
    Usage { content: String, usage: TokenUsage },
}

/// Final state of one consumed stream
#[derive(Debug)]
pub struct StreamSummary {
    pub content: String,
    pub usage: Option<TokenUsage>,
    /// `Ok` when a `done` envelope was received
    pub outcome: Result<()>,
    pub malformed_records: usize,
}

impl StreamSummary {
    pub fn is_completed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Per-request stream consumer
pub struct StreamConsumer {
    decoder: StreamDecoder,
    debouncer: Debouncer,
    content: String,
    usage: Option<TokenUsage>,
}

enum Step {
    Continue,
    Finished(Result<()>),
}

impl StreamConsumer {
    pub fn new(debounce: Duration) -> Self {
        Self {
            decoder: StreamDecoder::new(),
            debouncer: Debouncer::new(debounce),
            content: String::new(),
            usage: None,
        }
    }

    /// Consume the stream to a terminal state, reporting updates as they are released
    pub async fn consume<S, F>(mut self, stream: S, mut on_update: F) -> StreamSummary
    where
        S: Stream<Item = Result<Vec<u8>>> + Unpin,
        F: FnMut(StreamUpdate),
    {
        let mut stream = stream;
        let outcome = loop {
            tokio::select! {
                chunk = stream.next() => match chunk {
                    Some(Ok(bytes)) => {
                        if let Step::Finished(result) = self.push(&bytes, &mut on_update) {
                            break result;
                        }
                    }
                    Some(Err(e)) => {
                        warn!("Stream read failed: {}", e);
                        self.flush(&mut on_update);
                        break Err(e);
                    }
                    None => {
                        if let Some(event) = self.decoder.finish()
                            && let Step::Finished(result) = self.apply(event, &mut on_update)
                        {
                            break result;
                        }
                        self.flush(&mut on_update);
                        break Err(DocError::Stream("stream ended before completion".to_string()));
                    }
                },
                _ = self.debouncer.fired() => {
                    on_update(StreamUpdate::Content(self.content.clone()));
                }
            }
        };

        StreamSummary {
            content: self.content,
            usage: self.usage,
            outcome,
            malformed_records: self.decoder.malformed_count(),
        }
    }

    fn push<F: FnMut(StreamUpdate)>(&mut self, bytes: &[u8], on_update: &mut F) -> Step {
        for event in self.decoder.push(bytes) {
            if let Step::Finished(result) = self.apply(event, on_update) {
                return Step::Finished(result);
            }
        }
        Step::Continue
    }

    fn apply<F: FnMut(StreamUpdate)>(&mut self, event: StreamEvent, on_update: &mut F) -> Step {
        match event {
            StreamEvent::Content { content } => {
                self.content.push_str(&content);
                self.debouncer.schedule();
                Step::Continue
            }
            StreamEvent::Usage { usage } => {
                if self.usage.is_some() {
                    warn!("Ignoring repeated usage record");
                    return Step::Continue;
                }
                self.debouncer.cancel();
                self.usage = Some(usage);
                on_update(StreamUpdate::Usage {
                    content: self.content.clone(),
                    usage,
                });
                Step::Continue
            }
            StreamEvent::Error { error } => {
                self.flush(on_update);
                Step::Finished(Err(DocError::ServiceReported(error)))
            }
            StreamEvent::Done => {
                self.flush(on_update);
                debug!("Stream done ({} chars)", self.content.len());
                Step::Finished(Ok(()))
            }
        }
    }

    /// Emit a pending coalesced update now
    fn flush<F: FnMut(StreamUpdate)>(&mut self, on_update: &mut F) {
        if self.debouncer.cancel() {
            on_update(StreamUpdate::Content(self.content.clone()));
        }
    }
}
