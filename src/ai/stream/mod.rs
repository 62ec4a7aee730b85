//! Streamed Response Handling
//!
//! Decoding of the `data: <json>` event protocol and the coalescing delivery
//! policy applied while a unit is generating.

pub mod consumer;
pub mod debounce;
pub mod decoder;

pub use consumer::{StreamConsumer, StreamSummary, StreamUpdate};
pub use debounce::Debouncer;
pub use decoder::{LineBuffer, StreamDecoder, StreamEvent, TokenUsage, parse_line};
