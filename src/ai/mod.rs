//! AI Integration Layer
//!
//! Generation service contract, streamed response handling, prompts, token
//! estimation and cost accounting.

pub mod metrics;
pub mod pricing;
pub mod prompt;
pub mod provider;
pub mod stream;
pub mod tokenizer;

pub use metrics::CostSummary;
pub use pricing::{ModelPricing, PricingTable, cost};
pub use prompt::{PromptBuilder, PromptSection, PromptTemplates};
pub use provider::{
    ByteStream, GenerationMode, GenerationRequest, GenerationService, HttpGenerationService,
    OpenAiGenerationService, ServiceConfig, SharedService, create_service,
};
pub use stream::{
    Debouncer, StreamConsumer, StreamDecoder, StreamEvent, StreamSummary, StreamUpdate,
    TokenUsage,
};
pub use tokenizer::TokenCounter;
