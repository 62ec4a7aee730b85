//! Model Pricing
//!
//! Static per-model price table (USD per one million tokens).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::stream::TokenUsage;
use crate::constants::models::{DEFAULT_MODEL, PREMIUM_MODEL};
use crate::types::{DocError, Result};

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Prices for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub display_name: String,
    /// USD per 1M prompt tokens
    pub input_price: f64,
    /// USD per 1M completion tokens
    pub output_price: f64,
    #[serde(default)]
    pub description: String,
}

impl ModelPricing {
    pub fn new(display_name: impl Into<String>, input_price: f64, output_price: f64) -> Self {
        Self {
            display_name: display_name.into(),
            input_price,
            output_price,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Cost of one usage record under these prices
    pub fn cost(&self, usage: &TokenUsage) -> f64 {
        cost(usage, self)
    }

    /// `"GPT-4o Mini ($0.15/1M input, $0.6/1M output)"`
    pub fn rate_label(&self) -> String {
        format!(
            "{} (${}/1M input, ${}/1M output)",
            self.display_name, self.input_price, self.output_price
        )
    }
}

/// `prompt/1e6 * input + completion/1e6 * output`
pub fn cost(usage: &TokenUsage, pricing: &ModelPricing) -> f64 {
    usage.prompt_tokens as f64 / TOKENS_PER_MILLION * pricing.input_price
        + usage.completion_tokens as f64 / TOKENS_PER_MILLION * pricing.output_price
}

/// Model id → pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingTable {
    models: BTreeMap<String, ModelPricing>,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PricingTable {
    pub fn builtin() -> Self {
        let mut models = BTreeMap::new();
        models.insert(
            PREMIUM_MODEL.to_string(),
            ModelPricing::new("GPT-4o (Latest)", 2.50, 10.00)
                .with_description("Most capable model, best for complex tasks"),
        );
        models.insert(
            DEFAULT_MODEL.to_string(),
            ModelPricing::new("GPT-4o Mini", 0.150, 0.600)
                .with_description("Smaller, faster, and more cost-effective"),
        );
        Self { models }
    }

    pub fn empty() -> Self {
        Self {
            models: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, model: impl Into<String>, pricing: ModelPricing) {
        self.models.insert(model.into(), pricing);
    }

    pub fn get(&self, model: &str) -> Result<&ModelPricing> {
        self.models
            .get(model)
            .ok_or_else(|| DocError::UnknownModel(model.to_string()))
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelPricing)> {
        self.models.iter().map(|(id, p)| (id.as_str(), p))
    }
}
