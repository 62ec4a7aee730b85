//! Cost Accounting
//!
//! Aggregates token usage across a batch of units and prices it. Pricing is
//! looked up by the *currently selected* model, not the model a unit was
//! generated with: switching models re-prices historical usage.

use serde::Serialize;

use super::pricing::PricingTable;
use super::stream::TokenUsage;
use crate::types::Result;

/// Aggregate usage and cost
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub model: String,
    /// Units that reported usage
    pub units: usize,
    pub total_prompt_tokens: u64,
    pub total_completion_tokens: u64,
    pub total_tokens: u64,
    pub total_cost: f64,
}

impl CostSummary {
    /// Summarize every defined usage record under one model's prices
    pub fn summarize<'a, I>(usages: I, model: &str, pricing: &PricingTable) -> Result<Self>
    where
        I: IntoIterator<Item = &'a TokenUsage>,
    {
        let prices = pricing.get(model)?;
        let mut summary = Self {
            model: model.to_string(),
            ..Default::default()
        };
        for usage in usages {
            summary.units += 1;
            summary.total_prompt_tokens += usage.prompt_tokens;
            summary.total_completion_tokens += usage.completion_tokens;
            summary.total_tokens += usage.total_tokens;
            summary.total_cost += prices.cost(usage);
        }
        Ok(summary)
    }

    pub fn is_empty(&self) -> bool {
        self.units == 0
    }

    /// Format summary for display
    pub fn display(&self) -> String {
        format!(
            "Model: {}\n\
             Input Tokens: {}\n\
             Output Tokens: {}\n\
             Total Tokens: {}\n\
             Total Cost: ${:.6}",
            self.model,
            self.total_prompt_tokens,
            self.total_completion_tokens,
            self.total_tokens,
            self.total_cost
        )
    }
}
