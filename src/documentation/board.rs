//! Unit Board
//!
//! Immutable snapshot of one generation batch. Every transition is a pure
//! function from the latest board to the next one, applied through a
//! [`StateCell`](crate::types::StateCell).

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::unit::{Unit, UnitId, UnitStatus};
use crate::ai::provider::GenerationMode;
use crate::ai::stream::TokenUsage;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitBoard {
    pub batch_id: Option<Uuid>,
    pub mode: Option<GenerationMode>,
    pub units: Vec<Unit>,
}

impl Default for UnitBoard {
    fn default() -> Self {
        Self::empty()
    }
}

impl UnitBoard {
    /// Board before any generation was invoked
    pub fn empty() -> Self {
        Self {
            batch_id: None,
            mode: None,
            units: Vec::new(),
        }
    }

    /// Fresh batch with every unit pending
    pub fn new(mode: GenerationMode, ids: impl IntoIterator<Item = UnitId>) -> Self {
        Self {
            batch_id: Some(Uuid::new_v4()),
            mode: Some(mode),
            units: ids.into_iter().map(Unit::pending).collect(),
        }
    }

    pub fn get(&self, id: &UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| &u.id == id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn statuses(&self) -> Vec<&UnitStatus> {
        self.units.iter().map(|u| &u.status).collect()
    }

    pub fn generating_count(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Generating))
    }

    pub fn completed_count(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Completed))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Error(_)))
    }

    fn count(&self, pred: impl Fn(&UnitStatus) -> bool) -> usize {
        self.units.iter().filter(|u| pred(&u.status)).count()
    }

    /// First unit still waiting for dispatch
    pub fn next_pending(&self) -> Option<&UnitId> {
        self.units
            .iter()
            .find(|u| u.status == UnitStatus::Pending)
            .map(|u| &u.id)
    }

    /// Every unit reached a terminal state
    pub fn is_finished(&self) -> bool {
        self.units.iter().all(|u| u.status.is_terminal())
    }

    /// Defined usage records, in unit order
    pub fn usages(&self) -> impl Iterator<Item = &TokenUsage> {
        self.units.iter().filter_map(|u| u.usage.as_ref())
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    fn with_unit(&self, id: &UnitId, apply: impl FnOnce(&mut Unit)) -> Self {
        let mut next = self.clone();
        if let Some(unit) = next.units.iter_mut().find(|u| &u.id == id) {
            apply(unit);
        }
        next
    }

    /// pending → generating; content is reset
    pub fn start(&self, id: &UnitId) -> Self {
        self.with_unit(id, |unit| {
            unit.status = UnitStatus::Generating;
            unit.content.clear();
            unit.started_at = Some(Utc::now());
        })
    }

    /// Replace the visible content with the latest accumulation
    pub fn update_content(&self, id: &UnitId, content: &str) -> Self {
        self.with_unit(id, |unit| {
            unit.content.clear();
            unit.content.push_str(content);
        })
    }

    /// Content plus usage; a unit keeps its first usage record
    pub fn record_usage(&self, id: &UnitId, content: &str, usage: TokenUsage) -> Self {
        self.with_unit(id, |unit| {
            unit.content.clear();
            unit.content.push_str(content);
            unit.usage.get_or_insert(usage);
        })
    }

    /// generating → completed with the final content
    pub fn complete(&self, id: &UnitId, content: &str) -> Self {
        self.with_unit(id, |unit| {
            unit.status = UnitStatus::Completed;
            unit.content.clear();
            unit.content.push_str(content);
            unit.finished_at = Some(Utc::now());
        })
    }

    /// → error(message); partial content is kept
    pub fn fail(&self, id: &UnitId, message: impl Into<String>) -> Self {
        let message = message.into();
        self.with_unit(id, |unit| {
            unit.status = UnitStatus::Error(message);
            unit.finished_at = Some(Utc::now());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Vec<UnitId> {
        vec![UnitId::file("a.ts"), UnitId::file("b.ts")]
    }

    #[test]
    fn test_new_batch_is_pending() {
        let board = UnitBoard::new(GenerationMode::Single, ids());
        assert!(board.batch_id.is_some());
        assert_eq!(board.next_pending(), Some(&UnitId::file("a.ts")));
        assert!(!board.is_finished());
        assert_eq!(board.generating_count(), 0);
    }

    #[test]
    fn test_transitions_are_pure() {
        let board = UnitBoard::new(GenerationMode::Single, ids());
        let a = UnitId::file("a.ts");
        let started = board.start(&a);

        assert_eq!(board.get(&a).unwrap().status, UnitStatus::Pending);
        assert_eq!(started.get(&a).unwrap().status, UnitStatus::Generating);
        assert_eq!(started.next_pending(), Some(&UnitId::file("b.ts")));
    }

    #[test]
    fn test_usage_set_once() {
        let a = UnitId::file("a.ts");
        let board = UnitBoard::new(GenerationMode::Single, ids())
            .start(&a)
            .record_usage(&a, "x", TokenUsage::new(1, 1))
            .record_usage(&a, "xy", TokenUsage::new(5, 5));
        let unit = board.get(&a).unwrap();
        assert_eq!(unit.usage, Some(TokenUsage::new(1, 1)));
        assert_eq!(unit.content, "xy");
    }

    #[test]
    fn test_fail_keeps_partial_content() {
        let a = UnitId::file("a.ts");
        let board = UnitBoard::new(GenerationMode::Single, ids())
            .start(&a)
            .update_content(&a, "partial")
            .fail(&a, "boom");
        let unit = board.get(&a).unwrap();
        assert_eq!(unit.error_message(), Some("boom"));
        assert_eq!(unit.content, "partial");
        assert!(unit.elapsed().is_some());
        assert_eq!(board.failed_count(), 1);
    }
}
