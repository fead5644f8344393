//! Checkpoint stack backing `undo`.
//!
//! # Responsibility
//! - Keep labelled, detached copies of book content and view filters.
//! - Hand back the most recent checkpoint on `undo` (LIFO).
//!
//! # Invariants
//! - Checkpoints are values; later store mutations never alter them.
//! - `undo` on an empty history fails with `NoMoreUndo` and changes nothing.
//! - With a limit set, the oldest checkpoint is dropped once the limit is
//!   exceeded; the newest is always kept.
//!
//! Taking a checkpoint before each mutating command is the caller's job; the
//! history itself cannot tell reads from writes.

use crate::model::error::{ModelError, ModelResult};
use crate::model::filter::ViewFilters;
use crate::model::food_book::FoodBookSnapshot;
use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// One restorable point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// Human-readable description of the command this checkpoint protects.
    pub label: String,
    pub data: FoodBookSnapshot,
    pub filters: ViewFilters,
}

/// Observable history state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    Empty,
    HasHistory,
}

/// Undo stack, optionally bounded.
#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    entries: VecDeque<Checkpoint>,
    limit: Option<NonZeroUsize>,
}

impl UndoHistory {
    /// Creates an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a history keeping at most `limit` checkpoints (`None` means
    /// unbounded).
    pub fn with_limit(limit: Option<NonZeroUsize>) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    pub fn limit(&self) -> Option<NonZeroUsize> {
        self.limit
    }

    /// Pushes a checkpoint. Never fails.
    pub fn checkpoint(
        &mut self,
        label: impl Into<String>,
        data: FoodBookSnapshot,
        filters: ViewFilters,
    ) {
        self.push_unbounded(label, data, filters);
        self.enforce_limit();
    }

    /// Pushes without dropping old entries; pair with `enforce_limit` or
    /// `discard_latest`.
    pub(crate) fn push_unbounded(
        &mut self,
        label: impl Into<String>,
        data: FoodBookSnapshot,
        filters: ViewFilters,
    ) {
        self.entries.push_back(Checkpoint {
            label: label.into(),
            data,
            filters,
        });
    }

    /// Drops the oldest entries until the limit holds.
    pub(crate) fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            while self.entries.len() > limit.get() {
                self.entries.pop_front();
            }
        }
    }

    /// Pops the most recent checkpoint.
    pub fn undo(&mut self) -> ModelResult<Checkpoint> {
        self.entries.pop_back().ok_or(ModelError::NoMoreUndo)
    }

    /// Drops the most recent checkpoint without restoring it.
    pub(crate) fn discard_latest(&mut self) -> Option<Checkpoint> {
        self.entries.pop_back()
    }

    /// Label of the checkpoint `undo` would return next.
    pub fn peek_label(&self) -> Option<&str> {
        self.entries.back().map(|entry| entry.label.as_str())
    }

    /// Labels from oldest to newest.
    pub fn labels(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.label.as_str())
            .collect()
    }

    pub fn state(&self) -> HistoryState {
        if self.entries.is_empty() {
            HistoryState::Empty
        } else {
            HistoryState::HasHistory
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{HistoryState, UndoHistory};
    use crate::model::error::ModelError;
    use crate::model::filter::{ClientFilter, ViewFilters};
    use crate::model::food_book::FoodBookSnapshot;
    use std::num::NonZeroUsize;

    #[test]
    fn undo_on_empty_history_fails() {
        let mut history = UndoHistory::new();
        assert_eq!(history.state(), HistoryState::Empty);
        assert_eq!(history.undo().unwrap_err(), ModelError::NoMoreUndo);
    }

    #[test]
    fn undo_is_lifo_and_returns_to_empty() {
        let mut history = UndoHistory::new();
        history.checkpoint("first", FoodBookSnapshot::default(), ViewFilters::default());
        let filters = ViewFilters {
            client: ClientFilter::NameKeywords(vec!["bob".to_string()]),
            ..ViewFilters::default()
        };
        history.checkpoint("second", FoodBookSnapshot::default(), filters.clone());
        assert_eq!(history.state(), HistoryState::HasHistory);
        assert_eq!(history.peek_label(), Some("second"));

        let latest = history.undo().unwrap();
        assert_eq!(latest.label, "second");
        assert_eq!(latest.filters, filters);
        assert_eq!(history.undo().unwrap().label, "first");
        assert_eq!(history.state(), HistoryState::Empty);
    }

    #[test]
    fn bounded_history_drops_oldest() {
        let mut history = UndoHistory::with_limit(NonZeroUsize::new(2));
        for label in ["a", "b", "c"] {
            history.checkpoint(label, FoodBookSnapshot::default(), ViewFilters::default());
        }
        assert_eq!(history.labels(), vec!["b", "c"]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn unbounded_push_keeps_oldest_until_limit_is_enforced() {
        let mut history = UndoHistory::with_limit(NonZeroUsize::new(2));
        for label in ["a", "b"] {
            history.checkpoint(label, FoodBookSnapshot::default(), ViewFilters::default());
        }

        history.push_unbounded("c", FoodBookSnapshot::default(), ViewFilters::default());
        assert_eq!(history.labels(), vec!["a", "b", "c"]);
        history.discard_latest();
        assert_eq!(history.labels(), vec!["a", "b"]);

        history.push_unbounded("d", FoodBookSnapshot::default(), ViewFilters::default());
        history.enforce_limit();
        assert_eq!(history.labels(), vec!["b", "d"]);
    }
}
