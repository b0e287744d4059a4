use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Authoritative per-question answer store for one attempt.
///
/// There is exactly one sheet per attempt and every read goes through a
/// synchronous accessor on it, so a read scheduled from a clock callback
/// always observes the most recent write. No second copy of answer state is
/// ever kept for asynchronous readers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    entries: BTreeMap<usize, String>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the answer for a question, overwriting any previous value.
    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        self.entries.insert(index, value.into());
    }

    /// Removes the answer for a question, returning the previous value.
    pub fn clear(&mut self, index: usize) -> Option<String> {
        self.entries.remove(&index)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn is_answered(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    /// Number of questions with a recorded answer.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Immutable, index-ordered copy of the sheet taken at call time.
    ///
    /// Submission payloads are built from a snapshot taken synchronously
    /// right before the network call, never from state captured when a
    /// callback was registered.
    #[must_use]
    pub fn snapshot(&self) -> AnswerSnapshot {
        AnswerSnapshot {
            entries: self.entries.clone(),
        }
    }
}

/// Frozen copy of an [`AnswerSheet`], used as the submission payload.
///
/// Serializes as a JSON object keyed by question index, matching the
/// gateway's `answers` shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSnapshot {
    entries: BTreeMap<usize, String>,
}

impl AnswerSnapshot {
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries.iter().map(|(index, value)| (*index, value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_unconditionally() {
        let mut sheet = AnswerSheet::new();
        sheet.set(2, "A");
        sheet.set(2, "C");
        assert_eq!(sheet.get(2), Some("C"));
        assert_eq!(sheet.answered_count(), 1);
    }

    #[test]
    fn snapshot_is_frozen_while_sheet_moves_on() {
        let mut sheet = AnswerSheet::new();
        sheet.set(0, "A");
        let snap = sheet.snapshot();
        sheet.set(0, "B");
        sheet.set(1, "C");

        assert_eq!(snap.get(0), Some("A"));
        assert_eq!(snap.len(), 1);
        // A fresh snapshot sees the latest writes.
        let snap2 = sheet.snapshot();
        assert_eq!(snap2.get(0), Some("B"));
        assert_eq!(snap2.get(1), Some("C"));
    }

    #[test]
    fn clear_removes_entry() {
        let mut sheet = AnswerSheet::new();
        sheet.set(5, "True");
        assert_eq!(sheet.clear(5), Some("True".to_string()));
        assert!(!sheet.is_answered(5));
        assert!(sheet.is_empty());
    }

    #[test]
    fn snapshot_serializes_with_string_keys() {
        let mut sheet = AnswerSheet::new();
        sheet.set(0, "A");
        sheet.set(3, "False");
        let json = serde_json::to_value(sheet.snapshot()).unwrap();
        assert_eq!(json["0"], "A");
        assert_eq!(json["3"], "False");
    }
}
