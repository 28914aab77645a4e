//! Bounded undo/redo log of whole-slide snapshots.

use crate::element::{ElementData, ElementId, TransformData};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of snapshots kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Geometry of one element inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub id: ElementId,
    #[serde(flatten)]
    pub transform: TransformData,
}

/// Geometry of every element on a slide, in slide order.
///
/// Entries are immutable once built; undo and redo only move the cursor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryEntry {
    items: Vec<SnapshotItem>,
}

impl HistoryEntry {
    /// Capture the current geometry of `slide`.
    pub fn from_slide(slide: &[ElementData]) -> Self {
        Self {
            items: slide
                .iter()
                .map(|element| SnapshotItem {
                    id: element.id.clone(),
                    transform: element.transform(),
                })
                .collect(),
        }
    }

    pub fn items(&self) -> &[SnapshotItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Geometry of `id` in this snapshot.
    pub fn transform_of(&self, id: &str) -> Option<TransformData> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.transform)
    }

    /// Apply this snapshot to `slide`, matching elements by id.
    /// Elements missing from the snapshot are left untouched.
    pub fn restore(&self, slide: &[ElementData]) -> Vec<ElementData> {
        slide
            .iter()
            .map(|element| match self.transform_of(&element.id) {
                Some(transform) => element.with_transform(&transform),
                None => element.clone(),
            })
            .collect()
    }
}

/// Linear history with a movable cursor.
///
/// Pushing while the cursor is behind the newest entry discards the redo
/// branch. When full, the oldest entry is evicted.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<HistoryEntry>,
    /// Index of the entry reflecting the current document state.
    cursor: Option<usize>,
    capacity: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryStack {
    /// Create an empty stack. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            cursor: None,
            capacity,
        }
    }

    /// Record a committed snapshot.
    pub fn push(&mut self, entry: HistoryEntry) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        } else {
            self.entries.clear();
        }
        self.entries.push_back(entry);

        if self.entries.len() > self.capacity {
            self.entries.pop_front();
            log::trace!("History full, evicted oldest snapshot");
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back one entry. Returns `None` at the earliest entry.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        let cursor = self.cursor.filter(|&cursor| cursor > 0)? - 1;
        self.cursor = Some(cursor);
        self.entries.get(cursor)
    }

    /// Step forward one entry. Returns `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let cursor = self.cursor? + 1;
        if cursor >= self.entries.len() {
            return None;
        }
        self.cursor = Some(cursor);
        self.entries.get(cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor
            .is_some_and(|cursor| cursor + 1 < self.entries.len())
    }

    /// Entry at the cursor.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}
