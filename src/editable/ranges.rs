//! Multi-caret support: the collection of active selection ranges.
//!
//! Edits run one range at a time. Before each range runs, every other range
//! only exists as a position snapshot; after it runs, those snapshots are
//! pushed through the actions it recorded. That keeps later carets on the
//! same line at the right column no matter how earlier carets changed it.

use std::collections::HashSet;

use super::buffer::{LineBuffer, LineId};
use super::context::EditContext;
use super::cursor::{Cursor, Position};
use super::history::{CaretState, EditAction, RangeEdit, RangeSnapshot};
use super::selection::SelectionRange;

/// Order in which ranges are visited by [`SelectionRangeCollection::apply_edit_to_all`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrder {
    /// Top of the document first (insertions)
    Ascending,
    /// Bottom of the document first (deletions)
    Descending,
}

/// One or more carets; never empty.
#[derive(Debug, Clone)]
pub struct SelectionRangeCollection {
    ranges: Vec<SelectionRange>,
    /// Index of the primary range
    primary: usize,
}

impl SelectionRangeCollection {
    pub fn new(range: SelectionRange) -> Self {
        Self {
            ranges: vec![range],
            primary: 0,
        }
    }

    /// Single caret at the document start
    pub fn at_start(buffer: &LineBuffer) -> Self {
        Self::new(SelectionRange::new(Cursor::start_of(buffer)))
    }

    pub fn count(&self) -> usize {
        self.ranges.len()
    }

    pub fn ranges(&self) -> &[SelectionRange] {
        &self.ranges
    }

    pub fn primary_index(&self) -> usize {
        self.primary
    }

    pub fn primary(&self) -> &SelectionRange {
        &self.ranges[self.primary]
    }

    pub fn primary_mut(&mut self) -> &mut SelectionRange {
        &mut self.ranges[self.primary]
    }

    /// # Panics
    /// If `index` is out of bounds.
    pub fn get(&self, index: usize) -> &SelectionRange {
        match self.ranges.get(index) {
            Some(range) => range,
            None => panic!(
                "caret index {} out of bounds ({} carets)",
                index,
                self.ranges.len()
            ),
        }
    }

    /// Replace all ranges with one
    pub fn set_single(&mut self, range: SelectionRange) {
        self.ranges.clear();
        self.ranges.push(range);
        self.primary = 0;
    }

    /// Add a range, which becomes the primary one, then merge overlaps
    pub fn add_range(&mut self, buffer: &LineBuffer, range: SelectionRange) {
        self.ranges.push(range);
        self.primary = self.ranges.len() - 1;
        self.resolve_overlapping_ranges(buffer);
    }

    /// Remove a range. The last remaining range cannot be removed.
    pub fn remove_range(&mut self, index: usize) -> Option<SelectionRange> {
        if self.ranges.len() < 2 || index >= self.ranges.len() {
            return None;
        }
        let removed = self.ranges.remove(index);
        if self.primary > index || self.primary == self.ranges.len() {
            self.primary = self.primary.saturating_sub(1);
        }
        Some(removed)
    }

    /// Drop every range but the primary one
    pub fn collapse_to_primary(&mut self) -> bool {
        if self.ranges.len() == 1 {
            return false;
        }
        let primary = self.ranges[self.primary];
        self.set_single(primary);
        true
    }

    /// Lines holding at least one head
    pub fn distinct_line_count(&self) -> usize {
        self.ranges
            .iter()
            .map(|range| range.head().line())
            .collect::<HashSet<LineId>>()
            .len()
    }

    /// Apply a non-editing operation to every range, then merge overlaps.
    /// Returns whether any range reported a change.
    pub fn apply_to_all<F>(&mut self, buffer: &LineBuffer, mut op: F) -> bool
    where
        F: FnMut(&mut SelectionRange) -> bool,
    {
        let mut changed = false;
        for range in &mut self.ranges {
            changed |= op(range);
        }
        self.resolve_overlapping_ranges(buffer);
        changed
    }

    /// Apply a text-mutating operation to every range in `order`.
    ///
    /// `op` receives the visit rank (0 for the first range visited), the
    /// range, and the edit context, and returns the actions it recorded. The
    /// other ranges are corrected through those actions before the next
    /// range runs. Returns one entry per range that changed text.
    pub fn apply_edit_to_all<F>(
        &mut self,
        ctx: &mut EditContext<'_>,
        order: EditOrder,
        mut op: F,
    ) -> Vec<RangeEdit>
    where
        F: FnMut(usize, &mut SelectionRange, &mut EditContext<'_>) -> Vec<EditAction>,
    {
        self.resolve_overlapping_ranges(ctx.buffer);
        let table = ctx.buffer.table();
        let mut snapshots: Vec<RangeSnapshot> =
            self.ranges.iter().map(|range| range.snapshot(&table)).collect();

        let visit: Vec<usize> = match order {
            EditOrder::Ascending => (0..snapshots.len()).collect(),
            EditOrder::Descending => (0..snapshots.len()).rev().collect(),
        };

        let mut entries = Vec::new();
        for (rank, &index) in visit.iter().enumerate() {
            let before = snapshots[index];
            let mut range = SelectionRange::from_snapshot(ctx.buffer, &before);
            let actions = op(rank, &mut range, ctx);
            let after = range.snapshot_in(ctx.buffer);
            snapshots[index] = after;
            if actions.is_empty() {
                continue;
            }

            for (other, snapshot) in snapshots.iter_mut().enumerate() {
                if other != index {
                    snapshot.transform(&actions);
                }
            }
            entries.push(RangeEdit {
                before,
                after,
                actions,
            });
        }

        self.ranges = snapshots
            .iter()
            .map(|snapshot| SelectionRange::from_snapshot(ctx.buffer, snapshot))
            .collect();
        self.resolve_overlapping_ranges(ctx.buffer);
        entries
    }

    /// Sort ranges by start and merge any that overlap or touch.
    /// The merged range is primary if either part was.
    pub fn resolve_overlapping_ranges(&mut self, buffer: &LineBuffer) {
        for range in &mut self.ranges {
            range.normalize();
        }
        if self.ranges.len() < 2 {
            self.primary = 0;
            return;
        }

        let table = buffer.table();
        let mut items: Vec<(RangeSnapshot, SelectionRange, bool)> = self
            .ranges
            .iter()
            .enumerate()
            .map(|(i, range)| (range.snapshot(&table), *range, i == self.primary))
            .collect();
        items.sort_by_key(|(snapshot, _, _)| (snapshot.start(), snapshot.end()));

        let mut merged: Vec<(RangeSnapshot, SelectionRange, bool)> = Vec::with_capacity(items.len());
        for (snapshot, range, is_primary) in items {
            match merged.last_mut() {
                Some((last, last_range, last_primary)) if snapshot.start() <= last.end() => {
                    *last = last.merge(&snapshot);
                    *last_range = SelectionRange::from_snapshot(buffer, last);
                    *last_primary |= is_primary;
                }
                _ => merged.push((snapshot, range, is_primary)),
            }
        }

        if merged.len() < self.ranges.len() {
            tracing::trace!(
                before = self.ranges.len(),
                after = merged.len(),
                "Merged overlapping carets"
            );
        }
        self.primary = merged
            .iter()
            .position(|(_, _, is_primary)| *is_primary)
            .unwrap_or(0);
        self.ranges = merged.into_iter().map(|(_, range, _)| range).collect();
    }

    /// Position copy of every range
    pub fn caret_state(&self, buffer: &LineBuffer) -> CaretState {
        let table = buffer.table();
        CaretState {
            ranges: self.ranges.iter().map(|range| range.snapshot(&table)).collect(),
            primary: self.primary,
        }
    }

    /// Rebuild every range from a position copy
    pub fn restore(&mut self, buffer: &LineBuffer, state: &CaretState) {
        self.ranges = state
            .ranges
            .iter()
            .map(|snapshot| SelectionRange::from_snapshot(buffer, snapshot))
            .collect();
        if self.ranges.is_empty() {
            self.ranges.push(SelectionRange::new(Cursor::start_of(buffer)));
        }
        self.primary = state.primary.min(self.ranges.len() - 1);
    }

    /// Head positions in collection order
    pub fn head_positions(&self, buffer: &LineBuffer) -> Vec<Position> {
        let table = buffer.table();
        self.ranges
            .iter()
            .map(|range| Position::new(table.ordinal(range.head().line()), range.head().column()))
            .collect()
    }
}
