//! Breakpoint bookkeeping

use std::cell::OnceCell;
use std::collections::BTreeSet;

use indexmap::IndexSet;

use crate::syntax::Offset;

/// Offsets that have been reached as statements.
///
/// An offset only becomes a valid break location once evaluation reaches
/// it. Range queries run against a sorted copy that is rebuilt lazily after
/// new offsets arrive.
#[derive(Debug, Default)]
pub struct BreakLocations {
    seen: IndexSet<Offset>,
    sorted: OnceCell<Vec<Offset>>,
}

impl BreakLocations {
    /// No locations yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `offset` was reached.
    pub fn record(&mut self, offset: Offset) {
        if self.seen.insert(offset) {
            self.sorted.take();
        }
    }

    /// Check if `offset` has been reached.
    pub fn contains(&self, offset: Offset) -> bool {
        self.seen.contains(&offset)
    }

    /// Number of distinct offsets reached.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if nothing has been reached yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Offsets in the order they were first reached.
    pub fn discovery_order(&self) -> impl Iterator<Item = Offset> + '_ {
        self.seen.iter().copied()
    }

    /// Sorted locations in `start..=end`.
    pub fn range(&self, start: Offset, end: Offset) -> &[Offset] {
        let sorted = self.sorted.get_or_init(|| {
            let mut offsets: Vec<Offset> = self.seen.iter().copied().collect();
            offsets.sort_unstable();
            offsets
        });
        let lo = sorted.partition_point(|o| *o < start);
        let hi = sorted.partition_point(|o| *o <= end).max(lo);
        &sorted[lo..hi]
    }
}

/// Offsets that currently have a breakpoint set.
#[derive(Debug, Clone, Default)]
pub struct Breakpoints {
    set: BTreeSet<Offset>,
}

impl Breakpoints {
    /// No breakpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a breakpoint at each offset.
    pub fn set(&mut self, offsets: impl IntoIterator<Item = Offset>) {
        self.set.extend(offsets);
    }

    /// Clear the given breakpoints, or all of them for `None`.
    pub fn clear(&mut self, offsets: Option<&[Offset]>) {
        match offsets {
            Some(offsets) => {
                for offset in offsets {
                    self.set.remove(offset);
                }
            }
            None => self.set.clear(),
        }
    }

    /// Check if `offset` has a breakpoint.
    pub fn contains(&self, offset: Offset) -> bool {
        self.set.contains(&offset)
    }

    /// Number of breakpoints.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Check if no breakpoint is set.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Breakpoints in `start..=end`, sorted.
    pub fn range(&self, start: Offset, end: Offset) -> Vec<Offset> {
        if start > end {
            return Vec::new();
        }
        self.set.range(start..=end).copied().collect()
    }

    /// Lowest and highest breakpoint.
    pub fn bounds(&self) -> Option<(Offset, Offset)> {
        Some((*self.set.first()?, *self.set.last()?))
    }
}
