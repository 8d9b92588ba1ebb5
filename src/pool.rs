//! Skeleton pool: placeholder slot allocation and filling.
//!
//! The pool exclusively owns slot lifecycle. Indices are assigned
//! contiguously from 0, never renumbered, and every operation is additive.
//! Filling is idempotent and index-addressed, which is what makes stale
//! batches from an uncancellable in-flight fetch safe to apply.

use std::ops::Range;

use tracing::debug;

use crate::models::{ResultDomain, SearchResult};
use crate::render::Renderer;

/// Visual state of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Pending,
    Filled,
}

/// One placeholder slot plus the renderer's opaque handle for it.
#[derive(Debug)]
pub struct Slot<H> {
    pub index: usize,
    pub state: SlotState,
    pub handle: H,
}

/// Pre-allocated placeholder slots, indexed contiguously from 0.
#[derive(Debug, Default)]
pub struct SkeletonPool<H> {
    slots: Vec<Slot<H>>,
}

impl<H> SkeletonPool<H> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Running total of allocated slots; doubles as the next start index.
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots that have transitioned to filled.
    pub fn filled(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state == SlotState::Filled)
            .count()
    }

    pub fn slots(&self) -> &[Slot<H>] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&Slot<H>> {
        self.slots.get(index)
    }

    /// Append `count` pending slots at the next contiguous indices.
    /// Returns the index range that was created.
    pub fn allocate<R>(&mut self, count: usize, domain: ResultDomain, renderer: &mut R) -> Range<usize>
    where
        R: Renderer<Handle = H>,
    {
        let start = self.slots.len();
        for index in start..start + count {
            self.slots.push(Slot {
                index,
                state: SlotState::Pending,
                handle: renderer.create_slot(domain, index),
            });
        }
        debug!(start, count, "allocated skeleton slots");
        start..start + count
    }

    /// Fill the slot at `index`, creating it on the fly when the pool
    /// under-allocated relative to what the server returned. A second fill
    /// at the same index overwrites content in place.
    pub fn fill_at<R>(
        &mut self,
        index: usize,
        result: &SearchResult,
        domain: ResultDomain,
        renderer: &mut R,
    ) where
        R: Renderer<Handle = H>,
    {
        while self.slots.len() <= index {
            let next = self.slots.len();
            self.slots.push(Slot {
                index: next,
                state: SlotState::Pending,
                handle: renderer.create_slot(domain, next),
            });
        }

        let slot = &mut self.slots[index];
        renderer.fill_slot(&mut slot.handle, index, result);
        slot.state = SlotState::Filled;
    }

    /// Fill a whole batch at `cursor + idx` for each result position.
    /// Returns the batch length so the caller can advance its cursor.
    pub fn fill<R>(
        &mut self,
        results: &[SearchResult],
        cursor: usize,
        domain: ResultDomain,
        renderer: &mut R,
    ) -> usize
    where
        R: Renderer<Handle = H>,
    {
        for (idx, result) in results.iter().enumerate() {
            self.fill_at(cursor + idx, result, domain, renderer);
        }
        results.len()
    }
}
