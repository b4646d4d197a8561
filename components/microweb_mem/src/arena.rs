/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! A linear, chunked bump allocator (§4.1). Chunks hold `CHUNK_BYTES` worth
//! of `T`, bump-pointer style; a new chunk is pushed on overflow. A single
//! `reset()` returns every chunk to the free state without freeing the
//! backing `Vec`s, so repeat navigations reuse the allocation.
//!
//! Unlike the original C++ `LinearAllocator`, entries are addressed by an
//! `ArenaId<T>` rather than a raw pointer (see the "raw back-pointers → idx
//! handles" design note): the arena owns every `T` in a `Vec`, so there is
//! nothing to dangle when a chunk is reused after `reset()`.

use std::marker::PhantomData;
use std::mem::size_of;

/// Matches the arena's 16 KiB chunk size from the design spec.
const CHUNK_BYTES: usize = 16 * 1024;

/// An index into an [`Arena<T>`]. Stable for the lifetime of the page that
/// allocated it; invalidated (but not checked) by the next `reset()`.
pub struct ArenaId<T> {
    chunk: u32,
    slot: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ArenaId<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for ArenaId<T> {}

impl<T> std::fmt::Debug for ArenaId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaId")
            .field("chunk", &self.chunk)
            .field("slot", &self.slot)
            .finish()
    }
}

impl<T> PartialEq for ArenaId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.chunk == other.chunk && self.slot == other.slot
    }
}
impl<T> Eq for ArenaId<T> {}

impl<T> std::hash::Hash for ArenaId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.chunk.hash(state);
        self.slot.hash(state);
    }
}

/// How many `T` fit in one 16 KiB chunk. At least one slot per chunk even
/// for oversized `T`, matching the "allocation too large" case being a
/// sticky-error condition rather than an infinite loop.
const fn slots_per_chunk<T>() -> usize {
    let size = size_of::<T>();
    if size == 0 {
        // Zero-sized types never consume chunk space; pack a generous
        // number of slots so the chunk boundary logic below still holds.
        CHUNK_BYTES
    } else {
        let n = CHUNK_BYTES / size;
        if n == 0 {
            1
        } else {
            n
        }
    }
}

/// Arena overflow is reported once and stays set until `reset()`; it is
/// never fatal mid-parse (§7: "Arena overflow ... page is shown as
/// best-effort").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    pub chunks: usize,
    pub entries: usize,
    pub overflowed: bool,
}

/// Linear chunked bump allocator. One per page (document root) plus one for
/// the interface root, which is never reset.
pub struct Arena<T> {
    chunks: Vec<Vec<T>>,
    slots_per_chunk: usize,
    max_chunks: Option<usize>,
    overflowed: bool,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena {
            chunks: vec![Vec::with_capacity(slots_per_chunk::<T>())],
            slots_per_chunk: slots_per_chunk::<T>(),
            max_chunks: None,
            overflowed: false,
        }
    }

    /// Bounds total memory (`max_chunks * 16 KiB`) the way a constrained
    /// target would; allocation past the bound sets the sticky overflow
    /// flag and returns `None` instead of growing further.
    pub fn with_max_chunks(max_chunks: usize) -> Self {
        let mut arena = Self::new();
        arena.max_chunks = Some(max_chunks.max(1));
        arena
    }

    /// Bump-allocates `value`, pushing a new chunk if the current one is
    /// full. Returns `None` only once `max_chunks` (if any) is exhausted;
    /// the sticky `overflowed` flag is then set and stays set until the
    /// next `reset()`.
    pub fn alloc(&mut self, value: T) -> Option<ArenaId<T>> {
        let chunk_idx = self.chunks.len() - 1;
        if self.chunks[chunk_idx].len() == self.slots_per_chunk {
            if let Some(max) = self.max_chunks {
                if self.chunks.len() >= max {
                    self.overflowed = true;
                    log::warn!("arena overflow: {} chunks in use", self.chunks.len());
                    return None;
                }
            }
            self.chunks.push(Vec::with_capacity(self.slots_per_chunk));
        }
        let chunk_idx = self.chunks.len() - 1;
        let slot = self.chunks[chunk_idx].len();
        self.chunks[chunk_idx].push(value);
        Some(ArenaId {
            chunk: chunk_idx as u32,
            slot: slot as u32,
            _marker: PhantomData,
        })
    }

    pub fn get(&self, id: ArenaId<T>) -> &T {
        &self.chunks[id.chunk as usize][id.slot as usize]
    }

    pub fn get_mut(&mut self, id: ArenaId<T>) -> &mut T {
        &mut self.chunks[id.chunk as usize][id.slot as usize]
    }

    /// Drops every entry and returns all chunks' storage to the free
    /// state, but keeps the outer `Vec<Vec<T>>` allocated so the next
    /// navigation doesn't re-request the OS for memory it just freed.
    pub fn reset(&mut self) {
        for chunk in &mut self.chunks {
            chunk.clear();
        }
        self.chunks.truncate(1);
        self.overflowed = false;
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            chunks: self.chunks.len(),
            entries: self.chunks.iter().map(Vec::len).sum(),
            overflowed: self.overflowed,
        }
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_get_roundtrip() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.alloc(10).unwrap();
        let b = arena.alloc(20).unwrap();
        assert_eq!(*arena.get(a), 10);
        assert_eq!(*arena.get(b), 20);
    }

    #[test]
    fn reset_clears_entries_but_keeps_chunk_capacity() {
        let mut arena: Arena<u32> = Arena::new();
        for i in 0..10 {
            arena.alloc(i).unwrap();
        }
        assert_eq!(arena.stats().entries, 10);
        arena.reset();
        assert_eq!(arena.stats().entries, 0);
        assert_eq!(arena.stats().chunks, 1);
    }

    #[test]
    fn overflow_past_max_chunks_is_sticky_until_reset() {
        // One slot per chunk forces a new chunk on every second alloc of
        // a type whose size exceeds half the chunk budget... instead we
        // just bound chunk count directly to exercise the overflow path.
        let mut arena: Arena<[u8; 16 * 1024]> = Arena::with_max_chunks(1);
        assert!(arena.alloc([0u8; 16 * 1024]).is_some());
        assert!(arena.alloc([0u8; 16 * 1024]).is_none());
        assert!(arena.overflowed());
        arena.reset();
        assert!(!arena.overflowed());
    }

    #[test]
    fn new_chunk_allocated_on_overflow_within_budget() {
        let mut arena: Arena<[u8; 16 * 1024]> = Arena::with_max_chunks(4);
        for _ in 0..4 {
            assert!(arena.alloc([0u8; 16 * 1024]).is_some());
        }
        assert_eq!(arena.stats().chunks, 4);
        assert!(arena.alloc([0u8; 16 * 1024]).is_none());
    }
}
