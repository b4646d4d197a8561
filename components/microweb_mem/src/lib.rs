/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The memory tier (§4.1): a linear arena for parse/layout structures and a
//! tiered, handle-based block allocator for text buffers. One
//! [`PageMemory`] exists per navigation and is reset in one call at the
//! start of the next.

mod arena;
mod block;

pub use arena::{Arena, ArenaId, ArenaStats};
pub use block::{BlockAllocator, BlockError, BlockHandle, BlockLease};

/// Bundles the arena and block allocator the way `Page::Reset` in the
/// original engine resets `MemoryManager::pageAllocator` and
/// `MemoryManager::pageBlockAllocator` together.
#[derive(Default)]
pub struct PageMemory {
    pub blocks: BlockAllocator,
}

impl PageMemory {
    pub fn new() -> Self {
        PageMemory {
            blocks: BlockAllocator::new(),
        }
    }

    /// Called once per navigation, before the parser emits the first node.
    pub fn reset(&mut self) {
        self.blocks.reset();
    }
}
