/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The tiered, handle-based block allocator (§4.1). Text buffers that
//! outlive a single parse step are requested through here rather than
//! through the arena directly, because on constrained hardware they may
//! need to live in expanded memory or on a disk swap file instead of
//! conventional RAM.
//!
//! `get()`/`lease()` model the design note "pointer-into-swap-buffer
//! aliasing → handle + lease": a [`BlockLease`] borrows the allocator
//! mutably for its lifetime, so the borrow checker — not a convention
//! comment — forbids two leases from overlapping.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

/// Below this much free conventional memory, small blocks prefer the swap
/// tier over the arena (§4.1, step 2).
const LOW_WATER_MARK: usize = 16 * 1024;
/// Only blocks this small or smaller are eligible for swap (§4.1, step 2).
const MAX_SWAP_BLOCK: usize = 1024;
/// Single shared scratch window used to read a swap-backed block into
/// memory; only one swap block may be mapped at a time.
const SWAP_SCRATCH_SIZE: usize = 1024;
/// LRU capacity for expanded-memory page windows (§4.1's "four-page LRU").
const EXPANDED_LRU_CAPACITY: usize = 4;
const EXPANDED_PAGE_SIZE: usize = 1024;

/// Where a [`BlockHandle`] resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockHandle {
    /// Index into the allocator's conventional (arena-backed) blocks.
    Conventional(u32),
    /// `(page, offset)` into the expanded-memory bank.
    Expanded(u32, u32),
    /// Byte offset of a `(size, bytes)` record in the swap file.
    Swap(u64),
}

#[derive(Debug)]
pub enum BlockError {
    Io(io::Error),
    NoSwapConfigured,
    BlockTooLargeForSwap(usize),
    LeaseMismatch,
}

impl std::fmt::Display for BlockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockError::Io(e) => write!(f, "swap file I/O error: {e}"),
            BlockError::NoSwapConfigured => write!(f, "no swap file configured"),
            BlockError::BlockTooLargeForSwap(n) => {
                write!(f, "block of {n} bytes too large for the swap tier")
            }
            BlockError::LeaseMismatch => write!(f, "lease does not match the requested handle"),
        }
    }
}

impl std::error::Error for BlockError {}

impl From<io::Error> for BlockError {
    fn from(e: io::Error) -> Self {
        BlockError::Io(e)
    }
}

struct ExpandedPage {
    data: Box<[u8]>,
}

/// Tracks which expanded-memory pages are currently "mapped", evicting the
/// least-recently-used page once more than [`EXPANDED_LRU_CAPACITY`] are
/// requested. Our pages are ordinary owned memory (there is no real EMS
/// bank to switch), so eviction here is bookkeeping that preserves the
/// handle-validity contract rather than a correctness requirement.
struct ExpandedBank {
    pages: Vec<ExpandedPage>,
    lru: Vec<u32>,
}

impl ExpandedBank {
    fn new() -> Self {
        ExpandedBank {
            pages: Vec::new(),
            lru: Vec::new(),
        }
    }

    fn alloc_page(&mut self) -> u32 {
        self.pages.push(ExpandedPage {
            data: vec![0u8; EXPANDED_PAGE_SIZE].into_boxed_slice(),
        });
        (self.pages.len() - 1) as u32
    }

    fn touch(&mut self, page: u32) {
        self.lru.retain(|&p| p != page);
        self.lru.push(page);
        while self.lru.len() > EXPANDED_LRU_CAPACITY {
            self.lru.remove(0);
        }
    }
}

/// RAII borrow of the bytes behind a [`BlockHandle`]. Mutating callers must
/// call [`BlockLease::commit`] before the lease is dropped if the backing
/// tier is swap-based; conventional and expanded tiers are already the
/// authoritative storage, so `commit` is a no-op for them.
pub struct BlockLease<'a> {
    handle: BlockHandle,
    bytes: LeaseBytes<'a>,
    allocator: *mut BlockAllocator,
    _marker: std::marker::PhantomData<&'a mut BlockAllocator>,
}

enum LeaseBytes<'a> {
    Borrowed(&'a mut [u8]),
    Owned(Vec<u8>),
}

impl<'a> Deref for BlockLease<'a> {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        match &self.bytes {
            LeaseBytes::Borrowed(b) => b,
            LeaseBytes::Owned(v) => v,
        }
    }
}

impl<'a> DerefMut for BlockLease<'a> {
    fn deref_mut(&mut self) -> &mut [u8] {
        match &mut self.bytes {
            LeaseBytes::Borrowed(b) => b,
            LeaseBytes::Owned(v) => v,
        }
    }
}

impl<'a> BlockLease<'a> {
    /// Writes a swap-backed lease's bytes back to the swap file. Must be
    /// called before any other handle operation observes the mutation;
    /// conventional/expanded leases write through immediately, so this is
    /// a no-op for them.
    pub fn commit(&mut self) -> Result<(), BlockError> {
        if let BlockHandle::Swap(offset) = self.handle {
            if let LeaseBytes::Owned(bytes) = &self.bytes {
                // Safety: the lease holds `allocator` only for as long as
                // it is alive, and a lease cannot outlive the `&mut
                // BlockAllocator` borrow that created it (the lifetime
                // `'a` ties the two together), so no other access to the
                // allocator is possible while this runs.
                let allocator = unsafe { &mut *self.allocator };
                allocator.write_swap_record(offset, bytes)?;
            }
        }
        Ok(())
    }
}

/// Tiered handle-based block allocator (§4.1).
pub struct BlockAllocator {
    conventional: Vec<Box<[u8]>>,
    expanded: Option<ExpandedBank>,
    swap_path: Option<PathBuf>,
    swap_file: Option<File>,
    swap_len: u64,
    swap_cap: u64,
    conventional_budget_used: usize,
}

impl BlockAllocator {
    pub fn new() -> Self {
        BlockAllocator {
            conventional: Vec::new(),
            expanded: None,
            swap_path: None,
            swap_file: None,
            swap_len: 0,
            swap_cap: 0,
            conventional_budget_used: 0,
        }
    }

    /// Enables the expanded-memory tier (the `-noems` flag disables it).
    pub fn enable_expanded_memory(&mut self) {
        self.expanded = Some(ExpandedBank::new());
    }

    /// Enables the disk swap tier at `path`, capped at `capacity_bytes`
    /// (the `-useswap` flag; default cap is 1 MiB per §6).
    pub fn enable_swap(&mut self, path: PathBuf, capacity_bytes: u64) -> Result<(), BlockError> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        self.swap_path = Some(path);
        self.swap_file = Some(file);
        self.swap_len = 0;
        self.swap_cap = capacity_bytes;
        Ok(())
    }

    /// Reports how much conventional memory remains before the low-water
    /// mark kicks in. Tests and the CLI can set this explicitly via
    /// [`BlockAllocator::set_conventional_budget`]; absent that, we treat
    /// conventional memory as unconstrained (always above the mark) so the
    /// swap tier is only exercised when the caller asks for it.
    fn remaining_conventional(&self) -> usize {
        usize::MAX - self.conventional_budget_used
    }

    pub fn set_conventional_budget_used(&mut self, used: usize) {
        self.conventional_budget_used = used;
    }

    /// Implements the three-step placement policy from §4.1.
    pub fn alloc(&mut self, size: usize) -> Result<BlockHandle, BlockError> {
        if let Some(bank) = &mut self.expanded {
            if size <= EXPANDED_PAGE_SIZE {
                let page = bank.alloc_page();
                bank.touch(page);
                return Ok(BlockHandle::Expanded(page, 0));
            }
        }

        let swap_eligible = self.swap_file.is_some()
            && self.remaining_conventional() < LOW_WATER_MARK
            && size <= MAX_SWAP_BLOCK;
        if swap_eligible {
            return self.append_swap_record(size);
        }

        let idx = self.conventional.len() as u32;
        self.conventional.push(vec![0u8; size].into_boxed_slice());
        self.conventional_budget_used += size;
        Ok(BlockHandle::Conventional(idx))
    }

    fn append_swap_record(&mut self, size: usize) -> Result<BlockHandle, BlockError> {
        if size > u16::MAX as usize {
            return Err(BlockError::BlockTooLargeForSwap(size));
        }
        let record_len = 2 + size as u64;
        if self.swap_len + record_len > self.swap_cap {
            return Err(BlockError::BlockTooLargeForSwap(size));
        }
        let offset = self.swap_len;
        let file = self.swap_file.as_mut().ok_or(BlockError::NoSwapConfigured)?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&(size as u16).to_le_bytes())?;
        file.write_all(&vec![0u8; size])?;
        self.swap_len += record_len;
        Ok(BlockHandle::Swap(offset))
    }

    fn write_swap_record(&mut self, offset: u64, bytes: &[u8]) -> Result<(), BlockError> {
        let file = self.swap_file.as_mut().ok_or(BlockError::NoSwapConfigured)?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&(bytes.len() as u16).to_le_bytes())?;
        file.write_all(bytes)?;
        Ok(())
    }

    fn read_swap_record(&mut self, offset: u64) -> Result<Vec<u8>, BlockError> {
        let file = self.swap_file.as_mut().ok_or(BlockError::NoSwapConfigured)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut len_bytes = [0u8; 2];
        file.read_exact(&mut len_bytes)?;
        let len = u16::from_le_bytes(len_bytes) as usize;
        debug_assert!(len <= SWAP_SCRATCH_SIZE);
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Leases the bytes behind `handle`. Holding the returned lease blocks
    /// every other allocator operation at compile time, matching "pointers
    /// obtained from a block handle are valid only until the next
    /// block-allocator operation."
    pub fn lease(&mut self, handle: BlockHandle) -> Result<BlockLease<'_>, BlockError> {
        match handle {
            BlockHandle::Conventional(idx) => {
                let slice: &mut [u8] = &mut self.conventional[idx as usize];
                let allocator_ptr: *mut BlockAllocator = self;
                Ok(BlockLease {
                    handle,
                    bytes: LeaseBytes::Borrowed(slice),
                    allocator: allocator_ptr,
                    _marker: std::marker::PhantomData,
                })
            }
            BlockHandle::Expanded(page, _offset) => {
                let allocator_ptr: *mut BlockAllocator = self;
                let bank = self.expanded.as_mut().ok_or(BlockError::LeaseMismatch)?;
                bank.touch(page);
                let slice: &mut [u8] = &mut bank.pages[page as usize].data;
                Ok(BlockLease {
                    handle,
                    bytes: LeaseBytes::Borrowed(slice),
                    allocator: allocator_ptr,
                    _marker: std::marker::PhantomData,
                })
            }
            BlockHandle::Swap(offset) => {
                let bytes = self.read_swap_record(offset)?;
                let allocator_ptr: *mut BlockAllocator = self;
                Ok(BlockLease {
                    handle,
                    bytes: LeaseBytes::Owned(bytes),
                    allocator: allocator_ptr,
                    _marker: std::marker::PhantomData,
                })
            }
        }
    }

    /// Drops every conventional/expanded block and truncates the swap
    /// file; called once per navigation alongside the arena reset.
    pub fn reset(&mut self) {
        self.conventional.clear();
        self.conventional_budget_used = 0;
        self.expanded = self.expanded.as_ref().map(|_| ExpandedBank::new());
        if let Some(file) = &mut self.swap_file {
            let _ = file.set_len(0);
            let _ = file.seek(SeekFrom::Start(0));
        }
        self.swap_len = 0;
    }
}

impl Default for BlockAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conventional_alloc_roundtrips_bytes() {
        let mut alloc = BlockAllocator::new();
        let handle = alloc.alloc(16).unwrap();
        {
            let mut lease = alloc.lease(handle).unwrap();
            lease[0] = 42;
        }
        let lease = alloc.lease(handle).unwrap();
        assert_eq!(lease[0], 42);
    }

    #[test]
    fn expanded_memory_preferred_when_enabled() {
        let mut alloc = BlockAllocator::new();
        alloc.enable_expanded_memory();
        let handle = alloc.alloc(64).unwrap();
        assert!(matches!(handle, BlockHandle::Expanded(_, _)));
    }

    #[test]
    fn swap_used_only_under_low_water_mark_and_size_limit() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("microweb-test-swap-{}", std::process::id()));
        let mut alloc = BlockAllocator::new();
        alloc.enable_swap(dir.clone(), 1024 * 1024).unwrap();

        // Plenty of conventional memory remaining: large block still goes
        // to conventional storage even with swap configured.
        let handle = alloc.alloc(2000).unwrap();
        assert!(matches!(handle, BlockHandle::Conventional(_)));

        alloc.set_conventional_budget_used(usize::MAX - 10);
        let handle = alloc.alloc(100).unwrap();
        assert!(matches!(handle, BlockHandle::Swap(_)));

        let _ = std::fs::remove_file(&dir);
    }

    #[test]
    fn swap_commit_persists_mutation() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("microweb-test-swap-commit-{}", std::process::id()));
        let mut alloc = BlockAllocator::new();
        alloc.enable_swap(dir.clone(), 1024 * 1024).unwrap();
        alloc.set_conventional_budget_used(usize::MAX - 10);

        let handle = alloc.alloc(4).unwrap();
        {
            let mut lease = alloc.lease(handle).unwrap();
            lease.copy_from_slice(b"abcd");
            lease.commit().unwrap();
        }
        let lease = alloc.lease(handle).unwrap();
        assert_eq!(&*lease, b"abcd");

        let _ = std::fs::remove_file(&dir);
    }

    #[test]
    fn reset_truncates_swap_file() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("microweb-test-swap-reset-{}", std::process::id()));
        let mut alloc = BlockAllocator::new();
        alloc.enable_swap(dir.clone(), 1024 * 1024).unwrap();
        alloc.set_conventional_budget_used(usize::MAX - 10);
        alloc.alloc(4).unwrap();
        alloc.reset();
        assert_eq!(alloc.swap_len, 0);
        let _ = std::fs::remove_file(&dir);
    }
}
