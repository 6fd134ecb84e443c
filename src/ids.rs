//! Block-based identifier allocation.
//!
//! Each allocator instance reserves contiguous blocks of IDs from a remote
//! per-kind counter ([`IdBlockCounter`]) and hands them out locally.
//!
//! ## Guarantees
//!
//! - IDs are unique per kind across threads and across allocator instances
//!   sharing the same counter, also after a restart: the remote increment
//!   commits before any ID of the block is handed out.
//! - A failed increment leaves the local block untouched.
//! - Steady-state allocation is a compare-and-swap on the block cursor;
//!   only refills take the per-kind mutex.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::store::{IdBlockCounter, StoreError, ThingStore};
use crate::types::{IdKind, StatementId, ThingId};

/// Default number of IDs reserved per remote increment.
pub const DEFAULT_BLOCK_SIZE: u64 = 1000;

/// Local block state of one ID kind.
///
/// `next` only grows: a refill moves it to the start of a block the remote
/// counter granted after every earlier block.
#[derive(Debug, Default)]
struct BlockCursor {
    next: AtomicU64,
    end: AtomicU64,
    refill: Mutex<()>,
}

impl BlockCursor {
    /// Take the next ID of the current block, if any is left.
    fn try_take(&self) -> Option<u64> {
        loop {
            let next = self.next.load(Ordering::SeqCst);
            let end = self.end.load(Ordering::SeqCst);
            if next >= end {
                return None;
            }
            if self
                .next
                .compare_exchange(next, next + 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return Some(next);
            }
        }
    }
}

/// Allocates unique IDs per kind in blocks.
pub struct IdentityAllocator {
    counter: Arc<dyn IdBlockCounter>,
    block_size: u64,
    cursors: [BlockCursor; 5],
}

impl IdentityAllocator {
    /// Create an allocator with the default block size.
    pub fn new(counter: Arc<dyn IdBlockCounter>) -> Self {
        Self::with_block_size(counter, DEFAULT_BLOCK_SIZE)
    }

    /// Create an allocator with a custom block size. Zero is treated as one.
    pub fn with_block_size(counter: Arc<dyn IdBlockCounter>, block_size: u64) -> Self {
        Self {
            counter,
            block_size: block_size.max(1),
            cursors: Default::default(),
        }
    }

    /// Configured block size.
    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Allocate the next numeric identity for a kind.
    pub fn next_identity(&self, kind: IdKind) -> Result<u64, StoreError> {
        let cursor = &self.cursors[kind.index()];
        loop {
            if let Some(id) = cursor.try_take() {
                return Ok(id);
            }

            let _guard = cursor.refill.lock();
            // Another thread may have refilled while we waited.
            if cursor.next.load(Ordering::SeqCst) < cursor.end.load(Ordering::SeqCst) {
                continue;
            }

            let upper = self.counter.increment_by(kind, self.block_size).map_err(|e| {
                warn!(kind = %kind, error = %e, "ID block refill failed");
                e
            })?;
            let start = upper.saturating_sub(self.block_size);
            // `next` first: no reader may see the new end with the old cursor.
            cursor.next.store(start, Ordering::SeqCst);
            cursor.end.store(upper, Ordering::SeqCst);
            debug!(kind = %kind, start, end = upper, "Reserved ID block");
        }
    }

    /// Allocate a prefixed Thing ID.
    pub fn next_thing_id(&self, kind: IdKind) -> Result<ThingId, StoreError> {
        Ok(ThingId::allocated(kind, self.next_identity(kind)?))
    }

    /// Allocate a prefixed statement ID.
    pub fn next_statement_id(&self) -> Result<StatementId, StoreError> {
        Ok(StatementId::allocated(self.next_identity(IdKind::Statement)?))
    }

    /// Allocate a Thing ID that does not exist in `store` yet.
    ///
    /// Things created with manually chosen IDs may occupy allocated values;
    /// those are skipped.
    pub fn next_unused_thing_id<S: ThingStore + ?Sized>(
        &self,
        kind: IdKind,
        store: &S,
    ) -> Result<ThingId, StoreError> {
        loop {
            let id = self.next_thing_id(kind)?;
            if !store.exists(&id)? {
                return Ok(id);
            }
            debug!(id = %id, "Skipping occupied ID");
        }
    }
}

impl std::fmt::Debug for IdentityAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityAllocator")
            .field("block_size", &self.block_size)
            .finish_non_exhaustive()
    }
}
