use core::fmt;
use std::mem::ManuallyDrop;
use std::ptr;

use crossbeam_epoch::{self as epoch, Atomic};
use crossbeam_utils::{Backoff, CachePadded};

use crate::error::{Error, Result};
use crate::node::{Cell, Node};
use crate::sync::{AtomicCounter, AtomicIsize, AtomicUsize, Ordering};

/// Point-in-time reading of a stack's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackSummary {
    pub ops_count: usize,
    pub size: isize,
}

impl fmt::Display for StackSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total number of operations: {}, Current size: {}",
            self.ops_count, self.size
        )
    }
}

/// A lock-free LIFO stack shared by any number of threads.
///
/// `push` and `pop` linearize at the compare-and-swap on `head`; both retry
/// until that CAS commits, so no contended update is ever dropped. Popped
/// cells are retired through `crossbeam-epoch`, which keeps them alive while
/// any pinned thread may still be reading them.
///
/// The `size` and operation counters are updated after the structural CAS with
/// their own retry loops. They never lose an update, but they are not atomic
/// with the chain: while mutators are running they can lag behind it, and
/// `size` may even read negative for a moment. Once the stack is quiescent both
/// are exact. Use [`chain_len`](ConcurrentStack::chain_len) for a count taken
/// from the chain itself.
pub struct ConcurrentStack<T> {
    head: CachePadded<Atomic<Cell<T>>>,
    size: CachePadded<AtomicIsize>,
    ops: CachePadded<AtomicUsize>,
}

unsafe impl<T: Send> Send for ConcurrentStack<T> {}
unsafe impl<T: Send> Sync for ConcurrentStack<T> {}

impl<T> ConcurrentStack<T> {
    pub fn new() -> Self {
        Self {
            head: CachePadded::new(Atomic::null()),
            size: CachePadded::new(AtomicIsize::new(0)),
            ops: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    /// Links `node` on top of the stack.
    ///
    /// The node is reachable from the top before this returns.
    pub fn push(&self, node: Node<T>) {
        let mut cell = node.into_cell();
        let guard = epoch::pin();
        let backoff = Backoff::new();
        loop {
            let head = self.head.load(Ordering::Relaxed, &guard);
            cell.next.store(head, Ordering::Relaxed);
            match self.head.compare_exchange_weak(
                head,
                cell,
                Ordering::Release,
                Ordering::Relaxed,
                &guard,
            ) {
                Ok(_) => break,
                Err(err) => {
                    cell = err.new;
                    backoff.spin();
                }
            }
        }
        self.ops.cas_add(1);
        self.size.cas_add(1);
    }

    /// Pushes a node taken from a source that may have run dry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for `None`, leaving the stack and its
    /// counters untouched.
    pub fn try_push(&self, node: Option<Node<T>>) -> Result<()> {
        let node = node.ok_or(Error::InvalidArgument("push requires a node"))?;
        self.push(node);
        Ok(())
    }

    /// Unlinks the top node and returns its payload.
    ///
    /// `None` means the stack was observed empty; that observation is not
    /// retried and does not count as an operation.
    pub fn pop(&self) -> Option<T> {
        let guard = epoch::pin();
        let backoff = Backoff::new();
        let value = loop {
            let head = self.head.load(Ordering::Acquire, &guard);
            // SAFETY: `head` was loaded under `guard`, so even if another thread
            // unlinks it the cell is not freed before the guard is dropped.
            let cell = unsafe { head.as_ref() }?;
            let next = cell.next.load(Ordering::Acquire, &guard);
            if self
                .head
                .compare_exchange_weak(head, next, Ordering::AcqRel, Ordering::Acquire, &guard)
                .is_ok()
            {
                // SAFETY: winning the CAS makes this thread the only one to take
                // the payload; the cell is freed later without dropping it.
                unsafe {
                    let value = ManuallyDrop::into_inner(ptr::read(&cell.value));
                    guard.defer_destroy(head);
                    break value;
                }
            }
            backoff.spin();
        };
        self.size.cas_add(-1);
        self.ops.cas_add(1);
        Some(value)
    }

    /// Advisory number of nodes. See the type docs for how it may drift.
    pub fn size(&self) -> isize {
        self.size.load(Ordering::Acquire)
    }

    /// Number of completed pushes, pops and [`increment_ops`] calls.
    /// Never decreases.
    ///
    /// [`increment_ops`]: ConcurrentStack::increment_ops
    pub fn ops_count(&self) -> usize {
        self.ops.load(Ordering::Acquire)
    }

    /// Records an operation without touching the chain. Returns the new count.
    pub fn increment_ops(&self) -> usize {
        self.ops.cas_add(1)
    }

    pub fn is_empty(&self) -> bool {
        let guard = epoch::pin();
        self.head.load(Ordering::Acquire, &guard).is_null()
    }

    /// Counts the nodes by walking the chain from the top.
    ///
    /// The walk runs under a single pinned guard, so it always terminates, but
    /// under concurrent mutation the result mixes states from different moments.
    pub fn chain_len(&self) -> usize {
        let guard = epoch::pin();
        let mut len = 0;
        let mut current = self.head.load(Ordering::Acquire, &guard);
        // SAFETY: cells reachable under `guard` stay allocated until it drops.
        while let Some(cell) = unsafe { current.as_ref() } {
            len += 1;
            current = cell.next.load(Ordering::Acquire, &guard);
        }
        len
    }

    pub fn summary(&self) -> StackSummary {
        StackSummary {
            ops_count: self.ops_count(),
            size: self.size(),
        }
    }
}

impl<T: Clone> ConcurrentStack<T> {
    /// Clones the payloads from top to bottom.
    pub fn snapshot(&mut self) -> Vec<T> {
        let mut values = Vec::new();
        // SAFETY: `&mut self` rules out any concurrent push or pop.
        unsafe {
            let guard = epoch::unprotected();
            let mut current = self.head.load(Ordering::Relaxed, guard);
            while let Some(cell) = current.as_ref() {
                values.push(T::clone(&cell.value));
                current = cell.next.load(Ordering::Relaxed, guard);
            }
        }
        values
    }
}

impl<T> Default for ConcurrentStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Display for ConcurrentStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.summary(), f)
    }
}

impl<T> fmt::Debug for ConcurrentStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentStack")
            .field("ops_count", &self.ops_count())
            .field("size", &self.size())
            .finish()
    }
}

impl<T> Drop for ConcurrentStack<T> {
    fn drop(&mut self) {
        // SAFETY: no other thread can reach the chain any more, and every cell
        // still linked owns its payload.
        unsafe {
            let guard = epoch::unprotected();
            let mut current = self.head.load(Ordering::Relaxed, guard);
            while !current.is_null() {
                let mut cell = current.into_owned();
                current = cell.next.load(Ordering::Relaxed, guard);
                ManuallyDrop::drop(&mut cell.value);
            }
        }
    }
}
