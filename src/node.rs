use core::fmt;
use std::mem::ManuallyDrop;
use std::ptr;

use crossbeam_epoch::{Atomic, Owned};

/// A list cell as linked into a stack's chain.
///
/// The payload sits in a `ManuallyDrop` because `pop` moves it out while the
/// cell itself is still waiting for its epoch to expire.
pub(crate) struct Cell<T> {
    pub(crate) value: ManuallyDrop<T>,
    pub(crate) next: Atomic<Cell<T>>,
}

/// A pre-allocated stack entry.
///
/// The payload is fixed at construction. Pushing a node moves it into the
/// stack and popping hands back only the payload, so a node can never be
/// linked into a chain twice.
pub struct Node<T> {
    cell: Owned<Cell<T>>,
}

unsafe impl<T: Send> Send for Node<T> {}
unsafe impl<T: Sync> Sync for Node<T> {}

impl<T> Node<T> {
    pub fn new(value: T) -> Self {
        Self {
            cell: Owned::new(Cell {
                value: ManuallyDrop::new(value),
                next: Atomic::null(),
            }),
        }
    }

    pub fn value(&self) -> &T {
        &self.cell.value
    }

    /// Consumes the node without pushing it, returning its payload.
    pub fn into_value(self) -> T {
        let mut cell = self.into_cell();
        // SAFETY: the cell is uniquely owned and freed right after this read
        // without its payload being touched again.
        unsafe { ManuallyDrop::take(&mut cell.value) }
    }

    /// Hands the cell, and with it the payload, to the caller.
    pub(crate) fn into_cell(self) -> Owned<Cell<T>> {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the cell moves out exactly once.
        unsafe { ptr::read(&this.cell) }
    }
}

impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        // SAFETY: a node that still holds its cell owns the payload.
        unsafe { ManuallyDrop::drop(&mut self.cell.value) }
    }
}

impl<T> From<T> for Node<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node").field("value", self.value()).finish()
    }
}
