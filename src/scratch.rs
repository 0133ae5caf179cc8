//! Reusable buffers for the per-vertex loops of polygon splitting.
//!
//! A [`ScratchPool`] is checked out once per top-level Boolean operation with
//! [`checkout`]. The pool lives in a thread-local slot, so concurrent operations on
//! different threads never share buffers and no lock is taken. A checkout moves the
//! whole pool out of the slot: a nested checkout on the same thread (a Boolean
//! operation started from inside another one) starts from an empty pool instead of
//! aliasing the outer frame's buffers. Dropping a checkout merges its buffers back.

use crate::mesh::vertex::Vertex;
use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

/// Upper bound on pooled buffers of each kind; extra buffers are freed on return.
const MAX_POOLED: usize = 16;

/// Free lists of cleared buffers. Carries no geometric state.
#[derive(Debug, Default)]
pub struct ScratchPool {
    vertex_buffers: Vec<Vec<Vertex>>,
    label_buffers: Vec<Vec<i8>>,
}

impl ScratchPool {
    pub const fn new() -> Self {
        Self {
            vertex_buffers: Vec::new(),
            label_buffers: Vec::new(),
        }
    }

    /// Take an empty vertex buffer, reusing a pooled allocation when one is available.
    pub fn take_vertices(&mut self) -> Vec<Vertex> {
        self.vertex_buffers.pop().unwrap_or_default()
    }

    /// Return a vertex buffer to the pool. Its contents are discarded.
    pub fn give_vertices(&mut self, mut buffer: Vec<Vertex>) {
        if self.vertex_buffers.len() < MAX_POOLED {
            buffer.clear();
            self.vertex_buffers.push(buffer);
        }
    }

    /// Take an empty classification-label buffer.
    pub fn take_labels(&mut self) -> Vec<i8> {
        self.label_buffers.pop().unwrap_or_default()
    }

    /// Return a label buffer to the pool. Its contents are discarded.
    pub fn give_labels(&mut self, mut buffer: Vec<i8>) {
        if self.label_buffers.len() < MAX_POOLED {
            buffer.clear();
            self.label_buffers.push(buffer);
        }
    }

    /// Number of buffers currently pooled, `(vertex, label)`.
    pub fn pooled(&self) -> (usize, usize) {
        (self.vertex_buffers.len(), self.label_buffers.len())
    }

    fn absorb(&mut self, other: ScratchPool) {
        for buffer in other.vertex_buffers {
            self.give_vertices(buffer);
        }
        for buffer in other.label_buffers {
            self.give_labels(buffer);
        }
    }
}

thread_local! {
    static THREAD_POOL: RefCell<ScratchPool> = const { RefCell::new(ScratchPool::new()) };
}

/// A pool checked out of the calling thread's slot for the duration of one operation.
#[derive(Debug)]
pub struct ScratchCheckout {
    pool: ScratchPool,
}

/// Check out the calling thread's scratch pool.
pub fn checkout() -> ScratchCheckout {
    let pool = THREAD_POOL.with(|slot| std::mem::take(&mut *slot.borrow_mut()));
    ScratchCheckout { pool }
}

impl Deref for ScratchCheckout {
    type Target = ScratchPool;

    fn deref(&self) -> &ScratchPool {
        &self.pool
    }
}

impl DerefMut for ScratchCheckout {
    fn deref_mut(&mut self) -> &mut ScratchPool {
        &mut self.pool
    }
}

impl Drop for ScratchCheckout {
    fn drop(&mut self) {
        let pool = std::mem::take(&mut self.pool);
        // try_with: the slot may already be gone during thread teardown
        let _ = THREAD_POOL.try_with(|slot| slot.borrow_mut().absorb(pool));
    }
}
