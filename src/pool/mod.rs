use std::mem::replace;

// Number of consecutive oversized cycles after which the backing buffer is shrunk.
const SHRINK_AFTER_CYCLES: u32 = 3;

/// Reusable backing storage for frame payloads.
///
/// Slices are handed out as [`PoolView`]s, which stay valid until the next
/// [`cycle_reset`][`Self::cycle_reset()`]. When a request does not fit into the remaining backing
/// buffer a larger one is allocated; the old buffer is retired, not freed, so views into it remain
/// readable for the rest of the cycle.
#[derive(Debug)]
pub struct BufferPool {
    buffer: Vec<u8>,
    retired: Vec<Vec<u8>>,
    offset: usize,
    used: usize,
    target: Option<usize>,
    low_usage_streak: u32,
}

/// A slice handed out by a [`BufferPool`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolView {
    generation: usize,
    start: usize,
    len: usize,
}

impl PoolView {
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl BufferPool {
    pub fn new(initial_size: usize) -> Self {
        Self {
            buffer: vec![0u8; initial_size],
            retired: Vec::new(),
            offset: 0,
            used: 0,
            target: None,
            low_usage_streak: 0,
        }
    }
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
    // Bytes handed out since the last cycle reset.
    pub fn used(&self) -> usize {
        self.used
    }
    pub fn acquire(&mut self, len: usize) -> PoolView {
        if self.offset + len > self.buffer.len() {
            let size = match self.buffer.is_empty() && self.retired.is_empty() {
                true => len,
                false => self.used + len,
            };
            log::debug!("growing buffer pool from {} to {} bytes", self.buffer.len(), size);
            let old = replace(&mut self.buffer, vec![0u8; size]);
            self.retired.push(old);
            self.offset = 0;
        }
        let view = PoolView {
            generation: self.retired.len(),
            start: self.offset,
            len,
        };
        self.offset += len;
        self.used += len;
        view
    }
    pub fn view(&self, view: &PoolView) -> &[u8] {
        let buffer = match self.retired.get(view.generation) {
            Some(retired) => retired,
            None => &self.buffer,
        };
        &buffer[view.start..view.start + view.len]
    }
    pub fn view_mut(&mut self, view: &PoolView) -> &mut [u8] {
        let buffer = match self.retired.get_mut(view.generation) {
            Some(retired) => retired,
            None => &mut self.buffer,
        };
        &mut buffer[view.start..view.start + view.len]
    }
    // Ends a cycle. All views handed out so far are invalidated. The backing buffer is shrunk to a
    // moving average of the per-cycle usage once it has been oversized for several consecutive
    // cycles, or right away if `force` is set.
    pub fn cycle_reset(&mut self, force: bool) {
        let target = match self.target {
            Some(previous) => (previous + self.used + 1) / 2,
            None => self.used,
        };
        self.target = Some(target);
        match target < self.buffer.len() {
            true => self.low_usage_streak += 1,
            false => self.low_usage_streak = 0,
        }
        if force || self.low_usage_streak >= SHRINK_AFTER_CYCLES {
            if target != self.buffer.len() {
                log::debug!(
                    "resizing buffer pool from {} to {} bytes",
                    self.buffer.len(),
                    target
                );
                self.buffer = vec![0u8; target];
            }
            self.low_usage_streak = 0;
        }
        self.retired.clear();
        self.offset = 0;
        self.used = 0;
    }
    // Frees all storage. The pool may still be used afterwards, it regrows on demand.
    pub fn release(&mut self) {
        self.buffer = Vec::new();
        self.retired = Vec::new();
        self.offset = 0;
        self.used = 0;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum PoolKind {
    Fragmented,
    Unfragmented,
}

// One pool for the frames of fragmented messages and one for single frame messages.
#[derive(Debug)]
pub(crate) struct Pools {
    fragmented: BufferPool,
    unfragmented: BufferPool,
}

impl Pools {
    pub(crate) fn new(initial_size: usize) -> Self {
        Self {
            fragmented: BufferPool::new(initial_size),
            unfragmented: BufferPool::new(initial_size),
        }
    }
    pub(crate) fn get(&self, kind: PoolKind) -> &BufferPool {
        match kind {
            PoolKind::Fragmented => &self.fragmented,
            PoolKind::Unfragmented => &self.unfragmented,
        }
    }
    pub(crate) fn get_mut(&mut self, kind: PoolKind) -> &mut BufferPool {
        match kind {
            PoolKind::Fragmented => &mut self.fragmented,
            PoolKind::Unfragmented => &mut self.unfragmented,
        }
    }
    pub(crate) fn cycle_reset(&mut self, force: bool) {
        self.fragmented.cycle_reset(force);
        self.unfragmented.cycle_reset(force);
    }
    pub(crate) fn release(&mut self) {
        self.fragmented.release();
        self.unfragmented.release();
    }
}
