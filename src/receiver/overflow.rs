use crate::frame::copy_bytes;
use bytes::{Buf, Bytes};
use std::collections::VecDeque;

// Input bytes that arrived before the current expectation could use them. Drained strictly in
// arrival order.
#[derive(Debug, Default)]
pub(crate) struct Overflow {
    chunks: VecDeque<Bytes>,
}

impl Overflow {
    pub(crate) fn push(&mut self, chunk: Bytes) {
        if !chunk.is_empty() {
            self.chunks.push_back(chunk);
        }
    }
    pub(crate) fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
    // Copies queued bytes into `dst` and returns how many were copied.
    pub(crate) fn drain_into(&mut self, dst: &mut [u8]) -> usize {
        let mut filled = 0usize;
        while filled < dst.len() {
            let front = match self.chunks.front_mut() {
                Some(front) => front,
                None => break,
            };
            let n = copy_bytes(front, &mut dst[filled..]);
            filled += n;
            front.advance(n);
            if front.is_empty() {
                self.chunks.pop_front();
            }
        }
        filled
    }
    pub(crate) fn clear(&mut self) {
        self.chunks.clear();
    }
}
