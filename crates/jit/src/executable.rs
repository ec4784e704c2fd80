// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use region::{Allocation, Protection};
use xjit_types::JitError;

/// An OS-backed region that is readable, writable, and executable for its
/// entire lifetime. Sub-regions are handed out in order and never reclaimed.
///
/// Stays W|X for its whole life rather than write-then-flip-to-exec:
/// `region::alloc` maps it `READ_WRITE_EXECUTE` up front and `Allocation`'s
/// own `Drop` unmaps it. A W^X variant (map writable, flip to exec-only once
/// finalized) is the more hardened alternative on systems that enforce it,
/// but isn't workable here: one buffer backs every `compile()` a builder
/// performs over its lifetime, so later sub-regions are still being written
/// to long after earlier ones have started executing.
pub struct ExecutableBuffer {
    mapping: Allocation,
    used: usize,
}

unsafe impl Send for ExecutableBuffer {}

impl ExecutableBuffer {
    /// Maps a fresh region of at least `capacity` bytes, rounded up to a
    /// whole number of pages.
    pub fn reserve(capacity: usize) -> Result<Self, JitError> {
        tracing::debug!(capacity, "reserving executable buffer");

        let mapping = region::alloc(capacity.max(1), Protection::READ_WRITE_EXECUTE).map_err(
            |_| JitError::CodeBufferFull {
                requested: capacity,
                remaining: 0,
                capacity: 0,
            },
        )?;

        Ok(ExecutableBuffer { mapping, used: 0 })
    }

    pub fn capacity(&self) -> usize {
        self.mapping.len()
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.used
    }

    /// Copies `code` into the next unused sub-region and returns a raw
    /// pointer to where it now lives. The sub-region is never returned to
    /// the free pool.
    pub fn write(&mut self, code: &[u8]) -> Result<*const u8, JitError> {
        if code.len() > self.remaining() {
            return Err(JitError::CodeBufferFull {
                requested: code.len(),
                remaining: self.remaining(),
                capacity: self.capacity(),
            });
        }
        unsafe {
            let dst = self.mapping.as_mut_ptr::<u8>().add(self.used);
            std::ptr::copy_nonoverlapping(code.as_ptr(), dst, code.len());
            self.used += code.len();
            Ok(dst as *const u8)
        }
    }
}
