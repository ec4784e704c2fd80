// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use xjit_encoder_x86_64::register_id;
use xjit_types::JitError;

/// Caller-save integer registers, preferred for intermediates. RSP (stack
/// pointer) and RBP (frame pointer, used when a frame is established) are
/// never handed out.
const CALLER_SAVE_GPR: [u8; 7] = [
    register_id::RAX,
    register_id::RCX,
    register_id::RDX,
    register_id::RSI,
    register_id::RDI,
    register_id::R8,
    register_id::R9,
];

/// Callee-save integer registers, used only once caller-save registers are
/// exhausted; the function builder's prologue/epilogue push/pop whichever
/// of these actually got allocated.
const CALLEE_SAVE_GPR: [u8; 5] = [
    register_id::RBX,
    register_id::R12,
    register_id::R13,
    register_id::R14,
    register_id::R15,
];

/// Tracks free/busy bits for the 16 GPRs and 16 XMMs. A per-compile object —
/// never shared across compiles, so busy bits from one function can never
/// leak into another.
pub struct RegisterFile {
    gpr_busy: u16,
    xmm_busy: u16,
    callee_save_used: Vec<u8>,
}

impl RegisterFile {
    pub fn new() -> Self {
        RegisterFile {
            gpr_busy: 1 << register_id::RSP | 1 << register_id::RBP,
            xmm_busy: 0,
            callee_save_used: Vec::new(),
        }
    }

    pub fn reserve_gpr(&mut self, id: u8) {
        self.gpr_busy |= 1 << id;
    }

    pub fn release_gpr(&mut self, id: u8) {
        self.gpr_busy &= !(1 << id);
    }

    pub fn reserve_xmm(&mut self, id: u8) {
        self.xmm_busy |= 1 << id;
    }

    pub fn release_xmm(&mut self, id: u8) {
        self.xmm_busy &= !(1 << id);
    }

    fn is_gpr_free(&self, id: u8) -> bool {
        self.gpr_busy & (1 << id) == 0
    }

    /// Picks a free GPR, preferring caller-save registers, falling back to
    /// callee-save ones (and recording the fallback so the prologue/epilogue
    /// know which ones need saving). Fails with `OutOfRegisters` when none
    /// are free — this allocator never spills to the stack.
    pub fn allocate_gpr(&mut self, node_kind: &'static str) -> Result<u8, JitError> {
        for &id in &CALLER_SAVE_GPR {
            if self.is_gpr_free(id) {
                self.reserve_gpr(id);
                return Ok(id);
            }
        }
        for &id in &CALLEE_SAVE_GPR {
            if self.is_gpr_free(id) {
                self.reserve_gpr(id);
                self.callee_save_used.push(id);
                return Ok(id);
            }
        }
        tracing::warn!(node_kind, "out of general-purpose registers");
        Err(JitError::OutOfRegisters {
            register_class: "gpr",
            node_kind,
        })
    }

    pub fn allocate_xmm(&mut self, node_kind: &'static str) -> Result<u8, JitError> {
        for id in 0u8..16 {
            if self.xmm_busy & (1 << id) == 0 {
                self.reserve_xmm(id);
                return Ok(id);
            }
        }
        tracing::warn!(node_kind, "out of XMM registers");
        Err(JitError::OutOfRegisters {
            register_class: "xmm",
            node_kind,
        })
    }

    /// Callee-save GPRs that were actually handed out during this compile,
    /// in allocation order — the prologue pushes these (and the epilogue
    /// pops them in reverse) only when the set is non-empty.
    pub fn callee_save_used(&self) -> &[u8] {
        &self.callee_save_used
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_prefers_caller_save() {
        let mut rf = RegisterFile::new();
        let first = rf.allocate_gpr("test").unwrap();
        assert_eq!(first, register_id::RAX);
        assert!(rf.callee_save_used().is_empty());
    }

    #[test]
    fn falls_back_to_callee_save_once_caller_save_exhausted() {
        let mut rf = RegisterFile::new();
        for _ in 0..CALLER_SAVE_GPR.len() {
            rf.allocate_gpr("test").unwrap();
        }
        let id = rf.allocate_gpr("test").unwrap();
        assert!(CALLEE_SAVE_GPR.contains(&id));
        assert_eq!(rf.callee_save_used(), &[id]);
    }

    #[test]
    fn exhaustion_is_reported() {
        let mut rf = RegisterFile::new();
        for _ in 0..(CALLER_SAVE_GPR.len() + CALLEE_SAVE_GPR.len()) {
            rf.allocate_gpr("test").unwrap();
        }
        assert_eq!(
            rf.allocate_gpr("extra_node").unwrap_err(),
            JitError::OutOfRegisters {
                register_class: "gpr",
                node_kind: "extra_node",
            }
        );
    }

    #[test]
    fn release_frees_a_register_for_reuse() {
        let mut rf = RegisterFile::new();
        let r = rf.allocate_gpr("test").unwrap();
        rf.release_gpr(r);
        let r2 = rf.allocate_gpr("test").unwrap();
        assert_eq!(r, r2);
    }
}
