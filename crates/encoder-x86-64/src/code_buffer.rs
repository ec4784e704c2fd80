// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::io::Write;

use xjit_types::JitError;

const UNRESOLVED: u32 = u32::MAX;

/// An identifier for a forward (or backward) branch target, handed out by
/// [`CodeBuffer::allocate_label`] and consumed by [`CodeBuffer::place_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(u32);

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Append-only byte buffer with label tracking for a single function body.
/// Bytes are never removed or reordered once written; a branch whose target
/// isn't known yet records a patch-list entry and is fixed up in
/// [`CodeBuffer::finalize`].
///
/// The diagnostic sink is a generic `Box<dyn Write>` so callers can redirect
/// it anywhere (string buffer in tests, stderr in a CLI, nowhere at all by
/// default).
pub struct CodeBuffer {
    bytes: Vec<u8>,
    capacity: usize,
    labels: Vec<u32>,
    patches: Vec<(Label, usize)>,
    diagnostics: Option<Box<dyn Write>>,
}

impl CodeBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        CodeBuffer {
            bytes: Vec::with_capacity(capacity),
            capacity,
            labels: Vec::new(),
            patches: Vec::new(),
            diagnostics: None,
        }
    }

    pub fn enable_diagnostics(&mut self, sink: Box<dyn Write>) {
        self.diagnostics = Some(sink);
    }

    pub fn disable_diagnostics(&mut self) {
        self.diagnostics = None;
    }

    pub fn diagnostics_enabled(&self) -> bool {
        self.diagnostics.is_some()
    }

    pub fn current_offset(&self) -> u32 {
        self.bytes.len() as u32
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn require_room(&self, additional: usize) -> Result<(), JitError> {
        let used = self.bytes.len();
        if used + additional > self.capacity {
            return Err(JitError::CodeBufferFull {
                requested: additional,
                remaining: self.capacity - used,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    pub fn emit8(&mut self, byte: u8) -> Result<(), JitError> {
        self.require_room(1)?;
        self.bytes.push(byte);
        Ok(())
    }

    pub fn emit_bytes(&mut self, data: &[u8]) -> Result<(), JitError> {
        self.require_room(data.len())?;
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    pub fn emit32(&mut self, value: u32) -> Result<(), JitError> {
        self.emit_bytes(&value.to_le_bytes())
    }

    pub fn emit64(&mut self, value: u64) -> Result<(), JitError> {
        self.emit_bytes(&value.to_le_bytes())
    }

    /// Reserves a new label, unplaced until [`Self::place_label`] is called.
    pub fn allocate_label(&mut self) -> Label {
        self.labels.push(UNRESOLVED);
        Label((self.labels.len() - 1) as u32)
    }

    /// Binds `label` to the current write position — everywhere the label
    /// is used as a branch target, regardless of whether the reference was
    /// emitted before or after this call, resolves here.
    pub fn place_label(&mut self, label: Label) {
        self.labels[label.0 as usize] = self.current_offset();
    }

    /// Emits a placeholder rel32 field for `label` and records a patch-list
    /// entry so [`Self::finalize`] can fill it in once the label is placed.
    /// Returns the offset of the 4-byte field, matching how diagnostics
    /// annotate unresolved branches while they're still being built.
    pub fn emit_rel32_to_label(&mut self, label: Label) -> Result<u32, JitError> {
        let field_offset = self.current_offset();
        self.emit32(0)?;
        self.patches.push((label, field_offset as usize));
        Ok(field_offset)
    }

    /// Resolves every recorded patch against its label's final offset.
    /// Consumes `self` to the finished byte sequence — this is the last
    /// operation the buffer supports.
    pub fn finalize(mut self) -> Result<Vec<u8>, JitError> {
        for (label, field_offset) in &self.patches {
            let target = self.labels[label.0 as usize];
            if target == UNRESOLVED {
                return Err(JitError::UnresolvedLabel(label.0));
            }
            // rel32 is relative to the address of the *next* instruction,
            // i.e. the byte right after this 4-byte field.
            let rel = target as i64 - (*field_offset as i64 + 4);
            let rel = rel as i32;
            self.bytes[*field_offset..*field_offset + 4].copy_from_slice(&rel.to_le_bytes());
        }
        Ok(self.bytes)
    }

    /// Writes a human-readable trace line to the diagnostics sink, if one
    /// is attached. No-op (and cheap — the format args aren't even
    /// evaluated eagerly by the caller macro) when diagnostics are off.
    pub fn trace(&mut self, line: std::fmt::Arguments<'_>) {
        if let Some(sink) = &mut self.diagnostics {
            let _ = writeln!(sink, "{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn forward_label_patches_to_correct_rel32() {
        let mut buf = CodeBuffer::with_capacity(64);
        let target = buf.allocate_label();
        buf.emit8(0x90).unwrap(); // NOP, just to offset things
        buf.emit8(0xE9).unwrap(); // JMP rel32
        buf.emit_rel32_to_label(target).unwrap();
        buf.emit8(0xCC).unwrap(); // INT3 filler
        buf.place_label(target);
        buf.emit8(0x90).unwrap();

        let bytes = buf.finalize().unwrap();
        // JMP's rel32 field starts at offset 2; after the 4-byte field the
        // next instruction is at offset 6 (the INT3); the label is placed
        // at offset 7.
        let rel = i32::from_le_bytes(bytes[2..6].try_into().unwrap());
        assert_eq!(rel, 1);
    }

    #[test]
    fn backward_label_patches_to_negative_rel32() {
        let mut buf = CodeBuffer::with_capacity(64);
        let top = buf.allocate_label();
        buf.place_label(top);
        buf.emit8(0x90).unwrap();
        buf.emit8(0xE9).unwrap();
        buf.emit_rel32_to_label(top).unwrap();

        let bytes = buf.finalize().unwrap();
        let rel = i32::from_le_bytes(bytes[2..6].try_into().unwrap());
        assert_eq!(rel, -6);
    }

    #[test]
    fn unresolved_label_is_an_error() {
        let mut buf = CodeBuffer::with_capacity(64);
        let never_placed = buf.allocate_label();
        buf.emit8(0xE9).unwrap();
        buf.emit_rel32_to_label(never_placed).unwrap();

        assert_eq!(
            buf.finalize().unwrap_err(),
            JitError::UnresolvedLabel(0)
        );
    }

    #[test]
    fn capacity_is_enforced() {
        let mut buf = CodeBuffer::with_capacity(2);
        buf.emit8(0).unwrap();
        buf.emit8(0).unwrap();
        assert_eq!(
            buf.emit8(0).unwrap_err(),
            JitError::CodeBufferFull {
                requested: 1,
                remaining: 0,
                capacity: 2,
            }
        );
    }
}
