// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use xjit_types::{ConditionCode, JitError};

use crate::alu::AluOp;
use crate::code_buffer::{CodeBuffer, Label};
use crate::memory::MemoryOperand;
use crate::register::Register;

/// Wraps a [`CodeBuffer`] with instruction-level emission. Holds the buffer
/// by composition and exposes it through `Deref`/`DerefMut`, so callers can
/// use `encoder.current_offset()`, `encoder.finalize()`, and so on directly
/// without this type duplicating `CodeBuffer`'s API surface.
pub struct Encoder {
    buffer: CodeBuffer,
}

impl std::ops::Deref for Encoder {
    type Target = CodeBuffer;
    fn deref(&self) -> &CodeBuffer {
        &self.buffer
    }
}

impl std::ops::DerefMut for Encoder {
    fn deref_mut(&mut self) -> &mut CodeBuffer {
        &mut self.buffer
    }
}

/// REX prefix bits: `0100WRXB`. `X` (SIB index extension) is always 0 —
/// this encoder never emits a scaled-index byte.
fn rex_byte(w: bool, r: bool, b: bool) -> u8 {
    0x40 | ((w as u8) << 3) | ((r as u8) << 2) | ((b as u8) << 0)
}

/// `true` when `reg`, used at 1-byte width, needs a REX prefix just to
/// select `spl/bpl/sil/dil` over the legacy `ah/bh/ch/dh` encoding of the
/// same ModR/M bits (ids 4..=7 without a REX byte present).
fn byte_operand_forces_rex(reg: Register) -> bool {
    reg.size() == 1 && (4..=7).contains(&reg.low_bits()) && !reg.needs_rex_extension()
}

impl Encoder {
    pub fn with_capacity(capacity: usize) -> Self {
        Encoder {
            buffer: CodeBuffer::with_capacity(capacity),
        }
    }

    pub fn finalize(self) -> Result<Vec<u8>, JitError> {
        self.buffer.finalize()
    }

    fn emit_rex_for_regs(&mut self, w: bool, reg: Register, rm: Register) -> Result<(), JitError> {
        let r = reg.needs_rex_extension();
        let b = rm.needs_rex_extension();
        let force = byte_operand_forces_rex(reg) || byte_operand_forces_rex(rm);
        if w || r || b || force {
            self.buffer.emit8(rex_byte(w, r, b))?;
        }
        Ok(())
    }

    fn emit_rex_for_rm_only(&mut self, w: bool, rm: Register) -> Result<(), JitError> {
        let b = rm.needs_rex_extension();
        let force = byte_operand_forces_rex(rm);
        if w || b || force {
            self.buffer.emit8(rex_byte(w, false, b))?;
        }
        Ok(())
    }

    fn emit_operand_size_prefix(&mut self, size: u8) -> Result<(), JitError> {
        if size == 2 {
            self.buffer.emit8(0x66)?;
        }
        Ok(())
    }

    fn modrm(mode: u8, reg_field: u8, rm_field: u8) -> u8 {
        (mode << 6) | ((reg_field & 0x7) << 3) | (rm_field & 0x7)
    }

    /// Emits `OPCODE operand, operand` preceded by the hex bytes of
    /// `[start, current_offset)` to the diagnostics sink, when one is
    /// attached. A no-op (and the hex formatting is skipped entirely) when
    /// diagnostics are disabled, matching the encoder's default of paying
    /// nothing for a listing nobody asked for.
    fn trace_instruction(&mut self, start: u32, text: std::fmt::Arguments<'_>) {
        if !self.buffer.diagnostics_enabled() {
            return;
        }
        let end = self.buffer.current_offset() as usize;
        let bytes = &self.buffer.as_bytes()[start as usize..end];
        let mut hex = String::with_capacity(bytes.len() * 3);
        for b in bytes {
            use std::fmt::Write as _;
            let _ = write!(hex, "{b:02X} ");
        }
        self.buffer.trace(format_args!("{hex:<30}{text}"));
    }

    /// Emits the ModR/M (and, where needed, SIB and displacement) bytes
    /// addressing `mem` with `reg_field` in the ModR/M.reg position — used
    /// both for a true register operand (Group1 reg,reg) and for the
    /// `/digit` opcode extension (Group1 reg,imm).
    fn emit_modrm_mem(&mut self, reg_field: u8, mem: MemoryOperand) -> Result<(), JitError> {
        let base = mem.base;
        let needs_sib = base.is_sib_required_base();
        let disp_required = base.is_disp_required_base();

        let (mode, use_disp8, use_disp32) = if mem.displacement == 0 && !disp_required {
            (0b00, false, false)
        } else if i8::try_from(mem.displacement).is_ok() {
            (0b01, true, false)
        } else {
            (0b10, false, true)
        };

        let rm_field = if needs_sib { 0b100 } else { base.low_bits() };
        self.buffer.emit8(Self::modrm(mode, reg_field, rm_field))?;

        if needs_sib {
            // scale=00, index=100 (none), base = base register's low bits.
            self.buffer.emit8(0x24 | (base.low_bits() & 0x7))?;
        }

        if use_disp8 {
            self.buffer.emit8(mem.displacement as i8 as u8)?;
        } else if use_disp32 || (mem.displacement == 0 && disp_required) {
            self.buffer.emit32(mem.displacement as u32)?;
        }
        Ok(())
    }

    // ---- MOV ----------------------------------------------------------

    pub fn mov_reg_reg(&mut self, dst: Register, src: Register) -> Result<(), JitError> {
        debug_assert_eq!(dst.size(), src.size());
        let start = self.buffer.current_offset();
        self.emit_operand_size_prefix(dst.size())?;
        let w = dst.size() == 8;
        self.emit_rex_for_regs(w, src, dst)?;
        let opcode = if dst.size() == 1 { 0x88 } else { 0x89 };
        self.buffer.emit8(opcode)?;
        self.buffer
            .emit8(Self::modrm(0b11, src.low_bits(), dst.low_bits()))?;
        self.trace_instruction(start, format_args!("mov {dst}, {src}"));
        Ok(())
    }

    pub fn mov_reg_mem(&mut self, dst: Register, mem: MemoryOperand) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        self.emit_operand_size_prefix(dst.size())?;
        let w = dst.size() == 8;
        self.emit_rex_for_regs(w, dst, mem.base)?;
        let opcode = if dst.size() == 1 { 0x8A } else { 0x8B };
        self.buffer.emit8(opcode)?;
        self.emit_modrm_mem(dst.low_bits(), mem)?;
        self.trace_instruction(start, format_args!("mov {dst}, {mem}"));
        Ok(())
    }

    pub fn mov_mem_reg(&mut self, mem: MemoryOperand, src: Register) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        self.emit_operand_size_prefix(src.size())?;
        let w = src.size() == 8;
        self.emit_rex_for_regs(w, src, mem.base)?;
        let opcode = if src.size() == 1 { 0x88 } else { 0x89 };
        self.buffer.emit8(opcode)?;
        self.emit_modrm_mem(src.low_bits(), mem)?;
        self.trace_instruction(start, format_args!("mov {mem}, {src}"));
        Ok(())
    }

    /// `MOV reg, imm`. 64-bit destinations use the `B8+rd imm64` ("movabs")
    /// form; everything else uses `B8+rd imm32` (or `imm16`/`imm8`).
    pub fn mov_reg_imm(&mut self, dst: Register, value: u64) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        self.emit_operand_size_prefix(dst.size())?;
        self.emit_rex_for_rm_only(dst.size() == 8, dst)?;
        let base_opcode = if dst.size() == 1 { 0xB0 } else { 0xB8 };
        self.buffer.emit8(base_opcode + dst.low_bits())?;
        match dst.size() {
            1 => self.buffer.emit8(value as u8)?,
            2 => self.buffer.emit_bytes(&(value as u16).to_le_bytes())?,
            4 => self.buffer.emit32(value as u32)?,
            8 => self.buffer.emit64(value)?,
            _ => unreachable!(),
        }
        self.trace_instruction(start, format_args!("mov {dst}, {value:#x}"));
        Ok(())
    }

    /// Zero-extending load, used when a dereference reads a narrower field
    /// than the register holding the result.
    pub fn movzx_reg_mem(
        &mut self,
        dst: Register,
        mem: MemoryOperand,
        src_size: u8,
    ) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        self.emit_rex_for_regs(dst.size() == 8, dst, mem.base)?;
        self.buffer.emit8(0x0F)?;
        let opcode = if src_size == 1 { 0xB6 } else { 0xB7 };
        self.buffer.emit8(opcode)?;
        self.emit_modrm_mem(dst.low_bits(), mem)?;
        self.trace_instruction(start, format_args!("movzx {dst}, {mem}"));
        Ok(())
    }

    pub fn movsx_reg_mem(
        &mut self,
        dst: Register,
        mem: MemoryOperand,
        src_size: u8,
    ) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        self.emit_rex_for_regs(dst.size() == 8, dst, mem.base)?;
        self.buffer.emit8(0x0F)?;
        let opcode = if src_size == 1 { 0xBE } else { 0xBF };
        self.buffer.emit8(opcode)?;
        self.emit_modrm_mem(dst.low_bits(), mem)?;
        self.trace_instruction(start, format_args!("movsx {dst}, {mem}"));
        Ok(())
    }

    // ---- LEA -----------------------------------------------------------

    pub fn lea(&mut self, dst: Register, mem: MemoryOperand) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        self.emit_rex_for_regs(dst.size() == 8, dst, mem.base)?;
        self.buffer.emit8(0x8D)?;
        self.emit_modrm_mem(dst.low_bits(), mem)?;
        self.trace_instruction(start, format_args!("lea {dst}, {mem}"));
        Ok(())
    }

    // ---- Group 1 ALU -----------------------------------------------------

    pub fn alu_reg_reg(&mut self, op: AluOp, dst: Register, src: Register) -> Result<(), JitError> {
        debug_assert_eq!(dst.size(), src.size());
        let start = self.buffer.current_offset();
        self.emit_operand_size_prefix(dst.size())?;
        self.emit_rex_for_regs(dst.size() == 8, src, dst)?;
        let opcode = op.base_opcode() + if dst.size() == 1 { 0x00 } else { 0x01 };
        self.buffer.emit8(opcode)?;
        self.buffer
            .emit8(Self::modrm(0b11, src.low_bits(), dst.low_bits()))?;
        self.trace_instruction(start, format_args!("{op} {dst}, {src}"));
        Ok(())
    }

    /// `dst <- dst OP [mem]`.
    pub fn alu_reg_mem(&mut self, op: AluOp, dst: Register, mem: MemoryOperand) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        self.emit_operand_size_prefix(dst.size())?;
        self.emit_rex_for_regs(dst.size() == 8, dst, mem.base)?;
        let opcode = op.base_opcode() + if dst.size() == 1 { 0x02 } else { 0x03 };
        self.buffer.emit8(opcode)?;
        self.emit_modrm_mem(dst.low_bits(), mem)?;
        self.trace_instruction(start, format_args!("{op} {dst}, {mem}"));
        Ok(())
    }

    /// `dst <- dst OP imm`, choosing the `AL`/`RAX` short form, the
    /// sign-extended `imm8` form, or the full `imm32` form depending on
    /// which one fits.
    pub fn alu_reg_imm(&mut self, op: AluOp, dst: Register, value: i64) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        self.emit_operand_size_prefix(dst.size())?;
        self.emit_rex_for_rm_only(dst.size() == 8, dst)?;

        if dst.low_bits() == 0 && !dst.needs_rex_extension() {
            // AL / AX / EAX / RAX short form.
            let opcode = op.base_opcode() + if dst.size() == 1 { 0x04 } else { 0x05 };
            self.buffer.emit8(opcode)?;
            self.emit_immediate_for_size(dst.size(), value)?;
            self.trace_instruction(start, format_args!("{op} {dst}, {value:#x}"));
            return Ok(());
        }

        if dst.size() == 1 {
            self.buffer.emit8(0x80)?;
            self.buffer
                .emit8(Self::modrm(0b11, op.extension(), dst.low_bits()))?;
            self.buffer.emit8(value as u8)?;
            self.trace_instruction(start, format_args!("{op} {dst}, {value:#x}"));
            return Ok(());
        }

        if i8::try_from(value).is_ok() {
            self.buffer.emit8(0x83)?;
            self.buffer
                .emit8(Self::modrm(0b11, op.extension(), dst.low_bits()))?;
            self.buffer.emit8(value as i8 as u8)?;
            self.trace_instruction(start, format_args!("{op} {dst}, {value:#x}"));
            return Ok(());
        }

        let fits_32 = i32::try_from(value).is_ok();
        if !fits_32 {
            return Err(JitError::ImmediateTooLarge { value: value as u64 });
        }
        self.buffer.emit8(0x81)?;
        self.buffer
            .emit8(Self::modrm(0b11, op.extension(), dst.low_bits()))?;
        self.emit_immediate_for_size(dst.size(), value)?;
        self.trace_instruction(start, format_args!("{op} {dst}, {value:#x}"));
        Ok(())
    }

    fn emit_immediate_for_size(&mut self, size: u8, value: i64) -> Result<(), JitError> {
        match size {
            1 => self.buffer.emit8(value as u8),
            2 => self.buffer.emit_bytes(&(value as i16).to_le_bytes()),
            4 | 8 => self.buffer.emit32(value as i32 as u32),
            _ => unreachable!(),
        }
    }

    /// Left-shift by an immediate count; the only multiply-like operation
    /// this encoder supports, used solely for power-of-two-scaled pointer
    /// arithmetic — not exposed as a general ALU op.
    pub fn shl_reg_imm8(&mut self, dst: Register, shift: u8) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        self.emit_rex_for_rm_only(dst.size() == 8, dst)?;
        let opcode = if dst.size() == 1 { 0xC0 } else { 0xC1 };
        self.buffer.emit8(opcode)?;
        self.buffer.emit8(Self::modrm(0b11, 4, dst.low_bits()))?;
        self.buffer.emit8(shift)?;
        self.trace_instruction(start, format_args!("shl {dst}, {shift:#x}"));
        Ok(())
    }

    // ---- stack / control flow ------------------------------------------

    pub fn push_reg(&mut self, reg: Register) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        if reg.needs_rex_extension() {
            self.buffer.emit8(rex_byte(false, false, true))?;
        }
        self.buffer.emit8(0x50 + reg.low_bits())?;
        self.trace_instruction(start, format_args!("push {reg}"));
        Ok(())
    }

    pub fn pop_reg(&mut self, reg: Register) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        if reg.needs_rex_extension() {
            self.buffer.emit8(rex_byte(false, false, true))?;
        }
        self.buffer.emit8(0x58 + reg.low_bits())?;
        self.trace_instruction(start, format_args!("pop {reg}"));
        Ok(())
    }

    pub fn ret(&mut self) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        self.buffer.emit8(0xC3)?;
        self.trace_instruction(start, format_args!("ret"));
        Ok(())
    }

    pub fn jmp_label(&mut self, label: Label) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        self.buffer.emit8(0xE9)?;
        self.buffer.emit_rel32_to_label(label)?;
        self.trace_instruction(start, format_args!("jmp {label}"));
        Ok(())
    }

    pub fn jcc_label(&mut self, cc: ConditionCode, label: Label) -> Result<(), JitError> {
        let start = self.buffer.current_offset();
        self.buffer.emit8(0x0F)?;
        self.buffer.emit8(0x80 | cc.tttn())?;
        self.buffer.emit_rel32_to_label(label)?;
        self.trace_instruction(start, format_args!("{cc} {label}"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::id;
    use pretty_assertions::assert_eq;

    fn gpr(id: u8, size: u8) -> Register {
        Register::gpr(id, size)
    }

    #[test]
    fn mov_reg_reg_64bit_needs_rex_w() {
        let mut e = Encoder::with_capacity(64);
        e.mov_reg_reg(gpr(id::RBX, 8), gpr(id::RAX, 8)).unwrap();
        let bytes = e.finalize().unwrap();
        // REX.W, MOV r/m64 r64, ModRM(11 000 011) = C3
        assert_eq!(bytes, vec![0x48, 0x89, 0xC3]);
    }

    #[test]
    fn mov_reg_reg_32bit_no_rex_when_low_registers() {
        let mut e = Encoder::with_capacity(64);
        e.mov_reg_reg(gpr(id::RCX, 4), gpr(id::RDX, 4)).unwrap();
        let bytes = e.finalize().unwrap();
        assert_eq!(bytes, vec![0x89, 0xD1]);
    }

    #[test]
    fn mov_extended_register_sets_rex_b() {
        let mut e = Encoder::with_capacity(64);
        e.mov_reg_reg(gpr(id::R8, 8), gpr(id::RAX, 8)).unwrap();
        let bytes = e.finalize().unwrap();
        // REX.W + REX.B (0x49), MOV r/m64 r64, ModRM(11 000 000) = C0
        assert_eq!(bytes, vec![0x49, 0x89, 0xC0]);
    }

    #[test]
    fn movabs_imm64() {
        let mut e = Encoder::with_capacity(64);
        e.mov_reg_imm(gpr(id::RAX, 8), 0x0123_4567_89AB_CDEF)
            .unwrap();
        let bytes = e.finalize().unwrap();
        assert_eq!(bytes[0], 0x48);
        assert_eq!(bytes[1], 0xB8);
        assert_eq!(&bytes[2..], &0x0123_4567_89AB_CDEFu64.to_le_bytes());
    }

    #[test]
    fn add_reg_imm_uses_short_form_for_rax() {
        let mut e = Encoder::with_capacity(64);
        e.alu_reg_imm(AluOp::Add, gpr(id::RAX, 8), 10).unwrap();
        let bytes = e.finalize().unwrap();
        // REX.W, 0x05 (ADD RAX, imm32), imm32 little-endian
        assert_eq!(bytes[0], 0x48);
        assert_eq!(bytes[1], 0x05);
    }

    #[test]
    fn add_reg_imm_uses_imm8_form_when_it_fits() {
        let mut e = Encoder::with_capacity(64);
        e.alu_reg_imm(AluOp::Add, gpr(id::RBX, 8), 5).unwrap();
        let bytes = e.finalize().unwrap();
        assert_eq!(bytes[0], 0x48);
        assert_eq!(bytes[1], 0x83);
    }

    #[test]
    fn rsp_base_memory_operand_needs_sib() {
        let mut e = Encoder::with_capacity(64);
        e.mov_reg_mem(gpr(id::RAX, 8), MemoryOperand::new(gpr(id::RSP, 8), 8))
            .unwrap();
        let bytes = e.finalize().unwrap();
        // REX.W, MOV r64, r/m64 (0x8B), ModRM(01 000 100), SIB(00 100 100), disp8=8
        assert_eq!(bytes, vec![0x48, 0x8B, 0x44, 0x24, 0x08]);
    }

    #[test]
    fn rbp_base_with_zero_displacement_still_emits_disp8() {
        let mut e = Encoder::with_capacity(64);
        e.mov_reg_mem(gpr(id::RAX, 8), MemoryOperand::new(gpr(id::RBP, 8), 0))
            .unwrap();
        let bytes = e.finalize().unwrap();
        assert_eq!(bytes, vec![0x48, 0x8B, 0x45, 0x00]);
    }

    #[test]
    fn jcc_emits_two_byte_opcode_and_patches_rel32() {
        let mut e = Encoder::with_capacity(64);
        let label = e.allocate_label();
        e.jcc_label(ConditionCode::Jz, label).unwrap();
        e.place_label(label);
        let bytes = e.finalize().unwrap();
        assert_eq!(&bytes[0..2], &[0x0F, 0x84]);
        assert_eq!(i32::from_le_bytes(bytes[2..6].try_into().unwrap()), 0);
    }
}
