// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use xjit_encoder_x86_64::{AluOp, Encoder, MemoryOperand, Register};
use xjit_types::{ConditionCode, JitError, ScalarKind, TypeDescriptor};

use crate::arena::{NodeArena, NodeId};
use crate::register_file::RegisterFile;

/// A binary operator over two same-typed scalar operands. Multiplication
/// has no variant here: it's out of scope (no encoder support, no
/// code-selection rule), so a builder method for it would have nothing to
/// lower to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Or,
}

impl BinOp {
    fn alu_op(self) -> AluOp {
        match self {
            BinOp::Add => AluOp::Add,
            BinOp::Sub => AluOp::Sub,
            BinOp::Or => AluOp::Or,
        }
    }

    fn is_commutative(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Or)
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Or => "or",
        }
    }
}

/// One node of the expression tree. A tagged variant rather than a
/// virtual-dispatch node hierarchy — `emit` is a single `match`, closed
/// over the small fixed set of kinds below, with no vtable indirection.
#[derive(Debug, Clone)]
pub enum Node {
    Immediate {
        bits: u64,
        ty: TypeDescriptor,
    },
    Parameter {
        index: u8,
        ty: TypeDescriptor,
    },
    Binary {
        op: BinOp,
        lhs: NodeId,
        rhs: NodeId,
        ty: TypeDescriptor,
    },
    /// `base_pointer + constant_offset`, statically typed as `*Field`.
    FieldPointer {
        base: NodeId,
        offset: i32,
        ty: TypeDescriptor,
    },
    Deref {
        ptr: NodeId,
        ty: TypeDescriptor,
    },
    Compare {
        cc: ConditionCode,
        lhs: NodeId,
        rhs: NodeId,
        operand_ty: TypeDescriptor,
    },
    Conditional {
        cond: NodeId,
        then_val: NodeId,
        else_val: NodeId,
        ty: TypeDescriptor,
    },
}

impl Node {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Immediate { .. } => "Immediate",
            Node::Parameter { .. } => "Parameter",
            Node::Binary { .. } => "Binary",
            Node::FieldPointer { .. } => "FieldPointer",
            Node::Deref { .. } => "Deref",
            Node::Compare { .. } => "Compare",
            Node::Conditional { .. } => "Conditional",
        }
    }

    /// The node's declared scalar type. `Compare` has none — it produces a
    /// flag, not a value.
    pub fn type_descriptor(&self) -> Option<TypeDescriptor> {
        match self {
            Node::Immediate { ty, .. }
            | Node::Parameter { ty, .. }
            | Node::Binary { ty, .. }
            | Node::FieldPointer { ty, .. }
            | Node::Deref { ty, .. }
            | Node::Conditional { ty, .. } => Some(*ty),
            Node::Compare { .. } => None,
        }
    }
}

/// Where a node's emitted result lives: the currency code selection
/// operates on.
#[derive(Debug, Clone, Copy)]
pub enum Storage {
    Reg(Register),
    /// The value has not been loaded yet: it lives at `[base + offset]`,
    /// `size` bytes wide. A consumer that can take a memory operand
    /// (`alu_reg_mem`, a `CMP` against memory) folds this in directly;
    /// anything else materializes it into a register on demand via
    /// [`EmitContext::resolve_to_register`]/[`EmitContext::materialize_into`],
    /// which consult `signed` to choose a plain load, `MOVZX`, or `MOVSX`
    /// when the destination register is wider than `size`.
    Indirect {
        base: Register,
        offset: i32,
        size: u8,
        signed: bool,
    },
    Immediate(u64),
    /// A comparison result: no register is allocated, the condition code
    /// is carried directly.
    Flags(ConditionCode),
}

/// An emitted node's result, plus whether the register(s) it names were
/// allocated for this subtree (and therefore may be clobbered/released by
/// the consumer) or are borrowed from somewhere with a longer lifetime —
/// concretely, a parameter's ABI register, which stays reserved for the
/// whole compile rather than being precisely freed after its last use.
#[derive(Debug, Clone, Copy)]
pub struct Emitted {
    pub storage: Storage,
    pub owned: bool,
}

impl Emitted {
    fn owned_reg(reg: Register) -> Emitted {
        Emitted {
            storage: Storage::Reg(reg),
            owned: true,
        }
    }

    fn borrowed_reg(reg: Register) -> Emitted {
        Emitted {
            storage: Storage::Reg(reg),
            owned: false,
        }
    }
}

/// Counts how many times each parameter slot is referenced in the subtree
/// rooted at `id`. Used by [`EmitContext`] to know, without any ordering
/// assumption beyond "this traversal visits nodes in evaluation order",
/// which `Parameter` occurrence is the last one: a parameter's register is
/// marked reserved from the start of compilation and released only after
/// its last use, which this pre-pass computes.
pub fn count_parameter_uses(arena: &NodeArena<Node>, id: NodeId, counts: &mut [u32]) {
    match arena.get(id) {
        Node::Immediate { .. } => {}
        Node::Parameter { index, .. } => counts[*index as usize] += 1,
        Node::Binary { lhs, rhs, .. } => {
            count_parameter_uses(arena, *lhs, counts);
            count_parameter_uses(arena, *rhs, counts);
        }
        Node::FieldPointer { base, .. } => count_parameter_uses(arena, *base, counts),
        Node::Deref { ptr, .. } => count_parameter_uses(arena, *ptr, counts),
        Node::Compare { lhs, rhs, .. } => {
            count_parameter_uses(arena, *lhs, counts);
            count_parameter_uses(arena, *rhs, counts);
        }
        Node::Conditional {
            cond,
            then_val,
            else_val,
            ..
        } => {
            count_parameter_uses(arena, *cond, counts);
            count_parameter_uses(arena, *then_val, counts);
            count_parameter_uses(arena, *else_val, counts);
        }
    }
}

/// Bundles the encoder, register file, and the arena the tree lives in —
/// everything a node's `emit` needs.
pub struct EmitContext<'a> {
    pub encoder: &'a mut Encoder,
    pub registers: &'a mut RegisterFile,
    pub arena: &'a NodeArena<Node>,
    /// `param_registers[i]` is the GPR id the i-th parameter is bound to.
    pub param_registers: &'a [u8],
    /// Total references to parameter `i` across the whole tree being
    /// emitted, from [`count_parameter_uses`].
    pub param_use_counts: &'a [u32],
    /// How many of parameter `i`'s references have been emitted so far;
    /// advanced in place as `emit` walks the tree.
    pub param_consumed: &'a mut [u32],
}

impl<'a> EmitContext<'a> {
    /// Resolves any storage to a register holding the value, allocating
    /// and materializing a fresh one only when necessary. Returns the
    /// register and whether it's owned by the caller (and therefore safe
    /// to clobber/release).
    fn resolve_to_register(
        &mut self,
        emitted: Emitted,
        size: u8,
        node_kind: &'static str,
    ) -> Result<(Register, bool), JitError> {
        match emitted.storage {
            Storage::Reg(r) => Ok((r.with_size(size), emitted.owned)),
            Storage::Indirect {
                base,
                offset,
                size: src_size,
                signed,
            } => {
                let dst_id = self.registers.allocate_gpr(node_kind)?;
                let dst = Register::gpr(dst_id, size);
                self.load_indirect(dst, base, offset, src_size, signed)?;
                if emitted.owned {
                    self.registers.release_gpr(base.id());
                }
                Ok((dst, true))
            }
            Storage::Immediate(bits) => {
                let dst_id = self.registers.allocate_gpr(node_kind)?;
                let dst = Register::gpr(dst_id, size);
                self.encoder.mov_reg_imm(dst, bits)?;
                Ok((dst, true))
            }
            Storage::Flags(_) => unreachable!("a condition code is never used as a scalar value"),
        }
    }

    /// Loads `[base + offset]` (`src_size` bytes, `signed`) into `dst`,
    /// widening with `MOVZX`/`MOVSX` when `dst` is wider than the stored
    /// value and a plain same-width `MOV` otherwise — including when `dst`
    /// is narrower, where reading fewer low-order bytes is already correct.
    /// A 32-bit source widened to a 64-bit register needs no extension
    /// instruction: writing the 32-bit sub-register already zeroes the
    /// upper half on x86-64.
    fn load_indirect(
        &mut self,
        dst: Register,
        base: Register,
        offset: i32,
        src_size: u8,
        signed: bool,
    ) -> Result<(), JitError> {
        let mem = MemoryOperand::new(base, offset);
        if dst.size() <= src_size {
            self.encoder.mov_reg_mem(dst, mem)
        } else if src_size <= 2 {
            if signed {
                self.encoder.movsx_reg_mem(dst, mem, src_size)
            } else {
                self.encoder.movzx_reg_mem(dst, mem, src_size)
            }
        } else {
            self.encoder.mov_reg_mem(dst.with_size(src_size), mem)
        }
    }

    /// Writes `emitted`'s value into `dst`, releasing any owned temporary
    /// that isn't `dst` itself.
    fn materialize_into(
        &mut self,
        emitted: Emitted,
        dst: Register,
    ) -> Result<(), JitError> {
        match emitted.storage {
            Storage::Reg(r) => {
                let r = r.with_size(dst.size());
                if r.id() != dst.id() {
                    self.encoder.mov_reg_reg(dst, r)?;
                }
                if emitted.owned && r.id() != dst.id() {
                    self.registers.release_gpr(r.id());
                }
            }
            Storage::Indirect {
                base,
                offset,
                size: src_size,
                signed,
            } => {
                self.load_indirect(dst, base, offset, src_size, signed)?;
                if emitted.owned {
                    self.registers.release_gpr(base.id());
                }
            }
            Storage::Immediate(bits) => {
                self.encoder.mov_reg_imm(dst, bits)?;
            }
            Storage::Flags(_) => unreachable!("a condition code is never used as a scalar value"),
        }
        Ok(())
    }

    fn release(&mut self, emitted: Emitted) {
        if emitted.owned {
            if let Storage::Reg(r) = emitted.storage {
                self.registers.release_gpr(r.id());
            }
            if let Storage::Indirect { base, .. } = emitted.storage {
                self.registers.release_gpr(base.id());
            }
        }
    }

    /// Emits `id`, requesting (best-effort) that a plain scalar result end
    /// up in `requested`. Used by `Conditional` to place both arms in the
    /// same result register.
    pub fn emit_into(&mut self, id: NodeId, requested: Register) -> Result<(), JitError> {
        let emitted = self.emit(id)?;
        self.materialize_into(emitted, requested)
    }

    pub fn emit(&mut self, id: NodeId) -> Result<Emitted, JitError> {
        let node = self.arena.get(id).clone();
        match node {
            Node::Immediate { bits, .. } => Ok(Emitted {
                storage: Storage::Immediate(bits),
                owned: true,
            }),
            Node::Parameter { index, ty } => {
                let reg_id = self.param_registers[index as usize];
                self.param_consumed[index as usize] += 1;
                let is_last_use =
                    self.param_consumed[index as usize] == self.param_use_counts[index as usize];
                let reg = Register::gpr(reg_id, ty.size_bytes());
                Ok(if is_last_use {
                    Emitted::owned_reg(reg)
                } else {
                    Emitted::borrowed_reg(reg)
                })
            }
            Node::Binary { op, lhs, rhs, ty } => self.emit_binary(op, lhs, rhs, ty),
            Node::FieldPointer { base, offset, ty } => self.emit_field_pointer(base, offset, ty),
            Node::Deref { ptr, ty } => self.emit_deref(ptr, ty),
            Node::Compare {
                cc,
                lhs,
                rhs,
                operand_ty,
            } => self.emit_compare(cc, lhs, rhs, operand_ty),
            Node::Conditional {
                cond,
                then_val,
                else_val,
                ty,
            } => self.emit_conditional(cond, then_val, else_val, ty),
        }
    }

    fn emit_binary(
        &mut self,
        op: BinOp,
        lhs: NodeId,
        rhs: NodeId,
        ty: TypeDescriptor,
    ) -> Result<Emitted, JitError> {
        let lhs_ty = self.arena.get(lhs).type_descriptor().unwrap();
        let rhs_ty = self.arena.get(rhs).type_descriptor().unwrap();

        // Pointer + (scaled) integer, restricted to power-of-two element
        // sizes: a left shift stands in for the multiply this encoder
        // never implements.
        if op == BinOp::Add && lhs_ty.is_pointer() && !rhs_ty.is_pointer() {
            return self.emit_scaled_pointer_add(lhs, rhs, lhs_ty);
        }

        let size = ty.size_bytes();
        let node_kind = op.name();

        let lhs_emitted = self.emit(lhs)?;
        // `(Imm v, Reg rr)` for commutative ops: swap and proceed.
        // `Sub`/non-commutative ops materialize the immediate lhs into a
        // fresh register instead of swapping operand order.
        if let Storage::Immediate(lhs_bits) = lhs_emitted.storage {
            if op.is_commutative() {
                let rhs_emitted = self.emit(rhs)?;
                return self.combine_into_register(op, rhs_emitted, Storage::Immediate(lhs_bits), size, node_kind);
            }
            let dst_id = self.registers.allocate_gpr(node_kind)?;
            let dst = Register::gpr(dst_id, size);
            self.encoder.mov_reg_imm(dst, lhs_bits)?;
            let rhs_emitted = self.emit(rhs)?;
            return self.apply_alu(op, dst, rhs_emitted, node_kind);
        }

        let rhs_emitted = self.emit(rhs)?;
        self.combine(op, lhs_emitted, rhs_emitted, size, node_kind)
    }

    /// `dst <- lhs OP rhs`, where `lhs` has already been reduced to a live
    /// register or is about to be (see callers).
    fn combine(
        &mut self,
        op: BinOp,
        lhs_emitted: Emitted,
        rhs_emitted: Emitted,
        size: u8,
        node_kind: &'static str,
    ) -> Result<Emitted, JitError> {
        let (dst, dst_owned) = self.resolve_to_register(lhs_emitted, size, node_kind)?;
        let dst = if dst_owned {
            dst
        } else {
            // Never clobber a borrowed (parameter) register in place.
            let fresh_id = self.registers.allocate_gpr(node_kind)?;
            let fresh = Register::gpr(fresh_id, size);
            self.encoder.mov_reg_reg(fresh, dst)?;
            fresh
        };
        self.apply_alu(op, dst, rhs_emitted, node_kind)
    }

    fn combine_into_register(
        &mut self,
        op: BinOp,
        primary_emitted: Emitted,
        secondary_storage: Storage,
        size: u8,
        node_kind: &'static str,
    ) -> Result<Emitted, JitError> {
        let secondary = Emitted {
            storage: secondary_storage,
            owned: true,
        };
        self.combine(op, primary_emitted, secondary, size, node_kind)
    }

    fn apply_alu(
        &mut self,
        op: BinOp,
        dst: Register,
        rhs_emitted: Emitted,
        node_kind: &'static str,
    ) -> Result<Emitted, JitError> {
        match rhs_emitted.storage {
            Storage::Reg(r) => {
                let r = r.with_size(dst.size());
                self.encoder.alu_reg_reg(op.alu_op(), dst, r)?;
                if rhs_emitted.owned {
                    self.registers.release_gpr(r.id());
                }
            }
            Storage::Indirect { base, offset, .. } => {
                self.encoder
                    .alu_reg_mem(op.alu_op(), dst, MemoryOperand::new(base, offset))?;
                if rhs_emitted.owned {
                    self.registers.release_gpr(base.id());
                }
            }
            Storage::Immediate(bits) => {
                self.alu_reg_with_immediate(op.alu_op(), dst, bits, node_kind)?;
            }
            Storage::Flags(_) => unreachable!(),
        }
        Ok(Emitted::owned_reg(dst))
    }

    /// `dst <- dst OP bits`, synthesizing the immediate through a scratch
    /// register via `MOV` when it doesn't fit the 32-bit Group-1 immediate
    /// form (`alu_reg_imm`'s own short/imm8/imm32 forms already handle
    /// anything that does).
    fn alu_reg_with_immediate(
        &mut self,
        op: AluOp,
        dst: Register,
        bits: u64,
        node_kind: &'static str,
    ) -> Result<(), JitError> {
        let fits_group1_imm = i64::try_from(bits)
            .ok()
            .map(|v| i32::try_from(v).is_ok())
            .unwrap_or(false);
        if fits_group1_imm {
            self.encoder.alu_reg_imm(op, dst, bits as i64)
        } else {
            let tmp_id = self.registers.allocate_gpr(node_kind)?;
            let tmp = Register::gpr(tmp_id, dst.size());
            self.encoder.mov_reg_imm(tmp, bits)?;
            self.encoder.alu_reg_reg(op, dst, tmp)?;
            self.registers.release_gpr(tmp_id);
            Ok(())
        }
    }

    fn emit_scaled_pointer_add(
        &mut self,
        lhs: NodeId,
        rhs: NodeId,
        pointer_ty: TypeDescriptor,
    ) -> Result<Emitted, JitError> {
        let pointee_size = match pointer_ty.kind {
            ScalarKind::Pointer { pointee_size } => pointee_size,
            _ => unreachable!(),
        };
        if pointee_size != 0 && !pointee_size.is_power_of_two() {
            return Err(JitError::TypeMismatch {
                node_kind: "pointer_add",
                expected: "power-of-two pointee size",
                found: "non-power-of-two pointee size",
            });
        }
        let shift = if pointee_size == 0 {
            0
        } else {
            pointee_size.trailing_zeros() as u8
        };

        let rhs_emitted = self.emit(rhs)?;
        let (rhs_reg, rhs_owned) = self.resolve_to_register(rhs_emitted, 8, "pointer_add")?;
        let rhs_reg = if rhs_owned {
            rhs_reg
        } else {
            let fresh_id = self.registers.allocate_gpr("pointer_add")?;
            let fresh = Register::gpr(fresh_id, 8);
            self.encoder.mov_reg_reg(fresh, rhs_reg)?;
            fresh
        };
        if shift > 0 {
            self.encoder.shl_reg_imm8(rhs_reg, shift)?;
        }

        let lhs_emitted = self.emit(lhs)?;
        let (lhs_reg, lhs_owned) = self.resolve_to_register(lhs_emitted, 8, "pointer_add")?;
        let lhs_reg = if lhs_owned {
            lhs_reg
        } else {
            let fresh_id = self.registers.allocate_gpr("pointer_add")?;
            let fresh = Register::gpr(fresh_id, 8);
            self.encoder.mov_reg_reg(fresh, lhs_reg)?;
            fresh
        };

        self.encoder.alu_reg_reg(AluOp::Add, lhs_reg, rhs_reg)?;
        self.registers.release_gpr(rhs_reg.id());
        Ok(Emitted::owned_reg(lhs_reg))
    }

    /// Resolves a pointer-typed node to a `(base register, constant offset,
    /// owned)` triple, folding a chain of `FieldPointer`s at compile time
    /// without emitting anything: `FieldPointer(FieldPointer(p, o1), o2)`
    /// walks straight to `p`'s register with offset `o1 + o2`. Anything
    /// else (a `Parameter`, a loaded pointer value from `Deref`, a
    /// `pointer_add` result, ...) is emitted normally and taken as the base
    /// at offset 0 — its value, not a further field offset, is the address.
    fn resolve_pointer_address(
        &mut self,
        id: NodeId,
        node_kind: &'static str,
    ) -> Result<(Register, i32, bool), JitError> {
        if let Node::FieldPointer { base, offset, .. } = self.arena.get(id).clone() {
            let (base_reg, inner_offset, owned) = self.resolve_pointer_address(base, node_kind)?;
            return Ok((base_reg, inner_offset + offset, owned));
        }
        let emitted = self.emit(id)?;
        let (reg, owned) = self.resolve_to_register(emitted, 8, node_kind)?;
        Ok((reg, 0, owned))
    }

    /// Reached only when a `FieldPointer`'s address is needed as a genuine
    /// value (the compile root, or an operand of a generic operator) rather
    /// than folded straight into an enclosing `FieldPointer`/`Deref` by
    /// [`EmitContext::resolve_pointer_address`] — that fold bypasses this
    /// function entirely and never emits anything for the nodes it walks
    /// through. A whole chain still costs at most one `LEA` here, folded via
    /// the same helper.
    fn emit_field_pointer(
        &mut self,
        base: NodeId,
        offset: i32,
        ty: TypeDescriptor,
    ) -> Result<Emitted, JitError> {
        let (base_reg, base_offset, base_owned) =
            self.resolve_pointer_address(base, "FieldPointer")?;
        let dst_id = self.registers.allocate_gpr("FieldPointer")?;
        let dst = Register::gpr(dst_id, 8);
        self.encoder
            .lea(dst, MemoryOperand::new(base_reg, base_offset + offset))?;
        if base_owned {
            self.registers.release_gpr(base_reg.id());
        }
        let _ = ty;
        Ok(Emitted::owned_reg(dst))
    }

    /// Folds through any `FieldPointer` chain in `ptr` and returns the
    /// dereferenced value as a deferred `Storage::Indirect`, emitting
    /// nothing: the eventual consumer (a memory-operand-capable ALU/compare,
    /// or `resolve_to_register`/`materialize_into` when a bare register is
    /// required) issues the load.
    fn emit_deref(&mut self, ptr: NodeId, ty: TypeDescriptor) -> Result<Emitted, JitError> {
        let (base_reg, offset, owned) = self.resolve_pointer_address(ptr, "Deref")?;
        Ok(Emitted {
            storage: Storage::Indirect {
                base: base_reg,
                offset,
                size: ty.size_bytes(),
                signed: ty.is_signed(),
            },
            owned,
        })
    }

    fn emit_compare(
        &mut self,
        cc: ConditionCode,
        lhs: NodeId,
        rhs: NodeId,
        operand_ty: TypeDescriptor,
    ) -> Result<Emitted, JitError> {
        let size = operand_ty.size_bytes();
        let lhs_emitted = self.emit(lhs)?;
        let (lhs_reg, lhs_owned) = self.resolve_to_register(lhs_emitted, size, "Compare")?;
        let lhs_reg = if lhs_owned {
            lhs_reg
        } else {
            let fresh_id = self.registers.allocate_gpr("Compare")?;
            let fresh = Register::gpr(fresh_id, size);
            self.encoder.mov_reg_reg(fresh, lhs_reg)?;
            fresh
        };

        let rhs_emitted = self.emit(rhs)?;
        match rhs_emitted.storage {
            Storage::Reg(r) => {
                self.encoder.alu_reg_reg(AluOp::Cmp, lhs_reg, r.with_size(size))?;
                if rhs_emitted.owned {
                    self.registers.release_gpr(r.id());
                }
            }
            Storage::Indirect { base, offset, .. } => {
                self.encoder
                    .alu_reg_mem(AluOp::Cmp, lhs_reg, MemoryOperand::new(base, offset))?;
                if rhs_emitted.owned {
                    self.registers.release_gpr(base.id());
                }
            }
            Storage::Immediate(bits) => {
                self.alu_reg_with_immediate(AluOp::Cmp, lhs_reg, bits, "Compare")?;
            }
            Storage::Flags(_) => unreachable!(),
        }
        self.registers.release_gpr(lhs_reg.id());
        Ok(Emitted {
            storage: Storage::Flags(cc),
            owned: false,
        })
    }

    fn emit_conditional(
        &mut self,
        cond: NodeId,
        then_val: NodeId,
        else_val: NodeId,
        ty: TypeDescriptor,
    ) -> Result<Emitted, JitError> {
        let cond_emitted = self.emit(cond)?;
        let cc = match cond_emitted.storage {
            Storage::Flags(cc) => cc,
            _ => {
                return Err(JitError::TypeMismatch {
                    node_kind: "Conditional",
                    expected: "Compare",
                    found: "non-comparison condition",
                })
            }
        };

        let result_id = self.registers.allocate_gpr("Conditional")?;
        let result = Register::gpr(result_id, ty.size_bytes());

        let else_label = self.encoder.allocate_label();
        let end_label = self.encoder.allocate_label();

        self.encoder.jcc_label(cc.negate(), else_label)?;
        self.emit_into(then_val, result)?;
        self.encoder.jmp_label(end_label)?;
        self.encoder.place_label(else_label);
        self.emit_into(else_val, result)?;
        self.encoder.place_label(end_label);

        Ok(Emitted::owned_reg(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binop_commutativity_matches_group1_algebra() {
        assert!(BinOp::Add.is_commutative());
        assert!(BinOp::Or.is_commutative());
        assert!(!BinOp::Sub.is_commutative());
    }
}
