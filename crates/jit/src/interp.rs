// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! A reference evaluator over the same node IR the JIT compiles, used only
//! by tests to check value equivalence: `compile(T)(I) == interpret(T, I)`.
//! Kept crate-private and deliberately
//! trivial (a `match` over the node enum, no code generation) so it cannot
//! plausibly share a bug with [`crate::node::EmitContext::emit`].

use xjit_types::{ConditionCode, ScalarKind, TypeDescriptor};

use crate::arena::{NodeArena, NodeId};
use crate::node::{BinOp, Node};

#[derive(Debug, Clone, Copy)]
enum Value {
    Scalar(u64),
    Flag(bool),
}

impl Value {
    fn scalar(self) -> u64 {
        match self {
            Value::Scalar(v) => v,
            Value::Flag(_) => panic!("a condition code is never used as a scalar value"),
        }
    }
}

/// Masks `bits` down to `ty`'s width and, for signed integer types,
/// sign-extends back out to 64 bits — the same truncate-then-extend
/// behavior the compiled code gets for free from operand-sized registers.
pub(crate) fn narrow(bits: u64, ty: TypeDescriptor) -> u64 {
    match ty.size_bytes() {
        1 => {
            let v = bits as u8;
            if ty.is_signed() {
                v as i8 as i64 as u64
            } else {
                v as u64
            }
        }
        2 => {
            let v = bits as u16;
            if ty.is_signed() {
                v as i16 as i64 as u64
            } else {
                v as u64
            }
        }
        4 => {
            let v = bits as u32;
            if ty.is_signed() {
                v as i32 as i64 as u64
            } else {
                v as u64
            }
        }
        8 => bits,
        _ => unreachable!("scalar sizes are 1, 2, 4, or 8 bytes"),
    }
}

fn compare(cc: ConditionCode, lhs: u64, rhs: u64, ty: TypeDescriptor) -> bool {
    if ty.is_signed() {
        let (l, r) = (lhs as i64, rhs as i64);
        match cc {
            ConditionCode::Jg => l > r,
            ConditionCode::Jng => l <= r,
            ConditionCode::Jl => l < r,
            ConditionCode::Jnl => l >= r,
            ConditionCode::Jz => l == r,
            ConditionCode::Jnz => l != r,
            ConditionCode::Ja | ConditionCode::Jna | ConditionCode::Jb | ConditionCode::Jnb => {
                unreachable!("Ja/Jna/Jb/Jnb are the unsigned comparisons")
            }
        }
    } else {
        match cc {
            ConditionCode::Ja => lhs > rhs,
            ConditionCode::Jna => lhs <= rhs,
            ConditionCode::Jb => lhs < rhs,
            ConditionCode::Jnb => lhs >= rhs,
            ConditionCode::Jz => lhs == rhs,
            ConditionCode::Jnz => lhs != rhs,
            ConditionCode::Jg | ConditionCode::Jng | ConditionCode::Jl | ConditionCode::Jnl => {
                unreachable!("Jg/Jng/Jl/Jnl are the signed comparisons")
            }
        }
    }
}

fn eval(arena: &NodeArena<Node>, id: NodeId, params: &[u64]) -> Value {
    match arena.get(id).clone() {
        Node::Immediate { bits, .. } => Value::Scalar(bits),
        Node::Parameter { index, ty } => Value::Scalar(narrow(params[index as usize], ty)),
        Node::Binary { op, lhs, rhs, ty } => {
            let lhs_ty = arena.get(lhs).type_descriptor().unwrap();
            let rhs_ty = arena.get(rhs).type_descriptor().unwrap();
            let l = eval(arena, lhs, params).scalar();
            let r = eval(arena, rhs, params).scalar();
            if op == BinOp::Add && lhs_ty.is_pointer() && !rhs_ty.is_pointer() {
                let pointee_size = match lhs_ty.kind {
                    ScalarKind::Pointer { pointee_size } => pointee_size as u64,
                    _ => unreachable!(),
                };
                return Value::Scalar(l.wrapping_add(r.wrapping_mul(pointee_size.max(1))));
            }
            let raw = match op {
                BinOp::Add => l.wrapping_add(r),
                BinOp::Sub => l.wrapping_sub(r),
                BinOp::Or => l | r,
            };
            Value::Scalar(narrow(raw, ty))
        }
        Node::FieldPointer { base, offset, .. } => {
            let base_val = eval(arena, base, params).scalar();
            Value::Scalar(base_val.wrapping_add(offset as i64 as u64))
        }
        Node::Deref { ptr, ty } => {
            let addr = eval(arena, ptr, params).scalar() as *const u8;
            let raw = unsafe {
                match ty.size_bytes() {
                    1 => *addr as u64,
                    2 => (addr as *const u16).read_unaligned() as u64,
                    4 => (addr as *const u32).read_unaligned() as u64,
                    8 => (addr as *const u64).read_unaligned(),
                    _ => unreachable!(),
                }
            };
            Value::Scalar(narrow(raw, ty))
        }
        Node::Compare {
            cc,
            lhs,
            rhs,
            operand_ty,
        } => {
            let l = eval(arena, lhs, params).scalar();
            let r = eval(arena, rhs, params).scalar();
            Value::Flag(compare(cc, l, r, operand_ty))
        }
        Node::Conditional {
            cond,
            then_val,
            else_val,
            ..
        } => {
            let taken = match eval(arena, cond, params) {
                Value::Flag(b) => b,
                Value::Scalar(_) => panic!("Conditional's condition must be a Compare node"),
            };
            if taken {
                eval(arena, then_val, params)
            } else {
                eval(arena, else_val, params)
            }
        }
    }
}

/// Evaluates `root` against `params` (one `u64`-encoded bit pattern per
/// parameter slot, regardless of that parameter's declared width/sign) and
/// returns the result, narrowed to the root's declared type exactly the way
/// the compiled code's result register is.
pub(crate) fn interpret(arena: &NodeArena<Node>, root: NodeId, params: &[u64]) -> u64 {
    eval(arena, root, params).scalar()
}
