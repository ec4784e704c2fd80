// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! An append-only x86-64 code buffer and instruction encoder for a single
//! compiled function body.
//!
//! Supported subset (deliberately narrow — this backs an expression-tree
//! JIT, not a general assembler):
//!
//! - 64-bit mode only, System V / Windows x64 calling-convention registers.
//! - `MOV` (register/register, register/memory, memory/register,
//!   register/immediate including 64-bit `movabs`), `MOVZX`/`MOVSX` for
//!   sub-word loads, `LEA`.
//! - Group 1 ALU: `ADD`, `OR`, `SUB`, `CMP`, in register/register,
//!   register/memory, and register/immediate forms.
//! - `SHL` by an immediate count (used only for power-of-two pointer
//!   scaling, never exposed as a general shift operator).
//! - `PUSH`/`POP`/`RET`, `JMP rel32`, `Jcc rel32` with forward- and
//!   backward-referencing label patching.
//! - `[base + disp]` memory operands only — no scaled-index addressing.
//!
//! Not supported: 16-bit addressing, segment overrides, `IMUL`/`IDIV`,
//! SSE/AVX arithmetic (floats are moved through GPRs via reinterpreted
//! bit patterns by the caller, not computed on with this encoder), and
//! anything under real or compatibility mode.

mod alu;
mod code_buffer;
mod encoder;
mod memory;
mod register;

pub use alu::AluOp;
pub use code_buffer::{CodeBuffer, Label};
pub use encoder::Encoder;
pub use memory::MemoryOperand;
pub use register::{id as register_id, Register};

pub use xjit_types::{ConditionCode, JitError};
