// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! An in-process, expression-tree JIT compiler targeting x86-64.
//!
//! A caller builds a typed expression tree with a [`FunctionBuilder`],
//! calls [`FunctionBuilder::compile`], and gets back a [`CompiledFunction`]
//! wrapping a native function pointer that computes the expression using
//! the platform's standard calling convention.
//!
//! ```
//! use xjit::FunctionBuilder;
//!
//! let mut builder = FunctionBuilder::<i64>::new(64, 256, 4096).unwrap();
//! let p0 = builder.parameter::<i64>(0).unwrap();
//! let p1 = builder.parameter::<i64>(1).unwrap();
//! let sum = builder.add(p0, p1).unwrap();
//! let compiled = builder.compile::<extern "C" fn(i64, i64) -> i64>(sum).unwrap();
//! assert_eq!((compiled.as_fn())(12_340_000, 5_678), 12_345_678);
//! ```
//!
//! The three subsystems this crate covers are the expression node IR (a
//! closed, tagged-variant `Node` enum), register allocation and code
//! selection (folded into the node IR's own emit pass and a small
//! caller-save/callee-save register file), and the typed front-end that
//! ties an arena, a register file, and the `xjit-encoder-x86-64` encoder
//! together into [`FunctionBuilder::compile`]. See `DESIGN.md` at the
//! workspace root for the component-by-component grounding notes.

mod abi;
mod arena;
mod executable;
mod function;
mod interp;
mod node;
mod register_file;

#[cfg(test)]
mod proptest_equivalence;

pub use function::{
    CompiledFunction, FieldDescriptor, FunctionBuilder, NodeHandle, CondHandle, MAX_PARAMETERS,
};
pub use node::Storage;
pub use xjit_types::{JitError, Scalar, ScalarKind, TypeDescriptor};
