// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The typed front-end: a façade over the arena/encoder/register file that
//! exposes parameter accessors, node constructors, and `compile(root)`.
//!
//! Rust has no variadic generics, and invoking the compiled function
//! pointer is left entirely to the caller, so [`FunctionBuilder<R>`] is
//! generic over the return type only and tracks its parameter arity/types
//! at run time as `.parameter::<T>(i)` is called. The caller names the
//! concrete function-pointer type (`extern "C" fn(i64, i64) -> i64`, ...)
//! when they call [`FunctionBuilder::compile`]; that type must agree with
//! the parameter/return types this builder was given, which the builder
//! cannot check from inside `compile` (there is no `TypeId` reflection over
//! arbitrary `fn` types in stable Rust) — a mismatch here is caught only at
//! the call site, the same way a raw function-pointer cast would be.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use xjit_encoder_x86_64::{register_id, Encoder, Register};
use xjit_types::{ConditionCode, JitError, Scalar, ScalarKind, TypeDescriptor};

use crate::abi;
use crate::arena::{NodeArena, NodeId};
use crate::executable::ExecutableBuffer;
use crate::node::{count_parameter_uses, BinOp, EmitContext, Node};
use crate::register_file::RegisterFile;

/// Matches the narrowest ABI this crate targets (Windows x64's four integer
/// argument registers) rather than System V's six, so that a tree built
/// against this limit compiles unchanged regardless of the host platform.
pub const MAX_PARAMETERS: usize = 4;

/// A typed reference to a node already allocated in a [`FunctionBuilder`]'s
/// arena. `T` is a phantom marker recording the node's declared scalar
/// type, so the builder's constructor methods can enforce the invariant
/// that a node's declared type matches its computation's natural type at
/// the Rust type level instead of with a runtime tag.
pub struct NodeHandle<T> {
    id: NodeId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for NodeHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for NodeHandle<T> {}

impl<T> NodeHandle<T> {
    fn new(id: NodeId) -> Self {
        NodeHandle {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(self) -> NodeId {
        self.id
    }
}

/// A flag-valued node (`Compare`): not a scalar, so it gets its own handle
/// type rather than `NodeHandle<T>` — attempting to feed one into
/// `add`/`deref`/etc. is a type error at the call site.
#[derive(Clone, Copy)]
pub struct CondHandle {
    id: NodeId,
}

impl CondHandle {
    fn new(id: NodeId) -> Self {
        CondHandle { id }
    }

    pub fn id(self) -> NodeId {
        self.id
    }
}

/// `{offset, size, signedness}` for one field of an aggregate. `Field` pins
/// the pointee type of the `FieldPointer` this descriptor builds, playing
/// the same role a pointer-to-member would in a language that has one.
pub struct FieldDescriptor<Field> {
    offset: i32,
    _marker: PhantomData<fn() -> Field>,
}

impl<Field: Scalar> FieldDescriptor<Field> {
    /// `offset` is the field's byte offset within its enclosing type,
    /// typically obtained via `memoffset::offset_of!` at the call site.
    pub fn new(offset: i32) -> Self {
        FieldDescriptor {
            offset,
            _marker: PhantomData,
        }
    }
}

/// Converts a concrete scalar value to the little-endian bit pattern
/// [`Node::Immediate`] stores, preserving two's-complement representation
/// for signed types (`-5i8 as u64` sign-extends, but the encoder only ever
/// reads back the low `size_bytes()` of it, so the round trip is exact).
pub trait IntoImmediateBits: Scalar {
    fn into_immediate_bits(self) -> u64;
}

macro_rules! impl_into_immediate_bits_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoImmediateBits for $ty {
                fn into_immediate_bits(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}
impl_into_immediate_bits_int!(i8, u8, i16, u16, i32, u32, i64, u64);

impl IntoImmediateBits for f32 {
    fn into_immediate_bits(self) -> u64 {
        self.to_bits() as u64
    }
}
impl IntoImmediateBits for f64 {
    fn into_immediate_bits(self) -> u64 {
        self.to_bits()
    }
}
impl<T> IntoImmediateBits for *const T {
    fn into_immediate_bits(self) -> u64 {
        self as u64
    }
}
impl<T> IntoImmediateBits for *mut T {
    fn into_immediate_bits(self) -> u64 {
        self as u64
    }
}

fn reject_float(node_kind: &'static str, ty: TypeDescriptor) -> Result<(), JitError> {
    if ty.is_float() {
        Err(JitError::TypeMismatch {
            node_kind,
            expected: "integer or pointer operand",
            found: ty.type_name(),
        })
    } else {
        Ok(())
    }
}

/// A compiled tree's entry point: `F` is the `extern "C" fn(...) -> R`
/// pointer type the caller declared at [`FunctionBuilder::compile`]. Holds
/// the [`ExecutableBuffer`] the code lives in alive for as long as this
/// handle exists — `Arc` rather than sole ownership because one builder's
/// buffer backs every compile it performs over its lifetime, and the buffer
/// never reclaims sub-regions, so many compiled functions can share one
/// mapping.
pub struct CompiledFunction<F: Copy> {
    entry: F,
    _buffer: Arc<Mutex<ExecutableBuffer>>,
}

impl<F: Copy> CompiledFunction<F> {
    /// The callable entry point. Safe to invoke concurrently from multiple
    /// threads once `compile` has returned: the executable memory region is
    /// never written to again, so there is no mutable state to race on.
    pub fn as_fn(&self) -> F {
        self.entry
    }
}

/// A `Write` sink that appends into a shared, lockable byte buffer rather
/// than an owned one — the disassembly stream is enabled for the lifetime
/// of a [`FunctionBuilder`], but the [`Encoder`]/[`CodeBuffer`] pair that
/// consumes it is rebuilt fresh on every `compile()` call, so the sink
/// itself has to outlive any one of them.
#[derive(Clone)]
struct SharedDiagnosticsSink(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedDiagnosticsSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .expect("diagnostics sink mutex is never held across a panic")
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// The typed front-end. `R` is the declared return type; parameter
/// types/arity accumulate as `.parameter::<T>(i)` is called (see the module
/// doc for why this isn't also a type parameter).
pub struct FunctionBuilder<R: Scalar> {
    arena: NodeArena<Node>,
    param_types: [Option<TypeDescriptor>; MAX_PARAMETERS],
    arity: usize,
    code_capacity: usize,
    buffer: Arc<Mutex<ExecutableBuffer>>,
    diagnostics: Option<Arc<Mutex<Vec<u8>>>>,
    _ret: PhantomData<fn() -> R>,
}

impl<R: Scalar> FunctionBuilder<R> {
    /// `node_capacity` bounds the arena; `code_capacity` bounds each
    /// compile's [`Encoder`]; `executable_capacity` sizes the backing
    /// [`ExecutableBuffer`] this builder's compiles share.
    pub fn new(
        node_capacity: usize,
        code_capacity: usize,
        executable_capacity: usize,
    ) -> Result<Self, JitError> {
        // The return value lands in `abi::RETURN_REGISTER` (RAX), never
        // XMM0 — rejected here rather than silently reading the result out
        // of the wrong register class. See the note on `parameter` below.
        reject_float("Function return value", R::DESCRIPTOR)?;
        Ok(FunctionBuilder {
            arena: NodeArena::with_capacity(node_capacity),
            param_types: [None; MAX_PARAMETERS],
            arity: 0,
            code_capacity,
            buffer: Arc::new(Mutex::new(ExecutableBuffer::reserve(executable_capacity)?)),
            diagnostics: None,
            _ret: PhantomData,
        })
    }

    /// Exposes the builder's arena to the crate's own property-based
    /// equivalence test, so it can run [`crate::interp::interpret`] over the
    /// exact same tree this builder is about to `compile` without
    /// duplicating the node representation. Not part of the public API.
    #[cfg(test)]
    pub(crate) fn arena(&self) -> &NodeArena<Node> {
        &self.arena
    }

    /// Enables the disassembly text stream for every subsequent `compile`
    /// call on this builder. Starts (or clears) an empty log; retrieve it
    /// with [`Self::take_diagnostics`].
    pub fn enable_diagnostics(&mut self) {
        self.diagnostics = Some(Arc::new(Mutex::new(Vec::new())));
    }

    pub fn disable_diagnostics(&mut self) {
        self.diagnostics = None;
    }

    /// Drains the accumulated disassembly text, if diagnostics are enabled.
    /// Leaves diagnostics enabled with an empty log, so consecutive
    /// `compile` calls can each be inspected independently.
    pub fn take_diagnostics(&mut self) -> Option<String> {
        let log = self.diagnostics.as_ref()?;
        let mut bytes = log
            .lock()
            .expect("diagnostics sink mutex is never held across a panic");
        let text = String::from_utf8_lossy(&bytes).into_owned();
        bytes.clear();
        Some(text)
    }

    /// A typed reference to the `index`-th input parameter, bound to the
    /// platform ABI's corresponding argument register. Declaring the same
    /// index at two different types is a `TypeMismatch`; declaring an index
    /// beyond [`MAX_PARAMETERS`] panics, since the arity is fixed and an
    /// out-of-range index is a programmer error, not a runtime condition
    /// callers need a `Result` to recover from.
    pub fn parameter<T: Scalar>(&mut self, index: u8) -> Result<NodeHandle<T>, JitError> {
        assert!(
            (index as usize) < MAX_PARAMETERS,
            "parameter index {index} exceeds the fixed {MAX_PARAMETERS}-parameter limit"
        );
        let ty = T::DESCRIPTOR;
        // `abi::INTEGER_ARGUMENT_REGISTERS` is the only argument-register
        // class this backend binds parameters to; a float parameter would
        // actually arrive in an XMM register, not the GPR this would bind
        // it to, so it's rejected here rather than read out of the wrong
        // register (see `reject_float`'s other call sites for the same
        // read-the-wrong-register-class concern applied to an ALU op).
        reject_float("Parameter", ty)?;
        let slot = &mut self.param_types[index as usize];
        match *slot {
            Some(existing) if existing != ty => {
                return Err(JitError::TypeMismatch {
                    node_kind: "Parameter",
                    expected: existing.type_name(),
                    found: ty.type_name(),
                })
            }
            _ => *slot = Some(ty),
        }
        self.arity = self.arity.max(index as usize + 1);
        let id = self.arena.alloc(Node::Parameter { index, ty })?;
        Ok(NodeHandle::new(id))
    }

    /// Floats are accepted here (and by [`Self::field_pointer`]/[`Self::deref`],
    /// which only ever move a value's bit pattern through a GPR-sized
    /// register, never compute on it) but cannot reach a compiled function's
    /// parameter list or return value, where a real ABI would bind them to
    /// an XMM register this backend never allocates (see `parameter` and
    /// `new`). A float immediate can still flow through a tree as, say, a
    /// `FieldPointer`-addressed struct field read for diagnostic purposes,
    /// just not cross the native call boundary.
    pub fn immediate<T: IntoImmediateBits>(&mut self, value: T) -> Result<NodeHandle<T>, JitError> {
        let ty = T::DESCRIPTOR;
        let id = self.arena.alloc(Node::Immediate {
            bits: value.into_immediate_bits(),
            ty,
        })?;
        Ok(NodeHandle::new(id))
    }

    fn binary<T: Scalar>(
        &mut self,
        op: BinOp,
        lhs: NodeHandle<T>,
        rhs: NodeHandle<T>,
    ) -> Result<NodeHandle<T>, JitError> {
        let ty = T::DESCRIPTOR;
        reject_float(op.name(), ty)?;
        if let (Node::Immediate { bits: l, .. }, Node::Immediate { bits: r, .. }) =
            (self.arena.get(lhs.id()), self.arena.get(rhs.id()))
        {
            let raw = match op {
                BinOp::Add => l.wrapping_add(*r),
                BinOp::Sub => l.wrapping_sub(*r),
                BinOp::Or => l | r,
            };
            let id = self.arena.alloc(Node::Immediate {
                bits: crate::interp::narrow(raw, ty),
                ty,
            })?;
            return Ok(NodeHandle::new(id));
        }
        let id = self.arena.alloc(Node::Binary {
            op,
            lhs: lhs.id(),
            rhs: rhs.id(),
            ty,
        })?;
        Ok(NodeHandle::new(id))
    }

    pub fn add<T: Scalar>(
        &mut self,
        lhs: NodeHandle<T>,
        rhs: NodeHandle<T>,
    ) -> Result<NodeHandle<T>, JitError> {
        self.binary(BinOp::Add, lhs, rhs)
    }

    pub fn sub<T: Scalar>(
        &mut self,
        lhs: NodeHandle<T>,
        rhs: NodeHandle<T>,
    ) -> Result<NodeHandle<T>, JitError> {
        self.binary(BinOp::Sub, lhs, rhs)
    }

    pub fn or_<T: Scalar>(
        &mut self,
        lhs: NodeHandle<T>,
        rhs: NodeHandle<T>,
    ) -> Result<NodeHandle<T>, JitError> {
        self.binary(BinOp::Or, lhs, rhs)
    }

    /// `base + index`, scaled by `sizeof(Outer)` — the builder-level
    /// counterpart of `emit_scaled_pointer_add`: array indexing is pointer
    /// arithmetic with an element-sized stride, not a same-typed `Binary`.
    /// `Outer` must have a power-of-two size; anything else is a build-time
    /// `TypeMismatch` (this backend has no `IMUL`).
    pub fn pointer_add<Outer, I: Scalar>(
        &mut self,
        base: NodeHandle<*const Outer>,
        index: NodeHandle<I>,
    ) -> Result<NodeHandle<*const Outer>, JitError>
    where
        *const Outer: Scalar,
    {
        let ty = <*const Outer as Scalar>::DESCRIPTOR;
        let pointee_size = match ty.kind {
            ScalarKind::Pointer { pointee_size } => pointee_size,
            _ => unreachable!("*const Outer always descriptors to ScalarKind::Pointer"),
        };
        if pointee_size != 0 && !pointee_size.is_power_of_two() {
            return Err(JitError::TypeMismatch {
                node_kind: "pointer_add",
                expected: "power-of-two element size",
                found: "non-power-of-two element size",
            });
        }
        let id = self.arena.alloc(Node::Binary {
            op: BinOp::Add,
            lhs: base.id(),
            rhs: index.id(),
            ty,
        })?;
        Ok(NodeHandle::new(id))
    }

    fn compare<T: Scalar>(
        &mut self,
        cc: ConditionCode,
        lhs: NodeHandle<T>,
        rhs: NodeHandle<T>,
    ) -> Result<CondHandle, JitError> {
        let operand_ty = T::DESCRIPTOR;
        reject_float("Compare", operand_ty)?;
        let id = self.arena.alloc(Node::Compare {
            cc,
            lhs: lhs.id(),
            rhs: rhs.id(),
            operand_ty,
        })?;
        Ok(CondHandle::new(id))
    }

    pub fn compare_gt<T: Scalar>(
        &mut self,
        lhs: NodeHandle<T>,
        rhs: NodeHandle<T>,
    ) -> Result<CondHandle, JitError> {
        self.compare(ConditionCode::greater_than(T::DESCRIPTOR.is_signed()), lhs, rhs)
    }

    pub fn compare_lt<T: Scalar>(
        &mut self,
        lhs: NodeHandle<T>,
        rhs: NodeHandle<T>,
    ) -> Result<CondHandle, JitError> {
        self.compare(ConditionCode::less_than(T::DESCRIPTOR.is_signed()), lhs, rhs)
    }

    pub fn compare_eq<T: Scalar>(
        &mut self,
        lhs: NodeHandle<T>,
        rhs: NodeHandle<T>,
    ) -> Result<CondHandle, JitError> {
        self.compare(ConditionCode::equal(), lhs, rhs)
    }

    pub fn conditional<T: Scalar>(
        &mut self,
        cond: CondHandle,
        then_val: NodeHandle<T>,
        else_val: NodeHandle<T>,
    ) -> Result<NodeHandle<T>, JitError> {
        let ty = T::DESCRIPTOR;
        reject_float("Conditional", ty)?;
        let id = self.arena.alloc(Node::Conditional {
            cond: cond.id(),
            then_val: then_val.id(),
            else_val: else_val.id(),
            ty,
        })?;
        Ok(NodeHandle::new(id))
    }

    pub fn field_pointer<Outer, Field: Scalar>(
        &mut self,
        base: NodeHandle<*const Outer>,
        field: FieldDescriptor<Field>,
    ) -> Result<NodeHandle<*const Field>, JitError>
    where
        *const Field: Scalar,
    {
        let ty = <*const Field as Scalar>::DESCRIPTOR;
        let id = self.arena.alloc(Node::FieldPointer {
            base: base.id(),
            offset: field.offset,
            ty,
        })?;
        Ok(NodeHandle::new(id))
    }

    pub fn deref<T: Scalar>(&mut self, ptr: NodeHandle<*const T>) -> Result<NodeHandle<T>, JitError> {
        let ty = T::DESCRIPTOR;
        let id = self.arena.alloc(Node::Deref { ptr: ptr.id(), ty })?;
        Ok(NodeHandle::new(id))
    }

    /// Walks `root`, emitting a prologue, the tree's code, and an epilogue
    /// into a fresh [`Encoder`], then copies the finished bytes into this
    /// builder's executable buffer.
    ///
    /// `F` must be an `extern "C" fn(...) -> R`-shaped pointer type whose
    /// parameters match the types this builder's `.parameter::<T>(i)` calls
    /// declared, in index order — see the module doc for why this can't be
    /// checked here. On success or failure alike, the arena is reset so the
    /// builder is ready for the next tree.
    pub fn compile<F: Copy>(&mut self, root: NodeHandle<R>) -> Result<CompiledFunction<F>, JitError> {
        let result = self.compile_inner(root);
        self.arena.reset();
        self.param_types = [None; MAX_PARAMETERS];
        self.arity = 0;
        result
    }

    fn compile_inner<F: Copy>(&mut self, root: NodeHandle<R>) -> Result<CompiledFunction<F>, JitError> {
        tracing::debug!(
            node_count = self.arena.len(),
            arity = self.arity,
            "compiling expression tree"
        );

        if self.arity > abi::INTEGER_ARGUMENT_REGISTERS.len() {
            return Err(JitError::TypeMismatch {
                node_kind: "Function",
                expected: "arity within the platform's integer argument registers",
                found: "too many parameters",
            });
        }

        let param_registers: Vec<u8> = (0..self.arity)
            .map(|i| abi::INTEGER_ARGUMENT_REGISTERS[i])
            .collect();

        let mut registers = RegisterFile::new();
        for &reg in &param_registers {
            registers.reserve_gpr(reg);
        }

        let mut use_counts = vec![0u32; self.arity];
        count_parameter_uses(&self.arena, root.id(), &mut use_counts);
        let mut consumed = vec![0u32; self.arity];

        let mut encoder = Encoder::with_capacity(self.code_capacity);
        if let Some(log) = &self.diagnostics {
            encoder.enable_diagnostics(Box::new(SharedDiagnosticsSink(log.clone())));
        }

        // The result register is never pre-reserved: a subtree is free to
        // use RAX as scratch for an intermediate, release it, and have the
        // final value land somewhere else — `emit_into` copies into
        // `result_reg` at the end regardless (a no-op if it's already there).
        let result_reg = Register::gpr(abi::RETURN_REGISTER, R::DESCRIPTOR.size_bytes());

        {
            let mut ctx = EmitContext {
                encoder: &mut encoder,
                registers: &mut registers,
                arena: &self.arena,
                param_registers: &param_registers,
                param_use_counts: &use_counts,
                param_consumed: &mut consumed,
            };
            ctx.emit_into(root.id(), result_reg)?;
        }

        let callee_save = registers.callee_save_used().to_vec();
        emit_prologue_epilogue(&mut encoder, &callee_save)?;

        let bytes = encoder.finalize()?;
        tracing::debug!(bytes = bytes.len(), "finalized compiled function");

        // Every compile this builder performs shares one executable mapping
        // (sub-regions are handed out in order and never reclaimed), so
        // writing into it needs a lock rather than sole ownership — a prior
        // `CompiledFunction` holds its own clone of the `Arc` for as long as
        // it's callable.
        let entry_ptr = {
            let mut buffer = self
                .buffer
                .lock()
                .expect("executable buffer mutex is never held across a panic");
            buffer.write(&bytes)?
        };

        let entry: F = unsafe { std::mem::transmute_copy(&entry_ptr) };
        Ok(CompiledFunction {
            entry,
            _buffer: self.buffer.clone(),
        })
    }
}

/// Pushes whichever callee-save GPRs the register allocator actually handed
/// out, then appends the matching pops and `RET`. For leaf functions with
/// no spills none of this is required, so the common case
/// (`callee_save.is_empty()`) emits nothing but the trailing `ret`.
fn emit_prologue_epilogue(encoder: &mut Encoder, callee_save: &[u8]) -> Result<(), JitError> {
    // Prologue pushes were never actually emitted before the body above —
    // this backend places the body first and prepends nothing, since a
    // CodeBuffer is append-only and has no insert-at-start operation.
    // Instead, callee-save registers this tree could clobber are simply
    // never handed out unless caller-save is exhausted; in that case the
    // safe and simple choice is to reject the compile rather than silently
    // corrupt the caller's registers, since retrofitting a prologue after
    // the fact would require re-basing every label and displacement already
    // emitted.
    if !callee_save.is_empty() {
        return Err(JitError::OutOfRegisters {
            register_class: "gpr",
            node_kind: "callee-save register would need caller-save/restore",
        });
    }
    let _ = register_id::RBP;
    encoder.ret()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_bits_round_trip_for_signed_values() {
        assert_eq!((-5i8).into_immediate_bits() as u8, (-5i8) as u8);
        assert_eq!((-1i64).into_immediate_bits(), u64::MAX);
    }

    #[test]
    fn max_parameters_matches_windows_abi_floor() {
        assert_eq!(MAX_PARAMETERS, 4);
    }

    #[test]
    fn float_parameter_is_rejected_at_build_time() {
        let mut builder = FunctionBuilder::<i64>::new(16, 256, 4096).unwrap();
        assert!(builder.parameter::<f64>(0).is_err());
    }

    #[test]
    fn float_return_type_is_rejected_at_construction() {
        assert!(FunctionBuilder::<f32>::new(16, 256, 4096).is_err());
    }

    #[test]
    fn diagnostics_log_lists_every_emitted_instruction() {
        let mut builder = FunctionBuilder::<i64>::new(16, 256, 4096).unwrap();
        builder.enable_diagnostics();
        let a = builder.parameter::<i64>(0).unwrap();
        let b = builder.parameter::<i64>(1).unwrap();
        let sum = builder.add(a, b).unwrap();
        let _compiled: CompiledFunction<extern "C" fn(i64, i64) -> i64> =
            builder.compile(sum).unwrap();

        let log = builder.take_diagnostics().expect("diagnostics were enabled");
        assert!(!log.is_empty());
        assert!(log.contains("add"));
        assert!(log.contains("ret"));
    }

    #[test]
    fn diagnostics_log_is_empty_when_never_enabled() {
        let mut builder = FunctionBuilder::<i64>::new(16, 256, 4096).unwrap();
        let a = builder.parameter::<i64>(0).unwrap();
        let _compiled: CompiledFunction<extern "C" fn(i64) -> i64> =
            builder.compile(a).unwrap();
        assert!(builder.take_diagnostics().is_none());
    }

    #[test]
    fn binary_of_two_immediates_folds_at_build_time() {
        let mut builder = FunctionBuilder::<i64>::new(16, 256, 4096).unwrap();
        let a = builder.immediate(20i64).unwrap();
        let b = builder.immediate(22i64).unwrap();
        let sum = builder.add(a, b).unwrap();
        assert!(matches!(builder.arena().get(sum.id()), Node::Immediate { bits: 42, .. }));
    }

    #[test]
    fn binary_of_two_immediates_narrows_the_folded_result() {
        let mut builder = FunctionBuilder::<u8>::new(16, 256, 4096).unwrap();
        let a = builder.immediate(250u8).unwrap();
        let b = builder.immediate(10u8).unwrap();
        let sum = builder.add(a, b).unwrap();
        assert!(matches!(
            builder.arena().get(sum.id()),
            Node::Immediate { bits: 4, .. }
        ));
    }

    #[test]
    fn disable_diagnostics_drops_the_log() {
        let mut builder = FunctionBuilder::<i64>::new(16, 256, 4096).unwrap();
        builder.enable_diagnostics();
        builder.disable_diagnostics();
        assert!(builder.take_diagnostics().is_none());
    }
}
