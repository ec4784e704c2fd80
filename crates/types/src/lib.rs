// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! Scalar type descriptors, condition codes, and the shared error type for
//! the expression-tree JIT. These are the pieces `xjit-encoder-x86-64` and
//! `xjit` both need and neither should own.

mod error;

pub use error::JitError;

/// The natural value kind of a leaf or intermediate expression result.
///
/// Signed/unsigned integers of 1/2/4/8 bytes, pointers, and floats.
/// `Pointer` carries the pointee's size only so that scaled
/// pointer arithmetic (builder `add` between a pointer and an integer) can
/// reject non-power-of-two strides instead of silently truncating them; the
/// JIT never dereferences through this size on its own (`Deref` carries its
/// own element size).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ScalarKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Pointer { pointee_size: u32 },
}

impl ScalarKind {
    pub fn size_bytes(self) -> u8 {
        match self {
            ScalarKind::I8 | ScalarKind::U8 => 1,
            ScalarKind::I16 | ScalarKind::U16 => 2,
            ScalarKind::I32 | ScalarKind::U32 | ScalarKind::F32 => 4,
            ScalarKind::I64 | ScalarKind::U64 | ScalarKind::F64 | ScalarKind::Pointer { .. } => 8,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }

    pub fn is_pointer(self) -> bool {
        matches!(self, ScalarKind::Pointer { .. })
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            ScalarKind::I8 | ScalarKind::I16 | ScalarKind::I32 | ScalarKind::I64
        )
    }

    /// A human-readable name for `TypeMismatch` diagnostics and the
    /// disassembly stream's operand annotations.
    pub fn type_name(self) -> &'static str {
        match self {
            ScalarKind::I8 => "i8",
            ScalarKind::U8 => "u8",
            ScalarKind::I16 => "i16",
            ScalarKind::U16 => "u16",
            ScalarKind::I32 => "i32",
            ScalarKind::U32 => "u32",
            ScalarKind::I64 => "i64",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Pointer { .. } => "pointer",
        }
    }
}

/// A node's declared element type: its [`ScalarKind`] plus a human-readable
/// name used only in diagnostics (`TypeMismatch` messages, the disassembly
/// stream's operand annotations).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TypeDescriptor {
    pub kind: ScalarKind,
}

impl TypeDescriptor {
    pub const fn new(kind: ScalarKind) -> Self {
        Self { kind }
    }

    pub fn size_bytes(self) -> u8 {
        self.kind.size_bytes()
    }

    pub fn is_float(self) -> bool {
        self.kind.is_float()
    }

    pub fn is_pointer(self) -> bool {
        self.kind.is_pointer()
    }

    pub fn is_signed(self) -> bool {
        self.kind.is_signed()
    }

    pub fn type_name(self) -> &'static str {
        self.kind.type_name()
    }
}

/// A scalar type known at Rust compile time, used by the typed function
/// builder to derive [`TypeDescriptor`]s from `P1..PN`/`R` generic
/// parameters without the caller spelling them out by hand.
pub trait Scalar: Copy {
    const DESCRIPTOR: TypeDescriptor;
}

macro_rules! impl_scalar {
    ($ty:ty, $kind:expr) => {
        impl Scalar for $ty {
            const DESCRIPTOR: TypeDescriptor = TypeDescriptor::new($kind);
        }
    };
}

impl_scalar!(i8, ScalarKind::I8);
impl_scalar!(u8, ScalarKind::U8);
impl_scalar!(i16, ScalarKind::I16);
impl_scalar!(u16, ScalarKind::U16);
impl_scalar!(i32, ScalarKind::I32);
impl_scalar!(u32, ScalarKind::U32);
impl_scalar!(i64, ScalarKind::I64);
impl_scalar!(u64, ScalarKind::U64);
impl_scalar!(f32, ScalarKind::F32);
impl_scalar!(f64, ScalarKind::F64);

impl<T> Scalar for *const T {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::new(ScalarKind::Pointer {
        pointee_size: std::mem::size_of::<T>() as u32,
    });
}

impl<T> Scalar for *mut T {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::new(ScalarKind::Pointer {
        pointee_size: std::mem::size_of::<T>() as u32,
    });
}

/// x86 `tttn` condition codes. WARNING: keep `negate` and the encoder's
/// `Display` impl in sync when adding a variant.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConditionCode {
    Ja,
    Jna,
    Jb,
    Jnb,
    Jg,
    Jng,
    Jl,
    Jnl,
    Jz,
    Jnz,
}

impl ConditionCode {
    /// The x86 `tttn` nibble for `0F 8x`/`7x` encodings.
    pub fn tttn(self) -> u8 {
        match self {
            ConditionCode::Ja => 0x7,
            ConditionCode::Jna => 0x6,
            ConditionCode::Jb => 0x2,
            ConditionCode::Jnb => 0x3,
            ConditionCode::Jg => 0xF,
            ConditionCode::Jng => 0xE,
            ConditionCode::Jl => 0xC,
            ConditionCode::Jnl => 0xD,
            ConditionCode::Jz => 0x4,
            ConditionCode::Jnz => 0x5,
        }
    }

    /// The complementary condition, used to branch around a `then` arm when
    /// the condition is false (jump on the negated test, fall through to
    /// take the branch, jump past the `else` arm).
    pub fn negate(self) -> ConditionCode {
        match self {
            ConditionCode::Ja => ConditionCode::Jna,
            ConditionCode::Jna => ConditionCode::Ja,
            ConditionCode::Jb => ConditionCode::Jnb,
            ConditionCode::Jnb => ConditionCode::Jb,
            ConditionCode::Jg => ConditionCode::Jng,
            ConditionCode::Jng => ConditionCode::Jg,
            ConditionCode::Jl => ConditionCode::Jnl,
            ConditionCode::Jnl => ConditionCode::Jl,
            ConditionCode::Jz => ConditionCode::Jnz,
            ConditionCode::Jnz => ConditionCode::Jz,
        }
    }

    /// `greater-than` specialized to the operand's signedness.
    pub fn greater_than(signed: bool) -> ConditionCode {
        if signed {
            ConditionCode::Jg
        } else {
            ConditionCode::Ja
        }
    }

    /// `less-than` specialized to the operand's signedness.
    pub fn less_than(signed: bool) -> ConditionCode {
        if signed {
            ConditionCode::Jl
        } else {
            ConditionCode::Jb
        }
    }

    pub fn equal() -> ConditionCode {
        ConditionCode::Jz
    }

    pub fn not_equal() -> ConditionCode {
        ConditionCode::Jnz
    }

    /// The mnemonic used by the disassembly-style diagnostic stream.
    pub fn mnemonic(self) -> &'static str {
        match self {
            ConditionCode::Ja => "ja",
            ConditionCode::Jna => "jna",
            ConditionCode::Jb => "jb",
            ConditionCode::Jnb => "jnb",
            ConditionCode::Jg => "jg",
            ConditionCode::Jng => "jng",
            ConditionCode::Jl => "jl",
            ConditionCode::Jnl => "jnl",
            ConditionCode::Jz => "jz",
            ConditionCode::Jnz => "jnz",
        }
    }
}

impl std::fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
