// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt;

/// A physical x86-64 register: `(is_float, id)` identifies RAX..R15 or
/// XMM0..XMM15, `size` is the operand width this particular use addresses
/// it at. `size`/`is_float` are ordinary struct fields rather than const
/// generic parameters — a runtime check is no heavier than a type-level one
/// for a value this small and this often constructed from runtime
/// register-allocation decisions.
///
/// Invariant: `size` is one of `{1, 2, 4, 8}` for a GPR, `{4, 8}` for an
/// XMM register; `id` is `0..=15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    size: u8,
    is_float: bool,
    id: u8,
}

impl Register {
    pub fn gpr(id: u8, size: u8) -> Register {
        assert!(id < 16, "register id {id} out of range");
        assert!(
            matches!(size, 1 | 2 | 4 | 8),
            "invalid GPR size {size} (must be 1, 2, 4, or 8)"
        );
        Register {
            size,
            is_float: false,
            id,
        }
    }

    pub fn xmm(id: u8, size: u8) -> Register {
        assert!(id < 16, "register id {id} out of range");
        assert!(
            matches!(size, 4 | 8),
            "invalid XMM size {size} (must be 4 or 8)"
        );
        Register {
            size,
            is_float: true,
            id,
        }
    }

    pub fn id(self) -> u8 {
        self.id
    }

    pub fn size(self) -> u8 {
        self.size
    }

    pub fn is_float(self) -> bool {
        self.is_float
    }

    /// The low 3 bits used directly in ModR/M/SIB/opcode+rd fields; the
    /// high bit (register id >= 8) goes into the relevant REX bit instead.
    pub fn low_bits(self) -> u8 {
        self.id & 0x7
    }

    /// Whether this register's id needs a REX bit to reach (R8..R15, or
    /// XMM8..XMM15).
    pub fn needs_rex_extension(self) -> bool {
        self.id >= 8
    }

    /// Re-view the same physical register at a different operand width
    /// (e.g. after a `MOVZX` decides the destination should be read back
    /// as the full 64-bit register it was zero-extended into).
    pub fn with_size(self, size: u8) -> Register {
        if self.is_float {
            Register::xmm(self.id, size)
        } else {
            Register::gpr(self.id, size)
        }
    }

    /// `true` for RSP/R12, which need a SIB byte `[reg]` encoding even when
    /// used as a plain ModR/M base with no index.
    pub fn is_sib_required_base(self) -> bool {
        !self.is_float && self.low_bits() == 4
    }

    /// `true` for RBP/R13, which cannot use `mod=00` (it's repurposed for
    /// RIP-relative / disp32-only addressing) and must always carry at
    /// least a one-byte displacement.
    pub fn is_disp_required_base(self) -> bool {
        !self.is_float && self.low_bits() == 5
    }
}

const GPR_NAMES_64: [&str; 16] = [
    "rax", "rcx", "rdx", "rbx", "rsp", "rbp", "rsi", "rdi", "r8", "r9", "r10", "r11", "r12",
    "r13", "r14", "r15",
];
const GPR_NAMES_32: [&str; 16] = [
    "eax", "ecx", "edx", "ebx", "esp", "ebp", "esi", "edi", "r8d", "r9d", "r10d", "r11d", "r12d",
    "r13d", "r14d", "r15d",
];
const GPR_NAMES_16: [&str; 16] = [
    "ax", "cx", "dx", "bx", "sp", "bp", "si", "di", "r8w", "r9w", "r10w", "r11w", "r12w", "r13w",
    "r14w", "r15w",
];
// Deliberately SPL/BPL/SIL/DIL rather than AH/BH/CH/DH: this encoder never
// needs a REX-less high-byte encoding, so the ambiguous names don't exist
// here.
const GPR_NAMES_8: [&str; 16] = [
    "al", "cl", "dl", "bl", "spl", "bpl", "sil", "dil", "r8b", "r9b", "r10b", "r11b", "r12b",
    "r13b", "r14b", "r15b",
];

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_float {
            write!(f, "xmm{}", self.id)
        } else {
            let name = match self.size {
                8 => GPR_NAMES_64[self.id as usize],
                4 => GPR_NAMES_32[self.id as usize],
                2 => GPR_NAMES_16[self.id as usize],
                1 => GPR_NAMES_8[self.id as usize],
                _ => unreachable!(),
            };
            f.write_str(name)
        }
    }
}

/// Register ids by ABI name, independent of operand size.
pub mod id {
    pub const RAX: u8 = 0;
    pub const RCX: u8 = 1;
    pub const RDX: u8 = 2;
    pub const RBX: u8 = 3;
    pub const RSP: u8 = 4;
    pub const RBP: u8 = 5;
    pub const RSI: u8 = 6;
    pub const RDI: u8 = 7;
    pub const R8: u8 = 8;
    pub const R9: u8 = 9;
    pub const R10: u8 = 10;
    pub const R11: u8 = 11;
    pub const R12: u8 = 12;
    pub const R13: u8 = 13;
    pub const R14: u8 = 14;
    pub const R15: u8 = 15;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_intel_syntax() {
        assert_eq!(Register::gpr(id::RAX, 8).to_string(), "rax");
        assert_eq!(Register::gpr(id::R9, 4).to_string(), "r9d");
        assert_eq!(Register::gpr(id::RSP, 1).to_string(), "spl");
        assert_eq!(Register::xmm(2, 8).to_string(), "xmm2");
    }

    #[test]
    fn sib_and_disp_required_bases() {
        assert!(Register::gpr(id::RSP, 8).is_sib_required_base());
        assert!(Register::gpr(id::R12, 8).is_sib_required_base());
        assert!(!Register::gpr(id::RAX, 8).is_sib_required_base());

        assert!(Register::gpr(id::RBP, 8).is_disp_required_base());
        assert!(Register::gpr(id::R13, 8).is_disp_required_base());
    }
}
