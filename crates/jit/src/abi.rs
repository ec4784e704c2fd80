// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The host platform's calling convention, selected at build time. Only
//! the integer/pointer argument registers and the return register are
//! modeled: this backend never allocates an XMM register for
//! a parameter or a return value (`FunctionBuilder::parameter`/`new` reject
//! a float there outright), so there is no float argument-register table to
//! keep in sync with the real ABI's XMM0.. assignment.

use xjit_encoder_x86_64::register_id;

/// Integer/pointer argument registers, in parameter order, for the
/// platform this crate is built for. System V (Linux/macOS) gets six
/// integer argument registers; Windows x64 gets four.
#[cfg(not(target_os = "windows"))]
pub const INTEGER_ARGUMENT_REGISTERS: [u8; 6] = [
    register_id::RDI,
    register_id::RSI,
    register_id::RDX,
    register_id::RCX,
    register_id::R8,
    register_id::R9,
];

#[cfg(target_os = "windows")]
pub const INTEGER_ARGUMENT_REGISTERS: [u8; 4] = [
    register_id::RCX,
    register_id::RDX,
    register_id::R8,
    register_id::R9,
];

pub const RETURN_REGISTER: u8 = register_id::RAX;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_integer_argument_register_is_platform_correct() {
        #[cfg(not(target_os = "windows"))]
        assert_eq!(INTEGER_ARGUMENT_REGISTERS[0], register_id::RDI);
        #[cfg(target_os = "windows")]
        assert_eq!(INTEGER_ARGUMENT_REGISTERS[0], register_id::RCX);
    }
}
