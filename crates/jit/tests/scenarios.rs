// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! End-to-end scenarios covering each node kind: immediate materialization,
//! parameter passthrough, arithmetic, direct and chained field pointers,
//! scaled array indexing, and both arms of a conditional select via
//! branch-around code selection.

use memoffset::offset_of;
use pretty_assertions::assert_eq;
use xjit::FieldDescriptor;
use xjit::FunctionBuilder;

#[test]
fn immediate_returns_its_constant() {
    let mut builder = FunctionBuilder::<u64>::new(16, 256, 4096).unwrap();
    let imm = builder.immediate(0x1234u64).unwrap();
    let compiled = builder
        .compile::<extern "C" fn() -> u64>(imm)
        .unwrap();
    assert_eq!((compiled.as_fn())(), 0x1234);
}

#[test]
fn single_parameter_is_returned_unchanged() {
    let mut builder = FunctionBuilder::<i64>::new(16, 256, 4096).unwrap();
    let p0 = builder.parameter::<i64>(0).unwrap();
    let compiled = builder
        .compile::<extern "C" fn(i64) -> i64>(p0)
        .unwrap();
    assert_eq!((compiled.as_fn())(1234), 1234);
}

#[test]
fn add_of_two_parameters() {
    let mut builder = FunctionBuilder::<i64>::new(16, 256, 4096).unwrap();
    let p0 = builder.parameter::<i64>(0).unwrap();
    let p1 = builder.parameter::<i64>(1).unwrap();
    let sum = builder.add(p1, p0).unwrap();
    let compiled = builder
        .compile::<extern "C" fn(i64, i64) -> i64>(sum)
        .unwrap();
    assert_eq!((compiled.as_fn())(12_340_000, 5_678), 12_345_678);
}

#[repr(C)]
#[derive(Clone, Copy)]
struct Inner {
    m_a: u64,
    m_b: u64,
}

#[test]
fn field_pointer_reads_a_direct_field() {
    let mut builder = FunctionBuilder::<u64>::new(16, 256, 4096).unwrap();
    let p0 = builder.parameter::<*const Inner>(0).unwrap();
    let field = FieldDescriptor::<u64>::new(offset_of!(Inner, m_b) as i32);
    let ptr = builder.field_pointer(p0, field).unwrap();
    let value = builder.deref(ptr).unwrap();
    let compiled = builder
        .compile::<extern "C" fn(*const Inner) -> u64>(value)
        .unwrap();

    let inner = Inner { m_a: 0, m_b: 1234 };
    assert_eq!((compiled.as_fn())(&inner as *const Inner), 1234);
}

#[repr(C)]
#[derive(Clone, Copy)]
struct Outer {
    m_p: u64,
    m_inner_embedded: Inner,
    m_r: u64,
}

#[test]
fn field_pointer_chain_reads_a_nested_field() {
    let mut builder = FunctionBuilder::<u64>::new(16, 256, 4096).unwrap();
    let p0 = builder.parameter::<*const Outer>(0).unwrap();
    let to_inner = FieldDescriptor::<Inner>::new(offset_of!(Outer, m_inner_embedded) as i32);
    let inner_ptr = builder.field_pointer(p0, to_inner).unwrap();
    let to_b = FieldDescriptor::<u64>::new(offset_of!(Inner, m_b) as i32);
    let b_ptr = builder.field_pointer(inner_ptr, to_b).unwrap();
    let value = builder.deref(b_ptr).unwrap();
    let compiled = builder
        .compile::<extern "C" fn(*const Outer) -> u64>(value)
        .unwrap();

    let outer = Outer {
        m_p: 0,
        m_inner_embedded: Inner { m_a: 0, m_b: 1234 },
        m_r: 0,
    };
    assert_eq!((compiled.as_fn())(&outer as *const Outer), 1234);
}

/// A single-byte aggregate, so indexing `array[i]` is pointer arithmetic
/// scaled by a stride of exactly 1.
#[repr(C)]
#[derive(Clone, Copy)]
struct ByteElement {
    m_q: u8,
}

#[test]
fn array_field_pointer_scales_by_element_size() {
    let mut builder = FunctionBuilder::<u8>::new(16, 256, 4096).unwrap();
    let base = builder.parameter::<*const ByteElement>(0).unwrap();
    let index = builder.parameter::<u64>(1).unwrap();
    let element = builder.pointer_add(base, index).unwrap();
    let field = FieldDescriptor::<u8>::new(offset_of!(ByteElement, m_q) as i32);
    let field_ptr = builder.field_pointer(element, field).unwrap();
    let value = builder.deref(field_ptr).unwrap();
    let compiled = builder
        .compile::<extern "C" fn(*const ByteElement, u64) -> u8>(value)
        .unwrap();

    let mut array = [ByteElement { m_q: 0 }; 10];
    array[3].m_q = 200;
    assert_eq!(
        (compiled.as_fn())(array.as_ptr(), 3),
        200
    );
}

#[test]
fn conditional_takes_the_else_branch_when_condition_is_false() {
    let mut builder = FunctionBuilder::<i64>::new(32, 256, 4096).unwrap();
    let p0 = builder.parameter::<i64>(0).unwrap();
    let p1 = builder.parameter::<i64>(1).unwrap();
    let cond = builder.compare_gt(p0, p1).unwrap();
    let then_val = builder.immediate(5i64).unwrap();
    let else_val = builder.immediate(6i64).unwrap();
    let select = builder.conditional(cond, then_val, else_val).unwrap();
    let compiled = builder
        .compile::<extern "C" fn(i64, i64) -> i64>(select)
        .unwrap();

    assert_eq!((compiled.as_fn())(3, 4), 6);
}

#[test]
fn add_reads_a_dereferenced_field_as_a_memory_operand() {
    let mut builder = FunctionBuilder::<u64>::new(16, 256, 4096).unwrap();
    let p0 = builder.parameter::<*const Inner>(0).unwrap();
    let extra = builder.parameter::<u64>(1).unwrap();
    let field = FieldDescriptor::<u64>::new(offset_of!(Inner, m_b) as i32);
    let ptr = builder.field_pointer(p0, field).unwrap();
    let value = builder.deref(ptr).unwrap();
    let sum = builder.add(extra, value).unwrap();
    let compiled = builder
        .compile::<extern "C" fn(*const Inner, u64) -> u64>(sum)
        .unwrap();

    let inner = Inner { m_a: 0, m_b: 1234 };
    assert_eq!((compiled.as_fn())(&inner as *const Inner, 6), 1240);
}

#[test]
fn compare_reads_a_dereferenced_field_as_a_memory_operand() {
    let mut builder = FunctionBuilder::<i64>::new(32, 256, 4096).unwrap();
    let p0 = builder.parameter::<*const Inner>(0).unwrap();
    let threshold = builder.parameter::<u64>(1).unwrap();
    let field = FieldDescriptor::<u64>::new(offset_of!(Inner, m_b) as i32);
    let ptr = builder.field_pointer(p0, field).unwrap();
    let value = builder.deref(ptr).unwrap();
    let cond = builder.compare_gt(threshold, value).unwrap();
    let then_val = builder.immediate(1i64).unwrap();
    let else_val = builder.immediate(0i64).unwrap();
    let select = builder.conditional(cond, then_val, else_val).unwrap();
    let compiled = builder
        .compile::<extern "C" fn(*const Inner, u64) -> i64>(select)
        .unwrap();

    let inner = Inner { m_a: 0, m_b: 1234 };
    assert_eq!((compiled.as_fn())(&inner as *const Inner, 2000), 1);
    assert_eq!((compiled.as_fn())(&inner as *const Inner, 100), 0);
}

#[test]
fn conditional_takes_the_then_branch_when_condition_is_true() {
    let mut builder = FunctionBuilder::<i64>::new(32, 256, 4096).unwrap();
    let p0 = builder.parameter::<i64>(0).unwrap();
    let p1 = builder.parameter::<i64>(1).unwrap();
    let cond = builder.compare_gt(p0, p1).unwrap();
    let then_val = builder.immediate(5i64).unwrap();
    let else_val = builder.immediate(6i64).unwrap();
    let select = builder.conditional(cond, then_val, else_val).unwrap();
    let compiled = builder
        .compile::<extern "C" fn(i64, i64) -> i64>(select)
        .unwrap();

    assert_eq!((compiled.as_fn())(5, 4), 5);
}
