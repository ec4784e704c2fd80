// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! Generates random trees up to a small depth over the supported `i64`
//! operators, typed by a fixed two-parameter environment, and checks
//! `compile(T)(I) == interpret(T, I)` for many input tuples per tree —
//! value equivalence between the compiled code and the reference
//! interpreter.
//!
//! Lives inside the crate rather than under `tests/` because it needs
//! [`crate::interp::interpret`] and [`FunctionBuilder::arena`], both
//! crate-private — the whole point of [`crate::interp`] is that it shares
//! no code with [`crate::node::EmitContext::emit`], so this module is the
//! only place that gets to see both sides at once.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::function::{FunctionBuilder, NodeHandle};
use crate::interp::interpret;

const TREE_COUNT: usize = 300;
const INPUTS_PER_TREE: usize = 20;
const MAX_DEPTH: u32 = 3;

/// Builds one random `i64` expression, consuming `builder`'s arena as it
/// goes. `depth` counts down to 0, at which point only leaves (immediates
/// or parameter references) are produced, guaranteeing termination.
fn gen_expr(
    builder: &mut FunctionBuilder<i64>,
    rng: &mut ChaCha8Rng,
    depth: u32,
    p0: NodeHandle<i64>,
    p1: NodeHandle<i64>,
) -> NodeHandle<i64> {
    if depth == 0 || rng.gen_bool(0.3) {
        return match rng.gen_range(0..3) {
            0 => p0,
            1 => p1,
            _ => builder.immediate(rng.gen_range(-1000i64..1000)).unwrap(),
        };
    }

    match rng.gen_range(0..4) {
        0 => {
            let l = gen_expr(builder, rng, depth - 1, p0, p1);
            let r = gen_expr(builder, rng, depth - 1, p0, p1);
            builder.add(l, r).unwrap()
        }
        1 => {
            let l = gen_expr(builder, rng, depth - 1, p0, p1);
            let r = gen_expr(builder, rng, depth - 1, p0, p1);
            builder.sub(l, r).unwrap()
        }
        2 => {
            let l = gen_expr(builder, rng, depth - 1, p0, p1);
            let r = gen_expr(builder, rng, depth - 1, p0, p1);
            builder.or_(l, r).unwrap()
        }
        _ => {
            let cl = gen_expr(builder, rng, depth - 1, p0, p1);
            let cr = gen_expr(builder, rng, depth - 1, p0, p1);
            let cond = match rng.gen_range(0..3) {
                0 => builder.compare_gt(cl, cr).unwrap(),
                1 => builder.compare_lt(cl, cr).unwrap(),
                _ => builder.compare_eq(cl, cr).unwrap(),
            };
            let then_val = gen_expr(builder, rng, depth - 1, p0, p1);
            let else_val = gen_expr(builder, rng, depth - 1, p0, p1);
            builder.conditional(cond, then_val, else_val).unwrap()
        }
    }
}

#[test]
fn compiled_trees_agree_with_the_reference_interpreter() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);
    let mut trees_checked = 0;
    let mut trees_skipped = 0;

    for _ in 0..TREE_COUNT {
        let mut builder = FunctionBuilder::<i64>::new(512, 4096, 64 * 1024).unwrap();
        let p0 = builder.parameter::<i64>(0).unwrap();
        let p1 = builder.parameter::<i64>(1).unwrap();
        let depth = rng.gen_range(1..=MAX_DEPTH);
        let root = gen_expr(&mut builder, &mut rng, depth, p0, p1);

        let arena_snapshot = builder.arena().clone();
        let root_id = root.id();

        let compiled = match builder.compile::<extern "C" fn(i64, i64) -> i64>(root) {
            Ok(f) => f,
            // Register pressure on a larger random tree is a legitimate
            // compile-time failure, not a correctness bug; this tree just
            // isn't checked.
            Err(_) => {
                trees_skipped += 1;
                continue;
            }
        };

        for _ in 0..INPUTS_PER_TREE {
            let a: i64 = rng.gen_range(-10_000..10_000);
            let b: i64 = rng.gen_range(-10_000..10_000);

            let expected = interpret(&arena_snapshot, root_id, &[a as u64, b as u64]) as i64;
            let actual = (compiled.as_fn())(a, b);
            assert_eq!(
                actual, expected,
                "mismatch for inputs ({a}, {b}) on a depth-{depth} tree"
            );
        }
        trees_checked += 1;
    }

    assert!(
        trees_checked > TREE_COUNT / 2,
        "too many trees were skipped for register pressure ({trees_checked} checked, \
         {trees_skipped} skipped of {TREE_COUNT})"
    );
}
