// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `understory_binding`.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Once;

use understory_binding::{Object, Value};

/// Builds `len` objects where each binds `"v"` to the next one's `"v"`.
fn chain(len: usize) -> (Vec<Object>, Vec<understory_binding::Binding>) {
    let objects: Vec<Object> = (0..len).map(|_| Object::new()).collect();
    objects[len - 1].set_as("v", 0.0_f64);
    let bindings = objects
        .windows(2)
        .map(|pair| pair[0].bind_to("v", &pair[1]))
        .collect();
    (objects, bindings)
}

fn bench_binding(c: &mut Criterion) {
    static PRINT_SIZES: Once = Once::new();
    PRINT_SIZES.call_once(|| {
        eprintln!(
            "sizes: Object={} Value={}",
            core::mem::size_of::<Object>(),
            core::mem::size_of::<Value>(),
        );
    });

    let mut group = c.benchmark_group("binding/local");

    group.bench_function("get", |b| {
        let object = Object::new();
        object.set_as("width", 100.0_f64);
        b.iter(|| black_box(object.get_as::<f64>("width")))
    });

    group.bench_function("set/no_listener", |b| {
        let object = Object::new();
        b.iter(|| object.set_as("width", black_box(100.0_f64)))
    });

    group.bench_function("set/with_listener", |b| {
        let object = Object::new();
        let _listener = object.on_change("width", |_| {});
        b.iter(|| object.set_as("width", black_box(100.0_f64)))
    });

    group.bench_function("set/string", |b| {
        let object = Object::new();
        b.iter(|| object.set_as("title", String::from("hello world")))
    });

    group.finish();

    let mut group = c.benchmark_group("binding/bound");

    group.bench_function("get", |b| {
        let target = Object::new();
        target.set_as("width", 100.0_f64);
        let source = Object::new();
        let _binding = source.bind_to("width", &target);
        b.iter(|| black_box(source.get_as::<f64>("width")))
    });

    group.bench_function("get/transformed", |b| {
        let target = Object::new();
        target.set_as("width", 100.0_f64);
        let source = Object::new();
        source.bind_to("width", &target).transform(
            |v| v.map(|w: &f64| w * 2.0),
            |v| v.map(|w: &f64| w / 2.0),
        );
        b.iter(|| black_box(source.get_as::<f64>("width")))
    });

    group.bench_function("set", |b| {
        let target = Object::new();
        let source = Object::new();
        let _binding = source.bind_to("width", &target);
        b.iter(|| source.set_as("width", black_box(100.0_f64)))
    });

    group.bench_function("bind_unbind", |b| {
        let target = Object::new();
        target.set_as("width", 100.0_f64);
        b.iter_batched(
            Object::new,
            |source| {
                let binding = source.bind_to("width", &target);
                black_box(binding.unbind());
                black_box(source);
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();

    let mut group = c.benchmark_group("binding/chain");

    for len in [2_usize, 8, 32] {
        group.bench_function(BenchmarkId::new("set_tail", len), |b| {
            let (objects, _bindings) = chain(len);
            let tail = &objects[len - 1];
            b.iter(|| tail.set_as("v", black_box(1.0_f64)))
        });

        group.bench_function(BenchmarkId::new("set_head", len), |b| {
            let (objects, _bindings) = chain(len);
            let head = &objects[0];
            b.iter(|| head.set_as("v", black_box(1.0_f64)))
        });

        group.bench_function(BenchmarkId::new("get_head", len), |b| {
            let (objects, _bindings) = chain(len);
            let head = &objects[0];
            b.iter(|| black_box(head.get_as::<f64>("v")))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_binding);
criterion_main!(benches);
