//! Benchmark comparing the raw fast path with the checked view
//!
//! Both walk the same straight-line stream and sum every decoded operand, so
//! the difference is the cost of validation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kbc::bytecode::{BytecodeChunk, ChunkBuilder, Form, Opcode, RawInstr};
use std::time::Duration;

/// Build a stream of `count` instructions cycling through the common forms
fn build_stream(count: usize) -> Vec<u8> {
    let mut builder = ChunkBuilder::with_capacity(count * 4);
    for i in 0..count {
        let value = (i * 37) as u32;
        match i % 6 {
            0 => builder.emit_d(Opcode::PushConstant, value).unwrap(),
            1 => builder.emit_x(Opcode::PushInt, -(value as i32)).unwrap(),
            2 => builder.emit_a_e(Opcode::LoadConstant, (i % 16) as u8, value).unwrap(),
            3 => builder.emit_d_f(Opcode::DirectCall, value, 2).unwrap(),
            4 => builder.emit_t(Opcode::JumpIfFalse, (i % 200) as i32).unwrap(),
            _ => builder.emit(Opcode::PushNull),
        }
    }
    builder.emit(Opcode::ReturnTOS);
    builder.build()
}

fn walk_raw(code: &[u8]) -> i64 {
    let mut sum = 0i64;
    let end = code.as_ptr_range().end;
    // SAFETY: the stream comes from ChunkBuilder and is well formed.
    let mut instr = unsafe { RawInstr::new(code.as_ptr()) };
    while instr.as_ptr() < end {
        sum += match instr.opcode().form() {
            Form::D => instr.d() as i64,
            Form::X => instr.x() as i64,
            Form::AE => instr.e() as i64,
            Form::DF => instr.f() as i64,
            Form::T => instr.t() as i64,
            _ => 0,
        };
        instr = instr.next();
    }
    sum
}

fn walk_checked(code: &[u8]) -> i64 {
    BytecodeChunk::new(code)
        .instructions()
        .filter_map(Result::ok)
        .map(|instr| instr.operands().values().iter().sum::<i64>())
        .sum()
}

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");
    group.measurement_time(Duration::from_secs(5));

    for count in [64, 1024, 16384].iter() {
        let code = build_stream(*count);
        group.throughput(Throughput::Bytes(code.len() as u64));

        group.bench_with_input(BenchmarkId::new("raw", count), &code, |b, code| {
            b.iter(|| walk_raw(black_box(code)))
        });
        group.bench_with_input(BenchmarkId::new("checked", count), &code, |b, code| {
            b.iter(|| walk_checked(black_box(code)))
        });
    }

    group.finish();
}

fn bench_single_field(c: &mut Criterion) {
    let code = [Opcode::LoadConstant_Wide as u8, 3, 0x78, 0x56, 0x34, 0x12];
    let chunk = BytecodeChunk::new(&code);

    c.bench_function("decode_e_raw", |b| {
        b.iter(|| unsafe {
            kbc::bytecode::raw::decode_e(black_box(code.as_ptr()))
        })
    });
    c.bench_function("decode_e_checked", |b| {
        b.iter(|| {
            black_box(&chunk)
                .instruction_at(0)
                .ok()
                .and_then(|instr| instr.e())
        })
    });
}

criterion_group!(benches, bench_walk, bench_single_field);
criterion_main!(benches);
