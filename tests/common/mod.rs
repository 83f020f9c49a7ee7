//! Shared helpers for kbc integration tests
//!
//! - Building straight-line programs with known instruction sizes
//! - Container headers for the version gate
//! - Locating the `kbcdump` binary

#![allow(dead_code)]

use std::path::PathBuf;

use kbc::bytecode::{ChunkBuilder, Opcode, MAGIC};

/// A straight-line program together with the size of every instruction
pub struct Program {
    pub code: Vec<u8>,
    pub sizes: Vec<usize>,
}

/// Program touching every ordinary form in both widths plus a few legacy
/// instructions
pub fn mixed_program() -> Program {
    let mut builder = ChunkBuilder::new();
    let mut sizes = Vec::new();
    let b = &mut builder;
    let s = &mut sizes;

    measured(b, s, |b| b.emit_legacy_d(Opcode::Entry_Old, 3));
    measured(b, s, |b| {
        b.emit_legacy_a_d(Opcode::LoadConstant_Old, 1, 0x1234)
    });
    measured(b, s, |b| b.emit_d(Opcode::Entry, 2).unwrap());
    measured(b, s, |b| b.emit_d(Opcode::Frame, 0x1_0000).unwrap());
    measured(b, s, |b| b.emit_a(Opcode::CheckStack, 0));
    measured(b, s, |b| b.emit_abc(Opcode::EntryOptional, 1, 2, 3));
    measured(b, s, |b| b.emit_x(Opcode::PushInt, -5).unwrap());
    measured(b, s, |b| b.emit_x(Opcode::PushInt, -500).unwrap());
    measured(b, s, |b| b.emit_a_e(Opcode::LoadConstant, 0, 7).unwrap());
    measured(b, s, |b| b.emit_a_e(Opcode::LoadConstant, 0, 700).unwrap());
    measured(b, s, |b| b.emit_a_y(Opcode::MoveSpecial, 1, -2).unwrap());
    measured(b, s, |b| b.emit_a_y(Opcode::MoveSpecial, 1, -200).unwrap());
    measured(b, s, |b| b.emit_d_f(Opcode::DirectCall, 4, 2).unwrap());
    measured(b, s, |b| b.emit_d_f(Opcode::DynamicCall, 400, 3).unwrap());
    measured(b, s, |b| b.emit_t(Opcode::Jump, 2).unwrap());
    measured(b, s, |b| b.emit_t(Opcode::Jump, 2000).unwrap());
    measured(b, s, |b| b.emit(Opcode::ReturnTOS));

    Program {
        code: builder.build(),
        sizes,
    }
}

fn measured(
    builder: &mut ChunkBuilder,
    sizes: &mut Vec<usize>,
    emit: impl FnOnce(&mut ChunkBuilder),
) {
    let start = builder.current_offset();
    emit(builder);
    sizes.push(builder.current_offset() - start);
}

/// Container header with the given magic and version
pub fn header(magic: u32, version: u32) -> Vec<u8> {
    let mut bytes = magic.to_be_bytes().to_vec();
    bytes.extend_from_slice(&version.to_be_bytes());
    bytes
}

/// Valid container wrapping `code`
pub fn container(version: u32, code: &[u8]) -> Vec<u8> {
    let mut bytes = header(MAGIC, version);
    bytes.extend_from_slice(code);
    bytes
}

/// Path of the kbcdump binary built for this test run
pub fn kbcdump() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_kbcdump"))
}

/// Write `bytes` to a fresh file under the system temp directory
pub fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kbc-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("Failed to create temp dir");
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write temp file");
    path
}
