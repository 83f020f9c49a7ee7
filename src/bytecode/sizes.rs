//! Instruction size table
//!
//! Every opcode has exactly one total instruction length. Stepping to the
//! next instruction always adds that length; it is never recomputed from the
//! operand bytes. Tooling and the interpreter both read this table so they
//! cannot disagree on instruction boundaries.

use super::opcodes::{Opcode, OPCODE_COUNT, OPCODE_INFO};

/// Total byte length of each instruction, indexed by opcode byte
pub static INSTRUCTION_SIZE: [u8; OPCODE_COUNT] = build_size_table();

const fn build_size_table() -> [u8; OPCODE_COUNT] {
    let mut table = [0u8; OPCODE_COUNT];
    let mut i = 0;
    while i < OPCODE_COUNT {
        table[i] = OPCODE_INFO[i].size;
        i += 1;
    }
    table
}

/// Byte length of an instruction with the given opcode
#[inline(always)]
pub fn size_of(op: Opcode) -> usize {
    INSTRUCTION_SIZE[op as usize] as usize
}

/// Byte length of an instruction whose first byte is `byte`
#[inline(always)]
pub fn size_of_byte(byte: u8) -> usize {
    INSTRUCTION_SIZE[byte as usize] as usize
}
