/// kbc - Kernel Bytecode Instruction Set Library
///
/// This library defines the kernel bytecode instruction set: the opcode
/// table, instruction sizes, operand decoding for the legacy, compact and wide
/// layouts, instruction classification, PC/offset conversion and the
/// container version gate.
///
/// # Architecture
///
/// 1. **Static schema** (`bytecode::opcodes`, `bytecode::sizes`)
///    - One declarative list generates the enum, names, forms and sizes
///    - Reserved slots keep their numeric positions
///
/// 2. **Decoding** (`bytecode::decode`, `bytecode::raw`, `bytecode::chunk`)
///    - A single layout classifier drives every field extractor
///    - Raw pointer accessors for the interpreter fast path
///    - Bounds-checked views for everything else
///
/// 3. **Tooling** (`bytecode::builder`, `bytecode::disasm`, `config`)
///    - Instruction encoder with automatic compact/wide selection
///    - Configurable disassembler used by the `kbcdump` binary
///
/// # Example
///
/// ```rust
/// use kbc::{disassemble, BytecodeChunk, DisasmConfig, Opcode};
///
/// let code = [Opcode::Entry as u8, 0, Opcode::ReturnTOS as u8];
/// let listing = disassemble(&BytecodeChunk::new(&code), &DisasmConfig::default());
/// assert!(listing.contains("ReturnTOS"));
/// ```

pub mod bytecode;
pub mod config;

pub use bytecode::{
    disassemble, BytecodeChunk, ChunkBuilder, ContainerHeader, DecodeError, EncodeError,
    Instruction, Layout, LoadError, Opcode, Operands, RawInstr,
};
pub use config::{ConfigError, DisasmConfig};
