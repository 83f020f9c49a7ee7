//! Kernel bytecode instruction set
//!
//! # Architecture
//!
//! ```text
//!  opcodes ──► sizes          static schema: names, forms, kinds, roles, lengths
//!     │
//!     ▼
//!  decode (Layout + field extractors)
//!     │                    │
//!     ▼                    ▼
//!  raw (unsafe ptr)     chunk (checked view) ──► disasm
//!  interpreter path     tools, debugger, tests
//! ```
//!
//! # Modules
//!
//! - [`opcodes`]: the opcode enumeration and its schema table
//! - [`sizes`]: fixed instruction lengths
//! - [`decode`]: layout detection and operand field extraction
//! - [`raw`]: unchecked accessors for verified streams
//! - [`chunk`]: bounds-checked instruction view
//! - [`classify`]: instruction category predicates
//! - [`pc`]: PC / side-table offset conversion
//! - [`format`]: container magic and version gate
//! - [`internal`]: VM-synthesized code sequences
//! - [`builder`]: instruction encoder
//! - [`disasm`]: text listings
//!
//! # Example
//!
//! ```
//! use kbc::bytecode::{BytecodeChunk, ChunkBuilder, Opcode};
//!
//! let mut builder = ChunkBuilder::new();
//! builder.emit_d(Opcode::Entry, 1).unwrap();
//! builder.emit_x(Opcode::PushInt, 1000).unwrap();
//! builder.emit(Opcode::ReturnTOS);
//! let code = builder.build();
//!
//! let chunk = BytecodeChunk::new(&code);
//! let push = chunk.instruction_at(2).unwrap();
//! assert_eq!(push.opcode(), Opcode::PushInt_Wide);
//! assert_eq!(push.x(), Some(1000));
//! ```

pub mod builder;
pub mod chunk;
pub mod classify;
pub mod decode;
pub mod disasm;
pub mod error;
pub mod format;
pub mod internal;
pub mod opcodes;
pub mod pc;
pub mod raw;
pub mod sizes;

pub use builder::{ChunkBuilder, JumpLabel};
pub use chunk::{BytecodeChunk, Instruction, Instructions, Operands};
pub use classify::JUMP_OPCODES;
pub use decode::{Layout, NATIVE_CALL_TO_GROWABLE_LIST_ARGC, WIDE_MODIFIER};
pub use disasm::{disassemble, disassemble_instruction};
pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult, LoadError};
pub use format::{
    check_format, is_supported_version, ContainerHeader, HEADER_SIZE, MAGIC, MAX_SUPPORTED_VERSION,
    MIN_SUPPORTED_VERSION,
};
pub use internal::{
    native_call_to_growable_list_return_trampoline, vm_internal_instructions,
    GROWABLE_LIST_TRAMPOLINE_RETURN_OFFSET,
};
pub use opcodes::{
    Form, Kind, Opcode, OpcodeInfo, OperandRole, SpecialIndex, ALL_OPCODES, LEGACY_INSTRUCTION_SIZE,
    MAX_INSTRUCTION_SIZE, OPCODE_COUNT, OPCODE_TABLE,
};
pub use pc::{bytecode_pc_to_offset, offset_to_bytecode_pc};
pub use raw::RawInstr;
pub use sizes::{size_of, size_of_byte, INSTRUCTION_SIZE};
