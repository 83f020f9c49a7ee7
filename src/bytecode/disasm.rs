//! Disassembler
//!
//! Renders one line per instruction:
//!
//! ```text
//! 0000  Entry                           2
//! 0002  LoadConstant                    r0, #5
//! 0005  JumpIfFalse                     -> 000a
//! ```
//!
//! Operands are printed by role: immediates in decimal, pool literals as
//! `#n`, frame slots as `rN` and jump targets as absolute offsets.

use itertools::Itertools;
use tracing::{debug, warn};

use super::chunk::{BytecodeChunk, Instruction};
use super::error::DecodeError;
use super::opcodes::{OperandRole, MAX_INSTRUCTION_SIZE};
use super::sizes::size_of;
use crate::config::DisasmConfig;

/// Width of the mnemonic column
const MNEMONIC_WIDTH: usize = 32;

/// Disassemble a whole bytecode stream.
///
/// Undecodable bytes produce an `<error: ...>` line instead of a panic.
pub fn disassemble(chunk: &BytecodeChunk<'_>, config: &DisasmConfig) -> String {
    let mut output = String::new();
    let mut offset = 0;
    let mut count = 0usize;

    while offset < chunk.len() {
        match chunk.instruction_at(offset) {
            Ok(instr) => {
                output.push_str(&disassemble_instruction(&instr, config));
                output.push('\n');
                offset = instr.next_offset();
                count += 1;
            }
            Err(err) => {
                warn!(target: "kbc::disasm", offset, "{}", err);
                output.push_str(&error_line(offset, &err, config));
                output.push('\n');
                match err {
                    DecodeError::ReservedOpcode { opcode, .. } if !config.stop_on_error => {
                        offset += size_of(opcode);
                    }
                    _ => break,
                }
            }
        }
    }

    debug!(
        target: "kbc::disasm",
        bytes = chunk.len(),
        instructions = count,
        "Disassembled chunk"
    );
    output
}

/// Render a single instruction without a trailing newline
pub fn disassemble_instruction(instr: &Instruction<'_>, config: &DisasmConfig) -> String {
    let mut line = prefix(instr.offset(), instr.bytes(), config);
    let operands = instr
        .operands_with_roles()
        .into_iter()
        .map(|(role, value)| {
            render_operand(role, value, instr.offset(), config.base_offset)
        })
        .join(", ");

    if operands.is_empty() {
        line.push_str(instr.opcode().name());
    } else {
        line.push_str(&format!(
            "{:<width$}{}",
            instr.opcode().name(),
            operands,
            width = MNEMONIC_WIDTH
        ));
    }
    line
}

fn render_operand(role: OperandRole, value: i64, offset: usize, base: u64) -> String {
    match role {
        OperandRole::Ignored | OperandRole::Immediate => value.to_string(),
        OperandRole::Literal => format!("#{}", value),
        OperandRole::Register | OperandRole::SignedRegister => format!("r{}", value),
        OperandRole::Target => {
            let target = i128::from(base) + offset as i128 + i128::from(value);
            if target < 0 {
                format!("-> -{:04x}", target.unsigned_abs())
            } else {
                format!("-> {:04x}", target)
            }
        }
    }
}

fn prefix(offset: usize, bytes: &[u8], config: &DisasmConfig) -> String {
    let mut line = String::new();
    if config.show_offsets {
        let absolute = u128::from(config.base_offset) + offset as u128;
        line.push_str(&format!("{:04x}  ", absolute));
    }
    if config.show_bytes {
        let hex = bytes.iter().map(|byte| format!("{:02x}", byte)).join(" ");
        line.push_str(&format!(
            "{:<width$}  ",
            hex,
            width = MAX_INSTRUCTION_SIZE * 3 - 1
        ));
    }
    line
}

fn error_line(offset: usize, err: &DecodeError, config: &DisasmConfig) -> String {
    let mut line = prefix(offset, &[], config);
    line.push_str(&format!("<error: {}>", err));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::builder::ChunkBuilder;
    use crate::bytecode::opcodes::Opcode;

    fn listing(code: &[u8], config: &DisasmConfig) -> Vec<String> {
        disassemble(&BytecodeChunk::new(code), config).lines().map(str::to_string).collect()
    }

    #[test]
    fn test_operand_rendering() {
        let mut builder = ChunkBuilder::new();
        builder.emit_d(Opcode::Entry, 2).unwrap();
        builder.emit_a_e(Opcode::LoadConstant, 0, 5).unwrap();
        let label = builder.emit_jump(Opcode::JumpIfFalse).unwrap();
        builder.emit_x(Opcode::StoreLocal, -3).unwrap();
        builder.patch_jump(label).unwrap();
        builder.emit(Opcode::ReturnTOS);

        let lines = listing(builder.code(), &DisasmConfig::default());
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("0000  Entry"));
        assert!(lines[0].ends_with(" 2"));
        assert!(lines[1].ends_with("r0, #5"));
        assert!(lines[2].contains("JumpIfFalse_Wide"));
        assert!(lines[2].ends_with("-> 000b"));
        assert!(lines[3].ends_with("r-3"));
        assert_eq!(lines[4], "000b  ReturnTOS");
    }

    #[test]
    fn test_bytes_and_base_offset() {
        let config = DisasmConfig {
            show_bytes: true,
            base_offset: 0x100,
            ..DisasmConfig::default()
        };
        let code = [Opcode::Jump as u8, 0xfe];
        let lines = listing(&code, &config);
        let expected = format!("0100  {:02x} fe", Opcode::Jump as u8);
        assert!(lines[0].starts_with(&expected), "{}", lines[0]);
        assert!(lines[0].ends_with("-> 00fe"));
    }

    #[test]
    fn test_error_line() {
        let code = [
            Opcode::PushNull as u8,
            Opcode::Unused00 as u8,
            Opcode::PushNull as u8,
        ];
        let lines = listing(&code, &DisasmConfig::default());
        assert_eq!(lines.len(), 2);
        let expected = "0001  <error: Reserved opcode Unused00 ";
        assert!(lines[1].starts_with(expected), "{}", lines[1]);

        let config = DisasmConfig {
            stop_on_error: false,
            ..DisasmConfig::default()
        };
        assert_eq!(listing(&code, &config).len(), 3);

        let truncated = [Opcode::PushInt_Wide as u8, 1];
        let lines = listing(&truncated, &config);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Truncated PushInt_Wide"));
    }

    #[test]
    fn test_base_offset_near_u64_max() {
        let config = DisasmConfig {
            base_offset: u64::MAX,
            ..DisasmConfig::default()
        };
        let code = [Opcode::PushNull as u8, Opcode::Jump as u8, 0x7f];
        let lines = listing(&code, &config);
        assert_eq!(lines[0], "ffffffffffffffff  PushNull");
        assert!(
            lines[1].starts_with("10000000000000000  Jump"),
            "{}",
            lines[1]
        );
        assert!(lines[1].ends_with("-> 1000000000000007f"), "{}", lines[1]);
    }

    #[test]
    fn test_skips_reserved_legacy_slot() {
        let config = DisasmConfig {
            stop_on_error: false,
            ..DisasmConfig::default()
        };
        let code = [
            Opcode::Unused00_Old as u8,
            0,
            0,
            0,
            Opcode::PushNull_Old as u8,
            0,
            0,
            0,
        ];
        let lines = listing(&code, &config);
        assert_eq!(lines.len(), 2);
        let expected = "0000  <error: Reserved opcode Unused00_Old";
        assert!(lines[0].starts_with(expected), "{}", lines[0]);
        assert_eq!(lines[1], "0004  PushNull_Old");
    }

    #[test]
    fn test_no_offsets() {
        let config = DisasmConfig {
            show_offsets: false,
            ..DisasmConfig::default()
        };
        let code = [Opcode::ReturnTOS as u8];
        assert_eq!(listing(&code, &config), vec!["ReturnTOS".to_string()]);
    }
}
