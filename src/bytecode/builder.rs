//! Bytecode builder
//!
//! Emits well-formed instructions into a growable buffer. Emitters for forms
//! with a wide variant pick the compact encoding when every operand fits in
//! 8 bits and the wide one otherwise, so callers can pass either the compact
//! or the wide opcode.

use super::chunk::BytecodeChunk;
use super::decode::Layout;
use super::error::{EncodeError, EncodeResult};
use super::opcodes::{Form, Kind, Opcode};

const TARGET_MIN: i64 = -(1 << 23);
const TARGET_MAX: i64 = (1 << 23) - 1;

/// Builder for bytecode streams
#[derive(Debug, Clone, Default)]
pub struct ChunkBuilder {
    code: Vec<u8>,
}

/// Label for a forward jump to be patched later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "forward jumps must be patched"]
pub struct JumpLabel {
    /// Offset of the jump's opcode byte
    offset: usize,
    opcode: Opcode,
}

impl JumpLabel {
    /// Offset of the jump instruction
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl ChunkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            code: Vec::with_capacity(capacity),
        }
    }

    /// Get the current bytecode offset
    #[inline]
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Bytes emitted so far
    #[inline]
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Checked view over the bytes emitted so far
    pub fn as_chunk(&self) -> BytecodeChunk<'_> {
        BytecodeChunk::new(&self.code)
    }

    /// Emit raw bytes
    pub fn emit_raw(&mut self, bytes: &[u8]) {
        self.code.extend_from_slice(bytes);
    }

    /// Emit an ordinary instruction without operands
    pub fn emit(&mut self, opcode: Opcode) {
        debug_assert_eq!(opcode.form(), Form::None, "{} takes operands", opcode);
        debug_assert_ne!(
            opcode.kind(),
            Kind::Legacy,
            "use emit_legacy for {}",
            opcode
        );
        self.code.push(opcode.to_byte());
    }

    /// Emit an ordinary `A` instruction
    pub fn emit_a(&mut self, opcode: Opcode, a: u8) {
        debug_assert_eq!(opcode.form(), Form::A, "{} is not an A instruction", opcode);
        self.code.extend_from_slice(&[opcode.to_byte(), a]);
    }

    /// Emit an ordinary `A_B_C` instruction
    pub fn emit_abc(&mut self, opcode: Opcode, a: u8, b: u8, c: u8) {
        debug_assert_eq!(
            opcode.form(),
            Form::ABC,
            "{} is not an A_B_C instruction",
            opcode
        );
        self.code.extend_from_slice(&[opcode.to_byte(), a, b, c]);
    }

    /// Emit a `D` instruction, compact if `d` fits in a byte
    pub fn emit_d(&mut self, opcode: Opcode, d: u32) -> EncodeResult<()> {
        debug_assert_eq!(opcode.form(), Form::D, "{} is not a D instruction", opcode);
        let opcode = ordinary(opcode)?;
        match u8::try_from(d) {
            Ok(byte) => self.code.extend_from_slice(&[compact(opcode).to_byte(), byte]),
            Err(_) => {
                self.code.push(wide(opcode)?.to_byte());
                self.code.extend_from_slice(&d.to_le_bytes());
            }
        }
        Ok(())
    }

    /// Emit an `X` instruction, compact if `x` fits in a signed byte
    pub fn emit_x(&mut self, opcode: Opcode, x: i32) -> EncodeResult<()> {
        debug_assert_eq!(opcode.form(), Form::X, "{} is not an X instruction", opcode);
        let opcode = ordinary(opcode)?;
        match i8::try_from(x) {
            Ok(byte) => self.code.extend_from_slice(&[compact(opcode).to_byte(), byte as u8]),
            Err(_) => {
                self.code.push(wide(opcode)?.to_byte());
                self.code.extend_from_slice(&x.to_le_bytes());
            }
        }
        Ok(())
    }

    /// Emit an `A_E` instruction, compact if `e` fits in a byte
    pub fn emit_a_e(&mut self, opcode: Opcode, a: u8, e: u32) -> EncodeResult<()> {
        debug_assert_eq!(
            opcode.form(),
            Form::AE,
            "{} is not an A_E instruction",
            opcode
        );
        let opcode = ordinary(opcode)?;
        match u8::try_from(e) {
            Ok(byte) => self.code.extend_from_slice(&[compact(opcode).to_byte(), a, byte]),
            Err(_) => {
                self.code.extend_from_slice(&[wide(opcode)?.to_byte(), a]);
                self.code.extend_from_slice(&e.to_le_bytes());
            }
        }
        Ok(())
    }

    /// Emit an `A_Y` instruction, compact if `y` fits in a signed byte
    pub fn emit_a_y(&mut self, opcode: Opcode, a: u8, y: i32) -> EncodeResult<()> {
        debug_assert_eq!(
            opcode.form(),
            Form::AY,
            "{} is not an A_Y instruction",
            opcode
        );
        let opcode = ordinary(opcode)?;
        match i8::try_from(y) {
            Ok(byte) => self.code.extend_from_slice(&[compact(opcode).to_byte(), a, byte as u8]),
            Err(_) => {
                self.code.extend_from_slice(&[wide(opcode)?.to_byte(), a]);
                self.code.extend_from_slice(&y.to_le_bytes());
            }
        }
        Ok(())
    }

    /// Emit a `D_F` instruction, compact if `d` fits in a byte
    pub fn emit_d_f(&mut self, opcode: Opcode, d: u32, f: u8) -> EncodeResult<()> {
        debug_assert_eq!(
            opcode.form(),
            Form::DF,
            "{} is not a D_F instruction",
            opcode
        );
        let opcode = ordinary(opcode)?;
        match u8::try_from(d) {
            Ok(byte) => self.code.extend_from_slice(&[compact(opcode).to_byte(), byte, f]),
            Err(_) => {
                self.code.push(wide(opcode)?.to_byte());
                self.code.extend_from_slice(&d.to_le_bytes());
                self.code.push(f);
            }
        }
        Ok(())
    }

    /// Emit a `T` instruction with a target relative to its own offset,
    /// compact if the distance fits in a signed byte
    pub fn emit_t(&mut self, opcode: Opcode, t: i32) -> EncodeResult<()> {
        debug_assert_eq!(opcode.form(), Form::T, "{} is not a T instruction", opcode);
        let opcode = ordinary(opcode)?;
        let distance = t as i64;
        match i8::try_from(t) {
            Ok(byte) => self.code.extend_from_slice(&[compact(opcode).to_byte(), byte as u8]),
            Err(_) => {
                let opcode = wide(opcode)?;
                let field = wide_target(opcode, distance)?;
                self.code.push(opcode.to_byte());
                self.code.extend_from_slice(&field);
            }
        }
        Ok(())
    }

    /// Emit a jump to a known target offset (usually backwards)
    pub fn emit_jump_to(&mut self, opcode: Opcode, target: usize) -> EncodeResult<()> {
        debug_assert!(opcode.is_jump(), "{} is not a jump", opcode);
        let distance = target as i64 - self.code.len() as i64;
        let t = i32::try_from(distance)
            .map_err(|_| EncodeError::TargetOutOfRange { opcode, distance })?;
        self.emit_t(opcode, t)
    }

    /// Create a forward jump, returns a label to patch later.
    ///
    /// The placeholder always uses the wide encoding.
    pub fn emit_jump(&mut self, opcode: Opcode) -> EncodeResult<JumpLabel> {
        debug_assert!(opcode.is_jump(), "{} is not a jump", opcode);
        let opcode = wide(ordinary(opcode)?)?;
        let offset = self.code.len();
        self.code.extend_from_slice(&[opcode.to_byte(), 0, 0, 0]);
        Ok(JumpLabel { offset, opcode })
    }

    /// Patch a jump label to jump to the current position
    pub fn patch_jump(&mut self, label: JumpLabel) -> EncodeResult<()> {
        let distance = self.code.len() as i64 - label.offset as i64;
        let field = match Layout::for_opcode(label.opcode) {
            Layout::Legacy => legacy_target(label.opcode, distance)?,
            _ => wide_target(label.opcode, distance)?,
        };
        self.code[label.offset + 1..label.offset + 4].copy_from_slice(&field);
        Ok(())
    }

    /// Emit a legacy instruction without operands
    pub fn emit_legacy(&mut self, opcode: Opcode) {
        self.emit_legacy_bytes(opcode, [0, 0, 0]);
    }

    /// Emit a legacy `A` instruction
    pub fn emit_legacy_a(&mut self, opcode: Opcode, a: u8) {
        self.emit_legacy_bytes(opcode, [a, 0, 0]);
    }

    /// Emit a legacy `D` instruction
    pub fn emit_legacy_d(&mut self, opcode: Opcode, d: u16) {
        self.emit_legacy_a_d(opcode, 0, d);
    }

    /// Emit a legacy `X` instruction
    pub fn emit_legacy_x(&mut self, opcode: Opcode, x: i16) {
        self.emit_legacy_a_d(opcode, 0, x as u16);
    }

    /// Emit a legacy `A_D` instruction
    pub fn emit_legacy_a_d(&mut self, opcode: Opcode, a: u8, d: u16) {
        let [lo, hi] = d.to_le_bytes();
        self.emit_legacy_bytes(opcode, [a, lo, hi]);
    }

    /// Emit a legacy `A_X` instruction
    pub fn emit_legacy_a_x(&mut self, opcode: Opcode, a: u8, x: i16) {
        self.emit_legacy_a_d(opcode, a, x as u16);
    }

    /// Emit a legacy `A_B_C` instruction
    pub fn emit_legacy_abc(&mut self, opcode: Opcode, a: u8, b: u8, c: u8) {
        self.emit_legacy_bytes(opcode, [a, b, c]);
    }

    /// Emit a legacy jump to a known target offset
    pub fn emit_legacy_jump_to(&mut self, opcode: Opcode, target: usize) -> EncodeResult<()> {
        debug_assert!(opcode.is_jump(), "{} is not a jump", opcode);
        let distance = target as i64 - self.code.len() as i64;
        let field = legacy_target(opcode, distance)?;
        self.emit_legacy_bytes(opcode, field);
        Ok(())
    }

    /// Create a forward legacy jump, returns a label to patch later
    pub fn emit_legacy_jump(&mut self, opcode: Opcode) -> JumpLabel {
        debug_assert!(opcode.is_jump(), "{} is not a jump", opcode);
        let offset = self.code.len();
        self.emit_legacy_bytes(opcode, [0, 0, 0]);
        JumpLabel { offset, opcode }
    }

    fn emit_legacy_bytes(&mut self, opcode: Opcode, operands: [u8; 3]) {
        debug_assert_eq!(
            opcode.kind(),
            Kind::Legacy,
            "{} is not a legacy instruction",
            opcode
        );
        self.code.push(opcode.to_byte());
        self.code.extend_from_slice(&operands);
    }

    /// Finish building and return the bytecode
    pub fn build(self) -> Vec<u8> {
        self.code
    }
}

/// Reject legacy opcodes in the width-selecting emitters
fn ordinary(opcode: Opcode) -> EncodeResult<Opcode> {
    match opcode.kind() {
        Kind::Legacy => Err(EncodeError::LegacyOpcode { opcode }),
        _ => Ok(opcode),
    }
}

fn compact(opcode: Opcode) -> Opcode {
    opcode.compact_variant().unwrap_or(opcode)
}

fn wide(opcode: Opcode) -> EncodeResult<Opcode> {
    if opcode.kind() == Kind::Wide {
        return Ok(opcode);
    }
    opcode.wide_variant().ok_or(EncodeError::NoWideVariant { opcode })
}

/// 24-bit target field of a wide jump
fn wide_target(opcode: Opcode, distance: i64) -> EncodeResult<[u8; 3]> {
    if !(TARGET_MIN..=TARGET_MAX).contains(&distance) {
        return Err(EncodeError::TargetOutOfRange { opcode, distance });
    }
    let [b0, b1, b2, _] = (distance as i32).to_le_bytes();
    Ok([b0, b1, b2])
}

/// 24-bit target field of a legacy jump, counted in instructions
fn legacy_target(opcode: Opcode, distance: i64) -> EncodeResult<[u8; 3]> {
    if distance % 4 != 0 {
        return Err(EncodeError::MisalignedTarget { opcode, distance });
    }
    wide_target(opcode, distance / 4)
        .map_err(|_| EncodeError::TargetOutOfRange { opcode, distance })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::chunk::Operands;

    #[test]
    fn test_compact_and_wide_selection() {
        let mut builder = ChunkBuilder::new();
        builder.emit_d(Opcode::PushConstant, 7).unwrap();
        builder.emit_d(Opcode::PushConstant_Wide, 0x1234).unwrap();
        builder.emit_x(Opcode::PushInt, -128).unwrap();
        builder.emit_x(Opcode::PushInt, 128).unwrap();
        let code = builder.build();
        assert_eq!(
            code,
            [
                &[Opcode::PushConstant as u8, 7][..],
                &[Opcode::PushConstant_Wide as u8, 0x34, 0x12, 0, 0],
                &[Opcode::PushInt as u8, 0x80],
                &[Opcode::PushInt_Wide as u8, 0x80, 0, 0, 0],
            ]
            .concat()
        );
    }

    #[test]
    fn test_emitted_operands_decode() {
        let mut builder = ChunkBuilder::new();
        builder.emit_a_e(Opcode::LoadConstant, 3, 300).unwrap();
        builder.emit_d_f(Opcode::DirectCall, 9, 2).unwrap();
        builder.emit_abc(Opcode::EntryOptional, 1, 2, 3);
        let chunk = builder.as_chunk();
        let ops: Vec<_> = chunk.instructions().map(|i| i.unwrap().operands()).collect();
        assert_eq!(
            ops,
            vec![
                Operands::AE { a: 3, e: 300 },
                Operands::DF { d: 9, f: 2 },
                Operands::ABC { a: 1, b: 2, c: 3 },
            ]
        );
    }

    #[test]
    fn test_no_wide_variant() {
        assert_eq!(wide(Opcode::PushInt), Ok(Opcode::PushInt_Wide));
        assert_eq!(wide(Opcode::PushInt_Wide), Ok(Opcode::PushInt_Wide));
        assert_eq!(
            wide(Opcode::Trap),
            Err(EncodeError::NoWideVariant {
                opcode: Opcode::Trap,
            })
        );
    }

    #[test]
    fn test_legacy_opcodes_rejected_by_width_selection() {
        let mut builder = ChunkBuilder::new();
        assert_eq!(
            builder.emit_d(Opcode::Entry_Old, 5),
            Err(EncodeError::LegacyOpcode {
                opcode: Opcode::Entry_Old,
            })
        );
        assert_eq!(
            builder.emit_d(Opcode::Entry_Old, 1000),
            Err(EncodeError::LegacyOpcode {
                opcode: Opcode::Entry_Old,
            })
        );
        assert_eq!(
            builder.emit_x(Opcode::PushInt_Old, -1),
            Err(EncodeError::LegacyOpcode {
                opcode: Opcode::PushInt_Old,
            })
        );
        assert_eq!(
            builder.emit_t(Opcode::Jump_Old, 4),
            Err(EncodeError::LegacyOpcode {
                opcode: Opcode::Jump_Old,
            })
        );
        assert_eq!(
            builder.emit_jump(Opcode::JumpIfFalse_Old),
            Err(EncodeError::LegacyOpcode {
                opcode: Opcode::JumpIfFalse_Old,
            })
        );
        assert!(builder.code().is_empty());

        builder.emit_legacy_d(Opcode::Entry_Old, 5);
        builder.emit_legacy_x(Opcode::PushInt_Old, -1);
        let sizes: Vec<_> = builder
            .as_chunk()
            .instructions()
            .map(|i| i.unwrap().size())
            .collect();
        assert_eq!(sizes, vec![4, 4]);
    }

    #[test]
    fn test_forward_jump_patching() {
        let mut builder = ChunkBuilder::new();
        let else_jump = builder.emit_jump(Opcode::JumpIfFalse).unwrap();
        builder.emit(Opcode::PushNull);
        builder.patch_jump(else_jump).unwrap();
        builder.emit(Opcode::ReturnTOS);

        let chunk = builder.as_chunk();
        let jump = chunk.instruction_at(0).unwrap();
        assert_eq!(jump.opcode(), Opcode::JumpIfFalse_Wide);
        assert_eq!(jump.t(), Some(5));
        assert_eq!(jump.jump_target(), Some(5));
        assert_eq!(chunk.read_opcode(5), Some(Opcode::ReturnTOS));
    }

    #[test]
    fn test_backward_jumps() {
        let mut builder = ChunkBuilder::new();
        builder.emit(Opcode::PushNull);
        builder.emit_jump_to(Opcode::Jump, 0).unwrap();
        let chunk = builder.as_chunk();
        assert_eq!(chunk.instruction_at(1).unwrap().jump_target(), Some(0));

        let mut builder = ChunkBuilder::new();
        for _ in 0..200 {
            builder.emit(Opcode::PushNull);
        }
        builder.emit_jump_to(Opcode::Jump, 0).unwrap();
        let jump = builder.as_chunk().instruction_at(200).unwrap();
        assert_eq!(jump.opcode(), Opcode::Jump_Wide);
        assert_eq!(jump.t(), Some(-200));
    }

    #[test]
    fn test_legacy_jumps() {
        let mut builder = ChunkBuilder::new();
        let label = builder.emit_legacy_jump(Opcode::JumpIfTrue_Old);
        builder.emit_legacy(Opcode::PushNull_Old);
        builder.patch_jump(label).unwrap();
        builder.emit_legacy_jump_to(Opcode::Jump_Old, 0).unwrap();

        let chunk = builder.as_chunk();
        assert_eq!(chunk.instruction_at(0).unwrap().t(), Some(8));
        assert_eq!(chunk.instruction_at(8).unwrap().jump_target(), Some(0));
        assert_eq!(
            legacy_target(Opcode::Jump_Old, 6),
            Err(EncodeError::MisalignedTarget {
                opcode: Opcode::Jump_Old,
                distance: 6,
            })
        );
    }

    #[test]
    fn test_target_range() {
        assert!(wide_target(Opcode::Jump_Wide, TARGET_MAX).is_ok());
        assert_eq!(
            wide_target(Opcode::Jump_Wide, TARGET_MAX + 1),
            Err(EncodeError::TargetOutOfRange {
                opcode: Opcode::Jump_Wide,
                distance: TARGET_MAX + 1,
            })
        );
    }

    #[test]
    fn test_legacy_operands() {
        let mut builder = ChunkBuilder::new();
        builder.emit_legacy_a_x(Opcode::MoveSpecial_Old, 1, -3);
        builder.emit_legacy_d(Opcode::Entry_Old, 0x1234);
        let chunk = builder.as_chunk();
        assert_eq!(
            chunk.instruction_at(0).unwrap().operands(),
            Operands::AX { a: 1, x: -3 }
        );
        assert_eq!(chunk.instruction_at(4).unwrap().d(), Some(0x1234));
    }
}
