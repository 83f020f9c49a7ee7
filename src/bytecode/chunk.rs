//! Checked bytecode view
//!
//! A [`BytecodeChunk`] borrows bytecode owned elsewhere and hands out
//! [`Instruction`] views that are validated once on creation: the opcode is
//! not reserved and the whole instruction fits. Field accessors are
//! form-aware and return `None` for fields the form does not define, so they
//! never read outside the instruction.
//!
//! This is the default entry point for disassemblers, debuggers and tests.
//! The interpreter fast path uses [`crate::bytecode::raw`] instead.

use smallvec::SmallVec;
use tracing::trace;

use super::decode::{fields, Layout};
use super::error::{DecodeError, DecodeResult};
use super::opcodes::{Form, Opcode, OperandRole, LEGACY_INSTRUCTION_SIZE};
use super::sizes::size_of;

/// Borrowed, bounds-checked view over a bytecode stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BytecodeChunk<'a> {
    code: &'a [u8],
}

/// One validated instruction inside a [`BytecodeChunk`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    offset: usize,
    opcode: Opcode,
    bytes: &'a [u8],
}

/// Decoded operands of an instruction, shaped by its form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    None,
    A(u8),
    D(u32),
    X(i32),
    T(i32),
    AD { a: u8, d: u32 },
    AX { a: u8, x: i32 },
    AE { a: u8, e: u32 },
    AY { a: u8, y: i32 },
    DF { d: u32, f: u8 },
    ABC { a: u8, b: u8, c: u8 },
}

impl Operands {
    /// Operand values in position order
    pub fn values(&self) -> SmallVec<[i64; 3]> {
        let mut values = SmallVec::new();
        match *self {
            Operands::None => {}
            Operands::A(a) => values.push(a as i64),
            Operands::D(d) => values.push(d as i64),
            Operands::X(x) | Operands::T(x) => values.push(x as i64),
            Operands::AD { a, d } | Operands::AE { a, e: d } => {
                values.push(a as i64);
                values.push(d as i64);
            }
            Operands::AX { a, x } | Operands::AY { a, y: x } => {
                values.push(a as i64);
                values.push(x as i64);
            }
            Operands::DF { d, f } => {
                values.push(d as i64);
                values.push(f as i64);
            }
            Operands::ABC { a, b, c } => {
                values.push(a as i64);
                values.push(b as i64);
                values.push(c as i64);
            }
        }
        values
    }
}

impl<'a> BytecodeChunk<'a> {
    /// Wrap a bytecode stream
    pub fn new(code: &'a [u8]) -> Self {
        Self { code }
    }

    /// Get the raw bytes
    #[inline]
    pub fn code(&self) -> &'a [u8] {
        self.code
    }

    /// Get the length of the bytecode
    #[inline]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Check if the chunk is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Get a byte at the given offset
    #[inline]
    pub fn read_byte(&self, offset: usize) -> Option<u8> {
        self.code.get(offset).copied()
    }

    /// Get the opcode at the given offset
    #[inline]
    pub fn read_opcode(&self, offset: usize) -> Option<Opcode> {
        self.read_byte(offset).map(Opcode::from_byte)
    }

    /// Validate and view the instruction starting at `offset`
    pub fn instruction_at(&self, offset: usize) -> DecodeResult<Instruction<'a>> {
        let opcode = self
            .read_opcode(offset)
            .ok_or(DecodeError::OffsetOutOfBounds {
                offset,
                len: self.code.len(),
            })?;
        if opcode.is_reserved() {
            trace!(target: "kbc::decode", offset, %opcode, "Reserved opcode");
            return Err(DecodeError::ReservedOpcode { offset, opcode });
        }
        let needed = size_of(opcode);
        let available = self.code.len() - offset;
        if needed > available {
            trace!(
                target: "kbc::decode",
                offset,
                %opcode,
                needed,
                available,
                "Truncated instruction"
            );
            return Err(DecodeError::Truncated {
                offset,
                opcode,
                needed,
                available,
            });
        }
        Ok(Instruction {
            offset,
            opcode,
            bytes: &self.code[offset..offset + needed],
        })
    }

    /// Offset of the instruction following the one at `offset`
    pub fn next_offset(&self, offset: usize) -> DecodeResult<usize> {
        self.instruction_at(offset).map(|instr| instr.next_offset())
    }

    /// Iterate a straight-line instruction stream from the start
    pub fn instructions(&self) -> Instructions<'a> {
        self.instructions_from(0)
    }

    /// Iterate a straight-line instruction stream from `offset`
    pub fn instructions_from(&self, offset: usize) -> Instructions<'a> {
        Instructions {
            chunk: *self,
            offset,
            failed: false,
        }
    }

    /// Argument count of the ordinary call returning to `return_offset`.
    ///
    /// The count is the byte just before the return address.
    pub fn decode_argc(&self, return_offset: usize) -> DecodeResult<u8> {
        if return_offset == 0 || return_offset > self.code.len() {
            return Err(DecodeError::OffsetOutOfBounds {
                offset: return_offset,
                len: self.code.len(),
            });
        }
        Ok(self.code[return_offset - 1])
    }

    /// Argument count of the legacy call returning to `return_offset`
    pub fn decode_argc_legacy(&self, return_offset: usize) -> DecodeResult<u8> {
        let out_of_bounds = DecodeError::OffsetOutOfBounds {
            offset: return_offset,
            len: self.code.len(),
        };
        if return_offset > self.code.len() {
            return Err(out_of_bounds);
        }
        let call_offset = return_offset
            .checked_sub(LEGACY_INSTRUCTION_SIZE)
            .ok_or(out_of_bounds)?;
        let call = &self.code[call_offset..return_offset];
        let opcode = fields::opcode(call);
        if !opcode.is_legacy_call() && opcode != Opcode::NativeCall_Old {
            trace!(
                target: "kbc::decode",
                return_offset,
                %opcode,
                "No legacy call before return address"
            );
            return Err(DecodeError::NotACall {
                offset: call_offset,
                opcode,
            });
        }
        Ok(fields::argc_legacy(call))
    }
}

impl<'a> From<&'a [u8]> for BytecodeChunk<'a> {
    fn from(code: &'a [u8]) -> Self {
        Self::new(code)
    }
}

impl<'a> Instruction<'a> {
    /// Offset of the opcode byte within the chunk
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// The instruction's bytes, opcode included
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Total instruction length
    #[inline]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn next_offset(&self) -> usize {
        self.offset + self.bytes.len()
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        Layout::for_opcode(self.opcode)
    }

    #[inline]
    fn form(&self) -> Form {
        self.opcode.form()
    }

    pub fn a(&self) -> Option<u8> {
        matches!(
            self.form(),
            Form::A | Form::AD | Form::AX | Form::AE | Form::AY | Form::ABC
        )
        .then(|| fields::a(self.bytes))
    }

    pub fn b(&self) -> Option<u8> {
        (self.form() == Form::ABC).then(|| fields::b(self.bytes))
    }

    pub fn c(&self) -> Option<u8> {
        (self.form() == Form::ABC).then(|| fields::c(self.bytes))
    }

    pub fn d(&self) -> Option<u32> {
        matches!(self.form(), Form::D | Form::AD | Form::DF)
            .then(|| fields::d(self.bytes))
    }

    pub fn x(&self) -> Option<i32> {
        matches!(self.form(), Form::X | Form::AX)
            .then(|| fields::x(self.bytes))
    }

    pub fn t(&self) -> Option<i32> {
        (self.form() == Form::T).then(|| fields::t(self.bytes))
    }

    pub fn e(&self) -> Option<u32> {
        (self.form() == Form::AE).then(|| fields::e(self.bytes))
    }

    pub fn y(&self) -> Option<i32> {
        (self.form() == Form::AY).then(|| fields::y(self.bytes))
    }

    pub fn f(&self) -> Option<u8> {
        (self.form() == Form::DF).then(|| fields::f(self.bytes))
    }

    /// Absolute offset of a jump's target
    pub fn jump_target(&self) -> Option<i64> {
        self.t().map(|t| self.offset as i64 + t as i64)
    }

    /// Decode every operand according to the form
    pub fn operands(&self) -> Operands {
        let bc = self.bytes;
        match self.form() {
            Form::None => Operands::None,
            Form::A => Operands::A(fields::a(bc)),
            Form::D => Operands::D(fields::d(bc)),
            Form::X => Operands::X(fields::x(bc)),
            Form::T => Operands::T(fields::t(bc)),
            Form::AD => Operands::AD {
                a: fields::a(bc),
                d: fields::d(bc),
            },
            Form::AX => Operands::AX {
                a: fields::a(bc),
                x: fields::x(bc),
            },
            Form::AE => Operands::AE {
                a: fields::a(bc),
                e: fields::e(bc),
            },
            Form::AY => Operands::AY {
                a: fields::a(bc),
                y: fields::y(bc),
            },
            Form::DF => Operands::DF {
                d: fields::d(bc),
                f: fields::f(bc),
            },
            Form::ABC => Operands::ABC {
                a: fields::a(bc),
                b: fields::b(bc),
                c: fields::c(bc),
            },
        }
    }

    /// Operand values paired with their roles, ignored positions skipped
    pub fn operands_with_roles(&self) -> SmallVec<[(OperandRole, i64); 3]> {
        self.opcode
            .operand_roles()
            .into_iter()
            .zip(self.operands().values())
            .filter(|(role, _)| *role != OperandRole::Ignored)
            .collect()
    }
}

/// Iterator over consecutive instructions; stops after the first error
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    chunk: BytecodeChunk<'a>,
    offset: usize,
    failed: bool,
}

impl<'a> Iterator for Instructions<'a> {
    type Item = DecodeResult<Instruction<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.chunk.len() {
            return None;
        }
        match self.chunk.instruction_at(self.offset) {
            Ok(instr) => {
                self.offset = instr.next_offset();
                Some(Ok(instr))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for Instructions<'_> {}
