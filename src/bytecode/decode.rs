//! Operand decoding
//!
//! Instructions come in three physical layouts:
//!
//! ```text
//!             0........8.......16.......24.......32.......40.......48
//! legacy      | opcode |   A    |        D / X / E / Y      |
//!             | opcode |   A    |   B    |   C    |
//!             | opcode |            T (24 bit)    |
//!
//! compact     | opcode |  A/D/X/T |  E/Y/F |   C    |
//!
//! wide        | opcode |                D / X              |
//!             | opcode |            T (24 bit)    |
//!             | opcode |   A    |                E / Y              |
//!             | opcode |                D                  |   F    |
//! ```
//!
//! The layout is a pure function of the opcode byte: everything below
//! [`Opcode::FIRST_ORDINARY`] is legacy, and among ordinary opcodes the low bit
//! selects the wide variant. [`Layout::of`] is the one place that makes this
//! decision; every field extractor dispatches on its result.
//!
//! The extractors in [`fields`] are generic over a byte source so the checked
//! view ([`crate::bytecode::chunk`]) and the raw fast path
//! ([`crate::bytecode::raw`]) share one implementation.

use super::opcodes::{Kind, Opcode};

/// Low opcode bit marking the wide variant of an ordinary instruction
pub const WIDE_MODIFIER: u8 = 1;

/// Argument count reported for the one native call that redirects to bytecode
/// (the 2-argument growable list constructor).
pub const NATIVE_CALL_TO_GROWABLE_LIST_ARGC: u8 = 2;

/// Physical byte layout of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Fixed 4-byte legacy encoding, 16-bit fields
    Legacy,
    /// Ordinary encoding with 8-bit fields
    Compact,
    /// Ordinary encoding with 32-bit (24-bit for targets) fields
    Wide,
}

impl Layout {
    /// Classify an instruction by its opcode byte.
    ///
    /// The wide test is only meaningful for opcodes that have a wide
    /// counterpart; it is never consulted for fields that do not vary by width.
    #[inline(always)]
    pub const fn of(opcode: u8) -> Layout {
        if opcode < Opcode::FIRST_ORDINARY as u8 {
            Layout::Legacy
        } else if opcode & WIDE_MODIFIER != 0 {
            Layout::Wide
        } else {
            Layout::Compact
        }
    }

    /// Layout implied by the schema of an opcode
    pub fn for_opcode(op: Opcode) -> Layout {
        match op.kind() {
            Kind::Legacy => Layout::Legacy,
            Kind::Wide => Layout::Wide,
            Kind::Ordinary => Layout::Compact,
            Kind::Reserved if op.is_legacy_era() => Layout::Legacy,
            Kind::Reserved => Layout::Compact,
        }
    }
}

/// Indexed access to the bytes of one instruction.
pub(crate) trait ByteSource: Copy {
    fn byte(self, index: usize) -> u8;
}

impl ByteSource for &[u8] {
    #[inline(always)]
    fn byte(self, index: usize) -> u8 {
        self[index]
    }
}

/// Field extractors shared by the checked and raw accessors.
pub(crate) mod fields {
    use super::{ByteSource, Layout, NATIVE_CALL_TO_GROWABLE_LIST_ARGC};
    use crate::bytecode::opcodes::Opcode;

    #[inline(always)]
    fn u16_at<S: ByteSource>(bc: S, at: usize) -> u16 {
        u16::from_le_bytes([bc.byte(at), bc.byte(at + 1)])
    }

    #[inline(always)]
    fn u32_at<S: ByteSource>(bc: S, at: usize) -> u32 {
        u32::from_le_bytes([
            bc.byte(at),
            bc.byte(at + 1),
            bc.byte(at + 2),
            bc.byte(at + 3),
        ])
    }

    /// Bytes 1..=3 packed into bits 8..31 of a word.
    #[inline(always)]
    fn packed_target<S: ByteSource>(bc: S) -> i32 {
        (((bc.byte(1) as u32) << 8) | ((bc.byte(2) as u32) << 16) | ((bc.byte(3) as u32) << 24))
            as i32
    }

    #[inline(always)]
    pub(crate) fn opcode<S: ByteSource>(bc: S) -> Opcode {
        Opcode::from_byte(bc.byte(0))
    }

    #[inline(always)]
    pub(crate) fn layout<S: ByteSource>(bc: S) -> Layout {
        Layout::of(bc.byte(0))
    }

    #[inline(always)]
    pub(crate) fn a<S: ByteSource>(bc: S) -> u8 {
        bc.byte(1)
    }

    #[inline(always)]
    pub(crate) fn b<S: ByteSource>(bc: S) -> u8 {
        bc.byte(2)
    }

    #[inline(always)]
    pub(crate) fn c<S: ByteSource>(bc: S) -> u8 {
        bc.byte(3)
    }

    #[inline(always)]
    pub(crate) fn d<S: ByteSource>(bc: S) -> u32 {
        match layout(bc) {
            Layout::Legacy => u16_at(bc, 2) as u32,
            Layout::Wide => u32_at(bc, 1),
            Layout::Compact => bc.byte(1) as u32,
        }
    }

    #[inline(always)]
    pub(crate) fn x<S: ByteSource>(bc: S) -> i32 {
        match layout(bc) {
            Layout::Legacy => u16_at(bc, 2) as i16 as i32,
            Layout::Wide => u32_at(bc, 1) as i32,
            Layout::Compact => bc.byte(1) as i8 as i32,
        }
    }

    // Legacy targets are scaled by 4 (shift 6), wide targets are not (shift 8).
    // Both formulas are part of the format and must not be unified.
    #[inline(always)]
    pub(crate) fn t<S: ByteSource>(bc: S) -> i32 {
        match layout(bc) {
            Layout::Legacy => packed_target(bc) >> (8 - 2),
            Layout::Wide => packed_target(bc) >> 8,
            Layout::Compact => bc.byte(1) as i8 as i32,
        }
    }

    #[inline(always)]
    pub(crate) fn e<S: ByteSource>(bc: S) -> u32 {
        match layout(bc) {
            Layout::Legacy => u16_at(bc, 2) as u32,
            Layout::Wide => u32_at(bc, 2),
            Layout::Compact => bc.byte(2) as u32,
        }
    }

    #[inline(always)]
    pub(crate) fn y<S: ByteSource>(bc: S) -> i32 {
        match layout(bc) {
            Layout::Legacy => u16_at(bc, 2) as i16 as i32,
            Layout::Wide => u32_at(bc, 2) as i32,
            Layout::Compact => bc.byte(2) as i8 as i32,
        }
    }

    #[inline(always)]
    pub(crate) fn f<S: ByteSource>(bc: S) -> u8 {
        match layout(bc) {
            Layout::Legacy => bc.byte(1),
            Layout::Wide => bc.byte(5),
            Layout::Compact => bc.byte(2),
        }
    }

    /// Argument count of the legacy call instruction `call`.
    #[inline(always)]
    pub(crate) fn argc_legacy<S: ByteSource>(call: S) -> u8 {
        let op = opcode(call);
        debug_assert!(op.is_legacy_era(), "{} is not a legacy instruction", op);
        if op == Opcode::NativeCall_Old {
            return NATIVE_CALL_TO_GROWABLE_LIST_ARGC;
        }
        debug_assert!(op.is_legacy_call(), "{} is not a legacy call", op);
        a(call)
    }
}
