//! Unchecked accessors for the interpreter fast path
//!
//! These functions take a raw pointer to the opcode byte of an instruction in
//! a stream that was verified when it was loaded. They perform no validation,
//! no allocation and no bounds checks. Diagnostic and untrusted callers should
//! use [`crate::bytecode::chunk::BytecodeChunk`] instead.
//!
//! # Safety
//!
//! Unless stated otherwise, every function requires that `bc` points at the
//! first byte of a well-formed instruction and that all bytes of the requested
//! field (as laid out for the instruction's opcode) are readable.

use super::decode::{fields, ByteSource, Layout};
use super::opcodes::{Opcode, LEGACY_INSTRUCTION_SIZE};
use super::sizes::size_of_byte;

#[derive(Clone, Copy)]
struct Ptr(*const u8);

impl ByteSource for Ptr {
    #[inline(always)]
    fn byte(self, index: usize) -> u8 {
        // SAFETY: `Ptr` is only built inside the unsafe functions below, whose
        // callers guarantee the field being read lies within the instruction.
        unsafe { *self.0.add(index) }
    }
}

/// Opcode of the instruction at `bc`.
///
/// # Safety
/// `bc` must be readable.
#[inline(always)]
pub unsafe fn decode_opcode(bc: *const u8) -> Opcode {
    Opcode::from_byte(*bc)
}

/// Physical layout of the instruction at `bc`.
///
/// # Safety
/// `bc` must be readable.
#[inline(always)]
pub unsafe fn decode_layout(bc: *const u8) -> Layout {
    Layout::of(*bc)
}

/// # Safety
/// See the module documentation.
#[inline(always)]
pub unsafe fn decode_a(bc: *const u8) -> u8 {
    fields::a(Ptr(bc))
}

/// # Safety
/// See the module documentation.
#[inline(always)]
pub unsafe fn decode_b(bc: *const u8) -> u8 {
    fields::b(Ptr(bc))
}

/// # Safety
/// See the module documentation.
#[inline(always)]
pub unsafe fn decode_c(bc: *const u8) -> u8 {
    fields::c(Ptr(bc))
}

/// # Safety
/// See the module documentation.
#[inline(always)]
pub unsafe fn decode_d(bc: *const u8) -> u32 {
    fields::d(Ptr(bc))
}

/// # Safety
/// See the module documentation.
#[inline(always)]
pub unsafe fn decode_x(bc: *const u8) -> i32 {
    fields::x(Ptr(bc))
}

/// # Safety
/// See the module documentation.
#[inline(always)]
pub unsafe fn decode_t(bc: *const u8) -> i32 {
    fields::t(Ptr(bc))
}

/// # Safety
/// See the module documentation.
#[inline(always)]
pub unsafe fn decode_e(bc: *const u8) -> u32 {
    fields::e(Ptr(bc))
}

/// # Safety
/// See the module documentation.
#[inline(always)]
pub unsafe fn decode_y(bc: *const u8) -> i32 {
    fields::y(Ptr(bc))
}

/// # Safety
/// See the module documentation.
#[inline(always)]
pub unsafe fn decode_f(bc: *const u8) -> u8 {
    fields::f(Ptr(bc))
}

/// Address of the instruction following `bc`.
///
/// # Safety
/// `bc` must point at an instruction of a verified stream; the result is at
/// most one past the end of that stream.
#[inline(always)]
pub unsafe fn next(bc: *const u8) -> *const u8 {
    bc.add(size_of_byte(*bc))
}

/// Argument count of the ordinary-era call that returns to `ret_addr`.
///
/// Every ordinary call uses the `D_F` form, so the count is the last byte of
/// the call in both widths.
///
/// # Safety
/// `ret_addr` must be the return address of an ordinary call instruction.
#[inline(always)]
pub unsafe fn decode_argc(ret_addr: *const u8) -> u8 {
    *ret_addr.sub(1)
}

/// Argument count of the legacy call that returns to `ret_addr`.
///
/// The native call to the growable list constructor reports
/// [`crate::bytecode::decode::NATIVE_CALL_TO_GROWABLE_LIST_ARGC`].
/// Debug builds assert that the preceding instruction is a legacy call.
///
/// # Safety
/// `ret_addr` must be the return address of a legacy call instruction.
#[inline(always)]
pub unsafe fn decode_argc_legacy(ret_addr: *const u8) -> u8 {
    fields::argc_legacy(Ptr(ret_addr.sub(LEGACY_INSTRUCTION_SIZE)))
}

/// Instruction pointer into a verified bytecode stream.
///
/// Construction is the only unsafe step; the accessors trust the caller's
/// promise and compile down to the same code as the free functions above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInstr(*const u8);

impl RawInstr {
    /// # Safety
    /// `bc` must point at an instruction of a verified stream and stay valid
    /// for as long as this value or any value derived from it is used.
    #[inline(always)]
    pub unsafe fn new(bc: *const u8) -> Self {
        Self(bc)
    }

    #[inline(always)]
    pub fn as_ptr(self) -> *const u8 {
        self.0
    }

    #[inline(always)]
    pub fn opcode(self) -> Opcode {
        fields::opcode(Ptr(self.0))
    }

    #[inline(always)]
    pub fn layout(self) -> Layout {
        fields::layout(Ptr(self.0))
    }

    #[inline(always)]
    pub fn a(self) -> u8 {
        fields::a(Ptr(self.0))
    }

    #[inline(always)]
    pub fn b(self) -> u8 {
        fields::b(Ptr(self.0))
    }

    #[inline(always)]
    pub fn c(self) -> u8 {
        fields::c(Ptr(self.0))
    }

    #[inline(always)]
    pub fn d(self) -> u32 {
        fields::d(Ptr(self.0))
    }

    #[inline(always)]
    pub fn x(self) -> i32 {
        fields::x(Ptr(self.0))
    }

    #[inline(always)]
    pub fn t(self) -> i32 {
        fields::t(Ptr(self.0))
    }

    #[inline(always)]
    pub fn e(self) -> u32 {
        fields::e(Ptr(self.0))
    }

    #[inline(always)]
    pub fn y(self) -> i32 {
        fields::y(Ptr(self.0))
    }

    #[inline(always)]
    pub fn f(self) -> u8 {
        fields::f(Ptr(self.0))
    }

    /// The following instruction.
    ///
    /// At the end of the stream the result points one past the last byte and
    /// must not be read.
    #[inline(always)]
    pub fn next(self) -> RawInstr {
        // SAFETY: the constructor's contract covers the whole instruction,
        // and the size table never steps past its end.
        RawInstr(unsafe { next(self.0) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_walk_matches_sizes() {
        let code = [
            &[Opcode::Entry as u8, 2][..],
            &[Opcode::PushInt_Wide as u8, 0x00, 0x00, 0x01, 0x00],
            &[Opcode::Jump_Wide as u8, 0x00, 0x01, 0x00],
            &[Opcode::ReturnTOS as u8],
        ]
        .concat();
        unsafe {
            let start = code.as_ptr();
            let second = next(start);
            assert_eq!(second.offset_from(start), 2);
            assert_eq!(decode_x(second), 0x1_0000);
            let third = next(second);
            assert_eq!(third.offset_from(start), 7);
            assert_eq!(decode_t(third), 0x100);
            let fourth = next(third);
            assert_eq!(decode_opcode(fourth), Opcode::ReturnTOS);
            assert_eq!(next(fourth).offset_from(start), code.len() as isize);
        }
    }

    #[test]
    fn test_raw_instr_walk() {
        let code = [
            &[Opcode::LoadConstant_Wide as u8, 2, 0x00, 0x00, 0x01, 0x00][..],
            &[Opcode::MoveSpecial as u8, 1, 0xfe],
            &[Opcode::ReturnTOS as u8],
        ]
        .concat();
        let first = unsafe { RawInstr::new(code.as_ptr()) };
        assert_eq!(first.layout(), Layout::Wide);
        assert_eq!((first.a(), first.e()), (2, 0x1_0000));
        let second = first.next();
        assert_eq!(second.opcode(), Opcode::MoveSpecial);
        assert_eq!(second.y(), -2);
        let third = second.next();
        assert_eq!(third.opcode(), Opcode::ReturnTOS);
        assert_eq!(unsafe { third.as_ptr().offset_from(code.as_ptr()) }, 9);
    }

    #[test]
    fn test_raw_argc() {
        let compact = [Opcode::DirectCall as u8, 4, 3, Opcode::ReturnTOS as u8];
        let wide = [
            &[Opcode::DynamicCall_Wide as u8, 0, 1, 0, 0, 9][..],
            &[Opcode::ReturnTOS as u8],
        ]
        .concat();
        let legacy = [
            &[Opcode::InterfaceCall_Old as u8, 5, 0x01, 0x00][..],
            &[Opcode::ReturnTOS_Old as u8, 0, 0, 0],
        ]
        .concat();
        unsafe {
            assert_eq!(decode_argc(compact.as_ptr().add(3)), 3);
            assert_eq!(decode_argc(wide.as_ptr().add(6)), 9);
            assert_eq!(decode_argc_legacy(legacy.as_ptr().add(4)), 5);
            assert_eq!(
                decode_f(compact.as_ptr()),
                decode_argc(compact.as_ptr().add(3))
            );
            assert_eq!(decode_f(wide.as_ptr()), decode_argc(wide.as_ptr().add(6)));
        }
    }
}
