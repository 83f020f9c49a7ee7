//! Instruction classification
//!
//! Fixed-membership predicates over the opcode set. Tools that need to reason
//! about categories of instructions (stack walker, debugger, deoptimizer)
//! must use these rather than listing opcodes themselves.

use super::opcodes::Opcode;

/// Every jump opcode: nine mnemonics in legacy, compact and wide variants
pub const JUMP_OPCODES: [Opcode; 27] = [
    Opcode::Jump_Old,
    Opcode::JumpIfNoAsserts_Old,
    Opcode::JumpIfNotZeroTypeArgs_Old,
    Opcode::JumpIfEqStrict_Old,
    Opcode::JumpIfNeStrict_Old,
    Opcode::JumpIfTrue_Old,
    Opcode::JumpIfFalse_Old,
    Opcode::JumpIfNull_Old,
    Opcode::JumpIfNotNull_Old,
    Opcode::Jump,
    Opcode::Jump_Wide,
    Opcode::JumpIfNoAsserts,
    Opcode::JumpIfNoAsserts_Wide,
    Opcode::JumpIfNotZeroTypeArgs,
    Opcode::JumpIfNotZeroTypeArgs_Wide,
    Opcode::JumpIfEqStrict,
    Opcode::JumpIfEqStrict_Wide,
    Opcode::JumpIfNeStrict,
    Opcode::JumpIfNeStrict_Wide,
    Opcode::JumpIfTrue,
    Opcode::JumpIfTrue_Wide,
    Opcode::JumpIfFalse,
    Opcode::JumpIfFalse_Wide,
    Opcode::JumpIfNull,
    Opcode::JumpIfNull_Wide,
    Opcode::JumpIfNotNull,
    Opcode::JumpIfNotNull_Wide,
];

impl Opcode {
    /// Check if this opcode is a conditional or unconditional jump
    #[inline]
    pub const fn is_jump(self) -> bool {
        matches!(
            self,
            Self::Jump_Old
                | Self::JumpIfNoAsserts_Old
                | Self::JumpIfNotZeroTypeArgs_Old
                | Self::JumpIfEqStrict_Old
                | Self::JumpIfNeStrict_Old
                | Self::JumpIfTrue_Old
                | Self::JumpIfFalse_Old
                | Self::JumpIfNull_Old
                | Self::JumpIfNotNull_Old
                | Self::Jump
                | Self::Jump_Wide
                | Self::JumpIfNoAsserts
                | Self::JumpIfNoAsserts_Wide
                | Self::JumpIfNotZeroTypeArgs
                | Self::JumpIfNotZeroTypeArgs_Wide
                | Self::JumpIfEqStrict
                | Self::JumpIfEqStrict_Wide
                | Self::JumpIfNeStrict
                | Self::JumpIfNeStrict_Wide
                | Self::JumpIfTrue
                | Self::JumpIfTrue_Wide
                | Self::JumpIfFalse
                | Self::JumpIfFalse_Wide
                | Self::JumpIfNull
                | Self::JumpIfNull_Wide
                | Self::JumpIfNotNull
                | Self::JumpIfNotNull_Wide
        )
    }

    /// Check if this opcode is `LoadConstant` in any variant
    #[inline]
    pub const fn is_load_constant(self) -> bool {
        matches!(
            self,
            Self::LoadConstant | Self::LoadConstant_Wide | Self::LoadConstant_Old
        )
    }

    /// Check if this opcode is a stack overflow check
    #[inline]
    pub const fn is_check_stack(self) -> bool {
        matches!(self, Self::CheckStack | Self::CheckStack_Old)
    }

    /// Check if this opcode is the prologue of a function with optional arguments
    #[inline]
    pub const fn is_entry_optional(self) -> bool {
        matches!(self, Self::EntryOptional | Self::EntryOptional_Old)
    }

    /// Check if this opcode reserves local slots (`Frame`)
    #[inline]
    pub const fn is_frame(self) -> bool {
        matches!(self, Self::Frame | Self::Frame_Wide | Self::Frame_Old)
    }

    /// Check if this opcode resets the stack pointer to a frame size
    #[inline]
    pub const fn is_set_frame(self) -> bool {
        matches!(self, Self::SetFrame | Self::SetFrame_Old)
    }

    /// Check if this opcode is a legacy call with argc in its A operand
    #[inline]
    pub const fn is_legacy_call(self) -> bool {
        matches!(
            self,
            Self::DirectCall_Old
                | Self::InterfaceCall_Old
                | Self::UncheckedInterfaceCall_Old
                | Self::DynamicCall_Old
        )
    }

    /// Check if this opcode is an ordinary call (`D_F` form, argc in the last byte)
    #[inline]
    pub const fn is_ordinary_call(self) -> bool {
        matches!(
            self,
            Self::DirectCall
                | Self::DirectCall_Wide
                | Self::InterfaceCall
                | Self::InterfaceCall_Wide
                | Self::UncheckedInterfaceCall
                | Self::UncheckedInterfaceCall_Wide
                | Self::DynamicCall
                | Self::DynamicCall_Wide
        )
    }

    /// Check if this opcode is a bytecode call in either era
    #[inline]
    pub const fn is_call(self) -> bool {
        self.is_legacy_call() || self.is_ordinary_call()
    }

    /// Check if this opcode calls a native function
    #[inline]
    pub const fn is_native_call(self) -> bool {
        matches!(
            self,
            Self::NativeCall | Self::NativeCall_Wide | Self::NativeCall_Old
        )
    }

    /// Check if the interpreter performs a debugger break check at this opcode.
    ///
    /// The interpreter and this predicate must agree.
    #[inline]
    pub const fn is_debug_break_checked(self) -> bool {
        matches!(
            self,
            Self::CheckStack
                | Self::DirectCall
                | Self::InterfaceCall
                | Self::UncheckedInterfaceCall
                | Self::DynamicCall
                | Self::ReturnTOS
        )
    }
}
