//! Kernel bytecode opcodes
//!
//! This module defines every opcode of the kernel bytecode ISA together with
//! its static schema: mnemonic, operand encoding form, era/kind and the role
//! of each operand. The list below is the single source of truth; the enum,
//! the schema table and the size table are all derived from it.
//!
//! Numbering is part of the binary format. Reserved (`Unused*`) slots keep
//! compact/wide pairs on even/odd positions and must stay where they are.

use std::fmt;

/// Operand encoding form of an instruction.
///
/// `AD` and `AX` only occur in the legacy era; `AE`, `AY` and `DF` only in
/// the ordinary era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    /// No operands
    None,
    /// Unsigned 8-bit operand
    A,
    /// Unsigned 8/32-bit operand
    D,
    /// Signed 8/32-bit operand
    X,
    /// Signed 8/24-bit jump target
    T,
    /// Unsigned 8-bit and unsigned 16-bit operand (legacy)
    AD,
    /// Unsigned 8-bit and signed 16-bit operand (legacy)
    AX,
    /// Unsigned 8-bit and unsigned 8/32-bit operand
    AE,
    /// Unsigned 8-bit and signed 8/32-bit operand
    AY,
    /// Unsigned 8/32-bit operand followed by an argument count byte
    DF,
    /// Three unsigned 8-bit operands
    ABC,
}

impl Form {
    /// Mnemonic used in listings and diagnostics
    pub const fn as_str(self) -> &'static str {
        match self {
            Form::None => "0",
            Form::A => "A",
            Form::D => "D",
            Form::X => "X",
            Form::T => "T",
            Form::AD => "A_D",
            Form::AX => "A_X",
            Form::AE => "A_E",
            Form::AY => "A_Y",
            Form::DF => "D_F",
            Form::ABC => "A_B_C",
        }
    }
}

/// Era and width class of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Fixed 4-byte legacy encoding
    Legacy,
    /// Compact variant of the ordinary encoding
    Ordinary,
    /// Wide variant of the ordinary encoding (opcode = compact + 1)
    Wide,
    /// Reserved slot, never produced or executed
    Reserved,
}

/// Meaning of an operand field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandRole {
    /// Operand is absent or unused
    Ignored,
    /// Immediate number
    Immediate,
    /// Index into the object pool
    Literal,
    /// Unsigned frame-relative slot
    Register,
    /// Signed frame-relative slot
    SignedRegister,
    /// Jump target relative to the current instruction
    Target,
}

/// Static schema of one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// Canonical mnemonic
    pub name: &'static str,
    /// Operand encoding form
    pub form: Form,
    /// Era / width class
    pub kind: Kind,
    /// Role of the first, second and third operand
    pub operands: [OperandRole; 3],
    /// Total instruction length in bytes
    pub size: u8,
}

/// Length of every legacy instruction.
pub const LEGACY_INSTRUCTION_SIZE: usize = 4;

/// Length of the longest instruction in any era.
pub const MAX_INSTRUCTION_SIZE: usize = 6;

impl OpcodeInfo {
    const fn new(name: &'static str, form: Form, kind: Kind, operands: [OperandRole; 3]) -> Self {
        Self {
            name,
            form,
            kind,
            operands,
            size: instruction_size(form, kind),
        }
    }
}

/// Byte length of an instruction with the given form and kind.
///
/// Reserved slots are sized as compact instructions of their form; the ones
/// inside the legacy block are resized by [`with_legacy_era_sizes`].
const fn instruction_size(form: Form, kind: Kind) -> u8 {
    match kind {
        Kind::Legacy => LEGACY_INSTRUCTION_SIZE as u8,
        Kind::Ordinary | Kind::Reserved => match form {
            Form::None => 1,
            Form::A | Form::D | Form::X | Form::T => 2,
            Form::AE | Form::AY | Form::DF => 3,
            Form::ABC => 4,
            // Legacy-only forms never appear outside the legacy block.
            Form::AD | Form::AX => 0,
        },
        Kind::Wide => match form {
            Form::D | Form::X => 5,
            Form::T => 4,
            Form::AE | Form::AY | Form::DF => 6,
            // No wide variant exists for these forms.
            Form::None | Form::A | Form::AD | Form::AX | Form::ABC => 0,
        },
    }
}

/// Every slot below [`Opcode::FIRST_ORDINARY`] is a 4-byte legacy
/// instruction, reserved ones included.
const fn with_legacy_era_sizes(
    mut infos: [OpcodeInfo; OPCODE_COUNT],
) -> [OpcodeInfo; OPCODE_COUNT] {
    let mut i = 0;
    while i < Opcode::FIRST_ORDINARY as usize {
        infos[i].size = LEGACY_INSTRUCTION_SIZE as u8;
        i += 1;
    }
    infos
}

macro_rules! operand_role {
    (___) => { OperandRole::Ignored };
    (num) => { OperandRole::Immediate };
    (lit) => { OperandRole::Literal };
    (reg) => { OperandRole::Register };
    (xeg) => { OperandRole::SignedRegister };
    (tgt) => { OperandRole::Target };
}

macro_rules! kernel_bytecodes {
    ($($name:ident: $form:ident, $kind:ident, $op1:tt, $op2:tt, $op3:tt;)+) => {
        /// Kernel bytecode opcode
        ///
        /// Discriminants follow declaration order and cover all 256 byte values.
        #[allow(non_camel_case_types)]
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Opcode {
            $($name,)+
        }

        /// Every opcode, indexed by its byte value
        pub const ALL_OPCODES: [Opcode; OPCODE_COUNT] = [$(Opcode::$name,)+];

        pub(crate) const OPCODE_INFO: [OpcodeInfo; OPCODE_COUNT] = with_legacy_era_sizes([
            $(OpcodeInfo::new(
                stringify!($name),
                Form::$form,
                Kind::$kind,
                [operand_role!($op1), operand_role!($op2), operand_role!($op3)],
            ),)+
        ]);
    };
}

/// Number of opcode slots, reserved ones included
pub const OPCODE_COUNT: usize = 256;

kernel_bytecodes! {
    Trap_Old:                            None, Legacy,   ___, ___, ___;
    Entry_Old:                           D,    Legacy,   num, ___, ___;
    EntryFixed_Old:                      AD,   Legacy,   num, num, ___;
    EntryOptional_Old:                   ABC,  Legacy,   num, num, num;
    LoadConstant_Old:                    AD,   Legacy,   reg, lit, ___;
    Frame_Old:                           D,    Legacy,   num, ___, ___;
    CheckFunctionTypeArgs_Old:           AD,   Legacy,   num, reg, ___;
    CheckStack_Old:                      A,    Legacy,   num, ___, ___;
    Allocate_Old:                        D,    Legacy,   lit, ___, ___;
    AllocateT_Old:                       None, Legacy,   ___, ___, ___;
    CreateArrayTOS_Old:                  None, Legacy,   ___, ___, ___;
    AllocateContext_Old:                 D,    Legacy,   num, ___, ___;
    CloneContext_Old:                    D,    Legacy,   num, ___, ___;
    LoadContextParent_Old:               None, Legacy,   ___, ___, ___;
    StoreContextParent_Old:              None, Legacy,   ___, ___, ___;
    LoadContextVar_Old:                  D,    Legacy,   num, ___, ___;
    StoreContextVar_Old:                 D,    Legacy,   num, ___, ___;
    PushConstant_Old:                    D,    Legacy,   lit, ___, ___;
    PushNull_Old:                        None, Legacy,   ___, ___, ___;
    PushTrue_Old:                        None, Legacy,   ___, ___, ___;
    PushFalse_Old:                       None, Legacy,   ___, ___, ___;
    PushInt_Old:                         X,    Legacy,   num, ___, ___;
    Drop1_Old:                           None, Legacy,   ___, ___, ___;
    Push_Old:                            X,    Legacy,   xeg, ___, ___;
    PopLocal_Old:                        X,    Legacy,   xeg, ___, ___;
    StoreLocal_Old:                      X,    Legacy,   xeg, ___, ___;
    LoadFieldTOS_Old:                    D,    Legacy,   lit, ___, ___;
    StoreFieldTOS_Old:                   D,    Legacy,   lit, ___, ___;
    StoreIndexedTOS_Old:                 None, Legacy,   ___, ___, ___;
    PushStatic_Old:                      D,    Legacy,   lit, ___, ___;
    StoreStaticTOS_Old:                  D,    Legacy,   lit, ___, ___;
    Jump_Old:                            T,    Legacy,   tgt, ___, ___;
    JumpIfNoAsserts_Old:                 T,    Legacy,   tgt, ___, ___;
    JumpIfNotZeroTypeArgs_Old:           T,    Legacy,   tgt, ___, ___;
    JumpIfEqStrict_Old:                  T,    Legacy,   tgt, ___, ___;
    JumpIfNeStrict_Old:                  T,    Legacy,   tgt, ___, ___;
    JumpIfTrue_Old:                      T,    Legacy,   tgt, ___, ___;
    JumpIfFalse_Old:                     T,    Legacy,   tgt, ___, ___;
    JumpIfNull_Old:                      T,    Legacy,   tgt, ___, ___;
    JumpIfNotNull_Old:                   T,    Legacy,   tgt, ___, ___;
    Unused00_Old:                        None, Reserved, num, num, ___;
    InterfaceCall_Old:                   AD,   Legacy,   num, num, ___;
    DynamicCall_Old:                     AD,   Legacy,   num, num, ___;
    NativeCall_Old:                      D,    Legacy,   lit, ___, ___;
    ReturnTOS_Old:                       None, Legacy,   ___, ___, ___;
    AssertAssignable_Old:                AD,   Legacy,   num, lit, ___;
    AssertBoolean_Old:                   A,    Legacy,   num, ___, ___;
    AssertSubtype_Old:                   None, Legacy,   ___, ___, ___;
    LoadTypeArgumentsField_Old:          D,    Legacy,   lit, ___, ___;
    InstantiateType_Old:                 D,    Legacy,   lit, ___, ___;
    InstantiateTypeArgumentsTOS_Old:     AD,   Legacy,   num, lit, ___;
    Throw_Old:                           A,    Legacy,   num, ___, ___;
    MoveSpecial_Old:                     AX,   Legacy,   num, xeg, ___;
    SetFrame_Old:                        A,    Legacy,   num, ___, num;
    BooleanNegateTOS_Old:                None, Legacy,   ___, ___, ___;
    EqualsNull_Old:                      None, Legacy,   ___, ___, ___;
    NegateInt_Old:                       None, Legacy,   ___, ___, ___;
    AddInt_Old:                          None, Legacy,   ___, ___, ___;
    SubInt_Old:                          None, Legacy,   ___, ___, ___;
    MulInt_Old:                          None, Legacy,   ___, ___, ___;
    TruncDivInt_Old:                     None, Legacy,   ___, ___, ___;
    ModInt_Old:                          None, Legacy,   ___, ___, ___;
    BitAndInt_Old:                       None, Legacy,   ___, ___, ___;
    BitOrInt_Old:                        None, Legacy,   ___, ___, ___;
    BitXorInt_Old:                       None, Legacy,   ___, ___, ___;
    ShlInt_Old:                          None, Legacy,   ___, ___, ___;
    ShrInt_Old:                          None, Legacy,   ___, ___, ___;
    CompareIntEq_Old:                    None, Legacy,   ___, ___, ___;
    CompareIntGt_Old:                    None, Legacy,   ___, ___, ___;
    CompareIntLt_Old:                    None, Legacy,   ___, ___, ___;
    CompareIntGe_Old:                    None, Legacy,   ___, ___, ___;
    CompareIntLe_Old:                    None, Legacy,   ___, ___, ___;
    DirectCall_Old:                      AD,   Legacy,   num, num, ___;
    AllocateClosure_Old:                 D,    Legacy,   lit, ___, ___;
    UncheckedInterfaceCall_Old:          AD,   Legacy,   num, num, ___;
    NegateDouble_Old:                    None, Legacy,   ___, ___, ___;
    AddDouble_Old:                       None, Legacy,   ___, ___, ___;
    SubDouble_Old:                       None, Legacy,   ___, ___, ___;
    MulDouble_Old:                       None, Legacy,   ___, ___, ___;
    DivDouble_Old:                       None, Legacy,   ___, ___, ___;
    CompareDoubleEq_Old:                 None, Legacy,   ___, ___, ___;
    CompareDoubleGt_Old:                 None, Legacy,   ___, ___, ___;
    CompareDoubleLt_Old:                 None, Legacy,   ___, ___, ___;
    CompareDoubleGe_Old:                 None, Legacy,   ___, ___, ___;
    CompareDoubleLe_Old:                 None, Legacy,   ___, ___, ___;
    Trap:                                None, Ordinary, ___, ___, ___;
    Entry:                               D,    Ordinary, num, ___, ___;
    Entry_Wide:                          D,    Wide,     num, ___, ___;
    EntryFixed:                          AE,   Ordinary, num, num, ___;
    EntryFixed_Wide:                     AE,   Wide,     num, num, ___;
    EntryOptional:                       ABC,  Ordinary, num, num, num;
    Unused00:                            None, Reserved, ___, ___, ___;
    LoadConstant:                        AE,   Ordinary, reg, lit, ___;
    LoadConstant_Wide:                   AE,   Wide,     reg, lit, ___;
    Frame:                               D,    Ordinary, num, ___, ___;
    Frame_Wide:                          D,    Wide,     num, ___, ___;
    CheckFunctionTypeArgs:               AE,   Ordinary, num, reg, ___;
    CheckFunctionTypeArgs_Wide:          AE,   Wide,     num, reg, ___;
    CheckStack:                          A,    Ordinary, num, ___, ___;
    Unused01:                            None, Reserved, ___, ___, ___;
    Unused02:                            None, Reserved, ___, ___, ___;
    Unused03:                            None, Reserved, ___, ___, ___;
    Allocate:                            D,    Ordinary, lit, ___, ___;
    Allocate_Wide:                       D,    Wide,     lit, ___, ___;
    AllocateT:                           None, Ordinary, ___, ___, ___;
    CreateArrayTOS:                      None, Ordinary, ___, ___, ___;
    AllocateClosure:                     D,    Ordinary, lit, ___, ___;
    AllocateClosure_Wide:                D,    Wide,     lit, ___, ___;
    AllocateContext:                     AE,   Ordinary, num, ___, ___;
    AllocateContext_Wide:                AE,   Wide,     num, ___, ___;
    CloneContext:                        AE,   Ordinary, num, ___, ___;
    CloneContext_Wide:                   AE,   Wide,     num, ___, ___;
    LoadContextParent:                   None, Ordinary, ___, ___, ___;
    StoreContextParent:                  None, Ordinary, ___, ___, ___;
    LoadContextVar:                      AE,   Ordinary, num, ___, ___;
    LoadContextVar_Wide:                 AE,   Wide,     num, ___, ___;
    Unused04:                            None, Reserved, ___, ___, ___;
    Unused05:                            None, Reserved, ___, ___, ___;
    StoreContextVar:                     AE,   Ordinary, num, ___, ___;
    StoreContextVar_Wide:                AE,   Wide,     num, ___, ___;
    PushConstant:                        D,    Ordinary, lit, ___, ___;
    PushConstant_Wide:                   D,    Wide,     lit, ___, ___;
    Unused06:                            None, Reserved, ___, ___, ___;
    Unused07:                            None, Reserved, ___, ___, ___;
    PushTrue:                            None, Ordinary, ___, ___, ___;
    PushFalse:                           None, Ordinary, ___, ___, ___;
    PushInt:                             X,    Ordinary, num, ___, ___;
    PushInt_Wide:                        X,    Wide,     num, ___, ___;
    Unused08:                            None, Reserved, ___, ___, ___;
    Unused09:                            None, Reserved, ___, ___, ___;
    Unused10:                            None, Reserved, ___, ___, ___;
    Unused11:                            None, Reserved, ___, ___, ___;
    PushNull:                            None, Ordinary, ___, ___, ___;
    Drop1:                               None, Ordinary, ___, ___, ___;
    Push:                                X,    Ordinary, xeg, ___, ___;
    Push_Wide:                           X,    Wide,     xeg, ___, ___;
    Unused12:                            None, Reserved, ___, ___, ___;
    Unused13:                            None, Reserved, ___, ___, ___;
    Unused14:                            None, Reserved, ___, ___, ___;
    Unused15:                            None, Reserved, ___, ___, ___;
    Unused16:                            None, Reserved, ___, ___, ___;
    Unused17:                            None, Reserved, ___, ___, ___;
    PopLocal:                            X,    Ordinary, xeg, ___, ___;
    PopLocal_Wide:                       X,    Wide,     xeg, ___, ___;
    Unused18:                            None, Reserved, ___, ___, ___;
    Unused19:                            None, Reserved, ___, ___, ___;
    StoreLocal:                          X,    Ordinary, xeg, ___, ___;
    StoreLocal_Wide:                     X,    Wide,     xeg, ___, ___;
    LoadFieldTOS:                        D,    Ordinary, lit, ___, ___;
    LoadFieldTOS_Wide:                   D,    Wide,     lit, ___, ___;
    StoreFieldTOS:                       D,    Ordinary, lit, ___, ___;
    StoreFieldTOS_Wide:                  D,    Wide,     lit, ___, ___;
    StoreIndexedTOS:                     None, Ordinary, ___, ___, ___;
    Unused20:                            None, Reserved, ___, ___, ___;
    PushStatic:                          D,    Ordinary, lit, ___, ___;
    PushStatic_Wide:                     D,    Wide,     lit, ___, ___;
    StoreStaticTOS:                      D,    Ordinary, lit, ___, ___;
    StoreStaticTOS_Wide:                 D,    Wide,     lit, ___, ___;
    Jump:                                T,    Ordinary, tgt, ___, ___;
    Jump_Wide:                           T,    Wide,     tgt, ___, ___;
    JumpIfNoAsserts:                     T,    Ordinary, tgt, ___, ___;
    JumpIfNoAsserts_Wide:                T,    Wide,     tgt, ___, ___;
    JumpIfNotZeroTypeArgs:               T,    Ordinary, tgt, ___, ___;
    JumpIfNotZeroTypeArgs_Wide:          T,    Wide,     tgt, ___, ___;
    JumpIfEqStrict:                      T,    Ordinary, tgt, ___, ___;
    JumpIfEqStrict_Wide:                 T,    Wide,     tgt, ___, ___;
    JumpIfNeStrict:                      T,    Ordinary, tgt, ___, ___;
    JumpIfNeStrict_Wide:                 T,    Wide,     tgt, ___, ___;
    JumpIfTrue:                          T,    Ordinary, tgt, ___, ___;
    JumpIfTrue_Wide:                     T,    Wide,     tgt, ___, ___;
    JumpIfFalse:                         T,    Ordinary, tgt, ___, ___;
    JumpIfFalse_Wide:                    T,    Wide,     tgt, ___, ___;
    JumpIfNull:                          T,    Ordinary, tgt, ___, ___;
    JumpIfNull_Wide:                     T,    Wide,     tgt, ___, ___;
    JumpIfNotNull:                       T,    Ordinary, tgt, ___, ___;
    JumpIfNotNull_Wide:                  T,    Wide,     tgt, ___, ___;
    DirectCall:                          DF,   Ordinary, num, num, ___;
    DirectCall_Wide:                     DF,   Wide,     num, num, ___;
    Unused21:                            None, Reserved, ___, ___, ___;
    Unused22:                            None, Reserved, ___, ___, ___;
    InterfaceCall:                       DF,   Ordinary, num, num, ___;
    InterfaceCall_Wide:                  DF,   Wide,     num, num, ___;
    Unused23:                            None, Reserved, ___, ___, ___;
    Unused24:                            None, Reserved, ___, ___, ___;
    Unused25:                            None, Reserved, ___, ___, ___;
    Unused26:                            None, Reserved, ___, ___, ___;
    Unused27:                            None, Reserved, ___, ___, ___;
    Unused28:                            None, Reserved, ___, ___, ___;
    UncheckedInterfaceCall:              DF,   Ordinary, num, num, ___;
    UncheckedInterfaceCall_Wide:         DF,   Wide,     num, num, ___;
    DynamicCall:                         DF,   Ordinary, num, num, ___;
    DynamicCall_Wide:                    DF,   Wide,     num, num, ___;
    NativeCall:                          D,    Ordinary, lit, ___, ___;
    NativeCall_Wide:                     D,    Wide,     lit, ___, ___;
    ReturnTOS:                           None, Ordinary, ___, ___, ___;
    Unused29:                            None, Reserved, ___, ___, ___;
    AssertAssignable:                    AE,   Ordinary, num, lit, ___;
    AssertAssignable_Wide:               AE,   Wide,     num, lit, ___;
    Unused30:                            None, Reserved, ___, ___, ___;
    Unused31:                            None, Reserved, ___, ___, ___;
    AssertBoolean:                       A,    Ordinary, num, ___, ___;
    AssertSubtype:                       None, Ordinary, ___, ___, ___;
    LoadTypeArgumentsField:              D,    Ordinary, lit, ___, ___;
    LoadTypeArgumentsField_Wide:         D,    Wide,     lit, ___, ___;
    InstantiateType:                     D,    Ordinary, lit, ___, ___;
    InstantiateType_Wide:                D,    Wide,     lit, ___, ___;
    InstantiateTypeArgumentsTOS:         AE,   Ordinary, num, lit, ___;
    InstantiateTypeArgumentsTOS_Wide:    AE,   Wide,     num, lit, ___;
    Unused32:                            None, Reserved, ___, ___, ___;
    Unused33:                            None, Reserved, ___, ___, ___;
    Unused34:                            None, Reserved, ___, ___, ___;
    Unused35:                            None, Reserved, ___, ___, ___;
    Throw:                               A,    Ordinary, num, ___, ___;
    SetFrame:                            A,    Ordinary, num, ___, num;
    MoveSpecial:                         AY,   Ordinary, num, xeg, ___;
    MoveSpecial_Wide:                    AY,   Wide,     num, xeg, ___;
    BooleanNegateTOS:                    None, Ordinary, ___, ___, ___;
    EqualsNull:                          None, Ordinary, ___, ___, ___;
    Unused36:                            None, Reserved, ___, ___, ___;
    Unused37:                            None, Reserved, ___, ___, ___;
    NegateInt:                           None, Ordinary, ___, ___, ___;
    AddInt:                              None, Ordinary, ___, ___, ___;
    SubInt:                              None, Ordinary, ___, ___, ___;
    MulInt:                              None, Ordinary, ___, ___, ___;
    TruncDivInt:                         None, Ordinary, ___, ___, ___;
    ModInt:                              None, Ordinary, ___, ___, ___;
    BitAndInt:                           None, Ordinary, ___, ___, ___;
    BitOrInt:                            None, Ordinary, ___, ___, ___;
    BitXorInt:                           None, Ordinary, ___, ___, ___;
    ShlInt:                              None, Ordinary, ___, ___, ___;
    ShrInt:                              None, Ordinary, ___, ___, ___;
    CompareIntEq:                        None, Ordinary, ___, ___, ___;
    CompareIntGt:                        None, Ordinary, ___, ___, ___;
    CompareIntLt:                        None, Ordinary, ___, ___, ___;
    CompareIntGe:                        None, Ordinary, ___, ___, ___;
    CompareIntLe:                        None, Ordinary, ___, ___, ___;
    NegateDouble:                        None, Ordinary, ___, ___, ___;
    AddDouble:                           None, Ordinary, ___, ___, ___;
    SubDouble:                           None, Ordinary, ___, ___, ___;
    MulDouble:                           None, Ordinary, ___, ___, ___;
    DivDouble:                           None, Ordinary, ___, ___, ___;
    CompareDoubleEq:                     None, Ordinary, ___, ___, ___;
    CompareDoubleGt:                     None, Ordinary, ___, ___, ___;
    CompareDoubleLt:                     None, Ordinary, ___, ___, ___;
    CompareDoubleGe:                     None, Ordinary, ___, ___, ___;
    CompareDoubleLe:                     None, Ordinary, ___, ___, ___;
    VMInternal_ImplicitGetter:           None, Ordinary, ___, ___, ___;
    VMInternal_ImplicitSetter:           None, Ordinary, ___, ___, ___;
    VMInternal_ImplicitStaticGetter:     None, Ordinary, ___, ___, ___;
    VMInternal_MethodExtractor:          None, Ordinary, ___, ___, ___;
    VMInternal_InvokeClosure:            None, Ordinary, ___, ___, ___;
    VMInternal_InvokeField:              None, Ordinary, ___, ___, ___;
    VMInternal_ForwardDynamicInvocation: None, Ordinary, ___, ___, ___;
    VMInternal_NoSuchMethodDispatcher:   None, Ordinary, ___, ___, ___;
    VMInternal_ImplicitStaticClosure:    None, Ordinary, ___, ___, ___;
    VMInternal_ImplicitInstanceClosure:  None, Ordinary, ___, ___, ___;
}

/// Schema table, indexed by opcode byte
pub static OPCODE_TABLE: [OpcodeInfo; OPCODE_COUNT] = OPCODE_INFO;

impl Opcode {
    /// First opcode of the ordinary era; everything below is legacy
    pub const FIRST_ORDINARY: Opcode = Opcode::Trap;

    /// First opcode that is only synthesized inside the VM
    pub const FIRST_VM_INTERNAL: Opcode = Opcode::VMInternal_ImplicitGetter;

    /// Convert a byte to its opcode. Every byte value names a slot.
    #[inline(always)]
    pub const fn from_byte(byte: u8) -> Self {
        ALL_OPCODES[byte as usize]
    }

    /// Convert opcode to byte
    #[inline(always)]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Static schema of this opcode
    #[inline(always)]
    pub fn info(self) -> &'static OpcodeInfo {
        &OPCODE_TABLE[self as usize]
    }

    /// Canonical mnemonic, unique and non-empty
    #[inline]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Operand encoding form
    #[inline]
    pub fn form(self) -> Form {
        self.info().form
    }

    /// Era / width class
    #[inline]
    pub fn kind(self) -> Kind {
        self.info().kind
    }

    /// Roles of the three operand positions
    #[inline]
    pub fn operand_roles(self) -> [OperandRole; 3] {
        self.info().operands
    }

    /// Whether this slot is reserved
    #[inline]
    pub fn is_reserved(self) -> bool {
        self.kind() == Kind::Reserved
    }

    /// Whether this opcode belongs to the legacy block (reserved legacy slots included)
    #[inline(always)]
    pub const fn is_legacy_era(self) -> bool {
        (self as u8) < Self::FIRST_ORDINARY as u8
    }

    /// Whether this opcode is only synthesized by the VM itself
    #[inline]
    pub const fn is_vm_internal(self) -> bool {
        (self as u8) >= Self::FIRST_VM_INTERNAL as u8
    }

    /// Wide counterpart of a compact opcode, if it has one
    pub fn wide_variant(self) -> Option<Opcode> {
        if self.kind() != Kind::Ordinary || self as u8 == u8::MAX {
            return None;
        }
        let next = Opcode::from_byte(self as u8 + 1);
        (next.kind() == Kind::Wide).then_some(next)
    }

    /// Compact counterpart of a wide opcode
    pub fn compact_variant(self) -> Option<Opcode> {
        if self.kind() != Kind::Wide {
            return None;
        }
        Some(Opcode::from_byte(self as u8 - 1))
    }

    /// Look up an opcode by mnemonic
    pub fn from_name(name: &str) -> Option<Opcode> {
        OPCODE_TABLE
            .iter()
            .position(|info| info.name == name)
            .map(|index| Opcode::from_byte(index as u8))
    }
}

impl From<u8> for Opcode {
    fn from(byte: u8) -> Self {
        Opcode::from_byte(byte)
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> Self {
        op.to_byte()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Two VM-reserved temporaries addressed by `MoveSpecial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SpecialIndex {
    /// Exception object
    Exception = 0,
    /// Stack trace object
    StackTrace = 1,
}

impl SpecialIndex {
    /// Number of special indices
    pub const COUNT: usize = 2;

    /// Interpret the A operand of `MoveSpecial`
    pub const fn from_operand(a: u8) -> Option<Self> {
        match a {
            0 => Some(SpecialIndex::Exception),
            1 => Some(SpecialIndex::StackTrace),
            _ => None,
        }
    }
}
