//! Code sequences synthesized by the VM itself
//!
//! VM-internal opcodes never appear in loaded containers. The VM builds
//! functions whose entire body is the internal opcode followed by a return.

use super::opcodes::Opcode;

macro_rules! vm_internal_sequences {
    ($($name:ident => $op:ident;)+) => {
        $(static $name: [u8; 2] = [Opcode::$op as u8, Opcode::ReturnTOS as u8];)+

        /// Body of the function implementing a VM-internal opcode
        pub fn vm_internal_instructions(opcode: Opcode) -> Option<&'static [u8]> {
            match opcode {
                $(Opcode::$op => Some(&$name),)+
                _ => None,
            }
        }
    };
}

vm_internal_sequences! {
    IMPLICIT_GETTER => VMInternal_ImplicitGetter;
    IMPLICIT_SETTER => VMInternal_ImplicitSetter;
    IMPLICIT_STATIC_GETTER => VMInternal_ImplicitStaticGetter;
    METHOD_EXTRACTOR => VMInternal_MethodExtractor;
    INVOKE_CLOSURE => VMInternal_InvokeClosure;
    INVOKE_FIELD => VMInternal_InvokeField;
    FORWARD_DYNAMIC_INVOCATION => VMInternal_ForwardDynamicInvocation;
    NO_SUCH_METHOD_DISPATCHER => VMInternal_NoSuchMethodDispatcher;
    IMPLICIT_STATIC_CLOSURE => VMInternal_ImplicitStaticClosure;
    IMPLICIT_INSTANCE_CLOSURE => VMInternal_ImplicitInstanceClosure;
}

/// Argument count encoded in the trampoline's call
const TRAMPOLINE_ARGC: u8 = 2;

static GROWABLE_LIST_TRAMPOLINE: [u8; 4] = [
    Opcode::DirectCall as u8,
    0,
    TRAMPOLINE_ARGC,
    Opcode::ReturnTOS as u8,
];

/// Offset of the fake return address inside the trampoline
pub const GROWABLE_LIST_TRAMPOLINE_RETURN_OFFSET: usize = 3;

/// Return trampoline for the native call that redirects the growable list
/// constructor to bytecode.
///
/// The frame's return address is set to offset
/// [`GROWABLE_LIST_TRAMPOLINE_RETURN_OFFSET`], so argc recovery sees a
/// 2-argument `DirectCall` and execution continues at `ReturnTOS`.
pub fn native_call_to_growable_list_return_trampoline() -> &'static [u8] {
    &GROWABLE_LIST_TRAMPOLINE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::chunk::BytecodeChunk;
    use crate::bytecode::decode::NATIVE_CALL_TO_GROWABLE_LIST_ARGC;
    use crate::bytecode::opcodes::ALL_OPCODES;

    #[test]
    fn test_every_internal_opcode_has_a_body() {
        for op in ALL_OPCODES {
            match vm_internal_instructions(op) {
                Some(body) => {
                    assert!(op.is_vm_internal());
                    assert_eq!(body, &[op as u8, Opcode::ReturnTOS as u8]);
                }
                None => assert!(!op.is_vm_internal(), "{} has no body", op),
            }
        }
    }

    #[test]
    fn test_trampoline() {
        let code = native_call_to_growable_list_return_trampoline();
        let chunk = BytecodeChunk::new(code);
        let call = chunk.instruction_at(0).unwrap();
        assert!(call.opcode().is_ordinary_call());
        assert_eq!(call.next_offset(), GROWABLE_LIST_TRAMPOLINE_RETURN_OFFSET);
        assert_eq!(
            chunk.decode_argc(GROWABLE_LIST_TRAMPOLINE_RETURN_OFFSET),
            Ok(NATIVE_CALL_TO_GROWABLE_LIST_ARGC)
        );
        assert_eq!(
            chunk.read_opcode(GROWABLE_LIST_TRAMPOLINE_RETURN_OFFSET),
            Some(Opcode::ReturnTOS)
        );
    }
}
