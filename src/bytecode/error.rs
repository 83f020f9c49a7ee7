//! Error types for checked decoding and container loading.

use super::opcodes::Opcode;

/// Result of checked decoding
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors reported by the checked bytecode view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Offset is not inside the bytecode
    OffsetOutOfBounds { offset: usize, len: usize },
    /// Byte names a reserved opcode slot
    ReservedOpcode { offset: usize, opcode: Opcode },
    /// Instruction runs past the end of the bytecode
    Truncated {
        offset: usize,
        opcode: Opcode,
        needed: usize,
        available: usize,
    },
    /// Instruction before a return address is not a call
    NotACall { offset: usize, opcode: Opcode },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OffsetOutOfBounds { offset, len } => {
                write!(
                    f,
                    "Offset {:#x} out of bounds (bytecode length {:#x})",
                    offset, len
                )
            }
            Self::ReservedOpcode { offset, opcode } => {
                write!(
                    f,
                    "Reserved opcode {} (0x{:02x}) at {:#x}",
                    opcode, *opcode as u8, offset
                )
            }
            Self::Truncated {
                offset,
                opcode,
                needed,
                available,
            } => write!(
                f,
                "Truncated {} at {:#x}: needs {} bytes, {} available",
                opcode, offset, needed, available
            ),
            Self::NotACall { offset, opcode } => {
                write!(f, "Expected a call at {:#x}, found {}", offset, opcode)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Reasons a bytecode container is rejected at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Fewer bytes than a header
    TruncatedHeader { len: usize },
    /// Magic value does not identify a bytecode container
    BadMagic { found: u32 },
    /// Format version outside the supported range
    UnsupportedVersion { version: u32, min: u32, max: u32 },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TruncatedHeader { len } => {
                write!(f, "Truncated container header: {} bytes", len)
            }
            Self::BadMagic { found } => write!(f, "Bad bytecode magic: 0x{:08x}", found),
            Self::UnsupportedVersion { version, min, max } => write!(
                f,
                "Unsupported bytecode format version {} (supported: {}..={})",
                version, min, max
            ),
        }
    }
}

impl std::error::Error for LoadError {}

/// Result of bytecode emission
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Operands the builder cannot encode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Legacy opcodes only have the fixed 4-byte encoding
    LegacyOpcode { opcode: Opcode },
    /// Operand needs the wide layout but the opcode has no wide variant
    NoWideVariant { opcode: Opcode },
    /// Jump distance does not fit the target field
    TargetOutOfRange { opcode: Opcode, distance: i64 },
    /// Legacy jump distance is not a multiple of the instruction size
    MisalignedTarget { opcode: Opcode, distance: i64 },
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LegacyOpcode { opcode } => {
                write!(f, "{} is a legacy opcode, use the legacy emitters", opcode)
            }
            Self::NoWideVariant { opcode } => write!(f, "{} has no wide variant", opcode),
            Self::TargetOutOfRange { opcode, distance } => {
                write!(f, "Jump distance {} out of range for {}", distance, opcode)
            }
            Self::MisalignedTarget { opcode, distance } => {
                write!(
                    f,
                    "Jump distance {} is not 4-byte aligned for {}",
                    distance, opcode
                )
            }
        }
    }
}

impl std::error::Error for EncodeError {}
