//! PC / offset conversion
//!
//! Side tables (PC descriptors, source positions) are keyed by code offset.
//! Return addresses point one byte past the call, so lookups made with a
//! return address use `pc + 1`. These two helpers must be used on both the
//! producing and the consuming side; the correction is part of the format.

/// Convert a bytecode PC into a side-table offset
#[inline(always)]
pub const fn bytecode_pc_to_offset(pc: u32, is_return_address: bool) -> i64 {
    pc as i64 + is_return_address as i64
}

/// Convert a side-table offset back into a bytecode PC
#[inline(always)]
pub const fn offset_to_bytecode_pc(offset: i64, is_return_address: bool) -> u32 {
    (offset - is_return_address as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_address_correction() {
        assert_eq!(bytecode_pc_to_offset(10, false), 10);
        assert_eq!(bytecode_pc_to_offset(10, true), 11);
        assert_eq!(offset_to_bytecode_pc(11, true), 10);
        assert_eq!(offset_to_bytecode_pc(11, false), 11);
    }

    #[test]
    fn test_conversions_are_inverse() {
        for pc in [0u32, 1, 7, 0xffff, 0x7fff_fff0, 0x8000_0000, u32::MAX] {
            for is_return_address in [false, true] {
                let offset = bytecode_pc_to_offset(pc, is_return_address);
                assert_eq!(offset_to_bytecode_pc(offset, is_return_address), pc);
            }
        }
    }

    #[test]
    fn test_high_pcs_stay_positive() {
        assert_eq!(bytecode_pc_to_offset(u32::MAX, true), 1 << 32);
        assert_eq!(bytecode_pc_to_offset(0x8000_0000, false), 0x8000_0000);
    }
}
