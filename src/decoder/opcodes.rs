//! Opcode map of the 8xC196 (including the NT/EA extended-addressing opcodes)

use crate::{Mnemonic, Width};

/// Operand layout that fixes the encoding and length of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// Opcode only
    Implied,
    /// SKIP: opcode plus one ignored byte
    Skip,
    /// `op reg`
    Unary(Width),
    /// `op aop reg`, direct only
    ExchangeDirect(Width),
    /// `op idx disp.. reg`
    ExchangeIndexed(Width),
    /// `op count reg`; counts above 15 name a byte register
    Shift(Width),
    /// `op breg lreg`
    Normalize,
    /// `op treg wreg` or `op treg d0 d1 d2 wreg`
    Extended { width: Width, store: bool, indexed: bool },
    /// 11-bit displacement folded into the opcode
    ShortRelative,
    /// `op breg disp8`, bit number in the opcode
    BitRelative,
    /// `op disp8`
    CondRelative,
    /// `op reg disp8`
    DecrementRelative(Width),
    /// `op disp16`
    LongRelative,
    /// `op disp24`
    ExtendedRelative,
    /// `op aop src1 dest`
    ThreeOp { src: Width, dest: Width },
    /// `op aop dest`
    TwoOp { src: Width, dest: Width },
    /// `op aop reg`, immediate not allowed
    Store(Width),
    Push,
    Pop,
    /// `op reg reg` (block moves, CMPL)
    RegisterPair { first: Width, second: Width },
    /// `op [index] #mask tbase`
    TableJump,
    /// `op [reg]`; the pointer lsb selects BR or EBR
    IndirectBranch,
    /// `op key`
    PowerDown,
    /// 0xFE signed multiply/divide prefix
    SignedPrefix,
}

/// Mnemonic and shape of a primary opcode. `None` for unassigned opcodes.
pub(crate) fn lookup(opcode: u8) -> Option<(Mnemonic, Shape)> {
    use Mnemonic::*;
    use Width::{Byte, Long, Word};

    let entry = match opcode {
        0x00 => (Skip, Shape::Skip),
        0x01 => (Clr, Shape::Unary(Word)),
        0x02 => (Not, Shape::Unary(Word)),
        0x03 => (Neg, Shape::Unary(Word)),
        0x04 => (Xch, Shape::ExchangeDirect(Word)),
        0x05 => (Dec, Shape::Unary(Word)),
        0x06 => (Ext, Shape::Unary(Long)),
        0x07 => (Inc, Shape::Unary(Word)),
        0x08 => (Shr, Shape::Shift(Word)),
        0x09 => (Shl, Shape::Shift(Word)),
        0x0A => (Shra, Shape::Shift(Word)),
        0x0B => (Xch, Shape::ExchangeIndexed(Word)),
        0x0C => (Shrl, Shape::Shift(Long)),
        0x0D => (Shll, Shape::Shift(Long)),
        0x0E => (Shral, Shape::Shift(Long)),
        0x0F => (Norml, Shape::Normalize),
        0x11 => (Clrb, Shape::Unary(Byte)),
        0x12 => (Notb, Shape::Unary(Byte)),
        0x13 => (Negb, Shape::Unary(Byte)),
        0x14 => (Xchb, Shape::ExchangeDirect(Byte)),
        0x15 => (Decb, Shape::Unary(Byte)),
        0x16 => (Extb, Shape::Unary(Word)),
        0x17 => (Incb, Shape::Unary(Byte)),
        0x18 => (Shrb, Shape::Shift(Byte)),
        0x19 => (Shlb, Shape::Shift(Byte)),
        0x1A => (Shrab, Shape::Shift(Byte)),
        0x1B => (Xchb, Shape::ExchangeIndexed(Byte)),
        0x1C => (Est, Shape::Extended { width: Word, store: true, indexed: false }),
        0x1D => (Est, Shape::Extended { width: Word, store: true, indexed: true }),
        0x1E => (Estb, Shape::Extended { width: Byte, store: true, indexed: false }),
        0x1F => (Estb, Shape::Extended { width: Byte, store: true, indexed: true }),
        0x20..=0x27 => (Sjmp, Shape::ShortRelative),
        0x28..=0x2F => (Scall, Shape::ShortRelative),
        0x30..=0x37 => (Jbc, Shape::BitRelative),
        0x38..=0x3F => (Jbs, Shape::BitRelative),
        0x40..=0x5F => three_operand(opcode),
        0x60..=0xBF => two_operand(opcode),
        0xC0 | 0xC2 | 0xC3 => (St, Shape::Store(Word)),
        0xC1 => (Bmov, Shape::RegisterPair { first: Word, second: Long }),
        0xC4 | 0xC6 | 0xC7 => (Stb, Shape::Store(Byte)),
        0xC5 => (Cmpl, Shape::RegisterPair { first: Long, second: Long }),
        0xC8..=0xCB => (Push, Shape::Push),
        0xCC | 0xCE | 0xCF => (Pop, Shape::Pop),
        0xCD => (Bmovi, Shape::RegisterPair { first: Word, second: Long }),
        0xD0 => (Jnst, Shape::CondRelative),
        0xD1 => (Jnh, Shape::CondRelative),
        0xD2 => (Jgt, Shape::CondRelative),
        0xD3 => (Jnc, Shape::CondRelative),
        0xD4 => (Jnvt, Shape::CondRelative),
        0xD5 => (Jnv, Shape::CondRelative),
        0xD6 => (Jge, Shape::CondRelative),
        0xD7 => (Jne, Shape::CondRelative),
        0xD8 => (Jst, Shape::CondRelative),
        0xD9 => (Jh, Shape::CondRelative),
        0xDA => (Jle, Shape::CondRelative),
        0xDB => (Jc, Shape::CondRelative),
        0xDC => (Jvt, Shape::CondRelative),
        0xDD => (Jv, Shape::CondRelative),
        0xDE => (Jlt, Shape::CondRelative),
        0xDF => (Je, Shape::CondRelative),
        0xE0 => (Djnz, Shape::DecrementRelative(Byte)),
        0xE1 => (Djnzw, Shape::DecrementRelative(Word)),
        0xE2 => (Tijmp, Shape::TableJump),
        0xE3 => (Br, Shape::IndirectBranch),
        0xE4 => (Ebmovi, Shape::RegisterPair { first: Word, second: Long }),
        0xE6 => (Ejmp, Shape::ExtendedRelative),
        0xE7 => (Ljmp, Shape::LongRelative),
        0xE8 => (Eld, Shape::Extended { width: Word, store: false, indexed: false }),
        0xE9 => (Eld, Shape::Extended { width: Word, store: false, indexed: true }),
        0xEA => (Eldb, Shape::Extended { width: Byte, store: false, indexed: false }),
        0xEB => (Eldb, Shape::Extended { width: Byte, store: false, indexed: true }),
        0xEC => (Dpts, Shape::Implied),
        0xED => (Epts, Shape::Implied),
        0xEF => (Lcall, Shape::LongRelative),
        0xF0 => (Ret, Shape::Implied),
        0xF1 => (Ecall, Shape::ExtendedRelative),
        0xF2 => (Pushf, Shape::Implied),
        0xF3 => (Popf, Shape::Implied),
        0xF4 => (Pusha, Shape::Implied),
        0xF5 => (Popa, Shape::Implied),
        0xF6 => (Idlpd, Shape::PowerDown),
        0xF7 => (Trap, Shape::Implied),
        0xF8 => (Clrc, Shape::Implied),
        0xF9 => (Setc, Shape::Implied),
        0xFA => (Di, Shape::Implied),
        0xFB => (Ei, Shape::Implied),
        0xFC => (Clrvt, Shape::Implied),
        0xFD => (Nop, Shape::Implied),
        0xFE => (Mul, Shape::SignedPrefix),
        0xFF => (Rst, Shape::Implied),
        // 0x10, 0xE5, 0xEE
        _ => return None,
    };
    Some(entry)
}

/// Signed form of an opcode following the 0xFE prefix.
pub(crate) fn signed_variant(opcode: u8) -> Option<(Mnemonic, Shape)> {
    let (mnemonic, shape) = lookup(opcode)?;
    let signed = match mnemonic {
        Mnemonic::Mulu => Mnemonic::Mul,
        Mnemonic::Mulub => Mnemonic::Mulb,
        Mnemonic::Divu => Mnemonic::Div,
        Mnemonic::Divub => Mnemonic::Divb,
        _ => return None,
    };
    Some((signed, shape))
}

fn three_operand(opcode: u8) -> (Mnemonic, Shape) {
    use Width::{Byte, Long, Word};
    let (mnemonic, src, dest) = match (opcode >> 2) & 0x07 {
        0 => (Mnemonic::And, Word, Word),
        1 => (Mnemonic::Add, Word, Word),
        2 => (Mnemonic::Sub, Word, Word),
        3 => (Mnemonic::Mulu, Word, Long),
        4 => (Mnemonic::Andb, Byte, Byte),
        5 => (Mnemonic::Addb, Byte, Byte),
        6 => (Mnemonic::Subb, Byte, Byte),
        _ => (Mnemonic::Mulub, Byte, Word),
    };
    (mnemonic, Shape::ThreeOp { src, dest })
}

fn two_operand(opcode: u8) -> (Mnemonic, Shape) {
    use Width::{Byte, Long, Word};
    let (mnemonic, src, dest) = match (opcode - 0x60) >> 2 {
        0x0 => (Mnemonic::And, Word, Word),
        0x1 => (Mnemonic::Add, Word, Word),
        0x2 => (Mnemonic::Sub, Word, Word),
        0x3 => (Mnemonic::Mulu, Word, Long),
        0x4 => (Mnemonic::Andb, Byte, Byte),
        0x5 => (Mnemonic::Addb, Byte, Byte),
        0x6 => (Mnemonic::Subb, Byte, Byte),
        0x7 => (Mnemonic::Mulub, Byte, Word),
        0x8 => (Mnemonic::Or, Word, Word),
        0x9 => (Mnemonic::Xor, Word, Word),
        0xA => (Mnemonic::Cmp, Word, Word),
        0xB => (Mnemonic::Divu, Word, Long),
        0xC => (Mnemonic::Orb, Byte, Byte),
        0xD => (Mnemonic::Xorb, Byte, Byte),
        0xE => (Mnemonic::Cmpb, Byte, Byte),
        0xF => (Mnemonic::Divub, Byte, Word),
        0x10 => (Mnemonic::Ld, Word, Word),
        0x11 => (Mnemonic::Addc, Word, Word),
        0x12 => (Mnemonic::Subc, Word, Word),
        0x13 => (Mnemonic::Ldbze, Byte, Word),
        0x14 => (Mnemonic::Ldb, Byte, Byte),
        0x15 => (Mnemonic::Addcb, Byte, Byte),
        0x16 => (Mnemonic::Subcb, Byte, Byte),
        _ => (Mnemonic::Ldbse, Byte, Word),
    };
    (mnemonic, Shape::TwoOp { src, dest })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unassigned_opcodes() {
        for opcode in [0x10, 0xE5, 0xEE] {
            assert!(lookup(opcode).is_none(), "0x{:02X} should be unassigned", opcode);
        }
        let assigned = (0u8..=0xFF).filter(|op| lookup(*op).is_some()).count();
        assert_eq!(assigned, 253);
    }

    #[test]
    fn test_operand_groups() {
        assert_eq!(lookup(0x44).map(|e| e.0), Some(Mnemonic::Add));
        assert_eq!(lookup(0x5F).map(|e| e.0), Some(Mnemonic::Mulub));
        assert_eq!(lookup(0x8B).map(|e| e.0), Some(Mnemonic::Cmp));
        assert_eq!(lookup(0xA1).map(|e| e.0), Some(Mnemonic::Ld));
        assert_eq!(lookup(0xBC).map(|e| e.0), Some(Mnemonic::Ldbse));
        assert_eq!(
            lookup(0xAD).map(|e| e.1),
            Some(Shape::TwoOp { src: Width::Byte, dest: Width::Word })
        );
    }

    #[test]
    fn test_signed_variants() {
        assert_eq!(signed_variant(0x6C).map(|e| e.0), Some(Mnemonic::Mul));
        assert_eq!(signed_variant(0x5D).map(|e| e.0), Some(Mnemonic::Mulb));
        assert_eq!(signed_variant(0x8E).map(|e| e.0), Some(Mnemonic::Div));
        assert_eq!(signed_variant(0x9F).map(|e| e.0), Some(Mnemonic::Divb));
        assert!(signed_variant(0x64).is_none());
        assert!(signed_variant(0xFE).is_none());
    }
}
