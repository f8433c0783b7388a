//! Instruction decoder for the MCS-96 (8xC196) instruction set
//!
//! Decoding is split in two passes over the window: the length is measured
//! from the opcode (and, for indexed modes, the lsb of the index byte) before
//! any field is read, so a short window reports a precise `Truncated` length.

mod opcodes;
pub mod pseudo;

use crate::{
    Address, AddressingMode, ControlFlowRef, Decoder, Flow, Instruction, Mnemonic, Operand,
    OperandKind, RefKind, Width, MAX_INSTRUCTION_SIZE,
};
use opcodes::Shape;

/// Why a window could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeErrorKind {
    #[error("unknown opcode 0x{0:02X}")]
    UnknownOpcode(u8),

    #[error("opcode 0x{0:02X} cannot follow the 0xFE prefix")]
    InvalidPrefix(u8),

    /// A register field breaks word or long alignment
    #[error("misaligned register operand 0x{0:02X}")]
    InvalidAddressingMode(u8),

    #[error("instruction runs past the end of the input")]
    Truncated,
}

/// A failed decode at `address`.
///
/// `length` is the instruction length when the encoding still determined it,
/// letting linear walkers skip the whole instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at 0x{address:06X}")]
pub struct DecodeError {
    pub address: Address,
    pub kind: DecodeErrorKind,
    pub length: Option<usize>,
}

impl DecodeError {
    fn new(address: Address, kind: DecodeErrorKind, length: Option<usize>) -> Self {
        Self { address, kind, length }
    }
}

/// Decoder for the 8xC196 family including the NT/EA extended instructions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mcs96Decoder;

impl Mcs96Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for Mcs96Decoder {
    fn decode(&self, window: &[u8], address: Address) -> Result<Instruction, DecodeError> {
        let truncated = |length| DecodeError::new(address, DecodeErrorKind::Truncated, length);

        let opcode = *window.first().ok_or_else(|| truncated(None))?;
        let (prefix_len, mnemonic, shape) = if opcode == 0xFE {
            let inner = *window.get(1).ok_or_else(|| truncated(None))?;
            let (mnemonic, shape) = opcodes::signed_variant(inner).ok_or_else(|| {
                DecodeError::new(address, DecodeErrorKind::InvalidPrefix(inner), None)
            })?;
            (1, mnemonic, shape)
        } else {
            let (mnemonic, shape) = opcodes::lookup(opcode).ok_or_else(|| {
                DecodeError::new(address, DecodeErrorKind::UnknownOpcode(opcode), None)
            })?;
            (0, mnemonic, shape)
        };

        let body = &window[prefix_len..];
        let length = prefix_len + measure(shape, body).ok_or_else(|| truncated(None))?;
        if window.len() < length {
            return Err(truncated(Some(length)));
        }

        let mut fields = Fields::new(&body[..length - prefix_len]);
        let parsed = parse(mnemonic, shape, &mut fields, address, length)
            .map_err(|kind| DecodeError::new(address, kind, Some(length)))?;

        Ok(assemble(address, &window[..length], parsed))
    }
}

/// Length of the instruction starting at `body[0]`, or `None` when the byte
/// that decides it is missing.
fn measure(shape: Shape, body: &[u8]) -> Option<usize> {
    let opcode = *body.first()?;
    let mode = opcode & 0x03;
    let length = match shape {
        Shape::Implied => 1,
        Shape::Skip | Shape::Unary(_) | Shape::ShortRelative | Shape::CondRelative => 2,
        Shape::IndirectBranch | Shape::PowerDown => 2,
        Shape::ExchangeDirect(_) | Shape::Shift(_) | Shape::Normalize => 3,
        Shape::BitRelative | Shape::DecrementRelative(_) | Shape::LongRelative => 3,
        Shape::RegisterPair { .. } => 3,
        Shape::ExtendedRelative | Shape::TableJump => 4,
        Shape::Extended { indexed: false, .. } => 3,
        Shape::Extended { indexed: true, .. } => 6,
        Shape::ExchangeIndexed(_) => 2 + indexed_len(body.get(1).copied()?) + 1,
        Shape::ThreeOp { src, .. } => 1 + field_len(mode, src, body.get(1).copied())? + 2,
        Shape::TwoOp { src, .. } => 1 + field_len(mode, src, body.get(1).copied())? + 1,
        Shape::Store(width) => 1 + field_len(mode, width, body.get(1).copied())? + 1,
        Shape::Push | Shape::Pop => 1 + field_len(mode, Width::Word, body.get(1).copied())?,
        // Filtered out by signed_variant
        Shape::SignedPrefix => return None,
    };
    Some(length)
}

/// Bytes taken by a general addressing-mode field.
fn field_len(mode: u8, width: Width, aop: Option<u8>) -> Option<usize> {
    match mode {
        0 | 2 => Some(1),
        1 => Some(width.immediate_size()),
        _ => aop.map(|aop| 1 + indexed_len(aop)),
    }
}

fn indexed_len(aop: u8) -> usize {
    if aop & 0x01 == 1 {
        2
    } else {
        1
    }
}

/// Sequential reader over an instruction whose length has been verified.
struct Fields<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Fields<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        // Opcode is consumed by the caller's lookup
        Self { bytes, pos: 1 }
    }

    fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    fn byte(&mut self) -> u8 {
        let value = self.bytes.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        value
    }

    fn word(&mut self) -> u16 {
        let lo = self.byte();
        let hi = self.byte();
        u16::from_le_bytes([lo, hi])
    }

    fn tribyte(&mut self) -> u32 {
        let lo = self.word() as u32;
        lo | (self.byte() as u32) << 16
    }

    /// A register field of the given width; words and longs must be aligned.
    fn register(&mut self, width: Width) -> Result<OperandKind, DecodeErrorKind> {
        let address = self.byte();
        let aligned = match width {
            Width::Byte => true,
            Width::Word => address & 0x01 == 0,
            Width::Long => address & 0x03 == 0,
        };
        if !aligned {
            return Err(DecodeErrorKind::InvalidAddressingMode(address));
        }
        Ok(OperandKind::Register { width, address: address as u16 })
    }

    /// The general `aop` field selected by the opcode's two low bits.
    fn general(&mut self, width: Width) -> Result<(AddressingMode, OperandKind), DecodeErrorKind> {
        match self.opcode() & 0x03 {
            0 => Ok((AddressingMode::Direct, self.register(width)?)),
            1 => {
                let value = match width {
                    Width::Byte => self.byte() as u32,
                    _ => self.word() as u32,
                };
                Ok((AddressingMode::Immediate, OperandKind::Immediate { width, value }))
            }
            2 => {
                let aop = self.byte();
                let autoincrement = aop & 0x01 == 1;
                let mode = if autoincrement {
                    AddressingMode::IndirectAutoIncrement
                } else {
                    AddressingMode::Indirect
                };
                Ok((mode, OperandKind::Indirect { pointer: (aop & 0xFE) as u16, autoincrement }))
            }
            _ => Ok(self.indexed()),
        }
    }

    fn indexed(&mut self) -> (AddressingMode, OperandKind) {
        let aop = self.byte();
        let base = (aop & 0xFE) as u16;
        if aop & 0x01 == 1 {
            let displacement = self.word() as i32;
            (AddressingMode::LongIndexed, OperandKind::Indexed { base, displacement, long: true })
        } else {
            let displacement = self.byte() as i8 as i32;
            (AddressingMode::ShortIndexed, OperandKind::Indexed { base, displacement, long: false })
        }
    }
}

/// Decoded fields before the instruction is assembled.
struct Parsed {
    mnemonic: Mnemonic,
    mode: AddressingMode,
    operands: Vec<Operand>,
    flow: Flow,
}

/// Target of a 16-bit relative transfer; wraps inside the instruction's page.
fn relative_target(address: Address, length: usize, displacement: i32) -> Address {
    let offset = address
        .wrapping_add(length as u32)
        .wrapping_add(displacement as u32)
        & 0xFFFF;
    (address & 0xFF_0000) | offset
}

fn parse(
    mnemonic: Mnemonic,
    shape: Shape,
    fields: &mut Fields<'_>,
    address: Address,
    length: usize,
) -> Result<Parsed, DecodeErrorKind> {
    use Mnemonic::*;

    let opcode = fields.opcode();
    let mut mnemonic = mnemonic;
    let mut mode = AddressingMode::Direct;
    let mut flow = Flow::Fallthrough;
    let mut operands = Vec::with_capacity(3);

    match shape {
        Shape::Implied => {
            mode = AddressingMode::Implied;
            flow = match mnemonic {
                Ret => Flow::Return,
                Rst => Flow::Reset,
                _ => Flow::Fallthrough,
            };
        }
        Shape::Skip => {
            mode = AddressingMode::Implied;
            fields.byte();
        }
        Shape::Unary(width) => operands.push(Operand::new("dest", fields.register(width)?)),
        Shape::ExchangeDirect(width) => {
            let src = fields.register(width)?;
            operands.push(Operand::new("dest", fields.register(width)?));
            operands.push(Operand::new("src", src));
        }
        Shape::ExchangeIndexed(width) => {
            let (indexed_mode, src) = fields.indexed();
            mode = indexed_mode;
            operands.push(Operand::new("dest", fields.register(width)?));
            operands.push(Operand::new("src", src));
        }
        Shape::Shift(width) => {
            let count = fields.byte();
            let count = if count < 16 {
                OperandKind::Count(count)
            } else {
                OperandKind::Register { width: Width::Byte, address: count as u16 }
            };
            operands.push(Operand::new("dest", fields.register(width)?));
            operands.push(Operand::new("count", count));
        }
        Shape::Normalize => {
            let count = fields.register(Width::Byte)?;
            operands.push(Operand::new("dest", fields.register(Width::Long)?));
            operands.push(Operand::new("count", count));
        }
        Shape::Extended { width, store, indexed } => {
            let treg = fields.byte();
            let memory = if indexed {
                mode = AddressingMode::ExtendedIndexed;
                OperandKind::ExtendedIndexed { base: (treg & 0xFE) as u16, displacement: fields.tribyte() }
            } else {
                let autoincrement = treg & 0x01 == 1;
                mode = if autoincrement {
                    AddressingMode::IndirectAutoIncrement
                } else {
                    AddressingMode::Indirect
                };
                OperandKind::Indirect { pointer: (treg & 0xFE) as u16, autoincrement }
            };
            let register = fields.register(width)?;
            if store {
                operands.push(Operand::new("src", register));
                operands.push(Operand::new("dest", memory));
            } else {
                operands.push(Operand::new("dest", register));
                operands.push(Operand::new("src", memory));
            }
        }
        Shape::ShortRelative => {
            mode = AddressingMode::Relative;
            let raw = (((opcode & 0x07) as i32) << 8) | fields.byte() as i32;
            let displacement = if raw & 0x400 != 0 { raw - 0x800 } else { raw };
            let target = relative_target(address, length, displacement);
            operands.push(Operand::new("target", OperandKind::Target(target)));
            flow = if mnemonic == Scall { Flow::Call(target) } else { Flow::UnconditionalJump(target) };
        }
        Shape::BitRelative => {
            mode = AddressingMode::Relative;
            let register = fields.register(Width::Byte)?;
            let target = relative_target(address, length, fields.byte() as i8 as i32);
            operands.push(Operand::new("src", register));
            operands.push(Operand::new("bit", OperandKind::Bit(opcode & 0x07)));
            operands.push(Operand::new("target", OperandKind::Target(target)));
            flow = Flow::ConditionalJump(target);
        }
        Shape::CondRelative => {
            mode = AddressingMode::Relative;
            let target = relative_target(address, length, fields.byte() as i8 as i32);
            operands.push(Operand::new("target", OperandKind::Target(target)));
            flow = Flow::ConditionalJump(target);
        }
        Shape::DecrementRelative(width) => {
            mode = AddressingMode::Relative;
            let counter = fields.register(width)?;
            let target = relative_target(address, length, fields.byte() as i8 as i32);
            operands.push(Operand::new("counter", counter));
            operands.push(Operand::new("target", OperandKind::Target(target)));
            flow = Flow::ConditionalJump(target);
        }
        Shape::LongRelative => {
            mode = AddressingMode::Relative;
            let target = relative_target(address, length, fields.word() as i16 as i32);
            operands.push(Operand::new("target", OperandKind::Target(target)));
            flow = if mnemonic == Lcall { Flow::Call(target) } else { Flow::UnconditionalJump(target) };
        }
        Shape::ExtendedRelative => {
            mode = AddressingMode::Relative;
            let target = address
                .wrapping_add(length as u32)
                .wrapping_add(fields.tribyte())
                & 0xFF_FFFF;
            operands.push(Operand::new("target", OperandKind::Target(target)));
            flow = if mnemonic == Ecall { Flow::Call(target) } else { Flow::UnconditionalJump(target) };
        }
        Shape::ThreeOp { src, dest } => {
            let (aop_mode, src2) = fields.general(src)?;
            mode = aop_mode;
            let src1 = fields.register(src)?;
            operands.push(Operand::new("dest", fields.register(dest)?));
            operands.push(Operand::new("src1", src1));
            operands.push(Operand::new("src2", src2));
        }
        Shape::TwoOp { src, dest } => {
            let (aop_mode, source) = fields.general(src)?;
            mode = aop_mode;
            operands.push(Operand::new("dest", fields.register(dest)?));
            operands.push(Operand::new("src", source));
        }
        Shape::Store(width) => {
            let (aop_mode, target) = fields.general(width)?;
            mode = aop_mode;
            operands.push(Operand::new("src", fields.register(width)?));
            operands.push(Operand::new("dest", target));
        }
        Shape::Push => {
            let (aop_mode, source) = fields.general(Width::Word)?;
            mode = aop_mode;
            operands.push(Operand::new("src", source));
        }
        Shape::Pop => {
            let (aop_mode, target) = fields.general(Width::Word)?;
            mode = aop_mode;
            operands.push(Operand::new("dest", target));
        }
        Shape::RegisterPair { first, second } => {
            let count_or_src = fields.register(first)?;
            let pointers_or_dest = fields.register(second)?;
            let (dest_name, src_name) = if mnemonic == Cmpl { ("dest", "src") } else { ("ptrs", "count") };
            operands.push(Operand::new(dest_name, pointers_or_dest));
            operands.push(Operand::new(src_name, count_or_src));
        }
        Shape::TableJump => {
            mode = AddressingMode::Indirect;
            let index = fields.byte();
            let mask = fields.byte();
            operands.push(Operand::new("base", fields.register(Width::Word)?));
            operands.push(Operand::new(
                "index",
                OperandKind::Indirect { pointer: (index & 0xFE) as u16, autoincrement: false },
            ));
            operands.push(Operand::new(
                "mask",
                OperandKind::Immediate { width: Width::Byte, value: mask as u32 },
            ));
            flow = Flow::IndirectJump;
        }
        Shape::IndirectBranch => {
            mode = AddressingMode::Indirect;
            let pointer = fields.byte();
            if pointer & 0x01 == 1 {
                mnemonic = Ebr;
            }
            operands.push(Operand::new(
                "target",
                OperandKind::Indirect { pointer: (pointer & 0xFE) as u16, autoincrement: false },
            ));
            flow = Flow::IndirectJump;
        }
        Shape::PowerDown => {
            mode = AddressingMode::Immediate;
            operands.push(Operand::new("key", OperandKind::Key(fields.byte())));
        }
        Shape::SignedPrefix => return Err(DecodeErrorKind::InvalidPrefix(opcode)),
    }

    Ok(Parsed { mnemonic, mode, operands, flow })
}

/// Builds the instruction and the references it contributes.
fn assemble(address: Address, raw: &[u8], parsed: Parsed) -> Instruction {
    let Parsed { mnemonic, mode, operands, flow } = parsed;

    let mut bytes = [0u8; MAX_INSTRUCTION_SIZE];
    bytes[..raw.len()].copy_from_slice(raw);

    let reference = |target, kind| ControlFlowRef { target, origin: address, mnemonic, kind };
    let mut calls = Vec::new();
    let mut jumps = Vec::new();
    match flow {
        Flow::Call(target) => calls.push(reference(target, RefKind::Call)),
        Flow::UnconditionalJump(target) => jumps.push(reference(target, RefKind::UnconditionalJump)),
        Flow::ConditionalJump(target) => jumps.push(reference(target, RefKind::ConditionalJump)),
        _ => {}
    }
    let xrefs = operands
        .iter()
        .filter_map(Operand::absolute_address)
        .map(|target| reference(target, RefKind::OperandReference))
        .collect();

    Instruction {
        address,
        size: raw.len() as u8,
        mnemonic,
        mode,
        bytes,
        pseudocode: pseudo::render(mnemonic, &operands),
        operands,
        ignore: mnemonic == Mnemonic::Skip,
        flow,
        calls,
        jumps,
        xrefs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BASE: Address = 0x172080;

    fn decode(bytes: &[u8]) -> Result<Instruction, DecodeError> {
        Mcs96Decoder::new().decode(bytes, BASE)
    }

    #[rstest]
    #[case(&[0xF0], Mnemonic::Ret, 1)]
    #[case(&[0x00, 0x55], Mnemonic::Skip, 2)]
    #[case(&[0x01, 0x1C], Mnemonic::Clr, 2)]
    #[case(&[0x09, 0x04, 0x1C], Mnemonic::Shl, 3)]
    #[case(&[0x0B, 0x1D, 0x00, 0x10, 0x20], Mnemonic::Xch, 5)]
    #[case(&[0x44, 0x20, 0x1E, 0x1C], Mnemonic::Add, 4)]
    #[case(&[0x45, 0x34, 0x12, 0x1E, 0x1C], Mnemonic::Add, 5)]
    #[case(&[0x55, 0x34, 0x1E, 0x1C], Mnemonic::Addb, 4)]
    #[case(&[0x47, 0x21, 0x34, 0x12, 0x1E, 0x1C], Mnemonic::Add, 6)]
    #[case(&[0x88, 0x20, 0x1C], Mnemonic::Cmp, 3)]
    #[case(&[0xA3, 0x20, 0xFC, 0x1C], Mnemonic::Ld, 4)]
    #[case(&[0xAD, 0x7F, 0x1C], Mnemonic::Ldbze, 3)]
    #[case(&[0xC8, 0x1C], Mnemonic::Push, 2)]
    #[case(&[0xC9, 0x34, 0x12], Mnemonic::Push, 3)]
    #[case(&[0xCC, 0x1C], Mnemonic::Pop, 2)]
    #[case(&[0xC1, 0x20, 0x24], Mnemonic::Bmov, 3)]
    #[case(&[0xE1, 0x1C, 0xFD], Mnemonic::Djnzw, 3)]
    #[case(&[0xE2, 0x20, 0x0F, 0x22], Mnemonic::Tijmp, 4)]
    #[case(&[0xE3, 0x20], Mnemonic::Br, 2)]
    #[case(&[0xE3, 0x21], Mnemonic::Ebr, 2)]
    #[case(&[0xE9, 0x01, 0x00, 0x40, 0x17, 0x1C], Mnemonic::Eld, 6)]
    #[case(&[0xF6, 0x02], Mnemonic::Idlpd, 2)]
    #[case(&[0xFE, 0x6C, 0x20, 0x1C], Mnemonic::Mul, 4)]
    #[case(&[0xFE, 0x4F, 0x21, 0x00, 0x10, 0x1E, 0x1C], Mnemonic::Mul, 7)]
    fn test_mnemonic_and_length(#[case] bytes: &[u8], #[case] mnemonic: Mnemonic, #[case] size: u8) {
        let insn = decode(bytes).unwrap();
        assert_eq!(insn.mnemonic, mnemonic);
        assert_eq!(insn.size, size);
        assert_eq!(insn.bytes(), bytes);
    }

    #[rstest]
    // SJMP +0x10 from 0x172080 (len 2)
    #[case(&[0x20, 0x10], Flow::UnconditionalJump(0x172092))]
    // SJMP -0x400 (11-bit sign bit set)
    #[case(&[0x24, 0x00], Flow::UnconditionalJump(0x171C82))]
    // SCALL +0x100
    #[case(&[0x29, 0x00], Flow::Call(0x172182))]
    // JNE -3 loops onto itself minus one byte
    #[case(&[0xD7, 0xFD], Flow::ConditionalJump(0x17207F))]
    #[case(&[0x33, 0x1C, 0x05], Flow::ConditionalJump(0x172088))]
    #[case(&[0xE7, 0x00, 0x10], Flow::UnconditionalJump(0x173083))]
    #[case(&[0xEF, 0x00, 0xF0], Flow::Call(0x171083))]
    #[case(&[0xF1, 0x7C, 0xDF, 0xEF], Flow::Call(0x070000))]
    #[case(&[0xF0], Flow::Return)]
    #[case(&[0xFF], Flow::Reset)]
    #[case(&[0xE3, 0x20], Flow::IndirectJump)]
    #[case(&[0xA0, 0x20, 0x1C], Flow::Fallthrough)]
    fn test_flow(#[case] bytes: &[u8], #[case] flow: Flow) {
        assert_eq!(decode(bytes).unwrap().flow, flow);
    }

    #[test]
    fn test_relative_target_wraps_in_page() {
        // LJMP +0x7FFF from 0x17FFF0
        let insn = Mcs96Decoder.decode(&[0xE7, 0xFF, 0x7F], 0x17FFF0).unwrap();
        assert_eq!(insn.flow, Flow::UnconditionalJump(0x177FF2));
        let insn = Mcs96Decoder.decode(&[0x20, 0x20], 0x17FFF0).unwrap();
        assert_eq!(insn.flow, Flow::UnconditionalJump(0x170012));
    }

    #[test]
    fn test_references() {
        let call = decode(&[0xEF, 0x00, 0x10]).unwrap();
        assert_eq!(call.calls.len(), 1);
        assert_eq!(call.calls[0].kind, RefKind::Call);
        assert_eq!(call.calls[0].origin, BASE);
        assert!(call.jumps.is_empty());

        let branch = decode(&[0xDF, 0x04]).unwrap();
        assert_eq!(branch.jumps[0].kind, RefKind::ConditionalJump);
        assert_eq!(branch.jumps[0].target, 0x172086);

        let ret = decode(&[0xF0]).unwrap();
        assert!(ret.calls.is_empty() && ret.jumps.is_empty() && ret.xrefs.is_empty());
    }

    #[test]
    fn test_absolute_operand_reference() {
        // LD 0x1C, 0x1E72[0]
        let insn = decode(&[0xA3, 0x01, 0x72, 0x1E, 0x1C]).unwrap();
        assert_eq!(insn.mode, AddressingMode::LongIndexed);
        assert_eq!(insn.xrefs.len(), 1);
        assert_eq!(insn.xrefs[0].target, 0x1E72);
        assert_eq!(insn.xrefs[0].kind, RefKind::OperandReference);
        assert_eq!(insn.pseudocode, "R1C = [0x1E72];");

        // ELD 0x1C, 0x174000[0]
        let insn = decode(&[0xE9, 0x00, 0x00, 0x40, 0x17, 0x1C]).unwrap();
        assert_eq!(insn.xrefs[0].target, 0x174000);

        // Indexed off a real register is not an absolute reference
        let insn = decode(&[0xA3, 0x21, 0x72, 0x1E, 0x1C]).unwrap();
        assert!(insn.xrefs.is_empty());
    }

    #[test]
    fn test_operand_order_and_modes() {
        let insn = decode(&[0x44, 0x20, 0x1E, 0x1C]).unwrap();
        let names: Vec<_> = insn.operands.iter().map(|op| op.name).collect();
        assert_eq!(names, ["dest", "src1", "src2"]);
        assert_eq!(insn.pseudocode, "R1C = R1E + R20;");

        let insn = decode(&[0xA2, 0x31, 0x1C]).unwrap();
        assert_eq!(insn.mode, AddressingMode::IndirectAutoIncrement);
        assert_eq!(insn.to_string(), "LD\t0x1C, [0x30]+");
    }

    #[test]
    fn test_shift_count_register() {
        let insn = decode(&[0x08, 0x30, 0x1C]).unwrap();
        assert_eq!(insn.operands[1].kind, OperandKind::Register { width: Width::Byte, address: 0x30 });
        let insn = decode(&[0x08, 0x03, 0x1C]).unwrap();
        assert_eq!(insn.operands[1].kind, OperandKind::Count(3));
    }

    #[test]
    fn test_skip_is_ignored() {
        assert!(decode(&[0x00, 0x12]).unwrap().ignore);
        assert!(!decode(&[0xFD]).unwrap().ignore);
    }

    #[test]
    fn test_unknown_opcode_has_no_length() {
        let err = decode(&[0xE5, 0x00, 0x00]).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::UnknownOpcode(0xE5));
        assert_eq!(err.length, None);
        assert_eq!(err.address, BASE);
    }

    #[test]
    fn test_invalid_prefix() {
        let err = decode(&[0xFE, 0x64, 0x20, 0x1C]).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidPrefix(0x64));
    }

    #[test]
    fn test_misaligned_word_register() {
        let err = decode(&[0xA0, 0x21, 0x1C]).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidAddressingMode(0x21));
        assert_eq!(err.length, Some(3));
    }

    #[rstest]
    #[case(&[], None)]
    #[case(&[0xEF, 0x00], Some(3))]
    #[case(&[0xA3], None)]
    #[case(&[0xA3, 0x21, 0x00], Some(5))]
    #[case(&[0xFE], None)]
    #[case(&[0xFE, 0x4F, 0x21], Some(7))]
    fn test_truncated(#[case] bytes: &[u8], #[case] length: Option<usize>) {
        let err = decode(bytes).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::Truncated);
        assert_eq!(err.length, length);
    }

    #[test]
    fn test_never_reads_past_window() {
        // A full instruction followed by unrelated bytes decodes to the same thing
        let short = decode(&[0xEF, 0x00, 0x10]).unwrap();
        let long = decode(&[0xEF, 0x00, 0x10, 0xFF, 0xFF]).unwrap();
        assert_eq!(short, long);
    }
}
