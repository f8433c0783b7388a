//! Core IR, traits and errors for the c196dis firmware disassembler.
//!
//! This library statically disassembles ROM images of 8xC196-class automotive
//! microcontrollers (the 8XC196EA memory map by default). Rather than sweeping
//! every byte it follows control flow from the reset vector and every
//! interrupt/PTS vector, records who calls and jumps where, and renders an
//! annotated listing with the bytes it never reached.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use c196dis::{
//!     config::CrawlConfig,
//!     format::OutputFormat,
//!     image::RawImage,
//!     session::Session,
//!     strategy::Strategy,
//! };
//!
//! // Concatenate the two firmware segments into one address space
//! let image = RawImage::from_files("PRE.BIN", "MSP.BIN").unwrap();
//!
//! // Validate the image against the default 8XC196EA configuration
//! let session = Session::new(image, CrawlConfig::default()).unwrap();
//!
//! // Follow control flow from reset and every interrupt vector
//! let disassembly = session.run(Strategy::Crawl).unwrap();
//!
//! // Render the annotated listing
//! let report = session.report(&disassembly, OutputFormat::Text).unwrap();
//! println!("{}", report);
//! ```

pub mod config;
pub mod decoder;
pub mod format;
pub mod image;
pub mod memory_map;
pub mod mnemonic;
pub mod registers;
pub mod session;
pub mod state;
pub mod strategy;
pub mod vectors;
pub mod xref;
mod large_tests;

use std::fmt;

pub use crate::mnemonic::Mnemonic;
use crate::state::CrawlState;
use crate::xref::XrefTable;

/// Represents an address in the 24-bit image space
pub type Address = u32;

/// Maximum instruction size in bytes (0xFE prefix + long-indexed three-operand form)
pub const MAX_INSTRUCTION_SIZE: usize = 7;

/// Operand width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Byte,
    Word,
    Long,
}

impl Width {
    /// Size of an immediate of this width in bytes.
    pub fn immediate_size(self) -> usize {
        match self {
            Width::Byte => 1,
            Width::Word => 2,
            Width::Long => 4,
        }
    }
}

/// How an instruction reaches its memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    Implied,
    Direct,
    Immediate,
    Indirect,
    IndirectAutoIncrement,
    ShortIndexed,
    LongIndexed,
    ExtendedIndexed,
    Relative,
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddressingMode::Implied => "implied",
            AddressingMode::Direct => "direct",
            AddressingMode::Immediate => "immediate",
            AddressingMode::Indirect => "indirect",
            AddressingMode::IndirectAutoIncrement => "indirect+",
            AddressingMode::ShortIndexed => "short-indexed",
            AddressingMode::LongIndexed => "long-indexed",
            AddressingMode::ExtendedIndexed => "extended-indexed",
            AddressingMode::Relative => "relative",
        };
        f.write_str(name)
    }
}

/// The value carried by one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Register-file location
    Register { width: Width, address: u16 },
    /// Immediate constant
    Immediate { width: Width, value: u32 },
    /// `[reg]` or `[reg]+`
    Indirect { pointer: u16, autoincrement: bool },
    /// `disp[reg]`, short (8-bit signed) or long (16-bit) displacement
    Indexed { base: u16, displacement: i32, long: bool },
    /// `disp24[treg]` for the extended load/store forms
    ExtendedIndexed { base: u16, displacement: u32 },
    /// Code address resolved from a relative displacement
    Target(Address),
    /// Bit number for JBC/JBS
    Bit(u8),
    /// Immediate shift count (0-15)
    Count(u8),
    /// Power-down key for IDLPD
    Key(u8),
}

/// One named operand of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    /// Role of the operand ("dest", "src", "target", ...)
    pub name: &'static str,
    pub kind: OperandKind,
}

impl Operand {
    pub fn new(name: &'static str, kind: OperandKind) -> Self {
        Self { name, kind }
    }

    /// Short tag describing the operand type.
    pub fn type_tag(&self) -> &'static str {
        match self.kind {
            OperandKind::Register { width: Width::Byte, .. } => "breg",
            OperandKind::Register { width: Width::Word, .. } => "wreg",
            OperandKind::Register { width: Width::Long, .. } => "lreg",
            OperandKind::Immediate { .. } => "imm",
            OperandKind::Indirect { autoincrement: false, .. } => "indirect",
            OperandKind::Indirect { autoincrement: true, .. } => "indirect+",
            OperandKind::Indexed { long: false, .. } => "short-indexed",
            OperandKind::Indexed { long: true, .. } => "long-indexed",
            OperandKind::ExtendedIndexed { .. } => "extended-indexed",
            OperandKind::Target(_) => "target",
            OperandKind::Bit(_) => "bit",
            OperandKind::Count(_) => "count",
            OperandKind::Key(_) => "key",
        }
    }

    /// Absolute data address for indexed operands based on the zero register.
    pub fn absolute_address(&self) -> Option<Address> {
        match self.kind {
            OperandKind::Indexed { base: 0, displacement, long: true } => {
                Some(displacement as u32 & 0xFFFF)
            }
            OperandKind::ExtendedIndexed { base: 0, displacement } => Some(displacement & 0xFF_FFFF),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OperandKind::Register { address, .. } => write!(f, "0x{:02X}", address),
            OperandKind::Immediate { value, .. } => write!(f, "#0x{:X}", value),
            OperandKind::Indirect { pointer, autoincrement } => {
                write!(f, "[0x{:02X}]{}", pointer, if autoincrement { "+" } else { "" })
            }
            OperandKind::Indexed { base, displacement, .. } => {
                if displacement < 0 {
                    write!(f, "-0x{:X}[0x{:02X}]", -displacement, base)
                } else {
                    write!(f, "0x{:X}[0x{:02X}]", displacement, base)
                }
            }
            OperandKind::ExtendedIndexed { base, displacement } => {
                write!(f, "0x{:06X}[0x{:02X}]", displacement, base)
            }
            OperandKind::Target(target) => write!(f, "0x{:06X}", target),
            OperandKind::Bit(bit) => write!(f, "{}", bit),
            OperandKind::Count(count) => write!(f, "#{}", count),
            OperandKind::Key(key) => write!(f, "#0x{:02X}", key),
        }
    }
}

/// Control-flow effect of an instruction, fixed by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Fallthrough,
    Call(Address),
    UnconditionalJump(Address),
    ConditionalJump(Address),
    Return,
    Reset,
    /// BR, EBR and TIJMP: the target is computed at run time
    IndirectJump,
}

impl Flow {
    /// True when execution can never reach the next sequential instruction.
    pub fn ends_path(&self) -> bool {
        matches!(
            self,
            Flow::Return | Flow::Reset | Flow::IndirectJump | Flow::UnconditionalJump(_)
        )
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Fallthrough => write!(f, "fallthrough"),
            Flow::Call(target) => write!(f, "call 0x{:06X}", target),
            Flow::UnconditionalJump(target) => write!(f, "jump 0x{:06X}", target),
            Flow::ConditionalJump(target) => write!(f, "branch 0x{:06X}", target),
            Flow::Return => write!(f, "return"),
            Flow::Reset => write!(f, "reset"),
            Flow::IndirectJump => write!(f, "indirect"),
        }
    }
}

/// Semantic tag of a discovered reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Call,
    UnconditionalJump,
    ConditionalJump,
    OperandReference,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::Call => write!(f, "call"),
            RefKind::UnconditionalJump => write!(f, "jump"),
            RefKind::ConditionalJump => write!(f, "branch"),
            RefKind::OperandReference => write!(f, "xref"),
        }
    }
}

/// A call, jump or operand reference from `origin` to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlFlowRef {
    pub target: Address,
    pub origin: Address,
    pub mnemonic: Mnemonic,
    pub kind: RefKind,
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Address of the instruction
    pub address: Address,
    /// Size of the instruction in bytes
    pub size: u8,
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    /// Raw bytes of the instruction (up to MAX_INSTRUCTION_SIZE)
    pub bytes: [u8; MAX_INSTRUCTION_SIZE],
    /// Operands in assembly order (destination first)
    pub operands: Vec<Operand>,
    /// C-like description of the instruction's effect
    pub pseudocode: String,
    /// Filler instructions that carry no meaning (SKIP)
    pub ignore: bool,
    pub flow: Flow,
    pub calls: Vec<ControlFlowRef>,
    pub jumps: Vec<ControlFlowRef>,
    pub xrefs: Vec<ControlFlowRef>,
}

impl Instruction {
    /// Returns the instruction bytes, up to the actual instruction size.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.size as usize]
    }

    /// First address past the instruction.
    pub fn end(&self) -> Address {
        self.address + self.size as Address
    }

    /// Operands joined in assembly syntax.
    pub fn operand_text(&self) -> String {
        self.operands
            .iter()
            .map(|op| op.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operands.is_empty() {
            write!(f, "{}", self.mnemonic)
        } else {
            write!(f, "{}\t{}", self.mnemonic, self.operand_text())
        }
    }
}

/// Decoder trait: turns a byte window into one instruction.
pub trait Decoder: Send + Sync {
    /// Decode a single instruction from the start of `window`.
    ///
    /// # Arguments
    /// * `window` - Bytes starting at `address`; never read past its end
    /// * `address` - Image address of `window[0]`
    fn decode(&self, window: &[u8], address: Address) -> Result<Instruction, decoder::DecodeError>;
}

/// Counters collected while a strategy runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Paths started from a seed
    pub paths: usize,
    /// Seeds queued after the initial entry points
    pub seeds_added: usize,
    pub decode_errors: usize,
    /// Paths that left the decode range or entered an ignored region
    pub out_of_range: usize,
    /// Decoded instructions refused because they overlapped visited bytes
    pub overlaps: usize,
    /// BR/EBR/TIJMP whose targets were left unresolved
    pub unresolved_jumps: usize,
}

/// Output of a strategy run.
#[derive(Debug, Clone)]
pub struct Disassembly {
    /// Instructions in discovery order
    pub instructions: Vec<Instruction>,
    pub xrefs: XrefTable,
    pub state: CrawlState,
    pub stats: CrawlStats,
}

impl Disassembly {
    /// Get the total number of instructions
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Look up the instruction starting at `address`.
    pub fn instruction_at(&self, address: Address) -> Option<&Instruction> {
        self.instructions.iter().find(|insn| insn.address == address)
    }
}

/// Error type for disassembly operations
#[derive(Debug, thiserror::Error)]
pub enum DisassemblyError {
    /// The image does not cover the decode range
    #[error("Image too short: need at least 0x{expected:X} bytes, got 0x{actual:X}")]
    ImageTooShort { expected: usize, actual: usize },

    /// Inconsistent configuration values
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Neither the reset address nor any vector lands inside the decode range
    #[error("No entry points resolvable inside 0x{start:06X}-0x{end:06X}")]
    NoEntryPoints { start: Address, end: Address },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error
    #[error("{0}")]
    Generic(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ret_at(address: Address) -> Instruction {
        Instruction {
            address,
            size: 1,
            mnemonic: Mnemonic::Ret,
            mode: AddressingMode::Implied,
            bytes: [0xF0, 0, 0, 0, 0, 0, 0],
            operands: Vec::new(),
            pseudocode: "return;".to_string(),
            ignore: false,
            flow: Flow::Return,
            calls: Vec::new(),
            jumps: Vec::new(),
            xrefs: Vec::new(),
        }
    }

    #[test]
    fn test_instruction_bytes_and_end() {
        let insn = ret_at(0x172080);
        assert_eq!(insn.bytes(), &[0xF0]);
        assert_eq!(insn.end(), 0x172081);
        assert_eq!(insn.to_string(), "RET");
    }

    #[test]
    fn test_operand_display() {
        let indexed = Operand::new(
            "src",
            OperandKind::Indexed { base: 0x1C, displacement: -4, long: false },
        );
        assert_eq!(indexed.to_string(), "-0x4[0x1C]");
        assert_eq!(indexed.type_tag(), "short-indexed");

        let auto = Operand::new("src", OperandKind::Indirect { pointer: 0x30, autoincrement: true });
        assert_eq!(auto.to_string(), "[0x30]+");
    }

    #[test]
    fn test_absolute_address_only_for_zero_base() {
        let absolute = Operand::new(
            "src",
            OperandKind::Indexed { base: 0, displacement: 0x1F5C, long: true },
        );
        assert_eq!(absolute.absolute_address(), Some(0x1F5C));

        let relative = Operand::new(
            "src",
            OperandKind::Indexed { base: 0x20, displacement: 0x1F5C, long: true },
        );
        assert_eq!(relative.absolute_address(), None);
    }

    #[test]
    fn test_flow_ends_path() {
        assert!(Flow::Return.ends_path());
        assert!(Flow::UnconditionalJump(0x10).ends_path());
        assert!(!Flow::ConditionalJump(0x10).ends_path());
        assert!(!Flow::Call(0x10).ends_path());
    }
}
