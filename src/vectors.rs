//! Interrupt and PTS vector table of the 8XC196EA

use std::fmt;

use crate::image::RawImage;
use crate::Address;

/// How the CPU services a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Ordinary interrupt routine entered through the interrupt controller
    InterruptController,
    /// Peripheral transaction server
    Pts,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::InterruptController => write!(f, "INT"),
            ServiceKind::Pts => write!(f, "PTS"),
        }
    }
}

/// One 16-bit vector slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptVector {
    pub vector_address: Address,
    pub source_name: &'static str,
    pub mnemonic: &'static str,
    pub service_kind: ServiceKind,
}

impl InterruptVector {
    pub const fn new(
        vector_address: Address,
        source_name: &'static str,
        mnemonic: &'static str,
        service_kind: ServiceKind,
    ) -> Self {
        Self { vector_address, source_name, mnemonic, service_kind }
    }
}

/// Where a crawl seed came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrigin {
    Reset,
    Vector(InterruptVector),
}

/// A crawl seed taken from the reset address or a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint {
    pub address: Address,
    pub origin: EntryOrigin,
}

impl EntryPoint {
    /// Banner label, e.g. `RESET_0x172080` or `INT_0x17304A`.
    pub fn label(&self) -> String {
        match self.origin {
            EntryOrigin::Reset => format!("RESET_0x{:06X}", self.address),
            EntryOrigin::Vector(vector) => match vector.service_kind {
                ServiceKind::InterruptController => format!("INT_0x{:06X}", self.address),
                ServiceKind::Pts => format!("PTS_0x{:06X}", self.address),
            },
        }
    }
}

static EA_VECTORS: &[InterruptVector] = &[
    InterruptVector::new(0x172000, "SIO0 Transmit", "TI0", ServiceKind::InterruptController),
    InterruptVector::new(0x172002, "SIO0 Receive", "RI0", ServiceKind::InterruptController),
    InterruptVector::new(0x172004, "EPA Channel 3-16 Overrun", "EPAx_OVR", ServiceKind::InterruptController),
    InterruptVector::new(0x172006, "A/D Conversion Complete", "AD_DONE", ServiceKind::InterruptController),
    InterruptVector::new(0x172008, "SIO1 Transmit", "TI1", ServiceKind::InterruptController),
    InterruptVector::new(0x17200A, "SIO1 Receive", "RI1", ServiceKind::InterruptController),
    InterruptVector::new(0x17200C, "EXTINT Pin", "EXTINT", ServiceKind::InterruptController),
    InterruptVector::new(0x17200E, "Serial Debug Unit Interrupt", "SDU", ServiceKind::InterruptController),
    InterruptVector::new(0x172010, "Software TRAP Instruction", "--", ServiceKind::InterruptController),
    InterruptVector::new(0x172012, "Unimplemented Opcode", "--", ServiceKind::InterruptController),
    InterruptVector::new(0x172014, "Dummy Standard Interrupt", "--", ServiceKind::InterruptController),
    InterruptVector::new(0x172016, "Dummy PTS Cycle", "--", ServiceKind::Pts),
    InterruptVector::new(0x172030, "SSIO Channel 0 Transfer", "SSIO0", ServiceKind::InterruptController),
    InterruptVector::new(0x172032, "SSIO Channel 1 Transfer", "SSIO1", ServiceKind::InterruptController),
    InterruptVector::new(0x17203C, "Stack Overflow Error", "Stack", ServiceKind::InterruptController),
    InterruptVector::new(0x17203E, "Nonmaskable Interrupt", "NMI", ServiceKind::InterruptController),
    InterruptVector::new(0x172040, "SIO0 Transmit", "TI0", ServiceKind::Pts),
    InterruptVector::new(0x172042, "SIO0 Receive", "RI0", ServiceKind::Pts),
    InterruptVector::new(0x172044, "EPA Channel 3-16 Overrun", "EPAx_OVR", ServiceKind::Pts),
    InterruptVector::new(0x172046, "A/D Conversion Complete", "AD_DONE", ServiceKind::Pts),
    InterruptVector::new(0x172048, "SIO1 Transmit", "TI1", ServiceKind::Pts),
    InterruptVector::new(0x17204A, "SIO1 Receive", "RI1", ServiceKind::Pts),
    InterruptVector::new(0x17204C, "EXTINT Pin", "EXTINT", ServiceKind::Pts),
    InterruptVector::new(0x17204E, "Serial Debug Unit Interrupt", "SDU", ServiceKind::Pts),
    InterruptVector::new(0x172050, "SSIO Channel 0 Transfer", "SSIO0", ServiceKind::Pts),
    InterruptVector::new(0x172052, "SSIO Channel 1 Transfer", "SSIO1", ServiceKind::Pts),
    InterruptVector::new(0x1720C0, "(PIH0) EPA Capture/Compare 0", "(PIH0) EPA0", ServiceKind::InterruptController),
    InterruptVector::new(0x1720C2, "(PIH0) EPA Capture/Compare 0", "(PIH0) EPA0", ServiceKind::Pts),
    InterruptVector::new(0x1720C4, "(PIH0) EPA Capture/Compare 1", "(PIH0) EPA1", ServiceKind::InterruptController),
    InterruptVector::new(0x1720C6, "(PIH0) EPA Capture/Compare 1", "(PIH0) EPA1", ServiceKind::Pts),
    InterruptVector::new(0x1720C8, "(PIH0) EPA Capture/Compare 2", "(PIH0) EPA2", ServiceKind::InterruptController),
    InterruptVector::new(0x1720CA, "(PIH0) EPA Capture/Compare 2", "(PIH0) EPA2", ServiceKind::Pts),
    InterruptVector::new(0x1720CC, "(PIH0) EPA Capture/Compare 3", "(PIH0) EPA3", ServiceKind::InterruptController),
    InterruptVector::new(0x1720CE, "(PIH0) EPA Capture/Compare 3", "(PIH0) EPA3", ServiceKind::Pts),
    InterruptVector::new(0x1720D0, "(PIH0) EPA Capture/Compare 4", "(PIH0) EPA4", ServiceKind::InterruptController),
    InterruptVector::new(0x1720D2, "(PIH0) EPA Capture/Compare 4", "(PIH0) EPA4", ServiceKind::Pts),
    InterruptVector::new(0x1720D4, "(PIH0) EPA Capture/Compare 5", "(PIH0) EPA5", ServiceKind::InterruptController),
    InterruptVector::new(0x1720D6, "(PIH0) EPA Capture/Compare 5", "(PIH0) EPA5", ServiceKind::Pts),
    InterruptVector::new(0x1720D8, "(PIH0) EPA Capture/Compare 6", "(PIH0) EPA6", ServiceKind::InterruptController),
    InterruptVector::new(0x1720DA, "(PIH0) EPA Capture/Compare 6", "(PIH0) EPA6", ServiceKind::Pts),
    InterruptVector::new(0x1720DC, "(PIH0) EPA Capture/Compare 7", "(PIH0) EPA7", ServiceKind::InterruptController),
    InterruptVector::new(0x1720DE, "(PIH0) EPA Capture/Compare 7", "(PIH0) EPA7", ServiceKind::Pts),
    InterruptVector::new(0x1720E0, "(PIH0) EPA Capture/Compare 8", "(PIH0) EPA8", ServiceKind::InterruptController),
    InterruptVector::new(0x1720E2, "(PIH0) EPA Capture/Compare 8", "(PIH0) EPA8", ServiceKind::Pts),
    InterruptVector::new(0x1720E4, "(PIH0) EPA Capture/Compare 9", "(PIH0) EPA9", ServiceKind::InterruptController),
    InterruptVector::new(0x1720E6, "(PIH0) EPA Capture/Compare 9", "(PIH0) EPA9", ServiceKind::Pts),
    InterruptVector::new(0x1720E8, "(PIH0) EPA Capture/Compare 10", "(PIH0) EPA10", ServiceKind::InterruptController),
    InterruptVector::new(0x1720EA, "(PIH0) EPA Capture/Compare 10", "(PIH0) EPA10", ServiceKind::Pts),
    InterruptVector::new(0x1720EC, "(PIH0) EPA Capture/Compare 11", "(PIH0) EPA11", ServiceKind::InterruptController),
    InterruptVector::new(0x1720EE, "(PIH0) EPA Capture/Compare 11", "(PIH0) EPA11", ServiceKind::Pts),
    InterruptVector::new(0x1720F0, "(PIH0) EPA Capture/Compare 12", "(PIH0) EPA12", ServiceKind::InterruptController),
    InterruptVector::new(0x1720F2, "(PIH0) EPA Capture/Compare 12", "(PIH0) EPA12", ServiceKind::Pts),
    InterruptVector::new(0x1720F4, "(PIH0) EPA Capture/Compare 13", "(PIH0) EPA13", ServiceKind::InterruptController),
    InterruptVector::new(0x1720F6, "(PIH0) EPA Capture/Compare 13", "(PIH0) EPA13", ServiceKind::Pts),
    InterruptVector::new(0x1720F8, "(PIH0) EPA Capture/Compare 14", "(PIH0) EPA14", ServiceKind::InterruptController),
    InterruptVector::new(0x1720FA, "(PIH0) EPA Capture/Compare 14", "(PIH0) EPA14", ServiceKind::Pts),
    InterruptVector::new(0x1720FC, "(PIH0) EPA Capture/Compare 15", "(PIH0) EPA15", ServiceKind::InterruptController),
    InterruptVector::new(0x1720FE, "(PIH0) EPA Capture/Compare 15", "(PIH0) EPA15", ServiceKind::Pts),
    InterruptVector::new(0x172100, "(PIH1) EPA2 Capture Overrun", "(PIH1) OVR2", ServiceKind::InterruptController),
    InterruptVector::new(0x172102, "(PIH1) EPA2 Capture Overrun", "(PIH1) OVR2", ServiceKind::Pts),
    InterruptVector::new(0x172104, "(PIH1) EPA1 Capture Overrun", "(PIH1) OVR1", ServiceKind::InterruptController),
    InterruptVector::new(0x172106, "(PIH1) EPA1 Capture Overrun", "(PIH1) OVR1", ServiceKind::Pts),
    InterruptVector::new(0x172108, "(PIH1) EPA0 Capture Overrun", "(PIH1) OVR0", ServiceKind::InterruptController),
    InterruptVector::new(0x17210A, "(PIH1) EPA0 Capture Overrun", "(PIH1) OVR0", ServiceKind::Pts),
    InterruptVector::new(0x17210C, "(PIH1) Timer 4 Overflow/Underflow", "(PIH1) OVRTM4", ServiceKind::InterruptController),
    InterruptVector::new(0x17210E, "(PIH1) Timer 4 Overflow/Underflow", "(PIH1) OVRTM4", ServiceKind::Pts),
    InterruptVector::new(0x172110, "(PIH1) Timer 3 Overflow/Underflow", "(PIH1) OVRTM3", ServiceKind::InterruptController),
    InterruptVector::new(0x172112, "(PIH1) Timer 3 Overflow/Underflow", "(PIH1) OVRTM3", ServiceKind::Pts),
    InterruptVector::new(0x172114, "(PIH1) Timer 2 Overflow/Underflow", "(PIH1) OVRTM2", ServiceKind::InterruptController),
    InterruptVector::new(0x172116, "(PIH1) Timer 2 Overflow/Underflow", "(PIH1) OVRTM2", ServiceKind::Pts),
    InterruptVector::new(0x172118, "(PIH1) Timer 1 Overflow/Underflow", "(PIH1) OVRTM1", ServiceKind::InterruptController),
    InterruptVector::new(0x17211A, "(PIH1) Timer 1 Overflow/Underflow", "(PIH1) OVRTM1", ServiceKind::Pts),
    InterruptVector::new(0x17211C, "(PIH1) Output Simulcapture 0", "(PIH1) OS0", ServiceKind::InterruptController),
    InterruptVector::new(0x17211E, "(PIH1) Output Simulcapture 0", "(PIH1) OS0", ServiceKind::Pts),
    InterruptVector::new(0x172120, "(PIH1) Output Simulcapture 1", "(PIH1) OS1", ServiceKind::InterruptController),
    InterruptVector::new(0x172122, "(PIH1) Output Simulcapture 1", "(PIH1) OS1", ServiceKind::Pts),
    InterruptVector::new(0x172124, "(PIH1) Output Simulcapture 2", "(PIH1) OS2", ServiceKind::InterruptController),
    InterruptVector::new(0x172126, "(PIH1) Output Simulcapture 2", "(PIH1) OS2", ServiceKind::Pts),
    InterruptVector::new(0x172128, "(PIH1) Output Simulcapture 3", "(PIH1) OS3", ServiceKind::InterruptController),
    InterruptVector::new(0x17212A, "(PIH1) Output Simulcapture 3", "(PIH1) OS3", ServiceKind::Pts),
    InterruptVector::new(0x17212C, "(PIH1) Output Simulcapture 4", "(PIH1) OS4", ServiceKind::InterruptController),
    InterruptVector::new(0x17212E, "(PIH1) Output Simulcapture 4", "(PIH1) OS4", ServiceKind::Pts),
    InterruptVector::new(0x172130, "(PIH1) Output Simulcapture 5", "(PIH1) OS5", ServiceKind::InterruptController),
    InterruptVector::new(0x172132, "(PIH1) Output Simulcapture 5", "(PIH1) OS5", ServiceKind::Pts),
    InterruptVector::new(0x172134, "(PIH1) Output Simulcapture 6", "(PIH1) OS6", ServiceKind::InterruptController),
    InterruptVector::new(0x172136, "(PIH1) Output Simulcapture 6", "(PIH1) OS6", ServiceKind::Pts),
    InterruptVector::new(0x172138, "(PIH1) Output Simulcapture 7", "(PIH1) OS7", ServiceKind::InterruptController),
    InterruptVector::new(0x17213A, "(PIH1) Output Simulcapture 7", "(PIH1) OS7", ServiceKind::Pts),
    InterruptVector::new(0x17213C, "(PIH1) EPA Capture/Compare 16", "(PIH1) EPA16", ServiceKind::InterruptController),
    InterruptVector::new(0x17213E, "(PIH1) EPA Capture/Compare 16", "(PIH1) EPA16", ServiceKind::Pts),
];

/// Vector slots ordered by address.
#[derive(Debug, Clone)]
pub struct VectorTable {
    vectors: Vec<InterruptVector>,
}

impl Default for VectorTable {
    /// The 8XC196EA interrupt and PTS vectors.
    fn default() -> Self {
        Self { vectors: EA_VECTORS.to_vec() }
    }
}

impl VectorTable {
    pub fn new(mut vectors: Vec<InterruptVector>) -> Self {
        vectors.sort_by_key(|vector| vector.vector_address);
        Self { vectors }
    }

    /// A table without vectors; only the reset address seeds a crawl.
    pub fn empty() -> Self {
        Self { vectors: Vec::new() }
    }

    pub fn vectors(&self) -> &[InterruptVector] {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The vector whose two-byte slot covers `address`.
    pub fn slot_containing(&self, address: Address) -> Option<&InterruptVector> {
        self.vectors
            .iter()
            .find(|vector| vector.vector_address <= address && address < vector.vector_address + 2)
    }

    /// Service routine entry: `base` plus the little-endian word stored at
    /// `vector_address`. `None` if the slot lies outside the image.
    pub fn entry_point(image: &RawImage, vector_address: Address, base: Address) -> Option<Address> {
        image
            .read_word_le(vector_address)
            .map(|word| base.wrapping_add(word as Address) & 0xFF_FFFF)
    }
}
