//! Memory map of the 8XC196EA
//!
//! The crawler consults it to stop at regions that merely mirror other memory;
//! the renderer uses it for region banners and gap partitioning.

use serde::Serialize;

use crate::Address;

/// A named address range; `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    pub name: &'static str,
    pub description: &'static str,
    pub start: Address,
    pub end: Address,
    /// Skipped by every address walk (mirrors of memory mapped elsewhere)
    pub ignore: bool,
}

impl MemoryRegion {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        start: Address,
        end: Address,
        ignore: bool,
    ) -> Self {
        Self { name, description, start, end, ignore }
    }

    pub fn contains(&self, address: Address) -> bool {
        self.start <= address && address <= self.end
    }

    /// Number of bytes covered by the region.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }
}

static EA_REGIONS: &[MemoryRegion] = &[
    MemoryRegion::new("Lower register file", "Lower register file (stack pointer and CPU SFRs)", 0x000000, 0x000019, false),
    MemoryRegion::new("Lower register file", "Lower register file (general-purpose register RAM)", 0x00001A, 0x0000FF, false),
    MemoryRegion::new("Upper register file", "Upper register file (general-purpose register RAM)", 0x000100, 0x0003FF, false),
    MemoryRegion::new("Internal code/data RAM", "Internal code/data RAM (identically mapped into page FFH)", 0x000400, 0x000FFF, false),
    MemoryRegion::new("External device", "External device (memory or I/O) connected to address/data bus", 0x001000, 0x001BFF, false),
    MemoryRegion::new("Peripheral special-function registers (SFRs)", "Peripheral special-function registers (SFRs)", 0x001C00, 0x001FDF, false),
    MemoryRegion::new("Memory-mapped special-function registers (SFRs)", "Memory-mapped special-function registers (SFRs)", 0x001FE0, 0x001FFB, false),
    MemoryRegion::new("Memory-mapped special-function registers (SFRs)", "Memory-mapped special-function registers (SFRs); External memory if EA# is low; internal ROM if EA# is high.", 0x001FFC, 0x001FFF, false),
    MemoryRegion::new("External device", "External device (memory or I/O) connected to address/data bus", 0x002000, 0x0023FF, false),
    MemoryRegion::new("Internal ROM or External Memory", "A copy of internal ROM (FF2400-FF3FFFH) if CCB1.2=0 External memory if CCB1.2=1", 0x002400, 0x003FFF, false),
    MemoryRegion::new("External device", "External device (memory or I/O) connected to address/data bus", 0x004000, 0x0FFFFF, false),
    MemoryRegion::new("Overlaid memory", "Overlaid memory (reserved for future microcontrollers); locations xF0000-xF03FFH are reserved for in-circuit emulators", 0x100000, 0x16FFFF, false),
    MemoryRegion::new("Reserved", "Reserved for in-circuit emulators", 0x170000, 0x1703FF, false),
    MemoryRegion::new("Internal code/data RAM", "Internal code/data RAM (identically mapped from page 00H)", 0x170400, 0x170FFF, true),
    MemoryRegion::new("External device", "External device (memory or I/O) connected to address/data bus", 0x171000, 0x171FFF, false),
    MemoryRegion::new("Special-purpose memory", "Special-purpose memory (CCBs, interrupt vectors, PTS vectors)", 0x172000, 0x17207F, false),
    MemoryRegion::new("Program Start", "After reset, the first instruction is fetched from 0x172080.", 0x172080, 0x1720BF, false),
    MemoryRegion::new("Special-purpose memory", "Special-purpose memory (PIH vectors)", 0x1720C0, 0x17213F, false),
    MemoryRegion::new("Program memory", "Program memory", 0x172140, 0x1723FF, false),
    MemoryRegion::new("Program memory", "Program memory; can be mapped into page 00H (CCB1.2 = 1)", 0x172400, 0x173FFF, false),
    MemoryRegion::new("External device", "External device (memory or I/O) connected to address/data bus", 0x174000, 0x17FFFF, false),
];

/// Ordered, non-overlapping set of memory regions.
#[derive(Debug, Clone)]
pub struct MemoryMap {
    regions: Vec<MemoryRegion>,
}

impl Default for MemoryMap {
    /// The 8XC196EA map.
    fn default() -> Self {
        Self { regions: EA_REGIONS.to_vec() }
    }
}

impl MemoryMap {
    /// Builds a map from arbitrary regions, sorted by start address.
    pub fn new(mut regions: Vec<MemoryRegion>) -> Self {
        regions.sort_by_key(|region| region.start);
        Self { regions }
    }

    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    pub fn region_containing(&self, address: Address) -> Option<&MemoryRegion> {
        let idx = self.regions.partition_point(|region| region.end < address);
        self.regions.get(idx).filter(|region| region.contains(address))
    }

    pub fn is_ignored(&self, address: Address) -> bool {
        self.region_containing(address).is_some_and(|region| region.ignore)
    }

    /// True when any ignored region intersects `[start, end)`.
    pub fn overlaps_ignored(&self, start: Address, end: Address) -> bool {
        self.regions_within(start, end).any(|region| region.ignore)
    }

    /// Regions overlapping `[start, end)`.
    pub fn regions_within(&self, start: Address, end: Address) -> impl Iterator<Item = &MemoryRegion> {
        self.regions
            .iter()
            .filter(move |region| region.start < end && region.end >= start)
    }
}
