//! Read-only view of a finished disassembly, prepared for rendering
//!
//! Building a listing is the only place an instruction is edited after
//! decoding: a comparison followed directly by a condition-code branch gets the
//! branch's relational operator in its pseudocode.

use std::collections::BTreeSet;

use crate::config::CrawlConfig;
use crate::image::RawImage;
use crate::memory_map::MemoryMap;
use crate::vectors::VectorTable;
use crate::xref::XrefTable;
use crate::{Address, CrawlStats, Disassembly, Instruction};

/// Why a span of the decode range holds no instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
    /// Never reached by the strategy
    Uncrawled,
    /// Inside an ignored memory region
    Ignored,
}

/// A byte span `[start, end)` without instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub start: Address,
    pub end: Address,
    pub kind: GapKind,
}

impl Gap {
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One piece of the decode-range partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Index into `Listing::instructions`
    Instruction(usize),
    Gap(Gap),
}

/// Everything a formatter needs, in address order.
pub struct Listing<'a> {
    /// Sorted by address, comparison operators rewritten
    pub instructions: Vec<Instruction>,
    /// Instructions and gaps covering the whole decode range
    pub entries: Vec<Entry>,
    pub xrefs: &'a XrefTable,
    pub stats: CrawlStats,
    pub image: &'a RawImage,
    pub config: &'a CrawlConfig,
    pub memory_map: &'a MemoryMap,
    pub vectors: &'a VectorTable,
}

impl<'a> Listing<'a> {
    pub fn new(
        disassembly: &'a Disassembly,
        image: &'a RawImage,
        config: &'a CrawlConfig,
        memory_map: &'a MemoryMap,
        vectors: &'a VectorTable,
    ) -> Self {
        let mut instructions = disassembly.instructions.clone();
        instructions.sort_by_key(|insn| insn.address);
        rewrite_comparisons(&mut instructions);

        let boundaries = gap_boundaries(config, memory_map, vectors);
        let entries = partition(&instructions, config, memory_map, &boundaries);

        Self {
            instructions,
            entries,
            xrefs: &disassembly.xrefs,
            stats: disassembly.stats,
            image,
            config,
            memory_map,
            vectors,
        }
    }

    pub fn gaps(&self) -> impl Iterator<Item = &Gap> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Gap(gap) => Some(gap),
            Entry::Instruction(_) => None,
        })
    }

    /// Bytes never crawled, ignored regions excluded.
    pub fn uncrawled_bytes(&self) -> usize {
        self.gaps()
            .filter(|gap| gap.kind == GapKind::Uncrawled)
            .map(Gap::len)
            .sum()
    }

    /// Instructions that carry meaning (SKIP filler excluded).
    pub fn decoded_count(&self) -> usize {
        self.instructions.iter().filter(|insn| !insn.ignore).count()
    }
}

/// Applies the relational operator of a directly following branch to each comparison.
fn rewrite_comparisons(instructions: &mut [Instruction]) {
    for idx in 1..instructions.len() {
        let (head, tail) = instructions.split_at_mut(idx);
        let (compare, branch) = (&mut head[idx - 1], &tail[0]);
        if !compare.mnemonic.is_comparison() || branch.address != compare.end() {
            continue;
        }
        if let Some(operator) = branch.mnemonic.branch_operator() {
            compare.pseudocode = compare.pseudocode.replacen("==", operator, 1);
        }
    }
}

/// Addresses where an uncrawled gap must be split.
fn gap_boundaries(config: &CrawlConfig, memory_map: &MemoryMap, vectors: &VectorTable) -> BTreeSet<Address> {
    let mut boundaries = BTreeSet::new();
    for region in memory_map.regions_within(config.decode_start, config.decode_end) {
        boundaries.insert(region.start);
        boundaries.insert(region.end + 1);
    }
    for vector in vectors.vectors() {
        boundaries.insert(vector.vector_address);
        boundaries.insert(vector.vector_address + 2);
    }
    boundaries
}

fn partition(
    instructions: &[Instruction],
    config: &CrawlConfig,
    memory_map: &MemoryMap,
    boundaries: &BTreeSet<Address>,
) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(instructions.len() * 2);
    let mut cursor = config.decode_start;

    for (idx, insn) in instructions.iter().enumerate() {
        if insn.address > cursor {
            push_gaps(&mut entries, cursor, insn.address, memory_map, boundaries);
        }
        entries.push(Entry::Instruction(idx));
        cursor = cursor.max(insn.end());
    }
    if cursor < config.decode_end {
        push_gaps(&mut entries, cursor, config.decode_end, memory_map, boundaries);
    }
    entries
}

fn push_gaps(
    entries: &mut Vec<Entry>,
    start: Address,
    end: Address,
    memory_map: &MemoryMap,
    boundaries: &BTreeSet<Address>,
) {
    let mut piece_start = start;
    let splits = boundaries.range(start + 1..end).copied().chain(std::iter::once(end));
    for split in splits {
        let kind = if memory_map.is_ignored(piece_start) {
            GapKind::Ignored
        } else {
            GapKind::Uncrawled
        };
        entries.push(Entry::Gap(Gap { start: piece_start, end: split, kind }));
        piece_start = split;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Mcs96Decoder;
    use crate::memory_map::MemoryRegion;
    use crate::state::CrawlState;
    use crate::vectors::{InterruptVector, ServiceKind};
    use crate::Decoder;

    fn config() -> CrawlConfig {
        CrawlConfig { decode_start: 0x100, decode_end: 0x120, ..CrawlConfig::default() }
    }

    fn disassembly(code: &[(Address, &[u8])]) -> Disassembly {
        let decoder = Mcs96Decoder::new();
        let instructions = code
            .iter()
            .map(|(address, bytes)| decoder.decode(bytes, *address).unwrap())
            .collect();
        Disassembly {
            instructions,
            xrefs: XrefTable::new(),
            state: CrawlState::new(0x100, 0x120),
            stats: CrawlStats::default(),
        }
    }

    #[test]
    fn test_comparison_rewritten_from_following_branch() {
        // CMP R1C, R20; JNE; then CMP not followed by a branch
        let disassembly = disassembly(&[
            (0x100, &[0x88, 0x20, 0x1C]),
            (0x103, &[0xD7, 0x10]),
            (0x105, &[0x88, 0x20, 0x1C]),
            (0x108, &[0xF0]),
        ]);
        let image = RawImage::from_bytes(vec![0; 0x120]);
        let config = config();
        let map = MemoryMap::new(Vec::new());
        let vectors = VectorTable::empty();
        let listing = Listing::new(&disassembly, &image, &config, &map, &vectors);

        assert_eq!(listing.instructions[0].pseudocode, "if (R1C != R20)");
        assert_eq!(listing.instructions[2].pseudocode, "if (R1C == R20)");
        // Source disassembly is untouched
        assert_eq!(disassembly.instructions[0].pseudocode, "if (R1C == R20)");
    }

    #[test]
    fn test_partition_covers_range() {
        let disassembly = disassembly(&[(0x108, &[0xF0]), (0x104, &[0xFD])]);
        let image = RawImage::from_bytes(vec![0; 0x120]);
        let config = config();
        let map = MemoryMap::new(vec![MemoryRegion::new("Mirror", "Mirror", 0x110, 0x117, true)]);
        let vectors = VectorTable::new(vec![InterruptVector::new(0x11A, "Test", "T", ServiceKind::Pts)]);
        let listing = Listing::new(&disassembly, &image, &config, &map, &vectors);

        let mut covered = 0;
        let mut cursor = 0x100;
        for entry in &listing.entries {
            let (start, end) = match entry {
                Entry::Instruction(idx) => {
                    let insn = &listing.instructions[*idx];
                    (insn.address, insn.end())
                }
                Entry::Gap(gap) => (gap.start, gap.end),
            };
            assert_eq!(start, cursor);
            covered += (end - start) as usize;
            cursor = end;
        }
        assert_eq!(covered, 0x20);

        let gaps: Vec<_> = listing.gaps().map(|g| (g.start, g.end, g.kind)).collect();
        assert_eq!(
            gaps,
            [
                (0x100, 0x104, GapKind::Uncrawled),
                (0x105, 0x108, GapKind::Uncrawled),
                (0x109, 0x110, GapKind::Uncrawled),
                (0x110, 0x118, GapKind::Ignored),
                (0x118, 0x11A, GapKind::Uncrawled),
                (0x11A, 0x11C, GapKind::Uncrawled),
                (0x11C, 0x120, GapKind::Uncrawled),
            ]
        );
        assert_eq!(listing.uncrawled_bytes(), 0x20 - 2 - 8);
    }
}
