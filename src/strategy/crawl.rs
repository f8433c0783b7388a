//! Control-flow crawl
//!
//! Simulates program-counter movement from every entry point without
//! executing anything. One path is followed at a time; branch and call
//! targets discovered on the way are queued as new seeds.
//!
//! The crawler is an explicit state machine: `step` performs exactly one
//! transition so each rule can be exercised on its own.

use std::collections::VecDeque;

use super::Context;
use crate::state::{CrawlState, Status};
use crate::xref::XrefTable;
use crate::{Address, CrawlStats, Disassembly, DisassemblyError, Flow, Instruction};

/// Why a path stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Return,
    Reset,
    /// BR, EBR or TIJMP
    IndirectJump,
    /// Left the decode range or entered an ignored region
    OutOfRange,
    AlreadyVisited,
    DecodeError,
    /// Decoded bytes would overlap an instruction already crawled
    Overlap,
}

/// Crawler state between two transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Decoding(Address),
    PathTerminated(Termination),
    SelectingNextSeed,
    Done,
}

/// Seed queues, popped in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedTier {
    Branch,
    Call,
    Entry,
    Fallback,
}

const TIERS: [SeedTier; 4] = [SeedTier::Branch, SeedTier::Call, SeedTier::Entry, SeedTier::Fallback];

/// Four FIFO queues with strict priority between them.
#[derive(Debug, Default)]
pub struct SeedQueue {
    queues: [VecDeque<Address>; 4],
}

impl SeedQueue {
    pub fn push(&mut self, tier: SeedTier, address: Address) {
        self.queues[tier as usize].push_back(address);
    }

    pub fn pop(&mut self) -> Option<(SeedTier, Address)> {
        TIERS
            .iter()
            .find_map(|tier| self.queues[*tier as usize].pop_front().map(|a| (*tier, a)))
    }

    pub fn len(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }
}

/// Single-threaded control-flow crawler.
pub struct Crawler<'a> {
    ctx: Context<'a>,
    state: CrawlState,
    xrefs: XrefTable,
    instructions: Vec<Instruction>,
    stats: CrawlStats,
    seeds: SeedQueue,
}

impl<'a> Crawler<'a> {
    /// Queues every entry point in the entry tier and records it for banners.
    pub fn new(ctx: Context<'a>) -> Self {
        let mut seeds = SeedQueue::default();
        let mut xrefs = XrefTable::new();
        for entry in ctx.entry_points {
            seeds.push(SeedTier::Entry, entry.address);
            xrefs.add_entry_point(*entry);
        }

        Self {
            state: CrawlState::new(ctx.config.decode_start, ctx.config.decode_end),
            ctx,
            xrefs,
            instructions: Vec::new(),
            stats: CrawlStats::default(),
            seeds,
        }
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn pending_seeds(&self) -> usize {
        self.seeds.len()
    }

    /// Performs one transition.
    pub fn step(&mut self, step: Step) -> Step {
        match step {
            Step::SelectingNextSeed => self.select_next_seed(),
            Step::Decoding(pc) => self.decode_at(pc),
            Step::PathTerminated(reason) => {
                log::trace!("Path terminated: {:?}", reason);
                Step::SelectingNextSeed
            }
            Step::Done => Step::Done,
        }
    }

    /// Steps until every seed is exhausted.
    pub fn run(mut self) -> Disassembly {
        let mut step = Step::SelectingNextSeed;
        while step != Step::Done {
            step = self.step(step);
        }
        self.finish()
    }

    pub fn finish(self) -> Disassembly {
        Disassembly {
            instructions: self.instructions,
            xrefs: self.xrefs,
            state: self.state,
            stats: self.stats,
        }
    }

    fn select_next_seed(&mut self) -> Step {
        while let Some((tier, pc)) = self.seeds.pop() {
            if matches!(self.state.status(pc), Some(Status::Visited | Status::DecodeError)) {
                continue;
            }
            log::debug!("Starting path at 0x{:06X} ({:?} seed)", pc, tier);
            self.stats.paths += 1;
            return Step::Decoding(pc);
        }
        Step::Done
    }

    fn queue(&mut self, tier: SeedTier, address: Address) {
        self.seeds.push(tier, address);
        self.stats.seeds_added += 1;
    }

    fn decode_at(&mut self, pc: Address) -> Step {
        let config = self.ctx.config;
        if !config.in_decode_range(pc) || self.ctx.memory_map.is_ignored(pc) {
            log::debug!("Path left the decode range at 0x{:06X}", pc);
            self.stats.out_of_range += 1;
            return Step::PathTerminated(Termination::OutOfRange);
        }
        if matches!(self.state.status(pc), Some(Status::Visited | Status::DecodeError)) {
            return Step::PathTerminated(Termination::AlreadyVisited);
        }

        let window = self.ctx.image.window(pc, config.decode_end);
        let insn = match self.ctx.decoder.decode(window, pc) {
            Ok(insn) => insn,
            Err(err) => {
                log::debug!("Decode error: {}", err);
                self.state.mark_error(pc);
                self.stats.decode_errors += 1;
                return Step::PathTerminated(Termination::DecodeError);
            }
        };

        let size = insn.size as usize;
        if !self.state.span_is_free(pc, size) || self.ctx.memory_map.overlaps_ignored(pc, insn.end()) {
            log::debug!("Refusing {} at 0x{:06X}: overlaps crawled bytes", insn.mnemonic, pc);
            self.stats.overlaps += 1;
            return Step::PathTerminated(Termination::Overlap);
        }
        self.state.mark_visited(pc, size);
        self.xrefs.record(&insn);

        let next = insn.end();
        let flow = insn.flow;
        self.instructions.push(insn);

        match flow {
            Flow::Fallthrough => Step::Decoding(next),
            Flow::ConditionalJump(target) => {
                self.queue(SeedTier::Branch, target);
                Step::Decoding(next)
            }
            Flow::Call(target) => {
                self.queue(SeedTier::Call, target);
                Step::Decoding(next)
            }
            Flow::UnconditionalJump(target) => Step::Decoding(target),
            Flow::Return => {
                self.queue_fallback(next);
                Step::PathTerminated(Termination::Return)
            }
            Flow::Reset => {
                self.queue_fallback(next);
                Step::PathTerminated(Termination::Reset)
            }
            Flow::IndirectJump => {
                self.stats.unresolved_jumps += 1;
                self.queue_fallback(next);
                Step::PathTerminated(Termination::IndirectJump)
            }
        }
    }

    fn queue_fallback(&mut self, address: Address) {
        if self.ctx.config.fallback_seeding {
            self.queue(SeedTier::Fallback, address);
        }
    }
}

/// Crawl from every entry point in the context.
pub fn run(ctx: &Context<'_>) -> Result<Disassembly, DisassemblyError> {
    log::debug!(
        "Starting control-flow crawl of 0x{:06X}-0x{:06X} from {} entry points",
        ctx.config.decode_start,
        ctx.config.decode_end,
        ctx.entry_points.len()
    );

    let disassembly = Crawler::new(*ctx).run();

    log::info!(
        "Crawl complete: {} instructions over {} paths, {} decode errors, {} unresolved indirect jumps",
        disassembly.instructions.len(),
        disassembly.stats.paths,
        disassembly.stats.decode_errors,
        disassembly.stats.unresolved_jumps
    );

    Ok(disassembly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use crate::decoder::Mcs96Decoder;
    use crate::image::RawImage;
    use crate::memory_map::{MemoryMap, MemoryRegion};
    use crate::vectors::{EntryOrigin, EntryPoint};

    const START: Address = 0x1000;

    fn config(fallback_seeding: bool) -> CrawlConfig {
        CrawlConfig {
            decode_start: START,
            decode_end: START + 0x100,
            reset_address: START,
            vector_base: 0,
            fallback_seeding,
            gap_dump_limit: 16,
        }
    }

    fn build_image(code: &[(Address, &[u8])]) -> RawImage {
        let mut bytes = vec![0xEEu8; (START + 0x100) as usize];
        for (address, chunk) in code {
            let at = *address as usize;
            bytes[at..at + chunk.len()].copy_from_slice(chunk);
        }
        RawImage::from_bytes(bytes)
    }

    fn reset() -> [EntryPoint; 1] {
        [EntryPoint { address: START, origin: EntryOrigin::Reset }]
    }

    fn with_crawler<R>(
        image: &RawImage,
        config: &CrawlConfig,
        map: &MemoryMap,
        f: impl FnOnce(Crawler<'_>) -> R,
    ) -> R {
        let entries = reset();
        let decoder = Mcs96Decoder::new();
        let ctx = Context {
            image,
            decoder: &decoder,
            config,
            memory_map: map,
            entry_points: &entries,
        };
        f(Crawler::new(ctx))
    }

    #[test]
    fn test_seed_queue_priority() {
        let mut queue = SeedQueue::default();
        queue.push(SeedTier::Fallback, 4);
        queue.push(SeedTier::Entry, 3);
        queue.push(SeedTier::Call, 2);
        queue.push(SeedTier::Branch, 1);
        queue.push(SeedTier::Branch, 5);
        let order: Vec<_> = std::iter::from_fn(|| queue.pop()).map(|(_, a)| a).collect();
        assert_eq!(order, [1, 5, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_single_steps() {
        // NOP; RET
        let image = build_image(&[(START, &[0xFD, 0xF0])]);
        let config = config(false);
        let map = MemoryMap::new(Vec::new());
        with_crawler(&image, &config, &map, |mut crawler| {
            let step = crawler.step(Step::SelectingNextSeed);
            assert_eq!(step, Step::Decoding(START));
            let step = crawler.step(step);
            assert_eq!(step, Step::Decoding(START + 1));
            let step = crawler.step(step);
            assert_eq!(step, Step::PathTerminated(Termination::Return));
            let step = crawler.step(step);
            assert_eq!(step, Step::SelectingNextSeed);
            assert_eq!(crawler.step(step), Step::Done);
            assert_eq!(crawler.instructions().len(), 2);
            assert_eq!(crawler.state().visited_count(), 2);
        });
    }

    #[test]
    fn test_visited_pc_terminates() {
        let image = build_image(&[(START, &[0xF0])]);
        let config = config(false);
        let map = MemoryMap::new(Vec::new());
        with_crawler(&image, &config, &map, |mut crawler| {
            crawler.step(Step::Decoding(START));
            assert_eq!(
                crawler.step(Step::Decoding(START)),
                Step::PathTerminated(Termination::AlreadyVisited)
            );
        });
    }

    #[test]
    fn test_out_of_range_and_ignored() {
        let image = build_image(&[]);
        let config = config(false);
        let map = MemoryMap::new(vec![MemoryRegion::new("Mirror", "Mirror", START + 0x80, START + 0x8F, true)]);
        with_crawler(&image, &config, &map, |mut crawler| {
            assert_eq!(
                crawler.step(Step::Decoding(START - 1)),
                Step::PathTerminated(Termination::OutOfRange)
            );
            assert_eq!(
                crawler.step(Step::Decoding(START + 0x85)),
                Step::PathTerminated(Termination::OutOfRange)
            );
            assert_eq!(crawler.stats().out_of_range, 2);
            assert_eq!(crawler.stats().decode_errors, 0);
        });
    }

    #[test]
    fn test_decode_error_marks_state() {
        // 0xEE is unassigned
        let image = build_image(&[]);
        let config = config(false);
        let map = MemoryMap::new(Vec::new());
        with_crawler(&image, &config, &map, |mut crawler| {
            assert_eq!(
                crawler.step(Step::Decoding(START)),
                Step::PathTerminated(Termination::DecodeError)
            );
            assert_eq!(crawler.state().status(START), Some(Status::DecodeError));
            assert_eq!(crawler.stats().decode_errors, 1);
        });
    }

    #[test]
    fn test_overlap_refused() {
        // LJMP at START+2 spans START+2..START+5
        let image = build_image(&[(START + 2, &[0xE7, 0xFD, 0xF0])]);
        let config = config(false);
        let map = MemoryMap::new(Vec::new());
        with_crawler(&image, &config, &map, |mut crawler| {
            crawler.step(Step::Decoding(START + 2));
            assert_eq!(
                crawler.step(Step::Decoding(START + 3)),
                Step::PathTerminated(Termination::AlreadyVisited)
            );
        });

        let image = build_image(&[(START, &[0x01, 0xF0, 0xF0])]);
        with_crawler(&image, &config, &map, |mut crawler| {
            crawler.step(Step::Decoding(START + 1));
            // CLR 0xF0 at START needs START+1, already part of a RET
            assert_eq!(
                crawler.step(Step::Decoding(START)),
                Step::PathTerminated(Termination::Overlap)
            );
            assert_eq!(crawler.stats().overlaps, 1);
        });

        // LCALL whose operand bytes reach into a mirror
        let image = build_image(&[(START + 0x0F, &[0xEF, 0x00, 0x00])]);
        let map = MemoryMap::new(vec![MemoryRegion::new("Mirror", "Mirror", START + 0x10, START + 0x1F, true)]);
        with_crawler(&image, &config, &map, |mut crawler| {
            assert_eq!(
                crawler.step(Step::Decoding(START + 0x0F)),
                Step::PathTerminated(Termination::Overlap)
            );
            assert!(crawler.instructions().is_empty());
        });

        // LJMP over a single ignored byte in its operand
        let image = build_image(&[(START, &[0xE7, 0xFD, 0xFF])]);
        let map = MemoryMap::new(vec![MemoryRegion::new("Hole", "One-byte mirror", START + 1, START + 1, true)]);
        let disassembly = with_crawler(&image, &config, &map, |crawler| crawler.run());
        assert!(disassembly.instructions.is_empty());
        assert_eq!(disassembly.stats.overlaps, 1);
        assert!(!disassembly.state.is_visited(START + 1));
    }

    #[test]
    fn test_targets_are_queued_by_tier() {
        // JE +3; LCALL +0x10; RET
        let image = build_image(&[(START, &[0xDF, 0x03, 0xEF, 0x10, 0x00, 0xF0])]);
        let config = config(false);
        let map = MemoryMap::new(Vec::new());
        with_crawler(&image, &config, &map, |mut crawler| {
            crawler.step(Step::Decoding(START));
            crawler.step(Step::Decoding(START + 2));
            assert_eq!(crawler.stats().seeds_added, 2);
            // Entry (reset) seed is pending too, but the branch target wins
            assert_eq!(crawler.pending_seeds(), 3);
            let step = crawler.step(Step::SelectingNextSeed);
            assert_eq!(step, Step::Decoding(START + 5));
            assert_eq!(crawler.pending_seeds(), 2);
        });
    }

    #[test]
    fn test_indirect_jump_is_unresolved() {
        let image = build_image(&[(START, &[0xE3, 0x20, 0xFD, 0xF0])]);
        let config = config(false);
        let map = MemoryMap::new(Vec::new());
        let disassembly = with_crawler(&image, &config, &map, |crawler| crawler.run());
        assert_eq!(disassembly.instructions.len(), 1);
        assert_eq!(disassembly.stats.unresolved_jumps, 1);
    }

    #[test]
    fn test_fallback_seeding() {
        // RET followed by NOP; RET that nothing references
        let image = build_image(&[(START, &[0xF0, 0xFD, 0xF0])]);
        let map = MemoryMap::new(Vec::new());

        let off = with_crawler(&image, &config(false), &map, |crawler| crawler.run());
        assert_eq!(off.instructions.len(), 1);

        let on = with_crawler(&image, &config(true), &map, |crawler| crawler.run());
        assert_eq!(on.instructions.len(), 3);
    }
}
