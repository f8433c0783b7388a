//! Linear-sweep disassembly with parallel processing
//!
//! Decodes every address of the decode range in order, skipping ignored
//! regions. Each contiguous non-ignored span is swept on its own rayon task;
//! spans are independent because a sweep never crosses an ignored region.

use std::time::Instant;

use rayon::prelude::*;

use super::Context;
use crate::state::CrawlState;
use crate::xref::XrefTable;
use crate::{Address, CrawlStats, Disassembly, DisassemblyError, Flow, Instruction};

/// Instructions and failing addresses of one swept span.
struct SpanResult {
    instructions: Vec<Instruction>,
    errors: Vec<Address>,
}

/// Linear sweep over every non-ignored span of the decode range.
pub fn run(ctx: &Context<'_>) -> Result<Disassembly, DisassemblyError> {
    let config = ctx.config;
    let spans = sweep_spans(ctx);
    log::debug!(
        "Starting linear sweep of 0x{:06X}-0x{:06X} in {} spans",
        config.decode_start,
        config.decode_end,
        spans.len()
    );
    let start_time = Instant::now();

    let results: Vec<SpanResult> = spans
        .par_iter()
        .map(|&(start, end)| sweep(ctx, start, end))
        .collect();

    let mut state = CrawlState::new(config.decode_start, config.decode_end);
    let mut xrefs = XrefTable::new();
    let mut stats = CrawlStats { paths: spans.len(), ..CrawlStats::default() };
    let mut instructions = Vec::new();

    for entry in ctx.entry_points {
        xrefs.add_entry_point(*entry);
    }
    for result in results {
        for address in result.errors {
            state.mark_error(address);
            stats.decode_errors += 1;
        }
        for insn in result.instructions {
            state.mark_visited(insn.address, insn.size as usize);
            xrefs.record(&insn);
            if insn.flow == Flow::IndirectJump {
                stats.unresolved_jumps += 1;
            }
            instructions.push(insn);
        }
    }

    log::info!(
        "Linear sweep completed in {:?}: {} instructions, {} decode errors",
        start_time.elapsed(),
        instructions.len(),
        stats.decode_errors
    );

    Ok(Disassembly { instructions, xrefs, state, stats })
}

/// Maximal `[start, end)` spans of the decode range outside ignored regions.
fn sweep_spans(ctx: &Context<'_>) -> Vec<(Address, Address)> {
    let config = ctx.config;
    let mut spans = Vec::new();
    let mut cursor = config.decode_start;
    for region in ctx.memory_map.regions_within(config.decode_start, config.decode_end) {
        if !region.ignore {
            continue;
        }
        let ignored_start = region.start.max(config.decode_start);
        if cursor < ignored_start {
            spans.push((cursor, ignored_start));
        }
        cursor = cursor.max(region.end + 1);
    }
    if cursor < config.decode_end {
        spans.push((cursor, config.decode_end));
    }
    spans
}

fn sweep(ctx: &Context<'_>, start: Address, end: Address) -> SpanResult {
    let mut instructions = Vec::new();
    let mut errors = Vec::new();
    let mut at = start;

    while at < end {
        let window = ctx.image.window(at, end);
        match ctx.decoder.decode(window, at) {
            Ok(insn) => {
                at += insn.size as Address;
                instructions.push(insn);
            }
            Err(err) => {
                log::trace!("Linear sweep: {}", err);
                errors.push(at);
                at += err.length.unwrap_or(1) as Address;
            }
        }
    }

    log::debug!(
        "Swept 0x{:06X}-0x{:06X}: {} instructions, {} errors",
        start,
        end,
        instructions.len(),
        errors.len()
    );
    SpanResult { instructions, errors }
}
