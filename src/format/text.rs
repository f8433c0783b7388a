//! Plain-text listing

use super::listing::{Entry, Gap, GapKind, Listing};
use super::{hex_bytes, DisassemblyFormatter, TextFormatter};
use crate::decoder::pseudo::{jump_label, subroutine_label};
use crate::memory_map::MemoryRegion;
use crate::registers;
use crate::vectors::EntryOrigin;
use crate::{Address, DisassemblyError, Flow, Instruction, OperandKind};

const RULE_WIDTH: usize = 100;
const DUMP_ROW: usize = 16;

fn rule(title: &str) -> String {
    if title.is_empty() {
        "=".repeat(RULE_WIDTH)
    } else {
        let head = format!("== {} ", title);
        let fill = RULE_WIDTH.saturating_sub(head.len());
        format!("{}{}", head, "=".repeat(fill))
    }
}

impl DisassemblyFormatter for TextFormatter {
    fn format(&self, listing: &Listing<'_>) -> Result<String, DisassemblyError> {
        let mut output = String::new();
        let config = listing.config;

        output.push_str(&format!(
            "; 8xC196 disassembly of 0x{:06X}-0x{:06X}\n",
            config.decode_start,
            config.decode_end - 1
        ));

        let mut current_region: Option<&MemoryRegion> = None;
        for entry in &listing.entries {
            let start = match entry {
                Entry::Instruction(idx) => listing.instructions[*idx].address,
                Entry::Gap(gap) => gap.start,
            };

            let region = listing.memory_map.region_containing(start);
            if region != current_region {
                if let Some(previous) = current_region {
                    output.push_str(&region_end(previous));
                }
                if let Some(next) = region {
                    output.push_str(&region_start(next));
                }
                current_region = region;
            }

            match entry {
                Entry::Instruction(idx) => {
                    write_instruction(&mut output, listing, &listing.instructions[*idx])
                }
                Entry::Gap(gap) => write_gap(&mut output, listing, gap),
            }
        }
        if let Some(last) = current_region {
            output.push_str(&region_end(last));
        }

        write_references(&mut output, listing);
        write_summary(&mut output, listing);

        Ok(output)
    }
}

fn region_start(region: &MemoryRegion) -> String {
    format!(
        "\n *********************************************\n **\n ** [0x{:06X}] START OF {}\n ** {}\n **\n\n",
        region.start, region.name, region.description
    )
}

fn region_end(region: &MemoryRegion) -> String {
    format!(
        "\n **\n ** [0x{:06X}] END OF {}\n **\n *********************************************\n",
        region.end, region.name
    )
}

/// Banners for every known way into `address`.
fn write_banners(output: &mut String, listing: &Listing<'_>, address: Address) {
    let entries = listing.xrefs.entry_points_at(address);
    let callers = listing.xrefs.callers_of(address);
    let jumpers = listing.xrefs.jumpers_into(address);
    if entries.is_empty() && callers.is_empty() && jumpers.is_empty() {
        return;
    }

    output.push('\n');
    output.push_str(&rule(""));
    output.push('\n');
    for entry in entries {
        match entry.origin {
            EntryOrigin::Reset => output.push_str(&format!("{} [RESET VECTOR]\n", entry.label())),
            EntryOrigin::Vector(vector) => output.push_str(&format!(
                "{} [VECTOR 0x{:06X} - {} ({})]\n",
                entry.label(),
                vector.vector_address,
                vector.source_name,
                vector.mnemonic
            )),
        }
    }
    if !callers.is_empty() {
        let from: Vec<String> = callers
            .iter()
            .map(|r| format!("[CALLED FROM 0x{:06X} - {}]", r.origin, r.mnemonic))
            .collect();
        output.push_str(&format!("{} {}\n", subroutine_label(address), from.join(" ")));
    }
    if !jumpers.is_empty() {
        let from: Vec<String> = jumpers
            .iter()
            .map(|r| format!("[JUMP FROM 0x{:06X} - {}]", r.origin, r.mnemonic))
            .collect();
        output.push_str(&format!("{} {}\n", jump_label(address), from.join(" ")));
    }
}

/// Names of the registers and absolute locations an instruction touches.
fn annotations(insn: &Instruction) -> Vec<String> {
    let mut notes = Vec::new();
    for operand in &insn.operands {
        let address = match operand.kind {
            OperandKind::Register { address, .. } => address as Address,
            OperandKind::Indirect { pointer, .. } => pointer as Address,
            _ => match operand.absolute_address() {
                Some(address) => address,
                None => continue,
            },
        };
        if let Some(note) = registers::annotation(address) {
            let note = format!("0x{:02X} ~({})", address, note);
            if !notes.contains(&note) {
                notes.push(note);
            }
        }
    }
    notes
}

fn write_instruction(output: &mut String, listing: &Listing<'_>, insn: &Instruction) {
    write_banners(output, listing, insn.address);

    let mut line = format!(
        "0x{:06X}  {:<21} {:<7} {:<30} {}",
        insn.address,
        hex_bytes(insn.bytes()),
        insn.mnemonic,
        insn.operand_text(),
        insn.pseudocode
    );
    let notes = annotations(insn);
    if !notes.is_empty() {
        line = format!("{:<110} ; {}", line, notes.join(", "));
    }
    output.push_str(line.trim_end());
    output.push('\n');

    if insn.flow == Flow::Return {
        output.push('\n');
        output.push_str(&rule("RETURN FROM SUBROUTINE"));
        output.push('\n');
    }
}

fn write_gap(output: &mut String, listing: &Listing<'_>, gap: &Gap) {
    if gap.kind == GapKind::Ignored {
        output.push_str(&format!(" ** SKIPPING {} BYTES\n", gap.len()));
        return;
    }

    if let Some(vector) = listing.vectors.slot_containing(gap.start) {
        let target = listing
            .image
            .read_word_le(vector.vector_address)
            .map(|word| format!(" -> 0x{:06X}", listing.config.vector_base + word as Address))
            .unwrap_or_default();
        output.push_str(&format!(
            "0x{:06X}  {:<21} .VECTOR {} ({}, {}){}\n",
            gap.start,
            hex_bytes(listing.image.window(gap.start, gap.end)),
            vector.source_name,
            vector.mnemonic,
            vector.service_kind,
            target
        ));
        return;
    }

    output.push_str(&format!(
        "\n; ---- UNCRAWLED 0x{:06X}-0x{:06X} ({} bytes) ----\n",
        gap.start,
        gap.end - 1,
        gap.len()
    ));
    let limit = listing.config.gap_dump_limit.min(gap.len());
    let dump = listing.image.window(gap.start, gap.start + limit as Address);
    for (row, chunk) in dump.chunks(DUMP_ROW).enumerate() {
        let address = gap.start + (row * DUMP_ROW) as Address;
        output.push_str(&format!("0x{:06X}  .DB {}\n", address, hex_bytes(chunk)));
    }
    if gap.len() > limit {
        output.push_str(&format!("          ... {} more bytes\n", gap.len() - limit));
    }
}

fn write_references(output: &mut String, listing: &Listing<'_>) {
    output.push('\n');
    output.push_str(&rule("ADDRESS REFERENCES"));
    output.push('\n');
    for (target, refs) in listing.xrefs.operand_references() {
        match registers::annotation(*target) {
            Some(note) => output.push_str(&format!("0x{:06X} ~({})\n", target, note)),
            None => output.push_str(&format!("0x{:06X}\n", target)),
        }
        for r in refs {
            output.push_str(&format!("       XREF [{}] AT 0x{:06X}\n", r.mnemonic, r.origin));
        }
    }

    output.push('\n');
    output.push_str(&rule("SUBROUTINE REFERENCES"));
    output.push('\n');
    for (target, refs) in listing.xrefs.subroutines() {
        output.push_str(&subroutine_label(*target));
        output.push('\n');
        for r in refs {
            output.push_str(&format!("       [{}] AT 0x{:06X}\n", r.mnemonic, r.origin));
        }
    }

    output.push('\n');
    output.push_str(&rule("JUMP REFERENCES"));
    output.push('\n');
    for (target, refs) in listing.xrefs.jump_targets() {
        output.push_str(&jump_label(*target));
        output.push('\n');
        for r in refs {
            output.push_str(&format!("       [{}] AT 0x{:06X}\n", r.mnemonic, r.origin));
        }
    }
}

fn write_summary(output: &mut String, listing: &Listing<'_>) {
    let stats = &listing.stats;
    output.push('\n');
    output.push_str(&rule("SUMMARY"));
    output.push('\n');
    output.push_str(&format!("Instructions decoded:      {}\n", listing.decoded_count()));
    output.push_str(&format!("Uncrawled bytes:           {}\n", listing.uncrawled_bytes()));
    output.push_str(&format!("Decode errors:             {}\n", stats.decode_errors));
    output.push_str(&format!("Unresolved indirect jumps: {}\n", stats.unresolved_jumps));
    output.push_str(&format!("Out-of-range terminations: {}\n", stats.out_of_range));
    output.push_str(&format!("Overlapping decodes:       {}\n", stats.overlaps));
    output.push_str(&format!("Paths followed:            {}\n", stats.paths));
}
