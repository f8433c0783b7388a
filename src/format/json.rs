//! JSON output formatter

use std::collections::BTreeMap;

use serde::Serialize;

use super::listing::{GapKind, Listing};
use super::{hex_bytes, DisassemblyFormatter, JsonFormatter};
use crate::memory_map::MemoryRegion;
use crate::vectors::{EntryOrigin, EntryPoint};
use crate::{Address, ControlFlowRef, DisassemblyError, Instruction, Operand};

/// Serializable operand
#[derive(Serialize)]
struct OperandJson {
    name: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
}

/// Serializable reference from `origin`
#[derive(Serialize)]
struct RefJson {
    origin: String,
    target: String,
    mnemonic: String,
    kind: String,
}

/// Serializable instruction for JSON output
#[derive(Serialize)]
struct InstructionJson {
    /// Address of the instruction
    address: String,
    /// Size of the instruction in bytes
    size: u8,
    mnemonic: String,
    mode: String,
    /// Bytes of the instruction as hex string
    bytes: String,
    operands: Vec<OperandJson>,
    pseudocode: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    ignore: bool,
    flow: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    calls: Vec<RefJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    jumps: Vec<RefJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    xrefs: Vec<RefJson>,
}

#[derive(Serialize)]
struct GapJson {
    start: String,
    /// Exclusive
    end: String,
    size: usize,
    ignored: bool,
}

#[derive(Serialize)]
struct EntryPointJson {
    address: String,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    vector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'static str>,
}

#[derive(Serialize)]
struct SummaryJson {
    instructions_decoded: usize,
    uncrawled_bytes: usize,
    decode_errors: usize,
    unresolved_jumps: usize,
    out_of_range: usize,
    overlaps: usize,
    paths: usize,
}

/// Serializable disassembly result for JSON output
#[derive(Serialize)]
struct DisassemblyJson<'a> {
    decode_start: String,
    decode_end: String,
    /// Memory regions intersecting the decode range
    regions: Vec<&'a MemoryRegion>,
    entry_points: Vec<EntryPointJson>,
    instructions: Vec<InstructionJson>,
    gaps: Vec<GapJson>,
    /// Subroutine address -> callers
    subroutines: BTreeMap<String, Vec<RefJson>>,
    /// Jump target -> jumpers
    jumps: BTreeMap<String, Vec<RefJson>>,
    /// Referenced data address -> referencing instructions
    xrefs: BTreeMap<String, Vec<RefJson>>,
    summary: SummaryJson,
}

impl DisassemblyFormatter for JsonFormatter {
    fn format(&self, listing: &Listing<'_>) -> Result<String, DisassemblyError> {
        let xrefs = listing.xrefs;
        let result = DisassemblyJson {
            decode_start: address(listing.config.decode_start),
            decode_end: address(listing.config.decode_end),
            regions: listing
                .memory_map
                .regions_within(listing.config.decode_start, listing.config.decode_end)
                .collect(),
            entry_points: xrefs.entry_points().values().flatten().map(entry_point_to_json).collect(),
            instructions: listing.instructions.iter().map(instruction_to_json).collect(),
            gaps: listing
                .gaps()
                .map(|gap| GapJson {
                    start: address(gap.start),
                    end: address(gap.end),
                    size: gap.len(),
                    ignored: gap.kind == GapKind::Ignored,
                })
                .collect(),
            subroutines: table_to_json(xrefs.subroutines()),
            jumps: table_to_json(xrefs.jump_targets()),
            xrefs: table_to_json(xrefs.operand_references()),
            summary: SummaryJson {
                instructions_decoded: listing.decoded_count(),
                uncrawled_bytes: listing.uncrawled_bytes(),
                decode_errors: listing.stats.decode_errors,
                unresolved_jumps: listing.stats.unresolved_jumps,
                out_of_range: listing.stats.out_of_range,
                overlaps: listing.stats.overlaps,
                paths: listing.stats.paths,
            },
        };

        Ok(serde_json::to_string_pretty(&result)?)
    }
}

fn address(address: Address) -> String {
    format!("0x{:06X}", address)
}

fn operand_to_json(operand: &Operand) -> OperandJson {
    OperandJson { name: operand.name, kind: operand.type_tag(), value: operand.to_string() }
}

fn ref_to_json(reference: &ControlFlowRef) -> RefJson {
    RefJson {
        origin: address(reference.origin),
        target: address(reference.target),
        mnemonic: reference.mnemonic.to_string(),
        kind: reference.kind.to_string(),
    }
}

fn refs_to_json(refs: &[ControlFlowRef]) -> Vec<RefJson> {
    refs.iter().map(ref_to_json).collect()
}

fn table_to_json(table: &BTreeMap<Address, Vec<ControlFlowRef>>) -> BTreeMap<String, Vec<RefJson>> {
    table.iter().map(|(target, refs)| (address(*target), refs_to_json(refs))).collect()
}

/// Convert an instruction to JSON format
fn instruction_to_json(insn: &Instruction) -> InstructionJson {
    InstructionJson {
        address: address(insn.address),
        size: insn.size,
        mnemonic: insn.mnemonic.to_string(),
        mode: insn.mode.to_string(),
        bytes: hex_bytes(insn.bytes()),
        operands: insn.operands.iter().map(operand_to_json).collect(),
        pseudocode: insn.pseudocode.clone(),
        ignore: insn.ignore,
        flow: insn.flow.to_string(),
        calls: refs_to_json(&insn.calls),
        jumps: refs_to_json(&insn.jumps),
        xrefs: refs_to_json(&insn.xrefs),
    }
}

fn entry_point_to_json(entry: &EntryPoint) -> EntryPointJson {
    let (vector, source) = match entry.origin {
        EntryOrigin::Reset => (None, None),
        EntryOrigin::Vector(vector) => (Some(address(vector.vector_address)), Some(vector.source_name)),
    };
    EntryPointJson { address: address(entry.address), label: entry.label(), vector, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    use crate::config::CrawlConfig;
    use crate::decoder::Mcs96Decoder;
    use crate::image::RawImage;
    use crate::memory_map::{MemoryMap, MemoryRegion};
    use crate::state::CrawlState;
    use crate::vectors::{InterruptVector, ServiceKind, VectorTable};
    use crate::xref::XrefTable;
    use crate::{CrawlStats, Decoder, Disassembly};

    fn render(code: &[(Address, &[u8])]) -> Value {
        let decoder = Mcs96Decoder::new();
        let mut xrefs = XrefTable::new();
        xrefs.add_entry_point(EntryPoint { address: 0x100, origin: EntryOrigin::Reset });
        xrefs.add_entry_point(EntryPoint {
            address: 0x108,
            origin: EntryOrigin::Vector(InterruptVector::new(0x13C, "Timer", "TOV", ServiceKind::Pts)),
        });
        let instructions: Vec<_> = code
            .iter()
            .map(|(address, bytes)| decoder.decode(bytes, *address).unwrap())
            .collect();
        for insn in &instructions {
            xrefs.record(insn);
        }
        let disassembly = Disassembly {
            instructions,
            xrefs,
            state: CrawlState::new(0x100, 0x140),
            stats: CrawlStats { decode_errors: 1, ..CrawlStats::default() },
        };
        let image = RawImage::from_bytes(vec![0; 0x140]);
        let config = CrawlConfig { decode_start: 0x100, decode_end: 0x140, ..CrawlConfig::default() };
        let map = MemoryMap::new(vec![MemoryRegion::new("Mirror", "Mirror", 0x130, 0x13F, true)]);
        let vectors = VectorTable::empty();
        let listing = Listing::new(&disassembly, &image, &config, &map, &vectors);
        let text = JsonFormatter.format(&listing).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_instruction_fields() {
        // LCALL 0x108; CMP R1C, R20; JNE +0
        let json = render(&[
            (0x100, &[0xEF, 0x05, 0x00]),
            (0x103, &[0x88, 0x20, 0x1C]),
            (0x106, &[0xD7, 0x00]),
        ]);

        let call = &json["instructions"][0];
        assert_eq!(call["address"], "0x000100");
        assert_eq!(call["mnemonic"], "LCALL");
        assert_eq!(call["bytes"], "EF 05 00");
        assert_eq!(call["flow"], "call 0x000108");
        assert_eq!(call["calls"][0]["target"], "0x000108");
        assert_eq!(call["operands"][0]["type"], "target");

        // Comparison carries the operator of the following branch
        assert_eq!(json["instructions"][1]["pseudocode"], "if (R1C != R20)");
        assert_eq!(json["instructions"][1]["operands"][0]["type"], "wreg");
        assert!(json["instructions"][1].get("calls").is_none());
    }

    #[test]
    fn test_tables_gaps_and_summary() {
        let json = render(&[(0x100, &[0xEF, 0x05, 0x00]), (0x108, &[0xF0])]);

        assert_eq!(json["decode_start"], "0x000100");
        assert_eq!(json["regions"][0]["name"], "Mirror");
        assert_eq!(json["regions"][0]["start"], 0x130);
        assert_eq!(json["regions"][0]["ignore"], true);
        assert_eq!(json["subroutines"]["0x000108"][0]["origin"], "0x000100");
        assert_eq!(json["entry_points"][0]["label"], "RESET_0x000100");
        assert_eq!(json["entry_points"][1]["label"], "PTS_0x000108");
        assert_eq!(json["entry_points"][1]["vector"], "0x00013C");

        let gaps = json["gaps"].as_array().unwrap();
        assert_eq!(gaps[0]["start"], "0x000103");
        assert_eq!(gaps[0]["size"], 5);
        let ignored: Vec<_> = gaps.iter().filter(|g| g["ignored"] == true).collect();
        assert_eq!(ignored.len(), 1);
        assert_eq!(ignored[0]["start"], "0x000130");

        assert_eq!(json["summary"]["instructions_decoded"], 2);
        assert_eq!(json["summary"]["decode_errors"], 1);
        assert_eq!(json["summary"]["uncrawled_bytes"], 0x40 - 4 - 16);
    }
}
