//! CSV output formatter

use serde::Serialize;

use super::listing::Listing;
use super::{hex_bytes, CsvFormatter, DisassemblyFormatter};
use crate::{ControlFlowRef, DisassemblyError, Instruction};

/// One instruction per row
#[derive(Serialize)]
struct Row {
    address: String,
    size: u8,
    bytes: String,
    mnemonic: String,
    mode: String,
    operands: String,
    pseudocode: String,
    flow: String,
    /// Space-separated origins of calls into this address
    callers: String,
    /// Space-separated origins of jumps into this address
    jumpers: String,
}

impl DisassemblyFormatter for CsvFormatter {
    fn format(&self, listing: &Listing<'_>) -> Result<String, DisassemblyError> {
        let mut writer = ::csv::Writer::from_writer(vec![]);
        for insn in &listing.instructions {
            writer.serialize(row(listing, insn))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| DisassemblyError::Generic(format!("CSV flush error: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| DisassemblyError::Generic(format!("CSV encoding error: {}", e)))
    }
}

fn origins(refs: &[ControlFlowRef]) -> String {
    refs.iter()
        .map(|r| format!("0x{:06X}", r.origin))
        .collect::<Vec<_>>()
        .join(" ")
}

fn row(listing: &Listing<'_>, insn: &Instruction) -> Row {
    Row {
        address: format!("0x{:06X}", insn.address),
        size: insn.size,
        bytes: hex_bytes(insn.bytes()),
        mnemonic: insn.mnemonic.to_string(),
        mode: insn.mode.to_string(),
        operands: insn.operand_text(),
        pseudocode: insn.pseudocode.clone(),
        flow: insn.flow.to_string(),
        callers: origins(listing.xrefs.callers_of(insn.address)),
        jumpers: origins(listing.xrefs.jumpers_into(insn.address)),
    }
}
