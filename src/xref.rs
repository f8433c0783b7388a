//! Cross-reference aggregation
//!
//! Every table is keyed by target address and only ever grows; insertion
//! order within a target is discovery order.

use std::collections::BTreeMap;

use crate::vectors::EntryPoint;
use crate::{Address, ControlFlowRef, Instruction, RefKind};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XrefTable {
    subroutine_callers: BTreeMap<Address, Vec<ControlFlowRef>>,
    jumpers: BTreeMap<Address, Vec<ControlFlowRef>>,
    operand_xrefs: BTreeMap<Address, Vec<ControlFlowRef>>,
    entry_points: BTreeMap<Address, Vec<EntryPoint>>,
}

impl XrefTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, reference: ControlFlowRef) {
        let table = match reference.kind {
            RefKind::Call => &mut self.subroutine_callers,
            RefKind::UnconditionalJump | RefKind::ConditionalJump => &mut self.jumpers,
            RefKind::OperandReference => &mut self.operand_xrefs,
        };
        table.entry(reference.target).or_default().push(reference);
    }

    /// Merges the references an instruction carries.
    pub fn record(&mut self, insn: &Instruction) {
        for reference in insn.calls.iter().chain(&insn.jumps).chain(&insn.xrefs) {
            self.add(*reference);
        }
    }

    pub fn add_entry_point(&mut self, entry: EntryPoint) {
        self.entry_points.entry(entry.address).or_default().push(entry);
    }

    pub fn callers_of(&self, address: Address) -> &[ControlFlowRef] {
        self.subroutine_callers.get(&address).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn jumpers_into(&self, address: Address) -> &[ControlFlowRef] {
        self.jumpers.get(&address).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn xrefs_to(&self, address: Address) -> &[ControlFlowRef] {
        self.operand_xrefs.get(&address).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entry_points_at(&self, address: Address) -> &[EntryPoint] {
        self.entry_points.get(&address).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_vector_entry(&self, address: Address) -> bool {
        self.entry_points.contains_key(&address)
    }

    pub fn subroutines(&self) -> &BTreeMap<Address, Vec<ControlFlowRef>> {
        &self.subroutine_callers
    }

    pub fn jump_targets(&self) -> &BTreeMap<Address, Vec<ControlFlowRef>> {
        &self.jumpers
    }

    pub fn operand_references(&self) -> &BTreeMap<Address, Vec<ControlFlowRef>> {
        &self.operand_xrefs
    }

    pub fn entry_points(&self) -> &BTreeMap<Address, Vec<EntryPoint>> {
        &self.entry_points
    }

    /// Total number of control-flow and operand references.
    pub fn reference_count(&self) -> usize {
        [&self.subroutine_callers, &self.jumpers, &self.operand_xrefs]
            .iter()
            .flat_map(|table| table.values())
            .map(Vec::len)
            .sum()
    }
}
