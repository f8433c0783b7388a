//! C-like pseudocode for decoded instructions
//!
//! Comparisons always render with `==`; the listing rewrites the operator once
//! it knows which branch consumes the flags.

use crate::registers;
use crate::{Mnemonic, Operand, OperandKind};

/// Label used for call targets in pseudocode and banners.
pub fn subroutine_label(target: u32) -> String {
    format!("SUB_0x{:06X}", target)
}

/// Label used for jump targets in pseudocode and banners.
pub fn jump_label(target: u32) -> String {
    format!("JUMP_0x{:06X}", target)
}

/// Expression form of an operand.
pub fn operand_expr(kind: &OperandKind) -> String {
    match *kind {
        OperandKind::Register { address, .. } => registers::symbol(address as u32),
        OperandKind::Immediate { value, .. } => format!("0x{:X}", value),
        OperandKind::Indirect { pointer, autoincrement } => format!(
            "[{}{}]",
            registers::symbol(pointer as u32),
            if autoincrement { "++" } else { "" }
        ),
        OperandKind::Indexed { base: 0, displacement, .. } => {
            format!("[0x{:04X}]", displacement as u32 & 0xFFFF)
        }
        OperandKind::Indexed { base, displacement, .. } => {
            let base = registers::symbol(base as u32);
            if displacement < 0 {
                format!("[{}-0x{:X}]", base, -displacement)
            } else {
                format!("[{}+0x{:X}]", base, displacement)
            }
        }
        OperandKind::ExtendedIndexed { base: 0, displacement } => format!("[0x{:06X}]", displacement),
        OperandKind::ExtendedIndexed { base, displacement } => {
            format!("[{}+0x{:06X}]", registers::symbol(base as u32), displacement)
        }
        OperandKind::Target(target) => format!("0x{:06X}", target),
        OperandKind::Bit(bit) => bit.to_string(),
        OperandKind::Count(count) => count.to_string(),
        OperandKind::Key(key) => format!("0x{:02X}", key),
    }
}

fn condition(mnemonic: Mnemonic) -> &'static str {
    match mnemonic {
        Mnemonic::Jnst => "!ST",
        Mnemonic::Jnh => "!C || Z",
        Mnemonic::Jgt => "!N && !Z",
        Mnemonic::Jnc => "!C",
        Mnemonic::Jnvt => "!VT",
        Mnemonic::Jnv => "!V",
        Mnemonic::Jge => "!N",
        Mnemonic::Jne => "!Z",
        Mnemonic::Jst => "ST",
        Mnemonic::Jh => "C && !Z",
        Mnemonic::Jle => "N || Z",
        Mnemonic::Jc => "C",
        Mnemonic::Jvt => "VT",
        Mnemonic::Jv => "V",
        Mnemonic::Jlt => "N",
        _ => "Z",
    }
}

/// Renders the effect of one instruction from its operands.
pub fn render(mnemonic: Mnemonic, operands: &[Operand]) -> String {
    use Mnemonic::*;

    let exprs: Vec<String> = operands.iter().map(|op| operand_expr(&op.kind)).collect();
    let arg = |idx: usize| exprs.get(idx).map(String::as_str).unwrap_or("");
    let target = operands.iter().find_map(|op| match op.kind {
        OperandKind::Target(target) => Some(target),
        _ => None,
    });
    let goto = || target.map(jump_label).unwrap_or_default();

    match mnemonic {
        Skip | Nop => String::new(),
        Clr | Clrb => format!("{} = 0;", arg(0)),
        Not | Notb => format!("{0} = ~{0};", arg(0)),
        Neg | Negb => format!("{0} = -{0};", arg(0)),
        Inc | Incb => format!("{}++;", arg(0)),
        Dec | Decb => format!("{}--;", arg(0)),
        Ext => format!("{0} = (long){0};", arg(0)),
        Extb => format!("{0} = (int){0};", arg(0)),
        Xch | Xchb => format!("swap({}, {});", arg(0), arg(1)),
        Shr | Shrb | Shrl => format!("{0} = {0} >> {1};", arg(0), arg(1)),
        Shl | Shlb | Shll => format!("{0} = {0} << {1};", arg(0), arg(1)),
        Shra | Shrab | Shral => format!("{0} = (signed){0} >> {1};", arg(0), arg(1)),
        Norml => format!("{1} = normalize({0});", arg(0), arg(1)),

        And | Andb | Add | Addb | Sub | Subb | Mul | Mulu | Mulb | Mulub if operands.len() == 3 => {
            format!("{} = {} {} {};", arg(0), arg(1), arithmetic_operator(mnemonic), arg(2))
        }
        And | Andb | Add | Addb | Sub | Subb | Mul | Mulu | Mulb | Mulub | Or | Orb | Xor | Xorb
        | Div | Divu | Divb | Divub => {
            format!("{} {}= {};", arg(0), arithmetic_operator(mnemonic), arg(1))
        }
        Addc | Addcb => format!("{} += {} + C;", arg(0), arg(1)),
        Subc | Subcb => format!("{} -= {} + !C;", arg(0), arg(1)),
        Cmp | Cmpb | Cmpl => format!("if ({} == {})", arg(0), arg(1)),
        Ld | Ldb | Eld | Eldb => format!("{} = {};", arg(0), arg(1)),
        Ldbze => format!("{} = (uint){};", arg(0), arg(1)),
        Ldbse => format!("{} = (int){};", arg(0), arg(1)),
        St | Stb | Est | Estb => format!("{} = {};", arg(1), arg(0)),

        Bmov | Bmovi | Ebmovi => format!("blockmove({}, {});", arg(0), arg(1)),
        Push => format!("push({});", arg(0)),
        Pop => format!("{} = pop();", arg(0)),
        Pushf => "push(PSW); PSW = 0;".to_string(),
        Popf => "PSW = pop();".to_string(),
        Pusha => "push(PSW, INT_MASK, INT_MASK1, WSR); PSW = 0;".to_string(),
        Popa => "pop(WSR, INT_MASK1, INT_MASK, PSW);".to_string(),

        Sjmp | Ljmp | Ejmp => format!("goto {};", goto()),
        Scall | Lcall | Ecall => match target {
            Some(target) => format!("{}();", subroutine_label(target)),
            None => String::new(),
        },
        Br | Ebr => format!("goto {};", arg(0)),
        Tijmp => format!("goto table({}, {} & {});", arg(0), arg(1), arg(2)),
        Jbc => format!("if (!bit({}, {})) goto {};", arg(0), arg(1), goto()),
        Jbs => format!("if (bit({}, {})) goto {};", arg(0), arg(1), goto()),
        Djnz | Djnzw => format!("if (--{} != 0) goto {};", arg(0), goto()),
        Jnst | Jnh | Jgt | Jnc | Jnvt | Jnv | Jge | Jne | Jst | Jh | Jle | Jc | Jvt | Jv | Jlt
        | Je => format!("if ({}) goto {};", condition(mnemonic), goto()),
        Ret => "return;".to_string(),
        Trap => "trap();".to_string(),
        Rst => "reset();".to_string(),

        Dpts => "disable_pts();".to_string(),
        Epts => "enable_pts();".to_string(),
        Idlpd => format!("idle_powerdown({});", arg(0)),
        Clrc => "C = 0;".to_string(),
        Setc => "C = 1;".to_string(),
        Di => "disable_interrupts();".to_string(),
        Ei => "enable_interrupts();".to_string(),
        Clrvt => "VT = 0;".to_string(),
    }
}

fn arithmetic_operator(mnemonic: Mnemonic) -> &'static str {
    use Mnemonic::*;
    match mnemonic {
        And | Andb => "&",
        Add | Addb => "+",
        Sub | Subb => "-",
        Mul | Mulu | Mulb | Mulub => "*",
        Or | Orb => "|",
        Xor | Xorb => "^",
        _ => "/",
    }
}
