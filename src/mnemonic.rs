//! Instruction mnemonics of the 8xC196 family

use std::fmt;

/// Every mnemonic the decoder can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mnemonic {
    // Single-register and shift group
    Skip,
    Clr,
    Not,
    Neg,
    Xch,
    Dec,
    Ext,
    Inc,
    Shr,
    Shl,
    Shra,
    Shrl,
    Shll,
    Shral,
    Norml,
    Clrb,
    Notb,
    Negb,
    Xchb,
    Decb,
    Extb,
    Incb,
    Shrb,
    Shlb,
    Shrab,

    // Arithmetic and logic
    And,
    Add,
    Sub,
    Mulu,
    Mul,
    Andb,
    Addb,
    Subb,
    Mulub,
    Mulb,
    Or,
    Xor,
    Cmp,
    Divu,
    Div,
    Orb,
    Xorb,
    Cmpb,
    Divub,
    Divb,
    Ld,
    Addc,
    Subc,
    Ldbze,
    Ldb,
    Addcb,
    Subcb,
    Ldbse,
    St,
    Stb,
    Cmpl,

    // Block moves and stack
    Bmov,
    Bmovi,
    Ebmovi,
    Push,
    Pop,
    Pushf,
    Popf,
    Pusha,
    Popa,

    // Extended-addressing loads and stores
    Eld,
    Eldb,
    Est,
    Estb,

    // Control transfer
    Sjmp,
    Scall,
    Ljmp,
    Lcall,
    Ejmp,
    Ecall,
    Br,
    Ebr,
    Tijmp,
    Jbc,
    Jbs,
    Djnz,
    Djnzw,
    Jnst,
    Jnh,
    Jgt,
    Jnc,
    Jnvt,
    Jnv,
    Jge,
    Jne,
    Jst,
    Jh,
    Jle,
    Jc,
    Jvt,
    Jv,
    Jlt,
    Je,
    Ret,
    Trap,
    Rst,

    // Processor control
    Dpts,
    Epts,
    Idlpd,
    Clrc,
    Setc,
    Di,
    Ei,
    Clrvt,
    Nop,
}

impl Mnemonic {
    /// Comparisons whose pseudocode operator depends on the following branch.
    pub fn is_comparison(self) -> bool {
        matches!(self, Mnemonic::Cmp | Mnemonic::Cmpb | Mnemonic::Cmpl)
    }

    /// Relational operator a condition-code branch tests after a comparison.
    ///
    /// Branches on overflow, trap or sticky flags have no relational meaning
    /// and return `None`.
    pub fn branch_operator(self) -> Option<&'static str> {
        match self {
            Mnemonic::Je => Some("=="),
            Mnemonic::Jne => Some("!="),
            Mnemonic::Jgt | Mnemonic::Jh => Some(">"),
            Mnemonic::Jge | Mnemonic::Jc => Some(">="),
            Mnemonic::Jlt | Mnemonic::Jnc => Some("<"),
            Mnemonic::Jle | Mnemonic::Jnh => Some("<="),
            _ => None,
        }
    }

    /// Upper-case assembly spelling.
    pub fn as_str(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Skip => "SKIP",
            Clr => "CLR",
            Not => "NOT",
            Neg => "NEG",
            Xch => "XCH",
            Dec => "DEC",
            Ext => "EXT",
            Inc => "INC",
            Shr => "SHR",
            Shl => "SHL",
            Shra => "SHRA",
            Shrl => "SHRL",
            Shll => "SHLL",
            Shral => "SHRAL",
            Norml => "NORML",
            Clrb => "CLRB",
            Notb => "NOTB",
            Negb => "NEGB",
            Xchb => "XCHB",
            Decb => "DECB",
            Extb => "EXTB",
            Incb => "INCB",
            Shrb => "SHRB",
            Shlb => "SHLB",
            Shrab => "SHRAB",
            And => "AND",
            Add => "ADD",
            Sub => "SUB",
            Mulu => "MULU",
            Mul => "MUL",
            Andb => "ANDB",
            Addb => "ADDB",
            Subb => "SUBB",
            Mulub => "MULUB",
            Mulb => "MULB",
            Or => "OR",
            Xor => "XOR",
            Cmp => "CMP",
            Divu => "DIVU",
            Div => "DIV",
            Orb => "ORB",
            Xorb => "XORB",
            Cmpb => "CMPB",
            Divub => "DIVUB",
            Divb => "DIVB",
            Ld => "LD",
            Addc => "ADDC",
            Subc => "SUBC",
            Ldbze => "LDBZE",
            Ldb => "LDB",
            Addcb => "ADDCB",
            Subcb => "SUBCB",
            Ldbse => "LDBSE",
            St => "ST",
            Stb => "STB",
            Cmpl => "CMPL",
            Bmov => "BMOV",
            Bmovi => "BMOVI",
            Ebmovi => "EBMOVI",
            Push => "PUSH",
            Pop => "POP",
            Pushf => "PUSHF",
            Popf => "POPF",
            Pusha => "PUSHA",
            Popa => "POPA",
            Eld => "ELD",
            Eldb => "ELDB",
            Est => "EST",
            Estb => "ESTB",
            Sjmp => "SJMP",
            Scall => "SCALL",
            Ljmp => "LJMP",
            Lcall => "LCALL",
            Ejmp => "EJMP",
            Ecall => "ECALL",
            Br => "BR",
            Ebr => "EBR",
            Tijmp => "TIJMP",
            Jbc => "JBC",
            Jbs => "JBS",
            Djnz => "DJNZ",
            Djnzw => "DJNZW",
            Jnst => "JNST",
            Jnh => "JNH",
            Jgt => "JGT",
            Jnc => "JNC",
            Jnvt => "JNVT",
            Jnv => "JNV",
            Jge => "JGE",
            Jne => "JNE",
            Jst => "JST",
            Jh => "JH",
            Jle => "JLE",
            Jc => "JC",
            Jvt => "JVT",
            Jv => "JV",
            Jlt => "JLT",
            Je => "JE",
            Ret => "RET",
            Trap => "TRAP",
            Rst => "RST",
            Dpts => "DPTS",
            Epts => "EPTS",
            Idlpd => "IDLPD",
            Clrc => "CLRC",
            Setc => "SETC",
            Di => "DI",
            Ei => "EI",
            Clrvt => "CLRVT",
            Nop => "NOP",
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_operators() {
        assert_eq!(Mnemonic::Je.branch_operator(), Some("=="));
        assert_eq!(Mnemonic::Jne.branch_operator(), Some("!="));
        assert_eq!(Mnemonic::Jh.branch_operator(), Some(">"));
        assert_eq!(Mnemonic::Jc.branch_operator(), Some(">="));
        assert_eq!(Mnemonic::Jnc.branch_operator(), Some("<"));
        assert_eq!(Mnemonic::Jnh.branch_operator(), Some("<="));
        assert_eq!(Mnemonic::Jv.branch_operator(), None);
        assert_eq!(Mnemonic::Ld.branch_operator(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Mnemonic::Djnzw.to_string(), "DJNZW");
        assert!(Mnemonic::Cmpl.is_comparison());
        assert!(!Mnemonic::Sub.is_comparison());
    }
}
