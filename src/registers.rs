//! Register names of the 8XC196EA
//!
//! Direct operands address the register file (0x00-0xFF, or 0x100-0x3FF
//! through windows); long-indexed operands off the zero register reach the
//! memory-mapped peripheral SFRs above 0x1C00. Both are named from one table.

/// A named special-function register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialRegister {
    pub address: u16,
    pub name: &'static str,
    pub description: &'static str,
}

impl SpecialRegister {
    const fn new(address: u16, name: &'static str, description: &'static str) -> Self {
        Self { address, name, description }
    }
}

/// Register-file class of an address with no dedicated name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterClass {
    SpecialFunction,
    StackPointer,
    GeneralPurpose,
    InternalRam,
}

impl RegisterClass {
    pub fn of(address: u32) -> Option<Self> {
        match address {
            0x00..=0x17 => Some(RegisterClass::SpecialFunction),
            0x18..=0x19 => Some(RegisterClass::StackPointer),
            0x1A..=0x3FFF if !(0x400..=0xFFF).contains(&address) => {
                Some(RegisterClass::GeneralPurpose)
            }
            0x400..=0xFFF => Some(RegisterClass::InternalRam),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RegisterClass::SpecialFunction => "SFR - Special Function Registers",
            RegisterClass::StackPointer => "SP - Stack Pointer",
            RegisterClass::GeneralPurpose => "GP Reg RAM",
            RegisterClass::InternalRam => "Internal RAM - Code RAM",
        }
    }
}

/// Sorted by address.
static REGISTERS: &[SpecialRegister] = &[
    SpecialRegister::new(0x0000, "ZERO_REG", "Zero Register"),
    SpecialRegister::new(0x0002, "ONES_REG", "Ones Register"),
    SpecialRegister::new(0x0004, "PTSSEL", "PTS Select"),
    SpecialRegister::new(0x0006, "PTSSRV", "PTS Service"),
    SpecialRegister::new(0x0008, "INT_MASK", "Interrupt Mask"),
    SpecialRegister::new(0x0009, "INT_PEND", "Interrupt Pending"),
    SpecialRegister::new(0x000A, "WATCHDOG", "Watchdog Timer"),
    SpecialRegister::new(0x0012, "INT_PEND1", "Interrupt Pending 1"),
    SpecialRegister::new(0x0013, "INT_MASK1", "Interrupt Mask 1"),
    SpecialRegister::new(0x0014, "WSR", "Window Selection"),
    SpecialRegister::new(0x0015, "WSR1", "Window Selection 1"),
    SpecialRegister::new(0x0018, "SP", "Stack Pointer"),
    SpecialRegister::new(0x0019, "SP", "Stack Pointer"),
    SpecialRegister::new(0x1E50, "AD_RESULT0", "A/D Result 0"),
    SpecialRegister::new(0x1E52, "AD_RESULT1", "A/D Result 1"),
    SpecialRegister::new(0x1E54, "AD_RESULT2", "A/D Result 2"),
    SpecialRegister::new(0x1E56, "AD_RESULT3", "A/D Result 3"),
    SpecialRegister::new(0x1E58, "AD_RESULT4", "A/D Result 4"),
    SpecialRegister::new(0x1E5A, "AD_RESULT5", "A/D Result 5"),
    SpecialRegister::new(0x1E5C, "AD_RESULT6", "A/D Result 6"),
    SpecialRegister::new(0x1E5E, "AD_RESULT7", "A/D Result 7"),
    SpecialRegister::new(0x1E60, "AD_RESULT8", "A/D Result 8"),
    SpecialRegister::new(0x1E62, "AD_RESULT9", "A/D Result 9"),
    SpecialRegister::new(0x1E64, "AD_RESULT10", "A/D Result 10"),
    SpecialRegister::new(0x1E66, "AD_RESULT11", "A/D Result 11"),
    SpecialRegister::new(0x1E68, "AD_RESULT12", "A/D Result 12"),
    SpecialRegister::new(0x1E6A, "AD_RESULT13", "A/D Result 13"),
    SpecialRegister::new(0x1E6C, "AD_RESULT14", "A/D Result 14"),
    SpecialRegister::new(0x1E6E, "AD_RESULT15", "A/D Result 15"),
    SpecialRegister::new(0x1E70, "AD_SCAN", "A/D Scan"),
    SpecialRegister::new(0x1E72, "AD_RESULT", "A/D Result"),
    SpecialRegister::new(0x1E74, "AD_COMMAND", "A/D Command"),
    SpecialRegister::new(0x1E76, "AD_TEST", "A/D Test"),
    SpecialRegister::new(0x1E77, "AD_TIME", "A/D Time"),
    SpecialRegister::new(0x1E78, "ADDRCOM0", "Address Compare 0"),
    SpecialRegister::new(0x1E7A, "ADDRMSK0", "Address Mask 0"),
    SpecialRegister::new(0x1E7C, "BUSCON0", "Bus Control 0"),
    SpecialRegister::new(0x1E80, "ADDRCOM1", "Address Compare 1"),
    SpecialRegister::new(0x1E82, "ADDRMSK1", "Address Mask 1"),
    SpecialRegister::new(0x1E84, "BUSCON1", "Bus Control 1"),
    SpecialRegister::new(0x1E88, "ADDRCOM2", "Address Compare 2"),
    SpecialRegister::new(0x1E8A, "ADDRMSK2", "Address Mask 2"),
    SpecialRegister::new(0x1E8C, "BUSCON2", "Bus Control 2"),
    SpecialRegister::new(0x1E90, "PIH0_VEC_IDX", "Peripheral Int Handler 0 Vector Index"),
    SpecialRegister::new(0x1E92, "PIH0_VEC_BASE", "Peripheral Int Handler 0 Vector Base"),
    SpecialRegister::new(0x1E94, "PIH0_PTSSRV", "Peripheral Int Handler 0 PTS Service"),
    SpecialRegister::new(0x1E96, "PIH0_PTSSEL", "Peripheral Int Handler 0 PTS Select"),
    SpecialRegister::new(0x1E98, "PIH0_INT_MASK", "Peripheral Int Handler 0 Int Mask"),
    SpecialRegister::new(0x1E9A, "PIH0_INT_PEND", "Peripheral Int Handler 0 Int Pending"),
    SpecialRegister::new(0x1EA0, "PIH1_VEC_IDX", "Peripheral Int Handler 1 Index"),
    SpecialRegister::new(0x1EA2, "PIH1_VEC_BASE", "Peripheral Int Handler 1 Vector Base"),
    SpecialRegister::new(0x1EA4, "PIH1_PTSSRV", "Peripheral Int Handler 1 PTS Service"),
    SpecialRegister::new(0x1EA6, "PIH1_PTSSEL", "Peripheral Int Handler 1 PTS Select"),
    SpecialRegister::new(0x1EA8, "PIH1_INT_MASK", "Peripheral Int Handler 1 Int Mask"),
    SpecialRegister::new(0x1EAA, "PIH1_INT_PEND", "Peripheral Int Handler 1 Int Pending"),
    SpecialRegister::new(0x1ED0, "PWM7_CONTROL", "PWM 7 Control"),
    SpecialRegister::new(0x1ED1, "PWM6_7_COUNT", "PWM 6 and 7 Count"),
    SpecialRegister::new(0x1ED2, "PWM6_CONTROL", "PWM 6 Control"),
    SpecialRegister::new(0x1ED3, "PWM6_7_PERIOD", "PWM 6 and 7 Period"),
    SpecialRegister::new(0x1ED4, "PWM5_CONTROL", "PWM 5 Control"),
    SpecialRegister::new(0x1ED5, "PWM4_5_COUNT", "PWM 4 and 5 Count"),
    SpecialRegister::new(0x1ED6, "PWM4_CONTROL", "PWM 4 Control"),
    SpecialRegister::new(0x1ED7, "PWM4_5_PERIOD", "PWM 4 and 5 Period"),
    SpecialRegister::new(0x1ED8, "PWM3_CONTROL", "PWM 3 Control"),
    SpecialRegister::new(0x1ED9, "PWM2_3_COUNT", "PWM 2 and 3 Count"),
    SpecialRegister::new(0x1EDA, "PWM2_CONTROL", "PWM 2 Control"),
    SpecialRegister::new(0x1EDB, "PWM2_3_PERIOD", "PWM 2 and 3 Period"),
    SpecialRegister::new(0x1EDC, "PWM1_CONTROL", "PWM 1 Control"),
    SpecialRegister::new(0x1EDD, "PWM0_1_COUNT", "PWM 0 and 1 Count"),
    SpecialRegister::new(0x1EDE, "PWM0_CONTROL", "PWM 0 Control"),
    SpecialRegister::new(0x1EDF, "PWM0_1_PERIOD", "PWM 0 and 1 Period"),
    SpecialRegister::new(0x1EE0, "OS7_CON", "Output Simulcapture 7 Control"),
    SpecialRegister::new(0x1EE2, "OS7_TIME", "Output Simulcapture 7 Time"),
    SpecialRegister::new(0x1EE4, "OS6_CON", "Output Simulcapture 6 Control"),
    SpecialRegister::new(0x1EE6, "OS6_TIME", "Output Simulcapture 6 Time"),
    SpecialRegister::new(0x1EE8, "OS5_CON", "Output Simulcapture 5 Control"),
    SpecialRegister::new(0x1EEA, "OS5_TIME", "Output Simulcapture 5 Time"),
    SpecialRegister::new(0x1EEC, "OS4_CON", "Output Simulcapture 4 Control"),
    SpecialRegister::new(0x1EEE, "OS4_TIME", "Output Simulcapture 4 Time"),
    SpecialRegister::new(0x1EF0, "OS3_CON", "Output Simulcapture 3 Control"),
    SpecialRegister::new(0x1EF2, "OS3_TIME", "Output Simulcapture 3 Time"),
    SpecialRegister::new(0x1EF4, "OS2_CON", "Output Simulcapture 2 Control"),
    SpecialRegister::new(0x1EF6, "OS2_TIME", "Output Simulcapture 2 Time"),
    SpecialRegister::new(0x1EF8, "OS1_CON", "Output Simulcapture 1 Control"),
    SpecialRegister::new(0x1EFA, "OS1_TIME", "Output Simulcapture 1 Time"),
    SpecialRegister::new(0x1EFC, "OS0_CON", "Output Simulcapture 0 Control"),
    SpecialRegister::new(0x1EFE, "OS0_TIME", "Output Simulcapture 0 Time"),
    SpecialRegister::new(0x1F1C, "EPA16_CON", "EPA Capture/Compare 16 Control"),
    SpecialRegister::new(0x1F1E, "EPA16_TIME", "EPA Capture/Compare 16 Time"),
    SpecialRegister::new(0x1F20, "EPA15_CON", "EPA Capture/Compare 15 Control"),
    SpecialRegister::new(0x1F22, "EPA15_TIME", "EPA Capture/Compare 15 Time"),
    SpecialRegister::new(0x1F24, "EPA14_CON", "EPA Capture/Compare 14 Control"),
    SpecialRegister::new(0x1F26, "EPA14_TIME", "EPA Capture/Compare 14 Time"),
    SpecialRegister::new(0x1F28, "EPA13_CON", "EPA Capture/Compare 13 Control"),
    SpecialRegister::new(0x1F2A, "EPA13_TIME", "EPA Capture/Compare 13 Time"),
    SpecialRegister::new(0x1F2C, "EPA12_CON", "EPA Capture/Compare 12 Control"),
    SpecialRegister::new(0x1F2E, "EPA12_TIME", "EPA Capture/Compare 12 Time"),
    SpecialRegister::new(0x1F30, "EPA11_CON", "EPA Capture/Compare 11 Control"),
    SpecialRegister::new(0x1F32, "EPA11_TIME", "EPA Capture/Compare 11 Time"),
    SpecialRegister::new(0x1F34, "EPA10_CON", "EPA Capture/Compare 10 Control"),
    SpecialRegister::new(0x1F36, "EPA10_TIME", "EPA Capture/Compare 10 Time"),
    SpecialRegister::new(0x1F38, "EPA9_CON", "EPA Capture/Compare 9 Control"),
    SpecialRegister::new(0x1F3A, "EPA9_TIME", "EPA Capture/Compare 9 Time"),
    SpecialRegister::new(0x1F3C, "EPA8_CON", "EPA Capture/Compare 8 Control"),
    SpecialRegister::new(0x1F3E, "EPA8_TIME", "EPA Capture/Compare 8 Time"),
    SpecialRegister::new(0x1F40, "EPA7_CON", "EPA Capture/Compare 7 Control"),
    SpecialRegister::new(0x1F42, "EPA7_TIME", "EPA Capture/Compare 7 Time"),
    SpecialRegister::new(0x1F44, "EPA6_CON", "EPA Capture/Compare 6 Control"),
    SpecialRegister::new(0x1F46, "EPA6_TIME", "EPA Capture/Compare 6 Time"),
    SpecialRegister::new(0x1F48, "EPA5_CON", "EPA Capture/Compare 5 Control"),
    SpecialRegister::new(0x1F4A, "EPA5_TIME", "EPA Capture/Compare 5 Time"),
    SpecialRegister::new(0x1F4C, "EPA4_CON", "EPA Capture/Compare 4 Control"),
    SpecialRegister::new(0x1F4E, "EPA4_TIME", "EPA Capture/Compare 4 Time"),
    SpecialRegister::new(0x1F50, "EPA3_CON", "EPA Capture/Compare 3 Control"),
    SpecialRegister::new(0x1F52, "EPA3_TIME", "EPA Capture/Compare 3 Time"),
    SpecialRegister::new(0x1F54, "EPA2_CON", "EPA Capture/Compare 2 Control"),
    SpecialRegister::new(0x1F56, "EPA2_TIME", "EPA Capture/Compare 2 Time"),
    SpecialRegister::new(0x1F58, "EPA1_CON", "EPA Capture/Compare 1 Control"),
    SpecialRegister::new(0x1F5A, "EPA1_TIME", "EPA Capture/Compare 1 Time"),
    SpecialRegister::new(0x1F5C, "EPA0_CON", "EPA Capture/Compare 0 Control"),
    SpecialRegister::new(0x1F5E, "EPA0_TIME", "EPA Capture/Compare 0 Time"),
    SpecialRegister::new(0x1F6E, "TIMER_MUX", "Timer Multiplexer"),
    SpecialRegister::new(0x1F70, "T4CONTROL", "Timer 4 Control"),
    SpecialRegister::new(0x1F72, "TIMER4", "Timer 4 Value"),
    SpecialRegister::new(0x1F74, "T3CONTROL", "Timer 3 Control"),
    SpecialRegister::new(0x1F76, "TIMER3", "Timer 3 Value"),
    SpecialRegister::new(0x1F78, "T2CONTROL", "Timer 2 Control"),
    SpecialRegister::new(0x1F7A, "TIMER2", "Timer 2 Value"),
    SpecialRegister::new(0x1F7C, "T1CONTROL", "Timer 1 Control"),
    SpecialRegister::new(0x1F7E, "TIMER1", "Timer 1 Value"),
    SpecialRegister::new(0x1F80, "CLKOUT_CON", "Clock Out Control"),
    SpecialRegister::new(0x1F88, "SBUF0_RX", "Serial Port Receive Buffer 0"),
    SpecialRegister::new(0x1F89, "SP0_STATUS", "Serial Port 0 Status"),
    SpecialRegister::new(0x1F8A, "SBUF0_TX", "Serial Port Transmit Buffer 0"),
    SpecialRegister::new(0x1F8B, "SP0_CON", "Serial Port 0 Control"),
    SpecialRegister::new(0x1F8C, "SP0_BAUD", "Serial Port 0 Baud Rate"),
    SpecialRegister::new(0x1F90, "SSIO0_BUF", "Synchronous Serial Port 0 Buffer"),
    SpecialRegister::new(0x1F91, "SSIO0_CON", "Synchronous Serial Port 0 Control"),
    SpecialRegister::new(0x1F92, "SSIO1_BUF", "Synchronous Serial Port 1 Buffer"),
    SpecialRegister::new(0x1F93, "SSIO1_CON", "Synchronous Serial Port 1 Control"),
    SpecialRegister::new(0x1F94, "SSIO_BAUD", "Synchronous Serial Port Baud Rate"),
    SpecialRegister::new(0x1F95, "SSIO0_CLK", "Synchronous Serial Port 0 Clock"),
    SpecialRegister::new(0x1F97, "SSIO1_CLK", "Synchronous Serial Port 1 Clock"),
    SpecialRegister::new(0x1F98, "SBUF1_RX", "Serial Port Receive Buffer 1"),
    SpecialRegister::new(0x1F99, "SP1_STATUS", "Serial Port 1 Status"),
    SpecialRegister::new(0x1F9A, "SBUF1_TX", "Serial Port Transmit Buffer 1"),
    SpecialRegister::new(0x1F9B, "SP1_CON", "Serial Port 1 Control"),
    SpecialRegister::new(0x1F9C, "SP1_BAUD", "Serial Port 1 Baud Rate"),
    SpecialRegister::new(0x1FA0, "STACK_BOTTOM", "Stack Bottom"),
    SpecialRegister::new(0x1FA2, "STACK_TOP", "Stack Top"),
    SpecialRegister::new(0x1FA4, "RSTSRC", "Reset Source Indicator"),
    SpecialRegister::new(0x1FB8, "P11_MODE", "Port 11 Mode"),
    SpecialRegister::new(0x1FBA, "P11_DIR", "Port 11 I/O Direction"),
    SpecialRegister::new(0x1FBC, "P11_REG", "Port 11 Data Output"),
    SpecialRegister::new(0x1FBE, "P11_PIN", "Port 11 Pin Input"),
    SpecialRegister::new(0x1FC0, "P9_MODE", "Port 9 Mode"),
    SpecialRegister::new(0x1FC1, "P10_MODE", "Port 10 Mode"),
    SpecialRegister::new(0x1FC2, "P9_DIR", "Port 9 I/O Direction"),
    SpecialRegister::new(0x1FC3, "P10_DIR", "Port 10 I/O Direction"),
    SpecialRegister::new(0x1FC4, "P9_REG", "Port 9 Data Output"),
    SpecialRegister::new(0x1FC5, "P10_REG", "Port 10 Data Output"),
    SpecialRegister::new(0x1FC6, "P9_PIN", "Port 9 Pin Input"),
    SpecialRegister::new(0x1FC7, "P10_PIN", "Port 10 Pin Input"),
    SpecialRegister::new(0x1FC8, "P7_MODE", "Port 7 Mode"),
    SpecialRegister::new(0x1FC9, "P8_MODE", "Port 8 Mode"),
    SpecialRegister::new(0x1FCA, "P7_DIR", "Port 7 I/O Direction"),
    SpecialRegister::new(0x1FCB, "P8_DIR", "Port 8 I/O Direction"),
    SpecialRegister::new(0x1FCC, "P7_REG", "Port 7 Data Output"),
    SpecialRegister::new(0x1FCD, "P8_REG", "Port 8 Data Output"),
    SpecialRegister::new(0x1FCE, "P7_PIN", "Port 7 Pin Input"),
    SpecialRegister::new(0x1FCF, "P8_PIN", "Port 8 Pin Input"),
    SpecialRegister::new(0x1FD0, "P2_MODE", "Port 2 Mode"),
    SpecialRegister::new(0x1FD2, "P2_DIR", "Port 2 I/O Direction"),
    SpecialRegister::new(0x1FD4, "P2_REG", "Port 2 Data Output"),
    SpecialRegister::new(0x1FD6, "P2_PIN", "Port 2 Pin Input"),
    SpecialRegister::new(0x1FE0, "IRAM_CON", "Internal RAM Control"),
    SpecialRegister::new(0x1FE1, "EP_MODE", "Extended Port Mode"),
    SpecialRegister::new(0x1FE3, "EP_DIR", "Extended Port I/O Direction"),
    SpecialRegister::new(0x1FE5, "EP_REG", "Extended Port Data Output"),
    SpecialRegister::new(0x1FE7, "EP_PIN", "Extended Port Pin Input"),
    SpecialRegister::new(0x1FE8, "P12_MODE", "Port 12 Mode"),
    SpecialRegister::new(0x1FEA, "P12_DIR", "Port 12 I/O Direction"),
    SpecialRegister::new(0x1FEC, "P12_REG", "Port 12 Data Output"),
    SpecialRegister::new(0x1FEE, "P12_PIN", "Port 12 Pin Input"),
    SpecialRegister::new(0x1FF1, "P5_MODE", "Port 5 Mode"),
    SpecialRegister::new(0x1FF3, "P5_DIR", "Port 5 I/O Direction"),
    SpecialRegister::new(0x1FF4, "P34_DRV", "Port 3/4 Push-pull Enable"),
    SpecialRegister::new(0x1FF5, "P5_REG", "Port 5 Data Output"),
    SpecialRegister::new(0x1FF7, "P5_PIN", "Port 5 Pin Input"),
    SpecialRegister::new(0x1FFC, "P3_REG", "Port 3 Data Output"),
    SpecialRegister::new(0x1FFD, "P4_REG", "Port 4 Data Output"),
    SpecialRegister::new(0x1FFE, "P3_PIN", "Port 3 Pin Input"),
    SpecialRegister::new(0x1FFF, "P4_PIN", "Port 4 Pin Input"),
];

/// Looks up the named register at `address`.
pub fn lookup(address: u32) -> Option<&'static SpecialRegister> {
    let address = u16::try_from(address).ok()?;
    REGISTERS
        .binary_search_by_key(&address, |reg| reg.address)
        .ok()
        .map(|idx| &REGISTERS[idx])
}

/// Symbolic name used in pseudocode: the SFR name, or `R<hex>`.
pub fn symbol(address: u32) -> String {
    match lookup(address) {
        Some(reg) => reg.name.to_string(),
        None => format!("R{:02X}", address),
    }
}

/// Listing annotation for a register operand.
///
/// The zero register is never annotated.
pub fn annotation(address: u32) -> Option<&'static str> {
    if address == 0 {
        return None;
    }
    lookup(address)
        .map(|reg| reg.description)
        .or_else(|| RegisterClass::of(address).map(RegisterClass::description))
}
