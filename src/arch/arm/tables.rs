//! ARM register, instruction, group and condition tables.

use crate::table::{id_table, IdTable};

id_table! {
    /// ARM registers. Core registers are contiguous from `R0` in encoding
    /// order, as are the `S` and `D` banks.
    pub enum ArmReg {
        R0 = "r0", R1 = "r1", R2 = "r2", R3 = "r3",
        R4 = "r4", R5 = "r5", R6 = "r6", R7 = "r7",
        R8 = "r8", R9 = "sb", R10 = "sl", R11 = "fp",
        R12 = "ip", SP = "sp", LR = "lr", PC = "pc",
        APSR = "apsr", APSR_NZCV = "apsr_nzcv", CPSR = "cpsr", SPSR = "spsr",
        FPSCR = "fpscr", FPEXC = "fpexc", FPSID = "fpsid", ITSTATE = "itstate",
        S0 = "s0", S1 = "s1", S2 = "s2", S3 = "s3", S4 = "s4", S5 = "s5", S6 = "s6", S7 = "s7",
        S8 = "s8", S9 = "s9", S10 = "s10", S11 = "s11", S12 = "s12", S13 = "s13", S14 = "s14", S15 = "s15",
        S16 = "s16", S17 = "s17", S18 = "s18", S19 = "s19", S20 = "s20", S21 = "s21", S22 = "s22", S23 = "s23",
        S24 = "s24", S25 = "s25", S26 = "s26", S27 = "s27", S28 = "s28", S29 = "s29", S30 = "s30", S31 = "s31",
        D0 = "d0", D1 = "d1", D2 = "d2", D3 = "d3", D4 = "d4", D5 = "d5", D6 = "d6", D7 = "d7",
        D8 = "d8", D9 = "d9", D10 = "d10", D11 = "d11", D12 = "d12", D13 = "d13", D14 = "d14", D15 = "d15",
        D16 = "d16", D17 = "d17", D18 = "d18", D19 = "d19", D20 = "d20", D21 = "d21", D22 = "d22", D23 = "d23",
        D24 = "d24", D25 = "d25", D26 = "d26", D27 = "d27", D28 = "d28", D29 = "d29", D30 = "d30", D31 = "d31",
    }
    aliases {
        "r9" => R9, "r10" => R10, "r11" => R11, "r12" => R12,
        "r13" => SP, "r14" => LR, "r15" => PC,
    }
}

impl ArmReg {
    /// Core register by encoding number.
    pub fn gpr(n: u32) -> ArmReg {
        ArmReg::from_id(ArmReg::R0 as u16 + (n & 15) as u16).unwrap_or_default()
    }

    /// Single-precision register by number.
    pub fn s(n: u32) -> ArmReg {
        ArmReg::from_id(ArmReg::S0 as u16 + (n & 31) as u16).unwrap_or_default()
    }

    /// Double-precision register by number.
    pub fn d(n: u32) -> ArmReg {
        ArmReg::from_id(ArmReg::D0 as u16 + (n & 31) as u16).unwrap_or_default()
    }

    /// Encoding number of a core register.
    pub fn gpr_index(self) -> Option<u32> {
        let id = self as u16;
        (ArmReg::R0 as u16..=ArmReg::PC as u16)
            .contains(&id)
            .then(|| (id - ArmReg::R0 as u16) as u32)
    }

    /// Name with every core register printed by number.
    pub fn numeric_name(self) -> String {
        match self.gpr_index() {
            Some(n) => format!("r{}", n),
            None => self.name().to_string(),
        }
    }
}

id_table! {
    /// ARM and Thumb instructions. Condition and flag-setting suffixes are
    /// not part of the id.
    pub enum ArmInsn {
        ADC = "adc", ADD = "add", ADDW = "addw", ADR = "adr", AND = "and", ASR = "asr",
        B = "b", BFC = "bfc", BFI = "bfi", BIC = "bic", BKPT = "bkpt", BL = "bl", BLX = "blx",
        BX = "bx", CBNZ = "cbnz", CBZ = "cbz", CLREX = "clrex", CLZ = "clz", CMN = "cmn", CMP = "cmp",
        CPS = "cps", DMB = "dmb", DSB = "dsb", EOR = "eor", ISB = "isb", IT = "it",
        LDM = "ldm", LDMDA = "ldmda", LDMDB = "ldmdb", LDMIB = "ldmib",
        LDR = "ldr", LDRB = "ldrb", LDRBT = "ldrbt", LDRD = "ldrd", LDREX = "ldrex",
        LDREXB = "ldrexb", LDREXH = "ldrexh", LDRH = "ldrh", LDRSB = "ldrsb", LDRSH = "ldrsh",
        LDRT = "ldrt", LSL = "lsl", LSR = "lsr", MCR = "mcr", MLA = "mla", MLS = "mls",
        MOV = "mov", MOVT = "movt", MOVW = "movw", MRC = "mrc", MRS = "mrs", MSR = "msr",
        MUL = "mul", MVN = "mvn", NOP = "nop", ORN = "orn", ORR = "orr", PLD = "pld",
        POP = "pop", PUSH = "push", RBIT = "rbit", REV = "rev", REV16 = "rev16", REVSH = "revsh",
        ROR = "ror", RRX = "rrx", RSB = "rsb", RSC = "rsc", SBC = "sbc", SBFX = "sbfx",
        SDIV = "sdiv", SEV = "sev", SMLAL = "smlal", SMULL = "smull",
        STM = "stm", STMDA = "stmda", STMDB = "stmdb", STMIB = "stmib",
        STR = "str", STRB = "strb", STRBT = "strbt", STRD = "strd", STREX = "strex",
        STREXB = "strexb", STREXH = "strexh", STRH = "strh", STRT = "strt",
        SUB = "sub", SUBW = "subw", SVC = "svc", SXTB = "sxtb", SXTH = "sxth",
        TBB = "tbb", TBH = "tbh", TEQ = "teq", TST = "tst", UBFX = "ubfx", UDF = "udf",
        UDIV = "udiv", UMLAL = "umlal", UMULL = "umull", UXTB = "uxtb", UXTH = "uxth",
        WFE = "wfe", WFI = "wfi", YIELD = "yield",
        // VFP
        VABS = "vabs", VADD = "vadd", VCMP = "vcmp", VCMPE = "vcmpe", VCVT = "vcvt",
        VDIV = "vdiv", VLDMIA = "vldmia", VLDR = "vldr", VMLA = "vmla", VMLS = "vmls",
        VMOV = "vmov", VMRS = "vmrs", VMSR = "vmsr", VMUL = "vmul", VNEG = "vneg",
        VNMUL = "vnmul", VPOP = "vpop", VPUSH = "vpush", VSQRT = "vsqrt",
        VSTMDB = "vstmdb", VSTMIA = "vstmia", VSTR = "vstr", VSUB = "vsub",
    }
}

id_table! {
    /// ARM instruction groups.
    pub enum ArmGroup {
        JUMP = "jump", CALL = "call", RET = "return", INT = "int", IRET = "iret",
        PRIVILEGE = "privilege", BRANCH_RELATIVE = "branch_relative",
        ARM = "arm", THUMB = "thumb", THUMB1ONLY = "thumb1only", THUMB2 = "thumb2",
        V4T = "v4t", V5T = "v5t", V6 = "v6", V6T2 = "v6t2", V7 = "v7", V8 = "v8",
        VFP2 = "vfp2", VFP3 = "vfp3", DIVIDE = "divide", MULOPS = "mulops",
        MCLASS = "mclass", NOTMCLASS = "notmclass",
    }
}

id_table! {
    /// ARM operand types.
    pub enum ArmOpType {
        REG = "reg", IMM = "imm", MEM = "mem", FP = "fp",
        CIMM = "cimm", PIMM = "pimm", SYSREG = "sysreg",
    }
}

id_table! {
    /// Condition codes. `AL` is the implicit condition and prints nothing.
    pub enum ArmCc {
        EQ = "eq", NE = "ne", HS = "hs", LO = "lo", MI = "mi", PL = "pl", VS = "vs", VC = "vc",
        HI = "hi", LS = "ls", GE = "ge", LT = "lt", GT = "gt", LE = "le", AL = "al",
    }
    aliases { "cs" => HS, "cc" => LO }
}

impl ArmCc {
    /// Condition from its 4-bit encoding; 15 has no condition.
    pub fn from_bits(bits: u32) -> Option<ArmCc> {
        match bits & 15 {
            15 => None,
            n => ArmCc::from_id(n as u16 + 1),
        }
    }

    /// Suffix text: empty for `AL`.
    pub fn suffix(self) -> &'static str {
        match self {
            ArmCc::AL | ArmCc::INVALID => "",
            cc => cc.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_banks() {
        assert_eq!(ArmReg::gpr(13), ArmReg::SP);
        assert_eq!(ArmReg::gpr(9).name(), "sb");
        assert_eq!(ArmReg::R12.numeric_name(), "r12");
        assert_eq!(ArmReg::S0.numeric_name(), "s0");
        assert_eq!(ArmReg::s(31), ArmReg::S31);
        assert_eq!(ArmReg::d(16), ArmReg::D16);
        assert_eq!(ArmReg::from_name("r13"), Some(ArmReg::SP));
        assert_eq!(ArmReg::LR.gpr_index(), Some(14));
        assert_eq!(ArmReg::D0.gpr_index(), None);
    }

    #[test]
    fn test_condition_codes() {
        assert_eq!(ArmCc::from_bits(0), Some(ArmCc::EQ));
        assert_eq!(ArmCc::from_bits(14), Some(ArmCc::AL));
        assert_eq!(ArmCc::from_bits(15), None);
        assert_eq!(ArmCc::AL.suffix(), "");
        assert_eq!(ArmCc::from_name("cs"), Some(ArmCc::HS));
    }
}
