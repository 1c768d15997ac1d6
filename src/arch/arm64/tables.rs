//! AArch64 register, instruction, group and condition tables.

use crate::table::{id_table, IdTable};

id_table! {
    /// AArch64 registers. Each bank is contiguous in encoding order.
    pub enum Arm64Reg {
        X0 = "x0", X1 = "x1", X2 = "x2", X3 = "x3", X4 = "x4", X5 = "x5", X6 = "x6", X7 = "x7",
        X8 = "x8", X9 = "x9", X10 = "x10", X11 = "x11", X12 = "x12", X13 = "x13", X14 = "x14", X15 = "x15",
        X16 = "x16", X17 = "x17", X18 = "x18", X19 = "x19", X20 = "x20", X21 = "x21", X22 = "x22", X23 = "x23",
        X24 = "x24", X25 = "x25", X26 = "x26", X27 = "x27", X28 = "x28", X29 = "x29", X30 = "x30", XZR = "xzr",
        SP = "sp", W0 = "w0", W1 = "w1", W2 = "w2", W3 = "w3", W4 = "w4", W5 = "w5", W6 = "w6",
        W7 = "w7", W8 = "w8", W9 = "w9", W10 = "w10", W11 = "w11", W12 = "w12", W13 = "w13", W14 = "w14",
        W15 = "w15", W16 = "w16", W17 = "w17", W18 = "w18", W19 = "w19", W20 = "w20", W21 = "w21", W22 = "w22",
        W23 = "w23", W24 = "w24", W25 = "w25", W26 = "w26", W27 = "w27", W28 = "w28", W29 = "w29", W30 = "w30",
        WZR = "wzr", WSP = "wsp", B0 = "b0", B1 = "b1", B2 = "b2", B3 = "b3", B4 = "b4", B5 = "b5",
        B6 = "b6", B7 = "b7", B8 = "b8", B9 = "b9", B10 = "b10", B11 = "b11", B12 = "b12", B13 = "b13",
        B14 = "b14", B15 = "b15", B16 = "b16", B17 = "b17", B18 = "b18", B19 = "b19", B20 = "b20", B21 = "b21",
        B22 = "b22", B23 = "b23", B24 = "b24", B25 = "b25", B26 = "b26", B27 = "b27", B28 = "b28", B29 = "b29",
        B30 = "b30", B31 = "b31", H0 = "h0", H1 = "h1", H2 = "h2", H3 = "h3", H4 = "h4", H5 = "h5",
        H6 = "h6", H7 = "h7", H8 = "h8", H9 = "h9", H10 = "h10", H11 = "h11", H12 = "h12", H13 = "h13",
        H14 = "h14", H15 = "h15", H16 = "h16", H17 = "h17", H18 = "h18", H19 = "h19", H20 = "h20", H21 = "h21",
        H22 = "h22", H23 = "h23", H24 = "h24", H25 = "h25", H26 = "h26", H27 = "h27", H28 = "h28", H29 = "h29",
        H30 = "h30", H31 = "h31", S0 = "s0", S1 = "s1", S2 = "s2", S3 = "s3", S4 = "s4", S5 = "s5",
        S6 = "s6", S7 = "s7", S8 = "s8", S9 = "s9", S10 = "s10", S11 = "s11", S12 = "s12", S13 = "s13",
        S14 = "s14", S15 = "s15", S16 = "s16", S17 = "s17", S18 = "s18", S19 = "s19", S20 = "s20", S21 = "s21",
        S22 = "s22", S23 = "s23", S24 = "s24", S25 = "s25", S26 = "s26", S27 = "s27", S28 = "s28", S29 = "s29",
        S30 = "s30", S31 = "s31", D0 = "d0", D1 = "d1", D2 = "d2", D3 = "d3", D4 = "d4", D5 = "d5",
        D6 = "d6", D7 = "d7", D8 = "d8", D9 = "d9", D10 = "d10", D11 = "d11", D12 = "d12", D13 = "d13",
        D14 = "d14", D15 = "d15", D16 = "d16", D17 = "d17", D18 = "d18", D19 = "d19", D20 = "d20", D21 = "d21",
        D22 = "d22", D23 = "d23", D24 = "d24", D25 = "d25", D26 = "d26", D27 = "d27", D28 = "d28", D29 = "d29",
        D30 = "d30", D31 = "d31", Q0 = "q0", Q1 = "q1", Q2 = "q2", Q3 = "q3", Q4 = "q4", Q5 = "q5",
        Q6 = "q6", Q7 = "q7", Q8 = "q8", Q9 = "q9", Q10 = "q10", Q11 = "q11", Q12 = "q12", Q13 = "q13",
        Q14 = "q14", Q15 = "q15", Q16 = "q16", Q17 = "q17", Q18 = "q18", Q19 = "q19", Q20 = "q20", Q21 = "q21",
        Q22 = "q22", Q23 = "q23", Q24 = "q24", Q25 = "q25", Q26 = "q26", Q27 = "q27", Q28 = "q28", Q29 = "q29",
        Q30 = "q30", Q31 = "q31",
        V0 = "v0", V1 = "v1", V2 = "v2", V3 = "v3", V4 = "v4", V5 = "v5", V6 = "v6", V7 = "v7",
        V8 = "v8", V9 = "v9", V10 = "v10", V11 = "v11", V12 = "v12", V13 = "v13", V14 = "v14", V15 = "v15",
        V16 = "v16", V17 = "v17", V18 = "v18", V19 = "v19", V20 = "v20", V21 = "v21", V22 = "v22", V23 = "v23",
        V24 = "v24", V25 = "v25", V26 = "v26", V27 = "v27", V28 = "v28", V29 = "v29", V30 = "v30", V31 = "v31",
        NZCV = "nzcv",
    }
    aliases { "fp" => X29, "lr" => X30, "ip0" => X16, "ip1" => X17 }
}

impl Arm64Reg {
    fn bank(first: Arm64Reg, n: u32) -> Arm64Reg {
        Arm64Reg::from_id(first as u16 + n as u16).unwrap_or_default()
    }

    /// General-purpose register `n`; 31 is the stack pointer when `sp` is set
    /// and the zero register otherwise.
    pub fn gpr(n: u32, wide: bool, sp: bool) -> Arm64Reg {
        match (n & 31, wide, sp) {
            (31, true, true) => Arm64Reg::SP,
            (31, true, false) => Arm64Reg::XZR,
            (31, false, true) => Arm64Reg::WSP,
            (31, false, false) => Arm64Reg::WZR,
            (n, true, _) => Self::bank(Arm64Reg::X0, n),
            (n, false, _) => Self::bank(Arm64Reg::W0, n),
        }
    }

    /// Scalar SIMD/FP register `n` of `width` bytes (1, 2, 4, 8 or 16).
    pub fn fp(n: u32, width: u32) -> Arm64Reg {
        let first = match width {
            1 => Arm64Reg::B0,
            2 => Arm64Reg::H0,
            4 => Arm64Reg::S0,
            8 => Arm64Reg::D0,
            _ => Arm64Reg::Q0,
        };
        Self::bank(first, n & 31)
    }

    /// Vector register `n`, printed with an arrangement or element suffix.
    pub fn vector(n: u32) -> Arm64Reg {
        Self::bank(Arm64Reg::V0, n & 31)
    }

    /// Whether this is a 64-bit general-purpose register (including SP/XZR).
    pub fn is_x(self) -> bool {
        (Arm64Reg::X0..=Arm64Reg::SP).contains(&self)
    }
}

id_table! {
    /// AArch64 instructions, named by printed mnemonic.
    pub enum Arm64Insn {
        ADR = "adr", ADRP = "adrp", ADD = "add", ADDS = "adds", SUB = "sub", SUBS = "subs", CMP = "cmp",
        CMN = "cmn", MOV = "mov", AND = "and", ORR = "orr", EOR = "eor", ANDS = "ands", TST = "tst",
        MOVN = "movn", MOVZ = "movz", MOVK = "movk", SBFM = "sbfm", BFM = "bfm", UBFM = "ubfm", ASR = "asr",
        LSL = "lsl", LSR = "lsr", ROR = "ror", SXTB = "sxtb", SXTH = "sxth", SXTW = "sxtw", UXTB = "uxtb",
        UXTH = "uxth", SBFX = "sbfx", UBFX = "ubfx", SBFIZ = "sbfiz", UBFIZ = "ubfiz", BFI = "bfi", BFXIL = "bfxil",
        EXTR = "extr", B = "b", BL = "bl", BR = "br", BLR = "blr", RET = "ret", ERET = "eret",
        DRPS = "drps", CBZ = "cbz", CBNZ = "cbnz", TBZ = "tbz", TBNZ = "tbnz", SVC = "svc", HVC = "hvc",
        SMC = "smc", BRK = "brk", HLT = "hlt", NOP = "nop", YIELD = "yield", WFE = "wfe", WFI = "wfi",
        SEV = "sev", SEVL = "sevl", HINT = "hint", CLREX = "clrex", DSB = "dsb", DMB = "dmb", ISB = "isb",
        MRS = "mrs", MSR = "msr", SYS = "sys", SYSL = "sysl", LDR = "ldr", STR = "str", LDRB = "ldrb",
        STRB = "strb", LDRH = "ldrh", STRH = "strh", LDRSB = "ldrsb", LDRSH = "ldrsh", LDRSW = "ldrsw", LDUR = "ldur",
        STUR = "stur", LDURB = "ldurb", STURB = "sturb", LDURH = "ldurh", STURH = "sturh", LDURSB = "ldursb", LDURSH = "ldursh",
        LDURSW = "ldursw", PRFM = "prfm", PRFUM = "prfum", LDP = "ldp", STP = "stp", LDPSW = "ldpsw", LDNP = "ldnp",
        STNP = "stnp", LDXR = "ldxr", STXR = "stxr", LDAXR = "ldaxr", STLXR = "stlxr", LDAR = "ldar", STLR = "stlr",
        LDXRB = "ldxrb", STXRB = "stxrb", LDAXRB = "ldaxrb", STLXRB = "stlxrb", LDARB = "ldarb", STLRB = "stlrb", LDXRH = "ldxrh",
        STXRH = "stxrh", LDAXRH = "ldaxrh", STLXRH = "stlxrh", LDARH = "ldarh", STLRH = "stlrh", LDXP = "ldxp", STXP = "stxp",
        LDAXP = "ldaxp", STLXP = "stlxp", BIC = "bic", ORN = "orn", EON = "eon", BICS = "bics", MVN = "mvn",
        NEG = "neg", NEGS = "negs", ADC = "adc", ADCS = "adcs", SBC = "sbc", SBCS = "sbcs", NGC = "ngc",
        NGCS = "ngcs", CSEL = "csel", CSINC = "csinc", CSINV = "csinv", CSNEG = "csneg", CSET = "cset", CSETM = "csetm",
        CINC = "cinc", CINV = "cinv", CNEG = "cneg", CCMP = "ccmp", CCMN = "ccmn", RBIT = "rbit", REV16 = "rev16",
        REV = "rev", REV32 = "rev32", CLZ = "clz", CLS = "cls", UDIV = "udiv", SDIV = "sdiv", MADD = "madd",
        MSUB = "msub", MUL = "mul", MNEG = "mneg", SMADDL = "smaddl", SMSUBL = "smsubl", UMADDL = "umaddl", UMSUBL = "umsubl",
        SMULL = "smull", UMULL = "umull", SMNEGL = "smnegl", UMNEGL = "umnegl", SMULH = "smulh", UMULH = "umulh", CRC32B = "crc32b",
        CRC32H = "crc32h", CRC32W = "crc32w", CRC32X = "crc32x", CRC32CB = "crc32cb", CRC32CH = "crc32ch", CRC32CW = "crc32cw", CRC32CX = "crc32cx",
        FMOV = "fmov", FADD = "fadd", FSUB = "fsub", FMUL = "fmul", FDIV = "fdiv", FNMUL = "fnmul", FMAX = "fmax",
        FMIN = "fmin", FMAXNM = "fmaxnm", FMINNM = "fminnm", FABS = "fabs", FNEG = "fneg", FSQRT = "fsqrt", FCVT = "fcvt",
        FRINTN = "frintn", FRINTP = "frintp", FRINTM = "frintm", FRINTZ = "frintz", FRINTA = "frinta", FRINTX = "frintx", FRINTI = "frinti",
        FCMP = "fcmp", FCMPE = "fcmpe", FCCMP = "fccmp", FCCMPE = "fccmpe", FCSEL = "fcsel", SCVTF = "scvtf", UCVTF = "ucvtf",
        FCVTZS = "fcvtzs", FCVTZU = "fcvtzu", FCVTNS = "fcvtns", FCVTNU = "fcvtnu", FCVTAS = "fcvtas", FCVTAU = "fcvtau", FCVTPS = "fcvtps",
        FCVTPU = "fcvtpu", FCVTMS = "fcvtms", FCVTMU = "fcvtmu", FMADD = "fmadd", FMSUB = "fmsub", FNMADD = "fnmadd", FNMSUB = "fnmsub",
        SHADD = "shadd", UHADD = "uhadd", SQADD = "sqadd", UQADD = "uqadd", SRHADD = "srhadd", URHADD = "urhadd", SHSUB = "shsub",
        UHSUB = "uhsub", SQSUB = "sqsub", UQSUB = "uqsub", CMGT = "cmgt", CMHI = "cmhi", CMGE = "cmge", CMHS = "cmhs",
        CMTST = "cmtst", CMEQ = "cmeq", SSHL = "sshl", USHL = "ushl", SQSHL = "sqshl", UQSHL = "uqshl", SRSHL = "srshl",
        URSHL = "urshl", SQRSHL = "sqrshl", UQRSHL = "uqrshl", SMAX = "smax", UMAX = "umax", SMIN = "smin", UMIN = "umin",
        SABD = "sabd", UABD = "uabd", SABA = "saba", UABA = "uaba", MLA = "mla", MLS = "mls", PMUL = "pmul",
        SMAXP = "smaxp", UMAXP = "umaxp", SMINP = "sminp", UMINP = "uminp", SQDMULH = "sqdmulh", SQRDMULH = "sqrdmulh", ADDP = "addp",
        BSL = "bsl", BIT = "bit", BIF = "bif", FADDP = "faddp", FABD = "fabd", FMULX = "fmulx", FMAXP = "fmaxp",
        FMINP = "fminp", FMLA = "fmla", FMLS = "fmls", FCMEQ = "fcmeq", FCMGE = "fcmge", FCMGT = "fcmgt", SADDL = "saddl",
        UADDL = "uaddl", SADDW = "saddw", UADDW = "uaddw", SSUBL = "ssubl", USUBL = "usubl", SSUBW = "ssubw", USUBW = "usubw",
        ADDHN = "addhn", RADDHN = "raddhn", SUBHN = "subhn", RSUBHN = "rsubhn", SABAL = "sabal", UABAL = "uabal", SABDL = "sabdl",
        UABDL = "uabdl", SMLAL = "smlal", UMLAL = "umlal", SMLSL = "smlsl", UMLSL = "umlsl", SQDMLAL = "sqdmlal", SQDMLSL = "sqdmlsl",
        SQDMULL = "sqdmull", DUP = "dup", INS = "ins", SMOV = "smov", UMOV = "umov", LD1 = "ld1", LD2 = "ld2",
        LD3 = "ld3", LD4 = "ld4", ST1 = "st1", ST2 = "st2", ST3 = "st3", ST4 = "st4",
    }
}

id_table! {
    /// AArch64 instruction groups.
    pub enum Arm64Group {
        JUMP = "jump", CALL = "call", RET = "return", INT = "int", IRET = "iret",
        PRIVILEGE = "privilege", BRANCH_RELATIVE = "branch_relative",
        CRYPTO = "crypto", FPARMV8 = "fparmv8", NEON = "neon", CRC = "crc",
    }
}

id_table! {
    /// AArch64 operand types.
    pub enum Arm64OpType {
        REG = "reg", IMM = "imm", MEM = "mem", FP = "fp", CIMM = "cimm",
        REG_MRS = "reg_mrs", REG_MSR = "reg_msr", PSTATE = "pstate",
        SYS = "sys", PREFETCH = "prefetch", BARRIER = "barrier",
    }
}

id_table! {
    /// Condition codes, in encoding order after `INVALID`.
    pub enum Arm64Cc {
        EQ = "eq", NE = "ne", HS = "hs", LO = "lo", MI = "mi", PL = "pl", VS = "vs", VC = "vc",
        HI = "hi", LS = "ls", GE = "ge", LT = "lt", GT = "gt", LE = "le", AL = "al", NV = "nv",
    }
    aliases { "cs" => HS, "cc" => LO }
}

impl Arm64Cc {
    /// Condition from its 4-bit encoding.
    pub fn from_bits(cond: u32) -> Arm64Cc {
        Arm64Cc::from_id((cond & 15) as u16 + 1).unwrap_or_default()
    }

    /// Encoding of this condition.
    pub fn bits(self) -> u32 {
        (self as u32).saturating_sub(1)
    }

    /// The opposite condition (`AL`/`NV` map to each other).
    pub fn invert(self) -> Arm64Cc {
        Arm64Cc::from_bits(self.bits() ^ 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpr_banks() {
        assert_eq!(Arm64Reg::gpr(0, true, false), Arm64Reg::X0);
        assert_eq!(Arm64Reg::gpr(31, true, true), Arm64Reg::SP);
        assert_eq!(Arm64Reg::gpr(31, false, false), Arm64Reg::WZR);
        assert_eq!(Arm64Reg::gpr(30, false, false).name(), "w30");
        assert_eq!(Arm64Reg::fp(7, 8).name(), "d7");
        assert_eq!(Arm64Reg::fp(31, 16).name(), "q31");
        assert!(Arm64Reg::SP.is_x());
        assert!(!Arm64Reg::W3.is_x());
        assert_eq!(Arm64Reg::from_name("lr"), Some(Arm64Reg::X30));
        assert_eq!(Arm64Reg::vector(31), Arm64Reg::V31);
        assert_eq!(Arm64Reg::vector(2).name(), "v2");
    }

    #[test]
    fn test_condition_inversion() {
        assert_eq!(Arm64Cc::from_bits(0), Arm64Cc::EQ);
        assert_eq!(Arm64Cc::EQ.invert(), Arm64Cc::NE);
        assert_eq!(Arm64Cc::LT.invert(), Arm64Cc::GE);
        assert_eq!(Arm64Cc::from_bits(15), Arm64Cc::NV);
    }
}
