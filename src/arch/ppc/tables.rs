//! PowerPC register, instruction and group tables.

use crate::table::{id_table, IdTable};

id_table! {
    /// PowerPC registers. GPRs, FPRs and CR fields are contiguous in
    /// encoding order.
    pub enum PpcReg {
        R0 = "r0", R1 = "r1", R2 = "r2", R3 = "r3", R4 = "r4", R5 = "r5", R6 = "r6", R7 = "r7",
        R8 = "r8", R9 = "r9", R10 = "r10", R11 = "r11", R12 = "r12", R13 = "r13", R14 = "r14", R15 = "r15",
        R16 = "r16", R17 = "r17", R18 = "r18", R19 = "r19", R20 = "r20", R21 = "r21", R22 = "r22", R23 = "r23",
        R24 = "r24", R25 = "r25", R26 = "r26", R27 = "r27", R28 = "r28", R29 = "r29", R30 = "r30", R31 = "r31",
        F0 = "f0", F1 = "f1", F2 = "f2", F3 = "f3", F4 = "f4", F5 = "f5", F6 = "f6", F7 = "f7",
        F8 = "f8", F9 = "f9", F10 = "f10", F11 = "f11", F12 = "f12", F13 = "f13", F14 = "f14", F15 = "f15",
        F16 = "f16", F17 = "f17", F18 = "f18", F19 = "f19", F20 = "f20", F21 = "f21", F22 = "f22", F23 = "f23",
        F24 = "f24", F25 = "f25", F26 = "f26", F27 = "f27", F28 = "f28", F29 = "f29", F30 = "f30", F31 = "f31",
        CR0 = "cr0", CR1 = "cr1", CR2 = "cr2", CR3 = "cr3", CR4 = "cr4", CR5 = "cr5", CR6 = "cr6", CR7 = "cr7",
        LR = "lr", CTR = "ctr", XER = "xer", MSR = "msr", FPSCR = "fpscr", TB = "tb",
    }
    aliases { "sp" => R1, "rtoc" => R2 }
}

impl PpcReg {
    fn offset(base: PpcReg, n: u32) -> PpcReg {
        PpcReg::from_id(base as u16 + n as u16).unwrap_or_default()
    }

    pub fn gpr(n: u32) -> PpcReg {
        PpcReg::offset(PpcReg::R0, n & 31)
    }

    pub fn fpr(n: u32) -> PpcReg {
        PpcReg::offset(PpcReg::F0, n & 31)
    }

    pub fn cr(n: u32) -> PpcReg {
        PpcReg::offset(PpcReg::CR0, n & 7)
    }

    /// Register number as printed without names (`r3` -> `3`).
    pub fn number(self) -> u32 {
        let id = self as u16;
        let base = if id >= PpcReg::CR0 as u16 {
            PpcReg::CR0
        } else if id >= PpcReg::F0 as u16 {
            PpcReg::F0
        } else {
            PpcReg::R0
        };
        (id - base as u16) as u32
    }
}

id_table! {
    /// PowerPC instructions, simplified mnemonics included.
    pub enum PpcInsn {
        ADD = "add", ADDC = "addc", ADDE = "adde", ADDI = "addi", ADDIC = "addic", ADDIS = "addis",
        ADDME = "addme", ADDZE = "addze", AND = "and", ANDC = "andc", ANDI = "andi.", ANDIS = "andis.",
        B = "b", BA = "ba", BL = "bl", BLA = "bla", BC = "bc", BCA = "bca", BCL = "bcl", BCLA = "bcla",
        BCLR = "bclr", BCLRL = "bclrl", BCCTR = "bcctr", BCCTRL = "bcctrl",
        BLR = "blr", BLRL = "blrl", BCTR = "bctr", BCTRL = "bctrl",
        CLRLDI = "clrldi", CLRLWI = "clrlwi",
        CMPD = "cmpd", CMPDI = "cmpdi", CMPLD = "cmpld", CMPLDI = "cmpldi",
        CMPLW = "cmplw", CMPLWI = "cmplwi", CMPW = "cmpw", CMPWI = "cmpwi",
        CNTLZD = "cntlzd", CNTLZW = "cntlzw",
        CRAND = "crand", CRANDC = "crandc", CRCLR = "crclr", CREQV = "creqv", CRMOVE = "crmove",
        CRNAND = "crnand", CRNOR = "crnor", CRNOT = "crnot", CROR = "cror", CRORC = "crorc",
        CRSET = "crset", CRXOR = "crxor",
        DCBF = "dcbf", DCBST = "dcbst", DCBT = "dcbt", DCBTST = "dcbtst", DCBZ = "dcbz",
        DIVD = "divd", DIVDU = "divdu", DIVW = "divw", DIVWU = "divwu",
        EIEIO = "eieio", EQV = "eqv", EXTSB = "extsb", EXTSH = "extsh", EXTSW = "extsw",
        ICBI = "icbi", ISYNC = "isync",
        LBZ = "lbz", LBZU = "lbzu", LBZUX = "lbzux", LBZX = "lbzx",
        LD = "ld", LDARX = "ldarx", LDU = "ldu", LDUX = "ldux", LDX = "ldx",
        LHA = "lha", LHAU = "lhau", LHAUX = "lhaux", LHAX = "lhax", LHBRX = "lhbrx",
        LHZ = "lhz", LHZU = "lhzu", LHZUX = "lhzux", LHZX = "lhzx",
        LI = "li", LIS = "lis", LMW = "lmw",
        LWA = "lwa", LWARX = "lwarx", LWAUX = "lwaux", LWAX = "lwax", LWBRX = "lwbrx",
        LWZ = "lwz", LWZU = "lwzu", LWZUX = "lwzux", LWZX = "lwzx",
        MCRF = "mcrf", MFCR = "mfcr", MFCTR = "mfctr", MFLR = "mflr", MFMSR = "mfmsr",
        MFSPR = "mfspr", MFTB = "mftb", MFXER = "mfxer", MR = "mr",
        MTCR = "mtcr", MTCRF = "mtcrf", MTCTR = "mtctr", MTLR = "mtlr", MTMSR = "mtmsr",
        MTSPR = "mtspr", MTXER = "mtxer",
        MULHD = "mulhd", MULHDU = "mulhdu", MULHW = "mulhw", MULHWU = "mulhwu",
        MULLD = "mulld", MULLI = "mulli", MULLW = "mullw",
        NAND = "nand", NEG = "neg", NOP = "nop", NOR = "nor", NOT = "not",
        OR = "or", ORC = "orc", ORI = "ori", ORIS = "oris", RFI = "rfi",
        RLDCL = "rldcl", RLDCR = "rldcr", RLDIC = "rldic", RLDICL = "rldicl", RLDICR = "rldicr",
        RLDIMI = "rldimi", RLWIMI = "rlwimi", RLWINM = "rlwinm", RLWNM = "rlwnm",
        ROTLD = "rotld", ROTLDI = "rotldi", ROTLW = "rotlw", ROTLWI = "rotlwi",
        SC = "sc", SLD = "sld", SLDI = "sldi", SLW = "slw", SLWI = "slwi",
        SRAD = "srad", SRADI = "sradi", SRAW = "sraw", SRAWI = "srawi",
        SRD = "srd", SRDI = "srdi", SRW = "srw", SRWI = "srwi",
        STB = "stb", STBU = "stbu", STBUX = "stbux", STBX = "stbx",
        STD = "std", STDCX = "stdcx.", STDU = "stdu", STDUX = "stdux", STDX = "stdx",
        STH = "sth", STHBRX = "sthbrx", STHU = "sthu", STHUX = "sthux", STHX = "sthx",
        STMW = "stmw", STW = "stw", STWBRX = "stwbrx", STWCX = "stwcx.",
        STWU = "stwu", STWUX = "stwux", STWX = "stwx",
        SUBF = "subf", SUBFC = "subfc", SUBFE = "subfe", SUBFIC = "subfic",
        SUBFME = "subfme", SUBFZE = "subfze", SYNC = "sync", LWSYNC = "lwsync",
        TD = "td", TDI = "tdi", TRAP = "trap", TW = "tw", TWI = "twi",
        XOR = "xor", XORI = "xori", XORIS = "xoris",
        // floating point
        FABS = "fabs", FADD = "fadd", FADDS = "fadds", FCFID = "fcfid", FCMPO = "fcmpo",
        FCMPU = "fcmpu", FCTID = "fctid", FCTIDZ = "fctidz", FCTIW = "fctiw", FCTIWZ = "fctiwz",
        FDIV = "fdiv", FDIVS = "fdivs", FMADD = "fmadd", FMADDS = "fmadds", FMR = "fmr",
        FMSUB = "fmsub", FMSUBS = "fmsubs", FMUL = "fmul", FMULS = "fmuls", FNABS = "fnabs",
        FNEG = "fneg", FNMADD = "fnmadd", FNMADDS = "fnmadds", FNMSUB = "fnmsub",
        FNMSUBS = "fnmsubs", FRES = "fres", FRSP = "frsp", FRSQRTE = "frsqrte", FSEL = "fsel",
        FSQRT = "fsqrt", FSQRTS = "fsqrts", FSUB = "fsub", FSUBS = "fsubs",
        LFD = "lfd", LFDU = "lfdu", LFDUX = "lfdux", LFDX = "lfdx",
        LFS = "lfs", LFSU = "lfsu", LFSUX = "lfsux", LFSX = "lfsx",
        MFFS = "mffs", MTFSB0 = "mtfsb0", MTFSB1 = "mtfsb1", MTFSF = "mtfsf",
        STFD = "stfd", STFDU = "stfdu", STFDUX = "stfdux", STFDX = "stfdx",
        STFS = "stfs", STFSU = "stfsu", STFSUX = "stfsux", STFSX = "stfsx",
    }
}

id_table! {
    /// PowerPC instruction groups.
    pub enum PpcGroup {
        JUMP = "jump", CALL = "call", RET = "return", INT = "int", IRET = "iret",
        PRIVILEGE = "privilege", BRANCH_RELATIVE = "branch_relative",
        MODE64 = "mode64", FPU = "fpu",
    }
}

id_table! {
    /// PowerPC operand types.
    pub enum PpcOpType {
        REG = "reg", IMM = "imm", MEM = "mem", CRX = "crx",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_banks() {
        assert_eq!(PpcReg::gpr(31), PpcReg::R31);
        assert_eq!(PpcReg::fpr(1), PpcReg::F1);
        assert_eq!(PpcReg::cr(7), PpcReg::CR7);
        assert_eq!(PpcReg::R13.number(), 13);
        assert_eq!(PpcReg::F2.number(), 2);
        assert_eq!(PpcReg::CR6.number(), 6);
        assert_eq!(PpcReg::from_name("sp"), Some(PpcReg::R1));
    }
}
