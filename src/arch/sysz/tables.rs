//! SystemZ register, instruction and group tables.

use crate::table::{id_table, IdTable};

id_table! {
    /// SystemZ registers.
    pub enum SyszReg {
        R0 = "r0", R1 = "r1", R2 = "r2", R3 = "r3", R4 = "r4", R5 = "r5", R6 = "r6", R7 = "r7",
        R8 = "r8", R9 = "r9", R10 = "r10", R11 = "r11", R12 = "r12", R13 = "r13", R14 = "r14", R15 = "r15",
        F0 = "f0", F1 = "f1", F2 = "f2", F3 = "f3", F4 = "f4", F5 = "f5", F6 = "f6", F7 = "f7",
        F8 = "f8", F9 = "f9", F10 = "f10", F11 = "f11", F12 = "f12", F13 = "f13", F14 = "f14", F15 = "f15",
        CC = "cc",
        A0 = "a0", A1 = "a1", A2 = "a2", A3 = "a3", A4 = "a4", A5 = "a5", A6 = "a6", A7 = "a7",
        A8 = "a8", A9 = "a9", A10 = "a10", A11 = "a11", A12 = "a12", A13 = "a13", A14 = "a14", A15 = "a15",
    }
}

impl SyszReg {
    pub fn gpr(n: u32) -> SyszReg {
        SyszReg::from_id(SyszReg::R0 as u16 + (n & 15) as u16).unwrap_or_default()
    }

    pub fn fpr(n: u32) -> SyszReg {
        SyszReg::from_id(SyszReg::F0 as u16 + (n & 15) as u16).unwrap_or_default()
    }

    /// Access register `n`.
    pub fn ar(n: u32) -> SyszReg {
        SyszReg::from_id(SyszReg::A0 as u16 + (n & 15) as u16).unwrap_or_default()
    }
}

id_table! {
    /// SystemZ instructions. Each condition-coded branch family has one id;
    /// the printed mnemonic carries the condition.
    pub enum SyszInsn {
        A = "a", ADB = "adb", ADBR = "adbr", AEB = "aeb", AEBR = "aebr", AFI = "afi", AG = "ag",
        AGF = "agf", AGFI = "agfi", AGFR = "agfr", AGHI = "aghi", AGR = "agr", AGRK = "agrk",
        AGSI = "agsi", AH = "ah", AHI = "ahi", AHY = "ahy", AL = "al", ALFI = "alfi", ALG = "alg",
        ALGFI = "algfi", ALGR = "algr", ALGRK = "algrk", ALR = "alr", ALRK = "alrk", AR = "ar",
        ARK = "ark", ASI = "asi", AY = "ay",
        BALR = "balr", BAS = "bas", BASR = "basr", BC = "bc", BCR = "bcr", BCT = "bct",
        BCTGR = "bctgr", BCTR = "bctr", BRAS = "bras", BRASL = "brasl", BRC = "brc", BRCL = "brcl",
        BRCT = "brct", BRCTG = "brctg",
        C = "c", CDB = "cdb", CDBR = "cdbr", CDFBR = "cdfbr", CDGBR = "cdgbr", CEB = "ceb",
        CEBR = "cebr", CEFBR = "cefbr", CEGBR = "cegbr", CFDBR = "cfdbr", CFEBR = "cfebr",
        CFI = "cfi", CG = "cg", CGDBR = "cgdbr", CGEBR = "cgebr", CGF = "cgf", CGFI = "cgfi",
        CGFR = "cgfr", CGHI = "cghi", CGIJ = "cgij", CGR = "cgr", CGRJ = "cgrj", CH = "ch",
        CHI = "chi", CHY = "chy", CIJ = "cij", CL = "cl", CLC = "clc", CLFI = "clfi", CLG = "clg",
        CLGFI = "clgfi", CLGIJ = "clgij", CLGR = "clgr", CLGRJ = "clgrj", CLI = "cli",
        CLIJ = "clij", CLIY = "cliy", CLR = "clr", CLRJ = "clrj", CR = "cr", CRJ = "crj",
        CS = "cs", CSG = "csg", CSY = "csy", CY = "cy",
        D = "d", DDB = "ddb", DDBR = "ddbr", DEB = "deb", DEBR = "debr", DLGR = "dlgr", DR = "dr",
        DSGR = "dsgr", EAR = "ear", EX = "ex", EXRL = "exrl",
        IC = "ic", ICY = "icy", IIHF = "iihf", IIHH = "iihh", IIHL = "iihl", IILF = "iilf",
        IILH = "iilh", IILL = "iill", IPM = "ipm",
        L = "l", LA = "la", LARL = "larl", LAY = "lay", LB = "lb", LBR = "lbr", LCDBR = "lcdbr",
        LCEBR = "lcebr", LCGR = "lcgr", LCR = "lcr", LD = "ld", LDEB = "ldeb", LDEBR = "ldebr",
        LDGR = "ldgr", LDR = "ldr", LDY = "ldy", LE = "le", LEDBR = "ledbr", LER = "ler",
        LEY = "ley", LG = "lg", LGB = "lgb", LGBR = "lgbr", LGDR = "lgdr", LGF = "lgf",
        LGFI = "lgfi", LGFR = "lgfr", LGFRL = "lgfrl", LGH = "lgh", LGHI = "lghi", LGHR = "lghr",
        LGHRL = "lghrl", LGR = "lgr", LGRL = "lgrl", LH = "lh", LHI = "lhi", LHR = "lhr",
        LHRL = "lhrl", LHY = "lhy", LLC = "llc", LLCR = "llcr", LLGC = "llgc", LLGCR = "llgcr",
        LLGF = "llgf", LLGFR = "llgfr", LLGFRL = "llgfrl", LLGH = "llgh", LLGHR = "llghr",
        LLH = "llh", LLHR = "llhr", LLHRL = "llhrl", LLIHF = "llihf", LLIHH = "llihh",
        LLIHL = "llihl", LLILF = "llilf", LLILH = "llilh", LLILL = "llill", LM = "lm",
        LMG = "lmg", LMY = "lmy", LNDBR = "lndbr", LNEBR = "lnebr", LNGR = "lngr", LNR = "lnr",
        LOCGR = "locgr", LOCR = "locr", LPDBR = "lpdbr", LPEBR = "lpebr", LPGR = "lpgr",
        LPR = "lpr", LR = "lr", LRL = "lrl", LRV = "lrv", LRVG = "lrvg", LRVGR = "lrvgr",
        LRVR = "lrvr", LT = "lt", LTDBR = "ltdbr", LTEBR = "ltebr", LTG = "ltg", LTGFR = "ltgfr",
        LTGR = "ltgr", LTR = "ltr", LY = "ly",
        M = "m", MDB = "mdb", MDBR = "mdbr", MEEB = "meeb", MEEBR = "meebr", MGHI = "mghi",
        MH = "mh", MHI = "mhi", MLGR = "mlgr", MR = "mr", MSG = "msg", MSGR = "msgr",
        MSR = "msr", MVC = "mvc", MVI = "mvi", MVIY = "mviy",
        N = "n", NC = "nc", NG = "ng", NGR = "ngr", NGRK = "ngrk", NI = "ni", NIHF = "nihf",
        NIHH = "nihh", NIHL = "nihl", NILF = "nilf", NILH = "nilh", NILL = "nill", NIY = "niy",
        NR = "nr", NRK = "nrk", NY = "ny",
        O = "o", OC = "oc", OG = "og", OGR = "ogr", OGRK = "ogrk", OI = "oi", OIHF = "oihf",
        OIHH = "oihh", OIHL = "oihl", OILF = "oilf", OILH = "oilh", OILL = "oill", OIY = "oiy",
        OR = "or", ORK = "ork", OY = "oy",
        RISBG = "risbg", RLL = "rll", RLLG = "rllg",
        S = "s", SDB = "sdb", SDBR = "sdbr", SEB = "seb", SEBR = "sebr", SG = "sg", SGF = "sgf",
        SGFR = "sgfr", SGR = "sgr", SGRK = "sgrk", SH = "sh", SHY = "shy", SL = "sl", SLA = "sla",
        SLAG = "slag", SLAK = "slak", SLDA = "slda", SLDL = "sldl", SLFI = "slfi", SLG = "slg",
        SLGFI = "slgfi", SLGR = "slgr", SLGRK = "slgrk", SLL = "sll", SLLG = "sllg",
        SLLK = "sllk", SLR = "slr", SLRK = "slrk", SQDBR = "sqdbr", SQEBR = "sqebr", SR = "sr",
        SRA = "sra", SRAG = "srag", SRAK = "srak", SRDA = "srda", SRDL = "srdl", SRK = "srk",
        SRL = "srl", SRLG = "srlg", SRLK = "srlk", ST = "st", STC = "stc", STCY = "stcy",
        STD = "std", STDY = "stdy", STE = "ste", STEY = "stey", STG = "stg", STGRL = "stgrl",
        STH = "sth", STHRL = "sthrl", STHY = "sthy", STM = "stm", STMG = "stmg", STMY = "stmy",
        STRL = "strl", STRV = "strv", STRVG = "strvg", STY = "sty", SVC = "svc", SY = "sy",
        TM = "tm", TMHH = "tmhh", TMHL = "tmhl", TMLH = "tmlh", TMLL = "tmll", TMY = "tmy",
        TR = "tr",
        X = "x", XC = "xc", XG = "xg", XGR = "xgr", XGRK = "xgrk", XI = "xi", XIHF = "xihf",
        XILF = "xilf", XIY = "xiy", XR = "xr", XRK = "xrk", XY = "xy",
    }
}

id_table! {
    /// SystemZ instruction groups.
    pub enum SyszGroup {
        JUMP = "jump", CALL = "call", RET = "return", INT = "int", IRET = "iret",
        PRIVILEGE = "privilege", BRANCH_RELATIVE = "branch_relative",
        DISTINCTOPS = "distinctops", LOADSTOREONCOND = "loadstoreoncond", FPU = "fpu",
    }
}

id_table! {
    /// SystemZ operand types.
    pub enum SyszOpType {
        REG = "reg", IMM = "imm", MEM = "mem",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_banks() {
        assert_eq!(SyszReg::gpr(15), SyszReg::R15);
        assert_eq!(SyszReg::fpr(2), SyszReg::F2);
        assert_eq!(SyszReg::ar(8).name(), "a8");
        assert_eq!(SyszReg::name_of(SyszReg::CC as u16), "cc");
        assert_eq!(SyszInsn::from_name("brasl"), Some(SyszInsn::BRASL));
    }
}
