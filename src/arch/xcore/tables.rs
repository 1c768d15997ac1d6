//! XCore register, instruction and group tables.

use crate::table::{id_table, IdTable};

id_table! {
    /// XCore registers. The first sixteen follow the 4-bit register
    /// field encoding.
    pub enum XcoreReg {
        R0 = "r0", R1 = "r1", R2 = "r2", R3 = "r3", R4 = "r4", R5 = "r5",
        R6 = "r6", R7 = "r7", R8 = "r8", R9 = "r9", R10 = "r10", R11 = "r11",
        CP = "cp", DP = "dp", SP = "sp", LR = "lr",
        PC = "pc", SPC = "spc", SSR = "ssr", SED = "sed", ET = "et", ED = "ed",
        KEP = "kep", KSP = "ksp", ID = "id",
    }
}

impl XcoreReg {
    pub fn from_field(n: u32) -> XcoreReg {
        XcoreReg::from_id(XcoreReg::R0 as u16 + (n & 15) as u16).unwrap_or_default()
    }
}

id_table! {
    /// XCore instructions.
    pub enum XcoreInsn {
        ADD = "add", AND = "and", ANDNOT = "andnot", ASHR = "ashr",
        BAU = "bau", BF = "bf", BITREV = "bitrev", BL = "bl", BLA = "bla", BLAT = "blat",
        BRU = "bru", BT = "bt", BU = "bu", BYTEREV = "byterev",
        CHKCT = "chkct", CLRE = "clre", CLRPT = "clrpt", CLRSR = "clrsr", CLZ = "clz",
        CRC32 = "crc32",
        DCALL = "dcall", DENTSP = "dentsp", DGETREG = "dgetreg", DIVS = "divs", DIVU = "divu",
        DRESTSP = "drestsp", DRET = "dret",
        ECALLF = "ecallf", ECALLT = "ecallt", EDU = "edu", EEF = "eef", EET = "eet",
        EEU = "eeu", ENDIN = "endin", ENTSP = "entsp", EQ = "eq", EXTDP = "extdp",
        EXTSP = "extsp",
        FREER = "freer", FREET = "freet",
        GET = "get", GETR = "getr", GETSR = "getsr", GETST = "getst", GETTS = "getts",
        IN = "in", INCT = "inct", INIT = "init", INSHR = "inshr", INT = "int",
        KCALL = "kcall", KENTSP = "kentsp", KRESTSP = "krestsp", KRET = "kret",
        LD16S = "ld16s", LD8U = "ld8u", LDA16 = "lda16", LDAP = "ldap", LDAW = "ldaw",
        LDC = "ldc", LDW = "ldw", LMUL = "lmul", LSS = "lss", LSU = "lsu",
        MJOIN = "mjoin", MKMSK = "mkmsk", MSYNC = "msync", MUL = "mul",
        NEG = "neg", NOT = "not",
        OR = "or", OUT = "out", OUTCT = "outct", OUTSHR = "outshr", OUTT = "outt",
        PEEK = "peek",
        REMS = "rems", REMU = "remu", RETSP = "retsp",
        SET = "set", SETC = "setc", SETD = "setd", SETEV = "setev", SETPSC = "setpsc",
        SETPT = "setpt", SETSR = "setsr", SETV = "setv", SEXT = "sext", SHL = "shl",
        SHR = "shr", SSYNC = "ssync", ST16 = "st16", ST8 = "st8", START = "start", STW = "stw",
        SUB = "sub", SYNCR = "syncr",
        TESTCT = "testct", TESTWCT = "testwct",
        WAITEF = "waitef", WAITET = "waitet", WAITEU = "waiteu",
        XOR = "xor", ZEXT = "zext",
    }
}

id_table! {
    /// XCore instruction groups.
    pub enum XcoreGroup {
        JUMP = "jump", CALL = "call", RET = "return", INT = "int", IRET = "iret",
        PRIVILEGE = "privilege", BRANCH_RELATIVE = "branch_relative",
    }
}

id_table! {
    /// XCore operand types.
    pub enum XcoreOpType {
        REG = "reg", IMM = "imm", MEM = "mem",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_fields() {
        assert_eq!(XcoreReg::from_field(11), XcoreReg::R11);
        assert_eq!(XcoreReg::from_field(14), XcoreReg::SP);
        assert_eq!(XcoreReg::from_field(15), XcoreReg::LR);
        assert_eq!(XcoreInsn::name_of(XcoreInsn::LDAW as u16), "ldaw");
    }
}
