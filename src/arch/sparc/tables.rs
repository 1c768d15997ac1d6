//! SPARC register, instruction and group tables.

use crate::table::{id_table, IdTable};

id_table! {
    /// SPARC registers. The 32 integer registers are contiguous in
    /// encoding order (`%g`, `%o`, `%l`, `%i`).
    pub enum SparcReg {
        G0 = "g0", G1 = "g1", G2 = "g2", G3 = "g3", G4 = "g4", G5 = "g5", G6 = "g6", G7 = "g7",
        O0 = "o0", O1 = "o1", O2 = "o2", O3 = "o3", O4 = "o4", O5 = "o5", SP = "sp", O7 = "o7",
        L0 = "l0", L1 = "l1", L2 = "l2", L3 = "l3", L4 = "l4", L5 = "l5", L6 = "l6", L7 = "l7",
        I0 = "i0", I1 = "i1", I2 = "i2", I3 = "i3", I4 = "i4", I5 = "i5", FP = "fp", I7 = "i7",
        F0 = "f0", F1 = "f1", F2 = "f2", F3 = "f3", F4 = "f4", F5 = "f5", F6 = "f6", F7 = "f7",
        F8 = "f8", F9 = "f9", F10 = "f10", F11 = "f11", F12 = "f12", F13 = "f13", F14 = "f14", F15 = "f15",
        F16 = "f16", F17 = "f17", F18 = "f18", F19 = "f19", F20 = "f20", F21 = "f21", F22 = "f22", F23 = "f23",
        F24 = "f24", F25 = "f25", F26 = "f26", F27 = "f27", F28 = "f28", F29 = "f29", F30 = "f30", F31 = "f31",
        F32 = "f32", F34 = "f34", F36 = "f36", F38 = "f38", F40 = "f40", F42 = "f42", F44 = "f44", F46 = "f46",
        F48 = "f48", F50 = "f50", F52 = "f52", F54 = "f54", F56 = "f56", F58 = "f58", F60 = "f60", F62 = "f62",
        FCC0 = "fcc0", FCC1 = "fcc1", FCC2 = "fcc2", FCC3 = "fcc3",
        ICC = "icc", XCC = "xcc", Y = "y", FSR = "fsr",
    }
    aliases { "o6" => SP, "i6" => FP, "r14" => SP, "r30" => FP }
}

impl SparcReg {
    fn offset(base: SparcReg, n: u32) -> SparcReg {
        SparcReg::from_id(base as u16 + n as u16).unwrap_or_default()
    }

    pub fn gpr(n: u32) -> SparcReg {
        SparcReg::offset(SparcReg::G0, n & 31)
    }

    /// Single-precision register `%fN`.
    pub fn single(n: u32) -> SparcReg {
        SparcReg::offset(SparcReg::F0, n & 31)
    }

    /// Double-precision register from its 5-bit field; bit 0 selects the
    /// upper bank (`%f32`..`%f62`).
    pub fn double(n: u32) -> SparcReg {
        let num = (n & 0x1e) | ((n & 1) << 5);
        if num < 32 {
            SparcReg::single(num)
        } else {
            SparcReg::offset(SparcReg::F32, (num - 32) / 2)
        }
    }

    pub fn fcc(n: u32) -> SparcReg {
        SparcReg::offset(SparcReg::FCC0, n & 3)
    }
}

id_table! {
    /// SPARC instructions. Conditional branches and traps share one id
    /// per family; the condition lives in the detail record.
    pub enum SparcInsn {
        ADD = "add", ADDCC = "addcc", ADDX = "addx", ADDXCC = "addxcc",
        AND = "and", ANDCC = "andcc", ANDN = "andn", ANDNCC = "andncc",
        B = "b", BP = "bp", FB = "fb", FBP = "fbp",
        BRZ = "brz", BRLEZ = "brlez", BRLZ = "brlz", BRNZ = "brnz", BRGZ = "brgz", BRGEZ = "brgez",
        CALL = "call", CLR = "clr", CMP = "cmp",
        FABSD = "fabsd", FABSS = "fabss", FADDD = "faddd", FADDS = "fadds",
        FCMPD = "fcmpd", FCMPED = "fcmped", FCMPES = "fcmpes", FCMPS = "fcmps",
        FDIVD = "fdivd", FDIVS = "fdivs", FDTOI = "fdtoi", FDTOS = "fdtos", FDTOX = "fdtox",
        FITOD = "fitod", FITOS = "fitos", FMOVD = "fmovd", FMOVS = "fmovs",
        FMULD = "fmuld", FMULS = "fmuls", FNEGD = "fnegd", FNEGS = "fnegs", FSMULD = "fsmuld",
        FSQRTD = "fsqrtd", FSQRTS = "fsqrts", FSTOD = "fstod", FSTOI = "fstoi", FSTOX = "fstox",
        FSUBD = "fsubd", FSUBS = "fsubs", FXTOD = "fxtod", FXTOS = "fxtos",
        FLUSH = "flush", JMP = "jmp", JMPL = "jmpl",
        LD = "ld", LDD = "ldd", LDDF = "lddf", LDF = "ldf", LDFSR = "ldfsr",
        LDSB = "ldsb", LDSH = "ldsh", LDSTUB = "ldstub", LDSW = "ldsw",
        LDUB = "ldub", LDUH = "lduh", LDX = "ldx",
        MOV = "mov", MULSCC = "mulscc", MULX = "mulx", NOP = "nop",
        OR = "or", ORCC = "orcc", ORN = "orn", ORNCC = "orncc",
        RD = "rd", RESTORE = "restore", RET = "ret", RETL = "retl", RETT = "rett", RETURN = "return",
        SAVE = "save", SDIV = "sdiv", SDIVCC = "sdivcc", SDIVX = "sdivx", SETHI = "sethi",
        SLL = "sll", SLLX = "sllx", SMUL = "smul", SMULCC = "smulcc",
        SRA = "sra", SRAX = "srax", SRL = "srl", SRLX = "srlx",
        ST = "st", STB = "stb", STD = "std", STDF = "stdf", STF = "stf", STFSR = "stfsr",
        STH = "sth", STX = "stx",
        SUB = "sub", SUBCC = "subcc", SUBX = "subx", SUBXCC = "subxcc", SWAP = "swap",
        T = "t", TADDCC = "taddcc", TSUBCC = "tsubcc", TST = "tst",
        UDIV = "udiv", UDIVCC = "udivcc", UDIVX = "udivx", UMUL = "umul", UMULCC = "umulcc",
        UNIMP = "unimp", WR = "wr",
        XNOR = "xnor", XNORCC = "xnorcc", XOR = "xor", XORCC = "xorcc",
    }
}

id_table! {
    /// SPARC instruction groups.
    pub enum SparcGroup {
        JUMP = "jump", CALL = "call", RET = "return", INT = "int", IRET = "iret",
        PRIVILEGE = "privilege", BRANCH_RELATIVE = "branch_relative",
        V9 = "v9", FPU = "fpu",
    }
}

id_table! {
    /// SPARC operand types.
    pub enum SparcOpType {
        REG = "reg", IMM = "imm", MEM = "mem",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_banks() {
        assert_eq!(SparcReg::gpr(14), SparcReg::SP);
        assert_eq!(SparcReg::gpr(30), SparcReg::FP);
        assert_eq!(SparcReg::gpr(31), SparcReg::I7);
        assert_eq!(SparcReg::double(2), SparcReg::F2);
        assert_eq!(SparcReg::double(1), SparcReg::F32);
        assert_eq!(SparcReg::double(31), SparcReg::F62);
        assert_eq!(SparcReg::from_name("o6"), Some(SparcReg::SP));
    }
}
