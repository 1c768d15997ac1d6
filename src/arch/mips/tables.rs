//! MIPS register, instruction and group tables.

use crate::table::id_table;

id_table! {
    /// MIPS registers. GPRs are contiguous from `ZERO` in encoding order.
    pub enum MipsReg {
        ZERO = "zero", AT = "at", V0 = "v0", V1 = "v1",
        A0 = "a0", A1 = "a1", A2 = "a2", A3 = "a3",
        T0 = "t0", T1 = "t1", T2 = "t2", T3 = "t3",
        T4 = "t4", T5 = "t5", T6 = "t6", T7 = "t7",
        S0 = "s0", S1 = "s1", S2 = "s2", S3 = "s3",
        S4 = "s4", S5 = "s5", S6 = "s6", S7 = "s7",
        T8 = "t8", T9 = "t9", K0 = "k0", K1 = "k1",
        GP = "gp", SP = "sp", FP = "fp", RA = "ra",
        F0 = "f0", F1 = "f1", F2 = "f2", F3 = "f3",
        F4 = "f4", F5 = "f5", F6 = "f6", F7 = "f7",
        F8 = "f8", F9 = "f9", F10 = "f10", F11 = "f11",
        F12 = "f12", F13 = "f13", F14 = "f14", F15 = "f15",
        F16 = "f16", F17 = "f17", F18 = "f18", F19 = "f19",
        F20 = "f20", F21 = "f21", F22 = "f22", F23 = "f23",
        F24 = "f24", F25 = "f25", F26 = "f26", F27 = "f27",
        F28 = "f28", F29 = "f29", F30 = "f30", F31 = "f31",
        FCC0 = "fcc0", FCC1 = "fcc1", FCC2 = "fcc2", FCC3 = "fcc3",
        FCC4 = "fcc4", FCC5 = "fcc5", FCC6 = "fcc6", FCC7 = "fcc7",
        HI = "hi", LO = "lo", PC = "pc",
    }
    aliases {
        "0" => ZERO, "1" => AT, "2" => V0, "3" => V1, "4" => A0, "5" => A1,
        "6" => A2, "7" => A3, "8" => T0, "9" => T1, "10" => T2, "11" => T3,
        "12" => T4, "13" => T5, "14" => T6, "15" => T7, "16" => S0, "17" => S1,
        "18" => S2, "19" => S3, "20" => S4, "21" => S5, "22" => S6, "23" => S7,
        "24" => T8, "25" => T9, "26" => K0, "27" => K1, "28" => GP, "29" => SP,
        "30" => FP, "31" => RA, "s8" => FP,
    }
}

impl MipsReg {
    /// General-purpose register by encoding number.
    pub fn gpr(n: u32) -> MipsReg {
        crate::table::IdTable::from_id(MipsReg::ZERO as u16 + (n & 31) as u16).unwrap_or_default()
    }

    /// Floating-point register by encoding number.
    pub fn fpr(n: u32) -> MipsReg {
        crate::table::IdTable::from_id(MipsReg::F0 as u16 + (n & 31) as u16).unwrap_or_default()
    }

    /// FP condition-code register by number.
    pub fn fcc(n: u32) -> MipsReg {
        crate::table::IdTable::from_id(MipsReg::FCC0 as u16 + (n & 7) as u16).unwrap_or_default()
    }
}

id_table! {
    /// MIPS instructions.
    pub enum MipsInsn {
        // SPECIAL
        SLL = "sll", SRL = "srl", SRA = "sra", SLLV = "sllv", SRLV = "srlv", SRAV = "srav",
        ROTR = "rotr", ROTRV = "rotrv", JR = "jr", JALR = "jalr", MOVZ = "movz", MOVN = "movn",
        MOVF = "movf", MOVT = "movt", SYSCALL = "syscall", BREAK = "break", SYNC = "sync",
        MFHI = "mfhi", MTHI = "mthi", MFLO = "mflo", MTLO = "mtlo",
        DSLLV = "dsllv", DSRLV = "dsrlv", DSRAV = "dsrav", DROTRV = "drotrv",
        MULT = "mult", MULTU = "multu", DIV = "div", DIVU = "divu",
        DMULT = "dmult", DMULTU = "dmultu", DDIV = "ddiv", DDIVU = "ddivu",
        ADD = "add", ADDU = "addu", SUB = "sub", SUBU = "subu",
        AND = "and", OR = "or", XOR = "xor", NOR = "nor", SLT = "slt", SLTU = "sltu",
        DADD = "dadd", DADDU = "daddu", DSUB = "dsub", DSUBU = "dsubu",
        TGE = "tge", TGEU = "tgeu", TLT = "tlt", TLTU = "tltu", TEQ = "teq", TNE = "tne",
        DSLL = "dsll", DSRL = "dsrl", DSRA = "dsra", DROTR = "drotr",
        DSLL32 = "dsll32", DSRL32 = "dsrl32", DSRA32 = "dsra32", DROTR32 = "drotr32",
        // REGIMM
        BLTZ = "bltz", BGEZ = "bgez", BLTZL = "bltzl", BGEZL = "bgezl",
        TGEI = "tgei", TGEIU = "tgeiu", TLTI = "tlti", TLTIU = "tltiu", TEQI = "teqi", TNEI = "tnei",
        BLTZAL = "bltzal", BGEZAL = "bgezal", BLTZALL = "bltzall", BGEZALL = "bgezall",
        SYNCI = "synci",
        // primary opcodes
        J = "j", JAL = "jal", BEQ = "beq", BNE = "bne", BLEZ = "blez", BGTZ = "bgtz",
        ADDI = "addi", ADDIU = "addiu", SLTI = "slti", SLTIU = "sltiu",
        ANDI = "andi", ORI = "ori", XORI = "xori", LUI = "lui",
        BEQL = "beql", BNEL = "bnel", BLEZL = "blezl", BGTZL = "bgtzl",
        DADDI = "daddi", DADDIU = "daddiu", LDL = "ldl", LDR = "ldr",
        LB = "lb", LH = "lh", LWL = "lwl", LW = "lw", LBU = "lbu", LHU = "lhu", LWR = "lwr", LWU = "lwu",
        SB = "sb", SH = "sh", SWL = "swl", SW = "sw", SDL = "sdl", SDR = "sdr", SWR = "swr",
        CACHE = "cache", LL = "ll", LWC1 = "lwc1", PREF = "pref", LLD = "lld", LDC1 = "ldc1", LD = "ld",
        SC = "sc", SWC1 = "swc1", SCD = "scd", SDC1 = "sdc1", SD = "sd",
        // SPECIAL2
        MADD = "madd", MADDU = "maddu", MUL = "mul", MSUB = "msub", MSUBU = "msubu",
        CLZ = "clz", CLO = "clo", DCLZ = "dclz", DCLO = "dclo", SDBBP = "sdbbp",
        // SPECIAL3
        EXT = "ext", DEXTM = "dextm", DEXTU = "dextu", DEXT = "dext",
        INS = "ins", DINSM = "dinsm", DINSU = "dinsu", DINS = "dins",
        WSBH = "wsbh", SEB = "seb", SEH = "seh", DSBH = "dsbh", DSHD = "dshd", RDHWR = "rdhwr",
        // COP0
        MFC0 = "mfc0", MTC0 = "mtc0", DMFC0 = "dmfc0", DMTC0 = "dmtc0",
        TLBR = "tlbr", TLBWI = "tlbwi", TLBWR = "tlbwr", TLBP = "tlbp",
        ERET = "eret", DERET = "deret", WAIT = "wait", DI = "di", EI = "ei",
        // COP1
        MFC1 = "mfc1", DMFC1 = "dmfc1", CFC1 = "cfc1", MFHC1 = "mfhc1",
        MTC1 = "mtc1", DMTC1 = "dmtc1", CTC1 = "ctc1", MTHC1 = "mthc1",
        BC1F = "bc1f", BC1T = "bc1t", BC1FL = "bc1fl", BC1TL = "bc1tl",
        ADD_S = "add.s", SUB_S = "sub.s", MUL_S = "mul.s", DIV_S = "div.s",
        SQRT_S = "sqrt.s", ABS_S = "abs.s", MOV_S = "mov.s", NEG_S = "neg.s",
        ADD_D = "add.d", SUB_D = "sub.d", MUL_D = "mul.d", DIV_D = "div.d",
        SQRT_D = "sqrt.d", ABS_D = "abs.d", MOV_D = "mov.d", NEG_D = "neg.d",
        ROUND_W = "round.w", TRUNC_W = "trunc.w", CEIL_W = "ceil.w", FLOOR_W = "floor.w",
        ROUND_L = "round.l", TRUNC_L = "trunc.l", CEIL_L = "ceil.l", FLOOR_L = "floor.l",
        CVT_S = "cvt.s", CVT_D = "cvt.d", CVT_W = "cvt.w", CVT_L = "cvt.l",
        MOVF_FMT = "movf.fmt", MOVT_FMT = "movt.fmt", MOVZ_FMT = "movz.fmt", MOVN_FMT = "movn.fmt",
        C_F = "c.f", C_UN = "c.un", C_EQ = "c.eq", C_UEQ = "c.ueq",
        C_OLT = "c.olt", C_ULT = "c.ult", C_OLE = "c.ole", C_ULE = "c.ule",
        C_SF = "c.sf", C_NGLE = "c.ngle", C_SEQ = "c.seq", C_NGL = "c.ngl",
        C_LT = "c.lt", C_NGE = "c.nge", C_LE = "c.le", C_NGT = "c.ngt",
        // aliases
        NOP = "nop", SSNOP = "ssnop", EHB = "ehb", MOVE = "move", B = "b", BAL = "bal",
        BEQZ = "beqz", BNEZ = "bnez", BEQZL = "beqzl", BNEZL = "bnezl",
        NEGU = "negu", NOT = "not", DNEGU = "dnegu",
    }
}

id_table! {
    /// MIPS instruction groups.
    pub enum MipsGroup {
        JUMP = "jump", CALL = "call", RET = "ret", INT = "int", IRET = "iret",
        PRIVILEGE = "privilege", BRANCH_RELATIVE = "branch_relative",
        STDENC = "stdenc", MIPS32 = "mips32", MIPS32R2 = "mips32r2",
        MIPS64 = "mips64", MIPS64R2 = "mips64r2", MIPS3 = "mips3",
        FPU = "fpu", NOTINMICROMIPS = "notinmicromips",
    }
}

id_table! {
    /// MIPS operand types.
    pub enum MipsOpType {
        REG = "reg", IMM = "imm", MEM = "mem",
    }
}
