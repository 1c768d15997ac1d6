//! x86 register, instruction and group tables.

use crate::table::{id_table, IdTable};

id_table! {
    /// x86 registers. Each GPR width is contiguous in encoding order, so
    /// `gpr` can index into it.
    pub enum X86Reg {
        AL = "al", CL = "cl", DL = "dl", BL = "bl", SPL = "spl", BPL = "bpl", SIL = "sil", DIL = "dil",
        R8B = "r8b", R9B = "r9b", R10B = "r10b", R11B = "r11b",
        R12B = "r12b", R13B = "r13b", R14B = "r14b", R15B = "r15b",
        AH = "ah", CH = "ch", DH = "dh", BH = "bh",
        AX = "ax", CX = "cx", DX = "dx", BX = "bx", SP = "sp", BP = "bp", SI = "si", DI = "di",
        R8W = "r8w", R9W = "r9w", R10W = "r10w", R11W = "r11w",
        R12W = "r12w", R13W = "r13w", R14W = "r14w", R15W = "r15w",
        EAX = "eax", ECX = "ecx", EDX = "edx", EBX = "ebx", ESP = "esp", EBP = "ebp", ESI = "esi", EDI = "edi",
        R8D = "r8d", R9D = "r9d", R10D = "r10d", R11D = "r11d",
        R12D = "r12d", R13D = "r13d", R14D = "r14d", R15D = "r15d",
        RAX = "rax", RCX = "rcx", RDX = "rdx", RBX = "rbx", RSP = "rsp", RBP = "rbp", RSI = "rsi", RDI = "rdi",
        R8 = "r8", R9 = "r9", R10 = "r10", R11 = "r11", R12 = "r12", R13 = "r13", R14 = "r14", R15 = "r15",
        IP = "ip", EIP = "eip", RIP = "rip", EFLAGS = "flags", FPSW = "fpsw",
        ES = "es", CS = "cs", SS = "ss", DS = "ds", FS = "fs", GS = "gs",
        CR0 = "cr0", CR1 = "cr1", CR2 = "cr2", CR3 = "cr3", CR4 = "cr4", CR5 = "cr5", CR6 = "cr6", CR7 = "cr7",
        CR8 = "cr8", CR9 = "cr9", CR10 = "cr10", CR11 = "cr11", CR12 = "cr12", CR13 = "cr13", CR14 = "cr14", CR15 = "cr15",
        DR0 = "dr0", DR1 = "dr1", DR2 = "dr2", DR3 = "dr3", DR4 = "dr4", DR5 = "dr5", DR6 = "dr6", DR7 = "dr7",
        ST0 = "st(0)", ST1 = "st(1)", ST2 = "st(2)", ST3 = "st(3)",
        ST4 = "st(4)", ST5 = "st(5)", ST6 = "st(6)", ST7 = "st(7)",
        XMM0 = "xmm0", XMM1 = "xmm1", XMM2 = "xmm2", XMM3 = "xmm3",
        XMM4 = "xmm4", XMM5 = "xmm5", XMM6 = "xmm6", XMM7 = "xmm7",
        XMM8 = "xmm8", XMM9 = "xmm9", XMM10 = "xmm10", XMM11 = "xmm11",
        XMM12 = "xmm12", XMM13 = "xmm13", XMM14 = "xmm14", XMM15 = "xmm15",
    }
    aliases { "eflags" => EFLAGS, "st" => ST0 }
}

impl X86Reg {
    fn offset(base: X86Reg, n: u32) -> X86Reg {
        X86Reg::from_id(base as u16 + n as u16).unwrap_or_default()
    }

    /// General-purpose register `n` (0..16) of `size` bytes. Without a REX
    /// prefix, byte registers 4..8 are `ah`..`bh`.
    pub fn gpr(n: u32, size: u8, rex: bool) -> X86Reg {
        let n = n & 15;
        match size {
            1 if !rex && (4..8).contains(&n) => X86Reg::offset(X86Reg::AH, n - 4),
            1 => X86Reg::offset(X86Reg::AL, n),
            2 => X86Reg::offset(X86Reg::AX, n),
            4 => X86Reg::offset(X86Reg::EAX, n),
            _ => X86Reg::offset(X86Reg::RAX, n),
        }
    }

    pub fn segment(n: u32) -> Option<X86Reg> {
        (n < 6).then(|| X86Reg::offset(X86Reg::ES, n))
    }

    pub fn cr(n: u32) -> X86Reg {
        X86Reg::offset(X86Reg::CR0, n & 15)
    }

    pub fn dr(n: u32) -> X86Reg {
        X86Reg::offset(X86Reg::DR0, n & 7)
    }

    pub fn st(n: u32) -> X86Reg {
        X86Reg::offset(X86Reg::ST0, n & 7)
    }

    pub fn xmm(n: u32) -> X86Reg {
        X86Reg::offset(X86Reg::XMM0, n & 15)
    }

    fn within(self, first: X86Reg, last: X86Reg) -> bool {
        (first as u16..=last as u16).contains(&(self as u16))
    }

    /// Whether this is a general-purpose register of any width.
    pub fn is_gpr(self) -> bool {
        self.within(X86Reg::AL, X86Reg::R15)
    }

    /// Width in bytes.
    pub fn size(self) -> u8 {
        if self.within(X86Reg::AL, X86Reg::BH) {
            1
        } else if self.within(X86Reg::AX, X86Reg::R15W) || self.within(X86Reg::ES, X86Reg::GS) {
            2
        } else if self.within(X86Reg::EAX, X86Reg::R15D) || self == X86Reg::EIP {
            4
        } else if self.within(X86Reg::ST0, X86Reg::ST7) {
            10
        } else if self.within(X86Reg::XMM0, X86Reg::XMM15) {
            16
        } else if self == X86Reg::IP || self == X86Reg::FPSW {
            2
        } else if self == X86Reg::INVALID {
            0
        } else {
            8
        }
    }
}

id_table! {
    /// x86 instructions. Condition-code families are contiguous in `cc`
    /// order (o, no, b, ae, e, ne, be, a, s, ns, p, np, l, ge, le, g).
    pub enum X86Insn {
        AAA = "aaa", AAD = "aad", AAM = "aam", AAS = "aas", ADC = "adc", ADD = "add", AND = "and",
        BSF = "bsf", BSR = "bsr", BSWAP = "bswap", BT = "bt", BTC = "btc", BTR = "btr", BTS = "bts",
        CALL = "call", CBW = "cbw", CDQ = "cdq", CDQE = "cdqe", CLC = "clc", CLD = "cld",
        CLFLUSH = "clflush", CLI = "cli", CLTS = "clts", CMC = "cmc", CMP = "cmp",
        CMPSB = "cmpsb", CMPSD = "cmpsd", CMPSQ = "cmpsq", CMPSW = "cmpsw",
        CMPXCHG = "cmpxchg", CMPXCHG16B = "cmpxchg16b", CMPXCHG8B = "cmpxchg8b",
        CPUID = "cpuid", CQO = "cqo", CWD = "cwd", CWDE = "cwde",
        DAA = "daa", DAS = "das", DEC = "dec", DIV = "div",
        ENDBR32 = "endbr32", ENDBR64 = "endbr64", ENTER = "enter",
        HLT = "hlt", IDIV = "idiv", IMUL = "imul", IN = "in", INC = "inc",
        INSB = "insb", INSD = "insd", INSW = "insw", INT = "int", INT1 = "int1", INT3 = "int3",
        INTO = "into", INVLPG = "invlpg", IRET = "iret", IRETD = "iretd", IRETQ = "iretq",
        JCXZ = "jcxz", JECXZ = "jecxz", JRCXZ = "jrcxz", JMP = "jmp",
        JO = "jo", JNO = "jno", JB = "jb", JAE = "jae", JE = "je", JNE = "jne", JBE = "jbe", JA = "ja",
        JS = "js", JNS = "jns", JP = "jp", JNP = "jnp", JL = "jl", JGE = "jge", JLE = "jle", JG = "jg",
        LAHF = "lahf", LCALL = "lcall", LEA = "lea", LEAVE = "leave", LGDT = "lgdt", LIDT = "lidt",
        LJMP = "ljmp", LLDT = "lldt", LMSW = "lmsw",
        LODSB = "lodsb", LODSD = "lodsd", LODSQ = "lodsq", LODSW = "lodsw",
        LOOP = "loop", LOOPE = "loope", LOOPNE = "loopne", LTR = "ltr",
        MOV = "mov", MOVABS = "movabs",
        MOVSB = "movsb", MOVSD = "movsd", MOVSQ = "movsq", MOVSW = "movsw",
        MOVSX = "movsx", MOVSXD = "movsxd", MOVZX = "movzx", MUL = "mul",
        NEG = "neg", NOP = "nop", NOT = "not", OR = "or", OUT = "out",
        OUTSB = "outsb", OUTSD = "outsd", OUTSW = "outsw", PAUSE = "pause",
        POP = "pop", POPAL = "popal", POPAW = "popaw", POPCNT = "popcnt",
        POPF = "popf", POPFD = "popfd", POPFQ = "popfq",
        PREFETCHNTA = "prefetchnta", PREFETCHT0 = "prefetcht0",
        PREFETCHT1 = "prefetcht1", PREFETCHT2 = "prefetcht2",
        PUSH = "push", PUSHAL = "pushal", PUSHAW = "pushaw",
        PUSHF = "pushf", PUSHFD = "pushfd", PUSHFQ = "pushfq",
        RCL = "rcl", RCR = "rcr", RDMSR = "rdmsr", RDPMC = "rdpmc", RDTSC = "rdtsc", RDTSCP = "rdtscp",
        RET = "ret", RETF = "retf", ROL = "rol", ROR = "ror",
        SAHF = "sahf", SAL = "sal", SAR = "sar", SBB = "sbb",
        SCASB = "scasb", SCASD = "scasd", SCASQ = "scasq", SCASW = "scasw",
        SETO = "seto", SETNO = "setno", SETB = "setb", SETAE = "setae",
        SETE = "sete", SETNE = "setne", SETBE = "setbe", SETA = "seta",
        SETS = "sets", SETNS = "setns", SETP = "setp", SETNP = "setnp",
        SETL = "setl", SETGE = "setge", SETLE = "setle", SETG = "setg",
        SGDT = "sgdt", SHL = "shl", SHLD = "shld", SHR = "shr", SHRD = "shrd", SIDT = "sidt",
        SLDT = "sldt", SMSW = "smsw", STC = "stc", STD = "std", STI = "sti",
        STOSB = "stosb", STOSD = "stosd", STOSQ = "stosq", STOSW = "stosw",
        STR = "str", SUB = "sub", SWAPGS = "swapgs", SYSCALL = "syscall", SYSENTER = "sysenter",
        SYSEXIT = "sysexit", SYSRET = "sysret", TEST = "test", TZCNT = "tzcnt", LZCNT = "lzcnt",
        UD2 = "ud2", VERR = "verr", VERW = "verw", WAIT = "wait", WRMSR = "wrmsr",
        XADD = "xadd", XCHG = "xchg", XGETBV = "xgetbv", XLATB = "xlatb", XOR = "xor",
        XSETBV = "xsetbv",
        CMOVO = "cmovo", CMOVNO = "cmovno", CMOVB = "cmovb", CMOVAE = "cmovae",
        CMOVE = "cmove", CMOVNE = "cmovne", CMOVBE = "cmovbe", CMOVA = "cmova",
        CMOVS = "cmovs", CMOVNS = "cmovns", CMOVP = "cmovp", CMOVNP = "cmovnp",
        CMOVL = "cmovl", CMOVGE = "cmovge", CMOVLE = "cmovle", CMOVG = "cmovg",
        // system state
        FXRSTOR = "fxrstor", FXSAVE = "fxsave", LDMXCSR = "ldmxcsr", STMXCSR = "stmxcsr",
        XRSTOR = "xrstor", XSAVE = "xsave", LFENCE = "lfence", MFENCE = "mfence", SFENCE = "sfence",
        // SSE / SSE2
        ADDPD = "addpd", ADDPS = "addps", ADDSD = "addsd", ADDSS = "addss",
        ANDNPD = "andnpd", ANDNPS = "andnps", ANDPD = "andpd", ANDPS = "andps",
        COMISD = "comisd", COMISS = "comiss", CVTDQ2PS = "cvtdq2ps", CVTPD2PS = "cvtpd2ps",
        CVTPS2DQ = "cvtps2dq", CVTPS2PD = "cvtps2pd", CVTSD2SI = "cvtsd2si", CVTSD2SS = "cvtsd2ss",
        CVTSI2SD = "cvtsi2sd", CVTSI2SS = "cvtsi2ss", CVTSS2SD = "cvtss2sd", CVTSS2SI = "cvtss2si",
        CVTTPS2DQ = "cvttps2dq", CVTTSD2SI = "cvttsd2si", CVTTSS2SI = "cvttss2si",
        DIVPD = "divpd", DIVPS = "divps", DIVSD = "divsd", DIVSS = "divss",
        MAXPD = "maxpd", MAXPS = "maxps", MAXSD = "maxsd", MAXSS = "maxss",
        MINPD = "minpd", MINPS = "minps", MINSD = "minsd", MINSS = "minss",
        MOVAPD = "movapd", MOVAPS = "movaps", MOVD = "movd", MOVDQA = "movdqa", MOVDQU = "movdqu",
        MOVHLPS = "movhlps", MOVHPD = "movhpd", MOVHPS = "movhps", MOVLHPS = "movlhps",
        MOVLPD = "movlpd", MOVLPS = "movlps", MOVMSKPD = "movmskpd", MOVMSKPS = "movmskps",
        MOVQ = "movq", MOVSS = "movss", MOVUPD = "movupd", MOVUPS = "movups",
        MULPD = "mulpd", MULPS = "mulps", MULSD = "mulsd", MULSS = "mulss",
        ORPD = "orpd", ORPS = "orps", PADDB = "paddb", PADDD = "paddd", PADDQ = "paddq",
        PAND = "pand", PANDN = "pandn", PCMPEQB = "pcmpeqb", PCMPEQD = "pcmpeqd", PCMPEQW = "pcmpeqw",
        PMOVMSKB = "pmovmskb", POR = "por", PSHUFD = "pshufd", PSUBB = "psubb", PSUBD = "psubd",
        PSUBQ = "psubq", PUNPCKHQDQ = "punpckhqdq", PUNPCKLBW = "punpcklbw", PUNPCKLDQ = "punpckldq",
        PUNPCKLQDQ = "punpcklqdq", PUNPCKLWD = "punpcklwd", PXOR = "pxor",
        RCPPS = "rcpps", RCPSS = "rcpss", RSQRTPS = "rsqrtps", RSQRTSS = "rsqrtss",
        SQRTPD = "sqrtpd", SQRTPS = "sqrtps", SQRTSD = "sqrtsd", SQRTSS = "sqrtss",
        SUBPD = "subpd", SUBPS = "subps", SUBSD = "subsd", SUBSS = "subss",
        UCOMISD = "ucomisd", UCOMISS = "ucomiss",
        UNPCKHPD = "unpckhpd", UNPCKHPS = "unpckhps", UNPCKLPD = "unpcklpd", UNPCKLPS = "unpcklps",
        XORPD = "xorpd", XORPS = "xorps",
        // x87
        F2XM1 = "f2xm1", FABS = "fabs", FADD = "fadd", FADDP = "faddp", FBLD = "fbld", FBSTP = "fbstp",
        FCHS = "fchs", FCMOVB = "fcmovb", FCMOVBE = "fcmovbe", FCMOVE = "fcmove", FCMOVNB = "fcmovnb",
        FCMOVNBE = "fcmovnbe", FCMOVNE = "fcmovne", FCMOVNU = "fcmovnu", FCMOVU = "fcmovu",
        FCOM = "fcom", FCOMI = "fcomi", FCOMIP = "fcomip", FCOMP = "fcomp", FCOMPP = "fcompp",
        FCOS = "fcos", FDECSTP = "fdecstp", FDIV = "fdiv", FDIVP = "fdivp", FDIVR = "fdivr",
        FDIVRP = "fdivrp", FFREE = "ffree", FIADD = "fiadd", FICOM = "ficom", FICOMP = "ficomp",
        FIDIV = "fidiv", FIDIVR = "fidivr", FILD = "fild", FIMUL = "fimul", FINCSTP = "fincstp",
        FIST = "fist", FISTP = "fistp", FISTTP = "fisttp", FISUB = "fisub", FISUBR = "fisubr",
        FLD = "fld", FLD1 = "fld1", FLDCW = "fldcw", FLDENV = "fldenv", FLDL2E = "fldl2e",
        FLDL2T = "fldl2t", FLDLG2 = "fldlg2", FLDLN2 = "fldln2", FLDPI = "fldpi", FLDZ = "fldz",
        FMUL = "fmul", FMULP = "fmulp", FNCLEX = "fnclex", FNINIT = "fninit", FNOP = "fnop",
        FNSAVE = "fnsave", FNSTCW = "fnstcw", FNSTENV = "fnstenv", FNSTSW = "fnstsw",
        FPATAN = "fpatan", FPREM = "fprem", FPREM1 = "fprem1", FPTAN = "fptan", FRNDINT = "frndint",
        FRSTOR = "frstor", FSCALE = "fscale", FSIN = "fsin", FSINCOS = "fsincos", FSQRT = "fsqrt",
        FST = "fst", FSTP = "fstp", FSUB = "fsub", FSUBP = "fsubp", FSUBR = "fsubr", FSUBRP = "fsubrp",
        FTST = "ftst", FUCOM = "fucom", FUCOMI = "fucomi", FUCOMIP = "fucomip", FUCOMP = "fucomp",
        FUCOMPP = "fucompp", FXAM = "fxam", FXCH = "fxch", FXTRACT = "fxtract", FYL2X = "fyl2x",
        FYL2XP1 = "fyl2xp1",
    }
}

impl X86Insn {
    /// Member `cc` of a condition-code family starting at `first`.
    pub(crate) fn cc(first: X86Insn, cc: u8) -> X86Insn {
        X86Insn::from_id(first as u16 + (cc & 15) as u16).unwrap_or_default()
    }
}

id_table! {
    /// x86 instruction groups.
    pub enum X86Group {
        JUMP = "jump", CALL = "call", RET = "ret", INT = "int", IRET = "iret",
        PRIVILEGE = "privilege", BRANCH_RELATIVE = "branch_relative",
        CMOV = "cmov", SSE1 = "sse1", SSE2 = "sse2", FPU = "fpu", POPCNT = "popcnt",
        BMI = "bmi", LZCNT = "lzcnt", CET = "cet", MODE64 = "mode64",
        NOT64BITMODE = "not64bitmode",
    }
}

id_table! {
    /// x86 operand types.
    pub enum X86OpType {
        REG = "reg", IMM = "imm", MEM = "mem",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpr_banks() {
        assert_eq!(X86Reg::gpr(0, 8, false), X86Reg::RAX);
        assert_eq!(X86Reg::gpr(13, 4, true), X86Reg::R13D);
        assert_eq!(X86Reg::gpr(4, 1, false), X86Reg::AH);
        assert_eq!(X86Reg::gpr(4, 1, true), X86Reg::SPL);
        assert_eq!(X86Reg::gpr(15, 2, true), X86Reg::R15W);
        assert_eq!(X86Reg::segment(4), Some(X86Reg::FS));
        assert_eq!(X86Reg::segment(6), None);
    }

    #[test]
    fn test_register_sizes() {
        assert_eq!(X86Reg::AH.size(), 1);
        assert_eq!(X86Reg::R9W.size(), 2);
        assert_eq!(X86Reg::EIP.size(), 4);
        assert_eq!(X86Reg::RIP.size(), 8);
        assert_eq!(X86Reg::XMM3.size(), 16);
        assert_eq!(X86Reg::ST1.size(), 10);
        assert!(X86Reg::R15.is_gpr());
        assert!(!X86Reg::RIP.is_gpr());
    }

    #[test]
    fn test_condition_families() {
        assert_eq!(X86Insn::cc(X86Insn::JO, 4), X86Insn::JE);
        assert_eq!(X86Insn::cc(X86Insn::SETO, 15), X86Insn::SETG);
        assert_eq!(X86Insn::cc(X86Insn::CMOVO, 5), X86Insn::CMOVNE);
    }
}
