//! SPARC word decoding.

use super::{SparcCc, SparcGroup as G, SparcHint, SparcInsn as I, SparcOperand, SparcReg as R};
use crate::arch::{bit, bits, fmt_imm, fmt_uimm, sign_extend, InsnBuilder};
use crate::insn::Access;
use crate::table::IdTable;
use crate::Address;

type B = InsnBuilder<I, SparcOperand>;

/// A decoded instruction with its branch fields.
pub(super) struct Sparc {
    pub b: B,
    pub cc: SparcCc,
    pub hint: SparcHint,
}

impl From<B> for Sparc {
    fn from(b: B) -> Self {
        Sparc {
            b,
            cc: SparcCc::Invalid,
            hint: SparcHint::empty(),
        }
    }
}

impl InsnBuilder<I, SparcOperand> {
    fn reg(&mut self, reg: R, access: Access) -> &mut Self {
        self.push(SparcOperand::reg(reg, access), format!("%{}", reg.name()))
    }

    fn gpr(&mut self, n: u32, access: Access) -> &mut Self {
        self.reg(R::gpr(n), access)
    }

    fn imm(&mut self, value: i64) -> &mut Self {
        self.push(SparcOperand::imm(value), fmt_imm(value))
    }

    fn uimm(&mut self, value: u64) -> &mut Self {
        self.push(SparcOperand::imm(value as i64), fmt_uimm(value))
    }

    /// Second source: `simm13` or `rs2`.
    fn src2(&mut self, w: &Word) -> &mut Self {
        if w.i() {
            self.imm(w.simm13())
        } else {
            self.gpr(w.rs2(), Access::READ)
        }
    }

    /// Effective address `rs1 + simm13` or `rs1 + rs2`, bracketed for
    /// loads and stores.
    fn address(&mut self, w: &Word, access: Access, brackets: bool) -> &mut Self {
        let base = R::gpr(w.rs1());
        let (index, disp) = if w.i() {
            (R::INVALID, w.simm13())
        } else {
            (R::gpr(w.rs2()), 0)
        };
        let mut text = String::new();
        if base != R::G0 || (index == R::INVALID && disp == 0) {
            text.push('%');
            text.push_str(base.name());
        }
        if index != R::INVALID && index != R::G0 {
            if !text.is_empty() {
                text.push('+');
            }
            text.push('%');
            text.push_str(index.name());
        } else if disp != 0 {
            if text.is_empty() {
                text.push_str(&fmt_imm(disp));
            } else if disp < 0 {
                text.push('-');
                text.push_str(&fmt_uimm(disp.unsigned_abs()));
            } else {
                text.push('+');
                text.push_str(&fmt_uimm(disp as u64));
            }
        }
        if brackets {
            text = format!("[{}]", text);
        }
        self.push(
            SparcOperand::Mem {
                base,
                index,
                disp: disp as i32,
                access,
            },
            text,
        )
    }
}

struct Word {
    raw: u32,
    address: Address,
    v9: bool,
}

impl Word {
    fn op(&self) -> u32 {
        bits(self.raw, 30, 2)
    }
    fn op2(&self) -> u32 {
        bits(self.raw, 22, 3)
    }
    fn op3(&self) -> u32 {
        bits(self.raw, 19, 6)
    }
    fn rd(&self) -> u32 {
        bits(self.raw, 25, 5)
    }
    fn rs1(&self) -> u32 {
        bits(self.raw, 14, 5)
    }
    fn rs2(&self) -> u32 {
        bits(self.raw, 0, 5)
    }
    fn i(&self) -> bool {
        bit(self.raw, 13)
    }
    fn simm13(&self) -> i64 {
        sign_extend(bits(self.raw, 0, 13) as u64, 13)
    }
    fn cond(&self) -> u32 {
        bits(self.raw, 25, 4)
    }
    fn annul(&self) -> bool {
        bit(self.raw, 29)
    }
    fn opf(&self) -> u32 {
        bits(self.raw, 5, 9)
    }

    /// PC-relative destination of a word displacement.
    fn target(&self, words: i64) -> u64 {
        let t = self.address.wrapping_add((words << 2) as u64);
        if self.v9 {
            t
        } else {
            t & 0xffff_ffff
        }
    }
}

pub(super) fn decode(raw: u32, address: Address, v9: bool) -> Option<Sparc> {
    let w = Word { raw, address, v9 };
    match w.op() {
        0 => format2(&w),
        1 => {
            let mut b = B::new(I::CALL);
            b.uimm(w.target(sign_extend(bits(raw, 0, 30) as u64, 30)))
                .group(G::CALL)
                .group(G::BRANCH_RELATIVE)
                .writes(&[R::O7]);
            Some(b.into())
        }
        2 if w.op3() == 0x3a => Some(trap(&w)),
        2 => arith(&w).map(Sparc::from),
        _ => memory(&w).map(Sparc::from),
    }
}

fn format2(w: &Word) -> Option<Sparc> {
    match w.op2() {
        0 => {
            let mut b = B::new(I::UNIMP);
            b.uimm(bits(w.raw, 0, 22) as u64);
            Some(b.into())
        }
        1 if w.v9 => predicted_branch(w, false),
        2 => Some(branch(w, false)),
        3 if w.v9 => register_branch(w),
        4 => {
            let imm = bits(w.raw, 0, 22) as u64;
            if w.rd() == 0 && imm == 0 {
                return Some(B::new(I::NOP).into());
            }
            let mut b = B::new(I::SETHI);
            b.uimm(imm).gpr(w.rd(), Access::WRITE);
            Some(b.into())
        }
        5 if w.v9 => predicted_branch(w, true),
        6 => Some(branch(w, true)),
        _ => None,
    }
}

/// Mnemonic of a conditional branch: `b<cond>[,a][,pn]`.
fn branch_name(prefix: &str, cond: &str, hint: SparcHint) -> String {
    let mut name = format!("{}{}", prefix, cond);
    if hint.contains(SparcHint::A) {
        name.push_str(",a");
    }
    if hint.contains(SparcHint::PN) {
        name.push_str(",pn");
    }
    name
}

fn finish_branch(mut b: B, cc: SparcCc, hint: SparcHint, flags: R) -> Sparc {
    if cc.tests_flags() {
        b.reads(&[flags]);
    }
    b.group(G::JUMP).group(G::BRANCH_RELATIVE);
    Sparc { b, cc, hint }
}

/// Bicc and FBfcc.
fn branch(w: &Word, float: bool) -> Sparc {
    let (cc, cond) = if float {
        SparcCc::fcc(w.cond())
    } else {
        SparcCc::icc(w.cond())
    };
    let hint = if w.annul() {
        SparcHint::A
    } else {
        SparcHint::empty()
    };
    let (id, prefix, flags) = if float {
        (I::FB, "fb", R::FCC0)
    } else {
        (I::B, "b", R::ICC)
    };
    let mut b = B::named(id, branch_name(prefix, cond, hint));
    b.uimm(w.target(sign_extend(bits(w.raw, 0, 22) as u64, 22)));
    finish_branch(b, cc, hint, flags)
}

/// BPcc and FBPfcc.
fn predicted_branch(w: &Word, float: bool) -> Option<Sparc> {
    let field = bits(w.raw, 20, 2);
    let flags = if float {
        R::fcc(field)
    } else {
        match field {
            0 => R::ICC,
            2 => R::XCC,
            _ => return None,
        }
    };
    let (cc, cond) = if float {
        SparcCc::fcc(w.cond())
    } else {
        SparcCc::icc(w.cond())
    };
    let mut hint = if bit(w.raw, 19) {
        SparcHint::PT
    } else {
        SparcHint::PN
    };
    if w.annul() {
        hint |= SparcHint::A;
    }
    let (id, prefix) = if float { (I::FBP, "fb") } else { (I::BP, "b") };
    let mut b = B::named(id, branch_name(prefix, cond, hint));
    b.reg(flags, Access::READ)
        .uimm(w.target(sign_extend(bits(w.raw, 0, 19) as u64, 19)))
        .group(G::V9);
    Some(finish_branch(b, cc, hint, flags))
}

/// BPr: branch on an integer register's contents.
fn register_branch(w: &Word) -> Option<Sparc> {
    if bit(w.raw, 28) {
        return None;
    }
    let id = match bits(w.raw, 25, 3) {
        1 => I::BRZ,
        2 => I::BRLEZ,
        3 => I::BRLZ,
        5 => I::BRNZ,
        6 => I::BRGZ,
        7 => I::BRGEZ,
        _ => return None,
    };
    let mut hint = if bit(w.raw, 19) {
        SparcHint::PT
    } else {
        SparcHint::PN
    };
    if w.annul() {
        hint |= SparcHint::A;
    }
    let d16 = (bits(w.raw, 20, 2) << 14) | bits(w.raw, 0, 14);
    let mut b = B::named(id, branch_name(id.name(), "", hint));
    b.gpr(w.rs1(), Access::READ)
        .uimm(w.target(sign_extend(d16 as u64, 16)))
        .group(G::JUMP)
        .group(G::BRANCH_RELATIVE)
        .group(G::V9);
    Some(Sparc {
        b,
        cc: SparcCc::Invalid,
        hint,
    })
}

/// `(id, sets icc, 64-bit only)` of the ALU opcodes.
fn alu(op3: u32) -> Option<(I, bool, bool)> {
    Some(match op3 {
        0x00 => (I::ADD, false, false),
        0x01 => (I::AND, false, false),
        0x02 => (I::OR, false, false),
        0x03 => (I::XOR, false, false),
        0x04 => (I::SUB, false, false),
        0x05 => (I::ANDN, false, false),
        0x06 => (I::ORN, false, false),
        0x07 => (I::XNOR, false, false),
        0x08 => (I::ADDX, false, false),
        0x09 => (I::MULX, false, true),
        0x0a => (I::UMUL, false, false),
        0x0b => (I::SMUL, false, false),
        0x0c => (I::SUBX, false, false),
        0x0d => (I::UDIVX, false, true),
        0x0e => (I::UDIV, false, false),
        0x0f => (I::SDIV, false, false),
        0x10 => (I::ADDCC, true, false),
        0x11 => (I::ANDCC, true, false),
        0x12 => (I::ORCC, true, false),
        0x13 => (I::XORCC, true, false),
        0x14 => (I::SUBCC, true, false),
        0x15 => (I::ANDNCC, true, false),
        0x16 => (I::ORNCC, true, false),
        0x17 => (I::XNORCC, true, false),
        0x18 => (I::ADDXCC, true, false),
        0x1a => (I::UMULCC, true, false),
        0x1b => (I::SMULCC, true, false),
        0x1c => (I::SUBXCC, true, false),
        0x1e => (I::UDIVCC, true, false),
        0x1f => (I::SDIVCC, true, false),
        0x20 => (I::TADDCC, true, false),
        0x21 => (I::TSUBCC, true, false),
        0x24 => (I::MULSCC, true, false),
        0x2d => (I::SDIVX, false, true),
        _ => return None,
    })
}

fn arith(w: &Word) -> Option<B> {
    let op3 = w.op3();
    if let Some((id, sets_cc, wide_only)) = alu(op3) {
        if wide_only && !w.v9 {
            return None;
        }
        let mut b = alu_form(id, w);
        if sets_cc {
            b.writes(&[R::ICC]);
        }
        match id {
            I::ADDX | I::ADDXCC | I::SUBX | I::SUBXCC => {
                b.reads(&[R::ICC]);
            }
            I::UMUL | I::SMUL | I::UMULCC | I::SMULCC => {
                b.writes(&[R::Y]);
            }
            I::UDIV | I::SDIV | I::UDIVCC | I::SDIVCC => {
                b.reads(&[R::Y]);
            }
            I::MULSCC => {
                b.reads(&[R::Y, R::ICC]).writes(&[R::Y]);
            }
            _ => {}
        }
        if wide_only {
            b.group(G::V9);
        }
        return Some(b);
    }
    let b = match op3 {
        0x25..=0x27 => {
            let extended = bit(w.raw, 12);
            if extended && !w.v9 {
                return None;
            }
            let id = match (op3, extended) {
                (0x25, false) => I::SLL,
                (0x26, false) => I::SRL,
                (0x27, false) => I::SRA,
                (0x25, true) => I::SLLX,
                (0x26, true) => I::SRLX,
                _ => I::SRAX,
            };
            let mut b = B::new(id);
            b.gpr(w.rs1(), Access::READ);
            if w.i() {
                b.uimm(bits(w.raw, 0, if extended { 6 } else { 5 }) as u64);
            } else {
                b.gpr(w.rs2(), Access::READ);
            }
            b.gpr(w.rd(), Access::WRITE);
            if extended {
                b.group(G::V9);
            }
            b
        }
        0x28 if w.rs1() == 0 => {
            let mut b = B::new(I::RD);
            b.reg(R::Y, Access::READ).gpr(w.rd(), Access::WRITE);
            b
        }
        0x30 if w.rd() == 0 => {
            let mut b = B::new(I::WR);
            b.gpr(w.rs1(), Access::READ)
                .src2(w)
                .reg(R::Y, Access::WRITE);
            b
        }
        0x34 => return fpop(w),
        0x35 => return fcmp(w),
        0x38 => jmpl(w),
        0x39 => {
            let mut b = if w.v9 {
                let mut b = B::new(I::RETURN);
                b.group(G::RET);
                b
            } else {
                let mut b = B::new(I::RETT);
                b.group(G::IRET).group(G::PRIVILEGE);
                b
            };
            b.address(w, Access::READ, false);
            b
        }
        0x3b => {
            let mut b = B::new(I::FLUSH);
            b.address(w, Access::READ, false);
            b
        }
        0x3c | 0x3d => {
            let id = if op3 == 0x3c { I::SAVE } else { I::RESTORE };
            if w.rd() == 0 && w.rs1() == 0 && !w.i() && w.rs2() == 0 {
                B::new(id)
            } else {
                alu_form(id, w)
            }
        }
        _ => return None,
    };
    Some(b)
}

/// `op %rs1, src2, %rd` with the `mov`, `clr`, `cmp` and `tst` aliases.
fn alu_form(id: I, w: &Word) -> B {
    let (rd, rs1) = (w.rd(), w.rs1());
    match id {
        I::OR if rs1 == 0 => {
            if !w.i() && w.rs2() == 0 {
                let mut b = B::new(I::CLR);
                b.gpr(rd, Access::WRITE);
                return b;
            }
            let mut b = B::new(I::MOV);
            b.src2(w).gpr(rd, Access::WRITE);
            return b;
        }
        I::SUBCC if rd == 0 => {
            let mut b = B::new(I::CMP);
            b.gpr(rs1, Access::READ).src2(w);
            return b;
        }
        I::ORCC if rd == 0 && rs1 == 0 && !w.i() => {
            let mut b = B::new(I::TST);
            b.gpr(w.rs2(), Access::READ);
            return b;
        }
        _ => {}
    }
    let mut b = B::new(id);
    b.gpr(rs1, Access::READ).src2(w).gpr(rd, Access::WRITE);
    b
}

fn jmpl(w: &Word) -> B {
    let rd = w.rd();
    if rd == 0 && w.i() && w.simm13() == 8 {
        let ret = match R::gpr(w.rs1()) {
            R::I7 => Some(I::RET),
            R::O7 => Some(I::RETL),
            _ => None,
        };
        if let Some(id) = ret {
            let mut b = B::new(id);
            b.reads(&[R::gpr(w.rs1())]).group(G::RET);
            return b;
        }
    }
    let mut b = match rd {
        0 => {
            let mut b = B::new(I::JMP);
            b.group(G::JUMP);
            b
        }
        15 => {
            let mut b = B::new(I::CALL);
            b.group(G::CALL).writes(&[R::O7]);
            b
        }
        _ => B::new(I::JMPL),
    };
    b.address(w, Access::READ, false);
    if !matches!(rd, 0 | 15) {
        b.gpr(rd, Access::WRITE).group(G::JUMP);
    }
    b
}

fn trap(w: &Word) -> Sparc {
    let (cc, cond) = SparcCc::icc(w.cond());
    let mut b = B::named(I::T, format!("t{}", cond));
    let rs1 = w.rs1();
    if w.i() {
        let number = bits(w.raw, 0, 7) as u64;
        if rs1 == 0 {
            b.uimm(number);
        } else {
            let base = R::gpr(rs1);
            b.push(
                SparcOperand::Mem {
                    base,
                    index: R::INVALID,
                    disp: number as i32,
                    access: Access::READ,
                },
                format!("%{}+{}", base.name(), fmt_uimm(number)),
            );
        }
    } else {
        b.address(w, Access::READ, false);
    }
    b.group(G::INT);
    if cc.tests_flags() {
        b.reads(&[R::ICC]);
    }
    Sparc {
        b,
        cc,
        hint: SparcHint::empty(),
    }
}

/// Register width of a floating-point operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fw {
    S,
    D,
}

fn freg(width: Fw, n: u32) -> R {
    match width {
        Fw::S => R::single(n),
        Fw::D => R::double(n),
    }
}

/// `(id, source width, destination width, binary, V9 only)` by `opf`.
fn fp_op(opf: u32) -> Option<(I, Fw, Fw, bool, bool)> {
    use Fw::{D, S};
    Some(match opf {
        0x01 => (I::FMOVS, S, S, false, false),
        0x02 => (I::FMOVD, D, D, false, true),
        0x05 => (I::FNEGS, S, S, false, false),
        0x06 => (I::FNEGD, D, D, false, true),
        0x09 => (I::FABSS, S, S, false, false),
        0x0a => (I::FABSD, D, D, false, true),
        0x29 => (I::FSQRTS, S, S, false, false),
        0x2a => (I::FSQRTD, D, D, false, false),
        0x41 => (I::FADDS, S, S, true, false),
        0x42 => (I::FADDD, D, D, true, false),
        0x45 => (I::FSUBS, S, S, true, false),
        0x46 => (I::FSUBD, D, D, true, false),
        0x49 => (I::FMULS, S, S, true, false),
        0x4a => (I::FMULD, D, D, true, false),
        0x4d => (I::FDIVS, S, S, true, false),
        0x4e => (I::FDIVD, D, D, true, false),
        0x69 => (I::FSMULD, S, D, true, false),
        0x81 => (I::FSTOX, S, D, false, true),
        0x82 => (I::FDTOX, D, D, false, true),
        0x84 => (I::FXTOS, D, S, false, true),
        0x88 => (I::FXTOD, D, D, false, true),
        0xc4 => (I::FITOS, S, S, false, false),
        0xc6 => (I::FDTOS, D, S, false, false),
        0xc8 => (I::FITOD, S, D, false, false),
        0xc9 => (I::FSTOD, S, D, false, false),
        0xd1 => (I::FSTOI, S, S, false, false),
        0xd2 => (I::FDTOI, D, S, false, false),
        _ => return None,
    })
}

fn fpop(w: &Word) -> Option<B> {
    let (id, src, dst, binary, wide_only) = fp_op(w.opf())?;
    if wide_only && !w.v9 {
        return None;
    }
    let mut b = B::new(id);
    if binary {
        b.reg(freg(src, w.rs1()), Access::READ);
    }
    b.reg(freg(src, w.rs2()), Access::READ)
        .reg(freg(dst, w.rd()), Access::WRITE)
        .group(G::FPU);
    if wide_only {
        b.group(G::V9);
    }
    Some(b)
}

fn fcmp(w: &Word) -> Option<B> {
    let (id, width) = match w.opf() {
        0x51 => (I::FCMPS, Fw::S),
        0x52 => (I::FCMPD, Fw::D),
        0x55 => (I::FCMPES, Fw::S),
        0x56 => (I::FCMPED, Fw::D),
        _ => return None,
    };
    let fcc = R::fcc(bits(w.raw, 25, 2));
    let mut b = B::new(id);
    if w.v9 {
        b.reg(fcc, Access::WRITE);
    } else {
        b.writes(&[fcc]);
    }
    b.reg(freg(width, w.rs1()), Access::READ)
        .reg(freg(width, w.rs2()), Access::READ)
        .group(G::FPU);
    Some(b)
}

/// Register file a load or store moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Data {
    Gpr,
    Single,
    Double,
    Fsr,
}

/// `(id, printed mnemonic, store, data, V9 only)` by `op3`.
fn mem_op(op3: u32) -> Option<(I, &'static str, bool, Data, bool)> {
    use Data::{Double, Fsr, Gpr, Single};
    Some(match op3 {
        0x00 => (I::LD, "ld", false, Gpr, false),
        0x01 => (I::LDUB, "ldub", false, Gpr, false),
        0x02 => (I::LDUH, "lduh", false, Gpr, false),
        0x03 => (I::LDD, "ldd", false, Gpr, false),
        0x04 => (I::ST, "st", true, Gpr, false),
        0x05 => (I::STB, "stb", true, Gpr, false),
        0x06 => (I::STH, "sth", true, Gpr, false),
        0x07 => (I::STD, "std", true, Gpr, false),
        0x08 => (I::LDSW, "ldsw", false, Gpr, true),
        0x09 => (I::LDSB, "ldsb", false, Gpr, false),
        0x0a => (I::LDSH, "ldsh", false, Gpr, false),
        0x0b => (I::LDX, "ldx", false, Gpr, true),
        0x0d => (I::LDSTUB, "ldstub", false, Gpr, false),
        0x0e => (I::STX, "stx", true, Gpr, true),
        0x0f => (I::SWAP, "swap", false, Gpr, false),
        0x20 => (I::LDF, "ld", false, Single, false),
        0x21 => (I::LDFSR, "ld", false, Fsr, false),
        0x23 => (I::LDDF, "ldd", false, Double, false),
        0x24 => (I::STF, "st", true, Single, false),
        0x25 => (I::STFSR, "st", true, Fsr, false),
        0x27 => (I::STDF, "std", true, Double, false),
        _ => return None,
    })
}

fn memory(w: &Word) -> Option<B> {
    let (id, name, store, data, wide_only) = mem_op(w.op3())?;
    if wide_only && !w.v9 {
        return None;
    }
    // no alternate-space forms here, so the asi field must be clear
    if !w.i() && bits(w.raw, 5, 8) != 0 {
        return None;
    }
    // doubleword integer transfers name an even/odd register pair
    if matches!(id, I::LDD | I::STD) && w.rd() % 2 == 1 {
        return None;
    }
    if data == Data::Fsr && w.rd() != 0 {
        return None;
    }
    let reg = match data {
        Data::Gpr => R::gpr(w.rd()),
        Data::Single => R::single(w.rd()),
        Data::Double => R::double(w.rd()),
        Data::Fsr => R::FSR,
    };
    let mut b = B::named(id, name);
    if store {
        b.reg(reg, Access::READ).address(w, Access::WRITE, true);
    } else {
        let access = if matches!(id, I::SWAP | I::LDSTUB) {
            Access::READ_WRITE
        } else {
            Access::READ
        };
        b.address(w, access, true).reg(reg, Access::WRITE);
    }
    if data != Data::Gpr {
        b.group(G::FPU);
    }
    if wide_only {
        b.group(G::V9);
    }
    Some(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(raw: u32, v9: bool) -> String {
        let s = decode(raw, 0x1000, v9).expect("valid encoding");
        format!("{} {}", s.b.mnemonic, s.b.op_str()).trim_end().to_string()
    }

    #[test]
    fn test_address_forms() {
        // ld [%o0+%o1], %o2
        assert_eq!(text(0xd402_0009, false), "ld [%o0+%o1], %o2");
        // ld [%o0], %o2
        assert_eq!(text(0xd402_0000, false), "ld [%o0], %o2");
        // ld [%o0+0x10], %o2
        assert_eq!(text(0xd402_2010, false), "ld [%o0+0x10], %o2");
        // jmpl %o1+8, %g2
        assert_eq!(text(0x85c2_6008, false), "jmpl %o1+8, %g2");
    }

    #[test]
    fn test_fp_branch_and_loads() {
        // fbl 0x1010
        assert_eq!(text(0x0980_0004, false), "fbl 0x1010");
        // ld [%o0], %f1
        assert_eq!(text(0xc302_0000, false), "ld [%o0], %f1");
        // ldd [%o0], %f2
        assert_eq!(text(0xc51a_0000, false), "ldd [%o0], %f2");
        // fitos %f0, %f1
        assert_eq!(text(0x83a0_1880, false), "fitos %f0, %f1");
    }

    #[test]
    fn test_alu_forms() {
        assert_eq!(text(0x9022_0009, false), "sub %o0, %o1, %o0");
        assert_eq!(text(0x9082_2001, false), "addcc %o0, 1, %o0");
        assert_eq!(text(0x9052_0009, false), "umul %o0, %o1, %o0");
        // restore %o0, 0, %o0
        assert_eq!(text(0x91ea_2000, false), "restore %o0, 0, %o0");
    }

    #[test]
    fn test_trap_forms() {
        assert_eq!(text(0x93d0_2001, false), "tne 1");
        assert!(decode(0x91d0_2005, 0, false).unwrap().b.groups.contains(&G::INT.id()));
    }

    #[test]
    fn test_invalid_op3_is_rejected() {
        // op = 2, op3 = 0x3f
        assert!(decode(0x81f8_0000, 0, false).is_none());
        // op = 3, op3 = 0x3f
        assert!(decode(0xc1f8_0000, 0, false).is_none());
    }

    #[test]
    fn test_memory_reserved_fields() {
        // ldd into %i3
        assert!(decode(0xf61f_f889, 0, false).is_none());
        // std from %o1
        assert!(decode(0xd238_0000, 0, false).is_none());
        // ld with a nonzero asi and i = 0
        assert!(decode(0xd402_0029, 0, false).is_none());
        // ld into %fsr with rd = 1
        assert!(decode(0xc308_0000, 0, false).is_none());
        assert_eq!(text(0xf41f_e008, false), "ldd [%i7+8], %i2");
        assert_eq!(text(0xd03a_4000, false), "std %o0, [%o1]");
    }
}
