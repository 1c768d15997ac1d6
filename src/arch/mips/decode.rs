//! MIPS word decoding into the shared builder.

use super::{MipsGroup as G, MipsInsn as I, MipsOperand, MipsReg};
use crate::arch::{bit, bits, fmt_imm, fmt_uimm, sign_extend, InsnBuilder};
use crate::insn::Access;
use crate::table::IdTable;
use crate::{Address, Mode};

type B = InsnBuilder<I, MipsOperand>;

impl InsnBuilder<I, MipsOperand> {
    fn gpr(&mut self, n: u32, access: Access) -> &mut Self {
        let reg = MipsReg::gpr(n);
        self.push(MipsOperand::reg(reg, access), format!("${}", reg.name()))
    }

    fn fpr(&mut self, n: u32, access: Access) -> &mut Self {
        let reg = MipsReg::fpr(n);
        self.push(MipsOperand::reg(reg, access), format!("${}", reg.name()))
    }

    fn fcc(&mut self, n: u32, access: Access) -> &mut Self {
        let reg = MipsReg::fcc(n);
        self.push(MipsOperand::reg(reg, access), format!("${}", reg.name()))
    }

    fn imm(&mut self, value: i64) -> &mut Self {
        self.push(MipsOperand::imm(value), fmt_imm(value))
    }

    fn uimm(&mut self, value: u64) -> &mut Self {
        self.push(MipsOperand::imm(value as i64), fmt_uimm(value))
    }

    /// Coprocessor or hardware register printed by number.
    fn numbered(&mut self, n: u32) -> &mut Self {
        self.push(MipsOperand::imm(n as i64), format!("${}", n))
    }

    fn mem(&mut self, base: u32, disp: i64, access: Access) -> &mut Self {
        let base = MipsReg::gpr(base);
        self.push(
            MipsOperand::mem(base, disp, access),
            format!("{}(${})", fmt_imm(disp), base.name()),
        )
    }
}

/// Fixed instruction fields.
struct Word {
    raw: u32,
    address: Address,
    /// 64-bit operations are legal
    wide: bool,
    /// Release 2 operations are legal
    r2: bool,
}

impl Word {
    fn op(&self) -> u32 {
        bits(self.raw, 26, 6)
    }
    fn rs(&self) -> u32 {
        bits(self.raw, 21, 5)
    }
    fn rt(&self) -> u32 {
        bits(self.raw, 16, 5)
    }
    fn rd(&self) -> u32 {
        bits(self.raw, 11, 5)
    }
    fn sa(&self) -> u32 {
        bits(self.raw, 6, 5)
    }
    fn funct(&self) -> u32 {
        bits(self.raw, 0, 6)
    }
    fn simm(&self) -> i64 {
        sign_extend(bits(self.raw, 0, 16) as u64, 16)
    }
    fn uimm(&self) -> u64 {
        bits(self.raw, 0, 16) as u64
    }

    /// PC-relative branch destination.
    fn branch_target(&self) -> u64 {
        let t = self
            .address
            .wrapping_add(4)
            .wrapping_add((self.simm() << 2) as u64);
        self.clip(t)
    }

    /// J/JAL region-relative destination.
    fn jump_target(&self) -> u64 {
        let region = self.address.wrapping_add(4) & !0x0fff_ffff;
        self.clip(region | ((bits(self.raw, 0, 26) as u64) << 2))
    }

    fn clip(&self, addr: u64) -> u64 {
        if self.wide {
            addr
        } else {
            addr & 0xffff_ffff
        }
    }
}

pub(super) fn decode(raw: u32, address: Address, mode: Mode) -> Option<B> {
    let w = Word {
        raw,
        address,
        wide: mode.intersects(Mode::MODE_64 | Mode::MIPS3),
        r2: !mode.intersects(Mode::MIPS2 | Mode::MIPS3),
    };
    let mut b = match w.op() {
        0 => special(&w)?,
        1 => regimm(&w)?,
        2 | 3 => {
            let call = w.op() == 3;
            let mut b = B::new(if call { I::JAL } else { I::J });
            b.uimm(w.jump_target());
            if call {
                b.group(G::CALL).writes(&[MipsReg::RA]);
            } else {
                b.group(G::JUMP);
            }
            b
        }
        4..=7 | 20..=23 => branch(&w)?,
        8..=15 | 24 | 25 => immediate(&w)?,
        16 => cop0(&w)?,
        17 => cop1(&w)?,
        28 => special2(&w)?,
        31 if w.r2 => special3(&w)?,
        26 | 27 | 32..=63 => load_store(&w)?,
        _ => return None,
    };
    b.group(G::STDENC);
    Some(b)
}

fn three_reg(id: I, w: &Word) -> B {
    let mut b = B::new(id);
    b.gpr(w.rd(), Access::WRITE)
        .gpr(w.rs(), Access::READ)
        .gpr(w.rt(), Access::READ);
    b
}

fn shift_imm(id: I, w: &Word, amount: u32) -> B {
    let mut b = B::new(id);
    b.gpr(w.rd(), Access::WRITE)
        .gpr(w.rt(), Access::READ)
        .uimm(amount as u64);
    b
}

fn shift_var(id: I, w: &Word) -> B {
    let mut b = B::new(id);
    b.gpr(w.rd(), Access::WRITE)
        .gpr(w.rt(), Access::READ)
        .gpr(w.rs(), Access::READ);
    b
}

fn move_alias(w: &Word, src: u32) -> B {
    let mut b = B::new(I::MOVE);
    b.gpr(w.rd(), Access::WRITE).gpr(src, Access::READ);
    b
}

fn special(w: &Word) -> Option<B> {
    let (rs, rt, rd, sa) = (w.rs(), w.rt(), w.rd(), w.sa());
    let wide = |b: B| if w.wide { Some(b) } else { None };
    let b = match w.funct() {
        0x00 => {
            if rs != 0 {
                return None;
            }
            match w.raw {
                0x0000_0000 => B::new(I::NOP),
                0x0000_0040 => B::new(I::SSNOP),
                0x0000_00c0 => B::new(I::EHB),
                _ => shift_imm(I::SLL, w, sa),
            }
        }
        0x01 => {
            if bit(w.raw, 17) || sa != 0 {
                return None;
            }
            let id = if bit(w.raw, 16) { I::MOVT } else { I::MOVF };
            let mut b = B::new(id);
            b.gpr(rd, Access::WRITE)
                .gpr(rs, Access::READ)
                .fcc(bits(w.raw, 18, 3), Access::READ)
                .group(G::FPU);
            b
        }
        0x02 => match rs {
            0 => shift_imm(I::SRL, w, sa),
            1 if w.r2 => {
                let mut b = shift_imm(I::ROTR, w, sa);
                b.group(G::MIPS32R2);
                b
            }
            _ => return None,
        },
        0x03 if rs == 0 => shift_imm(I::SRA, w, sa),
        0x04 if sa == 0 => shift_var(I::SLLV, w),
        0x06 => match sa {
            0 => shift_var(I::SRLV, w),
            1 if w.r2 => {
                let mut b = shift_var(I::ROTRV, w);
                b.group(G::MIPS32R2);
                b
            }
            _ => return None,
        },
        0x07 if sa == 0 => shift_var(I::SRAV, w),
        0x08 => {
            if rt != 0 || rd != 0 {
                return None;
            }
            let mut b = B::new(I::JR);
            b.gpr(rs, Access::READ).group(G::JUMP);
            if rs == 31 {
                b.group(G::RET);
            }
            b
        }
        0x09 => {
            if rt != 0 {
                return None;
            }
            let mut b = B::new(I::JALR);
            if rd == 31 {
                b.gpr(rs, Access::READ).writes(&[MipsReg::RA]);
            } else {
                b.gpr(rd, Access::WRITE).gpr(rs, Access::READ);
            }
            b.group(G::CALL);
            b
        }
        0x0a if sa == 0 => three_reg(I::MOVZ, w),
        0x0b if sa == 0 => three_reg(I::MOVN, w),
        0x0c => {
            let mut b = B::new(I::SYSCALL);
            let code = bits(w.raw, 6, 20);
            if code != 0 {
                b.uimm(code as u64);
            }
            b.group(G::INT);
            b
        }
        0x0d => {
            let mut b = B::new(I::BREAK);
            let (hi, lo) = (bits(w.raw, 16, 10), bits(w.raw, 6, 10));
            if hi != 0 || lo != 0 {
                b.uimm(hi as u64);
                if lo != 0 {
                    b.uimm(lo as u64);
                }
            }
            b.group(G::INT);
            b
        }
        0x0f => {
            if bits(w.raw, 11, 15) != 0 {
                return None;
            }
            let mut b = B::new(I::SYNC);
            if sa != 0 {
                b.uimm(sa as u64);
            }
            b
        }
        0x10 | 0x12 => {
            let (id, src) = if w.funct() == 0x10 {
                (I::MFHI, MipsReg::HI)
            } else {
                (I::MFLO, MipsReg::LO)
            };
            let mut b = B::new(id);
            b.gpr(rd, Access::WRITE).reads(&[src]);
            b
        }
        0x11 | 0x13 => {
            let (id, dst) = if w.funct() == 0x11 {
                (I::MTHI, MipsReg::HI)
            } else {
                (I::MTLO, MipsReg::LO)
            };
            let mut b = B::new(id);
            b.gpr(rs, Access::READ).writes(&[dst]);
            b
        }
        0x14 if sa == 0 => wide(shift_var(I::DSLLV, w))?,
        0x16 => match sa {
            0 => wide(shift_var(I::DSRLV, w))?,
            1 if w.r2 => wide(shift_var(I::DROTRV, w))?,
            _ => return None,
        },
        0x17 if sa == 0 => wide(shift_var(I::DSRAV, w))?,
        f @ 0x18..=0x1f => {
            if rd != 0 || sa != 0 {
                return None;
            }
            let id = [
                I::MULT, I::MULTU, I::DIV, I::DIVU, I::DMULT, I::DMULTU, I::DDIV, I::DDIVU,
            ][(f - 0x18) as usize];
            if f >= 0x1c && !w.wide {
                return None;
            }
            let mut b = B::new(id);
            if matches!(id, I::DIV | I::DIVU | I::DDIV | I::DDIVU) {
                b.gpr(0, Access::WRITE);
            }
            b.gpr(rs, Access::READ)
                .gpr(rt, Access::READ)
                .writes(&[MipsReg::HI, MipsReg::LO]);
            b
        }
        f @ 0x20..=0x27 | f @ 0x2a | f @ 0x2b => {
            if sa != 0 {
                return None;
            }
            match f {
                0x21 | 0x25 if rt == 0 => move_alias(w, rs),
                0x23 if rs == 0 => {
                    let mut b = B::new(I::NEGU);
                    b.gpr(rd, Access::WRITE).gpr(rt, Access::READ);
                    b
                }
                0x27 if rt == 0 => {
                    let mut b = B::new(I::NOT);
                    b.gpr(rd, Access::WRITE).gpr(rs, Access::READ);
                    b
                }
                _ => {
                    let id = match f {
                        0x20 => I::ADD,
                        0x21 => I::ADDU,
                        0x22 => I::SUB,
                        0x23 => I::SUBU,
                        0x24 => I::AND,
                        0x25 => I::OR,
                        0x26 => I::XOR,
                        0x27 => I::NOR,
                        0x2a => I::SLT,
                        _ => I::SLTU,
                    };
                    three_reg(id, w)
                }
            }
        }
        f @ 0x2c..=0x2f => {
            if sa != 0 || !w.wide {
                return None;
            }
            let mut b = match f {
                0x2d if rt == 0 => move_alias(w, rs),
                0x2f if rs == 0 => {
                    let mut b = B::new(I::DNEGU);
                    b.gpr(rd, Access::WRITE).gpr(rt, Access::READ);
                    b
                }
                0x2c => three_reg(I::DADD, w),
                0x2d => three_reg(I::DADDU, w),
                0x2e => three_reg(I::DSUB, w),
                _ => three_reg(I::DSUBU, w),
            };
            b.group(G::MIPS64);
            b
        }
        f @ (0x30..=0x34 | 0x36) => {
            let id = match f {
                0x30 => I::TGE,
                0x31 => I::TGEU,
                0x32 => I::TLT,
                0x33 => I::TLTU,
                0x34 => I::TEQ,
                _ => I::TNE,
            };
            let mut b = B::new(id);
            b.gpr(rs, Access::READ).gpr(rt, Access::READ);
            let code = bits(w.raw, 6, 10);
            if code != 0 {
                b.uimm(code as u64);
            }
            b
        }
        f @ (0x38 | 0x3a | 0x3b | 0x3c | 0x3e | 0x3f) => {
            if !w.wide {
                return None;
            }
            let hi = f >= 0x3c;
            let id = match (f & 3, rs) {
                (0, 0) => if hi { I::DSLL32 } else { I::DSLL },
                (2, 0) => if hi { I::DSRL32 } else { I::DSRL },
                (2, 1) if w.r2 => if hi { I::DROTR32 } else { I::DROTR },
                (3, 0) => if hi { I::DSRA32 } else { I::DSRA },
                _ => return None,
            };
            let mut b = shift_imm(id, w, sa);
            b.group(G::MIPS64);
            b
        }
        _ => return None,
    };
    Some(b)
}

fn regimm(w: &Word) -> Option<B> {
    let (rs, rt) = (w.rs(), w.rt());
    let b = match rt {
        0..=3 | 16..=19 => {
            let link = rt >= 16;
            let id = match (rt & 3, link) {
                (0, false) => I::BLTZ,
                (1, false) => I::BGEZ,
                (2, false) => I::BLTZL,
                (3, false) => I::BGEZL,
                (0, true) => I::BLTZAL,
                (1, true) if rs == 0 => I::BAL,
                (1, true) => I::BGEZAL,
                (2, true) => I::BLTZALL,
                _ => I::BGEZALL,
            };
            let mut b = B::new(id);
            if id != I::BAL {
                b.gpr(rs, Access::READ);
            }
            b.uimm(w.branch_target()).group(G::BRANCH_RELATIVE);
            if link {
                b.group(G::CALL).writes(&[MipsReg::RA]);
            } else {
                b.group(G::JUMP);
            }
            b
        }
        8..=12 | 14 => {
            let id = match rt {
                8 => I::TGEI,
                9 => I::TGEIU,
                10 => I::TLTI,
                11 => I::TLTIU,
                12 => I::TEQI,
                _ => I::TNEI,
            };
            let mut b = B::new(id);
            b.gpr(rs, Access::READ).imm(w.simm());
            b
        }
        31 if w.r2 => {
            let mut b = B::new(I::SYNCI);
            b.mem(rs, w.simm(), Access::READ).group(G::MIPS32R2);
            b
        }
        _ => return None,
    };
    Some(b)
}

fn branch(w: &Word) -> Option<B> {
    let (rs, rt) = (w.rs(), w.rt());
    let likely = w.op() >= 20;
    let mut b = match w.op() & 3 {
        0 => {
            if rs == 0 && rt == 0 && !likely {
                B::new(I::B)
            } else if rt == 0 {
                let mut b = B::new(if likely { I::BEQZL } else { I::BEQZ });
                b.gpr(rs, Access::READ);
                b
            } else {
                let mut b = B::new(if likely { I::BEQL } else { I::BEQ });
                b.gpr(rs, Access::READ).gpr(rt, Access::READ);
                b
            }
        }
        1 => {
            if rt == 0 {
                let mut b = B::new(if likely { I::BNEZL } else { I::BNEZ });
                b.gpr(rs, Access::READ);
                b
            } else {
                let mut b = B::new(if likely { I::BNEL } else { I::BNE });
                b.gpr(rs, Access::READ).gpr(rt, Access::READ);
                b
            }
        }
        n => {
            if rt != 0 {
                return None;
            }
            let id = match (n, likely) {
                (2, false) => I::BLEZ,
                (2, true) => I::BLEZL,
                (_, false) => I::BGTZ,
                (_, true) => I::BGTZL,
            };
            let mut b = B::new(id);
            b.gpr(rs, Access::READ);
            b
        }
    };
    b.uimm(w.branch_target())
        .group(G::JUMP)
        .group(G::BRANCH_RELATIVE);
    Some(b)
}

fn immediate(w: &Word) -> Option<B> {
    let (rs, rt) = (w.rs(), w.rt());
    let op = w.op();
    if op == 15 {
        if rs != 0 {
            return None;
        }
        let mut b = B::new(I::LUI);
        b.gpr(rt, Access::WRITE).uimm(w.uimm());
        return Some(b);
    }
    let (id, signed) = match op {
        8 => (I::ADDI, true),
        9 => (I::ADDIU, true),
        10 => (I::SLTI, true),
        11 => (I::SLTIU, true),
        12 => (I::ANDI, false),
        13 => (I::ORI, false),
        14 => (I::XORI, false),
        24 if w.wide => (I::DADDI, true),
        25 if w.wide => (I::DADDIU, true),
        _ => return None,
    };
    let mut b = B::new(id);
    b.gpr(rt, Access::WRITE).gpr(rs, Access::READ);
    if signed {
        b.imm(w.simm());
    } else {
        b.uimm(w.uimm());
    }
    if op >= 24 {
        b.group(G::MIPS64);
    }
    Some(b)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Target {
    Gpr,
    Fpr,
    Hint,
}

fn load_store(w: &Word) -> Option<B> {
    use Target::*;
    let rw = Access::READ_WRITE;
    let (id, target, reg_access, mem_access, wide) = match w.op() {
        26 => (I::LDL, Gpr, rw, Access::READ, true),
        27 => (I::LDR, Gpr, rw, Access::READ, true),
        32 => (I::LB, Gpr, Access::WRITE, Access::READ, false),
        33 => (I::LH, Gpr, Access::WRITE, Access::READ, false),
        34 => (I::LWL, Gpr, rw, Access::READ, false),
        35 => (I::LW, Gpr, Access::WRITE, Access::READ, false),
        36 => (I::LBU, Gpr, Access::WRITE, Access::READ, false),
        37 => (I::LHU, Gpr, Access::WRITE, Access::READ, false),
        38 => (I::LWR, Gpr, rw, Access::READ, false),
        39 => (I::LWU, Gpr, Access::WRITE, Access::READ, true),
        40 => (I::SB, Gpr, Access::READ, Access::WRITE, false),
        41 => (I::SH, Gpr, Access::READ, Access::WRITE, false),
        42 => (I::SWL, Gpr, Access::READ, Access::WRITE, false),
        43 => (I::SW, Gpr, Access::READ, Access::WRITE, false),
        44 => (I::SDL, Gpr, Access::READ, Access::WRITE, true),
        45 => (I::SDR, Gpr, Access::READ, Access::WRITE, true),
        46 => (I::SWR, Gpr, Access::READ, Access::WRITE, false),
        47 => (I::CACHE, Hint, Access::empty(), Access::READ, false),
        48 => (I::LL, Gpr, Access::WRITE, Access::READ, false),
        49 => (I::LWC1, Fpr, Access::WRITE, Access::READ, false),
        51 => (I::PREF, Hint, Access::empty(), Access::READ, false),
        52 => (I::LLD, Gpr, Access::WRITE, Access::READ, true),
        53 => (I::LDC1, Fpr, Access::WRITE, Access::READ, false),
        55 => (I::LD, Gpr, Access::WRITE, Access::READ, true),
        56 => (I::SC, Gpr, rw, Access::WRITE, false),
        57 => (I::SWC1, Fpr, Access::READ, Access::WRITE, false),
        60 => (I::SCD, Gpr, rw, Access::WRITE, true),
        61 => (I::SDC1, Fpr, Access::READ, Access::WRITE, false),
        63 => (I::SD, Gpr, Access::READ, Access::WRITE, true),
        _ => return None,
    };
    if wide && !w.wide {
        return None;
    }
    let mut b = B::new(id);
    match target {
        Gpr => b.gpr(w.rt(), reg_access),
        Fpr => b.fpr(w.rt(), reg_access).group(G::FPU),
        Hint => b.uimm(w.rt() as u64),
    };
    b.mem(w.rs(), w.simm(), mem_access);
    if id == I::CACHE {
        b.group(G::PRIVILEGE);
    }
    if wide {
        b.group(G::MIPS64);
    }
    Some(b)
}

fn cop0(w: &Word) -> Option<B> {
    let (rs, rt, rd) = (w.rs(), w.rt(), w.rd());
    let mut b = if rs >= 16 {
        if bits(w.raw, 6, 19) != 0 {
            return None;
        }
        let id = match w.funct() {
            0x01 => I::TLBR,
            0x02 => I::TLBWI,
            0x06 => I::TLBWR,
            0x08 => I::TLBP,
            0x18 => I::ERET,
            0x1f => I::DERET,
            0x20 => I::WAIT,
            _ => return None,
        };
        let mut b = B::new(id);
        if id == I::ERET {
            b.group(G::IRET);
        }
        b
    } else {
        match rs {
            0 | 1 | 4 | 5 => {
                if bits(w.raw, 3, 8) != 0 {
                    return None;
                }
                let (id, access) = match rs {
                    0 => (I::MFC0, Access::WRITE),
                    1 => (I::DMFC0, Access::WRITE),
                    4 => (I::MTC0, Access::READ),
                    _ => (I::DMTC0, Access::READ),
                };
                if matches!(rs, 1 | 5) && !w.wide {
                    return None;
                }
                let mut b = B::new(id);
                b.gpr(rt, access).numbered(rd).uimm(bits(w.raw, 0, 3) as u64);
                b
            }
            11 if w.r2 => {
                if rd != 12 || bits(w.raw, 0, 5) != 0 || bits(w.raw, 6, 5) != 0 {
                    return None;
                }
                let mut b = B::new(if bit(w.raw, 5) { I::EI } else { I::DI });
                if rt != 0 {
                    b.gpr(rt, Access::WRITE);
                }
                b.group(G::MIPS32R2);
                b
            }
            _ => return None,
        }
    };
    b.group(G::PRIVILEGE);
    Some(b)
}

const FMT_S: u32 = 16;
const FMT_D: u32 = 17;
const FMT_W: u32 = 20;
const FMT_L: u32 = 21;

fn fmt_suffix(fmt: u32) -> &'static str {
    match fmt {
        FMT_S => "s",
        FMT_D => "d",
        FMT_W => "w",
        _ => "l",
    }
}

fn cop1(w: &Word) -> Option<B> {
    let (rs, rt, rd) = (w.rs(), w.rt(), w.rd());
    let mut b = match rs {
        0..=7 => {
            if bits(w.raw, 0, 11) != 0 {
                return None;
            }
            let (id, to_gpr) = match rs {
                0 => (I::MFC1, true),
                1 => (I::DMFC1, true),
                2 => (I::CFC1, true),
                3 => (I::MFHC1, true),
                4 => (I::MTC1, false),
                5 => (I::DMTC1, false),
                6 => (I::CTC1, false),
                _ => (I::MTHC1, false),
            };
            if matches!(rs, 1 | 5) && !w.wide {
                return None;
            }
            if matches!(rs, 3 | 7) && !w.r2 {
                return None;
            }
            let mut b = B::new(id);
            b.gpr(rt, if to_gpr { Access::WRITE } else { Access::READ });
            if matches!(rs, 2 | 6) {
                b.numbered(rd);
            } else {
                b.fpr(rd, if to_gpr { Access::READ } else { Access::WRITE });
            }
            b
        }
        8 => {
            let id = match (bit(w.raw, 17), bit(w.raw, 16)) {
                (false, false) => I::BC1F,
                (false, true) => I::BC1T,
                (true, false) => I::BC1FL,
                (true, true) => I::BC1TL,
            };
            let mut b = B::new(id);
            b.fcc(bits(w.raw, 18, 3), Access::READ)
                .uimm(w.branch_target())
                .group(G::JUMP)
                .group(G::BRANCH_RELATIVE);
            b
        }
        FMT_S | FMT_D | FMT_W | FMT_L => fp_op(w, rs)?,
        _ => return None,
    };
    b.group(G::FPU);
    Some(b)
}

fn fp_op(w: &Word, fmt: u32) -> Option<B> {
    let (ft, fs, fd) = (w.rt(), w.rd(), w.sa());
    let float = fmt == FMT_S || fmt == FMT_D;
    let sfx = fmt_suffix(fmt);
    let b = match w.funct() {
        f @ 0..=7 if float => {
            let table_s = [I::ADD_S, I::SUB_S, I::MUL_S, I::DIV_S, I::SQRT_S, I::ABS_S, I::MOV_S, I::NEG_S];
            let table_d = [I::ADD_D, I::SUB_D, I::MUL_D, I::DIV_D, I::SQRT_D, I::ABS_D, I::MOV_D, I::NEG_D];
            let table = if fmt == FMT_S { table_s } else { table_d };
            let id = table[f as usize];
            let mut b = B::new(id);
            b.fpr(fd, Access::WRITE).fpr(fs, Access::READ);
            if f < 4 {
                b.fpr(ft, Access::READ);
            } else if ft != 0 {
                return None;
            }
            b
        }
        f @ 8..=15 if float => {
            if ft != 0 {
                return None;
            }
            let id = [
                I::ROUND_L, I::TRUNC_L, I::CEIL_L, I::FLOOR_L,
                I::ROUND_W, I::TRUNC_W, I::CEIL_W, I::FLOOR_W,
            ][(f - 8) as usize];
            convert(id, sfx, fd, fs)
        }
        17 if float => {
            if bit(w.raw, 17) {
                return None;
            }
            let (id, name) = if bit(w.raw, 16) {
                (I::MOVT_FMT, "movt")
            } else {
                (I::MOVF_FMT, "movf")
            };
            let mut b = B::named(id, format!("{}.{}", name, sfx));
            b.fpr(fd, Access::WRITE)
                .fpr(fs, Access::READ)
                .fcc(bits(w.raw, 18, 3), Access::READ);
            b
        }
        f @ (18 | 19) if float => {
            let (id, name) = if f == 18 {
                (I::MOVZ_FMT, "movz")
            } else {
                (I::MOVN_FMT, "movn")
            };
            let mut b = B::named(id, format!("{}.{}", name, sfx));
            b.fpr(fd, Access::WRITE)
                .fpr(fs, Access::READ)
                .gpr(ft, Access::READ);
            b
        }
        f @ (32 | 33 | 36 | 37) => {
            if ft != 0 {
                return None;
            }
            let id = match f {
                32 if fmt != FMT_S => I::CVT_S,
                33 if fmt != FMT_D => I::CVT_D,
                36 if float => I::CVT_W,
                37 if float => I::CVT_L,
                _ => return None,
            };
            convert(id, sfx, fd, fs)
        }
        f @ 48..=63 if float => {
            if bits(w.raw, 6, 2) != 0 {
                return None;
            }
            let cc = bits(w.raw, 8, 3);
            let id = I::from_id(I::C_F.id() + (f - 48) as u16)?;
            let mut b = B::named(id, format!("{}.{}", id.name(), sfx));
            if cc != 0 {
                b.fcc(cc, Access::WRITE);
            } else {
                b.writes(&[MipsReg::FCC0]);
            }
            b.fpr(fs, Access::READ).fpr(ft, Access::READ);
            b
        }
        _ => return None,
    };
    Some(b)
}

fn convert(id: I, src_sfx: &str, fd: u32, fs: u32) -> B {
    let mut b = B::named(id, format!("{}.{}", id.name(), src_sfx));
    b.fpr(fd, Access::WRITE).fpr(fs, Access::READ);
    b
}

fn special2(w: &Word) -> Option<B> {
    let (rs, rt, rd) = (w.rs(), w.rt(), w.rd());
    let acc = [MipsReg::HI, MipsReg::LO];
    let b = match w.funct() {
        f @ (0x00 | 0x01 | 0x04 | 0x05) => {
            if rd != 0 || w.sa() != 0 {
                return None;
            }
            let id = match f {
                0x00 => I::MADD,
                0x01 => I::MADDU,
                0x04 => I::MSUB,
                _ => I::MSUBU,
            };
            let mut b = B::new(id);
            b.gpr(rs, Access::READ)
                .gpr(rt, Access::READ)
                .reads(&acc)
                .writes(&acc);
            b
        }
        0x02 if w.sa() == 0 => {
            let mut b = three_reg(I::MUL, w);
            b.writes(&acc);
            b
        }
        f @ (0x20 | 0x21 | 0x24 | 0x25) => {
            if w.sa() != 0 {
                return None;
            }
            let id = match f {
                0x20 => I::CLZ,
                0x21 => I::CLO,
                0x24 if w.wide => I::DCLZ,
                0x25 if w.wide => I::DCLO,
                _ => return None,
            };
            let mut b = B::new(id);
            b.gpr(rd, Access::WRITE).gpr(rs, Access::READ);
            b
        }
        0x3f => {
            let mut b = B::new(I::SDBBP);
            let code = bits(w.raw, 6, 20);
            if code != 0 {
                b.uimm(code as u64);
            }
            b.group(G::INT);
            b
        }
        _ => return None,
    };
    Some(b)
}

fn special3(w: &Word) -> Option<B> {
    let (rs, rt, rd, sa) = (w.rs(), w.rt(), w.rd(), w.sa());
    let field = |id: I, pos: u32, size: u32, wide: bool| -> Option<B> {
        if wide && !w.wide {
            return None;
        }
        let mut b = B::new(id);
        let access = if matches!(id, I::INS | I::DINS | I::DINSM | I::DINSU) {
            Access::READ_WRITE
        } else {
            Access::WRITE
        };
        b.gpr(rt, access)
            .gpr(rs, Access::READ)
            .uimm(pos as u64)
            .uimm(size as u64)
            .group(if wide { G::MIPS64R2 } else { G::MIPS32R2 });
        Some(b)
    };
    match w.funct() {
        0x00 => field(I::EXT, sa, rd + 1, false),
        0x01 => field(I::DEXTM, sa, rd + 33, true),
        0x02 => field(I::DEXTU, sa + 32, rd + 1, true),
        0x03 => field(I::DEXT, sa, rd + 1, true),
        0x04 if rd >= sa => field(I::INS, sa, rd - sa + 1, false),
        0x05 if rd + 32 >= sa => field(I::DINSM, sa, rd + 32 - sa + 1, true),
        0x06 if rd >= sa => field(I::DINSU, sa + 32, rd - sa + 1, true),
        0x07 if rd >= sa => field(I::DINS, sa, rd - sa + 1, true),
        f @ (0x20 | 0x24) => {
            if rs != 0 {
                return None;
            }
            let id = match (f, sa) {
                (0x20, 0x02) => I::WSBH,
                (0x20, 0x10) => I::SEB,
                (0x20, 0x18) => I::SEH,
                (0x24, 0x02) if w.wide => I::DSBH,
                (0x24, 0x05) if w.wide => I::DSHD,
                _ => return None,
            };
            let mut b = B::new(id);
            b.gpr(rd, Access::WRITE)
                .gpr(rt, Access::READ)
                .group(if f == 0x24 { G::MIPS64R2 } else { G::MIPS32R2 });
            Some(b)
        }
        0x3b => {
            if rs != 0 || sa != 0 {
                return None;
            }
            let mut b = B::new(I::RDHWR);
            b.gpr(rt, Access::WRITE).numbered(rd).group(G::MIPS32R2);
            Some(b)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(raw: u32, mode: Mode) -> Option<String> {
        let b = decode(raw, 0x1000, mode)?;
        let ops = b.op_str();
        Some(if ops.is_empty() {
            b.mnemonic
        } else {
            format!("{} {}", b.mnemonic, ops)
        })
    }

    #[test]
    fn test_aliases() {
        let m = Mode::MODE_32;
        assert_eq!(text(0x0000_0040, m).as_deref(), Some("ssnop"));
        assert_eq!(text(0x0000_00c0, m).as_deref(), Some("ehb"));
        assert_eq!(text(0x0004_1023, m).as_deref(), Some("negu $v0, $a0"));
        assert_eq!(text(0x0080_1027, m).as_deref(), Some("not $v0, $a0"));
    }

    #[test]
    fn test_divide_prints_zero_destination() {
        assert_eq!(
            text(0x0085_001a, Mode::MODE_32).as_deref(),
            Some("div $zero, $a0, $a1")
        );
    }

    #[test]
    fn test_release2_gated_by_mips2() {
        // ext $v0, $a0, 4, 8
        let word = 0x7c82_3900;
        assert_eq!(text(word, Mode::MODE_32).as_deref(), Some("ext $v0, $a0, 4, 8"));
        assert_eq!(text(word, Mode::MODE_32 | Mode::MIPS2), None);
    }

    #[test]
    fn test_coprocessor_moves() {
        // mfc0 $t0, $12, 0
        assert_eq!(text(0x4008_6000, Mode::MODE_32).as_deref(), Some("mfc0 $t0, $12, 0"));
        assert_eq!(text(0x4200_0018, Mode::MODE_32).as_deref(), Some("eret"));
        // c.eq.d $f12, $f14
        assert_eq!(text(0x462e_6032, Mode::MODE_32).as_deref(), Some("c.eq.d $f12, $f14"));
    }

    #[test]
    fn test_groups() {
        let b = decode(0x03e0_0008, 0, Mode::MODE_32).unwrap();
        assert!(b.groups.contains(&G::RET.id()));
        assert!(b.groups.contains(&G::JUMP.id()));
        let b = decode(0x0c00_0000, 0, Mode::MODE_32).unwrap();
        assert!(b.groups.contains(&G::CALL.id()));
        assert_eq!(b.regs_write, vec![MipsReg::RA.id()]);
    }

    #[test]
    fn test_reserved_encodings() {
        // SPECIAL funct 0x05 is reserved
        assert_eq!(text(0x0000_0005, Mode::MODE_32), None);
        // lui with non-zero rs
        assert_eq!(text(0x3c22_0001, Mode::MODE_32), None);
    }
}
