//! A64 instruction word decoding.

use super::simd;
use super::{
    Arm64Cc as Cc, Arm64Extender as Ext, Arm64Group as G, Arm64Insn as I, Arm64OpKind as K,
    Arm64Operand, Arm64Pstate, Arm64Reg as R, Arm64Shift,
};
use crate::arch::{bit, bits, fmt_imm, fmt_uimm, sign_extend, InsnBuilder};
use crate::insn::Access;
use crate::table::IdTable;
use crate::Address;

type B = InsnBuilder<I, Arm64Operand>;

/// Detail fields outside the operand list.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct Flags {
    pub cc: Cc,
    pub update_flags: bool,
    pub writeback: bool,
}

impl Flags {
    fn set_flags(&mut self, b: &mut B) {
        self.update_flags = true;
        b.writes(&[R::NZCV]);
    }

    fn use_cond(&mut self, b: &mut B, cc: Cc) {
        self.cc = cc;
        b.reads(&[R::NZCV]);
    }
}

impl InsnBuilder<I, Arm64Operand> {
    pub(super) fn reg(&mut self, r: R, access: Access) -> &mut Self {
        self.push(Arm64Operand::new(K::Reg(r), access), r.name())
    }

    pub(super) fn gpr(&mut self, n: u32, wide: bool, sp: bool, access: Access) -> &mut Self {
        self.reg(R::gpr(n, wide, sp), access)
    }

    fn fpr(&mut self, n: u32, width: u32, access: Access) -> &mut Self {
        self.reg(R::fp(n, width), access)
    }

    fn imm(&mut self, value: i64) -> &mut Self {
        self.push(
            Arm64Operand::new(K::Imm(value), Access::empty()),
            format!("#{}", fmt_imm(value)),
        )
    }

    pub(super) fn uimm(&mut self, value: u64) -> &mut Self {
        self.push(
            Arm64Operand::new(K::Imm(value as i64), Access::empty()),
            format!("#{}", fmt_uimm(value)),
        )
    }

    /// Bitmask immediates always print in hex.
    fn hex(&mut self, value: u64) -> &mut Self {
        self.push(
            Arm64Operand::new(K::Imm(value as i64), Access::empty()),
            format!("#0x{:x}", value),
        )
    }

    /// Attach a shift to the last operand.
    fn shifted(&mut self, shift: Arm64Shift) -> &mut Self {
        if let Some(op) = self.ops.last_mut() {
            op.shift = Some(shift);
        }
        self.append_text(&format!(", {} #{}", shift.mnemonic(), shift.amount()))
    }

    fn cond(&mut self, cc: Cc) -> &mut Self {
        self.push_text(cc.name())
    }

    fn mem(&mut self, base: u32, index: R, disp: i64, text: String) -> &mut Self {
        let base = R::gpr(base, true, true);
        self.push(
            Arm64Operand::new(
                K::Mem {
                    base,
                    index,
                    disp: disp as i32,
                },
                Access::empty(),
            ),
            text,
        )
    }

    /// `[xn]` or `[xn, #disp]`.
    pub(super) fn mem_offset(&mut self, base: u32, disp: i64) -> &mut Self {
        let name = R::gpr(base, true, true).name();
        let text = if disp == 0 {
            format!("[{}]", name)
        } else {
            format!("[{}, #{}]", name, fmt_imm(disp))
        };
        self.mem(base, R::INVALID, disp, text)
    }

    /// `[xn, #disp]!` with base writeback.
    fn mem_pre(&mut self, base: u32, disp: i64, f: &mut Flags) -> &mut Self {
        let reg = R::gpr(base, true, true);
        let text = format!("[{}, #{}]!", reg.name(), fmt_imm(disp));
        f.writeback = true;
        self.writes(&[reg]).mem(base, R::INVALID, disp, text)
    }

    /// `[xn], #disp` with base writeback.
    fn mem_post(&mut self, base: u32, disp: i64, f: &mut Flags) -> &mut Self {
        let reg = R::gpr(base, true, true);
        let text = format!("[{}]", reg.name());
        f.writeback = true;
        self.writes(&[reg]).mem(base, R::INVALID, 0, text).imm(disp)
    }
}

pub(super) fn decode(w: u32, pc: Address) -> Option<(B, Flags)> {
    let mut f = Flags::default();
    let b = match bits(w, 25, 4) {
        0b1000 | 0b1001 => dp_imm(w, pc, &mut f)?,
        0b1010 | 0b1011 => branch_sys(w, pc, &mut f)?,
        0b0100 | 0b0110 | 0b1100 | 0b1110 => load_store(w, pc, &mut f)?,
        0b0101 | 0b1101 => dp_reg(w, &mut f)?,
        0b0111 => simd::data(w)?,
        0b1111 => fp(w, &mut f)?,
        _ => return None,
    };
    Some((b, f))
}

pub(super) fn rd(w: u32) -> u32 {
    bits(w, 0, 5)
}

pub(super) fn rn(w: u32) -> u32 {
    bits(w, 5, 5)
}

pub(super) fn rm(w: u32) -> u32 {
    bits(w, 16, 5)
}

/// DecodeBitMasks for the logical-immediate forms.
pub(super) fn decode_bit_masks(n: bool, imms: u32, immr: u32, wide: bool) -> Option<u64> {
    let combined = ((n as u32) << 6) | (!imms & 0x3f);
    if combined == 0 {
        return None;
    }
    let len = 31 - combined.leading_zeros();
    if len < 1 {
        return None;
    }
    let size = 1u32 << len;
    let levels = size - 1;
    let s = imms & levels;
    let r = immr & levels;
    if s == levels {
        return None;
    }
    let mask = if size == 64 { u64::MAX } else { (1u64 << size) - 1 };
    let welem = (1u64 << (s + 1)) - 1;
    let elem = if r == 0 {
        welem
    } else {
        ((welem >> r) | (welem << (size - r))) & mask
    };
    let mut value = elem;
    let mut width = size;
    while width < 64 {
        value |= value << width;
        width *= 2;
    }
    Some(if wide { value } else { value & 0xffff_ffff })
}

fn dp_imm(w: u32, pc: Address, f: &mut Flags) -> Option<B> {
    let sf = bit(w, 31);
    let (rd, rn) = (rd(w), rn(w));
    let b = match bits(w, 23, 3) {
        0 | 1 => {
            let imm = sign_extend(((bits(w, 5, 19) << 2) | bits(w, 29, 2)) as u64, 21);
            let (id, target) = if bit(w, 31) {
                (I::ADRP, (pc & !0xfff).wrapping_add((imm << 12) as u64))
            } else {
                (I::ADR, pc.wrapping_add(imm as u64))
            };
            let mut b = B::new(id);
            b.gpr(rd, true, false, Access::WRITE).uimm(target);
            b
        }
        2 => {
            let (sub, s) = (bit(w, 30), bit(w, 29));
            let sh = bit(w, 22);
            let imm = bits(w, 10, 12) as u64;
            let mut b;
            if !sub && !s && !sh && imm == 0 && (rd == 31 || rn == 31) {
                b = B::new(I::MOV);
                b.gpr(rd, sf, true, Access::WRITE)
                    .gpr(rn, sf, true, Access::READ);
                return Some(b);
            } else if s && rd == 31 {
                b = B::new(if sub { I::CMP } else { I::CMN });
                b.gpr(rn, sf, true, Access::READ).uimm(imm);
            } else {
                let id = match (sub, s) {
                    (false, false) => I::ADD,
                    (false, true) => I::ADDS,
                    (true, false) => I::SUB,
                    (true, true) => I::SUBS,
                };
                b = B::new(id);
                b.gpr(rd, sf, !s, Access::WRITE)
                    .gpr(rn, sf, true, Access::READ)
                    .uimm(imm);
            }
            if sh {
                b.shifted(Arm64Shift::Lsl(12));
            }
            if s {
                f.set_flags(&mut b);
            }
            b
        }
        4 => {
            let opc = bits(w, 29, 2);
            let n = bit(w, 22);
            if !sf && n {
                return None;
            }
            let imm = decode_bit_masks(n, bits(w, 10, 6), bits(w, 16, 6), sf)?;
            let mut b = match opc {
                1 if rn == 31 => {
                    let mut b = B::new(I::MOV);
                    b.gpr(rd, sf, true, Access::WRITE);
                    b
                }
                3 if rd == 31 => {
                    let mut b = B::new(I::TST);
                    b.gpr(rn, sf, false, Access::READ);
                    b
                }
                _ => {
                    let id = [I::AND, I::ORR, I::EOR, I::ANDS][opc as usize];
                    let mut b = B::new(id);
                    b.gpr(rd, sf, opc != 3, Access::WRITE)
                        .gpr(rn, sf, false, Access::READ);
                    b
                }
            };
            b.hex(imm);
            if opc == 3 {
                f.set_flags(&mut b);
            }
            b
        }
        5 => move_wide(w, sf)?,
        6 => bitfield(w, sf)?,
        _ => {
            let imms = bits(w, 10, 6);
            if bit(w, 22) != sf || bit(w, 21) || bits(w, 29, 2) != 0 || (!sf && imms >= 32) {
                return None;
            }
            let rm = rm(w);
            let mut b;
            if rn == rm {
                b = B::new(I::ROR);
                b.gpr(rd, sf, false, Access::WRITE)
                    .gpr(rn, sf, false, Access::READ);
            } else {
                b = B::new(I::EXTR);
                b.gpr(rd, sf, false, Access::WRITE)
                    .gpr(rn, sf, false, Access::READ)
                    .gpr(rm, sf, false, Access::READ);
            }
            b.uimm(imms as u64);
            b
        }
    };
    Some(b)
}

fn move_wide(w: u32, sf: bool) -> Option<B> {
    let opc = bits(w, 29, 2);
    let hw = bits(w, 21, 2);
    let imm16 = bits(w, 5, 16) as u64;
    if opc == 1 || (!sf && hw >= 2) {
        return None;
    }
    let shift = hw * 16;
    let rd = rd(w);
    let mut b;
    match opc {
        0 if !(imm16 == 0 && hw != 0) && (sf || imm16 != 0xffff) => {
            let inverted = !(imm16 << shift);
            let value = if sf {
                inverted as i64
            } else {
                inverted as u32 as i32 as i64
            };
            b = B::new(I::MOV);
            b.gpr(rd, sf, false, Access::WRITE).imm(value);
        }
        2 if !(imm16 == 0 && hw != 0) => {
            b = B::new(I::MOV);
            b.gpr(rd, sf, false, Access::WRITE).uimm(imm16 << shift);
        }
        _ => {
            let (id, access) = match opc {
                0 => (I::MOVN, Access::WRITE),
                2 => (I::MOVZ, Access::WRITE),
                _ => (I::MOVK, Access::READ_WRITE),
            };
            b = B::new(id);
            b.gpr(rd, sf, false, access).uimm(imm16);
            if shift != 0 {
                b.shifted(Arm64Shift::Lsl(shift));
            }
        }
    }
    Some(b)
}

fn bitfield(w: u32, sf: bool) -> Option<B> {
    let opc = bits(w, 29, 2);
    let immr = bits(w, 16, 6);
    let imms = bits(w, 10, 6);
    if opc == 3 || bit(w, 22) != sf || (!sf && (immr >= 32 || imms >= 32)) {
        return None;
    }
    let width = if sf { 64 } else { 32 };
    let (rd, rn) = (rd(w), rn(w));
    let build = |id: I, src_wide: bool, dst_access: Access, imms_out: &[u64]| {
        let mut b = B::new(id);
        b.gpr(rd, sf, false, dst_access)
            .gpr(rn, src_wide, false, Access::READ);
        for &v in imms_out {
            b.uimm(v);
        }
        b
    };
    let (immr64, imms64, width64) = (immr as u64, imms as u64, width as u64);
    let b = match opc {
        0 => {
            if imms == width - 1 {
                build(I::ASR, sf, Access::WRITE, &[immr64])
            } else if immr == 0 && imms == 7 {
                build(I::SXTB, false, Access::WRITE, &[])
            } else if immr == 0 && imms == 15 {
                build(I::SXTH, false, Access::WRITE, &[])
            } else if immr == 0 && imms == 31 && sf {
                build(I::SXTW, false, Access::WRITE, &[])
            } else if imms < immr {
                build(I::SBFIZ, sf, Access::WRITE, &[width64 - immr64, imms64 + 1])
            } else {
                build(I::SBFX, sf, Access::WRITE, &[immr64, imms64 - immr64 + 1])
            }
        }
        1 => {
            if imms < immr {
                build(I::BFI, sf, Access::READ_WRITE, &[width64 - immr64, imms64 + 1])
            } else {
                build(I::BFXIL, sf, Access::READ_WRITE, &[immr64, imms64 - immr64 + 1])
            }
        }
        _ => {
            if imms != width - 1 && imms + 1 == immr {
                build(I::LSL, sf, Access::WRITE, &[width64 - 1 - imms64])
            } else if imms == width - 1 {
                build(I::LSR, sf, Access::WRITE, &[immr64])
            } else if !sf && immr == 0 && imms == 7 {
                build(I::UXTB, false, Access::WRITE, &[])
            } else if !sf && immr == 0 && imms == 15 {
                build(I::UXTH, false, Access::WRITE, &[])
            } else if imms < immr {
                build(I::UBFIZ, sf, Access::WRITE, &[width64 - immr64, imms64 + 1])
            } else {
                build(I::UBFX, sf, Access::WRITE, &[immr64, imms64 - immr64 + 1])
            }
        }
    };
    Some(b)
}

fn branch_sys(w: u32, pc: Address, f: &mut Flags) -> Option<B> {
    let rel = |width: u32, lo: u32| -> u64 {
        pc.wrapping_add((sign_extend(bits(w, lo, width) as u64, width) << 2) as u64)
    };
    let b = if bits(w, 26, 5) == 0b00101 {
        let call = bit(w, 31);
        let mut b = B::new(if call { I::BL } else { I::B });
        b.uimm(rel(26, 0)).group(G::BRANCH_RELATIVE);
        if call {
            b.group(G::CALL).writes(&[R::X30]);
        } else {
            b.group(G::JUMP);
        }
        b
    } else if bits(w, 25, 6) == 0b011010 {
        let sf = bit(w, 31);
        let mut b = B::new(if bit(w, 24) { I::CBNZ } else { I::CBZ });
        b.gpr(rd(w), sf, false, Access::READ)
            .uimm(rel(19, 5))
            .group(G::JUMP)
            .group(G::BRANCH_RELATIVE);
        b
    } else if bits(w, 25, 6) == 0b011011 {
        let bitno = (bits(w, 31, 1) << 5) | bits(w, 19, 5);
        let mut b = B::new(if bit(w, 24) { I::TBNZ } else { I::TBZ });
        b.gpr(rd(w), bit(w, 31), false, Access::READ)
            .uimm(bitno as u64)
            .uimm(rel(14, 5))
            .group(G::JUMP)
            .group(G::BRANCH_RELATIVE);
        b
    } else if bits(w, 25, 7) == 0b0101010 {
        if bit(w, 24) || bit(w, 4) {
            return None;
        }
        let cc = Cc::from_bits(bits(w, 0, 4));
        let mut b = B::named(I::B, format!("b.{}", cc.name()));
        b.uimm(rel(19, 5))
            .group(G::JUMP)
            .group(G::BRANCH_RELATIVE);
        f.use_cond(&mut b, cc);
        b
    } else if bits(w, 24, 8) == 0b1101_0100 {
        exception(w)?
    } else if bits(w, 22, 10) == 0b11_0101_0100 {
        system(w)?
    } else if bits(w, 25, 7) == 0b110_1011 {
        branch_reg(w)?
    } else {
        return None;
    };
    Some(b)
}

fn exception(w: u32) -> Option<B> {
    if bits(w, 2, 3) != 0 {
        return None;
    }
    let (id, privileged) = match (bits(w, 21, 3), bits(w, 0, 2)) {
        (0, 1) => (I::SVC, false),
        (0, 2) => (I::HVC, true),
        (0, 3) => (I::SMC, true),
        (1, 0) => (I::BRK, false),
        (2, 0) => (I::HLT, false),
        _ => return None,
    };
    let mut b = B::new(id);
    b.uimm(bits(w, 5, 16) as u64).group(G::INT);
    if privileged {
        b.group(G::PRIVILEGE);
    }
    Some(b)
}

const BARRIER_OPTIONS: [&str; 16] = [
    "", "oshld", "oshst", "osh", "", "nshld", "nshst", "nsh",
    "", "ishld", "ishst", "ish", "", "ld", "st", "sy",
];

fn barrier_text(crm: u32) -> String {
    match BARRIER_OPTIONS[(crm & 15) as usize] {
        "" => format!("#{}", fmt_uimm(crm as u64)),
        name => name.to_string(),
    }
}

/// Printed name of a system register encoding.
pub(super) fn sysreg_name(enc: u32) -> String {
    let known = match enc {
        0xc000 => "midr_el1",
        0xc005 => "mpidr_el1",
        0xc080 => "sctlr_el1",
        0xc100 => "ttbr0_el1",
        0xc101 => "ttbr1_el1",
        0xc102 => "tcr_el1",
        0xc200 => "spsr_el1",
        0xc201 => "elr_el1",
        0xc208 => "sp_el0",
        0xc212 => "currentel",
        0xc290 => "esr_el1",
        0xc300 => "far_el1",
        0xc510 => "mair_el1",
        0xc600 => "vbar_el1",
        0xc684 => "tpidr_el1",
        0xd801 => "ctr_el0",
        0xd807 => "dczid_el0",
        0xda10 => "nzcv",
        0xda11 => "daif",
        0xda20 => "fpcr",
        0xda21 => "fpsr",
        0xde82 => "tpidr_el0",
        0xde83 => "tpidrro_el0",
        0xdf00 => "cntfrq_el0",
        0xdf02 => "cntvct_el0",
        _ => "",
    };
    if known.is_empty() {
        format!(
            "s{}_{}_c{}_c{}_{}",
            (enc >> 14) & 3,
            (enc >> 11) & 7,
            (enc >> 7) & 15,
            (enc >> 3) & 15,
            enc & 7
        )
    } else {
        known.to_string()
    }
}

fn system(w: u32) -> Option<B> {
    let l = bit(w, 21);
    let op0 = bits(w, 19, 2);
    let op1 = bits(w, 16, 3);
    let crn = bits(w, 12, 4);
    let crm = bits(w, 8, 4);
    let op2 = bits(w, 5, 3);
    let rt = rd(w);
    let b = match op0 {
        0 if !l && rt == 31 => match (crn, op1) {
            (4, _) => {
                let (field, name) = match (op1, op2) {
                    (0, 5) => (Arm64Pstate::SpSel, "spsel"),
                    (3, 6) => (Arm64Pstate::DaifSet, "daifset"),
                    (3, 7) => (Arm64Pstate::DaifClr, "daifclr"),
                    _ => return None,
                };
                let mut b = B::new(I::MSR);
                b.push(Arm64Operand::new(K::Pstate(field), Access::WRITE), name)
                    .uimm(crm as u64);
                b
            }
            (2, 3) => {
                let id = match (crm << 3) | op2 {
                    0 => I::NOP,
                    1 => I::YIELD,
                    2 => I::WFE,
                    3 => I::WFI,
                    4 => I::SEV,
                    5 => I::SEVL,
                    n => {
                        let mut b = B::new(I::HINT);
                        b.uimm(n as u64);
                        return Some(b);
                    }
                };
                B::new(id)
            }
            (3, 3) => {
                let id = match op2 {
                    2 => I::CLREX,
                    4 => I::DSB,
                    5 => I::DMB,
                    6 => I::ISB,
                    _ => return None,
                };
                let mut b = B::new(id);
                match id {
                    I::DSB | I::DMB => {
                        b.push(
                            Arm64Operand::new(K::Barrier(crm), Access::empty()),
                            barrier_text(crm),
                        );
                    }
                    _ if crm != 15 => {
                        b.push(
                            Arm64Operand::new(K::Barrier(crm), Access::empty()),
                            format!("#{}", fmt_uimm(crm as u64)),
                        );
                    }
                    _ => {}
                }
                b
            }
            _ => return None,
        },
        1 => {
            let mut b = B::new(if l { I::SYSL } else { I::SYS });
            if l {
                b.gpr(rt, true, false, Access::WRITE);
            }
            b.uimm(op1 as u64)
                .push(Arm64Operand::new(K::Cimm(crn), Access::empty()), format!("c{}", crn))
                .push(Arm64Operand::new(K::Cimm(crm), Access::empty()), format!("c{}", crm))
                .uimm(op2 as u64);
            if !l && rt != 31 {
                b.gpr(rt, true, false, Access::READ);
            }
            b.group(G::PRIVILEGE);
            b
        }
        2 | 3 => {
            let enc = (op0 << 14) | (op1 << 11) | (crn << 7) | (crm << 3) | op2;
            let name = sysreg_name(enc);
            let mut b;
            if l {
                b = B::new(I::MRS);
                b.gpr(rt, true, false, Access::WRITE)
                    .push(Arm64Operand::new(K::RegMrs(enc), Access::READ), name);
            } else {
                b = B::new(I::MSR);
                b.push(Arm64Operand::new(K::RegMsr(enc), Access::WRITE), name)
                    .gpr(rt, true, false, Access::READ);
            }
            b
        }
        _ => return None,
    };
    Some(b)
}

fn branch_reg(w: u32) -> Option<B> {
    if bits(w, 16, 5) != 31 || bits(w, 10, 6) != 0 || bits(w, 0, 5) != 0 {
        return None;
    }
    let rn = rn(w);
    let b = match bits(w, 21, 4) {
        0 => {
            let mut b = B::new(I::BR);
            b.gpr(rn, true, false, Access::READ).group(G::JUMP);
            b
        }
        1 => {
            let mut b = B::new(I::BLR);
            b.gpr(rn, true, false, Access::READ)
                .writes(&[R::X30])
                .group(G::CALL);
            b
        }
        2 => {
            let mut b = B::new(I::RET);
            let reg = R::gpr(rn, true, false);
            if rn == 30 {
                b.push_op(Arm64Operand::new(K::Reg(reg), Access::READ));
            } else {
                b.reg(reg, Access::READ);
            }
            b.group(G::RET).group(G::JUMP);
            b
        }
        4 if rn == 31 => {
            let mut b = B::new(I::ERET);
            b.group(G::IRET).group(G::PRIVILEGE);
            b
        }
        5 if rn == 31 => {
            let mut b = B::new(I::DRPS);
            b.group(G::PRIVILEGE);
            b
        }
        _ => return None,
    };
    Some(b)
}

/// Register operand class of a load/store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rt {
    Gpr(bool),
    Fp(u32),
    Prefetch,
}

fn rt_operand(b: &mut B, rt: Rt, n: u32, access: Access) {
    match rt {
        Rt::Gpr(wide) => {
            b.gpr(n, wide, false, access);
        }
        Rt::Fp(width) => {
            b.fpr(n, width, access).group(G::FPARMV8);
        }
        Rt::Prefetch => {
            b.push(
                Arm64Operand::new(K::Prefetch(n), Access::empty()),
                prefetch_text(n),
            );
        }
    }
}

fn prefetch_text(op: u32) -> String {
    let (kind, target, policy) = (op >> 3, (op >> 1) & 3, op & 1);
    if kind <= 2 && target <= 2 {
        format!(
            "{}l{}{}",
            ["pld", "pli", "pst"][kind as usize],
            target + 1,
            ["keep", "strm"][policy as usize]
        )
    } else {
        format!("#{}", fmt_uimm(op as u64))
    }
}

fn load_store(w: u32, pc: Address, f: &mut Flags) -> Option<B> {
    match bits(w, 27, 3) {
        0b001 if bits(w, 24, 3) == 0 => exclusive(w),
        0b001 if bits(w, 24, 3) == 0b100 => simd::structure(w, f),
        0b011 if bits(w, 24, 2) == 0 => literal(w, pc),
        0b101 => pair(w, f),
        0b111 => single(w, f),
        _ => None,
    }
}

fn exclusive(w: u32) -> Option<B> {
    let size = bits(w, 30, 2) as usize;
    let (o2, l, o1, o0) = (bit(w, 23), bit(w, 22), bit(w, 21), bit(w, 15));
    let wide = size == 3;
    let (id, status, pair) = match (o2, o1, o0, l) {
        (false, false, false, false) => ([I::STXRB, I::STXRH, I::STXR, I::STXR][size], true, false),
        (false, false, false, true) => ([I::LDXRB, I::LDXRH, I::LDXR, I::LDXR][size], false, false),
        (false, false, true, false) => ([I::STLXRB, I::STLXRH, I::STLXR, I::STLXR][size], true, false),
        (false, false, true, true) => ([I::LDAXRB, I::LDAXRH, I::LDAXR, I::LDAXR][size], false, false),
        (false, true, o0, l) if size >= 2 => {
            let id = match (o0, l) {
                (false, false) => I::STXP,
                (false, true) => I::LDXP,
                (true, false) => I::STLXP,
                (true, true) => I::LDAXP,
            };
            (id, !l, true)
        }
        (true, false, true, false) => ([I::STLRB, I::STLRH, I::STLR, I::STLR][size], false, false),
        (true, false, true, true) => ([I::LDARB, I::LDARH, I::LDAR, I::LDAR][size], false, false),
        _ => return None,
    };
    let access = if l { Access::WRITE } else { Access::READ };
    let mut b = B::new(id);
    if status {
        b.gpr(rm(w), false, false, Access::WRITE);
    }
    b.gpr(rd(w), wide, false, access);
    if pair {
        b.gpr(bits(w, 10, 5), wide, false, access);
    }
    b.mem_offset(rn(w), 0);
    Some(b)
}

fn literal(w: u32, pc: Address) -> Option<B> {
    let target = pc.wrapping_add((sign_extend(bits(w, 5, 19) as u64, 19) << 2) as u64);
    let (id, rt) = match (bits(w, 30, 2), bit(w, 26)) {
        (0, false) => (I::LDR, Rt::Gpr(false)),
        (1, false) => (I::LDR, Rt::Gpr(true)),
        (2, false) => (I::LDRSW, Rt::Gpr(true)),
        (3, false) => (I::PRFM, Rt::Prefetch),
        (0, true) => (I::LDR, Rt::Fp(4)),
        (1, true) => (I::LDR, Rt::Fp(8)),
        (2, true) => (I::LDR, Rt::Fp(16)),
        _ => return None,
    };
    let mut b = B::new(id);
    rt_operand(&mut b, rt, rd(w), Access::WRITE);
    b.uimm(target);
    Some(b)
}

fn pair(w: u32, f: &mut Flags) -> Option<B> {
    let (opc, v, kind, l) = (bits(w, 30, 2), bit(w, 26), bits(w, 23, 2), bit(w, 22));
    let (rt, scale, signed) = match (opc, v) {
        (0, false) => (Rt::Gpr(false), 4, false),
        (1, false) if l && kind != 0 => (Rt::Gpr(true), 4, true),
        (2, false) => (Rt::Gpr(true), 8, false),
        (0, true) => (Rt::Fp(4), 4, false),
        (1, true) => (Rt::Fp(8), 8, false),
        (2, true) => (Rt::Fp(16), 16, false),
        _ => return None,
    };
    let id = match (kind, l, signed) {
        (0, true, _) => I::LDNP,
        (0, false, _) => I::STNP,
        (_, true, true) => I::LDPSW,
        (_, true, false) => I::LDP,
        (_, false, _) => I::STP,
    };
    let disp = sign_extend(bits(w, 15, 7) as u64, 7) * scale;
    let access = if l { Access::WRITE } else { Access::READ };
    let mut b = B::new(id);
    rt_operand(&mut b, rt, rd(w), access);
    rt_operand(&mut b, rt, bits(w, 10, 5), access);
    let base = rn(w);
    match kind {
        1 => b.mem_post(base, disp, f),
        3 => b.mem_pre(base, disp, f),
        _ => b.mem_offset(base, disp),
    };
    Some(b)
}

/// Mnemonics and register class of one size/opc combination.
struct Single {
    scaled: I,
    unscaled: I,
    rt: Rt,
    load: bool,
    scale: u32,
}

fn single_kind(size: u32, v: bool, opc: u32) -> Option<Single> {
    let s = |scaled, unscaled, rt, load| Single {
        scaled,
        unscaled,
        rt,
        load,
        scale: size,
    };
    if v {
        let load = opc & 1 == 1;
        let (ids, width, scale) = if opc & 2 != 0 {
            if size != 0 {
                return None;
            }
            ((I::LDR, I::STR), 16, 4)
        } else {
            ((I::LDR, I::STR), 1 << size, size)
        };
        let (scaled, unscaled) = if load { (ids.0, I::LDUR) } else { (ids.1, I::STUR) };
        return Some(Single {
            scaled,
            unscaled,
            rt: Rt::Fp(width),
            load,
            scale,
        });
    }
    let k = match (size, opc) {
        (0, 0) => s(I::STRB, I::STURB, Rt::Gpr(false), false),
        (0, 1) => s(I::LDRB, I::LDURB, Rt::Gpr(false), true),
        (0, 2) => s(I::LDRSB, I::LDURSB, Rt::Gpr(true), true),
        (0, 3) => s(I::LDRSB, I::LDURSB, Rt::Gpr(false), true),
        (1, 0) => s(I::STRH, I::STURH, Rt::Gpr(false), false),
        (1, 1) => s(I::LDRH, I::LDURH, Rt::Gpr(false), true),
        (1, 2) => s(I::LDRSH, I::LDURSH, Rt::Gpr(true), true),
        (1, 3) => s(I::LDRSH, I::LDURSH, Rt::Gpr(false), true),
        (2, 0) => s(I::STR, I::STUR, Rt::Gpr(false), false),
        (2, 1) => s(I::LDR, I::LDUR, Rt::Gpr(false), true),
        (2, 2) => s(I::LDRSW, I::LDURSW, Rt::Gpr(true), true),
        (3, 0) => s(I::STR, I::STUR, Rt::Gpr(true), false),
        (3, 1) => s(I::LDR, I::LDUR, Rt::Gpr(true), true),
        (3, 2) => s(I::PRFM, I::PRFUM, Rt::Prefetch, true),
        _ => return None,
    };
    Some(k)
}

fn single(w: u32, f: &mut Flags) -> Option<B> {
    let k = single_kind(bits(w, 30, 2), bit(w, 26), bits(w, 22, 2))?;
    let access = if k.load { Access::WRITE } else { Access::READ };
    let base = rn(w);
    let mut b;
    if bit(w, 24) {
        b = B::new(k.scaled);
        rt_operand(&mut b, k.rt, rd(w), access);
        b.mem_offset(base, (bits(w, 10, 12) as i64) << k.scale);
    } else if bit(w, 21) {
        if bits(w, 10, 2) != 2 {
            return None;
        }
        let option = bits(w, 13, 3);
        if option & 2 == 0 {
            return None;
        }
        let s = bit(w, 12);
        let index = R::gpr(rm(w), option & 1 == 1, false);
        let ext = Ext::from_option(option);
        let suffix = match (option, s) {
            (3, false) => String::new(),
            (3, true) => format!(", lsl #{}", k.scale),
            (_, false) => format!(", {}", ext.mnemonic()),
            (_, true) => format!(", {} #{}", ext.mnemonic(), k.scale),
        };
        let text = format!("[{}, {}{}]", R::gpr(base, true, true).name(), index.name(), suffix);
        b = B::new(k.scaled);
        rt_operand(&mut b, k.rt, rd(w), access);
        b.mem(base, index, 0, text);
        if let Some(op) = b.ops.last_mut() {
            if option != 3 {
                op.ext = ext;
            }
            if s {
                op.shift = Some(Arm64Shift::Lsl(k.scale));
            }
        }
    } else {
        let imm9 = sign_extend(bits(w, 12, 9) as u64, 9);
        let mode = bits(w, 10, 2);
        if mode == 2 || (k.rt == Rt::Prefetch && mode != 0) {
            return None;
        }
        b = B::new(if mode == 0 { k.unscaled } else { k.scaled });
        rt_operand(&mut b, k.rt, rd(w), access);
        match mode {
            0 => b.mem_offset(base, imm9),
            1 => b.mem_post(base, imm9, f),
            _ => b.mem_pre(base, imm9, f),
        };
    }
    Some(b)
}

fn dp_reg(w: u32, f: &mut Flags) -> Option<B> {
    if !bit(w, 28) {
        return if !bit(w, 24) {
            logical_shifted(w, f)
        } else if !bit(w, 21) {
            addsub_shifted(w, f)
        } else {
            addsub_extended(w, f)
        };
    }
    match bits(w, 21, 4) {
        0 => carry(w, f),
        2 => cond_compare(w, f),
        4 => cond_select(w, f),
        6 if bit(w, 30) => dp1(w),
        6 => dp2(w),
        8..=15 => dp3(w),
        _ => None,
    }
}

fn shift_operand(b: &mut B, kind: u32, amount: u32) {
    if kind != 0 || amount != 0 {
        b.shifted(Arm64Shift::from_bits(kind, amount));
    }
}

fn logical_shifted(w: u32, f: &mut Flags) -> Option<B> {
    let sf = bit(w, 31);
    let opc = bits(w, 29, 2);
    let kind = bits(w, 22, 2);
    let n = bit(w, 21);
    let imm6 = bits(w, 10, 6);
    if !sf && imm6 >= 32 {
        return None;
    }
    let (rd, rn, rm) = (rd(w), rn(w), rm(w));
    let mut b = match (opc, n) {
        (1, false) if rn == 31 && kind == 0 && imm6 == 0 => {
            let mut b = B::new(I::MOV);
            b.gpr(rd, sf, false, Access::WRITE)
                .gpr(rm, sf, false, Access::READ);
            return Some(b);
        }
        (1, true) if rn == 31 => {
            let mut b = B::new(I::MVN);
            b.gpr(rd, sf, false, Access::WRITE)
                .gpr(rm, sf, false, Access::READ);
            b
        }
        (3, false) if rd == 31 => {
            let mut b = B::new(I::TST);
            b.gpr(rn, sf, false, Access::READ)
                .gpr(rm, sf, false, Access::READ);
            b
        }
        _ => {
            let id = [I::AND, I::BIC, I::ORR, I::ORN, I::EOR, I::EON, I::ANDS, I::BICS]
                [(opc * 2 + n as u32) as usize];
            let mut b = B::new(id);
            b.gpr(rd, sf, false, Access::WRITE)
                .gpr(rn, sf, false, Access::READ)
                .gpr(rm, sf, false, Access::READ);
            b
        }
    };
    shift_operand(&mut b, kind, imm6);
    if opc == 3 {
        f.set_flags(&mut b);
    }
    Some(b)
}

fn addsub_shifted(w: u32, f: &mut Flags) -> Option<B> {
    let sf = bit(w, 31);
    let (sub, s) = (bit(w, 30), bit(w, 29));
    let kind = bits(w, 22, 2);
    let imm6 = bits(w, 10, 6);
    if kind == 3 || (!sf && imm6 >= 32) {
        return None;
    }
    let (rd, rn, rm) = (rd(w), rn(w), rm(w));
    let mut b;
    if s && rd == 31 {
        b = B::new(if sub { I::CMP } else { I::CMN });
        b.gpr(rn, sf, false, Access::READ)
            .gpr(rm, sf, false, Access::READ);
    } else if sub && rn == 31 {
        b = B::new(if s { I::NEGS } else { I::NEG });
        b.gpr(rd, sf, false, Access::WRITE)
            .gpr(rm, sf, false, Access::READ);
    } else {
        let id = match (sub, s) {
            (false, false) => I::ADD,
            (false, true) => I::ADDS,
            (true, false) => I::SUB,
            (true, true) => I::SUBS,
        };
        b = B::new(id);
        b.gpr(rd, sf, false, Access::WRITE)
            .gpr(rn, sf, false, Access::READ)
            .gpr(rm, sf, false, Access::READ);
    }
    shift_operand(&mut b, kind, imm6);
    if s {
        f.set_flags(&mut b);
    }
    Some(b)
}

fn addsub_extended(w: u32, f: &mut Flags) -> Option<B> {
    let sf = bit(w, 31);
    let (sub, s) = (bit(w, 30), bit(w, 29));
    let option = bits(w, 13, 3);
    let imm3 = bits(w, 10, 3);
    if bits(w, 22, 2) != 0 || imm3 > 4 {
        return None;
    }
    let (rd, rn, rm) = (rd(w), rn(w), rm(w));
    let rm_wide = sf && option & 3 == 3;
    let mut b;
    if s && rd == 31 {
        b = B::new(if sub { I::CMP } else { I::CMN });
        b.gpr(rn, sf, true, Access::READ);
    } else {
        let id = match (sub, s) {
            (false, false) => I::ADD,
            (false, true) => I::ADDS,
            (true, false) => I::SUB,
            (true, true) => I::SUBS,
        };
        b = B::new(id);
        b.gpr(rd, sf, !s, Access::WRITE)
            .gpr(rn, sf, true, Access::READ);
    }
    b.gpr(rm, rm_wide, false, Access::READ);
    let uses_sp = (rd == 31 && !s) || rn == 31;
    let plain = option == if sf { 3 } else { 2 };
    if uses_sp && plain {
        if imm3 != 0 {
            b.shifted(Arm64Shift::Lsl(imm3));
        }
    } else {
        let ext = Ext::from_option(option);
        if let Some(op) = b.ops.last_mut() {
            op.ext = ext;
            if imm3 != 0 {
                op.shift = Some(Arm64Shift::Lsl(imm3));
            }
        }
        if imm3 != 0 {
            b.append_text(&format!(", {} #{}", ext.mnemonic(), imm3));
        } else {
            b.append_text(&format!(", {}", ext.mnemonic()));
        }
    }
    if s {
        f.set_flags(&mut b);
    }
    Some(b)
}

fn carry(w: u32, f: &mut Flags) -> Option<B> {
    if bits(w, 10, 6) != 0 {
        return None;
    }
    let sf = bit(w, 31);
    let (sub, s) = (bit(w, 30), bit(w, 29));
    let (rd, rn, rm) = (rd(w), rn(w), rm(w));
    let mut b;
    if sub && rn == 31 {
        b = B::new(if s { I::NGCS } else { I::NGC });
        b.gpr(rd, sf, false, Access::WRITE)
            .gpr(rm, sf, false, Access::READ);
    } else {
        let id = match (sub, s) {
            (false, false) => I::ADC,
            (false, true) => I::ADCS,
            (true, false) => I::SBC,
            (true, true) => I::SBCS,
        };
        b = B::new(id);
        b.gpr(rd, sf, false, Access::WRITE)
            .gpr(rn, sf, false, Access::READ)
            .gpr(rm, sf, false, Access::READ);
    }
    b.reads(&[R::NZCV]);
    if s {
        f.set_flags(&mut b);
    }
    Some(b)
}

fn cond_compare(w: u32, f: &mut Flags) -> Option<B> {
    if !bit(w, 29) || bit(w, 10) || bit(w, 4) {
        return None;
    }
    let sf = bit(w, 31);
    let cc = Cc::from_bits(bits(w, 12, 4));
    let mut b = B::new(if bit(w, 30) { I::CCMP } else { I::CCMN });
    b.gpr(rn(w), sf, false, Access::READ);
    if bit(w, 11) {
        b.uimm(bits(w, 16, 5) as u64);
    } else {
        b.gpr(rm(w), sf, false, Access::READ);
    }
    b.uimm(bits(w, 0, 4) as u64).cond(cc);
    f.use_cond(&mut b, cc);
    f.set_flags(&mut b);
    Some(b)
}

fn cond_select(w: u32, f: &mut Flags) -> Option<B> {
    if bit(w, 29) || bit(w, 11) {
        return None;
    }
    let sf = bit(w, 31);
    let (rd, rn, rm) = (rd(w), rn(w), rm(w));
    let cc = Cc::from_bits(bits(w, 12, 4));
    let aliasable = cc != Cc::AL && cc != Cc::NV && rn == rm;
    let (id, alias) = match (bit(w, 30), bit(w, 10)) {
        (false, false) => (I::CSEL, None),
        (false, true) if aliasable && rn == 31 => (I::CSINC, Some(I::CSET)),
        (false, true) if aliasable => (I::CSINC, Some(I::CINC)),
        (false, true) => (I::CSINC, None),
        (true, false) if aliasable && rn == 31 => (I::CSINV, Some(I::CSETM)),
        (true, false) if aliasable => (I::CSINV, Some(I::CINV)),
        (true, false) => (I::CSINV, None),
        (true, true) if aliasable => (I::CSNEG, Some(I::CNEG)),
        (true, true) => (I::CSNEG, None),
    };
    let mut b;
    let used = match alias {
        Some(alias) => {
            b = B::new(alias);
            b.gpr(rd, sf, false, Access::WRITE);
            if !matches!(alias, I::CSET | I::CSETM) {
                b.gpr(rn, sf, false, Access::READ);
            }
            cc.invert()
        }
        None => {
            b = B::new(id);
            b.gpr(rd, sf, false, Access::WRITE)
                .gpr(rn, sf, false, Access::READ)
                .gpr(rm, sf, false, Access::READ);
            cc
        }
    };
    b.cond(used);
    f.use_cond(&mut b, used);
    Some(b)
}

fn dp2(w: u32) -> Option<B> {
    if bit(w, 29) {
        return None;
    }
    let sf = bit(w, 31);
    let (rd, rn, rm) = (rd(w), rn(w), rm(w));
    let opcode = bits(w, 10, 6);
    let b = match opcode {
        2 | 3 | 8..=11 => {
            let id = match opcode {
                2 => I::UDIV,
                3 => I::SDIV,
                8 => I::LSL,
                9 => I::LSR,
                10 => I::ASR,
                _ => I::ROR,
            };
            let mut b = B::new(id);
            b.gpr(rd, sf, false, Access::WRITE)
                .gpr(rn, sf, false, Access::READ)
                .gpr(rm, sf, false, Access::READ);
            b
        }
        16..=23 => {
            let size = opcode & 3;
            if (size == 3) != sf {
                return None;
            }
            let id = [
                I::CRC32B, I::CRC32H, I::CRC32W, I::CRC32X,
                I::CRC32CB, I::CRC32CH, I::CRC32CW, I::CRC32CX,
            ][(opcode - 16) as usize];
            let mut b = B::new(id);
            b.gpr(rd, false, false, Access::WRITE)
                .gpr(rn, false, false, Access::READ)
                .gpr(rm, size == 3, false, Access::READ)
                .group(G::CRC);
            b
        }
        _ => return None,
    };
    Some(b)
}

fn dp1(w: u32) -> Option<B> {
    if bit(w, 29) || bits(w, 16, 5) != 0 {
        return None;
    }
    let sf = bit(w, 31);
    let id = match (bits(w, 10, 6), sf) {
        (0, _) => I::RBIT,
        (1, _) => I::REV16,
        (2, false) => I::REV,
        (2, true) => I::REV32,
        (3, true) => I::REV,
        (4, _) => I::CLZ,
        (5, _) => I::CLS,
        _ => return None,
    };
    let mut b = B::new(id);
    b.gpr(rd(w), sf, false, Access::WRITE)
        .gpr(rn(w), sf, false, Access::READ);
    Some(b)
}

fn dp3(w: u32) -> Option<B> {
    if bits(w, 29, 2) != 0 {
        return None;
    }
    let sf = bit(w, 31);
    let (rd, rn, rm, ra) = (rd(w), rn(w), rm(w), bits(w, 10, 5));
    let o0 = bit(w, 15);
    let no_acc = ra == 31;
    let (id, long) = match (bits(w, 21, 3), o0) {
        (0, false) => (if no_acc { I::MUL } else { I::MADD }, false),
        (0, true) => (if no_acc { I::MNEG } else { I::MSUB }, false),
        (1, false) if sf => (if no_acc { I::SMULL } else { I::SMADDL }, true),
        (1, true) if sf => (if no_acc { I::SMNEGL } else { I::SMSUBL }, true),
        (5, false) if sf => (if no_acc { I::UMULL } else { I::UMADDL }, true),
        (5, true) if sf => (if no_acc { I::UMNEGL } else { I::UMSUBL }, true),
        (2, false) if sf && no_acc => (I::SMULH, false),
        (6, false) if sf && no_acc => (I::UMULH, false),
        _ => return None,
    };
    let src_wide = sf && !long;
    let mut b = B::new(id);
    b.gpr(rd, sf, false, Access::WRITE)
        .gpr(rn, src_wide, false, Access::READ)
        .gpr(rm, src_wide, false, Access::READ);
    if !no_acc {
        b.gpr(ra, sf, false, Access::READ);
    }
    Some(b)
}

/// VFPExpandImm of an 8-bit floating-point immediate.
pub(super) fn expand_fp_imm(imm8: u32) -> f64 {
    let sign = if imm8 & 0x80 != 0 { -1.0 } else { 1.0 };
    let exp = (((imm8 >> 4) & 7) ^ 4) as i32 - 3;
    let frac = (16 + (imm8 & 15)) as f64 / 16.0;
    sign * frac * 2f64.powi(exp)
}

fn fp(w: u32, f: &mut Flags) -> Option<B> {
    if bit(w, 31) || bit(w, 29) || bit(w, 30) {
        return None;
    }
    let width = match bits(w, 22, 2) {
        0 => 4,
        1 => 8,
        _ => return None,
    };
    let (rd, rn, rm) = (rd(w), rn(w), rm(w));
    let mut b = match bits(w, 24, 5) {
        0b11110 if bit(w, 21) => {
            if bits(w, 10, 6) == 0 {
                fp_int(w, width)?
            } else if bits(w, 10, 5) == 0b10000 {
                fp_dp1(w, width)?
            } else if bits(w, 10, 4) == 0b1000 {
                if bits(w, 14, 2) != 0 || bits(w, 0, 3) != 0 {
                    return None;
                }
                let mut b = B::new(if bit(w, 4) { I::FCMPE } else { I::FCMP });
                b.fpr(rn, width, Access::READ);
                if bit(w, 3) {
                    if rm != 0 {
                        return None;
                    }
                    b.push(Arm64Operand::new(K::Fp(0.0), Access::empty()), "#0.0");
                } else {
                    b.fpr(rm, width, Access::READ);
                }
                f.set_flags(&mut b);
                b
            } else if bits(w, 10, 3) == 0b100 {
                if bits(w, 5, 5) != 0 {
                    return None;
                }
                let value = expand_fp_imm(bits(w, 13, 8));
                let mut b = B::new(I::FMOV);
                b.fpr(rd, width, Access::WRITE).push(
                    Arm64Operand::new(K::Fp(value), Access::empty()),
                    format!("#{:.8}", value),
                );
                b
            } else {
                match bits(w, 10, 2) {
                    0b01 => {
                        let cc = Cc::from_bits(bits(w, 12, 4));
                        let mut b = B::new(if bit(w, 4) { I::FCCMPE } else { I::FCCMP });
                        b.fpr(rn, width, Access::READ)
                            .fpr(rm, width, Access::READ)
                            .uimm(bits(w, 0, 4) as u64)
                            .cond(cc);
                        f.use_cond(&mut b, cc);
                        f.set_flags(&mut b);
                        b
                    }
                    0b10 => {
                        let id = match bits(w, 12, 4) {
                            0 => I::FMUL,
                            1 => I::FDIV,
                            2 => I::FADD,
                            3 => I::FSUB,
                            4 => I::FMAX,
                            5 => I::FMIN,
                            6 => I::FMAXNM,
                            7 => I::FMINNM,
                            8 => I::FNMUL,
                            _ => return None,
                        };
                        let mut b = B::new(id);
                        b.fpr(rd, width, Access::WRITE)
                            .fpr(rn, width, Access::READ)
                            .fpr(rm, width, Access::READ);
                        b
                    }
                    0b11 => {
                        let cc = Cc::from_bits(bits(w, 12, 4));
                        let mut b = B::new(I::FCSEL);
                        b.fpr(rd, width, Access::WRITE)
                            .fpr(rn, width, Access::READ)
                            .fpr(rm, width, Access::READ)
                            .cond(cc);
                        f.use_cond(&mut b, cc);
                        b
                    }
                    _ => return None,
                }
            }
        }
        0b11111 => {
            let id = match (bit(w, 21), bit(w, 15)) {
                (false, false) => I::FMADD,
                (false, true) => I::FMSUB,
                (true, false) => I::FNMADD,
                (true, true) => I::FNMSUB,
            };
            let mut b = B::new(id);
            b.fpr(rd, width, Access::WRITE)
                .fpr(rn, width, Access::READ)
                .fpr(rm, width, Access::READ)
                .fpr(bits(w, 10, 5), width, Access::READ);
            b
        }
        _ => return None,
    };
    b.group(G::FPARMV8);
    Some(b)
}

fn fp_int(w: u32, width: u32) -> Option<B> {
    let sf = bit(w, 31);
    let (rd, rn) = (rd(w), rn(w));
    let (rmode, opcode) = (bits(w, 19, 2), bits(w, 16, 3));
    let matched = (sf && width == 8) || (!sf && width == 4);
    let mut b;
    match (rmode, opcode) {
        (0, 6) if matched => {
            b = B::new(I::FMOV);
            b.gpr(rd, sf, false, Access::WRITE)
                .fpr(rn, width, Access::READ);
        }
        (0, 7) if matched => {
            b = B::new(I::FMOV);
            b.fpr(rd, width, Access::WRITE)
                .gpr(rn, sf, false, Access::READ);
        }
        (0, 2) | (0, 3) => {
            b = B::new(if opcode == 2 { I::SCVTF } else { I::UCVTF });
            b.fpr(rd, width, Access::WRITE)
                .gpr(rn, sf, false, Access::READ);
        }
        _ => {
            let id = match (rmode, opcode) {
                (0, 0) => I::FCVTNS,
                (0, 1) => I::FCVTNU,
                (0, 4) => I::FCVTAS,
                (0, 5) => I::FCVTAU,
                (1, 0) => I::FCVTPS,
                (1, 1) => I::FCVTPU,
                (2, 0) => I::FCVTMS,
                (2, 1) => I::FCVTMU,
                (3, 0) => I::FCVTZS,
                (3, 1) => I::FCVTZU,
                _ => return None,
            };
            b = B::new(id);
            b.gpr(rd, sf, false, Access::WRITE)
                .fpr(rn, width, Access::READ);
        }
    }
    Some(b)
}

fn fp_dp1(w: u32, width: u32) -> Option<B> {
    let (rd, rn) = (rd(w), rn(w));
    let opcode = bits(w, 15, 6);
    let (id, dst_width) = match opcode {
        0 => (I::FMOV, width),
        1 => (I::FABS, width),
        2 => (I::FNEG, width),
        3 => (I::FSQRT, width),
        4 if width != 4 => (I::FCVT, 4),
        5 if width != 8 => (I::FCVT, 8),
        7 => (I::FCVT, 2),
        8 => (I::FRINTN, width),
        9 => (I::FRINTP, width),
        10 => (I::FRINTM, width),
        11 => (I::FRINTZ, width),
        12 => (I::FRINTA, width),
        14 => (I::FRINTX, width),
        15 => (I::FRINTI, width),
        _ => return None,
    };
    let mut b = B::new(id);
    b.fpr(rd, dst_width, Access::WRITE)
        .fpr(rn, width, Access::READ);
    Some(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(word: u32) -> Option<String> {
        let (b, _) = decode(word, 0x1000)?;
        let ops = b.op_str();
        Some(if ops.is_empty() {
            b.mnemonic
        } else {
            format!("{} {}", b.mnemonic, ops)
        })
    }

    #[rstest]
    #[case(0xd503_201f, "nop")]
    #[case(0xd65f_03c0, "ret")]
    #[case(0x9100_03fd, "mov x29, sp")]
    #[case(0xa8c1_7bfd, "ldp x29, x30, [sp], #0x10")]
    #[case(0xf940_0020, "ldr x0, [x1]")]
    #[case(0xf940_0420, "ldr x0, [x1, #8]")]
    #[case(0xb900_0be0, "str w0, [sp, #8]")]
    #[case(0xf861_7820, "ldr x0, [x1, x1, lsl #3]")]
    #[case(0x3840_1420, "ldrb w0, [x1], #1")]
    #[case(0xf81f_83e0, "stur x0, [sp, #-8]")]
    #[case(0x9400_0004, "bl #0x1010")]
    #[case(0x17ff_ffff, "b #0xffc")]
    #[case(0xb400_0040, "cbz x0, #0x1008")]
    #[case(0x3718_0040, "tbnz w0, #3, #0x1008")]
    #[case(0xd280_0540, "mov x0, #0x2a")]
    #[case(0x9280_0000, "mov x0, #-1")]
    #[case(0xf2a0_0020, "movk x0, #1, lsl #16")]
    #[case(0x9240_1c00, "and x0, x0, #0xff")]
    #[case(0xd37d_f000, "lsl x0, x0, #3")]
    #[case(0x9343_fc20, "asr x0, x1, #3")]
    #[case(0x5310_5c20, "ubfx w0, w1, #0x10, #8")]
    #[case(0x1a9f_17e0, "cset w0, eq")]
    #[case(0x8b02_0c20, "add x0, x1, x2, lsl #3")]
    #[case(0xcb01_03e0, "neg x0, x1")]
    #[case(0x9b02_7c20, "mul x0, x1, x2")]
    #[case(0x9ac2_0c20, "sdiv x0, x1, x2")]
    #[case(0xd53b_d040, "mrs x0, tpidr_el0")]
    #[case(0xd503_3bbf, "dmb ish")]
    #[case(0xd400_0001, "svc #0")]
    #[case(0x9000_0000, "adrp x0, #0x1000")]
    #[case(0x1e22_2820, "fadd s0, s1, s2")]
    #[case(0x1e60_4020, "fmov d0, d1")]
    #[case(0x1e2e_1000, "fmov s0, #1.00000000")]
    #[case(0x8b22_4020, "add x0, x1, w2, uxtw")]
    #[case(0x8b22_63e0, "add x0, sp, x2")]
    #[case(0xc85f_7c20, "ldxr x0, [x1]")]
    fn test_a64_text(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word).as_deref(), Some(expected));
    }

    #[test]
    fn test_bitmask_immediates() {
        assert_eq!(decode_bit_masks(true, 0b000111, 0, true), Some(0xff));
        assert_eq!(decode_bit_masks(false, 0b111100, 0, false), Some(0x5555_5555));
        assert_eq!(decode_bit_masks(true, 0b111111, 0, true), None);
        assert_eq!(decode_bit_masks(false, 0b111100, 1, true), Some(0xaaaa_aaaa_aaaa_aaaa));
    }

    #[test]
    fn test_fp_immediates() {
        assert_eq!(expand_fp_imm(0x70), 1.0);
        assert_eq!(expand_fp_imm(0x00), 2.0);
        assert_eq!(expand_fp_imm(0x60), 0.5);
        assert_eq!(expand_fp_imm(0xf0), -1.0);
    }

    #[test]
    fn test_unknown_sysreg_uses_generic_name() {
        assert_eq!(sysreg_name(0xde82), "tpidr_el0");
        assert_eq!(sysreg_name((3 << 14) | (1 << 11) | (15 << 7) | (2 << 3) | 1), "s3_1_c15_c2_1");
    }

    #[rstest]
    #[case(0x4ea2_8420, "add v0.4s, v1.4s, v2.4s")]
    #[case(0x4c40_7000, "ld1 {v0.16b}, [x0]")]
    #[case(0x4c9f_a820, "st1 {v0.4s, v1.4s}, [x1], #0x20")]
    fn test_vector_forms_reach_simd_decoder(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word).as_deref(), Some(expected));
    }
}
