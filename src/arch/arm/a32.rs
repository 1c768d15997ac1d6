//! A32 instruction word decoding, plus the VFP and coprocessor space
//! shared with Thumb-2.

use super::asm::{fp_text, pc_write, Asm, Ctx, Index};
use super::{
    ArmBarrier, ArmCc, ArmGroup as G, ArmInsn as I, ArmOpKind as K, ArmOperand, ArmReg as R,
    ArmShift,
};
use crate::arch::{bit, bits, sign_extend};
use crate::insn::Access;
use crate::table::IdTable;
use crate::Address;

pub(super) fn decode(w: u32, address: Address, cx: &Ctx) -> Option<Asm> {
    let pc = address.wrapping_add(8);
    let Some(cc) = ArmCc::from_bits(bits(w, 28, 4)) else {
        let mut a = unconditional(w, pc, cx)?;
        a.group(G::ARM);
        return Some(a);
    };
    let mut a = match bits(w, 25, 3) {
        0b000 => {
            if bit(w, 4) && bit(w, 7) {
                extra(w, cx)?
            } else if bits(w, 23, 2) == 0b10 && !bit(w, 20) {
                misc(w, cx)?
            } else {
                data_processing(w, cx)?
            }
        }
        0b001 => {
            if bits(w, 23, 2) == 0b10 && !bit(w, 20) {
                imm_misc(w, cx)?
            } else {
                data_processing(w, cx)?
            }
        }
        0b010 => load_store(w, cx)?,
        0b011 if bit(w, 4) => media(w, cx)?,
        0b011 => load_store(w, cx)?,
        0b100 => block(w, cx)?,
        0b101 => branch(w, pc, cx),
        _ => coproc(w, cx, false)?,
    };
    a.cond(cc);
    a.group(G::ARM);
    Some(a)
}

/// Rotated 8-bit immediate of the data-processing forms.
fn arm_expand_imm(w: u32) -> u32 {
    bits(w, 0, 8).rotate_right(bits(w, 8, 4) * 2)
}

/// Mnemonic id of the 4-bit data-processing opcode.
pub(super) fn dp_opcode(op: u32) -> I {
    match op & 15 {
        0 => I::AND,
        1 => I::EOR,
        2 => I::SUB,
        3 => I::RSB,
        4 => I::ADD,
        5 => I::ADC,
        6 => I::SBC,
        7 => I::RSC,
        8 => I::TST,
        9 => I::TEQ,
        10 => I::CMP,
        11 => I::CMN,
        12 => I::ORR,
        13 => I::MOV,
        14 => I::BIC,
        _ => I::MVN,
    }
}

fn data_processing(w: u32, cx: &Ctx) -> Option<Asm> {
    let id = dp_opcode(bits(w, 21, 4));
    let s = bit(w, 20);
    let rn = bits(w, 16, 4);
    let rd = bits(w, 12, 4);
    let compare = matches!(id, I::TST | I::TEQ | I::CMP | I::CMN);
    let unary = matches!(id, I::MOV | I::MVN);
    if compare && !s {
        return None;
    }

    let imm = bit(w, 25);
    let rm = bits(w, 0, 4);
    let shift = if imm {
        None
    } else if bit(w, 4) {
        Some(ArmShift::from_reg(bits(w, 5, 2), R::gpr(bits(w, 8, 4))))
    } else {
        ArmShift::from_imm(bits(w, 5, 2), bits(w, 7, 5))
    };

    // mov with a shift prints as the shift itself
    if id == I::MOV && !imm {
        if let Some(sh) = shift {
            let shift_id = match sh {
                ArmShift::Lsl(_) | ArmShift::LslReg(_) => I::LSL,
                ArmShift::Lsr(_) | ArmShift::LsrReg(_) => I::LSR,
                ArmShift::Asr(_) | ArmShift::AsrReg(_) => I::ASR,
                ArmShift::Ror(_) | ArmShift::RorReg(_) => I::ROR,
                ArmShift::Rrx => I::RRX,
            };
            let mut a = Asm::new(shift_id, cx);
            if s {
                a.set_flags();
            }
            a.gpr(rd, Access::WRITE).gpr(rm, Access::READ);
            match sh {
                ArmShift::Rrx => {}
                ArmShift::Lsl(n) | ArmShift::Lsr(n) | ArmShift::Asr(n) | ArmShift::Ror(n) => {
                    a.uimm(n);
                }
                _ => {
                    if let Some(r) = sh.reg() {
                        a.reg(r, Access::READ);
                    }
                }
            }
            if rd == 15 {
                pc_write(&mut a, false);
            }
            return Some(a);
        }
    }

    let mut a = Asm::new(id, cx);
    if compare {
        a.writes_flags();
    } else {
        if s {
            a.set_flags();
        }
        a.gpr(rd, Access::WRITE);
    }
    if !unary {
        a.gpr(rn, Access::READ);
    }
    if imm {
        a.uimm(arm_expand_imm(w));
    } else {
        a.shifted(rm, shift);
    }
    if matches!(id, I::ADC | I::SBC | I::RSC) {
        a.b.reads(&[R::CPSR]);
    }
    if rd == 15 && !compare {
        pc_write(&mut a, id == I::MOV && !imm && rm == 14 && shift.is_none());
    }
    Some(a)
}

/// Multiplies, exclusives and the halfword / doubleword transfers.
fn extra(w: u32, cx: &Ctx) -> Option<Asm> {
    let op2 = bits(w, 5, 2);
    if op2 == 0 {
        return if bit(w, 24) {
            exclusive(w, cx)
        } else {
            multiply(w, cx)
        };
    }
    let (p, u, i, wb, l) = (bit(w, 24), bit(w, 23), bit(w, 22), bit(w, 21), bit(w, 20));
    if !p && wb {
        return None;
    }
    let id = match (op2, l) {
        (1, false) => I::STRH,
        (1, true) => I::LDRH,
        (2, false) => I::LDRD,
        (2, true) => I::LDRSB,
        (3, false) => I::STRD,
        _ => I::LDRSH,
    };
    let rn = R::gpr(bits(w, 16, 4));
    let rt = bits(w, 12, 4);
    let store = matches!(id, I::STRH | I::STRD);
    let (rt_access, mem_access) = if store {
        (Access::READ, Access::WRITE)
    } else {
        (Access::WRITE, Access::READ)
    };

    let mut a = Asm::new(id, cx);
    a.gpr(rt, rt_access);
    if matches!(id, I::LDRD | I::STRD) {
        if rt % 2 == 1 || rt == 14 {
            return None;
        }
        a.gpr(rt + 1, rt_access);
    }
    let index = Index::from_pw(p, wb);
    if i {
        let imm = (bits(w, 8, 4) << 4) | bits(w, 0, 4);
        a.mem_imm(rn, u, imm, index, mem_access);
    } else {
        a.mem_reg(rn, R::gpr(bits(w, 0, 4)), u, None, index, mem_access);
    }
    Some(a)
}

fn multiply(w: u32, cx: &Ctx) -> Option<Asm> {
    let s = bit(w, 20);
    let (hi, lo, rm, rn) = (bits(w, 16, 4), bits(w, 12, 4), bits(w, 8, 4), bits(w, 0, 4));
    let id = match bits(w, 21, 3) {
        0b000 => I::MUL,
        0b001 => I::MLA,
        0b011 if !s => I::MLS,
        0b100 => I::UMULL,
        0b101 => I::UMLAL,
        0b110 => I::SMULL,
        0b111 => I::SMLAL,
        _ => return None,
    };
    let mut a = Asm::new(id, cx);
    if s {
        a.set_flags();
    }
    a.group(G::MULOPS);
    match id {
        I::MUL => {
            a.gpr(hi, Access::WRITE).gpr(rn, Access::READ).gpr(rm, Access::READ);
        }
        I::MLA | I::MLS => {
            a.gpr(hi, Access::WRITE)
                .gpr(rn, Access::READ)
                .gpr(rm, Access::READ)
                .gpr(lo, Access::READ);
        }
        _ => {
            let acc = if matches!(id, I::UMLAL | I::SMLAL) {
                Access::READ_WRITE
            } else {
                Access::WRITE
            };
            a.gpr(lo, acc).gpr(hi, acc).gpr(rn, Access::READ).gpr(rm, Access::READ);
        }
    }
    Some(a)
}

fn exclusive(w: u32, cx: &Ctx) -> Option<Asm> {
    let rn = R::gpr(bits(w, 16, 4));
    let rd = bits(w, 12, 4);
    let rt = bits(w, 0, 4);
    let id = match bits(w, 20, 4) {
        0b1000 => I::STREX,
        0b1001 => I::LDREX,
        0b1100 => I::STREXB,
        0b1101 => I::LDREXB,
        0b1110 => I::STREXH,
        0b1111 => I::LDREXH,
        _ => return None,
    };
    let mut a = Asm::new(id, cx);
    if bit(w, 20) {
        a.gpr(rd, Access::WRITE).mem_imm(rn, true, 0, Index::Offset, Access::READ);
    } else {
        a.gpr(rd, Access::WRITE)
            .gpr(rt, Access::READ)
            .mem_imm(rn, true, 0, Index::Offset, Access::WRITE);
    }
    Some(a)
}

/// Special register operand of `msr`/`mrs`, A-profile form.
pub(super) fn psr_field(a: &mut Asm, spsr: bool, mask: u32) {
    let text = if !spsr && matches!(mask, 8 | 4 | 12) {
        match mask {
            8 => "apsr_nzcvq".to_string(),
            4 => "apsr_g".to_string(),
            _ => "apsr_nzcvqg".to_string(),
        }
    } else {
        let mut t = String::from(if spsr { "spsr_" } else { "cpsr_" });
        for (m, c) in [(8, 'f'), (4, 's'), (2, 'x'), (1, 'c')] {
            if mask & m != 0 {
                t.push(c);
            }
        }
        t
    };
    a.b.push(
        ArmOperand::new(K::SysReg(mask | if spsr { 0x10 } else { 0 }), Access::WRITE),
        text,
    );
    a.b.writes(&[if spsr { R::SPSR } else { R::CPSR }]);
}

fn misc(w: u32, cx: &Ctx) -> Option<Asm> {
    if bit(w, 7) {
        return None;
    }
    let op = bits(w, 21, 2);
    let a = match (bits(w, 4, 3), op) {
        (0b000, 0b00) | (0b000, 0b10) => {
            let spsr = bit(w, 22);
            let mut a = Asm::new(I::MRS, cx);
            a.gpr(bits(w, 12, 4), Access::WRITE);
            let src = if spsr { R::SPSR } else { R::APSR };
            a.reg(src, Access::READ);
            a
        }
        (0b000, 0b01) | (0b000, 0b11) => {
            let mut a = Asm::new(I::MSR, cx);
            psr_field(&mut a, bit(w, 22), bits(w, 16, 4));
            a.gpr(bits(w, 0, 4), Access::READ);
            a
        }
        (0b001, 0b01) => {
            let rm = bits(w, 0, 4);
            let mut a = Asm::new(I::BX, cx);
            a.gpr(rm, Access::READ);
            a.group(G::JUMP).group(G::V4T);
            if rm == 14 {
                a.group(G::RET);
            }
            a
        }
        (0b001, 0b11) => {
            let mut a = Asm::new(I::CLZ, cx);
            a.gpr(bits(w, 12, 4), Access::WRITE).gpr(bits(w, 0, 4), Access::READ);
            a
        }
        (0b011, 0b01) => {
            let mut a = Asm::new(I::BLX, cx);
            a.gpr(bits(w, 0, 4), Access::READ);
            a.b.writes(&[R::LR]);
            a.group(G::CALL).group(G::V5T);
            a
        }
        (0b111, 0b01) => {
            let mut a = Asm::new(I::BKPT, cx);
            a.uimm((bits(w, 8, 12) << 4) | bits(w, 0, 4));
            a.group(G::INT);
            a
        }
        _ => return None,
    };
    Some(a)
}

/// `movw`, `movt`, `msr #imm` and the hints.
fn imm_misc(w: u32, cx: &Ctx) -> Option<Asm> {
    if !bit(w, 21) {
        let id = if bit(w, 22) { I::MOVT } else { I::MOVW };
        let imm16 = (bits(w, 16, 4) << 12) | bits(w, 0, 12);
        let access = if id == I::MOVT {
            Access::READ_WRITE
        } else {
            Access::WRITE
        };
        let mut a = Asm::new(id, cx);
        a.gpr(bits(w, 12, 4), access).uimm(imm16).group(G::V6T2);
        return Some(a);
    }
    let mask = bits(w, 16, 4);
    if mask == 0 && !bit(w, 22) {
        let id = hint(bits(w, 0, 8))?;
        return Some(Asm::new(id, cx));
    }
    let mut a = Asm::new(I::MSR, cx);
    psr_field(&mut a, bit(w, 22), mask);
    a.uimm(arm_expand_imm(w));
    Some(a)
}

pub(super) fn hint(op: u32) -> Option<I> {
    Some(match op {
        0 => I::NOP,
        1 => I::YIELD,
        2 => I::WFE,
        3 => I::WFI,
        4 => I::SEV,
        _ => return None,
    })
}

fn load_store(w: u32, cx: &Ctx) -> Option<Asm> {
    let (p, u, byte, wb, l) = (bit(w, 24), bit(w, 23), bit(w, 22), bit(w, 21), bit(w, 20));
    let rn = bits(w, 16, 4);
    let rt = bits(w, 12, 4);
    let register = bit(w, 25);
    let usermode = !p && wb;
    let id = match (l, byte, usermode) {
        (true, false, false) => I::LDR,
        (true, true, false) => I::LDRB,
        (false, false, false) => I::STR,
        (false, true, false) => I::STRB,
        (true, false, true) => I::LDRT,
        (true, true, true) => I::LDRBT,
        (false, false, true) => I::STRT,
        (false, true, true) => I::STRBT,
    };
    let imm12 = bits(w, 0, 12);

    // single-register push / pop
    if !register && rn == 13 && !byte && imm12 == 4 {
        if l && !p && u && !wb {
            let mut a = Asm::new(I::POP, cx);
            a.reglist(1 << rt, Access::WRITE);
            a.writeback(R::SP);
            if rt == 15 {
                pc_write(&mut a, true);
            }
            return Some(a);
        }
        if !l && p && !u && wb {
            let mut a = Asm::new(I::PUSH, cx);
            a.reglist(1 << rt, Access::READ);
            a.writeback(R::SP);
            return Some(a);
        }
    }

    let (rt_access, mem_access) = if l {
        (Access::WRITE, Access::READ)
    } else {
        (Access::READ, Access::WRITE)
    };
    let mut a = Asm::new(id, cx);
    a.usermode = usermode;
    a.gpr(rt, rt_access);
    let index = Index::from_pw(p, wb);
    if register {
        let shift = ArmShift::from_imm(bits(w, 5, 2), bits(w, 7, 5));
        a.mem_reg(R::gpr(rn), R::gpr(bits(w, 0, 4)), u, shift, index, mem_access);
    } else {
        a.mem_imm(R::gpr(rn), u, imm12, index, mem_access);
    }
    if l && rt == 15 {
        pc_write(&mut a, false);
    }
    Some(a)
}

fn media(w: u32, cx: &Ctx) -> Option<Asm> {
    let op = bits(w, 20, 8);
    let op2 = bits(w, 4, 4);
    let rd = bits(w, 12, 4);
    let rm = bits(w, 0, 4);

    let extend = match (op, op2) {
        (0x6a, 0x7) => Some(I::SXTB),
        (0x6b, 0x7) => Some(I::SXTH),
        (0x6e, 0x7) => Some(I::UXTB),
        (0x6f, 0x7) => Some(I::UXTH),
        _ => None,
    };
    if let Some(id) = extend {
        if bits(w, 16, 4) != 15 {
            return None;
        }
        let mut a = Asm::new(id, cx);
        a.gpr(rd, Access::WRITE);
        let rot = bits(w, 10, 2) * 8;
        a.shifted(rm, (rot != 0).then_some(ArmShift::Ror(rot)));
        a.group(G::V6);
        return Some(a);
    }

    let reverse = match (op, op2) {
        (0x6b, 0x3) => Some(I::REV),
        (0x6b, 0xb) => Some(I::REV16),
        (0x6f, 0x3) => Some(I::RBIT),
        (0x6f, 0xb) => Some(I::REVSH),
        _ => None,
    };
    if let Some(id) = reverse {
        let mut a = Asm::new(id, cx);
        a.gpr(rd, Access::WRITE).gpr(rm, Access::READ).group(G::V6);
        return Some(a);
    }

    if matches!(op, 0x71 | 0x73) && op2 == 1 && bits(w, 12, 4) == 15 {
        let id = if op == 0x71 { I::SDIV } else { I::UDIV };
        let mut a = Asm::new(id, cx);
        a.gpr(bits(w, 16, 4), Access::WRITE)
            .gpr(rm, Access::READ)
            .gpr(bits(w, 8, 4), Access::READ)
            .group(G::DIVIDE);
        return Some(a);
    }

    let lsb = bits(w, 7, 5);
    let field = bits(w, 16, 5);
    match (bits(w, 21, 7), bits(w, 4, 3)) {
        (0b011_1101, 0b101) | (0b011_1111, 0b101) => {
            let id = if bit(w, 22) { I::UBFX } else { I::SBFX };
            if lsb + field + 1 > 32 {
                return None;
            }
            let mut a = Asm::new(id, cx);
            a.gpr(rd, Access::WRITE)
                .gpr(rm, Access::READ)
                .uimm(lsb)
                .uimm(field + 1)
                .group(G::V6T2);
            Some(a)
        }
        (0b011_1110, 0b001) => {
            if field < lsb {
                return None;
            }
            let width = field - lsb + 1;
            let mut a = if rm == 15 {
                let mut a = Asm::new(I::BFC, cx);
                a.gpr(rd, Access::READ_WRITE);
                a
            } else {
                let mut a = Asm::new(I::BFI, cx);
                a.gpr(rd, Access::READ_WRITE).gpr(rm, Access::READ);
                a
            };
            a.uimm(lsb).uimm(width).group(G::V6T2);
            Some(a)
        }
        (0b011_1111, 0b111) if bits(w, 28, 4) == 14 => {
            let mut a = Asm::new(I::UDF, cx);
            a.uimm((bits(w, 8, 12) << 4) | bits(w, 0, 4));
            Some(a)
        }
        _ => None,
    }
}

fn block(w: u32, cx: &Ctx) -> Option<Asm> {
    let (p, u, user, wb, l) = (bit(w, 24), bit(w, 23), bit(w, 22), bit(w, 21), bit(w, 20));
    let rn = bits(w, 16, 4);
    let list = bits(w, 0, 16);
    if user || list == 0 {
        return None;
    }
    let id = match (l, p, u) {
        (true, false, true) => I::LDM,
        (true, false, false) => I::LDMDA,
        (true, true, false) => I::LDMDB,
        (true, true, true) => I::LDMIB,
        (false, false, true) => I::STM,
        (false, false, false) => I::STMDA,
        (false, true, false) => I::STMDB,
        (false, true, true) => I::STMIB,
    };
    let access = if l { Access::WRITE } else { Access::READ };
    let multi = list.count_ones() > 1;
    let mut a = if rn == 13 && wb && multi && id == I::LDM {
        Asm::new(I::POP, cx)
    } else if rn == 13 && wb && multi && id == I::STMDB {
        Asm::new(I::PUSH, cx)
    } else {
        let mut a = Asm::new(id, cx);
        let name = a.name(R::gpr(rn));
        a.b.push(
            ArmOperand::reg(R::gpr(rn), Access::READ),
            if wb { format!("{}!", name) } else { name },
        );
        a
    };
    if wb {
        a.writeback(R::gpr(rn));
    }
    a.reglist(list, access);
    if l && list & (1 << 15) != 0 {
        pc_write(&mut a, rn == 13);
    }
    Some(a)
}

fn branch(w: u32, pc: Address, cx: &Ctx) -> Asm {
    let offset = sign_extend((bits(w, 0, 24) as u64) << 2, 26);
    let target = pc.wrapping_add(offset as u64);
    if bit(w, 24) {
        let mut a = Asm::new(I::BL, cx);
        a.target(target).group(G::CALL);
        a.b.reads(&[R::PC]).writes(&[R::LR]);
        a
    } else {
        let mut a = Asm::new(I::B, cx);
        a.target(target).group(G::JUMP);
        a
    }
}

/// The `cond == 0b1111` space: `blx #imm`, `pld`, barriers, `clrex`, `cps`.
fn unconditional(w: u32, pc: Address, cx: &Ctx) -> Option<Asm> {
    if bits(w, 25, 3) == 0b101 {
        let offset = sign_extend(((bits(w, 0, 24) << 2) | (bits(w, 24, 1) << 1)) as u64, 26);
        let mut a = Asm::new(I::BLX, cx);
        a.target(pc.wrapping_add(offset as u64)).group(G::CALL).group(G::V5T);
        a.b.writes(&[R::LR]);
        return Some(a);
    }
    if w & 0xffff_ff00 == 0xf57f_f000 {
        let option = bits(w, 0, 4);
        let id = match bits(w, 4, 4) {
            0x1 if option == 15 => return Some(Asm::new(I::CLREX, cx)),
            0x4 => I::DSB,
            0x5 => I::DMB,
            0x6 => I::ISB,
            _ => return None,
        };
        let mut a = Asm::new(id, cx);
        barrier_option(&mut a, id, option);
        return Some(a);
    }
    // pld [rn, #±imm] / [rn, ±rm, shift]
    if w & 0xfd70_f000 == 0xf550_f000 || w & 0xfd70_f010 == 0xf750_f000 {
        let rn = R::gpr(bits(w, 16, 4));
        let u = bit(w, 23);
        let mut a = Asm::new(I::PLD, cx);
        if bit(w, 25) {
            let shift = ArmShift::from_imm(bits(w, 5, 2), bits(w, 7, 5));
            a.mem_reg(rn, R::gpr(bits(w, 0, 4)), u, shift, Index::Offset, Access::READ);
        } else {
            a.mem_imm(rn, u, bits(w, 0, 12), Index::Offset, Access::READ);
        }
        return Some(a);
    }
    if w & 0xfff1_fe20 == 0xf100_0000 && bit(w, 19) {
        return cps(bit(w, 18), bits(w, 6, 3), cx);
    }
    None
}

pub(super) fn cps(disable: bool, aif: u32, cx: &Ctx) -> Option<Asm> {
    if aif == 0 {
        return None;
    }
    let mut a = Asm::named(I::CPS, if disable { "cpsid" } else { "cpsie" }, cx);
    let mut flags = String::new();
    for (m, c) in [(4, 'a'), (2, 'i'), (1, 'f')] {
        if aif & m != 0 {
            flags.push(c);
        }
    }
    a.b.push_text(flags);
    a.b.writes(&[R::CPSR]);
    a.group(G::PRIVILEGE);
    Some(a)
}

pub(super) fn barrier_option(a: &mut Asm, id: I, option: u32) {
    match ArmBarrier::from_option(option) {
        Some(ArmBarrier::Sy) if id == I::ISB => {
            a.barrier = Some(ArmBarrier::Sy);
            a.b.push_text("sy");
        }
        Some(b) if id != I::ISB => {
            a.barrier = Some(b);
            a.b.push_text(b.name());
        }
        _ => {
            a.uimm(option);
        }
    }
    a.group(G::V7);
}

/// VFP register of a single (`sz == 0`) or double precision operand.
fn vreg(double: bool, field: u32, extra: u32) -> R {
    if double {
        R::d((extra << 4) | field)
    } else {
        R::s((field << 1) | extra)
    }
}

/// Coprocessor space: `svc`, `mrc`/`mcr` and VFP. `thumb` excludes `svc`,
/// whose Thumb-2 slot belongs to other encodings.
pub(super) fn coproc(w: u32, cx: &Ctx, thumb: bool) -> Option<Asm> {
    if bits(w, 24, 4) == 0b1111 {
        if thumb {
            return None;
        }
        let mut a = Asm::new(I::SVC, cx);
        a.uimm(bits(w, 0, 24)).group(G::INT);
        return Some(a);
    }
    let cp = bits(w, 8, 4);
    if cp & 0b1110 == 0b1010 {
        let mut a = vfp(w, cx)?;
        a.group(G::VFP2);
        return Some(a);
    }
    if bits(w, 24, 4) == 0b1110 && bit(w, 4) {
        let load = bit(w, 20);
        let mut a = Asm::new(if load { I::MRC } else { I::MCR }, cx);
        a.b.push(
            ArmOperand::new(K::Pimm(cp), Access::empty()),
            format!("p{}", cp),
        );
        a.uimm(bits(w, 21, 3));
        a.gpr(bits(w, 12, 4), if load { Access::WRITE } else { Access::READ });
        for crn in [bits(w, 16, 4), bits(w, 0, 4)] {
            a.b.push(
                ArmOperand::new(K::Cimm(crn), Access::empty()),
                format!("c{}", crn),
            );
        }
        a.uimm(bits(w, 5, 3));
        return Some(a);
    }
    None
}

fn vfp(w: u32, cx: &Ctx) -> Option<Asm> {
    match bits(w, 25, 3) {
        0b110 => vfp_load_store(w, cx),
        0b111 if bit(w, 4) => vfp_transfer(w, cx),
        0b111 => vfp_data(w, cx),
        _ => None,
    }
}

fn vfp_load_store(w: u32, cx: &Ctx) -> Option<Asm> {
    let (p, u, d, wb, l) = (bit(w, 24), bit(w, 23), bit(w, 22), bit(w, 21), bit(w, 20));
    let double = bit(w, 8);
    let rn = bits(w, 16, 4);
    let vd = bits(w, 12, 4);
    let imm8 = bits(w, 0, 8);
    let first = vreg(double, vd, d as u32);

    // vmov between two core registers and a double
    if bits(w, 21, 4) == 0b0010 {
        if !double || bits(w, 6, 2) != 0 {
            return None;
        }
        let dm = vreg(true, bits(w, 0, 4), bit(w, 5) as u32);
        let (rt, rt2) = (bits(w, 12, 4), bits(w, 16, 4));
        let mut a = Asm::new(I::VMOV, cx);
        if l {
            a.gpr(rt, Access::WRITE).gpr(rt2, Access::WRITE).reg(dm, Access::READ);
        } else {
            a.reg(dm, Access::WRITE).gpr(rt, Access::READ).gpr(rt2, Access::READ);
        }
        return Some(a);
    }

    let (reg_access, mem_access) = if l {
        (Access::WRITE, Access::READ)
    } else {
        (Access::READ, Access::WRITE)
    };
    if p && !wb {
        let mut a = Asm::new(if l { I::VLDR } else { I::VSTR }, cx);
        a.reg(first, reg_access)
            .mem_imm(R::gpr(rn), u, imm8 * 4, Index::Offset, mem_access);
        return Some(a);
    }

    let count = if double { imm8 / 2 } else { imm8 };
    if count == 0 || (double && imm8 % 2 == 1) {
        return None;
    }
    // the list may not run past the last register of its bank
    let index = if double { (d as u32) << 4 | vd } else { vd << 1 | d as u32 };
    if index + count > 32 || (double && count > 16) {
        return None;
    }
    let id = match (p, u, wb, l) {
        (false, true, true, true) if rn == 13 => I::VPOP,
        (true, false, true, false) if rn == 13 => I::VPUSH,
        (false, true, _, true) => I::VLDMIA,
        (false, true, _, false) => I::VSTMIA,
        (true, false, true, false) => I::VSTMDB,
        _ => return None,
    };
    let mut a = Asm::new(id, cx);
    if wb {
        a.writeback(R::gpr(rn));
    }
    if !matches!(id, I::VPOP | I::VPUSH) {
        let name = a.name(R::gpr(rn));
        a.b.push(
            ArmOperand::reg(R::gpr(rn), Access::READ),
            if wb { format!("{}!", name) } else { name },
        );
    }
    a.vreglist(first, count, reg_access);
    Some(a)
}

fn vfp_transfer(w: u32, cx: &Ctx) -> Option<Asm> {
    let l = bit(w, 20);
    let rt = bits(w, 12, 4);
    if !bit(w, 8) {
        match bits(w, 21, 3) {
            0b000 => {
                let sn = vreg(false, bits(w, 16, 4), bit(w, 7) as u32);
                let mut a = Asm::new(I::VMOV, cx);
                if l {
                    a.gpr(rt, Access::WRITE).reg(sn, Access::READ);
                } else {
                    a.reg(sn, Access::WRITE).gpr(rt, Access::READ);
                }
                Some(a)
            }
            0b111 => {
                let special = match bits(w, 16, 4) {
                    0 => R::FPSID,
                    1 => R::FPSCR,
                    8 => R::FPEXC,
                    _ => return None,
                };
                if l {
                    let mut a = Asm::new(I::VMRS, cx);
                    if rt == 15 {
                        a.b.push(ArmOperand::reg(R::APSR_NZCV, Access::WRITE), "APSR_nzcv");
                        a.b.writes(&[R::CPSR]);
                    } else {
                        a.gpr(rt, Access::WRITE);
                    }
                    a.reg(special, Access::READ);
                    Some(a)
                } else {
                    let mut a = Asm::new(I::VMSR, cx);
                    a.reg(special, Access::WRITE).gpr(rt, Access::READ);
                    Some(a)
                }
            }
            _ => None,
        }
    } else {
        // vmov.32 between a core register and a double lane
        if bit(w, 22) || bits(w, 5, 2) != 0 || bit(w, 23) {
            return None;
        }
        let dn = vreg(true, bits(w, 16, 4), bit(w, 7) as u32);
        let lane = bit(w, 21) as u8;
        let mut a = Asm::new(I::VMOV, cx);
        a.suffix = ".32";
        let mut op = ArmOperand::reg(dn, if l { Access::READ } else { Access::WRITE });
        op.vector_index = Some(lane);
        let scalar = format!("{}[{}]", dn.name(), lane);
        if l {
            a.gpr(rt, Access::WRITE);
            a.b.push(op, scalar);
        } else {
            a.b.push(op, scalar);
            a.gpr(rt, Access::READ);
        }
        Some(a)
    }
}

/// Expand the 8-bit VFP immediate.
fn vfp_expand_imm(imm8: u32) -> f64 {
    let sign = if imm8 & 0x80 != 0 { -1.0 } else { 1.0 };
    let exp = ((imm8 >> 4) & 7) as i32;
    let exp = if exp & 4 != 0 { exp - 8 } else { exp } + 1;
    let frac = 1.0 + (imm8 & 15) as f64 / 16.0;
    sign * frac * 2f64.powi(exp)
}

fn vfp_data(w: u32, cx: &Ctx) -> Option<Asm> {
    let double = bit(w, 8);
    let dt = if double { ".f64" } else { ".f32" };
    let d = vreg(double, bits(w, 12, 4), bit(w, 22) as u32);
    let n = vreg(double, bits(w, 16, 4), bit(w, 7) as u32);
    let m = vreg(double, bits(w, 0, 4), bit(w, 5) as u32);
    let op = bit(w, 6);
    let opc1 = (bits(w, 23, 1) << 2) | bits(w, 20, 2);

    let three = |id: I, acc: Access| {
        let mut a = Asm::new(id, cx);
        a.suffix = dt;
        a.reg(d, acc).reg(n, Access::READ).reg(m, Access::READ);
        a
    };
    let a = match (opc1, op) {
        (0b000, false) => three(I::VMLA, Access::READ_WRITE),
        (0b000, true) => three(I::VMLS, Access::READ_WRITE),
        (0b010, false) => three(I::VMUL, Access::WRITE),
        (0b010, true) => three(I::VNMUL, Access::WRITE),
        (0b011, false) => three(I::VADD, Access::WRITE),
        (0b011, true) => three(I::VSUB, Access::WRITE),
        (0b100, false) => three(I::VDIV, Access::WRITE),
        (0b111, _) => {
            if op {
                vfp_other(w, double, d, m, cx)?
            } else {
                let value = vfp_expand_imm((bits(w, 16, 4) << 4) | bits(w, 0, 4));
                let mut a = Asm::new(I::VMOV, cx);
                a.suffix = dt;
                a.reg(d, Access::WRITE);
                a.b.push(ArmOperand::new(K::Fp(value), Access::empty()), fp_text(value));
                a.group(G::VFP3);
                a
            }
        }
        _ => return None,
    };
    Some(a)
}

/// `opc1 == 0b1D11` with `op` set: unary ops, compares, conversions.
fn vfp_other(w: u32, double: bool, d: R, m: R, cx: &Ctx) -> Option<Asm> {
    let dt = if double { ".f64" } else { ".f32" };
    let t = bit(w, 7);
    let unary = |id: I| {
        let mut a = Asm::new(id, cx);
        a.suffix = dt;
        a.reg(d, Access::WRITE).reg(m, Access::READ);
        a
    };
    let a = match (bits(w, 16, 4), t) {
        (0b0000, false) => unary(I::VMOV),
        (0b0000, true) => unary(I::VABS),
        (0b0001, false) => unary(I::VNEG),
        (0b0001, true) => unary(I::VSQRT),
        (0b0100, _) | (0b0101, _) => {
            let mut a = Asm::new(if t { I::VCMPE } else { I::VCMP }, cx);
            a.suffix = dt;
            a.reg(d, Access::READ);
            if bits(w, 16, 4) == 0b0101 {
                a.b.push(ArmOperand::new(K::Fp(0.0), Access::empty()), "#0");
            } else {
                a.reg(m, Access::READ);
            }
            a.b.writes(&[R::FPSCR]);
            a
        }
        (0b0111, true) => {
            // precision change: destination has the other size
            let dest = vreg(!double, bits(w, 12, 4), bit(w, 22) as u32);
            let mut a = Asm::new(I::VCVT, cx);
            a.suffix = if double { ".f32.f64" } else { ".f64.f32" };
            a.reg(dest, Access::WRITE).reg(m, Access::READ);
            a
        }
        (0b1000, signed) => {
            let src = vreg(false, bits(w, 0, 4), bit(w, 5) as u32);
            let mut a = Asm::new(I::VCVT, cx);
            a.suffix = match (double, signed) {
                (false, false) => ".f32.u32",
                (false, true) => ".f32.s32",
                (true, false) => ".f64.u32",
                (true, true) => ".f64.s32",
            };
            a.reg(d, Access::WRITE).reg(src, Access::READ);
            a
        }
        (0b1100, true) | (0b1101, true) => {
            let dest = vreg(false, bits(w, 12, 4), bit(w, 22) as u32);
            let signed = bits(w, 16, 4) == 0b1101;
            let mut a = Asm::new(I::VCVT, cx);
            a.suffix = match (signed, double) {
                (false, false) => ".u32.f32",
                (false, true) => ".u32.f64",
                (true, false) => ".s32.f32",
                (true, true) => ".s32.f64",
            };
            a.reg(dest, Access::WRITE).reg(m, Access::READ);
            a
        }
        _ => return None,
    };
    Some(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(word: u32, address: Address) -> Option<String> {
        let cx = Ctx {
            numeric: false,
            mclass: false,
        };
        let a = decode(word, address, &cx)?;
        let d = a.finish(4, false);
        Some(if d.op_str.is_empty() {
            d.mnemonic
        } else {
            format!("{} {}", d.mnemonic, d.op_str)
        })
    }

    #[rstest]
    #[case(0xe92d_4800, "push {fp, lr}")]
    #[case(0xe8bd_8800, "pop {fp, pc}")]
    #[case(0xe52d_e004, "push {lr}")]
    #[case(0xe49d_f004, "pop {pc}")]
    #[case(0xe3a0_0001, "mov r0, #1")]
    #[case(0xe3a0_04ff, "mov r0, #0xff000000")]
    #[case(0xe1a0_0001, "mov r0, r1")]
    #[case(0xe1a0_0101, "lsl r0, r1, #2")]
    #[case(0xe1b0_0231, "lsrs r0, r1, r2")]
    #[case(0xe1a0_0061, "rrx r0, r1")]
    #[case(0xe350_0000, "cmp r0, #0")]
    #[case(0xe24d_d010, "sub sp, sp, #0x10")]
    #[case(0xe081_0102, "add r0, r1, r2, lsl #2")]
    #[case(0xe081_0a22, "add r0, r1, r2, lsr #20")]
    #[case(0x1a00_0000, "bne #0x1008")]
    #[case(0xe12f_ff1e, "bx lr")]
    #[case(0xe12f_ff33, "blx r3")]
    #[case(0xe591_0004, "ldr r0, [r1, #4]")]
    #[case(0xe511_0004, "ldr r0, [r1, #-4]")]
    #[case(0xe490_1004, "ldr r1, [r0], #4")]
    #[case(0xe791_0102, "ldr r0, [r1, r2, lsl #2]")]
    #[case(0xe5c1_0000, "strb r0, [r1]")]
    #[case(0xe1d1_00b2, "ldrh r0, [r1, #2]")]
    #[case(0xe1c2_00d8, "ldrd r0, r1, [r2, #8]")]
    #[case(0xe4b1_0004, "ldrt r0, [r1], #4")]
    #[case(0xe000_0291, "mul r0, r1, r2")]
    #[case(0xe081_0392, "umull r0, r1, r2, r3")]
    #[case(0xe301_0234, "movw r0, #0x1234")]
    #[case(0xe340_0001, "movt r0, #1")]
    #[case(0xe320_f000, "nop")]
    #[case(0xe16f_0f11, "clz r0, r1")]
    #[case(0xe6ef_0071, "uxtb r0, r1")]
    #[case(0xe6bf_0f31, "rev r0, r1")]
    #[case(0xe7e7_0251, "ubfx r0, r1, #4, #8")]
    #[case(0xe710_f211, "sdiv r0, r1, r2")]
    #[case(0xe891_000c, "ldm r1, {r2, r3}")]
    #[case(0xe8a0_0006, "stm r0!, {r1, r2}")]
    #[case(0xef00_0000, "svc #0")]
    #[case(0xe120_0070, "bkpt #0")]
    #[case(0xe10f_0000, "mrs r0, apsr")]
    #[case(0xe129_f000, "msr cpsr_fc, r0")]
    #[case(0xee1d_0f70, "mrc p15, #0, r0, c13, c0, #3")]
    #[case(0xe190_0f9f, "ldrex r0, [r0]")]
    #[case(0xf57f_f04f, "dsb sy")]
    #[case(0xf57f_f06f, "isb sy")]
    #[case(0xf5d1_f000, "pld [r1]")]
    fn test_a32_encodings(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word, 0x1000).as_deref(), Some(expected));
    }

    #[rstest]
    #[case(0xee30_0a01, "vadd.f32 s0, s0, s2")]
    #[case(0xee21_0b02, "vmul.f64 d0, d1, d2")]
    #[case(0xeeb0_0a41, "vmov.f32 s0, s2")]
    #[case(0xeeb7_0ac0, "vcvt.f64.f32 d0, s0")]
    #[case(0xeeb8_0ac0, "vcvt.f32.s32 s0, s0")]
    #[case(0xeebd_0ac0, "vcvt.s32.f32 s0, s0")]
    #[case(0xeeb4_0a41, "vcmp.f32 s0, s2")]
    #[case(0xeef1_fa10, "vmrs APSR_nzcv, fpscr")]
    #[case(0xed9f_0b02, "vldr d0, [pc, #8]")]
    #[case(0xed2d_8b02, "vpush {d8}")]
    #[case(0xecbd_8b04, "vpop {d8, d9}")]
    #[case(0xee10_0a10, "vmov r0, s0")]
    #[case(0xeeb7_0a00, "vmov.f32 s0, #1.000000e+00")]
    #[case(0xec41_0b10, "vmov d0, r0, r1")]
    #[case(0xee20_0b10, "vmov.32 d0[1], r0")]
    fn test_vfp_encodings(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word, 0x1000).as_deref(), Some(expected));
    }

    #[test]
    fn test_vfp_register_list_bounds() {
        // s13 plus 36 registers runs into the double bank
        assert_eq!(text(0x4cc0_6a24, 0), None);
        // seventeen doubles
        assert_eq!(text(0xecbd_0b22, 0), None);
        // d24 plus nine doubles passes d31
        assert_eq!(text(0xecfd_8b12, 0), None);
        assert_eq!(
            text(0xecfd_8b10, 0).as_deref(),
            Some("vpop {d24, d25, d26, d27, d28, d29, d30, d31}")
        );
        assert_eq!(text(0xecfd_fa01, 0).as_deref(), Some("vpop {s31}"));
    }

    #[test]
    fn test_branch_targets() {
        assert_eq!(text(0xebff_ffed, 0x1000).as_deref(), Some("bl #0xfbc"));
        assert_eq!(text(0xeaff_fffe, 0x1000).as_deref(), Some("b #0x1000"));
        // blx with the H bit adds two bytes
        assert_eq!(text(0xfb00_0000, 0x1000).as_deref(), Some("blx #0x100a"));
    }

    #[test]
    fn test_undefined_space() {
        // mls with the S bit
        assert_eq!(text(0xe070_0291, 0), None);
        // ldrd with an odd first register
        assert_eq!(text(0xe1c2_10d8, 0), None);
        assert_eq!(text(0xf000_0000, 0), None);
    }

    #[test]
    fn test_vfp_expand_imm() {
        assert_eq!(vfp_expand_imm(0x70), 1.0);
        assert_eq!(vfp_expand_imm(0x00), 2.0);
        assert_eq!(vfp_expand_imm(0xe0), -0.5);
    }
}
