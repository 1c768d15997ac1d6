//! Thumb (16-bit) and Thumb-2 (32-bit) decoding with IT-block tracking.

use super::a32::{barrier_option, coproc, cps, hint, psr_field};
use super::asm::{pc_write, Asm, Ctx, Index};
use super::{ArmCc, ArmGroup as G, ArmInsn as I, ArmOpKind as K, ArmOperand, ArmReg as R, ArmShift};
use crate::arch::{bit, bits, read_u16, sign_extend};
use crate::insn::Access;
use crate::table::IdTable;
use crate::Address;

/// Decode one Thumb instruction and step the IT state.
pub(super) fn decode(
    code: &[u8],
    address: Address,
    big_endian: bool,
    cx: &Ctx,
    it: &mut u8,
) -> Option<(Asm, usize)> {
    let hw1 = read_u16(code, big_endian)? as u32;
    let in_it = *it & 0xf != 0;
    let (mut a, size) = if matches!(hw1 >> 11, 0b11101 | 0b11110 | 0b11111) {
        let hw2 = read_u16(code.get(2..)?, big_endian)? as u32;
        let mut a = thumb32((hw1 << 16) | hw2, address, cx)?;
        a.group(G::THUMB2);
        (a, 4)
    } else {
        let mut a = thumb16(hw1, address, cx, in_it)?;
        a.group(G::THUMB);
        (a, 2)
    };
    if a.id() == I::IT {
        if in_it {
            return None;
        }
        *it = (hw1 & 0xff) as u8;
    } else if in_it {
        if let Some(cc) = ArmCc::from_bits((*it >> 4) as u32) {
            a.cond(cc);
        }
        *it = advance(*it);
    }
    Some((a, size))
}

/// ITAdvance: shift the mask, clearing the state after the last slot.
fn advance(it: u8) -> u8 {
    if it & 7 == 0 {
        0
    } else {
        (it & 0xe0) | ((it << 1) & 0x1f)
    }
}

/// 16-bit ALU op: flag-setting outside an IT block only.
fn alu(id: I, cx: &Ctx, in_it: bool) -> Asm {
    let mut a = Asm::new(id, cx);
    if !in_it {
        a.set_flags();
    }
    a
}

fn thumb16(h: u32, address: Address, cx: &Ctx, in_it: bool) -> Option<Asm> {
    let pc = address.wrapping_add(4);
    let a = match h >> 11 {
        0b00000..=0b00010 => {
            let imm5 = bits(h, 6, 5);
            let (rm, rd) = (bits(h, 3, 3), bits(h, 0, 3));
            let op = h >> 11;
            if op == 0 && imm5 == 0 {
                let mut a = alu(I::MOV, cx, in_it);
                a.gpr(rd, Access::WRITE).gpr(rm, Access::READ);
                a
            } else {
                let id = [I::LSL, I::LSR, I::ASR][op as usize];
                let amount = if imm5 == 0 { 32 } else { imm5 };
                let mut a = alu(id, cx, in_it);
                a.gpr(rd, Access::WRITE).gpr(rm, Access::READ).uimm(amount);
                a
            }
        }
        0b00011 => {
            let id = if bit(h, 9) { I::SUB } else { I::ADD };
            let x = bits(h, 6, 3);
            let mut a = alu(id, cx, in_it);
            a.gpr(bits(h, 0, 3), Access::WRITE).gpr(bits(h, 3, 3), Access::READ);
            if bit(h, 10) {
                a.uimm(x);
            } else {
                a.gpr(x, Access::READ);
            }
            a
        }
        0b00100 => {
            let mut a = alu(I::MOV, cx, in_it);
            a.gpr(bits(h, 8, 3), Access::WRITE).uimm(bits(h, 0, 8));
            a
        }
        0b00101 => {
            let mut a = Asm::new(I::CMP, cx);
            a.writes_flags();
            a.gpr(bits(h, 8, 3), Access::READ).uimm(bits(h, 0, 8));
            a
        }
        0b00110 | 0b00111 => {
            let id = if bit(h, 11) { I::SUB } else { I::ADD };
            let mut a = alu(id, cx, in_it);
            a.gpr(bits(h, 8, 3), Access::READ_WRITE).uimm(bits(h, 0, 8));
            a
        }
        0b01000 if !bit(h, 10) => alu_register(h, cx, in_it),
        0b01000 => special(h, cx)?,
        0b01001 => {
            let mut a = Asm::new(I::LDR, cx);
            a.gpr(bits(h, 8, 3), Access::WRITE).mem_imm(
                R::PC,
                true,
                bits(h, 0, 8) * 4,
                Index::Offset,
                Access::READ,
            );
            a
        }
        0b01010 | 0b01011 => {
            let op = bits(h, 9, 3);
            let id = [
                I::STR,
                I::STRH,
                I::STRB,
                I::LDRSB,
                I::LDR,
                I::LDRH,
                I::LDRB,
                I::LDRSH,
            ][op as usize];
            let (rt_access, mem_access) = if op >= 3 {
                (Access::WRITE, Access::READ)
            } else {
                (Access::READ, Access::WRITE)
            };
            let mut a = Asm::new(id, cx);
            a.gpr(bits(h, 0, 3), rt_access).mem_reg(
                R::gpr(bits(h, 3, 3)),
                R::gpr(bits(h, 6, 3)),
                true,
                None,
                Index::Offset,
                mem_access,
            );
            a
        }
        0b01100..=0b10001 => {
            let load = bit(h, 11);
            let (id, scale) = match (h >> 12, load) {
                (0b0110, false) => (I::STR, 4),
                (0b0110, true) => (I::LDR, 4),
                (0b0111, false) => (I::STRB, 1),
                (0b0111, true) => (I::LDRB, 1),
                (_, false) => (I::STRH, 2),
                (_, true) => (I::LDRH, 2),
            };
            transfer(
                id,
                load,
                R::gpr(bits(h, 3, 3)),
                bits(h, 0, 3),
                bits(h, 6, 5) * scale,
                cx,
            )
        }
        0b10010 | 0b10011 => {
            let load = bit(h, 11);
            transfer(
                if load { I::LDR } else { I::STR },
                load,
                R::SP,
                bits(h, 8, 3),
                bits(h, 0, 8) * 4,
                cx,
            )
        }
        0b10100 => {
            let mut a = Asm::new(I::ADR, cx);
            a.gpr(bits(h, 8, 3), Access::WRITE).uimm(bits(h, 0, 8) * 4);
            a.b.reads(&[R::PC]);
            a
        }
        0b10101 => {
            let mut a = Asm::new(I::ADD, cx);
            a.gpr(bits(h, 8, 3), Access::WRITE)
                .reg(R::SP, Access::READ)
                .uimm(bits(h, 0, 8) * 4);
            a
        }
        0b10110 | 0b10111 => misc16(h, pc, cx, in_it)?,
        0b11000 | 0b11001 => {
            let load = bit(h, 11);
            let rn = bits(h, 8, 3);
            let list = bits(h, 0, 8);
            if list == 0 {
                return None;
            }
            let wb = !load || list & (1 << rn) == 0;
            let mut a = Asm::new(if load { I::LDM } else { I::STM }, cx);
            let name = a.name(R::gpr(rn));
            a.b.push(
                ArmOperand::reg(R::gpr(rn), Access::READ),
                if wb { format!("{}!", name) } else { name },
            );
            if wb {
                a.writeback(R::gpr(rn));
            }
            a.reglist(list, if load { Access::WRITE } else { Access::READ });
            a
        }
        0b11010 | 0b11011 => match bits(h, 8, 4) {
            15 => {
                let mut a = Asm::new(I::SVC, cx);
                a.uimm(bits(h, 0, 8)).group(G::INT);
                a
            }
            14 => {
                let mut a = Asm::new(I::UDF, cx);
                a.uimm(bits(h, 0, 8));
                a
            }
            cond => {
                if in_it {
                    return None;
                }
                let offset = sign_extend((bits(h, 0, 8) << 1) as u64, 9);
                let mut a = Asm::new(I::B, cx);
                a.target(pc.wrapping_add(offset as u64)).group(G::JUMP);
                a.cond(ArmCc::from_bits(cond)?);
                a
            }
        },
        0b11100 => {
            let offset = sign_extend((bits(h, 0, 11) << 1) as u64, 12);
            let mut a = Asm::new(I::B, cx);
            a.target(pc.wrapping_add(offset as u64)).group(G::JUMP);
            a
        }
        _ => return None,
    };
    Some(a)
}

fn transfer(id: I, load: bool, rn: R, rt: u32, imm: u32, cx: &Ctx) -> Asm {
    let (rt_access, mem_access) = if load {
        (Access::WRITE, Access::READ)
    } else {
        (Access::READ, Access::WRITE)
    };
    let mut a = Asm::new(id, cx);
    a.gpr(rt, rt_access)
        .mem_imm(rn, true, imm, Index::Offset, mem_access);
    a
}

/// `010000 op rm rdn`: two-register ALU forms.
fn alu_register(h: u32, cx: &Ctx, in_it: bool) -> Asm {
    let (rm, rdn) = (bits(h, 3, 3), bits(h, 0, 3));
    let id = match bits(h, 6, 4) {
        0 => I::AND,
        1 => I::EOR,
        2 => I::LSL,
        3 => I::LSR,
        4 => I::ASR,
        5 => I::ADC,
        6 => I::SBC,
        7 => I::ROR,
        8 => I::TST,
        9 => I::RSB,
        10 => I::CMP,
        11 => I::CMN,
        12 => I::ORR,
        13 => I::MUL,
        14 => I::BIC,
        _ => I::MVN,
    };
    match id {
        I::TST | I::CMP | I::CMN => {
            let mut a = Asm::new(id, cx);
            a.writes_flags();
            a.gpr(rdn, Access::READ).gpr(rm, Access::READ);
            a
        }
        I::RSB => {
            let mut a = alu(id, cx, in_it);
            a.gpr(rdn, Access::WRITE).gpr(rm, Access::READ).uimm(0);
            a
        }
        I::MUL => {
            let mut a = alu(id, cx, in_it);
            a.gpr(rdn, Access::WRITE)
                .gpr(rm, Access::READ)
                .gpr(rdn, Access::READ)
                .group(G::MULOPS);
            a
        }
        I::MVN => {
            let mut a = alu(id, cx, in_it);
            a.gpr(rdn, Access::WRITE).gpr(rm, Access::READ);
            a
        }
        _ => {
            let mut a = alu(id, cx, in_it);
            a.gpr(rdn, Access::READ_WRITE).gpr(rm, Access::READ);
            if matches!(id, I::ADC | I::SBC) {
                a.b.reads(&[R::CPSR]);
            }
            a
        }
    }
}

/// `010001`: high-register add, compare, move and the register branches.
fn special(h: u32, cx: &Ctx) -> Option<Asm> {
    let rdn = bits(h, 0, 3) | (bits(h, 7, 1) << 3);
    let rm = bits(h, 3, 4);
    let a = match bits(h, 8, 2) {
        0 => {
            let mut a = Asm::new(I::ADD, cx);
            a.gpr(rdn, Access::READ_WRITE).gpr(rm, Access::READ);
            if rdn == 15 {
                pc_write(&mut a, false);
            }
            a
        }
        1 => {
            let mut a = Asm::new(I::CMP, cx);
            a.writes_flags();
            a.gpr(rdn, Access::READ).gpr(rm, Access::READ);
            a
        }
        2 => {
            let mut a = Asm::new(I::MOV, cx);
            a.gpr(rdn, Access::WRITE).gpr(rm, Access::READ);
            if rdn == 15 {
                pc_write(&mut a, rm == 14);
            }
            a
        }
        _ => {
            if bits(h, 0, 3) != 0 {
                return None;
            }
            if bit(h, 7) {
                let mut a = Asm::new(I::BLX, cx);
                a.gpr(rm, Access::READ).group(G::CALL).group(G::V5T);
                a.b.writes(&[R::LR]);
                a
            } else {
                let mut a = Asm::new(I::BX, cx);
                a.gpr(rm, Access::READ).group(G::JUMP);
                if rm == 14 {
                    a.group(G::RET);
                }
                a
            }
        }
    };
    Some(a)
}

/// `1011`: stack adjust, extends, push/pop, compare-and-branch, hints, IT.
fn misc16(h: u32, pc: Address, cx: &Ctx, in_it: bool) -> Option<Asm> {
    let a = match bits(h, 8, 4) {
        0b0000 => {
            let id = if bit(h, 7) { I::SUB } else { I::ADD };
            let mut a = Asm::new(id, cx);
            a.reg(R::SP, Access::READ_WRITE).uimm(bits(h, 0, 7) * 4);
            a
        }
        0b0001 | 0b0011 | 0b1001 | 0b1011 => {
            if in_it {
                return None;
            }
            let offset = (bits(h, 9, 1) << 6) | (bits(h, 3, 5) << 1);
            let mut a = Asm::new(if bit(h, 11) { I::CBNZ } else { I::CBZ }, cx);
            a.gpr(bits(h, 0, 3), Access::READ)
                .target(pc.wrapping_add(offset as u64))
                .group(G::JUMP)
                .group(G::THUMB2);
            a
        }
        0b0010 => {
            let id = [I::SXTH, I::SXTB, I::UXTH, I::UXTB][bits(h, 6, 2) as usize];
            let mut a = Asm::new(id, cx);
            a.gpr(bits(h, 0, 3), Access::WRITE)
                .gpr(bits(h, 3, 3), Access::READ)
                .group(G::V6);
            a
        }
        0b0100 | 0b0101 => {
            let list = bits(h, 0, 8) | (bits(h, 8, 1) << 14);
            if list == 0 {
                return None;
            }
            let mut a = Asm::new(I::PUSH, cx);
            a.writeback(R::SP);
            a.reglist(list, Access::READ);
            a
        }
        0b1100 | 0b1101 => {
            let list = bits(h, 0, 8) | (bits(h, 8, 1) << 15);
            if list == 0 {
                return None;
            }
            let mut a = Asm::new(I::POP, cx);
            a.writeback(R::SP);
            a.reglist(list, Access::WRITE);
            if list & (1 << 15) != 0 {
                pc_write(&mut a, true);
            }
            a
        }
        0b0110 if bits(h, 5, 3) == 0b011 && !in_it => cps(bit(h, 4), bits(h, 0, 3), cx)?,
        0b1010 => {
            let id = match bits(h, 6, 2) {
                0 => I::REV,
                1 => I::REV16,
                3 => I::REVSH,
                _ => return None,
            };
            let mut a = Asm::new(id, cx);
            a.gpr(bits(h, 0, 3), Access::WRITE)
                .gpr(bits(h, 3, 3), Access::READ)
                .group(G::V6);
            a
        }
        0b1110 => {
            let mut a = Asm::new(I::BKPT, cx);
            a.uimm(bits(h, 0, 8)).group(G::INT);
            a
        }
        0b1111 => {
            let mask = bits(h, 0, 4);
            if mask == 0 {
                Asm::new(hint(bits(h, 4, 4))?, cx)
            } else {
                it_insn(bits(h, 4, 4), mask, cx)?
            }
        }
        _ => return None,
    };
    Some(a)
}

/// `it{x{y{z}}} <firstcond>`.
fn it_insn(firstcond: u32, mask: u32, cx: &Ctx) -> Option<Asm> {
    let cc = ArmCc::from_bits(firstcond)?;
    let count = 4 - mask.trailing_zeros();
    let mut name = String::from("it");
    for i in 1..count {
        let then = (mask >> (4 - i)) & 1 == firstcond & 1;
        name.push(if then { 't' } else { 'e' });
    }
    let mut a = Asm::named(I::IT, &name, cx);
    a.b.push_text(cc.name());
    a.group(G::THUMB2);
    Some(a)
}

fn thumb32(w: u32, address: Address, cx: &Ctx) -> Option<Asm> {
    let pc = address.wrapping_add(4);
    let op2 = bits(w, 20, 7);
    match bits(w, 27, 2) {
        0b01 => {
            if bit(w, 26) {
                coproc(w, cx, true)
            } else if bit(w, 25) {
                dp_shifted(w, cx)
            } else if bit(w, 22) {
                dual_exclusive(w, cx)
            } else {
                multiple(w, cx)
            }
        }
        0b10 => {
            if bit(w, 15) {
                branch_misc(w, pc, cx)
            } else if bit(w, 25) {
                plain_imm(w, cx)
            } else {
                modified_imm(w, cx)
            }
        }
        0b11 => {
            if op2 & 0b111_0001 == 0 {
                single(w, false, cx)
            } else if op2 & 0b110_0001 == 0b000_0001 {
                single(w, true, cx)
            } else if op2 & 0b111_0000 == 0b010_0000 {
                dp_register(w, cx)
            } else if op2 & 0b111_1000 == 0b011_0000 {
                multiply(w, cx)
            } else if op2 & 0b111_1000 == 0b011_1000 {
                long_multiply(w, cx)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// ThumbExpandImm.
fn thumb_expand_imm(imm12: u32) -> Option<u32> {
    if imm12 >> 10 == 0 {
        let imm8 = imm12 & 0xff;
        match bits(imm12, 8, 2) {
            0 => Some(imm8),
            _ if imm8 == 0 => None,
            1 => Some((imm8 << 16) | imm8),
            2 => Some((imm8 << 24) | (imm8 << 8)),
            _ => Some(imm8 * 0x0101_0101),
        }
    } else {
        Some((0x80 | (imm12 & 0x7f)).rotate_right(imm12 >> 7))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Binary,
    Compare,
    Unary,
}

/// Opcode table shared by the modified-immediate and shifted-register forms.
fn dp_op(op: u32, rn: u32, rd: u32, s: bool) -> Option<(I, Form)> {
    let test = rd == 15 && s;
    Some(match op {
        0 if test => (I::TST, Form::Compare),
        0 => (I::AND, Form::Binary),
        1 => (I::BIC, Form::Binary),
        2 if rn == 15 => (I::MOV, Form::Unary),
        2 => (I::ORR, Form::Binary),
        3 if rn == 15 => (I::MVN, Form::Unary),
        3 => (I::ORN, Form::Binary),
        4 if test => (I::TEQ, Form::Compare),
        4 => (I::EOR, Form::Binary),
        8 if test => (I::CMN, Form::Compare),
        8 => (I::ADD, Form::Binary),
        10 => (I::ADC, Form::Binary),
        11 => (I::SBC, Form::Binary),
        13 if test => (I::CMP, Form::Compare),
        13 => (I::SUB, Form::Binary),
        14 => (I::RSB, Form::Binary),
        _ => return None,
    })
}

fn dp_start(id: I, form: Form, s: bool, rd: u32, rn: u32, cx: &Ctx) -> Asm {
    let mut a = Asm::new(id, cx);
    match form {
        Form::Compare => {
            a.writes_flags();
            a.gpr(rn, Access::READ);
        }
        Form::Unary => {
            if s {
                a.set_flags();
            }
            a.gpr(rd, Access::WRITE);
        }
        Form::Binary => {
            if s {
                a.set_flags();
            }
            a.gpr(rd, Access::WRITE).gpr(rn, Access::READ);
        }
    }
    if id != I::ORN {
        a.wide();
    }
    if matches!(id, I::ADC | I::SBC) {
        a.b.reads(&[R::CPSR]);
    }
    a
}

fn modified_imm(w: u32, cx: &Ctx) -> Option<Asm> {
    let (s, rn, rd) = (bit(w, 20), bits(w, 16, 4), bits(w, 8, 4));
    let (id, form) = dp_op(bits(w, 21, 4), rn, rd, s)?;
    let imm12 = (bits(w, 26, 1) << 11) | (bits(w, 12, 3) << 8) | bits(w, 0, 8);
    let value = thumb_expand_imm(imm12)?;
    let mut a = dp_start(id, form, s, rd, rn, cx);
    a.uimm(value);
    Some(a)
}

fn dp_shifted(w: u32, cx: &Ctx) -> Option<Asm> {
    let (s, rn, rd, rm) = (bit(w, 20), bits(w, 16, 4), bits(w, 8, 4), bits(w, 0, 4));
    let (id, form) = dp_op(bits(w, 21, 4), rn, rd, s)?;
    let shift = ArmShift::from_imm(bits(w, 4, 2), (bits(w, 12, 3) << 2) | bits(w, 6, 2));
    if id == I::MOV {
        if let Some(sh) = shift {
            let shift_id = match sh {
                ArmShift::Lsl(_) => I::LSL,
                ArmShift::Lsr(_) => I::LSR,
                ArmShift::Asr(_) => I::ASR,
                ArmShift::Ror(_) => I::ROR,
                _ => I::RRX,
            };
            let mut a = Asm::new(shift_id, cx);
            if s {
                a.set_flags();
            }
            a.gpr(rd, Access::WRITE).gpr(rm, Access::READ);
            if let ArmShift::Lsl(n) | ArmShift::Lsr(n) | ArmShift::Asr(n) | ArmShift::Ror(n) = sh {
                a.uimm(n);
                a.wide();
            }
            return Some(a);
        }
    }
    let mut a = dp_start(id, form, s, rd, rn, cx);
    a.shifted(rm, shift);
    Some(a)
}

fn plain_imm(w: u32, cx: &Ctx) -> Option<Asm> {
    let (rn, rd) = (bits(w, 16, 4), bits(w, 8, 4));
    let imm12 = (bits(w, 26, 1) << 11) | (bits(w, 12, 3) << 8) | bits(w, 0, 8);
    let lsb = (bits(w, 12, 3) << 2) | bits(w, 6, 2);
    let field = bits(w, 0, 5);
    let mut a = match bits(w, 20, 5) {
        0b00000 | 0b01010 => {
            let id = if bit(w, 23) { I::SUBW } else { I::ADDW };
            let mut a = Asm::new(id, cx);
            a.gpr(rd, Access::WRITE).gpr(rn, Access::READ).uimm(imm12);
            a
        }
        0b00100 | 0b01100 => {
            let id = if bit(w, 23) { I::MOVT } else { I::MOVW };
            let access = if id == I::MOVT {
                Access::READ_WRITE
            } else {
                Access::WRITE
            };
            let mut a = Asm::new(id, cx);
            a.gpr(rd, access).uimm((rn << 12) | imm12);
            a
        }
        0b10100 | 0b11100 => {
            if lsb + field + 1 > 32 {
                return None;
            }
            let id = if bit(w, 23) { I::UBFX } else { I::SBFX };
            let mut a = Asm::new(id, cx);
            a.gpr(rd, Access::WRITE)
                .gpr(rn, Access::READ)
                .uimm(lsb)
                .uimm(field + 1);
            a
        }
        0b10110 => {
            if field < lsb {
                return None;
            }
            let mut a = if rn == 15 {
                let mut a = Asm::new(I::BFC, cx);
                a.gpr(rd, Access::READ_WRITE);
                a
            } else {
                let mut a = Asm::new(I::BFI, cx);
                a.gpr(rd, Access::READ_WRITE).gpr(rn, Access::READ);
                a
            };
            a.uimm(lsb).uimm(field - lsb + 1);
            a
        }
        _ => return None,
    };
    a.group(G::V6T2);
    Some(a)
}

/// M-profile special register names for `mrs`/`msr`.
fn mclass_sysreg(sysm: u32) -> Option<&'static str> {
    Some(match sysm {
        0 => "apsr",
        1 => "iapsr",
        2 => "eapsr",
        3 => "xpsr",
        5 => "ipsr",
        6 => "epsr",
        7 => "iepsr",
        8 => "msp",
        9 => "psp",
        16 => "primask",
        17 => "basepri",
        18 => "basepri_max",
        19 => "faultmask",
        20 => "control",
        _ => return None,
    })
}

fn branch_misc(w: u32, pc: Address, cx: &Ctx) -> Option<Asm> {
    let s = bit(w, 26) as u32;
    let (j1, j2) = (bits(w, 13, 1), bits(w, 11, 1));
    match (bit(w, 14), bit(w, 12)) {
        (false, false) if bits(w, 23, 3) != 0b111 => {
            let imm = (s << 20) | (j2 << 19) | (j1 << 18) | (bits(w, 16, 6) << 12) | (bits(w, 0, 11) << 1);
            let offset = sign_extend(imm as u64, 21);
            let mut a = Asm::new(I::B, cx);
            a.target(pc.wrapping_add(offset as u64)).group(G::JUMP).wide();
            a.cond(ArmCc::from_bits(bits(w, 22, 4))?);
            Some(a)
        }
        (false, false) => misc_control(w, cx),
        (link, b12) => {
            let i1 = !(j1 ^ s) & 1;
            let i2 = !(j2 ^ s) & 1;
            let imm = (s << 24) | (i1 << 23) | (i2 << 22) | (bits(w, 16, 10) << 12) | (bits(w, 0, 11) << 1);
            let offset = sign_extend(imm as u64, 25) as u64;
            let mut a = match (link, b12) {
                (false, _) => {
                    let mut a = Asm::new(I::B, cx);
                    a.target(pc.wrapping_add(offset)).group(G::JUMP).wide();
                    a
                }
                (true, true) => {
                    let mut a = Asm::new(I::BL, cx);
                    a.target(pc.wrapping_add(offset)).group(G::CALL);
                    a
                }
                (true, false) => {
                    if bit(w, 0) {
                        return None;
                    }
                    let mut a = Asm::new(I::BLX, cx);
                    a.target((pc & !3).wrapping_add(offset))
                        .group(G::CALL)
                        .group(G::V5T);
                    a
                }
            };
            if link {
                a.b.writes(&[R::LR]);
            }
            Some(a)
        }
    }
}

fn misc_control(w: u32, cx: &Ctx) -> Option<Asm> {
    let sysreg = |a: &mut Asm, sysm: u32, access: Access| -> Option<()> {
        let name = mclass_sysreg(sysm)?;
        a.b.push(ArmOperand::new(K::SysReg(sysm), access), name);
        Some(())
    };
    let a = match bits(w, 20, 7) {
        0b011_1000 | 0b011_1001 => {
            let mut a = Asm::new(I::MSR, cx);
            if cx.mclass {
                sysreg(&mut a, bits(w, 0, 8), Access::WRITE)?;
            } else {
                psr_field(&mut a, bit(w, 20), bits(w, 8, 4));
            }
            a.gpr(bits(w, 16, 4), Access::READ);
            a
        }
        0b011_1010 => {
            if bits(w, 8, 3) == 0 {
                let mut a = Asm::new(hint(bits(w, 0, 8))?, cx);
                a.wide();
                a
            } else {
                match bits(w, 9, 2) {
                    0b10 => cps(false, bits(w, 5, 3), cx)?,
                    0b11 => cps(true, bits(w, 5, 3), cx)?,
                    _ => return None,
                }
            }
        }
        0b011_1011 => {
            let option = bits(w, 0, 4);
            let id = match bits(w, 4, 4) {
                2 => return Some(Asm::new(I::CLREX, cx)),
                4 => I::DSB,
                5 => I::DMB,
                6 => I::ISB,
                _ => return None,
            };
            let mut a = Asm::new(id, cx);
            barrier_option(&mut a, id, option);
            a
        }
        0b011_1110 | 0b011_1111 => {
            let mut a = Asm::new(I::MRS, cx);
            a.gpr(bits(w, 8, 4), Access::WRITE);
            if cx.mclass {
                sysreg(&mut a, bits(w, 0, 8), Access::READ)?;
            } else {
                a.reg(if bit(w, 20) { R::SPSR } else { R::APSR }, Access::READ);
            }
            a
        }
        _ => return None,
    };
    Some(a)
}

/// `ldm`/`stm`/`push.w`/`pop.w`.
fn multiple(w: u32, cx: &Ctx) -> Option<Asm> {
    let (wb, load) = (bit(w, 21), bit(w, 20));
    let rn = bits(w, 16, 4);
    let list = bits(w, 0, 16);
    let id = match (bits(w, 23, 2), load) {
        (0b01, false) => I::STM,
        (0b01, true) => I::LDM,
        (0b10, false) => I::STMDB,
        (0b10, true) => I::LDMDB,
        _ => return None,
    };
    if list.count_ones() < 2 {
        return None;
    }
    let stack = rn == 13 && wb && matches!(id, I::LDM | I::STMDB);
    let mut a = if stack {
        Asm::new(if load { I::POP } else { I::PUSH }, cx)
    } else {
        let mut a = Asm::new(id, cx);
        let name = a.name(R::gpr(rn));
        a.b.push(
            ArmOperand::reg(R::gpr(rn), Access::READ),
            if wb { format!("{}!", name) } else { name },
        );
        a
    };
    if stack || matches!(id, I::LDM | I::STM) {
        a.wide();
    }
    if wb {
        a.writeback(R::gpr(rn));
    }
    a.reglist(list, if load { Access::WRITE } else { Access::READ });
    if load && list & (1 << 15) != 0 {
        pc_write(&mut a, rn == 13);
    }
    Some(a)
}

/// `ldrd`/`strd`, `ldrex`/`strex` and the table branches.
fn dual_exclusive(w: u32, cx: &Ctx) -> Option<Asm> {
    let (p, u, wb, l) = (bit(w, 24), bit(w, 23), bit(w, 21), bit(w, 20));
    let rn = R::gpr(bits(w, 16, 4));
    let (rt, rt2) = (bits(w, 12, 4), bits(w, 8, 4));
    let imm8 = bits(w, 0, 8);
    if p || wb {
        let (rt_access, mem_access) = if l {
            (Access::WRITE, Access::READ)
        } else {
            (Access::READ, Access::WRITE)
        };
        let mut a = Asm::new(if l { I::LDRD } else { I::STRD }, cx);
        a.gpr(rt, rt_access)
            .gpr(rt2, rt_access)
            .mem_imm(rn, u, imm8 * 4, Index::from_pw(p, wb), mem_access);
        return Some(a);
    }
    let a = match (bits(w, 23, 2), bits(w, 20, 2)) {
        (0b00, 0b00) => {
            let mut a = Asm::new(I::STREX, cx);
            a.gpr(rt2, Access::WRITE)
                .gpr(rt, Access::READ)
                .mem_imm(rn, true, imm8 * 4, Index::Offset, Access::WRITE);
            a
        }
        (0b00, 0b01) => {
            let mut a = Asm::new(I::LDREX, cx);
            a.gpr(rt, Access::WRITE)
                .mem_imm(rn, true, imm8 * 4, Index::Offset, Access::READ);
            a
        }
        (0b01, 0b01) => {
            let half = match bits(w, 4, 4) {
                0 => false,
                1 => true,
                _ => return None,
            };
            let mut a = Asm::new(if half { I::TBH } else { I::TBB }, cx);
            a.mem_reg(
                rn,
                R::gpr(bits(w, 0, 4)),
                true,
                half.then_some(ArmShift::Lsl(1)),
                Index::Offset,
                Access::READ,
            );
            a.group(G::JUMP);
            a
        }
        _ => return None,
    };
    Some(a)
}

/// Single loads and stores: `imm12`, `imm8` indexed, register and literal.
fn single(w: u32, load: bool, cx: &Ctx) -> Option<Asm> {
    let size = bits(w, 21, 2);
    let signed = bit(w, 24);
    let (rn, rt) = (bits(w, 16, 4), bits(w, 12, 4));
    let id = match (load, size, signed) {
        (false, 0, false) => I::STRB,
        (false, 1, false) => I::STRH,
        (false, 2, false) => I::STR,
        (true, 0, false) => I::LDRB,
        (true, 1, false) => I::LDRH,
        (true, 2, false) => I::LDR,
        (true, 0, true) => I::LDRSB,
        (true, 1, true) => I::LDRSH,
        _ => return None,
    };
    // preload hints share the byte and halfword slots
    if load && rt == 15 && size != 2 {
        return None;
    }
    let (rt_access, mem_access) = if load {
        (Access::WRITE, Access::READ)
    } else {
        (Access::READ, Access::WRITE)
    };
    let mut a = Asm::new(id, cx);
    a.gpr(rt, rt_access);
    if rn == 15 {
        if !load {
            return None;
        }
        a.mem_imm(R::PC, bit(w, 23), bits(w, 0, 12), Index::Offset, mem_access)
            .wide();
    } else if bit(w, 23) {
        a.mem_imm(R::gpr(rn), true, bits(w, 0, 12), Index::Offset, mem_access)
            .wide();
    } else if bit(w, 11) {
        let (p, u, wb) = (bit(w, 10), bit(w, 9), bit(w, 8));
        if (p && u && !wb) || (!p && !wb) {
            return None;
        }
        a.mem_imm(R::gpr(rn), u, bits(w, 0, 8), Index::from_pw(p, wb), mem_access);
    } else if bits(w, 6, 6) == 0 {
        let shift = match bits(w, 4, 2) {
            0 => None,
            n => Some(ArmShift::Lsl(n)),
        };
        a.mem_reg(
            R::gpr(rn),
            R::gpr(bits(w, 0, 4)),
            true,
            shift,
            Index::Offset,
            mem_access,
        )
        .wide();
    } else {
        return None;
    }
    if load && rt == 15 {
        pc_write(&mut a, false);
    }
    Some(a)
}

/// Register shifts, extends, byte reverses and `clz`.
fn dp_register(w: u32, cx: &Ctx) -> Option<Asm> {
    if bits(w, 12, 4) != 0b1111 {
        return None;
    }
    let (op1, op2) = (bits(w, 20, 4), bits(w, 4, 4));
    let (rn, rd, rm) = (bits(w, 16, 4), bits(w, 8, 4), bits(w, 0, 4));
    let mut a = if op1 & 0b1000 == 0 && op2 == 0 {
        let id = [I::LSL, I::LSR, I::ASR, I::ROR][bits(w, 21, 2) as usize];
        let mut a = Asm::new(id, cx);
        if bit(w, 20) {
            a.set_flags();
        }
        a.gpr(rd, Access::WRITE)
            .gpr(rn, Access::READ)
            .gpr(rm, Access::READ)
            .wide();
        a
    } else if op1 & 0b1000 == 0 && op2 & 0b1000 != 0 {
        let id = match op1 {
            0b0000 => I::SXTH,
            0b0001 => I::UXTH,
            0b0100 => I::SXTB,
            0b0101 => I::UXTB,
            _ => return None,
        };
        if rn != 15 {
            return None;
        }
        let rot = bits(w, 4, 2) * 8;
        let mut a = Asm::new(id, cx);
        a.gpr(rd, Access::WRITE)
            .shifted(rm, (rot != 0).then_some(ArmShift::Ror(rot)))
            .wide();
        a
    } else if op1 & 0b1100 == 0b1000 && op2 & 0b1100 == 0b1000 {
        let (id, wide) = match (bits(w, 20, 2), bits(w, 4, 2)) {
            (1, 0) => (I::REV, true),
            (1, 1) => (I::REV16, true),
            (1, 2) => (I::RBIT, false),
            (1, 3) => (I::REVSH, true),
            (3, 0) => (I::CLZ, false),
            _ => return None,
        };
        let mut a = Asm::new(id, cx);
        a.gpr(rd, Access::WRITE).gpr(rm, Access::READ);
        if wide {
            a.wide();
        }
        a
    } else {
        return None;
    };
    a.group(G::V6T2);
    Some(a)
}

fn multiply(w: u32, cx: &Ctx) -> Option<Asm> {
    let (rn, ra, rd, rm) = (bits(w, 16, 4), bits(w, 12, 4), bits(w, 8, 4), bits(w, 0, 4));
    let id = match (bits(w, 20, 3), bits(w, 4, 2)) {
        (0, 0) if ra == 15 => I::MUL,
        (0, 0) => I::MLA,
        (0, 1) => I::MLS,
        _ => return None,
    };
    let mut a = Asm::new(id, cx);
    a.gpr(rd, Access::WRITE)
        .gpr(rn, Access::READ)
        .gpr(rm, Access::READ)
        .group(G::MULOPS);
    if id != I::MUL {
        a.gpr(ra, Access::READ);
    }
    Some(a)
}

fn long_multiply(w: u32, cx: &Ctx) -> Option<Asm> {
    let (rn, lo, hi, rm) = (bits(w, 16, 4), bits(w, 12, 4), bits(w, 8, 4), bits(w, 0, 4));
    let (id, acc) = match (bits(w, 20, 3), bits(w, 4, 4)) {
        (0b000, 0) => (I::SMULL, Access::WRITE),
        (0b010, 0) => (I::UMULL, Access::WRITE),
        (0b100, 0) => (I::SMLAL, Access::READ_WRITE),
        (0b110, 0) => (I::UMLAL, Access::READ_WRITE),
        (0b001, 0b1111) | (0b011, 0b1111) if lo == 15 => {
            let id = if bit(w, 21) { I::UDIV } else { I::SDIV };
            let mut a = Asm::new(id, cx);
            a.gpr(hi, Access::WRITE)
                .gpr(rn, Access::READ)
                .gpr(rm, Access::READ)
                .group(G::DIVIDE);
            return Some(a);
        }
        _ => return None,
    };
    let mut a = Asm::new(id, cx);
    a.gpr(lo, acc)
        .gpr(hi, acc)
        .gpr(rn, Access::READ)
        .gpr(rm, Access::READ)
        .group(G::MULOPS);
    Some(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cx() -> Ctx {
        Ctx {
            numeric: false,
            mclass: false,
        }
    }

    fn text_with(halves: &[u16], cx: &Ctx) -> Option<String> {
        let code: Vec<u8> = halves.iter().flat_map(|h| h.to_le_bytes()).collect();
        let mut it = 0;
        let (a, size) = decode(&code, 0x1000, false, cx, &mut it)?;
        assert_eq!(size, halves.len() * 2);
        let d = a.finish(size, false);
        Some(if d.op_str.is_empty() {
            d.mnemonic
        } else {
            format!("{} {}", d.mnemonic, d.op_str)
        })
    }

    fn text(halves: &[u16]) -> Option<String> {
        text_with(halves, &cx())
    }

    #[rstest]
    #[case(0x2001, "movs r0, #1")]
    #[case(0x1c48, "adds r0, r1, #1")]
    #[case(0x1888, "adds r0, r1, r2")]
    #[case(0x0088, "lsls r0, r1, #2")]
    #[case(0x0008, "movs r0, r1")]
    #[case(0x2800, "cmp r0, #0")]
    #[case(0x4008, "ands r0, r1")]
    #[case(0x4348, "muls r0, r1, r0")]
    #[case(0x4248, "rsbs r0, r1, #0")]
    #[case(0x4770, "bx lr")]
    #[case(0x4798, "blx r3")]
    #[case(0x4640, "mov r0, r8")]
    #[case(0x4801, "ldr r0, [pc, #4]")]
    #[case(0x5888, "ldr r0, [r1, r2]")]
    #[case(0x6848, "ldr r0, [r1, #4]")]
    #[case(0x9001, "str r0, [sp, #4]")]
    #[case(0xb082, "sub sp, #8")]
    #[case(0xb002, "add sp, #8")]
    #[case(0xa801, "add r0, sp, #4")]
    #[case(0xb2c8, "uxtb r0, r1")]
    #[case(0xbd80, "pop {r7, pc}")]
    #[case(0xba08, "rev r0, r1")]
    #[case(0xbf00, "nop")]
    #[case(0xbf30, "wfi")]
    #[case(0xb672, "cpsid i")]
    #[case(0xbe01, "bkpt #1")]
    #[case(0xc103, "stm r1!, {r0, r1}")]
    #[case(0xc803, "ldm r0, {r0, r1}")]
    #[case(0xd0fe, "beq #0x1000")]
    #[case(0xe7fe, "b #0x1000")]
    #[case(0xdf00, "svc #0")]
    #[case(0xb108, "cbz r0, #0x1006")]
    #[case(0xbf18, "it ne")]
    fn test_thumb16_encodings(#[case] half: u16, #[case] expected: &str) {
        assert_eq!(text(&[half]).as_deref(), Some(expected));
    }

    #[rstest]
    #[case(0xe92d, 0x41f0, "push.w {r4, r5, r6, r7, r8, lr}")]
    #[case(0xe8bd, 0x81f0, "pop.w {r4, r5, r6, r7, r8, pc}")]
    #[case(0xf44f, 0x7080, "mov.w r0, #0x100")]
    #[case(0xf101, 0x0001, "add.w r0, r1, #1")]
    #[case(0xf1b0, 0x0f01, "cmp.w r0, #1")]
    #[case(0xf601, 0x70ff, "addw r0, r1, #0xfff")]
    #[case(0xf241, 0x2034, "movw r0, #0x1234")]
    #[case(0xf3c1, 0x1007, "ubfx r0, r1, #4, #8")]
    #[case(0xea4f, 0x0081, "lsl.w r0, r1, #2")]
    #[case(0xeb01, 0x0082, "add.w r0, r1, r2, lsl #2")]
    #[case(0xf8d1, 0x0100, "ldr.w r0, [r1, #0x100]")]
    #[case(0xf851, 0x0c04, "ldr r0, [r1, #-4]")]
    #[case(0xf851, 0x0b04, "ldr r0, [r1], #4")]
    #[case(0xf841, 0x0022, "str.w r0, [r1, r2, lsl #2]")]
    #[case(0xe9dd, 0x0102, "ldrd r0, r1, [sp, #8]")]
    #[case(0xe8df, 0xf000, "tbb [pc, r0]")]
    #[case(0xf000, 0xb800, "b.w #0x1004")]
    #[case(0xf000, 0x8000, "beq.w #0x1004")]
    #[case(0xf3bf, 0x8f5b, "dmb ish")]
    #[case(0xf3ef, 0x8000, "mrs r0, apsr")]
    #[case(0xf380, 0x8800, "msr apsr_nzcvq, r0")]
    #[case(0xfa5f, 0xf081, "uxtb.w r0, r1")]
    #[case(0xfa01, 0xf002, "lsl.w r0, r1, r2")]
    #[case(0xfb01, 0xf002, "mul r0, r1, r2")]
    #[case(0xfb91, 0xf0f2, "sdiv r0, r1, r2")]
    #[case(0xfba2, 0x0103, "umull r0, r1, r2, r3")]
    #[case(0xee30, 0x0a01, "vadd.f32 s0, s0, s2")]
    fn test_thumb32_encodings(#[case] hw1: u16, #[case] hw2: u16, #[case] expected: &str) {
        assert_eq!(text(&[hw1, hw2]).as_deref(), Some(expected));
    }

    #[test]
    fn test_mclass_special_registers() {
        let cx = Ctx {
            numeric: false,
            mclass: true,
        };
        assert_eq!(
            text_with(&[0xf3ef, 0x8010], &cx).as_deref(),
            Some("mrs r0, primask")
        );
        assert_eq!(
            text_with(&[0xf380, 0x8814], &cx).as_deref(),
            Some("msr control, r0")
        );
    }

    #[test]
    fn test_truncated_wide_instruction() {
        let mut it = 0;
        assert!(decode(&[0x2d, 0xe9], 0, false, &cx(), &mut it).is_none());
    }

    #[test]
    fn test_it_state_machine() {
        // itte eq
        let mut it = 0;
        decode(&0xbf06u16.to_le_bytes(), 0, false, &cx(), &mut it).unwrap();
        assert_eq!(it, 0x06);
        let conds: Vec<ArmCc> = (0..3)
            .map(|_| {
                let (a, _) = decode(&0x2001u16.to_le_bytes(), 0, false, &cx(), &mut it).unwrap();
                a.cc
            })
            .collect();
        assert_eq!(conds, vec![ArmCc::EQ, ArmCc::EQ, ArmCc::NE]);
        assert_eq!(it, 0);
    }

    #[test]
    fn test_it_mnemonics() {
        assert_eq!(text(&[0xbf0c]).as_deref(), Some("ite eq"));
        assert_eq!(text(&[0xbf04]).as_deref(), Some("itt eq"));
        assert_eq!(text(&[0xbf1e]).as_deref(), Some("ittt ne"));
    }

    #[test]
    fn test_thumb_expand_imm() {
        assert_eq!(thumb_expand_imm(0x0ab), Some(0xab));
        assert_eq!(thumb_expand_imm(0x1ab), Some(0x00ab_00ab));
        assert_eq!(thumb_expand_imm(0x2ab), Some(0xab00_ab00));
        assert_eq!(thumb_expand_imm(0x3ab), Some(0xabab_abab));
        assert_eq!(thumb_expand_imm(0x100), None);
        assert_eq!(thumb_expand_imm(0xf80), Some(0x100));
    }
}
