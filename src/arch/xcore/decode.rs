//! XCore halfword decoding.
//!
//! Register operands of the 3r and 2r families are packed: a 5-bit
//! "combined" field holds the high parts of all register numbers in base
//! 3, the low two bits of each sit below it.

use super::{XcoreGroup as G, XcoreInsn as I, XcoreOperand, XcoreReg as R};
use crate::arch::{bit, bits, fmt_uimm, read_u16, InsnBuilder};
use crate::insn::Access;
use crate::table::IdTable;

type B = InsnBuilder<I, XcoreOperand>;

/// Bit-position immediates of the `bitp` operand kind.
const BITP: [u32; 12] = [32, 1, 2, 3, 4, 5, 6, 7, 8, 16, 24, 32];

/// Prefix halfword opcode (`pfix`).
const PFIX: u32 = 0x3c;
/// Top five bits of a long-opcode first halfword.
const LONG: u32 = 0x1f;

impl InsnBuilder<I, XcoreOperand> {
    fn reg(&mut self, reg: R, access: Access) -> &mut Self {
        self.push(XcoreOperand::reg(reg, access), reg.name())
    }

    fn r(&mut self, n: u32, access: Access) -> &mut Self {
        self.reg(R::from_field(n), access)
    }

    fn uimm(&mut self, value: u64) -> &mut Self {
        self.push(XcoreOperand::imm(value as i64), fmt_uimm(value))
    }

    /// A branch offset in halfwords, printed as `-n` when backward.
    fn offset(&mut self, imm: u32, backward: bool) -> &mut Self {
        let (value, text) = if backward {
            (-(imm as i64), format!("-{}", fmt_uimm(imm as u64)))
        } else {
            (imm as i64, fmt_uimm(imm as u64))
        };
        self.push(XcoreOperand::imm(value), text)
    }

    /// `res[rN]` or `t[rN]`: a resource or thread named by a register.
    fn resource(&mut self, kind: &str, n: u32) -> &mut Self {
        let reg = R::from_field(n);
        self.push(
            XcoreOperand::reg(reg, Access::READ),
            format!("{}[{}]", kind, reg.name()),
        )
    }

    /// `base[disp]`.
    fn mem_disp(&mut self, base: R, disp: u32) -> &mut Self {
        self.push(
            XcoreOperand::Mem {
                base,
                index: R::INVALID,
                disp: disp as i32,
                direct: 1,
            },
            format!("{}[{}]", base.name(), fmt_uimm(disp as u64)),
        )
    }

    /// `base[index]`, or `base[-index]` when `forward` is false.
    fn mem_index(&mut self, base: u32, index: u32, forward: bool) -> &mut Self {
        let (base, index) = (R::from_field(base), R::from_field(index));
        let sign = if forward { "" } else { "-" };
        self.push(
            XcoreOperand::Mem {
                base,
                index,
                disp: 0,
                direct: if forward { 1 } else { -1 },
            },
            format!("{}[{}{}]", base.name(), sign, index.name()),
        )
    }
}

/// Decode one instruction; returns it with its size in bytes.
pub(super) fn decode(code: &[u8]) -> Option<(B, usize)> {
    let first = read_u16(code, false)? as u32;
    match bits(first, 11, 5) {
        LONG => {
            let second = read_u16(code.get(2..)?, false)? as u32;
            long(first, second).map(|b| (b, 4))
        }
        _ if bits(first, 10, 6) == PFIX => {
            let second = read_u16(code.get(2..)?, false)? as u32;
            let prefix = bits(first, 0, 10);
            immediate(bits(second, 10, 6), bits(second, 0, 10), Some(prefix)).map(|b| (b, 4))
        }
        0x0a..=0x0f | 0x1a..=0x1d => {
            immediate(bits(first, 10, 6), bits(first, 0, 10), None).map(|b| (b, 2))
        }
        0x1e => None,
        _ => register(first).map(|b| (b, 2)),
    }
}

/// Three packed register fields (3r, 2rus).
fn three(w: u32) -> (u32, u32, u32) {
    let combined = bits(w, 6, 5);
    (
        (combined % 3) << 2 | bits(w, 4, 2),
        ((combined / 3) % 3) << 2 | bits(w, 2, 2),
        (combined / 9) << 2 | bits(w, 0, 2),
    )
}

/// Two packed register fields (2r, rus).
fn two(w: u32) -> Option<(u32, u32)> {
    let mut combined = bits(w, 6, 5);
    if bit(w, 5) {
        if combined == 31 {
            return None;
        }
        combined += 5;
    }
    let combined = combined.checked_sub(27)?;
    Some((
        (combined % 3) << 2 | bits(w, 2, 2),
        (combined / 3) << 2 | bits(w, 0, 2),
    ))
}

fn register(w: u32) -> Option<B> {
    let opc = bits(w, 11, 5);
    if bits(w, 6, 5) < 27 {
        let (a, b, c) = three(w);
        return three_register(opc, a, b, c);
    }
    if bits(w, 5, 6) == 0x3f {
        // general registers stop at r11; the upper four encode 0r forms
        let n = bits(w, 0, 4);
        return if n < 12 {
            one_register(opc << 1 | bits(w, 4, 1), n)
        } else {
            no_operand(opc << 5 | bits(w, 0, 5))
        };
    }
    let (a, b) = two(w)?;
    two_register(opc << 1 | bits(w, 4, 1), a, b)
}

fn three_register(opc: u32, a: u32, b: u32, c: u32) -> Option<B> {
    let arith = |id| {
        let mut ins = B::new(id);
        ins.r(a, Access::WRITE).r(b, Access::READ).r(c, Access::READ);
        ins
    };
    let with_imm = |id, imm: u32| {
        let mut ins = B::new(id);
        ins.r(a, Access::WRITE).r(b, Access::READ).uimm(imm as u64);
        ins
    };
    let load = |id| {
        let mut ins = B::new(id);
        ins.r(a, Access::WRITE).mem_index(b, c, true);
        ins
    };
    let ins = match opc {
        0x00 | 0x01 => {
            let (id, access) = if opc == 0 {
                (I::STW, Access::READ)
            } else {
                (I::LDW, Access::WRITE)
            };
            let mut ins = B::new(id);
            ins.r(a, access).mem_disp(R::from_field(b), c);
            ins
        }
        0x02 => arith(I::ADD),
        0x03 => arith(I::SUB),
        0x04 => arith(I::SHL),
        0x05 => arith(I::SHR),
        0x06 => arith(I::EQ),
        0x07 => arith(I::AND),
        0x08 => arith(I::OR),
        0x09 => load(I::LDW),
        0x10 => load(I::LD16S),
        0x11 => load(I::LD8U),
        0x12 => with_imm(I::ADD, c),
        0x13 => with_imm(I::SUB, c),
        0x14 => with_imm(I::SHL, BITP[c as usize]),
        0x15 => with_imm(I::SHR, BITP[c as usize]),
        0x16 => with_imm(I::EQ, c),
        0x17 => {
            let (dst, thread) = (R::from_field(a), R::from_field(c));
            let mut ins = B::new(I::SET);
            ins.push(
                XcoreOperand::reg(dst, Access::WRITE),
                format!("t[{}]:{}", thread.name(), dst.name()),
            )
            .r(b, Access::READ)
            .push_op(XcoreOperand::reg(thread, Access::READ));
            ins
        }
        0x18 => arith(I::LSS),
        0x19 => arith(I::LSU),
        _ => return None,
    };
    Some(ins)
}

fn two_register(opc: u32, a: u32, b: u32) -> Option<B> {
    let unary = |id, access| {
        let mut ins = B::new(id);
        ins.r(a, access).r(b, Access::READ);
        ins
    };
    let bitp = |id| {
        let mut ins = B::new(id);
        ins.r(a, Access::READ_WRITE).uimm(BITP[b as usize] as u64);
        ins
    };
    // `res[r], s`
    let to_resource = |id, res: u32, src: u32, access| {
        let mut ins = B::new(id);
        ins.resource("res", res).r(src, access);
        ins
    };
    // `d, res[r]`
    let from_resource = |id, access| {
        let mut ins = B::new(id);
        ins.r(a, access).resource("res", b);
        ins
    };
    let resource_imm = |id| {
        let mut ins = B::new(id);
        ins.resource("res", a).uimm(b as u64);
        ins
    };
    // `init t[t]:slot, s`, thread in the second field
    let init = |slot: &str| {
        let thread = R::from_field(b);
        let mut ins = B::new(I::INIT);
        ins.push(
            XcoreOperand::reg(thread, Access::READ),
            format!("t[{}]:{}", thread.name(), slot),
        )
        .r(a, Access::READ);
        ins
    };
    let ins = match opc {
        0x00 => init("pc"),
        0x01 => from_resource(I::GETST, Access::WRITE),
        0x02 => init("dp"),
        0x03 => to_resource(I::OUTT, b, a, Access::READ),
        0x04 => init("sp"),
        0x05 => to_resource(I::SETD, b, a, Access::READ),
        0x06 => init("cp"),
        0x09 => from_resource(I::EET, Access::READ),
        0x0a => unary(I::ANDNOT, Access::READ_WRITE),
        0x0b => from_resource(I::EEF, Access::READ),
        0x0c => unary(I::SEXT, Access::READ_WRITE),
        0x0d => bitp(I::SEXT),
        0x0e => from_resource(I::GETTS, Access::WRITE),
        0x0f => to_resource(I::SETPT, b, a, Access::READ),
        0x10 => unary(I::ZEXT, Access::READ_WRITE),
        0x11 => bitp(I::ZEXT),
        0x12 => to_resource(I::OUTCT, a, b, Access::READ),
        0x13 => resource_imm(I::OUTCT),
        0x20 => {
            let mut ins = B::new(I::GETR);
            ins.r(a, Access::WRITE).uimm(b as u64);
            ins
        }
        0x21 => from_resource(I::INCT, Access::WRITE),
        0x22 => unary(I::NOT, Access::WRITE),
        0x23 => from_resource(I::INT, Access::WRITE),
        0x24 => unary(I::NEG, Access::WRITE),
        0x25 => from_resource(I::ENDIN, Access::WRITE),
        0x28 => unary(I::MKMSK, Access::WRITE),
        0x29 => {
            let mut ins = B::new(I::MKMSK);
            ins.r(a, Access::WRITE).uimm(BITP[b as usize] as u64);
            ins
        }
        0x2a => to_resource(I::OUT, b, a, Access::READ),
        0x2b => to_resource(I::OUTSHR, a, b, Access::READ_WRITE),
        0x2c => from_resource(I::IN, Access::WRITE),
        0x2d => from_resource(I::INSHR, Access::READ_WRITE),
        0x2e => from_resource(I::PEEK, Access::WRITE),
        0x2f => from_resource(I::TESTCT, Access::WRITE),
        0x30 => to_resource(I::SETPSC, b, a, Access::READ),
        0x31 => from_resource(I::TESTWCT, Access::WRITE),
        0x32 => to_resource(I::CHKCT, a, b, Access::READ),
        0x33 => resource_imm(I::CHKCT),
        _ => return None,
    };
    Some(ins)
}

fn one_register(opc: u32, n: u32) -> Option<B> {
    let reg = R::from_field(n);
    let resource = |id| {
        let mut ins = B::new(id);
        ins.resource("res", n);
        ins
    };
    let plain = |id| {
        let mut ins = B::new(id);
        ins.reg(reg, Access::READ);
        ins
    };
    let set = |target: R| {
        let mut ins = B::new(I::SET);
        ins.push_text(target.name())
            .reg(reg, Access::READ)
            .writes(&[target]);
        ins
    };
    // `setv`/`setev` take the vector from r11
    let vector = |id| {
        let mut ins = resource(id);
        ins.reg(R::R11, Access::READ);
        ins
    };
    let ins = match opc {
        0x00 => resource(I::EDU),
        0x01 => resource(I::EEU),
        0x02 => plain(I::WAITET),
        0x03 => plain(I::WAITEF),
        0x04 => resource(I::FREER),
        0x05 => resource(I::MJOIN),
        0x06 => {
            let mut ins = B::new(I::START);
            ins.resource("t", n);
            ins
        }
        0x07 => resource(I::MSYNC),
        0x08 => {
            let mut ins = plain(I::BLA);
            ins.writes(&[R::LR]).group(G::CALL);
            ins
        }
        0x09 => {
            let mut ins = plain(I::BAU);
            ins.group(G::JUMP);
            ins
        }
        0x0a => {
            let mut ins = plain(I::BRU);
            ins.group(G::JUMP).group(G::BRANCH_RELATIVE);
            ins
        }
        0x0b => set(R::SP),
        0x0c => set(R::DP),
        0x0d => set(R::CP),
        0x0e => {
            let mut ins = B::new(I::DGETREG);
            ins.reg(reg, Access::WRITE);
            ins
        }
        0x0f => vector(I::SETEV),
        0x10 => {
            let mut ins = plain(I::KCALL);
            ins.group(G::INT);
            ins
        }
        0x11 => vector(I::SETV),
        0x12 => {
            let mut ins = plain(I::ECALLF);
            ins.group(G::INT);
            ins
        }
        0x13 => {
            let mut ins = plain(I::ECALLT);
            ins.group(G::INT);
            ins
        }
        0x20 => resource(I::CLRPT),
        0x21 => resource(I::SYNCR),
        _ => return None,
    };
    Some(ins)
}

fn no_operand(opc: u32) -> Option<B> {
    let get = |src: R| {
        let mut ins = B::new(I::GET);
        ins.reg(R::R11, Access::WRITE).push_text(src.name()).reads(&[src]);
        ins
    };
    // `ldw`/`stw` of a saved-state register at a fixed stack slot.
    let spill = |id, reg: R, slot: u32| {
        let access = if id == I::LDW { Access::WRITE } else { Access::READ };
        let mut ins = B::new(id);
        ins.reg(reg, access).mem_disp(R::SP, slot);
        ins
    };
    let ins = match opc {
        0x0c => B::new(I::WAITEU),
        0x0d => B::new(I::CLRE),
        0x0e => B::new(I::SSYNC),
        0x0f => B::new(I::FREET),
        0x1c => {
            let mut ins = B::new(I::DCALL);
            ins.group(G::INT);
            ins
        }
        0x1d | 0x1e => {
            let mut ins = B::new(if opc == 0x1d { I::KRET } else { I::DRET });
            ins.group(G::IRET);
            ins
        }
        0x1f => {
            let mut ins = B::new(I::SET);
            ins.push_text("kep")
                .reg(R::R11, Access::READ)
                .writes(&[R::KEP]);
            ins
        }
        0x2c => spill(I::LDW, R::SPC, 1),
        0x2d => spill(I::STW, R::SPC, 1),
        0x2e => spill(I::LDW, R::SSR, 2),
        0x2f => spill(I::STW, R::SSR, 2),
        0x3c => spill(I::STW, R::SED, 3),
        0x3d => spill(I::STW, R::ET, 4),
        0x3e => get(R::ED),
        0x3f => get(R::ET),
        0x4c | 0x4d => {
            let mut ins = B::new(if opc == 0x4c { I::DENTSP } else { I::DRESTSP });
            ins.reads(&[R::SP]).writes(&[R::SP]);
            ins
        }
        0x4e => get(R::ID),
        0x4f => get(R::KEP),
        0x5c => get(R::KSP),
        0x5d => spill(I::LDW, R::SED, 3),
        0x5e => spill(I::LDW, R::ET, 4),
        _ => return None,
    };
    Some(ins)
}

/// The ru6, u6 and u10 families, optionally widened by a `pfix` prefix.
/// Branch operands are halfword offsets from the next instruction; the
/// backward forms print them negated.
fn immediate(opc: u32, low: u32, prefix: Option<u32>) -> Option<B> {
    let reg = bits(low, 6, 4);
    let (u6, u10) = match prefix {
        Some(p) => (p << 6 | bits(low, 0, 6), p << 10 | low),
        None => (bits(low, 0, 6), low),
    };

    let slot = |id, base: R, access| {
        let mut ins = B::new(id);
        ins.r(reg, access).mem_disp(base, u6).reads(&[base]);
        ins
    };
    let branch = |id, backward| {
        let mut ins = B::new(id);
        ins.r(reg, Access::READ)
            .offset(u6, backward)
            .group(G::JUMP)
            .group(G::BRANCH_RELATIVE);
        ins
    };
    let ins = match opc {
        // data-pointer, stack and constant-pool slots take any register
        0x14 => slot(I::STW, R::DP, Access::READ),
        0x15 => slot(I::STW, R::SP, Access::READ),
        0x16 => slot(I::LDW, R::DP, Access::WRITE),
        0x17 => slot(I::LDW, R::SP, Access::WRITE),
        0x18 => slot(I::LDAW, R::DP, Access::WRITE),
        0x19 => slot(I::LDAW, R::SP, Access::WRITE),
        0x1a => {
            let mut ins = B::new(I::LDC);
            ins.r(reg, Access::WRITE).uimm(u6 as u64);
            ins
        }
        0x1b => slot(I::LDW, R::CP, Access::WRITE),
        0x1c..=0x1f | 0x3a if reg < 12 => match opc {
            0x1c => branch(I::BT, false),
            0x1d => branch(I::BT, true),
            0x1e => branch(I::BF, false),
            0x1f => branch(I::BF, true),
            _ => {
                let mut ins = B::new(I::SETC);
                ins.resource("res", reg).uimm(u6 as u64);
                ins
            }
        },
        0x1c..=0x1f => short_immediate(opc, reg, u6)?,
        0x34 | 0x35 => {
            let mut ins = B::new(I::BL);
            ins.offset(u10, opc == 0x35)
                .writes(&[R::LR])
                .group(G::CALL)
                .group(G::BRANCH_RELATIVE);
            ins
        }
        0x36 | 0x37 => {
            let mut ins = B::new(I::LDAP);
            ins.reg(R::R11, Access::WRITE).offset(u10, opc == 0x37);
            ins
        }
        0x38 => {
            let mut ins = B::new(I::BLA);
            ins.mem_disp(R::CP, u10)
                .reads(&[R::CP])
                .writes(&[R::LR])
                .group(G::CALL);
            ins
        }
        0x39 => {
            let mut ins = B::new(I::LDW);
            ins.reg(R::R11, Access::WRITE)
                .mem_disp(R::CP, u10)
                .reads(&[R::CP]);
            ins
        }
        _ => return None,
    };
    Some(ins)
}

/// u6 forms living in the ru6 slots whose register field is 12..15.
fn short_immediate(opc: u32, reg: u32, u6: u32) -> Option<B> {
    let plain = |id| {
        let mut ins = B::new(id);
        ins.uimm(u6 as u64);
        ins
    };
    let stack = |id| {
        let mut ins = plain(id);
        ins.reads(&[R::SP]).writes(&[R::SP]);
        ins
    };
    let ins = match (opc, reg) {
        (0x1c, 12) | (0x1d, 12) => {
            let mut ins = B::new(I::BU);
            ins.offset(u6, opc == 0x1d)
                .group(G::JUMP)
                .group(G::BRANCH_RELATIVE);
            ins
        }
        (0x1c, 13) => {
            let mut ins = plain(I::BLAT);
            ins.reads(&[R::R11]).writes(&[R::LR]).group(G::CALL);
            ins
        }
        (0x1c, 14) => {
            let mut ins = plain(I::EXTDP);
            ins.reads(&[R::DP]).writes(&[R::DP]);
            ins
        }
        (0x1c, 15) => {
            let mut ins = plain(I::KCALL);
            ins.group(G::INT);
            ins
        }
        (0x1d, 13) => {
            let mut ins = stack(I::ENTSP);
            ins.reads(&[R::LR]);
            ins
        }
        (0x1d, 14) => stack(I::EXTSP),
        (0x1d, 15) => {
            let mut ins = stack(I::RETSP);
            ins.writes(&[R::LR]).group(G::RET);
            ins
        }
        (0x1e, 12) => plain(I::CLRSR),
        (0x1e, 13) => plain(I::SETSR),
        (0x1e, 14) => stack(I::KENTSP),
        (0x1e, 15) => stack(I::KRESTSP),
        (0x1f, 12) => {
            let mut ins = B::new(I::GETSR);
            ins.reg(R::R11, Access::WRITE).uimm(u6 as u64);
            ins
        }
        (0x1f, 13) => {
            let mut ins = B::new(I::LDAW);
            ins.reg(R::R11, Access::WRITE)
                .mem_disp(R::CP, u6)
                .reads(&[R::CP]);
            ins
        }
        _ => return None,
    };
    Some(ins)
}

/// 32-bit forms whose first halfword starts with `11111`. The packed
/// operands sit in the first halfword; the second carries the opcode,
/// marked by `1111110` in bits 4..10, or three more packed registers
/// for `lmul`.
fn long(first: u32, second: u32) -> Option<B> {
    if bits(second, 4, 7) != 0b111_1110 {
        return six_register(first, second);
    }
    // low opcode nibbles below 12 belong to the four-register forms
    if bits(second, 0, 4) < 12 {
        return None;
    }
    let opc = bits(second, 11, 5) << 4 | bits(second, 0, 4);
    if bits(first, 6, 5) < 27 {
        let (a, b, c) = three(first);
        return long_three(opc, a, b, c);
    }
    let (a, b) = two(first)?;
    let id = match (opc, bit(first, 4)) {
        (0x0c, false) => I::BITREV,
        (0x0c, true) => I::BYTEREV,
        (0x1c, false) => I::CLZ,
        (0x2c, false) => {
            // `init t[t]:lr, s`, thread in the second field
            let thread = R::from_field(b);
            let mut ins = B::new(I::INIT);
            ins.push(
                XcoreOperand::reg(thread, Access::READ),
                format!("t[{}]:lr", thread.name()),
            )
            .r(a, Access::READ);
            return Some(ins);
        }
        _ => return None,
    };
    let mut ins = B::new(id);
    ins.r(a, Access::WRITE).r(b, Access::READ);
    Some(ins)
}

/// `lmul d, e, x, y, v, w`: three registers packed in each halfword.
fn six_register(first: u32, second: u32) -> Option<B> {
    if bits(second, 11, 5) != 0 || bits(first, 6, 5) >= 27 || bits(second, 6, 5) >= 27 {
        return None;
    }
    let (a, b, c) = three(first);
    let (d, e, f) = three(second);
    let mut ins = B::new(I::LMUL);
    ins.r(a, Access::WRITE)
        .r(d, Access::WRITE)
        .r(b, Access::READ)
        .r(c, Access::READ)
        .r(e, Access::READ)
        .r(f, Access::READ);
    Some(ins)
}

fn long_three(opc: u32, a: u32, b: u32, c: u32) -> Option<B> {
    let arith = |id| {
        let mut ins = B::new(id);
        ins.r(a, Access::WRITE).r(b, Access::READ).r(c, Access::READ);
        ins
    };
    let address_of = |id, forward| {
        let mut ins = B::new(id);
        ins.r(a, Access::WRITE).mem_index(b, c, forward);
        ins
    };
    let store = |id| {
        let mut ins = B::new(id);
        ins.r(a, Access::READ).mem_index(b, c, true);
        ins
    };
    // l2rus: the third field is an immediate
    let word_offset = |forward: bool| {
        let base = R::from_field(b);
        let sign = if forward { "" } else { "-" };
        let mut ins = B::new(I::LDAW);
        ins.r(a, Access::WRITE).push(
            XcoreOperand::Mem {
                base,
                index: R::INVALID,
                disp: if forward { c as i32 } else { -(c as i32) },
                direct: 1,
            },
            format!("{}[{}{}]", base.name(), sign, fmt_uimm(c as u64)),
        );
        ins
    };
    let ins = match opc {
        0x00c => store(I::STW),
        0x01f => arith(I::XOR),
        0x02c => arith(I::ASHR),
        0x03c => address_of(I::LDAW, true),
        0x04c => address_of(I::LDAW, false),
        0x05c => address_of(I::LDA16, true),
        0x06c => address_of(I::LDA16, false),
        0x07c => arith(I::MUL),
        0x08c => arith(I::DIVS),
        0x09c => arith(I::DIVU),
        0x10c => store(I::ST16),
        0x11c => store(I::ST8),
        0x12c => {
            let mut ins = B::new(I::ASHR);
            ins.r(a, Access::WRITE)
                .r(b, Access::READ)
                .uimm(BITP[c as usize] as u64);
            ins
        }
        0x13c => word_offset(true),
        0x14c => word_offset(false),
        0x15c => {
            let mut ins = B::new(I::CRC32);
            ins.r(a, Access::READ_WRITE)
                .r(b, Access::READ)
                .r(c, Access::READ);
            ins
        }
        0x18c => arith(I::REMS),
        0x19c => arith(I::REMU),
        _ => return None,
    };
    Some(ins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(code: &[u8]) -> Option<String> {
        decode(code).map(|(b, _)| {
            let ops = b.op_str();
            if ops.is_empty() {
                b.mnemonic
            } else {
                format!("{} {}", b.mnemonic, ops)
            }
        })
    }

    #[test]
    fn test_operand_packing() {
        // add r4, r5, r6
        assert_eq!(three(0x1346), (4, 5, 6));
        // combined 27 without the extension bit is (r0, r0)
        assert_eq!(two(27 << 6), Some((0, 0)));
        // combined 31 with the extension bit is the one-register space
        assert_eq!(two(31 << 6 | 1 << 5), None);
    }

    #[rstest]
    #[case(0x8000, "ld16s r0, r0[r0]")]
    #[case(0xa007, "shl r0, r1, 3")]
    #[case(0xa008, "shl r0, r2, 0x20")]
    #[case(0xb806, "set t[r2]:r0, r1")]
    #[case(0x0800 | 0x7e0 | 0x0c, "ldw spc, sp[1]")]
    #[case(0x2000 | 0x7e0 | 0x10 | 0x3, "bau r3")]
    #[case(0x8000 | 0x7e0 | 0x1, "clrpt res[r1]")]
    #[case(0x1800 | 0x7e0 | 0x2, "start t[r2]")]
    #[case(0xb000 | 0x6c0 | 0x1, "in r0, res[r1]")]
    fn test_register_families(#[case] word: u32, #[case] expected: &str) {
        let bytes = (word as u16).to_le_bytes();
        assert_eq!(text(&bytes).as_deref(), Some(expected));
    }

    #[rstest]
    #[case(0x6445, "ldaw r1, sp[5]")]
    #[case(0x7803, "bf r0, 3")]
    #[case(0x7c03, "bf r0, -3")]
    #[case(0x7f02, "getsr r11, 2")]
    #[case(0xd801, "ldap r11, 1")]
    #[case(0xdc20, "ldap r11, -0x20")]
    #[case(0x5b45, "ldw dp, dp[5]")]
    #[case(0xe002, "bla cp[2]")]
    #[case(0xe841, "setc res[r1], 1")]
    fn test_immediate_families(#[case] word: u32, #[case] expected: &str) {
        let bytes = (word as u16).to_le_bytes();
        assert_eq!(text(&bytes).as_deref(), Some(expected));
    }

    #[test]
    fn test_long_opcode_needs_marker() {
        // second halfword without the 1111110 marker
        assert!(decode(&[0x06, 0xf8, 0x0c, 0x38]).is_none());
        assert_eq!(
            text(&[0x06, 0xf8, 0xec, 0xaf]).as_deref(),
            Some("crc32 r0, r1, r2")
        );
    }

    #[test]
    fn test_prefixed_forms_use_four_bytes() {
        let (b, size) = decode(&[0x02, 0xf0, 0x41, 0x54]).unwrap();
        assert_eq!(size, 4);
        assert_eq!(b.op_str(), "r1, sp[0x81]");
    }

    #[rstest]
    #[case(&[0xe0, 0x1f], "start t[r0]")]
    #[case(&[0xf0, 0x1f], "msync res[r0]")]
    #[case(&[0xe0, 0x3f], "dgetreg r0")]
    #[case(&[0xf0, 0x47], "setv res[r0], r11")]
    #[case(&[0xe0, 0x87], "clrpt res[r0]")]
    #[case(&[0xe3, 0x07], "edu res[r3]")]
    #[case(&[0xd0, 0xae], "outshr res[r0], r0")]
    #[case(&[0xc1, 0x4e], "outct res[r0], r1")]
    #[case(&[0xd1, 0x4e], "outct res[r0], 1")]
    #[case(&[0x13, 0x17], "setd res[r3], r4")]
    #[case(&[0xfd, 0x0f], "stw et, sp[4]")]
    #[case(&[0xfe, 0x17], "ldw et, sp[4]")]
    #[case(&[0xfc, 0x0f], "stw sed, sp[3]")]
    #[case(&[0xfd, 0x17], "ldw sed, sp[3]")]
    #[case(&[0xfe, 0x0f], "get r11, ed")]
    fn test_resource_and_state_forms(#[case] code: &[u8], #[case] expected: &str) {
        assert_eq!(text(code).as_deref(), Some(expected));
    }

    #[rstest]
    #[case(&[0xc6, 0xfe, 0xec, 0x17], "init t[r2]:lr, r1")]
    #[case(&[0xf9, 0xfa, 0x02, 0x06], "lmul r11, r0, r2, r5, r8, r10")]
    #[case(&[0x09, 0xfd, 0xec, 0xa7], "ldaw r8, r2[-9]")]
    #[case(&[0x97, 0xf8, 0xec, 0x4f], "divu r9, r1, r3")]
    fn test_long_register_forms(#[case] code: &[u8], #[case] expected: &str) {
        assert_eq!(text(code).as_deref(), Some(expected));
    }

    #[test]
    fn test_four_register_space_is_rejected() {
        // marker present, low opcode nibble below 12
        assert!(decode(&[0x06, 0xf8, 0xe3, 0x07]).is_none());
    }
}
