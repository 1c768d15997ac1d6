//! PowerPC word decoding.

use super::{PpcBc, PpcBh, PpcGroup as G, PpcInsn as I, PpcOperand, PpcReg as R};
use crate::arch::{bit, bits, fmt_imm, fmt_uimm, sign_extend, InsnBuilder};
use crate::insn::Access;
use crate::table::IdTable;
use crate::Address;

type B = InsnBuilder<I, PpcOperand>;

/// Session settings that change decoding or rendering.
#[derive(Debug, Clone, Copy)]
pub(super) struct Ctx {
    /// Print registers by number only
    pub numeric: bool,
    /// 64-bit operations are legal and addresses are not truncated
    pub wide: bool,
}

/// A PowerPC instruction under construction.
#[derive(Debug)]
pub(super) struct Asm {
    pub b: B,
    pub bc: PpcBc,
    pub bh: PpcBh,
    pub update_cr0: bool,
    numeric: bool,
}

impl Asm {
    fn new(id: I, cx: &Ctx) -> Asm {
        Asm::named(id, id.name(), cx)
    }

    fn named(id: I, mnemonic: impl Into<String>, cx: &Ctx) -> Asm {
        Asm {
            b: B::named(id, mnemonic),
            bc: PpcBc::Invalid,
            bh: PpcBh::Invalid,
            update_cr0: false,
            numeric: cx.numeric,
        }
    }

    fn name(&self, r: R) -> String {
        if self.numeric {
            r.number().to_string()
        } else {
            r.name().to_string()
        }
    }

    fn reg(&mut self, reg: R, access: Access) -> &mut Self {
        let text = self.name(reg);
        self.b.push(PpcOperand::reg(reg, access), text);
        self
    }

    fn gpr(&mut self, n: u32, access: Access) -> &mut Self {
        self.reg(R::gpr(n), access)
    }

    /// `rA|0`: register 0 in this slot reads as the literal zero.
    fn gpr0(&mut self, n: u32, access: Access) -> &mut Self {
        if n == 0 {
            self.b.push(PpcOperand::imm(0), "0");
            self
        } else {
            self.gpr(n, access)
        }
    }

    fn fpr(&mut self, n: u32, access: Access) -> &mut Self {
        self.reg(R::fpr(n), access)
    }

    fn crf(&mut self, n: u32, access: Access) -> &mut Self {
        self.reg(R::cr(n), access)
    }

    fn imm(&mut self, value: i64) -> &mut Self {
        self.b.push(PpcOperand::imm(value), fmt_imm(value));
        self
    }

    fn uimm(&mut self, value: u64) -> &mut Self {
        self.b.push(PpcOperand::imm(value as i64), fmt_uimm(value));
        self
    }

    fn mem(&mut self, ra: u32, disp: i64, access: Access) -> &mut Self {
        let (base, base_text) = if ra == 0 {
            (R::INVALID, "0".to_string())
        } else {
            let r = R::gpr(ra);
            (r, self.name(r))
        };
        self.b.push(
            PpcOperand::mem(base, disp, access),
            format!("{}({})", fmt_imm(disp), base_text),
        );
        self
    }

    /// Record form: `.` on the mnemonic, CR0 written.
    fn record(&mut self, rc: bool) -> &mut Self {
        if rc {
            self.update_cr0 = true;
            self.b.mnemonic.push('.');
            self.b.writes(&[R::CR0]);
        }
        self
    }

    /// Floating-point record form writes CR1.
    fn record_fp(&mut self, rc: bool) -> &mut Self {
        if rc {
            self.b.mnemonic.push('.');
            self.b.writes(&[R::CR1]);
        }
        self
    }

    fn group(&mut self, g: G) -> &mut Self {
        self.b.group(g);
        self
    }
}

/// Instruction fields in LSB-0 numbering.
struct Word {
    raw: u32,
    address: Address,
    wide: bool,
}

impl Word {
    fn op(&self) -> u32 {
        bits(self.raw, 26, 6)
    }
    /// RT, RS, BO, TO, FRT
    fn rt(&self) -> u32 {
        bits(self.raw, 21, 5)
    }
    /// RA, BI, FRA
    fn ra(&self) -> u32 {
        bits(self.raw, 16, 5)
    }
    /// RB, SH, FRB
    fn rb(&self) -> u32 {
        bits(self.raw, 11, 5)
    }
    /// FRC, MB
    fn rc_field(&self) -> u32 {
        bits(self.raw, 6, 5)
    }
    /// ME
    fn me(&self) -> u32 {
        bits(self.raw, 1, 5)
    }
    fn rc(&self) -> bool {
        bit(self.raw, 0)
    }
    fn oe(&self) -> bool {
        bit(self.raw, 10)
    }
    fn xo(&self) -> u32 {
        bits(self.raw, 1, 10)
    }
    fn simm(&self) -> i64 {
        sign_extend(bits(self.raw, 0, 16) as u64, 16)
    }
    fn uimm(&self) -> u64 {
        bits(self.raw, 0, 16) as u64
    }
    fn ds(&self) -> i64 {
        sign_extend((bits(self.raw, 2, 14) << 2) as u64, 16)
    }
    /// CR field of compares (BF)
    fn bf(&self) -> u32 {
        bits(self.raw, 23, 3)
    }

    fn target(&self, offset: i64, absolute: bool) -> u64 {
        let t = if absolute {
            offset as u64
        } else {
            self.address.wrapping_add(offset as u64)
        };
        if self.wide {
            t
        } else {
            t & 0xffff_ffff
        }
    }
}

pub(super) fn decode(raw: u32, address: Address, cx: &Ctx) -> Option<Asm> {
    let w = Word {
        raw,
        address,
        wide: cx.wide,
    };
    match w.op() {
        2 if w.wide => Some(trap_imm(I::TDI, &w, cx)),
        3 => Some(trap_imm(I::TWI, &w, cx)),
        7 => Some(arith_imm(I::MULLI, &w, cx)),
        8 => {
            let mut a = arith_imm(I::SUBFIC, &w, cx);
            a.b.writes(&[R::XER]);
            Some(a)
        }
        10 | 11 => compare_imm(&w, cx),
        12 | 13 => {
            let mut a = arith_imm(I::ADDIC, &w, cx);
            a.b.writes(&[R::XER]);
            a.record(w.op() == 13);
            Some(a)
        }
        14 | 15 => Some(add_imm(&w, cx)),
        16 => branch_cond(&w, Via::Displacement, cx),
        17 if raw & 3 == 2 => {
            let mut a = Asm::new(I::SC, cx);
            a.group(G::INT);
            Some(a)
        }
        18 => Some(branch(&w, cx)),
        19 => op19(&w, cx),
        20 | 21 | 23 => rotate_word(&w, cx),
        24..=29 => Some(logical_imm(&w, cx)),
        30 if w.wide => rotate_double(&w, cx).map(|mut a| {
            a.group(G::MODE64);
            a
        }),
        31 => op31(&w, cx),
        32..=55 => load_store(&w, cx),
        58 | 62 if w.wide => load_store_ds(&w, cx),
        59 | 63 => fpu(&w, cx).map(|mut a| {
            a.group(G::FPU);
            a
        }),
        _ => None,
    }
}

fn trap_imm(id: I, w: &Word, cx: &Ctx) -> Asm {
    let mut a = Asm::new(id, cx);
    a.uimm(w.rt() as u64)
        .gpr(w.ra(), Access::READ)
        .imm(w.simm())
        .group(G::INT);
    if id == I::TDI {
        a.group(G::MODE64);
    }
    a
}

fn arith_imm(id: I, w: &Word, cx: &Ctx) -> Asm {
    let mut a = Asm::new(id, cx);
    a.gpr(w.rt(), Access::WRITE)
        .gpr(w.ra(), Access::READ)
        .imm(w.simm());
    a
}

fn add_imm(w: &Word, cx: &Ctx) -> Asm {
    let shifted = w.op() == 15;
    if w.ra() == 0 {
        let mut a = Asm::new(if shifted { I::LIS } else { I::LI }, cx);
        a.gpr(w.rt(), Access::WRITE).imm(w.simm());
        a
    } else {
        arith_imm(if shifted { I::ADDIS } else { I::ADDI }, w, cx)
    }
}

fn compare_imm(w: &Word, cx: &Ctx) -> Option<Asm> {
    if bit(w.raw, 22) {
        return None;
    }
    let double = bit(w.raw, 21);
    if double && !w.wide {
        return None;
    }
    let logical = w.op() == 10;
    let id = match (double, logical) {
        (false, false) => I::CMPWI,
        (false, true) => I::CMPLWI,
        (true, false) => I::CMPDI,
        (true, true) => I::CMPLDI,
    };
    let mut a = Asm::new(id, cx);
    compare_field(&mut a, w.bf());
    a.gpr(w.ra(), Access::READ);
    if logical {
        a.uimm(w.uimm());
    } else {
        a.imm(w.simm());
    }
    Some(a)
}

/// CR field of a compare; `cr0` is implied rather than printed.
fn compare_field(a: &mut Asm, bf: u32) {
    if bf == 0 {
        a.b.writes(&[R::CR0]);
    } else {
        a.crf(bf, Access::WRITE);
    }
}

fn logical_imm(w: &Word, cx: &Ctx) -> Asm {
    if w.raw == 0x6000_0000 {
        return Asm::new(I::NOP, cx);
    }
    let id = match w.op() {
        24 => I::ORI,
        25 => I::ORIS,
        26 => I::XORI,
        27 => I::XORIS,
        28 => I::ANDI,
        _ => I::ANDIS,
    };
    let mut a = Asm::new(id, cx);
    a.gpr(w.ra(), Access::WRITE)
        .gpr(w.rt(), Access::READ)
        .uimm(w.uimm());
    if matches!(id, I::ANDI | I::ANDIS) {
        a.update_cr0 = true;
        a.b.writes(&[R::CR0]);
    }
    a
}

fn branch(w: &Word, cx: &Ctx) -> Asm {
    let (aa, lk) = (bit(w.raw, 1), w.rc());
    let offset = sign_extend((bits(w.raw, 2, 24) << 2) as u64, 26);
    let id = match (aa, lk) {
        (false, false) => I::B,
        (false, true) => I::BL,
        (true, false) => I::BA,
        (true, true) => I::BLA,
    };
    let mut a = Asm::new(id, cx);
    a.uimm(w.target(offset, aa));
    link_groups(&mut a, lk, aa);
    a
}

fn link_groups(a: &mut Asm, lk: bool, absolute: bool) {
    if lk {
        a.group(G::CALL);
        a.b.writes(&[R::LR]);
    } else {
        a.group(G::JUMP);
    }
    if !absolute {
        a.group(G::BRANCH_RELATIVE);
    }
}

/// Where a conditional branch goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Via {
    Displacement,
    Lr,
    Ctr,
}

/// `bc`, `bclr` and `bcctr` with their simplified mnemonics.
fn branch_cond(w: &Word, via: Via, cx: &Ctx) -> Option<Asm> {
    let (bo, bi, lk) = (w.rt(), w.ra(), w.rc());
    let aa = via == Via::Displacement && bit(w.raw, 1);
    let decrement = bo & 0b00100 == 0;
    let test_cr = bo & 0b10000 == 0;
    if via == Via::Ctr && decrement {
        return None;
    }
    let want_set = bo & 0b01000 != 0;
    let zero = bo & 0b00010 != 0;

    let mut base = match (decrement, test_cr) {
        (true, true) => format!(
            "{}{}",
            if zero { "bdz" } else { "bdnz" },
            if want_set { "t" } else { "f" }
        ),
        (true, false) => (if zero { "bdz" } else { "bdnz" }).to_string(),
        (false, true) => format!("b{}", PpcBc::from_bit(bi, want_set).as_str()),
        (false, false) => "b".to_string(),
    };
    base.push_str(match via {
        Via::Displacement => "",
        Via::Lr => "lr",
        Via::Ctr => "ctr",
    });
    if lk {
        base.push('l');
    }
    if aa {
        base.push('a');
    }
    let hint = match (decrement, test_cr) {
        (false, true) => bo & 0b00011,
        (true, false) => ((bo >> 2) & 0b10) | (bo & 1),
        _ => 0,
    };
    let bh = match hint {
        0b11 => PpcBh::Plus,
        0b10 => PpcBh::Minus,
        _ => PpcBh::Invalid,
    };
    match bh {
        PpcBh::Plus => base.push('+'),
        PpcBh::Minus => base.push('-'),
        PpcBh::Invalid => {}
    }

    let unconditional = !decrement && !test_cr;
    let id = match (via, unconditional) {
        (Via::Displacement, true) => match (aa, lk) {
            (false, false) => I::B,
            (false, true) => I::BL,
            (true, false) => I::BA,
            (true, true) => I::BLA,
        },
        (Via::Displacement, false) => match (aa, lk) {
            (false, false) => I::BC,
            (false, true) => I::BCL,
            (true, false) => I::BCA,
            (true, true) => I::BCLA,
        },
        (Via::Lr, true) => if lk { I::BLRL } else { I::BLR },
        (Via::Lr, false) => if lk { I::BCLRL } else { I::BCLR },
        (Via::Ctr, true) => if lk { I::BCTRL } else { I::BCTR },
        (Via::Ctr, false) => if lk { I::BCCTRL } else { I::BCCTR },
    };

    let mut a = Asm::named(id, base, cx);
    a.bh = bh;
    if decrement {
        a.b.reads(&[R::CTR]).writes(&[R::CTR]);
    }
    if test_cr {
        let field = R::cr(bi >> 2);
        a.b.reads(&[field]);
        if decrement {
            a.uimm(bi as u64);
        } else {
            a.bc = PpcBc::from_bit(bi, want_set);
            if bi >> 2 != 0 {
                let text = a.name(field);
                a.b.push(
                    PpcOperand::Crx {
                        reg: field,
                        cond: a.bc,
                    },
                    text,
                );
            }
        }
    }
    match via {
        Via::Displacement => {
            let offset = sign_extend((bits(w.raw, 2, 14) << 2) as u64, 16);
            a.uimm(w.target(offset, aa));
            link_groups(&mut a, lk, aa);
        }
        Via::Lr => {
            a.b.reads(&[R::LR]);
            if lk {
                a.group(G::CALL);
                a.b.writes(&[R::LR]);
            } else {
                a.group(G::RET);
            }
        }
        Via::Ctr => {
            a.b.reads(&[R::CTR]);
            if lk {
                a.group(G::CALL);
                a.b.writes(&[R::LR]);
            } else {
                a.group(G::JUMP);
            }
        }
    }
    Some(a)
}

fn op19(w: &Word, cx: &Ctx) -> Option<Asm> {
    let a = match w.xo() {
        0 => {
            let mut a = Asm::new(I::MCRF, cx);
            a.crf(w.bf(), Access::WRITE)
                .crf(bits(w.raw, 18, 3), Access::READ);
            a
        }
        16 => return branch_cond(w, Via::Lr, cx),
        528 => return branch_cond(w, Via::Ctr, cx),
        50 => {
            let mut a = Asm::new(I::RFI, cx);
            a.group(G::IRET).group(G::PRIVILEGE);
            a
        }
        150 => Asm::new(I::ISYNC, cx),
        33 => cr_logic(I::CRNOR, w, cx),
        129 => cr_logic(I::CRANDC, w, cx),
        193 => cr_logic(I::CRXOR, w, cx),
        225 => cr_logic(I::CRNAND, w, cx),
        257 => cr_logic(I::CRAND, w, cx),
        289 => cr_logic(I::CREQV, w, cx),
        417 => cr_logic(I::CRORC, w, cx),
        449 => cr_logic(I::CROR, w, cx),
        _ => return None,
    };
    Some(a)
}

fn cr_logic(id: I, w: &Word, cx: &Ctx) -> Asm {
    let (bt, ba, bb) = (w.rt(), w.ra(), w.rb());
    let (alias, operands) = match id {
        I::CRXOR if bt == ba && ba == bb => (I::CRCLR, vec![bt]),
        I::CREQV if bt == ba && ba == bb => (I::CRSET, vec![bt]),
        I::CROR if ba == bb => (I::CRMOVE, vec![bt, ba]),
        I::CRNOR if ba == bb => (I::CRNOT, vec![bt, ba]),
        _ => (id, vec![bt, ba, bb]),
    };
    let mut a = Asm::new(alias, cx);
    for &n in &operands {
        a.uimm(n as u64);
    }
    a.b.writes(&[R::cr(bt >> 2)]);
    for &n in &operands[1..] {
        a.b.reads(&[R::cr(n >> 2)]);
    }
    a
}

fn rotate_word(w: &Word, cx: &Ctx) -> Option<Asm> {
    let (ra, rs, sh, mb, me) = (w.ra(), w.rt(), w.rb(), w.rc_field(), w.me());
    let mut a = match w.op() {
        21 => {
            let alias = if mb == 0 && me == 31 {
                Some((I::ROTLWI, sh))
            } else if mb == 0 && sh + me == 31 {
                Some((I::SLWI, sh))
            } else if me == 31 && sh != 0 && sh + mb == 32 {
                Some((I::SRWI, mb))
            } else if sh == 0 && me == 31 {
                Some((I::CLRLWI, mb))
            } else {
                None
            };
            match alias {
                Some((id, n)) => {
                    let mut a = Asm::new(id, cx);
                    a.gpr(ra, Access::WRITE)
                        .gpr(rs, Access::READ)
                        .uimm(n as u64);
                    a
                }
                None => {
                    let mut a = Asm::new(I::RLWINM, cx);
                    a.gpr(ra, Access::WRITE)
                        .gpr(rs, Access::READ)
                        .uimm(sh as u64)
                        .uimm(mb as u64)
                        .uimm(me as u64);
                    a
                }
            }
        }
        20 => {
            let mut a = Asm::new(I::RLWIMI, cx);
            a.gpr(ra, Access::READ_WRITE)
                .gpr(rs, Access::READ)
                .uimm(sh as u64)
                .uimm(mb as u64)
                .uimm(me as u64);
            a
        }
        _ => {
            if mb == 0 && me == 31 {
                let mut a = Asm::new(I::ROTLW, cx);
                a.gpr(ra, Access::WRITE)
                    .gpr(rs, Access::READ)
                    .gpr(w.rb(), Access::READ);
                a
            } else {
                let mut a = Asm::new(I::RLWNM, cx);
                a.gpr(ra, Access::WRITE)
                    .gpr(rs, Access::READ)
                    .gpr(w.rb(), Access::READ)
                    .uimm(mb as u64)
                    .uimm(me as u64);
                a
            }
        }
    };
    a.record(w.rc());
    Some(a)
}

fn rotate_double(w: &Word, cx: &Ctx) -> Option<Asm> {
    let (ra, rs) = (w.ra(), w.rt());
    let sh = w.rb() | ((bit(w.raw, 1) as u32) << 5);
    let field = bits(w.raw, 5, 6);
    let m = ((field & 1) << 5) | (field >> 1);

    let shifted = |id: I, n: u32| {
        let mut a = Asm::new(id, cx);
        a.gpr(ra, Access::WRITE)
            .gpr(rs, Access::READ)
            .uimm(n as u64);
        a
    };
    let full = |id: I, access: Access| {
        let mut a = Asm::new(id, cx);
        a.gpr(ra, access)
            .gpr(rs, Access::READ)
            .uimm(sh as u64)
            .uimm(m as u64);
        a
    };

    let mut a = match bits(w.raw, 2, 3) {
        0 if m == 0 => shifted(I::ROTLDI, sh),
        0 if sh == 0 => shifted(I::CLRLDI, m),
        0 if sh + m == 64 => shifted(I::SRDI, m),
        0 => full(I::RLDICL, Access::WRITE),
        1 if sh + m == 63 => shifted(I::SLDI, sh),
        1 => full(I::RLDICR, Access::WRITE),
        2 => full(I::RLDIC, Access::WRITE),
        3 => full(I::RLDIMI, Access::READ_WRITE),
        4 => {
            let id = match bits(w.raw, 1, 4) {
                8 if m == 0 => I::ROTLD,
                8 => I::RLDCL,
                9 => I::RLDCR,
                _ => return None,
            };
            let mut a = Asm::new(id, cx);
            a.gpr(ra, Access::WRITE)
                .gpr(rs, Access::READ)
                .gpr(w.rb(), Access::READ);
            if id != I::ROTLD {
                a.uimm(m as u64);
            }
            a
        }
        _ => return None,
    };
    a.record(w.rc());
    Some(a)
}

/// XO-form arithmetic: `(id, operand count, OE allowed, 64-bit only)`.
fn xo_form(xo9: u32) -> Option<(I, usize, bool, bool)> {
    Some(match xo9 {
        8 => (I::SUBFC, 3, true, false),
        9 => (I::MULHDU, 3, false, true),
        10 => (I::ADDC, 3, true, false),
        11 => (I::MULHWU, 3, false, false),
        40 => (I::SUBF, 3, true, false),
        73 => (I::MULHD, 3, false, true),
        75 => (I::MULHW, 3, false, false),
        104 => (I::NEG, 2, true, false),
        136 => (I::SUBFE, 3, true, false),
        138 => (I::ADDE, 3, true, false),
        200 => (I::SUBFZE, 2, true, false),
        202 => (I::ADDZE, 2, true, false),
        232 => (I::SUBFME, 2, true, false),
        233 => (I::MULLD, 3, true, true),
        234 => (I::ADDME, 2, true, false),
        235 => (I::MULLW, 3, true, false),
        266 => (I::ADD, 3, true, false),
        457 => (I::DIVDU, 3, true, true),
        459 => (I::DIVWU, 3, true, false),
        489 => (I::DIVD, 3, true, true),
        491 => (I::DIVW, 3, true, false),
        _ => return None,
    })
}

fn xo_arith(w: &Word, cx: &Ctx) -> Option<Asm> {
    let (id, count, oe_ok, wide_only) = xo_form(bits(w.raw, 1, 9))?;
    if (wide_only && !w.wide) || (w.oe() && !oe_ok) || (count == 2 && w.rb() != 0) {
        return None;
    }
    let mut name = id.name().to_string();
    if w.oe() {
        name.push('o');
    }
    let mut a = Asm::named(id, name, cx);
    a.gpr(w.rt(), Access::WRITE).gpr(w.ra(), Access::READ);
    if count == 3 {
        a.gpr(w.rb(), Access::READ);
    }
    if w.oe() {
        a.b.writes(&[R::XER]);
    }
    match id {
        I::ADDC | I::SUBFC => {
            a.b.writes(&[R::XER]);
        }
        I::ADDE | I::SUBFE | I::ADDZE | I::SUBFZE | I::ADDME | I::SUBFME => {
            a.b.reads(&[R::XER]).writes(&[R::XER]);
        }
        _ => {}
    }
    if wide_only {
        a.group(G::MODE64);
    }
    a.record(w.rc());
    Some(a)
}

/// `(id, store, update, float, 64-bit only)` of an indexed load or store.
fn indexed(xo: u32) -> Option<(I, bool, bool, bool, bool)> {
    Some(match xo {
        20 => (I::LWARX, false, false, false, false),
        21 => (I::LDX, false, false, false, true),
        23 => (I::LWZX, false, false, false, false),
        53 => (I::LDUX, false, true, false, true),
        55 => (I::LWZUX, false, true, false, false),
        84 => (I::LDARX, false, false, false, true),
        87 => (I::LBZX, false, false, false, false),
        119 => (I::LBZUX, false, true, false, false),
        149 => (I::STDX, true, false, false, true),
        151 => (I::STWX, true, false, false, false),
        181 => (I::STDUX, true, true, false, true),
        183 => (I::STWUX, true, true, false, false),
        215 => (I::STBX, true, false, false, false),
        247 => (I::STBUX, true, true, false, false),
        279 => (I::LHZX, false, false, false, false),
        311 => (I::LHZUX, false, true, false, false),
        341 => (I::LWAX, false, false, false, true),
        343 => (I::LHAX, false, false, false, false),
        373 => (I::LWAUX, false, true, false, true),
        375 => (I::LHAUX, false, true, false, false),
        407 => (I::STHX, true, false, false, false),
        439 => (I::STHUX, true, true, false, false),
        534 => (I::LWBRX, false, false, false, false),
        535 => (I::LFSX, false, false, true, false),
        567 => (I::LFSUX, false, true, true, false),
        599 => (I::LFDX, false, false, true, false),
        631 => (I::LFDUX, false, true, true, false),
        662 => (I::STWBRX, true, false, false, false),
        663 => (I::STFSX, true, false, true, false),
        695 => (I::STFSUX, true, true, true, false),
        727 => (I::STFDX, true, false, true, false),
        759 => (I::STFDUX, true, true, true, false),
        790 => (I::LHBRX, false, false, false, false),
        918 => (I::STHBRX, true, false, false, false),
        _ => return None,
    })
}

fn indexed_access(w: &Word, cx: &Ctx) -> Option<Asm> {
    let (id, store, update, float, wide_only) = indexed(w.xo())?;
    if w.rc() || (wide_only && !w.wide) || (update && w.ra() == 0) {
        return None;
    }
    let mut a = Asm::new(id, cx);
    let access = if store { Access::READ } else { Access::WRITE };
    if float {
        a.fpr(w.rt(), access).group(G::FPU);
    } else {
        a.gpr(w.rt(), access);
    }
    a.gpr0(w.ra(), if update { Access::READ_WRITE } else { Access::READ })
        .gpr(w.rb(), Access::READ);
    if wide_only {
        a.group(G::MODE64);
    }
    Some(a)
}

fn x_logic(id: I, w: &Word, cx: &Ctx) -> Asm {
    let (ra, rs, rb) = (w.ra(), w.rt(), w.rb());
    let alias = match id {
        I::OR if rs == rb => Some(I::MR),
        I::NOR if rs == rb => Some(I::NOT),
        _ => None,
    };
    let mut a = Asm::new(alias.unwrap_or(id), cx);
    a.gpr(ra, Access::WRITE).gpr(rs, Access::READ);
    if alias.is_none() {
        a.gpr(rb, Access::READ);
    }
    if matches!(id, I::SRAW | I::SRAD) {
        a.b.writes(&[R::XER]);
    }
    a.record(w.rc());
    a
}

fn x_unary(id: I, w: &Word, cx: &Ctx) -> Asm {
    let mut a = Asm::new(id, cx);
    a.gpr(w.ra(), Access::WRITE).gpr(w.rt(), Access::READ);
    a.record(w.rc());
    a
}

fn cache_op(id: I, w: &Word, cx: &Ctx) -> Asm {
    let mut a = Asm::new(id, cx);
    a.gpr0(w.ra(), Access::READ).gpr(w.rb(), Access::READ);
    a
}

fn spr_number(w: &Word) -> u32 {
    let field = bits(w.raw, 11, 10);
    ((field & 0x1f) << 5) | (field >> 5)
}

fn move_spr(w: &Word, to: bool, cx: &Ctx) -> Asm {
    let spr = spr_number(w);
    let named = match spr {
        1 => Some((R::XER, if to { I::MTXER } else { I::MFXER })),
        8 => Some((R::LR, if to { I::MTLR } else { I::MFLR })),
        9 => Some((R::CTR, if to { I::MTCTR } else { I::MFCTR })),
        _ => None,
    };
    match (named, to) {
        (Some((reg, id)), false) => {
            let mut a = Asm::new(id, cx);
            a.gpr(w.rt(), Access::WRITE);
            a.b.reads(&[reg]);
            a
        }
        (Some((reg, id)), true) => {
            let mut a = Asm::new(id, cx);
            a.gpr(w.rt(), Access::READ);
            a.b.writes(&[reg]);
            a
        }
        (None, false) => {
            let mut a = Asm::new(I::MFSPR, cx);
            a.gpr(w.rt(), Access::WRITE).uimm(spr as u64);
            a
        }
        (None, true) => {
            let mut a = Asm::new(I::MTSPR, cx);
            a.uimm(spr as u64).gpr(w.rt(), Access::READ);
            a
        }
    }
}

fn compare_reg(w: &Word, logical: bool, cx: &Ctx) -> Option<Asm> {
    if bit(w.raw, 22) || w.rc() {
        return None;
    }
    let double = bit(w.raw, 21);
    if double && !w.wide {
        return None;
    }
    let id = match (double, logical) {
        (false, false) => I::CMPW,
        (false, true) => I::CMPLW,
        (true, false) => I::CMPD,
        (true, true) => I::CMPLD,
    };
    let mut a = Asm::new(id, cx);
    compare_field(&mut a, w.bf());
    a.gpr(w.ra(), Access::READ).gpr(w.rb(), Access::READ);
    Some(a)
}

fn op31(w: &Word, cx: &Ctx) -> Option<Asm> {
    if bits(w.raw, 2, 9) == 413 {
        if !w.wide {
            return None;
        }
        let sh = w.rb() | ((bit(w.raw, 1) as u32) << 5);
        let mut a = Asm::new(I::SRADI, cx);
        a.gpr(w.ra(), Access::WRITE)
            .gpr(w.rt(), Access::READ)
            .uimm(sh as u64)
            .group(G::MODE64);
        a.b.writes(&[R::XER]);
        a.record(w.rc());
        return Some(a);
    }
    if xo_form(bits(w.raw, 1, 9)).is_some() {
        return xo_arith(w, cx);
    }
    if indexed(w.xo()).is_some() {
        return indexed_access(w, cx);
    }
    let wide_only = |a: Asm| {
        if w.wide {
            let mut a = a;
            a.group(G::MODE64);
            Some(a)
        } else {
            None
        }
    };
    let a = match w.xo() {
        0 => return compare_reg(w, false, cx),
        32 => return compare_reg(w, true, cx),
        4 | 68 => {
            let double = w.xo() == 68;
            if w.rt() == 31 && w.ra() == 0 && w.rb() == 0 && !double {
                let mut a = Asm::new(I::TRAP, cx);
                a.group(G::INT);
                return Some(a);
            }
            let mut a = Asm::new(if double { I::TD } else { I::TW }, cx);
            a.uimm(w.rt() as u64)
                .gpr(w.ra(), Access::READ)
                .gpr(w.rb(), Access::READ)
                .group(G::INT);
            return if double { wide_only(a) } else { Some(a) };
        }
        19 => {
            let mut a = Asm::new(I::MFCR, cx);
            a.gpr(w.rt(), Access::WRITE);
            a.b.reads(&[R::CR0, R::CR1, R::CR2, R::CR3, R::CR4, R::CR5, R::CR6, R::CR7]);
            a
        }
        144 => {
            let mask = bits(w.raw, 12, 8);
            let mut a = if mask == 0xff {
                Asm::new(I::MTCR, cx)
            } else {
                let mut a = Asm::new(I::MTCRF, cx);
                a.uimm(mask as u64);
                a
            };
            a.gpr(w.rt(), Access::READ);
            for n in 0..8 {
                if mask & (0x80 >> n) != 0 {
                    a.b.writes(&[R::cr(n)]);
                }
            }
            a
        }
        83 => {
            let mut a = Asm::new(I::MFMSR, cx);
            a.gpr(w.rt(), Access::WRITE).group(G::PRIVILEGE);
            a.b.reads(&[R::MSR]);
            a
        }
        146 => {
            let mut a = Asm::new(I::MTMSR, cx);
            a.gpr(w.rt(), Access::READ).group(G::PRIVILEGE);
            a.b.writes(&[R::MSR]);
            a
        }
        339 => move_spr(w, false, cx),
        467 => move_spr(w, true, cx),
        371 => {
            let tbr = spr_number(w);
            let mut a = Asm::new(I::MFTB, cx);
            a.gpr(w.rt(), Access::WRITE);
            if tbr != 268 {
                a.uimm(tbr as u64);
            }
            a.b.reads(&[R::TB]);
            a
        }
        150 | 214 => {
            if !w.rc() {
                return None;
            }
            let double = w.xo() == 214;
            let mut a = Asm::new(if double { I::STDCX } else { I::STWCX }, cx);
            a.gpr(w.rt(), Access::READ)
                .gpr0(w.ra(), Access::READ)
                .gpr(w.rb(), Access::READ);
            a.update_cr0 = true;
            a.b.writes(&[R::CR0]);
            return if double { wide_only(a) } else { Some(a) };
        }
        598 => match bits(w.raw, 21, 2) {
            0 => Asm::new(I::SYNC, cx),
            1 => Asm::new(I::LWSYNC, cx),
            l => {
                let mut a = Asm::new(I::SYNC, cx);
                a.uimm(l as u64);
                a
            }
        },
        854 => Asm::new(I::EIEIO, cx),
        824 => {
            let mut a = Asm::new(I::SRAWI, cx);
            a.gpr(w.ra(), Access::WRITE)
                .gpr(w.rt(), Access::READ)
                .uimm(w.rb() as u64);
            a.b.writes(&[R::XER]);
            a.record(w.rc());
            a
        }
        28 => x_logic(I::AND, w, cx),
        60 => x_logic(I::ANDC, w, cx),
        124 => x_logic(I::NOR, w, cx),
        284 => x_logic(I::EQV, w, cx),
        316 => x_logic(I::XOR, w, cx),
        412 => x_logic(I::ORC, w, cx),
        444 => x_logic(I::OR, w, cx),
        476 => x_logic(I::NAND, w, cx),
        24 => x_logic(I::SLW, w, cx),
        536 => x_logic(I::SRW, w, cx),
        792 => x_logic(I::SRAW, w, cx),
        27 => return wide_only(x_logic(I::SLD, w, cx)),
        539 => return wide_only(x_logic(I::SRD, w, cx)),
        794 => return wide_only(x_logic(I::SRAD, w, cx)),
        26 => x_unary(I::CNTLZW, w, cx),
        922 => x_unary(I::EXTSH, w, cx),
        954 => x_unary(I::EXTSB, w, cx),
        58 => return wide_only(x_unary(I::CNTLZD, w, cx)),
        986 => return wide_only(x_unary(I::EXTSW, w, cx)),
        54 => cache_op(I::DCBST, w, cx),
        86 => cache_op(I::DCBF, w, cx),
        246 => cache_op(I::DCBTST, w, cx),
        278 => cache_op(I::DCBT, w, cx),
        982 => cache_op(I::ICBI, w, cx),
        1014 => cache_op(I::DCBZ, w, cx),
        _ => return None,
    };
    Some(a)
}

/// D-form memory access by primary opcode 32..=55: `(id, store, float)`.
/// Odd opcodes are the update forms, except `lmw`/`stmw`.
const D_FORM: [(I, bool, bool); 24] = [
    (I::LWZ, false, false),
    (I::LWZU, false, false),
    (I::LBZ, false, false),
    (I::LBZU, false, false),
    (I::STW, true, false),
    (I::STWU, true, false),
    (I::STB, true, false),
    (I::STBU, true, false),
    (I::LHZ, false, false),
    (I::LHZU, false, false),
    (I::LHA, false, false),
    (I::LHAU, false, false),
    (I::STH, true, false),
    (I::STHU, true, false),
    (I::LMW, false, false),
    (I::STMW, true, false),
    (I::LFS, false, true),
    (I::LFSU, false, true),
    (I::LFD, false, true),
    (I::LFDU, false, true),
    (I::STFS, true, true),
    (I::STFSU, true, true),
    (I::STFD, true, true),
    (I::STFDU, true, true),
];

fn load_store(w: &Word, cx: &Ctx) -> Option<Asm> {
    let (id, store, float) = *D_FORM.get((w.op() - 32) as usize)?;
    let update = w.op() % 2 == 1 && !matches!(id, I::STMW);
    if update && w.ra() == 0 {
        return None;
    }
    Some(memory_access(id, w, w.simm(), store, update, float, cx))
}

fn memory_access(
    id: I,
    w: &Word,
    disp: i64,
    store: bool,
    update: bool,
    float: bool,
    cx: &Ctx,
) -> Asm {
    let mut a = Asm::new(id, cx);
    if float {
        a.fpr(w.rt(), if store { Access::READ } else { Access::WRITE })
            .group(G::FPU);
    } else {
        a.gpr(w.rt(), if store { Access::READ } else { Access::WRITE });
    }
    a.mem(w.ra(), disp, if store { Access::WRITE } else { Access::READ });
    if update {
        a.b.writes(&[R::gpr(w.ra())]);
    }
    a
}

fn load_store_ds(w: &Word, cx: &Ctx) -> Option<Asm> {
    let store = w.op() == 62;
    let (id, update) = match (store, bits(w.raw, 0, 2)) {
        (false, 0) => (I::LD, false),
        (false, 1) => (I::LDU, true),
        (false, 2) => (I::LWA, false),
        (true, 0) => (I::STD, false),
        (true, 1) => (I::STDU, true),
        _ => return None,
    };
    if update && w.ra() == 0 {
        return None;
    }
    let mut a = memory_access(id, w, w.ds(), store, update, false, cx);
    a.group(G::MODE64);
    Some(a)
}

/// Operand shape of an A-form floating-point operation.
#[derive(Debug, Clone, Copy)]
enum Shape {
    /// frt, fra, frb
    Ab,
    /// frt, fra, frc
    Ac,
    /// frt, frb
    B,
    /// frt, fra, frc, frb
    Acb,
}

fn fpu(w: &Word, cx: &Ctx) -> Option<Asm> {
    let single = w.op() == 59;
    let a_form = match (bits(w.raw, 1, 5), single) {
        (18, false) => Some((I::FDIV, Shape::Ab)),
        (20, false) => Some((I::FSUB, Shape::Ab)),
        (21, false) => Some((I::FADD, Shape::Ab)),
        (22, false) => Some((I::FSQRT, Shape::B)),
        (23, false) => Some((I::FSEL, Shape::Acb)),
        (25, false) => Some((I::FMUL, Shape::Ac)),
        (26, false) => Some((I::FRSQRTE, Shape::B)),
        (28, false) => Some((I::FMSUB, Shape::Acb)),
        (29, false) => Some((I::FMADD, Shape::Acb)),
        (30, false) => Some((I::FNMSUB, Shape::Acb)),
        (31, false) => Some((I::FNMADD, Shape::Acb)),
        (18, true) => Some((I::FDIVS, Shape::Ab)),
        (20, true) => Some((I::FSUBS, Shape::Ab)),
        (21, true) => Some((I::FADDS, Shape::Ab)),
        (22, true) => Some((I::FSQRTS, Shape::B)),
        (24, true) => Some((I::FRES, Shape::B)),
        (25, true) => Some((I::FMULS, Shape::Ac)),
        (28, true) => Some((I::FMSUBS, Shape::Acb)),
        (29, true) => Some((I::FMADDS, Shape::Acb)),
        (30, true) => Some((I::FNMSUBS, Shape::Acb)),
        (31, true) => Some((I::FNMADDS, Shape::Acb)),
        _ => None,
    };
    if let Some((id, shape)) = a_form {
        let mut a = Asm::new(id, cx);
        a.fpr(w.rt(), Access::WRITE);
        match shape {
            Shape::Ab => {
                a.fpr(w.ra(), Access::READ).fpr(w.rb(), Access::READ);
            }
            Shape::Ac => {
                a.fpr(w.ra(), Access::READ).fpr(w.rc_field(), Access::READ);
            }
            Shape::B => {
                a.fpr(w.rb(), Access::READ);
            }
            Shape::Acb => {
                a.fpr(w.ra(), Access::READ)
                    .fpr(w.rc_field(), Access::READ)
                    .fpr(w.rb(), Access::READ);
            }
        }
        a.record_fp(w.rc());
        return Some(a);
    }
    if single {
        return None;
    }

    let unary = |id: I| {
        let mut a = Asm::new(id, cx);
        a.fpr(w.rt(), Access::WRITE).fpr(w.rb(), Access::READ);
        a
    };
    let mut a = match w.xo() {
        0 | 32 => {
            let mut a = Asm::new(if w.xo() == 0 { I::FCMPU } else { I::FCMPO }, cx);
            a.crf(w.bf(), Access::WRITE)
                .fpr(w.ra(), Access::READ)
                .fpr(w.rb(), Access::READ);
            return Some(a);
        }
        12 => unary(I::FRSP),
        14 => unary(I::FCTIW),
        15 => unary(I::FCTIWZ),
        40 => unary(I::FNEG),
        72 => unary(I::FMR),
        136 => unary(I::FNABS),
        264 => unary(I::FABS),
        814 => unary(I::FCTID),
        815 => unary(I::FCTIDZ),
        846 => unary(I::FCFID),
        583 => {
            let mut a = Asm::new(I::MFFS, cx);
            a.fpr(w.rt(), Access::WRITE);
            a.b.reads(&[R::FPSCR]);
            a
        }
        711 => {
            let mut a = Asm::new(I::MTFSF, cx);
            a.uimm(bits(w.raw, 17, 8) as u64).fpr(w.rb(), Access::READ);
            a.b.writes(&[R::FPSCR]);
            a
        }
        38 | 70 => {
            let mut a = Asm::new(if w.xo() == 38 { I::MTFSB1 } else { I::MTFSB0 }, cx);
            a.uimm(w.rt() as u64);
            a.b.writes(&[R::FPSCR]);
            a
        }
        _ => return None,
    };
    a.record_fp(w.rc());
    Some(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Ctx {
        Ctx {
            numeric: false,
            wide: false,
        }
    }

    fn text(raw: u32) -> String {
        let a = decode(raw, 0x1000, &ctx()).expect("valid encoding");
        format!("{} {}", a.b.mnemonic, a.b.op_str()).trim_end().to_string()
    }

    #[test]
    fn test_spr_field_halves_are_swapped() {
        let w = Word {
            raw: 0x7c08_02a6,
            address: 0,
            wide: false,
        };
        assert_eq!(spr_number(&w), 8);
    }

    #[test]
    fn test_conditional_branch_mnemonics() {
        // bdnzf lt with BO = 0, BI = 0
        assert_eq!(text(0x4000_0008), "bdnzf 0, 0x1008");
        // bdz with the taken hint
        assert_eq!(text(0x4360_0008), "bdz+ 0x1008");
        // bnectr cr1
        assert_eq!(text(0x4c86_0420), "bnectr cr1");
        // bgelrl
        assert_eq!(text(0x4c80_0021), "bgelrl");
        // bcctr with a CTR decrement is invalid
        assert!(decode(0x4e00_0420, 0, &ctx()).is_none());
    }

    #[test]
    fn test_rotate_and_logic_aliases() {
        assert_eq!(text(0x5463_803e), "rotlwi r3, r3, 0x10");
        assert_eq!(text(0x5c63_203e), "rotlw r3, r3, r4");
        assert_eq!(text(0x7c63_18f8), "not r3, r3");
        assert_eq!(text(0x7c63_2038), "and r3, r3, r4");
        assert_eq!(text(0x7063_0001), "andi. r3, r3, 1");
        assert_eq!(text(0x7c63_0734), "extsh r3, r3");
    }

    #[test]
    fn test_xo_forms() {
        assert_eq!(text(0x7c64_2850), "subf r3, r4, r5");
        assert_eq!(text(0x7c64_00d0), "neg r3, r4");
        assert_eq!(text(0x7c64_29d6), "mullw r3, r4, r5");
        assert_eq!(text(0x7c64_2bd6), "divw r3, r4, r5");
        // neg with rb set is reserved
        assert!(decode(0x7c64_28d0, 0, &ctx()).is_none());
    }

    #[test]
    fn test_cr_and_system_forms() {
        assert_eq!(text(0x4c00_012c), "isync");
        assert_eq!(text(0x7c60_0026), "mfcr r3");
        assert_eq!(text(0x7c6f_f120), "mtcr r3");
        assert_eq!(text(0x7c08_03a6), "mtlr r0");
        assert_eq!(text(0x7c78_faa6), "mfspr r3, 0x3f8");
        assert_eq!(text(0x7c64_292d), "stwcx. r3, r4, r5");
        assert_eq!(text(0x7c00_06ac), "eieio");
        assert_eq!(text(0x7c03_20ac), "dcbf r3, r4");
        assert_eq!(text(0x4cc6_3182), "crclr 6");
        assert_eq!(text(0x4c22_1a02), "crand 1, 2, 3");
    }

    #[test]
    fn test_fp_compare() {
        assert_eq!(text(0xff81_1000), "fcmpu cr7, f1, f2");
        assert_eq!(text(0xfc20_0090), "fmr f1, f0");
        assert_eq!(text(0xfc22_18fa), "fmadd f1, f2, f3, f3");
    }
}
