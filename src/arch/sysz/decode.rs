//! SystemZ instruction decoding by format.

use super::{SyszCc, SyszGroup as G, SyszInsn as I, SyszOperand, SyszReg as R};
use crate::arch::{fmt_imm, fmt_uimm, sign_extend, InsnBuilder};
use crate::insn::Access;
use crate::table::IdTable;
use crate::Address;

type B = InsnBuilder<I, SyszOperand>;

/// A decoded instruction with its condition.
pub(super) struct Sysz {
    pub b: B,
    pub cc: SyszCc,
}

impl From<B> for Sysz {
    fn from(b: B) -> Self {
        Sysz {
            b,
            cc: SyszCc::Invalid,
        }
    }
}

/// Register bank of an `R` field.
#[derive(Clone, Copy)]
enum K {
    Gr,
    Fp,
}

impl K {
    fn reg(self, n: u32) -> R {
        match self {
            K::Gr => R::gpr(n),
            K::Fp => R::fpr(n),
        }
    }
}

/// How the first register and the storage operand are used.
#[derive(Clone, Copy)]
enum Role {
    Load,
    Store,
    Modify,
    Compare,
    /// Address computation only (`la`, `larl`)
    Addr,
}

impl Role {
    fn r1(self) -> Access {
        match self {
            Role::Load | Role::Addr => Access::WRITE,
            Role::Store | Role::Compare => Access::READ,
            Role::Modify => Access::READ_WRITE,
        }
    }

    /// Storage as a source next to R1.
    fn mem(self) -> Access {
        match self {
            Role::Load | Role::Compare | Role::Modify => Access::READ,
            Role::Store => Access::WRITE,
            Role::Addr => Access::empty(),
        }
    }

    /// Storage as the first operand (SI, SIY, SS, compare-and-swap).
    fn target(self) -> Access {
        match self {
            Role::Modify => Access::READ_WRITE,
            other => other.mem(),
        }
    }
}

#[derive(Clone, Copy)]
enum Form {
    Rr(K, K),
    Rre(K, K),
    /// R1 only
    Rre1,
    /// R1, R2, R3
    Rrfa,
    /// GPR R1, M3, FPR R2
    Rrfe,
    Rx(K),
    Rxe,
    Rxy(K),
    Rs,
    RsShift,
    Rsy,
    RsyShift,
    Si,
    Siy(bool),
    Ri(bool),
    Ril(bool),
    RilRel,
    Ss,
}

impl Form {
    fn uses_fpr(self) -> bool {
        matches!(
            self,
            Form::Rr(K::Fp, _)
                | Form::Rr(_, K::Fp)
                | Form::Rre(K::Fp, _)
                | Form::Rre(_, K::Fp)
                | Form::Rrfe
                | Form::Rx(K::Fp)
                | Form::Rxe
                | Form::Rxy(K::Fp)
        )
    }
}

type Entry = (I, Form, Role, bool);

struct Fields<'a> {
    b: &'a [u8],
    address: Address,
}

impl Fields<'_> {
    fn byte(&self, i: usize) -> u32 {
        self.b.get(i).copied().unwrap_or(0) as u32
    }

    /// Nibble `i`, counted from the most significant end.
    fn nib(&self, i: usize) -> u32 {
        let byte = self.byte(i / 2);
        if i % 2 == 0 {
            byte >> 4
        } else {
            byte & 15
        }
    }

    fn half(&self, i: usize) -> u32 {
        self.byte(i) << 8 | self.byte(i + 1)
    }

    fn word(&self, i: usize) -> u32 {
        self.half(i) << 16 | self.half(i + 2)
    }

    /// Unsigned 12-bit displacement starting at nibble `i`.
    fn d12(&self, i: usize) -> i64 {
        (self.nib(i) << 8 | self.nib(i + 1) << 4 | self.nib(i + 2)) as i64
    }

    /// Signed 20-bit displacement: DL at nibble 5, DH in byte 4.
    fn d20(&self) -> i64 {
        sign_extend(((self.byte(4) << 12) as u64) | self.d12(5) as u64, 20)
    }

    fn rel(&self, halfwords: i64) -> u64 {
        self.address.wrapping_add(halfwords.wrapping_mul(2) as u64)
    }

    fn rel16(&self, i: usize) -> u64 {
        self.rel(sign_extend(self.half(i) as u64, 16))
    }

    fn rel32(&self, i: usize) -> u64 {
        self.rel(sign_extend(self.word(i) as u64, 32))
    }
}

fn base_reg(n: u32) -> R {
    if n == 0 {
        R::INVALID
    } else {
        R::gpr(n)
    }
}

impl InsnBuilder<I, SyszOperand> {
    fn reg(&mut self, reg: R, access: Access) -> &mut Self {
        self.push(SyszOperand::reg(reg, access), format!("%{}", reg.name()))
    }

    fn gpr(&mut self, n: u32, access: Access) -> &mut Self {
        self.reg(R::gpr(n), access)
    }

    fn imm(&mut self, value: i64) -> &mut Self {
        self.push(SyszOperand::imm(value), fmt_imm(value))
    }

    fn uimm(&mut self, value: u64) -> &mut Self {
        self.push(SyszOperand::imm(value as i64), fmt_uimm(value))
    }

    /// A 4-bit condition mask, always decimal.
    fn mask(&mut self, mask: u32) -> &mut Self {
        self.push(SyszOperand::imm(mask as i64), mask.to_string())
    }

    /// `disp(index, base)`; register 0 means "none".
    fn mem(&mut self, disp: i64, index: u32, base: u32, access: Access) -> &mut Self {
        let (index, base) = (base_reg(index), base_reg(base));
        let mut text = fmt_imm(disp);
        match (index, base) {
            (R::INVALID, R::INVALID) => {}
            (R::INVALID, base) => text.push_str(&format!("(%{})", base.name())),
            (index, R::INVALID) => text.push_str(&format!("(%{}, 0)", index.name())),
            (index, base) => text.push_str(&format!("(%{}, %{})", index.name(), base.name())),
        }
        self.push(
            SyszOperand::Mem {
                base,
                index,
                length: 0,
                disp,
                access,
            },
            text,
        )
    }

    /// `disp(length,base)` of a storage-to-storage operand.
    fn mem_len(&mut self, disp: i64, length: u64, base: u32, access: Access) -> &mut Self {
        let base = base_reg(base);
        let text = if base == R::INVALID {
            format!("{}({})", fmt_imm(disp), fmt_uimm(length))
        } else {
            format!("{}({},%{})", fmt_imm(disp), fmt_uimm(length), base.name())
        };
        self.push(
            SyszOperand::Mem {
                base,
                index: R::INVALID,
                length,
                disp,
                access,
            },
            text,
        )
    }

    /// Jump group and condition-code read for a branch with `mask`.
    fn cond_branch(&mut self, mask: u32) -> &mut Self {
        if mask != 0 {
            self.group(G::JUMP);
        }
        if mask != 0 && mask != 15 {
            self.reads(&[R::CC]);
        }
        self
    }
}

pub(super) fn decode(bytes: &[u8], address: Address) -> Option<Sysz> {
    let f = Fields { b: bytes, address };
    if let Some(insn) = control(&f) {
        return Some(insn);
    }
    let (id, form, role, sets_cc) = lookup(&f)?;
    if !reserved_fields_clear(&f, form) || !pair_is_even(&f, id, form) {
        return None;
    }
    let mut b = B::new(id);
    operands(&mut b, &f, form, role);
    if sets_cc {
        b.writes(&[R::CC]);
    }
    if distinct_ops(id) {
        b.group(G::DISTINCTOPS);
    }
    if form.uses_fpr() {
        b.group(G::FPU);
    }
    Some(b.into())
}

/// Fields a format leaves unused must be zero.
fn reserved_fields_clear(f: &Fields, form: Form) -> bool {
    match form {
        Form::Rre(..) | Form::Rre1 if f.byte(2) != 0 => false,
        Form::Rre1 => f.nib(7) == 0,
        Form::Rrfa | Form::Rrfe => f.nib(5) == 0,
        Form::RsShift => f.nib(3) == 0,
        Form::Rxe => f.byte(4) == 0,
        _ => true,
    }
}

/// Instructions working on an even/odd register pair need an even R1.
fn pair_is_even(f: &Fields, id: I, form: Form) -> bool {
    let r1 = match form {
        Form::Rre(..) => f.nib(6),
        _ => f.nib(2),
    };
    let pair = matches!(
        id,
        I::D | I::DR
            | I::M
            | I::MR
            | I::SRDL
            | I::SLDL
            | I::SRDA
            | I::SLDA
            | I::DLGR
            | I::MLGR
            | I::DSGR
    );
    !pair || r1 % 2 == 0
}

fn distinct_ops(id: I) -> bool {
    matches!(
        id,
        I::AGRK
            | I::ARK
            | I::SGRK
            | I::SRK
            | I::ALGRK
            | I::ALRK
            | I::SLGRK
            | I::SLRK
            | I::NGRK
            | I::NRK
            | I::OGRK
            | I::ORK
            | I::XGRK
            | I::XRK
            | I::SRAK
            | I::SLAK
            | I::SRLK
            | I::SLLK
    )
}

fn operands(b: &mut B, f: &Fields, form: Form, role: Role) {
    match form {
        Form::Rr(k1, k2) => {
            b.reg(k1.reg(f.nib(2)), role.r1())
                .reg(k2.reg(f.nib(3)), Access::READ);
        }
        Form::Rre(k1, k2) => {
            b.reg(k1.reg(f.nib(6)), role.r1())
                .reg(k2.reg(f.nib(7)), Access::READ);
        }
        Form::Rre1 => {
            b.gpr(f.nib(6), role.r1());
        }
        Form::Rrfa => {
            b.gpr(f.nib(6), Access::WRITE)
                .gpr(f.nib(7), Access::READ)
                .gpr(f.nib(4), Access::READ);
        }
        Form::Rrfe => {
            b.gpr(f.nib(6), Access::WRITE)
                .uimm(f.nib(4) as u64)
                .reg(R::fpr(f.nib(7)), Access::READ);
        }
        Form::Rx(k) => {
            b.reg(k.reg(f.nib(2)), role.r1())
                .mem(f.d12(5), f.nib(3), f.nib(4), role.mem());
        }
        Form::Rxe => {
            b.reg(R::fpr(f.nib(2)), role.r1())
                .mem(f.d12(5), f.nib(3), f.nib(4), role.mem());
        }
        Form::Rxy(k) => {
            b.reg(k.reg(f.nib(2)), role.r1())
                .mem(f.d20(), f.nib(3), f.nib(4), role.mem());
        }
        Form::Rs | Form::Rsy => {
            let r3 = match role {
                Role::Load => Access::WRITE,
                _ => Access::READ,
            };
            let disp = match form {
                Form::Rs => f.d12(5),
                _ => f.d20(),
            };
            b.gpr(f.nib(2), role.r1())
                .gpr(f.nib(3), r3)
                .mem(disp, 0, f.nib(4), role.target());
        }
        Form::RsShift => {
            b.gpr(f.nib(2), role.r1())
                .mem(f.d12(5), 0, f.nib(4), Access::empty());
        }
        Form::RsyShift => {
            b.gpr(f.nib(2), Access::WRITE)
                .gpr(f.nib(3), Access::READ)
                .mem(f.d20(), 0, f.nib(4), Access::empty());
        }
        Form::Si => {
            b.mem(f.d12(5), 0, f.nib(4), role.target())
                .uimm(f.byte(1) as u64);
        }
        Form::Siy(signed) => {
            b.mem(f.d20(), 0, f.nib(4), role.target());
            if signed {
                b.imm(sign_extend(f.byte(1) as u64, 8));
            } else {
                b.uimm(f.byte(1) as u64);
            }
        }
        Form::Ri(signed) => {
            b.gpr(f.nib(2), role.r1());
            if signed {
                b.imm(sign_extend(f.half(2) as u64, 16));
            } else {
                b.uimm(f.half(2) as u64);
            }
        }
        Form::Ril(signed) => {
            b.gpr(f.nib(2), role.r1());
            if signed {
                b.imm(sign_extend(f.word(2) as u64, 32));
            } else {
                b.uimm(f.word(2) as u64);
            }
        }
        Form::RilRel => {
            b.gpr(f.nib(2), role.r1()).uimm(f.rel32(2));
        }
        Form::Ss => {
            b.mem_len(f.d12(5), f.byte(1) as u64 + 1, f.nib(4), role.target())
                .mem(f.d12(9), 0, f.nib(8), Access::READ);
        }
    }
}

/// Branches, calls, supervisor calls and the other forms whose text or
/// groups do not follow from a table entry.
fn control(f: &Fields) -> Option<Sysz> {
    let op = f.byte(0);
    let insn = match (op, f.nib(3)) {
        (0x05, _) | (0x0d, _) => {
            let mut b = B::new(if op == 0x05 { I::BALR } else { I::BASR });
            b.gpr(f.nib(2), Access::WRITE).gpr(f.nib(3), Access::READ);
            if f.nib(3) != 0 {
                b.group(G::CALL);
            }
            b.into()
        }
        (0x06, _) => {
            let mut b = B::new(I::BCTR);
            b.gpr(f.nib(2), Access::READ_WRITE)
                .gpr(f.nib(3), Access::READ);
            if f.nib(3) != 0 {
                b.group(G::JUMP);
            }
            b.into()
        }
        (0x07, r2) => {
            let mask = f.nib(2);
            if r2 == 0 {
                let mut b = B::new(I::BCR);
                b.mask(mask).gpr(0, Access::READ);
                return Some(b.into());
            }
            let (cc, suffix) = SyszCc::from_mask(mask);
            let name = if mask == 0 {
                "nopr".to_string()
            } else {
                format!("b{}r", suffix)
            };
            let mut b = B::named(I::BCR, name);
            b.gpr(r2, Access::READ).cond_branch(mask);
            Sysz { b, cc }
        }
        (0x0a, _) => {
            let mut b = B::new(I::SVC);
            b.uimm(f.byte(1) as u64).group(G::INT);
            b.into()
        }
        (0x46, _) => {
            let mut b = B::new(I::BCT);
            b.gpr(f.nib(2), Access::READ_WRITE)
                .mem(f.d12(5), f.nib(3), f.nib(4), Access::empty())
                .group(G::JUMP);
            b.into()
        }
        (0x47, _) => {
            let mask = f.nib(2);
            let (cc, suffix) = SyszCc::from_mask(mask);
            let name = if mask == 0 {
                "nop".to_string()
            } else {
                format!("b{}", suffix)
            };
            let mut b = B::named(I::BC, name);
            b.mem(f.d12(5), f.nib(3), f.nib(4), Access::empty())
                .cond_branch(mask);
            Sysz { b, cc }
        }
        (0x4d, _) => {
            let mut b = B::new(I::BAS);
            b.gpr(f.nib(2), Access::WRITE)
                .mem(f.d12(5), f.nib(3), f.nib(4), Access::empty())
                .group(G::CALL);
            b.into()
        }
        (0xa7, 4) | (0xc0, 4) => {
            let mask = f.nib(2);
            let (cc, suffix) = SyszCc::from_mask(mask);
            let (id, prefix, target) = if op == 0xa7 {
                (I::BRC, "j", f.rel16(2))
            } else {
                (I::BRCL, "jg", f.rel32(2))
            };
            let mut b = B::named(id, format!("{}{}", prefix, suffix));
            b.uimm(target).cond_branch(mask);
            if mask != 0 {
                b.group(G::BRANCH_RELATIVE);
            }
            Sysz { b, cc }
        }
        (0xa7, 5) | (0xc0, 5) => {
            let (id, target) = if op == 0xa7 {
                (I::BRAS, f.rel16(2))
            } else {
                (I::BRASL, f.rel32(2))
            };
            let mut b = B::new(id);
            b.gpr(f.nib(2), Access::WRITE)
                .uimm(target)
                .group(G::CALL)
                .group(G::BRANCH_RELATIVE);
            b.into()
        }
        (0xa7, 6) | (0xa7, 7) => {
            let mut b = B::new(if f.nib(3) == 6 { I::BRCT } else { I::BRCTG });
            b.gpr(f.nib(2), Access::READ_WRITE)
                .uimm(f.rel16(2))
                .group(G::JUMP)
                .group(G::BRANCH_RELATIVE);
            b.into()
        }
        (0xb2, _) if f.byte(1) == 0x22 => {
            if f.byte(2) != 0 || f.nib(7) != 0 {
                return None;
            }
            let mut b = B::new(I::IPM);
            b.gpr(f.nib(6), Access::WRITE).reads(&[R::CC]);
            b.into()
        }
        (0xb2, _) if f.byte(1) == 0x4f => {
            if f.byte(2) != 0 {
                return None;
            }
            let mut b = B::new(I::EAR);
            b.gpr(f.nib(6), Access::WRITE)
                .reg(R::ar(f.nib(7)), Access::READ);
            b.into()
        }
        (0xb9, _) if f.byte(1) == 0x46 => {
            if f.byte(2) != 0 {
                return None;
            }
            let mut b = B::new(I::BCTGR);
            b.gpr(f.nib(6), Access::READ_WRITE)
                .gpr(f.nib(7), Access::READ);
            if f.nib(7) != 0 {
                b.group(G::JUMP);
            }
            b.into()
        }
        (0xb9, _) if f.byte(1) == 0xf2 || f.byte(1) == 0xe2 => {
            if f.nib(5) != 0 {
                return None;
            }
            let id = if f.byte(1) == 0xf2 { I::LOCR } else { I::LOCGR };
            return Some(load_on_condition(f, id));
        }
        (0xec, _) => return compare_and_branch(f),
        _ => return None,
    };
    Some(insn)
}

fn load_on_condition(f: &Fields, id: I) -> Sysz {
    let mask = f.nib(4);
    let conditional = mask != 0 && mask != 15;
    let (cc, suffix) = SyszCc::from_mask(mask);
    let mut b = if conditional {
        B::named(id, format!("{}{}", id.name(), suffix))
    } else {
        B::new(id)
    };
    b.gpr(f.nib(6), Access::READ_WRITE)
        .gpr(f.nib(7), Access::READ)
        .group(G::LOADSTOREONCOND);
    if conditional {
        b.reads(&[R::CC]);
    } else {
        b.mask(mask);
    }
    Sysz { b, cc }
}

/// `crj`, `cij` and relatives, plus `risbg`; selected by the last byte.
fn compare_and_branch(f: &Fields) -> Option<Sysz> {
    let sub = f.byte(5);
    if sub == 0x55 {
        let mut b = B::new(I::RISBG);
        b.gpr(f.nib(2), Access::READ_WRITE)
            .gpr(f.nib(3), Access::READ)
            .uimm(f.byte(2) as u64)
            .uimm(f.byte(3) as u64)
            .uimm(f.byte(4) as u64)
            .writes(&[R::CC]);
        return Some(b.into());
    }
    let (id, immediate) = match sub {
        0x64 => (I::CGRJ, false),
        0x65 => (I::CLGRJ, false),
        0x76 => (I::CRJ, false),
        0x77 => (I::CLRJ, false),
        0x7c => (I::CGIJ, true),
        0x7d => (I::CLGIJ, true),
        0x7e => (I::CIJ, true),
        0x7f => (I::CLIJ, true),
        _ => return None,
    };
    if !immediate && f.nib(9) != 0 {
        return None;
    }
    let mask = if immediate { f.nib(3) } else { f.nib(8) };
    // Only the three comparison outcomes are meaningful here.
    let named = matches!(mask, 2 | 4 | 6 | 8 | 10 | 12);
    let (cc, suffix) = SyszCc::from_mask(mask);
    let mut b = if named {
        B::named(id, format!("{}{}", id.name(), suffix))
    } else {
        B::new(id)
    };
    b.gpr(f.nib(2), Access::READ);
    if matches!(id, I::CLIJ | I::CLGIJ) {
        b.uimm(f.byte(4) as u64);
    } else if immediate {
        b.imm(sign_extend(f.byte(4) as u64, 8));
    } else {
        b.gpr(f.nib(3), Access::READ);
    }
    if !named {
        b.mask(mask);
    }
    b.uimm(f.rel16(2))
        .group(G::JUMP)
        .group(G::BRANCH_RELATIVE);
    Some(Sysz {
        b,
        cc: if named { cc } else { SyszCc::Invalid },
    })
}

fn lookup(f: &Fields) -> Option<Entry> {
    use self::Form::*;
    use self::Role::*;
    use self::K::{Fp, Gr};

    let op = f.byte(0);
    let e = match op {
        0x10 => (I::LPR, Rr(Gr, Gr), Load, true),
        0x11 => (I::LNR, Rr(Gr, Gr), Load, true),
        0x12 => (I::LTR, Rr(Gr, Gr), Load, true),
        0x13 => (I::LCR, Rr(Gr, Gr), Load, true),
        0x14 => (I::NR, Rr(Gr, Gr), Modify, true),
        0x15 => (I::CLR, Rr(Gr, Gr), Compare, true),
        0x16 => (I::OR, Rr(Gr, Gr), Modify, true),
        0x17 => (I::XR, Rr(Gr, Gr), Modify, true),
        0x18 => (I::LR, Rr(Gr, Gr), Load, false),
        0x19 => (I::CR, Rr(Gr, Gr), Compare, true),
        0x1a => (I::AR, Rr(Gr, Gr), Modify, true),
        0x1b => (I::SR, Rr(Gr, Gr), Modify, true),
        0x1c => (I::MR, Rr(Gr, Gr), Modify, false),
        0x1d => (I::DR, Rr(Gr, Gr), Modify, false),
        0x1e => (I::ALR, Rr(Gr, Gr), Modify, true),
        0x1f => (I::SLR, Rr(Gr, Gr), Modify, true),
        0x28 => (I::LDR, Rr(Fp, Fp), Load, false),
        0x38 => (I::LER, Rr(Fp, Fp), Load, false),

        0x40 => (I::STH, Rx(Gr), Store, false),
        0x41 => (I::LA, Rx(Gr), Addr, false),
        0x42 => (I::STC, Rx(Gr), Store, false),
        0x43 => (I::IC, Rx(Gr), Modify, false),
        0x44 => (I::EX, Rx(Gr), Compare, false),
        0x48 => (I::LH, Rx(Gr), Load, false),
        0x49 => (I::CH, Rx(Gr), Compare, true),
        0x4a => (I::AH, Rx(Gr), Modify, true),
        0x4b => (I::SH, Rx(Gr), Modify, true),
        0x4c => (I::MH, Rx(Gr), Modify, false),
        0x50 => (I::ST, Rx(Gr), Store, false),
        0x54 => (I::N, Rx(Gr), Modify, true),
        0x55 => (I::CL, Rx(Gr), Compare, true),
        0x56 => (I::O, Rx(Gr), Modify, true),
        0x57 => (I::X, Rx(Gr), Modify, true),
        0x58 => (I::L, Rx(Gr), Load, false),
        0x59 => (I::C, Rx(Gr), Compare, true),
        0x5a => (I::A, Rx(Gr), Modify, true),
        0x5b => (I::S, Rx(Gr), Modify, true),
        0x5c => (I::M, Rx(Gr), Modify, false),
        0x5d => (I::D, Rx(Gr), Modify, false),
        0x5e => (I::AL, Rx(Gr), Modify, true),
        0x5f => (I::SL, Rx(Gr), Modify, true),
        0x60 => (I::STD, Rx(Fp), Store, false),
        0x68 => (I::LD, Rx(Fp), Load, false),
        0x70 => (I::STE, Rx(Fp), Store, false),
        0x78 => (I::LE, Rx(Fp), Load, false),

        0x88 => (I::SRL, RsShift, Modify, false),
        0x89 => (I::SLL, RsShift, Modify, false),
        0x8a => (I::SRA, RsShift, Modify, true),
        0x8b => (I::SLA, RsShift, Modify, true),
        0x8c => (I::SRDL, RsShift, Modify, false),
        0x8d => (I::SLDL, RsShift, Modify, false),
        0x8e => (I::SRDA, RsShift, Modify, true),
        0x8f => (I::SLDA, RsShift, Modify, true),
        0x90 => (I::STM, Rs, Store, false),
        0x98 => (I::LM, Rs, Load, false),
        0xba => (I::CS, Rs, Modify, true),

        0x91 => (I::TM, Si, Compare, true),
        0x92 => (I::MVI, Si, Store, false),
        0x94 => (I::NI, Si, Modify, true),
        0x95 => (I::CLI, Si, Compare, true),
        0x96 => (I::OI, Si, Modify, true),
        0x97 => (I::XI, Si, Modify, true),

        0xa5 => {
            const IDS: [I; 16] = [
                I::IIHH, I::IIHL, I::IILH, I::IILL, I::NIHH, I::NIHL, I::NILH, I::NILL,
                I::OIHH, I::OIHL, I::OILH, I::OILL, I::LLIHH, I::LLIHL, I::LLILH, I::LLILL,
            ];
            let sub = f.nib(3);
            let (role, cc) = match sub {
                0..=3 => (Modify, false),
                4..=11 => (Modify, true),
                _ => (Load, false),
            };
            (IDS[sub as usize], Ri(false), role, cc)
        }
        0xa7 => match f.nib(3) {
            0 => (I::TMLH, Ri(false), Compare, true),
            1 => (I::TMLL, Ri(false), Compare, true),
            2 => (I::TMHH, Ri(false), Compare, true),
            3 => (I::TMHL, Ri(false), Compare, true),
            8 => (I::LHI, Ri(true), Load, false),
            9 => (I::LGHI, Ri(true), Load, false),
            10 => (I::AHI, Ri(true), Modify, true),
            11 => (I::AGHI, Ri(true), Modify, true),
            12 => (I::MHI, Ri(true), Modify, false),
            13 => (I::MGHI, Ri(true), Modify, false),
            14 => (I::CHI, Ri(true), Compare, true),
            15 => (I::CGHI, Ri(true), Compare, true),
            _ => return None,
        },

        0xc0 => match f.nib(3) {
            0 => (I::LARL, RilRel, Addr, false),
            1 => (I::LGFI, Ril(true), Load, false),
            6 => (I::XIHF, Ril(false), Modify, true),
            7 => (I::XILF, Ril(false), Modify, true),
            8 => (I::IIHF, Ril(false), Modify, false),
            9 => (I::IILF, Ril(false), Modify, false),
            10 => (I::NIHF, Ril(false), Modify, true),
            11 => (I::NILF, Ril(false), Modify, true),
            12 => (I::OIHF, Ril(false), Modify, true),
            13 => (I::OILF, Ril(false), Modify, true),
            14 => (I::LLIHF, Ril(false), Load, false),
            15 => (I::LLILF, Ril(false), Load, false),
            _ => return None,
        },
        0xc2 => match f.nib(3) {
            4 => (I::SLGFI, Ril(false), Modify, true),
            5 => (I::SLFI, Ril(false), Modify, true),
            8 => (I::AGFI, Ril(true), Modify, true),
            9 => (I::AFI, Ril(true), Modify, true),
            10 => (I::ALGFI, Ril(false), Modify, true),
            11 => (I::ALFI, Ril(false), Modify, true),
            12 => (I::CGFI, Ril(true), Compare, true),
            13 => (I::CFI, Ril(true), Compare, true),
            14 => (I::CLGFI, Ril(false), Compare, true),
            15 => (I::CLFI, Ril(false), Compare, true),
            _ => return None,
        },
        0xc4 => match f.nib(3) {
            2 => (I::LLHRL, RilRel, Load, false),
            4 => (I::LGHRL, RilRel, Load, false),
            5 => (I::LHRL, RilRel, Load, false),
            7 => (I::STHRL, RilRel, Store, false),
            8 => (I::LGRL, RilRel, Load, false),
            11 => (I::STGRL, RilRel, Store, false),
            12 => (I::LGFRL, RilRel, Load, false),
            13 => (I::LRL, RilRel, Load, false),
            14 => (I::LLGFRL, RilRel, Load, false),
            15 => (I::STRL, RilRel, Store, false),
            _ => return None,
        },
        0xc6 if f.nib(3) == 0 => (I::EXRL, RilRel, Compare, false),

        0xb2 => match f.byte(1) {
            0x52 => (I::MSR, Rre(Gr, Gr), Modify, false),
            _ => return None,
        },
        0xb3 => fp_register(f.byte(1))?,
        0xb9 => register_64(f.byte(1))?,

        0xe3 => storage_long(f.byte(5))?,
        0xeb => match f.byte(5) {
            0x04 => (I::LMG, Rsy, Load, false),
            0x0a => (I::SRAG, RsyShift, Load, true),
            0x0b => (I::SLAG, RsyShift, Load, true),
            0x0c => (I::SRLG, RsyShift, Load, false),
            0x0d => (I::SLLG, RsyShift, Load, false),
            0x14 => (I::CSY, Rsy, Modify, true),
            0x1c => (I::RLLG, RsyShift, Load, false),
            0x1d => (I::RLL, RsyShift, Load, false),
            0x24 => (I::STMG, Rsy, Store, false),
            0x30 => (I::CSG, Rsy, Modify, true),
            0x51 => (I::TMY, Siy(false), Compare, true),
            0x52 => (I::MVIY, Siy(false), Store, false),
            0x54 => (I::NIY, Siy(false), Modify, true),
            0x55 => (I::CLIY, Siy(false), Compare, true),
            0x56 => (I::OIY, Siy(false), Modify, true),
            0x57 => (I::XIY, Siy(false), Modify, true),
            0x6a => (I::ASI, Siy(true), Modify, true),
            0x7a => (I::AGSI, Siy(true), Modify, true),
            0x90 => (I::STMY, Rsy, Store, false),
            0x98 => (I::LMY, Rsy, Load, false),
            0xdc => (I::SRAK, RsyShift, Load, true),
            0xdd => (I::SLAK, RsyShift, Load, true),
            0xde => (I::SRLK, RsyShift, Load, false),
            0xdf => (I::SLLK, RsyShift, Load, false),
            _ => return None,
        },
        0xed => match f.byte(5) {
            0x04 => (I::LDEB, Rxe, Load, false),
            0x09 => (I::CEB, Rxe, Compare, true),
            0x0a => (I::AEB, Rxe, Modify, true),
            0x0b => (I::SEB, Rxe, Modify, true),
            0x0d => (I::DEB, Rxe, Modify, false),
            0x17 => (I::MEEB, Rxe, Modify, false),
            0x19 => (I::CDB, Rxe, Compare, true),
            0x1a => (I::ADB, Rxe, Modify, true),
            0x1b => (I::SDB, Rxe, Modify, true),
            0x1c => (I::MDB, Rxe, Modify, false),
            0x1d => (I::DDB, Rxe, Modify, false),
            0x64 => (I::LEY, Rxy(Fp), Load, false),
            0x65 => (I::LDY, Rxy(Fp), Load, false),
            0x66 => (I::STEY, Rxy(Fp), Store, false),
            0x67 => (I::STDY, Rxy(Fp), Store, false),
            _ => return None,
        },

        0xd2 => (I::MVC, Ss, Store, false),
        0xd4 => (I::NC, Ss, Modify, true),
        0xd5 => (I::CLC, Ss, Compare, true),
        0xd6 => (I::OC, Ss, Modify, true),
        0xd7 => (I::XC, Ss, Modify, true),
        0xdc => (I::TR, Ss, Modify, false),
        _ => return None,
    };
    Some(e)
}

/// `0xb3xx` binary floating-point register forms.
fn fp_register(sub: u32) -> Option<Entry> {
    use self::Form::*;
    use self::Role::*;
    use self::K::{Fp, Gr};

    let e = match sub {
        0x00 => (I::LPEBR, Rre(Fp, Fp), Load, true),
        0x01 => (I::LNEBR, Rre(Fp, Fp), Load, true),
        0x02 => (I::LTEBR, Rre(Fp, Fp), Load, true),
        0x03 => (I::LCEBR, Rre(Fp, Fp), Load, true),
        0x04 => (I::LDEBR, Rre(Fp, Fp), Load, false),
        0x09 => (I::CEBR, Rre(Fp, Fp), Compare, true),
        0x0a => (I::AEBR, Rre(Fp, Fp), Modify, true),
        0x0b => (I::SEBR, Rre(Fp, Fp), Modify, true),
        0x0d => (I::DEBR, Rre(Fp, Fp), Modify, false),
        0x10 => (I::LPDBR, Rre(Fp, Fp), Load, true),
        0x11 => (I::LNDBR, Rre(Fp, Fp), Load, true),
        0x12 => (I::LTDBR, Rre(Fp, Fp), Load, true),
        0x13 => (I::LCDBR, Rre(Fp, Fp), Load, true),
        0x14 => (I::SQEBR, Rre(Fp, Fp), Load, false),
        0x15 => (I::SQDBR, Rre(Fp, Fp), Load, false),
        0x17 => (I::MEEBR, Rre(Fp, Fp), Modify, false),
        0x19 => (I::CDBR, Rre(Fp, Fp), Compare, true),
        0x1a => (I::ADBR, Rre(Fp, Fp), Modify, true),
        0x1b => (I::SDBR, Rre(Fp, Fp), Modify, true),
        0x1c => (I::MDBR, Rre(Fp, Fp), Modify, false),
        0x1d => (I::DDBR, Rre(Fp, Fp), Modify, false),
        0x44 => (I::LEDBR, Rre(Fp, Fp), Load, false),
        0x94 => (I::CEFBR, Rre(Fp, Gr), Load, false),
        0x95 => (I::CDFBR, Rre(Fp, Gr), Load, false),
        0x98 => (I::CFEBR, Rrfe, Load, true),
        0x99 => (I::CFDBR, Rrfe, Load, true),
        0xa4 => (I::CEGBR, Rre(Fp, Gr), Load, false),
        0xa5 => (I::CDGBR, Rre(Fp, Gr), Load, false),
        0xa8 => (I::CGEBR, Rrfe, Load, true),
        0xa9 => (I::CGDBR, Rrfe, Load, true),
        0xc1 => (I::LDGR, Rre(Fp, Gr), Load, false),
        0xcd => (I::LGDR, Rre(Gr, Fp), Load, false),
        _ => return None,
    };
    Some(e)
}

/// `0xb9xx` register forms, mostly 64-bit.
fn register_64(sub: u32) -> Option<Entry> {
    use self::Form::*;
    use self::Role::*;
    use self::K::Gr;

    let rre = |id, role, cc| (id, Rre(Gr, Gr), role, cc);
    let e = match sub {
        0x00 => rre(I::LPGR, Load, true),
        0x01 => rre(I::LNGR, Load, true),
        0x02 => rre(I::LTGR, Load, true),
        0x03 => rre(I::LCGR, Load, true),
        0x04 => rre(I::LGR, Load, false),
        0x06 => rre(I::LGBR, Load, false),
        0x07 => rre(I::LGHR, Load, false),
        0x08 => rre(I::AGR, Modify, true),
        0x09 => rre(I::SGR, Modify, true),
        0x0a => rre(I::ALGR, Modify, true),
        0x0b => rre(I::SLGR, Modify, true),
        0x0c => rre(I::MSGR, Modify, false),
        0x0d => rre(I::DSGR, Modify, false),
        0x0f => rre(I::LRVGR, Load, false),
        0x12 => rre(I::LTGFR, Load, true),
        0x14 => rre(I::LGFR, Load, false),
        0x16 => rre(I::LLGFR, Load, false),
        0x18 => rre(I::AGFR, Modify, true),
        0x19 => rre(I::SGFR, Modify, true),
        0x1f => rre(I::LRVR, Load, false),
        0x20 => rre(I::CGR, Compare, true),
        0x21 => rre(I::CLGR, Compare, true),
        0x26 => rre(I::LBR, Load, false),
        0x27 => rre(I::LHR, Load, false),
        0x30 => rre(I::CGFR, Compare, true),
        0x80 => rre(I::NGR, Modify, true),
        0x81 => rre(I::OGR, Modify, true),
        0x82 => rre(I::XGR, Modify, true),
        0x84 => rre(I::LLGCR, Load, false),
        0x85 => rre(I::LLGHR, Load, false),
        0x86 => rre(I::MLGR, Modify, false),
        0x87 => rre(I::DLGR, Modify, false),
        0x94 => rre(I::LLCR, Load, false),
        0x95 => rre(I::LLHR, Load, false),
        0xe4 => (I::NGRK, Rrfa, Load, true),
        0xe6 => (I::OGRK, Rrfa, Load, true),
        0xe7 => (I::XGRK, Rrfa, Load, true),
        0xe8 => (I::AGRK, Rrfa, Load, true),
        0xe9 => (I::SGRK, Rrfa, Load, true),
        0xea => (I::ALGRK, Rrfa, Load, true),
        0xeb => (I::SLGRK, Rrfa, Load, true),
        0xf4 => (I::NRK, Rrfa, Load, true),
        0xf6 => (I::ORK, Rrfa, Load, true),
        0xf7 => (I::XRK, Rrfa, Load, true),
        0xf8 => (I::ARK, Rrfa, Load, true),
        0xf9 => (I::SRK, Rrfa, Load, true),
        0xfa => (I::ALRK, Rrfa, Load, true),
        0xfb => (I::SLRK, Rrfa, Load, true),
        _ => return None,
    };
    Some(e)
}

/// `0xe3..xx` long-displacement storage forms.
fn storage_long(sub: u32) -> Option<Entry> {
    use self::Form::*;
    use self::Role::*;
    use self::K::Gr;

    let rxy = |id, role, cc| (id, Rxy(Gr), role, cc);
    let e = match sub {
        0x02 => rxy(I::LTG, Load, true),
        0x04 => rxy(I::LG, Load, false),
        0x08 => rxy(I::AG, Modify, true),
        0x09 => rxy(I::SG, Modify, true),
        0x0a => rxy(I::ALG, Modify, true),
        0x0b => rxy(I::SLG, Modify, true),
        0x0c => rxy(I::MSG, Modify, false),
        0x0f => rxy(I::LRVG, Load, false),
        0x12 => rxy(I::LT, Load, true),
        0x14 => rxy(I::LGF, Load, false),
        0x15 => rxy(I::LGH, Load, false),
        0x16 => rxy(I::LLGF, Load, false),
        0x18 => rxy(I::AGF, Modify, true),
        0x19 => rxy(I::SGF, Modify, true),
        0x1e => rxy(I::LRV, Load, false),
        0x20 => rxy(I::CG, Compare, true),
        0x21 => rxy(I::CLG, Compare, true),
        0x24 => rxy(I::STG, Store, false),
        0x2f => rxy(I::STRVG, Store, false),
        0x30 => rxy(I::CGF, Compare, true),
        0x3e => rxy(I::STRV, Store, false),
        0x50 => rxy(I::STY, Store, false),
        0x54 => rxy(I::NY, Modify, true),
        0x56 => rxy(I::OY, Modify, true),
        0x57 => rxy(I::XY, Modify, true),
        0x58 => rxy(I::LY, Load, false),
        0x59 => rxy(I::CY, Compare, true),
        0x5a => rxy(I::AY, Modify, true),
        0x5b => rxy(I::SY, Modify, true),
        0x70 => rxy(I::STHY, Store, false),
        0x71 => rxy(I::LAY, Addr, false),
        0x72 => rxy(I::STCY, Store, false),
        0x73 => rxy(I::ICY, Modify, false),
        0x76 => rxy(I::LB, Load, false),
        0x77 => rxy(I::LGB, Load, false),
        0x78 => rxy(I::LHY, Load, false),
        0x79 => rxy(I::CHY, Compare, true),
        0x7a => rxy(I::AHY, Modify, true),
        0x7b => rxy(I::SHY, Modify, true),
        0x80 => rxy(I::NG, Modify, true),
        0x81 => rxy(I::OG, Modify, true),
        0x82 => rxy(I::XG, Modify, true),
        0x90 => rxy(I::LLGC, Load, false),
        0x91 => rxy(I::LLGH, Load, false),
        0x94 => rxy(I::LLC, Load, false),
        0x95 => rxy(I::LLH, Load, false),
        _ => return None,
    };
    Some(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(code: &[u8]) -> String {
        let insn = decode(code, 0x1000).expect("valid encoding");
        let ops = insn.b.op_str();
        if ops.is_empty() {
            insn.b.mnemonic
        } else {
            format!("{} {}", insn.b.mnemonic, ops)
        }
    }

    #[rstest]
    #[case(&[0x28, 0x24], "ldr %f2, %f4")]
    #[case(&[0x68, 0x00, 0xf0, 0x00], "ld %f0, 0(%r15)")]
    #[case(&[0xb3, 0x1a, 0x00, 0x02], "adbr %f0, %f2")]
    #[case(&[0xb3, 0x95, 0x00, 0x01], "cdfbr %f0, %r1")]
    #[case(&[0xb3, 0x99, 0x50, 0x10], "cfdbr %r1, 5, %f0")]
    #[case(&[0xed, 0x00, 0xf0, 0x08, 0x00, 0x1a], "adb %f0, 8(%r15)")]
    #[case(&[0xed, 0x00, 0xf0, 0x08, 0x00, 0x65], "ldy %f0, 8(%r15)")]
    fn test_floating_point(#[case] code: &[u8], #[case] expected: &str) {
        assert_eq!(text(code), expected);
    }

    #[rstest]
    #[case(&[0xb9, 0xe8, 0x30, 0x12], "agrk %r1, %r2, %r3")]
    #[case(&[0xeb, 0x12, 0x00, 0x03, 0x00, 0x0d], "sllg %r1, %r2, 3")]
    #[case(&[0xeb, 0xff, 0xf0, 0x08, 0x00, 0x6a], "asi 8(%r15), -1")]
    #[case(&[0xc4, 0x1d, 0x00, 0x00, 0x00, 0x10], "lrl %r1, 0x1020")]
    #[case(&[0xc0, 0x1f, 0x00, 0x01, 0x00, 0x00], "llilf %r1, 0x10000")]
    #[case(&[0xa7, 0x11, 0x00, 0x01], "tmll %r1, 1")]
    #[case(&[0x58, 0x12, 0x00, 0x04], "l %r1, 4(%r2, 0)")]
    #[case(&[0xe3, 0x10, 0xf0, 0x08, 0x00, 0x50], "sty %r1, 8(%r15)")]
    #[case(&[0xec, 0x12, 0x00, 0x3f, 0x00, 0x55], "risbg %r1, %r2, 0, 0x3f, 0")]
    fn test_register_and_storage_forms(#[case] code: &[u8], #[case] expected: &str) {
        assert_eq!(text(code), expected);
    }

    #[rstest]
    #[case(&[0xc0, 0xf4, 0xff, 0xff, 0xff, 0xfe], "jg 0xffc")]
    #[case(&[0xa7, 0x04, 0x00, 0x05], "jnop 0x100a")]
    #[case(&[0x07, 0x0e], "nopr %r14")]
    #[case(&[0x07, 0xf0], "bcr 15, %r0")]
    #[case(&[0x47, 0xf0, 0x10, 0x00], "b 0(%r1)")]
    #[case(&[0xb9, 0xf2, 0x70, 0x12], "locrne %r1, %r2")]
    #[case(&[0xec, 0x12, 0x00, 0x05, 0x80, 0x76], "crje %r1, %r2, 0x100a")]
    #[case(&[0xec, 0x1a, 0x00, 0x05, 0x05, 0x7e], "cijhe %r1, 5, 0x100a")]
    #[case(&[0xec, 0x12, 0x00, 0x05, 0xf0, 0x76], "crj %r1, %r2, 15, 0x100a")]
    fn test_control_flow(#[case] code: &[u8], #[case] expected: &str) {
        assert_eq!(text(code), expected);
    }

    #[test]
    fn test_distinct_operand_group() {
        let insn = decode(&[0xb9, 0xf8, 0x30, 0x12], 0).unwrap();
        assert!(insn.b.groups.contains(&G::DISTINCTOPS.id()));
        assert_eq!(insn.b.regs_write, vec![R::CC.id()]);
    }

    #[test]
    fn test_load_on_condition_reads_cc() {
        let insn = decode(&[0xb9, 0xe2, 0x80, 0x12], 0).unwrap();
        assert_eq!(insn.b.mnemonic, "locgre");
        assert_eq!(insn.cc, SyszCc::E);
        assert_eq!(insn.b.regs_read, vec![R::CC.id()]);
        assert!(insn.b.groups.contains(&G::LOADSTOREONCOND.id()));
    }

    #[rstest]
    #[case(&[0x5d, 0xd9, 0x25, 0x89])]
    #[case(&[0x1d, 0x32])]
    #[case(&[0xb9, 0x87, 0x00, 0x32])]
    #[case(&[0x8c, 0x50, 0x00, 0x20])]
    #[case(&[0x8a, 0xf2, 0x21, 0x1f])]
    #[case(&[0xb9, 0x04, 0x10, 0x12])]
    #[case(&[0xb9, 0xe8, 0x31, 0x12])]
    #[case(&[0xed, 0x00, 0x00, 0x00, 0x01, 0x1a])]
    #[case(&[0xec, 0x12, 0x00, 0x05, 0x81, 0x76])]
    #[case(&[0xb2, 0x22, 0x00, 0x11])]
    fn test_reserved_fields_and_odd_pairs_rejected(#[case] code: &[u8]) {
        assert!(decode(code, 0x1000).is_none());
    }

    #[test]
    fn test_even_pairs_accepted() {
        assert_eq!(text(&[0x5d, 0x20, 0x10, 0x00]), "d %r2, 0(%r1)");
        assert_eq!(text(&[0x8c, 0x40, 0x00, 0x20]), "srdl %r4, 0x20");
    }

    #[test]
    fn test_masks_print_decimal() {
        assert_eq!(text(&[0xb9, 0xf2, 0xf0, 0x12]), "locr %r1, %r2, 15");
        assert_eq!(text(&[0xec, 0x12, 0x00, 0x05, 0xe0, 0x76]), "crj %r1, %r2, 14, 0x100a");
    }

    #[test]
    fn test_unknown_extended_opcodes() {
        assert!(decode(&[0xe3, 0x10, 0xf0, 0x08, 0x00, 0xff], 0).is_none());
        assert!(decode(&[0xb9, 0xff, 0x00, 0x12], 0).is_none());
        assert!(decode(&[0xa7, 0x10, 0x00, 0x01], 0).is_some());
    }
}
