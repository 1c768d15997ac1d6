//! Instruction assembly shared by the A32 and Thumb decoders.

use super::{
    ArmBarrier, ArmCc, ArmDetail, ArmGroup as G, ArmInsn as I, ArmOpKind as K, ArmOperand,
    ArmReg as R, ArmShift,
};
use crate::arch::{fmt_imm, fmt_uimm, InsnBuilder};
use crate::decoder::Decoded;
use crate::insn::{Access, ArchDetail};
use crate::table::IdTable;
use crate::Address;

/// Session settings that change rendering.
#[derive(Debug, Clone, Copy)]
pub(super) struct Ctx {
    /// Print core registers as `rN`
    pub numeric: bool,
    /// Cortex-M special registers for `mrs`/`msr`
    pub mclass: bool,
}

/// Addressing form of a memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Index {
    Offset,
    Pre,
    Post,
}

impl Index {
    /// From the `P` and `W` bits.
    pub fn from_pw(p: bool, w: bool) -> Index {
        match (p, w) {
            (true, false) => Index::Offset,
            (true, true) => Index::Pre,
            (false, _) => Index::Post,
        }
    }
}

/// An ARM instruction under construction.
#[derive(Debug)]
pub(super) struct Asm {
    pub b: InsnBuilder<I, ArmOperand>,
    pub cc: ArmCc,
    /// Flag-setting `s` in the mnemonic
    pub s: bool,
    /// Trailing mnemonic suffix: `.w`, a VFP data type
    pub suffix: &'static str,
    pub writeback: bool,
    pub usermode: bool,
    pub barrier: Option<ArmBarrier>,
    numeric: bool,
}

impl Asm {
    pub fn new(id: I, cx: &Ctx) -> Asm {
        Asm::named(id, id.name(), cx)
    }

    pub fn named(id: I, base: &str, cx: &Ctx) -> Asm {
        Asm {
            b: InsnBuilder::named(id, base),
            cc: ArmCc::AL,
            s: false,
            suffix: "",
            writeback: false,
            usermode: false,
            barrier: None,
            numeric: cx.numeric,
        }
    }

    pub fn id(&self) -> I {
        self.b.id
    }

    /// Printed name of a register.
    pub fn name(&self, r: R) -> String {
        if self.numeric {
            r.numeric_name()
        } else {
            r.name().to_string()
        }
    }

    pub fn set_flags(&mut self) -> &mut Self {
        self.s = true;
        self.b.writes(&[R::CPSR]);
        self
    }

    /// Flags are written without an `s` in the mnemonic (compares, tests).
    pub fn writes_flags(&mut self) -> &mut Self {
        self.b.writes(&[R::CPSR]);
        self
    }

    pub fn cond(&mut self, cc: ArmCc) -> &mut Self {
        self.cc = cc;
        if cc != ArmCc::AL {
            self.b.reads(&[R::CPSR]);
        }
        self
    }

    pub fn wide(&mut self) -> &mut Self {
        self.suffix = ".w";
        self
    }

    pub fn group(&mut self, g: G) -> &mut Self {
        self.b.group(g);
        self
    }

    pub fn reg(&mut self, r: R, access: Access) -> &mut Self {
        let text = self.name(r);
        self.b.push(ArmOperand::reg(r, access), text);
        self
    }

    pub fn gpr(&mut self, n: u32, access: Access) -> &mut Self {
        self.reg(R::gpr(n), access)
    }

    /// Register with an optional shift, printed as `rm, lsl #n`.
    pub fn shifted(&mut self, n: u32, shift: Option<ArmShift>) -> &mut Self {
        let r = R::gpr(n);
        let mut op = ArmOperand::reg(r, Access::READ);
        op.shift = shift;
        let mut text = self.name(r);
        if let Some(sh) = shift {
            text.push_str(", ");
            text.push_str(&self.shift_text(sh));
        }
        self.b.push(op, text);
        self
    }

    pub fn shift_text(&self, sh: ArmShift) -> String {
        match sh {
            ArmShift::Rrx => "rrx".to_string(),
            ArmShift::Asr(n) | ArmShift::Lsl(n) | ArmShift::Lsr(n) | ArmShift::Ror(n) => {
                format!("{} #{}", sh.mnemonic(), n)
            }
            ArmShift::AsrReg(r) | ArmShift::LslReg(r) | ArmShift::LsrReg(r) | ArmShift::RorReg(r) => {
                format!("{} {}", sh.mnemonic(), self.name(r))
            }
        }
    }

    pub fn imm(&mut self, value: i64) -> &mut Self {
        self.b.push(ArmOperand::imm(value), format!("#{}", fmt_imm(value)));
        self
    }

    pub fn uimm(&mut self, value: u32) -> &mut Self {
        self.b
            .push(ArmOperand::imm(value as i64), format!("#{}", fmt_uimm(value as u64)));
        self
    }

    /// PC-relative branch target.
    pub fn target(&mut self, address: Address) -> &mut Self {
        let address = address & 0xffff_ffff;
        self.b
            .push(ArmOperand::imm(address as i64), format!("#{}", fmt_uimm(address)));
        self.b.group(G::BRANCH_RELATIVE);
        self
    }

    pub fn writeback(&mut self, base: R) -> &mut Self {
        self.writeback = true;
        self.b.writes(&[base]);
        self
    }

    fn mem_op(base: R, index: R, add: bool, disp: i32, access: Access) -> ArmOperand {
        let mut op = ArmOperand::new(
            K::Mem {
                base,
                index,
                scale: if add { 1 } else { -1 },
                disp,
            },
            access,
        );
        op.subtracted = !add;
        op
    }

    /// `[rn, #±imm]`, `[rn, #±imm]!` or `[rn], #±imm`.
    pub fn mem_imm(&mut self, rn: R, add: bool, imm: u32, index: Index, access: Access) -> &mut Self {
        let disp = if add { imm as i32 } else { (imm as i32).wrapping_neg() };
        let base = self.name(rn);
        let off = format!("#{}{}", if add { "" } else { "-" }, fmt_uimm(imm as u64));
        match index {
            Index::Offset => {
                let text = if add && imm == 0 {
                    format!("[{}]", base)
                } else {
                    format!("[{}, {}]", base, off)
                };
                self.b.push(Self::mem_op(rn, R::INVALID, true, disp, access), text);
            }
            Index::Pre => {
                self.b.push(
                    Self::mem_op(rn, R::INVALID, true, disp, access),
                    format!("[{}, {}]!", base, off),
                );
                self.writeback(rn);
            }
            Index::Post => {
                self.b.push(
                    Self::mem_op(rn, R::INVALID, true, 0, access),
                    format!("[{}]", base),
                );
                let mut op = ArmOperand::imm(imm as i64);
                op.subtracted = !add;
                self.b.push(op, off);
                self.writeback(rn);
            }
        }
        self
    }

    /// `[rn, ±rm{, shift}]` and its indexed forms.
    pub fn mem_reg(
        &mut self,
        rn: R,
        rm: R,
        add: bool,
        shift: Option<ArmShift>,
        index: Index,
        access: Access,
    ) -> &mut Self {
        let base = self.name(rn);
        let mut off = format!("{}{}", if add { "" } else { "-" }, self.name(rm));
        if let Some(sh) = shift {
            off.push_str(", ");
            off.push_str(&self.shift_text(sh));
        }
        match index {
            Index::Offset | Index::Pre => {
                let mut op = Self::mem_op(rn, rm, add, 0, access);
                op.shift = shift;
                let bang = if index == Index::Pre { "!" } else { "" };
                self.b.push(op, format!("[{}, {}]{}", base, off, bang));
                if index == Index::Pre {
                    self.writeback(rn);
                }
            }
            Index::Post => {
                self.b.push(
                    Self::mem_op(rn, R::INVALID, true, 0, access),
                    format!("[{}]", base),
                );
                let mut op = ArmOperand::reg(rm, Access::READ);
                op.shift = shift;
                op.subtracted = !add;
                self.b.push(op, off);
                self.writeback(rn);
            }
        }
        self
    }

    /// `{r4, r5, lr}` from a 16-bit register mask.
    pub fn reglist(&mut self, mask: u32, access: Access) -> &mut Self {
        let mut names = Vec::new();
        for n in (0..16).filter(|n| mask & (1 << n) != 0) {
            let r = R::gpr(n);
            names.push(self.name(r));
            self.b.push_op(ArmOperand::reg(r, access));
        }
        self.b.push_text(format!("{{{}}}", names.join(", ")));
        self
    }

    /// `{d8, d9}` of `count` consecutive VFP registers.
    pub fn vreglist(&mut self, first: R, count: u32, access: Access) -> &mut Self {
        let mut names = Vec::new();
        for k in 0..count {
            let r = R::from_id(first.id() + k as u16).unwrap_or_default();
            names.push(r.name().to_string());
            self.b.push_op(ArmOperand::reg(r, access));
        }
        self.b.push_text(format!("{{{}}}", names.join(", ")));
        self
    }

    /// Mnemonic as printed: base, `s`, condition, suffix.
    fn mnemonic(&self) -> String {
        format!(
            "{}{}{}{}",
            self.b.mnemonic,
            if self.s { "s" } else { "" },
            self.cc.suffix(),
            self.suffix
        )
    }

    pub fn finish(mut self, size: usize, detail: bool) -> Decoded {
        self.b.mnemonic = self.mnemonic();
        let Asm {
            b,
            cc,
            s,
            writeback,
            usermode,
            barrier,
            ..
        } = self;
        b.finish(size, detail, |operands| {
            ArchDetail::Arm(ArmDetail {
                cc,
                update_flags: s,
                writeback,
                usermode,
                mem_barrier: barrier,
                operands,
            })
        })
    }
}

/// Groups and implicit registers of a write to PC.
pub(super) fn pc_write(a: &mut Asm, from_lr: bool) {
    a.group(G::JUMP);
    if from_lr {
        a.group(G::RET);
    }
}

/// Format a VFP immediate as `#1.000000e+00`.
pub(super) fn fp_text(value: f64) -> String {
    let s = format!("{:.6e}", value);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("#{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => format!("#{}", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fp_text() {
        assert_eq!(fp_text(1.0), "#1.000000e+00");
        assert_eq!(fp_text(-0.5), "#-5.000000e-01");
        assert_eq!(fp_text(31.0), "#3.100000e+01");
    }

    #[test]
    fn test_memory_text_forms() {
        let cx = Ctx {
            numeric: false,
            mclass: false,
        };
        let mut a = Asm::new(I::LDR, &cx);
        a.mem_imm(R::R1, true, 0, Index::Offset, Access::READ)
            .mem_imm(R::R1, false, 8, Index::Offset, Access::READ)
            .mem_imm(R::SP, true, 16, Index::Pre, Access::READ);
        assert_eq!(a.b.op_str(), "[r1], [r1, #-8], [sp, #0x10]!");
        let mut a = Asm::new(I::LDR, &cx);
        a.mem_reg(R::R0, R::R1, false, Some(ArmShift::Lsl(2)), Index::Post, Access::READ);
        assert_eq!(a.b.op_str(), "[r0], -r1, lsl #2");
        assert!(a.writeback);
    }

    #[test]
    fn test_shift_amounts_print_decimal() {
        let cx = Ctx {
            numeric: false,
            mclass: false,
        };
        let mut a = Asm::new(I::MOV, &cx);
        a.shifted(1, Some(ArmShift::Lsr(20)))
            .shifted(2, Some(ArmShift::Ror(31)));
        assert_eq!(a.b.op_str(), "r1, lsr #20, r2, ror #31");
    }
}
