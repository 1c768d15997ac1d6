//! ARM: A32, Thumb and Thumb-2, with the VFP register file.

mod a32;
mod asm;
mod tables;
mod thumb;

pub use self::tables::{ArmCc, ArmGroup, ArmInsn, ArmOpType, ArmReg};

use serde::Serialize;

use self::asm::Ctx;
use crate::decoder::{DecodeConfig, DecodeState, Decoded, Decoder};
use crate::insn::{push_reg, Access, GroupId, InsnId, OperandInfo, RegId};
use crate::table::IdTable;
use crate::{Address, Arch, Mode, Syntax};

/// Shift applied to a register operand, by immediate or by register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArmShift {
    Asr(u32),
    Lsl(u32),
    Lsr(u32),
    Ror(u32),
    Rrx,
    AsrReg(ArmReg),
    LslReg(ArmReg),
    LsrReg(ArmReg),
    RorReg(ArmReg),
}

impl ArmShift {
    /// Decode an immediate shift (`type`, `imm5`); `None` for `lsl #0`.
    pub(crate) fn from_imm(kind: u32, imm5: u32) -> Option<ArmShift> {
        match (kind & 3, imm5) {
            (0, 0) => None,
            (0, n) => Some(ArmShift::Lsl(n)),
            (1, 0) => Some(ArmShift::Lsr(32)),
            (1, n) => Some(ArmShift::Lsr(n)),
            (2, 0) => Some(ArmShift::Asr(32)),
            (2, n) => Some(ArmShift::Asr(n)),
            (_, 0) => Some(ArmShift::Rrx),
            (_, n) => Some(ArmShift::Ror(n)),
        }
    }

    /// Register-amount shift of the given type.
    pub(crate) fn from_reg(kind: u32, reg: ArmReg) -> ArmShift {
        match kind & 3 {
            0 => ArmShift::LslReg(reg),
            1 => ArmShift::LsrReg(reg),
            2 => ArmShift::AsrReg(reg),
            _ => ArmShift::RorReg(reg),
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            ArmShift::Asr(_) | ArmShift::AsrReg(_) => "asr",
            ArmShift::Lsl(_) | ArmShift::LslReg(_) => "lsl",
            ArmShift::Lsr(_) | ArmShift::LsrReg(_) => "lsr",
            ArmShift::Ror(_) | ArmShift::RorReg(_) => "ror",
            ArmShift::Rrx => "rrx",
        }
    }

    /// Shift-amount register, if any.
    pub fn reg(self) -> Option<ArmReg> {
        match self {
            ArmShift::AsrReg(r) | ArmShift::LslReg(r) | ArmShift::LsrReg(r) | ArmShift::RorReg(r) => {
                Some(r)
            }
            _ => None,
        }
    }
}

/// Memory barrier option of `dmb`, `dsb` and `isb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArmBarrier {
    OshLd,
    OshSt,
    Osh,
    NshLd,
    NshSt,
    Nsh,
    IshLd,
    IshSt,
    Ish,
    Ld,
    St,
    Sy,
}

impl ArmBarrier {
    pub(crate) fn from_option(option: u32) -> Option<ArmBarrier> {
        Some(match option & 15 {
            1 => ArmBarrier::OshLd,
            2 => ArmBarrier::OshSt,
            3 => ArmBarrier::Osh,
            5 => ArmBarrier::NshLd,
            6 => ArmBarrier::NshSt,
            7 => ArmBarrier::Nsh,
            9 => ArmBarrier::IshLd,
            10 => ArmBarrier::IshSt,
            11 => ArmBarrier::Ish,
            13 => ArmBarrier::Ld,
            14 => ArmBarrier::St,
            15 => ArmBarrier::Sy,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ArmBarrier::OshLd => "oshld",
            ArmBarrier::OshSt => "oshst",
            ArmBarrier::Osh => "osh",
            ArmBarrier::NshLd => "nshld",
            ArmBarrier::NshSt => "nshst",
            ArmBarrier::Nsh => "nsh",
            ArmBarrier::IshLd => "ishld",
            ArmBarrier::IshSt => "ishst",
            ArmBarrier::Ish => "ish",
            ArmBarrier::Ld => "ld",
            ArmBarrier::St => "st",
            ArmBarrier::Sy => "sy",
        }
    }
}

/// Value carried by an operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ArmOpKind {
    Reg(ArmReg),
    Imm(i64),
    Fp(f64),
    /// `[base, ±index, #disp]`; `scale` is -1 for a subtracted index
    Mem {
        base: ArmReg,
        index: ArmReg,
        scale: i32,
        disp: i32,
    },
    /// Coprocessor register `cN`
    Cimm(u32),
    /// Coprocessor number `pN`
    Pimm(u32),
    /// Special register field mask of `msr`/`mrs`
    SysReg(u32),
}

/// One ARM operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArmOperand {
    pub kind: ArmOpKind,
    pub access: Access,
    pub shift: Option<ArmShift>,
    /// Register or offset is subtracted from the base
    pub subtracted: bool,
    /// Lane of a `dN[i]` scalar
    pub vector_index: Option<u8>,
}

impl ArmOperand {
    pub fn new(kind: ArmOpKind, access: Access) -> Self {
        Self {
            kind,
            access,
            shift: None,
            subtracted: false,
            vector_index: None,
        }
    }

    pub fn reg(reg: ArmReg, access: Access) -> Self {
        Self::new(ArmOpKind::Reg(reg), access)
    }

    pub fn imm(value: i64) -> Self {
        Self::new(ArmOpKind::Imm(value), Access::empty())
    }
}

impl OperandInfo for ArmOperand {
    fn op_type(&self) -> u16 {
        let t = match self.kind {
            ArmOpKind::Reg(_) => ArmOpType::REG,
            ArmOpKind::Imm(_) => ArmOpType::IMM,
            ArmOpKind::Fp(_) => ArmOpType::FP,
            ArmOpKind::Mem { .. } => ArmOpType::MEM,
            ArmOpKind::Cimm(_) => ArmOpType::CIMM,
            ArmOpKind::Pimm(_) => ArmOpType::PIMM,
            ArmOpKind::SysReg(_) => ArmOpType::SYSREG,
        };
        t.id()
    }

    fn collect_regs(&self, reads: &mut Vec<RegId>, writes: &mut Vec<RegId>) {
        match self.kind {
            ArmOpKind::Reg(reg) => {
                if self.access.contains(Access::READ) {
                    push_reg(reads, reg.id());
                }
                if self.access.contains(Access::WRITE) {
                    push_reg(writes, reg.id());
                }
            }
            ArmOpKind::Mem { base, index, .. } => {
                push_reg(reads, base.id());
                push_reg(reads, index.id());
            }
            _ => {}
        }
        if let Some(r) = self.shift.and_then(ArmShift::reg) {
            push_reg(reads, r.id());
        }
    }
}

/// ARM detail record.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ArmDetail {
    /// Condition; `AL` when unconditional
    pub cc: ArmCc,
    /// Sets the condition flags
    pub update_flags: bool,
    /// Base register is written back
    pub writeback: bool,
    /// User-mode access (`ldrt`, `strt`)
    pub usermode: bool,
    /// Option of a barrier instruction
    pub mem_barrier: Option<ArmBarrier>,
    pub operands: Vec<ArmOperand>,
}

/// ARM / Thumb decoder. The Thumb IT block is carried in the sweep's
/// [`DecodeState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ArmDecoder;

impl ArmDecoder {
    fn is_thumb(mode: Mode) -> bool {
        mode.intersects(Mode::THUMB | Mode::MCLASS)
    }
}

impl Decoder for ArmDecoder {
    fn arch(&self) -> Arch {
        Arch::Arm
    }

    fn mode_mask(&self) -> Mode {
        Mode::THUMB | Mode::MCLASS | Mode::V8 | Mode::BIG_ENDIAN
    }

    fn supports_syntax(&self, syntax: Syntax) -> bool {
        matches!(syntax, Syntax::Default | Syntax::NoRegName)
    }

    fn decode(
        &self,
        code: &[u8],
        address: Address,
        cfg: &DecodeConfig,
        state: &mut DecodeState,
    ) -> Option<Decoded> {
        let cx = Ctx {
            numeric: cfg.syntax == Syntax::NoRegName,
            mclass: cfg.mode.contains(Mode::MCLASS),
        };
        let big_endian = cfg.mode.is_big_endian();
        let (asm, size) = if Self::is_thumb(cfg.mode) {
            thumb::decode(code, address, big_endian, &cx, &mut state.it)?
        } else {
            let word = crate::arch::read_u32(code, big_endian)?;
            (a32::decode(word, address, &cx)?, 4)
        };
        Some(asm.finish(size, cfg.detail))
    }

    fn skipdata_len(&self, mode: Mode) -> usize {
        if Self::is_thumb(mode) {
            2
        } else {
            4
        }
    }

    fn reg_name(&self, reg: RegId) -> &'static str {
        ArmReg::name_of(reg)
    }

    fn insn_name(&self, id: InsnId) -> &'static str {
        ArmInsn::name_of(id)
    }

    fn group_name(&self, id: GroupId) -> &'static str {
        ArmGroup::name_of(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8], address: Address, mode: Mode, detail: bool) -> Decoded {
        let mut cfg = DecodeConfig::new(mode);
        cfg.detail = detail;
        ArmDecoder
            .decode_one(bytes, address, &cfg)
            .expect("valid encoding")
    }

    #[test]
    fn test_bl_scenario() {
        let d = decode(&[0xed, 0xff, 0xff, 0xeb], 0x1000, Mode::ARM, true);
        assert_eq!(d.mnemonic, "bl");
        assert_eq!(d.op_str, "#0xfbc");
        assert_eq!(d.size, 4);
        let detail = d.detail.unwrap();
        assert!(detail.in_group(ArmGroup::CALL.id()));
        assert!(detail.in_group(ArmGroup::BRANCH_RELATIVE.id()));
        let arm = detail.arch.arm().unwrap();
        assert_eq!(arm.cc, ArmCc::AL);
        assert_eq!(arm.operands, vec![ArmOperand::imm(0xfbc)]);
        assert!(detail.regs_write.contains(&ArmReg::LR.id()));
    }

    #[test]
    fn test_noregname_syntax() {
        // push {fp, lr}
        let word: u32 = 0xe92d_4800;
        let mut cfg = DecodeConfig::new(Mode::ARM);
        let d = ArmDecoder.decode_one(&word.to_le_bytes(), 0, &cfg).unwrap();
        assert_eq!(d.op_str, "{fp, lr}");
        cfg.syntax = Syntax::NoRegName;
        let d = ArmDecoder.decode_one(&word.to_le_bytes(), 0, &cfg).unwrap();
        assert_eq!(d.op_str, "{r11, r14}");
        assert!(ArmDecoder.supports_syntax(Syntax::NoRegName));
        assert!(!ArmDecoder.supports_syntax(Syntax::Att));
    }

    #[test]
    fn test_load_detail_with_writeback() {
        // ldr r0, [r1, #4]!
        let d = decode(&0xe5b1_0004u32.to_le_bytes(), 0, Mode::ARM, true);
        assert_eq!(d.op_str, "r0, [r1, #4]!");
        let detail = d.detail.unwrap();
        let arm = detail.arch.arm().unwrap();
        assert!(arm.writeback);
        assert_eq!(
            arm.operands[1].kind,
            ArmOpKind::Mem {
                base: ArmReg::R1,
                index: ArmReg::INVALID,
                scale: 1,
                disp: 4
            }
        );
        assert!(detail.regs_write.contains(&ArmReg::R1.id()));
    }

    #[test]
    fn test_conditional_flag_setting() {
        // addseq r0, r1, #1
        let d = decode(&0x0291_0001u32.to_le_bytes(), 0, Mode::ARM, true);
        assert_eq!(d.mnemonic, "addseq");
        let detail = d.detail.unwrap();
        let arm = detail.arch.arm().unwrap();
        assert_eq!(arm.cc, ArmCc::EQ);
        assert!(arm.update_flags);
        assert!(detail.regs_read.contains(&ArmReg::CPSR.id()));
        assert!(detail.regs_write.contains(&ArmReg::CPSR.id()));
    }

    #[test]
    fn test_shift_operand_detail() {
        // add r0, r1, r2, lsl #2
        let d = decode(&0xe081_0102u32.to_le_bytes(), 0, Mode::ARM, true);
        assert_eq!(d.op_str, "r0, r1, r2, lsl #2");
        let detail = d.detail.unwrap();
        let ops = &detail.arch.arm().unwrap().operands;
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[2].shift, Some(ArmShift::Lsl(2)));
    }

    #[test]
    fn test_barrier_detail() {
        let d = decode(&0xf57f_f05bu32.to_le_bytes(), 0, Mode::ARM, true);
        assert_eq!((d.mnemonic.as_str(), d.op_str.as_str()), ("dmb", "ish"));
        let detail = d.detail.unwrap();
        assert_eq!(detail.arch.arm().unwrap().mem_barrier, Some(ArmBarrier::Ish));
    }

    #[test]
    fn test_thumb_sizes_and_skip() {
        let d = decode(&[0x80, 0xb5], 0, Mode::THUMB, false);
        assert_eq!((d.mnemonic.as_str(), d.op_str.as_str(), d.size), ("push", "{r7, lr}", 2));
        let d = decode(&[0xff, 0xf7, 0xfe, 0xff], 0x1000, Mode::THUMB, false);
        assert_eq!((d.mnemonic.as_str(), d.op_str.as_str(), d.size), ("bl", "#0x1000", 4));
        assert_eq!(ArmDecoder.skipdata_len(Mode::MCLASS), 2);
        assert!(ArmDecoder.check_mode(Mode::THUMB | Mode::MCLASS));
        assert!(!ArmDecoder.check_mode(Mode::MODE_64));
    }

    #[test]
    fn test_it_block_conditions_follow() {
        // ite eq; moveq r0, #1; movne r0, #0
        let code = [0x0c, 0xbf, 0x01, 0x20, 0x00, 0x20];
        let cfg = DecodeConfig::new(Mode::THUMB);
        let mut state = DecodeState::default();
        let mut offset = 0;
        let mut out = Vec::new();
        while offset < code.len() {
            let d = ArmDecoder
                .decode(&code[offset..], offset as Address, &cfg, &mut state)
                .unwrap();
            offset += d.size;
            out.push(format!("{} {}", d.mnemonic, d.op_str));
        }
        assert_eq!(out, vec!["ite eq", "moveq r0, #1", "movne r0, #0"]);
        assert_eq!(state, DecodeState::default());
    }

    #[test]
    fn test_big_endian_arm() {
        let d = decode(&[0xe1, 0x2f, 0xff, 0x1e], 0, Mode::BIG_ENDIAN, false);
        assert_eq!((d.mnemonic.as_str(), d.op_str.as_str()), ("bx", "lr"));
    }
}
