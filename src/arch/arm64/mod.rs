//! AArch64 (A64 instruction set).

mod decode;
mod simd;
mod tables;

pub use self::tables::{Arm64Cc, Arm64Group, Arm64Insn, Arm64OpType, Arm64Reg};

use serde::Serialize;

use crate::decoder::{DecodeConfig, DecodeState, Decoded, Decoder};
use crate::insn::{push_reg, Access, ArchDetail, GroupId, InsnId, OperandInfo, RegId};
use crate::table::IdTable;
use crate::{Address, Arch, Mode};

/// Shift applied to a register or immediate operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Arm64Shift {
    Lsl(u32),
    Msl(u32),
    Lsr(u32),
    Asr(u32),
    Ror(u32),
}

impl Arm64Shift {
    /// Shift from the 2-bit `shift` field of the shifted-register forms.
    pub(crate) fn from_bits(kind: u32, amount: u32) -> Arm64Shift {
        match kind & 3 {
            0 => Arm64Shift::Lsl(amount),
            1 => Arm64Shift::Lsr(amount),
            2 => Arm64Shift::Asr(amount),
            _ => Arm64Shift::Ror(amount),
        }
    }

    pub fn amount(self) -> u32 {
        match self {
            Arm64Shift::Lsl(n)
            | Arm64Shift::Msl(n)
            | Arm64Shift::Lsr(n)
            | Arm64Shift::Asr(n)
            | Arm64Shift::Ror(n) => n,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Arm64Shift::Lsl(_) => "lsl",
            Arm64Shift::Msl(_) => "msl",
            Arm64Shift::Lsr(_) => "lsr",
            Arm64Shift::Asr(_) => "asr",
            Arm64Shift::Ror(_) => "ror",
        }
    }
}

/// Register extension of the extended-register and register-offset forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Arm64Extender {
    #[default]
    None,
    Uxtb,
    Uxth,
    Uxtw,
    Uxtx,
    Sxtb,
    Sxth,
    Sxtw,
    Sxtx,
}

impl Arm64Extender {
    pub(crate) fn from_option(option: u32) -> Arm64Extender {
        match option & 7 {
            0 => Arm64Extender::Uxtb,
            1 => Arm64Extender::Uxth,
            2 => Arm64Extender::Uxtw,
            3 => Arm64Extender::Uxtx,
            4 => Arm64Extender::Sxtb,
            5 => Arm64Extender::Sxth,
            6 => Arm64Extender::Sxtw,
            _ => Arm64Extender::Sxtx,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Arm64Extender::None => "",
            Arm64Extender::Uxtb => "uxtb",
            Arm64Extender::Uxth => "uxth",
            Arm64Extender::Uxtw => "uxtw",
            Arm64Extender::Uxtx => "uxtx",
            Arm64Extender::Sxtb => "sxtb",
            Arm64Extender::Sxth => "sxth",
            Arm64Extender::Sxtw => "sxtw",
            Arm64Extender::Sxtx => "sxtx",
        }
    }
}

/// Arrangement of a vector register operand: lane count and size, or a
/// single element size for indexed operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Arm64Vas {
    #[default]
    None,
    B8,
    B16,
    H4,
    H8,
    S2,
    S4,
    D1,
    D2,
    B,
    H,
    S,
    D,
}

impl Arm64Vas {
    /// Full-vector arrangement from an element `size` (0..=3) and the `Q` bit.
    pub(crate) fn from_size(size: u32, q: bool) -> Arm64Vas {
        match (size & 3, q) {
            (0, false) => Arm64Vas::B8,
            (0, true) => Arm64Vas::B16,
            (1, false) => Arm64Vas::H4,
            (1, true) => Arm64Vas::H8,
            (2, false) => Arm64Vas::S2,
            (2, true) => Arm64Vas::S4,
            (_, false) => Arm64Vas::D1,
            (_, true) => Arm64Vas::D2,
        }
    }

    /// Element arrangement of `size` (0..=3).
    pub(crate) fn element(size: u32) -> Arm64Vas {
        match size & 3 {
            0 => Arm64Vas::B,
            1 => Arm64Vas::H,
            2 => Arm64Vas::S,
            _ => Arm64Vas::D,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Arm64Vas::None => "",
            Arm64Vas::B8 => "8b",
            Arm64Vas::B16 => "16b",
            Arm64Vas::H4 => "4h",
            Arm64Vas::H8 => "8h",
            Arm64Vas::S2 => "2s",
            Arm64Vas::S4 => "4s",
            Arm64Vas::D1 => "1d",
            Arm64Vas::D2 => "2d",
            Arm64Vas::B => "b",
            Arm64Vas::H => "h",
            Arm64Vas::S => "s",
            Arm64Vas::D => "d",
        }
    }
}

/// PSTATE fields writable by `msr <pstatefield>, #imm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Arm64Pstate {
    SpSel,
    DaifSet,
    DaifClr,
}

/// Value carried by an operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Arm64OpKind {
    Reg(Arm64Reg),
    Imm(i64),
    /// `cN` of the system instructions
    Cimm(u32),
    Fp(f64),
    Mem {
        base: Arm64Reg,
        index: Arm64Reg,
        disp: i32,
    },
    /// System register encoding `op0:op1:CRn:CRm:op2`
    RegMrs(u32),
    RegMsr(u32),
    Pstate(Arm64Pstate),
    Sys(u32),
    Prefetch(u32),
    Barrier(u32),
}

/// One AArch64 operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arm64Operand {
    pub kind: Arm64OpKind,
    pub access: Access,
    pub shift: Option<Arm64Shift>,
    pub ext: Arm64Extender,
    /// Arrangement of a vector register
    pub vas: Arm64Vas,
    /// Lane of an indexed vector element
    pub vector_index: Option<u8>,
}

impl Arm64Operand {
    pub fn new(kind: Arm64OpKind, access: Access) -> Self {
        Self {
            kind,
            access,
            shift: None,
            ext: Arm64Extender::None,
            vas: Arm64Vas::None,
            vector_index: None,
        }
    }
}

impl OperandInfo for Arm64Operand {
    fn op_type(&self) -> u16 {
        let t = match self.kind {
            Arm64OpKind::Reg(_) => Arm64OpType::REG,
            Arm64OpKind::Imm(_) => Arm64OpType::IMM,
            Arm64OpKind::Cimm(_) => Arm64OpType::CIMM,
            Arm64OpKind::Fp(_) => Arm64OpType::FP,
            Arm64OpKind::Mem { .. } => Arm64OpType::MEM,
            Arm64OpKind::RegMrs(_) => Arm64OpType::REG_MRS,
            Arm64OpKind::RegMsr(_) => Arm64OpType::REG_MSR,
            Arm64OpKind::Pstate(_) => Arm64OpType::PSTATE,
            Arm64OpKind::Sys(_) => Arm64OpType::SYS,
            Arm64OpKind::Prefetch(_) => Arm64OpType::PREFETCH,
            Arm64OpKind::Barrier(_) => Arm64OpType::BARRIER,
        };
        t.id()
    }

    fn collect_regs(&self, reads: &mut Vec<RegId>, writes: &mut Vec<RegId>) {
        match self.kind {
            Arm64OpKind::Reg(reg) => {
                if self.access.contains(Access::READ) {
                    push_reg(reads, reg.id());
                }
                if self.access.contains(Access::WRITE) {
                    push_reg(writes, reg.id());
                }
            }
            Arm64OpKind::Mem { base, index, .. } => {
                push_reg(reads, base.id());
                push_reg(reads, index.id());
            }
            _ => {}
        }
    }
}

/// AArch64 detail record.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Arm64Detail {
    /// Condition of a conditional instruction, `INVALID` otherwise
    pub cc: Arm64Cc,
    /// Sets NZCV
    pub update_flags: bool,
    /// Pre- or post-indexed base update
    pub writeback: bool,
    pub operands: Vec<Arm64Operand>,
}

/// AArch64 decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Arm64Decoder;

impl Decoder for Arm64Decoder {
    fn arch(&self) -> Arch {
        Arch::Arm64
    }

    fn mode_mask(&self) -> Mode {
        Mode::BIG_ENDIAN
    }

    fn decode(
        &self,
        code: &[u8],
        address: Address,
        cfg: &DecodeConfig,
        _state: &mut DecodeState,
    ) -> Option<Decoded> {
        let word = crate::arch::read_u32(code, cfg.mode.is_big_endian())?;
        let (b, flags) = decode::decode(word, address)?;
        Some(b.finish(4, cfg.detail, |operands| {
            ArchDetail::Arm64(Arm64Detail {
                cc: flags.cc,
                update_flags: flags.update_flags,
                writeback: flags.writeback,
                operands,
            })
        }))
    }

    fn skipdata_len(&self, _mode: Mode) -> usize {
        4
    }

    fn reg_name(&self, reg: RegId) -> &'static str {
        Arm64Reg::name_of(reg)
    }

    fn insn_name(&self, id: InsnId) -> &'static str {
        Arm64Insn::name_of(id)
    }

    fn group_name(&self, id: GroupId) -> &'static str {
        Arm64Group::name_of(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(word: u32) -> Decoded {
        let mut cfg = DecodeConfig::new(Mode::LITTLE_ENDIAN);
        cfg.detail = true;
        Arm64Decoder
            .decode_one(&word.to_le_bytes(), 0x1000, &cfg)
            .expect("valid encoding")
    }

    #[test]
    fn test_stp_pre_index_detail() {
        // stp x29, x30, [sp, #-0x10]!
        let d = detail(0xa9bf_7bfd);
        assert_eq!(d.mnemonic, "stp");
        assert_eq!(d.op_str, "x29, x30, [sp, #-0x10]!");
        let detail = d.detail.unwrap();
        let a = detail.arch.arm64().unwrap();
        assert!(a.writeback);
        assert_eq!(a.operands.len(), 3);
        assert_eq!(
            a.operands[2].kind,
            Arm64OpKind::Mem {
                base: Arm64Reg::SP,
                index: Arm64Reg::INVALID,
                disp: -16
            }
        );
        assert!(detail.regs_write.contains(&Arm64Reg::SP.id()));
    }

    #[test]
    fn test_conditional_branch_detail() {
        // b.ne #0x1008
        let d = detail(0x5400_0041);
        assert_eq!(d.mnemonic, "b.ne");
        assert_eq!(d.op_str, "#0x1008");
        let detail = d.detail.unwrap();
        assert_eq!(detail.arch.arm64().unwrap().cc, Arm64Cc::NE);
        assert!(detail.in_group(Arm64Group::JUMP.id()));
    }

    #[test]
    fn test_flag_setting_compare() {
        // cmp x0, #0x10
        let d = detail(0xf100_401f);
        assert_eq!(d.mnemonic, "cmp");
        assert_eq!(d.op_str, "x0, #0x10");
        let detail = d.detail.unwrap();
        assert!(detail.arch.arm64().unwrap().update_flags);
        assert!(detail.regs_write.contains(&Arm64Reg::NZCV.id()));
    }

    #[test]
    fn test_vector_operand_detail() {
        // add v0.4s, v1.4s, v2.4s
        let d = detail(0x4ea2_8420);
        assert_eq!(d.mnemonic, "add");
        assert_eq!(d.op_str, "v0.4s, v1.4s, v2.4s");
        let detail = d.detail.unwrap();
        let a = detail.arch.arm64().unwrap();
        assert_eq!(a.operands.len(), 3);
        assert_eq!(a.operands[0].kind, Arm64OpKind::Reg(Arm64Reg::V0));
        assert!(a.operands.iter().all(|op| op.vas == Arm64Vas::S4));
        assert!(detail.regs_write.contains(&Arm64Reg::V0.id()));
        assert!(detail.in_group(Arm64Group::NEON.id()));
    }

    #[test]
    fn test_vector_element_detail() {
        // mov w0, v1.s[1]
        let d = detail(0x0e0c_3c20);
        assert_eq!(d.mnemonic, "mov");
        assert_eq!(d.op_str, "w0, v1.s[1]");
        let detail = d.detail.unwrap();
        let a = detail.arch.arm64().unwrap();
        assert_eq!(a.operands[1].vas, Arm64Vas::S);
        assert_eq!(a.operands[1].vector_index, Some(1));
        assert_eq!(a.operands[0].vector_index, None);
    }

    #[test]
    fn test_big_endian_words() {
        let cfg = DecodeConfig::new(Mode::BIG_ENDIAN);
        let d = Arm64Decoder
            .decode_one(&[0xd6, 0x5f, 0x03, 0xc0], 0, &cfg)
            .unwrap();
        assert_eq!(d.mnemonic, "ret");
    }
}
