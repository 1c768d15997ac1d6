//! SPARC V8 with the common V9 additions. Always big-endian.

mod decode;
mod tables;

pub use self::tables::{SparcGroup, SparcInsn, SparcOpType, SparcReg};

use bitflags::bitflags;
use serde::Serialize;

use crate::decoder::{DecodeConfig, DecodeState, Decoded, Decoder};
use crate::insn::{push_reg, Access, ArchDetail, GroupId, InsnId, OperandInfo, RegId};
use crate::table::IdTable;
use crate::{Address, Arch, Mode};

/// Branch condition, integer (`Icc*`) or floating-point (`Fcc*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SparcCc {
    #[default]
    Invalid,
    IccA,
    IccN,
    IccNe,
    IccE,
    IccG,
    IccLe,
    IccGe,
    IccL,
    IccGu,
    IccLeu,
    IccCc,
    IccCs,
    IccPos,
    IccNeg,
    IccVc,
    IccVs,
    FccA,
    FccN,
    FccU,
    FccG,
    FccUg,
    FccL,
    FccUl,
    FccLg,
    FccNe,
    FccE,
    FccUe,
    FccGe,
    FccUge,
    FccLe,
    FccUle,
    FccO,
}

/// Integer conditions by their 4-bit `cond` field.
const ICC: [(SparcCc, &str); 16] = [
    (SparcCc::IccN, "n"),
    (SparcCc::IccE, "e"),
    (SparcCc::IccLe, "le"),
    (SparcCc::IccL, "l"),
    (SparcCc::IccLeu, "leu"),
    (SparcCc::IccCs, "cs"),
    (SparcCc::IccNeg, "neg"),
    (SparcCc::IccVs, "vs"),
    (SparcCc::IccA, "a"),
    (SparcCc::IccNe, "ne"),
    (SparcCc::IccG, "g"),
    (SparcCc::IccGe, "ge"),
    (SparcCc::IccGu, "gu"),
    (SparcCc::IccCc, "cc"),
    (SparcCc::IccPos, "pos"),
    (SparcCc::IccVc, "vc"),
];

/// Floating-point conditions by their 4-bit `cond` field.
const FCC: [(SparcCc, &str); 16] = [
    (SparcCc::FccN, "n"),
    (SparcCc::FccNe, "ne"),
    (SparcCc::FccLg, "lg"),
    (SparcCc::FccUl, "ul"),
    (SparcCc::FccL, "l"),
    (SparcCc::FccUg, "ug"),
    (SparcCc::FccG, "g"),
    (SparcCc::FccU, "u"),
    (SparcCc::FccA, "a"),
    (SparcCc::FccE, "e"),
    (SparcCc::FccUe, "ue"),
    (SparcCc::FccGe, "ge"),
    (SparcCc::FccUge, "uge"),
    (SparcCc::FccLe, "le"),
    (SparcCc::FccUle, "ule"),
    (SparcCc::FccO, "o"),
];

impl SparcCc {
    pub fn icc(cond: u32) -> (SparcCc, &'static str) {
        ICC[(cond & 15) as usize]
    }

    pub fn fcc(cond: u32) -> (SparcCc, &'static str) {
        FCC[(cond & 15) as usize]
    }

    /// Whether the condition reads the flags at all (`a` and `n` do not).
    pub fn tests_flags(self) -> bool {
        !matches!(
            self,
            SparcCc::Invalid | SparcCc::IccA | SparcCc::IccN | SparcCc::FccA | SparcCc::FccN
        )
    }
}

bitflags! {
    /// Branch annul and prediction bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct SparcHint: u8 {
        /// `,a`: the delay slot is annulled when the branch is not taken
        const A  = 1 << 0;
        /// `,pt`: predicted taken
        const PT = 1 << 1;
        /// `,pn`: predicted not taken
        const PN = 1 << 2;
    }
}

/// One SPARC operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SparcOperand {
    Reg { reg: SparcReg, access: Access },
    Imm(i64),
    /// `[base + index]` or `[base + disp]`
    Mem {
        base: SparcReg,
        index: SparcReg,
        disp: i32,
        access: Access,
    },
}

impl SparcOperand {
    pub fn reg(reg: SparcReg, access: Access) -> Self {
        SparcOperand::Reg { reg, access }
    }

    pub fn imm(value: i64) -> Self {
        SparcOperand::Imm(value)
    }
}

impl OperandInfo for SparcOperand {
    fn op_type(&self) -> u16 {
        match self {
            SparcOperand::Reg { .. } => SparcOpType::REG as u16,
            SparcOperand::Imm(_) => SparcOpType::IMM as u16,
            SparcOperand::Mem { .. } => SparcOpType::MEM as u16,
        }
    }

    fn collect_regs(&self, reads: &mut Vec<RegId>, writes: &mut Vec<RegId>) {
        match *self {
            SparcOperand::Reg { reg, access } => {
                if access.contains(Access::READ) {
                    push_reg(reads, reg.id());
                }
                if access.contains(Access::WRITE) {
                    push_reg(writes, reg.id());
                }
            }
            SparcOperand::Mem { base, index, .. } => {
                push_reg(reads, base.id());
                push_reg(reads, index.id());
            }
            SparcOperand::Imm(_) => {}
        }
    }
}

/// SPARC detail record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SparcDetail {
    /// Condition of a conditional branch or trap
    pub cc: SparcCc,
    pub hint: SparcHint,
    pub operands: Vec<SparcOperand>,
}

/// SPARC decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparcDecoder;

impl Decoder for SparcDecoder {
    fn arch(&self) -> Arch {
        Arch::Sparc
    }

    fn mode_mask(&self) -> Mode {
        Mode::BIG_ENDIAN | Mode::V9
    }

    fn decode(
        &self,
        code: &[u8],
        address: Address,
        cfg: &DecodeConfig,
        _state: &mut DecodeState,
    ) -> Option<Decoded> {
        let word = crate::arch::read_u32(code, true)?;
        let insn = decode::decode(word, address, cfg.mode.contains(Mode::V9))?;
        let (cc, hint) = (insn.cc, insn.hint);
        Some(insn.b.finish(4, cfg.detail, |operands| {
            ArchDetail::Sparc(SparcDetail {
                cc,
                hint,
                operands,
            })
        }))
    }

    fn skipdata_len(&self, _mode: Mode) -> usize {
        4
    }

    fn reg_name(&self, reg: RegId) -> &'static str {
        SparcReg::name_of(reg)
    }

    fn insn_name(&self, id: InsnId) -> &'static str {
        SparcInsn::name_of(id)
    }

    fn group_name(&self, id: GroupId) -> &'static str {
        SparcGroup::name_of(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insn::group;
    use rstest::rstest;

    fn dis_in(word: u32, mode: Mode) -> Option<String> {
        let cfg = DecodeConfig::new(mode | Mode::BIG_ENDIAN);
        SparcDecoder
            .decode_one(&word.to_be_bytes(), 0x1000, &cfg)
            .map(|d| {
                if d.op_str.is_empty() {
                    d.mnemonic
                } else {
                    format!("{} {}", d.mnemonic, d.op_str)
                }
            })
    }

    fn dis(word: u32) -> String {
        dis_in(word, Mode::empty()).expect("valid encoding")
    }

    #[rstest]
    #[case(0x0100_0000, "nop")]
    #[case(0x4000_0004, "call 0x1010")]
    #[case(0x9de3_bfa0, "save %sp, -0x60, %sp")]
    #[case(0x81c7_e008, "ret")]
    #[case(0x81c3_e008, "retl")]
    #[case(0x81e8_0000, "restore")]
    #[case(0x9010_2001, "mov 1, %o0")]
    #[case(0xa010_0008, "mov %o0, %l0")]
    #[case(0x9010_0000, "clr %o0")]
    #[case(0x80a2_0009, "cmp %o0, %o1")]
    #[case(0x8090_0008, "tst %o0")]
    #[case(0x9402_0009, "add %o0, %o1, %o2")]
    #[case(0x932a_2002, "sll %o0, 2, %o1")]
    #[case(0xd007_bfec, "ld [%fp-0x14], %o0")]
    #[case(0xd027_bfec, "st %o0, [%fp-0x14]")]
    #[case(0x0300_0004, "sethi 4, %g1")]
    #[case(0x1280_0002, "bne 0x1008")]
    #[case(0x3280_0002, "bne,a 0x1008")]
    #[case(0x1080_0002, "ba 0x1008")]
    #[case(0x91d0_2005, "ta 5")]
    #[case(0x81c0_4000, "jmp %g1")]
    #[case(0x9fc0_4000, "call %g1")]
    #[case(0x9140_0000, "rd %y, %o0")]
    #[case(0x85a0_0821, "fadds %f0, %f1, %f2")]
    #[case(0x89a0_0842, "faddd %f0, %f2, %f4")]
    #[case(0x81a8_0a21, "fcmps %f0, %f1")]
    fn test_v8_text(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(dis(word), expected);
    }

    #[rstest]
    #[case(0x1260_0002, "bne,pn %xcc, 0x1008")]
    #[case(0x02ca_0002, "brz %o0, 0x1008")]
    #[case(0x932a_3020, "sllx %o0, 0x20, %o1")]
    #[case(0xd25a_2008, "ldx [%o0+8], %o1")]
    fn test_v9_only(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(dis_in(word, Mode::V9).as_deref(), Some(expected));
        assert_eq!(dis_in(word, Mode::empty()), None);
    }

    #[test]
    fn test_fcmp_names_the_fcc_in_v9() {
        assert_eq!(
            dis_in(0x81a8_0a21, Mode::V9).as_deref(),
            Some("fcmps %fcc0, %f0, %f1")
        );
    }

    #[test]
    fn test_branch_detail() {
        let mut cfg = DecodeConfig::new(Mode::BIG_ENDIAN);
        cfg.detail = true;
        let d = SparcDecoder.decode_one(&0x3280_0002u32.to_be_bytes(), 0x1000, &cfg).unwrap();
        let detail = d.detail.unwrap();
        let sparc = detail.arch.sparc().unwrap();
        assert_eq!(sparc.cc, SparcCc::IccNe);
        assert_eq!(sparc.hint, SparcHint::A);
        assert_eq!(sparc.operands, vec![SparcOperand::imm(0x1008)]);
        assert!(detail.in_group(group::JUMP));
        assert_eq!(detail.regs_read, vec![SparcReg::ICC.id()]);
    }

    #[test]
    fn test_memory_operand_detail() {
        let mut cfg = DecodeConfig::new(Mode::BIG_ENDIAN);
        cfg.detail = true;
        let d = SparcDecoder.decode_one(&0xd007_bfecu32.to_be_bytes(), 0, &cfg).unwrap();
        let ops = d.detail.unwrap().arch.sparc().unwrap().operands.clone();
        assert_eq!(
            ops,
            vec![
                SparcOperand::Mem {
                    base: SparcReg::FP,
                    index: SparcReg::INVALID,
                    disp: -20,
                    access: Access::READ,
                },
                SparcOperand::reg(SparcReg::O0, Access::WRITE),
            ]
        );
    }

    #[test]
    fn test_byte_order_is_fixed() {
        // The mode never carries BIG_ENDIAN here, yet words read big-endian.
        let cfg = DecodeConfig::new(Mode::empty());
        let d = SparcDecoder.decode_one(&[0x01, 0x00, 0x00, 0x00], 0, &cfg).unwrap();
        assert_eq!(d.mnemonic, "nop");
    }
}
