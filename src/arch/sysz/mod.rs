//! SystemZ (z/Architecture). Always big-endian; instructions are 2, 4 or
//! 6 bytes long as announced by the top two bits of the first byte.

mod decode;
mod tables;

pub use self::tables::{SyszGroup, SyszInsn, SyszOpType, SyszReg};

use serde::Serialize;

use crate::decoder::{DecodeConfig, DecodeState, Decoded, Decoder};
use crate::insn::{push_reg, Access, ArchDetail, GroupId, InsnId, OperandInfo, RegId};
use crate::table::IdTable;
use crate::{Address, Arch, Mode};

/// Condition of a branch or load-on-condition, by 4-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyszCc {
    #[default]
    Invalid,
    O,
    H,
    Nle,
    L,
    Nhe,
    Lh,
    Ne,
    E,
    Nlh,
    He,
    Nl,
    Le,
    Nh,
    No,
}

const CC: [(SyszCc, &str); 16] = [
    (SyszCc::Invalid, "nop"),
    (SyszCc::O, "o"),
    (SyszCc::H, "h"),
    (SyszCc::Nle, "nle"),
    (SyszCc::L, "l"),
    (SyszCc::Nhe, "nhe"),
    (SyszCc::Lh, "lh"),
    (SyszCc::Ne, "ne"),
    (SyszCc::E, "e"),
    (SyszCc::Nlh, "nlh"),
    (SyszCc::He, "he"),
    (SyszCc::Nl, "nl"),
    (SyszCc::Le, "le"),
    (SyszCc::Nh, "nh"),
    (SyszCc::No, "no"),
    (SyszCc::Invalid, ""),
];

impl SyszCc {
    /// Condition and mnemonic suffix for a mask. Mask 0 is `nop`, mask 15
    /// is unconditional with an empty suffix.
    pub fn from_mask(mask: u32) -> (SyszCc, &'static str) {
        CC[(mask & 15) as usize]
    }
}

/// One SystemZ operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyszOperand {
    Reg { reg: SyszReg, access: Access },
    Imm(i64),
    /// `disp(index,base)`, or `disp(length,base)` for storage-to-storage
    Mem {
        base: SyszReg,
        index: SyszReg,
        length: u64,
        disp: i64,
        access: Access,
    },
}

impl SyszOperand {
    pub fn reg(reg: SyszReg, access: Access) -> Self {
        SyszOperand::Reg { reg, access }
    }

    pub fn imm(value: i64) -> Self {
        SyszOperand::Imm(value)
    }
}

impl OperandInfo for SyszOperand {
    fn op_type(&self) -> u16 {
        match self {
            SyszOperand::Reg { .. } => SyszOpType::REG as u16,
            SyszOperand::Imm(_) => SyszOpType::IMM as u16,
            SyszOperand::Mem { .. } => SyszOpType::MEM as u16,
        }
    }

    fn collect_regs(&self, reads: &mut Vec<RegId>, writes: &mut Vec<RegId>) {
        match *self {
            SyszOperand::Reg { reg, access } => {
                if access.contains(Access::READ) {
                    push_reg(reads, reg.id());
                }
                if access.contains(Access::WRITE) {
                    push_reg(writes, reg.id());
                }
            }
            SyszOperand::Mem { base, index, .. } => {
                push_reg(reads, base.id());
                push_reg(reads, index.id());
            }
            SyszOperand::Imm(_) => {}
        }
    }
}

/// SystemZ detail record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SyszDetail {
    pub cc: SyszCc,
    pub operands: Vec<SyszOperand>,
}

/// SystemZ decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyszDecoder;

/// Length announced by the first byte.
fn insn_len(first: u8) -> usize {
    match first >> 6 {
        0 => 2,
        3 => 6,
        _ => 4,
    }
}

impl Decoder for SyszDecoder {
    fn arch(&self) -> Arch {
        Arch::Sysz
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
        let len = insn_len(*code.first()?);
        let bytes = code.get(..len)?;
        let insn = decode::decode(bytes, address)?;
        let cc = insn.cc;
        Some(insn.b.finish(len, cfg.detail, |operands| {
            ArchDetail::Sysz(SyszDetail { cc, operands })
        }))
    }

    fn skipdata_len(&self, _mode: Mode) -> usize {
        2
    }

    fn reg_name(&self, reg: RegId) -> &'static str {
        SyszReg::name_of(reg)
    }

    fn insn_name(&self, id: InsnId) -> &'static str {
        SyszInsn::name_of(id)
    }

    fn group_name(&self, id: GroupId) -> &'static str {
        SyszGroup::name_of(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insn::group;
    use rstest::rstest;

    fn dis(code: &[u8]) -> Option<(String, usize)> {
        let cfg = DecodeConfig::new(Mode::BIG_ENDIAN);
        SyszDecoder.decode_one(code, 0x1000, &cfg).map(|d| {
            let text = if d.op_str.is_empty() {
                d.mnemonic
            } else {
                format!("{} {}", d.mnemonic, d.op_str)
            };
            (text, d.size)
        })
    }

    #[rstest]
    #[case(&[0x18, 0x12], "lr %r1, %r2")]
    #[case(&[0x07, 0xfe], "br %r14")]
    #[case(&[0x07, 0x8e], "ber %r14")]
    #[case(&[0x0a, 0x80], "svc 0x80")]
    #[case(&[0x0d, 0xe1], "basr %r14, %r1")]
    #[case(&[0x58, 0x10, 0xf0, 0xa0], "l %r1, 0xa0(%r15)")]
    #[case(&[0x58, 0x12, 0x30, 0x04], "l %r1, 4(%r2, %r3)")]
    #[case(&[0x41, 0x10, 0x20, 0x04], "la %r1, 4(%r2)")]
    #[case(&[0xa7, 0xf4, 0x00, 0x05], "j 0x100a")]
    #[case(&[0xa7, 0x74, 0x00, 0x05], "jne 0x100a")]
    #[case(&[0xa7, 0x18, 0xff, 0xff], "lhi %r1, -1")]
    #[case(&[0xa7, 0xfb, 0xff, 0x60], "aghi %r15, -0xa0")]
    #[case(&[0xb9, 0x04, 0x00, 0x12], "lgr %r1, %r2")]
    #[case(&[0xb2, 0x22, 0x00, 0x10], "ipm %r1")]
    #[case(&[0x92, 0x40, 0x10, 0x00], "mvi 0(%r1), 0x40")]
    #[case(&[0x89, 0x10, 0x00, 0x03], "sll %r1, 3")]
    #[case(&[0xc0, 0xe5, 0x00, 0x00, 0x00, 0x10], "brasl %r14, 0x1020")]
    #[case(&[0xc0, 0x10, 0x00, 0x00, 0x00, 0x08], "larl %r1, 0x1010")]
    #[case(&[0xe3, 0x10, 0xf0, 0x08, 0x00, 0x04], "lg %r1, 8(%r15)")]
    #[case(&[0xe3, 0xf0, 0xff, 0xa0, 0xff, 0x71], "lay %r15, -0x60(%r15)")]
    #[case(&[0xeb, 0x6f, 0xf0, 0x30, 0x00, 0x24], "stmg %r6, %r15, 0x30(%r15)")]
    #[case(&[0xd2, 0x07, 0x10, 0x00, 0x20, 0x00], "mvc 0(8,%r1), 0(%r2)")]
    fn test_integer_text(#[case] code: &[u8], #[case] expected: &str) {
        let (text, size) = dis(code).unwrap();
        assert_eq!(text, expected);
        assert_eq!(size, code.len());
    }

    #[test]
    fn test_length_comes_from_first_byte() {
        assert_eq!(insn_len(0x18), 2);
        assert_eq!(insn_len(0x58), 4);
        assert_eq!(insn_len(0xa7), 4);
        assert_eq!(insn_len(0xe3), 6);
        // A 6-byte opcode with only four bytes available.
        assert_eq!(dis(&[0xe3, 0x10, 0xf0, 0x08]), None);
    }

    #[test]
    fn test_branch_detail() {
        let mut cfg = DecodeConfig::new(Mode::BIG_ENDIAN);
        cfg.detail = true;
        let d = SyszDecoder.decode_one(&[0xa7, 0x84, 0x00, 0x05], 0x1000, &cfg).unwrap();
        assert_eq!(d.mnemonic, "je");
        assert_eq!(d.id, SyszInsn::BRC.id());
        let detail = d.detail.unwrap();
        assert_eq!(detail.arch.sysz().unwrap().cc, SyszCc::E);
        assert_eq!(detail.arch.sysz().unwrap().operands, vec![SyszOperand::imm(0x100a)]);
        assert!(detail.in_group(group::JUMP));
        assert!(detail.in_group(group::BRANCH_RELATIVE));
        assert_eq!(detail.regs_read, vec![SyszReg::CC.id()]);
    }

    #[test]
    fn test_storage_operand_detail() {
        let mut cfg = DecodeConfig::new(Mode::BIG_ENDIAN);
        cfg.detail = true;
        let d = SyszDecoder
            .decode_one(&[0xd2, 0x07, 0x10, 0x00, 0x20, 0x00], 0, &cfg)
            .unwrap();
        let ops = d.detail.unwrap().arch.sysz().unwrap().operands.clone();
        assert_eq!(
            ops[0],
            SyszOperand::Mem {
                base: SyszReg::R1,
                index: SyszReg::INVALID,
                length: 8,
                disp: 0,
                access: Access::WRITE,
            }
        );
    }

    #[test]
    fn test_compare_sets_condition_code() {
        let mut cfg = DecodeConfig::new(Mode::BIG_ENDIAN);
        cfg.detail = true;
        let d = SyszDecoder.decode_one(&[0x19, 0x12], 0, &cfg).unwrap();
        assert_eq!(d.mnemonic, "cr");
        assert_eq!(d.detail.unwrap().regs_write, vec![SyszReg::CC.id()]);
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(dis(&[0x00, 0x00]), None);
        assert_eq!(dis(&[]), None);
    }
}
