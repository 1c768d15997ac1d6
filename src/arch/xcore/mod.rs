//! XCore (XS1). Always little-endian; 16-bit instructions, plus 32-bit
//! forms introduced by a long-opcode halfword or a `pfix` prefix.

mod decode;
mod tables;

pub use self::tables::{XcoreGroup, XcoreInsn, XcoreOpType, XcoreReg};

use serde::Serialize;

use crate::decoder::{DecodeConfig, DecodeState, Decoded, Decoder};
use crate::insn::{push_reg, Access, ArchDetail, GroupId, InsnId, OperandInfo, RegId};
use crate::table::IdTable;
use crate::{Address, Arch, Mode};

/// One XCore operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum XcoreOperand {
    Reg { reg: XcoreReg, access: Access },
    Imm(i64),
    /// `base[index]` or `base[disp]`; `direct` is -1 for `base[-index]`
    Mem {
        base: XcoreReg,
        index: XcoreReg,
        disp: i32,
        direct: i8,
    },
}

impl XcoreOperand {
    pub fn reg(reg: XcoreReg, access: Access) -> Self {
        XcoreOperand::Reg { reg, access }
    }

    pub fn imm(value: i64) -> Self {
        XcoreOperand::Imm(value)
    }
}

impl OperandInfo for XcoreOperand {
    fn op_type(&self) -> u16 {
        match self {
            XcoreOperand::Reg { .. } => XcoreOpType::REG as u16,
            XcoreOperand::Imm(_) => XcoreOpType::IMM as u16,
            XcoreOperand::Mem { .. } => XcoreOpType::MEM as u16,
        }
    }

    fn collect_regs(&self, reads: &mut Vec<RegId>, writes: &mut Vec<RegId>) {
        match *self {
            XcoreOperand::Reg { reg, access } => {
                if access.contains(Access::READ) {
                    push_reg(reads, reg.id());
                }
                if access.contains(Access::WRITE) {
                    push_reg(writes, reg.id());
                }
            }
            XcoreOperand::Mem { base, index, .. } => {
                push_reg(reads, base.id());
                push_reg(reads, index.id());
            }
            XcoreOperand::Imm(_) => {}
        }
    }
}

/// XCore detail record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct XcoreDetail {
    pub operands: Vec<XcoreOperand>,
}

/// XCore decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct XcoreDecoder;

impl Decoder for XcoreDecoder {
    fn arch(&self) -> Arch {
        Arch::Xcore
    }

    fn mode_mask(&self) -> Mode {
        Mode::empty()
    }

    fn decode(
        &self,
        code: &[u8],
        _address: Address,
        cfg: &DecodeConfig,
        _state: &mut DecodeState,
    ) -> Option<Decoded> {
        let (b, size) = decode::decode(code)?;
        Some(b.finish(size, cfg.detail, |operands| {
            ArchDetail::Xcore(XcoreDetail { operands })
        }))
    }

    fn skipdata_len(&self, _mode: Mode) -> usize {
        2
    }

    fn reg_name(&self, reg: RegId) -> &'static str {
        XcoreReg::name_of(reg)
    }

    fn insn_name(&self, id: InsnId) -> &'static str {
        XcoreInsn::name_of(id)
    }

    fn group_name(&self, id: GroupId) -> &'static str {
        XcoreGroup::name_of(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insn::group;
    use rstest::rstest;

    fn dis(code: &[u8]) -> Option<(String, usize)> {
        let cfg = DecodeConfig::new(Mode::empty());
        XcoreDecoder.decode_one(code, 0x1000, &cfg).map(|d| {
            let text = if d.op_str.is_empty() {
                d.mnemonic
            } else {
                format!("{} {}", d.mnemonic, d.op_str)
            };
            (text, d.size)
        })
    }

    #[rstest]
    #[case(&[0x06, 0x10], "add r0, r1, r2")]
    #[case(&[0x46, 0x13], "add r4, r5, r6")]
    #[case(&[0x07, 0x90], "add r0, r1, 3")]
    #[case(&[0x06, 0x08], "ldw r0, r1[2]")]
    #[case(&[0x04, 0x5c], "ldw r0, sp[4]")]
    #[case(&[0x41, 0x54], "stw r1, sp[1]")]
    #[case(&[0x45, 0x68], "ldc r1, 5")]
    #[case(&[0x44, 0x77], "entsp 4")]
    #[case(&[0xc4, 0x77], "retsp 4")]
    #[case(&[0x10, 0xd0], "bl 0x10")]
    #[case(&[0x03, 0x70], "bt r0, 3")]
    #[case(&[0x01, 0x77], "bu -1")]
    #[case(&[0xc1, 0x8e], "not r0, r1")]
    #[case(&[0x34, 0xa7], "mkmsk r1, 8")]
    #[case(&[0xf1, 0x27], "bau r1")]
    #[case(&[0xf0, 0x2f], "set sp, r0")]
    #[case(&[0xed, 0x07], "clre")]
    #[case(&[0xee, 0x17], "get r11, id")]
    #[case(&[0x05, 0xe4], "ldw r11, cp[5]")]
    fn test_short_text(#[case] code: &[u8], #[case] expected: &str) {
        assert_eq!(dis(code), Some((expected.to_string(), 2)));
    }

    #[rstest]
    #[case(&[0x06, 0xf8, 0xec, 0x3f], "mul r0, r1, r2")]
    #[case(&[0x06, 0xf8, 0xec, 0x27], "ldaw r0, r1[-r2]")]
    #[case(&[0xc1, 0xfe, 0xec, 0x0f], "clz r0, r1")]
    #[case(&[0x01, 0xf0, 0x00, 0x5c], "ldw r0, sp[0x40]")]
    #[case(&[0x01, 0xf0, 0x00, 0xd0], "bl 0x400")]
    fn test_long_text(#[case] code: &[u8], #[case] expected: &str) {
        assert_eq!(dis(code), Some((expected.to_string(), 4)));
    }

    #[test]
    fn test_truncated_long_form() {
        assert_eq!(dis(&[0x06, 0xf8]), None);
        assert_eq!(dis(&[0x01, 0xf0]), None);
        assert_eq!(dis(&[0x06]), None);
    }

    #[test]
    fn test_call_detail() {
        let mut cfg = DecodeConfig::new(Mode::empty());
        cfg.detail = true;
        let d = XcoreDecoder.decode_one(&[0x10, 0xd0], 0x1000, &cfg).unwrap();
        let detail = d.detail.unwrap();
        assert!(detail.in_group(group::CALL));
        assert!(detail.in_group(group::BRANCH_RELATIVE));
        assert_eq!(detail.regs_write, vec![XcoreReg::LR.id()]);
        assert_eq!(detail.arch.xcore().unwrap().operands, vec![XcoreOperand::imm(0x10)]);
    }

    #[test]
    fn test_memory_detail() {
        let mut cfg = DecodeConfig::new(Mode::empty());
        cfg.detail = true;
        let d = XcoreDecoder.decode_one(&[0x04, 0x5c], 0, &cfg).unwrap();
        let detail = d.detail.unwrap();
        assert_eq!(
            detail.arch.xcore().unwrap().operands,
            vec![
                XcoreOperand::reg(XcoreReg::R0, Access::WRITE),
                XcoreOperand::Mem {
                    base: XcoreReg::SP,
                    index: XcoreReg::INVALID,
                    disp: 4,
                    direct: 1,
                },
            ]
        );
    }
}
