//! MIPS32 / MIPS64 (MIPS II, III, 32, 32R2, 64R2 base ISA, COP0 and COP1).

mod decode;
mod tables;

pub use self::tables::{MipsGroup, MipsInsn, MipsOpType, MipsReg};

use serde::Serialize;

use crate::decoder::{DecodeConfig, DecodeState, Decoded, Decoder};
use crate::insn::{push_reg, Access, GroupId, InsnId, OperandInfo, RegId};
use crate::table::IdTable;
use crate::{Address, Arch, Mode};

/// One MIPS operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MipsOperand {
    Reg { reg: MipsReg, access: Access },
    Imm(i64),
    Mem { base: MipsReg, disp: i64, access: Access },
}

impl MipsOperand {
    pub fn reg(reg: MipsReg, access: Access) -> Self {
        MipsOperand::Reg { reg, access }
    }

    pub fn imm(value: i64) -> Self {
        MipsOperand::Imm(value)
    }

    pub fn mem(base: MipsReg, disp: i64, access: Access) -> Self {
        MipsOperand::Mem { base, disp, access }
    }
}

impl OperandInfo for MipsOperand {
    fn op_type(&self) -> u16 {
        match self {
            MipsOperand::Reg { .. } => MipsOpType::REG as u16,
            MipsOperand::Imm(_) => MipsOpType::IMM as u16,
            MipsOperand::Mem { .. } => MipsOpType::MEM as u16,
        }
    }

    fn collect_regs(&self, reads: &mut Vec<RegId>, writes: &mut Vec<RegId>) {
        match *self {
            MipsOperand::Reg { reg, access } => {
                if access.contains(Access::READ) {
                    push_reg(reads, reg.id());
                }
                if access.contains(Access::WRITE) {
                    push_reg(writes, reg.id());
                }
            }
            MipsOperand::Mem { base, .. } => push_reg(reads, base.id()),
            MipsOperand::Imm(_) => {}
        }
    }
}

/// MIPS detail record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MipsDetail {
    pub operands: Vec<MipsOperand>,
}

/// MIPS decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct MipsDecoder;

impl Decoder for MipsDecoder {
    fn arch(&self) -> Arch {
        Arch::Mips
    }

    fn mode_mask(&self) -> Mode {
        Mode::MODE_32 | Mode::MODE_64 | Mode::MIPS2 | Mode::MIPS3 | Mode::BIG_ENDIAN
    }

    fn decode(
        &self,
        code: &[u8],
        address: Address,
        cfg: &DecodeConfig,
        _state: &mut DecodeState,
    ) -> Option<Decoded> {
        let word = crate::arch::read_u32(code, cfg.mode.is_big_endian())?;
        let b = decode::decode(word, address, cfg.mode)?;
        Some(b.finish(4, cfg.detail, |operands| {
            crate::insn::ArchDetail::Mips(MipsDetail { operands })
        }))
    }

    fn skipdata_len(&self, _mode: Mode) -> usize {
        4
    }

    fn reg_name(&self, reg: RegId) -> &'static str {
        MipsReg::name_of(reg)
    }

    fn insn_name(&self, id: InsnId) -> &'static str {
        MipsInsn::name_of(id)
    }

    fn group_name(&self, id: GroupId) -> &'static str {
        MipsGroup::name_of(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dis(word: u32, address: Address, mode: Mode) -> Option<(String, String)> {
        let cfg = DecodeConfig::new(mode | Mode::BIG_ENDIAN);
        MipsDecoder
            .decode_one(&word.to_be_bytes(), address, &cfg)
            .map(|d| (d.mnemonic, d.op_str))
    }

    fn text(word: u32) -> String {
        let (m, o) = dis(word, 0x1000, Mode::MODE_32).expect("valid encoding");
        if o.is_empty() { m } else { format!("{} {}", m, o) }
    }

    #[test]
    fn test_addiu_scenario_with_detail() {
        let mut cfg = DecodeConfig::new(Mode::MODE_32 | Mode::BIG_ENDIAN);
        cfg.detail = true;
        let d = MipsDecoder.decode_one(&[0x24, 0x02, 0x00, 0x0c], 0x1008, &cfg).unwrap();
        assert_eq!(d.mnemonic, "addiu");
        assert_eq!(d.op_str, "$v0, $zero, 0xc");
        let detail = d.detail.unwrap();
        let ops = &detail.arch.mips().unwrap().operands;
        assert_eq!(
            ops,
            &vec![
                MipsOperand::reg(MipsReg::V0, Access::WRITE),
                MipsOperand::reg(MipsReg::ZERO, Access::READ),
                MipsOperand::imm(12),
            ]
        );
    }

    #[test]
    fn test_common_encodings() {
        assert_eq!(text(0x0000_0000), "nop");
        assert_eq!(text(0x27bd_ffe0), "addiu $sp, $sp, -0x20");
        assert_eq!(text(0xafbf_001c), "sw $ra, 0x1c($sp)");
        assert_eq!(text(0x8fbf_001c), "lw $ra, 0x1c($sp)");
        assert_eq!(text(0x03e0_0008), "jr $ra");
        assert_eq!(text(0x0320_f809), "jalr $t9");
        assert_eq!(text(0x3c1c_0042), "lui $gp, 0x42");
        assert_eq!(text(0x0080_1021), "move $v0, $a0");
        assert_eq!(text(0x0085_0018), "mult $a0, $a1");
        assert_eq!(text(0x0000_000c), "syscall");
        assert_eq!(text(0x3442_ffff), "ori $v0, $v0, 0xffff");
        assert_eq!(text(0x0002_1080), "sll $v0, $v0, 2");
    }

    #[test]
    fn test_branch_targets() {
        // beq $zero, $zero, +4 words
        assert_eq!(text(0x1000_0004), "b 0x1014");
        assert_eq!(text(0x1040_fffe), "beqz $v0, 0xffc");
        assert_eq!(text(0x1485_0002), "bne $a0, $a1, 0x100c");
        assert_eq!(text(0x0c00_0400), "jal 0x1000");
        assert_eq!(text(0x0411_0003), "bal 0x1010");
    }

    #[test]
    fn test_fpu_forms() {
        assert_eq!(text(0x4602_0000), "add.s $f0, $f0, $f2");
        assert_eq!(text(0x4620_1020), "cvt.s.d $f0, $f2");
        assert_eq!(text(0xc7a0_0010), "lwc1 $f0, 0x10($sp)");
        assert_eq!(text(0x4482_0000), "mtc1 $v0, $f0");
    }

    #[test]
    fn test_64bit_ops_need_64bit_mode() {
        // daddu $v0, $a0, $a1
        assert!(dis(0x0085_102d, 0x1000, Mode::MODE_32).is_none());
        assert_eq!(
            dis(0x0085_102d, 0x1000, Mode::MODE_64),
            Some(("daddu".to_string(), "$v0, $a0, $a1".to_string()))
        );
    }

    #[test]
    fn test_little_endian_bytes() {
        let cfg = DecodeConfig::new(Mode::MODE_32);
        let d = MipsDecoder.decode_one(&[0x0c, 0x00, 0x02, 0x24], 0x1008, &cfg).unwrap();
        assert_eq!(d.op_str, "$v0, $zero, 0xc");
    }
}
