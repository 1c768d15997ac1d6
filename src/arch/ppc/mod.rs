//! PowerPC 32/64 (integer, branch, CR logical, SPR moves, FPU subset).

mod decode;
mod tables;

pub use self::tables::{PpcGroup, PpcInsn, PpcOpType, PpcReg};

use serde::Serialize;

use self::decode::Ctx;
use crate::decoder::{DecodeConfig, DecodeState, Decoded, Decoder};
use crate::insn::{push_reg, Access, ArchDetail, GroupId, InsnId, OperandInfo, RegId};
use crate::table::IdTable;
use crate::{Address, Arch, Mode, Syntax};

/// Condition a conditional branch tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PpcBc {
    #[default]
    Invalid,
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
    So,
    Ns,
}

impl PpcBc {
    /// From the CR bit within a field and whether the branch wants it set.
    pub fn from_bit(bit: u32, set: bool) -> PpcBc {
        match (bit & 3, set) {
            (0, true) => PpcBc::Lt,
            (1, true) => PpcBc::Gt,
            (2, true) => PpcBc::Eq,
            (3, true) => PpcBc::So,
            (0, false) => PpcBc::Ge,
            (1, false) => PpcBc::Le,
            (2, false) => PpcBc::Ne,
            _ => PpcBc::Ns,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PpcBc::Invalid => "",
            PpcBc::Lt => "lt",
            PpcBc::Le => "le",
            PpcBc::Eq => "eq",
            PpcBc::Ge => "ge",
            PpcBc::Gt => "gt",
            PpcBc::Ne => "ne",
            PpcBc::So => "so",
            PpcBc::Ns => "ns",
        }
    }
}

/// Static branch prediction hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PpcBh {
    #[default]
    Invalid,
    /// `+`, predicted taken
    Plus,
    /// `-`, predicted not taken
    Minus,
}

/// One PowerPC operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PpcOperand {
    Reg { reg: PpcReg, access: Access },
    Imm(i64),
    /// `disp(base)`; a zero base register reads as the literal 0
    Mem { base: PpcReg, disp: i64, access: Access },
    /// CR field tested by a conditional branch
    Crx { reg: PpcReg, cond: PpcBc },
}

impl PpcOperand {
    pub fn reg(reg: PpcReg, access: Access) -> Self {
        PpcOperand::Reg { reg, access }
    }

    pub fn imm(value: i64) -> Self {
        PpcOperand::Imm(value)
    }

    pub fn mem(base: PpcReg, disp: i64, access: Access) -> Self {
        PpcOperand::Mem { base, disp, access }
    }
}

impl OperandInfo for PpcOperand {
    fn op_type(&self) -> u16 {
        match self {
            PpcOperand::Reg { .. } => PpcOpType::REG as u16,
            PpcOperand::Imm(_) => PpcOpType::IMM as u16,
            PpcOperand::Mem { .. } => PpcOpType::MEM as u16,
            PpcOperand::Crx { .. } => PpcOpType::CRX as u16,
        }
    }

    fn collect_regs(&self, reads: &mut Vec<RegId>, writes: &mut Vec<RegId>) {
        match *self {
            PpcOperand::Reg { reg, access } => {
                if access.contains(Access::READ) {
                    push_reg(reads, reg.id());
                }
                if access.contains(Access::WRITE) {
                    push_reg(writes, reg.id());
                }
            }
            PpcOperand::Mem { base, .. } => push_reg(reads, base.id()),
            PpcOperand::Crx { reg, .. } => push_reg(reads, reg.id()),
            PpcOperand::Imm(_) => {}
        }
    }
}

/// PowerPC detail record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PpcDetail {
    /// Condition of a conditional branch
    pub bc: PpcBc,
    /// Prediction hint of a conditional branch
    pub bh: PpcBh,
    /// Record form (`.`): the result also sets CR0
    pub update_cr0: bool,
    pub operands: Vec<PpcOperand>,
}

/// PowerPC decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PpcDecoder;

impl Decoder for PpcDecoder {
    fn arch(&self) -> Arch {
        Arch::Ppc
    }

    fn mode_mask(&self) -> Mode {
        Mode::MODE_32 | Mode::MODE_64 | Mode::BIG_ENDIAN
    }

    fn check_mode(&self, mode: Mode) -> bool {
        self.mode_mask().contains(mode) && !mode.contains(Mode::MODE_32 | Mode::MODE_64)
    }

    fn supports_syntax(&self, syntax: Syntax) -> bool {
        matches!(syntax, Syntax::Default | Syntax::NoRegName)
    }

    fn decode(
        &self,
        code: &[u8],
        address: Address,
        cfg: &DecodeConfig,
        _state: &mut DecodeState,
    ) -> Option<Decoded> {
        let word = crate::arch::read_u32(code, cfg.mode.is_big_endian())?;
        let cx = Ctx {
            numeric: cfg.syntax == Syntax::NoRegName,
            wide: cfg.mode.contains(Mode::MODE_64),
        };
        let asm = decode::decode(word, address, &cx)?;
        let (bc, bh, update_cr0) = (asm.bc, asm.bh, asm.update_cr0);
        Some(asm.b.finish(4, cfg.detail, |operands| {
            ArchDetail::Ppc(PpcDetail {
                bc,
                bh,
                update_cr0,
                operands,
            })
        }))
    }

    fn skipdata_len(&self, _mode: Mode) -> usize {
        4
    }

    fn reg_name(&self, reg: RegId) -> &'static str {
        PpcReg::name_of(reg)
    }

    fn insn_name(&self, id: InsnId) -> &'static str {
        PpcInsn::name_of(id)
    }

    fn group_name(&self, id: GroupId) -> &'static str {
        PpcGroup::name_of(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insn::group;
    use rstest::rstest;

    fn cfg(mode: Mode) -> DecodeConfig {
        DecodeConfig::new(mode | Mode::BIG_ENDIAN)
    }

    fn dis_in(word: u32, mode: Mode) -> Option<String> {
        PpcDecoder
            .decode_one(&word.to_be_bytes(), 0x1000, &cfg(mode))
            .map(|d| {
                if d.op_str.is_empty() {
                    d.mnemonic
                } else {
                    format!("{} {}", d.mnemonic, d.op_str)
                }
            })
    }

    fn dis(word: u32) -> String {
        dis_in(word, Mode::MODE_32).expect("valid encoding")
    }

    #[rstest]
    #[case(0x7c08_02a6, "mflr r0")]
    #[case(0x9421_fff0, "stwu r1, -0x10(r1)")]
    #[case(0x3860_0001, "li r3, 1")]
    #[case(0x3c60_1234, "lis r3, 0x1234")]
    #[case(0x3863_fffc, "addi r3, r3, -4")]
    #[case(0x6000_0000, "nop")]
    #[case(0x6063_00ff, "ori r3, r3, 0xff")]
    #[case(0x7c63_1a14, "add r3, r3, r3")]
    #[case(0x7c64_2e14, "addo r3, r4, r5")]
    #[case(0x7c69_1b78, "mr r9, r3")]
    #[case(0x8001_0014, "lwz r0, 0x14(r1)")]
    #[case(0x8061_0000, "lwz r3, 0(r1)")]
    #[case(0x7c60_202e, "lwzx r3, 0, r4")]
    #[case(0x7d29_03a6, "mtctr r9")]
    #[case(0x7c03_2000, "cmpw r3, r4")]
    #[case(0x2f83_0000, "cmpwi cr7, r3, 0")]
    #[case(0x2803_0010, "cmplwi r3, 0x10")]
    #[case(0x5483_103a, "slwi r3, r4, 2")]
    #[case(0x5483_f0be, "srwi r3, r4, 2")]
    #[case(0x5463_063e, "clrlwi r3, r3, 0x18")]
    #[case(0x4400_0002, "sc")]
    #[case(0x7c00_04ac, "sync")]
    #[case(0x7c20_04ac, "lwsync")]
    #[case(0x4cc6_3182, "crclr 6")]
    #[case(0x7fe0_0008, "trap")]
    #[case(0xfc22_182a, "fadd f1, f2, f3")]
    #[case(0xc823_0008, "lfd f1, 8(r3)")]
    #[case(0xfc20_1090, "fmr f1, f2")]
    #[case(0xec22_00f2, "fmuls f1, f2, f3")]
    fn test_ppc32_text(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(dis(word), expected);
    }

    #[rstest]
    #[case(0x4bff_fff0, "b 0xff0")]
    #[case(0x4800_0011, "bl 0x1010")]
    #[case(0x4e80_0020, "blr")]
    #[case(0x4e80_0421, "bctrl")]
    #[case(0x419e_0008, "beq cr7, 0x1008")]
    #[case(0x4082_0008, "bne 0x1008")]
    #[case(0x41e2_0008, "beq+ 0x1008")]
    #[case(0x4200_fff8, "bdnz 0xff8")]
    #[case(0x4d82_0020, "beqlr")]
    fn test_branch_forms(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(dis(word), expected);
    }

    #[rstest]
    #[case(0xe861_0008, "ld r3, 8(r1)")]
    #[case(0xfbe1_fff8, "std r31, -8(r1)")]
    #[case(0x7883_45e4, "sldi r3, r4, 8")]
    #[case(0x2fa3_0000, "cmpdi cr7, r3, 0")]
    fn test_ppc64_only(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(dis_in(word, Mode::MODE_64).as_deref(), Some(expected));
        assert_eq!(dis_in(word, Mode::MODE_32), None);
    }

    #[test]
    fn test_record_form_sets_update_cr0() {
        let mut c = cfg(Mode::MODE_32);
        c.detail = true;
        let d = PpcDecoder.decode_one(&0x7c64_2a15u32.to_be_bytes(), 0, &c).unwrap();
        assert_eq!(d.mnemonic, "add.");
        let detail = d.detail.unwrap();
        assert!(detail.arch.ppc().unwrap().update_cr0);
        assert!(detail.regs_write.contains(&PpcReg::CR0.id()));
    }

    #[test]
    fn test_branch_detail() {
        let mut c = cfg(Mode::MODE_32);
        c.detail = true;
        let d = PpcDecoder.decode_one(&0x41e2_0008u32.to_be_bytes(), 0x1000, &c).unwrap();
        let detail = d.detail.unwrap();
        let ppc = detail.arch.ppc().unwrap();
        assert_eq!(ppc.bc, PpcBc::Eq);
        assert_eq!(ppc.bh, PpcBh::Plus);
        assert!(detail.in_group(group::JUMP));
        assert!(detail.in_group(group::BRANCH_RELATIVE));
        assert_eq!(ppc.operands, vec![PpcOperand::imm(0x1008)]);

        let d = PpcDecoder.decode_one(&0x4e80_0020u32.to_be_bytes(), 0, &c).unwrap();
        let detail = d.detail.unwrap();
        assert!(detail.in_group(group::RET));
        assert_eq!(detail.regs_read, vec![PpcReg::LR.id()]);
    }

    #[test]
    fn test_store_update_writes_base() {
        let mut c = cfg(Mode::MODE_32);
        c.detail = true;
        let d = PpcDecoder.decode_one(&0x9421_fff0u32.to_be_bytes(), 0, &c).unwrap();
        let detail = d.detail.unwrap();
        assert_eq!(
            detail.arch.ppc().unwrap().operands,
            vec![
                PpcOperand::reg(PpcReg::R1, Access::READ),
                PpcOperand::mem(PpcReg::R1, -16, Access::WRITE),
            ]
        );
        assert_eq!(detail.regs_write, vec![PpcReg::R1.id()]);
    }

    #[test]
    fn test_numeric_register_names() {
        let mut c = cfg(Mode::MODE_32);
        c.syntax = Syntax::NoRegName;
        let d = PpcDecoder.decode_one(&0x9421_fff0u32.to_be_bytes(), 0, &c).unwrap();
        assert_eq!(d.op_str, "1, -0x10(1)");
        let d = PpcDecoder.decode_one(&0x2f83_0000u32.to_be_bytes(), 0, &c).unwrap();
        assert_eq!(d.op_str, "7, 3, 0");
    }

    #[test]
    fn test_little_endian_word() {
        let d = PpcDecoder
            .decode_one(&[0x20, 0x00, 0x80, 0x4e], 0, &DecodeConfig::new(Mode::MODE_32))
            .unwrap();
        assert_eq!(d.mnemonic, "blr");
    }

    #[test]
    fn test_mode_checks() {
        assert!(PpcDecoder.check_mode(Mode::MODE_64 | Mode::BIG_ENDIAN));
        assert!(!PpcDecoder.check_mode(Mode::QPX | Mode::MODE_64));
        assert!(!PpcDecoder.check_mode(Mode::MODE_32 | Mode::MODE_64));
        assert!(PpcDecoder.supports_syntax(Syntax::NoRegName));
        assert!(!PpcDecoder.supports_syntax(Syntax::Att));
    }

    #[test]
    fn test_reserved_words_are_rejected() {
        assert_eq!(dis_in(0x0000_0000, Mode::MODE_32), None);
        // lwzu with rA = 0
        assert_eq!(dis_in(0x8460_0004, Mode::MODE_32), None);
    }
}
