//! The architecture-independent instruction record and its optional detail.

use std::fmt;

use bitflags::bitflags;
use serde::Serialize;

use crate::arch::arm::ArmDetail;
use crate::arch::arm64::Arm64Detail;
use crate::arch::mips::MipsDetail;
use crate::arch::ppc::PpcDetail;
use crate::arch::sparc::SparcDetail;
use crate::arch::sysz::SyszDetail;
use crate::arch::x86::X86Detail;
use crate::arch::xcore::XcoreDetail;
use crate::{Address, Arch};

/// Register id within one architecture's register table.
pub type RegId = u16;
/// Instruction id within one architecture's instruction table.
pub type InsnId = u16;
/// Group id within one architecture's group table.
pub type GroupId = u16;

/// Group ids shared by every architecture's group table.
///
/// Each table starts with these entries in this order; architecture-specific
/// groups follow.
pub mod group {
    use super::GroupId;

    pub const INVALID: GroupId = 0;
    pub const JUMP: GroupId = 1;
    pub const CALL: GroupId = 2;
    pub const RET: GroupId = 3;
    pub const INT: GroupId = 4;
    pub const IRET: GroupId = 5;
    pub const PRIVILEGE: GroupId = 6;
    pub const BRANCH_RELATIVE: GroupId = 7;
}

bitflags! {
    /// How an instruction touches an operand.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct Access: u8 {
        const READ  = 1 << 0;
        const WRITE = 1 << 1;
    }
}

impl Access {
    /// Read and written.
    pub const READ_WRITE: Access = Access::READ.union(Access::WRITE);
}

/// One decoded machine instruction.
///
/// Owned by the caller; nothing in it points back into the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insn {
    /// Index into the architecture's instruction table; 0 for skip-data entries
    pub id: InsnId,
    /// Address of the first byte
    pub address: Address,
    /// Length in bytes
    pub size: u16,
    /// Copy of the encoded bytes
    pub bytes: Vec<u8>,
    /// Mnemonic text (e.g. "mov", "bl", "addiu")
    pub mnemonic: String,
    /// Operand text
    pub op_str: String,
    /// Structured detail, present only when detail mode was on
    pub detail: Option<Detail>,
}

impl Insn {
    /// The encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Address one past the last byte.
    pub fn end_address(&self) -> Address {
        self.address.wrapping_add(self.size as Address)
    }

    /// Whether this is a synthetic data entry produced by the skip-data policy.
    pub fn is_skipdata(&self) -> bool {
        self.id == 0
    }

    /// Reduced view used by the lite decode path.
    pub fn to_lite(&self) -> LiteInsn {
        LiteInsn {
            address: self.address,
            size: self.size,
            mnemonic: self.mnemonic.clone(),
            op_str: self.op_str.clone(),
        }
    }
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op_str.is_empty() {
            write!(f, "{}", self.mnemonic)
        } else {
            write!(f, "{}\t{}", self.mnemonic, self.op_str)
        }
    }
}

/// The `{address, size, mnemonic, op_str}` tuple of the lite path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteInsn {
    pub address: Address,
    pub size: u16,
    pub mnemonic: String,
    pub op_str: String,
}

/// Structured decode result for one instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detail {
    /// Registers read implicitly
    pub regs_read: Vec<RegId>,
    /// Registers written implicitly
    pub regs_write: Vec<RegId>,
    /// Groups the instruction belongs to
    pub groups: Vec<GroupId>,
    /// Architecture-specific record
    pub arch: ArchDetail,
}

impl Detail {
    /// Number of explicit operands.
    pub fn op_count(&self) -> usize {
        self.arch.op_count()
    }

    /// Whether `group` is among this instruction's groups.
    pub fn in_group(&self, group: GroupId) -> bool {
        self.groups.contains(&group)
    }
}

/// Common queries over an architecture operand.
pub trait OperandInfo {
    /// Operand type id in the architecture's operand-type table.
    fn op_type(&self) -> u16;

    /// Registers this operand reads and writes.
    fn collect_regs(&self, reads: &mut Vec<RegId>, writes: &mut Vec<RegId>);
}

/// Exactly one architecture's detail record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "arch", rename_all = "lowercase")]
pub enum ArchDetail {
    X86(X86Detail),
    Arm(ArmDetail),
    Arm64(Arm64Detail),
    Mips(MipsDetail),
    Ppc(PpcDetail),
    Sparc(SparcDetail),
    Sysz(SyszDetail),
    Xcore(XcoreDetail),
}

macro_rules! with_operands {
    ($detail:expr, $ops:ident => $body:expr) => {
        match $detail {
            ArchDetail::X86(d) => { let $ops = &d.operands; $body }
            ArchDetail::Arm(d) => { let $ops = &d.operands; $body }
            ArchDetail::Arm64(d) => { let $ops = &d.operands; $body }
            ArchDetail::Mips(d) => { let $ops = &d.operands; $body }
            ArchDetail::Ppc(d) => { let $ops = &d.operands; $body }
            ArchDetail::Sparc(d) => { let $ops = &d.operands; $body }
            ArchDetail::Sysz(d) => { let $ops = &d.operands; $body }
            ArchDetail::Xcore(d) => { let $ops = &d.operands; $body }
        }
    };
}

impl ArchDetail {
    /// Architecture this record belongs to.
    pub fn arch(&self) -> Arch {
        match self {
            ArchDetail::X86(_) => Arch::X86,
            ArchDetail::Arm(_) => Arch::Arm,
            ArchDetail::Arm64(_) => Arch::Arm64,
            ArchDetail::Mips(_) => Arch::Mips,
            ArchDetail::Ppc(_) => Arch::Ppc,
            ArchDetail::Sparc(_) => Arch::Sparc,
            ArchDetail::Sysz(_) => Arch::Sysz,
            ArchDetail::Xcore(_) => Arch::Xcore,
        }
    }

    /// Number of explicit operands.
    pub fn op_count(&self) -> usize {
        with_operands!(self, ops => ops.len())
    }

    /// Operand type ids in textual order.
    pub fn op_types(&self) -> Vec<u16> {
        with_operands!(self, ops => ops.iter().map(OperandInfo::op_type).collect())
    }

    /// Registers read and written through explicit operands.
    pub fn explicit_regs(&self) -> (Vec<RegId>, Vec<RegId>) {
        let mut reads = Vec::new();
        let mut writes = Vec::new();
        with_operands!(self, ops => {
            for op in ops {
                op.collect_regs(&mut reads, &mut writes);
            }
        });
        (reads, writes)
    }

    pub fn x86(&self) -> Option<&X86Detail> {
        match self {
            ArchDetail::X86(d) => Some(d),
            _ => None,
        }
    }

    pub fn arm(&self) -> Option<&ArmDetail> {
        match self {
            ArchDetail::Arm(d) => Some(d),
            _ => None,
        }
    }

    pub fn arm64(&self) -> Option<&Arm64Detail> {
        match self {
            ArchDetail::Arm64(d) => Some(d),
            _ => None,
        }
    }

    pub fn mips(&self) -> Option<&MipsDetail> {
        match self {
            ArchDetail::Mips(d) => Some(d),
            _ => None,
        }
    }

    pub fn ppc(&self) -> Option<&PpcDetail> {
        match self {
            ArchDetail::Ppc(d) => Some(d),
            _ => None,
        }
    }

    pub fn sparc(&self) -> Option<&SparcDetail> {
        match self {
            ArchDetail::Sparc(d) => Some(d),
            _ => None,
        }
    }

    pub fn sysz(&self) -> Option<&SyszDetail> {
        match self {
            ArchDetail::Sysz(d) => Some(d),
            _ => None,
        }
    }

    pub fn xcore(&self) -> Option<&XcoreDetail> {
        match self {
            ArchDetail::Xcore(d) => Some(d),
            _ => None,
        }
    }
}

/// Push `reg` unless it is 0 (`INVALID`) or already present.
pub(crate) fn push_reg(list: &mut Vec<RegId>, reg: RegId) {
    if reg != 0 && !list.contains(&reg) {
        list.push(reg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::mips::{MipsDetail, MipsOperand, MipsReg};

    fn sample() -> Insn {
        Insn {
            id: 1,
            address: 0x1000,
            size: 4,
            bytes: vec![0x24, 0x02, 0x00, 0x0c],
            mnemonic: "addiu".to_string(),
            op_str: "$v0, $zero, 0xc".to_string(),
            detail: Some(Detail {
                regs_read: vec![],
                regs_write: vec![],
                groups: vec![],
                arch: ArchDetail::Mips(MipsDetail {
                    operands: vec![
                        MipsOperand::reg(MipsReg::V0, Access::WRITE),
                        MipsOperand::reg(MipsReg::ZERO, Access::READ),
                        MipsOperand::imm(12),
                    ],
                }),
            }),
        }
    }

    #[test]
    fn test_insn_accessors() {
        let insn = sample();
        assert_eq!(insn.bytes(), &[0x24, 0x02, 0x00, 0x0c]);
        assert_eq!(insn.end_address(), 0x1004);
        assert!(!insn.is_skipdata());
        assert_eq!(insn.to_string(), "addiu\t$v0, $zero, 0xc");
        assert_eq!(insn.to_lite().op_str, "$v0, $zero, 0xc");
    }

    #[test]
    fn test_detail_queries() {
        let insn = sample();
        let detail = insn.detail.as_ref().unwrap();
        assert_eq!(detail.op_count(), 3);
        assert_eq!(detail.arch.arch(), Arch::Mips);
        let (reads, writes) = detail.arch.explicit_regs();
        assert_eq!(reads, vec![MipsReg::ZERO as RegId]);
        assert_eq!(writes, vec![MipsReg::V0 as RegId]);
        assert!(detail.arch.x86().is_none());
    }

    #[test]
    fn test_push_reg_dedups() {
        let mut regs = Vec::new();
        push_reg(&mut regs, 3);
        push_reg(&mut regs, 3);
        push_reg(&mut regs, 0);
        assert_eq!(regs, vec![3]);
    }
}
