//! Per-architecture decode tables and decoders.
//!
//! Every architecture module exposes the same pieces: register, instruction
//! and group tables (see [`crate::table`]), an operand sum type, a detail
//! record and a unit-struct [`Decoder`](crate::decoder::Decoder).

pub mod arm;
pub mod arm64;
pub mod mips;
pub mod ppc;
pub mod sparc;
pub mod sysz;
pub mod x86;
pub mod xcore;

use crate::decoder::Decoded;
use crate::insn::{push_reg, ArchDetail, Detail, GroupId, RegId};
use crate::table::IdTable;

/// Extract `len` bits of `word` starting at bit `lo`.
#[inline]
pub(crate) fn bits(word: u32, lo: u32, len: u32) -> u32 {
    (word >> lo) & ((1u32 << len) - 1)
}

/// Test a single bit.
#[inline]
pub(crate) fn bit(word: u32, pos: u32) -> bool {
    (word >> pos) & 1 != 0
}

/// Sign-extend the low `width` bits of `value`.
#[inline]
pub(crate) fn sign_extend(value: u64, width: u32) -> i64 {
    let shift = 64 - width;
    ((value << shift) as i64) >> shift
}

/// Signed immediate: decimal up to 9 in magnitude, hex beyond, sign in front.
pub(crate) fn fmt_imm(value: i64) -> String {
    if value < 0 {
        let mag = value.unsigned_abs();
        if mag > 9 {
            format!("-0x{:x}", mag)
        } else {
            format!("-{}", mag)
        }
    } else {
        fmt_uimm(value as u64)
    }
}

/// Unsigned immediate: decimal up to 9, hex beyond.
pub(crate) fn fmt_uimm(value: u64) -> String {
    if value > 9 {
        format!("0x{:x}", value)
    } else {
        format!("{}", value)
    }
}

/// Read a 16-bit unit with the session byte order.
pub(crate) fn read_u16(code: &[u8], big_endian: bool) -> Option<u16> {
    let raw: [u8; 2] = code.get(..2)?.try_into().ok()?;
    Some(if big_endian {
        u16::from_be_bytes(raw)
    } else {
        u16::from_le_bytes(raw)
    })
}

/// Read a 32-bit unit with the session byte order.
pub(crate) fn read_u32(code: &[u8], big_endian: bool) -> Option<u32> {
    let raw: [u8; 4] = code.get(..4)?.try_into().ok()?;
    Some(if big_endian {
        u32::from_be_bytes(raw)
    } else {
        u32::from_le_bytes(raw)
    })
}

/// Accumulates one instruction: id, mnemonic, operands with their text,
/// implicit registers and groups.
///
/// Operands and operand text are tracked separately because a few
/// renderings (register lists, writeback marks, shifts) do not map one
/// text item to one operand.
#[derive(Debug)]
pub(crate) struct InsnBuilder<I, O> {
    pub id: I,
    pub mnemonic: String,
    pub ops: Vec<O>,
    pub text: Vec<String>,
    pub regs_read: Vec<RegId>,
    pub regs_write: Vec<RegId>,
    pub groups: Vec<GroupId>,
}

impl<I: IdTable, O> InsnBuilder<I, O> {
    pub fn new(id: I) -> Self {
        Self::named(id, id.name())
    }

    pub fn named(id: I, mnemonic: impl Into<String>) -> Self {
        Self {
            id,
            mnemonic: mnemonic.into(),
            ops: Vec::new(),
            text: Vec::new(),
            regs_read: Vec::new(),
            regs_write: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Operand with its own text item.
    pub fn push(&mut self, op: O, text: impl Into<String>) -> &mut Self {
        self.ops.push(op);
        self.text.push(text.into());
        self
    }

    /// Operand without a text item of its own.
    pub fn push_op(&mut self, op: O) -> &mut Self {
        self.ops.push(op);
        self
    }

    /// Text item without an operand.
    pub fn push_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text.push(text.into());
        self
    }

    /// Append to the last text item (e.g. a writeback `!`).
    pub fn append_text(&mut self, suffix: &str) -> &mut Self {
        match self.text.last_mut() {
            Some(last) => last.push_str(suffix),
            None => self.text.push(suffix.to_string()),
        }
        self
    }

    pub fn reads<R: IdTable>(&mut self, regs: &[R]) -> &mut Self {
        for r in regs {
            push_reg(&mut self.regs_read, r.id());
        }
        self
    }

    pub fn writes<R: IdTable>(&mut self, regs: &[R]) -> &mut Self {
        for r in regs {
            push_reg(&mut self.regs_write, r.id());
        }
        self
    }

    pub fn group<G: IdTable>(&mut self, group: G) -> &mut Self {
        let id = group.id();
        if !self.groups.contains(&id) {
            self.groups.push(id);
        }
        self
    }

    /// Operand text as printed: items joined by `", "`.
    pub fn op_str(&self) -> String {
        self.text.join(", ")
    }

    /// Finish into a [`Decoded`], building the detail record only on request.
    pub fn finish(
        self,
        size: usize,
        detail: bool,
        wrap: impl FnOnce(Vec<O>) -> ArchDetail,
    ) -> Decoded {
        let op_str = self.op_str();
        let detail = if detail {
            Some(Detail {
                regs_read: self.regs_read,
                regs_write: self.regs_write,
                groups: self.groups,
                arch: wrap(self.ops),
            })
        } else {
            None
        };
        Decoded {
            id: self.id.id(),
            size,
            mnemonic: self.mnemonic,
            op_str,
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_formatting() {
        assert_eq!(fmt_imm(0), "0");
        assert_eq!(fmt_imm(9), "9");
        assert_eq!(fmt_imm(10), "0xa");
        assert_eq!(fmt_imm(-9), "-9");
        assert_eq!(fmt_imm(-32), "-0x20");
        assert_eq!(fmt_imm(i64::MIN), "-0x8000000000000000");
        assert_eq!(fmt_uimm(0xffff), "0xffff");
    }

    #[test]
    fn test_bit_helpers() {
        assert_eq!(bits(0x2402_000c, 26, 6), 9);
        assert!(bit(0x8000_0000, 31));
        assert_eq!(sign_extend(0xfff0, 16), -16);
        assert_eq!(sign_extend(0x7ff0, 16), 0x7ff0);
    }

    #[test]
    fn test_reads_are_bounded() {
        assert_eq!(read_u32(&[1, 2, 3], false), None);
        assert_eq!(read_u32(&[0x24, 0x02, 0x00, 0x0c], true), Some(0x2402_000c));
        assert_eq!(read_u16(&[0x34, 0x12], false), Some(0x1234));
    }
}
