//! The decode session: one architecture, mutable options, owned results.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::decoder::{decoder_for, DecodeConfig, Decoder};
use crate::error::{Error, Result};
use crate::insn::{push_reg, Detail, GroupId, Insn, InsnId, LiteInsn, RegId};
use crate::skipdata::SkipData;
use crate::sweep::Sweep;
use crate::{Address, Arch, Mode, Syntax};

/// An open decode context.
///
/// Bound to one architecture for its whole life; mode and options may change
/// between decode calls. Returned instructions own all their data and stay
/// valid after the session changes or goes away. Dropping the session closes
/// it.
///
/// ```
/// use polydis::{Arch, Mode, Session};
///
/// let mut cs = Session::open(Arch::X86, Mode::MODE_64).unwrap();
/// let insns = cs.disassemble(&[0x55, 0xc3], 0x1000, None).unwrap();
/// assert_eq!(insns[0].mnemonic, "push");
/// assert_eq!(insns[1].address, 0x1001);
/// ```
pub struct Session {
    arch: Arch,
    decoder: &'static dyn Decoder,
    mode: Mode,
    detail: bool,
    syntax: Syntax,
    unsigned: bool,
    skipdata: Option<SkipData>,
    mnemonics: HashMap<InsnId, String>,
    closed: bool,
}

impl Session {
    /// Open a session, validating `mode` against `arch`.
    pub fn open(arch: Arch, mode: Mode) -> Result<Self> {
        let decoder = decoder_for(arch);
        if !decoder.check_mode(mode) {
            return Err(Error::UnsupportedMode { arch, mode: mode.bits() });
        }
        debug!("open {} session, mode 0x{:x}", arch, mode.bits());
        Ok(Self {
            arch,
            decoder,
            mode,
            detail: false,
            syntax: Syntax::Default,
            unsigned: false,
            skipdata: None,
            mnemonics: HashMap::new(),
            closed: false,
        })
    }

    /// Release the session. Closing twice is a no-op; every other fallible
    /// call afterwards fails with [`Error::SessionClosed`].
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.skipdata = None;
        self.mnemonics.clear();
        debug!("close {} session", self.arch);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn detail(&self) -> bool {
        self.detail
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn skipdata(&self) -> Option<&SkipData> {
        self.skipdata.as_ref()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn invalid(&self, option: &'static str) -> Error {
        Error::InvalidOption { arch: self.arch, option }
    }

    /// Change the mode; takes effect on the next decode call.
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        self.ensure_open()?;
        if !self.decoder.check_mode(mode) {
            return Err(Error::UnsupportedMode { arch: self.arch, mode: mode.bits() });
        }
        debug!("{}: mode 0x{:x} -> 0x{:x}", self.arch, self.mode.bits(), mode.bits());
        self.mode = mode;
        Ok(())
    }

    pub fn set_detail(&mut self, on: bool) -> Result<()> {
        self.ensure_open()?;
        debug!("{}: detail {}", self.arch, on);
        self.detail = on;
        Ok(())
    }

    pub fn set_syntax(&mut self, syntax: Syntax) -> Result<()> {
        self.ensure_open()?;
        if !self.decoder.supports_syntax(syntax) {
            return Err(self.invalid("syntax"));
        }
        debug!("{}: syntax {}", self.arch, syntax);
        self.syntax = syntax;
        Ok(())
    }

    /// Print negative immediates in their unsigned form (x86 only).
    pub fn set_unsigned(&mut self, on: bool) -> Result<()> {
        self.ensure_open()?;
        if self.arch != Arch::X86 {
            return Err(self.invalid("unsigned"));
        }
        debug!("{}: unsigned immediates {}", self.arch, on);
        self.unsigned = on;
        Ok(())
    }

    /// Install or remove the skip-data policy.
    pub fn set_skipdata(&mut self, policy: Option<SkipData>) -> Result<()> {
        self.ensure_open()?;
        debug!("{}: skipdata {:?}", self.arch, policy);
        self.skipdata = policy;
        Ok(())
    }

    /// Override the mnemonic printed for instruction `id`; `None` restores
    /// the default.
    pub fn set_mnemonic(&mut self, id: InsnId, mnemonic: Option<&str>) -> Result<()> {
        self.ensure_open()?;
        if self.decoder.insn_name(id).is_empty() {
            return Err(self.invalid("mnemonic"));
        }
        match mnemonic {
            Some(text) => {
                debug!("{}: mnemonic of id {} -> {:?}", self.arch, id, text);
                self.mnemonics.insert(id, text.to_string());
            }
            None => {
                self.mnemonics.remove(&id);
            }
        }
        Ok(())
    }

    fn config(&self) -> DecodeConfig {
        DecodeConfig {
            mode: self.mode,
            syntax: self.syntax,
            detail: self.detail,
            unsigned: self.unsigned,
        }
    }

    fn sweep<'a>(&'a mut self, code: &'a [u8], address: Address, detail: bool) -> Sweep<'a> {
        let cfg = DecodeConfig { detail, ..self.config() };
        Sweep::new(
            self.decoder,
            cfg,
            self.skipdata.as_mut(),
            &self.mnemonics,
            code,
            address,
        )
    }

    /// Decode `code` as if loaded at `address`.
    ///
    /// Stops at the end of input, after `max_count` instructions (when given
    /// and non-zero), or at the first undecodable bytes when no skip-data
    /// policy is set. Undecodable bytes at the very start are an error;
    /// later ones just end the listing.
    pub fn disassemble(
        &mut self,
        code: &[u8],
        address: Address,
        max_count: Option<usize>,
    ) -> Result<Vec<Insn>> {
        let detail = self.detail;
        self.collect(code, address, max_count, detail, |insn| insn)
    }

    /// [`disassemble`](Self::disassemble) reduced to address, size and text.
    /// Detail is never built, whatever the session setting.
    pub fn disassemble_lite(
        &mut self,
        code: &[u8],
        address: Address,
        max_count: Option<usize>,
    ) -> Result<Vec<LiteInsn>> {
        self.collect(code, address, max_count, false, |insn| LiteInsn {
            address: insn.address,
            size: insn.size,
            mnemonic: insn.mnemonic,
            op_str: insn.op_str,
        })
    }

    fn collect<T>(
        &mut self,
        code: &[u8],
        address: Address,
        max_count: Option<usize>,
        detail: bool,
        map: impl Fn(Insn) -> T,
    ) -> Result<Vec<T>> {
        self.ensure_open()?;
        let arch = self.arch;
        let limit = max_count.unwrap_or(0);
        let mut sweep = self.sweep(code, address, detail).limit(limit);

        let mut out = Vec::new();
        let hint = if limit > 0 { limit.min(code.len()) } else { code.len() / 4 + 1 };
        reserve(&mut out, hint)?;
        for insn in sweep.by_ref() {
            if out.len() == out.capacity() {
                let more = out.len().max(16);
                reserve(&mut out, more)?;
            }
            out.push(map(insn));
        }

        if out.is_empty() {
            if let Some(at) = sweep.stopped_at() {
                debug!("{}: nothing decodable at 0x{:x}", arch, at);
                return Err(Error::DisassemblyFailed {
                    reason: format!("invalid {} instruction at 0x{:x}", arch, at),
                });
            }
        }
        debug!(
            "{}: {} instructions from {} of {} bytes at 0x{:x}",
            arch,
            out.len(),
            sweep.offset(),
            code.len(),
            address
        );
        Ok(out)
    }

    /// Lazy form of [`disassemble`](Self::disassemble). The iterator holds
    /// the session borrowed, so options stay fixed while it runs.
    pub fn disasm_iter<'a>(&'a mut self, code: &'a [u8], address: Address) -> Result<Sweep<'a>> {
        self.ensure_open()?;
        let detail = self.detail;
        Ok(self.sweep(code, address, detail))
    }

    /// Instruction name by id; empty when out of range.
    pub fn instruction_name(&self, id: InsnId) -> Result<&'static str> {
        self.ensure_open()?;
        if cfg!(feature = "diet") {
            return Ok("");
        }
        Ok(self.decoder.insn_name(id))
    }

    /// Register name by id; empty when out of range.
    pub fn register_name(&self, id: RegId) -> Result<&'static str> {
        self.ensure_open()?;
        if cfg!(feature = "diet") {
            return Ok("");
        }
        Ok(self.decoder.reg_name(id))
    }

    /// Group name by id; empty when out of range.
    pub fn group_name(&self, id: GroupId) -> Result<&'static str> {
        self.ensure_open()?;
        if cfg!(feature = "diet") {
            return Ok("");
        }
        Ok(self.decoder.group_name(id))
    }

    fn detail_of<'i>(&self, insn: &'i Insn) -> Result<&'i Detail> {
        self.ensure_open()?;
        if insn.is_skipdata() {
            return Err(Error::SkipdataUnsupportedFeature);
        }
        insn.detail.as_ref().ok_or(Error::DetailUnavailable)
    }

    pub fn in_group(&self, insn: &Insn, group: GroupId) -> Result<bool> {
        Ok(self.detail_of(insn)?.in_group(group))
    }

    /// Whether `insn` reads `reg` implicitly.
    pub fn reads_register(&self, insn: &Insn, reg: RegId) -> Result<bool> {
        Ok(self.detail_of(insn)?.regs_read.contains(&reg))
    }

    /// Whether `insn` writes `reg` implicitly.
    pub fn writes_register(&self, insn: &Insn, reg: RegId) -> Result<bool> {
        Ok(self.detail_of(insn)?.regs_write.contains(&reg))
    }

    /// Operand type ids of `insn` in textual order.
    pub fn operand_types(&self, insn: &Insn) -> Result<Vec<u16>> {
        Ok(self.detail_of(insn)?.arch.op_types())
    }

    /// Number of operands of type `op_type`.
    pub fn operand_count(&self, insn: &Insn, op_type: u16) -> Result<usize> {
        let types = self.operand_types(insn)?;
        Ok(types.iter().filter(|&&t| t == op_type).count())
    }

    /// Index in the operand list of the `position`-th operand of type
    /// `op_type`, counting from 1.
    pub fn nth_operand_index(&self, insn: &Insn, op_type: u16, position: usize) -> Result<Option<usize>> {
        let types = self.operand_types(insn)?;
        if position == 0 {
            return Ok(None);
        }
        Ok(types
            .iter()
            .enumerate()
            .filter(|&(_, &t)| t == op_type)
            .nth(position - 1)
            .map(|(i, _)| i))
    }

    /// Every register read and written, explicit operands first, then the
    /// implicit ones, without duplicates.
    pub fn regs_access(&self, insn: &Insn) -> Result<(Vec<RegId>, Vec<RegId>)> {
        if cfg!(feature = "diet") {
            return Err(Error::DietBuildUnsupportedFeature("regs_access"));
        }
        let detail = self.detail_of(insn)?;
        let (mut reads, mut writes) = detail.arch.explicit_regs();
        for &reg in &detail.regs_read {
            push_reg(&mut reads, reg);
        }
        for &reg in &detail.regs_write {
            push_reg(&mut writes, reg);
        }
        Ok((reads, writes))
    }
}

fn reserve<T>(out: &mut Vec<T>, additional: usize) -> Result<()> {
    out.try_reserve(additional)
        .map_err(|_| Error::OutOfMemory(out.len() + additional))
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("arch", &self.arch)
            .field("mode", &self.mode)
            .field("detail", &self.detail)
            .field("syntax", &self.syntax)
            .field("unsigned", &self.unsigned)
            .field("skipdata", &self.skipdata)
            .field("mnemonics", &self.mnemonics.len())
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::arm::ArmReg;
    use crate::arch::mips::{MipsOpType, MipsReg};
    use crate::arch::x86::{X86Group, X86Insn, X86OpType, X86Reg};
    use crate::error::ErrorCode;
    use crate::table::IdTable;

    fn x86() -> Session {
        Session::open(Arch::X86, Mode::MODE_64).unwrap()
    }

    #[test]
    fn test_open_validates_mode() {
        let err = Session::open(Arch::X86, Mode::MODE_32 | Mode::MODE_64).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnsupportedMode);
        assert!(Session::open(Arch::X86, Mode::empty()).is_err());
        assert!(Session::open(Arch::Mips, Mode::MODE_32 | Mode::MICRO).is_err());
        assert!(Session::open(Arch::Ppc, Mode::MODE_32 | Mode::QPX).is_err());
        assert!(Session::open(Arch::Arm, Mode::THUMB | Mode::BIG_ENDIAN).is_ok());
    }

    #[test]
    fn test_options_checked_against_arch() {
        let mut mips = Session::open(Arch::Mips, Mode::MODE_32).unwrap();
        assert_eq!(mips.set_syntax(Syntax::Att).unwrap_err().code(), ErrorCode::InvalidOption);
        assert!(mips.set_unsigned(true).is_err());
        assert!(mips.set_mode(Mode::MODE_16).is_err());
        assert_eq!(mips.mode(), Mode::MODE_32);
        mips.set_mode(Mode::MODE_64 | Mode::BIG_ENDIAN).unwrap();
        assert_eq!(mips.mode(), Mode::MODE_64 | Mode::BIG_ENDIAN);

        let mut cs = x86();
        cs.set_syntax(Syntax::Att).unwrap();
        assert_eq!(cs.syntax(), Syntax::Att);
        assert!(cs.set_syntax(Syntax::NoRegName).is_err());
    }

    #[test]
    fn test_x86_scenario() {
        let mut cs = x86();
        let code = [0x55, 0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00];
        let insns = cs.disassemble(&code, 0x1000, None).unwrap();
        assert_eq!(insns.len(), 2);
        assert_eq!((insns[0].address, insns[0].size), (0x1000, 1));
        assert_eq!(insns[0].to_string(), "push\trbp");
        assert_eq!((insns[1].address, insns[1].size), (0x1001, 7));
        assert_eq!(insns[1].op_str, "rax, qword ptr [rip + 0x13b8]");
        assert!(insns.iter().all(|i| i.detail.is_none()));
    }

    #[test]
    fn test_arm_scenario() {
        let mut cs = Session::open(Arch::Arm, Mode::ARM).unwrap();
        let insns = cs.disassemble(&[0xed, 0xff, 0xff, 0xeb], 0x1000, None).unwrap();
        assert_eq!(insns.len(), 1);
        assert_eq!(insns[0].mnemonic, "bl");
        assert_eq!(insns[0].op_str, "#0xfbc");
        assert_eq!(insns[0].size, 4);
    }

    #[test]
    fn test_empty_and_invalid_input() {
        let mut cs = Session::open(Arch::Arm64, Mode::empty()).unwrap();
        assert!(cs.disassemble(&[], 0, None).unwrap().is_empty());
        let err = cs.disassemble(&[0, 0, 0, 0], 0x40, None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DisassemblyFailed);
        assert!(err.to_string().contains("0x40"));

        // Partial success keeps what was decoded.
        let code = [0x1f, 0x20, 0x03, 0xd5, 0, 0, 0, 0, 0x1f, 0x20, 0x03, 0xd5];
        assert_eq!(cs.disassemble(&code, 0, None).unwrap().len(), 1);
    }

    #[test]
    fn test_max_count() {
        let mut cs = x86();
        let code = [0x90; 8];
        assert_eq!(cs.disassemble(&code, 0, Some(3)).unwrap().len(), 3);
        assert_eq!(cs.disassemble(&code, 0, Some(0)).unwrap().len(), 8);
        assert_eq!(cs.disassemble_lite(&code, 0, Some(5)).unwrap().len(), 5);
    }

    #[test]
    fn test_output_grows_past_capacity_hint() {
        let mut cs = x86();
        let code = [0x90; 64];
        let insns = cs.disassemble(&code, 0, None).unwrap();
        assert_eq!(insns.len(), 64);
        assert_eq!(insns[63].address, 63);
    }

    #[test]
    fn test_lite_never_builds_detail() {
        let mut cs = x86();
        cs.set_detail(true).unwrap();
        let full = cs.disassemble(&[0x31, 0xc0], 0x10, None).unwrap();
        let lite = cs.disassemble_lite(&[0x31, 0xc0], 0x10, None).unwrap();
        assert!(full[0].detail.is_some());
        assert_eq!(lite[0], full[0].to_lite());
    }

    #[test]
    fn test_skipdata_whole_buffer() {
        let mut cs = Session::open(Arch::Arm64, Mode::empty()).unwrap();
        cs.set_skipdata(Some(SkipData::new().with_callback(|code, offset| code.len() - offset)))
            .unwrap();
        let insns = cs.disassemble(&[0, 0, 0, 0, 0, 0], 0x2000, None).unwrap();
        assert_eq!(insns.len(), 1);
        assert!(insns[0].is_skipdata());
        assert_eq!(insns[0].size, 6);
        assert_eq!(insns[0].mnemonic, ".byte");

        cs.set_skipdata(Some(SkipData::new().with_callback(|_, _| 0))).unwrap();
        assert!(cs.disassemble(&[0, 0, 0, 0], 0, None).unwrap().is_empty());
    }

    #[test]
    fn test_detail_queries() {
        let mut cs = x86();
        cs.set_detail(true).unwrap();
        let insns = cs.disassemble(&[0x31, 0xc0, 0x74, 0x00], 0, None).unwrap();
        let (xor, je) = (&insns[0], &insns[1]);

        assert!(cs.writes_register(xor, X86Reg::EFLAGS.id()).unwrap());
        assert!(!cs.reads_register(xor, X86Reg::EFLAGS.id()).unwrap());
        assert!(cs.reads_register(je, X86Reg::EFLAGS.id()).unwrap());
        assert!(cs.in_group(je, X86Group::JUMP.id()).unwrap());
        assert!(!cs.in_group(xor, X86Group::JUMP.id()).unwrap());

        assert_eq!(cs.operand_count(xor, X86OpType::REG as u16).unwrap(), 2);
        assert_eq!(cs.operand_count(xor, X86OpType::MEM as u16).unwrap(), 0);
        assert_eq!(cs.nth_operand_index(xor, X86OpType::REG as u16, 2).unwrap(), Some(1));
        assert_eq!(cs.nth_operand_index(xor, X86OpType::REG as u16, 3).unwrap(), None);
        assert_eq!(cs.nth_operand_index(je, X86OpType::IMM as u16, 1).unwrap(), Some(0));
    }

    #[test]
    fn test_detail_query_errors() {
        let mut cs = x86();
        let plain = cs.disassemble(&[0x90], 0, None).unwrap();
        assert_eq!(
            cs.in_group(&plain[0], 1).unwrap_err().code(),
            ErrorCode::DetailUnavailable
        );

        cs.set_detail(true).unwrap();
        cs.set_skipdata(Some(SkipData::new())).unwrap();
        let data = cs.disassemble(&[0x0f, 0x0b, 0x0b], 0, None).unwrap();
        let skipped = data.iter().find(|i| i.is_skipdata()).unwrap();
        assert_eq!(
            cs.operand_count(skipped, 1).unwrap_err().code(),
            ErrorCode::SkipdataUnsupportedFeature
        );
    }

    #[cfg(not(feature = "diet"))]
    #[test]
    fn test_regs_access_merges_explicit_and_implicit() {
        let mut cs = x86();
        cs.set_detail(true).unwrap();
        let insns = cs.disassemble(&[0x31, 0xc0], 0, None).unwrap();
        let (reads, writes) = cs.regs_access(&insns[0]).unwrap();
        assert_eq!(reads, vec![X86Reg::EAX.id()]);
        assert_eq!(writes, vec![X86Reg::EAX.id(), X86Reg::EFLAGS.id()]);
    }

    #[cfg(not(feature = "diet"))]
    #[test]
    fn test_names() {
        let cs = Session::open(Arch::Arm, Mode::ARM).unwrap();
        assert_eq!(cs.register_name(ArmReg::SP.id()).unwrap(), "sp");
        assert_eq!(cs.register_name(0).unwrap(), "");
        assert_eq!(cs.register_name(u16::MAX).unwrap(), "");
        assert_eq!(cs.group_name(crate::insn::group::JUMP).unwrap(), "jump");
        let x = x86();
        assert_eq!(x.instruction_name(X86Insn::PUSH.id()).unwrap(), "push");
    }

    #[test]
    fn test_mnemonic_override() {
        let mut cs = x86();
        cs.set_mnemonic(X86Insn::PUSH.id(), Some("pushq")).unwrap();
        let insns = cs.disassemble(&[0x55, 0x55], 0, None).unwrap();
        assert!(insns.iter().all(|i| i.mnemonic == "pushq"));
        cs.set_mnemonic(X86Insn::PUSH.id(), None).unwrap();
        assert_eq!(cs.disassemble(&[0x55], 0, None).unwrap()[0].mnemonic, "push");
        assert!(cs.set_mnemonic(0, Some("bogus")).is_err());
    }

    #[test]
    fn test_iter_is_lazy_and_ordered() {
        let mut cs = Session::open(Arch::Mips, Mode::MODE_32 | Mode::BIG_ENDIAN).unwrap();
        cs.set_detail(true).unwrap();
        let code = [0x24, 0x02, 0x00, 0x0c, 0x00, 0x00, 0x00, 0x00];
        let mut iter = cs.disasm_iter(&code, 0x1008).unwrap();
        let first = iter.next().unwrap();
        assert_eq!(first.mnemonic, "addiu");
        assert_eq!(first.op_str, "$v0, $zero, 0xc");
        assert_eq!(iter.address(), 0x100c);
        let second = iter.next().unwrap();
        assert_eq!(second.mnemonic, "nop");
        assert!(iter.next().is_none());

        let detail = first.detail.unwrap();
        assert_eq!(detail.arch.op_types(), vec![
            MipsOpType::REG as u16,
            MipsOpType::REG as u16,
            MipsOpType::IMM as u16,
        ]);
        let (reads, writes) = detail.arch.explicit_regs();
        assert_eq!(reads, vec![MipsReg::ZERO.id()]);
        assert_eq!(writes, vec![MipsReg::V0.id()]);
    }

    #[test]
    fn test_closed_session() {
        let mut cs = x86();
        let insns = cs.disassemble(&[0x90], 0, None).unwrap();
        cs.close();
        cs.close();
        assert!(cs.is_closed());
        assert_eq!(cs.disassemble(&[0x90], 0, None).unwrap_err().code(), ErrorCode::SessionClosed);
        assert!(cs.set_detail(true).is_err());
        assert!(cs.disasm_iter(&[0x90], 0).is_err());
        assert!(matches!(cs.in_group(&insns[0], 1), Err(Error::SessionClosed)));
        assert!(matches!(cs.register_name(1), Err(Error::SessionClosed)));
        assert!(matches!(cs.instruction_name(1), Err(Error::SessionClosed)));
        assert!(matches!(cs.group_name(1), Err(Error::SessionClosed)));
        // Results outlive the session.
        drop(cs);
        assert_eq!(insns[0].mnemonic, "nop");
    }
}
