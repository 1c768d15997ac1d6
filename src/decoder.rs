//! Architecture decoders behind one trait.
//!
//! Decoders are stateless unit structs: everything that varies per session
//! travels in a [`DecodeConfig`] and the little that carries between
//! instructions in a [`DecodeState`], so one `'static` instance per
//! architecture serves every session in the process.

use std::fmt;

use crate::arch::{arm, arm64, mips, ppc, sparc, sysz, x86, xcore};
use crate::insn::{Detail, GroupId, InsnId, RegId};
use crate::{Address, Arch, Mode, Syntax};

/// Per-call decode settings, copied out of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    pub mode: Mode,
    pub syntax: Syntax,
    pub detail: bool,
    /// Print negative immediates in their unsigned form (x86)
    pub unsigned: bool,
}

impl DecodeConfig {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            syntax: Syntax::Default,
            detail: false,
            unsigned: false,
        }
    }
}

/// State carried from one instruction to the next within a single sweep.
///
/// Only Thumb uses it (the pending IT block); every sweep starts from
/// the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeState {
    /// Thumb ITSTATE as `firstcond:mask`; 0 outside an IT block
    pub(crate) it: u8,
}

/// One decoded instruction before it is copied into an [`Insn`](crate::Insn).
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub id: InsnId,
    pub size: usize,
    pub mnemonic: String,
    pub op_str: String,
    pub detail: Option<Detail>,
}

/// Architecture-specific decoder.
pub trait Decoder: Send + Sync {
    /// Architecture served by this decoder.
    fn arch(&self) -> Arch;

    /// Mode bits this architecture accepts.
    fn mode_mask(&self) -> Mode;

    /// Whether `mode` is a valid configuration.
    fn check_mode(&self, mode: Mode) -> bool {
        self.mode_mask().contains(mode)
    }

    /// Whether `syntax` applies to this architecture.
    fn supports_syntax(&self, syntax: Syntax) -> bool {
        syntax == Syntax::Default
    }

    /// Decode one instruction from the start of `code`.
    ///
    /// Returns `None` when the bytes do not form a valid instruction for
    /// the configured mode, including when `code` is too short. Never reads
    /// past `code.len()`.
    fn decode(
        &self,
        code: &[u8],
        address: Address,
        cfg: &DecodeConfig,
        state: &mut DecodeState,
    ) -> Option<Decoded>;

    /// [`decode`](Decoder::decode) with a fresh state.
    fn decode_one(&self, code: &[u8], address: Address, cfg: &DecodeConfig) -> Option<Decoded> {
        self.decode(code, address, cfg, &mut DecodeState::default())
    }

    /// Bytes a skip-data entry covers when no callback is installed.
    fn skipdata_len(&self, mode: Mode) -> usize;

    fn reg_name(&self, reg: RegId) -> &'static str;

    fn insn_name(&self, id: InsnId) -> &'static str;

    fn group_name(&self, id: GroupId) -> &'static str;
}

impl fmt::Debug for dyn Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decoder::{}", self.arch())
    }
}

/// The process-wide decoder for `arch`.
pub fn decoder_for(arch: Arch) -> &'static dyn Decoder {
    match arch {
        Arch::Arm => &arm::ArmDecoder,
        Arch::Arm64 => &arm64::Arm64Decoder,
        Arch::Mips => &mips::MipsDecoder,
        Arch::X86 => &x86::X86Decoder,
        Arch::Ppc => &ppc::PpcDecoder,
        Arch::Sparc => &sparc::SparcDecoder,
        Arch::Sysz => &sysz::SyszDecoder,
        Arch::Xcore => &xcore::XcoreDecoder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_mapping() {
        for &arch in Arch::all() {
            assert_eq!(decoder_for(arch).arch(), arch);
        }
    }

    #[test]
    fn test_short_input_is_rejected() {
        for &arch in Arch::all() {
            let d = decoder_for(arch);
            let cfg = DecodeConfig::new(default_mode(arch));
            assert!(d.decode_one(&[], 0, &cfg).is_none(), "{arch} decoded empty input");
        }
    }

    #[test]
    fn test_skip_defaults() {
        assert_eq!(decoder_for(Arch::X86).skipdata_len(Mode::MODE_64), 1);
        assert_eq!(decoder_for(Arch::Arm).skipdata_len(Mode::ARM), 4);
        assert_eq!(decoder_for(Arch::Arm).skipdata_len(Mode::THUMB), 2);
        assert_eq!(decoder_for(Arch::Sysz).skipdata_len(Mode::BIG_ENDIAN), 2);
        assert_eq!(decoder_for(Arch::Xcore).skipdata_len(Mode::empty()), 2);
    }

    fn default_mode(arch: Arch) -> Mode {
        match arch {
            Arch::X86 => Mode::MODE_64,
            Arch::Mips | Arch::Ppc => Mode::MODE_32 | Mode::BIG_ENDIAN,
            Arch::Sparc | Arch::Sysz => Mode::BIG_ENDIAN,
            _ => Mode::empty(),
        }
    }
}
