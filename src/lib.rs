//! Core types, sessions and per-architecture decoders of the polydis
//! disassembler.
//!
//! The library decodes raw machine code for x86, ARM, ARM64, MIPS, PowerPC,
//! SPARC, SystemZ and XCore into owned instruction records, optionally with
//! structured operand detail. Decoding is native: every architecture carries
//! its own tables and decoder, no external engine is involved.
//!
//! # Basic Usage
//!
//! ```rust
//! use polydis::{Arch, Mode, Session};
//!
//! let mut cs = Session::open(Arch::Mips, Mode::MODE_32 | Mode::BIG_ENDIAN).unwrap();
//! cs.set_detail(true).unwrap();
//!
//! for insn in cs.disassemble(&[0x24, 0x02, 0x00, 0x0c], 0x1008, None).unwrap() {
//!     println!("0x{:x}: {}", insn.address, insn);
//!     let detail = insn.detail.as_ref().unwrap();
//!     assert_eq!(detail.op_count(), 3);
//! }
//! ```

pub mod arch;
pub mod batch;
pub mod decoder;
pub mod error;
pub mod format;
pub mod insn;
mod large_tests;
pub mod mode;
pub mod session;
pub mod skipdata;
pub mod sweep;
mod table;

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Serialize;

pub use crate::error::{strerror, Error, ErrorCode, Result};
pub use crate::insn::{Access, ArchDetail, Detail, GroupId, Insn, InsnId, LiteInsn, RegId};
pub use crate::mode::{Mode, Syntax};
pub use crate::session::Session;
pub use crate::skipdata::SkipData;
pub use crate::sweep::Sweep;
pub use crate::table::IdTable;

/// Represents an address in memory
pub type Address = u64;

/// Major version of the engine API.
pub const API_MAJOR: u32 = 3;
/// Minor version of the engine API.
pub const API_MINOR: u32 = 0;

/// Engine API version as `(major, minor)`.
pub fn version() -> (u32, u32) {
    (API_MAJOR, API_MINOR)
}

/// Refuse to run against an engine with a different API version.
pub fn ensure_version(major: u32, minor: u32) -> Result<()> {
    if (major, minor) == version() {
        Ok(())
    } else {
        Err(Error::VersionMismatch {
            engine_major: API_MAJOR,
            engine_minor: API_MINOR,
            major,
            minor,
        })
    }
}

/// Whether this build decodes `arch`.
pub fn support(arch: Arch) -> bool {
    Arch::all().contains(&arch)
}

/// Whether this is a diet build (no name tables, no `regs_access`).
pub fn is_diet() -> bool {
    cfg!(feature = "diet")
}

/// Supported architectures. Discriminants are the stable architecture ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// ARM (A32 and Thumb)
    Arm = 0,
    /// AArch64
    Arm64 = 1,
    /// MIPS32 / MIPS64
    Mips = 2,
    /// x86 16/32/64-bit
    X86 = 3,
    /// PowerPC 32/64-bit
    Ppc = 4,
    /// SPARC V8/V9
    Sparc = 5,
    /// SystemZ
    Sysz = 6,
    /// XCore
    Xcore = 7,
}

impl Arch {
    /// Every architecture, in id order.
    pub fn all() -> &'static [Arch] {
        &[
            Arch::Arm,
            Arch::Arm64,
            Arch::Mips,
            Arch::X86,
            Arch::Ppc,
            Arch::Sparc,
            Arch::Sysz,
            Arch::Xcore,
        ]
    }

    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Option<Arch> {
        Arch::all().get(id as usize).copied()
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::Arm => write!(f, "ARM"),
            Arch::Arm64 => write!(f, "ARM64"),
            Arch::Mips => write!(f, "MIPS"),
            Arch::X86 => write!(f, "X86"),
            Arch::Ppc => write!(f, "PPC"),
            Arch::Sparc => write!(f, "SPARC"),
            Arch::Sysz => write!(f, "SystemZ"),
            Arch::Xcore => write!(f, "XCore"),
        }
    }
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "arm" => Ok(Arch::Arm),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            "mips" => Ok(Arch::Mips),
            "x86" => Ok(Arch::X86),
            "ppc" | "powerpc" => Ok(Arch::Ppc),
            "sparc" => Ok(Arch::Sparc),
            "sysz" | "systemz" | "s390x" => Ok(Arch::Sysz),
            "xcore" => Ok(Arch::Xcore),
            _ => Err(Error::UnsupportedArchitecture(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_ids() {
        for (i, &arch) in Arch::all().iter().enumerate() {
            assert_eq!(arch.id(), i as u32);
            assert_eq!(Arch::from_id(i as u32), Some(arch));
            assert_eq!(arch.to_string().parse::<Arch>().unwrap(), arch);
            assert!(support(arch));
        }
        assert_eq!(Arch::from_id(8), None);
    }

    #[test]
    fn test_arch_names() {
        assert_eq!("AArch64".parse::<Arch>().unwrap(), Arch::Arm64);
        assert_eq!("s390x".parse::<Arch>().unwrap(), Arch::Sysz);
        let err = "m68k".parse::<Arch>().unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnsupportedArchitecture);
    }

    #[test]
    fn test_version_gate() {
        assert_eq!(version(), (API_MAJOR, API_MINOR));
        assert!(ensure_version(API_MAJOR, API_MINOR).is_ok());
        let err = ensure_version(API_MAJOR + 1, 0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::VersionMismatch);
        assert_eq!(strerror(err.code() as u32), "Different API version between core & binding");
    }
}
