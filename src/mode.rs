//! Session configuration: mode bits and textual syntax flavors.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    /// Orthogonal decode configuration flags.
    ///
    /// Several submode flags share a bit because they never apply to the
    /// same architecture (`THUMB`, `MICRO`, `V9` and `QPX` are all bit 4).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct Mode: u32 {
        /// 16-bit x86
        const MODE_16       = 1 << 1;
        /// 32-bit x86, MIPS32, PPC32
        const MODE_32       = 1 << 2;
        /// 64-bit x86, MIPS64, PPC64
        const MODE_64       = 1 << 3;
        /// ARM Thumb / Thumb-2
        const THUMB         = 1 << 4;
        /// ARM Cortex-M (Thumb only)
        const MCLASS        = 1 << 5;
        /// ARMv8 A32 encodings
        const V8            = 1 << 6;
        /// MicroMIPS
        const MICRO         = 1 << 4;
        /// MIPS III
        const MIPS3         = 1 << 5;
        /// MIPS32 release 6
        const MIPS32R6      = 1 << 6;
        /// MIPS II
        const MIPS2         = 1 << 7;
        /// SPARC V9
        const V9            = 1 << 4;
        /// PPC quad processing extensions
        const QPX           = 1 << 4;
        /// Big-endian byte order
        const BIG_ENDIAN    = 1 << 31;
    }
}

impl Mode {
    /// Little-endian, the default byte order (no bit set).
    pub const LITTLE_ENDIAN: Mode = Mode::empty();
    /// ARM A32 state (no bit set).
    pub const ARM: Mode = Mode::empty();
    /// MIPS32 alias of `MODE_32`.
    pub const MIPS32: Mode = Mode::MODE_32;
    /// MIPS64 alias of `MODE_64`.
    pub const MIPS64: Mode = Mode::MODE_64;

    /// Whether decoding reads multi-byte units big-endian.
    pub fn is_big_endian(self) -> bool {
        self.contains(Mode::BIG_ENDIAN)
    }
}

/// Mode names accepted by [`Mode::from_str`].
const MODE_NAMES: &[(&str, Mode)] = &[
    ("little-endian", Mode::LITTLE_ENDIAN),
    ("le", Mode::LITTLE_ENDIAN),
    ("arm", Mode::ARM),
    ("16", Mode::MODE_16),
    ("32", Mode::MODE_32),
    ("64", Mode::MODE_64),
    ("thumb", Mode::THUMB),
    ("mclass", Mode::MCLASS),
    ("v8", Mode::V8),
    ("micro", Mode::MICRO),
    ("mips3", Mode::MIPS3),
    ("mips32r6", Mode::MIPS32R6),
    ("mips2", Mode::MIPS2),
    ("mips32", Mode::MIPS32),
    ("mips64", Mode::MIPS64),
    ("v9", Mode::V9),
    ("qpx", Mode::QPX),
    ("big-endian", Mode::BIG_ENDIAN),
    ("be", Mode::BIG_ENDIAN),
];

impl FromStr for Mode {
    type Err = String;

    /// `+` or `,` separated names, e.g. `thumb+big-endian` or `32`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(['+', ','])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .try_fold(Mode::empty(), |mode, part| {
                MODE_NAMES
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(part))
                    .map(|(_, bits)| mode | *bits)
                    .ok_or_else(|| format!("Unknown mode: {}", part))
            })
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::LITTLE_ENDIAN
    }
}

/// Textual rendering flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Syntax {
    /// Architecture default (Intel for x86)
    #[default]
    Default,
    /// x86 Intel syntax
    Intel,
    /// x86 AT&T syntax
    Att,
    /// Print registers by number only (ARM, PPC)
    NoRegName,
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Syntax::Default => write!(f, "default"),
            Syntax::Intel => write!(f, "intel"),
            Syntax::Att => write!(f, "att"),
            Syntax::NoRegName => write!(f, "noregname"),
        }
    }
}

impl FromStr for Syntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Syntax::Default),
            "intel" => Ok(Syntax::Intel),
            "att" | "at&t" => Ok(Syntax::Att),
            "noregname" => Ok(Syntax::NoRegName),
            _ => Err(format!("Unknown syntax: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_submode_bits() {
        assert_eq!(Mode::THUMB.bits(), Mode::MICRO.bits());
        assert_eq!(Mode::V9.bits(), Mode::QPX.bits());
        assert_eq!(Mode::MIPS32, Mode::MODE_32);
        assert!(Mode::LITTLE_ENDIAN.is_empty());
    }

    #[test]
    fn test_endianness() {
        assert!((Mode::MODE_32 | Mode::BIG_ENDIAN).is_big_endian());
        assert!(!Mode::THUMB.is_big_endian());
        assert_eq!(Mode::from_bits_truncate(0x8000_0004), Mode::MODE_32 | Mode::BIG_ENDIAN);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("64".parse::<Mode>(), Ok(Mode::MODE_64));
        assert_eq!("thumb+big-endian".parse::<Mode>(), Ok(Mode::THUMB | Mode::BIG_ENDIAN));
        assert_eq!("mips32, BE".parse::<Mode>(), Ok(Mode::MODE_32 | Mode::BIG_ENDIAN));
        assert_eq!("arm".parse::<Mode>(), Ok(Mode::empty()));
        assert!("thumb2".parse::<Mode>().is_err());
        assert_eq!("AT&T".parse::<Syntax>(), Ok(Syntax::Att));
        assert_eq!(Syntax::NoRegName.to_string().parse::<Syntax>(), Ok(Syntax::NoRegName));
    }
}
