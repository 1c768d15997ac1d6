//! Error surface of the engine.

use std::fmt;

use serde::Serialize;

use crate::Arch;

/// Stable numeric error codes, one per failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u32)]
pub enum ErrorCode {
    Ok = 0,
    OutOfMemory = 1,
    UnsupportedArchitecture = 2,
    UnsupportedMode = 3,
    DetailUnavailable = 4,
    DietBuildUnsupportedFeature = 5,
    SkipdataUnsupportedFeature = 6,
    SessionClosed = 7,
    DisassemblyFailed = 8,
    InvalidOption = 9,
    VersionMismatch = 10,
}

impl ErrorCode {
    /// Human-readable description, the `strerror` of this engine.
    pub fn strerror(self) -> &'static str {
        match self {
            ErrorCode::Ok => "OK",
            ErrorCode::OutOfMemory => "Out of memory",
            ErrorCode::UnsupportedArchitecture => "Invalid/unsupported architecture",
            ErrorCode::UnsupportedMode => "Invalid mode",
            ErrorCode::DetailUnavailable => "Details are unavailable",
            ErrorCode::DietBuildUnsupportedFeature => {
                "This feature is not available in diet mode"
            }
            ErrorCode::SkipdataUnsupportedFeature => {
                "Information irrelevant for 'data' instruction in skip-data mode"
            }
            ErrorCode::SessionClosed => "Session is closed",
            ErrorCode::DisassemblyFailed => "Disassembly failed",
            ErrorCode::InvalidOption => "Invalid option",
            ErrorCode::VersionMismatch => "Different API version between core & binding",
        }
    }

    /// Map a raw code back; unknown values yield `None`.
    pub fn from_u32(code: u32) -> Option<Self> {
        Some(match code {
            0 => ErrorCode::Ok,
            1 => ErrorCode::OutOfMemory,
            2 => ErrorCode::UnsupportedArchitecture,
            3 => ErrorCode::UnsupportedMode,
            4 => ErrorCode::DetailUnavailable,
            5 => ErrorCode::DietBuildUnsupportedFeature,
            6 => ErrorCode::SkipdataUnsupportedFeature,
            7 => ErrorCode::SessionClosed,
            8 => ErrorCode::DisassemblyFailed,
            9 => ErrorCode::InvalidOption,
            10 => ErrorCode::VersionMismatch,
            _ => return None,
        })
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strerror())
    }
}

/// `strerror` over raw codes. Unknown codes give a fixed fallback text.
pub fn strerror(code: u32) -> &'static str {
    ErrorCode::from_u32(code)
        .map(ErrorCode::strerror)
        .unwrap_or("Unknown error code")
}

/// Error type for every fallible engine operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Result buffer could not be allocated
    #[error("out of memory while reserving {0} instructions")]
    OutOfMemory(usize),

    /// Architecture id or name is not known to this engine
    #[error("unsupported architecture: {0}")]
    UnsupportedArchitecture(String),

    /// Mode bits are not valid for the architecture
    #[error("unsupported mode 0x{mode:x} for {arch}")]
    UnsupportedMode { arch: Arch, mode: u32 },

    /// A detail query was made on an instruction decoded without detail
    #[error("instruction detail is unavailable (detail mode was off)")]
    DetailUnavailable,

    /// Feature compiled out by the `diet` build
    #[error("{0} is not available in a diet build")]
    DietBuildUnsupportedFeature(&'static str),

    /// Detail query on a synthetic skip-data instruction
    #[error("information irrelevant for data emitted in skip-data mode")]
    SkipdataUnsupportedFeature,

    /// Operation on a session after `close()`
    #[error("session is closed")]
    SessionClosed,

    /// Nothing could be decoded
    #[error("disassembly failed: {reason}")]
    DisassemblyFailed { reason: String },

    /// Option not applicable to the session architecture
    #[error("option {option} is not applicable to {arch}")]
    InvalidOption { arch: Arch, option: &'static str },

    /// Binding built against a different engine version
    #[error("API version mismatch: engine is {engine_major}.{engine_minor}, caller expects {major}.{minor}")]
    VersionMismatch {
        engine_major: u32,
        engine_minor: u32,
        major: u32,
        minor: u32,
    },
}

impl Error {
    /// Stable numeric code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::OutOfMemory(_) => ErrorCode::OutOfMemory,
            Error::UnsupportedArchitecture(_) => ErrorCode::UnsupportedArchitecture,
            Error::UnsupportedMode { .. } => ErrorCode::UnsupportedMode,
            Error::DetailUnavailable => ErrorCode::DetailUnavailable,
            Error::DietBuildUnsupportedFeature(_) => ErrorCode::DietBuildUnsupportedFeature,
            Error::SkipdataUnsupportedFeature => ErrorCode::SkipdataUnsupportedFeature,
            Error::SessionClosed => ErrorCode::SessionClosed,
            Error::DisassemblyFailed { .. } => ErrorCode::DisassemblyFailed,
            Error::InvalidOption { .. } => ErrorCode::InvalidOption,
            Error::VersionMismatch { .. } => ErrorCode::VersionMismatch,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for raw in 0..=10 {
            let code = ErrorCode::from_u32(raw).unwrap();
            assert_eq!(code as u32, raw);
            assert!(!code.strerror().is_empty());
        }
        assert_eq!(ErrorCode::from_u32(11), None);
        assert_eq!(strerror(99), "Unknown error code");
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(Error::SessionClosed.code(), ErrorCode::SessionClosed);
        let err = Error::DisassemblyFailed { reason: "invalid instruction at 0x1000".into() };
        assert_eq!(err.code() as u32, 8);
        assert_eq!(err.to_string(), "disassembly failed: invalid instruction at 0x1000");
    }
}
