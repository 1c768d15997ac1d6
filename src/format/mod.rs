//! Renderers for decoded instruction listings.

mod csv;
mod json;

pub use self::csv::CsvFormatter;
pub use self::json::{JsonFormatter, JsonLinesFormatter};

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;

use crate::insn::Insn;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text listing (default)
    #[default]
    Text,
    /// Pretty JSON document, with detail when present
    Json,
    /// One JSON object per line
    JsonLines,
    /// Comma-separated values
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonLines => write!(f, "jsonl"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "jsonlines" | "json-lines" => Ok(OutputFormat::JsonLines),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl OutputFormat {
    /// Every available format.
    pub fn available_formats() -> &'static [Self] {
        &[
            OutputFormat::Text,
            OutputFormat::Json,
            OutputFormat::JsonLines,
            OutputFormat::Csv,
        ]
    }

    /// Renderer for this format.
    pub fn formatter(&self) -> Box<dyn InsnFormatter> {
        match self {
            OutputFormat::Text => Box::new(TextFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::JsonLines => Box::new(JsonLinesFormatter),
            OutputFormat::Csv => Box::new(CsvFormatter),
        }
    }
}

/// Failure while rendering a listing.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Renders a slice of instructions.
pub trait InsnFormatter {
    /// Write the rendering of `insns` to `out`.
    fn write(&self, insns: &[Insn], out: &mut dyn Write) -> Result<(), FormatError>;

    /// Render to a string.
    fn format(&self, insns: &[Insn]) -> Result<String, FormatError> {
        let mut buf = Vec::new();
        self.write(insns, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Render to a file, replacing it.
    fn write_file(&self, insns: &[Insn], path: &Path) -> Result<(), FormatError> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write(insns, &mut out)?;
        out.flush()?;
        Ok(())
    }
}

/// `0x1000: push rbp ; 55`, one instruction per line.
pub struct TextFormatter;

impl InsnFormatter for TextFormatter {
    fn write(&self, insns: &[Insn], out: &mut dyn Write) -> Result<(), FormatError> {
        for insn in insns {
            writeln!(out, "0x{:x}: {} ; {}", insn.address, text(insn), hex_bytes(insn.bytes()))?;
        }
        Ok(())
    }
}

/// Mnemonic and operands separated by one space.
pub(crate) fn text(insn: &Insn) -> String {
    if insn.op_str.is_empty() {
        insn.mnemonic.clone()
    } else {
        format!("{} {}", insn.mnemonic, insn.op_str)
    }
}

/// `48 8b 05`
pub(crate) fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{Arch, Mode, Session};

    pub(crate) fn sample(detail: bool) -> Vec<Insn> {
        let mut cs = Session::open(Arch::X86, Mode::MODE_64).unwrap();
        cs.set_detail(detail).unwrap();
        cs.disassemble(&[0x55, 0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00, 0xc3], 0x1000, None)
            .unwrap()
    }

    #[test]
    fn test_text_listing() {
        let listing = TextFormatter.format(&sample(false)).unwrap();
        let lines: Vec<_> = listing.lines().collect();
        assert_eq!(
            lines,
            vec![
                "0x1000: push rbp ; 55",
                "0x1001: mov rax, qword ptr [rip + 0x13b8] ; 48 8b 05 b8 13 00 00",
                "0x1008: ret ; c3",
            ]
        );
    }

    #[test]
    fn test_format_names() {
        for format in OutputFormat::available_formats() {
            assert_eq!(format.to_string().parse::<OutputFormat>(), Ok(*format));
        }
        assert_eq!("JSONLines".parse::<OutputFormat>(), Ok(OutputFormat::JsonLines));
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listing.txt");
        OutputFormat::Text
            .formatter()
            .write_file(&sample(false), &path)
            .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("0x1000: push rbp ; 55\n"));
        assert_eq!(written.lines().count(), 3);
    }
}
