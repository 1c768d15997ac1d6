//! `polydis`: hex bytes or a raw file in, instruction listing out.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;

use polydis::format::OutputFormat;
use polydis::{Address, Arch, Mode, Session, SkipData, Syntax};

#[derive(Parser, Debug)]
#[command(version)]
#[command(about = "Multi-architecture machine-code disassembler", long_about = None)]
struct Args {
    /// Target architecture
    #[arg(short, long, value_enum)]
    arch: Arch,

    /// Mode names joined by `+`, e.g. `64`, `thumb+big-endian`, `mips32+be`
    #[arg(short, long, default_value = "le")]
    mode: Mode,

    /// Load address of the first byte (decimal or 0x hex)
    #[arg(short = 'A', long, default_value = "0", value_parser = parse_address)]
    address: Address,

    /// Read code from a raw binary file instead of the HEX argument
    #[arg(short, long, conflicts_with = "hex")]
    file: Option<PathBuf>,

    /// Code as hex, e.g. "55 48 8b 05" or "\x55\x48"
    hex: Option<String>,

    /// Stop after this many instructions
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Output format
    #[arg(short = 'F', long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the listing here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Build operand detail (shown in JSON output)
    #[arg(short, long)]
    detail: bool,

    /// Textual syntax: default, intel, att, noregname
    #[arg(short, long, default_value = "default")]
    syntax: Syntax,

    /// Print negative immediates unsigned (x86)
    #[arg(long)]
    unsigned: bool,

    /// Emit undecodable bytes as data instead of stopping
    #[arg(long)]
    skipdata: bool,

    /// Mnemonic of skip-data entries
    #[arg(long, default_value = polydis::skipdata::DEFAULT_MNEMONIC)]
    data_mnemonic: String,
}

fn parse_address(s: &str) -> Result<Address, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => Address::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {:?}: {}", s, e))
}

/// Parse hex text, ignoring whitespace, commas and `0x` / `\x` markers.
fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = text
        .replace("0x", "")
        .replace("0X", "")
        .replace("\\x", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if !digits.is_ascii() {
        bail!("non-hex characters in {:?}", text);
    }
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits in {:?}", text);
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("invalid hex byte {:?}", &digits[i..i + 2]))
        })
        .collect()
}

fn load_code(args: &Args) -> anyhow::Result<Vec<u8>> {
    match (&args.file, &args.hex) {
        (Some(path), _) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        (None, Some(hex)) => parse_hex(hex),
        (None, None) => bail!("no input: pass HEX bytes or --file"),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    polydis::ensure_version(polydis::API_MAJOR, polydis::API_MINOR)?;

    let code = load_code(&args)?;
    info!("{} bytes of {} code at 0x{:x}", code.len(), args.arch, args.address);

    let mut cs = Session::open(args.arch, args.mode)
        .with_context(|| format!("cannot open a {} session", args.arch))?;
    cs.set_detail(args.detail)?;
    cs.set_syntax(args.syntax)?;
    if args.unsigned {
        cs.set_unsigned(true)?;
    }
    if args.skipdata {
        cs.set_skipdata(Some(SkipData::new().with_mnemonic(args.data_mnemonic.as_str())))?;
    }

    let insns = cs.disassemble(&code, args.address, args.count)?;
    cs.close();

    let formatter = args.format.formatter();
    match &args.output {
        Some(path) => formatter
            .write_file(&insns, path)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            formatter.write(&insns, &mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_hex("55 48 8b").unwrap(), vec![0x55, 0x48, 0x8b]);
        assert_eq!(parse_hex("\\x55\\x48").unwrap(), vec![0x55, 0x48]);
        assert_eq!(parse_hex("0x55, 0xc3").unwrap(), vec![0x55, 0xc3]);
        assert!(parse_hex("5").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_args() {
        let args = Args::parse_from([
            "polydis", "-a", "arm", "-m", "thumb", "-A", "0x1000", "-F", "json", "00bf",
        ]);
        assert_eq!(args.arch, Arch::Arm);
        assert_eq!(args.mode, Mode::THUMB);
        assert_eq!(args.address, 0x1000);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(load_code(&args).unwrap(), vec![0x00, 0xbf]);
        assert_eq!(parse_address("4096"), Ok(4096));
    }
}
