//! JSON and JSON Lines formatters

use std::io::Write;

use serde::Serialize;

use super::{hex_bytes, FormatError, InsnFormatter};
use crate::insn::{Detail, Insn};

/// Pretty JSON document: `{ "count": n, "instructions": [...] }`.
pub struct JsonFormatter;

/// One compact JSON object per instruction per line.
pub struct JsonLinesFormatter;

/// Serializable view of one instruction
#[derive(Serialize)]
struct InsnRecord<'a> {
    /// Address as `0x` hex
    address: String,
    size: u16,
    id: u16,
    mnemonic: &'a str,
    op_str: &'a str,
    /// Bytes as space-separated hex
    bytes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a Detail>,
}

impl<'a> From<&'a Insn> for InsnRecord<'a> {
    fn from(insn: &'a Insn) -> Self {
        Self {
            address: format!("0x{:x}", insn.address),
            size: insn.size,
            id: insn.id,
            mnemonic: &insn.mnemonic,
            op_str: &insn.op_str,
            bytes: hex_bytes(insn.bytes()),
            detail: insn.detail.as_ref(),
        }
    }
}

#[derive(Serialize)]
struct Listing<'a> {
    count: usize,
    instructions: Vec<InsnRecord<'a>>,
}

impl InsnFormatter for JsonFormatter {
    fn write(&self, insns: &[Insn], out: &mut dyn Write) -> Result<(), FormatError> {
        let listing = Listing {
            count: insns.len(),
            instructions: insns.iter().map(InsnRecord::from).collect(),
        };
        serde_json::to_writer_pretty(&mut *out, &listing)?;
        writeln!(out)?;
        Ok(())
    }
}

impl InsnFormatter for JsonLinesFormatter {
    fn write(&self, insns: &[Insn], out: &mut dyn Write) -> Result<(), FormatError> {
        for insn in insns {
            serde_json::to_writer(&mut *out, &InsnRecord::from(insn))?;
            writeln!(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::tests::sample;
    use serde_json::Value;

    #[test]
    fn test_json_document_carries_detail() {
        let doc = JsonFormatter.format(&sample(true)).unwrap();
        let v: Value = serde_json::from_str(&doc).unwrap();
        assert_eq!(v["count"], 3);
        let first = &v["instructions"][0];
        assert_eq!(first["address"], "0x1000");
        assert_eq!(first["mnemonic"], "push");
        assert_eq!(first["bytes"], "55");
        assert_eq!(first["detail"]["arch"]["arch"], "x86");
        assert!(first["detail"]["regs_read"].is_array());
    }

    #[test]
    fn test_json_omits_missing_detail() {
        let doc = JsonFormatter.format(&sample(false)).unwrap();
        let v: Value = serde_json::from_str(&doc).unwrap();
        assert!(v["instructions"][1].get("detail").is_none());
        assert_eq!(v["instructions"][1]["op_str"], "rax, qword ptr [rip + 0x13b8]");
    }

    #[test]
    fn test_json_lines() {
        let out = JsonLinesFormatter.format(&sample(false)).unwrap();
        let lines: Vec<Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2]["mnemonic"], "ret");
        assert_eq!(lines[2]["address"], "0x1008");
        assert_eq!(lines[1]["size"], 7);
    }
}
