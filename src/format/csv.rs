//! CSV output formatter

use std::io::Write;

use serde::Serialize;

use super::{hex_bytes, FormatError, InsnFormatter};
use crate::insn::Insn;

/// `address,size,id,mnemonic,op_str,bytes` with a header row.
pub struct CsvFormatter;

#[derive(Serialize)]
struct Row<'a> {
    address: String,
    size: u16,
    id: u16,
    mnemonic: &'a str,
    op_str: &'a str,
    bytes: String,
}

impl InsnFormatter for CsvFormatter {
    fn write(&self, insns: &[Insn], out: &mut dyn Write) -> Result<(), FormatError> {
        let mut wtr = csv::Writer::from_writer(out);
        if insns.is_empty() {
            wtr.write_record(["address", "size", "id", "mnemonic", "op_str", "bytes"])?;
        }
        for insn in insns {
            wtr.serialize(Row {
                address: format!("0x{:x}", insn.address),
                size: insn.size,
                id: insn.id,
                mnemonic: &insn.mnemonic,
                op_str: &insn.op_str,
                bytes: hex_bytes(insn.bytes()),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::tests::sample;

    #[test]
    fn test_csv_quotes_operand_commas() {
        let out = CsvFormatter.format(&sample(false)).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("address,size,id,mnemonic,op_str,bytes"));
        assert!(lines.next().unwrap().starts_with("0x1000,1,"));
        let mov = lines.next().unwrap();
        assert!(mov.contains("\"rax, qword ptr [rip + 0x13b8]\""));
        assert!(mov.ends_with(",48 8b 05 b8 13 00 00"));
    }

    #[test]
    fn test_csv_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listing.csv");
        CsvFormatter.write_file(&sample(false), &path).unwrap();
        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[2][3], "ret");
        assert_eq!(&rows[1][4], "rax, qword ptr [rip + 0x13b8]");
    }

    #[test]
    fn test_empty_listing_has_header() {
        assert_eq!(CsvFormatter.format(&[]).unwrap(), "address,size,id,mnemonic,op_str,bytes\n");
    }
}
