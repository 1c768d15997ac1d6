//! Linear sweep over a byte buffer.
//!
//! [`Sweep`] walks the buffer left to right, one instruction per `next()`.
//! Each step hands the remaining bytes to the architecture decoder; on
//! success it copies the result into an owned [`Insn`], on failure it
//! either emits a skip-data entry or stops for good.

use std::collections::HashMap;

use log::trace;

use crate::decoder::{DecodeConfig, DecodeState, Decoder};
use crate::insn::{Insn, InsnId};
use crate::skipdata::{data_op_str, SkipData};
use crate::Address;

/// Lazy instruction stream over one buffer.
///
/// Borrowing the skip-data policy and mnemonic overrides mutably ties the
/// sweep to its session, so options cannot change mid-decode.
pub struct Sweep<'a> {
    decoder: &'static dyn Decoder,
    cfg: DecodeConfig,
    skipdata: Option<&'a mut SkipData>,
    mnemonics: &'a HashMap<InsnId, String>,
    code: &'a [u8],
    address: Address,
    offset: usize,
    state: DecodeState,
    remaining: Option<usize>,
    stopped_at: Option<Address>,
    done: bool,
}

impl<'a> Sweep<'a> {
    pub(crate) fn new(
        decoder: &'static dyn Decoder,
        cfg: DecodeConfig,
        skipdata: Option<&'a mut SkipData>,
        mnemonics: &'a HashMap<InsnId, String>,
        code: &'a [u8],
        address: Address,
    ) -> Self {
        Self {
            decoder,
            cfg,
            skipdata,
            mnemonics,
            code,
            address,
            offset: 0,
            state: DecodeState::default(),
            remaining: None,
            stopped_at: None,
            done: false,
        }
    }

    /// Stop after `count` instructions; 0 means no limit.
    pub(crate) fn limit(mut self, count: usize) -> Self {
        self.remaining = (count > 0).then_some(count);
        self
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Address of the next instruction.
    pub fn address(&self) -> Address {
        self.address.wrapping_add(self.offset as Address)
    }

    /// Address of the bytes that stopped the sweep, if it stopped on
    /// something undecodable rather than on the end of input or the count
    /// limit.
    pub fn stopped_at(&self) -> Option<Address> {
        self.stopped_at
    }

    fn stop(&mut self, undecodable: bool) -> Option<Insn> {
        if undecodable {
            self.stopped_at = Some(self.address());
        }
        self.done = true;
        None
    }

    fn data_entry(&mut self, rest: &[u8]) -> Option<Insn> {
        let address = self.address();
        let arch = self.decoder.arch();
        let default_len = self.decoder.skipdata_len(self.cfg.mode);
        let skip = self.skipdata.as_deref_mut()?;
        let len = skip.skip_len(self.code, self.offset, default_len)?;
        let bytes = rest.get(..len)?;
        trace!("{}: skipping {} data bytes at 0x{:x}", arch, len, address);
        Some(Insn {
            id: 0,
            address,
            size: u16::try_from(len).ok()?,
            bytes: bytes.to_vec(),
            mnemonic: skip.mnemonic().to_string(),
            op_str: data_op_str(bytes),
            detail: None,
        })
    }
}

impl Iterator for Sweep<'_> {
    type Item = Insn;

    fn next(&mut self) -> Option<Insn> {
        if self.done || self.remaining == Some(0) || self.offset >= self.code.len() {
            return None;
        }
        let code = self.code;
        let rest = &code[self.offset..];
        let address = self.address();

        let decoded = self
            .decoder
            .decode(rest, address, &self.cfg, &mut self.state)
            .filter(|d| d.size > 0 && d.size <= rest.len());

        let insn = match decoded {
            Some(d) => {
                let mnemonic = match self.mnemonics.get(&d.id) {
                    Some(custom) => custom.clone(),
                    None => d.mnemonic,
                };
                Insn {
                    id: d.id,
                    address,
                    size: d.size as u16,
                    bytes: rest[..d.size].to_vec(),
                    mnemonic,
                    op_str: d.op_str,
                    detail: d.detail,
                }
            }
            None => {
                trace!("{}: no valid instruction at 0x{:x}", self.decoder.arch(), address);
                if self.skipdata.is_none() {
                    return self.stop(true);
                }
                match self.data_entry(rest) {
                    Some(insn) => {
                        self.state = DecodeState::default();
                        insn
                    }
                    None => return self.stop(false),
                }
            }
        };

        self.offset += insn.size as usize;
        if let Some(n) = self.remaining.as_mut() {
            *n -= 1;
        }
        Some(insn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decoder_for;
    use crate::{Arch, Mode};

    fn sweep<'a>(
        arch: Arch,
        mode: Mode,
        skip: Option<&'a mut SkipData>,
        names: &'a HashMap<InsnId, String>,
        code: &'a [u8],
    ) -> Sweep<'a> {
        Sweep::new(decoder_for(arch), DecodeConfig::new(mode), skip, names, code, 0x1000)
    }

    #[test]
    fn test_addresses_follow_sizes() {
        let names = HashMap::new();
        let code = [0x55, 0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00, 0xc3];
        let insns: Vec<_> = sweep(Arch::X86, Mode::MODE_64, None, &names, &code).collect();
        let addrs: Vec<_> = insns.iter().map(|i| i.address).collect();
        assert_eq!(addrs, vec![0x1000, 0x1001, 0x1008]);
        assert_eq!(insns[1].bytes, code[1..8].to_vec());
    }

    #[test]
    fn test_stops_on_invalid_bytes() {
        let names = HashMap::new();
        // nop, then a reserved ARM64 encoding.
        let code = [0x1f, 0x20, 0x03, 0xd5, 0x00, 0x00, 0x00, 0x00];
        let mut s = sweep(Arch::Arm64, Mode::empty(), None, &names, &code);
        assert_eq!(s.next().map(|i| i.mnemonic), Some("nop".to_string()));
        assert!(s.next().is_none());
        assert_eq!(s.stopped_at(), Some(0x1004));
        assert_eq!(s.offset(), 4);
        assert!(s.next().is_none());
    }

    #[test]
    fn test_skipdata_emits_data_entries() {
        let names = HashMap::new();
        let mut skip = SkipData::new();
        let code = [0x00, 0x00, 0x00, 0x00, 0x1f, 0x20, 0x03, 0xd5];
        let insns: Vec<_> =
            sweep(Arch::Arm64, Mode::empty(), Some(&mut skip), &names, &code).collect();
        assert_eq!(insns.len(), 2);
        assert!(insns[0].is_skipdata());
        assert_eq!(insns[0].mnemonic, ".byte");
        assert_eq!(insns[0].op_str, "0x00, 0x00, 0x00, 0x00");
        assert_eq!(insns[1].mnemonic, "nop");
        assert_eq!(insns[1].address, 0x1004);
    }

    #[test]
    fn test_limit_and_mnemonic_override() {
        let mut names = HashMap::new();
        let code = [0x90, 0x90, 0x90];
        let insns: Vec<_> = sweep(Arch::X86, Mode::MODE_32, None, &HashMap::new(), &code)
            .limit(2)
            .collect();
        assert_eq!(insns.len(), 2);

        let nop = insns[0].id;
        names.insert(nop, "pause_hint".to_string());
        let renamed: Vec<_> = sweep(Arch::X86, Mode::MODE_32, None, &names, &code).collect();
        assert!(renamed.iter().all(|i| i.mnemonic == "pause_hint"));
    }
}
