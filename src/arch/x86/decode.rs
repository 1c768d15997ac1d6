//! Byte-stream decoding: prefixes, ModRM/SIB, the one- and two-byte maps
//! and x87. Produces an [`Inst`] that `render` turns into text.

use super::{
    X86Eflags as F, X86Group as G, X86Insn as I, X86Mem, X86OpKind, X86Operand, X86Reg as R,
};
use crate::arch::{sign_extend, InsnBuilder};
use crate::insn::Access;
use crate::{Address, Mode};

/// Architectural limit on instruction length.
pub(super) const MAX_LEN: usize = 15;

const RW: Access = Access::READ_WRITE;
const RD: Access = Access::READ;
const WR: Access = Access::WRITE;

/// How an operand is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Show {
    Plain,
    /// Immediate; `signed` when it was sign-extended from a narrower field
    Imm { signed: bool },
    /// Relative branch destination
    Target,
    /// Indirect branch operand, `*` in AT&T
    Indirect,
    /// Memory operand without a size keyword
    NoSize,
    /// Half of a `seg:offset` far pointer
    Far,
}

/// AT&T mnemonic suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Suffix {
    /// From the first general-purpose or memory operand
    Auto,
    None,
    Size(u8),
    /// Source and destination sizes of a widening move
    Ext(u8, u8),
    X87Float(u8),
    X87Int(u8),
}

/// A decoded instruction before rendering.
#[derive(Debug)]
pub(super) struct Inst {
    pub b: InsnBuilder<I, X86Operand>,
    pub shows: Vec<Show>,
    /// `lock `, `rep `, `repne `
    pub prefix_text: &'static str,
    /// AT&T base mnemonic when it differs from the Intel one
    pub att_base: Option<&'static str>,
    pub suffix: Suffix,
    pub eflags: F,
    pub prefix: [u8; 4],
    pub opcode: [u8; 4],
    pub rex: u8,
    pub addr_size: u8,
    pub modrm: u8,
    pub sib: u8,
    pub disp: i64,
}

#[derive(Debug, Clone, Copy)]
enum Rm {
    Reg(u32),
    Mem(X86Mem),
}

const ALU: [I; 8] = [I::ADD, I::OR, I::ADC, I::SBB, I::AND, I::SUB, I::XOR, I::CMP];
const SHIFTS: [I; 8] = [I::ROL, I::ROR, I::RCL, I::RCR, I::SHL, I::SHR, I::SAL, I::SAR];

/// Indexed by log2 of the element size.
const MOVS: [I; 4] = [I::MOVSB, I::MOVSW, I::MOVSD, I::MOVSQ];
const CMPS: [I; 4] = [I::CMPSB, I::CMPSW, I::CMPSD, I::CMPSQ];
const STOS: [I; 4] = [I::STOSB, I::STOSW, I::STOSD, I::STOSQ];
const LODS: [I; 4] = [I::LODSB, I::LODSW, I::LODSD, I::LODSQ];
const SCAS: [I; 4] = [I::SCASB, I::SCASW, I::SCASD, I::SCASQ];

fn log2(size: u8) -> usize {
    size.trailing_zeros() as usize
}

/// Decode one instruction; `None` when the bytes are truncated, longer
/// than 15 bytes or not a recognized encoding.
pub(super) fn decode(code: &[u8], address: Address, mode: Mode) -> Option<(Inst, usize)> {
    let width = if mode.contains(Mode::MODE_64) {
        8
    } else if mode.contains(Mode::MODE_32) {
        4
    } else {
        2
    };
    let mut d = D::new(code, address, width);
    let op = d.prefixes()?;
    d.sizes();
    d.one_byte(op)?;
    if d.lock {
        if !lockable(&d.inst) {
            return None;
        }
        d.inst.prefix_text = "lock ";
    } else if d.rep == 0xf2 && d.inst.prefix_text.is_empty() && bnd_branch(d.inst.b.id) {
        d.inst.prefix_text = "bnd ";
    }
    let len = d.pos;
    Some((d.inst, len))
}

/// `lock` is only defined on read-modify-write forms with a memory
/// destination.
fn lockable(inst: &Inst) -> bool {
    let memory_dest = matches!(
        inst.b.ops.first(),
        Some(X86Operand {
            kind: X86OpKind::Mem(_),
            ..
        })
    );
    memory_dest
        && matches!(
            inst.b.id,
            I::ADD
                | I::ADC
                | I::AND
                | I::BTC
                | I::BTR
                | I::BTS
                | I::CMPXCHG
                | I::CMPXCHG8B
                | I::CMPXCHG16B
                | I::DEC
                | I::INC
                | I::NEG
                | I::NOT
                | I::OR
                | I::SBB
                | I::SUB
                | I::XADD
                | I::XCHG
                | I::XOR
        )
}

/// Near branches that take the MPX `bnd` prefix.
fn bnd_branch(id: I) -> bool {
    let jcc = (I::JO as u16..=I::JG as u16).contains(&(id as u16));
    jcc || matches!(id, I::CALL | I::JMP | I::RET)
}

struct D<'a> {
    code: &'a [u8],
    pos: usize,
    address: Address,
    /// Mode width in bytes: 2, 4 or 8
    mode: u8,
    osz: u8,
    asz: u8,
    rex: u8,
    lock: bool,
    /// Last of 0xf2/0xf3 seen, 0 when none
    rep: u8,
    opsize: bool,
    addrsize: bool,
    seg: R,
    modrm: Option<u8>,
    rm: Option<Rm>,
    inst: Inst,
}

impl<'a> D<'a> {
    fn new(code: &'a [u8], address: Address, mode: u8) -> Self {
        D {
            code,
            pos: 0,
            address,
            mode,
            osz: 4,
            asz: mode,
            rex: 0,
            lock: false,
            rep: 0,
            opsize: false,
            addrsize: false,
            seg: R::INVALID,
            modrm: None,
            rm: None,
            inst: Inst {
                b: InsnBuilder::new(I::INVALID),
                shows: Vec::new(),
                prefix_text: "",
                att_base: None,
                suffix: Suffix::Auto,
                eflags: F::empty(),
                prefix: [0; 4],
                opcode: [0; 4],
                rex: 0,
                addr_size: mode,
                modrm: 0,
                sib: 0,
                disp: 0,
            },
        }
    }

    fn x64(&self) -> bool {
        self.mode == 8
    }

    fn byte(&mut self) -> Option<u8> {
        if self.pos >= MAX_LEN {
            return None;
        }
        let b = *self.code.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    /// Little-endian value of `n` bytes.
    fn read(&mut self, n: u8) -> Option<u64> {
        let mut v = 0u64;
        for k in 0..n {
            v |= (self.byte()? as u64) << (8 * k);
        }
        Some(v)
    }

    fn simm(&mut self, n: u8) -> Option<i64> {
        Some(sign_extend(self.read(n)?, n as u32 * 8))
    }

    /// Legacy and REX prefixes; returns the first opcode byte.
    fn prefixes(&mut self) -> Option<u8> {
        loop {
            let b = self.byte()?;
            match b {
                0xf0 => {
                    self.lock = true;
                    self.inst.prefix[0] = b;
                }
                0xf2 | 0xf3 => {
                    self.rep = b;
                    self.inst.prefix[0] = b;
                }
                0x26 | 0x2e | 0x36 | 0x3e | 0x64 | 0x65 => {
                    self.seg = match b {
                        0x26 => R::ES,
                        0x2e => R::CS,
                        0x36 => R::SS,
                        0x3e => R::DS,
                        0x64 => R::FS,
                        _ => R::GS,
                    };
                    self.inst.prefix[1] = b;
                }
                0x66 => {
                    self.opsize = true;
                    self.inst.prefix[2] = b;
                }
                0x67 => {
                    self.addrsize = true;
                    self.inst.prefix[3] = b;
                }
                0x40..=0x4f if self.x64() => {
                    self.rex = b;
                    // REX only counts immediately before the opcode
                    let next = *self.code.get(self.pos)?;
                    if is_legacy_prefix(next) || (0x40..=0x4f).contains(&next) {
                        self.rex = 0;
                    }
                    continue;
                }
                _ => return Some(b),
            }
        }
    }

    fn sizes(&mut self) {
        let w = self.rex & 8 != 0;
        self.osz = match self.mode {
            8 if w => 8,
            2 => {
                if self.opsize {
                    4
                } else {
                    2
                }
            }
            _ => {
                if self.opsize {
                    2
                } else {
                    4
                }
            }
        };
        self.asz = if self.addrsize {
            match self.mode {
                8 => 4,
                4 => 2,
                _ => 4,
            }
        } else {
            self.mode
        };
        self.inst.rex = self.rex;
        self.inst.addr_size = self.asz;
    }

    fn rex_r(&self) -> u32 {
        ((self.rex >> 2) & 1) as u32 * 8
    }

    fn rex_x(&self) -> u32 {
        ((self.rex >> 1) & 1) as u32 * 8
    }

    fn rex_b(&self) -> u32 {
        (self.rex & 1) as u32 * 8
    }

    fn set(&mut self, id: I) -> &mut Self {
        self.inst.b.id = id;
        self
    }

    fn group(&mut self, g: G) -> &mut Self {
        self.inst.b.group(g);
        self
    }

    fn flags(&mut self, f: F) -> &mut Self {
        self.inst.eflags |= f;
        if f.reads() {
            self.inst.b.reads(&[R::EFLAGS]);
        }
        if f.writes() {
            self.inst.b.writes(&[R::EFLAGS]);
        }
        self
    }

    fn suffix(&mut self, s: Suffix) -> &mut Self {
        self.inst.suffix = s;
        self
    }

    fn reads(&mut self, regs: &[R]) -> &mut Self {
        self.inst.b.reads(regs);
        self
    }

    fn writes(&mut self, regs: &[R]) -> &mut Self {
        self.inst.b.writes(regs);
        self
    }

    /// Present outside long mode only.
    fn legacy(&mut self) -> Option<()> {
        if self.x64() {
            return None;
        }
        self.group(G::NOT64BITMODE);
        Some(())
    }

    // ---- operands ----

    fn push(&mut self, op: X86Operand, show: Show) {
        self.inst.b.push_op(op);
        self.inst.shows.push(show);
    }

    fn reg(&mut self, r: R, access: Access) {
        self.push(X86Operand::reg(r, access), Show::Plain);
    }

    fn gpr(&mut self, n: u32, size: u8, access: Access) {
        let r = R::gpr(n, size, self.rex != 0);
        self.reg(r, access);
    }

    /// `rAX` of `size` bytes.
    fn acc(&mut self, size: u8, access: Access) {
        self.reg(R::gpr(0, size, false), access);
    }

    fn modrm(&mut self) -> Option<u8> {
        if let Some(m) = self.modrm {
            return Some(m);
        }
        let m = self.byte()?;
        self.modrm = Some(m);
        self.inst.modrm = m;
        Some(m)
    }

    /// ModRM `reg` field without REX.R, used as an opcode extension.
    fn ext(&mut self) -> Option<u8> {
        Some((self.modrm()? >> 3) & 7)
    }

    fn reg_field(&mut self) -> Option<u32> {
        Some(self.ext()? as u32 | self.rex_r())
    }

    fn reg_form(&mut self) -> Option<bool> {
        Some(self.modrm()? >> 6 == 3)
    }

    fn rm(&mut self) -> Option<Rm> {
        if let Some(rm) = self.rm {
            return Some(rm);
        }
        let m = self.modrm()?;
        let rm = if m >> 6 == 3 {
            Rm::Reg((m & 7) as u32 | self.rex_b())
        } else if self.asz == 2 {
            Rm::Mem(self.mem16(m)?)
        } else {
            Rm::Mem(self.mem32(m)?)
        };
        self.rm = Some(rm);
        Some(rm)
    }

    fn mem32(&mut self, m: u8) -> Option<X86Mem> {
        let md = m >> 6;
        let size = self.asz;
        let mut mem = X86Mem {
            segment: self.seg,
            scale: 1,
            ..X86Mem::default()
        };
        let mut disp = match md {
            1 => 1,
            2 => 4,
            _ => 0,
        };
        if m & 7 == 4 {
            let sib = self.byte()?;
            self.inst.sib = sib;
            let index = ((sib >> 3) & 7) as u32 | self.rex_x();
            if index != 4 {
                mem.index = R::gpr(index, size, true);
            }
            mem.scale = 1 << (sib >> 6);
            if sib & 7 == 5 && md == 0 {
                disp = 4;
            } else {
                mem.base = R::gpr((sib & 7) as u32 | self.rex_b(), size, true);
            }
        } else if m & 7 == 5 && md == 0 {
            disp = 4;
            if self.x64() {
                mem.base = if size == 8 { R::RIP } else { R::EIP };
            }
        } else {
            mem.base = R::gpr((m & 7) as u32 | self.rex_b(), size, true);
        }
        if disp > 0 {
            mem.disp = self.simm(disp)?;
        }
        self.inst.disp = mem.disp;
        Some(mem)
    }

    fn mem16(&mut self, m: u8) -> Option<X86Mem> {
        let md = m >> 6;
        let (base, index) = match m & 7 {
            0 => (R::BX, R::SI),
            1 => (R::BX, R::DI),
            2 => (R::BP, R::SI),
            3 => (R::BP, R::DI),
            4 => (R::SI, R::INVALID),
            5 => (R::DI, R::INVALID),
            6 if md == 0 => (R::INVALID, R::INVALID),
            6 => (R::BP, R::INVALID),
            _ => (R::BX, R::INVALID),
        };
        let disp = match md {
            0 if m & 7 == 6 => self.simm(2)?,
            1 => self.simm(1)?,
            2 => self.simm(2)?,
            _ => 0,
        };
        self.inst.disp = disp;
        Some(X86Mem {
            segment: self.seg,
            base,
            index,
            scale: 1,
            disp,
        })
    }

    /// ModRM r/m operand as a general-purpose register or memory.
    fn e_show(&mut self, size: u8, access: Access, show: Show) -> Option<()> {
        match self.rm()? {
            Rm::Reg(n) => {
                let r = R::gpr(n, size, self.rex != 0);
                self.push(X86Operand::reg(r, access), show);
            }
            Rm::Mem(m) => self.push(X86Operand::mem(m, size, access), show),
        }
        Some(())
    }

    fn e(&mut self, size: u8, access: Access) -> Option<()> {
        self.e_show(size, access, Show::Plain)
    }

    /// Memory-only r/m operand.
    fn m(&mut self, size: u8, access: Access, show: Show) -> Option<()> {
        match self.rm()? {
            Rm::Mem(m) => {
                self.push(X86Operand::mem(m, size, access), show);
                Some(())
            }
            Rm::Reg(_) => None,
        }
    }

    /// ModRM reg operand as a general-purpose register.
    fn g(&mut self, size: u8, access: Access) -> Option<()> {
        let n = self.reg_field()?;
        self.gpr(n, size, access);
        Some(())
    }

    /// ModRM reg operand as an XMM register.
    fn v(&mut self, access: Access) -> Option<()> {
        let n = self.reg_field()?;
        self.reg(R::xmm(n), access);
        Some(())
    }

    /// ModRM r/m operand as an XMM register or memory.
    fn w(&mut self, size: u8, access: Access) -> Option<()> {
        match self.rm()? {
            Rm::Reg(n) => self.reg(R::xmm(n), access),
            Rm::Mem(m) => self.push(X86Operand::mem(m, size, access), Show::Plain),
        }
        Some(())
    }

    /// Immediate of `enc` bytes for a `size`-byte operation.
    fn imm(&mut self, enc: u8, size: u8) -> Option<()> {
        let raw = self.simm(enc)?;
        let logic = matches!(self.inst.b.id, I::AND | I::OR | I::XOR | I::TEST);
        let value = if enc < size { raw } else { mask(raw, enc) as i64 };
        self.push(
            X86Operand::imm(value, size),
            Show::Imm {
                signed: enc < size && !logic,
            },
        );
        Some(())
    }

    /// Relative branch with an `enc`-byte displacement.
    fn rel(&mut self, enc: u8) -> Option<()> {
        let rel = self.simm(enc)?;
        let next = self.address.wrapping_add(self.pos as u64);
        let target = next.wrapping_add(rel as u64);
        let target = match self.mode {
            8 => target,
            _ if self.osz == 2 => target & 0xffff,
            _ => target & 0xffff_ffff,
        };
        self.push(X86Operand::imm(target as i64, self.mode), Show::Target);
        self.group(G::BRANCH_RELATIVE);
        Some(())
    }

    /// Near branch displacement: 16 bits with a 16-bit operand size outside
    /// long mode, 32 otherwise.
    fn rel_z(&mut self) -> Option<()> {
        let enc = if !self.x64() && self.osz == 2 { 2 } else { 4 };
        self.rel(enc)
    }

    /// `[rsi]` or `[rdi]` of a string instruction. The destination is
    /// always `es`-based outside long mode and ignores overrides.
    fn str_mem(&mut self, di: bool, size: u8, access: Access) {
        let base = R::gpr(if di { 7 } else { 6 }, self.asz, true);
        let segment = match (di, self.x64()) {
            (true, true) => R::INVALID,
            (true, false) => R::ES,
            (false, _) => self.seg,
        };
        let mem = X86Mem {
            segment,
            base,
            scale: 1,
            ..X86Mem::default()
        };
        self.push(X86Operand::mem(mem, size, access), Show::Plain);
        self.reads(&[base]).writes(&[base]);
    }

    fn stack_size(&self) -> u8 {
        match self.mode {
            8 if self.opsize => 2,
            8 => 8,
            _ => self.osz,
        }
    }

    fn sp(&self) -> R {
        match self.mode {
            8 => R::RSP,
            4 => R::ESP,
            _ => R::SP,
        }
    }

    fn ip(&self) -> R {
        match self.mode {
            8 => R::RIP,
            4 => R::EIP,
            _ => R::IP,
        }
    }

    fn stack(&mut self) -> &mut Self {
        let sp = self.sp();
        self.reads(&[sp]).writes(&[sp])
    }

    /// Counter register of `loop`, `jcxz` and `rep`.
    fn counter(&self) -> R {
        R::gpr(1, self.asz, false)
    }

    // ---- one-byte map ----

    fn one_byte(&mut self, op: u8) -> Option<()> {
        self.inst.opcode[0] = op;
        let osz = self.osz;
        match op {
            0x0f => return self.two_byte(),
            0x00..=0x3f if op & 7 < 6 => self.alu(op)?,
            0x06 | 0x0e | 0x16 | 0x1e | 0x07 | 0x17 | 0x1f => {
                self.legacy()?;
                let seg = R::segment((op >> 3) as u32)?;
                if op & 1 == 0 {
                    self.set(I::PUSH).reg(seg, RD);
                } else {
                    self.set(I::POP).reg(seg, WR);
                }
                let size = self.stack_size();
                self.stack().suffix(Suffix::Size(size));
            }
            0x27 | 0x2f | 0x37 | 0x3f => {
                self.legacy()?;
                let id = [I::DAA, I::DAS, I::AAA, I::AAS][((op >> 3) & 3) as usize];
                self.set(id).reads(&[R::AL]).writes(&[R::AL]);
                self.flags(F::ARITH);
            }
            0x40..=0x4f => {
                self.legacy()?;
                self.set(if op < 0x48 { I::INC } else { I::DEC });
                self.gpr((op & 7) as u32, osz, RW);
                self.flags(F::INC_DEC);
            }
            0x50..=0x57 => {
                let size = self.stack_size();
                self.set(I::PUSH);
                self.gpr((op & 7) as u32 | self.rex_b(), size, RD);
                self.stack().suffix(Suffix::Size(size));
            }
            0x58..=0x5f => {
                let size = self.stack_size();
                self.set(I::POP);
                self.gpr((op & 7) as u32 | self.rex_b(), size, WR);
                self.stack().suffix(Suffix::Size(size));
            }
            0x60 | 0x61 => {
                self.legacy()?;
                let id = match (op, osz) {
                    (0x60, 2) => I::PUSHAW,
                    (0x60, _) => I::PUSHAL,
                    (_, 2) => I::POPAW,
                    _ => I::POPAL,
                };
                self.set(id).stack().suffix(Suffix::None);
            }
            0x63 if self.x64() => {
                self.set(I::MOVSXD);
                self.g(osz, WR)?;
                self.e(4, RD)?;
                self.inst.att_base = Some("movs");
                self.suffix(Suffix::Ext(4, osz));
            }
            0x68 | 0x6a => {
                let size = self.stack_size();
                self.set(I::PUSH);
                self.imm(if op == 0x6a { 1 } else { size.min(4) }, size)?;
                self.stack().suffix(Suffix::Size(size));
            }
            0x69 | 0x6b => {
                self.set(I::IMUL);
                self.g(osz, WR)?;
                self.e(osz, RD)?;
                self.imm(if op == 0x6b { 1 } else { osz.min(4) }, osz)?;
                self.flags(F::MUL);
            }
            0x6c..=0x6f => self.port_string(op),
            0x70..=0x7f => {
                let cc = op & 15;
                self.set(I::cc(I::JO, cc)).group(G::JUMP);
                self.rel(1)?;
                self.flags(F::tested_by(cc)).suffix(Suffix::None);
            }
            0x80..=0x83 => {
                if op == 0x82 {
                    self.legacy()?;
                }
                let id = ALU[self.ext()? as usize];
                let size = if op & 1 == 0 { 1 } else { osz };
                self.set(id);
                self.e(size, if id == I::CMP { RD } else { RW })?;
                self.imm(if op == 0x81 { osz.min(4) } else { 1 }, size)?;
                self.alu_flags(id);
            }
            0x84 | 0x85 => {
                let size = if op & 1 == 0 { 1 } else { osz };
                self.set(I::TEST);
                self.e(size, RD)?;
                self.g(size, RD)?;
                self.flags(F::LOGIC);
            }
            0x86 | 0x87 => {
                let size = if op & 1 == 0 { 1 } else { osz };
                self.set(I::XCHG);
                self.e(size, RW)?;
                self.g(size, RW)?;
            }
            0x88..=0x8b => {
                let size = if op & 1 == 0 { 1 } else { osz };
                self.set(I::MOV);
                if op & 2 == 0 {
                    self.e(size, WR)?;
                    self.g(size, RD)?;
                } else {
                    self.g(size, WR)?;
                    self.e(size, RD)?;
                }
            }
            0x8c => {
                self.set(I::MOV);
                let seg = R::segment(self.ext()? as u32)?;
                let size = if self.reg_form()? { osz } else { 2 };
                self.e(size, WR)?;
                self.reg(seg, RD);
            }
            0x8e => {
                self.set(I::MOV);
                let seg = R::segment(self.ext()? as u32).filter(|&s| s != R::CS)?;
                self.reg(seg, WR);
                self.e(2, RD)?;
            }
            0x8d => {
                self.set(I::LEA);
                self.g(osz, WR)?;
                self.m(osz, Access::empty(), Show::NoSize)?;
            }
            0x8f => {
                if self.ext()? != 0 {
                    return None;
                }
                let size = self.stack_size();
                self.set(I::POP);
                self.e(size, WR)?;
                self.stack().suffix(Suffix::Size(size));
            }
            0x90 if self.rex_b() != 0 => {
                self.set(I::XCHG);
                self.gpr(8, osz, RW);
                self.acc(osz, RW);
            }
            0x90 if self.rep == 0xf3 => {
                self.set(I::PAUSE);
            }
            0x90 => {
                self.set(I::NOP);
            }
            0x91..=0x97 => {
                self.set(I::XCHG);
                self.acc(osz, RW);
                self.gpr((op & 7) as u32 | self.rex_b(), osz, RW);
            }
            0x98 => {
                let (id, att, from, to) = match osz {
                    2 => (I::CBW, "cbtw", R::AL, R::AX),
                    4 => (I::CWDE, "cwtl", R::AX, R::EAX),
                    _ => (I::CDQE, "cltq", R::EAX, R::RAX),
                };
                self.set(id).reads(&[from]).writes(&[to]).suffix(Suffix::None);
                self.inst.att_base = Some(att);
            }
            0x99 => {
                let (id, att, a, d) = match osz {
                    2 => (I::CWD, "cwtd", R::AX, R::DX),
                    4 => (I::CDQ, "cltd", R::EAX, R::EDX),
                    _ => (I::CQO, "cqto", R::RAX, R::RDX),
                };
                self.set(id).reads(&[a]).writes(&[d]).suffix(Suffix::None);
                self.inst.att_base = Some(att);
            }
            0x9a | 0xea => {
                self.legacy()?;
                let off = self.read(if osz == 2 { 2 } else { 4 })?;
                let seg = self.read(2)?;
                if op == 0x9a {
                    self.set(I::LCALL).group(G::CALL).stack();
                } else {
                    self.set(I::LJMP).group(G::JUMP);
                }
                self.push(X86Operand::imm(seg as i64, 2), Show::Far);
                self.push(X86Operand::imm(off as i64, osz), Show::Far);
                self.suffix(Suffix::None);
            }
            0x9b => {
                self.set(I::WAIT);
            }
            0x9c | 0x9d => {
                let size = self.stack_size();
                let id = match (op, size) {
                    (0x9c, 2) => I::PUSHF,
                    (0x9c, 4) => I::PUSHFD,
                    (0x9c, _) => I::PUSHFQ,
                    (_, 2) => I::POPF,
                    (_, 4) => I::POPFD,
                    _ => I::POPFQ,
                };
                self.set(id).stack().suffix(Suffix::None);
                if op == 0x9c {
                    self.reads(&[R::EFLAGS]);
                } else {
                    self.flags(F::RESTORE);
                }
            }
            0x9e => {
                self.set(I::SAHF).reads(&[R::AH]);
                self.flags(F::ARITH.difference(F::MODIFY_OF));
            }
            0x9f => {
                self.set(I::LAHF).reads(&[R::EFLAGS]).writes(&[R::AH]);
            }
            0xa0..=0xa3 => {
                let size = if op & 1 == 0 { 1 } else { osz };
                let disp = self.read(self.asz)? as i64;
                let mem = X86Mem {
                    segment: self.seg,
                    scale: 1,
                    disp,
                    ..X86Mem::default()
                };
                self.inst.disp = disp;
                self.set(if self.asz == 8 { I::MOVABS } else { I::MOV });
                if op & 2 == 0 {
                    self.acc(size, WR);
                    self.push(X86Operand::mem(mem, size, RD), Show::Plain);
                } else {
                    self.push(X86Operand::mem(mem, size, WR), Show::Plain);
                    self.acc(size, RD);
                }
            }
            0xa4..=0xa7 | 0xaa..=0xaf => self.string(op),
            0xa8 | 0xa9 => {
                let size = if op & 1 == 0 { 1 } else { osz };
                self.set(I::TEST);
                self.acc(size, RD);
                self.imm(size.min(4), size)?;
                self.flags(F::LOGIC);
            }
            0xb0..=0xb7 => {
                self.set(I::MOV);
                self.gpr((op & 7) as u32 | self.rex_b(), 1, WR);
                self.imm(1, 1)?;
            }
            0xb8..=0xbf => {
                self.set(if osz == 8 { I::MOVABS } else { I::MOV });
                self.gpr((op & 7) as u32 | self.rex_b(), osz, WR);
                self.imm(osz, osz)?;
            }
            0xc0 | 0xc1 | 0xd0..=0xd3 => {
                let id = SHIFTS[self.ext()? as usize];
                let size = if op & 1 == 0 { 1 } else { osz };
                self.set(id);
                self.e(size, RW)?;
                match op {
                    0xc0 | 0xc1 => self.imm(1, 1)?,
                    0xd0 | 0xd1 => self.push(X86Operand::imm(1, 1), Show::Imm { signed: false }),
                    _ => self.reg(R::CL, RD),
                }
                let f = if matches!(id, I::RCL | I::RCR) {
                    F::SHIFT | F::TEST_CF
                } else {
                    F::SHIFT
                };
                self.flags(f);
            }
            0xc2 | 0xc3 => {
                let size = self.stack_size();
                self.set(I::RET).group(G::RET).stack().suffix(Suffix::Size(size));
                if op == 0xc2 {
                    self.imm(2, 2)?;
                }
            }
            0xc6 | 0xc7 => {
                if self.ext()? != 0 {
                    return None;
                }
                let size = if op & 1 == 0 { 1 } else { osz };
                self.set(I::MOV);
                self.e(size, WR)?;
                self.imm(size.min(4), size)?;
            }
            0xc8 => {
                let bp = R::gpr(5, self.stack_size(), false);
                self.set(I::ENTER).stack().reads(&[bp]).writes(&[bp]);
                self.imm(2, 2)?;
                self.imm(1, 1)?;
            }
            0xc9 => {
                let bp = R::gpr(5, self.stack_size(), false);
                self.set(I::LEAVE).stack().reads(&[bp]).writes(&[bp]);
                self.suffix(Suffix::None);
            }
            0xca | 0xcb => {
                self.set(I::RETF).group(G::RET).stack().suffix(Suffix::None);
                self.inst.att_base = Some("lret");
                if op == 0xca {
                    self.imm(2, 2)?;
                }
            }
            0xcc => {
                self.set(I::INT3).group(G::INT);
            }
            0xcd => {
                self.set(I::INT).group(G::INT);
                self.imm(1, 1)?;
            }
            0xce => {
                self.legacy()?;
                self.set(I::INTO).group(G::INT).flags(F::TEST_OF);
            }
            0xcf => {
                let id = match osz {
                    2 => I::IRET,
                    4 => I::IRETD,
                    _ => I::IRETQ,
                };
                self.set(id).group(G::IRET).stack().flags(F::RESTORE);
            }
            0xd4 | 0xd5 => {
                self.legacy()?;
                self.set(if op == 0xd4 { I::AAM } else { I::AAD });
                self.imm(1, 1)?;
                self.reads(&[R::AX]).writes(&[R::AX]).flags(F::LOGIC);
            }
            0xd7 => {
                let bx = R::gpr(3, self.asz, false);
                self.set(I::XLATB).reads(&[R::AL, bx]).writes(&[R::AL]);
            }
            0xd8..=0xdf => self.x87(op)?,
            0xe0..=0xe2 => {
                let id = [I::LOOPNE, I::LOOPE, I::LOOP][(op & 3) as usize];
                let cx = self.counter();
                self.set(id).group(G::JUMP).reads(&[cx]).writes(&[cx]);
                self.rel(1)?;
                if op != 0xe2 {
                    self.flags(F::TEST_ZF);
                }
                self.suffix(Suffix::None);
            }
            0xe3 => {
                let id = match self.asz {
                    2 => I::JCXZ,
                    4 => I::JECXZ,
                    _ => I::JRCXZ,
                };
                let cx = self.counter();
                self.set(id).group(G::JUMP).reads(&[cx]);
                self.rel(1)?;
                self.suffix(Suffix::None);
            }
            0xe4..=0xe7 | 0xec..=0xef => {
                let size = match (op & 1, osz) {
                    (0, _) => 1,
                    (_, 2) => 2,
                    _ => 4,
                };
                let input = op & 2 == 0;
                self.set(if input { I::IN } else { I::OUT })
                    .group(G::PRIVILEGE)
                    .suffix(Suffix::Size(size));
                let port_imm = op < 0xe8;
                if input {
                    self.acc(size, WR);
                }
                if port_imm {
                    self.imm(1, 1)?;
                } else {
                    self.reg(R::DX, RD);
                }
                if !input {
                    self.acc(size, RD);
                }
            }
            0xe8 => {
                let (ip, size) = (self.ip(), self.stack_size());
                self.set(I::CALL).group(G::CALL).stack().reads(&[ip]);
                self.rel_z()?;
                self.suffix(Suffix::Size(size));
            }
            0xe9 | 0xeb => {
                self.set(I::JMP).group(G::JUMP).suffix(Suffix::None);
                if op == 0xeb {
                    self.rel(1)?;
                } else {
                    self.rel_z()?;
                }
            }
            0xf1 => {
                self.set(I::INT1).group(G::INT);
            }
            0xf4 => {
                self.set(I::HLT).group(G::PRIVILEGE);
            }
            0xf5 => {
                self.set(I::CMC).flags(F::MODIFY_CF | F::TEST_CF);
            }
            0xf6 | 0xf7 => self.group3(op)?,
            0xf8..=0xfd => {
                let (id, f) = match op {
                    0xf8 => (I::CLC, F::RESET_CF),
                    0xf9 => (I::STC, F::SET_CF),
                    0xfa => (I::CLI, F::RESET_IF),
                    0xfb => (I::STI, F::SET_IF),
                    0xfc => (I::CLD, F::RESET_DF),
                    _ => (I::STD, F::SET_DF),
                };
                self.set(id).flags(f);
                if matches!(op, 0xfa | 0xfb) {
                    self.group(G::PRIVILEGE);
                }
            }
            0xfe => {
                let id = match self.ext()? {
                    0 => I::INC,
                    1 => I::DEC,
                    _ => return None,
                };
                self.set(id);
                self.e(1, RW)?;
                self.flags(F::INC_DEC);
            }
            0xff => self.group5()?,
            _ => return None,
        }
        Some(())
    }

    fn alu(&mut self, op: u8) -> Option<()> {
        let id = ALU[(op >> 3) as usize];
        let dst = if id == I::CMP { RD } else { RW };
        let osz = self.osz;
        self.set(id);
        match op & 7 {
            0 => {
                self.e(1, dst)?;
                self.g(1, RD)?;
            }
            1 => {
                self.e(osz, dst)?;
                self.g(osz, RD)?;
            }
            2 => {
                self.g(1, dst)?;
                self.e(1, RD)?;
            }
            3 => {
                self.g(osz, dst)?;
                self.e(osz, RD)?;
            }
            4 => {
                self.acc(1, dst);
                self.imm(1, 1)?;
            }
            _ => {
                self.acc(osz, dst);
                self.imm(osz.min(4), osz)?;
            }
        }
        self.alu_flags(id);
        Some(())
    }

    fn alu_flags(&mut self, id: I) {
        let f = match id {
            I::ADC | I::SBB => F::ARITH | F::TEST_CF,
            I::AND | I::OR | I::XOR => F::LOGIC,
            _ => F::ARITH,
        };
        self.flags(f);
    }

    fn rep_text(&mut self, compares: bool) {
        let cx = self.counter();
        self.inst.prefix_text = match (self.rep, compares) {
            (0xf3, false) => "rep ",
            (0xf3, true) => "repe ",
            (0xf2, _) => "repne ",
            _ => return,
        };
        self.reads(&[cx]).writes(&[cx]);
    }

    fn string(&mut self, op: u8) {
        let size = if op & 1 == 0 { 1 } else { self.osz };
        let k = log2(size);
        let compares = matches!(op, 0xa6 | 0xa7 | 0xae | 0xaf);
        let (id, base) = match op {
            0xa4 | 0xa5 => (MOVS[k], "movs"),
            0xa6 | 0xa7 => (CMPS[k], "cmps"),
            0xaa | 0xab => (STOS[k], "stos"),
            0xac | 0xad => (LODS[k], "lods"),
            _ => (SCAS[k], "scas"),
        };
        self.set(id).suffix(Suffix::Size(size)).reads(&[R::EFLAGS]);
        self.inst.eflags |= F::TEST_DF;
        self.inst.att_base = Some(base);
        match op {
            0xa4 | 0xa5 => {
                self.str_mem(true, size, WR);
                self.str_mem(false, size, RD);
            }
            0xa6 | 0xa7 => {
                self.str_mem(false, size, RD);
                self.str_mem(true, size, RD);
            }
            0xaa | 0xab => {
                self.str_mem(true, size, WR);
                self.acc(size, RD);
            }
            0xac | 0xad => {
                self.acc(size, WR);
                self.str_mem(false, size, RD);
            }
            _ => {
                self.acc(size, RD);
                self.str_mem(true, size, RD);
            }
        }
        if compares {
            self.flags(F::ARITH);
        }
        self.rep_text(compares);
    }

    fn port_string(&mut self, op: u8) {
        let size = match (op & 1, self.osz) {
            (0, _) => 1,
            (_, 2) => 2,
            _ => 4,
        };
        let k = log2(size);
        if op < 0x6e {
            self.set([I::INSB, I::INSW, I::INSD][k]);
            self.str_mem(true, size, WR);
            self.reg(R::DX, RD);
            self.inst.att_base = Some("ins");
        } else {
            self.set([I::OUTSB, I::OUTSW, I::OUTSD][k]);
            self.reg(R::DX, RD);
            self.str_mem(false, size, RD);
            self.inst.att_base = Some("outs");
        }
        self.group(G::PRIVILEGE).suffix(Suffix::Size(size));
        self.rep_text(false);
    }

    fn group3(&mut self, op: u8) -> Option<()> {
        let size = if op & 1 == 0 { 1 } else { self.osz };
        let ext = self.ext()?;
        let id = [
            I::TEST,
            I::TEST,
            I::NOT,
            I::NEG,
            I::MUL,
            I::IMUL,
            I::DIV,
            I::IDIV,
        ][ext as usize];
        self.set(id);
        match ext {
            0 | 1 => {
                self.e(size, RD)?;
                self.imm(size.min(4), size)?;
                self.flags(F::LOGIC);
            }
            2 => self.e(size, RW)?,
            3 => {
                self.e(size, RW)?;
                self.flags(F::ARITH);
            }
            _ => {
                self.e(size, RD)?;
                let divide = ext >= 6;
                if size == 1 {
                    self.reads(&[if divide { R::AX } else { R::AL }]).writes(&[R::AX]);
                } else {
                    let (a, d) = (R::gpr(0, size, false), R::gpr(2, size, false));
                    self.reads(&[a]);
                    if divide {
                        self.reads(&[d]);
                    }
                    self.writes(&[a, d]);
                }
                self.flags(if divide { F::DIV } else { F::MUL });
            }
        }
        Some(())
    }

    fn group5(&mut self) -> Option<()> {
        let osz = self.osz;
        let size = self.stack_size();
        match self.ext()? {
            0 | 1 => {
                let id = if self.ext()? == 0 { I::INC } else { I::DEC };
                self.set(id);
                self.e(osz, RW)?;
                self.flags(F::INC_DEC);
            }
            2 => {
                let ip = self.ip();
                self.set(I::CALL).group(G::CALL).stack().reads(&[ip]);
                self.e_show(size, RD, Show::Indirect)?;
                self.suffix(Suffix::Size(size));
            }
            3 => {
                self.set(I::LCALL).group(G::CALL).stack();
                self.m(osz + 2, RD, Show::NoSize)?;
                self.suffix(Suffix::None);
            }
            4 => {
                self.set(I::JMP).group(G::JUMP);
                self.e_show(size, RD, Show::Indirect)?;
                self.suffix(Suffix::Size(size));
            }
            5 => {
                self.set(I::LJMP).group(G::JUMP);
                self.m(osz + 2, RD, Show::NoSize)?;
                self.suffix(Suffix::None);
            }
            6 => {
                self.set(I::PUSH);
                self.e(size, RD)?;
                self.stack().suffix(Suffix::Size(size));
            }
            _ => return None,
        }
        Some(())
    }

    // ---- two-byte map ----

    fn two_byte(&mut self) -> Option<()> {
        let op = self.byte()?;
        self.inst.opcode = [0x0f, op, 0, 0];
        let osz = self.osz;
        match op {
            0x00 => self.group6()?,
            0x01 => self.group7()?,
            0x05 if self.x64() => {
                self.set(I::SYSCALL).group(G::INT).writes(&[R::RCX, R::R11]);
            }
            0x06 => {
                self.set(I::CLTS).group(G::PRIVILEGE);
            }
            0x07 if self.x64() => {
                self.set(I::SYSRET).group(G::PRIVILEGE).group(G::IRET);
            }
            0x0b => {
                self.set(I::UD2);
            }
            0x18 => {
                let id = match self.ext()? {
                    0 => I::PREFETCHNTA,
                    1 => I::PREFETCHT0,
                    2 => I::PREFETCHT1,
                    3 => I::PREFETCHT2,
                    _ => return None,
                };
                self.set(id);
                self.m(1, RD, Show::Plain)?;
            }
            0x1e if self.rep == 0xf3 && matches!(self.code.get(self.pos).copied(), Some(0xfa | 0xfb)) => {
                let m = self.modrm()?;
                self.set(if m == 0xfa { I::ENDBR64 } else { I::ENDBR32 })
                    .group(G::CET);
            }
            0x19..=0x1f => {
                self.set(I::NOP);
                self.e(osz, Access::empty())?;
            }
            0x20..=0x23 => {
                let m = self.modrm()?;
                let size = if self.x64() { 8 } else { 4 };
                let gpr = R::gpr((m & 7) as u32 | self.rex_b(), size, true);
                let n = self.reg_field()?;
                let ctl = if op & 1 == 0 { R::cr(n) } else { R::dr(n) };
                self.set(I::MOV).group(G::PRIVILEGE);
                if op & 2 == 0 {
                    self.reg(gpr, WR);
                    self.reg(ctl, RD);
                } else {
                    self.reg(ctl, WR);
                    self.reg(gpr, RD);
                }
            }
            0x30 => {
                self.set(I::WRMSR)
                    .group(G::PRIVILEGE)
                    .reads(&[R::ECX, R::EAX, R::EDX]);
            }
            0x31 => {
                self.set(I::RDTSC).writes(&[R::EAX, R::EDX]);
            }
            0x32 => {
                self.set(I::RDMSR)
                    .group(G::PRIVILEGE)
                    .reads(&[R::ECX])
                    .writes(&[R::EAX, R::EDX]);
            }
            0x33 => {
                self.set(I::RDPMC).reads(&[R::ECX]).writes(&[R::EAX, R::EDX]);
            }
            0x34 => {
                self.set(I::SYSENTER).group(G::INT);
            }
            0x35 => {
                self.set(I::SYSEXIT).group(G::INT).group(G::PRIVILEGE);
            }
            0x40..=0x4f => {
                let cc = op & 15;
                self.set(I::cc(I::CMOVO, cc)).group(G::CMOV);
                self.g(osz, WR)?;
                self.e(osz, RD)?;
                self.flags(F::tested_by(cc));
            }
            0x80..=0x8f => {
                let cc = op & 15;
                self.set(I::cc(I::JO, cc)).group(G::JUMP);
                self.rel_z()?;
                self.flags(F::tested_by(cc)).suffix(Suffix::None);
            }
            0x90..=0x9f => {
                let cc = op & 15;
                self.set(I::cc(I::SETO, cc));
                self.e(1, WR)?;
                self.flags(F::tested_by(cc)).suffix(Suffix::None);
            }
            0xa0 | 0xa1 | 0xa8 | 0xa9 => {
                let seg = if op < 0xa8 { R::FS } else { R::GS };
                let size = self.stack_size();
                if op & 1 == 0 {
                    self.set(I::PUSH).reg(seg, RD);
                } else {
                    self.set(I::POP).reg(seg, WR);
                }
                self.stack().suffix(Suffix::Size(size));
            }
            0xa2 => {
                self.set(I::CPUID)
                    .reads(&[R::EAX, R::ECX])
                    .writes(&[R::EAX, R::EBX, R::ECX, R::EDX]);
            }
            0xa3 | 0xab | 0xb3 | 0xbb => {
                let id = [I::BT, I::BTS, I::BTR, I::BTC][((op >> 3) & 3) as usize];
                self.set(id);
                self.e(osz, if id == I::BT { RD } else { RW })?;
                self.g(osz, RD)?;
                self.flags(F::BIT_TEST);
            }
            0xa4 | 0xa5 | 0xac | 0xad => {
                self.set(if op < 0xac { I::SHLD } else { I::SHRD });
                self.e(osz, RW)?;
                self.g(osz, RD)?;
                if op & 1 == 0 {
                    self.imm(1, 1)?;
                } else {
                    self.reg(R::CL, RD);
                }
                self.flags(F::SHIFT);
            }
            0xae => self.group15()?,
            0xaf => {
                self.set(I::IMUL);
                self.g(osz, RW)?;
                self.e(osz, RD)?;
                self.flags(F::MUL);
            }
            0xb0 | 0xb1 => {
                let size = if op & 1 == 0 { 1 } else { osz };
                let a = R::gpr(0, size, false);
                self.set(I::CMPXCHG).reads(&[a]).writes(&[a]);
                self.e(size, RW)?;
                self.g(size, RD)?;
                self.flags(F::ARITH);
            }
            0xb6 | 0xb7 | 0xbe | 0xbf => {
                let src = if op & 1 == 0 { 1 } else { 2 };
                let zero = op < 0xbe;
                self.set(if zero { I::MOVZX } else { I::MOVSX });
                self.g(osz, WR)?;
                self.e(src, RD)?;
                self.inst.att_base = Some(if zero { "movz" } else { "movs" });
                self.suffix(Suffix::Ext(src, osz));
            }
            0xb8 if self.rep == 0xf3 => {
                self.set(I::POPCNT).group(G::POPCNT);
                self.g(osz, WR)?;
                self.e(osz, RD)?;
                self.flags(F::COUNT);
            }
            0xba => {
                let id = match self.ext()? {
                    4 => I::BT,
                    5 => I::BTS,
                    6 => I::BTR,
                    7 => I::BTC,
                    _ => return None,
                };
                self.set(id);
                self.e(osz, if id == I::BT { RD } else { RW })?;
                self.imm(1, 1)?;
                self.flags(F::BIT_TEST);
            }
            0xbc | 0xbd => {
                let (id, f) = match (op, self.rep) {
                    (0xbc, 0xf3) => (I::TZCNT, F::COUNT),
                    (_, 0xf3) => (I::LZCNT, F::COUNT),
                    (0xbc, _) => (I::BSF, F::BIT_SCAN),
                    _ => (I::BSR, F::BIT_SCAN),
                };
                self.set(id);
                match id {
                    I::TZCNT => {
                        self.group(G::BMI);
                    }
                    I::LZCNT => {
                        self.group(G::LZCNT);
                    }
                    _ => {}
                }
                self.g(osz, WR)?;
                self.e(osz, RD)?;
                self.flags(f);
            }
            0xc0 | 0xc1 => {
                let size = if op & 1 == 0 { 1 } else { osz };
                self.set(I::XADD);
                self.e(size, RW)?;
                self.g(size, RW)?;
                self.flags(F::ARITH);
            }
            0xc7 => {
                if self.ext()? != 1 {
                    return None;
                }
                let wide = self.rex & 8 != 0;
                let (id, size) = if wide {
                    (I::CMPXCHG16B, 16)
                } else {
                    (I::CMPXCHG8B, 8)
                };
                let (a, d, b, c) = if wide {
                    (R::RAX, R::RDX, R::RBX, R::RCX)
                } else {
                    (R::EAX, R::EDX, R::EBX, R::ECX)
                };
                self.set(id)
                    .reads(&[a, d, b, c])
                    .writes(&[a, d])
                    .flags(F::MODIFY_ZF)
                    .suffix(Suffix::None);
                self.m(size, RW, Show::Plain)?;
            }
            0xc8..=0xcf => {
                self.set(I::BSWAP);
                self.gpr((op & 7) as u32 | self.rex_b(), osz.max(4), RW);
            }
            _ => self.sse(op)?,
        }
        Some(())
    }

    fn group6(&mut self) -> Option<()> {
        let ext = self.ext()?;
        let id = match ext {
            0 => I::SLDT,
            1 => I::STR,
            2 => I::LLDT,
            3 => I::LTR,
            4 => I::VERR,
            5 => I::VERW,
            _ => return None,
        };
        self.set(id);
        if ext < 2 {
            let size = if self.reg_form()? { self.osz } else { 2 };
            self.e(size, WR)?;
        } else {
            self.e(2, RD)?;
        }
        if ext >= 4 {
            self.flags(F::MODIFY_ZF);
        } else {
            self.group(G::PRIVILEGE);
        }
        Some(())
    }

    fn group7(&mut self) -> Option<()> {
        let m = self.modrm()?;
        if m >> 6 == 3 {
            match m {
                0xd0 => {
                    self.set(I::XGETBV)
                        .reads(&[R::ECX])
                        .writes(&[R::EAX, R::EDX]);
                }
                0xd1 => {
                    self.set(I::XSETBV)
                        .group(G::PRIVILEGE)
                        .reads(&[R::ECX, R::EAX, R::EDX]);
                }
                0xf8 if self.x64() => {
                    self.set(I::SWAPGS).group(G::PRIVILEGE).group(G::MODE64);
                }
                0xf9 => {
                    self.set(I::RDTSCP).writes(&[R::EAX, R::EDX, R::ECX]);
                }
                _ if (m >> 3) & 7 == 4 => {
                    self.set(I::SMSW);
                    self.e(self.osz, WR)?;
                }
                _ if (m >> 3) & 7 == 6 => {
                    self.set(I::LMSW).group(G::PRIVILEGE);
                    self.e(2, RD)?;
                }
                _ => return None,
            }
            return Some(());
        }
        match (m >> 3) & 7 {
            0 => {
                self.set(I::SGDT);
                self.m(0, WR, Show::NoSize)?;
            }
            1 => {
                self.set(I::SIDT);
                self.m(0, WR, Show::NoSize)?;
            }
            2 => {
                self.set(I::LGDT).group(G::PRIVILEGE);
                self.m(0, RD, Show::NoSize)?;
            }
            3 => {
                self.set(I::LIDT).group(G::PRIVILEGE);
                self.m(0, RD, Show::NoSize)?;
            }
            4 => {
                self.set(I::SMSW);
                self.m(2, WR, Show::Plain)?;
            }
            6 => {
                self.set(I::LMSW).group(G::PRIVILEGE);
                self.m(2, RD, Show::Plain)?;
            }
            7 => {
                self.set(I::INVLPG).group(G::PRIVILEGE);
                self.m(1, RD, Show::Plain)?;
            }
            _ => return None,
        }
        Some(())
    }

    fn group15(&mut self) -> Option<()> {
        let ext = self.ext()?;
        if self.reg_form()? {
            let id = match ext {
                5 => I::LFENCE,
                6 => I::MFENCE,
                7 => I::SFENCE,
                _ => return None,
            };
            self.set(id).group(G::SSE2);
            return Some(());
        }
        let (id, size, access) = match ext {
            0 => (I::FXSAVE, 0, WR),
            1 => (I::FXRSTOR, 0, RD),
            2 => (I::LDMXCSR, 4, RD),
            3 => (I::STMXCSR, 4, WR),
            4 => (I::XSAVE, 0, WR),
            5 => (I::XRSTOR, 0, RD),
            7 => (I::CLFLUSH, 1, RD),
            _ => return None,
        };
        self.set(id);
        let show = if size == 0 { Show::NoSize } else { Show::Plain };
        self.m(size, access, show)?;
        if matches!(id, I::XSAVE | I::XRSTOR) {
            self.reads(&[R::EDX, R::EAX]);
        }
        Some(())
    }

    // ---- SSE / SSE2 ----

    /// Mandatory prefix: 0xf3 or 0xf2 when present, else 0x66, else 0.
    fn sse_prefix(&self) -> u8 {
        if self.rep != 0 {
            self.rep
        } else if self.opsize {
            0x66
        } else {
            0
        }
    }

    /// GPR size of SSE conversions and moves, unaffected by 0x66.
    fn sse_gpr(&self) -> u8 {
        if self.rex & 8 != 0 {
            8
        } else {
            4
        }
    }

    fn sse(&mut self, op: u8) -> Option<()> {
        let pfx = self.sse_prefix();
        // ps, pd, ss, sd
        let lane = match pfx {
            0 => 0usize,
            0x66 => 1,
            0xf3 => 2,
            _ => 3,
        };
        let scalar_size = [16u8, 16, 4, 8][lane];
        self.suffix(Suffix::None);
        match op {
            0x10 | 0x11 => {
                let id = [I::MOVUPS, I::MOVUPD, I::MOVSS, I::MOVSD][lane];
                self.set(id);
                if op == 0x10 {
                    self.v(WR)?;
                    self.w(scalar_size, RD)?;
                } else {
                    self.w(scalar_size, WR)?;
                    self.v(RD)?;
                }
            }
            0x12 | 0x13 | 0x16 | 0x17 => {
                if lane > 1 {
                    return None;
                }
                let high = op >= 0x16;
                let load = op & 1 == 0;
                let id = match (high, lane, load && self.reg_form()?) {
                    (false, 0, true) => I::MOVHLPS,
                    (true, 0, true) => I::MOVLHPS,
                    (false, 0, _) => I::MOVLPS,
                    (false, _, _) => I::MOVLPD,
                    (true, 0, _) => I::MOVHPS,
                    (true, _, _) => I::MOVHPD,
                };
                self.set(id);
                if load {
                    self.v(RW)?;
                    if matches!(id, I::MOVHLPS | I::MOVLHPS) {
                        self.w(16, RD)?;
                    } else {
                        self.m(8, RD, Show::Plain)?;
                    }
                } else {
                    self.m(8, WR, Show::Plain)?;
                    self.v(RD)?;
                }
            }
            0x14 | 0x15 => {
                let id = match (op, lane) {
                    (0x14, 0) => I::UNPCKLPS,
                    (0x14, 1) => I::UNPCKLPD,
                    (_, 0) => I::UNPCKHPS,
                    (_, 1) => I::UNPCKHPD,
                    _ => return None,
                };
                self.set(id);
                self.v(RW)?;
                self.w(16, RD)?;
            }
            0x28 | 0x29 => {
                let id = match lane {
                    0 => I::MOVAPS,
                    1 => I::MOVAPD,
                    _ => return None,
                };
                self.set(id);
                if op == 0x28 {
                    self.v(WR)?;
                    self.w(16, RD)?;
                } else {
                    self.w(16, WR)?;
                    self.v(RD)?;
                }
            }
            0x2a => {
                let id = match lane {
                    2 => I::CVTSI2SS,
                    3 => I::CVTSI2SD,
                    _ => return None,
                };
                let size = self.sse_gpr();
                self.set(id).suffix(Suffix::Auto);
                self.v(WR)?;
                self.e(size, RD)?;
            }
            0x2c | 0x2d => {
                let id = match (op, lane) {
                    (0x2c, 2) => I::CVTTSS2SI,
                    (0x2c, 3) => I::CVTTSD2SI,
                    (_, 2) => I::CVTSS2SI,
                    (_, 3) => I::CVTSD2SI,
                    _ => return None,
                };
                let size = self.sse_gpr();
                self.set(id);
                self.g(size, WR)?;
                self.w(scalar_size, RD)?;
            }
            0x2e | 0x2f => {
                let (id, size) = match (op, lane) {
                    (0x2e, 0) => (I::UCOMISS, 4),
                    (0x2e, 1) => (I::UCOMISD, 8),
                    (_, 0) => (I::COMISS, 4),
                    (_, 1) => (I::COMISD, 8),
                    _ => return None,
                };
                self.set(id);
                self.v(RD)?;
                self.w(size, RD)?;
                self.flags(F::FP_COMPARE);
            }
            0x50 => {
                let id = match lane {
                    0 => I::MOVMSKPS,
                    1 => I::MOVMSKPD,
                    _ => return None,
                };
                if !self.reg_form()? {
                    return None;
                }
                self.set(id);
                self.g(4, WR)?;
                self.w(16, RD)?;
            }
            0x51..=0x5f => {
                let id = sse_arith(op, lane)?;
                let dst = if matches!(op, 0x51 | 0x52 | 0x53 | 0x5a | 0x5b) {
                    WR
                } else {
                    RW
                };
                let src = match id {
                    I::CVTPS2PD => 8,
                    I::CVTDQ2PS | I::CVTPS2DQ | I::CVTTPS2DQ => 16,
                    _ => scalar_size,
                };
                self.set(id);
                self.v(dst)?;
                self.w(src, RD)?;
            }
            0x6e | 0x7e if pfx == 0x66 => {
                let size = self.sse_gpr();
                self.set(if size == 8 { I::MOVQ } else { I::MOVD });
                if op == 0x6e {
                    self.v(WR)?;
                    self.e(size, RD)?;
                } else {
                    self.e(size, WR)?;
                    self.v(RD)?;
                }
            }
            0x7e if pfx == 0xf3 => {
                self.set(I::MOVQ);
                self.v(WR)?;
                self.w(8, RD)?;
            }
            0xd6 if pfx == 0x66 => {
                self.set(I::MOVQ);
                self.w(8, WR)?;
                self.v(RD)?;
            }
            0x6f | 0x7f => {
                let id = match pfx {
                    0x66 => I::MOVDQA,
                    0xf3 => I::MOVDQU,
                    _ => return None,
                };
                self.set(id);
                if op == 0x6f {
                    self.v(WR)?;
                    self.w(16, RD)?;
                } else {
                    self.w(16, WR)?;
                    self.v(RD)?;
                }
            }
            0x70 if pfx == 0x66 => {
                self.set(I::PSHUFD);
                self.v(WR)?;
                self.w(16, RD)?;
                self.imm(1, 1)?;
            }
            0xd7 if pfx == 0x66 => {
                if !self.reg_form()? {
                    return None;
                }
                self.set(I::PMOVMSKB);
                self.g(4, WR)?;
                self.w(16, RD)?;
            }
            _ if pfx == 0x66 => {
                let id = match op {
                    0x60 => I::PUNPCKLBW,
                    0x61 => I::PUNPCKLWD,
                    0x62 => I::PUNPCKLDQ,
                    0x6c => I::PUNPCKLQDQ,
                    0x6d => I::PUNPCKHQDQ,
                    0x74 => I::PCMPEQB,
                    0x75 => I::PCMPEQW,
                    0x76 => I::PCMPEQD,
                    0xd4 => I::PADDQ,
                    0xdb => I::PAND,
                    0xdf => I::PANDN,
                    0xeb => I::POR,
                    0xef => I::PXOR,
                    0xf8 => I::PSUBB,
                    0xfa => I::PSUBD,
                    0xfb => I::PSUBQ,
                    0xfc => I::PADDB,
                    0xfe => I::PADDD,
                    _ => return None,
                };
                self.set(id);
                self.v(RW)?;
                self.w(16, RD)?;
            }
            _ => return None,
        }
        let name = self.inst.b.id;
        let sse1 = lane == 0 && !is_sse2_packed_int(name) || lane == 2;
        self.group(if sse1 { G::SSE1 } else { G::SSE2 });
        Some(())
    }

    // ---- x87 ----

    fn x87(&mut self, op: u8) -> Option<()> {
        let m = self.modrm()?;
        let ext = (m >> 3) & 7;
        let i = (m & 7) as u32;
        let row = (op - 0xd8) as usize;
        self.group(G::FPU).suffix(Suffix::None);
        if m >> 6 != 3 {
            let (id, size, kind) = X87_MEM[row][ext as usize];
            if id == I::INVALID {
                return None;
            }
            let store = matches!(
                id,
                I::FST
                    | I::FSTP
                    | I::FIST
                    | I::FISTP
                    | I::FISTTP
                    | I::FNSTCW
                    | I::FNSTENV
                    | I::FNSAVE
                    | I::FNSTSW
                    | I::FBSTP
            );
            self.set(id);
            let show = if size == 0 { Show::NoSize } else { Show::Plain };
            self.m(size, if store { WR } else { RD }, show)?;
            self.suffix(match kind {
                X87::Float => Suffix::X87Float(size),
                X87::Int => Suffix::X87Int(size),
                X87::Control => Suffix::None,
            });
            if id == I::FNSTSW {
                self.reads(&[R::FPSW]);
            } else if store || kind != X87::Control {
                self.writes(&[R::FPSW]);
            }
            return Some(());
        }
        let st0 = R::ST0;
        let sti = R::st(i);
        match op {
            0xd8 => {
                let id = [
                    I::FADD,
                    I::FMUL,
                    I::FCOM,
                    I::FCOMP,
                    I::FSUB,
                    I::FSUBR,
                    I::FDIV,
                    I::FDIVR,
                ][ext as usize];
                self.set(id);
                if matches!(id, I::FCOM | I::FCOMP) {
                    self.reg(sti, RD);
                } else {
                    self.reg(st0, RW);
                    self.reg(sti, RD);
                }
            }
            0xd9 => match ext {
                0 => {
                    self.set(I::FLD).reg(sti, RD);
                }
                1 => {
                    self.set(I::FXCH).reg(sti, RW);
                }
                2 if m == 0xd0 => {
                    self.set(I::FNOP);
                }
                4..=7 => {
                    let id = D9_MISC[(m - 0xe0) as usize];
                    if id == I::INVALID {
                        return None;
                    }
                    self.set(id);
                }
                _ => return None,
            },
            0xda | 0xdb if ext < 4 => {
                let id = if op == 0xda {
                    [I::FCMOVB, I::FCMOVE, I::FCMOVBE, I::FCMOVU][ext as usize]
                } else {
                    [I::FCMOVNB, I::FCMOVNE, I::FCMOVNBE, I::FCMOVNU][ext as usize]
                };
                let cc = match ext {
                    0 => F::TEST_CF,
                    1 => F::TEST_ZF,
                    2 => F::TEST_CF | F::TEST_ZF,
                    _ => F::TEST_PF,
                };
                self.set(id).flags(cc);
                self.reg(st0, WR);
                self.reg(sti, RD);
            }
            0xda if m == 0xe9 => {
                self.set(I::FUCOMPP);
            }
            0xdb => match (ext, m) {
                (_, 0xe2) => {
                    self.set(I::FNCLEX);
                }
                (_, 0xe3) => {
                    self.set(I::FNINIT);
                }
                (5 | 6, _) => {
                    self.set(if ext == 5 { I::FUCOMI } else { I::FCOMI })
                        .flags(F::FP_COMPARE);
                    self.reg(st0, RD);
                    self.reg(sti, RD);
                }
                _ => return None,
            },
            0xdc => {
                let id = match ext {
                    0 => I::FADD,
                    1 => I::FMUL,
                    4 => I::FSUBR,
                    5 => I::FSUB,
                    6 => I::FDIVR,
                    7 => I::FDIV,
                    _ => return None,
                };
                self.set(id);
                self.reg(sti, RW);
                self.reg(st0, RD);
            }
            0xdd => {
                let id = match ext {
                    0 => I::FFREE,
                    2 => I::FST,
                    3 => I::FSTP,
                    4 => I::FUCOM,
                    5 => I::FUCOMP,
                    _ => return None,
                };
                let access = if matches!(id, I::FST | I::FSTP) { WR } else { RD };
                self.set(id).reg(sti, access);
            }
            0xde => {
                if ext == 3 {
                    if m != 0xd9 {
                        return None;
                    }
                    self.set(I::FCOMPP);
                } else {
                    let id = match ext {
                        0 => I::FADDP,
                        1 => I::FMULP,
                        4 => I::FSUBRP,
                        5 => I::FSUBP,
                        6 => I::FDIVRP,
                        7 => I::FDIVP,
                        _ => return None,
                    };
                    self.set(id);
                    self.reg(sti, RW);
                    self.reg(st0, RD);
                }
            }
            0xdf => match (ext, m) {
                (_, 0xe0) => {
                    self.set(I::FNSTSW).reads(&[R::FPSW]);
                    self.reg(R::AX, WR);
                }
                (5 | 6, _) => {
                    self.set(if ext == 5 { I::FUCOMIP } else { I::FCOMIP })
                        .flags(F::FP_COMPARE);
                    self.reg(st0, RD);
                    self.reg(sti, RD);
                }
                _ => return None,
            },
            _ => return None,
        }
        if self.inst.b.id != I::FNSTSW {
            self.writes(&[R::FPSW]);
        }
        Some(())
    }
}

fn is_legacy_prefix(b: u8) -> bool {
    matches!(
        b,
        0xf0 | 0xf2 | 0xf3 | 0x26 | 0x2e | 0x36 | 0x3e | 0x64 | 0x65 | 0x66 | 0x67
    )
}

/// Low `size` bytes of `value`.
pub(super) fn mask(value: i64, size: u8) -> u64 {
    if size >= 8 {
        value as u64
    } else {
        (value as u64) & ((1u64 << (size as u32 * 8)) - 1)
    }
}

fn is_sse2_packed_int(id: I) -> bool {
    matches!(id, I::CVTDQ2PS)
}

/// 0F 51..5F by prefix lane (ps, pd, ss, sd).
fn sse_arith(op: u8, lane: usize) -> Option<I> {
    let row: [I; 4] = match op {
        0x51 => [I::SQRTPS, I::SQRTPD, I::SQRTSS, I::SQRTSD],
        0x52 => [I::RSQRTPS, I::INVALID, I::RSQRTSS, I::INVALID],
        0x53 => [I::RCPPS, I::INVALID, I::RCPSS, I::INVALID],
        0x54 => [I::ANDPS, I::ANDPD, I::INVALID, I::INVALID],
        0x55 => [I::ANDNPS, I::ANDNPD, I::INVALID, I::INVALID],
        0x56 => [I::ORPS, I::ORPD, I::INVALID, I::INVALID],
        0x57 => [I::XORPS, I::XORPD, I::INVALID, I::INVALID],
        0x58 => [I::ADDPS, I::ADDPD, I::ADDSS, I::ADDSD],
        0x59 => [I::MULPS, I::MULPD, I::MULSS, I::MULSD],
        0x5a => [I::CVTPS2PD, I::CVTPD2PS, I::CVTSS2SD, I::CVTSD2SS],
        0x5b => [I::CVTDQ2PS, I::CVTPS2DQ, I::CVTTPS2DQ, I::INVALID],
        0x5c => [I::SUBPS, I::SUBPD, I::SUBSS, I::SUBSD],
        0x5d => [I::MINPS, I::MINPD, I::MINSS, I::MINSD],
        0x5e => [I::DIVPS, I::DIVPD, I::DIVSS, I::DIVSD],
        _ => [I::MAXPS, I::MAXPD, I::MAXSS, I::MAXSD],
    };
    Some(row[lane]).filter(|&id| id != I::INVALID)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum X87 {
    Float,
    Int,
    Control,
}

const BAD: (I, u8, X87) = (I::INVALID, 0, X87::Control);

const fn arith(ids: [I; 8], size: u8, kind: X87) -> [(I, u8, X87); 8] {
    [
        (ids[0], size, kind),
        (ids[1], size, kind),
        (ids[2], size, kind),
        (ids[3], size, kind),
        (ids[4], size, kind),
        (ids[5], size, kind),
        (ids[6], size, kind),
        (ids[7], size, kind),
    ]
}

const FARITH: [I; 8] = [
    I::FADD,
    I::FMUL,
    I::FCOM,
    I::FCOMP,
    I::FSUB,
    I::FSUBR,
    I::FDIV,
    I::FDIVR,
];
const FIARITH: [I; 8] = [
    I::FIADD,
    I::FIMUL,
    I::FICOM,
    I::FICOMP,
    I::FISUB,
    I::FISUBR,
    I::FIDIV,
    I::FIDIVR,
];

/// Memory forms of D8..DF by ModRM `reg`: id, operand size, kind.
const X87_MEM: [[(I, u8, X87); 8]; 8] = [
    arith(FARITH, 4, X87::Float),
    [
        (I::FLD, 4, X87::Float),
        BAD,
        (I::FST, 4, X87::Float),
        (I::FSTP, 4, X87::Float),
        (I::FLDENV, 0, X87::Control),
        (I::FLDCW, 2, X87::Control),
        (I::FNSTENV, 0, X87::Control),
        (I::FNSTCW, 2, X87::Control),
    ],
    arith(FIARITH, 4, X87::Int),
    [
        (I::FILD, 4, X87::Int),
        (I::FISTTP, 4, X87::Int),
        (I::FIST, 4, X87::Int),
        (I::FISTP, 4, X87::Int),
        BAD,
        (I::FLD, 10, X87::Float),
        BAD,
        (I::FSTP, 10, X87::Float),
    ],
    arith(FARITH, 8, X87::Float),
    [
        (I::FLD, 8, X87::Float),
        (I::FISTTP, 8, X87::Int),
        (I::FST, 8, X87::Float),
        (I::FSTP, 8, X87::Float),
        (I::FRSTOR, 0, X87::Control),
        BAD,
        (I::FNSAVE, 0, X87::Control),
        (I::FNSTSW, 2, X87::Control),
    ],
    arith(FIARITH, 2, X87::Int),
    [
        (I::FILD, 2, X87::Int),
        (I::FISTTP, 2, X87::Int),
        (I::FIST, 2, X87::Int),
        (I::FISTP, 2, X87::Int),
        (I::FBLD, 10, X87::Control),
        (I::FILD, 8, X87::Int),
        (I::FBSTP, 10, X87::Control),
        (I::FISTP, 8, X87::Int),
    ],
];

/// D9 E0..FF.
const D9_MISC: [I; 32] = [
    I::FCHS,
    I::FABS,
    I::INVALID,
    I::INVALID,
    I::FTST,
    I::FXAM,
    I::INVALID,
    I::INVALID,
    I::FLD1,
    I::FLDL2T,
    I::FLDL2E,
    I::FLDPI,
    I::FLDLG2,
    I::FLDLN2,
    I::FLDZ,
    I::INVALID,
    I::F2XM1,
    I::FYL2X,
    I::FPTAN,
    I::FPATAN,
    I::FXTRACT,
    I::FPREM1,
    I::FDECSTP,
    I::FINCSTP,
    I::FPREM,
    I::FYL2XP1,
    I::FSQRT,
    I::FSINCOS,
    I::FRNDINT,
    I::FSCALE,
    I::FSIN,
    I::FCOS,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::x86::X86OpKind;
    use rstest::rstest;

    fn inst(bytes: &[u8], mode: Mode) -> Inst {
        decode(bytes, 0x1000, mode).expect("valid encoding").0
    }

    #[test]
    fn test_rex_must_precede_opcode() {
        // REX followed by 0x66 is discarded
        let (i, len) = decode(&[0x48, 0x66, 0x90], 0, Mode::MODE_64).unwrap();
        assert_eq!(len, 3);
        assert_eq!(i.rex, 0);
        assert_eq!(i.b.id, I::NOP);
    }

    #[test]
    fn test_prefix_slots() {
        let i = inst(&[0xf0, 0x64, 0x66, 0x67, 0x01, 0x00], Mode::MODE_64);
        assert_eq!(i.prefix, [0xf0, 0x64, 0x66, 0x67]);
        assert_eq!(i.addr_size, 4);
        assert_eq!(i.prefix_text, "lock ");
    }

    #[rstest]
    #[case(Mode::MODE_64, &[0x67, 0x01, 0x00], 4)]
    #[case(Mode::MODE_32, &[0x67, 0x01, 0x00], 2)]
    #[case(Mode::MODE_16, &[0x67, 0x01, 0x00], 4)]
    #[case(Mode::MODE_16, &[0x01, 0x00], 2)]
    fn test_address_size_override(#[case] mode: Mode, #[case] bytes: &[u8], #[case] size: u8) {
        assert_eq!(inst(bytes, mode).addr_size, size);
    }

    #[rstest]
    #[case(&[0xf0, 0xb5, 0x75])]
    #[case(&[0xf0, 0x7e, 0xa4])]
    #[case(&[0xf0, 0x01, 0xd8])]
    #[case(&[0xf0, 0x8b, 0x00])]
    #[case(&[0xf0, 0x39, 0x18])]
    fn test_lock_needs_lockable_memory_destination(#[case] bytes: &[u8]) {
        assert!(decode(bytes, 0, Mode::MODE_64).is_none());
    }

    #[test]
    fn test_lock_on_read_modify_write() {
        assert_eq!(inst(&[0xf0, 0x01, 0x18], Mode::MODE_64).prefix_text, "lock ");
        assert_eq!(inst(&[0xf0, 0x0f, 0xc1, 0x02], Mode::MODE_64).b.id, I::XADD);
        assert_eq!(inst(&[0xf0, 0xfe, 0x00], Mode::MODE_64).b.id, I::INC);
    }

    #[test]
    fn test_operand_size_selection() {
        assert_eq!(inst(&[0x66, 0x01, 0xc0], Mode::MODE_64).b.ops[0].size, 2);
        assert_eq!(inst(&[0x48, 0x01, 0xc0], Mode::MODE_64).b.ops[0].size, 8);
        assert_eq!(inst(&[0x01, 0xc0], Mode::MODE_16).b.ops[0].size, 2);
        assert_eq!(inst(&[0x66, 0x01, 0xc0], Mode::MODE_16).b.ops[0].size, 4);
        // push defaults to 64 bits in long mode
        assert_eq!(inst(&[0x50], Mode::MODE_64).b.ops[0].size, 8);
    }

    #[test]
    fn test_rip_relative_only_in_long_mode() {
        let i = inst(&[0x8b, 0x05, 0x10, 0x00, 0x00, 0x00], Mode::MODE_32);
        match i.b.ops[1].kind {
            X86OpKind::Mem(m) => {
                assert_eq!(m.base, R::INVALID);
                assert_eq!(m.disp, 0x10);
            }
            other => panic!("unexpected operand {:?}", other),
        }
    }

    #[test]
    fn test_sign_extended_immediates() {
        let i = inst(&[0x83, 0xc0, 0xff], Mode::MODE_32);
        assert_eq!(i.b.ops[1].kind, X86OpKind::Imm(-1));
        assert_eq!(i.shows[1], Show::Imm { signed: true });
        // full-width immediates are stored unsigned
        let i = inst(&[0xb0, 0xff], Mode::MODE_32);
        assert_eq!(i.b.ops[1].kind, X86OpKind::Imm(0xff));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask(-1, 1), 0xff);
        assert_eq!(mask(-128, 4), 0xffff_ff80);
        assert_eq!(mask(-1, 8), u64::MAX);
    }

    #[test]
    fn test_length_limit() {
        let mut code = vec![0x66; 14];
        code.push(0x90);
        assert_eq!(decode(&code, 0, Mode::MODE_64).map(|(_, n)| n), Some(15));
        let mut code = vec![0x66; 15];
        code.push(0x90);
        assert!(decode(&code, 0, Mode::MODE_64).is_none());
    }
}
