//! x86 in 16-, 32- and 64-bit modes: the one-byte map, the common two-byte
//! map (system, cmov/setcc/jcc, bit ops, SSE/SSE2 moves and arithmetic),
//! x87, Intel and AT&T syntax.

mod decode;
mod render;
mod tables;

pub use self::tables::{X86Group, X86Insn, X86OpType, X86Reg};

use bitflags::bitflags;
use serde::Serialize;

use crate::decoder::{DecodeConfig, DecodeState, Decoded, Decoder};
use crate::insn::{push_reg, Access, GroupId, InsnId, OperandInfo, RegId};
use crate::mode::Syntax;
use crate::table::IdTable;
use crate::{Address, Arch, Mode};

bitflags! {
    /// Effect of an instruction on the arithmetic and system flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
    pub struct X86Eflags: u64 {
        const MODIFY_AF = 1 << 0;
        const MODIFY_CF = 1 << 1;
        const MODIFY_SF = 1 << 2;
        const MODIFY_ZF = 1 << 3;
        const MODIFY_PF = 1 << 4;
        const MODIFY_OF = 1 << 5;
        const MODIFY_TF = 1 << 6;
        const MODIFY_IF = 1 << 7;
        const MODIFY_DF = 1 << 8;
        const MODIFY_NT = 1 << 9;
        const MODIFY_RF = 1 << 10;
        const RESET_OF = 1 << 11;
        const RESET_CF = 1 << 12;
        const RESET_DF = 1 << 13;
        const RESET_IF = 1 << 14;
        const RESET_SF = 1 << 15;
        const RESET_AF = 1 << 16;
        const RESET_ZF = 1 << 17;
        const RESET_PF = 1 << 18;
        const SET_CF = 1 << 19;
        const SET_DF = 1 << 20;
        const SET_IF = 1 << 21;
        const TEST_OF = 1 << 22;
        const TEST_SF = 1 << 23;
        const TEST_ZF = 1 << 24;
        const TEST_PF = 1 << 25;
        const TEST_CF = 1 << 26;
        const TEST_DF = 1 << 27;
        const UNDEFINED_OF = 1 << 28;
        const UNDEFINED_SF = 1 << 29;
        const UNDEFINED_ZF = 1 << 30;
        const UNDEFINED_PF = 1 << 31;
        const UNDEFINED_AF = 1 << 32;
        const UNDEFINED_CF = 1 << 33;
    }
}

impl X86Eflags {
    /// add, sub, cmp, neg, xadd, cmpxchg
    pub const ARITH: X86Eflags = X86Eflags::MODIFY_AF
        .union(X86Eflags::MODIFY_CF)
        .union(X86Eflags::MODIFY_SF)
        .union(X86Eflags::MODIFY_ZF)
        .union(X86Eflags::MODIFY_PF)
        .union(X86Eflags::MODIFY_OF);
    /// inc, dec
    pub const INC_DEC: X86Eflags = X86Eflags::ARITH.difference(X86Eflags::MODIFY_CF);
    /// and, or, xor, test
    pub const LOGIC: X86Eflags = X86Eflags::MODIFY_SF
        .union(X86Eflags::MODIFY_ZF)
        .union(X86Eflags::MODIFY_PF)
        .union(X86Eflags::RESET_OF)
        .union(X86Eflags::RESET_CF)
        .union(X86Eflags::UNDEFINED_AF);
    /// Shifts and rotates by a count
    pub const SHIFT: X86Eflags = X86Eflags::MODIFY_CF
        .union(X86Eflags::MODIFY_SF)
        .union(X86Eflags::MODIFY_ZF)
        .union(X86Eflags::MODIFY_PF)
        .union(X86Eflags::UNDEFINED_OF)
        .union(X86Eflags::UNDEFINED_AF);
    /// mul, imul
    pub const MUL: X86Eflags = X86Eflags::MODIFY_CF
        .union(X86Eflags::MODIFY_OF)
        .union(X86Eflags::UNDEFINED_SF)
        .union(X86Eflags::UNDEFINED_ZF)
        .union(X86Eflags::UNDEFINED_AF)
        .union(X86Eflags::UNDEFINED_PF);
    /// div, idiv
    pub const DIV: X86Eflags = X86Eflags::UNDEFINED_OF
        .union(X86Eflags::UNDEFINED_SF)
        .union(X86Eflags::UNDEFINED_ZF)
        .union(X86Eflags::UNDEFINED_AF)
        .union(X86Eflags::UNDEFINED_PF)
        .union(X86Eflags::UNDEFINED_CF);
    /// bt, bts, btr, btc
    pub const BIT_TEST: X86Eflags = X86Eflags::MODIFY_CF
        .union(X86Eflags::UNDEFINED_OF)
        .union(X86Eflags::UNDEFINED_SF)
        .union(X86Eflags::UNDEFINED_AF)
        .union(X86Eflags::UNDEFINED_PF);
    /// bsf, bsr
    pub const BIT_SCAN: X86Eflags = X86Eflags::MODIFY_ZF
        .union(X86Eflags::UNDEFINED_OF)
        .union(X86Eflags::UNDEFINED_SF)
        .union(X86Eflags::UNDEFINED_AF)
        .union(X86Eflags::UNDEFINED_PF)
        .union(X86Eflags::UNDEFINED_CF);
    /// popcnt, lzcnt, tzcnt
    pub const COUNT: X86Eflags = X86Eflags::MODIFY_ZF
        .union(X86Eflags::MODIFY_CF)
        .union(X86Eflags::RESET_OF)
        .union(X86Eflags::RESET_SF)
        .union(X86Eflags::RESET_AF)
        .union(X86Eflags::RESET_PF);
    /// comiss, ucomisd and friends
    pub const FP_COMPARE: X86Eflags = X86Eflags::MODIFY_ZF
        .union(X86Eflags::MODIFY_PF)
        .union(X86Eflags::MODIFY_CF)
        .union(X86Eflags::RESET_OF)
        .union(X86Eflags::RESET_SF)
        .union(X86Eflags::RESET_AF);
    /// popf, sahf restore
    pub const RESTORE: X86Eflags = X86Eflags::ARITH
        .union(X86Eflags::MODIFY_TF)
        .union(X86Eflags::MODIFY_IF)
        .union(X86Eflags::MODIFY_DF)
        .union(X86Eflags::MODIFY_NT)
        .union(X86Eflags::MODIFY_RF);
    const TESTS: X86Eflags = X86Eflags::TEST_OF
        .union(X86Eflags::TEST_SF)
        .union(X86Eflags::TEST_ZF)
        .union(X86Eflags::TEST_PF)
        .union(X86Eflags::TEST_CF)
        .union(X86Eflags::TEST_DF);

    /// Flags read by condition code `cc` (jcc/setcc/cmovcc order).
    pub fn tested_by(cc: u8) -> X86Eflags {
        match (cc & 15) >> 1 {
            0 => X86Eflags::TEST_OF,
            1 => X86Eflags::TEST_CF,
            2 => X86Eflags::TEST_ZF,
            3 => X86Eflags::TEST_CF | X86Eflags::TEST_ZF,
            4 => X86Eflags::TEST_SF,
            5 => X86Eflags::TEST_PF,
            6 => X86Eflags::TEST_SF | X86Eflags::TEST_OF,
            _ => X86Eflags::TEST_ZF | X86Eflags::TEST_SF | X86Eflags::TEST_OF,
        }
    }

    /// Whether any flag is read.
    pub fn reads(self) -> bool {
        self.intersects(X86Eflags::TESTS)
    }

    /// Whether any flag is changed.
    pub fn writes(self) -> bool {
        !self.difference(X86Eflags::TESTS).is_empty()
    }
}

/// Memory reference `segment:[base + index*scale + disp]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct X86Mem {
    /// Explicit segment override, `INVALID` when absent
    pub segment: X86Reg,
    pub base: X86Reg,
    pub index: X86Reg,
    pub scale: u8,
    pub disp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum X86OpKind {
    Reg(X86Reg),
    Imm(i64),
    Mem(X86Mem),
}

/// One x86 operand; `size` is in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct X86Operand {
    #[serde(flatten)]
    pub kind: X86OpKind,
    pub size: u8,
    pub access: Access,
}

impl X86Operand {
    pub fn reg(reg: X86Reg, access: Access) -> Self {
        X86Operand {
            kind: X86OpKind::Reg(reg),
            size: reg.size(),
            access,
        }
    }

    pub fn imm(value: i64, size: u8) -> Self {
        X86Operand {
            kind: X86OpKind::Imm(value),
            size,
            access: Access::empty(),
        }
    }

    pub fn mem(mem: X86Mem, size: u8, access: Access) -> Self {
        X86Operand {
            kind: X86OpKind::Mem(mem),
            size,
            access,
        }
    }
}

impl OperandInfo for X86Operand {
    fn op_type(&self) -> u16 {
        match self.kind {
            X86OpKind::Reg(_) => X86OpType::REG as u16,
            X86OpKind::Imm(_) => X86OpType::IMM as u16,
            X86OpKind::Mem(_) => X86OpType::MEM as u16,
        }
    }

    fn collect_regs(&self, reads: &mut Vec<RegId>, writes: &mut Vec<RegId>) {
        match self.kind {
            X86OpKind::Reg(reg) => {
                if self.access.contains(Access::READ) {
                    push_reg(reads, reg.id());
                }
                if self.access.contains(Access::WRITE) {
                    push_reg(writes, reg.id());
                }
            }
            X86OpKind::Mem(m) => {
                push_reg(reads, m.segment.id());
                push_reg(reads, m.base.id());
                push_reg(reads, m.index.id());
            }
            X86OpKind::Imm(_) => {}
        }
    }
}

/// x86 detail record: raw encoding fields plus decoded operands.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct X86Detail {
    /// Lock/rep, segment, operand-size and address-size prefix bytes (0 when absent)
    pub prefix: [u8; 4],
    /// Opcode bytes, escape bytes included
    pub opcode: [u8; 4],
    pub rex: u8,
    /// Effective address size in bytes
    pub addr_size: u8,
    pub modrm: u8,
    pub sib: u8,
    pub disp: i64,
    pub sib_index: X86Reg,
    pub sib_scale: u8,
    pub sib_base: X86Reg,
    pub eflags: X86Eflags,
    pub operands: Vec<X86Operand>,
}

/// x86 decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct X86Decoder;

impl Decoder for X86Decoder {
    fn arch(&self) -> Arch {
        Arch::X86
    }

    fn mode_mask(&self) -> Mode {
        Mode::MODE_16 | Mode::MODE_32 | Mode::MODE_64
    }

    /// Exactly one of the three widths.
    fn check_mode(&self, mode: Mode) -> bool {
        self.mode_mask().contains(mode) && mode.bits().count_ones() == 1
    }

    fn supports_syntax(&self, syntax: Syntax) -> bool {
        matches!(syntax, Syntax::Default | Syntax::Intel | Syntax::Att)
    }

    fn decode(
        &self,
        code: &[u8],
        address: Address,
        cfg: &DecodeConfig,
        _state: &mut DecodeState,
    ) -> Option<Decoded> {
        let (inst, size) = decode::decode(code, address, cfg.mode)?;
        Some(render::finish(inst, size, cfg))
    }

    fn skipdata_len(&self, _mode: Mode) -> usize {
        1
    }

    fn reg_name(&self, reg: RegId) -> &'static str {
        X86Reg::name_of(reg)
    }

    fn insn_name(&self, id: InsnId) -> &'static str {
        X86Insn::name_of(id)
    }

    fn group_name(&self, id: GroupId) -> &'static str {
        X86Group::name_of(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cfg(mode: Mode, syntax: Syntax) -> DecodeConfig {
        let mut cfg = DecodeConfig::new(mode);
        cfg.syntax = syntax;
        cfg
    }

    fn text_in(bytes: &[u8], mode: Mode, syntax: Syntax) -> String {
        let d = X86Decoder
            .decode_one(bytes, 0x1000, &cfg(mode, syntax))
            .expect("valid encoding");
        assert_eq!(d.size, bytes.len(), "length of {:02x?}", bytes);
        if d.op_str.is_empty() {
            d.mnemonic
        } else {
            format!("{} {}", d.mnemonic, d.op_str)
        }
    }

    fn intel64(bytes: &[u8]) -> String {
        text_in(bytes, Mode::MODE_64, Syntax::Intel)
    }

    #[test]
    fn test_push_and_rip_relative_load() {
        let code = [0x55, 0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00];
        let mut cfg = DecodeConfig::new(Mode::MODE_64);
        cfg.detail = true;
        let first = X86Decoder.decode_one(&code, 0x1000, &cfg).unwrap();
        assert_eq!((first.mnemonic.as_str(), first.op_str.as_str()), ("push", "rbp"));
        assert_eq!(first.size, 1);
        let second = X86Decoder.decode_one(&code[1..], 0x1001, &cfg).unwrap();
        assert_eq!(second.mnemonic, "mov");
        assert_eq!(second.op_str, "rax, qword ptr [rip + 0x13b8]");
        assert_eq!(second.size, 7);

        let detail = second.detail.unwrap();
        let x86 = detail.arch.x86().unwrap();
        assert_eq!(x86.rex, 0x48);
        assert_eq!(x86.opcode, [0x8b, 0, 0, 0]);
        assert_eq!(x86.modrm, 0x05);
        assert_eq!(x86.disp, 0x13b8);
        assert_eq!(x86.addr_size, 8);
        assert_eq!(
            x86.operands,
            vec![
                X86Operand::reg(X86Reg::RAX, Access::WRITE),
                X86Operand::mem(
                    X86Mem {
                        base: X86Reg::RIP,
                        scale: 1,
                        disp: 0x13b8,
                        ..X86Mem::default()
                    },
                    8,
                    Access::READ
                ),
            ]
        );
        assert!(detail.regs_read.is_empty());

        let push = first.detail.unwrap();
        assert_eq!(push.regs_read, vec![X86Reg::RSP as u16]);
        assert_eq!(push.regs_write, vec![X86Reg::RSP as u16]);
    }

    #[rstest]
    #[case(&[0x48, 0x83, 0xec, 0x18], "sub rsp, 0x18")]
    #[case(&[0x48, 0x83, 0xc4, 0x80], "add rsp, -0x80")]
    #[case(&[0x48, 0x83, 0xe4, 0xf0], "and rsp, 0xfffffffffffffff0")]
    #[case(&[0x31, 0xc0], "xor eax, eax")]
    #[case(&[0x48, 0x89, 0xe5], "mov rbp, rsp")]
    #[case(&[0x89, 0x7d, 0xfc], "mov dword ptr [rbp - 4], edi")]
    #[case(&[0x8b, 0x04, 0x8b], "mov eax, dword ptr [rbx + rcx*4]")]
    #[case(&[0x48, 0x8d, 0x44, 0x24, 0x10], "lea rax, [rsp + 0x10]")]
    #[case(&[0xc3], "ret")]
    #[case(&[0xc9], "leave")]
    #[case(&[0x90], "nop")]
    #[case(&[0xf3, 0x90], "pause")]
    #[case(&[0x0f, 0x1f, 0x40, 0x00], "nop dword ptr [rax]")]
    #[case(&[0x66, 0x0f, 0x1f, 0x44, 0x00, 0x00], "nop word ptr [rax + rax]")]
    #[case(&[0xe8, 0x00, 0x00, 0x00, 0x00], "call 0x1005")]
    #[case(&[0xeb, 0xfe], "jmp 0x1000")]
    #[case(&[0x74, 0x10], "je 0x1012")]
    #[case(&[0x0f, 0x85, 0x00, 0x01, 0x00, 0x00], "jne 0x1106")]
    #[case(&[0xff, 0xd0], "call rax")]
    #[case(&[0xff, 0x25, 0x02, 0x00, 0x00, 0x00], "jmp qword ptr [rip + 2]")]
    #[case(&[0x41, 0x57], "push r15")]
    #[case(&[0x41, 0x5c], "pop r12")]
    #[case(&[0x48, 0xb8, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11], "movabs rax, 0x1122334455667788")]
    #[case(&[0xb8, 0x01, 0x00, 0x00, 0x00], "mov eax, 1")]
    #[case(&[0x40, 0xb6, 0xff], "mov sil, 0xff")]
    #[case(&[0xc7, 0x45, 0xf8, 0x00, 0x00, 0x00, 0x00], "mov dword ptr [rbp - 8], 0")]
    #[case(&[0x48, 0x63, 0xd0], "movsxd rdx, eax")]
    #[case(&[0x0f, 0xb6, 0xc0], "movzx eax, al")]
    #[case(&[0x48, 0x0f, 0xbf, 0x07], "movsx rax, word ptr [rdi]")]
    #[case(&[0x0f, 0x94, 0xc0], "sete al")]
    #[case(&[0x48, 0x0f, 0x44, 0xc1], "cmove rax, rcx")]
    #[case(&[0x48, 0xc1, 0xe0, 0x04], "shl rax, 4")]
    #[case(&[0xd1, 0xf8], "sar eax, 1")]
    #[case(&[0x48, 0xd3, 0xea], "shr rdx, cl")]
    #[case(&[0x48, 0xf7, 0xf1], "div rcx")]
    #[case(&[0x48, 0x99], "cqo")]
    #[case(&[0x48, 0x98], "cdqe")]
    #[case(&[0x0f, 0x05], "syscall")]
    #[case(&[0x0f, 0xa2], "cpuid")]
    #[case(&[0xcc], "int3")]
    #[case(&[0xcd, 0x80], "int 0x80")]
    #[case(&[0xf4], "hlt")]
    #[case(&[0x64, 0x48, 0x8b, 0x04, 0x25, 0x28, 0x00, 0x00, 0x00], "mov rax, qword ptr fs:[0x28]")]
    #[case(&[0xf0, 0x0f, 0xb1, 0x0a], "lock cmpxchg dword ptr [rdx], ecx")]
    #[case(&[0xf3, 0x48, 0xab], "rep stosq qword ptr [rdi], rax")]
    #[case(&[0xa4], "movsb byte ptr [rdi], byte ptr [rsi]")]
    #[case(&[0xf2, 0xac], "repne lodsb al, byte ptr [rsi]")]
    #[case(&[0xf2, 0xae], "repne scasb al, byte ptr [rdi]")]
    #[case(&[0xf2, 0xe9, 0x00, 0x00, 0x00, 0x00], "bnd jmp 0x1006")]
    #[case(&[0xf2, 0xc3], "bnd ret")]
    #[case(&[0xf3, 0x0f, 0x1e, 0xfa], "endbr64")]
    #[case(&[0x0f, 0xc8], "bswap eax")]
    #[case(&[0x48, 0x0f, 0xa3, 0xc8], "bt rax, rcx")]
    #[case(&[0xf3, 0x48, 0x0f, 0xb8, 0xc7], "popcnt rax, rdi")]
    #[case(&[0x86, 0xe0], "xchg al, ah")]
    #[case(&[0x91], "xchg eax, ecx")]
    #[case(&[0xa8, 0x01], "test al, 1")]
    #[case(&[0x48, 0x69, 0xc0, 0xe8, 0x03, 0x00, 0x00], "imul rax, rax, 0x3e8")]
    #[case(&[0x48, 0xa1, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], "movabs rax, qword ptr [0x1000]")]
    fn test_intel_64(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(intel64(bytes), expected);
    }

    #[rstest]
    #[case(&[0x0f, 0x28, 0xc1], "movaps xmm0, xmm1")]
    #[case(&[0xf2, 0x0f, 0x10, 0x45, 0xf8], "movsd xmm0, qword ptr [rbp - 8]")]
    #[case(&[0xf3, 0x0f, 0x11, 0x07], "movss dword ptr [rdi], xmm0")]
    #[case(&[0xf2, 0x0f, 0x58, 0xc1], "addsd xmm0, xmm1")]
    #[case(&[0x0f, 0x57, 0xc0], "xorps xmm0, xmm0")]
    #[case(&[0x66, 0x0f, 0xef, 0xc0], "pxor xmm0, xmm0")]
    #[case(&[0x66, 0x48, 0x0f, 0x6e, 0xc7], "movq xmm0, rdi")]
    #[case(&[0x66, 0x0f, 0x7e, 0xc0], "movd eax, xmm0")]
    #[case(&[0xf3, 0x0f, 0x6f, 0x06], "movdqu xmm0, xmmword ptr [rsi]")]
    #[case(&[0xf2, 0x48, 0x0f, 0x2a, 0xc0], "cvtsi2sd xmm0, rax")]
    #[case(&[0xf2, 0x0f, 0x2c, 0xc0], "cvttsd2si eax, xmm0")]
    #[case(&[0x66, 0x0f, 0x2e, 0xc1], "ucomisd xmm0, xmm1")]
    #[case(&[0x66, 0x0f, 0x70, 0xc0, 0x1b], "pshufd xmm0, xmm0, 0x1b")]
    #[case(&[0x44, 0x0f, 0x28, 0xc0], "movaps xmm8, xmm0")]
    #[case(&[0x0f, 0xae, 0xf0], "mfence")]
    fn test_sse(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(intel64(bytes), expected);
    }

    #[rstest]
    #[case(&[0xd9, 0xe8], "fld1")]
    #[case(&[0xd9, 0x45, 0x08], "fld dword ptr [rbp + 8]")]
    #[case(&[0xdd, 0x1c, 0x24], "fstp qword ptr [rsp]")]
    #[case(&[0xdb, 0x2f], "fld xword ptr [rdi]")]
    #[case(&[0xde, 0xc1], "faddp st(1), st(0)")]
    #[case(&[0xd8, 0xc9], "fmul st(0), st(1)")]
    #[case(&[0xd9, 0xc9], "fxch st(1)")]
    #[case(&[0xdf, 0xe0], "fnstsw ax")]
    #[case(&[0xdf, 0x2e], "fild qword ptr [rsi]")]
    #[case(&[0xd9, 0x7d, 0xfe], "fnstcw word ptr [rbp - 2]")]
    fn test_x87(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(intel64(bytes), expected);
    }

    #[rstest]
    #[case(&[0x55], "pushq %rbp")]
    #[case(&[0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00], "movq 0x13b8(%rip), %rax")]
    #[case(&[0x48, 0x83, 0xc4, 0x80], "addq $-0x80, %rsp")]
    #[case(&[0x8b, 0x04, 0x8b], "movl (%rbx,%rcx,4), %eax")]
    #[case(&[0x89, 0x7d, 0xfc], "movl %edi, -4(%rbp)")]
    #[case(&[0x0f, 0xb6, 0xc0], "movzbl %al, %eax")]
    #[case(&[0x48, 0x63, 0xd0], "movslq %eax, %rdx")]
    #[case(&[0x48, 0x98], "cltq")]
    #[case(&[0xe8, 0x00, 0x00, 0x00, 0x00], "callq 0x1005")]
    #[case(&[0xff, 0xd0], "callq *%rax")]
    #[case(&[0xc3], "retq")]
    #[case(&[0x74, 0x10], "je 0x1012")]
    #[case(&[0x0f, 0x94, 0xc0], "sete %al")]
    #[case(&[0x64, 0x48, 0x8b, 0x04, 0x25, 0x28, 0x00, 0x00, 0x00], "movq %fs:0x28, %rax")]
    #[case(&[0xf2, 0x0f, 0x58, 0xc1], "addsd %xmm1, %xmm0")]
    #[case(&[0xd9, 0x45, 0x08], "flds 8(%rbp)")]
    #[case(&[0xdf, 0x2e], "fildll (%rsi)")]
    #[case(&[0xf3, 0x48, 0xab], "rep stosq %rax, (%rdi)")]
    #[case(&[0x0f, 0x1f, 0x40, 0x00], "nopl (%rax)")]
    fn test_att_64(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(text_in(bytes, Mode::MODE_64, Syntax::Att), expected);
    }

    #[rstest]
    #[case(&[0x55], "push ebp")]
    #[case(&[0x89, 0xe5], "mov ebp, esp")]
    #[case(&[0x40], "inc eax")]
    #[case(&[0x4b], "dec ebx")]
    #[case(&[0x60], "pushal")]
    #[case(&[0x8b, 0x15, 0x00, 0x20, 0x00, 0x00], "mov edx, dword ptr [0x2000]")]
    #[case(&[0x66, 0xb8, 0x34, 0x12], "mov ax, 0x1234")]
    #[case(&[0xe8, 0xfb, 0xff, 0xff, 0xff], "call 0x1000")]
    #[case(&[0x9a, 0x00, 0x10, 0x00, 0x00, 0x08, 0x00], "lcall 8:0x1000")]
    #[case(&[0xcd, 0x80], "int 0x80")]
    #[case(&[0x9c], "pushfd")]
    #[case(&[0xaa], "stosb byte ptr es:[edi], al")]
    #[case(&[0x2e, 0xa5], "movsd dword ptr es:[edi], dword ptr cs:[esi]")]
    #[case(&[0xac], "lodsb al, byte ptr [esi]")]
    fn test_intel_32(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(text_in(bytes, Mode::MODE_32, Syntax::Intel), expected);
    }

    #[rstest]
    #[case(&[0xb8, 0x34, 0x12], "mov ax, 0x1234")]
    #[case(&[0x8b, 0x07], "mov ax, word ptr [bx]")]
    #[case(&[0x8b, 0x42, 0x04], "mov ax, word ptr [bp + si + 4]")]
    #[case(&[0xa1, 0x00, 0x20], "mov ax, word ptr [0x2000]")]
    #[case(&[0xcd, 0x21], "int 0x21")]
    #[case(&[0xeb, 0xfe], "jmp 0x1000")]
    #[case(&[0x66, 0x50], "push eax")]
    fn test_intel_16(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(text_in(bytes, Mode::MODE_16, Syntax::Intel), expected);
    }

    #[test]
    fn test_64bit_only_and_legacy_only_opcodes() {
        let m32 = cfg(Mode::MODE_32, Syntax::Intel);
        let m64 = cfg(Mode::MODE_64, Syntax::Intel);
        // pushal is gone in long mode
        assert!(X86Decoder.decode_one(&[0x60], 0, &m64).is_none());
        // 0x40 is a REX prefix in long mode
        assert_eq!(
            X86Decoder.decode_one(&[0x40, 0x90], 0, &m64).map(|d| d.size),
            Some(2)
        );
        assert!(X86Decoder.decode_one(&[0x0f, 0x05], 0, &m32).is_none());
    }

    #[test]
    fn test_truncated_and_invalid() {
        let m64 = cfg(Mode::MODE_64, Syntax::Intel);
        assert!(X86Decoder.decode_one(&[], 0, &m64).is_none());
        assert!(X86Decoder.decode_one(&[0x48], 0, &m64).is_none());
        assert!(X86Decoder.decode_one(&[0x8b, 0x04], 0, &m64).is_none());
        assert!(X86Decoder.decode_one(&[0xe8, 0x00, 0x00], 0, &m64).is_none());
        // 15 prefixes and no opcode
        assert!(X86Decoder.decode_one(&[0x66; 16], 0, &m64).is_none());
        // 3DNow! escape
        assert!(X86Decoder.decode_one(&[0x0f, 0x0f, 0x00], 0, &m64).is_none());
    }

    #[test]
    fn test_unsigned_immediates() {
        let mut cfg = cfg(Mode::MODE_64, Syntax::Intel);
        cfg.unsigned = true;
        let d = X86Decoder
            .decode_one(&[0x48, 0x83, 0xc4, 0x80], 0, &cfg)
            .unwrap();
        assert_eq!(d.op_str, "rsp, 0xffffffffffffff80");
        let d = X86Decoder.decode_one(&[0x83, 0xc0, 0xff], 0, &cfg).unwrap();
        assert_eq!(d.op_str, "eax, 0xffffffff");
    }

    #[test]
    fn test_eflags_and_implicit_registers() {
        let mut cfg = cfg(Mode::MODE_64, Syntax::Intel);
        cfg.detail = true;
        let d = X86Decoder.decode_one(&[0x31, 0xc0], 0, &cfg).unwrap();
        let detail = d.detail.unwrap();
        assert_eq!(detail.arch.x86().unwrap().eflags, X86Eflags::LOGIC);
        assert_eq!(detail.regs_write, vec![X86Reg::EFLAGS as u16]);

        let d = X86Decoder.decode_one(&[0x74, 0x00], 0, &cfg).unwrap();
        let detail = d.detail.unwrap();
        assert_eq!(detail.arch.x86().unwrap().eflags, X86Eflags::TEST_ZF);
        assert_eq!(detail.regs_read, vec![X86Reg::EFLAGS as u16]);
        assert!(detail.in_group(X86Group::JUMP as u16));
        assert!(detail.in_group(X86Group::BRANCH_RELATIVE as u16));

        let d = X86Decoder.decode_one(&[0x48, 0xf7, 0xe1], 0, &cfg).unwrap();
        let detail = d.detail.unwrap();
        assert!(detail.regs_read.contains(&(X86Reg::RAX as u16)));
        assert!(detail.regs_write.contains(&(X86Reg::RDX as u16)));
    }

    #[test]
    fn test_sib_fields() {
        let mut cfg = cfg(Mode::MODE_64, Syntax::Intel);
        cfg.detail = true;
        // mov eax, [rbx + rcx*4 + 0x10]
        let d = X86Decoder
            .decode_one(&[0x8b, 0x44, 0x8b, 0x10], 0, &cfg)
            .unwrap();
        assert_eq!(d.op_str, "eax, dword ptr [rbx + rcx*4 + 0x10]");
        let detail = d.detail.unwrap();
        let x86 = detail.arch.x86().unwrap();
        assert_eq!(x86.sib, 0x8b);
        assert_eq!(x86.sib_base, X86Reg::RBX);
        assert_eq!(x86.sib_index, X86Reg::RCX);
        assert_eq!(x86.sib_scale, 4);
        let (reads, writes) = detail.arch.explicit_regs();
        assert_eq!(reads, vec![X86Reg::RBX as u16, X86Reg::RCX as u16]);
        assert_eq!(writes, vec![X86Reg::EAX as u16]);
    }

    #[test]
    fn test_mode_checks() {
        assert!(X86Decoder.check_mode(Mode::MODE_64));
        assert!(X86Decoder.check_mode(Mode::MODE_16));
        assert!(!X86Decoder.check_mode(Mode::MODE_32 | Mode::MODE_64));
        assert!(!X86Decoder.check_mode(Mode::empty()));
        assert!(!X86Decoder.check_mode(Mode::MODE_64 | Mode::BIG_ENDIAN));
        assert!(X86Decoder.supports_syntax(Syntax::Att));
        assert!(!X86Decoder.supports_syntax(Syntax::NoRegName));
    }
}
