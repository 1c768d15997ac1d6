//! Intel and AT&T text for a decoded [`Inst`].

use super::decode::{mask, Inst, Show, Suffix};
use super::{X86Detail, X86Mem, X86OpKind, X86Operand, X86Reg as R};
use crate::arch::{fmt_imm, fmt_uimm};
use crate::decoder::{DecodeConfig, Decoded};
use crate::insn::ArchDetail;
use crate::mode::Syntax;
use crate::table::IdTable;

pub(super) fn finish(inst: Inst, size: usize, cfg: &DecodeConfig) -> Decoded {
    let (mnemonic, text) = render(&inst, cfg.syntax == Syntax::Att, cfg.unsigned);
    let Inst {
        mut b,
        eflags,
        prefix,
        opcode,
        rex,
        addr_size,
        modrm,
        sib,
        disp,
        ..
    } = inst;
    b.mnemonic = mnemonic;
    b.text = text;
    let mem = b.ops.iter().find_map(|op| match op.kind {
        X86OpKind::Mem(m) => Some(m),
        _ => None,
    });
    b.finish(size, cfg.detail, |operands| {
        ArchDetail::X86(X86Detail {
            prefix,
            opcode,
            rex,
            addr_size,
            modrm,
            sib,
            disp,
            sib_index: mem.map_or(R::INVALID, |m| m.index),
            sib_scale: mem.map_or(0, |m| m.scale),
            sib_base: mem.map_or(R::INVALID, |m| m.base),
            eflags,
            operands,
        })
    })
}

fn render(inst: &Inst, att: bool, unsigned: bool) -> (String, Vec<String>) {
    let name = inst.b.id.name();
    let mnemonic = if att {
        format!(
            "{}{}{}",
            inst.prefix_text,
            inst.att_base.unwrap_or(name),
            suffix_text(inst)
        )
    } else {
        format!("{}{}", inst.prefix_text, name)
    };

    if let [seg, off] = inst.b.ops.as_slice() {
        if inst.shows.first() == Some(&Show::Far) {
            let (seg, off) = (imm_value(seg), imm_value(off));
            let text = if att {
                vec![format!("${}", fmt_uimm(seg)), format!("${}", fmt_uimm(off))]
            } else {
                vec![format!("{}:{}", fmt_uimm(seg), fmt_uimm(off))]
            };
            return (mnemonic, text);
        }
    }

    let mut text: Vec<String> = inst
        .b
        .ops
        .iter()
        .zip(&inst.shows)
        .map(|(op, &show)| operand(op, show, att, unsigned, inst.addr_size))
        .collect();
    if att {
        text.reverse();
    }
    (mnemonic, text)
}

fn imm_value(op: &X86Operand) -> u64 {
    match op.kind {
        X86OpKind::Imm(v) => mask(v, op.size),
        _ => 0,
    }
}

fn letter(size: u8) -> &'static str {
    match size {
        1 => "b",
        2 => "w",
        4 => "l",
        8 => "q",
        _ => "",
    }
}

fn suffix_text(inst: &Inst) -> String {
    match inst.suffix {
        Suffix::Auto => inst
            .b
            .ops
            .iter()
            .find_map(|op| match op.kind {
                X86OpKind::Reg(r) if r.is_gpr() => Some(r.size()),
                X86OpKind::Mem(_) if matches!(op.size, 1 | 2 | 4 | 8) => Some(op.size),
                _ => None,
            })
            .map_or("", letter)
            .to_string(),
        Suffix::None => String::new(),
        Suffix::Size(size) => letter(size).to_string(),
        Suffix::Ext(from, to) => format!("{}{}", letter(from), letter(to)),
        Suffix::X87Float(size) => match size {
            4 => "s",
            8 => "l",
            10 => "t",
            _ => "",
        }
        .to_string(),
        Suffix::X87Int(size) => match size {
            2 => "s",
            4 => "l",
            8 => "ll",
            _ => "",
        }
        .to_string(),
    }
}

fn size_keyword(size: u8) -> Option<&'static str> {
    match size {
        1 => Some("byte"),
        2 => Some("word"),
        4 => Some("dword"),
        8 => Some("qword"),
        10 => Some("xword"),
        16 => Some("xmmword"),
        _ => None,
    }
}

fn operand(op: &X86Operand, show: Show, att: bool, unsigned: bool, addr_size: u8) -> String {
    let star = if att && show == Show::Indirect { "*" } else { "" };
    match op.kind {
        X86OpKind::Reg(r) => {
            if att {
                format!("{}%{}", star, r.name())
            } else {
                r.name().to_string()
            }
        }
        X86OpKind::Imm(v) => {
            let num = match show {
                Show::Target => return fmt_uimm(v as u64),
                Show::Imm { signed: true } if !unsigned => fmt_imm(v),
                _ => fmt_uimm(mask(v, op.size)),
            };
            if att {
                format!("${}", num)
            } else {
                num
            }
        }
        X86OpKind::Mem(m) if att => format!("{}{}", star, att_mem(&m, addr_size)),
        X86OpKind::Mem(m) => {
            let keyword = match show {
                Show::NoSize => None,
                _ => size_keyword(op.size),
            };
            match keyword {
                Some(k) => format!("{} ptr {}", k, intel_mem(&m, addr_size)),
                None => intel_mem(&m, addr_size),
            }
        }
    }
}

fn segment_prefix(m: &X86Mem, att: bool) -> String {
    if m.segment == R::INVALID {
        String::new()
    } else if att {
        format!("%{}:", m.segment.name())
    } else {
        format!("{}:", m.segment.name())
    }
}

/// `seg:[base + index*scale ± disp]`
fn intel_mem(m: &X86Mem, addr_size: u8) -> String {
    let mut inner = String::new();
    if m.base != R::INVALID {
        inner.push_str(m.base.name());
    }
    if m.index != R::INVALID {
        if !inner.is_empty() {
            inner.push_str(" + ");
        }
        inner.push_str(m.index.name());
        if m.scale != 1 {
            inner.push_str(&format!("*{}", m.scale));
        }
    }
    if inner.is_empty() {
        inner = fmt_uimm(mask(m.disp, addr_size));
    } else if m.disp < 0 {
        inner.push_str(&format!(" - {}", fmt_uimm(m.disp.unsigned_abs())));
    } else if m.disp > 0 {
        inner.push_str(&format!(" + {}", fmt_uimm(m.disp as u64)));
    }
    format!("{}[{}]", segment_prefix(m, false), inner)
}

/// `%seg:disp(%base,%index,scale)`
fn att_mem(m: &X86Mem, addr_size: u8) -> String {
    let mut s = segment_prefix(m, true);
    if m.base == R::INVALID && m.index == R::INVALID {
        s.push_str(&fmt_uimm(mask(m.disp, addr_size)));
        return s;
    }
    if m.disp != 0 {
        s.push_str(&fmt_imm(m.disp));
    }
    s.push('(');
    if m.base != R::INVALID {
        s.push('%');
        s.push_str(m.base.name());
    }
    if m.index != R::INVALID {
        s.push_str(",%");
        s.push_str(m.index.name());
        if m.scale != 1 {
            s.push_str(&format!(",{}", m.scale));
        }
    }
    s.push(')');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem(base: R, index: R, scale: u8, disp: i64) -> X86Mem {
        X86Mem {
            segment: R::INVALID,
            base,
            index,
            scale,
            disp,
        }
    }

    #[test]
    fn test_intel_memory_forms() {
        assert_eq!(intel_mem(&mem(R::RBP, R::INVALID, 1, -8), 8), "[rbp - 8]");
        assert_eq!(intel_mem(&mem(R::INVALID, R::RAX, 8, 0x20), 8), "[rax*8 + 0x20]");
        assert_eq!(intel_mem(&mem(R::INVALID, R::INVALID, 1, -1), 4), "[0xffffffff]");
        let mut m = mem(R::INVALID, R::INVALID, 1, 0x28);
        m.segment = R::GS;
        assert_eq!(intel_mem(&m, 8), "gs:[0x28]");
    }

    #[test]
    fn test_att_memory_forms() {
        assert_eq!(att_mem(&mem(R::RBP, R::INVALID, 1, -8), 8), "-8(%rbp)");
        assert_eq!(att_mem(&mem(R::INVALID, R::RAX, 8, 0x20), 8), "0x20(,%rax,8)");
        assert_eq!(att_mem(&mem(R::RSI, R::RDI, 1, 0), 8), "(%rsi,%rdi)");
        assert_eq!(att_mem(&mem(R::INVALID, R::INVALID, 1, 0x1000), 4), "0x1000");
    }

    #[test]
    fn test_suffix_letters() {
        assert_eq!(letter(1), "b");
        assert_eq!(letter(8), "q");
        assert_eq!(letter(16), "");
    }
}
