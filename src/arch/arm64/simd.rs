//! Advanced SIMD vector forms: three-same, three-different, element copy and
//! the multiple-structure loads and stores.

use super::decode::{rd, rm, rn, Flags};
use super::{
    Arm64Group as G, Arm64Insn as I, Arm64OpKind as K, Arm64Operand, Arm64Reg as R,
    Arm64Vas as Vas,
};
use crate::arch::{bit, bits, InsnBuilder};
use crate::insn::Access;
use crate::table::IdTable;

type B = InsnBuilder<I, Arm64Operand>;

impl InsnBuilder<I, Arm64Operand> {
    /// `vN.4s`
    fn vreg(&mut self, n: u32, vas: Vas, access: Access) -> &mut Self {
        let reg = R::vector(n);
        let mut op = Arm64Operand::new(K::Reg(reg), access);
        op.vas = vas;
        self.push(op, format!("{}.{}", reg.name(), vas.suffix()))
    }

    /// `vN.s[i]`
    fn velem(&mut self, n: u32, vas: Vas, index: u32, access: Access) -> &mut Self {
        let reg = R::vector(n);
        let mut op = Arm64Operand::new(K::Reg(reg), access);
        op.vas = vas;
        op.vector_index = Some(index as u8);
        self.push(op, format!("{}.{}[{}]", reg.name(), vas.suffix(), index))
    }

    /// `{v0.16b, v1.16b}`; the list wraps from v31 to v0.
    fn vlist(&mut self, first: u32, count: u32, vas: Vas, access: Access) -> &mut Self {
        let mut names = Vec::new();
        for k in 0..count {
            let reg = R::vector(first + k);
            let mut op = Arm64Operand::new(K::Reg(reg), access);
            op.vas = vas;
            self.push_op(op);
            names.push(format!("{}.{}", reg.name(), vas.suffix()));
        }
        self.push_text(format!("{{{}}}", names.join(", ")))
    }
}

/// Vector data processing (`0 Q U 0111 ...`).
pub(super) fn data(w: u32) -> Option<B> {
    if bit(w, 31) || bits(w, 24, 5) != 0b01110 {
        return None;
    }
    let mut b = if bit(w, 21) {
        match bits(w, 10, 2) {
            0b01 | 0b11 => three_same(w)?,
            0b00 => three_different(w)?,
            _ => return None,
        }
    } else if bits(w, 21, 3) == 0 && !bit(w, 15) && bit(w, 10) {
        copy(w)?
    } else {
        return None;
    };
    b.group(G::NEON);
    Some(b)
}

/// Size rules of the integer three-same operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sizes {
    /// Any size; 64-bit lanes only as `2d`
    All,
    /// 8, 16 and 32-bit lanes
    NoD,
    /// 16 and 32-bit lanes
    HS,
    Byte,
}

impl Sizes {
    fn allows(self, size: u32, q: bool) -> bool {
        match self {
            Sizes::All => size != 3 || q,
            Sizes::NoD => size != 3,
            Sizes::HS => size == 1 || size == 2,
            Sizes::Byte => size == 0,
        }
    }
}

fn three_same(w: u32) -> Option<B> {
    let (q, u, size, opcode) = (bit(w, 30), bit(w, 29), bits(w, 22, 2), bits(w, 11, 5));
    if opcode >= 0b11000 {
        return fp_three_same(w);
    }
    if opcode == 0b00011 {
        return logical(w);
    }
    let pick = |s: I, un: I| if u { un } else { s };
    let (id, sizes) = match opcode {
        0b00000 => (pick(I::SHADD, I::UHADD), Sizes::NoD),
        0b00001 => (pick(I::SQADD, I::UQADD), Sizes::All),
        0b00010 => (pick(I::SRHADD, I::URHADD), Sizes::NoD),
        0b00100 => (pick(I::SHSUB, I::UHSUB), Sizes::NoD),
        0b00101 => (pick(I::SQSUB, I::UQSUB), Sizes::All),
        0b00110 => (pick(I::CMGT, I::CMHI), Sizes::All),
        0b00111 => (pick(I::CMGE, I::CMHS), Sizes::All),
        0b01000 => (pick(I::SSHL, I::USHL), Sizes::All),
        0b01001 => (pick(I::SQSHL, I::UQSHL), Sizes::All),
        0b01010 => (pick(I::SRSHL, I::URSHL), Sizes::All),
        0b01011 => (pick(I::SQRSHL, I::UQRSHL), Sizes::All),
        0b01100 => (pick(I::SMAX, I::UMAX), Sizes::NoD),
        0b01101 => (pick(I::SMIN, I::UMIN), Sizes::NoD),
        0b01110 => (pick(I::SABD, I::UABD), Sizes::NoD),
        0b01111 => (pick(I::SABA, I::UABA), Sizes::NoD),
        0b10000 => (pick(I::ADD, I::SUB), Sizes::All),
        0b10001 => (pick(I::CMTST, I::CMEQ), Sizes::All),
        0b10010 => (pick(I::MLA, I::MLS), Sizes::NoD),
        0b10011 if u => (I::PMUL, Sizes::Byte),
        0b10011 => (I::MUL, Sizes::NoD),
        0b10100 => (pick(I::SMAXP, I::UMAXP), Sizes::NoD),
        0b10101 => (pick(I::SMINP, I::UMINP), Sizes::NoD),
        0b10110 => (pick(I::SQDMULH, I::SQRDMULH), Sizes::HS),
        0b10111 if !u => (I::ADDP, Sizes::All),
        _ => return None,
    };
    if !sizes.allows(size, q) {
        return None;
    }
    let dst = if matches!(id, I::SABA | I::UABA | I::MLA | I::MLS) {
        Access::READ | Access::WRITE
    } else {
        Access::WRITE
    };
    let vas = Vas::from_size(size, q);
    let mut b = B::new(id);
    b.vreg(rd(w), vas, dst)
        .vreg(rn(w), vas, Access::READ)
        .vreg(rm(w), vas, Access::READ);
    Some(b)
}

/// Bitwise three-same forms; `size` selects the operation.
fn logical(w: u32) -> Option<B> {
    let (q, u, size) = (bit(w, 30), bit(w, 29), bits(w, 22, 2));
    let vas = if q { Vas::B16 } else { Vas::B8 };
    let id = match (u, size) {
        (false, 0) => I::AND,
        (false, 1) => I::BIC,
        (false, 2) => I::ORR,
        (false, _) => I::ORN,
        (true, 0) => I::EOR,
        (true, 1) => I::BSL,
        (true, 2) => I::BIT,
        (true, _) => I::BIF,
    };
    if id == I::ORR && rn(w) == rm(w) {
        let mut b = B::new(I::MOV);
        b.vreg(rd(w), vas, Access::WRITE).vreg(rn(w), vas, Access::READ);
        return Some(b);
    }
    let dst = if matches!(id, I::BSL | I::BIT | I::BIF) {
        Access::READ | Access::WRITE
    } else {
        Access::WRITE
    };
    let mut b = B::new(id);
    b.vreg(rd(w), vas, dst)
        .vreg(rn(w), vas, Access::READ)
        .vreg(rm(w), vas, Access::READ);
    Some(b)
}

/// Floating-point three-same forms; bit 23 splits each opcode.
fn fp_three_same(w: u32) -> Option<B> {
    let (q, u, a, sz, opcode) = (bit(w, 30), bit(w, 29), bit(w, 23), bit(w, 22), bits(w, 11, 5));
    let vas = match (sz, q) {
        (false, false) => Vas::S2,
        (false, true) => Vas::S4,
        (true, true) => Vas::D2,
        (true, false) => return None,
    };
    let id = match (u, a, opcode) {
        (false, false, 0b11000) => I::FMAXNM,
        (false, true, 0b11000) => I::FMINNM,
        (false, false, 0b11001) => I::FMLA,
        (false, true, 0b11001) => I::FMLS,
        (false, false, 0b11010) => I::FADD,
        (false, true, 0b11010) => I::FSUB,
        (true, false, 0b11010) => I::FADDP,
        (true, true, 0b11010) => I::FABD,
        (false, false, 0b11011) => I::FMULX,
        (true, false, 0b11011) => I::FMUL,
        (false, false, 0b11100) => I::FCMEQ,
        (true, false, 0b11100) => I::FCMGE,
        (true, true, 0b11100) => I::FCMGT,
        (false, false, 0b11110) => I::FMAX,
        (false, true, 0b11110) => I::FMIN,
        (true, false, 0b11110) => I::FMAXP,
        (true, true, 0b11110) => I::FMINP,
        (true, false, 0b11111) => I::FDIV,
        _ => return None,
    };
    let dst = if matches!(id, I::FMLA | I::FMLS) {
        Access::READ | Access::WRITE
    } else {
        Access::WRITE
    };
    let mut b = B::new(id);
    b.vreg(rd(w), vas, dst)
        .vreg(rn(w), vas, Access::READ)
        .vreg(rm(w), vas, Access::READ)
        .group(G::FPARMV8);
    Some(b)
}

/// Which operands of a three-different form use the double-width lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// `vd` wide
    Long,
    /// `vd` and `vn` wide
    Wide,
    /// `vn` and `vm` wide
    Narrow,
}

fn three_different(w: u32) -> Option<B> {
    let (q, u, size, opcode) = (bit(w, 30), bit(w, 29), bits(w, 22, 2), bits(w, 12, 4));
    if size == 3 {
        return None;
    }
    let pick = |s: I, un: I| if u { un } else { s };
    let (id, shape) = match opcode {
        0b0000 => (pick(I::SADDL, I::UADDL), Shape::Long),
        0b0001 => (pick(I::SADDW, I::UADDW), Shape::Wide),
        0b0010 => (pick(I::SSUBL, I::USUBL), Shape::Long),
        0b0011 => (pick(I::SSUBW, I::USUBW), Shape::Wide),
        0b0100 => (pick(I::ADDHN, I::RADDHN), Shape::Narrow),
        0b0101 => (pick(I::SABAL, I::UABAL), Shape::Long),
        0b0110 => (pick(I::SUBHN, I::RSUBHN), Shape::Narrow),
        0b0111 => (pick(I::SABDL, I::UABDL), Shape::Long),
        0b1000 => (pick(I::SMLAL, I::UMLAL), Shape::Long),
        0b1001 if !u => (I::SQDMLAL, Shape::Long),
        0b1010 => (pick(I::SMLSL, I::UMLSL), Shape::Long),
        0b1011 if !u => (I::SQDMLSL, Shape::Long),
        0b1100 => (pick(I::SMULL, I::UMULL), Shape::Long),
        0b1101 if !u => (I::SQDMULL, Shape::Long),
        _ => return None,
    };
    if matches!(id, I::SQDMLAL | I::SQDMLSL | I::SQDMULL) && size == 0 {
        return None;
    }
    let narrow = Vas::from_size(size, q);
    let wide = Vas::from_size(size + 1, true);
    let (vd, vn, vm) = match shape {
        Shape::Long => (wide, narrow, narrow),
        Shape::Wide => (wide, wide, narrow),
        Shape::Narrow => (narrow, wide, wide),
    };
    let accumulate = matches!(
        id,
        I::SABAL | I::UABAL | I::SMLAL | I::UMLAL | I::SMLSL | I::UMLSL | I::SQDMLAL | I::SQDMLSL
    );
    // The upper-half forms, and the narrowing ones that keep the low half of vd
    let dst = if accumulate || (q && shape == Shape::Narrow) {
        Access::READ | Access::WRITE
    } else {
        Access::WRITE
    };
    let mut b = if q {
        B::named(id, format!("{}2", id.name()))
    } else {
        B::new(id)
    };
    b.vreg(rd(w), vd, dst)
        .vreg(rn(w), vn, Access::READ)
        .vreg(rm(w), vm, Access::READ);
    Some(b)
}

/// Element size (log2 bytes) and lane of an `imm5` field.
fn element(imm5: u32) -> Option<(u32, u32)> {
    let size = imm5.trailing_zeros();
    if size > 3 {
        return None;
    }
    Some((size, imm5 >> (size + 1)))
}

/// DUP, INS, SMOV and UMOV.
fn copy(w: u32) -> Option<B> {
    let (q, op, imm5, imm4) = (bit(w, 30), bit(w, 29), bits(w, 16, 5), bits(w, 11, 4));
    let (size, index) = element(imm5)?;
    let elem = Vas::element(size);
    let (d, n) = (rd(w), rn(w));
    let b = match (op, imm4) {
        (false, 0b0000) => {
            if size == 3 && !q {
                return None;
            }
            let mut b = B::new(I::DUP);
            b.vreg(d, Vas::from_size(size, q), Access::WRITE)
                .velem(n, elem, index, Access::READ);
            b
        }
        (false, 0b0001) => {
            if size == 3 && !q {
                return None;
            }
            let mut b = B::new(I::DUP);
            b.vreg(d, Vas::from_size(size, q), Access::WRITE)
                .gpr(n, size == 3, false, Access::READ);
            b
        }
        (false, 0b0011) if q => {
            let mut b = B::new(I::MOV);
            b.velem(d, elem, index, Access::READ | Access::WRITE)
                .gpr(n, size == 3, false, Access::READ);
            b
        }
        (false, 0b0101) => {
            if size == 3 || (size == 2 && !q) {
                return None;
            }
            let mut b = B::new(I::SMOV);
            b.gpr(d, q, false, Access::WRITE)
                .velem(n, elem, index, Access::READ);
            b
        }
        (false, 0b0111) => {
            // 64-bit lanes move to x registers only, narrower ones to w
            if q != (size == 3) {
                return None;
            }
            let id = if size >= 2 { I::MOV } else { I::UMOV };
            let mut b = B::new(id);
            b.gpr(d, q, false, Access::WRITE)
                .velem(n, elem, index, Access::READ);
            b
        }
        (true, _) if q => {
            let mut b = B::new(I::MOV);
            b.velem(d, elem, index, Access::READ | Access::WRITE)
                .velem(n, elem, imm4 >> size, Access::READ);
            b
        }
        _ => return None,
    };
    Some(b)
}

/// LD1-LD4 and ST1-ST4 (multiple structures), with or without post-index.
pub(super) fn structure(w: u32, f: &mut Flags) -> Option<B> {
    let (q, post, load) = (bit(w, 30), bit(w, 23), bit(w, 22));
    if bit(w, 31) || bit(w, 21) || (!post && rm(w) != 0) {
        return None;
    }
    let pick = |ld: I, st: I| if load { ld } else { st };
    let (id, count) = match bits(w, 12, 4) {
        0b0000 => (pick(I::LD4, I::ST4), 4),
        0b0010 => (pick(I::LD1, I::ST1), 4),
        0b0100 => (pick(I::LD3, I::ST3), 3),
        0b0110 => (pick(I::LD1, I::ST1), 3),
        0b0111 => (pick(I::LD1, I::ST1), 1),
        0b1000 => (pick(I::LD2, I::ST2), 2),
        0b1010 => (pick(I::LD1, I::ST1), 2),
        _ => return None,
    };
    let size = bits(w, 10, 2);
    if size == 3 && !q && !matches!(id, I::LD1 | I::ST1) {
        return None;
    }
    let access = if load { Access::WRITE } else { Access::READ };
    let mut b = B::new(id);
    b.vlist(rd(w), count, Vas::from_size(size, q), access)
        .mem_offset(rn(w), 0)
        .group(G::NEON);
    if post {
        f.writeback = true;
        b.writes(&[R::gpr(rn(w), true, true)]);
        match rm(w) {
            31 => b.uimm((count * if q { 16 } else { 8 }) as u64),
            m => b.gpr(m, true, false, Access::READ),
        };
    }
    Some(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(word: u32) -> Option<String> {
        let b = match bits(word, 25, 4) {
            0b0111 => data(word)?,
            _ => structure(word, &mut Flags::default())?,
        };
        Some(format!("{} {}", b.mnemonic, b.op_str()))
    }

    #[rstest]
    #[case(0x4ea2_8420, "add v0.4s, v1.4s, v2.4s")]
    #[case(0x6ee2_8420, "sub v0.2d, v1.2d, v2.2d")]
    #[case(0x4e62_9c20, "mul v0.8h, v1.8h, v2.8h")]
    #[case(0x6ee2_8c20, "cmeq v0.2d, v1.2d, v2.2d")]
    #[case(0x6e22_1c20, "eor v0.16b, v1.16b, v2.16b")]
    #[case(0x0e22_1c20, "and v0.8b, v1.8b, v2.8b")]
    #[case(0x4ea1_1c20, "mov v0.16b, v1.16b")]
    #[case(0x4e22_d420, "fadd v0.4s, v1.4s, v2.4s")]
    #[case(0x6e62_fc20, "fdiv v0.2d, v1.2d, v2.2d")]
    fn test_three_same(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word).as_deref(), Some(expected));
    }

    #[rstest]
    #[case(0x0e62_c020, "smull v0.4s, v1.4h, v2.4h")]
    #[case(0x6e22_0020, "uaddl2 v0.8h, v1.16b, v2.16b")]
    #[case(0x0e22_4020, "addhn v0.8b, v1.8h, v2.8h")]
    #[case(0x0ea2_1020, "saddw v0.2d, v1.2d, v2.2s")]
    fn test_three_different(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word).as_deref(), Some(expected));
    }

    #[rstest]
    #[case(0x4e0c_0420, "dup v0.4s, v1.s[1]")]
    #[case(0x4e04_0c20, "dup v0.4s, w1")]
    #[case(0x0e0c_3c20, "mov w0, v1.s[1]")]
    #[case(0x4e18_3c20, "mov x0, v1.d[1]")]
    #[case(0x0e03_3c20, "umov w0, v1.b[1]")]
    #[case(0x4e0c_1c20, "mov v0.s[1], w1")]
    fn test_element_copy(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word).as_deref(), Some(expected));
    }

    #[rstest]
    #[case(0x4c40_7000, "ld1 {v0.16b}, [x0]")]
    #[case(0x4c9f_a820, "st1 {v0.4s, v1.4s}, [x1], #0x20")]
    #[case(0x0cdf_0be0, "ld4 {v0.2s, v1.2s, v2.2s, v3.2s}, [sp], #0x20")]
    #[case(0x4cc2_a41f, "ld1 {v31.8h, v0.8h}, [x0], x2")]
    fn test_multiple_structures(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word).as_deref(), Some(expected));
    }

    #[rstest]
    // add v0.1d: 64-bit lanes need Q
    #[case(0x0ee2_8420)]
    // mul on 64-bit lanes
    #[case(0x4ee2_9c20)]
    // fadd with sz set and Q clear
    #[case(0x0e62_d420)]
    // smull on 64-bit source lanes
    #[case(0x0ee2_c020)]
    // ld2 {v0.1d, v1.1d}
    #[case(0x0c40_8c00)]
    fn test_reserved_vector_encodings(#[case] word: u32) {
        assert!(text(word).is_none());
    }

    #[test]
    fn test_post_index_sets_writeback() {
        let mut f = Flags::default();
        let b = structure(0x4c9f_a820, &mut f).unwrap();
        assert!(f.writeback);
        assert!(b.regs_write.contains(&R::X1.id()));
        assert_eq!(b.ops.len(), 4);
    }
}
