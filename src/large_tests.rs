#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;
    use rstest::rstest;

    use crate::arch::mips::{MipsOperand, MipsReg};
    use crate::decoder::decoder_for;
    use crate::error::ErrorCode;
    use crate::{Access, Address, Arch, Insn, Mode, Session, SkipData};

    /// A mode every architecture accepts, used by the cross-architecture
    /// properties.
    fn base_mode(arch: Arch) -> Mode {
        match arch {
            Arch::X86 => Mode::MODE_64,
            Arch::Mips | Arch::Ppc => Mode::MODE_32 | Mode::BIG_ENDIAN,
            Arch::Sparc | Arch::Sysz => Mode::BIG_ENDIAN,
            _ => Mode::LITTLE_ENDIAN,
        }
    }

    fn arch_and_mode() -> impl Strategy<Value = (Arch, Mode)> {
        prop_oneof![
            Just((Arch::X86, Mode::MODE_16)),
            Just((Arch::X86, Mode::MODE_32)),
            Just((Arch::X86, Mode::MODE_64)),
            Just((Arch::Arm, Mode::ARM)),
            Just((Arch::Arm, Mode::THUMB)),
            Just((Arch::Arm, Mode::THUMB | Mode::BIG_ENDIAN)),
            Just((Arch::Arm64, Mode::LITTLE_ENDIAN)),
            Just((Arch::Mips, Mode::MODE_32 | Mode::BIG_ENDIAN)),
            Just((Arch::Mips, Mode::MODE_64)),
            Just((Arch::Ppc, Mode::MODE_64 | Mode::BIG_ENDIAN)),
            Just((Arch::Sparc, Mode::BIG_ENDIAN | Mode::V9)),
            Just((Arch::Sysz, Mode::BIG_ENDIAN)),
            Just((Arch::Xcore, Mode::LITTLE_ENDIAN)),
        ]
    }

    /// Outcome reduced to something comparable.
    fn outcome(res: crate::Result<Vec<Insn>>) -> Result<Vec<Insn>, ErrorCode> {
        res.map_err(|e| e.code())
    }

    fn check_layout(code: &[u8], address: Address, insns: &[Insn]) {
        let mut offset = 0usize;
        for insn in insns {
            assert!(insn.size > 0);
            assert_eq!(insn.address, address.wrapping_add(offset as Address));
            assert_eq!(insn.bytes(), &code[offset..offset + insn.size as usize]);
            offset += insn.size as usize;
        }
        assert!(offset <= code.len());
    }

    #[rstest]
    #[case(Arch::Arm, Mode::ARM, &[0xed, 0xff, 0xff, 0xeb], "bl", "#0xfbc")]
    #[case(Arch::Arm, Mode::ARM, &[0x1e, 0xff, 0x2f, 0xe1], "bx", "lr")]
    #[case(Arch::Arm, Mode::THUMB, &[0x70, 0x47], "bx", "lr")]
    #[case(Arch::Arm64, Mode::LITTLE_ENDIAN, &[0xc0, 0x03, 0x5f, 0xd6], "ret", "")]
    #[case(Arch::X86, Mode::MODE_64, &[0x55], "push", "rbp")]
    #[case(Arch::Mips, Mode::MODE_32 | Mode::BIG_ENDIAN, &[0x24, 0x02, 0x00, 0x0c], "addiu", "$v0, $zero, 0xc")]
    #[case(Arch::Mips, Mode::MODE_32, &[0x0c, 0x00, 0x02, 0x24], "addiu", "$v0, $zero, 0xc")]
    #[case(Arch::Ppc, Mode::MODE_32 | Mode::BIG_ENDIAN, &[0x7c, 0x08, 0x02, 0xa6], "mflr", "r0")]
    #[case(Arch::Sparc, Mode::BIG_ENDIAN, &[0x9d, 0xe3, 0xbf, 0xa0], "save", "%sp, -0x60, %sp")]
    #[case(Arch::Sysz, Mode::BIG_ENDIAN, &[0x07, 0xfe], "br", "%r14")]
    #[case(Arch::Xcore, Mode::LITTLE_ENDIAN, &[0x06, 0x10], "add", "r0, r1, r2")]
    fn test_first_instruction(
        #[case] arch: Arch,
        #[case] mode: Mode,
        #[case] code: &[u8],
        #[case] mnemonic: &str,
        #[case] op_str: &str,
    ) {
        let mut cs = Session::open(arch, mode).unwrap();
        let insns = cs.disassemble(code, 0x1000, Some(1)).unwrap();
        assert_eq!(insns.len(), 1);
        assert_eq!(insns[0].mnemonic, mnemonic);
        assert_eq!(insns[0].op_str, op_str);
        assert_eq!(insns[0].address, 0x1000);
        assert_eq!(insns[0].size as usize, code.len());
    }

    /// `(address, size, "mnemonic op_str")` for every instruction of `code`.
    fn listing(arch: Arch, mode: Mode, code: &[u8], address: Address) -> Vec<(Address, u16, String)> {
        let mut cs = Session::open(arch, mode).unwrap();
        cs.disassemble(code, address, None)
            .unwrap()
            .iter()
            .map(|i| {
                let text = if i.op_str.is_empty() {
                    i.mnemonic.clone()
                } else {
                    format!("{} {}", i.mnemonic, i.op_str)
                };
                (i.address, i.size, text)
            })
            .collect()
    }

    #[rstest]
    #[case::sysz(
        Arch::Sysz,
        Mode::BIG_ENDIAN,
        &[
            0xed, 0x00, 0x00, 0x00, 0x00, 0x1a, 0x5a, 0x0f, 0x1f, 0xff, 0xc2, 0x09, 0x80, 0x00,
            0x00, 0x00, 0x07, 0xf7, 0xeb, 0x2a, 0xff, 0xff, 0x7f, 0x57, 0xe3, 0x01, 0xff, 0xff,
            0x7f, 0x57, 0xeb, 0x00, 0xf0, 0x00, 0x00, 0x24, 0xb2, 0x4f, 0x00, 0x78, 0xec, 0x18,
            0x00, 0x00, 0xc1, 0x7f,
        ],
        &[
            (0x1000, 6, "adb %f0, 0"),
            (0x1006, 4, "a %r0, 0xfff(%r15, %r1)"),
            (0x100a, 6, "afi %r0, -0x80000000"),
            (0x1010, 2, "br %r7"),
            (0x1012, 6, "xiy 0x7ffff(%r15), 0x2a"),
            (0x1018, 6, "xy %r0, 0x7ffff(%r1, %r15)"),
            (0x101e, 6, "stmg %r0, %r0, 0(%r15)"),
            (0x1024, 4, "ear %r7, %a8"),
            (0x1028, 6, "clije %r1, 0xc1, 0x1028"),
        ],
    )]
    #[case::xcore(
        Arch::Xcore,
        Mode::LITTLE_ENDIAN,
        &[
            0xfe, 0x0f, 0xfe, 0x17, 0x13, 0x17, 0xc6, 0xfe, 0xec, 0x17, 0x97, 0xf8, 0xec, 0x4f,
            0x1f, 0xfd, 0xec, 0x37, 0x07, 0xf2, 0x45, 0x5b, 0xf9, 0xfa, 0x02, 0x06, 0x1b, 0x10,
            0x09, 0xfd, 0xec, 0xa7,
        ],
        &[
            (0x1000, 2, "get r11, ed"),
            (0x1002, 2, "ldw et, sp[4]"),
            (0x1004, 2, "setd res[r3], r4"),
            (0x1006, 4, "init t[r2]:lr, r1"),
            (0x100a, 4, "divu r9, r1, r3"),
            (0x100e, 4, "lda16 r9, r3[-r11]"),
            (0x1012, 4, "ldw dp, dp[0x81c5]"),
            (0x1016, 4, "lmul r11, r0, r2, r5, r8, r10"),
            (0x101a, 2, "add r1, r2, r3"),
            (0x101c, 4, "ldaw r8, r2[-9]"),
        ],
    )]
    #[case::arm64(
        Arch::Arm64,
        Mode::LITTLE_ENDIAN,
        &[
            0xfd, 0x7b, 0xbf, 0xa9, 0x20, 0x84, 0xa2, 0x4e, 0x00, 0x70, 0x40, 0x4c, 0x20, 0xa8,
            0x9f, 0x4c, 0xc0, 0x03, 0x5f, 0xd6,
        ],
        &[
            (0x1000, 4, "stp x29, x30, [sp, #-0x10]!"),
            (0x1004, 4, "add v0.4s, v1.4s, v2.4s"),
            (0x1008, 4, "ld1 {v0.16b}, [x0]"),
            (0x100c, 4, "st1 {v0.4s, v1.4s}, [x1], #0x20"),
            (0x1010, 4, "ret"),
        ],
    )]
    #[case::x86_64(
        Arch::X86,
        Mode::MODE_64,
        &[0x55, 0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00, 0xf0, 0x01, 0x18, 0xf2, 0xc3],
        &[
            (0x1000, 1, "push rbp"),
            (0x1001, 7, "mov rax, qword ptr [rip + 0x13b8]"),
            (0x1008, 3, "lock add dword ptr [rax], ebx"),
            (0x100b, 2, "bnd ret"),
        ],
    )]
    fn test_reference_listing(
        #[case] arch: Arch,
        #[case] mode: Mode,
        #[case] code: &[u8],
        #[case] rows: &[(Address, u16, &str)],
    ) {
        let want: Vec<_> = rows.iter().map(|&(a, s, t)| (a, s, t.to_string())).collect();
        assert_eq!(listing(arch, mode, code, 0x1000), want);
    }

    #[test]
    fn test_x86_two_instruction_scenario() {
        let mut cs = Session::open(Arch::X86, Mode::MODE_64).unwrap();
        let lite = cs
            .disassemble_lite(&[0x55, 0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00], 0x1000, None)
            .unwrap();
        let got: Vec<_> = lite
            .iter()
            .map(|i| (i.address, i.size, i.mnemonic.as_str(), i.op_str.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (0x1000, 1, "push", "rbp"),
                (0x1001, 7, "mov", "rax, qword ptr [rip + 0x13b8]"),
            ]
        );
    }

    #[test]
    fn test_mips_scenario_detail() {
        let mut cs = Session::open(Arch::Mips, Mode::MODE_32 | Mode::BIG_ENDIAN).unwrap();
        cs.set_detail(true).unwrap();
        let insns = cs.disassemble(&[0x24, 0x02, 0x00, 0x0c], 0x1008, None).unwrap();
        let detail = insns[0].detail.as_ref().unwrap();
        assert_eq!(
            detail.arch.mips().unwrap().operands,
            vec![
                MipsOperand::reg(MipsReg::V0, Access::WRITE),
                MipsOperand::reg(MipsReg::ZERO, Access::READ),
                MipsOperand::imm(12),
            ]
        );
    }

    #[test]
    fn test_mode_change_between_calls() {
        let mut cs = Session::open(Arch::Arm, Mode::ARM).unwrap();
        let arm = cs.disassemble(&[0x1e, 0xff, 0x2f, 0xe1], 0, None).unwrap();
        cs.set_mode(Mode::THUMB).unwrap();
        let thumb = cs.disassemble(&[0x70, 0x47], 0, None).unwrap();
        assert_eq!(arm[0].size, 4);
        assert_eq!(thumb[0].size, 2);
        assert_eq!(arm[0].to_string(), thumb[0].to_string());
    }

    #[test]
    fn test_register_names_unique() {
        for &arch in Arch::all() {
            let d = decoder_for(arch);
            let mut seen = HashSet::new();
            let mut id = 1u16;
            while !d.reg_name(id).is_empty() {
                assert!(seen.insert(d.reg_name(id)), "{arch}: duplicate {}", d.reg_name(id));
                id += 1;
            }
            assert!(seen.len() > 10, "{arch}: only {} registers", seen.len());
            assert_eq!(d.reg_name(0), "");
            assert_eq!(d.insn_name(u16::MAX), "");
            assert_eq!(d.group_name(u16::MAX), "");
        }
    }

    proptest! {
        #[test]
        fn prop_decoding_is_deterministic(
            (arch, mode) in arch_and_mode(),
            code in proptest::collection::vec(any::<u8>(), 0..64),
            address in any::<u32>(),
        ) {
            let mut cs = Session::open(arch, mode).unwrap();
            cs.set_detail(true).unwrap();
            let first = outcome(cs.disassemble(&code, address as Address, None));
            let second = outcome(cs.disassemble(&code, address as Address, None));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_layout_follows_input(
            (arch, mode) in arch_and_mode(),
            code in proptest::collection::vec(any::<u8>(), 0..96),
            address in any::<u64>(),
        ) {
            let mut cs = Session::open(arch, mode).unwrap();
            match cs.disassemble(&code, address, None) {
                Ok(insns) => {
                    check_layout(&code, address, &insns);
                    prop_assert!(insns.iter().all(|i| i.detail.is_none()));
                    if code.is_empty() {
                        prop_assert!(insns.is_empty());
                    }
                }
                Err(e) => prop_assert_eq!(e.code(), ErrorCode::DisassemblyFailed),
            }
        }

        #[test]
        fn prop_detail_is_homogeneous(
            (arch, mode) in arch_and_mode(),
            code in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            let mut cs = Session::open(arch, mode).unwrap();
            cs.set_detail(true).unwrap();
            if let Ok(insns) = cs.disassemble(&code, 0x4000, None) {
                for insn in &insns {
                    let detail = insn.detail.as_ref().unwrap();
                    prop_assert_eq!(detail.arch.arch(), arch);
                    prop_assert_eq!(detail.op_count(), detail.arch.op_types().len());
                }
            }
        }

        #[test]
        fn prop_skipdata_covers_whole_buffer(
            (arch, mode) in arch_and_mode(),
            code in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            let mut cs = Session::open(arch, mode).unwrap();
            cs.set_detail(true).unwrap();
            cs.set_skipdata(Some(SkipData::new().with_callback(|_, _| 1))).unwrap();
            let insns = cs.disassemble(&code, 0, None).unwrap();
            check_layout(&code, 0, &insns);
            let total: usize = insns.iter().map(|i| i.size as usize).sum();
            prop_assert_eq!(total, code.len());
            for insn in &insns {
                prop_assert_eq!(insn.is_skipdata(), insn.detail.is_none());
            }
        }

        #[test]
        fn prop_lite_matches_full(
            (arch, mode) in arch_and_mode(),
            code in proptest::collection::vec(any::<u8>(), 0..64),
            count in 0usize..8,
        ) {
            let mut cs = Session::open(arch, mode).unwrap();
            let full = cs.disassemble(&code, 0x1000, Some(count)).map(|v| {
                v.iter().map(Insn::to_lite).collect::<Vec<_>>()
            });
            let lite = cs.disassemble_lite(&code, 0x1000, Some(count));
            match (full, lite) {
                (Ok(full), Ok(lite)) => {
                    prop_assert_eq!(&full, &lite);
                    if count > 0 {
                        prop_assert!(lite.len() <= count);
                    }
                }
                (Err(a), Err(b)) => prop_assert_eq!(a.code(), b.code()),
                _ => prop_assert!(false, "full and lite disagree"),
            }
        }

        #[test]
        fn prop_iter_matches_disassemble(
            code in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            for &arch in Arch::all() {
                let mut cs = Session::open(arch, base_mode(arch)).unwrap();
                let all = cs.disassemble(&code, 0, None).unwrap_or_default();
                let lazy: Vec<Insn> = cs.disasm_iter(&code, 0).unwrap().collect();
                prop_assert_eq!(all, lazy);
            }
        }
    }
}
