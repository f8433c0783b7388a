#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Instant;

    use crate::{
        config::CrawlConfig,
        decoder::Mcs96Decoder,
        format::{Entry, GapKind, Listing, OutputFormat},
        image::{RawImage, IMAGE_SIZE},
        memory_map::{MemoryMap, MemoryRegion},
        session::Session,
        state::Status,
        strategy::Strategy,
        vectors::{InterruptVector, ServiceKind, VectorTable},
        Address, Decoder, Disassembly, Instruction, RefKind,
    };

    const RESET: Address = 0x172080;

    // Helper: full-size image of `filler` with code patched in
    fn build_image(filler: u8, code: &[(Address, &[u8])]) -> RawImage {
        let mut bytes = vec![filler; IMAGE_SIZE];
        for (address, chunk) in code {
            let at = *address as usize;
            bytes[at..at + chunk.len()].copy_from_slice(chunk);
        }
        RawImage::from_bytes(bytes)
    }

    // Helper: deterministic pseudo-random image
    fn noise_image(seed: u32) -> RawImage {
        let mut state = seed;
        let bytes = (0..IMAGE_SIZE)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (state >> 16) as u8
            })
            .collect();
        RawImage::from_bytes(bytes)
    }

    fn reset_only(image: RawImage) -> Session {
        Session::with_tables(image, CrawlConfig::default(), MemoryMap::default(), VectorTable::empty())
            .expect("session")
    }

    fn assert_partition(listing: &Listing<'_>) {
        let config = listing.config;
        let mut cursor = config.decode_start;
        for entry in &listing.entries {
            let (start, end) = match entry {
                Entry::Instruction(idx) => {
                    let insn = &listing.instructions[*idx];
                    (insn.address, insn.end())
                }
                Entry::Gap(gap) => {
                    if gap.kind == GapKind::Uncrawled {
                        assert!(!listing.memory_map.is_ignored(gap.start), "gap at 0x{:06X}", gap.start);
                        assert!(!listing.memory_map.is_ignored(gap.end - 1), "gap at 0x{:06X}", gap.start);
                    }
                    (gap.start, gap.end)
                }
            };
            assert_eq!(start, cursor, "partition hole or overlap at 0x{:06X}", cursor);
            cursor = end;
        }
        assert_eq!(cursor, config.decode_end);
    }

    fn assert_no_overlap(disassembly: &Disassembly) {
        let mut instructions: Vec<_> = disassembly.instructions.iter().collect();
        instructions.sort_by_key(|insn| insn.address);
        for pair in instructions.windows(2) {
            assert!(
                pair[0].end() <= pair[1].address,
                "0x{:06X} overlaps 0x{:06X}",
                pair[0].address,
                pair[1].address
            );
        }
    }

    fn assert_references_consistent(disassembly: &Disassembly) {
        let xrefs = &disassembly.xrefs;
        let by_address: BTreeMap<Address, &Instruction> =
            disassembly.instructions.iter().map(|insn| (insn.address, insn)).collect();
        for (target, refs) in xrefs.subroutines() {
            for r in refs {
                assert_eq!(r.kind, RefKind::Call);
                assert_eq!(r.target, *target);
                let origin = by_address.get(&r.origin).expect("caller decoded");
                assert!(origin.calls.contains(r));
            }
        }
        for (target, refs) in xrefs.jump_targets() {
            for r in refs {
                assert_eq!(r.target, *target);
                let origin = by_address.get(&r.origin).expect("jumper decoded");
                assert!(origin.jumps.contains(r));
            }
        }
        for insn in &disassembly.instructions {
            for r in &insn.calls {
                assert!(xrefs.callers_of(r.target).contains(r));
            }
            for r in &insn.jumps {
                assert!(xrefs.jumpers_into(r.target).contains(r));
            }
            for r in &insn.xrefs {
                assert!(xrefs.xrefs_to(r.target).contains(r));
            }
        }
    }

    #[test]
    fn test_lone_ret() {
        let session = reset_only(build_image(0xEE, &[(RESET, &[0xF0])]));
        let disassembly = session.run(Strategy::Crawl).unwrap();

        assert_eq!(disassembly.instruction_count(), 1);
        assert_eq!(disassembly.stats.decode_errors, 0);
        assert_eq!(disassembly.stats.paths, 1);
        assert_eq!(disassembly.stats.seeds_added, 0);

        let listing = session.listing(&disassembly);
        assert_partition(&listing);
        // Everything but the RET and the internal RAM mirror
        assert_eq!(listing.uncrawled_bytes(), 0x80000 - 1 - 0xC00);

        let report = session.report(&disassembly, OutputFormat::Text).unwrap();
        assert!(report.contains("RESET_0x172080 [RESET VECTOR]"));
        assert!(report.contains("Instructions decoded:      1"));
    }

    #[test]
    fn test_unconditional_jump_continues_path() {
        // LJMP 0x172200 over unknown opcodes
        let session = reset_only(build_image(0xEE, &[(RESET, &[0xE7, 0x7D, 0x01]), (0x172200, &[0xF0])]));
        let disassembly = session.run(Strategy::Crawl).unwrap();

        let addresses: Vec<_> = disassembly.instructions.iter().map(|i| i.address).collect();
        assert_eq!(addresses, [RESET, 0x172200]);
        assert_eq!(disassembly.stats.paths, 1);
        assert_eq!(disassembly.stats.decode_errors, 0);
        assert_eq!(disassembly.xrefs.jumpers_into(0x172200)[0].origin, RESET);
        assert_eq!(disassembly.state.status(RESET + 3), Some(Status::Unvisited));

        let report = session.report(&disassembly, OutputFormat::Text).unwrap();
        assert!(report.contains("JUMP_0x172200"));
    }

    #[test]
    fn test_unknown_opcode_at_entry() {
        let session = reset_only(build_image(0x00, &[(RESET, &[0xEE])]));
        let disassembly = session.run(Strategy::Crawl).unwrap();

        assert_eq!(disassembly.instruction_count(), 0);
        assert_eq!(disassembly.stats.decode_errors, 1);
        assert_eq!(disassembly.state.status(RESET), Some(Status::DecodeError));

        let report = session.report(&disassembly, OutputFormat::Text).unwrap();
        assert!(report.contains("Decode errors:             1"));
    }

    #[test]
    fn test_compare_then_jne_renders_not_equal() {
        // CMP R1C, R20; JNE 0x172086; RET; RET
        let session = reset_only(build_image(
            0xEE,
            &[(RESET, &[0x88, 0x20, 0x1C, 0xD7, 0x01, 0xF0, 0xF0])],
        ));
        let disassembly = session.run(Strategy::Crawl).unwrap();
        assert_eq!(disassembly.instruction_count(), 4);
        // Raw decode keeps the provisional operator
        assert_eq!(disassembly.instruction_at(RESET).unwrap().pseudocode, "if (R1C == R20)");

        let report = session.report(&disassembly, OutputFormat::Text).unwrap();
        assert!(report.contains("if (R1C != R20)"));
        assert!(!report.contains("if (R1C == R20)"));
    }

    #[test]
    fn test_ignored_regions_never_reported_as_gaps() {
        let map = MemoryMap::new(vec![
            MemoryRegion::new("Code", "Code", 0x100000, 0x16FFFF, false),
            MemoryRegion::new("Mirror A", "First mirror", 0x170000, 0x1703FF, true),
            MemoryRegion::new("Code", "Code", 0x170400, 0x174FFF, false),
            MemoryRegion::new("Mirror B", "Second mirror", 0x175000, 0x175FFF, true),
            MemoryRegion::new("Code", "Code", 0x176000, 0x17FFFF, false),
        ]);
        let image = build_image(0xEE, &[(RESET, &[0xF0])]);
        let session = Session::with_tables(image, CrawlConfig::default(), map, VectorTable::empty()).unwrap();

        for strategy in Strategy::all() {
            let disassembly = session.run(*strategy).unwrap();
            let listing = session.listing(&disassembly);
            assert_partition(&listing);

            let ignored: Vec<_> = listing
                .gaps()
                .filter(|gap| gap.kind == GapKind::Ignored)
                .map(|gap| (gap.start, gap.end))
                .collect();
            assert_eq!(ignored, [(0x170000, 0x170400), (0x175000, 0x176000)]);
            assert!(disassembly
                .instructions
                .iter()
                .all(|insn| !listing.memory_map.is_ignored(insn.address)));

            let report = session.report(&disassembly, OutputFormat::Text).unwrap();
            assert!(report.contains(" ** SKIPPING 1024 BYTES"));
            assert!(report.contains(" ** SKIPPING 4096 BYTES"));
            assert!(!report.contains("UNCRAWLED 0x170000"));
            assert!(!report.contains("UNCRAWLED 0x175000"));
        }
    }

    #[test]
    fn test_vector_entry_derivation() {
        let image = build_image(0xEE, &[(0x172000, &[0x80, 0x20]), (RESET, &[0xF0])]);
        assert_eq!(VectorTable::entry_point(&image, 0x172000, 0x170000), Some(RESET));

        let vectors = VectorTable::new(vec![InterruptVector::new(
            0x172000,
            "SIO0 Transmit",
            "TI0",
            ServiceKind::InterruptController,
        )]);
        let session = Session::with_tables(image, CrawlConfig::default(), MemoryMap::default(), vectors).unwrap();
        assert_eq!(session.entry_points().len(), 2);

        let disassembly = session.run(Strategy::Crawl).unwrap();
        assert!(disassembly.xrefs.is_vector_entry(RESET));
        let report = session.report(&disassembly, OutputFormat::Text).unwrap();
        assert!(report.contains("INT_0x172080"));
    }

    #[test]
    fn test_noise_image_properties() {
        let session = Session::new(noise_image(0xC196), CrawlConfig::default()).unwrap();

        for strategy in Strategy::all() {
            let start = Instant::now();
            let disassembly = session.run(*strategy).unwrap();
            println!(
                "{}: {} instructions, {} decode errors in {:?}",
                strategy,
                disassembly.instruction_count(),
                disassembly.stats.decode_errors,
                start.elapsed()
            );

            assert!(disassembly.instruction_count() <= session.config().decode_len());
            assert_no_overlap(&disassembly);
            assert_references_consistent(&disassembly);
            assert_partition(&session.listing(&disassembly));
        }
    }

    #[test]
    fn test_runs_are_deterministic() {
        let session = Session::new(noise_image(0x8096), CrawlConfig::default()).unwrap();

        for strategy in Strategy::all() {
            let first = session.run(*strategy).unwrap();
            let second = session.run(*strategy).unwrap();
            assert_eq!(first.instructions, second.instructions);
            assert_eq!(first.state, second.state);
            assert_eq!(first.xrefs, second.xrefs);
            assert_eq!(
                session.report(&first, OutputFormat::Json).unwrap(),
                session.report(&second, OutputFormat::Json).unwrap()
            );
        }
    }

    #[test]
    fn test_decoder_is_pure() {
        let image = noise_image(0x196);
        let decoder = Mcs96Decoder::new();
        for address in (0x100000..0x100400).step_by(7) {
            let window = image.window(address, 0x180000);
            assert_eq!(
                format!("{:?}", decoder.decode(window, address)),
                format!("{:?}", decoder.decode(window, address))
            );
        }
    }
}
