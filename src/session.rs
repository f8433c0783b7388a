//! One disassembly run over one image
//!
//! A session owns the image, the static tables and the configuration. It
//! validates them together, derives the entry points once, and then runs any
//! number of strategies and reports over the same inputs.

use std::io::Write;

use crate::config::CrawlConfig;
use crate::decoder::Mcs96Decoder;
use crate::format::{Listing, OutputFormat};
use crate::image::RawImage;
use crate::memory_map::MemoryMap;
use crate::strategy::{Context, Strategy};
use crate::vectors::{EntryOrigin, EntryPoint, VectorTable};
use crate::{Disassembly, DisassemblyError};

pub struct Session {
    image: RawImage,
    config: CrawlConfig,
    memory_map: MemoryMap,
    vectors: VectorTable,
    entry_points: Vec<EntryPoint>,
    decoder: Mcs96Decoder,
}

impl Session {
    /// Session over the 8XC196EA memory map and vector table.
    pub fn new(image: RawImage, config: CrawlConfig) -> Result<Self, DisassemblyError> {
        Self::with_tables(image, config, MemoryMap::default(), VectorTable::default())
    }

    pub fn with_tables(
        image: RawImage,
        config: CrawlConfig,
        memory_map: MemoryMap,
        vectors: VectorTable,
    ) -> Result<Self, DisassemblyError> {
        config.validate()?;
        if image.len() < config.decode_end as usize {
            return Err(DisassemblyError::ImageTooShort {
                expected: config.decode_end as usize,
                actual: image.len(),
            });
        }

        let entry_points = derive_entry_points(&image, &config, &memory_map, &vectors);
        if entry_points.is_empty() {
            return Err(DisassemblyError::NoEntryPoints {
                start: config.decode_start,
                end: config.decode_end,
            });
        }
        log::debug!("Session ready with {} entry points", entry_points.len());

        Ok(Self { image, config, memory_map, vectors, entry_points, decoder: Mcs96Decoder::new() })
    }

    pub fn image(&self) -> &RawImage {
        &self.image
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Validated seeds: reset first, then vectors in table order.
    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    pub fn run(&self, strategy: Strategy) -> Result<Disassembly, DisassemblyError> {
        let ctx = Context {
            image: &self.image,
            decoder: &self.decoder,
            config: &self.config,
            memory_map: &self.memory_map,
            entry_points: &self.entry_points,
        };
        log::info!("Running {} over 0x{:06X}-0x{:06X}", strategy, self.config.decode_start, self.config.decode_end);
        strategy.run(&ctx)
    }

    pub fn listing<'a>(&'a self, disassembly: &'a Disassembly) -> Listing<'a> {
        Listing::new(disassembly, &self.image, &self.config, &self.memory_map, &self.vectors)
    }

    pub fn report(&self, disassembly: &Disassembly, format: OutputFormat) -> Result<String, DisassemblyError> {
        let listing = self.listing(disassembly);
        format.get_formatter().format(&listing)
    }

    pub fn write_report(
        &self,
        disassembly: &Disassembly,
        format: OutputFormat,
        mut out: impl Write,
    ) -> Result<(), DisassemblyError> {
        let report = self.report(disassembly, format)?;
        out.write_all(report.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

fn derive_entry_points(
    image: &RawImage,
    config: &CrawlConfig,
    memory_map: &MemoryMap,
    vectors: &VectorTable,
) -> Vec<EntryPoint> {
    let mut candidates = vec![EntryPoint { address: config.reset_address, origin: EntryOrigin::Reset }];
    for vector in vectors.vectors() {
        match VectorTable::entry_point(image, vector.vector_address, config.vector_base) {
            Some(address) => candidates.push(EntryPoint { address, origin: EntryOrigin::Vector(*vector) }),
            None => log::warn!(
                "Vector 0x{:06X} ({}) lies outside the image",
                vector.vector_address,
                vector.source_name
            ),
        }
    }

    let mut entry_points: Vec<EntryPoint> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !config.in_decode_range(candidate.address) || memory_map.is_ignored(candidate.address) {
            log::warn!("Dropping entry point {} outside the decode range", candidate.label());
            continue;
        }
        if !entry_points.contains(&candidate) {
            entry_points.push(candidate);
        }
    }
    entry_points
}
