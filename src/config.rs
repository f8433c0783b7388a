//! Crawl configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Address, DisassemblyError};

/// Tunables for one disassembly run. Missing JSON fields take the 8XC196EA defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// First decodable address
    pub decode_start: Address,
    /// End of the decode range (exclusive)
    pub decode_end: Address,
    /// Address fetched after reset
    pub reset_address: Address,
    /// Added to every vector word to form the routine address
    pub vector_base: Address,
    /// Seed the address after each RET/RST/indirect jump once all other seeds are exhausted
    pub fallback_seeding: bool,
    /// Maximum bytes hex-dumped per uncrawled gap in the text report
    pub gap_dump_limit: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            decode_start: 0x100000,
            decode_end: 0x180000,
            reset_address: 0x172080,
            vector_base: 0x170000,
            fallback_seeding: false,
            gap_dump_limit: 64,
        }
    }
}

impl CrawlConfig {
    pub fn from_json_str(json: &str) -> Result<Self, DisassemblyError> {
        let config: CrawlConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DisassemblyError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks internal consistency; image size is checked by the session.
    pub fn validate(&self) -> Result<(), DisassemblyError> {
        if self.decode_start >= self.decode_end {
            return Err(DisassemblyError::Configuration(format!(
                "empty decode range 0x{:06X}-0x{:06X}",
                self.decode_start, self.decode_end
            )));
        }
        if self.decode_end > 0x100_0000 {
            return Err(DisassemblyError::Configuration(format!(
                "decode end 0x{:X} exceeds the 24-bit address space",
                self.decode_end
            )));
        }
        Ok(())
    }

    pub fn in_decode_range(&self, address: Address) -> bool {
        self.decode_start <= address && address < self.decode_end
    }

    pub fn decode_len(&self) -> usize {
        (self.decode_end - self.decode_start) as usize
    }
}
