//! Disassembly strategies

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::config::CrawlConfig;
use crate::image::RawImage;
use crate::memory_map::MemoryMap;
use crate::vectors::EntryPoint;
use crate::{Decoder, Disassembly, DisassemblyError};

pub mod crawl;
pub mod linear;

/// Everything a strategy reads during a run.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub image: &'a RawImage,
    pub decoder: &'a dyn Decoder,
    pub config: &'a CrawlConfig,
    pub memory_map: &'a MemoryMap,
    /// Validated seeds, reset first, then vectors in table order
    pub entry_points: &'a [EntryPoint],
}

/// Available disassembly strategies.
#[derive(Copy, Clone, ValueEnum, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Follow control flow from the reset and vector entry points
    #[default]
    Crawl,
    /// Decode every non-ignored address in order
    Linear,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Crawl => write!(f, "Control-flow crawl"),
            Strategy::Linear => write!(f, "Linear sweep"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crawl" | "recursive" => Ok(Strategy::Crawl),
            "linear" => Ok(Strategy::Linear),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

impl Strategy {
    /// Run the selected strategy over the decode range.
    pub fn run(&self, ctx: &Context<'_>) -> Result<Disassembly, DisassemblyError> {
        match self {
            Strategy::Crawl => crawl::run(ctx),
            Strategy::Linear => linear::run(ctx),
        }
    }

    /// Return all available strategies
    pub fn all() -> &'static [Strategy] {
        &[Strategy::Crawl, Strategy::Linear]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::Crawl.to_string(), "Control-flow crawl");
        assert_eq!(Strategy::Linear.to_string(), "Linear sweep");
        assert_eq!(Strategy::default(), Strategy::Crawl);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("CRAWL".parse::<Strategy>(), Ok(Strategy::Crawl));
        assert_eq!("linear".parse::<Strategy>(), Ok(Strategy::Linear));
        assert!("superset".parse::<Strategy>().is_err());
    }
}
