//! Output format module implementation

mod csv;
mod json;
pub mod listing;
mod text;

pub use self::listing::{Entry, Gap, GapKind, Listing};

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::DisassemblyError;

/// Supported output formats for disassembly results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Annotated assembly listing (default)
    #[default]
    Text,
    /// JSON document with instructions, gaps and reference tables
    Json,
    /// CSV format, one row per instruction
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl OutputFormat {
    /// Get all available output formats
    pub fn available_formats() -> &'static [Self] {
        &[OutputFormat::Text, OutputFormat::Json, OutputFormat::Csv]
    }

    /// Get a formatter for this output format
    pub fn get_formatter(&self) -> Box<dyn DisassemblyFormatter> {
        match self {
            OutputFormat::Text => Box::new(TextFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::Csv => Box::new(CsvFormatter),
        }
    }
}

/// Formatter trait for disassembly output
pub trait DisassemblyFormatter {
    /// Render a prepared listing. Only serialization failures are errors.
    fn format(&self, listing: &Listing<'_>) -> Result<String, DisassemblyError>;
}

/// Annotated listing with banners, gap dumps and reference sections
pub struct TextFormatter;

/// Format disassembly in JSON
pub struct JsonFormatter;

/// Format disassembly in CSV
pub struct CsvFormatter;

/// Space-separated upper-case hex bytes.
pub(crate) fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
