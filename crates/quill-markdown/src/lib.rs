//! Block tree model and markdown conversion.
//!
//! This crate provides:
//! - `Block`: the structured representation edited by the rich surface
//! - `ConversionPort`: the async capability converting blocks to and from
//!   markdown text
//! - `MarkdownConverter`: the default pulldown-cmark backed implementation
//!
//! Conversion is lossy in both directions by contract. A round trip is not
//! guaranteed to reproduce the input exactly, but a second parse/serialize
//! cycle over the first cycle's output is stable.

mod block;
mod error;
mod parser;
mod port;
mod writer;

pub use block::Block;
pub use error::ConversionError;
pub use parser::parse_markdown;
pub use port::{ConversionPort, MarkdownConverter, clean_text};
pub use writer::blocks_to_markdown;
