//! Error types for conversion ports.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by conversion port implementations.
///
/// The default converter is total and never returns these; ports backed by
/// an external serializer can.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConversionError {
    /// The port failed to parse markdown into a block tree.
    #[error("failed to parse markdown: {0}")]
    Parse(String),

    /// The port failed to serialize a block tree to markdown.
    #[error("failed to serialize block tree: {0}")]
    Serialize(String),
}
