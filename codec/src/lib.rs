//! The Pure codec.
//!
//! This crate implements:
//!
//!   1. A scanner that classifies raw `.pure` bytes into tokens,
//!      including the context-sensitive group and quantity forms.
//!   2. A schema-directed decoder that binds statements into a
//!      caller-owned [Value](pure_schema::Value) tree, with groups,
//!      sequences, mappings, references, and `%include` processing.
//!   3. An encoder that renders a tree back to source text in schema
//!      declaration order.
//!
//! The decoder is tolerant of unknown tags and strict about types:
//! statements whose tag the schema doesn't declare are skipped, while a
//! literal that can't coerce to its declared kind fails the whole decode
//! with a positional error.

pub mod encoder;
pub mod error;
pub mod loader;
pub mod parser;
pub mod scanner;
pub mod traits;
pub mod utils;

pub use encoder::encode;
pub use error::PureError;
pub use loader::{FileLoader, FsLoader, MemoryLoader};
pub use parser::{decode, decode_with, DecodeOptions, DuplicateKeys};
pub use traits::FromPure;
