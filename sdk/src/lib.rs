//! pure
//!
//! This crate is the front door for working with Pure documents.
//!
//! - `decode`/`encode` entry points (re-exported from the codec)
//! - `Schema`/`Field`/`Value` building blocks and the wrapper scalars
//! - `FromPure` trait for typed host structures
//!
//! ```
//! use pure::{decode, Field, Kind, Schema};
//!
//! let schema = Schema::new(vec![
//!     Field::new("name", Kind::String),
//!     Field::new("age", Kind::Int),
//! ]);
//! let mut root = schema.default_value();
//! decode(b"name = \"Ada\"\nage = 36\n", &schema, &mut root).unwrap();
//!
//! assert_eq!(root.get("name").unwrap().as_str(), "Ada");
//! assert_eq!(root.get("age").unwrap().as_int(), 36);
//! ```

pub use pure_codec::encoder::encode;
pub use pure_codec::error::PureError;
pub use pure_codec::loader::{FileLoader, FsLoader, MemoryLoader};
pub use pure_codec::parser::{decode, decode_with, DecodeOptions, DuplicateKeys};
pub use pure_codec::traits::FromPure;
pub use pure_schema::{EnvRef, Field, Kind, PathValue, Quantity, Schema, Value};

pub mod traits {
    pub use pure_codec::traits::FromPure;
}

pub mod error {
    pub use pure_codec::error::PureError;
}

pub mod schema {
    pub use pure_schema::{EnvRef, Field, Kind, PathValue, Quantity, Schema, Value};
}
