//! This is the data model for the Pure configuration language: the
//! per-target [Schema] declaring how source identifiers bind to fields,
//! the dynamic [Value] tree the decoder mutates, and the three wrapper
//! scalars ([Quantity], [PathValue], [EnvRef]) that hold their source
//! text verbatim.
//!
//! ```
//! use pure_schema::*;
//!
//! let schema = Schema::new(vec![
//!     Field::new("name", Kind::String),
//!     Field::new("age", Kind::Int),
//! ]);
//!
//! let target = schema.default_value();
//! assert_eq!(target.get("age"), Some(&Value::Int(0)));
//! ```

pub mod scalar;
pub mod schema;
pub mod value;

pub use scalar::*;
pub use schema::*;
pub use value::*;
