use crate::error::PureError;
use pure_schema::Value;

/// Conversion from a decoded [Value] tree into a typed host structure.
/// We require `Sized` so that `Self` can be constructed.
pub trait FromPure: Sized {
    fn from_pure(value: &Value) -> Result<Self, PureError>;
}
