use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::env;
use std::fmt;
use std::path::Path;

lazy_static! {
    static ref QUANTITY_VALUE: Regex = Regex::new(r"(\d+(\.\d+)?)").unwrap();
    static ref QUANTITY_UNIT:  Regex = Regex::new(r"([a-zA-Z_-]+[@#%/^.0-9]*)+").unwrap();
}

/// A numeric value with an attached unit suffix, e.g. `10GB` or `2.5ms`.
///
/// The literal text is stored verbatim at bind time; the numeric and unit
/// substrings are extracted on demand and are never validated during
/// decoding.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct Quantity {
    text: String,
}

impl Quantity {
    pub fn new(text: impl Into<String>) -> Quantity {
        Quantity { text: text.into() }
    }

    /// The verbatim source text, number and unit included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The numeric substring of the quantity, or `""` if none matches.
    pub fn value(&self) -> &str {
        QUANTITY_VALUE
            .find(&self.text)
            .map(|m| m.as_str())
            .unwrap_or("")
    }

    /// The unit substring of the quantity, or `""` if none matches.
    pub fn unit(&self) -> &str {
        QUANTITY_UNIT
            .find(&self.text)
            .map(|m| m.as_str())
            .unwrap_or("")
    }
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Quantity({})", self.text)
    }
}

/// A filesystem path literal, e.g. `./assets/fonts` or `/etc/app.pure`.
///
/// Decomposition is delegated to [`std::path::Path`] and computed on
/// demand; nothing is checked against the actual filesystem.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathValue {
    text: String,
}

impl PathValue {
    pub fn new(text: impl Into<String>) -> PathValue {
        PathValue { text: text.into() }
    }

    /// The verbatim source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The directory portion of the path, or `""` if there is none.
    pub fn directory(&self) -> &str {
        Path::new(&self.text)
            .parent()
            .and_then(|p| p.to_str())
            .unwrap_or("")
    }

    /// The final path component, or `""` for an empty or root path.
    pub fn base(&self) -> &str {
        Path::new(&self.text)
            .file_name()
            .and_then(|p| p.to_str())
            .unwrap_or("")
    }

    /// The file extension without the leading dot, or `""`.
    pub fn extension(&self) -> &str {
        Path::new(&self.text)
            .extension()
            .and_then(|p| p.to_str())
            .unwrap_or("")
    }

    /// The volume prefix, e.g. `C:` on Windows paths. Empty on paths
    /// without one.
    pub fn volume(&self) -> &str {
        match self.text.find(':') {
            Some(i) if i == 1 => &self.text[..2],
            _ => "",
        }
    }
}

impl fmt::Debug for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Path({})", self.text)
    }
}

/// An environment variable reference, e.g. `$HOME` or `${APP_ROOT}`.
///
/// Expansion against the live process environment happens only when
/// [`expand`](EnvRef::expand) is called, never during decoding.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvRef {
    text: String,
}

impl EnvRef {
    pub fn new(text: impl Into<String>) -> EnvRef {
        EnvRef { text: text.into() }
    }

    /// The verbatim source text, `$` and braces included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The referenced variable name with `$` and `{}` stripped.
    pub fn name(&self) -> &str {
        self.text
            .trim_start_matches('$')
            .trim_start_matches('{')
            .trim_end_matches('}')
    }

    /// Looks the variable up in the process environment. Returns `""`
    /// when the variable is unset, mirroring shell expansion.
    pub fn expand(&self) -> String {
        env::var(self.name()).unwrap_or_default()
    }
}

impl fmt::Debug for EnvRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Env({})", self.text)
    }
}
