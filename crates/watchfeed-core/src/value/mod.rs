
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Value
///
/// Scalar cell carried by result rows, cursors and loosely typed request
/// fields. Deserializes from JSON `null`, integers and strings.
///

#[derive(
    Clone, Debug, Default, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(untagged)]
pub enum Value {
    #[default]
    #[display("NULL")]
    Null,

    #[display("{_0}")]
    Int(i64),

    #[display("{_0}")]
    Text(String),
}

impl Value {
    /// Tolerant integer view.
    ///
    /// Text is read up to the first non-digit after an optional sign, so
    /// `"10; DROP"` yields `10`. Out-of-range prefixes saturate. Text without
    /// a numeric prefix yields `None`.
    #[must_use]
    pub fn coerce_int(&self) -> Option<i64> {
        match self {
            Self::Null => None,
            Self::Int(value) => Some(*value),
            Self::Text(text) => leading_int(text),
        }
    }

    /// Strict integer view: integers, or text that is entirely a decimal integer.
    #[must_use]
    pub fn exact_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Null => None,
        }
    }

    /// Textual form for cursor fields; `None` for `Null`.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Int(value) => Some(value.to_string()),
            Self::Text(text) => Some(text.clone()),
        }
    }
}

fn leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();

    if digits == 0 {
        return None;
    }

    let literal = &trimmed[..sign_len + digits];

    // digits only, so a failed parse is an out-of-range magnitude
    Some(literal.parse().unwrap_or(if literal.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
