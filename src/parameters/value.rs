use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Raw textual value of a configured parameter.
///
/// Deserializes from strings, numbers and booleans alike, so `min: 10` and `min: "10"` are the
/// same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ParamsValue(String);

impl ParamsValue {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ParamsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParamsValue {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParamsValue {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for ParamsValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Literal {
            Str(String),
            Int(i64),
            UInt(u64),
            Float(f64),
            Bool(bool),
        }

        Ok(match Literal::deserialize(deserializer)? {
            Literal::Str(s) => Self(s),
            Literal::Int(v) => Self(v.to_string()),
            Literal::UInt(v) => Self(v.to_string()),
            Literal::Float(v) => Self(v.to_string()),
            Literal::Bool(v) => Self(v.to_string()),
        })
    }
}

/// Binding of a parameter to a sibling column, read on every row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicParamValue {
    /// Name of the column supplying the value.
    pub column: String,
    /// Value used when the sibling column is NULL.
    #[serde(default)]
    pub default: Option<ParamsValue>,
}

impl DynamicParamValue {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<ParamsValue>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Types a parameter can be scanned into.
pub trait ScanValue: Sized {
    /// Human-readable destination type, used in error messages.
    const TYPE_NAME: &'static str;

    fn scan_bytes(raw: &[u8]) -> Result<Self, String>;
}

fn utf8(raw: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(raw).map_err(|e| format!("invalid utf-8: {e}"))
}

macro_rules! scan_from_str {
    ($($t:ty => $name:literal),* $(,)?) => {
        $(
            impl ScanValue for $t {
                const TYPE_NAME: &'static str = $name;

                fn scan_bytes(raw: &[u8]) -> Result<Self, String> {
                    let text = utf8(raw)?.trim();
                    text.parse::<$t>()
                        .map_err(|e| format!("cannot parse '{text}' as {}: {e}", $name))
                }
            }
        )*
    };
}

scan_from_str!(
    i16 => "int2",
    i32 => "int4",
    i64 => "int8",
    u64 => "unsigned integer",
    f64 => "float8",
);

impl ScanValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn scan_bytes(raw: &[u8]) -> Result<Self, String> {
        match utf8(raw)?.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Ok(true),
            "false" | "f" | "no" | "n" | "0" => Ok(false),
            other => Err(format!("cannot parse '{other}' as bool")),
        }
    }
}

impl ScanValue for String {
    const TYPE_NAME: &'static str = "text";

    fn scan_bytes(raw: &[u8]) -> Result<Self, String> {
        utf8(raw).map(str::to_string)
    }
}
