use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Severity of a [`ValidationWarning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    /// Informational finding.
    Info,
    /// Non-fatal finding; construction proceeds.
    Warning,
    /// Fatal finding; construction is aborted.
    Error,
}

/// A single configuration finding with structured metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationWarning {
    pub msg: String,
    pub severity: ValidationSeverity,
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl ValidationWarning {
    pub fn new(severity: ValidationSeverity, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            severity,
            meta: BTreeMap::new(),
        }
    }

    /// Shorthand for an error-severity warning.
    pub fn error(msg: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Error, msg)
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Warning, msg)
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == ValidationSeverity::Error
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.severity, self.msg)?;
        if !self.meta.is_empty() {
            let meta = serde_json::to_string(&self.meta).map_err(|_| fmt::Error)?;
            write!(f, " {meta}")?;
        }
        Ok(())
    }
}

/// Collection of [`ValidationWarning`]s.
///
/// The collection is fatal iff it contains an error-severity entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationWarnings(Vec<ValidationWarning>);

impl ValidationWarnings {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, warning: ValidationWarning) {
        self.0.push(warning);
    }

    pub fn extend(&mut self, other: ValidationWarnings) {
        self.0.extend(other.0);
    }

    pub fn is_fatal(&self) -> bool {
        self.0.iter().any(ValidationWarning::is_fatal)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationWarning> {
        self.0.iter()
    }

    /// Emit every entry through `tracing` at a level matching its severity.
    pub fn log(&self, context: &str) {
        for w in &self.0 {
            match w.severity {
                ValidationSeverity::Error => tracing::error!(context, meta = ?w.meta, "{}", w.msg),
                ValidationSeverity::Warning => tracing::warn!(context, meta = ?w.meta, "{}", w.msg),
                ValidationSeverity::Info => tracing::info!(context, meta = ?w.meta, "{}", w.msg),
            }
        }
    }
}

impl From<Vec<ValidationWarning>> for ValidationWarnings {
    fn from(v: Vec<ValidationWarning>) -> Self {
        Self(v)
    }
}

impl IntoIterator for ValidationWarnings {
    type Item = ValidationWarning;
    type IntoIter = std::vec::IntoIter<ValidationWarning>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationWarnings {
    type Item = &'a ValidationWarning;
    type IntoIter = std::slice::Iter<'a, ValidationWarning>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ValidationWarnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, w) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{w}")?;
        }
        Ok(())
    }
}
