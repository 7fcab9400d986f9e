//! Transformer configuration as produced by an external loader.
//!
//! [`TransformerConfig`] derives `serde::Deserialize`, so it can be read from YAML or JSON:
//!
//! ```rust
//! use rust_data_masking::config::TransformerConfig;
//!
//! let cfg: TransformerConfig = serde_json::from_str(r#"{
//!     "name": "RandomInteger",
//!     "params": { "column": "salary", "max": 100000 },
//!     "dynamic_params": { "min": { "column": "salary_floor", "default": 0 } },
//!     "seed": 7
//! }"#).unwrap();
//! assert_eq!(cfg.params["max"].as_str(), "100000");
//! assert_eq!(cfg.dynamic_params["min"].column, "salary_floor");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::parameters::{DynamicParamValue, ParamsValue};

/// Configuration of one transformer instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformerConfig {
    /// Registered transformer name, e.g. `DeterministicInteger`.
    pub name: String,
    /// Static parameter values.
    #[serde(default)]
    pub params: BTreeMap<String, ParamsValue>,
    /// Parameters bound to sibling columns.
    #[serde(default)]
    pub dynamic_params: BTreeMap<String, DynamicParamValue>,
    /// Seed for random transformers. Entropy is used when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Hex-encoded salt for deterministic transformers.
    #[serde(default)]
    pub salt: Option<String>,
}

impl TransformerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamsValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_dynamic_param(mut self, name: impl Into<String>, value: DynamicParamValue) -> Self {
        self.dynamic_params.insert(name.into(), value);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }
}
