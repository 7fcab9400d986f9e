//! Column transformers and their registry.
//!
//! Every transformer implements [`Transformer`]: it reports the columns it may write, has
//! `init`/`done` lifecycle hooks around a batch, and rewrites one [`Record`] per
//! [`Transformer::transform`] call. Instances are built through a [`TransformerRegistry`] from a
//! [`crate::config::TransformerConfig`].
//!
//! ## Example
//!
//! ```rust
//! use rust_data_masking::config::TransformerConfig;
//! use rust_data_masking::transformers::TransformerRegistry;
//! use rust_data_masking::types::{Column, Oid, Record, Schema};
//!
//! let schema = Schema::new(vec![Column::new(0, "age", "int2", Oid::INT2, 2)]);
//! let registry = TransformerRegistry::with_builtin().unwrap();
//!
//! let config = TransformerConfig::new("DeterministicInteger")
//!     .with_param("column", "age")
//!     .with_param("min", "18")
//!     .with_param("max", "90")
//!     .with_salt("0badc0de");
//! let (t, warnings) = registry.instantiate(&config, &schema).unwrap();
//! assert!(warnings.is_empty());
//!
//! let mut row = Record::from_text([Some("42")]);
//! t.transform(&mut row).unwrap();
//! let age: i64 = row.values()[0].as_text().unwrap().parse().unwrap();
//! assert!((18..=90).contains(&age));
//! ```

mod int64;
mod integer;
mod limiter;
mod registry;

use std::collections::BTreeMap;

use crate::error::MaskingResult;
use crate::generators::Generator;
use crate::parameters::{Parameters, ValidationWarnings};
use crate::types::{Record, Schema};

pub use int64::{Int64Transformer, INT64_GENERATOR_LENGTH};
pub use integer::{
    integer_parameters, new_integer_transformer, register_integer_transformers, IntegerTransformer,
    INTEGER_TRANSFORMER_DESCRIPTION, INTEGER_TRANSFORMER_NAME,
};
pub use limiter::{
    dynamic_int_limiter, limit_is_valid, threshold_warning, validate_int_limits, Int64Limiter, IntWidth,
};
pub use registry::{
    register_random_and_deterministic, TransformerDefinition, TransformerProperties, TransformerRegistry,
};

/// Column indices a transformer may write, with their names.
pub type AffectedColumns = BTreeMap<usize, String>;

/// A configured transformation of one or more columns.
///
/// Implementations hold configuration only, so one instance can be shared by threads that each
/// process a different record.
pub trait Transformer: Send + Sync {
    /// Registered name of the transformer, e.g. `RandomInteger`.
    fn name(&self) -> &str;

    fn affected_columns(&self) -> &AffectedColumns;

    /// Called once before a batch of records.
    fn init(&mut self) -> MaskingResult<()> {
        Ok(())
    }

    /// Transforms `record` in place. On error the affected columns are left unchanged.
    fn transform(&self, record: &mut Record) -> MaskingResult<()>;

    /// Called once after a batch of records.
    fn done(&mut self) -> MaskingResult<()> {
        Ok(())
    }
}

/// Everything a transformer constructor receives.
pub struct TransformerContext<'a> {
    pub name: &'a str,
    pub schema: &'a Schema,
    pub parameters: Parameters,
    pub generator: Box<dyn Generator>,
}

/// Constructor stored in the registry.
///
/// Returns the transformer with its non-fatal validation warnings. Fatal findings are returned as
/// [`crate::MaskingError::FatalValidation`].
pub type NewTransformerFn =
    fn(TransformerContext<'_>) -> MaskingResult<(Box<dyn Transformer>, ValidationWarnings)>;
