//! `rust-data-masking` is a pluggable column-value masking engine for row-oriented data.
//!
//! Transformers replace the values of one or more columns of a [`types::Record`] with synthetic
//! values. Each transformer is declared once in a [`transformers::TransformerRegistry`] together
//! with its parameter definitions, then instantiated from a [`config::TransformerConfig`] against
//! a [`types::Schema`]. Parameter values are validated up front; problems are reported as
//! [`parameters::ValidationWarnings`], and any error-severity warning aborts construction.
//!
//! ## What is built in
//!
//! - **`RandomInteger`**: random integers within `[min, max]`, seeded or from OS entropy
//! - **`DeterministicInteger`**: the same input always maps to the same output for a given salt
//!
//! Bounds default to the full range of the column's integer width (`int2`, `int4`, `int8`). They
//! can be fixed in configuration or read per row from sibling columns (dynamic parameters).
//!
//! ## Quick example
//!
//! ```rust
//! use rust_data_masking::config::TransformerConfig;
//! use rust_data_masking::parameters::DynamicParamValue;
//! use rust_data_masking::transformers::TransformerRegistry;
//! use rust_data_masking::types::{Column, Oid, Record, Schema};
//!
//! # fn main() -> Result<(), rust_data_masking::MaskingError> {
//! let schema = Schema::new(vec![
//!     Column::new(0, "salary", "int4", Oid::INT4, 4),
//!     Column::new(1, "floor", "int4", Oid::INT4, 4),
//! ]);
//! let registry = TransformerRegistry::with_builtin()?;
//!
//! let config = TransformerConfig::new("RandomInteger")
//!     .with_param("column", "salary")
//!     .with_param("max", "100000")
//!     .with_dynamic_param("min", DynamicParamValue::new("floor"))
//!     .with_seed(1);
//! let (masker, warnings) = registry.instantiate(&config, &schema)?;
//! assert!(!warnings.is_fatal());
//!
//! let mut row = Record::from_text([Some("52000"), Some("30000")]);
//! masker.transform(&mut row)?;
//! let salary: i64 = row.values()[0].as_text().unwrap().parse().unwrap();
//! assert!((30_000..=100_000).contains(&salary));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: columns, schemas, raw values, records and datasets
//! - [`parameters`]: parameter definitions, resolution, validation warnings
//! - [`generators`]: random and keyed-hash byte generators, [`generators::HashReducer`]
//! - [`transformers`]: the [`transformers::Transformer`] trait, limiter, integer transformer, registry
//! - [`config`]: serde-friendly transformer configuration
//! - [`processing`]: sequential pipelines over a dataset
//! - [`execution`]: parallel, throttled pipelines with cancellation and metrics
//! - [`error`]: the crate-wide error type

pub mod config;
pub mod error;
pub mod execution;
pub mod generators;
pub mod parameters;
pub mod processing;
pub mod transformers;
pub mod types;

pub use error::{MaskingError, MaskingResult};
