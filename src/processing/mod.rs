//! Sequential masking pipelines.
//!
//! The processing layer applies an ordered list of [`crate::transformers::Transformer`]s to
//! in-memory [`crate::types::DataSet`] values. It is the single-threaded counterpart of
//! [`crate::execution::ExecutionEngine`], which reuses the per-record helpers below.
//!
//! Currently implemented:
//!
//! - [`check_affected_columns()`]: rejects pipelines where two transformers write one column
//! - [`transform_record()`]: applies a pipeline to a copy of one record
//! - [`transform_dataset()`]: lifecycle-aware masking of a whole dataset
//!
//! ## Example
//!
//! ```rust
//! use rust_data_masking::config::TransformerConfig;
//! use rust_data_masking::processing::{transform_dataset, CancellationToken};
//! use rust_data_masking::transformers::TransformerRegistry;
//! use rust_data_masking::types::{Column, DataSet, Oid, Record, Schema};
//!
//! let schema = Schema::new(vec![
//!     Column::new(0, "id", "int4", Oid::INT4, 4),
//!     Column::new(1, "score", "int2", Oid::INT2, 2),
//! ]);
//! let ds = DataSet::new(
//!     schema.clone(),
//!     vec![
//!         Record::from_text([Some("1"), Some("7")]),
//!         Record::from_text([Some("2"), None]),
//!     ],
//! );
//!
//! let registry = TransformerRegistry::with_builtin().unwrap();
//! let config = TransformerConfig::new("RandomInteger")
//!     .with_param("column", "score")
//!     .with_param("min", "1")
//!     .with_param("max", "10")
//!     .with_seed(42);
//! let (t, _warnings) = registry.instantiate(&config, &schema).unwrap();
//!
//! let mut pipeline = vec![t];
//! let out = transform_dataset(&ds, &mut pipeline, &CancellationToken::new()).unwrap();
//!
//! // NULL is kept by default, ids are untouched.
//! let scores = out.column_text("score").unwrap();
//! assert_eq!(scores[1], None);
//! assert_eq!(out.column_text("id").unwrap(), ds.column_text("id").unwrap());
//! ```

mod cancel;
pub mod pipeline;
pub mod record;

pub use cancel::CancellationToken;
pub use pipeline::transform_dataset;
pub use record::{check_affected_columns, transform_record};
