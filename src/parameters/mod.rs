//! Parameter description and validation framework.
//!
//! A transformer declares its configuration inputs as [`ParameterDefinition`]s. At construction
//! time [`resolve_parameters`] binds user-supplied values to those definitions against the live
//! [`crate::types::Schema`], producing one [`Parameterizer`] per definition plus any
//! [`ValidationWarnings`]:
//!
//! - static parameters are fixed literals (or defaults), decoded with [`Parameterizer::scan`]
//! - dynamic parameters are bound to a sibling column and decoded per row with
//!   [`Parameterizer::scan_record`]
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use rust_data_masking::parameters::{resolve_parameters, DynamicParamValue, ParameterDefinition,
//!     ColumnProperties, DynamicModeProperties, ParamsValue};
//! use rust_data_masking::types::{Column, Oid, Record, Schema};
//!
//! let schema = Schema::new(vec![
//!     Column::new(0, "salary", "int4", Oid::INT4, 4),
//!     Column::new(1, "floor", "int4", Oid::INT4, 4),
//! ]);
//! let defs = vec![
//!     ParameterDefinition::new("column", "column name")
//!         .with_column(ColumnProperties::new().with_affected(true))
//!         .with_required(true),
//!     ParameterDefinition::new("min", "lower bound")
//!         .with_dynamic_mode(DynamicModeProperties::new().with_compatible_types(["int4"])),
//! ];
//! let params = BTreeMap::from([("column".to_string(), ParamsValue::from("salary"))]);
//! let dynamic = BTreeMap::from([("min".to_string(), DynamicParamValue::new("floor"))]);
//!
//! let (resolved, warnings) = resolve_parameters(&defs, &params, &dynamic, &schema).unwrap();
//! assert!(!warnings.is_fatal());
//!
//! let min = resolved.get("min").unwrap();
//! assert!(min.is_dynamic());
//! let row = Record::from_text([Some("5000"), Some("1200")]);
//! assert_eq!(min.scan_record::<i64>(&row).unwrap(), 1200);
//! ```

mod definition;
mod parameterizer;
mod resolve;
mod validation;
mod value;

pub use definition::{ColumnProperties, DynamicModeProperties, ParameterDefinition};
pub use parameterizer::{DynamicParameter, Parameterizer, StaticParameter};
pub use resolve::{resolve_parameters, Parameters};
pub use validation::{ValidationSeverity, ValidationWarning, ValidationWarnings};
pub use value::{DynamicParamValue, ParamsValue, ScanValue};
