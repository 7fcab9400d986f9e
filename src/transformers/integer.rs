//! Integer column transformer.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{MaskingError, MaskingResult};
use crate::parameters::{
    ColumnProperties, DynamicModeProperties, ParameterDefinition, Parameterizer, ValidationWarnings,
};
use crate::types::{RawValue, Record};

use super::int64::{Int64Transformer, INT64_GENERATOR_LENGTH};
use super::limiter::{dynamic_int_limiter, threshold_warning, validate_int_limits, Int64Limiter, IntWidth};
use super::registry::{register_random_and_deterministic, TransformerRegistry};
use super::{AffectedColumns, Transformer, TransformerContext};

pub const INTEGER_TRANSFORMER_NAME: &str = "Integer";
pub const INTEGER_TRANSFORMER_DESCRIPTION: &str = "Generate integer value in min and max thresholds";

const INT_TYPES: [&str; 3] = ["int2", "int4", "int8"];

/// Parameter definitions of the integer transformer.
pub fn integer_parameters() -> Vec<ParameterDefinition> {
    vec![
        ParameterDefinition::new("column", "column name")
            .with_column(
                ColumnProperties::new()
                    .with_affected(true)
                    .with_allowed_types(INT_TYPES),
            )
            .with_required(true),
        ParameterDefinition::new("min", "min int value threshold")
            .with_link_parameter("column")
            .with_dynamic_mode(DynamicModeProperties::new().with_compatible_types(INT_TYPES)),
        ParameterDefinition::new("max", "max int value threshold")
            .with_link_parameter("column")
            .with_dynamic_mode(DynamicModeProperties::new().with_compatible_types(INT_TYPES)),
        ParameterDefinition::new(
            "keep_null",
            "indicates that NULL values must not be replaced with transformed values",
        )
        .with_default_value("true"),
    ]
}

/// Registers `RandomInteger` and `DeterministicInteger`.
pub fn register_integer_transformers(registry: &mut TransformerRegistry) -> MaskingResult<()> {
    register_random_and_deterministic(
        registry,
        INTEGER_TRANSFORMER_NAME,
        INTEGER_TRANSFORMER_DESCRIPTION,
        new_integer_transformer,
        integer_parameters(),
        INT64_GENERATOR_LENGTH,
    )
}

/// Constructor registered for the integer transformer.
pub fn new_integer_transformer(
    ctx: TransformerContext<'_>,
) -> MaskingResult<(Box<dyn Transformer>, ValidationWarnings)> {
    let (t, warnings) = IntegerTransformer::new(ctx)?;
    Ok((Box::new(t), warnings))
}

/// Source of one threshold in dynamic mode.
#[derive(Debug)]
enum Bound {
    Fixed(i64),
    Dynamic(Parameterizer),
}

impl Bound {
    fn resolve(&self, record: &Record) -> MaskingResult<i64> {
        match self {
            Self::Fixed(v) => Ok(*v),
            Self::Dynamic(p) => p.scan_record(record),
        }
    }
}

#[derive(Debug)]
enum LimitMode {
    Static(Int64Limiter),
    Dynamic { min: Bound, max: Bound },
}

/// Replaces an integer column with a generated value inside `[min, max]`.
///
/// With static thresholds the limiter is built once at construction. When `min` or `max` is bound
/// to a sibling column, the transformer runs in dynamic mode and builds a fresh limiter per row.
pub struct IntegerTransformer {
    name: String,
    column_idx: usize,
    keep_null: bool,
    width: IntWidth,
    affected_columns: AffectedColumns,
    mode: LimitMode,
    t: Int64Transformer,
}

impl IntegerTransformer {
    /// Builds the transformer, or fails with [`MaskingError::FatalValidation`] when thresholds are
    /// outside the column's width.
    pub fn new(ctx: TransformerContext<'_>) -> MaskingResult<(Self, ValidationWarnings)> {
        let TransformerContext {
            name,
            schema,
            mut parameters,
            generator,
        } = ctx;

        let column_name: String = parameters.get("column")?.scan()?;
        let (column_idx, column) = schema
            .column_by_name(&column_name)
            .ok_or_else(|| MaskingError::UnknownColumn(column_name.clone()))?;
        let width = IntWidth::from_length(column.length)?;
        let keep_null: bool = parameters.get("keep_null")?.scan()?;

        let min_param = parameters.take("min")?;
        let max_param = parameters.take("max")?;
        let dynamic_mode = min_param.is_dynamic() || max_param.is_dynamic();

        let mut warnings = ValidationWarnings::new();
        let mode = if dynamic_mode {
            let min = bound(min_param, width, &mut warnings)?;
            let max = bound(max_param, width, &mut warnings)?;
            LimitMode::Dynamic { min, max }
        } else {
            let min = min_param.scan_opt::<i64>()?.unwrap_or(0);
            let max = max_param.scan_opt::<i64>()?.unwrap_or(0);
            let (limiter, limit_warnings) = validate_int_limits(width, min, max)?;
            warnings.extend(limit_warnings);
            match limiter {
                Some(l) => LimitMode::Static(l),
                None => return Err(MaskingError::FatalValidation(warnings)),
            }
        };
        if warnings.is_fatal() {
            return Err(MaskingError::FatalValidation(warnings));
        }

        let t = Int64Transformer::new(generator)?;

        debug!(
            transformer = name,
            column = %column_name,
            column_idx,
            %width,
            keep_null,
            dynamic_mode,
            "integer transformer initialized"
        );

        Ok((
            Self {
                name: name.to_string(),
                affected_columns: BTreeMap::from([(column_idx, column_name)]),
                column_idx,
                keep_null,
                width,
                mode,
                t,
            },
            warnings,
        ))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.mode, LimitMode::Dynamic { .. })
    }

    /// The construction-time limiter, `None` in dynamic mode.
    pub fn static_limiter(&self) -> Option<&Int64Limiter> {
        match &self.mode {
            LimitMode::Static(l) => Some(l),
            LimitMode::Dynamic { .. } => None,
        }
    }

    fn limiter_for(&self, record: &Record) -> MaskingResult<Int64Limiter> {
        match &self.mode {
            LimitMode::Static(l) => Ok(*l),
            LimitMode::Dynamic { min, max } => {
                let min = min.resolve(record)?;
                let max = max.resolve(record)?;
                dynamic_int_limiter(self.width, min, max)
            }
        }
    }
}

fn bound(p: Parameterizer, width: IntWidth, warnings: &mut ValidationWarnings) -> MaskingResult<Bound> {
    if p.is_dynamic() {
        return Ok(Bound::Dynamic(p));
    }
    let v = p.scan_opt::<i64>()?.unwrap_or(0);
    if let Some(w) = threshold_warning(width, p.name(), v) {
        warnings.push(w);
    }
    Ok(Bound::Fixed(v))
}

impl Transformer for IntegerTransformer {
    fn name(&self) -> &str {
        &self.name
    }

    fn affected_columns(&self) -> &AffectedColumns {
        &self.affected_columns
    }

    fn transform(&self, record: &mut Record) -> MaskingResult<()> {
        let val = record.get_raw_column_value_by_idx(self.column_idx)?;
        if val.is_null && self.keep_null {
            return Ok(());
        }
        let limiter = self.limiter_for(record)?;
        let res = self.t.transform(&val.data, &limiter)?;
        record.set_raw_column_value_by_idx(self.column_idx, RawValue::new(res, false))
    }
}
