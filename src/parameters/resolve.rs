//! Binding configured parameter values to their definitions against live schema metadata.

use std::collections::BTreeMap;

use crate::error::{MaskingError, MaskingResult};
use crate::types::{Column, Schema};

use super::definition::ParameterDefinition;
use super::parameterizer::{DynamicParameter, Parameterizer, StaticParameter};
use super::validation::{ValidationWarning, ValidationWarnings};
use super::value::{DynamicParamValue, ParamsValue, ScanValue};

/// Resolved parameters of one transformer instance, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(BTreeMap<String, Parameterizer>);

impl Parameters {
    pub fn get(&self, name: &str) -> MaskingResult<&Parameterizer> {
        self.0
            .get(name)
            .ok_or_else(|| MaskingError::MissingParameter(name.to_string()))
    }

    /// Removes and returns a parameter, so the caller can own it.
    pub fn take(&mut self, name: &str) -> MaskingResult<Parameterizer> {
        self.0
            .remove(name)
            .ok_or_else(|| MaskingError::MissingParameter(name.to_string()))
    }

    pub fn insert(&mut self, p: Parameterizer) {
        self.0.insert(p.name().to_string(), p);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolves every definition into a [`Parameterizer`].
///
/// Hard configuration errors (missing required values, unparsable literals, unknown columns) are
/// returned as `Err`. Softer findings such as type mismatches are collected into the returned
/// [`ValidationWarnings`]; callers must not build a transformer when that collection is fatal.
pub fn resolve_parameters(
    definitions: &[ParameterDefinition],
    params: &BTreeMap<String, ParamsValue>,
    dynamic_params: &BTreeMap<String, DynamicParamValue>,
    schema: &Schema,
) -> MaskingResult<(Parameters, ValidationWarnings)> {
    let mut warnings = ValidationWarnings::new();

    for name in params.keys().chain(dynamic_params.keys()) {
        if !definitions.iter().any(|d| &d.name == name) {
            warnings.push(
                ValidationWarning::error("parameter is not defined by the transformer")
                    .with_meta("ParameterName", name.as_str()),
            );
        }
    }
    for name in params.keys().filter(|n| dynamic_params.contains_key(*n)) {
        warnings.push(
            ValidationWarning::error("parameter has both a static and a dynamic value")
                .with_meta("ParameterName", name.as_str()),
        );
    }

    // Column parameters first: linked parameters need their column resolved.
    let ordered = definitions
        .iter()
        .filter(|d| d.is_column())
        .chain(definitions.iter().filter(|d| !d.is_column()));

    let mut resolved = Parameters::default();
    let mut columns: BTreeMap<&str, &Column> = BTreeMap::new();

    for def in ordered {
        let linked = match &def.link_parameter {
            Some(link) => linked_column(def, link, definitions, &columns)?,
            None => None,
        };

        if let Some(dynamic) = dynamic_params.get(&def.name) {
            let Some(mode) = &def.dynamic_mode else {
                warnings.push(
                    ValidationWarning::error("parameter does not support dynamic mode")
                        .with_meta("ParameterName", def.name.as_str()),
                );
                continue;
            };
            let (idx, column) = schema
                .column_by_name(&dynamic.column)
                .ok_or_else(|| MaskingError::UnknownColumn(dynamic.column.clone()))?;
            if !mode.compatible_types.is_empty() && !column.matches_any_type(&mode.compatible_types) {
                warnings.push(
                    ValidationWarning::error("dynamic parameter column type is not compatible")
                        .with_meta("ParameterName", def.name.as_str())
                        .with_meta("ColumnName", column.name.as_str())
                        .with_meta("ColumnType", column.effective_type_name())
                        .with_meta("CompatibleTypes", mode.compatible_types.clone()),
                );
            }
            match &dynamic.default {
                Some(default) => check_literal(&def.name, default, linked)?,
                None if !column.not_null => warnings.push(
                    ValidationWarning::warning(
                        "dynamic parameter column is nullable and has no default value",
                    )
                    .with_meta("ParameterName", def.name.as_str())
                    .with_meta("ColumnName", column.name.as_str()),
                ),
                None => {}
            }
            resolved.insert(Parameterizer::Dynamic(DynamicParameter {
                name: def.name.clone(),
                column_name: column.name.clone(),
                column_idx: idx,
                default: dynamic.default.clone(),
            }));
            continue;
        }

        let value = params.get(&def.name).or(def.default_value.as_ref()).cloned();
        match &value {
            None if def.required => return Err(MaskingError::MissingParameter(def.name.clone())),
            None => {}
            Some(v) => {
                if let Some(props) = &def.column_properties {
                    let column = resolve_column(def, v, &props.allowed_types, schema, &mut warnings)?;
                    columns.insert(def.name.as_str(), column);
                }
                check_literal(&def.name, v, linked)?;
            }
        }
        resolved.insert(Parameterizer::Static(StaticParameter {
            name: def.name.clone(),
            value,
        }));
    }

    if !warnings.is_empty() {
        warnings.log("parameters");
    }
    Ok((resolved, warnings))
}

fn resolve_column<'s>(
    def: &ParameterDefinition,
    value: &ParamsValue,
    allowed_types: &[String],
    schema: &'s Schema,
    warnings: &mut ValidationWarnings,
) -> MaskingResult<&'s Column> {
    let (_, column) = schema
        .column_by_name(value.as_str())
        .ok_or_else(|| MaskingError::UnknownColumn(value.to_string()))?;
    if !allowed_types.is_empty() && !column.matches_any_type(allowed_types) {
        warnings.push(
            ValidationWarning::error("unsupported column type")
                .with_meta("ParameterName", def.name.as_str())
                .with_meta("ColumnName", column.name.as_str())
                .with_meta("ColumnType", column.effective_type_name())
                .with_meta("AllowedTypes", allowed_types.to_vec()),
        );
    }
    Ok(column)
}

fn linked_column<'s>(
    def: &ParameterDefinition,
    link: &str,
    definitions: &[ParameterDefinition],
    columns: &BTreeMap<&str, &'s Column>,
) -> MaskingResult<Option<&'s Column>> {
    if !definitions.iter().any(|d| d.name == link && d.is_column()) {
        return Err(MaskingError::parameter(
            &def.name,
            format!("linked parameter '{link}' is not a column parameter"),
        ));
    }
    // An unset optional column parameter leaves nothing to check against.
    Ok(columns.get(link).copied())
}

/// Ensures a literal decodes as the linked column's type.
///
/// Without a type override, a declared name such as `integer` falls back to the canonical one.
fn check_literal(name: &str, value: &ParamsValue, column: Option<&Column>) -> MaskingResult<()> {
    let Some(column) = column else {
        return Ok(());
    };
    let raw = value.as_bytes();
    let res = decode_as(column.effective_type_name(), raw)
        .or_else(|| {
            column
                .overridden_type_name
                .is_none()
                .then(|| decode_as(&column.canonical_type_name, raw))
                .flatten()
        })
        .unwrap_or(Ok(()));
    res.map_err(|message| MaskingError::parameter(name, message))
}

/// `None` for types whose literals are not checked.
fn decode_as(type_name: &str, raw: &[u8]) -> Option<Result<(), String>> {
    match type_name {
        // Width limits are enforced later by the limiter, which reports them as warnings.
        "int2" | "int4" | "int8" => Some(i64::scan_bytes(raw).map(drop)),
        "float4" | "float8" | "numeric" => Some(f64::scan_bytes(raw).map(drop)),
        "bool" => Some(bool::scan_bytes(raw).map(drop)),
        _ => None,
    }
}
