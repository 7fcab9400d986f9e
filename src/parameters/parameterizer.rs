use crate::error::{MaskingError, MaskingResult};
use crate::types::Record;

use super::value::{ParamsValue, ScanValue};

/// A parameter fixed at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticParameter {
    pub name: String,
    pub value: Option<ParamsValue>,
}

/// A parameter read from a sibling column of every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicParameter {
    pub name: String,
    pub column_name: String,
    pub column_idx: usize,
    pub default: Option<ParamsValue>,
}

/// A resolved, bound parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameterizer {
    Static(StaticParameter),
    Dynamic(DynamicParameter),
}

impl Parameterizer {
    pub fn name(&self) -> &str {
        match self {
            Self::Static(p) => &p.name,
            Self::Dynamic(p) => &p.name,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }

    /// `true` for a static parameter with neither a configured value nor a default.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Static(StaticParameter { value: None, .. }))
    }

    /// Decodes a static parameter.
    ///
    /// Fails for dynamic parameters, which need a record (see [`Self::scan_record`]), and for
    /// empty static parameters.
    pub fn scan<T: ScanValue>(&self) -> MaskingResult<T> {
        self.scan_opt()?
            .ok_or_else(|| MaskingError::parameter(self.name(), "parameter does not have a value"))
    }

    /// Like [`Self::scan`], but an empty static parameter yields `None`.
    pub fn scan_opt<T: ScanValue>(&self) -> MaskingResult<Option<T>> {
        match self {
            Self::Static(p) => p
                .value
                .as_ref()
                .map(|v| decode(&p.name, v.as_bytes()))
                .transpose(),
            Self::Dynamic(p) => Err(MaskingError::parameter(
                &p.name,
                format!(
                    "dynamic parameter bound to column '{}' cannot be scanned without a record",
                    p.column_name
                ),
            )),
        }
    }

    /// Decodes the parameter for one record.
    ///
    /// Static parameters ignore the record. Dynamic parameters read the bound column, falling back
    /// to the configured default when it is NULL.
    pub fn scan_record<T: ScanValue>(&self, record: &Record) -> MaskingResult<T> {
        match self {
            Self::Static(_) => self.scan(),
            Self::Dynamic(p) => {
                let raw = record.get_raw_column_value_by_idx(p.column_idx)?;
                if !raw.is_null {
                    return decode(&p.name, &raw.data);
                }
                match &p.default {
                    Some(default) => decode(&p.name, default.as_bytes()),
                    None => Err(MaskingError::parameter(
                        &p.name,
                        format!(
                            "column '{}' is NULL and no default value is configured",
                            p.column_name
                        ),
                    )),
                }
            }
        }
    }
}

fn decode<T: ScanValue>(name: &str, raw: &[u8]) -> MaskingResult<T> {
    T::scan_bytes(raw).map_err(|message| MaskingError::parameter(name, message))
}

#[cfg(test)]
mod tests {
    use super::{DynamicParameter, Parameterizer, StaticParameter};
    use crate::parameters::ParamsValue;
    use crate::types::Record;

    fn static_param(value: Option<&str>) -> Parameterizer {
        Parameterizer::Static(StaticParameter {
            name: "min".to_string(),
            value: value.map(ParamsValue::from),
        })
    }

    fn dynamic_param(default: Option<&str>) -> Parameterizer {
        Parameterizer::Dynamic(DynamicParameter {
            name: "min".to_string(),
            column_name: "lo".to_string(),
            column_idx: 1,
            default: default.map(ParamsValue::from),
        })
    }

    #[test]
    fn static_scan_decodes_value() {
        let p = static_param(Some("15"));
        assert!(!p.is_dynamic());
        assert_eq!(p.scan::<i64>().unwrap(), 15);
        assert_eq!(p.scan_record::<i64>(&Record::default()).unwrap(), 15);
    }

    #[test]
    fn empty_static_scan_opt_is_none() {
        let p = static_param(None);
        assert!(p.is_empty());
        assert_eq!(p.scan_opt::<i64>().unwrap(), None);
        assert!(p.scan::<i64>().is_err());
    }

    #[test]
    fn dynamic_scan_reads_bound_column() {
        let p = dynamic_param(None);
        assert!(p.is_dynamic());
        assert!(p.scan::<i64>().is_err());

        let r = Record::from_text([Some("7"), Some("-3")]);
        assert_eq!(p.scan_record::<i64>(&r).unwrap(), -3);
    }

    #[test]
    fn dynamic_scan_uses_default_for_null() {
        let r = Record::from_text([Some("7"), None]);
        assert_eq!(dynamic_param(Some("4")).scan_record::<i64>(&r).unwrap(), 4);

        let err = dynamic_param(None).scan_record::<i64>(&r).unwrap_err();
        assert!(err.to_string().contains("is NULL and no default value"));
    }

    #[test]
    fn dynamic_scan_reports_unparsable_value() {
        let r = Record::from_text([Some("7"), Some("abc")]);
        let err = dynamic_param(None).scan_record::<i64>(&r).unwrap_err();
        assert!(err.to_string().contains("parameter 'min'"));
    }
}
