//! Core data model types: column metadata, raw values and records.
//!
//! Column metadata ([`Column`], collected in a [`Schema`]) is produced by schema introspection
//! outside this crate and is read-only to transformers. Row data is carried as [`Record`]s, each a
//! list of [`RawValue`]s addressed by column index. Raw values hold the textual encoding of a
//! value (for integers, ASCII decimal digits) plus a null flag.

use std::fmt;

use crate::error::{MaskingError, MaskingResult};

/// Type identifier of a column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid(pub u32);

impl Oid {
    pub const INT8: Oid = Oid(20);
    pub const INT2: Oid = Oid(21);
    pub const INT4: Oid = Oid(23);
    pub const TEXT: Oid = Oid(25);
}

/// Attribute number of a column within its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttNum(pub i32);

/// Immutable metadata for a single table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Ordinal position within the record.
    pub idx: usize,
    /// Column name.
    pub name: String,
    /// Declared type name.
    pub type_name: String,
    /// Canonical type name (e.g. `int4` for `integer`).
    pub canonical_type_name: String,
    /// Type identifier.
    pub type_oid: Oid,
    /// Attribute number.
    pub num: AttNum,
    /// Whether the column carries a NOT NULL constraint.
    pub not_null: bool,
    /// Storage length in bytes, `-1` for variable/unbounded.
    pub length: i32,
    /// Replacement of the original type, e.g. to treat a TEXT column as INT2.
    pub overridden_type_name: Option<String>,
    /// Type identifier of the overriding type.
    pub overridden_type_oid: Option<Oid>,
}

impl Column {
    /// Create a column whose canonical type name equals its declared type name.
    pub fn new(
        idx: usize,
        name: impl Into<String>,
        type_name: impl Into<String>,
        type_oid: Oid,
        length: i32,
    ) -> Self {
        let type_name = type_name.into();
        Self {
            idx,
            name: name.into(),
            canonical_type_name: type_name.clone(),
            type_name,
            type_oid,
            num: AttNum(idx as i32 + 1),
            not_null: false,
            length,
            overridden_type_name: None,
            overridden_type_oid: None,
        }
    }

    pub fn with_canonical_type_name(mut self, name: impl Into<String>) -> Self {
        self.canonical_type_name = name.into();
        self
    }

    pub fn with_not_null(mut self, not_null: bool) -> Self {
        self.not_null = not_null;
        self
    }

    /// Override the column type, e.g. when a text column stores integers.
    pub fn with_type_override(mut self, type_name: impl Into<String>, type_oid: Oid) -> Self {
        self.overridden_type_name = Some(type_name.into());
        self.overridden_type_oid = Some(type_oid);
        self
    }

    /// The type name in effect: the overridden one if set, otherwise the declared one.
    pub fn effective_type_name(&self) -> &str {
        self.overridden_type_name.as_deref().unwrap_or(&self.type_name)
    }

    pub fn effective_type_oid(&self) -> Oid {
        self.overridden_type_oid.unwrap_or(self.type_oid)
    }

    /// Returns `true` if the column's effective (or, without an override, canonical) type name is
    /// listed in `types`.
    pub fn matches_any_type(&self, types: &[String]) -> bool {
        let effective = self.effective_type_name();
        types.iter().any(|t| {
            t == effective
                || (self.overridden_type_name.is_none() && *t == self.canonical_type_name)
        })
    }
}

/// Ordered column metadata of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Columns in record order.
    pub columns: Vec<Column>,
}

impl Schema {
    /// Create a new schema from columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Iterate column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Returns the index and metadata of a column by name, if present.
    pub fn column_by_name(&self, name: &str) -> Option<(usize, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.name == name)
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.column_by_name(name).map(|(idx, _)| idx)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Raw encoded value of one column in one row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawValue {
    /// Encoded bytes. Empty for nulls.
    pub data: Vec<u8>,
    /// NULL marker.
    pub is_null: bool,
}

impl RawValue {
    pub fn new(data: Vec<u8>, is_null: bool) -> Self {
        Self { data, is_null }
    }

    pub fn null() -> Self {
        Self {
            data: Vec::new(),
            is_null: true,
        }
    }

    /// A non-null value holding the UTF-8 bytes of `text`.
    pub fn text(text: impl AsRef<str>) -> Self {
        Self {
            data: text.as_ref().as_bytes().to_vec(),
            is_null: false,
        }
    }

    /// Lossy UTF-8 view of the data, `None` for nulls.
    pub fn as_text(&self) -> Option<std::borrow::Cow<'_, str>> {
        if self.is_null {
            None
        } else {
            Some(String::from_utf8_lossy(&self.data))
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(&text),
            None => f.write_str("NULL"),
        }
    }
}

/// One mutable row of raw values, addressed by column index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    values: Vec<RawValue>,
}

impl Record {
    pub fn new(values: Vec<RawValue>) -> Self {
        Self { values }
    }

    /// Build a record from textual cells, treating `None` as NULL.
    pub fn from_text<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let values = cells
            .into_iter()
            .map(|cell| match cell {
                Some(text) => RawValue::text(text),
                None => RawValue::null(),
            })
            .collect();
        Self { values }
    }

    /// Number of columns in the record.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[RawValue] {
        &self.values
    }

    /// Returns the raw value at `idx`.
    pub fn get_raw_column_value_by_idx(&self, idx: usize) -> MaskingResult<&RawValue> {
        self.values
            .get(idx)
            .ok_or(MaskingError::ColumnIndexOutOfRange {
                idx,
                len: self.values.len(),
            })
    }

    /// Replaces the raw value at `idx`.
    ///
    /// On error the record is left unchanged.
    pub fn set_raw_column_value_by_idx(
        &mut self,
        idx: usize,
        value: RawValue,
    ) -> MaskingResult<()> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(idx)
            .ok_or(MaskingError::ColumnIndexOutOfRange { idx, len })?;
        *slot = value;
        Ok(())
    }
}

/// In-memory batch of records sharing one [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major record storage.
    pub rows: Vec<Record>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Record>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Textual value of `column` in every row, `None` for nulls.
    ///
    /// Returns `None` if the column does not exist.
    pub fn column_text(&self, column: &str) -> Option<Vec<Option<String>>> {
        let idx = self.schema.index_of(column)?;
        Some(
            self.rows
                .iter()
                .map(|row| {
                    row.values()
                        .get(idx)
                        .and_then(|v| v.as_text().map(|t| t.into_owned()))
                })
                .collect(),
        )
    }
}
