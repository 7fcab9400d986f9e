//! Applying a transformer pipeline to a single [`crate::types::Record`].

use std::collections::BTreeMap;

use crate::error::{MaskingError, MaskingResult};
use crate::transformers::Transformer;
use crate::types::Record;

/// Fails if two transformers would write the same column.
pub fn check_affected_columns(transformers: &[Box<dyn Transformer>]) -> MaskingResult<()> {
    let mut owners: BTreeMap<usize, &str> = BTreeMap::new();
    for t in transformers {
        for (&idx, column) in t.affected_columns() {
            if let Some(first) = owners.insert(idx, t.name()) {
                return Err(MaskingError::AffectedColumnConflict {
                    idx,
                    column: column.clone(),
                    first: first.to_string(),
                    second: t.name().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Returns a copy of `record` with every transformer applied in order.
///
/// `row` is only used to annotate errors. The input record is never modified, so a failure part way
/// through the pipeline leaves the caller with the original values.
pub fn transform_record(
    row: usize,
    record: &Record,
    transformers: &[Box<dyn Transformer>],
) -> MaskingResult<Record> {
    let mut out = record.clone();
    for t in transformers {
        t.transform(&mut out).map_err(|source| MaskingError::Transform {
            transformer: t.name().to_string(),
            row,
            source: Box::new(source),
        })?;
    }
    Ok(out)
}
