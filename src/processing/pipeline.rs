//! Sequential masking of a whole [`crate::types::DataSet`].

use tracing::{debug, warn};

use crate::error::{MaskingError, MaskingResult};
use crate::transformers::Transformer;
use crate::types::DataSet;

use super::cancel::CancellationToken;
use super::record::{check_affected_columns, transform_record};

/// Returns a masked copy of `dataset`.
///
/// Checks affected-column conflicts, calls `init` on every transformer, transforms each row in
/// order and finally calls `done`. `done` runs on every initialized transformer even when a later
/// `init`, a row or the run fails; the first error wins.
pub fn transform_dataset(
    dataset: &DataSet,
    transformers: &mut [Box<dyn Transformer>],
    cancel: &CancellationToken,
) -> MaskingResult<DataSet> {
    check_affected_columns(transformers)?;
    init_all(transformers)?;

    let rows = transform_rows(dataset, transformers, cancel);
    let finished = finish(transformers);

    let rows = rows?;
    finished?;
    debug!(rows = rows.len(), transformers = transformers.len(), "dataset masked");
    Ok(DataSet::new(dataset.schema.clone(), rows))
}

fn transform_rows(
    dataset: &DataSet,
    transformers: &[Box<dyn Transformer>],
    cancel: &CancellationToken,
) -> MaskingResult<Vec<crate::types::Record>> {
    let mut out = Vec::with_capacity(dataset.row_count());
    for (row, record) in dataset.rows.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(MaskingError::Cancelled { row });
        }
        out.push(transform_record(row, record, transformers)?);
    }
    Ok(out)
}

/// Calls `init` on every transformer in order.
///
/// When one fails, `done` is called on those already initialized before the error is returned.
pub(crate) fn init_all(transformers: &mut [Box<dyn Transformer>]) -> MaskingResult<()> {
    for i in 0..transformers.len() {
        if let Err(e) = transformers[i].init() {
            if let Err(done) = finish(&mut transformers[..i]) {
                warn!(transformer = transformers[i].name(), error = %done, "cleanup after failed init also failed");
            }
            return Err(e);
        }
    }
    Ok(())
}

/// Calls `done` on every transformer, returning the first failure.
pub(crate) fn finish(transformers: &mut [Box<dyn Transformer>]) -> MaskingResult<()> {
    let mut result = Ok(());
    for t in transformers.iter_mut() {
        let done = t.done();
        if result.is_ok() {
            result = done;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::transform_dataset;
    use crate::error::{MaskingError, MaskingResult};
    use crate::processing::CancellationToken;
    use crate::transformers::{AffectedColumns, Transformer};
    use crate::types::{Column, DataSet, Oid, RawValue, Record, Schema};

    /// Upper-cases column 0 and counts lifecycle calls.
    struct Upper {
        affected: AffectedColumns,
        inits: Arc<AtomicUsize>,
        dones: Arc<AtomicUsize>,
    }

    impl Transformer for Upper {
        fn name(&self) -> &str {
            "Upper"
        }

        fn affected_columns(&self) -> &AffectedColumns {
            &self.affected
        }

        fn init(&mut self) -> MaskingResult<()> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn transform(&self, record: &mut Record) -> MaskingResult<()> {
            let upper = match record.get_raw_column_value_by_idx(0)?.as_text() {
                Some(t) => RawValue::text(t.to_uppercase()),
                None => RawValue::null(),
            };
            record.set_raw_column_value_by_idx(0, upper)
        }

        fn done(&mut self) -> MaskingResult<()> {
            self.dones.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn dataset() -> DataSet {
        let schema = Schema::new(vec![Column::new(0, "name", "text", Oid::TEXT, -1)]);
        DataSet::new(
            schema,
            vec![
                Record::from_text([Some("a")]),
                Record::from_text([None::<&str>]),
                Record::from_text([Some("c")]),
            ],
        )
    }

    /// Writes column 1; its `init` always fails.
    struct BrokenInit {
        affected: AffectedColumns,
        dones: Arc<AtomicUsize>,
    }

    impl Transformer for BrokenInit {
        fn name(&self) -> &str {
            "BrokenInit"
        }

        fn affected_columns(&self) -> &AffectedColumns {
            &self.affected
        }

        fn init(&mut self) -> MaskingResult<()> {
            Err(MaskingError::Execution("dictionary unavailable".to_string()))
        }

        fn transform(&self, _record: &mut Record) -> MaskingResult<()> {
            Ok(())
        }

        fn done(&mut self) -> MaskingResult<()> {
            self.dones.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn upper() -> (Box<dyn Transformer>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let inits = Arc::new(AtomicUsize::new(0));
        let dones = Arc::new(AtomicUsize::new(0));
        let t = Upper {
            affected: AffectedColumns::from([(0, "name".to_string())]),
            inits: Arc::clone(&inits),
            dones: Arc::clone(&dones),
        };
        (Box::new(t), inits, dones)
    }

    #[test]
    fn masks_every_row_and_runs_lifecycle_once() {
        let ds = dataset();
        let (t, inits, dones) = upper();
        let mut ts = vec![t];
        let out = transform_dataset(&ds, &mut ts, &CancellationToken::new()).unwrap();

        assert_eq!(
            out.column_text("name").unwrap(),
            vec![Some("A".to_string()), None, Some("C".to_string())]
        );
        assert_eq!(ds.rows[0], Record::from_text([Some("a")]));
        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(dones.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelled_token_stops_before_first_row_and_still_calls_done() {
        let ds = dataset();
        let (t, _inits, dones) = upper();
        let mut ts = vec![t];
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = transform_dataset(&ds, &mut ts, &cancel).unwrap_err();
        assert!(matches!(err, MaskingError::Cancelled { row: 0 }));
        assert_eq!(dones.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_init_finishes_already_initialized_transformers() {
        let ds = dataset();
        let (t, inits, dones) = upper();
        let broken_dones = Arc::new(AtomicUsize::new(0));
        let broken = BrokenInit {
            affected: AffectedColumns::from([(1, "other".to_string())]),
            dones: Arc::clone(&broken_dones),
        };
        let mut ts: Vec<Box<dyn Transformer>> = vec![t, Box::new(broken)];

        let err = transform_dataset(&ds, &mut ts, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, MaskingError::Execution(ref m) if m == "dictionary unavailable"));
        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(dones.load(Ordering::SeqCst), 1);
        assert_eq!(broken_dones.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn conflicting_transformers_are_rejected_before_init() {
        let ds = dataset();
        let (a, inits, _) = upper();
        let (b, _, _) = upper();
        let mut ts = vec![a, b];
        let err = transform_dataset(&ds, &mut ts, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, MaskingError::AffectedColumnConflict { idx: 0, .. }));
        assert_eq!(inits.load(Ordering::SeqCst), 0);
    }
}
